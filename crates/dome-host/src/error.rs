use thiserror::Error;

/// Failures raised by host objects, documents and callbacks.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum HostError {
    #[error("{type_name}.{name} is not a function")]
    NotCallable { type_name: String, name: String },

    #[error("cannot assign `{key}` on {type_name}")]
    NotWritable { type_name: String, key: String },

    #[error("{0} is not supported by this host")]
    Unsupported(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("hierarchy request error: {0}")]
    Hierarchy(String),

    #[error("{0}")]
    Thrown(String),
}

impl HostError {
    pub fn not_callable(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        HostError::NotCallable {
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    pub fn not_writable(type_name: impl Into<String>, key: impl Into<String>) -> Self {
        HostError::NotWritable {
            type_name: type_name.into(),
            key: key.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        HostError::InvalidArgument(message.into())
    }
}
