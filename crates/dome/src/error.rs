use dome_host::{HostError, PathError};
use thiserror::Error;

use crate::construct::DescriptorError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomeError {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("invalid descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("invalid path: {0}")]
    Path(#[from] PathError),

    #[error("{op} requires a non-empty path")]
    InvalidPathOperation { op: &'static str },

    #[error("`{key}` is a reserved accessor, use `extend` to reach a property of that name")]
    ReservedKey { key: String },

    #[error("{type_name} value is not iterable")]
    NotIterable { type_name: String },

    #[error("invalid event arguments: {0}")]
    InvalidEventArguments(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}
