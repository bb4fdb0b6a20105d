use serde::{Deserialize, Serialize};

use crate::construct::is_valid_name;
use crate::DomeError;

/// Engine settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DomeConfig {
    /// Tag used by descriptors that name none (`.card`, `#main`).
    pub default_tag: String,
}

impl Default for DomeConfig {
    fn default() -> Self {
        Self {
            default_tag: "div".to_owned(),
        }
    }
}

impl DomeConfig {
    /// Parses a JSON document such as `{"defaultTag": "span"}`.
    /// Missing fields take their defaults.
    pub fn from_json_str(input: &str) -> Result<Self, DomeError> {
        let config: DomeConfig =
            serde_json::from_str(input).map_err(|e| DomeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DomeError> {
        if !is_valid_name(&self.default_tag) {
            return Err(DomeError::Config(format!(
                "`{}` is not a valid default tag",
                self.default_tag
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(DomeConfig::default().default_tag, "div");
        assert_eq!(DomeConfig::from_json_str("{}").unwrap(), DomeConfig::default());
    }

    #[test]
    fn test_from_json() {
        let config = DomeConfig::from_json_str(r#"{"defaultTag": "span"}"#).unwrap();
        assert_eq!(config.default_tag, "span");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(
            DomeConfig::from_json_str("{"),
            Err(DomeError::Config(_))
        ));
        assert!(matches!(
            DomeConfig::from_json_str(r#"{"defaultTag": "1x"}"#),
            Err(DomeError::Config(_))
        ));
    }
}
