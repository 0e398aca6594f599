//! The `Config` entity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// A named, versioned set of key-value parameters and labels.
///
/// Identity is `(name, version)`. There is no update operation: a config
/// is created once, read any number of times, and deleted whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Name of the configuration.
    pub name: String,

    /// Version of the configuration. Must be positive.
    pub version: u64,

    /// Key-value parameters. Serialized as `params`.
    #[serde(rename = "params")]
    pub parameters: BTreeMap<String, String>,

    /// Key-value labels used for group filtering.
    pub labels: BTreeMap<String, String>,
}

impl Config {
    /// Check the presence constraints for a create operation.
    ///
    /// Name must be non-empty, version positive, and both maps non-empty.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_empty() || self.version == 0 || self.parameters.is_empty() || self.labels.is_empty() {
            return Err(ApiError::InvalidInput(
                "'name', 'version', 'params', and 'labels' fields are required and cannot be empty".into(),
            ));
        }
        Ok(())
    }

    /// Storage key for this config.
    pub fn key(&self) -> String {
        config_key(&self.name, self.version)
    }
}

/// Storage key for a config identified by `(name, version)`.
pub fn config_key(name: &str, version: u64) -> String {
    format!("config/{}/{}", name, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            name: "db".into(),
            version: 1,
            parameters: BTreeMap::from([("host".into(), "localhost".into())]),
            labels: BTreeMap::from([("env".into(), "prod".into())]),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_missing_fields_rejected() {
        let mut c = sample();
        c.name.clear();
        assert!(c.validate().is_err());

        let mut c = sample();
        c.version = 0;
        assert!(c.validate().is_err());

        let mut c = sample();
        c.parameters.clear();
        assert!(c.validate().is_err());

        let mut c = sample();
        c.labels.clear();
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_params_field_name_on_wire() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("params").is_some());
        assert!(json.get("parameters").is_none());
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(sample().key(), "config/db/1");
    }
}
