//! The `ConfigGroup` entity.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::model::Config;

/// A named, versioned ordered collection of configs.
///
/// A group owns full copies of its members: the standalone store entry for
/// a config and the copy embedded in a group are independent after
/// creation. Within one group, no two members share `(name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigGroup {
    /// Name of the configuration group.
    pub name: String,

    /// Version of the configuration group. Must be positive.
    pub version: u64,

    /// Member configurations, in insertion order.
    pub configurations: Vec<Config>,
}

impl ConfigGroup {
    /// Check the presence constraints for a create operation.
    ///
    /// Name must be non-empty, version positive, and the group must carry
    /// at least one member. Members are not individually validated here;
    /// the duplicate-member invariant is checked separately so the error
    /// can name the offender.
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.is_empty() {
            return Err(ApiError::InvalidInput(
                "'name' field is required and cannot be empty".into(),
            ));
        }
        if self.version == 0 {
            return Err(ApiError::InvalidInput(
                "'version' field is required and cannot be zero".into(),
            ));
        }
        if self.configurations.is_empty() {
            return Err(ApiError::InvalidInput(
                "'configurations' field is required and cannot be empty".into(),
            ));
        }
        self.check_member_uniqueness()
    }

    /// Enforce the no-duplicate-member invariant.
    fn check_member_uniqueness(&self) -> Result<(), ApiError> {
        for (i, a) in self.configurations.iter().enumerate() {
            for b in &self.configurations[i + 1..] {
                if a.name == b.name && a.version == b.version {
                    return Err(ApiError::InvalidInput(format!(
                        "duplicate member '{}/{}' in group",
                        a.name, a.version
                    )));
                }
            }
        }
        Ok(())
    }

    /// Whether a member with the given identity is present.
    pub fn contains(&self, name: &str, version: u64) -> bool {
        self.configurations
            .iter()
            .any(|c| c.name == name && c.version == version)
    }

    /// Storage key for this group.
    pub fn key(&self) -> String {
        group_key(&self.name, self.version)
    }
}

/// Storage key for a group identified by `(name, version)`.
pub fn group_key(name: &str, version: u64) -> String {
    format!("configgroup/{}/{}", name, version)
}
