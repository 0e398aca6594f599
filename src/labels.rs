//! Label query parsing and matching.
//!
//! # Responsibilities
//! - Parse the path-segment query form `k1:v1;k2:v2`
//! - Evaluate exact-set equality against a config's label map
//!
//! # Design Decisions
//! - Matching is exact equality of the whole label set: same number of
//!   pairs, same key→value mapping. A query that is a strict subset or
//!   superset of a config's labels does NOT match.
//! - A segment without exactly one colon is a parse error.

use std::collections::BTreeMap;

use crate::error::ApiError;
use crate::model::Config;

/// A parsed label query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelQuery {
    labels: BTreeMap<String, String>,
}

impl LabelQuery {
    /// Parse a `k1:v1;k2:v2` query string.
    pub fn parse(raw: &str) -> Result<Self, ApiError> {
        let mut labels = BTreeMap::new();
        for segment in raw.split(';') {
            let mut parts = segment.splitn(3, ':');
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), Some(value), None) if !key.is_empty() => {
                    labels.insert(key.to_string(), value.to_string());
                }
                _ => {
                    return Err(ApiError::InvalidInput(format!(
                        "invalid label format: '{}'",
                        segment
                    )))
                }
            }
        }
        Ok(Self { labels })
    }

    /// Exact-set equality against a config's labels.
    pub fn matches(&self, config: &Config) -> bool {
        self.labels == config.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_labels(pairs: &[(&str, &str)]) -> Config {
        Config {
            name: "c".into(),
            version: 1,
            parameters: BTreeMap::from([("k".into(), "v".into())]),
            labels: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_parse_single_pair() {
        let q = LabelQuery::parse("env:prod").unwrap();
        assert!(q.matches(&config_with_labels(&[("env", "prod")])));
    }

    #[test]
    fn test_parse_rejects_missing_colon() {
        assert!(LabelQuery::parse("envprod").is_err());
        assert!(LabelQuery::parse("env:prod;bad").is_err());
    }

    #[test]
    fn test_parse_rejects_extra_colon() {
        assert!(LabelQuery::parse("env:prod:extra").is_err());
    }

    #[test]
    fn test_exact_match_required() {
        let q = LabelQuery::parse("a:1;b:2").unwrap();
        // Subset of the query does not match.
        assert!(!q.matches(&config_with_labels(&[("a", "1")])));
        // Superset of the query does not match either.
        let q = LabelQuery::parse("a:1").unwrap();
        assert!(!q.matches(&config_with_labels(&[("a", "1"), ("b", "2")])));
        // The exact set matches.
        let q = LabelQuery::parse("a:1;b:2").unwrap();
        assert!(q.matches(&config_with_labels(&[("a", "1"), ("b", "2")])));
    }

    #[test]
    fn test_value_mismatch() {
        let q = LabelQuery::parse("env:prod").unwrap();
        assert!(!q.matches(&config_with_labels(&[("env", "dev")])));
    }

    #[test]
    fn test_order_insensitive() {
        let q = LabelQuery::parse("b:2;a:1").unwrap();
        assert!(q.matches(&config_with_labels(&[("a", "1"), ("b", "2")])));
    }
}
