//! Common types used throughout the index.

mod record;

pub use record::Record;

use crate::error::{IndexError, Result};
use serde::{Deserialize, Serialize};

/// Smallest legal minimum degree; `t = 2` gives a 2-3-4 tree
pub const MIN_DEGREE: usize = 2;

/// Minimum degree used when none is configured
pub const DEFAULT_MIN_DEGREE: usize = 2;

/// B-tree configuration
///
/// Only constructible through [`TreeConfig::new`] (or deserialization,
/// which goes through it), so every config in hand has `t >= 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawTreeConfig")]
pub struct TreeConfig {
    /// Minimum degree `t`: non-root nodes hold `t-1..=2t-1` keys
    min_degree: usize,
}

/// Unchecked wire form of [`TreeConfig`]
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTreeConfig {
    min_degree: usize,
}

impl TryFrom<RawTreeConfig> for TreeConfig {
    type Error = IndexError;

    fn try_from(raw: RawTreeConfig) -> Result<Self> {
        Self::new(raw.min_degree)
    }
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}

impl TreeConfig {
    /// Create a config, rejecting degrees below [`MIN_DEGREE`]
    pub fn new(min_degree: usize) -> Result<Self> {
        if min_degree < MIN_DEGREE {
            return Err(IndexError::InvalidMinDegree {
                min_degree,
                min: MIN_DEGREE,
            });
        }
        Ok(Self { min_degree })
    }

    /// Minimum degree `t`
    pub fn min_degree(&self) -> usize {
        self.min_degree
    }

    /// Largest key count any node may hold (`2t-1`)
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Smallest key count a non-root node may hold (`t-1`)
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_limits() -> Result<()> {
        let config = TreeConfig::new(3)?;
        assert_eq!(config.max_keys(), 5);
        assert_eq!(config.min_keys(), 2);

        let default = TreeConfig::default();
        assert_eq!(default.min_degree(), 2);
        assert_eq!(default.max_keys(), 3);
        Ok(())
    }

    #[test]
    fn test_config_rejects_small_degree() {
        for t in [0, 1] {
            match TreeConfig::new(t) {
                Err(IndexError::InvalidMinDegree { min_degree, min }) => {
                    assert_eq!(min_degree, t);
                    assert_eq!(min, MIN_DEGREE);
                }
                other => panic!("expected InvalidMinDegree, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_config_serde_camel_case() {
        let json = serde_json::to_string(&TreeConfig::new(4).unwrap()).unwrap();
        assert_eq!(json, r#"{"minDegree":4}"#);

        let parsed: TreeConfig = serde_json::from_str(r#"{"minDegree":5}"#).unwrap();
        assert_eq!(parsed.min_degree(), 5);
    }

    #[test]
    fn test_config_deserialize_rejects_small_degree() {
        for json in [r#"{"minDegree":0}"#, r#"{"minDegree":1}"#] {
            let err = serde_json::from_str::<TreeConfig>(json).unwrap_err();
            assert!(err.to_string().contains("minimum degree"), "{}", err);
        }
    }
}
