//! Feature Layout - ordered feature names fixed by the risk artifacts
//!
//! **The order here is the order the scaler and the model were fitted on.**
//! Every vector handed to the scorer is built against one `FeatureLayout`,
//! and every artifact width is checked against it at load time.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

use crate::logic::sensors::SensorKind;

/// Name of the speed-limit feature the optimizer overwrites
pub const SPEED_LIMIT_FEATURE: &str = "SPEED_LIMIT";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("feature list is empty")]
    Empty,

    #[error("feature '{0}' appears more than once")]
    DuplicateFeature(String),

    #[error("feature list has no 'SPEED_LIMIT' column")]
    MissingSpeedLimit,

    #[error("feature width mismatch for {artifact}: layout has {expected}, got {actual}")]
    WidthMismatch {
        artifact: String,
        expected: usize,
        actual: usize,
    },

    #[error("feature layout mismatch: expected hash {expected:08x}, got {actual:08x}")]
    HashMismatch { expected: u32, actual: u32 },
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Slot a feature column is filled from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSource {
    Sensor(SensorKind),
    SpeedLimit,
    /// Not derivable from sensors, always imputed
    Unmapped,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureLayout {
    names: Vec<String>,
    sources: Vec<FeatureSource>,
    speed_index: usize,
    hash: u32,
}

impl FeatureLayout {
    pub fn new(names: Vec<String>) -> Result<Self, LayoutError> {
        if names.is_empty() {
            return Err(LayoutError::Empty);
        }

        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(LayoutError::DuplicateFeature(name.clone()));
            }
        }

        let speed_index = names
            .iter()
            .position(|n| n == SPEED_LIMIT_FEATURE)
            .ok_or(LayoutError::MissingSpeedLimit)?;

        let sources = names
            .iter()
            .map(|name| {
                if name == SPEED_LIMIT_FEATURE {
                    FeatureSource::SpeedLimit
                } else {
                    SensorKind::from_code(name)
                        .map(FeatureSource::Sensor)
                        .unwrap_or(FeatureSource::Unmapped)
                }
            })
            .collect();

        let hash = compute_layout_hash(&names);

        Ok(Self {
            names,
            sources,
            speed_index,
            hash,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn sources(&self) -> &[FeatureSource] {
        &self.sources
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Check that an artifact of `actual` width fits this layout
    pub fn check_width(&self, artifact: &str, actual: usize) -> Result<(), LayoutError> {
        if actual != self.len() {
            return Err(LayoutError::WidthMismatch {
                artifact: artifact.to_string(),
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }

    /// Check that data built against `hash` belongs to this layout
    pub fn check_hash(&self, hash: u32) -> Result<(), LayoutError> {
        if hash != self.hash {
            return Err(LayoutError::HashMismatch {
                expected: self.hash,
                actual: hash,
            });
        }
        Ok(())
    }

    pub fn info(&self) -> LayoutInfo {
        LayoutInfo {
            hash: self.hash,
            feature_count: self.len(),
            feature_names: self.names.clone(),
        }
    }
}

/// CRC32 over the ordered names
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Layout summary for status endpoints and logs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutInfo {
    #[serde(rename = "layoutHash")]
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_layout_sources() {
        let layout = FeatureLayout::new(names(&["W", "L", "SPEED_LIMIT", "T", "Extra"])).unwrap();
        assert_eq!(layout.len(), 5);
        assert_eq!(layout.speed_index(), 2);
        assert_eq!(
            layout.sources(),
            &[
                FeatureSource::Sensor(SensorKind::Water),
                FeatureSource::Sensor(SensorKind::Light),
                FeatureSource::SpeedLimit,
                FeatureSource::Sensor(SensorKind::Temperature),
                FeatureSource::Unmapped,
            ]
        );
    }

    #[test]
    fn test_missing_speed_limit_rejected() {
        let result = FeatureLayout::new(names(&["W", "L", "T"]));
        assert_eq!(result, Err(LayoutError::MissingSpeedLimit));
    }

    #[test]
    fn test_duplicate_rejected() {
        let result = FeatureLayout::new(names(&["W", "W", "SPEED_LIMIT"]));
        assert_eq!(result, Err(LayoutError::DuplicateFeature("W".to_string())));
    }

    #[test]
    fn test_empty_rejected() {
        assert_eq!(FeatureLayout::new(vec![]), Err(LayoutError::Empty));
    }

    #[test]
    fn test_hash_depends_on_order() {
        let a = FeatureLayout::new(names(&["W", "T", "SPEED_LIMIT"])).unwrap();
        let b = FeatureLayout::new(names(&["T", "W", "SPEED_LIMIT"])).unwrap();
        assert_ne!(a.hash(), b.hash());
        assert!(a.check_hash(a.hash()).is_ok());
        assert!(a.check_hash(b.hash()).is_err());
    }

    #[test]
    fn test_check_width() {
        let layout = FeatureLayout::new(names(&["W", "SPEED_LIMIT"])).unwrap();
        assert!(layout.check_width("scaler", 2).is_ok());
        assert_eq!(
            layout.check_width("scaler", 3),
            Err(LayoutError::WidthMismatch {
                artifact: "scaler".to_string(),
                expected: 2,
                actual: 3,
            })
        );
    }
}
