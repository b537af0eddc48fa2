//! Fitted preprocessing artifacts: mean imputer and standard scaler.
//!
//! Both are fitted offline and stored as plain JSON arrays, one entry per
//! feature in layout order.

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureLayout, LayoutError};

// ============================================================================
// IMPUTER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeanImputer {
    #[serde(default = "default_strategy")]
    pub strategy: String,
    /// Training mean per feature
    pub statistics: Vec<f64>,
}

fn default_strategy() -> String {
    "mean".to_string()
}

impl MeanImputer {
    pub fn new(statistics: Vec<f64>) -> Self {
        Self {
            strategy: default_strategy(),
            statistics,
        }
    }

    pub fn width(&self) -> usize {
        self.statistics.len()
    }

    pub fn transform(
        &self,
        layout: &FeatureLayout,
        values: &[Option<f64>],
    ) -> Result<Array1<f64>, LayoutError> {
        layout.check_width("imputer", self.width())?;
        layout.check_width("feature vector", values.len())?;

        Ok(values
            .iter()
            .zip(&self.statistics)
            .map(|(value, mean)| value.unwrap_or(*mean))
            .collect())
    }
}

// ============================================================================
// SCALER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Pass-through scaler, mostly for tests and demos
    pub fn identity(width: usize) -> Self {
        Self::new(vec![0.0; width], vec![1.0; width])
    }

    pub fn width(&self) -> usize {
        self.mean.len()
    }

    /// Mean and scale must have the same width
    pub fn is_consistent(&self) -> bool {
        self.mean.len() == self.scale.len()
    }

    /// `(x - mean) / scale`. A zero scale is treated as 1.0, the same
    /// convention the fitting side uses for constant columns.
    pub fn transform(
        &self,
        layout: &FeatureLayout,
        row: ArrayView1<f64>,
    ) -> Result<Array1<f64>, LayoutError> {
        layout.check_width("scaler", self.width())?;
        layout.check_width("feature vector", row.len())?;

        let mean = ArrayView1::from(&self.mean[..]);
        let scale = Array1::from_iter(
            self.scale
                .iter()
                .map(|s| if *s == 0.0 { 1.0 } else { *s }),
        );

        Ok((&row - &mean) / &scale)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> FeatureLayout {
        FeatureLayout::new(vec!["W".to_string(), "SPEED_LIMIT".to_string()]).unwrap()
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler::new(vec![1000.0, 100.0], vec![500.0, 20.0]);
        let row = Array1::from(vec![2000.0, 80.0]);
        let scaled = scaler.transform(&layout(), row.view()).unwrap();
        assert_eq!(scaled.to_vec(), vec![2.0, -1.0]);
    }

    #[test]
    fn test_scaler_zero_scale_is_unit() {
        let scaler = StandardScaler::new(vec![0.0, 5.0], vec![1.0, 0.0]);
        let row = Array1::from(vec![3.0, 7.0]);
        let scaled = scaler.transform(&layout(), row.view()).unwrap();
        assert_eq!(scaled.to_vec(), vec![3.0, 2.0]);
    }

    #[test]
    fn test_scaler_width_mismatch() {
        let scaler = StandardScaler::identity(3);
        let row = Array1::from(vec![1.0, 2.0]);
        assert!(matches!(
            scaler.transform(&layout(), row.view()),
            Err(LayoutError::WidthMismatch { .. })
        ));
    }

    #[test]
    fn test_imputer_width_mismatch() {
        let imputer = MeanImputer::new(vec![1.0]);
        assert!(imputer.transform(&layout(), &[None, Some(1.0)]).is_err());
    }

    #[test]
    fn test_imputer_parses_without_strategy() {
        let imputer: MeanImputer = serde_json::from_str(r#"{"statistics": [1.5, 2.5]}"#).unwrap();
        assert_eq!(imputer.strategy, "mean");
        assert_eq!(imputer.width(), 2);
    }
}
