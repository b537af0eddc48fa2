//! Feature Vector - one row of model input, aligned to a `FeatureLayout`
//!
//! Values start out as `Option<f64>`: sensors that sent nothing stay `None`
//! until the imputer fills them.

use std::collections::BTreeMap;

use ndarray::Array1;

use super::layout::{FeatureLayout, FeatureSource, LayoutError};
use crate::logic::model::preprocess::MeanImputer;
use crate::logic::sensors::SensorKind;

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    /// Hash of the layout this row was built against
    layout_hash: u32,
    values: Vec<Option<f64>>,
}

impl FeatureVector {
    /// Build a row from per-kind sensor means. Speed limit and unmapped
    /// columns start missing.
    pub fn from_sensor_means(layout: &FeatureLayout, means: &BTreeMap<SensorKind, f64>) -> Self {
        let values = layout
            .sources()
            .iter()
            .map(|source| match source {
                FeatureSource::Sensor(kind) => means.get(kind).copied(),
                FeatureSource::SpeedLimit | FeatureSource::Unmapped => None,
            })
            .collect();

        Self {
            layout_hash: layout.hash(),
            values,
        }
    }

    pub fn layout_hash(&self) -> u32 {
        self.layout_hash
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_none()).count()
    }

    /// Fill missing entries. Without an imputer, missing entries become 0.0.
    pub fn impute(
        &self,
        layout: &FeatureLayout,
        imputer: Option<&MeanImputer>,
    ) -> Result<Array1<f64>, LayoutError> {
        layout.check_hash(self.layout_hash)?;
        layout.check_width("feature vector", self.values.len())?;

        match imputer {
            Some(imputer) => imputer.transform(layout, &self.values),
            None => Ok(self.values.iter().map(|v| v.unwrap_or(0.0)).collect()),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> FeatureLayout {
        FeatureLayout::new(
            ["W", "L", "T", "N", "SPEED_LIMIT"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_sensor_means_marks_missing() {
        let layout = layout();
        let mut means = BTreeMap::new();
        means.insert(SensorKind::Water, 1500.0);
        means.insert(SensorKind::Temperature, -2.0);

        let row = FeatureVector::from_sensor_means(&layout, &means);
        assert_eq!(row.len(), 5);
        assert_eq!(row.get(0), Some(1500.0));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), Some(-2.0));
        assert_eq!(row.get(4), None);
        assert_eq!(row.missing_count(), 3);
    }

    #[test]
    fn test_zero_fill_without_imputer() {
        let layout = layout();
        let mut means = BTreeMap::new();
        means.insert(SensorKind::Light, 200.0);

        let row = FeatureVector::from_sensor_means(&layout, &means);
        let filled = row.impute(&layout, None).unwrap();
        assert_eq!(filled.to_vec(), vec![0.0, 200.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_mean_imputer_fills_missing_only() {
        let layout = layout();
        let imputer = MeanImputer::new(vec![10.0, 20.0, 30.0, 40.0, 100.0]);
        let mut means = BTreeMap::new();
        means.insert(SensorKind::Water, 1.0);

        let row = FeatureVector::from_sensor_means(&layout, &means);
        let filled = row.impute(&layout, Some(&imputer)).unwrap();
        assert_eq!(filled.to_vec(), vec![1.0, 20.0, 30.0, 40.0, 100.0]);
    }

    #[test]
    fn test_foreign_layout_rejected() {
        let layout = layout();
        let other = FeatureLayout::new(vec!["SPEED_LIMIT".to_string(), "W".to_string()]).unwrap();
        let row = FeatureVector::from_sensor_means(&other, &BTreeMap::new());
        assert!(matches!(
            row.impute(&layout, None),
            Err(LayoutError::HashMismatch { .. })
        ));
    }
}
