//! Test fixtures: a small, hand-weighted risk model.
//!
//! Identity scaler, one ReLU unit:
//! `risk = relu(0.001·W - 0.1·T + 0.02·SPEED_LIMIT - 1.5)`
//!
//! - black ice (W=2000, T=-5): risk ≥ 2.2 at every speed → 60, high-risk
//! - dry and mild (W=0, T=15): risk 0 at 130 → 130, safe
//! - damp (W=1000, T=4): risk < 1 only below 100 → 90, safe

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::artifacts::{
    ArtifactBundle, FEATURES_FILE, IMPUTER_FILE, MODEL_FILE, SCALER_FILE,
};
use super::network::{Activation, DenseNetwork, LayerSpec, NetworkSpec};
use super::preprocess::{MeanImputer, StandardScaler};
use crate::logic::features::FeatureLayout;

pub fn demo_feature_names() -> Vec<String> {
    ["W", "L", "T", "H", "SPEED_LIMIT"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn demo_layout() -> FeatureLayout {
    FeatureLayout::new(demo_feature_names()).unwrap()
}

pub fn demo_network_spec() -> NetworkSpec {
    NetworkSpec {
        layers: vec![LayerSpec {
            weights: vec![vec![0.001], vec![0.0], vec![-0.1], vec![0.0], vec![0.02]],
            bias: vec![-1.5],
            activation: Activation::Relu,
        }],
    }
}

pub fn demo_network() -> DenseNetwork {
    DenseNetwork::from_spec(demo_network_spec()).unwrap()
}

pub fn demo_imputer() -> MeanImputer {
    MeanImputer::new(vec![0.0, 10_000.0, 10.0, 70.0, 100.0])
}

pub fn demo_bundle() -> Arc<ArtifactBundle> {
    Arc::new(
        ArtifactBundle::new(
            demo_layout(),
            Some(demo_imputer()),
            StandardScaler::identity(5),
            Box::new(demo_network()),
        )
        .unwrap(),
    )
}

/// Write the demo bundle as JSON artifacts into `dir`
pub fn write_demo_artifacts(dir: &Path, with_imputer: bool) {
    fs::write(
        dir.join(FEATURES_FILE),
        serde_json::to_string(&demo_feature_names()).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join(SCALER_FILE),
        serde_json::to_string(&StandardScaler::identity(5)).unwrap(),
    )
    .unwrap();
    fs::write(
        dir.join(MODEL_FILE),
        serde_json::to_string(&demo_network_spec()).unwrap(),
    )
    .unwrap();
    if with_imputer {
        fs::write(
            dir.join(IMPUTER_FILE),
            serde_json::to_string(&demo_imputer()).unwrap(),
        )
        .unwrap();
    }
}
