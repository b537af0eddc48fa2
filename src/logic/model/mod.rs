//! Model Module - risk-scoring artifacts and inference
//!
//! Keeps the fitted artifacts (feature order, imputer, scaler, regression
//! model) apart from the speed search that uses them.

pub mod artifacts;
pub mod network;
pub mod preprocess;

#[cfg(feature = "onnx")]
pub mod onnx;

#[cfg(test)]
pub(crate) mod fixtures;

pub use artifacts::{ArtifactBundle, ArtifactError, ArtifactStatus};
pub use network::{Activation, DenseNetwork, RiskModel, ScoringError};
pub use preprocess::{MeanImputer, StandardScaler};
