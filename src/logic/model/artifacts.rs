//! Artifact Bundle - the fitted risk-scoring artifacts
//!
//! Loaded once at startup from `ARTIFACT_DIR`, checked against each other,
//! then shared read-only (`Arc<ArtifactBundle>`) by every request.
//!
//! ```text
//! artifacts/
//! ├── feature_cols.json   ordered feature names (must contain SPEED_LIMIT)
//! ├── scaler.json         {mean, scale}
//! ├── imputer.json        {strategy, statistics}   optional → zero-fill
//! └── model.json          dense network            (or model.onnx, feature `onnx`)
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::network::{DenseNetwork, NetworkSpec, RiskModel};
use super::preprocess::{MeanImputer, StandardScaler};
use crate::logic::features::{FeatureLayout, LayoutError, LayoutInfo};

pub const FEATURES_FILE: &str = "feature_cols.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const IMPUTER_FILE: &str = "imputer.json";
pub const MODEL_FILE: &str = "model.json";
#[cfg(feature = "onnx")]
pub const ONNX_MODEL_FILE: &str = "model.onnx";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("artifact not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feature layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("invalid scaler: mean has {mean} entries, scale has {scale}")]
    Scaler { mean: usize, scale: usize },

    #[error("invalid model: {0}")]
    Model(String),
}

// ============================================================================
// BUNDLE
// ============================================================================

pub struct ArtifactBundle {
    layout: FeatureLayout,
    imputer: Option<MeanImputer>,
    scaler: StandardScaler,
    model: Box<dyn RiskModel>,
    loaded_at: DateTime<Utc>,
    source: Option<PathBuf>,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("layout", &self.layout.names())
            .field("imputer", &self.imputer.is_some())
            .field("model", &self.model.describe())
            .field("source", &self.source)
            .finish()
    }
}

impl ArtifactBundle {
    /// Assemble a bundle and check every artifact width against the layout
    pub fn new(
        layout: FeatureLayout,
        imputer: Option<MeanImputer>,
        scaler: StandardScaler,
        model: Box<dyn RiskModel>,
    ) -> Result<Self, ArtifactError> {
        if !scaler.is_consistent() {
            return Err(ArtifactError::Scaler {
                mean: scaler.mean.len(),
                scale: scaler.scale.len(),
            });
        }
        layout.check_width("scaler", scaler.width())?;
        if let Some(imputer) = &imputer {
            layout.check_width("imputer", imputer.width())?;
        }
        layout.check_width("model", model.input_width())?;

        Ok(Self {
            layout,
            imputer,
            scaler,
            model,
            loaded_at: Utc::now(),
            source: None,
        })
    }

    /// Load a bundle from an artifact directory
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        tracing::info!("Loading risk artifacts from: {}", dir.display());

        let names: Vec<String> = read_json(&dir.join(FEATURES_FILE))?;
        let layout = FeatureLayout::new(names)?;
        tracing::info!(
            "Features expected ({}, hash {:08x}): {:?}",
            layout.len(),
            layout.hash(),
            layout.names()
        );

        let scaler: StandardScaler = read_json(&dir.join(SCALER_FILE))?;

        let imputer_path = dir.join(IMPUTER_FILE);
        let imputer = if imputer_path.exists() {
            Some(read_json::<MeanImputer>(&imputer_path)?)
        } else {
            tracing::warn!(
                "{} not found. Missing features will be zero-filled.",
                IMPUTER_FILE
            );
            None
        };

        let model = load_model(dir, layout.len())?;
        tracing::info!("Risk model loaded: {}", model.describe());

        let mut bundle = Self::new(layout, imputer, scaler, model)?;
        bundle.source = Some(dir.to_path_buf());
        Ok(bundle)
    }

    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    pub fn imputer(&self) -> Option<&MeanImputer> {
        self.imputer.as_ref()
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &dyn RiskModel {
        self.model.as_ref()
    }

    pub fn status(&self) -> ArtifactStatus {
        ArtifactStatus {
            layout: self.layout.info(),
            imputer: self.imputer.is_some(),
            model: self.model.describe(),
            source: self.source.as_ref().map(|p| p.display().to_string()),
            loaded_at: self.loaded_at,
        }
    }
}

/// Bundle summary for the status endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactStatus {
    #[serde(flatten)]
    pub layout: LayoutInfo,
    pub imputer: bool,
    pub model: String,
    pub source: Option<String>,
    pub loaded_at: DateTime<Utc>,
}

// ============================================================================
// HELPERS
// ============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(feature = "onnx")]
fn load_model(dir: &Path, input_width: usize) -> Result<Box<dyn RiskModel>, ArtifactError> {
    let onnx_path = dir.join(ONNX_MODEL_FILE);
    if onnx_path.exists() {
        let model = super::onnx::OnnxModel::load(&onnx_path, input_width)
            .map_err(ArtifactError::Model)?;
        return Ok(Box::new(model));
    }
    load_dense_model(dir)
}

#[cfg(not(feature = "onnx"))]
fn load_model(dir: &Path, _input_width: usize) -> Result<Box<dyn RiskModel>, ArtifactError> {
    load_dense_model(dir)
}

fn load_dense_model(dir: &Path) -> Result<Box<dyn RiskModel>, ArtifactError> {
    let spec: NetworkSpec = read_json(&dir.join(MODEL_FILE))?;
    let network = DenseNetwork::from_spec(spec).map_err(ArtifactError::Model)?;
    Ok(Box::new(network))
}

// ============================================================================
// TESTS
// ============================================================================
