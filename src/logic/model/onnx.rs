//! ONNX Runtime scorer (feature `onnx`)
//!
//! Loads `model.onnx` exported from the trained regression network.
//! Input: one float tensor `[1, n]`. Output: first value of the first output.

use std::path::Path;

use ndarray::{Array2, ArrayView1};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::network::{RiskModel, ScoringError};

pub struct OnnxModel {
    /// `Session::run` needs `&mut`
    session: Mutex<Session>,
    input_width: usize,
    source: String,
}

impl OnnxModel {
    pub fn load(path: &Path, input_width: usize) -> Result<Self, String> {
        tracing::info!("Loading ONNX risk model from: {}", path.display());

        let session = Session::builder()
            .map_err(|e| format!("Failed to create session builder: {}", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| format!("Failed to set optimization: {}", e))?
            .commit_from_file(path)
            .map_err(|e| format!("Failed to load model: {}", e))?;

        Ok(Self {
            session: Mutex::new(session),
            input_width,
            source: path.display().to_string(),
        })
    }
}

impl RiskModel for OnnxModel {
    fn input_width(&self) -> usize {
        self.input_width
    }

    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ScoringError> {
        if scaled.len() != self.input_width {
            return Err(ScoringError::InputWidth {
                expected: self.input_width,
                actual: scaled.len(),
            });
        }

        let input = Array2::<f32>::from_shape_vec(
            (1, self.input_width),
            scaled.iter().map(|v| *v as f32).collect(),
        )
        .map_err(|e| ScoringError::Inference(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input)
            .map_err(|e| ScoringError::Inference(format!("Tensor error: {}", e)))?;

        let mut session = self.session.lock();

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or(ScoringError::NoOutput)?;

        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| ScoringError::Inference(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&output_name).ok_or(ScoringError::NoOutput)?;

        let tensor = output
            .try_extract_tensor::<f32>()
            .map_err(|e| ScoringError::Inference(format!("Extract error: {}", e)))?;

        let score = tensor.1.first().copied().ok_or(ScoringError::NoOutput)? as f64;
        if !score.is_finite() {
            return Err(ScoringError::NonFinite);
        }
        Ok(score)
    }

    fn describe(&self) -> String {
        format!("onnx ({}, {} inputs)", self.source, self.input_width)
    }
}
