//! Risk Model - regression from a scaled feature row to a predicted
//! near-accident count per hour.
//!
//! `DenseNetwork` evaluates an exported feed-forward network (Keras
//! `Dense` layers) with ndarray. The ONNX scorer lives in `onnx.rs`
//! behind the `onnx` feature.

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringError {
    #[error("model expects {expected} inputs, got {actual}")]
    InputWidth { expected: usize, actual: usize },

    #[error("model produced a non-finite score")]
    NonFinite,

    #[error("model has no output")]
    NoOutput,

    #[error("inference failed: {0}")]
    Inference(String),
}

// ============================================================================
// MODEL TRAIT
// ============================================================================

/// Trait for risk scorers (dense JSON network, ONNX, ...)
///
/// Implementations are immutable after load and shared across requests.
pub trait RiskModel: Send + Sync {
    /// Number of inputs the model was fitted on
    fn input_width(&self) -> usize;

    /// Predicted incident count for one scaled row
    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ScoringError>;

    /// Short description for status output
    fn describe(&self) -> String;
}

// ============================================================================
// DENSE NETWORK
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activation {
    Linear,
    Relu,
    Softplus,
    Sigmoid,
    Tanh,
}

impl Activation {
    fn apply(&self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Relu => x.max(0.0),
            // ln(1 + e^x) without overflow for large x
            Activation::Softplus => x.max(0.0) + (-x.abs()).exp().ln_1p(),
            Activation::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }
}

/// Serialized layer: `weights` is input×output (Keras kernel layout)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
    #[serde(default = "default_activation")]
    pub activation: Activation,
}

fn default_activation() -> Activation {
    Activation::Linear
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub layers: Vec<LayerSpec>,
}

#[derive(Debug, Clone)]
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

#[derive(Debug, Clone)]
pub struct DenseNetwork {
    layers: Vec<DenseLayer>,
}

impl DenseNetwork {
    /// Build and shape-check a network. The last layer must have one output.
    pub fn from_spec(spec: NetworkSpec) -> Result<Self, String> {
        if spec.layers.is_empty() {
            return Err("network has no layers".to_string());
        }

        let mut layers = Vec::with_capacity(spec.layers.len());
        let mut previous_out: Option<usize> = None;

        for (i, layer) in spec.layers.into_iter().enumerate() {
            let rows = layer.weights.len();
            let cols = layer.weights.first().map(|r| r.len()).unwrap_or(0);
            if rows == 0 || cols == 0 {
                return Err(format!("layer {} has empty weights", i));
            }
            if layer.weights.iter().any(|r| r.len() != cols) {
                return Err(format!("layer {} has ragged weights", i));
            }
            if layer.bias.len() != cols {
                return Err(format!(
                    "layer {} bias has {} entries, expected {}",
                    i,
                    layer.bias.len(),
                    cols
                ));
            }
            if let Some(prev) = previous_out {
                if prev != rows {
                    return Err(format!(
                        "layer {} expects {} inputs but previous layer outputs {}",
                        i, rows, prev
                    ));
                }
            }

            let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
            let weights = Array2::from_shape_vec((rows, cols), flat)
                .map_err(|e| format!("layer {}: {}", i, e))?;

            previous_out = Some(cols);
            layers.push(DenseLayer {
                weights,
                bias: Array1::from(layer.bias),
                activation: layer.activation,
            });
        }

        if previous_out != Some(1) {
            return Err(format!(
                "final layer must have 1 output, has {}",
                previous_out.unwrap_or(0)
            ));
        }

        Ok(Self { layers })
    }

    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

impl RiskModel for DenseNetwork {
    fn input_width(&self) -> usize {
        self.layers.first().map(|l| l.weights.nrows()).unwrap_or(0)
    }

    fn predict(&self, scaled: ArrayView1<f64>) -> Result<f64, ScoringError> {
        if scaled.len() != self.input_width() {
            return Err(ScoringError::InputWidth {
                expected: self.input_width(),
                actual: scaled.len(),
            });
        }

        let mut activations = scaled.to_owned();
        for layer in &self.layers {
            let z = activations.dot(&layer.weights) + &layer.bias;
            activations = z.mapv(|x| layer.activation.apply(x));
        }

        let score = *activations.first().ok_or(ScoringError::NoOutput)?;
        if !score.is_finite() {
            return Err(ScoringError::NonFinite);
        }
        Ok(score)
    }

    fn describe(&self) -> String {
        format!("dense network ({} layers, {} inputs)", self.depth(), self.input_width())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(weights: Vec<f64>, bias: f64, activation: Activation) -> DenseNetwork {
        DenseNetwork::from_spec(NetworkSpec {
            layers: vec![LayerSpec {
                weights: weights.into_iter().map(|w| vec![w]).collect(),
                bias: vec![bias],
                activation,
            }],
        })
        .unwrap()
    }

    #[test]
    fn test_linear_prediction() {
        let net = linear(vec![1.0, 2.0], 0.5, Activation::Linear);
        let x = Array1::from(vec![1.0, 1.0]);
        assert_eq!(net.predict(x.view()).unwrap(), 3.5);
        assert_eq!(net.input_width(), 2);
    }

    #[test]
    fn test_relu_clamps_negative() {
        let net = linear(vec![1.0], -5.0, Activation::Relu);
        let x = Array1::from(vec![1.0]);
        assert_eq!(net.predict(x.view()).unwrap(), 0.0);
    }

    #[test]
    fn test_softplus_is_stable() {
        assert!((Activation::Softplus.apply(0.0) - 2f64.ln()).abs() < 1e-12);
        assert!((Activation::Softplus.apply(800.0) - 800.0).abs() < 1e-9);
        assert!(Activation::Softplus.apply(-800.0) >= 0.0);
    }

    #[test]
    fn test_two_layer_network() {
        // hidden = relu([x0, -x0]), out = h0 + h1 = |x0|
        let net = DenseNetwork::from_spec(NetworkSpec {
            layers: vec![
                LayerSpec {
                    weights: vec![vec![1.0, -1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                LayerSpec {
                    weights: vec![vec![1.0], vec![1.0]],
                    bias: vec![0.0],
                    activation: Activation::Linear,
                },
            ],
        })
        .unwrap();
        assert_eq!(net.predict(Array1::from(vec![-3.0]).view()).unwrap(), 3.0);
        assert_eq!(net.predict(Array1::from(vec![2.0]).view()).unwrap(), 2.0);
    }

    #[test]
    fn test_shape_chain_checked() {
        let result = DenseNetwork::from_spec(NetworkSpec {
            layers: vec![
                LayerSpec {
                    weights: vec![vec![1.0, 1.0]],
                    bias: vec![0.0, 0.0],
                    activation: Activation::Relu,
                },
                LayerSpec {
                    weights: vec![vec![1.0]],
                    bias: vec![0.0],
                    activation: Activation::Linear,
                },
            ],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_multi_output_rejected() {
        let result = DenseNetwork::from_spec(NetworkSpec {
            layers: vec![LayerSpec {
                weights: vec![vec![1.0, 1.0]],
                bias: vec![0.0, 0.0],
                activation: Activation::Linear,
            }],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_input_width_checked() {
        let net = linear(vec![1.0, 1.0], 0.0, Activation::Linear);
        assert_eq!(
            net.predict(Array1::from(vec![1.0]).view()),
            Err(ScoringError::InputWidth { expected: 2, actual: 1 })
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let net = linear(vec![f64::MAX], f64::MAX, Activation::Linear);
        assert_eq!(
            net.predict(Array1::from(vec![f64::MAX]).view()),
            Err(ScoringError::NonFinite)
        );
    }

    #[test]
    fn test_spec_parses_from_json() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{"layers": [{"weights": [[0.5], [0.5]], "bias": [0.1], "activation": "softplus"}]}"#,
        )
        .unwrap();
        let net = DenseNetwork::from_spec(spec).unwrap();
        assert_eq!(net.input_width(), 2);
    }
}
