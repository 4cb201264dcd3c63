use std::path::Path;

use ndarray::{Array1, Array2};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use guidepost_feature_contract as contract;

use crate::error::GuidepostError;
use crate::features::FeatureRecord;

/// Persisted model artifact: ordered feature schema, affine scaler, dense
/// layers and the 0-1 → 0-100 output multiplier. One JSON document so the
/// schema can never drift apart from the weights it was trained with.
#[derive(Debug, Deserialize)]
pub struct ModelArtifact {
    pub feature_names: Vec<String>,
    pub scaler: ScalerParams,
    pub layers: Vec<LayerParams>,
    pub output_scale: f64,
}

#[derive(Debug, Deserialize)]
pub struct ScalerParams {
    pub center: Vec<f64>,
    pub scale: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct LayerParams {
    /// Row-major [outputs][inputs].
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

#[derive(Debug)]
struct DenseLayer {
    weights: Array2<f64>,
    bias: Array1<f64>,
}

/// Feed-forward regression wrapper. Validates the artifact schema against
/// the compiled-in feature contract at load time and refuses to serve on
/// any mismatch; prediction itself never fails, clamping absorbs whatever
/// the model produces.
#[derive(Debug)]
pub struct ScorePredictor {
    feature_names: Vec<String>,
    center: Vec<f64>,
    scale: Vec<f64>,
    layers: Vec<DenseLayer>,
    output_scale: f64,
    fingerprint: String,
}

impl ScorePredictor {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GuidepostError> {
        let bytes = std::fs::read(path.as_ref())?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GuidepostError> {
        let artifact: ModelArtifact = serde_json::from_slice(bytes)
            .map_err(|err| GuidepostError::ModelArtifact(format!("invalid artifact json: {err}")))?;
        let fingerprint = sha256_hex(bytes);
        let predictor = Self::from_artifact(artifact, fingerprint)?;
        log::info!(
            "model artifact loaded: {} features, {} layers, fingerprint {} (contract {})",
            predictor.feature_names.len(),
            predictor.layers.len(),
            predictor.fingerprint,
            contract::contract_fingerprint(),
        );
        Ok(predictor)
    }

    fn from_artifact(artifact: ModelArtifact, fingerprint: String) -> Result<Self, GuidepostError> {
        if !contract::schema_matches(&artifact.feature_names) {
            return Err(GuidepostError::SchemaMismatch {
                expected: contract::FEATURE_SCHEMA.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names,
            });
        }

        let width = artifact.feature_names.len();
        if artifact.scaler.center.len() != width || artifact.scaler.scale.len() != width {
            return Err(GuidepostError::ModelArtifact(format!(
                "scaler width {}/{} does not cover {} features",
                artifact.scaler.center.len(),
                artifact.scaler.scale.len(),
                width
            )));
        }
        if artifact.layers.is_empty() {
            return Err(GuidepostError::ModelArtifact("artifact has no layers".to_string()));
        }

        let mut layers = Vec::with_capacity(artifact.layers.len());
        let mut inputs = width;
        for (index, layer) in artifact.layers.iter().enumerate() {
            let outputs = layer.weights.len();
            if outputs == 0 || layer.bias.len() != outputs {
                return Err(GuidepostError::ModelArtifact(format!(
                    "layer {index}: {} bias entries for {} rows",
                    layer.bias.len(),
                    outputs
                )));
            }
            let mut flat = Vec::with_capacity(outputs * inputs);
            for row in &layer.weights {
                if row.len() != inputs {
                    return Err(GuidepostError::ModelArtifact(format!(
                        "layer {index}: row width {} does not match {} inputs",
                        row.len(),
                        inputs
                    )));
                }
                flat.extend_from_slice(row);
            }
            let weights = Array2::from_shape_vec((outputs, inputs), flat)
                .map_err(|err| GuidepostError::ModelArtifact(format!("layer {index}: {err}")))?;
            let bias = Array1::from_vec(layer.bias.clone());
            layers.push(DenseLayer { weights, bias });
            inputs = outputs;
        }
        if inputs != 1 {
            return Err(GuidepostError::ModelArtifact(format!(
                "final layer emits {inputs} outputs, expected a scalar"
            )));
        }

        Ok(Self {
            feature_names: artifact.feature_names,
            center: artifact.scaler.center,
            scale: artifact.scaler.scale,
            layers,
            output_scale: artifact.output_scale,
            fingerprint,
        })
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Predict the 0-100 accessibility score. The nested layout sub-record
    /// is non-numeric and ignored; missing schema values default to 0;
    /// out-of-range raw outputs are clamped, never rejected.
    pub fn predict(&self, features: &FeatureRecord) -> u8 {
        let mut input = Array1::zeros(self.feature_names.len());
        for (index, name) in self.feature_names.iter().enumerate() {
            let mut value = features.value(name).unwrap_or(0.0);
            if contract::is_skew_feature(name) {
                value = value.ln_1p();
            }
            let scale = if self.scale[index].abs() < f64::EPSILON {
                1.0
            } else {
                self.scale[index]
            };
            input[index] = (value - self.center[index]) / scale;
        }

        let mut activations = input;
        let last = self.layers.len() - 1;
        for (index, layer) in self.layers.iter().enumerate() {
            let mut out = layer.weights.dot(&activations) + &layer.bias;
            if index < last {
                out.mapv_inplace(|v| v.max(0.0));
            }
            activations = out;
        }

        let raw = activations[0] * self.output_scale;
        raw.clamp(0.0, 100.0).round() as u8
    }
}

fn sha256_hex(payload: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
