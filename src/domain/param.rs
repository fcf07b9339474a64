// ============================================================
// Layer 3 — Tagged Layer Parameters
// ============================================================
// A framework-neutral snapshot of one model layer: its name,
// type, output shape and parameter tensors as plain f32 data.
//
// Each ParamTensor carries its role explicitly. The exporter
// never infers "weights" vs "biases" from the position of a
// tensor in a list, so a layer that exposes a bias without a
// kernel (or in a different order) still exports correctly.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of a parameter tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamRole {
    Weight,
    Bias,
}

impl ParamRole {
    /// Plural label used in file names and manifest keys
    pub fn label(self) -> &'static str {
        match self {
            ParamRole::Weight => "weights",
            ParamRole::Bias   => "biases",
        }
    }
}

impl fmt::Display for ParamRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One parameter tensor, flattened row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamTensor {
    pub role:   ParamRole,
    pub shape:  Vec<usize>,
    pub values: Vec<f32>,
}

impl ParamTensor {
    pub fn new(role: ParamRole, shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { role, shape, values }
    }

    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// True when the flat data length agrees with the shape
    pub fn is_consistent(&self) -> bool {
        self.element_count() == self.values.len()
    }
}

/// A layer as seen by the exporter.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerParams {
    pub name:         String,
    pub kind:         String,
    /// Per-sample output shape; `None` when it cannot be derived
    pub output_shape: Option<Vec<usize>>,
    pub trainable:    bool,
    pub params:       Vec<ParamTensor>,
}

impl LayerParams {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name:         name.into(),
            kind:         kind.into(),
            output_shape: None,
            trainable:    true,
            params:       Vec::new(),
        }
    }

    pub fn with_output_shape(mut self, shape: Option<Vec<usize>>) -> Self {
        self.output_shape = shape;
        self
    }

    pub fn with_trainable(mut self, trainable: bool) -> Self {
        self.trainable = trainable;
        self
    }

    pub fn with_param(mut self, param: ParamTensor) -> Self {
        self.params.push(param);
        self
    }

    pub fn param(&self, role: ParamRole) -> Option<&ParamTensor> {
        self.params.iter().find(|p| p.role == role)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_labels() {
        assert_eq!(ParamRole::Weight.label(), "weights");
        assert_eq!(ParamRole::Bias.to_string(), "biases");
    }

    #[test]
    fn test_lookup_by_role_ignores_order() {
        let layer = LayerParams::new("fc", "Linear")
            .with_param(ParamTensor::new(ParamRole::Bias, vec![2], vec![0.1, 0.2]))
            .with_param(ParamTensor::new(ParamRole::Weight, vec![1, 2], vec![1.0, 2.0]));
        assert_eq!(layer.param(ParamRole::Weight).unwrap().shape, vec![1, 2]);
        assert_eq!(layer.param(ParamRole::Bias).unwrap().values, vec![0.1, 0.2]);
    }

    #[test]
    fn test_consistency_check() {
        assert!(ParamTensor::new(ParamRole::Weight, vec![2, 3], vec![0.0; 6]).is_consistent());
        assert!(!ParamTensor::new(ParamRole::Weight, vec![2, 3], vec![0.0; 5]).is_consistent());
    }
}
