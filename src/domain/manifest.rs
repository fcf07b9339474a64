// ============================================================
// Layer 3 — Export Manifest (model_summary.json)
// ============================================================
// Describes where every exported parameter went:
//
//   {
//       "input_shape": "(None, 1, 32, 32)",
//       "output_shape": "(None, 2)",
//       "layers": [
//           {
//               "name": "conv1",
//               "type": "Conv2d",
//               "output_shape": "(None, 32, 30, 30)",
//               "trainable": true,
//               "weights": { "shape": "(32, 1, 3, 3)", "file": "layer_0_conv1_weights.mem" },
//               "biases":  { "shape": "(32,)",        "file": "layer_0_conv1_biases.mem" }
//           },
//           ...
//       ]
//   }
//
// Shapes are rendered as tuple strings with a leading `None`
// for the batch dimension, so the JSON reads the same way for
// every layer whether or not it has parameters.

use serde::{Deserialize, Serialize};

/// Sentinel recorded when a layer's output shape is not known
pub const UNKNOWN_SHAPE: &str = "unknown";

/// Render a shape as a tuple string: `(32, 1, 3, 3)`, `(32,)`, `()`.
pub fn shape_tuple(dims: &[usize]) -> String {
    match dims {
        []    => "()".to_string(),
        [one] => format!("({one},)"),
        _     => {
            let parts: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
            format!("({})", parts.join(", "))
        }
    }
}

/// Render a per-sample shape with a leading batch placeholder:
/// `[1, 32, 32]` → `(None, 1, 32, 32)`.
pub fn batched_shape_tuple(dims: &[usize]) -> String {
    let mut parts = vec!["None".to_string()];
    parts.extend(dims.iter().map(|d| d.to_string()));
    format!("({})", parts.join(", "))
}

/// Where one parameter tensor was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamEntry {
    pub shape: String,
    pub file:  String,
}

/// One layer of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub output_shape: String,
    pub trainable: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub weights: Option<ParamEntry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub biases: Option<ParamEntry>,
}

impl LayerEntry {
    /// `output_shape` of `None` becomes the "unknown" sentinel.
    pub fn new(
        name:         impl Into<String>,
        kind:         impl Into<String>,
        output_shape: Option<&[usize]>,
        trainable:    bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            output_shape: output_shape
                .map(batched_shape_tuple)
                .unwrap_or_else(|| UNKNOWN_SHAPE.to_string()),
            trainable,
            weights: None,
            biases:  None,
        }
    }
}

/// The whole manifest. Layers are appended in model order and the
/// struct is serialised once at the end of an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub input_shape:  String,
    pub output_shape: String,
    pub layers:       Vec<LayerEntry>,
}

impl ModelManifest {
    pub fn new(input_shape: &[usize], output_shape: &[usize]) -> Self {
        Self {
            input_shape:  batched_shape_tuple(input_shape),
            output_shape: batched_shape_tuple(output_shape),
            layers:       Vec::new(),
        }
    }

    pub fn push(&mut self, layer: LayerEntry) {
        self.layers.push(layer);
    }

    /// Pretty JSON with four-space indentation.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
