// ============================================================
// Layer 5 — Parameter Extraction
// ============================================================
// Walks FallCnn in forward order and copies every parameter
// tensor out of Burn into plain `ParamTensor`s, each tagged
// with its role. Parameter-free layers (pooling, flatten,
// dropout) are listed too so the manifest mirrors the network.
// Nothing in FallCnn is ever frozen, so every layer, with or
// without parameters, is reported as trainable.
//
// Tensor layouts are Burn's native ones, flattened row-major:
//
//   Conv2d weight  [out_channels, in_channels, kh, kw]
//   Linear weight  [d_input, d_output]
//   bias           [out]
//
// Output shapes are per-sample and derived from the actual
// weight dimensions; a stage that would shrink to nothing is
// reported as unknown instead of failing the export.

use anyhow::{anyhow, Result};
use burn::{
    nn::{conv::Conv2d, Linear},
    prelude::*,
};

use crate::domain::param::{LayerParams, ParamRole, ParamTensor};
use crate::domain::traits::ParameterSource;
use crate::ml::model::{conv_side, pool_side, FallCnn};

fn tensor_values<B: Backend, const D: usize>(role: ParamRole, tensor: Tensor<B, D>) -> Result<ParamTensor> {
    let shape = tensor.dims().to_vec();
    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|e| anyhow!("Cannot read {role} tensor data: {e:?}"))?;
    Ok(ParamTensor::new(role, shape, values))
}

fn conv_params<B: Backend>(conv: &Conv2d<B>) -> Result<Vec<ParamTensor>> {
    let mut params = vec![tensor_values(ParamRole::Weight, conv.weight.val())?];
    if let Some(bias) = &conv.bias {
        params.push(tensor_values(ParamRole::Bias, bias.val())?);
    }
    Ok(params)
}

fn linear_params<B: Backend>(linear: &Linear<B>) -> Result<Vec<ParamTensor>> {
    let mut params = vec![tensor_values(ParamRole::Weight, linear.weight.val())?];
    if let Some(bias) = &linear.bias {
        params.push(tensor_values(ParamRole::Bias, bias.val())?);
    }
    Ok(params)
}

fn layer(name: &str, kind: &str, shape: Option<Vec<usize>>, params: Vec<ParamTensor>) -> LayerParams {
    params.into_iter().fold(
        LayerParams::new(name, kind)
            .with_output_shape(shape)
            .with_trainable(true),
        LayerParams::with_param,
    )
}

impl<B: Backend> ParameterSource for FallCnn<B> {
    fn input_shape(&self) -> Vec<usize> {
        vec![1, self.image_size, self.image_size]
    }

    fn output_shape(&self) -> Vec<usize> {
        vec![self.fc2.weight.dims()[1]]
    }

    fn layer_params(&self) -> Result<Vec<LayerParams>> {
        let [c1, _, k1, _] = self.conv1.weight.dims();
        let [c2, _, k2, _] = self.conv2.weight.dims();
        let hidden  = self.fc1.weight.dims()[1];
        let classes = self.fc2.weight.dims()[1];

        let s1 = conv_side(self.image_size, k1);
        let p1 = s1.and_then(pool_side);
        let s2 = p1.and_then(|s| conv_side(s, k2));
        let p2 = s2.and_then(pool_side);
        let square = |c: usize, side: Option<usize>| side.map(|s| vec![c, s, s]);

        Ok(vec![
            layer("conv1",   "Conv2d",    square(c1, s1), conv_params(&self.conv1)?),
            layer("pool1",   "MaxPool2d", square(c1, p1), Vec::new()),
            layer("conv2",   "Conv2d",    square(c2, s2), conv_params(&self.conv2)?),
            layer("pool2",   "MaxPool2d", square(c2, p2), Vec::new()),
            layer("flatten", "Flatten",   p2.map(|s| vec![c2 * s * s]), Vec::new()),
            layer("fc1",     "Linear",    Some(vec![hidden]), linear_params(&self.fc1)?),
            layer("dropout", "Dropout",   Some(vec![hidden]), Vec::new()),
            layer("fc2",     "Linear",    Some(vec![classes]), linear_params(&self.fc2)?),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::model::FallCnnConfig;
    use burn::backend::NdArray;

    #[test]
    fn test_layers_in_forward_order_with_tagged_roles() {
        let device = Default::default();
        let model: FallCnn<NdArray> = FallCnnConfig::new().init(&device);
        let layers = model.layer_params().unwrap();

        let names: Vec<&str> = layers.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["conv1", "pool1", "conv2", "pool2", "flatten", "fc1", "dropout", "fc2"]);

        let conv1 = &layers[0];
        assert_eq!(conv1.param(ParamRole::Weight).unwrap().shape, vec![32, 1, 3, 3]);
        assert_eq!(conv1.param(ParamRole::Bias).unwrap().shape, vec![32]);
        assert_eq!(conv1.output_shape, Some(vec![32, 30, 30]));

        let fc1 = &layers[5];
        assert_eq!(fc1.param(ParamRole::Weight).unwrap().shape, vec![64 * 6 * 6, 128]);
        assert_eq!(layers[4].output_shape, Some(vec![2304]));
        assert!(layers.iter().flat_map(|l| &l.params).all(|p| p.is_consistent()));
    }

    #[test]
    fn test_every_layer_is_trainable() {
        let device = Default::default();
        let model: FallCnn<NdArray> = FallCnnConfig::new().with_image_size(16).init(&device);
        let layers = model.layer_params().unwrap();
        for l in &layers {
            assert!(l.trainable, "layer {}", l.name);
        }
        // parameter-free layers included
        assert!(layers.iter().any(|l| l.kind == "MaxPool2d" && l.params.is_empty()));
        assert_eq!(model.input_shape(), vec![1, 16, 16]);
        assert_eq!(model.output_shape(), vec![2]);
    }
}
