//! Fully-connected surrogate.

pub use super::*;

/// The configuration for [`Mlp`].
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub dim_input: usize,
    /// Output dimension, `ks * ks` for a PSF.
    pub dim_output: usize,
    /// Hidden dimension.
    #[config(default = 64)]
    pub dim_hidden: usize,
    /// Count of the extra hidden layers of [`Self::dim_hidden`].
    #[config(default = 3)]
    pub hidden_layer_count: usize,
}

/// All-linear network for PSFs of small kernels.
///
/// `in -> hidden / 4 -> hidden -> (hidden -> hidden) * L -> out`
///
/// ## Details
///
/// Hidden layers are followed by ReLU, the last one by sigmoid.
/// The output is L1-normalized along the last axis, so every PSF has unit energy.
#[derive(Debug, Module)]
pub struct Mlp<B: Backend> {
    /// Linear layers.
    pub layers: Vec<Linear<B>>,
}

impl MlpConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Mlp<B> {
        let dims = [self.dim_input, (self.dim_hidden / 4).max(1)]
            .into_iter()
            .chain(std::iter::repeat(self.dim_hidden).take(self.hidden_layer_count + 1))
            .chain([self.dim_output])
            .collect::<Vec<_>>();

        let layers = dims
            .windows(2)
            .map(|dims| {
                let mut layer = LinearConfig::new(dims[0], dims[1])
                    .with_initializer(INITIALIZER_KAIMING_UNIFORM)
                    .init(device);
                layer.bias = zero_bias(layer.bias);
                layer
            })
            .collect();

        Mlp { layers }
    }
}

impl<B: Backend> Mlp<B> {
    /// Applies the forward pass on the input tensor.
    ///
    /// ## Shapes
    ///
    /// * `input` - [`[..., dim_input]`](MlpConfig::dim_input)
    /// * `output` - [`[..., dim_output]`](MlpConfig::dim_output)
    pub fn forward<const D: usize>(
        &self,
        mut input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        let layer_last = self.layers.len().saturating_sub(1);
        for (index, layer) in self.layers.iter().enumerate() {
            input = layer.forward(input);
            input = if index < layer_last {
                activation::relu(input)
            } else {
                activation::sigmoid(input)
            };
        }

        let norm = input.to_owned().abs().sum_dim(D - 1).clamp_min(1e-12);
        input / norm
    }
}

impl<B: Backend> PsfSurrogate<B> for Mlp<B> {
    fn forward_psf(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 3> {
        let output = self.forward(input);
        let [point_count, dim_output] = output.dims();
        let kernel_size = (dim_output as f64).sqrt().round() as usize;
        debug_assert_eq!(
            kernel_size * kernel_size,
            dim_output,
            "dim_output should be a square number"
        );
        output.reshape([point_count, kernel_size, kernel_size])
    }
}
