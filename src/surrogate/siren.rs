//! Sinusoidal representation layers.

pub use super::*;

/// The configuration for [`SineLayer`].
#[derive(Config, Debug)]
pub struct SineLayerConfig {
    /// Input dimension.
    pub dim_input: usize,
    /// Output dimension.
    pub dim_output: usize,
    /// Frequency multiplier.
    #[config(default = 30.0)]
    pub w0: f64,
    /// Constant of the weight bound for the inner layers.
    #[config(default = 6.0)]
    pub c: f64,
    /// Being the first layer of a network.
    #[config(default = false)]
    pub is_first: bool,
    /// With bias.
    #[config(default = true)]
    pub bias: bool,
}

/// `sin(w0 * (W * input + B))`
#[derive(Debug, Module)]
pub struct SineLayer<B: Backend> {
    /// The linear layer.
    pub linear: Linear<B>,
    /// Frequency multiplier.
    pub w0: f64,
}

impl SineLayerConfig {
    /// The bound of the uniform weights.
    ///
    /// `1 / dim_input` for the first layer, `sqrt(c / dim_input) / w0` otherwise.
    pub fn weight_bound(&self) -> f64 {
        let dim_input = self.dim_input as f64;
        if self.is_first {
            dim_input.recip()
        } else {
            (self.c / dim_input).sqrt() / self.w0
        }
    }

    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> SineLayer<B> {
        let bound = self.weight_bound();
        let linear = LinearConfig::new(self.dim_input, self.dim_output)
            .with_bias(self.bias)
            .with_initializer(Initializer::Uniform {
                min: -bound,
                max: bound,
            })
            .init(device);

        SineLayer {
            linear,
            w0: self.w0,
        }
    }
}

impl<B: Backend> SineLayer<B> {
    /// Applies the forward pass on the input tensor.
    ///
    /// ## Shapes
    ///
    /// * `input` - [`[..., dim_input]`](SineLayerConfig::dim_input)
    /// * `output` - [`[..., dim_output]`](SineLayerConfig::dim_output)
    pub fn forward<const D: usize>(
        &self,
        input: Tensor<B, D>,
    ) -> Tensor<B, D> {
        self.linear.forward(input).mul_scalar(self.w0).sin()
    }
}
