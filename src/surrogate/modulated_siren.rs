//! SIREN synthesizer modulated by a latent code.

pub use super::*;

use burn::tensor::Int;

/// The configuration for [`ModulatedSiren`].
#[derive(Config, Debug)]
pub struct ModulatedSirenConfig {
    /// Coordinate dimension.
    #[config(default = 2)]
    pub dim_input: usize,
    /// Hidden dimension.
    pub dim_hidden: usize,
    /// Channel count of the output images.
    #[config(default = 1)]
    pub dim_output: usize,
    /// Latent dimension.
    pub dim_latent: usize,
    /// Count of the modulated sine layers.
    pub layer_count: usize,
    /// `W`
    pub image_width: usize,
    /// `H`
    pub image_height: usize,
    /// Frequency multiplier of the inner layers.
    #[config(default = 1.0)]
    pub w0: f64,
    /// Frequency multiplier of the first layer.
    #[config(default = 30.0)]
    pub w0_initial: f64,
    /// With bias.
    #[config(default = true)]
    pub bias: bool,
    /// Initializing the output layer for ReLU instead of sine.
    #[config(default = true)]
    pub is_outermost_linear: bool,
}

/// Images of `[C, H, W]` generated from latent codes.
///
/// ## Details
///
/// The synthesizer runs on the fixed coordinate grid of [`Self::coordinates`].
/// After each sine layer, the features are multiplied by the output of the
/// modulator, which sees the latent code and the previous modulation.
/// The output layer is linear and followed by `tanh`.
#[derive(Debug, Module)]
pub struct ModulatedSiren<B: Backend> {
    /// Sine layers of the synthesizer.
    pub synthesizer: Vec<SineLayer<B>>,
    /// Linear layers of the modulator, each followed by ReLU.
    pub modulator: Vec<Linear<B>>,
    /// Output layer of the synthesizer.
    pub output: Linear<B>,
    /// `H`
    pub image_height: usize,
    /// `W`
    pub image_width: usize,
}

impl ModulatedSirenConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<ModulatedSiren<B>, Error> {
        if self.layer_count == 0 {
            return Err(Error::Validation("layer_count (0)".into(), "positive".into()));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return Err(Error::Validation(
                format!("image size ({} x {})", self.image_width, self.image_height),
                "positive".into(),
            ));
        }

        let synthesizer = (0..self.layer_count)
            .map(|index| {
                let is_first = index == 0;
                SineLayerConfig::new(
                    if is_first { self.dim_input } else { self.dim_hidden },
                    self.dim_hidden,
                )
                .with_w0(if is_first { self.w0_initial } else { self.w0 })
                .with_is_first(is_first)
                .with_bias(self.bias)
                .init(device)
            })
            .collect();

        let modulator = (0..self.layer_count)
            .map(|index| {
                let dim_input = if index == 0 {
                    self.dim_latent
                } else {
                    self.dim_latent + self.dim_hidden
                };
                LinearConfig::new(dim_input, self.dim_hidden)
                    .with_initializer(INITIALIZER_KAIMING_NORMAL)
                    .init(device)
            })
            .collect();

        let output = if self.is_outermost_linear {
            LinearConfig::new(self.dim_hidden, self.dim_output)
                .with_initializer(INITIALIZER_KAIMING_NORMAL)
                .init(device)
        } else {
            let bound = SineLayerConfig::new(self.dim_hidden, self.dim_output)
                .with_w0(self.w0)
                .weight_bound();
            LinearConfig::new(self.dim_hidden, self.dim_output)
                .with_bias(self.bias)
                .with_initializer(Initializer::Uniform {
                    min: -bound,
                    max: bound,
                })
                .init(device)
        };

        Ok(ModulatedSiren {
            synthesizer,
            modulator,
            output,
            image_height: self.image_height,
            image_width: self.image_width,
        })
    }
}

impl<B: Backend> ModulatedSiren<B> {
    /// Applies the forward pass on the latent codes.
    ///
    /// ## Shapes
    ///
    /// * `latent` - `[N, dim_latent]`
    /// * `output` - `[N, C, H, W]`
    pub fn forward(
        &self,
        latent: Tensor<B, 2>,
    ) -> Tensor<B, 4> {
        let [point_count, _] = latent.dims();
        let pixel_count = self.image_height * self.image_width;

        // [N, H * W, 2]
        let coordinates = self.coordinates(&latent.device());
        let [_, dim_input] = coordinates.dims();
        let mut features = coordinates
            .unsqueeze_dim::<3>(0)
            .expand([point_count, pixel_count, dim_input]);

        let mut modulation: Option<Tensor<B, 2>> = None;
        for (synthesizer, modulator) in self.synthesizer.iter().zip(&self.modulator) {
            let input = match modulation {
                Some(modulation) => Tensor::cat(vec![latent.to_owned(), modulation], 1),
                None => latent.to_owned(),
            };
            let scale = activation::relu(modulator.forward(input));

            features = synthesizer.forward(features) * scale.to_owned().unsqueeze_dim(1);
            modulation = Some(scale);
        }

        // [N, H * W, C]
        let output = activation::tanh(self.output.forward(features));
        let [_, _, channel_count] = output.dims();

        output
            .reshape([
                point_count,
                self.image_height,
                self.image_width,
                channel_count,
            ])
            .permute([0, 3, 1, 2])
    }

    /// Pixel coordinates in `[-1, 1]`, row-major.
    ///
    /// The shape is `[H * W, 2]`, each as `(row, col)`.
    pub fn coordinates(
        &self,
        device: &B::Device,
    ) -> Tensor<B, 2> {
        let (height, width) = (self.image_height, self.image_width);

        // [H, W, 1]
        let rows = linspace_unit::<B>(height, device)
            .reshape([height, 1, 1])
            .expand([height, width, 1]);
        let cols = linspace_unit::<B>(width, device)
            .reshape([1, width, 1])
            .expand([height, width, 1]);

        Tensor::cat(vec![rows, cols], 2).reshape([height * width, 2])
    }
}

impl<B: Backend> PsfSurrogate<B> for ModulatedSiren<B> {
    /// The channels are flattened into the leading axis, `[N * C, H, W]`.
    fn forward_psf(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 3> {
        self.forward(input).flatten(0, 1)
    }
}

/// `count` evenly spaced values from `-1` to `1`.
fn linspace_unit<B: Backend>(
    count: usize,
    device: &B::Device,
) -> Tensor<B, 1> {
    let step = if count > 1 {
        2.0 / (count - 1) as f64
    } else {
        0.0
    };
    Tensor::<B, 1, Int>::arange(0..count as i64, device)
        .float()
        .mul_scalar(step)
        .sub_scalar(1.0)
}
