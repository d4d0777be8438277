//! Fully-connected encoder with a transposed convolutional decoder.

pub use super::*;
pub use burn::{
    module::Ignored,
    nn::conv::{ConvTranspose2d, ConvTranspose2dConfig},
    tensor::{
        module::interpolate,
        ops::{InterpolateMode, InterpolateOptions},
    },
};

/// The activation after the decoder.
#[derive(Config, Debug, PartialEq, Eq)]
pub enum DecoderActivation {
    /// Non-negative and unbounded.
    Relu,
    /// In `(0, 1)`.
    Sigmoid,
}

/// The configuration for [`MlpConv`].
#[derive(Config, Debug)]
pub struct MlpConvConfig {
    /// Input dimension.
    pub dim_input: usize,
    /// Side length of the PSFs, a multiple of 4.
    pub kernel_size: usize,
    /// Channel count of the PSFs.
    #[config(default = 1)]
    pub channel_count: usize,
    /// Activation applied to the decoded PSFs.
    #[config(default = "DecoderActivation::Relu")]
    pub activation: DecoderActivation,
}

/// Network for PSFs of large kernels.
///
/// ## Details
///
/// The encoder `in -> 256 -> 256 -> 512 -> C * (ks / 4)^2` produces a coarse
/// `[C, ks / 4, ks / 4]` image, which the decoder refines with five
/// `3 x 3` transposed convolutions and doubles twice by nearest upsampling.
#[derive(Debug, Module)]
pub struct MlpConv<B: Backend> {
    /// Linear layers of the encoder.
    pub encoder: Vec<Linear<B>>,
    /// Transposed convolutions of the decoder.
    pub decoder: Vec<ConvTranspose2d<B>>,
    /// Final activation.
    pub activation: Ignored<DecoderActivation>,
    /// `ks`
    pub kernel_size: usize,
    /// `C`
    pub channel_count: usize,
}

impl MlpConvConfig {
    /// Initialize from the configuration.
    pub fn init<B: Backend>(
        &self,
        device: &B::Device,
    ) -> Result<MlpConv<B>, Error> {
        if self.kernel_size == 0 || self.kernel_size % 4 != 0 {
            return Err(Error::Validation(
                format!("kernel_size ({})", self.kernel_size),
                "a positive multiple of 4".into(),
            ));
        }
        if self.channel_count == 0 {
            return Err(Error::Validation(
                "channel_count (0)".into(),
                "positive".into(),
            ));
        }

        let kernel_size_coarse = self.kernel_size / 4;
        let channel_count = self.channel_count;

        let encoder = [
            self.dim_input,
            256,
            256,
            512,
            channel_count * kernel_size_coarse * kernel_size_coarse,
        ]
        .windows(2)
        .map(|dims| {
            let mut layer = LinearConfig::new(dims[0], dims[1])
                .with_initializer(INITIALIZER_KAIMING_UNIFORM)
                .init(device);
            layer.bias = zero_bias(layer.bias);
            layer
        })
        .collect();

        let decoder = [channel_count, 64, 64, 64, 64, channel_count]
            .windows(2)
            .map(|channels| {
                let bound = xavier_bound(channels[0], channels[1], [3, 3]);
                let mut layer = ConvTranspose2dConfig::new([channels[0], channels[1]], [3, 3])
                    .with_padding([1, 1])
                    .with_initializer(Initializer::Uniform {
                        min: -bound,
                        max: bound,
                    })
                    .init(device);
                layer.bias = zero_bias(layer.bias);
                layer
            })
            .collect();

        Ok(MlpConv {
            encoder,
            decoder,
            activation: Ignored(self.activation.to_owned()),
            kernel_size: self.kernel_size,
            channel_count,
        })
    }
}

impl<B: Backend> MlpConv<B> {
    /// Applies the forward pass on the input tensor.
    ///
    /// ## Shapes
    ///
    /// * `input` - `[N, dim_input]`
    /// * `output` - `[N, C, ks, ks]`
    pub fn forward(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 4> {
        let [point_count, _] = input.dims();
        let kernel_size_coarse = self.kernel_size / 4;

        let mut input = input;
        let encoder_last = self.encoder.len().saturating_sub(1);
        for (index, layer) in self.encoder.iter().enumerate() {
            input = layer.forward(input);
            if index < encoder_last {
                input = activation::relu(input);
            }
        }

        // [N, C, ks / 4, ks / 4]
        let mut image = input.reshape([
            point_count,
            self.channel_count,
            kernel_size_coarse,
            kernel_size_coarse,
        ]);

        let decoder_last = self.decoder.len().saturating_sub(1);
        for (index, layer) in self.decoder.iter().enumerate() {
            image = layer.forward(image);
            if index < decoder_last {
                image = activation::relu(image);
            }
            if index == 1 || index == 3 {
                image = upsample(image);
            }
        }

        match *self.activation {
            DecoderActivation::Relu => activation::relu(image),
            DecoderActivation::Sigmoid => activation::sigmoid(image),
        }
    }
}

impl<B: Backend> PsfSurrogate<B> for MlpConv<B> {
    /// The channels are flattened into the leading axis, `[N * C, ks, ks]`.
    fn forward_psf(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 3> {
        self.forward(input).flatten(0, 1)
    }
}

/// Xavier uniform bound of a convolution, `sqrt(6 / (fan_in + fan_out))`.
fn xavier_bound(
    channels_input: usize,
    channels_output: usize,
    kernel_size: [usize; 2],
) -> f64 {
    let receptive_field = (kernel_size[0] * kernel_size[1]) as f64;
    let fan_sum = (channels_input + channels_output) as f64 * receptive_field;
    (6.0 / fan_sum).sqrt()
}

/// Doubling the spatial size of `[N, C, H, W]` with nearest neighbors.
fn upsample<B: Backend>(image: Tensor<B, 4>) -> Tensor<B, 4> {
    let [_, _, height, width] = image.dims();
    interpolate(
        image,
        [height * 2, width * 2],
        InterpolateOptions::new(InterpolateMode::Nearest),
    )
}
