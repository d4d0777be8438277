//! Neural surrogates of PSF integrals.
//!
//! Once trained against [`forward_integral`](crate::integral::forward_integral),
//! a surrogate is frozen and its inputs are optimized instead, which keeps the
//! whole pipeline smooth and differentiable.

pub mod mlp;
pub mod mlp_conv;
pub mod modulated_siren;
pub mod siren;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    module::{Module, Param},
    nn::{Initializer, Linear, LinearConfig},
    tensor::{activation, backend::Backend, Tensor},
};
pub use mlp::{Mlp, MlpConfig};
pub use mlp_conv::{DecoderActivation, MlpConv, MlpConvConfig};
pub use modulated_siren::{ModulatedSiren, ModulatedSirenConfig};
pub use siren::{SineLayer, SineLayerConfig};

use humansize::{format_size, BINARY};

/// A network predicting PSFs of the same layout as [`forward_integral`](crate::integral::forward_integral).
pub trait PsfSurrogate<B: Backend> {
    /// ## Shapes
    ///
    /// * `input` - `[N, D]`
    /// * `output` - `[N, ks, ks]`
    fn forward_psf(
        &self,
        input: Tensor<B, 2>,
    ) -> Tensor<B, 3>;
}

/// Parameter size of a module.
pub trait ModuleSize<B: Backend>: Module<B> {
    /// Size of the parameters in bytes.
    #[inline]
    fn size(&self) -> usize {
        self.num_params() * size_of::<B::FloatElem>()
    }

    /// Readable size of the parameters.
    #[inline]
    fn size_readable(&self) -> String {
        format_size(self.size(), BINARY.decimal_places(1))
    }
}

impl<B: Backend, M: Module<B>> ModuleSize<B> for M {}

/// He initialization for layers followed by ReLU.
pub(crate) const INITIALIZER_KAIMING_UNIFORM: Initializer = Initializer::KaimingUniform {
    gain: std::f64::consts::SQRT_2,
    fan_out_only: false,
};

/// He initialization for layers followed by ReLU, drawn from a normal distribution.
pub(crate) const INITIALIZER_KAIMING_NORMAL: Initializer = Initializer::KaimingNormal {
    gain: std::f64::consts::SQRT_2,
    fan_out_only: false,
};

/// Zeroing the bias of a layer, which the stock initializers draw like the weights.
pub(crate) fn zero_bias<B: Backend>(
    bias: Option<Param<Tensor<B, 1>>>,
) -> Option<Param<Tensor<B, 1>>> {
    bias.map(|bias| Param::from_tensor(bias.val().zeros_like()))
}
