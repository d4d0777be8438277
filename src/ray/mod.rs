//! Ray bundles handed over by an upstream ray tracer.

pub use crate::error::Error;
pub use burn::tensor::{backend::Backend, Tensor, TensorData};

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::fmt;

/// Samples of `N` point sources, `S` rays each.
///
/// Every field shares the leading `[S, N]` layout.
/// A single point source is a bundle with `N = 1`, see [`RayBundle::single`].
#[derive(Clone)]
pub struct RayBundle<B: Backend> {
    /// Ray origins on the image plane.
    ///
    /// The shape is `[S, N, 3]`.
    pub origins: Tensor<B, 3>,
    /// Unit ray directions.
    ///
    /// The shape is `[S, N, 3]`.
    pub directions: Tensor<B, 3>,
    /// Validity weights in `[0, 1]`, `0` marks a dead ray.
    ///
    /// The shape is `[S, N]`.
    pub amplitudes: Tensor<B, 2>,
    /// Phases in radians, only needed for coherent integration.
    ///
    /// The shape is `[S, N]`.
    pub phases: Option<Tensor<B, 2>>,
}

impl<B: Backend> RayBundle<B> {
    pub fn new(
        origins: Tensor<B, 3>,
        directions: Tensor<B, 3>,
        amplitudes: Tensor<B, 2>,
    ) -> Result<Self, Error> {
        let [sample_count, point_count, dim] = origins.dims();
        if dim != 3 {
            return Err(Error::MismatchedShape(
                format!("origins.dims() ({:?})", origins.dims()),
                format!("[{sample_count}, {point_count}, 3]"),
            ));
        }
        if directions.dims() != [sample_count, point_count, 3] {
            return Err(Error::MismatchedShape(
                format!("directions.dims() ({:?})", directions.dims()),
                format!("[{sample_count}, {point_count}, 3]"),
            ));
        }
        if amplitudes.dims() != [sample_count, point_count] {
            return Err(Error::MismatchedShape(
                format!("amplitudes.dims() ({:?})", amplitudes.dims()),
                format!("[{sample_count}, {point_count}]"),
            ));
        }

        Ok(Self {
            origins,
            directions,
            amplitudes,
            phases: None,
        })
    }

    /// Bundle of one point source.
    ///
    /// ## Shapes
    ///
    /// * `origins` - `[S, 3]`
    /// * `directions` - `[S, 3]`
    /// * `amplitudes` - `[S]`
    pub fn single(
        origins: Tensor<B, 2>,
        directions: Tensor<B, 2>,
        amplitudes: Tensor<B, 1>,
    ) -> Result<Self, Error> {
        Self::new(
            origins.unsqueeze_dim(1),
            directions.unsqueeze_dim(1),
            amplitudes.unsqueeze_dim(1),
        )
    }

    /// Attaching per-sample phases of shape `[S, N]`.
    pub fn with_phases(
        mut self,
        phases: Tensor<B, 2>,
    ) -> Result<Self, Error> {
        let dims = self.amplitudes.dims();
        if phases.dims() != dims {
            return Err(Error::MismatchedShape(
                format!("phases.dims() ({:?})", phases.dims()),
                format!("{dims:?}"),
            ));
        }
        self.phases = Some(phases);
        Ok(self)
    }

    /// Synthetic bundle of Gaussian spots, one per center.
    ///
    /// Each spot has `sample_count` rays scattered around its center
    /// with the standard deviation `sigma` on both axes.
    /// The rays are all alive and travel along the optical axis.
    pub fn gaussian_spots(
        centers: &[[f64; 2]],
        sample_count: usize,
        sigma: f64,
        seed: u64,
        device: &B::Device,
    ) -> Result<Self, Error> {
        let normal = Normal::new(0.0, sigma).map_err(|_| {
            Error::Validation(format!("sigma ({sigma})"), "finite and non-negative".into())
        })?;
        let rng = &mut StdRng::seed_from_u64(seed);
        let point_count = centers.len();

        // [S, N, 3]
        let mut origins = Vec::with_capacity(sample_count * point_count * 3);
        for _ in 0..sample_count {
            for center in centers {
                // The image-plane point is the negated origin
                origins.push(-(center[0] + normal.sample(rng)));
                origins.push(-(center[1] + normal.sample(rng)));
                origins.push(0.0);
            }
        }
        let directions = [0.0, 0.0, 1.0].repeat(sample_count * point_count);

        Self::new(
            Tensor::from_data(
                TensorData::new(origins, [sample_count, point_count, 3])
                    .convert::<B::FloatElem>(),
                device,
            ),
            Tensor::from_data(
                TensorData::new(directions, [sample_count, point_count, 3])
                    .convert::<B::FloatElem>(),
                device,
            ),
            Tensor::ones([sample_count, point_count], device),
        )
    }
}

/// Attribute getters
impl<B: Backend> RayBundle<B> {
    /// `S`
    #[inline]
    pub fn sample_count(&self) -> usize {
        self.amplitudes.dims()[0]
    }

    /// `N`
    #[inline]
    pub fn point_count(&self) -> usize {
        self.amplitudes.dims()[1]
    }

    #[inline]
    pub fn device(&self) -> B::Device {
        self.origins.device()
    }

    /// Image-plane points of the samples.
    ///
    /// The shape is `[S, N, 2]`.
    ///
    /// They are the negated `(x, y)` of the origins, which moves the optical
    /// axis origin into the detector frame.
    pub fn points_2d(&self) -> Tensor<B, 3> {
        let [sample_count, point_count, _] = self.origins.dims();
        if sample_count == 0 || point_count == 0 {
            return Tensor::zeros([sample_count, point_count, 2], &self.device());
        }

        -self
            .origins
            .to_owned()
            .slice([0..sample_count, 0..point_count, 0..2])
    }

    /// Obliquity factors, the squared z-components of the directions.
    ///
    /// The shape is `[S, N]`.
    pub fn obliquities(&self) -> Tensor<B, 2> {
        let [sample_count, point_count, _] = self.directions.dims();
        if sample_count == 0 || point_count == 0 {
            return Tensor::zeros([sample_count, point_count], &self.device());
        }

        self.directions
            .to_owned()
            .slice([0..sample_count, 0..point_count, 2..3])
            .squeeze::<2>(2)
            .powf_scalar(2.0)
    }

    /// The bundle of the `index`-th point source alone (`N = 1`).
    pub fn point(
        &self,
        index: usize,
    ) -> Result<Self, Error> {
        let [sample_count, point_count] = self.amplitudes.dims();
        if index >= point_count {
            return Err(Error::Validation(
                format!("point index ({index})"),
                format!("less than {point_count}"),
            ));
        }

        if sample_count == 0 {
            let device = self.device();
            return Ok(Self {
                origins: Tensor::zeros([0, 1, 3], &device),
                directions: Tensor::zeros([0, 1, 3], &device),
                amplitudes: Tensor::zeros([0, 1], &device),
                phases: self
                    .phases
                    .as_ref()
                    .map(|_| Tensor::zeros([0, 1], &device)),
            });
        }

        let range = index..index + 1;
        Ok(Self {
            origins: self
                .origins
                .to_owned()
                .slice([0..sample_count, range.to_owned(), 0..3]),
            directions: self
                .directions
                .to_owned()
                .slice([0..sample_count, range.to_owned(), 0..3]),
            amplitudes: self
                .amplitudes
                .to_owned()
                .slice([0..sample_count, range.to_owned()]),
            phases: self
                .phases
                .as_ref()
                .map(|phases| phases.to_owned().slice([0..sample_count, range])),
        })
    }
}

impl<B: Backend> fmt::Debug for RayBundle<B> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("RayBundle<{}>", B::name()))
            .field("origins.dims()", &self.origins.dims())
            .field("directions.dims()", &self.directions.dims())
            .field("amplitudes.dims()", &self.amplitudes.dims())
            .field("phases.is_some()", &self.phases.is_some())
            .finish()
    }
}
