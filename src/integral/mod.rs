//! Monte-Carlo integration of ray bundles into point spread functions.

pub use crate::{
    consts::{EPSILON, MASK_MARGIN},
    error::Error,
    ray::RayBundle,
    splat::{assign_points_to_pixels, ComplexGrid, PixelGrid, SplatInput, SplatOptions},
};
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};

/// The configuration for [`forward_integral`].
#[derive(Config, Debug)]
pub struct IntegralOptions {
    /// Side length of the PSF, `ks`.
    pub kernel_size: usize,
    /// Physical size of a pixel, `ps`.
    pub pixel_size: f64,
    /// Splatting bilinearly. See [`SplatOptions::interpolate`].
    #[config(default = true)]
    pub interpolate: bool,
    /// Reference center `(x, y)` shared by all the points,
    /// e.g. from the chief ray or the perspective projection.
    ///
    /// If it is `None`, each point is centered at its energy-weighted centroid.
    #[config(default = "None")]
    pub center: Option<[f64; 2]>,
}

/// Centered and masked samples of all the points.
#[derive(Clone, Debug)]
struct SampleSets<B: Backend> {
    /// `[S, N, 2]`
    pub points: Tensor<B, 3>,
    /// `[S, N]`
    pub amplitudes: Tensor<B, 2>,
    /// `[S, N]`
    pub phases: Option<Tensor<B, 2>>,
    /// `[S, N]`
    pub obliquities: Tensor<B, 2>,
}

impl IntegralOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.kernel_size < 2 {
            return Err(Error::InvalidKernelSize(self.kernel_size));
        }
        if !(self.pixel_size.is_finite() && self.pixel_size > 0.0) {
            return Err(Error::Validation(
                format!("pixel_size ({})", self.pixel_size),
                "finite and positive".into(),
            ));
        }
        if let Some(center) = self.center {
            if !center.iter().all(|c| c.is_finite()) {
                return Err(Error::Validation(
                    format!("center ({center:?})"),
                    "finite".into(),
                ));
            }
        }

        Ok(())
    }

    /// The PSF window, `[-ks / 2 + 0.5, ks / 2 - 0.5] * ps`.
    ///
    /// The window spans the centers of the first and the last pixels,
    /// so the splatting keeps the pixel size exactly `ps`.
    #[inline]
    pub fn psf_range(&self) -> [f64; 2] {
        psf_range(self.kernel_size, self.pixel_size)
    }

    /// Options of the splatting on the PSF window.
    #[inline]
    pub fn splat_options(&self) -> SplatOptions {
        let range = self.psf_range();
        SplatOptions::new(self.kernel_size, range, range).with_interpolate(self.interpolate)
    }
}

/// `[-ks / 2 + 0.5, ks / 2 - 0.5] * ps`
#[inline]
pub fn psf_range(
    kernel_size: usize,
    pixel_size: f64,
) -> [f64; 2] {
    let half = kernel_size as f64 / 2.0 - 0.5;
    [-half * pixel_size, half * pixel_size]
}

/// Integrate the incoherent PSF of every point.
///
/// ## Shapes
///
/// * `output` - `[N, ks, ks]`
///
/// ## Details
///
/// The `i`-th PSF always belongs to the `i`-th point.
/// A point without any valid sample has an all-zero PSF.
pub fn forward_integral<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
) -> Result<Tensor<B, 3>, Error> {
    validate(rays, options, false)?;
    if let Some(psfs) = empty_psfs(rays, options) {
        return Ok(psfs);
    }

    let samples = prepare(rays, options, false);
    let splat_options = options.splat_options();

    let psfs = (0..rays.point_count())
        .map(|index| {
            assign_points_to_pixels(samples.point(index), &splat_options)
                .map(PixelGrid::intensity)
        })
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(debug_assertions)]
    log::debug!(target: "psfsplat::integral", "forward_integral: {} PSFs", psfs.len());

    Ok(Tensor::stack(psfs, 0))
}

/// Integrate the incoherent PSF of a single point.
///
/// ## Shapes
///
/// * `output` - `[ks, ks]`
pub fn forward_integral_single<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
) -> Result<Tensor<B, 2>, Error> {
    let point_count = rays.point_count();
    if point_count != 1 {
        return Err(Error::MismatchedShape(
            format!("rays.point_count() ({point_count})"),
            "1".into(),
        ));
    }

    Ok(forward_integral(rays, options)?.squeeze(0))
}

/// Integrate the coherent PSF of every point from the phases of the rays.
///
/// ## Shapes
///
/// * `output` - `[N, ks, ks]` of complex values
pub fn forward_integral_coherent<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
) -> Result<ComplexGrid<B, 3>, Error> {
    validate(rays, options, true)?;
    if let Some(psfs) = empty_psfs(rays, options) {
        return Ok(ComplexGrid {
            real: psfs.to_owned(),
            imag: psfs,
        });
    }

    let samples = prepare(rays, options, true);
    let splat_options = options.splat_options();

    let psfs = (0..rays.point_count())
        .map(|index| {
            assign_points_to_pixels(samples.point(index), &splat_options)?
                .into_coherent()
                .ok_or_else(|| {
                    Error::Validation("the PSF".into(), "coherent".into())
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    #[cfg(debug_assertions)]
    log::debug!(
        target: "psfsplat::integral",
        "forward_integral_coherent: {} PSFs",
        psfs.len(),
    );

    Ok(ComplexGrid::stack(psfs))
}

/// Energy-weighted centroids of the points.
///
/// `Σ(p · a) / (Σa + ε)` over the samples.
///
/// ## Shapes
///
/// * `points` - `[S, N, 2]`
/// * `amplitudes` - `[S, N]`
/// * `output` - `[N, 2]`
pub fn centroid<B: Backend>(
    points: Tensor<B, 3>,
    amplitudes: Tensor<B, 2>,
) -> Tensor<B, 2> {
    // [S, N, 1]
    let weights = amplitudes.unsqueeze_dim::<3>(2);
    let weighted_sum = (points * weights.to_owned()).sum_dim(0);
    let weight_sum = weights.sum_dim(0).add_scalar(EPSILON);
    (weighted_sum / weight_sum).squeeze(0)
}

/// Exclude the samples outside the window of the half width `half_width`.
///
/// A sample is kept only if `|x|` and `|y|` are both below
/// `half_width - MASK_MARGIN * pixel_size`.
/// The excluded samples get zero amplitudes and are moved to the origin,
/// so the shapes are unchanged and every sample stays on the grid.
///
/// ## Shapes
///
/// * `points` - `[S, N, 2]`
/// * `amplitudes` - `[S, N]`
/// * `output` - (`[S, N, 2]`, `[S, N]`)
pub fn mask_outside<B: Backend>(
    points: Tensor<B, 3>,
    amplitudes: Tensor<B, 2>,
    half_width: f64,
    pixel_size: f64,
) -> (Tensor<B, 3>, Tensor<B, 2>) {
    let [sample_count, point_count, _] = points.dims();
    let bound = half_width - MASK_MARGIN * pixel_size;

    // [S, N, 2]
    let is_inside = points.to_owned().abs().lower_elem(bound).float();
    // [S, N, 1]
    let is_inside = is_inside
        .to_owned()
        .slice([0..sample_count, 0..point_count, 0..1])
        * is_inside.slice([0..sample_count, 0..point_count, 1..2]);

    let points = points * is_inside.to_owned();
    let amplitudes = amplitudes * is_inside.squeeze(2);
    (points, amplitudes)
}

fn validate<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
    is_coherent: bool,
) -> Result<(), Error> {
    options.validate()?;
    if is_coherent && rays.phases.is_none() {
        return Err(Error::Validation(
            "rays.phases".into(),
            "present for coherent integration".into(),
        ));
    }

    Ok(())
}

/// All-zero PSFs of `[N, ks, ks]` if there is no sample or no point.
fn empty_psfs<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
) -> Option<Tensor<B, 3>> {
    let [sample_count, point_count] = rays.amplitudes.dims();
    let kernel_size = options.kernel_size;

    (sample_count == 0 || point_count == 0).then(|| {
        #[cfg(debug_assertions)]
        log::debug!(
            target: "psfsplat::integral",
            "empty_psfs: {sample_count} samples of {point_count} points",
        );

        Tensor::zeros([point_count, kernel_size, kernel_size], &rays.device())
    })
}

/// Center and mask the samples.
///
/// Both `S` and `N` are assumed to be positive.
fn prepare<B: Backend>(
    rays: &RayBundle<B>,
    options: &IntegralOptions,
    is_coherent: bool,
) -> SampleSets<B> {
    let device = rays.device();
    // [S, N, 2]
    let points = rays.points_2d();
    let amplitudes = rays.amplitudes.to_owned();

    // [1, N, 2] or [1, 1, 2]
    let center = match options.center {
        Some(center) => Tensor::<B, 1>::from_floats(center, &device).reshape([1, 1, 2]),
        None => centroid(points.to_owned(), amplitudes.to_owned()).unsqueeze_dim(0),
    };
    #[cfg(debug_assertions)]
    log::debug!(
        target: "psfsplat::integral",
        "prepare: centered by {}",
        if options.center.is_some() { "reference" } else { "centroid" },
    );

    let (points, amplitudes) = mask_outside(
        points - center,
        amplitudes,
        options.psf_range()[1],
        options.pixel_size,
    );
    #[cfg(debug_assertions)]
    log::debug!(target: "psfsplat::integral", "prepare: masked");

    SampleSets {
        points,
        amplitudes,
        phases: if is_coherent { rays.phases.to_owned() } else { None },
        obliquities: rays.obliquities(),
    }
}

impl<B: Backend> SampleSets<B> {
    /// Samples of the `index`-th point.
    fn point(
        &self,
        index: usize,
    ) -> SplatInput<B> {
        let [sample_count, _, _] = self.points.dims();
        let range = index..index + 1;
        let column = |array: &Tensor<B, 2>| {
            array
                .to_owned()
                .slice([0..sample_count, range.to_owned()])
                .squeeze::<1>(1)
        };

        SplatInput {
            points: self
                .points
                .to_owned()
                .slice([0..sample_count, range.to_owned(), 0..2])
                .squeeze(1),
            amplitudes: column(&self.amplitudes),
            phases: self.phases.as_ref().map(column),
            obliquities: Some(column(&self.obliquities)),
        }
    }
}

impl Default for IntegralOptions {
    #[inline]
    fn default() -> Self {
        Self::new(64, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::{backend::NdArray, tensor::TensorData};

    type B = NdArray<f32>;

    /// A bundle of one point from its image-plane points `(x, y)`.
    fn bundle(
        points: &[[f32; 2]],
        amplitudes: &[f32],
    ) -> RayBundle<B> {
        let device = &Default::default();
        let sample_count = points.len();
        let origins = points
            .iter()
            .flat_map(|[x, y]| [-x, -y, 0.0])
            .collect::<Vec<_>>();

        RayBundle::single(
            Tensor::from_data(TensorData::new(origins, [sample_count, 3]), device),
            Tensor::from_data(
                TensorData::new([0.0, 0.0, 1.0].repeat(sample_count), [sample_count, 3]),
                device,
            ),
            Tensor::from_data(TensorData::new(amplitudes.to_vec(), [sample_count]), device),
        )
        .unwrap()
    }

    #[test]
    fn psf_window_spans_whole_pixels() {
        assert_eq!(psf_range(4, 1.0), [-1.5, 1.5]);
        assert_eq!(psf_range(5, 2.0), [-4.0, 4.0]);

        let options = IntegralOptions::new(3, 0.5);
        let splat_options = options.splat_options();
        assert_eq!(splat_options.range_x, [-0.5, 0.5]);
        assert_eq!(splat_options.range_y, [-0.5, 0.5]);
        assert!(splat_options.interpolate);
    }

    #[test]
    fn centroid_of_symmetric_points() {
        let device = &Default::default();

        let points = Tensor::<B, 3>::from_data([[[-1.0, 0.0]], [[1.0, 0.0]]], device);
        let amplitudes = Tensor::<B, 2>::ones([2, 1], device);

        let center = centroid(points.to_owned(), amplitudes);
        center
            .to_owned()
            .into_data()
            .assert_approx_eq(&Tensor::<B, 2>::zeros([1, 2], device).into_data(), 6);

        let shifted = points - center.unsqueeze_dim(0);
        shifted.into_data().assert_approx_eq(
            &Tensor::<B, 3>::from_data([[[-1.0, 0.0]], [[1.0, 0.0]]], device).into_data(),
            6,
        );
    }

    #[test]
    fn nearest_psf_of_four_cell_centers() {
        let device = &Default::default();

        let rays = bundle(
            &[[-0.5, 0.5], [0.5, 0.5], [-0.5, -0.5], [0.5, -0.5]],
            &[1.0; 4],
        );
        let options = IntegralOptions::new(4, 1.0).with_interpolate(false);

        let psf = forward_integral_single(&rays, &options).unwrap();

        let target = Tensor::<B, 2>::from_data(
            [
                [0.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 0.0],
            ],
            device,
        );
        psf.into_data().assert_eq(&target.into_data(), true);
    }

    #[test]
    fn masking_excludes_samples_on_the_window_edge() {
        let device = &Default::default();

        // The half width of a 4-pixel window is 1.5
        let options = IntegralOptions::new(4, 1.0).with_center(Some([0.0, 0.0]));

        let (_, amplitudes) = mask_outside(
            Tensor::<B, 3>::from_data([[[1.5, 0.0]], [[1.48, 0.0]], [[0.0, -1.5]]], device),
            Tensor::ones([3, 1], device),
            options.psf_range()[1],
            options.pixel_size,
        );
        amplitudes.into_data().assert_eq(
            &Tensor::<B, 2>::from_data([[0.0], [1.0], [0.0]], device).into_data(),
            true,
        );

        let psf = forward_integral_single(&bundle(&[[1.5, 0.0]], &[1.0]), &options).unwrap();
        psf.into_data()
            .assert_eq(&Tensor::<B, 2>::zeros([4, 4], device).into_data(), true);

        let psf = forward_integral_single(&bundle(&[[1.48, 0.0]], &[1.0]), &options).unwrap();
        assert!((psf.sum().into_scalar() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn masking_keeps_every_sample_on_the_grid() {
        let device = &Default::default();

        // Wide spots overflowing a small window
        let rays = RayBundle::<B>::gaussian_spots(
            &[[0.0, 0.0], [3.0, -1.0]],
            2048,
            2.0,
            0xB0B,
            device,
        )
        .unwrap();
        let options = IntegralOptions::new(5, 0.5);

        let samples = prepare(&rays, &options, false);
        let bound = options.psf_range()[1] - MASK_MARGIN * options.pixel_size;
        let max = samples.points.abs().max().into_scalar();
        assert!(max < bound as f32, "max: {max}, bound: {bound}");

        // The energy of the PSFs is the count of the kept samples
        let kept = samples.amplitudes.sum_dim(0).squeeze::<1>(0);
        let psfs = forward_integral(&rays, &options).unwrap();
        psfs.sum_dim(2)
            .sum_dim(1)
            .squeeze::<2>(2)
            .squeeze::<1>(1)
            .into_data()
            .assert_approx_eq(&kept.into_data(), 2);
    }

    #[test]
    fn stack_preserves_point_order() {
        let device = &Default::default();

        // One sample per point, each of a distinct amplitude
        let rays = RayBundle::<B>::new(
            Tensor::from_data([[[1.0, 2.0, 0.0], [-4.0, 0.5, 0.0], [8.0, -8.0, 0.0]]], device),
            Tensor::from_data([[[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]]], device),
            Tensor::from_data([[1.0, 2.0, 3.0]], device),
        )
        .unwrap();
        let options = IntegralOptions::new(3, 1.0);

        let psfs = forward_integral(&rays, &options).unwrap();

        let target = Tensor::<B, 3>::from_data(
            [
                [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
                [[0.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 0.0]],
                [[0.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 0.0]],
            ],
            device,
        );
        psfs.into_data().assert_approx_eq(&target.into_data(), 6);
    }

    #[test]
    fn zero_amplitudes_give_zero_psf() {
        let device = &Default::default();

        let rays = bundle(&[[0.3, -0.2], [1.0, 0.7], [-0.4, 0.1]], &[0.0; 3]);
        let options = IntegralOptions::new(4, 1.0);

        let psf = forward_integral_single(&rays, &options).unwrap();

        assert!(!psf.to_owned().is_nan().any().into_scalar());
        psf.into_data()
            .assert_eq(&Tensor::<B, 2>::zeros([4, 4], device).into_data(), true);
    }

    #[test]
    fn reference_center_matches_centroid_after_translation() {
        // The same geometry twice, translated
        let offsets = [[0.25, 0.25], [-0.25, 0.75], [0.25, -0.25], [-0.25, -0.75]];
        let translate = |[tx, ty]: [f32; 2]| {
            offsets
                .iter()
                .map(|[x, y]| [x + tx, y + ty])
                .collect::<Vec<_>>()
        };
        let amplitudes = [1.0; 4];
        let options = IntegralOptions::new(5, 0.5);

        let psf_reference = forward_integral_single(
            &bundle(&translate([1.0, -2.0]), &amplitudes),
            &options.to_owned().with_center(Some([1.0, -2.0])),
        )
        .unwrap();
        let psf_centroid =
            forward_integral_single(&bundle(&translate([3.0, 0.5]), &amplitudes), &options)
                .unwrap();

        assert!(psf_reference.to_owned().sum().into_scalar() > 0.0);
        psf_reference
            .into_data()
            .assert_eq(&psf_centroid.into_data(), true);
    }

    #[test]
    fn coherent_integral_needs_phases() {
        let device = &Default::default();

        let rays = bundle(&[[0.0, 0.0], [0.0, 0.0]], &[1.0, 1.0]);
        let options = IntegralOptions::new(3, 1.0);

        let result = forward_integral_coherent(&rays, &options);
        assert!(matches!(result, Err(Error::Validation(..))));

        // Opposite phases on the same spot interfere destructively
        let rays = rays
            .with_phases(Tensor::from_data([[0.0], [std::f32::consts::PI]], device))
            .unwrap();
        let psfs = forward_integral_coherent(&rays, &options).unwrap();
        assert_eq!(psfs.dims(), [1, 3, 3]);
        psfs.intensity()
            .into_data()
            .assert_approx_eq(&Tensor::<B, 3>::zeros([1, 3, 3], device).into_data(), 5);
    }

    #[test]
    fn invalid_options() {
        let rays = bundle(&[[0.0, 0.0]], &[1.0]);

        let result = forward_integral(&rays, &IntegralOptions::new(1, 1.0));
        assert!(matches!(result, Err(Error::InvalidKernelSize(1))));

        let result = forward_integral(&rays, &IntegralOptions::new(4, 0.0));
        assert!(matches!(result, Err(Error::Validation(..))));

        let rays = RayBundle::<B>::gaussian_spots(
            &[[0.0, 0.0], [1.0, 1.0]],
            4,
            0.1,
            0,
            &Default::default(),
        )
        .unwrap();
        let result = forward_integral_single(&rays, &IntegralOptions::new(4, 1.0));
        assert!(matches!(result, Err(Error::MismatchedShape(..))));
    }

    #[test]
    fn gradients_reach_amplitudes_through_the_integral() {
        use crate::backend::Autodiff;

        type AB = Autodiff<B>;
        let device = &Default::default();

        let amplitudes = Tensor::<AB, 1>::from_data([1.0, 0.5, 0.25], device).require_grad();
        let rays = RayBundle::single(
            Tensor::from_data([[0.2, 0.1, 0.0], [-0.3, 0.0, 0.0], [0.1, -0.1, 0.0]], device),
            Tensor::from_data([[0.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 1.0]], device),
            amplitudes.to_owned(),
        )
        .unwrap();
        let options = IntegralOptions::new(5, 0.5).with_center(Some([0.0, 0.0]));

        let psf = forward_integral_single(&rays, &options).unwrap();
        let grads = psf.sum().backward();

        // Every sample is inside the window, so each one adds its whole amplitude
        amplitudes.grad(&grads).unwrap().into_data().assert_approx_eq(
            &Tensor::<B, 1>::ones([3], device).into_data(),
            5,
        );
    }

    #[test]
    fn gradients_reach_ray_origins_through_the_integral() {
        use crate::backend::Autodiff;

        type AB = Autodiff<B>;
        let device = &Default::default();

        // The image-plane point is (0.3, 0.1)
        let origins = Tensor::<AB, 2>::from_data([[-0.3, -0.1, 0.0]], device).require_grad();
        let rays = RayBundle::single(
            origins.to_owned(),
            Tensor::from_data([[0.0, 0.0, 1.0]], device),
            Tensor::ones([1], device),
        )
        .unwrap();
        // The window is [-1, 1], two columns per unit length
        let options = IntegralOptions::new(5, 0.5).with_center(Some([0.0, 0.0]));

        let psf = forward_integral_single(&rays, &options).unwrap();
        let columns = Tensor::<AB, 1, burn::tensor::Int>::arange(0..5, device)
            .float()
            .unsqueeze_dim::<2>(0)
            .expand([5, 5]);
        let grads = (psf * columns).sum().backward();

        // The column centroid moves by 2 per unit of x, and x is the negated origin
        origins.grad(&grads).unwrap().into_data().assert_approx_eq(
            &Tensor::<B, 2>::from_data([[-2.0, 0.0, 0.0]], device).into_data(),
            4,
        );
    }

    #[test]
    fn no_samples_give_zero_psfs() {
        let device = &Default::default();
        let options = IntegralOptions::new(5, 0.5);

        let rays = RayBundle::<B>::new(
            Tensor::zeros([0, 2, 3], device),
            Tensor::zeros([0, 2, 3], device),
            Tensor::zeros([0, 2], device),
        )
        .unwrap();
        forward_integral(&rays, &options).unwrap().into_data().assert_eq(
            &Tensor::<B, 3>::zeros([2, 5, 5], device).into_data(),
            true,
        );

        let psfs = forward_integral_coherent(
            &rays.with_phases(Tensor::zeros([0, 2], device)).unwrap(),
            &options,
        )
        .unwrap();
        assert_eq!(psfs.dims(), [2, 5, 5]);
        psfs.intensity().into_data().assert_eq(
            &Tensor::<B, 3>::zeros([2, 5, 5], device).into_data(),
            true,
        );

        let rays = RayBundle::<B>::single(
            Tensor::zeros([0, 3], device),
            Tensor::zeros([0, 3], device),
            Tensor::zeros([0], device),
        )
        .unwrap();
        forward_integral_single(&rays, &options).unwrap().into_data().assert_eq(
            &Tensor::<B, 2>::zeros([5, 5], device).into_data(),
            true,
        );
    }

    #[test]
    fn no_points_give_no_psfs() {
        let device = &Default::default();
        let options = IntegralOptions::new(5, 0.5);

        let rays = RayBundle::<B>::new(
            Tensor::zeros([4, 0, 3], device),
            Tensor::zeros([4, 0, 3], device),
            Tensor::zeros([4, 0], device),
        )
        .unwrap();
        assert_eq!(forward_integral(&rays, &options).unwrap().dims(), [0, 5, 5]);

        let rays = rays.with_phases(Tensor::zeros([4, 0], device)).unwrap();
        assert_eq!(
            forward_integral_coherent(&rays, &options).unwrap().dims(),
            [0, 5, 5]
        );
    }

    #[test]
    fn fractional_amplitudes_keep_positions() {
        let device = &Default::default();

        let (points, amplitudes) = mask_outside(
            Tensor::<B, 3>::from_data([[[0.6, -0.4]], [[2.0, 0.0]]], device),
            Tensor::from_data([[0.5], [0.25]], device),
            1.5,
            1.0,
        );
        points.into_data().assert_eq(
            &Tensor::<B, 3>::from_data([[[0.6, -0.4]], [[0.0, 0.0]]], device).into_data(),
            true,
        );
        amplitudes.into_data().assert_eq(
            &Tensor::<B, 2>::from_data([[0.5], [0.0]], device).into_data(),
            true,
        );

        // A half-weighted sample at (0.5, 0) lands on column 2, between rows 1 and 2
        let options = IntegralOptions::new(4, 1.0).with_center(Some([0.0, 0.0]));
        let psf = forward_integral_single(&bundle(&[[0.5, 0.0]], &[0.5]), &options).unwrap();
        psf.into_data().assert_approx_eq(
            &Tensor::<B, 2>::from_data(
                [
                    [0.0, 0.0, 0.0, 0.0],
                    [0.0, 0.0, 0.25, 0.0],
                    [0.0, 0.0, 0.25, 0.0],
                    [0.0, 0.0, 0.0, 0.0],
                ],
                device,
            )
            .into_data(),
            5,
        );
    }
}
