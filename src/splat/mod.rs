//! Monte-Carlo splatting of sample points onto a square pixel grid.

pub mod cpu;
pub mod grid;

pub use crate::error::Error;
pub use burn::{
    config::Config,
    tensor::{backend::Backend, Int, Tensor},
};
pub use grid::{ComplexGrid, PixelGrid};

/// The configuration for [`assign_points_to_pixels`].
#[derive(Config, Debug)]
pub struct SplatOptions {
    /// Side length of the grid, `ks`.
    pub kernel_size: usize,
    /// `[x_min, x_max]`, mapped onto the first and last columns.
    pub range_x: [f64; 2],
    /// `[y_min, y_max]`, mapped onto the last and first rows.
    pub range_y: [f64; 2],
    /// Splatting bilinearly onto the four surrounding cells,
    /// or wholly onto the cell at the floored index.
    #[config(default = true)]
    pub interpolate: bool,
}

/// Samples to splat.
///
/// `S` may be zero.
#[derive(Clone, Debug)]
pub struct SplatInput<B: Backend> {
    /// `(x, y)` in the physical frame of [`SplatOptions::range_x`] and [`SplatOptions::range_y`].
    ///
    /// The shape is `[S, 2]`.
    pub points: Tensor<B, 2>,
    /// Weights of the samples.
    ///
    /// The shape is `[S]`.
    pub amplitudes: Tensor<B, 1>,
    /// Phases in radians. Their presence selects coherent splatting.
    ///
    /// The shape is `[S]`.
    pub phases: Option<Tensor<B, 1>>,
    /// Obliquity factors.
    ///
    /// The shape is `[S]`.
    ///
    /// They are checked but not applied; callers fold them into the amplitudes.
    pub obliquities: Option<Tensor<B, 1>>,
}

impl SplatOptions {
    pub fn validate(&self) -> Result<(), Error> {
        if self.kernel_size < 2 {
            return Err(Error::InvalidKernelSize(self.kernel_size));
        }

        for (name, [min, max]) in [("range_x", self.range_x), ("range_y", self.range_y)] {
            if !(min.is_finite() && max.is_finite()) || min == max {
                return Err(Error::Validation(
                    format!("{name} ({:?})", [min, max]),
                    "a finite and non-empty range".into(),
                ));
            }
        }

        Ok(())
    }

    /// Fractional lattice coordinates `(row, col)` of a point `(x, y)`.
    ///
    /// The rows run downwards from `y_max`, the columns rightwards from `x_min`.
    #[inline]
    pub fn to_lattice(
        &self,
        point: &[f64; 2],
    ) -> [f64; 2] {
        let [x_min, x_max] = self.range_x;
        let [y_min, y_max] = self.range_y;
        let scale = (self.kernel_size - 1) as f64;
        [
            (point[1] - y_max) / (y_min - y_max) * scale,
            (point[0] - x_min) / (x_max - x_min) * scale,
        ]
    }
}

/// Splat the samples onto a `[ks, ks]` grid.
///
/// The grid is [`PixelGrid::Coherent`] if the input carries phases,
/// [`PixelGrid::Incoherent`] otherwise. No normalization is applied.
///
/// ## Details
///
/// Every corner landing outside the grid is dropped, so any energy of a sample
/// out of the ranges is lost rather than wrapped.
///
/// The process is completely differentiable with respect to
/// the points, the amplitudes and the phases.
pub fn assign_points_to_pixels<B: Backend>(
    input: SplatInput<B>,
    options: &SplatOptions,
) -> Result<PixelGrid<B>, Error> {
    options.validate()?;

    let [sample_count, dim] = input.points.dims();
    if dim != 2 {
        return Err(Error::MismatchedShape(
            format!("points.dims() ({:?})", input.points.dims()),
            format!("[{sample_count}, 2]"),
        ));
    }
    let arrays = [
        ("amplitudes", Some(&input.amplitudes)),
        ("phases", input.phases.as_ref()),
        ("obliquities", input.obliquities.as_ref()),
    ];
    for (name, array) in arrays {
        if let Some(array) = array {
            if array.dims() != [sample_count] {
                return Err(Error::MismatchedShape(
                    format!("{name}.dims() ({:?})", array.dims()),
                    format!("[{sample_count}]"),
                ));
            }
        }
    }

    #[cfg(debug_assertions)]
    log::debug!(
        target: "psfsplat::splat",
        "assign_points_to_pixels: {sample_count} samples, coherent = {}",
        input.phases.is_some(),
    );

    let is_coherent = input.phases.is_some();
    let kernel_size = options.kernel_size;

    // [ks, ks, C]
    let grid = if sample_count == 0 {
        Tensor::zeros(
            [kernel_size, kernel_size, if is_coherent { 2 } else { 1 }],
            &input.points.device(),
        )
    } else {
        // [S, C]
        let values = match input.phases {
            None => input.amplitudes.unsqueeze_dim::<2>(1),
            Some(phases) => Tensor::cat(
                vec![
                    (input.amplitudes.to_owned() * phases.to_owned().cos()).unsqueeze_dim(1),
                    (input.amplitudes * phases.sin()).unsqueeze_dim(1),
                ],
                1,
            ),
        };
        accumulate(input.points, values, options)
    };

    Ok(if is_coherent {
        PixelGrid::Coherent(ComplexGrid::from_channels(grid))
    } else {
        PixelGrid::Incoherent(grid.squeeze::<2>(2))
    })
}

/// Accumulate per-channel sample values onto the grid.
///
/// ## Shapes
///
/// * `points` - `[S, 2]`
/// * `values` - `[S, C]`
/// * `output` - `[ks, ks, C]`
///
/// ## Details
///
/// With [`SplatOptions::interpolate`], the sample at the fractional lattice
/// coordinates `(r, c)` adds
/// `(1 - w_r)(1 - w_c)`, `(1 - w_r) w_c`, `w_r (1 - w_c)` and `w_r w_c` of its values
/// to the cells `(⌊r⌋, ⌊c⌋)`, `(⌊r⌋, ⌊c⌋ + 1)`, `(⌊r⌋ + 1, ⌊c⌋)` and `(⌊r⌋ + 1, ⌊c⌋ + 1)`,
/// where `w_r = r - ⌊r⌋` and `w_c = c - ⌊c⌋`.
/// Otherwise, it adds all of them to `(⌊r⌋, ⌊c⌋)`.
///
/// The options are assumed to be valid.
pub fn accumulate<B: Backend>(
    points: Tensor<B, 2>,
    values: Tensor<B, 2>,
    options: &SplatOptions,
) -> Tensor<B, 3> {
    let device = points.device();
    // ks
    let kernel_size = options.kernel_size;
    let [sample_count, channel_count] = values.dims();
    let [x_min, x_max] = options.range_x;
    let [y_min, y_max] = options.range_y;
    // ks - 1
    let scale = (kernel_size - 1) as f64;

    // [ks * ks, C]
    let grid = Tensor::<B, 2>::zeros([kernel_size * kernel_size, channel_count], &device);
    if sample_count == 0 {
        return grid.reshape([kernel_size, kernel_size, channel_count]);
    }

    // [S, 1]
    let rows = points
        .to_owned()
        .slice([0..sample_count, 1..2])
        .sub_scalar(y_max)
        .div_scalar(y_min - y_max)
        .mul_scalar(scale);
    // [S, 1]
    let cols = points
        .slice([0..sample_count, 0..1])
        .sub_scalar(x_min)
        .div_scalar(x_max - x_min)
        .mul_scalar(scale);

    let rows_floor = rows.to_owned().floor();
    let cols_floor = cols.to_owned().floor();
    let rows_top = rows_floor.to_owned().int();
    let cols_left = cols_floor.to_owned().int();

    let grid = if options.interpolate {
        // [S, 1]
        let weights_bottom = rows - rows_floor;
        let weights_right = cols - cols_floor;
        let weights_top = weights_bottom.to_owned().neg().add_scalar(1.0);
        let weights_left = weights_right.to_owned().neg().add_scalar(1.0);

        [
            (0, 0, weights_top.to_owned() * weights_left.to_owned()),
            (0, 1, weights_top * weights_right.to_owned()),
            (1, 0, weights_bottom.to_owned() * weights_left),
            (1, 1, weights_bottom * weights_right),
        ]
        .into_iter()
        .fold(grid, |grid, (row_offset, col_offset, weights)| {
            scatter_add(
                grid,
                rows_top.to_owned().add_scalar(row_offset),
                cols_left.to_owned().add_scalar(col_offset),
                values.to_owned() * weights,
                kernel_size,
            )
        })
    } else {
        scatter_add(grid, rows_top, cols_left, values, kernel_size)
    };

    grid.reshape([kernel_size, kernel_size, channel_count])
}

/// Add the values into the flattened grid, with duplicate indices summed.
///
/// ## Shapes
///
/// * `grid` - `[ks * ks, C]`
/// * `rows` - `[S, 1]`
/// * `cols` - `[S, 1]`
/// * `values` - `[S, C]`
///
/// ## Details
///
/// The samples off the grid are zero-weighted and clamped onto it.
fn scatter_add<B: Backend>(
    grid: Tensor<B, 2>,
    rows: Tensor<B, 2, Int>,
    cols: Tensor<B, 2, Int>,
    values: Tensor<B, 2>,
    kernel_size: usize,
) -> Tensor<B, 2> {
    let index_max = kernel_size as i64 - 1;

    // [S, 1]
    let is_inside = rows.to_owned().greater_equal_elem(0).float()
        * rows.to_owned().lower_equal_elem(index_max).float()
        * cols.to_owned().greater_equal_elem(0).float()
        * cols.to_owned().lower_equal_elem(index_max).float();

    // [S]
    let indices = rows
        .clamp(0, index_max)
        .mul_scalar(kernel_size as i64)
        .add(cols.clamp(0, index_max))
        .squeeze::<1>(1);

    grid.select_assign(0, indices, values * is_inside)
}

impl Default for SplatOptions {
    #[inline]
    fn default() -> Self {
        Self::new(2, [-0.5, 0.5], [-0.5, 0.5])
    }
}
