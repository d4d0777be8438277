//! Splatting on the CPU without tensors.
//!
//! The samples are split across the rayon pool, each worker accumulates into
//! its own grid, and the partial grids are summed at the end.
//! It is not differentiable, but is handy for cross-checking and benchmarking.

pub use super::*;

use rayon::prelude::*;

/// Accumulate per-channel sample values onto a row-major grid of `ks * ks` cells.
///
/// It follows the same rules as [`accumulate`](super::accumulate),
/// including dropping the corners off the grid.
pub fn accumulate_slices<const C: usize>(
    points: &[[f64; 2]],
    values: &[[f64; C]],
    options: &SplatOptions,
) -> Result<Vec<[f64; C]>, Error> {
    options.validate()?;
    if points.len() != values.len() {
        return Err(Error::MismatchedShape(
            format!("values.len() ({})", values.len()),
            format!("points.len() ({})", points.len()),
        ));
    }

    let kernel_size = options.kernel_size;
    let cell_count = kernel_size * kernel_size;
    let index_max = kernel_size as i64 - 1;
    let cell = |row: i64, col: i64| {
        ((0..=index_max).contains(&row) && (0..=index_max).contains(&col))
            .then(|| row as usize * kernel_size + col as usize)
    };

    let grid = points
        .par_iter()
        .zip(values.par_iter())
        .fold(
            || vec![[0.0; C]; cell_count],
            |mut grid, (point, value)| {
                let [row, col] = options.to_lattice(point);
                let row_top = row.floor();
                let col_left = col.floor();
                let (row_top_index, col_left_index) = (row_top as i64, col_left as i64);

                let (corners, corner_count) = if options.interpolate {
                    let weight_bottom = row - row_top;
                    let weight_right = col - col_left;
                    let corners = [
                        (0, 0, (1.0 - weight_bottom) * (1.0 - weight_right)),
                        (0, 1, (1.0 - weight_bottom) * weight_right),
                        (1, 0, weight_bottom * (1.0 - weight_right)),
                        (1, 1, weight_bottom * weight_right),
                    ];
                    (corners, 4)
                } else {
                    ([(0, 0, 1.0); 4], 1)
                };

                for (row_offset, col_offset, weight) in corners.into_iter().take(corner_count) {
                    if let Some(index) =
                        cell(row_top_index + row_offset, col_left_index + col_offset)
                    {
                        grid[index]
                            .iter_mut()
                            .zip(value)
                            .for_each(|(target, value)| *target += weight * value);
                    }
                }

                grid
            },
        )
        .reduce(
            || vec![[0.0; C]; cell_count],
            |mut lhs, rhs| {
                lhs.iter_mut().zip(rhs).for_each(|(lhs, rhs)| {
                    lhs.iter_mut().zip(rhs).for_each(|(lhs, rhs)| *lhs += rhs);
                });
                lhs
            },
        );

    Ok(grid)
}
