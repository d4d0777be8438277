/// Smallest denominator added to a weight sum before dividing by it.
pub const EPSILON: f64 = 1e-9;

/// Margin, in pixels, kept between a sample and the edge of the PSF window.
///
/// A shifted sample is kept only if `|x| < (ks / 2 - 0.5) * ps - MASK_MARGIN * ps`
/// holds on both axes, so that round-off never lands it on the last lattice line.
pub const MASK_MARGIN: f64 = 0.01;
