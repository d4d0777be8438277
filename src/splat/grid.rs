//! Pixel grids produced by splatting.

pub use super::*;

use std::fmt;

/// A splatted grid of `[ks, ks]`.
#[derive(Clone, Debug)]
pub enum PixelGrid<B: Backend> {
    /// Non-negative energy.
    Incoherent(Tensor<B, 2>),
    /// Complex amplitude.
    Coherent(ComplexGrid<B>),
}

/// Complex values split into two real tensors of the same shape.
#[derive(Clone)]
pub struct ComplexGrid<B: Backend, const D: usize = 2> {
    /// Real parts.
    pub real: Tensor<B, D>,
    /// Imaginary parts.
    pub imag: Tensor<B, D>,
}

impl<B: Backend> PixelGrid<B> {
    /// Energy of the grid.
    ///
    /// It is the grid itself if incoherent, or `|E|^2` if coherent.
    pub fn intensity(self) -> Tensor<B, 2> {
        match self {
            Self::Incoherent(grid) => grid,
            Self::Coherent(grid) => grid.intensity(),
        }
    }

    #[inline]
    pub fn into_coherent(self) -> Option<ComplexGrid<B>> {
        match self {
            Self::Coherent(grid) => Some(grid),
            Self::Incoherent(_) => None,
        }
    }

    #[inline]
    pub fn is_coherent(&self) -> bool {
        matches!(self, Self::Coherent(_))
    }

    /// `[ks, ks]`
    #[inline]
    pub fn dims(&self) -> [usize; 2] {
        match self {
            Self::Incoherent(grid) => grid.dims(),
            Self::Coherent(grid) => grid.dims(),
        }
    }
}

impl<B: Backend> ComplexGrid<B, 2> {
    /// Split a `[ks, ks, 2]` tensor of `(re, im)` channels.
    pub fn from_channels(grid: Tensor<B, 3>) -> Self {
        let [row_count, col_count, _] = grid.dims();
        Self {
            real: grid
                .to_owned()
                .slice([0..row_count, 0..col_count, 0..1])
                .squeeze(2),
            imag: grid
                .slice([0..row_count, 0..col_count, 1..2])
                .squeeze(2),
        }
    }

    /// Stack the grids along a new leading axis, in order.
    pub fn stack(grids: Vec<Self>) -> ComplexGrid<B, 3> {
        let (real, imag): (Vec<_>, Vec<_>) = grids
            .into_iter()
            .map(|grid| (grid.real, grid.imag))
            .unzip();
        ComplexGrid {
            real: Tensor::stack(real, 0),
            imag: Tensor::stack(imag, 0),
        }
    }
}

impl<B: Backend, const D: usize> ComplexGrid<B, D> {
    /// `|E|^2`
    pub fn intensity(&self) -> Tensor<B, D> {
        self.real.to_owned().powf_scalar(2.0) + self.imag.to_owned().powf_scalar(2.0)
    }

    /// `|E|`
    #[inline]
    pub fn amplitude(&self) -> Tensor<B, D> {
        self.intensity().sqrt()
    }

    #[inline]
    pub fn dims(&self) -> [usize; D] {
        self.real.dims()
    }
}

impl<B: Backend, const D: usize> fmt::Debug for ComplexGrid<B, D> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct(&format!("ComplexGrid<{}>", B::name()))
            .field("real.dims()", &self.real.dims())
            .field("imag.dims()", &self.imag.dims())
            .finish()
    }
}
