//! Block reduction of an ROI's luma to a coarse matrix.
//!
//! Each cell is the truncated mean of a `BLOCK_SIZE` x `BLOCK_SIZE` block.
//! Working on blocks instead of pixels suppresses per-pixel sensor noise
//! before the temporal comparison.

use crate::capture::{LumaPlane, Roi, RoiError};

/// Edge length of one averaged block, in pixels.
pub const BLOCK_SIZE: usize = 10;

/// Byte matrix of block means, `floor(h / 10)` rows by `floor(w / 10)` columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DownsampledMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl DownsampledMatrix {
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Row-major cell values.
    #[inline]
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the cell at `(row, col)`, if inside the matrix.
    pub fn get(&self, row: usize, col: usize) -> Option<u8> {
        if row < self.rows && col < self.cols {
            Some(self.cells[row * self.cols + col])
        } else {
            None
        }
    }

    /// Mean of all cells, or `0.0` for an empty matrix.
    pub fn mean(&self) -> f64 {
        if self.cells.is_empty() {
            return 0.0;
        }
        let sum: u64 = self.cells.iter().map(|&c| c as u64).sum();
        sum as f64 / self.cells.len() as f64
    }
}

/// Downsamples the ROI of a luma plane.
///
/// Blocks are clipped to the ROI, so a block only averages in-bounds
/// samples. Fails if the ROI is over capacity or not inside the plane.
pub fn downsample(luma: &LumaPlane<'_>, roi: &Roi) -> Result<DownsampledMatrix, RoiError> {
    roi.validate(luma.width(), luma.height())?;

    let rows = roi.height / BLOCK_SIZE;
    let cols = roi.width / BLOCK_SIZE;
    let mut cells = Vec::with_capacity(rows * cols);

    for block_row in 0..rows {
        let y_start = block_row * BLOCK_SIZE;
        let y_end = (y_start + BLOCK_SIZE).min(roi.height);

        for block_col in 0..cols {
            let x_start = roi.x0 + block_col * BLOCK_SIZE;
            let x_end = (block_col * BLOCK_SIZE + BLOCK_SIZE).min(roi.width) + roi.x0;

            let mut sum = 0u32;
            let mut count = 0u32;
            for y in y_start..y_end {
                let row = luma.row(roi.y0 + y);
                sum += row[x_start..x_end].iter().map(|&v| v as u32).sum::<u32>();
                count += (x_end - x_start) as u32;
            }

            // Blocks are never empty: rows/cols only count whole blocks.
            cells.push((sum / count.max(1)) as u8);
        }
    }

    Ok(DownsampledMatrix { rows, cols, cells })
}
