//! Frame types: borrowed plane views and an owned YUV 4:2:0 frame.
//!
//! The detector never copies a frame. Callers hand it [`YuvFrame`] views
//! over whatever buffers their capture stack produced (I420, NV12, NV21,
//! padded rows), and every view is validated against its declared strides
//! when it is built, so later reads cannot run past the end of a plane.

use std::time::Instant;
use thiserror::Error;

/// Errors raised while building a plane view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Interleave step of zero.
    #[error("{plane} plane has a zero pixel stride")]
    ZeroStride { plane: &'static str },
    /// Rows overlap.
    #[error("{plane} row stride {stride} is smaller than the row span {span}")]
    StrideTooSmall {
        plane: &'static str,
        stride: usize,
        span: usize,
    },
    /// Buffer ends before the last addressed sample.
    #[error("{plane} plane holds {actual} bytes but {required} are required")]
    PlaneTooSmall {
        plane: &'static str,
        required: usize,
        actual: usize,
    },
    /// Chroma planes built for a different luma size.
    #[error("chroma planes cover {chroma_width}x{chroma_height}, luma {luma_width}x{luma_height} needs half of that")]
    ChromaMismatch {
        luma_width: usize,
        luma_height: usize,
        chroma_width: usize,
        chroma_height: usize,
    },
}

/// Bytes needed to address `rows` x `cols` samples with the given strides.
fn required_len(rows: usize, cols: usize, row_stride: usize, pixel_stride: usize) -> usize {
    if rows == 0 || cols == 0 {
        return 0;
    }
    (rows - 1)
        .saturating_mul(row_stride)
        .saturating_add((cols - 1).saturating_mul(pixel_stride))
        .saturating_add(1)
}

/// Chroma dimension for a luma dimension under 2x subsampling.
#[inline]
pub(crate) fn chroma_dim(luma_dim: usize) -> usize {
    luma_dim.div_ceil(2)
}

/// Read-only view of a full-resolution luma plane.
#[derive(Debug, Clone, Copy)]
pub struct LumaPlane<'a> {
    data: &'a [u8],
    width: usize,
    height: usize,
    row_stride: usize,
}

impl<'a> LumaPlane<'a> {
    /// Wraps a luma buffer, checking that `row_stride >= width` and that the
    /// buffer covers every addressed row.
    pub fn new(
        data: &'a [u8],
        width: usize,
        height: usize,
        row_stride: usize,
    ) -> Result<Self, FrameError> {
        if row_stride < width {
            return Err(FrameError::StrideTooSmall {
                plane: "luma",
                stride: row_stride,
                span: width,
            });
        }
        let required = required_len(height, width, row_stride, 1);
        if data.len() < required {
            return Err(FrameError::PlaneTooSmall {
                plane: "luma",
                required,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            row_stride,
        })
    }

    /// Plane width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Plane height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Distance in bytes between the starts of consecutive rows.
    #[inline]
    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    /// Returns the `width` visible pixels of row `y`.
    ///
    /// A zero-width plane has no backing bytes, so every row is empty.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        if self.width == 0 {
            return &[];
        }
        let start = y * self.row_stride;
        &self.data[start..start + self.width]
    }

    /// Returns the luma sample at `(x, y)`.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u8 {
        self.data[y * self.row_stride + x]
    }
}

/// Read-only view of the two 2x2-subsampled chroma planes.
///
/// `pixel_stride` is 1 for planar I420 and 2 for the interleaved
/// semi-planar layouts, where `u` and `v` are offset views into the same
/// buffer.
#[derive(Debug, Clone, Copy)]
pub struct ChromaPlanes<'a> {
    u: &'a [u8],
    v: &'a [u8],
    width: usize,
    height: usize,
    row_stride: usize,
    pixel_stride: usize,
}

impl<'a> ChromaPlanes<'a> {
    /// Wraps the chroma buffers for a luma plane of `luma_width` x `luma_height`.
    pub fn new(
        u: &'a [u8],
        v: &'a [u8],
        luma_width: usize,
        luma_height: usize,
        row_stride: usize,
        pixel_stride: usize,
    ) -> Result<Self, FrameError> {
        if pixel_stride == 0 {
            return Err(FrameError::ZeroStride { plane: "chroma" });
        }
        let width = chroma_dim(luma_width);
        let height = chroma_dim(luma_height);
        let span = required_len(1, width, 0, pixel_stride);
        if height > 1 && row_stride < span {
            return Err(FrameError::StrideTooSmall {
                plane: "chroma",
                stride: row_stride,
                span,
            });
        }

        let required = required_len(height, width, row_stride, pixel_stride);
        for (plane, data) in [("u", u), ("v", v)] {
            if data.len() < required {
                return Err(FrameError::PlaneTooSmall {
                    plane,
                    required,
                    actual: data.len(),
                });
            }
        }

        Ok(Self {
            u,
            v,
            width,
            height,
            row_stride,
            pixel_stride,
        })
    }

    /// Chroma plane width in samples.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Chroma plane height in samples.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the `(u, v)` pair covering luma pixel `(x, y)`.
    #[inline]
    pub fn pair_for_luma(&self, x: usize, y: usize) -> (u8, u8) {
        let offset = (y / 2) * self.row_stride + (x / 2) * self.pixel_stride;
        (self.u[offset], self.v[offset])
    }
}

/// A validated luma + chroma frame view.
#[derive(Debug, Clone, Copy)]
pub struct YuvFrame<'a> {
    luma: LumaPlane<'a>,
    chroma: ChromaPlanes<'a>,
}

impl<'a> YuvFrame<'a> {
    /// Pairs a luma plane with chroma planes built for the same dimensions.
    pub fn new(luma: LumaPlane<'a>, chroma: ChromaPlanes<'a>) -> Result<Self, FrameError> {
        if chroma.width != chroma_dim(luma.width) || chroma.height != chroma_dim(luma.height) {
            return Err(FrameError::ChromaMismatch {
                luma_width: luma.width,
                luma_height: luma.height,
                chroma_width: chroma.width,
                chroma_height: chroma.height,
            });
        }
        Ok(Self { luma, chroma })
    }

    /// Builds a view straight from raw plane buffers.
    #[allow(clippy::too_many_arguments)]
    pub fn from_planes(
        y: &'a [u8],
        u: &'a [u8],
        v: &'a [u8],
        width: usize,
        height: usize,
        y_row_stride: usize,
        uv_row_stride: usize,
        uv_pixel_stride: usize,
    ) -> Result<Self, FrameError> {
        let luma = LumaPlane::new(y, width, height, y_row_stride)?;
        let chroma = ChromaPlanes::new(u, v, width, height, uv_row_stride, uv_pixel_stride)?;
        Self::new(luma, chroma)
    }

    /// Luma plane.
    #[inline]
    pub fn luma(&self) -> &LumaPlane<'a> {
        &self.luma
    }

    /// Chroma planes.
    #[inline]
    pub fn chroma(&self) -> &ChromaPlanes<'a> {
        &self.chroma
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.luma.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.luma.height
    }
}

/// An owned I420 frame, as produced by a [`FrameSource`](super::FrameSource).
///
/// Carries the capture timestamp and a monotonic sequence number next to
/// the tightly packed planes.
#[derive(Clone)]
pub struct Frame {
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
    width: usize,
    height: usize,
    timestamp: Instant,
    sequence: u64,
}

impl Frame {
    /// Creates a frame from tightly packed I420 planes.
    pub fn new(
        y: Vec<u8>,
        u: Vec<u8>,
        v: Vec<u8>,
        width: usize,
        height: usize,
        sequence: u64,
    ) -> Self {
        Self {
            y,
            u,
            v,
            width,
            height,
            timestamp: Instant::now(),
            sequence,
        }
    }

    /// Creates a frame where every pixel has the same `(y, u, v)` triple.
    pub fn uniform(width: usize, height: usize, y: u8, u: u8, v: u8, sequence: u64) -> Self {
        let chroma_len = chroma_dim(width) * chroma_dim(height);
        Self::new(
            vec![y; width * height],
            vec![u; chroma_len],
            vec![v; chroma_len],
            width,
            height,
            sequence,
        )
    }

    /// Borrows the frame as a validated view.
    pub fn view(&self) -> Result<YuvFrame<'_>, FrameError> {
        YuvFrame::from_planes(
            &self.y,
            &self.u,
            &self.v,
            self.width,
            self.height,
            self.width,
            chroma_dim(self.width),
            1,
        )
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Capture time.
    #[inline]
    pub fn timestamp(&self) -> Instant {
        self.timestamp
    }

    /// Frame sequence number.
    #[inline]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Validates that the plane sizes match the dimensions.
    pub fn is_valid(&self) -> bool {
        let chroma_len = chroma_dim(self.width) * chroma_dim(self.height);
        self.y.len() == self.width * self.height
            && self.u.len() == chroma_len
            && self.v.len() == chroma_len
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sequence", &self.sequence)
            .field("luma_bytes", &self.y.len())
            .field("chroma_bytes", &(self.u.len() + self.v.len()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_frame_is_valid() {
        let frame = Frame::uniform(64, 48, 100, 128, 128, 1);
        assert!(frame.is_valid());
        assert_eq!(frame.sequence(), 1);

        let view = frame.view().unwrap();
        assert_eq!(view.width(), 64);
        assert_eq!(view.luma().at(10, 10), 100);
        assert_eq!(view.chroma().pair_for_luma(63, 47), (128, 128));
    }

    #[test]
    fn test_odd_dimensions_round_chroma_up() {
        let frame = Frame::uniform(5, 3, 10, 20, 30, 1);
        assert!(frame.is_valid());
        let view = frame.view().unwrap();
        assert_eq!(view.chroma().width(), 3);
        assert_eq!(view.chroma().height(), 2);
        assert_eq!(view.chroma().pair_for_luma(4, 2), (20, 30));
    }

    #[test]
    fn test_luma_stride_smaller_than_width_rejected() {
        let data = vec![0u8; 100];
        assert!(matches!(
            LumaPlane::new(&data, 10, 5, 8),
            Err(FrameError::StrideTooSmall { .. })
        ));
    }

    #[test]
    fn test_short_luma_buffer_rejected() {
        let data = vec![0u8; 99];
        assert!(matches!(
            LumaPlane::new(&data, 10, 10, 10),
            Err(FrameError::PlaneTooSmall {
                required: 100,
                actual: 99,
                ..
            })
        ));
    }

    #[test]
    fn test_padded_luma_rows() {
        // Last row does not need its padding bytes.
        let mut data = vec![0u8; 16 * 2 + 10];
        data[16 + 3] = 77;
        let plane = LumaPlane::new(&data, 10, 3, 16).unwrap();
        assert_eq!(plane.at(3, 1), 77);
        assert_eq!(plane.row(2).len(), 10);
    }

    #[test]
    fn test_interleaved_chroma() {
        // 4x4 luma -> 2x2 chroma, stored as VU pairs (NV21).
        let vu = [10u8, 20, 11, 21, 12, 22, 13, 23];
        let chroma = ChromaPlanes::new(&vu[1..], &vu[..], 4, 4, 4, 2).unwrap();
        assert_eq!(chroma.pair_for_luma(0, 0), (20, 10));
        assert_eq!(chroma.pair_for_luma(3, 0), (21, 11));
        assert_eq!(chroma.pair_for_luma(2, 3), (23, 13));
    }

    #[test]
    fn test_zero_pixel_stride_rejected() {
        let data = [0u8; 4];
        assert!(matches!(
            ChromaPlanes::new(&data, &data, 4, 4, 2, 0),
            Err(FrameError::ZeroStride { .. })
        ));
    }

    #[test]
    fn test_chroma_mismatch_rejected() {
        let y = vec![0u8; 64];
        let c = vec![0u8; 64];
        let luma = LumaPlane::new(&y, 8, 8, 8).unwrap();
        let chroma = ChromaPlanes::new(&c, &c, 4, 4, 2, 1).unwrap();
        assert!(matches!(
            YuvFrame::new(luma, chroma),
            Err(FrameError::ChromaMismatch { .. })
        ));
    }

    #[test]
    fn test_zero_width_plane_has_empty_rows() {
        let luma = LumaPlane::new(&[], 0, 5, 10).unwrap();
        for y in 0..5 {
            assert!(luma.row(y).is_empty());
        }
    }
}
