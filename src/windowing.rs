use crate::volume::RescaleInfo;

use image::ImageBuffer;
use image::Luma;
use ndarray::Array2;
use ndarray::ArrayView2;
use rayon::prelude::*;

/// Window center/span pair. `width > 0` is the caller invariant; callers
/// keep it by clamping upstream, and a non-positive width renders as the
/// zero-range branch rather than an error.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WindowParams {
    pub level: f32,
    pub width: f32,
}

impl WindowParams {
    pub fn new(level: f32, width: f32) -> Self {
        Self { level, width }
    }

    /// The intensity interval this window spans.
    pub fn hu_range(&self) -> HuRange {
        HuRange {
            min: self.level - self.width / 2.0,
            max: self.level + self.width / 2.0,
        }
    }
}

/// The `[min, max]` intensity interval view of a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HuRange {
    pub min: f32,
    pub max: f32,
}

impl HuRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// The window equivalent to this interval.
    pub fn window(&self) -> WindowParams {
        WindowParams {
            level: (self.min + self.max) / 2.0,
            width: self.max - self.min,
        }
    }
}

#[inline]
fn window_sample(raw: i32, rescale: RescaleInfo, lo: f32, hi: f32) -> u8 {
    let span = hi - lo;
    if !(span > 0.0) {
        return 0;
    }
    let clamped = rescale.apply(raw).clamp(lo, hi);
    (((clamped - lo) / span) * 255.0).round() as u8
}

/// Map one 2-D slice of raw samples to 8-bit grayscale.
///
/// Each sample is rescaled to display units, clamped to
/// `[level - width/2, level + width/2]`, and the clamped interval is
/// linearly mapped to `[0, 255]`. A non-positive width yields an all-zero
/// image of the same shape.
pub fn apply_window(
    slice: ArrayView2<'_, i32>,
    rescale: RescaleInfo,
    params: WindowParams,
) -> Array2<u8> {
    let HuRange { min: lo, max: hi } = params.hu_range();
    slice.mapv(|raw| window_sample(raw, rescale, lo, hi))
}

/// Render one 2-D slice as an 8-bit grayscale image buffer.
///
/// Pixels are computed in parallel in row-major order. Returns `None` only
/// when the slice dimensions cannot form an image buffer.
pub fn render_slice(
    slice: ArrayView2<'_, i32>,
    rescale: RescaleInfo,
    params: WindowParams,
) -> Option<ImageBuffer<Luma<u8>, Vec<u8>>> {
    let HuRange { min: lo, max: hi } = params.hu_range();
    let (height, width) = slice.dim();
    let pixel_data: Vec<u8> = slice
        .into_par_iter()
        .map(|&raw| window_sample(raw, rescale, lo, hi))
        .collect();
    ImageBuffer::from_raw(width as u32, height as u32, pixel_data)
}
