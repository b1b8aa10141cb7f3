//! framing/delta.rs
//! Snake-order differential residuals.
//!
//! Each pixel is first differenced against the same pixel of the predecessor
//! frame (or zero), then against the previous value along a serpentine scan:
//! even rows left to right, odd rows right to left.

use crate::constants::{MAX_BITS_PER_PIXEL, NARROW_BITS, WIDE_BITS};
use crate::framing::types::FrameData;
use crate::types::CptvError;

/// Row-major indices in serpentine scan order.
pub fn snake_order(width: usize, height: usize) -> impl Iterator<Item = usize> {
    (0..height).flat_map(move |y| {
        let row = y * width;
        let reversed = y % 2 == 1;
        (0..width).map(move |x| if reversed { row + width - 1 - x } else { row + x })
    })
}

/// Packing width for a frame whose largest non-leading residual magnitude is `max_abs`.
pub fn packing_width(max_abs: u32) -> u8 {
    let bits = (32 - max_abs.leading_zeros()) as u8 + 1;
    if bits < NARROW_BITS {
        NARROW_BITS
    } else if bits <= WIDE_BITS {
        WIDE_BITS
    } else {
        bits.min(MAX_BITS_PER_PIXEL)
    }
}

/// Residuals of `cur` against `prev`, in scan order, with the packing width
/// they need. The first residual is excluded from the width calculation.
pub fn delta_encode(cur: &FrameData, prev: Option<&FrameData>, out: &mut Vec<i32>) -> u8 {
    out.clear();
    out.reserve(cur.pixel_count());

    let pixels = cur.pixels();
    let prev = prev.map(FrameData::pixels);
    let mut last = 0i32;
    let mut max_abs = 0u32;

    for (n, i) in snake_order(cur.width(), cur.height()).enumerate() {
        let base = prev.map_or(0, |p| p[i] as i32);
        let v = pixels[i] as i32 - base;
        let d = v - last;
        if n > 0 {
            max_abs = max_abs.max(d.unsigned_abs());
        }
        out.push(d);
        last = v;
    }
    packing_width(max_abs)
}

/// Rebuild pixels from scan-order residuals. `residuals` must yield exactly
/// `width * height` values.
pub fn delta_decode<I>(
    residuals: I,
    prev: Option<&FrameData>,
    width: usize,
    height: usize,
) -> Result<FrameData, CptvError>
where
    I: IntoIterator<Item = i32>,
{
    let mut frame = FrameData::new(width, height);
    let prev = prev.map(FrameData::pixels);
    let mut residuals = residuals.into_iter();
    let mut last = 0i64;

    let pixels = frame.pixels_mut();
    for i in snake_order(width, height) {
        let d = residuals.next().ok_or_else(|| {
            CptvError::MalformedFrame("payload holds fewer pixels than the frame".into())
        })?;
        let v = last + d as i64;
        let base = prev.map_or(0, |p| p[i] as i64);
        let px = base + v;
        if !(0..=u16::MAX as i64).contains(&px) {
            return Err(CptvError::MalformedFrame(format!(
                "pixel {} reconstructs to {}, outside 0..=65535",
                i, px
            )));
        }
        pixels[i] = px as u16;
        last = v;
    }
    Ok(frame)
}
