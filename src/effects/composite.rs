//! Premultiplied RGBA8 compositing helpers.

use crate::foundation::error::{FrameError, FrameResult};
use crate::foundation::math::mul_div255_u8;

/// One premultiplied RGBA8 pixel.
pub type PremulRgba8 = [u8; 4];

/// Source-over for one premultiplied pixel.
pub fn over(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    if src[3] == 0 {
        return dst;
    }
    if src[3] == 255 {
        return src;
    }

    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = src[i].saturating_add(dc);
    }
    out
}

/// Composite `src` over `dst` pixel by pixel. Buffers must be equal-length RGBA8.
pub fn over_in_place(dst: &mut [u8], src: &[u8]) -> FrameResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(FrameError::export_unavailable(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Multiply every pixel of `dst` by the alpha of the matching `mask` pixel.
pub fn mask_alpha_in_place(dst: &mut [u8], mask: &[u8]) -> FrameResult<()> {
    if dst.len() != mask.len() || !dst.len().is_multiple_of(4) {
        return Err(FrameError::export_unavailable(
            "mask_alpha_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, m) in dst.chunks_exact_mut(4).zip(mask.chunks_exact(4)) {
        let w = u16::from(m[3]);
        if w == 255 {
            continue;
        }
        for c in d.iter_mut() {
            *c = mul_div255_u8(u16::from(*c), w);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
