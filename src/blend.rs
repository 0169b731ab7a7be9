use crate::error::{RisoError, RisoResult};
use crate::ink::Ink;

pub type PremulRgba8 = [u8; 4];

/// Replace a layer's color with one ink color, preserving density.
///
/// Input and output are premultiplied RGBA8. Every pixel with non-zero
/// alpha takes the ink's exact RGB (premultiplied by that alpha); the
/// source RGB never bleeds through. Zero-alpha pixels stay fully
/// transparent. Returns a new buffer so the pre-tint layer is untouched.
pub fn tint(src: &[u8], ink: &Ink) -> RisoResult<Vec<u8>> {
    if !src.len().is_multiple_of(4) {
        return Err(RisoError::evaluation("tint expects an rgba8 buffer"));
    }
    let mut out = vec![0u8; src.len()];
    for (o, s) in out.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let a = s[3];
        if a == 0 {
            continue;
        }
        o[0] = mul_div255(u16::from(ink.rgb[0]), u16::from(a));
        o[1] = mul_div255(u16::from(ink.rgb[1]), u16::from(a));
        o[2] = mul_div255(u16::from(ink.rgb[2]), u16::from(a));
        o[3] = a;
    }
    Ok(out)
}

/// Multiply one premultiplied pixel onto an opaque destination pixel.
///
/// Per-channel, with `sa` the source alpha: `out = dst * (255 - sa + sc)
/// / 255`, which is the multiply blend `dst * src` weighted by source
/// density and collapses to a no-op where the source is transparent.
pub fn multiply(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        // Resampling can leave a channel a hair above its alpha; clamp so
        // the weight never exceeds 255.
        let sc = u16::from(src[i].min(sa));
        out[i] = mul_div255(u16::from(dst[i]), inv + sc);
    }
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));
    out
}

/// Overlay one straight-alpha pixel onto an opaque destination pixel,
/// using the standard piecewise formula for the blended term.
pub fn overlay(dst: PremulRgba8, src: PremulRgba8) -> PremulRgba8 {
    let sa = src[3];
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    for i in 0..3 {
        let b = overlay_channel(dst[i], src[i]);
        out[i] = add_sat_u8(
            mul_div255(u16::from(dst[i]), inv),
            mul_div255(u16::from(b), u16::from(sa)),
        );
    }
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));
    out
}

fn overlay_channel(cb: u8, cs: u8) -> u8 {
    let cb = u32::from(cb);
    let cs = u32::from(cs);
    if cb < 128 {
        ((2 * cb * cs + 127) / 255) as u8
    } else {
        let v = 2 * (255 - cb) * (255 - cs);
        (255 - (v + 127) / 255) as u8
    }
}

pub fn multiply_in_place(dst: &mut [u8], src: &[u8]) -> RisoResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RisoError::evaluation(
            "multiply_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = multiply([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

pub fn overlay_in_place(dst: &mut [u8], src: &[u8]) -> RisoResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(RisoError::evaluation(
            "overlay_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = overlay([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Premultiplied to straight alpha, for image export.
pub fn unpremul(px: PremulRgba8) -> PremulRgba8 {
    let a = px[3];
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let un = |c: u8| -> u8 {
        let v = (u32::from(c) * 255 + u32::from(a) / 2) / u32::from(a);
        v.min(255) as u8
    };
    [un(px[0]), un(px[1]), un(px[2]), a]
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}
