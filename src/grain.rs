use crate::rng::SeededRng;

// The grain pattern is part of the paper, not of the print run: it comes
// from a fixed internal seed so every compositor instance sees the same
// texture, generated at that instance's resolution.
const GRAIN_SEED: i32 = 1986;
const GRAIN_VALUE_FLOOR: f64 = 96.0;
const GRAIN_VALUE_SPAN: f64 = 64.0;
const GRAIN_ALPHA: u8 = 22;

/// Straight-alpha RGBA8 noise for the overlay finishing pass: mid-gray
/// values at low alpha, one draw per pixel.
pub fn generate_grain(width: u32, height: u32) -> Vec<u8> {
    let mut rng = SeededRng::new(GRAIN_SEED);
    let px_count = width as usize * height as usize;
    let mut out = Vec::with_capacity(px_count * 4);
    for _ in 0..px_count {
        let v = (GRAIN_VALUE_FLOOR + rng.next_f64() * GRAIN_VALUE_SPAN) as u8;
        out.extend_from_slice(&[v, v, v, GRAIN_ALPHA]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grain_is_identical_across_calls() {
        assert_eq!(generate_grain(32, 16), generate_grain(32, 16));
    }

    #[test]
    fn grain_values_stay_mid_gray_at_low_alpha() {
        let grain = generate_grain(64, 64);
        assert_eq!(grain.len(), 64 * 64 * 4);
        for px in grain.chunks_exact(4) {
            assert!(px[0] >= 96 && px[0] < 160);
            assert_eq!(px[0], px[1]);
            assert_eq!(px[1], px[2]);
            assert_eq!(px[3], GRAIN_ALPHA);
        }
    }

    #[test]
    fn grain_is_not_constant() {
        let grain = generate_grain(16, 16);
        let first = grain[0];
        assert!(grain.chunks_exact(4).any(|px| px[0] != first));
    }
}
