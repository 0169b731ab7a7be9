use kurbo::Shape as _;

use crate::{
    error::{RisoError, RisoResult},
    rng::SeededRng,
    surface::{Surface, bezpath_to_cpu},
};

// 8x8 ordered-dither index matrix, the two-level block doubling of the
// 2x2 base [[0,2],[3,1]]. Values 0..63, no repeats; see the construction
// check in the tests below.
const BAYER_8X8: [[u8; 8]; 8] = [
    [0, 32, 8, 40, 2, 34, 10, 42],
    [48, 16, 56, 24, 50, 18, 58, 26],
    [12, 44, 4, 36, 14, 46, 6, 38],
    [60, 28, 52, 20, 62, 30, 54, 22],
    [3, 35, 11, 43, 1, 33, 9, 41],
    [51, 19, 59, 27, 49, 17, 57, 25],
    [15, 47, 7, 39, 13, 45, 5, 37],
    [63, 31, 55, 23, 61, 29, 53, 21],
];

// Cells fainter than this emit no dot at all.
const MIN_DENSITY: f64 = 0.02;

// Dots can jitter by at most a quarter of the grid pitch per axis, enough
// to break up the grid without merging neighboring dots.
const JITTER_FRACTION: f64 = 0.5;

// Largest dot radius relative to the grid pitch.
const MAX_RADIUS_FRACTION: f64 = 0.6;

fn dot_radius(density: f64, max_radius: f64) -> f64 {
    // Area, not radius, tracks tone linearly.
    max_radius * density.sqrt()
}

struct Dot {
    x: f64,
    y: f64,
    radius: f64,
    alpha: u8,
}

fn fill_dots(surface: &mut Surface, dots: &[Dot]) {
    surface.clear();
    if dots.is_empty() {
        return;
    }
    surface.draw(|ctx| {
        for dot in dots {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, dot.alpha));
            let circle = kurbo::Circle::new((dot.x, dot.y), dot.radius);
            ctx.fill_path(&bezpath_to_cpu(&circle.to_path(0.1)));
        }
    });
}

/// Stochastic circular halftone.
///
/// Samples the surface's alpha (density) on a `spacing`-pitch grid and
/// destructively replaces the surface with the resulting dot pattern:
/// each cell whose density clears a small threshold becomes one filled
/// black circle of radius `max_radius * sqrt(density)` at opacity
/// `min(1, density * 1.2)`, jittered by the shared session RNG so the
/// grid never reads as a grid. Cells below the threshold consume no RNG
/// draws.
pub fn stochastic_halftone(
    surface: &mut Surface,
    spacing: f64,
    rng: &mut SeededRng,
) -> RisoResult<()> {
    if !spacing.is_finite() || spacing < 1.0 {
        return Err(RisoError::validation(
            "halftone spacing must be finite and >= 1",
        ));
    }

    let max_radius = spacing * MAX_RADIUS_FRACTION;
    let mut dots = Vec::new();

    let mut y = spacing / 2.0;
    while y < surface.height() as f64 {
        let mut x = spacing / 2.0;
        while x < surface.width() as f64 {
            let density =
                f64::from(surface.alpha_at(x.round() as u32, y.round() as u32)) / 255.0;
            if density >= MIN_DENSITY {
                let jx = (rng.next_f64() - 0.5) * spacing * JITTER_FRACTION;
                let jy = (rng.next_f64() - 0.5) * spacing * JITTER_FRACTION;
                let opacity = (density * 1.2).min(1.0);
                dots.push(Dot {
                    x: x + jx,
                    y: y + jy,
                    radius: dot_radius(density, max_radius),
                    alpha: (opacity * 255.0).round() as u8,
                });
            }
            x += spacing;
        }
        y += spacing;
    }

    fill_dots(surface, &dots);
    Ok(())
}

/// Ordered-dither threshold for a pixel, in `(0, 1)`.
pub fn bayer_threshold(x: u32, y: u32) -> f64 {
    let v = BAYER_8X8[(y % 8) as usize][(x % 8) as usize];
    (f64::from(v) + 0.5) / 64.0
}

/// Binarize a scalar field against the Bayer matrix.
///
/// A pixel is on when `value + (threshold - 0.5)` clears `0.5`. Pure in
/// the field and grid: no RNG, so the same field always yields the same
/// mask and an animated field cannot flicker.
pub fn bayer_mask<F>(field: F, width: u32, height: u32) -> Vec<bool>
where
    F: Fn(u32, u32) -> f64,
{
    let mut mask = Vec::with_capacity(width as usize * height as usize);
    for y in 0..height {
        for x in 0..width {
            let value = field(x, y).clamp(0.0, 1.0);
            mask.push(value + (bayer_threshold(x, y) - 0.5) > 0.5);
        }
    }
    mask
}

/// Render a scalar field as a dot grid via ordered dithering.
///
/// The field is binarized with [`bayer_mask`], mask pixels are grouped
/// into `cell_size` cells, and each cell with any coverage becomes one
/// filled circle whose radius follows the area law on local coverage.
/// The surface is cleared first, so repeated calls with the same field
/// produce identical output.
pub fn bayer_dots<F>(surface: &mut Surface, field: F, cell_size: u32) -> RisoResult<()>
where
    F: Fn(u32, u32) -> f64,
{
    if cell_size == 0 {
        return Err(RisoError::validation("bayer cell_size must be > 0"));
    }

    let (width, height) = (surface.width(), surface.height());
    let mask = bayer_mask(field, width, height);
    let max_radius = f64::from(cell_size) * MAX_RADIUS_FRACTION;
    let mut dots = Vec::new();

    let mut cy = 0;
    while cy < height {
        let mut cx = 0;
        let cell_h = cell_size.min(height - cy);
        while cx < width {
            let cell_w = cell_size.min(width - cx);
            let mut on = 0u32;
            for y in cy..cy + cell_h {
                for x in cx..cx + cell_w {
                    if mask[(y * width + x) as usize] {
                        on += 1;
                    }
                }
            }
            let coverage = f64::from(on) / f64::from(cell_w * cell_h);
            if coverage > 0.0 {
                dots.push(Dot {
                    x: f64::from(cx) + f64::from(cell_w) / 2.0,
                    y: f64::from(cy) + f64::from(cell_h) / 2.0,
                    radius: dot_radius(coverage, max_radius),
                    alpha: 255,
                });
            }
            cx += cell_size;
        }
        cy += cell_size;
    }

    fill_dots(surface, &dots);
    Ok(())
}
