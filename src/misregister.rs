use std::collections::BTreeMap;

use crate::{
    ink::{Ink, KEY_INK, inks},
    rng::SeededRng,
};

/// Per-ink press misalignment: translation in raster units, rotation in
/// degrees, both applied as a rigid transform about the image center.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InkOffset {
    pub dx: f64,
    pub dy: f64,
    pub rotation: f64,
}

impl InkOffset {
    pub const ZERO: Self = Self {
        dx: 0.0,
        dy: 0.0,
        rotation: 0.0,
    };

    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

/// Ink id -> offset, fully determined by one seed.
pub type MisregistrationMap = BTreeMap<&'static str, InkOffset>;

// Total excursion per ink, indexed by print_order - 1: the key plate never
// drifts, later and more prominent plates drift further.
const SHIFT_RANGE: [f64; 5] = [0.0, 2.0, 3.0, 4.0, 5.0];
const ROTATION_RANGE: f64 = 0.5;

/// Maximum total shift excursion for an ink; `|dx|` and `|dy|` stay within
/// half of this.
pub fn max_shift(ink: &Ink) -> f64 {
    SHIFT_RANGE[usize::from(ink.print_order - 1)]
}

/// Derive the full offset map for one print run.
///
/// Pure function of the seed: the RNG is stepped three times per non-key
/// ink (dx, dy, rotation, in ascending print order), each draw remapped
/// from `[0, 1)` to a symmetric `[-A/2, A/2)`. The key ink consumes no
/// draws and is pinned to the exact zero offset.
pub fn generate_misregistration(seed: i32) -> MisregistrationMap {
    let mut rng = SeededRng::new(seed);
    let mut map = MisregistrationMap::new();
    for ink in inks() {
        if ink.id == KEY_INK {
            map.insert(ink.id, InkOffset::ZERO);
            continue;
        }
        let shift = max_shift(ink);
        let dx = (rng.next_f64() - 0.5) * shift;
        let dy = (rng.next_f64() - 0.5) * shift;
        let rotation = (rng.next_f64() - 0.5) * ROTATION_RANGE;
        map.insert(ink.id, InkOffset { dx, dy, rotation });
    }
    tracing::debug!(seed, "derived misregistration map");
    map
}
