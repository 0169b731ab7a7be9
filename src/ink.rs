use crate::error::{RisoError, RisoResult};

/// One spot color of the simulated press. The catalog below is fixed and
/// never mutated at runtime; `print_order` defines the compositing
/// sequence, not the catalog's storage order (they happen to coincide).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Ink {
    pub id: &'static str,
    pub hex: &'static str,
    pub rgb: [u8; 3],
    pub role: &'static str,
    pub default_opacity: f64,
    pub print_order: u8,
}

/// Warm off-white paper stock the inks are pressed onto.
pub const PAPER_HEX: &str = "F8F4E9";
pub const PAPER_RGB: [u8; 3] = [248, 244, 233];

/// The key plate. It anchors registration: its offset is always zero and
/// every other ink's misregistration is relative to it.
pub const KEY_INK: &str = "light_gray";

static INKS: [Ink; 5] = [
    Ink {
        id: "light_gray",
        hex: "88898A",
        rgb: [136, 137, 138],
        role: "base terrain, casings and neutral fills",
        default_opacity: 0.6,
        print_order: 1,
    },
    Ink {
        id: "teal",
        hex: "00838A",
        rgb: [0, 131, 138],
        role: "water fills and shoreline tone",
        default_opacity: 0.85,
        print_order: 2,
    },
    Ink {
        id: "blue",
        hex: "0078BF",
        rgb: [0, 120, 191],
        role: "contours, rail and secondary linework",
        default_opacity: 0.8,
        print_order: 3,
    },
    Ink {
        id: "orange",
        hex: "FF6C2F",
        rgb: [255, 108, 47],
        role: "primary road network",
        default_opacity: 0.9,
        print_order: 4,
    },
    Ink {
        id: "fluor_pink",
        hex: "FF48B0",
        rgb: [255, 72, 176],
        role: "accents and points of interest",
        default_opacity: 0.75,
        print_order: 5,
    },
];

/// Full catalog in ascending print order.
pub fn inks() -> &'static [Ink; 5] {
    &INKS
}

pub fn ink(id: &str) -> Option<&'static Ink> {
    INKS.iter().find(|i| i.id == id)
}

/// Catalog position of `id`, usable as a layer index.
pub(crate) fn ink_index(id: &str) -> Option<usize> {
    INKS.iter().position(|i| i.id == id)
}

/// Self-check of the fixed catalog: hex and RGB agree, print orders are
/// unique and dense, opacities normalized.
pub fn validate_catalog() -> RisoResult<()> {
    let mut orders = Vec::with_capacity(INKS.len());
    for ink in &INKS {
        if decode_hex(ink.hex)? != ink.rgb {
            return Err(RisoError::validation(format!(
                "ink '{}' hex {} does not match rgb {:?}",
                ink.id, ink.hex, ink.rgb
            )));
        }
        if !(0.0..=1.0).contains(&ink.default_opacity) {
            return Err(RisoError::validation(format!(
                "ink '{}' default_opacity out of range",
                ink.id
            )));
        }
        orders.push(ink.print_order);
    }
    orders.sort_unstable();
    if orders != (1..=INKS.len() as u8).collect::<Vec<_>>() {
        return Err(RisoError::validation("ink print orders must be 1..=N unique"));
    }
    if decode_hex(PAPER_HEX)? != PAPER_RGB {
        return Err(RisoError::validation("paper hex does not match rgb"));
    }
    Ok(())
}

fn decode_hex(hex: &str) -> RisoResult<[u8; 3]> {
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(RisoError::validation(format!(
            "ink hex '{hex}' must be 6 hex digits"
        )));
    }
    let channel = |i: usize| -> RisoResult<u8> {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map_err(|_| RisoError::validation(format!("ink hex '{hex}' is not parseable")))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_hex_matches_rgb() {
        for ink in inks() {
            assert_eq!(decode_hex(ink.hex).unwrap(), ink.rgb, "ink {}", ink.id);
        }
        assert_eq!(decode_hex(PAPER_HEX).unwrap(), PAPER_RGB);
        validate_catalog().unwrap();
    }

    #[test]
    fn catalog_print_orders_are_unique_and_dense() {
        let mut orders: Vec<u8> = inks().iter().map(|i| i.print_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn catalog_is_stored_in_print_order() {
        let orders: Vec<u8> = inks().iter().map(|i| i.print_order).collect();
        assert!(orders.is_sorted());
    }

    #[test]
    fn catalog_opacities_are_normalized() {
        for ink in inks() {
            assert!((0.0..=1.0).contains(&ink.default_opacity), "ink {}", ink.id);
        }
    }

    #[test]
    fn key_ink_exists_and_prints_first() {
        let key = ink(KEY_INK).unwrap();
        assert_eq!(key.print_order, 1);
    }

    #[test]
    fn lookup_by_id() {
        assert_eq!(ink("teal").unwrap().rgb, [0, 131, 138]);
        assert!(ink("magenta").is_none());
        assert_eq!(ink_index("light_gray"), Some(0));
        assert_eq!(ink_index("fluor_pink"), Some(4));
    }

    #[test]
    fn decode_hex_rejects_malformed_input() {
        assert!(decode_hex("12345").is_err());
        assert!(decode_hex("12345G").is_err());
        assert!(decode_hex("").is_err());
    }
}
