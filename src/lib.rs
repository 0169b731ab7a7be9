#![forbid(unsafe_code)]

pub mod blend;
pub mod compositor;
pub mod error;
pub mod grain;
pub mod halftone;
pub mod ink;
pub mod misregister;
pub mod rng;
pub mod surface;

pub use compositor::PrintCompositor;
pub use error::{RisoError, RisoResult};
pub use halftone::{bayer_dots, bayer_mask, bayer_threshold, stochastic_halftone};
pub use ink::{Ink, KEY_INK, PAPER_HEX, PAPER_RGB, ink, inks, validate_catalog};
pub use misregister::{InkOffset, MisregistrationMap, generate_misregistration, max_shift};
pub use rng::SeededRng;
pub use surface::Surface;

// Layer drawing closures receive this crate's render context.
pub use vello_cpu::RenderContext;
