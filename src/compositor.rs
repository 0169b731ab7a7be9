use std::path::Path;

use crate::{
    blend::{multiply_in_place, overlay_in_place, tint, unpremul},
    error::{RisoError, RisoResult},
    grain::generate_grain,
    ink::{PAPER_RGB, ink_index, inks},
    misregister::{InkOffset, MisregistrationMap, generate_misregistration},
    surface::{Surface, affine_to_cpu, image_paint_from_premul},
};

/// One simulated print run: a set of per-ink density layers and the
/// machinery to press them onto paper.
///
/// The compositor owns one layer [`Surface`] per catalog ink plus the
/// output surface, all at the same pixel dimensions, allocated once and
/// reused across [`clear`](Self::clear) calls. The misregistration map is
/// fixed at construction from the session seed; the grain texture is
/// cached lazily and survives until a [`resize`](Self::resize).
///
/// Resizing while a draw pass is in flight is not supported: callers must
/// `clear()` and redraw after `resize()`.
pub struct PrintCompositor {
    width: u32,
    height: u32,
    seed: i32,
    offsets: MisregistrationMap,
    layers: Vec<Surface>,
    scratch: Surface,
    output: Surface,
    grain: Option<Vec<u8>>,
}

impl PrintCompositor {
    pub fn new(width: u32, height: u32, seed: i32) -> RisoResult<Self> {
        let layers = inks()
            .iter()
            .map(|_| Surface::new(width, height))
            .collect::<RisoResult<Vec<_>>>()?;
        Ok(Self {
            width,
            height,
            seed,
            offsets: generate_misregistration(seed),
            layers,
            scratch: Surface::new(width, height)?,
            output: Surface::new(width, height)?,
            grain: None,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// The print run's fixed per-ink offset map.
    pub fn offsets(&self) -> &MisregistrationMap {
        &self.offsets
    }

    /// Draw into one ink's layer. The closure receives a fresh render
    /// context sized to the surface; its commands accumulate onto the
    /// layer, with alpha carrying ink density.
    pub fn layer<F>(&mut self, ink_id: &str, f: F) -> RisoResult<()>
    where
        F: FnOnce(&mut vello_cpu::RenderContext),
    {
        self.layer_mut(ink_id)?.draw(f);
        Ok(())
    }

    /// Direct access to one ink's layer surface, e.g. for halftone
    /// preprocessing before compositing.
    pub fn layer_mut(&mut self, ink_id: &str) -> RisoResult<&mut Surface> {
        let idx = ink_index(ink_id).ok_or_else(|| {
            RisoError::validation(format!("unknown ink id '{ink_id}'"))
        })?;
        Ok(&mut self.layers[idx])
    }

    /// Blank every layer and the output for a fresh draw pass.
    pub fn clear(&mut self) {
        for layer in &mut self.layers {
            layer.clear();
        }
        self.output.clear();
    }

    /// Reallocate all surfaces at new dimensions. No content survives and
    /// the grain cache is dropped.
    pub fn resize(&mut self, width: u32, height: u32) -> RisoResult<()> {
        let mut layers = Vec::with_capacity(self.layers.len());
        for _ in 0..self.layers.len() {
            layers.push(Surface::new(width, height)?);
        }
        let scratch = Surface::new(width, height)?;
        let output = Surface::new(width, height)?;
        self.layers = layers;
        self.scratch = scratch;
        self.output = output;
        self.width = width;
        self.height = height;
        self.grain = None;
        Ok(())
    }

    /// Press the current layers onto paper.
    ///
    /// Deterministic pipeline: fill with the paper color, then for each
    /// ink in ascending print order tint its layer, displace it by the
    /// ink's misregistration (a rigid transform about the image center),
    /// and multiply-blend it onto the accumulating output; finish with
    /// the grain overlay. Idempotent: unchanged layers give identical
    /// output. An all-empty layer set produces a blank sheet of paper.
    #[tracing::instrument(skip(self), fields(seed = self.seed, width = self.width, height = self.height))]
    pub fn composite(&mut self) -> RisoResult<()> {
        self.output
            .fill([PAPER_RGB[0], PAPER_RGB[1], PAPER_RGB[2], 255]);

        let mut inked = false;
        for (idx, ink) in inks().iter().enumerate() {
            if self.layers[idx].is_empty() {
                tracing::debug!(ink = ink.id, "layer empty, skipped");
                continue;
            }
            inked = true;

            let tinted = tint(self.layers[idx].data(), ink)?;
            let off = self
                .offsets
                .get(ink.id)
                .copied()
                .unwrap_or(InkOffset::ZERO);
            tracing::debug!(
                ink = ink.id,
                dx = off.dx,
                dy = off.dy,
                rotation = off.rotation,
                "ink pass"
            );

            if off.is_zero() {
                multiply_in_place(self.output.data_mut(), &tinted)?;
            } else {
                let paint = image_paint_from_premul(&tinted, self.width, self.height)?;
                let transform = affine_to_cpu(layer_transform(off, self.width, self.height));
                let (w, h) = (f64::from(self.width), f64::from(self.height));
                self.scratch.clear();
                self.scratch.draw(|ctx| {
                    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_transform(transform);
                    ctx.set_paint(paint);
                    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, w, h));
                });
                multiply_in_place(self.output.data_mut(), self.scratch.data())?;
            }
        }

        // A run with no ink at all is a blank sheet, not a grained one.
        if inked {
            let grain = self
                .grain
                .get_or_insert_with(|| generate_grain(self.width, self.height));
            overlay_in_place(self.output.data_mut(), grain)?;
        }
        Ok(())
    }

    /// The composited output raster.
    pub fn output(&self) -> &Surface {
        &self.output
    }

    /// Raw premultiplied RGBA8 bytes of the output, for blitting.
    pub fn output_rgba8(&self) -> &[u8] {
        self.output.data()
    }

    /// Export the output as a straight-alpha PNG.
    pub fn write_png(&self, path: &Path) -> RisoResult<()> {
        let mut straight = Vec::with_capacity(self.output.data().len());
        for px in self.output.data().chunks_exact(4) {
            straight.extend_from_slice(&unpremul([px[0], px[1], px[2], px[3]]));
        }
        let img = image::RgbaImage::from_raw(self.width, self.height, straight)
            .ok_or_else(|| RisoError::evaluation("output buffer does not match dimensions"))?;
        img.save(path)
            .map_err(|e| RisoError::evaluation(format!("write png '{}': {e}", path.display())))?;
        Ok(())
    }
}

// Rigid displacement about the image center, not the origin.
fn layer_transform(off: InkOffset, width: u32, height: u32) -> kurbo::Affine {
    let center = kurbo::Point::new(f64::from(width) / 2.0, f64::from(height) / 2.0);
    kurbo::Affine::translate(kurbo::Vec2::new(off.dx, off.dy))
        * kurbo::Affine::rotate_about(off.rotation.to_radians(), center)
}
