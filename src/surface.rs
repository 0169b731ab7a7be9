use crate::error::{RisoError, RisoResult};

/// An owned premultiplied-RGBA8 raster with explicit dimensions.
///
/// This is the raster currency of the engine: one per ink layer, one for
/// the composited output. The alpha channel carries ink density; RGB is
/// ignored until tinting. Drawing happens through [`Surface::draw`], which
/// hands the closure a fresh `vello_cpu` render context sized to the
/// surface and composites the recorded commands over the current content.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> RisoResult<Self> {
        if width == 0 || height == 0 {
            return Err(RisoError::validation("surface dimensions must be > 0"));
        }
        let width: u16 = width
            .try_into()
            .map_err(|_| RisoError::evaluation("surface width exceeds u16"))?;
        let height: u16 = height
            .try_into()
            .map_err(|_| RisoError::evaluation("surface height exceeds u16"))?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    pub fn data(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Overwrite every pixel with one premultiplied RGBA value.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Reset to fully transparent.
    pub fn clear(&mut self) {
        self.fill([0, 0, 0, 0]);
    }

    /// Run drawing commands against this surface.
    pub fn draw<F>(&mut self, f: F)
    where
        F: FnOnce(&mut vello_cpu::RenderContext),
    {
        let mut ctx = vello_cpu::RenderContext::new(self.width, self.height);
        f(&mut ctx);
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
    }

    /// Alpha (density) at a pixel; out-of-bounds reads are empty.
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width() || y >= self.height() {
            return 0;
        }
        let idx = (y as usize * self.width() as usize + x as usize) * 4;
        self.data()[idx + 3]
    }

    /// Returns `true` when no pixel carries any density.
    pub fn is_empty(&self) -> bool {
        self.data().chunks_exact(4).all(|px| px[3] == 0)
    }
}

/// Wrap a premultiplied RGBA8 buffer as an image paint for resampled
/// drawing (the misregistration pass).
pub(crate) fn image_paint_from_premul(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> RisoResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| RisoError::evaluation("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| RisoError::evaluation("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(RisoError::evaluation(
            "image_paint_from_premul expects bytes matching width*height*4",
        ));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(
            vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities),
        )),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

pub(crate) fn affine_to_cpu(a: kurbo::Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

pub(crate) fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

pub(crate) fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}
