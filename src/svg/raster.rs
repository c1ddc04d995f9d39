//! Rasterization of vector documents and pixel format conversion.

use image::RgbaImage;
use resvg::tiny_skia::{ColorU8, Pixmap, Transform};

use crate::error::{DesignerError, DesignerResult};
use crate::surface::{Origin, Placement, SurfaceObject, SurfaceSize};
use crate::svg::{FontBook, VectorDocument};

// ============================================================================
// RasterCompositor
// ============================================================================

/// Turns a recolored garment document into the surface's base layer.
///
/// The document is drawn on a square working canvas of `working_size`
/// pixels, multiplied by `supersample` so the bitmap stays sharp when the
/// surface is exported at a higher multiplier. The bitmap is then placed to
/// fill `fill_ratio` of the surface in both axes.
///
/// # Example
///
/// ```no_run
/// use uniform_designer::{FontBook, RasterCompositor, SurfaceSize, VectorDocument};
///
/// let doc = VectorDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10"/>"#)?;
/// let base = RasterCompositor::default().render(&doc, &FontBook::empty(), SurfaceSize::default())?;
/// assert!(!base.interactive);
/// # Ok::<(), uniform_designer::DesignerError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterCompositor {
    pub working_size: u32,
    pub supersample: u32,
    pub fill_ratio: f32,
}

impl Default for RasterCompositor {
    fn default() -> Self {
        Self {
            working_size: 800,
            supersample: 2,
            fill_ratio: 0.8,
        }
    }
}

impl RasterCompositor {
    /// Side length of the rasterized bitmap.
    pub fn bitmap_side(&self) -> u32 {
        self.working_size.max(1) * self.supersample.max(1)
    }

    /// Rasterizes the document, fitted and centered, onto a square bitmap.
    #[tracing::instrument(skip_all, fields(side = self.bitmap_side()))]
    pub fn rasterize(&self, doc: &VectorDocument, fonts: &FontBook) -> DesignerResult<RgbaImage> {
        let tree = fonts.parse_svg(doc.as_str())?;
        let side = self.bitmap_side();

        let mut pixmap = Pixmap::new(side, side)
            .ok_or_else(|| DesignerError::render(format!("cannot allocate {side}x{side} pixmap")))?;

        let size = tree.size();
        let scale = (side as f32 / size.width()).min(side as f32 / size.height());
        let dx = (side as f32 - size.width() * scale) / 2.0;
        let dy = (side as f32 - size.height() * scale) / 2.0;
        let transform = Transform::from_scale(scale, scale).post_translate(dx, dy);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        pixmap_to_rgba_image(&pixmap)
    }

    /// Placement that fits a bitmap into `fill_ratio` of the surface, centered.
    pub fn placement(&self, width: u32, height: u32, surface: SurfaceSize) -> Placement {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        let scale = (surface.width as f32 * self.fill_ratio / w)
            .min(surface.height as f32 * self.fill_ratio / h);

        Placement {
            left: (surface.width as f32 - w * scale) / 2.0,
            top: (surface.height as f32 - h * scale) / 2.0,
            scale_x: scale,
            scale_y: scale,
            angle: 0.0,
            origin: Origin::TopLeft,
        }
    }

    /// Wraps a rasterized bitmap as the non-interactive base layer.
    pub fn base_layer(&self, bitmap: RgbaImage, surface: SurfaceSize) -> SurfaceObject {
        let placement = self.placement(bitmap.width(), bitmap.height(), surface);
        SurfaceObject::image(bitmap, placement).non_interactive()
    }

    /// Rasterizes the document and places it as the base layer.
    pub fn render(
        &self,
        doc: &VectorDocument,
        fonts: &FontBook,
        surface: SurfaceSize,
    ) -> DesignerResult<SurfaceObject> {
        let bitmap = self.rasterize(doc, fonts)?;
        Ok(self.base_layer(bitmap, surface))
    }
}

// ============================================================================
// SVG Rendering
// ============================================================================

/// Renders SVG markup so that its larger dimension is `size` pixels.
///
/// Aspect ratio is preserved.
pub fn render_svg(svg_data: &str, size: u32, fonts: &FontBook) -> DesignerResult<RgbaImage> {
    let tree = fonts.parse_svg(svg_data)?;

    let svg_size = tree.size();
    let scale = (size as f32) / svg_size.width().max(svg_size.height());
    let width = (svg_size.width() * scale).ceil().max(1.0) as u32;
    let height = (svg_size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| DesignerError::render(format!("cannot allocate {width}x{height} pixmap")))?;
    resvg::render(&tree, Transform::from_scale(scale, scale), &mut pixmap.as_mut());

    pixmap_to_rgba_image(&pixmap)
}

/// Converts a premultiplied tiny_skia pixmap to a straight-alpha image.
pub(crate) fn pixmap_to_rgba_image(pixmap: &Pixmap) -> DesignerResult<RgbaImage> {
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data)
        .ok_or_else(|| DesignerError::render("pixmap buffer size mismatch"))
}

/// Converts a straight-alpha image to a premultiplied tiny_skia pixmap.
pub(crate) fn rgba_image_to_pixmap(image: &RgbaImage) -> DesignerResult<Pixmap> {
    let (width, height) = image.dimensions();
    let mut pixmap = Pixmap::new(width, height)
        .ok_or_else(|| DesignerError::render(format!("cannot allocate {width}x{height} pixmap")))?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

// ============================================================================
// Tests
// ============================================================================
