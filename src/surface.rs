//! The retained drawing surface.
//!
//! A [`Surface`] holds an ordered list of objects (bitmaps and editable
//! text), each addressed by a stable [`ObjectHandle`]. Objects are drawn
//! in insertion order, so the last object is on top.
//!
//! Rendering draws every object straight onto one canvas-sized tiny_skia
//! pixmap through its placement transform, so nothing larger than the
//! output is ever allocated.

use image::RgbaImage;
use resvg::tiny_skia::{Color, FilterQuality, Pixmap, PixmapPaint, Point, Transform};

use crate::error::{DesignerError, DesignerResult};
use crate::overlay::text::{TextProps, draw_text};
use crate::svg::FontBook;
use crate::svg::raster::{pixmap_to_rgba_image, rgba_image_to_pixmap};

// ============================================================================
// Geometry
// ============================================================================

/// Surface dimensions in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }
}

impl Default for SurfaceSize {
    fn default() -> Self {
        Self::new(800, 900)
    }
}

/// An axis-aligned rectangle in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && y >= self.top && y <= self.bottom()
    }
}

/// Which point of an object `left`/`top` refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Origin {
    #[default]
    TopLeft,
    Center,
}

/// Position, scale and rotation of an object on the surface.
///
/// `left`/`top` locate the object's [`Origin`]; the object is scaled and
/// then rotated by `angle` degrees (clockwise) around that point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub left: f32,
    pub top: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub angle: f32,
    pub origin: Origin,
}

impl Placement {
    /// Uniformly scaled placement anchored at its center.
    pub fn centered(x: f32, y: f32, scale: f32) -> Self {
        Self {
            left: x,
            top: y,
            scale_x: scale,
            scale_y: scale,
            angle: 0.0,
            origin: Origin::Center,
        }
    }

    pub fn translated(self, dx: f32, dy: f32) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..self
        }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self {
            scale_x: self.scale_x * factor,
            scale_y: self.scale_y * factor,
            ..self
        }
    }

    /// Adds `degrees` to the rotation, kept within `0..360`.
    pub fn rotated(self, degrees: f32) -> Self {
        Self {
            angle: (self.angle + degrees).rem_euclid(360.0),
            ..self
        }
    }

    /// Finite position and angle with a non-zero, finite scale.
    pub fn is_valid(&self) -> bool {
        [self.left, self.top, self.angle].iter().all(|v| v.is_finite())
            && [self.scale_x, self.scale_y]
                .iter()
                .all(|s| s.is_finite() && *s != 0.0)
    }

    /// Maps an object's natural coordinates onto the surface.
    pub fn transform(&self, natural: (f32, f32)) -> Transform {
        let (ax, ay) = match self.origin {
            Origin::TopLeft => (0.0, 0.0),
            Origin::Center => (natural.0 / 2.0, natural.1 / 2.0),
        };
        Transform::from_translate(-ax, -ay)
            .post_scale(self.scale_x, self.scale_y)
            .post_rotate(self.angle)
            .post_translate(self.left, self.top)
    }

    /// Axis-aligned bounds of an object whose unscaled size is `natural`.
    pub fn bounds(&self, natural: (f32, f32)) -> Rect {
        let mut corners = [
            Point::from_xy(0.0, 0.0),
            Point::from_xy(natural.0, 0.0),
            Point::from_xy(0.0, natural.1),
            Point::from_xy(natural.0, natural.1),
        ];
        self.transform(natural).map_points(&mut corners);

        let left = corners.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
        let top = corners.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let right = corners.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
        let bottom = corners.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        Rect {
            left,
            top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Whether a surface point lands on the object itself, rotation included.
    pub fn contains(&self, natural: (f32, f32), x: f32, y: f32) -> bool {
        let Some(inverse) = self.transform(natural).invert() else {
            return false;
        };
        let mut point = [Point::from_xy(x, y)];
        inverse.map_points(&mut point);
        let [p] = point;
        p.x >= 0.0 && p.x <= natural.0 && p.y >= 0.0 && p.y <= natural.1
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            angle: 0.0,
            origin: Origin::TopLeft,
        }
    }
}

// ============================================================================
// Objects
// ============================================================================

/// Stable identity of an object on a [`Surface`].
///
/// Handles survive [`Surface::restack`], so overlay records can keep
/// pointing at their objects across base layer reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectHandle(u64);

/// What an object draws.
#[derive(Debug, Clone, PartialEq)]
pub enum Drawable {
    Image(RgbaImage),
    Text(TextProps),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceObject {
    pub drawable: Drawable,
    pub placement: Placement,

    /// Interactive objects can be selected, hit and moved.
    pub interactive: bool,
}

impl SurfaceObject {
    pub fn image(image: RgbaImage, placement: Placement) -> Self {
        Self {
            drawable: Drawable::Image(image),
            placement,
            interactive: true,
        }
    }

    pub fn text(props: TextProps, placement: Placement) -> Self {
        Self {
            drawable: Drawable::Text(props),
            placement,
            interactive: true,
        }
    }

    pub fn non_interactive(mut self) -> Self {
        self.interactive = false;
        self
    }

    /// Unscaled size in logical pixels.
    pub fn natural_size(&self) -> (f32, f32) {
        match &self.drawable {
            Drawable::Image(img) => (img.width() as f32, img.height() as f32),
            Drawable::Text(props) => props.layout_size(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.placement.bounds(self.natural_size())
    }

    pub fn as_text(&self) -> Option<&TextProps> {
        match &self.drawable {
            Drawable::Text(props) => Some(props),
            Drawable::Image(_) => None,
        }
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.placement.contains(self.natural_size(), x, y)
    }

    /// Draws the object onto a canvas `multiplier` times the surface size.
    fn draw(&self, canvas: &mut Pixmap, multiplier: f32, fonts: &FontBook) -> DesignerResult<()> {
        let transform = self
            .placement
            .transform(self.natural_size())
            .post_scale(multiplier, multiplier);
        match &self.drawable {
            Drawable::Image(img) => {
                let pixmap = rgba_image_to_pixmap(img)?;
                let paint = PixmapPaint {
                    quality: FilterQuality::Bilinear,
                    ..PixmapPaint::default()
                };
                canvas.draw_pixmap(0, 0, pixmap.as_ref(), &paint, transform, None);
            }
            Drawable::Text(props) => draw_text(props, fonts, &mut canvas.as_mut(), transform)?,
        }
        Ok(())
    }
}

// ============================================================================
// Surface
// ============================================================================

/// An ordered collection of drawable objects with a single selection.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    size: SurfaceSize,
    objects: Vec<(ObjectHandle, SurfaceObject)>,
    next_handle: u64,
    selection: Option<ObjectHandle>,
}

impl Surface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    /// Appends an object on top of the others.
    pub fn add(&mut self, object: SurfaceObject) -> ObjectHandle {
        let handle = ObjectHandle(self.next_handle);
        self.next_handle += 1;
        self.objects.push((handle, object));
        handle
    }

    /// Detaches an object, clearing the selection if it pointed there.
    pub fn remove(&mut self, handle: ObjectHandle) -> Option<SurfaceObject> {
        let index = self.objects.iter().position(|(h, _)| *h == handle)?;
        if self.selection == Some(handle) {
            self.selection = None;
        }
        Some(self.objects.remove(index).1)
    }

    pub fn get(&self, handle: ObjectHandle) -> Option<&SurfaceObject> {
        self.objects
            .iter()
            .find(|(h, _)| *h == handle)
            .map(|(_, o)| o)
    }

    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut SurfaceObject> {
        self.objects
            .iter_mut()
            .find(|(h, _)| *h == handle)
            .map(|(_, o)| o)
    }

    pub fn contains(&self, handle: ObjectHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Handles in z-order, bottom first.
    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.objects.iter().map(|(h, _)| *h).collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.selection = None;
    }

    /// Replaces everything with `base` at the bottom followed by the
    /// listed objects, in the listed order.
    ///
    /// Listed objects keep their handles and placement. Handles that are
    /// not on the surface are ignored. Returns the handle of the new base.
    pub fn restack(&mut self, base: SurfaceObject, keep: &[ObjectHandle]) -> ObjectHandle {
        let mut old = std::mem::take(&mut self.objects);
        let kept: Vec<_> = keep
            .iter()
            .filter_map(|handle| {
                let index = old.iter().position(|(h, _)| h == handle)?;
                Some(old.remove(index))
            })
            .collect();

        if self
            .selection
            .is_some_and(|s| !kept.iter().any(|(h, _)| *h == s))
        {
            self.selection = None;
        }

        let base_handle = self.add(base);
        self.objects.extend(kept);
        base_handle
    }

    /// Selects an interactive object, or clears the selection.
    ///
    /// Returns `false` (leaving the selection unchanged) for handles that
    /// are missing or not interactive.
    pub fn select(&mut self, handle: Option<ObjectHandle>) -> bool {
        match handle {
            None => {
                self.selection = None;
                true
            }
            Some(h) if self.get(h).is_some_and(|o| o.interactive) => {
                self.selection = Some(h);
                true
            }
            Some(_) => false,
        }
    }

    pub fn selection(&self) -> Option<ObjectHandle> {
        self.selection
    }

    /// The topmost interactive object under the point.
    pub fn hit_test(&self, x: f32, y: f32) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .rev()
            .find(|(_, o)| o.interactive && o.contains(x, y))
            .map(|(h, _)| *h)
    }

    /// Rasterizes every object over a white background.
    ///
    /// The output is `multiplier` times the surface size; objects are
    /// clipped to it.
    pub fn render(&self, multiplier: f32, fonts: &FontBook) -> DesignerResult<RgbaImage> {
        let multiplier = if multiplier.is_finite() && multiplier > 0.0 {
            multiplier
        } else {
            1.0
        };
        let width = (self.size.width as f32 * multiplier).round().max(1.0) as u32;
        let height = (self.size.height as f32 * multiplier).round().max(1.0) as u32;
        let mut canvas = Pixmap::new(width, height)
            .ok_or_else(|| DesignerError::render(format!("cannot allocate {width}x{height} canvas")))?;
        canvas.fill(Color::WHITE);

        for (_, object) in &self.objects {
            object.draw(&mut canvas, multiplier, fonts)?;
        }

        pixmap_to_rgba_image(&canvas)
    }
}

// ============================================================================
// Tests
// ============================================================================
