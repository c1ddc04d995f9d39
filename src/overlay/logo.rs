//! Uploaded logo images.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;

use crate::error::{DesignerError, DesignerResult};
use crate::overlay::{OverlayId, OverlayKind, OverlayRecord, OverlayStore};
use crate::surface::{ObjectHandle, Origin, Placement, Surface, SurfaceObject};
use crate::svg::{FontBook, render_svg};

/// Logos are scaled to fit a square box of this many logical pixels.
pub const LOGO_BOX: f32 = 100.0;

/// Each file of an upload batch is shifted by this much on both axes.
pub const CASCADE_OFFSET: f32 = 20.0;

/// Larger side, in pixels, at which SVG logos are rasterized.
const SVG_LOGO_RESOLUTION: u32 = 512;

const SVG_MIME: &str = "image/svg+xml";

/// A file picked by the user, as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// The file as a `data:` URL.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }

    fn decode(&self, fonts: &FontBook) -> DesignerResult<RgbaImage> {
        if self.mime_type == SVG_MIME {
            let svg = std::str::from_utf8(&self.bytes)
                .map_err(|e| DesignerError::InvalidSvg(format!("{}: {e}", self.name)))?;
            return render_svg(svg, SVG_LOGO_RESOLUTION, fonts);
        }

        let decoded = image::load_from_memory(&self.bytes).map_err(|source| {
            DesignerError::ImageDecode {
                name: self.name.clone(),
                source,
            }
        })?;
        Ok(decoded.to_rgba8())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogoOverlay {
    pub handle: ObjectHandle,
    pub name: String,

    /// The uploaded bytes as a `data:` URL, for thumbnails.
    pub source_url: String,
}

impl OverlayRecord for LogoOverlay {
    const KIND: OverlayKind = OverlayKind::Logo;

    fn handle(&self) -> ObjectHandle {
        self.handle
    }
}

/// Placement of a `width` x `height` logo: fitted to [`LOGO_BOX`],
/// centered, then shifted by the cascade offset for `batch_index`.
pub fn logo_placement(surface: &Surface, width: u32, height: u32, batch_index: usize) -> Placement {
    let w = width.max(1) as f32;
    let h = height.max(1) as f32;
    let scale = (LOGO_BOX / w).min(LOGO_BOX / h);
    let (cx, cy) = surface.size().center();
    let offset = batch_index as f32 * CASCADE_OFFSET;

    Placement {
        left: cx - w * scale / 2.0 + offset,
        top: cy - h * scale / 2.0 + offset,
        scale_x: scale,
        scale_y: scale,
        angle: 0.0,
        origin: Origin::TopLeft,
    }
}

impl OverlayStore<LogoOverlay> {
    /// Decodes an uploaded image and adds it to the surface and the store.
    ///
    /// Files whose MIME type does not start with `image/` are rejected
    /// before any decoding.
    #[tracing::instrument(skip(self, surface, file, fonts), fields(name = %file.name))]
    pub fn add_logo(
        &mut self,
        surface: &mut Surface,
        file: &UploadedFile,
        batch_index: usize,
        fonts: &FontBook,
    ) -> DesignerResult<OverlayId> {
        if !file.is_image() {
            return Err(DesignerError::InvalidFileType {
                name: file.name.clone(),
                mime_type: file.mime_type.clone(),
            });
        }

        let bitmap = file.decode(fonts)?;
        let placement = logo_placement(surface, bitmap.width(), bitmap.height(), batch_index);
        let handle = surface.add(SurfaceObject::image(bitmap, placement));
        surface.select(Some(handle));

        let id = self.insert(LogoOverlay {
            handle,
            name: file.name.clone(),
            source_url: file.data_url(),
        });
        tracing::debug!(%id, "logo added");
        Ok(id)
    }

    /// Adds a batch of uploads, one result per file.
    ///
    /// A rejected file does not stop the rest; the cascade offset follows
    /// each file's position in the batch.
    pub fn add_logos(
        &mut self,
        surface: &mut Surface,
        files: &[UploadedFile],
        fonts: &FontBook,
    ) -> Vec<DesignerResult<OverlayId>> {
        files
            .iter()
            .enumerate()
            .map(|(index, file)| self.add_logo(surface, file, index, fonts))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Cursor;

    use image::{ImageFormat, Rgba};

    use super::*;
    use crate::surface::SurfaceSize;

    /// A PNG upload of a solid `width` x `height` image.
    pub(crate) fn png_upload(name: &str, width: u32, height: u32) -> UploadedFile {
        let img = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, ImageFormat::Png).unwrap();
        UploadedFile::new(name, "image/png", bytes.into_inner())
    }

    #[test]
    fn rejects_non_images() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let file = UploadedFile::new("notes.txt", "text/plain", b"hello".to_vec());

        let err = logos
            .add_logo(&mut surface, &file, 0, &FontBook::empty())
            .unwrap_err();
        assert_eq!(err.to_string(), "Please select a valid image file: notes.txt");
        assert!(logos.is_empty());
        assert!(surface.is_empty());
    }

    #[test]
    fn undecodable_image_is_an_error() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let file = UploadedFile::new("broken.png", "image/png", vec![1, 2, 3]);

        assert!(matches!(
            logos.add_logo(&mut surface, &file, 0, &FontBook::empty()),
            Err(DesignerError::ImageDecode { .. })
        ));
        assert!(surface.is_empty());
    }

    #[test]
    fn fitted_to_box_and_centered() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let id = logos
            .add_logo(&mut surface, &png_upload("wide.png", 200, 50), 0, &FontBook::empty())
            .unwrap();

        let record = logos.get(id).unwrap();
        assert!(record.source_url.starts_with("data:image/png;base64,"));

        let bounds = surface.get(record.handle).unwrap().bounds();
        assert_eq!((bounds.width, bounds.height), (100.0, 25.0));
        assert_eq!((bounds.left, bounds.top), (350.0, 437.5));
    }

    #[test]
    fn batch_cascades_and_activates_first() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let files = [png_upload("a.png", 10, 10), png_upload("b.png", 10, 10)];

        let ids: Vec<_> = logos
            .add_logos(&mut surface, &files, &FontBook::empty())
            .into_iter()
            .map(Result::unwrap)
            .collect();

        assert_ne!(ids[0], ids[1]);
        assert_eq!(logos.active(), Some(ids[0]));

        let first = surface.get(logos.get(ids[0]).unwrap().handle).unwrap().placement;
        let second = surface.get(logos.get(ids[1]).unwrap().handle).unwrap().placement;
        assert_eq!(second.left - first.left, CASCADE_OFFSET);
        assert_eq!(second.top - first.top, CASCADE_OFFSET);
    }

    #[test]
    fn bad_file_does_not_stop_batch() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let files = [
            UploadedFile::new("doc.pdf", "application/pdf", vec![0]),
            png_upload("ok.png", 10, 10),
        ];

        let results = logos.add_logos(&mut surface, &files, &FontBook::empty());
        assert!(results[0].is_err());
        let id = results[1].as_ref().unwrap();
        assert_eq!(logos.len(), 1);

        let placement = surface.get(logos.get(*id).unwrap().handle).unwrap().placement;
        assert_eq!(placement.left, 400.0 - 50.0 + CASCADE_OFFSET);
    }

    #[test]
    fn svg_logos_are_rasterized() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut logos = OverlayStore::<LogoOverlay>::new();
        let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10"><rect width="20" height="10" fill="#00ff00"/></svg>"##;
        let file = UploadedFile::new("badge.svg", "image/svg+xml", svg.to_vec());

        let id = logos.add_logo(&mut surface, &file, 0, &FontBook::empty()).unwrap();
        let object = surface.get(logos.get(id).unwrap().handle).unwrap();
        assert_eq!(object.natural_size(), (512.0, 256.0));
        assert_eq!(object.bounds().width, 100.0);
        assert!(logos.get(id).unwrap().source_url.starts_with("data:image/svg+xml;base64,"));
    }
}
