//! PNG export of the drawing surface.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};

use crate::error::{DesignerError, DesignerResult};
use crate::surface::Surface;
use crate::svg::FontBook;

/// Exports are rendered at this multiple of the surface size.
pub const EXPORT_MULTIPLIER: f32 = 4.0;

/// `uniform-<view-id>-<timestamp>.png`
pub fn export_file_name(view_id: &str, timestamp_ms: u64) -> String {
    format!("uniform-{view_id}-{timestamp_ms}.png")
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// An encoded export, ready to be offered as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl ExportedImage {
    /// Writes the PNG into `dir` under its file name.
    pub fn save_in(&self, dir: impl AsRef<Path>) -> DesignerResult<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.png)?;
        Ok(path)
    }
}

/// Renders the surface at [`EXPORT_MULTIPLIER`] and encodes it as PNG.
#[tracing::instrument(skip(surface, fonts))]
pub fn export_png(
    surface: &Surface,
    fonts: &FontBook,
    view_id: &str,
    timestamp_ms: u64,
) -> DesignerResult<ExportedImage> {
    let img = surface.render(EXPORT_MULTIPLIER, fonts)?;
    let (width, height) = img.dimensions();

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgba8)
        .map_err(DesignerError::Encode)?;

    let file_name = export_file_name(view_id, timestamp_ms);
    tracing::info!(%file_name, width, height, bytes = png.len(), "exported image");
    Ok(ExportedImage {
        file_name,
        width,
        height,
        png,
    })
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;
    use crate::surface::{Placement, SurfaceObject, SurfaceSize};

    #[test]
    fn file_name_format() {
        assert_eq!(
            export_file_name("shirt-front", 1700000000000),
            "uniform-shirt-front-1700000000000.png"
        );
    }

    #[test]
    fn export_is_four_times_surface() {
        let mut surface = Surface::new(SurfaceSize::new(20, 30));
        surface.add(SurfaceObject::image(
            RgbaImage::from_pixel(5, 5, Rgba([0, 128, 0, 255])),
            Placement::default(),
        ));

        let export = export_png(&surface, &FontBook::empty(), "pants-back", 42).unwrap();
        assert_eq!((export.width, export.height), (80, 120));
        assert_eq!(export.file_name, "uniform-pants-back-42.png");

        let decoded = image::load_from_memory(&export.png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (80, 120));
        assert_eq!(decoded.get_pixel(2, 2).0, [0, 128, 0, 255]);
        assert_eq!(decoded.get_pixel(79, 119).0, [255, 255, 255, 255]);
    }

    #[test]
    fn save_in_writes_file() {
        let dir = std::env::temp_dir().join(format!("uniform-export-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let export = export_png(
            &Surface::new(SurfaceSize::new(4, 4)),
            &FontBook::empty(),
            "shirt-back",
            1,
        )
        .unwrap();
        let path = export.save_in(&dir).unwrap();

        assert!(path.ends_with("uniform-shirt-back-1.png"));
        assert_eq!(std::fs::read(&path).unwrap(), export.png);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
