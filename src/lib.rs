//! uniform-designer: headless engine for customizing garment illustrations
//!
//! A [`Designer`] session picks a garment view, recolors the named regions
//! of its SVG illustration, lets the user place logo images and styled
//! text on top, and exports the result as a PNG. An [`AdminSession`]
//! edits the garment → view → layer configuration and moves it in and
//! out of JSON.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uniform_designer::{ConfigTree, Designer, HexColor, MemoryAssets, SurfaceSize, UploadedFile};
//!
//! let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
//!   <rect id="pants-body-front" width="10" height="10"/>
//! </svg>"##;
//! let config = Arc::new(ConfigTree::builtin());
//! let mut designer = Designer::new(config, MemoryAssets::new().with("pants-front", svg))
//!     .with_surface_size(SurfaceSize::new(200, 225));
//!
//! designer.select_view("pants-front")?;
//! designer.set_color("pants-body-front", HexColor::parse("#27AE60")?)?;
//!
//! let upload = UploadedFile::new("notes.txt", "text/plain", b"hi".to_vec());
//! assert!(designer.upload_logos(&[upload])[0].is_err());
//!
//! let png = designer.export(1_700_000_000_000)?;
//! assert_eq!(png.file_name, "uniform-pants-front-1700000000000.png");
//! # Ok::<(), uniform_designer::DesignerError>(())
//! ```
//!
//! # Administration
//!
//! ```
//! use uniform_designer::{AdminSession, ConfigTree};
//!
//! let mut admin = AdminSession::new(&ConfigTree::builtin());
//! admin.add_uniform("jacket", "Jacket")?;
//! admin.add_view("jacket", "jacket-front", "Jacket Front")?;
//!
//! // Declined confirmations leave the tree alone.
//! assert!(!admin.delete_uniform("jacket", |_: &str| false)?);
//!
//! let json = admin.export_json()?;
//! assert!(ConfigTree::from_json(&json)?.uniform("jacket").is_some());
//! # Ok::<(), uniform_designer::DesignerError>(())
//! ```

mod admin;
mod assets;
mod assignment;
mod color;
mod config;
mod designer;
mod editor;
mod error;
mod export;
mod notice;
pub mod overlay;
mod surface;
pub mod svg;

pub use admin::{AdminSession, CONFIG_FILE_NAME, Confirm};
pub use assets::{AssetSource, DirAssets, MemoryAssets, asset_path};
pub use assignment::ColorAssignment;
pub use color::{COLOR_PRESETS, HexColor};
pub use config::{ConfigTree, UniformConfig, UniformLayer, UniformView, ViewSummary};
pub use designer::{BaseLayer, Designer, ReloadOutcome, ReloadStatus, ReloadTicket};
pub use editor::{EditorState, TextEditor};
pub use error::{DesignerError, DesignerResult};
pub use export::{EXPORT_MULTIPLIER, ExportedImage, export_file_name, export_png};
pub use notice::{Notice, NoticeLevel};
pub use overlay::{
    FontStyle, FontWeight, LogoOverlay, LogoStore, OverlayId, OverlayKind, OverlayStore,
    TextAlign, TextOverlay, TextProps, TextStore, TextStyle, UploadedFile,
};
pub use surface::{
    Drawable, ObjectHandle, Origin, Placement, Rect, Surface, SurfaceObject, SurfaceSize,
};
pub use svg::{FontBook, RasterCompositor, RecolorReport, VectorDocument};
