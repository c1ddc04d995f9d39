//! Vector document handling: region recoloring and rasterization.
//!
//! Garment views are SVG documents whose colorable regions carry `id`
//! attributes matching the layer ids of the configuration tree.
//! [`VectorDocument::recolor`] writes fills into those regions and
//! [`RasterCompositor`] turns the result into the surface's base layer.

mod fonts;
pub mod raster;
pub mod recolor;
pub(crate) mod xml;

pub use fonts::FontBook;
pub use raster::{RasterCompositor, render_svg};
pub use recolor::{RecolorReport, VectorDocument};
