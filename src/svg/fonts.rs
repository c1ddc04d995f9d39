//! Shared font database for SVG and text rendering.

use std::fmt;
use std::sync::Arc;

use resvg::usvg::{self, fontdb};

use crate::error::{DesignerError, DesignerResult};

/// A cheaply clonable handle to a font database.
///
/// Loading system fonts is slow, so a session loads them once and hands
/// clones of the book to every render.
#[derive(Clone)]
pub struct FontBook {
    db: Arc<fontdb::Database>,
}

impl FontBook {
    /// A book with no fonts. Text renders as nothing.
    pub fn empty() -> Self {
        Self {
            db: Arc::new(fontdb::Database::new()),
        }
    }

    /// A book holding every font installed on the system.
    pub fn system() -> Self {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "loaded system fonts");
        Self { db: Arc::new(db) }
    }

    /// Adds a font file (TTF, OTF, TTC) to the book.
    pub fn add_font_data(&mut self, data: Vec<u8>) {
        Arc::make_mut(&mut self.db).load_font_data(data);
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Parses SVG markup with this book's fonts available to `<text>`.
    pub(crate) fn parse_svg(&self, svg: &str) -> DesignerResult<usvg::Tree> {
        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.db);
        usvg::Tree::from_str(svg, &options).map_err(|e| DesignerError::InvalidSvg(e.to_string()))
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for FontBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontBook")
            .field("faces", &self.db.len())
            .finish()
    }
}
