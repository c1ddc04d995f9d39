//! Lookup of per-view vector documents.
//!
//! Every view's illustration lives at `uniform/<view-id>.svg` relative to
//! an asset root.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{DesignerError, DesignerResult};

/// Relative path of a view's SVG document.
pub fn asset_path(view_id: &str) -> String {
    format!("uniform/{view_id}.svg")
}

/// Somewhere garment SVG documents can be loaded from.
pub trait AssetSource {
    /// Returns the SVG markup for a view.
    ///
    /// A missing document is [`DesignerError::AssetNotFound`].
    fn load_svg(&self, view_id: &str) -> DesignerResult<String>;
}

impl<A: AssetSource + ?Sized> AssetSource for &A {
    fn load_svg(&self, view_id: &str) -> DesignerResult<String> {
        (**self).load_svg(view_id)
    }
}

impl<A: AssetSource + ?Sized> AssetSource for std::sync::Arc<A> {
    fn load_svg(&self, view_id: &str) -> DesignerResult<String> {
        (**self).load_svg(view_id)
    }
}

// ============================================================================
// DirAssets
// ============================================================================

/// Assets served from a static directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    root: PathBuf,
}

impl DirAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for DirAssets {
    fn load_svg(&self, view_id: &str) -> DesignerResult<String> {
        let relative = asset_path(view_id);
        let path = self.root.join(&relative);
        std::fs::read_to_string(&path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => DesignerError::AssetNotFound(relative),
            _ => DesignerError::AssetIo {
                path: path.display().to_string(),
                source,
            },
        })
    }
}

// ============================================================================
// MemoryAssets
// ============================================================================

/// Assets held in memory, keyed by view id.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    documents: HashMap<String, String>,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, view_id: impl Into<String>, svg: impl Into<String>) -> Self {
        self.insert(view_id, svg);
        self
    }

    pub fn insert(&mut self, view_id: impl Into<String>, svg: impl Into<String>) {
        self.documents.insert(view_id.into(), svg.into());
    }
}

impl AssetSource for MemoryAssets {
    fn load_svg(&self, view_id: &str) -> DesignerResult<String> {
        self.documents
            .get(view_id)
            .cloned()
            .ok_or_else(|| DesignerError::AssetNotFound(asset_path(view_id)))
    }
}
