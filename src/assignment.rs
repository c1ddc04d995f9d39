//! Per-view color assignment.

use std::collections::HashMap;

use crate::color::HexColor;
use crate::config::ConfigTree;
use crate::error::{DesignerError, DesignerResult};

/// The current color of every layer in the active view.
///
/// Values are SVG paint strings: configured defaults as written, picks as
/// normalized hex. Entries follow the view's layer order. Keys never leave
/// the set of the view's layer ids: [`set`](Self::set) rejects anything
/// else.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorAssignment {
    view_id: String,
    entries: Vec<(String, String)>,
}

impl ColorAssignment {
    /// Seeds an assignment from the view's default colors.
    pub fn for_view(tree: &ConfigTree, view_id: &str) -> DesignerResult<Self> {
        let view = tree
            .view(view_id)
            .ok_or_else(|| DesignerError::UnknownView(view_id.to_string()))?;
        Ok(Self {
            view_id: view.id.clone(),
            entries: view
                .layers
                .iter()
                .map(|l| (l.id.clone(), l.default_color.clone()))
                .collect(),
        })
    }

    /// An assignment with no layers, for views missing from the tree.
    pub fn empty(view_id: impl Into<String>) -> Self {
        Self {
            view_id: view_id.into(),
            entries: Vec::new(),
        }
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn get(&self, layer_id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == layer_id)
            .map(|(_, c)| c.as_str())
    }

    /// Assigns a color to one layer of the view.
    pub fn set(&mut self, layer_id: &str, color: HexColor) -> DesignerResult<()> {
        let slot = self
            .entries
            .iter_mut()
            .find(|(id, _)| id == layer_id)
            .ok_or_else(|| DesignerError::UnknownLayer {
                view: self.view_id.clone(),
                layer: layer_id.to_string(),
            })?;
        slot.1 = color.into();
        Ok(())
    }

    /// Restores every layer to its configured default.
    pub fn reset(&mut self, tree: &ConfigTree) {
        let view_id = std::mem::take(&mut self.view_id);
        *self = Self::for_view(tree, &view_id).unwrap_or_else(|_| Self::empty(view_id));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(id, c)| (id.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> HashMap<String, String> {
        self.entries.iter().cloned().collect()
    }
}
