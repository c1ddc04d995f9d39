//! The configuration tree: garments, their views and colorable layers.
//!
//! A [`ConfigTree`] is a JSON array of [`UniformConfig`]s. The designer
//! loads it once at startup and shares it immutably; the admin session
//! works on its own copy.
//!
//! # JSON Format
//!
//! ```json
//! [
//!   {
//!     "id": "pants",
//!     "name": "Pants",
//!     "views": {
//!       "pants-front": {
//!         "id": "pants-front",
//!         "label": "Pants Front",
//!         "layers": [
//!           { "id": "pants-body-front", "label": "Pants Body", "defaultColor": "#4A90E2" }
//!         ]
//!       }
//!     }
//!   }
//! ]
//! ```
//!
//! Imported files go through [`ConfigTree::import`], which only insists
//! on well-formed JSON. Pieces that do not fit the shape above are
//! dropped, so they show up later as missing views or layers.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// The configuration shipped with the crate.
const BUILTIN_CONFIG: &str = include_str!("uniforms.json");

// ============================================================================
// Configuration Types
// ============================================================================

/// A named, colorable region of a garment view.
///
/// The `id` must match the `id` attribute of an element in the view's SVG.
/// `default_color` is written into the SVG as-is, so any SVG paint works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct UniformLayer {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default, deserialize_with = "paint")]
    #[cfg_attr(feature = "jsonschema", schemars(with = "String"))]
    pub default_color: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One visual facet (front, back) of a garment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct UniformView {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub label: String,

    /// Layers in display order.
    #[serde(default)]
    pub layers: Vec<UniformLayer>,
}

/// Any JSON scalar as a paint string; `null` means no color.
fn paint<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl UniformView {
    pub fn layer(&self, layer_id: &str) -> Option<&UniformLayer> {
        self.layers.iter().find(|l| l.id == layer_id)
    }
}

/// A garment and its views, keyed by view id in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct UniformConfig {
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub views: IndexMap<String, UniformView>,
}

impl UniformConfig {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            views: IndexMap::new(),
        }
    }
}

/// A view as listed by the view selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub id: String,
    pub label: String,
    pub uniform_name: String,
}

// ============================================================================
// ConfigTree
// ============================================================================

/// The full set of garments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct ConfigTree {
    uniforms: Vec<UniformConfig>,
}

impl ConfigTree {
    pub fn new(uniforms: Vec<UniformConfig>) -> Self {
        Self { uniforms }
    }

    /// The built-in shirt and pants configuration.
    pub fn builtin() -> Self {
        match Self::from_json(BUILTIN_CONFIG) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::error!(%err, "built-in uniform configuration failed to parse");
                Self::default()
            }
        }
    }

    pub fn uniforms(&self) -> &[UniformConfig] {
        &self.uniforms
    }

    pub(crate) fn uniforms_mut(&mut self) -> &mut Vec<UniformConfig> {
        &mut self.uniforms
    }

    pub fn uniform(&self, id: &str) -> Option<&UniformConfig> {
        self.uniforms.iter().find(|u| u.id == id)
    }

    /// Every view of every garment, in configuration order.
    ///
    /// Garments without views contribute nothing.
    pub fn all_views(&self) -> Vec<ViewSummary> {
        self.uniforms
            .iter()
            .flat_map(|uniform| {
                uniform.views.values().map(|view| ViewSummary {
                    id: view.id.clone(),
                    label: view.label.clone(),
                    uniform_name: uniform.name.clone(),
                })
            })
            .collect()
    }

    /// Finds a view by its own `id`, searching every garment.
    pub fn view(&self, view_id: &str) -> Option<&UniformView> {
        self.uniforms
            .iter()
            .flat_map(|u| u.views.values())
            .find(|v| v.id == view_id)
    }

    /// Layers of a view, or an empty slice if the view is unknown.
    pub fn layers_for_view(&self, view_id: &str) -> &[UniformLayer] {
        self.view(view_id).map(|v| v.layers.as_slice()).unwrap_or(&[])
    }

    /// One entry per layer of the view, valued by its default color.
    pub fn default_colors_for_view(&self, view_id: &str) -> HashMap<String, String> {
        self.layers_for_view(view_id)
            .iter()
            .map(|layer| (layer.id.clone(), layer.default_color.clone()))
            .collect()
    }

    /// Default colors for every layer of every view.
    ///
    /// Later views win when two views share a layer id.
    pub fn all_default_colors(&self) -> HashMap<String, String> {
        self.uniforms
            .iter()
            .flat_map(|u| u.views.values())
            .flat_map(|v| v.layers.iter())
            .map(|layer| (layer.id.clone(), layer.default_color.clone()))
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads a hand-edited or exported file.
    ///
    /// Fails only on malformed JSON. A top level that is not an array
    /// gives an empty tree, and garments that do not deserialize are
    /// left out.
    pub fn import(json: &str) -> Result<Self, serde_json::Error> {
        let serde_json::Value::Array(items) = serde_json::from_str(json)? else {
            tracing::warn!("imported configuration is not an array of uniforms");
            return Ok(Self::default());
        };

        let uniforms = items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match serde_json::from_value(item) {
                Ok(uniform) => Some(uniform),
                Err(err) => {
                    tracing::warn!(index, %err, "skipping malformed uniform");
                    None
                }
            })
            .collect();
        Ok(Self { uniforms })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lists_four_views_in_order() {
        let tree = ConfigTree::builtin();
        let ids: Vec<_> = tree.all_views().into_iter().map(|v| v.id).collect();
        assert_eq!(ids, ["shirt-front", "shirt-back", "pants-front", "pants-back"]);
        assert_eq!(tree.all_views()[2].uniform_name, "Pants");
    }

    #[test]
    fn pants_front_defaults_are_exact() {
        let tree = ConfigTree::builtin();
        let colors = tree.default_colors_for_view("pants-front");

        let expected: HashMap<String, String> = [
            ("pants-body-front", "#4A90E2"),
            ("pants-waistband-front", "#34495E"),
            ("pants-pockets-front", "#34495E"),
            ("pants-seams-front", "#2C3E50"),
            ("pants-zipper-front", "#2C3E50"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        assert_eq!(colors, expected);
    }

    #[test]
    fn defaults_have_one_entry_per_layer() {
        let tree = ConfigTree::builtin();
        for view in tree.all_views() {
            let layers = tree.layers_for_view(&view.id);
            let colors = tree.default_colors_for_view(&view.id);
            assert_eq!(colors.len(), layers.len(), "view {}", view.id);
            for layer in layers {
                assert_eq!(colors[&layer.id], layer.default_color);
            }
        }
    }

    #[test]
    fn unknown_view_is_empty() {
        let tree = ConfigTree::builtin();
        assert!(tree.view("hat-front").is_none());
        assert!(tree.layers_for_view("hat-front").is_empty());
        assert!(tree.default_colors_for_view("hat-front").is_empty());
    }

    #[test]
    fn all_default_colors_covers_every_layer() {
        let tree = ConfigTree::builtin();
        let all = tree.all_default_colors();
        assert_eq!(all.len(), 7 + 5 + 5 + 4);
        assert_eq!(all["shirt-yoke-back"], "#34495E");
    }

    #[test]
    fn garment_without_views_contributes_nothing() {
        let tree = ConfigTree::from_json(r#"[{"id": "cap", "name": "Cap"}]"#).unwrap();
        assert_eq!(tree.uniforms().len(), 1);
        assert!(tree.all_views().is_empty());
    }

    #[test]
    fn import_only_rejects_bad_json() {
        assert!(ConfigTree::import("{ not json").is_err());
        assert!(ConfigTree::import(r#"{"id": "cap"}"#).unwrap().uniforms().is_empty());

        let tree = ConfigTree::import(
            r#"[
                {"id": "cap", "views": {"cap-front": {"id": "cap-front", "layers": [
                    {"id": "crown", "defaultColor": "red"},
                    {"id": "brim"}
                ]}}},
                {"id": "broken", "views": 5}
            ]"#,
        )
        .unwrap();
        assert_eq!(tree.uniforms().len(), 1);
        let colors = tree.default_colors_for_view("cap-front");
        assert_eq!(colors["crown"], "red");
        assert_eq!(colors["brim"], "");
    }

    #[test]
    fn json_keeps_camel_case_and_view_order() {
        let tree = ConfigTree::builtin();
        let json = tree.to_json_pretty().unwrap();
        assert!(json.contains("\"defaultColor\""));
        assert!(!json.contains("\"description\""));

        let restored = ConfigTree::from_json(&json).unwrap();
        assert_eq!(restored, tree);
        let shirt = restored.uniform("shirt").unwrap();
        let order: Vec<_> = shirt.views.keys().cloned().collect();
        assert_eq!(order, ["shirt-front", "shirt-back"]);
    }
}
