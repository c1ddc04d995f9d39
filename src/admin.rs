//! Administration of the configuration tree.
//!
//! An [`AdminSession`] edits its own copy of a [`ConfigTree`]; designer
//! sessions keep the tree they were started with. Deletions ask a
//! [`Confirm`] prompt first.

use std::path::{Path, PathBuf};

use crate::color::HexColor;
use crate::config::{ConfigTree, UniformConfig, UniformLayer, UniformView};
use crate::error::{DesignerError, DesignerResult};
use crate::notice::Notice;

/// File name used by [`AdminSession::export_to`].
pub const CONFIG_FILE_NAME: &str = "uniform-config.json";

/// A yes/no question put to the user before a destructive change.
pub trait Confirm {
    fn confirm(&mut self, question: &str) -> bool;
}

impl<F: FnMut(&str) -> bool> Confirm for F {
    fn confirm(&mut self, question: &str) -> bool {
        self(question)
    }
}

fn required(value: &str) -> bool {
    !value.trim().is_empty()
}

#[derive(Debug, Clone, Default)]
pub struct AdminSession {
    tree: ConfigTree,
    notices: Vec<Notice>,
}

impl AdminSession {
    /// Starts editing a copy of `tree`.
    pub fn new(tree: &ConfigTree) -> Self {
        Self {
            tree: tree.clone(),
            notices: Vec::new(),
        }
    }

    pub fn tree(&self) -> &ConfigTree {
        &self.tree
    }

    pub fn into_tree(self) -> ConfigTree {
        self.tree
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn uniform_mut(&mut self, id: &str) -> DesignerResult<&mut UniformConfig> {
        self.tree
            .uniforms_mut()
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DesignerError::UnknownUniform(id.to_string()))
    }

    fn view_mut(&mut self, uniform_id: &str, view_id: &str) -> DesignerResult<&mut UniformView> {
        self.uniform_mut(uniform_id)?
            .views
            .get_mut(view_id)
            .ok_or_else(|| DesignerError::UnknownView(view_id.to_string()))
    }

    fn record<T>(&mut self, result: DesignerResult<T>, success: &str) -> DesignerResult<T> {
        match &result {
            Ok(_) => self.notices.push(Notice::success(success)),
            Err(err) => {
                tracing::warn!(%err, "admin operation rejected");
                self.notices.push(Notice::error(err.to_string()));
            }
        }
        result
    }

    // ------------------------------------------------------------------------
    // Garments
    // ------------------------------------------------------------------------

    /// Adds an empty garment. Both fields are required and the id must be new.
    pub fn add_uniform(&mut self, id: &str, name: &str) -> DesignerResult<()> {
        let result = if !required(id) || !required(name) {
            Err(DesignerError::MissingField("both ID and Name"))
        } else if self.tree.uniform(id).is_some() {
            Err(DesignerError::Duplicate {
                kind: "Uniform",
                id: id.to_string(),
            })
        } else {
            self.tree.uniforms_mut().push(UniformConfig::new(id, name));
            Ok(())
        };
        self.record(result, "Uniform configuration added successfully!")
    }

    pub fn rename_uniform(&mut self, id: &str, name: &str) -> DesignerResult<()> {
        let result = if required(name) {
            self.uniform_mut(id).map(|u| u.name = name.to_string())
        } else {
            Err(DesignerError::MissingField("Name"))
        };
        self.record(result, "Configuration saved successfully!")
    }

    /// Replaces the garment with the same id.
    pub fn save_uniform(&mut self, config: UniformConfig) -> DesignerResult<()> {
        let result = self.uniform_mut(&config.id).map(|slot| *slot = config);
        self.record(result, "Configuration saved successfully!")
    }

    /// Deletes a garment if the user confirms. Returns whether it was deleted.
    pub fn delete_uniform(&mut self, id: &str, mut confirm: impl Confirm) -> DesignerResult<bool> {
        if self.tree.uniform(id).is_none() {
            return self.record(
                Err(DesignerError::UnknownUniform(id.to_string())),
                "",
            );
        }
        if !confirm.confirm("Are you sure you want to delete this uniform configuration?") {
            return Ok(false);
        }
        self.tree.uniforms_mut().retain(|u| u.id != id);
        self.record(Ok(true), "Configuration deleted successfully!")
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    /// Adds an empty view to a garment.
    pub fn add_view(&mut self, uniform_id: &str, view_id: &str, label: &str) -> DesignerResult<()> {
        let result = if !required(view_id) || !required(label) {
            Err(DesignerError::MissingField("view ID and label"))
        } else {
            self.uniform_mut(uniform_id).and_then(|uniform| {
                if uniform.views.contains_key(view_id) {
                    return Err(DesignerError::Duplicate {
                        kind: "View",
                        id: view_id.to_string(),
                    });
                }
                uniform.views.insert(
                    view_id.to_string(),
                    UniformView {
                        id: view_id.to_string(),
                        label: label.to_string(),
                        layers: Vec::new(),
                    },
                );
                Ok(())
            })
        };
        self.record(result, "View added successfully!")
    }

    pub fn delete_view(
        &mut self,
        uniform_id: &str,
        view_id: &str,
        mut confirm: impl Confirm,
    ) -> DesignerResult<bool> {
        if let Err(err) = self.view_mut(uniform_id, view_id) {
            return self.record(Err(err), "");
        }
        if !confirm.confirm("Are you sure you want to delete this view?") {
            return Ok(false);
        }
        let result = self.uniform_mut(uniform_id).map(|u| {
            u.views.shift_remove(view_id);
            true
        });
        self.record(result, "View deleted successfully!")
    }

    // ------------------------------------------------------------------------
    // Layers
    // ------------------------------------------------------------------------

    /// Appends a layer to a view.
    pub fn add_layer(
        &mut self,
        uniform_id: &str,
        view_id: &str,
        layer_id: &str,
        label: &str,
        default_color: HexColor,
    ) -> DesignerResult<()> {
        let result = if !required(layer_id) || !required(label) {
            Err(DesignerError::MissingField("layer ID and label"))
        } else {
            self.view_mut(uniform_id, view_id).and_then(|view| {
                if view.layer(layer_id).is_some() {
                    return Err(DesignerError::Duplicate {
                        kind: "Layer",
                        id: layer_id.to_string(),
                    });
                }
                view.layers.push(UniformLayer {
                    id: layer_id.to_string(),
                    label: label.to_string(),
                    default_color: default_color.into(),
                    description: None,
                });
                Ok(())
            })
        };
        self.record(result, "Layer added successfully!")
    }

    pub fn delete_layer(
        &mut self,
        uniform_id: &str,
        view_id: &str,
        layer_id: &str,
        mut confirm: impl Confirm,
    ) -> DesignerResult<bool> {
        let exists = self
            .view_mut(uniform_id, view_id)
            .and_then(|view| {
                view.layer(layer_id).map(|_| ()).ok_or_else(|| DesignerError::UnknownLayer {
                    view: view_id.to_string(),
                    layer: layer_id.to_string(),
                })
            });
        if let Err(err) = exists {
            return self.record(Err(err), "");
        }
        if !confirm.confirm("Are you sure you want to delete this layer?") {
            return Ok(false);
        }
        let result = self.view_mut(uniform_id, view_id).map(|view| {
            view.layers.retain(|l| l.id != layer_id);
            true
        });
        self.record(result, "Layer deleted successfully!")
    }

    // ------------------------------------------------------------------------
    // Import / Export
    // ------------------------------------------------------------------------

    /// The whole tree as pretty-printed JSON.
    pub fn export_json(&self) -> DesignerResult<String> {
        Ok(self.tree.to_json_pretty()?)
    }

    /// Writes [`CONFIG_FILE_NAME`] into `dir`.
    #[tracing::instrument(skip(self, dir))]
    pub fn export_to(&mut self, dir: impl AsRef<Path>) -> DesignerResult<PathBuf> {
        let path = dir.as_ref().join(CONFIG_FILE_NAME);
        let result = self
            .export_json()
            .and_then(|json| Ok(std::fs::write(&path, json)?))
            .map(|()| path);
        if let Ok(path) = &result {
            tracing::info!(path = %path.display(), "exported configuration");
        }
        self.record(result, "Configuration exported successfully!")
    }

    /// Replaces the tree with an imported one.
    ///
    /// Only malformed JSON is refused, and it leaves the tree untouched.
    /// Structure is not checked here; see [`ConfigTree::import`].
    pub fn import_json(&mut self, json: &str) -> DesignerResult<()> {
        match ConfigTree::import(json) {
            Ok(tree) => {
                tracing::info!(uniforms = tree.uniforms().len(), "imported configuration");
                self.tree = tree;
                self.notices
                    .push(Notice::success("Configuration imported successfully!"));
                Ok(())
            }
            Err(err) => {
                tracing::warn!(%err, "rejected configuration import");
                self.notices.push(Notice::error("Invalid configuration file"));
                Err(DesignerError::MalformedImport(err))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeLevel;

    fn session() -> AdminSession {
        AdminSession::new(&ConfigTree::builtin())
    }

    fn yes(_: &str) -> bool {
        true
    }

    fn no(_: &str) -> bool {
        false
    }

    #[test]
    fn edits_do_not_touch_source_tree() {
        let source = ConfigTree::builtin();
        let mut admin = AdminSession::new(&source);
        admin.add_uniform("jacket", "Jacket").unwrap();
        assert!(source.uniform("jacket").is_none());
        assert!(admin.tree().uniform("jacket").is_some());
    }

    #[test]
    fn add_uniform_validates() {
        let mut admin = session();
        assert_eq!(
            admin.add_uniform("", "Jacket").unwrap_err().to_string(),
            "Please fill in both ID and Name"
        );
        assert!(matches!(
            admin.add_uniform("shirt", "Shirt 2"),
            Err(DesignerError::Duplicate { kind: "Uniform", .. })
        ));
        assert_eq!(admin.tree().uniforms().len(), 2);

        let notices = admin.drain_notices();
        assert!(notices.iter().all(|n| n.level == NoticeLevel::Error));
    }

    #[test]
    fn views_and_layers_round_through_tree() {
        let mut admin = session();
        admin.add_uniform("jacket", "Jacket").unwrap();
        admin.add_view("jacket", "jacket-front", "Jacket Front").unwrap();
        admin
            .add_layer(
                "jacket",
                "jacket-front",
                "jacket-body-front",
                "Body",
                HexColor::parse("#16A085").unwrap(),
            )
            .unwrap();

        let tree = admin.tree();
        let views: Vec<_> = tree.all_views().into_iter().map(|v| v.id).collect();
        assert_eq!(views.last().map(String::as_str), Some("jacket-front"));
        assert_eq!(
            tree.default_colors_for_view("jacket-front")["jacket-body-front"].as_str(),
            "#16A085"
        );
    }

    #[test]
    fn duplicates_within_scope_are_rejected() {
        let mut admin = session();
        assert!(matches!(
            admin.add_view("shirt", "shirt-front", "Again"),
            Err(DesignerError::Duplicate { kind: "View", .. })
        ));
        assert!(matches!(
            admin.add_layer("pants", "pants-front", "pants-body-front", "Body", HexColor::black()),
            Err(DesignerError::Duplicate { kind: "Layer", .. })
        ));
        assert!(matches!(
            admin.add_view("hat", "hat-front", "Hat"),
            Err(DesignerError::UnknownUniform(_))
        ));
        assert_eq!(
            admin.add_view("shirt", " ", "Label").unwrap_err().to_string(),
            "Please fill in view ID and label"
        );
    }

    #[test]
    fn declined_delete_changes_nothing() {
        let mut admin = session();
        let before = admin.tree().clone();

        assert!(!admin.delete_uniform("shirt", no).unwrap());
        assert!(!admin.delete_view("shirt", "shirt-back", no).unwrap());
        assert!(!admin.delete_layer("pants", "pants-back", "pants-seams-back", no).unwrap());
        assert_eq!(admin.tree(), &before);
    }

    #[test]
    fn confirmed_deletes() {
        let mut admin = session();
        let mut asked = Vec::new();
        let recorder = |q: &str| {
            asked.push(q.to_string());
            true
        };

        assert!(admin.delete_layer("pants", "pants-back", "pants-seams-back", recorder).unwrap());
        assert_eq!(admin.tree().layers_for_view("pants-back").len(), 3);
        assert_eq!(asked, ["Are you sure you want to delete this layer?"]);

        assert!(admin.delete_view("shirt", "shirt-front", yes).unwrap());
        assert!(admin.tree().view("shirt-front").is_none());

        assert!(admin.delete_uniform("pants", yes).unwrap());
        assert!(admin.tree().uniform("pants").is_none());
        assert!(admin.delete_uniform("pants", yes).is_err());
    }

    #[test]
    fn rename_and_save() {
        let mut admin = session();
        admin.rename_uniform("pants", "Trousers").unwrap();
        assert_eq!(admin.tree().uniform("pants").unwrap().name, "Trousers");

        let mut shirt = admin.tree().uniform("shirt").unwrap().clone();
        shirt.views.shift_remove("shirt-back");
        admin.save_uniform(shirt).unwrap();
        assert_eq!(admin.tree().uniform("shirt").unwrap().views.len(), 1);

        assert!(admin.save_uniform(UniformConfig::new("hat", "Hat")).is_err());
    }

    #[test]
    fn import_garment_without_views() {
        let mut admin = session();
        admin
            .import_json(r#"[{"id": "cap", "name": "Cap"}]"#)
            .unwrap();
        assert_eq!(admin.tree().uniforms().len(), 1);
        assert!(admin.tree().all_views().is_empty());
    }

    #[test]
    fn malformed_import_leaves_tree() {
        let mut admin = session();
        let before = admin.tree().clone();

        let err = admin.import_json("{ not json").unwrap_err();
        assert!(matches!(err, DesignerError::MalformedImport(_)));
        assert_eq!(admin.tree(), &before);
        assert_eq!(
            admin.drain_notices(),
            [Notice::error("Invalid configuration file")]
        );
    }

    #[test]
    fn import_accepts_any_paint_and_odd_shapes() {
        let mut admin = session();
        admin
            .import_json(
                r##"[{"id": "cap", "views": {"cap-front": {"id": "cap-front", "layers": [
                    {"id": "crown", "defaultColor": "red"},
                    {"id": "brim", "defaultColor": "#aé123"}
                ]}}}]"##,
            )
            .unwrap();
        let colors = admin.tree().default_colors_for_view("cap-front");
        assert_eq!(colors["crown"], "red");
        assert_eq!(colors["brim"], "#aé123");

        // Parses, but is not a list of uniforms: the views just disappear.
        admin.import_json(r#"{"shirt": {}}"#).unwrap();
        assert!(admin.tree().all_views().is_empty());
        assert!(admin.tree().view("shirt-front").is_none());
    }

    #[test]
    fn layer_color_must_be_hex() {
        let mut admin = session();
        assert!(matches!(
            "#aé123".parse::<HexColor>(),
            Err(DesignerError::InvalidColor(_))
        ));
        admin.add_view("shirt", "shirt-side", "Shirt Side").unwrap();
        let color = HexColor::parse("#abc").unwrap();
        admin
            .add_layer("shirt", "shirt-side", "sleeve", "Sleeve", color)
            .unwrap();
        assert_eq!(
            admin.tree().default_colors_for_view("shirt-side")["sleeve"],
            "#AABBCC"
        );
    }

    #[test]
    fn export_round_trips_through_file() {
        let dir = std::env::temp_dir().join(format!("uniform-admin-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();

        let mut admin = session();
        admin.add_uniform("jacket", "Jacket").unwrap();
        let path = admin.export_to(&dir).unwrap();
        assert!(path.ends_with(CONFIG_FILE_NAME));

        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\n  {"));
        let mut other = AdminSession::default();
        other.import_json(&json).unwrap();
        assert_eq!(other.tree(), admin.tree());

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
