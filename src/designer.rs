//! The designer session.
//!
//! A [`Designer`] owns everything a user manipulates while customizing a
//! garment: the selected view, its color assignment, the drawing surface
//! with its base layer, the logo and text overlays and the text editor.
//! Every method maps onto one user interaction.
//!
//! # Reloads
//!
//! Changing the view or a color redraws the base layer. A reload happens
//! in three steps so the slow part can run elsewhere:
//!
//! 1. [`Designer::request_reload`] snapshots the view and colors into a
//!    [`ReloadTicket`] tagged with a new generation number.
//! 2. [`ReloadTicket::run`] fetches, recolors and rasterizes the document
//!    without touching the session.
//! 3. [`Designer::finish_reload`] swaps the new base layer in under the
//!    existing overlays, unless a newer request was made in the meantime.
//!
//! [`Designer::reload`] does all three in place.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use uniform_designer::{ConfigTree, Designer, HexColor, MemoryAssets, ReloadStatus};
//!
//! let svg = r##"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10">
//!   <rect id="shirt-body-front" width="10" height="10" fill="#000"/>
//! </svg>"##;
//! let assets = MemoryAssets::new().with("shirt-front", svg);
//! let mut designer = Designer::new(Arc::new(ConfigTree::builtin()), assets);
//!
//! assert_eq!(designer.reload(), ReloadStatus::Applied);
//! let status = designer.set_color("shirt-body-front", HexColor::parse("#E74C3C")?)?;
//! assert_eq!(status, ReloadStatus::Applied);
//! # Ok::<(), uniform_designer::DesignerError>(())
//! ```

use std::sync::Arc;

use crate::assets::AssetSource;
use crate::assignment::ColorAssignment;
use crate::color::HexColor;
use crate::config::{ConfigTree, UniformLayer, ViewSummary};
use crate::editor::TextEditor;
use crate::error::{DesignerError, DesignerResult};
use crate::export::{ExportedImage, export_png, now_ms};
use crate::notice::Notice;
use crate::overlay::{LogoStore, OverlayId, OverlayKind, TextProps, TextStore, UploadedFile};
use crate::surface::{ObjectHandle, Placement, Surface, SurfaceObject, SurfaceSize};
use crate::svg::{FontBook, RasterCompositor, RecolorReport, VectorDocument};

/// View shown when the configuration has none.
const FALLBACK_VIEW: &str = "shirt-front";

// ============================================================================
// Reloads
// ============================================================================

/// A snapshot of everything needed to redraw the base layer.
///
/// Tickets are `Send`, so [`run`](Self::run) may happen on another thread.
#[derive(Debug, Clone)]
pub struct ReloadTicket {
    generation: u64,
    view_id: String,
    colors: Vec<(String, String)>,
    compositor: RasterCompositor,
    fonts: FontBook,
    surface_size: SurfaceSize,
}

impl ReloadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    /// Fetches, recolors and rasterizes the view's document.
    #[tracing::instrument(skip_all, fields(generation = self.generation, view = %self.view_id))]
    pub fn run<S: AssetSource + ?Sized>(&self, assets: &S) -> ReloadOutcome {
        ReloadOutcome {
            generation: self.generation,
            result: self.build(assets),
        }
    }

    fn build<S: AssetSource + ?Sized>(&self, assets: &S) -> DesignerResult<BaseLayer> {
        let source = assets.load_svg(&self.view_id)?;
        let doc = VectorDocument::parse(source)?;

        let colors = self.colors.iter().map(|(id, c)| (id.as_str(), c.as_str()));
        let (recolored, report) = doc.recolor(colors)?;
        if !report.skipped.is_empty() {
            tracing::debug!(skipped = ?report.skipped, "layers missing from document");
        }

        let object = self
            .compositor
            .render(&recolored, &self.fonts, self.surface_size)?;
        Ok(BaseLayer { object, report })
    }
}

/// A freshly rendered base layer.
#[derive(Debug, Clone)]
pub struct BaseLayer {
    pub object: SurfaceObject,
    pub report: RecolorReport,
}

/// The result of running a [`ReloadTicket`].
#[derive(Debug)]
pub struct ReloadOutcome {
    pub generation: u64,
    pub result: DesignerResult<BaseLayer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadStatus {
    /// The new base layer is on the surface.
    Applied,
    /// A newer reload was requested; this one was discarded.
    Stale,
    /// The reload failed; the surface was left as it was.
    Failed,
    /// Reloads are deferred to the host, which must run a ticket.
    Pending,
}

// ============================================================================
// Designer
// ============================================================================

pub struct Designer<A> {
    config: Arc<ConfigTree>,
    assets: A,
    fonts: FontBook,
    compositor: RasterCompositor,

    surface: Surface,
    base: Option<ObjectHandle>,

    view_id: String,
    colors: ColorAssignment,

    logos: LogoStore,
    texts: TextStore,
    editor: TextEditor,

    generation: u64,
    auto_reload: bool,
    notices: Vec<Notice>,
}

impl<A: AssetSource> Designer<A> {
    /// Starts a session on the first configured view.
    ///
    /// Nothing is drawn until the first [`reload`](Self::reload).
    pub fn new(config: Arc<ConfigTree>, assets: A) -> Self {
        let view_id = config
            .all_views()
            .into_iter()
            .next()
            .map(|v| v.id)
            .unwrap_or_else(|| FALLBACK_VIEW.to_string());
        let colors = ColorAssignment::for_view(&config, &view_id)
            .unwrap_or_else(|_| ColorAssignment::empty(view_id.clone()));

        Self {
            config,
            assets,
            fonts: FontBook::empty(),
            compositor: RasterCompositor::default(),
            surface: Surface::new(SurfaceSize::default()),
            base: None,
            view_id,
            colors,
            logos: LogoStore::new(),
            texts: TextStore::new(),
            editor: TextEditor::new(),
            generation: 0,
            auto_reload: true,
            notices: Vec::new(),
        }
    }

    /// Uses `fonts` for text overlays and SVG text.
    pub fn with_fonts(mut self, fonts: FontBook) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_compositor(mut self, compositor: RasterCompositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Replaces the (still empty) surface with one of another size.
    pub fn with_surface_size(mut self, size: SurfaceSize) -> Self {
        self.surface = Surface::new(size);
        self.base = None;
        self
    }

    /// Stops view and color changes from reloading in place.
    ///
    /// They then return [`ReloadStatus::Pending`] and the host drives
    /// reloads with [`request_reload`](Self::request_reload).
    pub fn with_deferred_reloads(mut self) -> Self {
        self.auto_reload = false;
        self
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn config(&self) -> &ConfigTree {
        &self.config
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Handle of the current base layer, once one has been drawn.
    pub fn base_layer(&self) -> Option<ObjectHandle> {
        self.base
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn all_views(&self) -> Vec<ViewSummary> {
        self.config.all_views()
    }

    /// Layers of the current view.
    pub fn layers(&self) -> &[UniformLayer] {
        self.config.layers_for_view(&self.view_id)
    }

    pub fn colors(&self) -> &ColorAssignment {
        &self.colors
    }

    pub fn logos(&self) -> &LogoStore {
        &self.logos
    }

    pub fn texts(&self) -> &TextStore {
        &self.texts
    }

    pub fn editor(&self) -> &TextEditor {
        &self.editor
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Takes every notice recorded since the last call.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    // ------------------------------------------------------------------------
    // View and colors
    // ------------------------------------------------------------------------

    /// Switches to another view, seeding its default colors.
    pub fn select_view(&mut self, view_id: &str) -> DesignerResult<ReloadStatus> {
        let colors = match ColorAssignment::for_view(&self.config, view_id) {
            Ok(colors) => colors,
            Err(err) => return self.fail(err),
        };
        self.view_id = view_id.to_string();
        self.colors = colors;
        Ok(self.changed())
    }

    pub fn set_color(&mut self, layer_id: &str, color: HexColor) -> DesignerResult<ReloadStatus> {
        if let Err(err) = self.colors.set(layer_id, color) {
            return self.fail(err);
        }
        Ok(self.changed())
    }

    /// Restores the current view's default colors.
    pub fn reset_colors(&mut self) -> DesignerResult<ReloadStatus> {
        self.colors.reset(&self.config);
        Ok(self.changed())
    }

    fn changed(&mut self) -> ReloadStatus {
        if self.auto_reload {
            self.reload()
        } else {
            // Tickets issued before this change no longer match the session.
            self.generation += 1;
            ReloadStatus::Pending
        }
    }

    // ------------------------------------------------------------------------
    // Reloads
    // ------------------------------------------------------------------------

    /// Starts a new reload generation; any older ticket becomes stale.
    pub fn request_reload(&mut self) -> ReloadTicket {
        self.generation += 1;
        ReloadTicket {
            generation: self.generation,
            view_id: self.view_id.clone(),
            colors: self
                .colors
                .iter()
                .map(|(id, c)| (id.to_string(), c.to_string()))
                .collect(),
            compositor: self.compositor,
            fonts: self.fonts.clone(),
            surface_size: self.surface.size(),
        }
    }

    /// Puts a finished reload on the surface if it is still the latest.
    #[tracing::instrument(skip_all, fields(generation = outcome.generation))]
    pub fn finish_reload(&mut self, outcome: ReloadOutcome) -> ReloadStatus {
        if outcome.generation != self.generation {
            tracing::debug!(latest = self.generation, "discarding stale reload");
            return ReloadStatus::Stale;
        }

        match outcome.result {
            Ok(base) => {
                let overlays: Vec<_> = self
                    .surface
                    .handles()
                    .into_iter()
                    .filter(|h| Some(*h) != self.base)
                    .collect();
                self.base = Some(self.surface.restack(base.object, &overlays));
                ReloadStatus::Applied
            }
            Err(err) => {
                let message = match &err {
                    DesignerError::AssetNotFound(_) => err.to_string(),
                    _ => "Error loading uniform design".to_string(),
                };
                tracing::warn!(%err, view = %self.view_id, "reload failed");
                self.notices.push(Notice::error(message));
                ReloadStatus::Failed
            }
        }
    }

    /// Redraws the base layer for the current view and colors.
    pub fn reload(&mut self) -> ReloadStatus {
        let ticket = self.request_reload();
        let outcome = ticket.run(&self.assets);
        self.finish_reload(outcome)
    }

    // ------------------------------------------------------------------------
    // Logos
    // ------------------------------------------------------------------------

    /// Adds every uploaded image; one result per file.
    pub fn upload_logos(&mut self, files: &[UploadedFile]) -> Vec<DesignerResult<OverlayId>> {
        let results = self.logos.add_logos(&mut self.surface, files, &self.fonts);
        for (file, result) in files.iter().zip(&results) {
            let notice = match result {
                Ok(_) => Notice::success(format!("Logo \"{}\" uploaded successfully!", file.name)),
                Err(err) => {
                    tracing::warn!(%err, name = %file.name, "logo upload rejected");
                    Notice::error(err.to_string())
                }
            };
            self.notices.push(notice);
        }
        results
    }

    pub fn remove_logo(&mut self, id: OverlayId) -> DesignerResult<()> {
        match self.logos.remove(&mut self.surface, id) {
            Ok(_) => {
                self.notices.push(Notice::success("Logo removed"));
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn activate_logo(&mut self, id: OverlayId) -> DesignerResult<()> {
        self.logos.set_active(&mut self.surface, id)
    }

    // ------------------------------------------------------------------------
    // Texts
    // ------------------------------------------------------------------------

    /// Deletes a text overlay, closing the editor if it was editing it.
    pub fn remove_text(&mut self, id: OverlayId) -> DesignerResult<()> {
        match self.texts.remove(&mut self.surface, id) {
            Ok(_) => {
                self.editor.forget(id);
                self.notices.push(Notice::success("Text removed"));
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn activate_text(&mut self, id: OverlayId) -> DesignerResult<()> {
        self.texts.set_active(&mut self.surface, id)
    }

    pub fn open_compose(&mut self) -> DesignerResult<()> {
        let result = self.editor.open_compose();
        self.note_busy(result)
    }

    /// The open compose or edit draft.
    pub fn draft_mut(&mut self) -> Option<&mut TextProps> {
        self.editor.draft_mut()
    }

    /// Adds the composed text.
    pub fn submit_text(&mut self) -> DesignerResult<OverlayId> {
        match self.editor.submit(&mut self.texts, &mut self.surface) {
            Ok(id) => {
                self.notices.push(Notice::success("Text added successfully!"));
                Ok(id)
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn begin_edit(&mut self, id: OverlayId) -> DesignerResult<()> {
        let result = self.editor.begin_edit(&self.texts, id);
        self.note_busy(result)
    }

    /// Writes the edit draft to its overlay.
    pub fn apply_edit(&mut self) -> DesignerResult<OverlayId> {
        match self.editor.apply(&mut self.texts, &mut self.surface) {
            Ok(id) => {
                self.notices.push(Notice::success("Text updated successfully!"));
                Ok(id)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Discards the open compose or edit draft.
    pub fn cancel_edit(&mut self) {
        self.editor.cancel();
    }

    /// Replaces a text overlay's content and style outside the editor,
    /// as the property panel does on every change.
    ///
    /// The text under edit is refused: its draft would overwrite the change.
    pub fn update_text(&mut self, id: OverlayId, props: TextProps) -> DesignerResult<()> {
        if self.editor.editing() == Some(id) {
            let busy = DesignerError::editor_busy(format!("{id} is being edited"));
            return self.note_busy(Err(busy));
        }
        match self.texts.update_text(&mut self.surface, id, props) {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err),
        }
    }

    /// Changes some properties of a text overlay, keeping the rest.
    pub fn modify_text(
        &mut self,
        id: OverlayId,
        change: impl FnOnce(&mut TextProps),
    ) -> DesignerResult<()> {
        let Some(record) = self.texts.get(id) else {
            return self.fail(DesignerError::UnknownOverlay(id));
        };
        let mut props = record.props.clone();
        change(&mut props);
        self.update_text(id, props)
    }

    // ------------------------------------------------------------------------
    // Transforms
    // ------------------------------------------------------------------------

    fn overlay_handle(&self, id: OverlayId) -> Option<ObjectHandle> {
        match id.kind() {
            OverlayKind::Logo => self.logos.get(id).map(|r| r.handle),
            OverlayKind::Text => self.texts.get(id).map(|r| r.handle),
        }
    }

    /// Where an overlay currently sits on the surface.
    pub fn placement(&self, id: OverlayId) -> Option<Placement> {
        self.overlay_handle(id)
            .and_then(|h| self.surface.get(h))
            .map(|o| o.placement)
    }

    /// Moves, resizes or rotates an overlay.
    pub fn transform_overlay(&mut self, id: OverlayId, placement: Placement) -> DesignerResult<()> {
        if !placement.is_valid() {
            return self.fail(DesignerError::InvalidPlacement(id));
        }
        let Some(object) = self
            .overlay_handle(id)
            .and_then(|h| self.surface.get_mut(h))
        else {
            return self.fail(DesignerError::UnknownOverlay(id));
        };
        object.placement = placement;
        tracing::debug!(%id, ?placement, "overlay transformed");
        Ok(())
    }

    /// Drags an overlay by `(dx, dy)`.
    pub fn move_overlay(&mut self, id: OverlayId, dx: f32, dy: f32) -> DesignerResult<()> {
        self.adjust(id, |p| p.translated(dx, dy))
    }

    /// Resizes an overlay by `factor` around its origin.
    pub fn scale_overlay(&mut self, id: OverlayId, factor: f32) -> DesignerResult<()> {
        self.adjust(id, |p| p.scaled(factor))
    }

    /// Rotates an overlay clockwise by `degrees` around its origin.
    pub fn rotate_overlay(&mut self, id: OverlayId, degrees: f32) -> DesignerResult<()> {
        self.adjust(id, |p| p.rotated(degrees))
    }

    fn adjust(&mut self, id: OverlayId, f: impl FnOnce(Placement) -> Placement) -> DesignerResult<()> {
        match self.placement(id) {
            Some(placement) => self.transform_overlay(id, f(placement)),
            None => self.fail(DesignerError::UnknownOverlay(id)),
        }
    }

    // ------------------------------------------------------------------------
    // Pointer
    // ------------------------------------------------------------------------

    /// Selects the topmost overlay under the point and makes it active in
    /// its collection. Clicking empty space clears the selection.
    pub fn select_at(&mut self, x: f32, y: f32) -> Option<OverlayId> {
        let Some(handle) = self.surface.hit_test(x, y) else {
            self.surface.select(None);
            return None;
        };

        if let Some(id) = self.logos.find_by_handle(handle) {
            self.logos.set_active(&mut self.surface, id).ok()?;
            Some(id)
        } else if let Some(id) = self.texts.find_by_handle(handle) {
            self.texts.set_active(&mut self.surface, id).ok()?;
            Some(id)
        } else {
            self.surface.select(Some(handle));
            None
        }
    }

    /// Enters edit mode when a text overlay is double-clicked.
    ///
    /// Returns the text now under edit, or `None` if the point is not on a
    /// text overlay.
    pub fn double_click(&mut self, x: f32, y: f32) -> DesignerResult<Option<OverlayId>> {
        let Some(id) = self
            .surface
            .hit_test(x, y)
            .and_then(|h| self.texts.find_by_handle(h))
        else {
            return Ok(None);
        };

        self.begin_edit(id)?;
        self.texts.set_active(&mut self.surface, id)?;
        Ok(Some(id))
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    /// Renders the surface as a PNG named after the view and `timestamp_ms`.
    pub fn export(&mut self, timestamp_ms: u64) -> DesignerResult<ExportedImage> {
        match export_png(&self.surface, &self.fonts, &self.view_id, timestamp_ms) {
            Ok(image) => {
                self.notices
                    .push(Notice::success("Image downloaded successfully!"));
                Ok(image)
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn export_now(&mut self) -> DesignerResult<ExportedImage> {
        self.export(now_ms())
    }

    // ------------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------------

    fn fail<T>(&mut self, err: DesignerError) -> DesignerResult<T> {
        tracing::warn!(%err, "designer operation failed");
        self.notices.push(Notice::error(err.to_string()));
        Err(err)
    }

    fn note_busy(&mut self, result: DesignerResult<()>) -> DesignerResult<()> {
        match result {
            Err(err @ DesignerError::EditorBusy(_)) => {
                self.notices.push(Notice::warning(err.to_string()));
                Err(err)
            }
            Err(err) => self.fail(err),
            Ok(()) => Ok(()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
