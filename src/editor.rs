//! Inline editing of text overlays.
//!
//! The editor is either idle, composing a new text, or editing one
//! existing text. Drafts are private to the editor until they are
//! submitted or applied; cancelling discards them.

use crate::error::{DesignerError, DesignerResult};
use crate::overlay::{OverlayId, TextProps, TextStore, TextStyle};
use crate::surface::Surface;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    Composing(TextProps),
    Editing {
        target: OverlayId,
        draft: TextProps,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TextEditor {
    state: EditorState,

    /// Style a new compose starts with; the last submitted style.
    compose_style: TextStyle,
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == EditorState::Idle
    }

    /// The overlay under edit, if any.
    pub fn editing(&self) -> Option<OverlayId> {
        match &self.state {
            EditorState::Editing { target, .. } => Some(*target),
            _ => None,
        }
    }

    pub fn compose_style(&self) -> &TextStyle {
        &self.compose_style
    }

    pub fn draft(&self) -> Option<&TextProps> {
        match &self.state {
            EditorState::Idle => None,
            EditorState::Composing(draft) | EditorState::Editing { draft, .. } => Some(draft),
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut TextProps> {
        match &mut self.state {
            EditorState::Idle => None,
            EditorState::Composing(draft) | EditorState::Editing { draft, .. } => Some(draft),
        }
    }

    // ------------------------------------------------------------------------
    // Compose
    // ------------------------------------------------------------------------

    /// Opens an empty draft with the current compose style.
    ///
    /// Does nothing if a compose is already open.
    pub fn open_compose(&mut self) -> DesignerResult<()> {
        match &self.state {
            EditorState::Editing { target, .. } => Err(DesignerError::editor_busy(format!(
                "finish editing {target} first"
            ))),
            EditorState::Composing(_) => Ok(()),
            EditorState::Idle => {
                self.state =
                    EditorState::Composing(TextProps::with_style("", self.compose_style.clone()));
                Ok(())
            }
        }
    }

    /// Adds the composed text to the store.
    ///
    /// On failure the draft stays open.
    pub fn submit(&mut self, texts: &mut TextStore, surface: &mut Surface) -> DesignerResult<OverlayId> {
        let EditorState::Composing(draft) = &self.state else {
            return Err(DesignerError::editor_busy("no text is being composed"));
        };

        let id = texts.add_text(surface, &draft.content, draft.style.clone())?;
        self.compose_style = draft.style.clone();
        self.state = EditorState::Idle;
        Ok(id)
    }

    // ------------------------------------------------------------------------
    // Edit
    // ------------------------------------------------------------------------

    /// Starts editing a text overlay, seeding the draft from it.
    ///
    /// Re-entering edit mode for the overlay already under edit keeps the
    /// current draft.
    pub fn begin_edit(&mut self, texts: &TextStore, id: OverlayId) -> DesignerResult<()> {
        match &self.state {
            EditorState::Editing { target, .. } if *target == id => return Ok(()),
            EditorState::Editing { target, .. } => {
                return Err(DesignerError::editor_busy(format!(
                    "already editing {target}"
                )));
            }
            EditorState::Composing(_) => {
                return Err(DesignerError::editor_busy("a new text is being composed"));
            }
            EditorState::Idle => {}
        }

        let record = texts.get(id).ok_or(DesignerError::UnknownOverlay(id))?;
        self.state = EditorState::Editing {
            target: id,
            draft: record.props.clone(),
        };
        Ok(())
    }

    /// Writes the draft to the overlay under edit and closes the editor.
    ///
    /// If the update is rejected, both the overlay and the draft are kept.
    pub fn apply(&mut self, texts: &mut TextStore, surface: &mut Surface) -> DesignerResult<OverlayId> {
        let EditorState::Editing { target, draft } = &self.state else {
            return Err(DesignerError::editor_busy("no text is being edited"));
        };

        let target = *target;
        texts.update_text(surface, target, draft.clone())?;
        self.state = EditorState::Idle;
        Ok(target)
    }

    /// Discards the open draft, if any.
    pub fn cancel(&mut self) {
        self.state = EditorState::Idle;
    }

    /// Closes the editor if it is editing `id`. Returns whether it was.
    pub(crate) fn forget(&mut self, id: OverlayId) -> bool {
        if self.editing() == Some(id) {
            self.state = EditorState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::{FontWeight, TextAlign};
    use crate::surface::SurfaceSize;

    fn setup() -> (TextEditor, TextStore, Surface) {
        (
            TextEditor::new(),
            TextStore::new(),
            Surface::new(SurfaceSize::default()),
        )
    }

    #[test]
    fn compose_submit_adds_text_and_remembers_style() {
        let (mut editor, mut texts, mut surface) = setup();
        editor.open_compose().unwrap();
        let draft = editor.draft_mut().unwrap();
        draft.content = "HOME".into();
        draft.style.font_weight = FontWeight::Bold;

        let id = editor.submit(&mut texts, &mut surface).unwrap();
        assert!(editor.is_idle());
        assert_eq!(texts.get(id).unwrap().props.content, "HOME");

        editor.open_compose().unwrap();
        assert_eq!(editor.draft().unwrap().style.font_weight, FontWeight::Bold);
        assert_eq!(editor.draft().unwrap().content, "");
    }

    #[test]
    fn blank_submit_keeps_draft_open() {
        let (mut editor, mut texts, mut surface) = setup();
        editor.open_compose().unwrap();
        assert!(matches!(
            editor.submit(&mut texts, &mut surface),
            Err(DesignerError::EmptyText)
        ));
        assert!(matches!(editor.state(), EditorState::Composing(_)));
        assert!(texts.is_empty());
    }

    #[test]
    fn cancel_leaves_text_unchanged() {
        let (mut editor, mut texts, mut surface) = setup();
        let id = texts
            .add_text(&mut surface, "TEAM 7", Default::default())
            .unwrap();

        editor.begin_edit(&texts, id).unwrap();
        let draft = editor.draft_mut().unwrap();
        draft.content = "TEAM 9".into();
        draft.style.text_align = TextAlign::Center;
        editor.cancel();

        let record = texts.get(id).unwrap();
        assert_eq!(record.props.content, "TEAM 7");
        assert_eq!(record.props.style.text_align, TextAlign::Left);
        assert_eq!(
            surface.get(record.handle).unwrap().as_text().unwrap().content,
            "TEAM 7"
        );
        assert!(editor.is_idle());
    }

    #[test]
    fn apply_pushes_draft() {
        let (mut editor, mut texts, mut surface) = setup();
        let id = texts
            .add_text(&mut surface, "TEAM 7", Default::default())
            .unwrap();

        editor.begin_edit(&texts, id).unwrap();
        editor.draft_mut().unwrap().content = "TEAM 9".into();
        assert_eq!(editor.apply(&mut texts, &mut surface).unwrap(), id);

        let record = texts.get(id).unwrap();
        assert_eq!(record.props.content, "TEAM 9");
        assert_eq!(surface.get(record.handle).unwrap().as_text(), Some(&record.props));
    }

    #[test]
    fn rejected_apply_keeps_editing() {
        let (mut editor, mut texts, mut surface) = setup();
        let id = texts
            .add_text(&mut surface, "TEAM 7", Default::default())
            .unwrap();

        editor.begin_edit(&texts, id).unwrap();
        editor.draft_mut().unwrap().content = " ".into();
        assert!(editor.apply(&mut texts, &mut surface).is_err());
        assert_eq!(editor.editing(), Some(id));
        assert_eq!(texts.get(id).unwrap().props.content, "TEAM 7");
    }

    #[test]
    fn modes_are_exclusive() {
        let (mut editor, mut texts, mut surface) = setup();
        let a = texts.add_text(&mut surface, "A", Default::default()).unwrap();
        let b = texts.add_text(&mut surface, "B", Default::default()).unwrap();

        editor.begin_edit(&texts, a).unwrap();
        editor.draft_mut().unwrap().content = "AA".into();

        // Same target: no-op, draft kept.
        editor.begin_edit(&texts, a).unwrap();
        assert_eq!(editor.draft().unwrap().content, "AA");

        assert!(matches!(
            editor.begin_edit(&texts, b),
            Err(DesignerError::EditorBusy(_))
        ));
        assert!(matches!(
            editor.open_compose(),
            Err(DesignerError::EditorBusy(_))
        ));

        editor.cancel();
        editor.open_compose().unwrap();
        assert!(matches!(
            editor.begin_edit(&texts, a),
            Err(DesignerError::EditorBusy(_))
        ));
    }

    #[test]
    fn forget_only_closes_matching_edit() {
        let (mut editor, mut texts, mut surface) = setup();
        let a = texts.add_text(&mut surface, "A", Default::default()).unwrap();
        let b = texts.add_text(&mut surface, "B", Default::default()).unwrap();

        editor.begin_edit(&texts, a).unwrap();
        assert!(!editor.forget(b));
        assert!(editor.forget(a));
        assert!(editor.is_idle());
    }
}
