//! User-added overlays: uploaded logos and styled text.
//!
//! Each kind lives in its own [`OverlayStore`], an insertion-ordered map
//! from [`OverlayId`] to a record that points at the overlay's object on
//! the [`Surface`]. A store has at most one active overlay, and the active
//! id always refers to a record in the store.

pub mod logo;
pub mod text;

use std::fmt;

use indexmap::IndexMap;

use crate::error::{DesignerError, DesignerResult};
use crate::surface::{ObjectHandle, Surface};

pub use logo::{LogoOverlay, UploadedFile};
pub use text::{FontStyle, FontWeight, TextAlign, TextOverlay, TextProps, TextStyle};

pub type LogoStore = OverlayStore<LogoOverlay>;
pub type TextStore = OverlayStore<TextOverlay>;

// ============================================================================
// Identity
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    Logo,
    Text,
}

impl OverlayKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logo => "logo",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of an overlay, displayed as `logo-3` or `text-1`.
///
/// Sequence numbers come from a per-store counter and are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId {
    kind: OverlayKind,
    seq: u64,
}

impl OverlayId {
    pub fn kind(&self) -> OverlayKind {
        self.kind
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl fmt::Display for OverlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.seq)
    }
}

/// A record held by an [`OverlayStore`].
pub trait OverlayRecord {
    const KIND: OverlayKind;

    /// The surface object this overlay draws with.
    fn handle(&self) -> ObjectHandle;
}

// ============================================================================
// OverlayStore
// ============================================================================

#[derive(Debug, Clone)]
pub struct OverlayStore<R> {
    records: IndexMap<OverlayId, R>,
    active: Option<OverlayId>,
    next_seq: u64,
}

impl<R> Default for OverlayStore<R> {
    fn default() -> Self {
        Self {
            records: IndexMap::new(),
            active: None,
            next_seq: 0,
        }
    }
}

impl<R: OverlayRecord> OverlayStore<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record, activating it when nothing is active yet.
    pub(crate) fn insert(&mut self, record: R) -> OverlayId {
        self.next_seq += 1;
        let id = OverlayId {
            kind: R::KIND,
            seq: self.next_seq,
        };
        self.records.insert(id, record);
        if self.active.is_none() {
            self.active = Some(id);
        }
        id
    }

    pub fn get(&self, id: OverlayId) -> Option<&R> {
        self.records.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: OverlayId) -> Option<&mut R> {
        self.records.get_mut(&id)
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.records.contains_key(&id)
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (OverlayId, &R)> {
        self.records.iter().map(|(id, r)| (*id, r))
    }

    pub fn ids(&self) -> Vec<OverlayId> {
        self.records.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn active(&self) -> Option<OverlayId> {
        self.active
    }

    pub fn active_record(&self) -> Option<&R> {
        self.active.and_then(|id| self.records.get(&id))
    }

    /// Surface handles of every record, in insertion order.
    pub fn handles(&self) -> Vec<ObjectHandle> {
        self.records.values().map(R::handle).collect()
    }

    pub fn find_by_handle(&self, handle: ObjectHandle) -> Option<OverlayId> {
        self.records
            .iter()
            .find(|(_, r)| r.handle() == handle)
            .map(|(id, _)| *id)
    }

    /// Deletes an overlay together with its surface object.
    ///
    /// If it was active, the first remaining overlay becomes active (and
    /// selected on the surface), or nothing when the store is empty.
    pub fn remove(&mut self, surface: &mut Surface, id: OverlayId) -> DesignerResult<R> {
        let record = self
            .records
            .shift_remove(&id)
            .ok_or(DesignerError::UnknownOverlay(id))?;
        surface.remove(record.handle());

        if self.active == Some(id) {
            self.active = self.records.keys().next().copied();
            if let Some(next) = self.active_record() {
                surface.select(Some(next.handle()));
            }
        }
        Ok(record)
    }

    /// Marks an overlay active and selects its object on the surface.
    pub fn set_active(&mut self, surface: &mut Surface, id: OverlayId) -> DesignerResult<()> {
        let handle = self
            .records
            .get(&id)
            .map(R::handle)
            .ok_or(DesignerError::UnknownOverlay(id))?;
        self.active = Some(id);
        surface.select(Some(handle));
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use image::RgbaImage;

    use super::*;
    use crate::surface::{Placement, SurfaceObject, SurfaceSize};

    #[derive(Debug, Clone, PartialEq)]
    struct Marker(ObjectHandle);

    impl OverlayRecord for Marker {
        const KIND: OverlayKind = OverlayKind::Logo;

        fn handle(&self) -> ObjectHandle {
            self.0
        }
    }

    fn add(store: &mut OverlayStore<Marker>, surface: &mut Surface) -> OverlayId {
        let handle = surface.add(SurfaceObject::image(RgbaImage::new(2, 2), Placement::default()));
        store.insert(Marker(handle))
    }

    #[test]
    fn ids_are_sequential_and_formatted() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut store = OverlayStore::new();
        let a = add(&mut store, &mut surface);
        let b = add(&mut store, &mut surface);
        assert_eq!(a.to_string(), "logo-1");
        assert_eq!(b.to_string(), "logo-2");
        assert_eq!(store.active(), Some(a));
    }

    #[test]
    fn add_then_remove_restores_store() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut store = OverlayStore::new();
        let first = add(&mut store, &mut surface);
        let before = (store.ids(), store.active(), surface.handles());

        let extra = add(&mut store, &mut surface);
        store.remove(&mut surface, extra).unwrap();

        assert_eq!((store.ids(), store.active(), surface.handles()), before);
        assert_eq!(store.active(), Some(first));
    }

    #[test]
    fn removing_active_reassigns_to_first_remaining() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut store = OverlayStore::new();
        let a = add(&mut store, &mut surface);
        let b = add(&mut store, &mut surface);
        let c = add(&mut store, &mut surface);

        store.set_active(&mut surface, b).unwrap();
        assert_eq!(surface.selection(), Some(store.get(b).unwrap().handle()));

        store.remove(&mut surface, b).unwrap();
        assert_eq!(store.active(), Some(a));
        assert_eq!(surface.selection(), Some(store.get(a).unwrap().handle()));

        store.remove(&mut surface, a).unwrap();
        assert_eq!(store.active(), Some(c));
        store.remove(&mut surface, c).unwrap();
        assert_eq!(store.active(), None);
        assert!(surface.is_empty());
    }

    #[test]
    fn removing_inactive_keeps_active() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut store = OverlayStore::new();
        let a = add(&mut store, &mut surface);
        let b = add(&mut store, &mut surface);

        store.remove(&mut surface, b).unwrap();
        assert_eq!(store.active(), Some(a));
    }

    #[test]
    fn unknown_ids_are_errors() {
        let mut surface = Surface::new(SurfaceSize::default());
        let mut store = OverlayStore::new();
        let a = add(&mut store, &mut surface);
        store.remove(&mut surface, a).unwrap();

        assert!(matches!(
            store.remove(&mut surface, a),
            Err(DesignerError::UnknownOverlay(id)) if id == a
        ));
        assert!(store.set_active(&mut surface, a).is_err());
    }
}
