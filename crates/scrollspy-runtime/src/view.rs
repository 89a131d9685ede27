#![forbid(unsafe_code)]

//! Presentation snapshots for the menu and the item list.
//!
//! The host renders these; clicks on menu entries come back as
//! `Event::MenuClicked`.

use scrollspy_core::item::{Color, ElementHandle};

use crate::store::{ItemStatus, VisibilityStore};

/// One menu row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MenuEntry {
    /// Item identity and swatch color.
    pub color: Color,
    /// Whether this entry is highlighted (head of the visibility queue).
    pub active: bool,
    /// Visibility status.
    pub status: ItemStatus,
    /// Whether a click can scroll to the item (a handle is recorded).
    pub navigable: bool,
}

/// One rendered block on the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ItemRow {
    /// Item identity and fill color.
    pub color: Color,
    /// Layout height in pixels.
    pub height: f64,
    /// Visibility status.
    pub status: ItemStatus,
    /// Rendered node, if attached.
    pub handle: Option<ElementHandle>,
}

/// Everything the presentation layer needs for one frame.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SpyView {
    /// Menu rows in page order.
    pub menu: Vec<MenuEntry>,
    /// Page blocks in page order.
    pub items: Vec<ItemRow>,
    /// Color of the highlighted entry.
    pub active: Option<Color>,
}

impl SpyView {
    /// Snapshot the store.
    pub fn from_store(store: &VisibilityStore) -> Self {
        Self {
            menu: menu_view(store),
            items: item_view(store),
            active: store.active_color().cloned(),
        }
    }

    /// The highlighted menu row.
    pub fn active_entry(&self) -> Option<&MenuEntry> {
        self.menu.iter().find(|e| e.active)
    }
}

/// Menu rows; the head of the queue is marked active.
pub fn menu_view(store: &VisibilityStore) -> Vec<MenuEntry> {
    let active = store.active_color();
    store
        .menu()
        .iter()
        .map(|item| MenuEntry {
            color: item.color.clone(),
            active: active == Some(&item.color),
            status: item.status,
            navigable: item.handle.is_some(),
        })
        .collect()
}

/// Page blocks with their status.
pub fn item_view(store: &VisibilityStore) -> Vec<ItemRow> {
    store
        .menu()
        .iter()
        .map(|item| ItemRow {
            color: item.color.clone(),
            height: item.height,
            status: item.status,
            handle: item.handle,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_queue_highlights_nothing() {
        let store = VisibilityStore::try_new(["red", "blue"], &[900.0, 900.0]).unwrap();
        let view = SpyView::from_store(&store);
        assert_eq!(view.menu.len(), 2);
        assert!(view.active_entry().is_none());
        assert!(view.active.is_none());
    }

    #[test]
    fn head_is_highlighted() {
        let store = VisibilityStore::try_new(["red", "blue"], &[900.0, 900.0])
            .unwrap()
            .mark_entered("blue", ElementHandle(2))
            .mark_entered("red", ElementHandle(1));
        let view = SpyView::from_store(&store);
        let active = view.active_entry().unwrap();
        assert_eq!(active.color.as_str(), "blue");
        assert_eq!(view.menu.iter().filter(|e| e.active).count(), 1);
        assert!(view.menu.iter().all(|e| e.status == ItemStatus::InView));
    }

    #[test]
    fn navigable_tracks_handles() {
        let store = VisibilityStore::try_new(["red", "blue"], &[900.0, 450.0])
            .unwrap()
            .attach_handle("red", ElementHandle(1));
        let view = SpyView::from_store(&store);
        assert!(view.menu[0].navigable);
        assert!(!view.menu[1].navigable);
        assert_eq!(view.items[1].height, 450.0);
        assert_eq!(view.items[0].handle, Some(ElementHandle(1)));
    }
}
