use super::state::{LoadEvent, LoadState, MediaView};
use crate::drive::MediaFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    Single,
    Folder,
}

/// Files opened in one viewer, in display order, with the current one's
/// load state.
#[derive(Debug, Clone)]
pub struct MediaCollection {
    kind: CollectionKind,
    items: Vec<MediaFile>,
    current_index: usize,
    view: Option<MediaView>,
}

impl MediaCollection {
    pub fn new(kind: CollectionKind, items: Vec<MediaFile>) -> Self {
        let view = items.first().cloned().map(MediaView::new);
        Self {
            kind,
            items,
            current_index: 0,
            view,
        }
    }

    pub fn single(file: MediaFile) -> Self {
        Self::new(CollectionKind::Single, vec![file])
    }

    pub fn kind(&self) -> CollectionKind {
        self.kind
    }

    pub fn items(&self) -> &[MediaFile] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current(&self) -> Option<&MediaFile> {
        self.items.get(self.current_index)
    }

    pub fn view(&self) -> Option<&MediaView> {
        self.view.as_ref()
    }

    pub fn current_url(&self) -> Option<&str> {
        self.view.as_ref().and_then(MediaView::current_url)
    }

    pub fn load_state(&self) -> Option<&LoadState> {
        self.view.as_ref().map(MediaView::state)
    }

    pub fn has_next(&self) -> bool {
        self.current_index + 1 < self.items.len()
    }

    pub fn has_prev(&self) -> bool {
        self.current_index > 0
    }

    /// Move forward one item. Does nothing at the last item.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.jump_to(self.current_index + 1)
    }

    /// Move back one item. Does nothing at the first item.
    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.jump_to(self.current_index - 1)
    }

    /// Show the item at `index`; out-of-range indexes are ignored.
    pub fn jump_to(&mut self, index: usize) -> bool {
        if index >= self.items.len() || index == self.current_index {
            return false;
        }
        self.current_index = index;
        self.view = self.items.get(index).cloned().map(MediaView::new);
        tracing::debug!(index, total = self.items.len(), "Switched media item");
        true
    }

    /// Forward a load signal to the current item.
    pub fn handle(&mut self, event: LoadEvent) -> Option<&LoadState> {
        let view = self.view.as_mut()?;
        Some(view.handle(event))
    }

    /// Restart the current item from its first candidate.
    pub fn reload(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::MediaKind;

    fn file(id: &str) -> MediaFile {
        MediaFile::new(
            id,
            None,
            vec![format!("{}-a", id), format!("{}-b", id)],
            MediaKind::Image,
        )
        .unwrap()
    }

    fn folder(n: usize) -> MediaCollection {
        let items = (0..n).map(|i| file(&format!("f{}", i))).collect();
        MediaCollection::new(CollectionKind::Folder, items)
    }

    #[test]
    fn test_next_stops_at_end() {
        let mut c = folder(3);
        assert!(c.next());
        assert!(c.next());
        assert_eq!(c.current_index(), 2);
        assert!(!c.next());
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn test_prev_stops_at_start() {
        let mut c = folder(3);
        assert!(!c.prev());
        assert_eq!(c.current_index(), 0);
        c.jump_to(2);
        assert!(c.prev());
        assert_eq!(c.current_index(), 1);
    }

    #[test]
    fn test_jump_out_of_range_is_noop() {
        let mut c = folder(2);
        assert!(!c.jump_to(2));
        assert!(!c.jump_to(usize::MAX));
        assert_eq!(c.current_index(), 0);
        assert!(c.jump_to(1));
        assert_eq!(c.current().unwrap().id(), "f1");
    }

    #[test]
    fn test_navigation_resets_load_state() {
        let mut c = folder(2);
        c.handle(LoadEvent::Errored {
            url: "f0-a".into(),
            detail: None,
        });
        assert_eq!(c.current_url(), Some("f0-b"));

        c.next();
        assert_eq!(c.load_state(), Some(&LoadState::Loading { candidate: 0 }));
        assert_eq!(c.current_url(), Some("f1-a"));

        c.prev();
        assert_eq!(c.current_url(), Some("f0-a"));
    }

    #[test]
    fn test_single_collection() {
        let mut c = MediaCollection::single(file("only"));
        assert_eq!(c.kind(), CollectionKind::Single);
        assert!(!c.next());
        assert!(!c.prev());
        c.handle(LoadEvent::Loaded { url: "only-a".into() });
        assert_eq!(c.load_state(), Some(&LoadState::Loaded { candidate: 0 }));
    }

    #[test]
    fn test_empty_folder() {
        let mut c = folder(0);
        assert!(c.is_empty());
        assert!(c.current().is_none());
        assert!(c.current_url().is_none());
        assert!(!c.next());
        assert!(!c.prev());
        assert!(c.handle(LoadEvent::Loaded { url: "x".into() }).is_none());
    }

    #[test]
    fn test_reload_after_failure() {
        let mut c = MediaCollection::single(file("x"));
        c.handle(LoadEvent::Errored { url: "x-a".into(), detail: None });
        c.handle(LoadEvent::Errored { url: "x-b".into(), detail: None });
        assert!(matches!(c.load_state(), Some(LoadState::Failed { .. })));
        c.reload();
        assert_eq!(c.current_url(), Some("x-a"));
    }
}
