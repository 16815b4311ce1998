//! Open tabs keyed by the page id handed to the layers above.

use chromiumoxide::Page;
use dashmap::DashMap;
use pilot_core_types::PageId;

#[derive(Default)]
pub struct Registry {
    pages: DashMap<PageId, Page>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: PageId, page: Page) {
        self.pages.insert(id, page);
    }

    pub fn remove(&self, id: &PageId) -> Option<Page> {
        self.pages.remove(id).map(|(_, page)| page)
    }

    /// `Page` is a cheap handle over the tab's command channel.
    pub fn get(&self, id: &PageId) -> Option<Page> {
        self.pages.get(id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
