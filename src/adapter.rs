//! The document seam.
//!
//! The live page is reached only through [`DocumentAdapter`]. A browser
//! embedding implements it over the real DOM; [`MemoryPage`] is the
//! reference implementation used by headless embeddings and tests, modeling
//! a flat page of addressable regions.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

/// A DOM mutation the adapter could not perform.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DomError(pub String);

/// Capability surface over the live page.
///
/// `swap_children` must be atomic from the page's point of view: the target
/// either shows its old children or the full new markup, never an
/// intermediate state. Target identity (the element itself, its attributes,
/// its position) is not touched.
pub trait DocumentAdapter: Send + Sync {
    /// Whether a live element with this id exists.
    fn element_exists(&self, id: &str) -> bool;

    /// Replace all children of the element `id` with `markup`, in one
    /// operation.
    fn swap_children(&self, id: &str, markup: &str) -> Result<(), DomError>;

    /// Current inner markup of the element `id`, if it exists.
    fn inner_markup(&self, id: &str) -> Option<String>;

    /// Document title.
    fn title(&self) -> String;

    /// Set the document title.
    fn set_title(&self, title: &str);

    /// Dispatch a bubbling notification event on the document.
    fn dispatch_event(&self, name: &str);
}

#[derive(Debug, Default)]
struct PageInner {
    elements: BTreeMap<String, String>,
    title: String,
    events: Vec<String>,
}

/// In-memory page: a set of addressable regions plus a title.
///
/// Dispatched events are recorded rather than delivered anywhere, so tests
/// and headless embeddings can observe them.
#[derive(Debug, Default)]
pub struct MemoryPage {
    inner: Mutex<PageInner>,
}

impl MemoryPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or overwrite a region.
    pub fn insert_element(&self, id: &str, markup: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.elements.insert(id.to_string(), markup.to_string());
    }

    /// Names of all events dispatched so far, oldest first.
    pub fn dispatched_events(&self) -> Vec<String> {
        self.inner.lock().unwrap().events.clone()
    }
}

impl DocumentAdapter for MemoryPage {
    fn element_exists(&self, id: &str) -> bool {
        self.inner.lock().unwrap().elements.contains_key(id)
    }

    fn swap_children(&self, id: &str, markup: &str) -> Result<(), DomError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.elements.get_mut(id) {
            Some(slot) => {
                *slot = markup.to_string();
                Ok(())
            }
            None => Err(DomError(format!("no element '{id}' in page"))),
        }
    }

    fn inner_markup(&self, id: &str) -> Option<String> {
        self.inner.lock().unwrap().elements.get(id).cloned()
    }

    fn title(&self) -> String {
        self.inner.lock().unwrap().title.clone()
    }

    fn set_title(&self, title: &str) {
        self.inner.lock().unwrap().title = title.to_string();
    }

    fn dispatch_event(&self, name: &str) {
        self.inner.lock().unwrap().events.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_children_replaces_markup() {
        let page = MemoryPage::new();
        page.insert_element("main", "<p>old</p>");
        page.swap_children("main", "<p>new</p>").unwrap();
        assert_eq!(page.inner_markup("main").unwrap(), "<p>new</p>");
    }

    #[test]
    fn test_swap_children_unknown_element_errors() {
        let page = MemoryPage::new();
        let err = page.swap_children("ghost", "<p>x</p>").unwrap_err();
        assert!(err.0.contains("ghost"));
    }

    #[test]
    fn test_events_recorded_in_order() {
        let page = MemoryPage::new();
        page.dispatch_event("a");
        page.dispatch_event("b");
        assert_eq!(page.dispatched_events(), vec!["a", "b"]);
    }

    #[test]
    fn test_title_roundtrip() {
        let page = MemoryPage::new();
        assert_eq!(page.title(), "");
        page.set_title("Hello");
        assert_eq!(page.title(), "Hello");
    }
}
