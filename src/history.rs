//! History-state protocol.
//!
//! A committed [`HistoryState`] is the only persisted artifact of a
//! simulated navigation. The host may serialize it across a full page
//! reload, so it is self-describing: element ids and URLs only, no live
//! references, nothing that needs a closure from the original call.
//!
//! Commit discipline: `check_behind` backfills the "home" record for the
//! page's original state the first time navigation is simulated (otherwise
//! the very first "back" would land on an entry with no state to replay);
//! `add` pushes the full record for a just-completed transaction.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Mutex;

use crate::adapter::DocumentAdapter;

/// Origin of the page load: address and title as they were before the
/// first simulated navigation. Captured once, never mutated.
#[derive(Debug, Clone)]
pub(crate) struct Origin {
    pub url: String,
    pub title: Option<String>,
}

/// Persisted record attached to a history entry.
///
/// A full record (with `content_url`) describes a simulated navigation to
/// replay; the home record omits `content_url` — on replay the original
/// page is re-fetched from `start_url` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    /// Id of the element the transaction replaced. Ids, not live
    /// references — references do not survive a reload.
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_element_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretend_url: Option<String>,
    /// The page's address at first use, for replaying "back to the start".
    pub start_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_title: Option<String>,
}

impl HistoryState {
    /// The backfilled record for the page's original state.
    pub(crate) fn home(target_id: &str, origin: &Origin) -> Self {
        Self {
            target_id: target_id.to_string(),
            content_url: None,
            content_element_id: None,
            new_title: None,
            pretend_url: None,
            start_url: origin.url.clone(),
            start_title: origin.title.clone(),
        }
    }

    /// True for the backfilled initial record.
    pub fn is_home(&self) -> bool {
        self.content_url.is_none()
    }

    /// The address this record was (or would be) committed under: the
    /// cosmetic URL when one was given, else the literal fetch URL, else
    /// the start address for the home record.
    pub fn shown_url(&self) -> &str {
        self.pretend_url
            .as_deref()
            .or(self.content_url.as_deref())
            .unwrap_or(&self.start_url)
    }
}

/// Capability surface over the host's history mechanism.
///
/// `push` commits a new entry under `url`; `replace` swaps the state of the
/// current entry without touching its address; `navigate` is a hard
/// whole-page load, used as the escape hatch when replay is impossible.
pub trait HistoryBackend: Send + Sync {
    fn current_url(&self) -> String;
    fn state(&self) -> Option<Value>;
    fn push(&self, state: Value, url: &str);
    fn replace(&self, state: Value);
    fn navigate(&self, url: &str);
}

/// Builds and commits the two records for one simulated navigation.
pub(crate) struct HistoryAdder<'a> {
    backend: &'a dyn HistoryBackend,
    dom: &'a dyn DocumentAdapter,
    state: HistoryState,
    home: HistoryState,
}

impl<'a> HistoryAdder<'a> {
    pub fn new(
        backend: &'a dyn HistoryBackend,
        dom: &'a dyn DocumentAdapter,
        state: HistoryState,
    ) -> Self {
        let home = HistoryState {
            content_url: None,
            content_element_id: None,
            new_title: None,
            pretend_url: None,
            ..state.clone()
        };
        Self {
            backend,
            dom,
            state,
            home,
        }
    }

    /// Backfill the home record if this page load has none yet. Idempotent:
    /// an existing state, whatever committed it, is never overwritten.
    pub fn check_behind(&self) {
        if self.backend.state().is_none() {
            self.backend
                .replace(serde_json::to_value(&self.home).unwrap_or_default());
        }
    }

    /// Commit the full record for a completed transaction and apply the new
    /// title, if any.
    pub fn add(&self) {
        self.backend.push(
            serde_json::to_value(&self.state).unwrap_or_default(),
            self.state.shown_url(),
        );
        if let Some(title) = &self.state.new_title {
            self.dom.set_title(title);
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    state: Option<Value>,
    url: String,
}

#[derive(Debug)]
struct MemoryHistoryInner {
    entries: Vec<Entry>,
    index: usize,
    hard_loads: Vec<String>,
}

/// In-memory history log: the reference [`HistoryBackend`] for headless
/// embeddings and tests.
///
/// `back`/`forward` move the cursor and hand back the restored state — the
/// value a browser would deliver in its pop-state event.
#[derive(Debug)]
pub struct MemoryHistory {
    inner: Mutex<MemoryHistoryInner>,
}

impl MemoryHistory {
    /// A fresh log with one stateless entry at `initial_url`, like a page
    /// that was just loaded normally.
    pub fn new(initial_url: &str) -> Self {
        Self {
            inner: Mutex::new(MemoryHistoryInner {
                entries: vec![Entry {
                    state: None,
                    url: initial_url.to_string(),
                }],
                index: 0,
                hard_loads: Vec::new(),
            }),
        }
    }

    /// Move back one entry and return the restored state, or `None` at the
    /// oldest entry (or when the entry carries no state).
    pub fn back(&self) -> Option<Value> {
        let mut inner = self.inner.lock().unwrap();
        if inner.index > 0 {
            inner.index -= 1;
        }
        inner.entries[inner.index].state.clone()
    }

    /// Move forward one entry and return the restored state.
    pub fn forward(&self) -> Option<Value> {
        let mut inner = self.inner.lock().unwrap();
        if inner.index + 1 < inner.entries.len() {
            inner.index += 1;
        }
        inner.entries[inner.index].state.clone()
    }

    /// Number of entries in the log.
    pub fn entry_count(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    /// Hard whole-page loads requested through [`HistoryBackend::navigate`].
    pub fn hard_loads(&self) -> Vec<String> {
        self.inner.lock().unwrap().hard_loads.clone()
    }
}

impl HistoryBackend for MemoryHistory {
    fn current_url(&self) -> String {
        let inner = self.inner.lock().unwrap();
        inner.entries[inner.index].url.clone()
    }

    fn state(&self) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.entries[inner.index].state.clone()
    }

    fn push(&self, state: Value, url: &str) {
        let mut inner = self.inner.lock().unwrap();
        // A push drops any forward entries, like the real thing.
        let cut = inner.index + 1;
        inner.entries.truncate(cut);
        inner.entries.push(Entry {
            state: Some(state),
            url: url.to_string(),
        });
        inner.index += 1;
    }

    fn replace(&self, state: Value) {
        let mut inner = self.inner.lock().unwrap();
        let index = inner.index;
        inner.entries[index].state = Some(state);
    }

    fn navigate(&self, url: &str) {
        self.inner.lock().unwrap().hard_loads.push(url.to_string());
    }
}
