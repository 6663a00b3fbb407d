// Copyright 2026 Pagegraft Contributors
// SPDX-License-Identifier: Apache-2.0

//! Content-loaded notifications.
//!
//! Two delivery paths: a bubbling event dispatched on the document adapter
//! (so page logic written for a browser reacts as if a fresh page had
//! loaded), and a typed broadcast bus for in-process subscribers. Events on
//! the bus are silently dropped when nobody subscribes (zero overhead).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::adapter::DocumentAdapter;
use crate::config::EventNameMode;

/// DOM event name used when the library keeps to itself.
pub const LIBRARY_EVENT_NAME: &str = "graft:contentloaded";
/// DOM event name used when impersonating a fresh page load.
pub const NATIVE_EVENT_NAME: &str = "DOMContentLoaded";

/// Everything the library announces. Serialized to JSON for subscribers
/// that forward events out of process.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraftEvent {
    /// New content was spliced into a target element.
    ContentLoaded {
        target_id: String,
        content_url: String,
        /// The DOM event name that was dispatched alongside.
        event_name: String,
    },
    /// A simulated navigation committed a history entry.
    HistoryCommitted {
        target_id: String,
        content_url: String,
        shown_url: String,
    },
    /// A pop-state replay could not proceed and forced a hard reload.
    ReplayFallback { start_url: String },
}

/// Broadcast bus for [`GraftEvent`] values.
pub struct EventBus {
    sender: broadcast::Sender<GraftEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit to all subscribers; a bus with no subscribers swallows the
    /// event.
    pub fn emit(&self, event: GraftEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GraftEvent> {
        self.sender.subscribe()
    }
}

/// Dispatches the content-loaded signal after a successful splice.
pub struct EventFirer {
    name: &'static str,
}

impl EventFirer {
    pub fn new(mode: EventNameMode) -> Self {
        let name = match mode {
            EventNameMode::Native => NATIVE_EVENT_NAME,
            EventNameMode::LibrarySpecific => LIBRARY_EVENT_NAME,
        };
        Self { name }
    }

    /// The DOM event name this firer dispatches.
    pub fn event_name(&self) -> &'static str {
        self.name
    }

    pub fn fire(
        &self,
        dom: &dyn DocumentAdapter,
        bus: &EventBus,
        target_id: &str,
        content_url: &str,
    ) {
        dom.dispatch_event(self.name);
        bus.emit(GraftEvent::ContentLoaded {
            target_id: target_id.to_string(),
            content_url: content_url.to_string(),
            event_name: self.name.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryPage;

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = GraftEvent::ContentLoaded {
            target_id: "main".to_string(),
            content_url: "/page2".to_string(),
            event_name: LIBRARY_EVENT_NAME.to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("ContentLoaded"));
        assert!(json.contains("graft:contentloaded"));

        let parsed: GraftEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            GraftEvent::ContentLoaded { target_id, .. } => assert_eq!(target_id, "main"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_firer_name_selection() {
        assert_eq!(
            EventFirer::new(EventNameMode::Native).event_name(),
            "DOMContentLoaded"
        );
        assert_eq!(
            EventFirer::new(EventNameMode::LibrarySpecific).event_name(),
            "graft:contentloaded"
        );
    }

    #[tokio::test]
    async fn test_fire_reaches_dom_and_bus() {
        let page = MemoryPage::new();
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();

        EventFirer::new(EventNameMode::LibrarySpecific).fire(&page, &bus, "main", "/p");

        assert_eq!(page.dispatched_events(), vec![LIBRARY_EVENT_NAME]);
        match rx.recv().await.unwrap() {
            GraftEvent::ContentLoaded {
                target_id,
                content_url,
                event_name,
            } => {
                assert_eq!(target_id, "main");
                assert_eq!(content_url, "/p");
                assert_eq!(event_name, LIBRARY_EVENT_NAME);
            }
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_silent() {
        let bus = EventBus::new(8);
        bus.emit(GraftEvent::ReplayFallback {
            start_url: "/".to_string(),
        });
    }
}
