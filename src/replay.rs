//! Pop-state replay.
//!
//! When the host walks back (or forward) through its history, the restored
//! state is handed here. A recognizable record is replayed as a fresh
//! transaction, re-fetching and re-splicing the same content, without
//! committing any new history entry: this path consumes an existing entry,
//! it never creates one. A record that no longer matches reality gets a
//! diagnostic and a hard reload of the recorded start page; there is no
//! caller on this path to hand a typed error to.

use serde_json::Value;
use url::Url;

use crate::adapter::DocumentAdapter;
use crate::config::GraftConfig;
use crate::error::GraftFailure;
use crate::events::{EventBus, EventFirer, GraftEvent};
use crate::fetch::FetchAdapter;
use crate::history::{HistoryBackend, HistoryState};
use crate::request::normalize_timeout;
use crate::transaction::{Grafted, Transaction};

/// What a pop-state event turned into.
#[derive(Debug)]
pub enum Replay {
    /// The event carried no state this library recognizes; nothing was done.
    NotOurs,
    /// The record was inconsistent with the live page; a hard navigation to
    /// the recorded start URL was requested instead of a replay.
    HardReload { start_url: String },
    /// A transaction was replayed to completion.
    Completed(Result<Grafted, GraftFailure>),
}

pub(crate) struct Replayer<'a> {
    pub dom: &'a dyn DocumentAdapter,
    pub fetch: &'a dyn FetchAdapter,
    pub history: &'a dyn HistoryBackend,
    pub config: &'a GraftConfig,
    pub bus: &'a EventBus,
}

impl Replayer<'_> {
    pub async fn replay(&self, value: Option<Value>) -> Replay {
        let Some(value) = value else {
            return Replay::NotOurs;
        };
        let Ok(state) = serde_json::from_value::<HistoryState>(value) else {
            return Replay::NotOurs;
        };

        // Defensive consistency check. A missing target or an address that
        // drifted from what was committed should not occur; when it does,
        // replaying would splice into the wrong page, so reload instead.
        let current = self.history.current_url();
        if !self.dom.element_exists(&state.target_id)
            || !same_address(&current, state.shown_url())
        {
            tracing::warn!(
                target_id = %state.target_id,
                recorded_url = %state.shown_url(),
                actual_url = %current,
                start_url = %state.start_url,
                "replay state does not match current location; reloading start page"
            );
            self.bus.emit(GraftEvent::ReplayFallback {
                start_url: state.start_url.clone(),
            });
            self.history.navigate(&state.start_url);
            return Replay::HardReload {
                start_url: state.start_url,
            };
        }

        // The home record replays the page's own original content: fetch
        // the start URL and extract the target's id from it. A full record
        // replays the simulated navigation it describes.
        let (fetch_url, sub_element, title) = if state.is_home() {
            (
                state.start_url.clone(),
                Some(state.target_id.clone()),
                state.start_title.clone(),
            )
        } else {
            (
                state.content_url.clone().unwrap_or_default(),
                state.content_element_id.clone(),
                state.new_title.clone(),
            )
        };

        let transaction = Transaction::new(
            &state.target_id,
            &fetch_url,
            sub_element.as_deref(),
            None,
            normalize_timeout(None, self.config.default_timeout),
            self.config.usable_statuses.clone(),
        );
        let outcome = transaction.run(self.fetch, self.dom).await;

        if outcome.is_ok() {
            if let Some(title) = title {
                self.dom.set_title(&title);
            }
            EventFirer::new(self.config.content_loaded_event).fire(
                self.dom,
                self.bus,
                &state.target_id,
                &fetch_url,
            );
        }
        Replay::Completed(outcome)
    }
}

/// Address equality, tolerant of one side being root-relative: a relative
/// recorded address is resolved against the current one before comparing.
fn same_address(current: &str, recorded: &str) -> bool {
    if current == recorded {
        return true;
    }
    match Url::parse(current) {
        Ok(cur) => cur.join(recorded).map(|resolved| resolved == cur).unwrap_or(false),
        Err(_) => false,
    }
}
