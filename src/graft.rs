// Copyright 2026 Pagegraft Contributors
// SPDX-License-Identifier: Apache-2.0

//! The library instance and its public operations.
//!
//! A [`Graft`] holds the three host adapters, the configuration, and the
//! capability descriptor, and exposes the three entry points: plain content
//! replacement, simulated navigation, and pop-state replay. Construct one
//! per page; there is no global state.

use std::sync::{Arc, OnceLock};

use serde_json::Value;

use crate::adapter::DocumentAdapter;
use crate::capability::Capabilities;
use crate::config::{FailureAction, GraftConfig};
use crate::error::GraftFailure;
use crate::events::{EventBus, EventFirer, GraftEvent};
use crate::fetch::FetchAdapter;
use crate::history::{HistoryAdder, HistoryBackend, HistoryState, Origin};
use crate::replay::{Replay, Replayer};
use crate::request::{normalize_timeout, NavigateRequest, ReplaceRequest};
use crate::transaction::{Grafted, Transaction};

const EVENT_BUS_CAPACITY: usize = 64;

/// A configured content-replacement instance bound to one page.
pub struct Graft {
    dom: Arc<dyn DocumentAdapter>,
    fetch: Arc<dyn FetchAdapter>,
    history: Arc<dyn HistoryBackend>,
    config: GraftConfig,
    capabilities: Capabilities,
    /// Address and title of the page load, fixed at first simulated
    /// navigation and read-only afterward.
    origin: OnceLock<Origin>,
    bus: EventBus,
}

impl Graft {
    pub fn new(
        dom: Arc<dyn DocumentAdapter>,
        fetch: Arc<dyn FetchAdapter>,
        history: Arc<dyn HistoryBackend>,
    ) -> Self {
        Self::with_config(dom, fetch, history, GraftConfig::default())
    }

    pub fn with_config(
        dom: Arc<dyn DocumentAdapter>,
        fetch: Arc<dyn FetchAdapter>,
        history: Arc<dyn HistoryBackend>,
        config: GraftConfig,
    ) -> Self {
        Self {
            dom,
            fetch,
            history,
            config,
            capabilities: Capabilities::full(),
            origin: OnceLock::new(),
            bus: EventBus::new(EVENT_BUS_CAPACITY),
        }
    }

    /// Override the capability descriptor. Embedders whose host lacks a
    /// real history or transport declare it here, once; the descriptor is
    /// never recomputed.
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The capability descriptor this instance was built with.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn config(&self) -> &GraftConfig {
        &self.config
    }

    /// Subscribe to the instance's event stream.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<GraftEvent> {
        self.bus.subscribe()
    }

    /// Fetch `content_url` and splice the designated part of it into the
    /// target element. One outcome, exactly once.
    pub async fn replace_content(&self, request: ReplaceRequest) -> Result<Grafted, GraftFailure> {
        if !self.capabilities.can_replace_content() {
            return Err(GraftFailure::usage(
                "runtime lacks support for content replacement",
                &request.content_url,
            ));
        }
        self.validate(&request.target_id, &request.content_url)?;

        let transaction = Transaction::new(
            &request.target_id,
            &request.content_url,
            request.content_element_id.as_deref(),
            request.post_data.clone(),
            normalize_timeout(request.timeout, self.config.default_timeout),
            self.config.usable_statuses.clone(),
        );
        transaction
            .run(self.fetch.as_ref(), self.dom.as_ref())
            .await
            .map_err(|failure| self.handle_failure(failure))
    }

    /// Like [`replace_content`](Self::replace_content), but also commits a
    /// history entry describing the operation and fires the content-loaded
    /// notification, so the replacement looks and replays like a real
    /// navigation.
    pub async fn simulate_navigation(
        &self,
        request: NavigateRequest,
    ) -> Result<Grafted, GraftFailure> {
        if !self.capabilities.can_simulate_navigation() {
            return Err(GraftFailure::usage(
                "runtime lacks support for simulated navigation",
                &request.content_url,
            ));
        }
        self.validate(&request.target_id, &request.content_url)?;

        let origin = self.origin.get_or_init(|| Origin {
            url: self.history.current_url(),
            title: match self.dom.title() {
                t if t.is_empty() => None,
                t => Some(t),
            },
        });

        let state = HistoryState {
            target_id: request.target_id.clone(),
            content_url: Some(request.content_url.clone()),
            content_element_id: request.content_element_id.clone(),
            new_title: request.new_title.clone(),
            pretend_url: request.pretend_url.clone(),
            start_url: origin.url.clone(),
            start_title: origin.title.clone(),
        };
        let adder = HistoryAdder::new(self.history.as_ref(), self.dom.as_ref(), state.clone());
        // Backfill the home record before the transaction runs, so even a
        // failure leaves the first page load replayable.
        adder.check_behind();

        let transaction = Transaction::new(
            &request.target_id,
            &request.content_url,
            request.content_element_id.as_deref(),
            None,
            normalize_timeout(request.timeout, self.config.default_timeout),
            self.config.usable_statuses.clone(),
        );
        match transaction.run(self.fetch.as_ref(), self.dom.as_ref()).await {
            Ok(done) => {
                adder.add();
                self.bus.emit(GraftEvent::HistoryCommitted {
                    target_id: done.target_id.clone(),
                    content_url: done.content_url.clone(),
                    shown_url: state.shown_url().to_string(),
                });
                EventFirer::new(self.config.content_loaded_event).fire(
                    self.dom.as_ref(),
                    &self.bus,
                    &done.target_id,
                    &done.content_url,
                );
                Ok(done)
            }
            Err(failure) => Err(self.handle_failure(failure)),
        }
    }

    /// Handle a restored history-navigation event. Returns
    /// [`Replay::NotOurs`] when the event carries nothing this library
    /// recognizes, so the host can chain its own handling.
    pub async fn on_pop_state(&self, state: Option<Value>) -> Replay {
        if !self.capabilities.can_simulate_navigation() {
            return Replay::NotOurs;
        }
        let replayer = Replayer {
            dom: self.dom.as_ref(),
            fetch: self.fetch.as_ref(),
            history: self.history.as_ref(),
            config: &self.config,
            bus: &self.bus,
        };
        replayer.replay(state).await
    }

    /// Usage checks, performed before any network I/O.
    fn validate(&self, target_id: &str, content_url: &str) -> Result<(), GraftFailure> {
        if content_url.is_empty() {
            return Err(GraftFailure::usage("content_url is required", content_url));
        }
        if !self.dom.element_exists(target_id) {
            return Err(GraftFailure::usage(
                format!("could not find target element '{target_id}'"),
                content_url,
            ));
        }
        Ok(())
    }

    /// Apply the configured failure policy to a transaction failure.
    /// Usage errors never come through here — degrading to a hard
    /// navigation is for requests that at least made sense.
    fn handle_failure(&self, failure: GraftFailure) -> GraftFailure {
        if self.config.on_failure == FailureAction::NavigateToContent {
            tracing::warn!(
                code = failure.code,
                url = %failure.content_url,
                "transaction failed; degrading to full navigation"
            );
            self.history.navigate(&failure.content_url);
        }
        failure
    }
}
