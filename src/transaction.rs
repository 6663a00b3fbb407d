//! The per-request transaction.
//!
//! One transaction owns one in-flight request from start to settlement:
//! issue the fetch, race it against the time limit, classify every exit
//! path into exactly one outcome. The state machine is linear —
//! `Idle → Started → {Succeeded | Failed}` — with `aborted` settable only
//! from `Started`. Losing the timeout race drops the transport future, so
//! a late completion of an uncancellable transport has no path back into a
//! settled transaction.

use std::time::Duration;

use crate::adapter::DocumentAdapter;
use crate::error::GraftFailure;
use crate::extract;
use crate::fetch::{FetchAdapter, FetchRequest, FetchResponse};
use crate::request::PostData;

/// The success outcome: the target now holds the fetched content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grafted {
    pub target_id: String,
    pub content_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TxState {
    Idle,
    Started,
    Succeeded,
    Failed,
}

pub(crate) struct Transaction {
    target_id: String,
    content_url: String,
    content_element_id: Option<String>,
    post_data: Option<PostData>,
    timeout: Option<Duration>,
    usable_statuses: Vec<u16>,
    state: TxState,
    aborted: bool,
}

impl Transaction {
    pub fn new(
        target_id: &str,
        content_url: &str,
        content_element_id: Option<&str>,
        post_data: Option<PostData>,
        timeout: Option<Duration>,
        usable_statuses: Vec<u16>,
    ) -> Self {
        Self {
            target_id: target_id.to_string(),
            content_url: content_url.to_string(),
            content_element_id: content_element_id.map(str::to_string),
            post_data,
            timeout,
            usable_statuses,
            state: TxState::Idle,
            aborted: false,
        }
    }

    /// Run to settlement. Consumes the transaction: there is no way to
    /// deliver a second outcome.
    pub async fn run(
        mut self,
        fetch: &dyn FetchAdapter,
        dom: &dyn DocumentAdapter,
    ) -> Result<Grafted, GraftFailure> {
        debug_assert_eq!(self.state, TxState::Idle);
        self.state = TxState::Started;
        tracing::debug!(
            url = %self.content_url,
            post = self.post_data.is_some(),
            "transaction started"
        );

        let request = FetchRequest {
            url: self.content_url.clone(),
            body: self.post_data.clone(),
        };
        let pending = fetch.fetch(request);

        let completion = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, pending).await {
                Ok(done) => done,
                Err(_) => {
                    // The timer won. Dropping the fetch future is the
                    // best-effort abort; whatever the transport still does
                    // in the background is discarded, not un-sent.
                    self.aborted = true;
                    return Err(self.fail(GraftFailure::timeout(&self.content_url)));
                }
            },
            None => pending.await,
        };

        match completion {
            Ok(response) => self.dispatch(response, dom),
            // A transport error that cannot describe itself gets the
            // unclassified code rather than a blank transport message.
            Err(e) if e.0.is_empty() => Err(self.fail(GraftFailure::unclassified(
                "transport failed without a reason",
                &self.content_url,
            ))),
            Err(e) => Err(self.fail(GraftFailure::transport(&e.0, &self.content_url))),
        }
    }

    /// Classify a completed response: status gate, then extract and splice.
    fn dispatch(
        mut self,
        response: FetchResponse,
        dom: &dyn DocumentAdapter,
    ) -> Result<Grafted, GraftFailure> {
        if !self.usable_statuses.contains(&response.status) {
            return Err(self.fail(GraftFailure::http(
                response.status,
                &response.status_text,
                &self.content_url,
            )));
        }

        // TODO: optional hook to rewrite the payload before parsing, for
        // sites that need to fix up relative asset URLs in fragments.
        let markup = match extract::extract(&response.body, self.content_element_id.as_deref()) {
            Ok(markup) => markup,
            Err(e) => return Err(self.fail(GraftFailure::content(e.to_string(), &self.content_url))),
        };

        match dom.swap_children(&self.target_id, &markup) {
            Ok(()) => {
                self.state = TxState::Succeeded;
                tracing::debug!(target = %self.target_id, "transaction succeeded");
                Ok(Grafted {
                    target_id: self.target_id,
                    content_url: self.content_url,
                })
            }
            Err(e) => Err(self.fail(GraftFailure::extraction(&e.0, &self.content_url))),
        }
    }

    fn fail(&mut self, failure: GraftFailure) -> GraftFailure {
        self.state = TxState::Failed;
        tracing::debug!(
            code = failure.code,
            url = %failure.content_url,
            aborted = self.aborted,
            "transaction failed: {}",
            failure.message
        );
        failure
    }
}
