// Copyright 2026 Pagegraft Contributors
// SPDX-License-Identifier: Apache-2.0

//! Pagegraft — fetch-and-splice partial page updates with replayable
//! simulated navigation.
//!
//! Given a target-element id and a URL, a [`Graft`] instance fetches a
//! document fragment over HTTP, splices the designated part of it into the
//! target, and can record the operation as a history entry that a later
//! pop-state event replays deterministically. The page, the transport, and
//! the history mechanism are reached only through adapter traits, so the
//! same core runs against a browser DOM, a server-side page model, or the
//! bundled in-memory implementations.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pagegraft::{Graft, HttpFetcher, MemoryHistory, MemoryPage, ReplaceRequest};
//!
//! # async fn demo() -> Result<(), pagegraft::GraftFailure> {
//! let page = Arc::new(MemoryPage::new());
//! page.insert_element("main", "<p>placeholder</p>");
//! let graft = Graft::new(
//!     page,
//!     Arc::new(HttpFetcher::new()),
//!     Arc::new(MemoryHistory::new("https://site.test/")),
//! );
//! graft
//!     .replace_content(ReplaceRequest::new("main", "https://site.test/fragment"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod capability;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod graft;
pub mod history;
pub mod replay;
pub mod request;
pub mod transaction;

pub use adapter::{DocumentAdapter, DomError, MemoryPage};
pub use capability::Capabilities;
pub use config::{EventNameMode, FailureAction, GraftConfig};
pub use error::{codes, GraftFailure};
pub use events::{EventBus, GraftEvent};
pub use fetch::{FetchAdapter, FetchError, FetchRequest, FetchResponse, HttpFetcher};
pub use graft::Graft;
pub use history::{HistoryBackend, HistoryState, MemoryHistory};
pub use replay::Replay;
pub use request::{NavigateRequest, PostData, ReplaceRequest};
pub use transaction::Grafted;
