//! Host capability descriptor.
//!
//! Computed once by the embedder and handed to the instance at construction;
//! the core never re-probes the runtime. Every public entry point consults
//! this before doing any work.

use serde::{Deserialize, Serialize};

/// What the host runtime can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// A transport is available (the fetch adapter is functional).
    pub transport: bool,
    /// A history mechanism is available (push/replace/state).
    pub history: bool,
    /// Detached-document markup parsing is available.
    pub parser: bool,
}

impl Capabilities {
    /// A fully capable host. The right value for native embeddings where
    /// all three adapters are real.
    pub fn full() -> Self {
        Self {
            transport: true,
            history: true,
            parser: true,
        }
    }

    /// Support rank: 0 means content replacement cannot work at all,
    /// 2 means it is good to go. (The intermediate ranks of early releases
    /// are no longer produced.)
    pub fn level(&self) -> u8 {
        if self.can_replace_content() {
            2
        } else {
            0
        }
    }

    /// Whether plain content replacement is available.
    pub fn can_replace_content(&self) -> bool {
        self.transport && self.parser
    }

    /// Whether simulated navigation (replacement plus history commit) is
    /// available. History handling never fit the numeric ranks, so it gets
    /// its own predicate.
    pub fn can_simulate_navigation(&self) -> bool {
        self.can_replace_content() && self.history
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::full()
    }
}
