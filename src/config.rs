//! Instance configuration.
//!
//! Everything the caller can tune lives here, passed to [`Graft::with_config`]
//! at construction. There is no process-wide default state.
//!
//! [`Graft::with_config`]: crate::Graft::with_config

/// Which event name [`EventFirer`] dispatches after a splice.
///
/// [`EventFirer`]: crate::events::EventFirer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventNameMode {
    /// The library-specific name (`graft:contentloaded`). Third-party
    /// "on load" listeners are left alone.
    #[default]
    LibrarySpecific,
    /// Reuse the page-native `DOMContentLoaded`, so code listening for a
    /// fresh page load reacts to spliced content as well.
    Native,
}

/// What the library does on a transaction failure, beyond reporting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureAction {
    /// Return the failure to the caller and do nothing else.
    #[default]
    Report,
    /// Degrade to ordinary browsing: hard-navigate the whole page to the
    /// content URL, then report the failure.
    NavigateToContent,
}

/// Configuration held by a [`Graft`](crate::Graft) instance.
#[derive(Debug, Clone)]
pub struct GraftConfig {
    /// Time limit applied when a request does not set one, in seconds.
    /// Subject to the same `0 < t <= 3600` normalization as per-call values.
    pub default_timeout: Option<f64>,
    /// HTTP statuses whose body is accepted as usable content. The 201/203
    /// entries are inherited behavior; trim to `[200]` for a strict policy.
    pub usable_statuses: Vec<u16>,
    /// Event name policy for the content-loaded notification.
    pub content_loaded_event: EventNameMode,
    /// Failure recovery policy.
    pub on_failure: FailureAction,
}

impl Default for GraftConfig {
    fn default() -> Self {
        Self {
            default_timeout: None,
            usable_statuses: vec![200, 201, 203],
            content_loaded_event: EventNameMode::default(),
            on_failure: FailureAction::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = GraftConfig::default();
        assert_eq!(cfg.usable_statuses, vec![200, 201, 203]);
        assert_eq!(cfg.default_timeout, None);
        assert_eq!(cfg.content_loaded_event, EventNameMode::LibrarySpecific);
        assert_eq!(cfg.on_failure, FailureAction::Report);
    }
}
