//! Request inputs for the two public operations.
//!
//! Both request types are plain named-field structs; every optional knob is
//! an explicit `Option`, filled in with struct-update syntax from `new()`.

use std::time::Duration;

/// Body payload for a POST. Presence of any payload switches the request
/// verb from GET to POST.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostData {
    /// A preassembled `a=1&b=2` string. Sent with the
    /// `application/x-www-form-urlencoded` content type.
    Text(String),
    /// Name/value pairs, urlencoded by the transport. Same content type as
    /// [`PostData::Text`].
    Form(Vec<(String, String)>),
    /// An opaque body sent as-is, with the given content type if any.
    Raw {
        content_type: Option<String>,
        body: Vec<u8>,
    },
}

impl PostData {
    /// True for the payload kinds that carry the urlencoded content type.
    pub fn is_form_encoded(&self) -> bool {
        matches!(self, PostData::Text(_) | PostData::Form(_))
    }
}

/// Input to a single fetch-and-splice operation.
///
/// Immutable once a transaction has been constructed from it.
#[derive(Debug, Clone)]
pub struct ReplaceRequest {
    /// Id of the live element whose children will be replaced.
    pub target_id: String,
    /// URL to fetch the replacement content from. Required, non-empty.
    pub content_url: String,
    /// Id of the sub-element to extract from the fetched document; `None`
    /// falls back to the document body (or the whole fragment).
    pub content_element_id: Option<String>,
    /// Optional POST payload; `None` means GET.
    pub post_data: Option<PostData>,
    /// Time limit in seconds. Values outside `0 < t <= 3600` are treated as
    /// absent; absent falls back to the configured default.
    pub timeout: Option<f64>,
}

impl ReplaceRequest {
    pub fn new(target_id: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            content_url: content_url.into(),
            content_element_id: None,
            post_data: None,
            timeout: None,
        }
    }
}

/// Input to a simulated navigation: a content replacement that also commits
/// a history entry. Navigation never carries a POST body.
#[derive(Debug, Clone)]
pub struct NavigateRequest {
    pub target_id: String,
    pub content_url: String,
    pub content_element_id: Option<String>,
    pub timeout: Option<f64>,
    /// Document title to apply once the new content is in place.
    pub new_title: Option<String>,
    /// Cosmetic address to show instead of the literal fetch URL.
    pub pretend_url: Option<String>,
}

impl NavigateRequest {
    pub fn new(target_id: impl Into<String>, content_url: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            content_url: content_url.into(),
            content_element_id: None,
            timeout: None,
            new_title: None,
            pretend_url: None,
        }
    }
}

/// Maximum accepted time limit, in seconds.
const TIMEOUT_CEILING: f64 = 3600.0;

/// Normalize a per-call timeout against the configured default.
///
/// A present but out-of-range per-call value is discarded, not replaced by
/// the default; only an absent value falls back. The default is subject to
/// the same range check.
pub(crate) fn normalize_timeout(requested: Option<f64>, default: Option<f64>) -> Option<Duration> {
    let in_range = |t: f64| -> Option<Duration> {
        if t.is_finite() && t > 0.0 && t <= TIMEOUT_CEILING {
            Some(Duration::from_secs_f64(t))
        } else {
            None
        }
    };
    match requested {
        Some(t) => in_range(t),
        None => default.and_then(in_range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_in_range() {
        assert_eq!(
            normalize_timeout(Some(1.5), None),
            Some(Duration::from_millis(1500))
        );
        assert_eq!(
            normalize_timeout(Some(3600.0), None),
            Some(Duration::from_secs(3600))
        );
    }

    #[test]
    fn test_timeout_out_of_range_discarded() {
        assert_eq!(normalize_timeout(Some(0.0), None), None);
        assert_eq!(normalize_timeout(Some(-2.0), None), None);
        assert_eq!(normalize_timeout(Some(3600.1), None), None);
        assert_eq!(normalize_timeout(Some(f64::NAN), None), None);
    }

    #[test]
    fn test_timeout_falls_back_to_default_only_when_absent() {
        assert_eq!(
            normalize_timeout(None, Some(30.0)),
            Some(Duration::from_secs(30))
        );
        // An explicit bad value does not resurrect the default.
        assert_eq!(normalize_timeout(Some(9999.0), Some(30.0)), None);
        // And a bad default is discarded too.
        assert_eq!(normalize_timeout(None, Some(0.0)), None);
    }

    #[test]
    fn test_post_data_content_type_classes() {
        assert!(PostData::Text("a=1&b=2".into()).is_form_encoded());
        assert!(PostData::Form(vec![("a".into(), "1".into())]).is_form_encoded());
        assert!(!PostData::Raw {
            content_type: Some("application/json".into()),
            body: b"{}".to_vec(),
        }
        .is_form_encoded());
    }
}
