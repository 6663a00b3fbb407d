//! Failure reporting for graft transactions.
//!
//! Every exit path of a transaction (HTTP status, transport error, timeout,
//! extraction problem, bad input) funnels into a single [`GraftFailure`]
//! value carrying a stable numeric code, so callers can branch on `code`
//! without parsing messages.

use thiserror::Error;

/// Reserved failure codes. Positive codes are HTTP statuses taken verbatim
/// from the response; the sentinels below cover everything that never
/// produced a status line.
pub mod codes {
    /// Bad input or an unsupported runtime, reported before any network I/O.
    pub const USAGE: i32 = 0;
    /// The requested sub-element was not found in the downloaded content,
    /// or the content could not be interpreted as HTML at all.
    pub const MISSING_ELEMENT: i32 = -1;
    /// The transport failed below the HTTP layer (DNS, connect, TLS, read).
    pub const TRANSPORT: i32 = -2;
    /// Splicing the extracted content into the target raised an error.
    pub const EXTRACTION: i32 = -3;
    /// A failure that fits no other classification.
    pub const UNCLASSIFIED: i32 = -4;
    /// The configured time limit elapsed before the request completed.
    pub const TIMEOUT: i32 = 408;
}

/// The single failure outcome of a transaction.
///
/// `code` is an HTTP status when one was received, otherwise one of the
/// [`codes`] sentinels. `content_url` is the URL the transaction was
/// fetching, kept here so a failure handler can fall back to navigating
/// there directly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct GraftFailure {
    pub code: i32,
    pub message: String,
    pub content_url: String,
}

impl GraftFailure {
    /// Usage error: bad target, empty URL, unsupported runtime.
    pub(crate) fn usage(message: impl Into<String>, url: &str) -> Self {
        Self {
            code: codes::USAGE,
            message: message.into(),
            content_url: url.to_string(),
        }
    }

    /// Non-usable HTTP status. Status text may be empty on HTTP/2, in which
    /// case a readable placeholder is synthesized.
    pub(crate) fn http(status: u16, status_text: &str, url: &str) -> Self {
        let message = if status_text.is_empty() {
            format!("HTTP status {status}")
        } else {
            status_text.to_string()
        };
        Self {
            code: i32::from(status),
            message,
            content_url: url.to_string(),
        }
    }

    /// The timeout fired while the request was still pending.
    pub(crate) fn timeout(url: &str) -> Self {
        Self {
            code: codes::TIMEOUT,
            message: "time limit exceeded".to_string(),
            content_url: url.to_string(),
        }
    }

    /// Transport-level error below the HTTP layer.
    pub(crate) fn transport(detail: &str, url: &str) -> Self {
        Self {
            code: codes::TRANSPORT,
            message: format!("caught transport error: {detail}"),
            content_url: url.to_string(),
        }
    }

    /// The extractor reported a content problem (missing sub-element,
    /// uninterpretable markup).
    pub(crate) fn content(message: impl Into<String>, url: &str) -> Self {
        Self {
            code: codes::MISSING_ELEMENT,
            message: message.into(),
            content_url: url.to_string(),
        }
    }

    /// Installing the extracted content into the live page failed.
    pub(crate) fn extraction(detail: &str, url: &str) -> Self {
        Self {
            code: codes::EXTRACTION,
            message: format!("caught exception while splicing content: {detail}"),
            content_url: url.to_string(),
        }
    }

    /// Anything that fits no other classification.
    pub(crate) fn unclassified(detail: &str, url: &str) -> Self {
        Self {
            code: codes::UNCLASSIFIED,
            message: format!("failed with reason: {detail}"),
            content_url: url.to_string(),
        }
    }

}
