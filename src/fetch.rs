//! The transport seam.
//!
//! A transaction talks to the network only through [`FetchAdapter`]. The
//! bundled [`HttpFetcher`] implements it over reqwest; tests substitute
//! their own. Cancellation is dropping the returned future — an adapter
//! whose transport cannot truly be interrupted simply finishes in the
//! background with nobody listening.

use async_trait::async_trait;
use thiserror::Error;

use crate::request::PostData;

/// A transport-level error: anything below the HTTP layer (DNS, connect,
/// TLS, body read). Non-success HTTP statuses are NOT errors here — they
/// come back as a normal [`FetchResponse`] for the transaction to classify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct FetchError(pub String);

/// What a transaction asks the transport to do.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    /// `None` means GET; any payload means POST.
    pub body: Option<PostData>,
}

/// What came back: status line plus body text.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Reason phrase. May be empty (HTTP/2 carries none).
    pub status_text: String,
    pub body: String,
}

/// Capability surface over the transport.
#[async_trait]
pub trait FetchAdapter: Send + Sync {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// reqwest-backed transport.
///
/// No client-level timeout is set: the time limit is owned by the
/// transaction, which races the fetch future against its own timer.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    /// Wrap an existing client (connection pools, proxies, extra headers
    /// are the embedder's business).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FetchAdapter for HttpFetcher {
    async fn fetch(&self, request: FetchRequest) -> Result<FetchResponse, FetchError> {
        let builder = match &request.body {
            None => self.client.get(&request.url),
            Some(PostData::Text(text)) => self
                .client
                .post(&request.url)
                .header("Content-Type", "application/x-www-form-urlencoded")
                .body(text.clone()),
            // reqwest sets the urlencoded content type itself for forms.
            Some(PostData::Form(fields)) => self.client.post(&request.url).form(fields),
            Some(PostData::Raw { content_type, body }) => {
                let mut builder = self.client.post(&request.url).body(body.clone());
                if let Some(ct) = content_type {
                    builder = builder.header("Content-Type", ct.clone());
                }
                builder
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| FetchError(e.to_string()))?;

        let status = response.status().as_u16();
        let status_text = response
            .status()
            .canonical_reason()
            .unwrap_or("")
            .to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError(e.to_string()))?;

        Ok(FetchResponse {
            status,
            status_text,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetcher_construction() {
        let _ = HttpFetcher::new();
        let _ = HttpFetcher::with_client(reqwest::Client::new());
    }

    #[test]
    fn test_request_verb_is_implied_by_body() {
        let get = FetchRequest {
            url: "https://example.com/a".into(),
            body: None,
        };
        assert!(get.body.is_none());

        let post = FetchRequest {
            url: "https://example.com/a".into(),
            body: Some(PostData::Text("a=1".into())),
        };
        assert!(post.body.as_ref().unwrap().is_form_encoded());
    }
}
