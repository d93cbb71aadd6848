//! Fetcher backed by a shared `reqwest` client.

use crate::Fetcher;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use std::time::Duration;
use tracing::instrument;

/// Plain HTTP(S) GET with a whole-request timeout.
///
/// Redirects are followed with `reqwest`'s default policy. Response bodies are
/// never transparently decoded, so compressed sitemaps arrive as the exact
/// bytes the server stored.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .or_raise(|| ErrorKind::Client)?;
        Ok(Self { client })
    }

    fn classify(url: &str, err: reqwest::Error) -> crate::error::Error {
        let kind = if err.is_timeout() {
            ErrorKind::Timeout(url.to_string())
        } else {
            ErrorKind::Request(url.to_string())
        };
        exn::Exn::from(err).raise(kind)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(skip(self), fields(status, bytes))]
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await.map_err(|e| Self::classify(url, e))?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                exn::Exn::from(e).raise(ErrorKind::Timeout(url.to_string()))
            } else {
                exn::Exn::from(e).raise(ErrorKind::Body(url.to_string()))
            }
        })?;
        tracing::Span::current().record("bytes", body.len());
        tracing::debug!("Fetched resource");
        Ok(body.to_vec())
    }
}
