use reqwest::{header, Client};
use tracing::{debug, warn};

use crate::config::Config;
use crate::query::Query;
use crate::response::{Page, SearchResponse};
use crate::{Error, Result};

/// Thin wrapper around a `reqwest::Client` pointed at the search endpoint.
/// Client uses Arc internally, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct SearchClient {
    client: Client,
    config: Config,
}

impl SearchClient {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("adsfetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Requests `rows` records starting at `start`.
    /// Transport failures, 429 and 5xx responses are retried up to `max_retries` times.
    pub async fn search(&self, query: &Query, start: u64, rows: u32) -> Result<Page> {
        let mut attempt = 0;
        loop {
            match self.request_page(query, start, rows).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    let delay = self.config.retry_delay * attempt;
                    warn!(
                        query = %query,
                        start,
                        attempt,
                        "request failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Single request, no retry.
    async fn request_page(&self, query: &Query, start: u64, rows: u32) -> Result<Page> {
        let res = self
            .client
            .get(&self.config.base_url)
            .query(&query.params(start, rows, &self.config.dev_key))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(strip_url)?;
        debug!("GET {}", redact_key(res.url()));

        let status = res.status();
        let body = res.bytes().await.map_err(strip_url)?;

        if !status.is_success() {
            // Hopefully the upstream explains itself in a json error body.
            let message = match SearchResponse::from_slice(&body) {
                Ok(SearchResponse::Failure { error }) => error,
                _ => fallback_message(status, &body),
            };
            return Err(Error::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let resp = SearchResponse::from_slice(&body)?;
        if let Some(error) = resp.error_message() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: error.to_string(),
            });
        }
        Page::try_from(resp)
    }
}

/// reqwest errors carry the full request url, dev key included.
fn strip_url(e: reqwest::Error) -> Error {
    Error::Transport(e.without_url())
}

fn fallback_message(status: reqwest::StatusCode, body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        text.chars().take(200).collect()
    }
}

/// The request url with the dev key masked, for logging.
fn redact_key(url: &reqwest::Url) -> String {
    let mut url = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "dev_key" && !v.is_empty() {
                "***".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), v)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
    url.to_string()
}
