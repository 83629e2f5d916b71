//! Wikipedia document source using the MediaWiki action API.
//!
//! This module is only available when the `wikipedia` feature is enabled.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::document::Document;
use crate::error::{RagError, Result};
use crate::source::{DocumentSource, SourceError};

/// The default Wikipedia language edition.
const DEFAULT_LANGUAGE: &str = "en";

/// The default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of candidate titles reported for a disambiguation page.
const MAX_OPTIONS: usize = 20;

const USER_AGENT: &str = concat!("wiki-rag/", env!("CARGO_PKG_VERSION"));

/// A [`DocumentSource`] that fetches the plain-text extract of a Wikipedia page.
///
/// Redirects are followed, so `fetch("AI")` resolves to the
/// "Artificial intelligence" page. Disambiguation pages are reported as
/// [`SourceError::Ambiguous`].
///
/// # Example
///
/// ```rust,ignore
/// use wiki_rag::wikipedia::WikipediaSource;
///
/// let source = WikipediaSource::new()?.with_language("de");
/// let document = source.fetch("Berlin").await?;
/// ```
pub struct WikipediaSource {
    client: reqwest::Client,
    language: String,
    api_url: Option<String>,
}

impl WikipediaSource {
    /// Create a source for English Wikipedia.
    pub fn new() -> Result<Self> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a source whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| RagError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, language: DEFAULT_LANGUAGE.into(), api_url: None })
    }

    /// Set the language edition (e.g. `fr`, `de`).
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Point the source at a different MediaWiki `api.php` endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.wikipedia.org/w/api.php", self.language))
    }

    fn page_url(&self, title: &str) -> String {
        format!("https://{}.wikipedia.org/wiki/{}", self.language, title.replace(' ', "_"))
    }

    async fn query(&self, params: &[(&str, &str)]) -> std::result::Result<String, SourceError> {
        let response = self.client.get(self.api_url()).query(params).send().await.map_err(|e| {
            error!(source = "Wikipedia", error = %e, "request failed");
            SourceError::Unavailable(format!("request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(source = "Wikipedia", %status, "API error");
            return Err(SourceError::Unavailable(format!("API returned {status}")));
        }

        response.text().await.map_err(|e| SourceError::Unavailable(format!("read failed: {e}")))
    }

    async fn disambiguation_options(&self, title: &str) -> Vec<String> {
        let params = [
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("prop", "links"),
            ("plnamespace", "0"),
            ("pllimit", "max"),
            ("titles", title),
        ];
        match self.query(&params).await {
            Ok(body) => parse_links(&body),
            Err(e) => {
                debug!(title, error = %e, "could not list disambiguation options");
                Vec::new()
            }
        }
    }
}

// ── MediaWiki response types ───────────────────────────────────────

#[derive(Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
}

#[derive(Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Deserialize)]
struct Page {
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Deserialize)]
struct PageProps {
    disambiguation: Option<String>,
}

#[derive(Deserialize)]
struct Link {
    title: String,
}

/// A page resolved from an extracts query.
#[derive(Debug, PartialEq)]
enum Resolved {
    Article { title: String, text: String },
    Disambiguation { title: String },
}

fn parse_extract(topic: &str, body: &str) -> std::result::Result<Resolved, SourceError> {
    let response: QueryResponse = serde_json::from_str(body)
        .map_err(|e| SourceError::Unavailable(format!("failed to parse response: {e}")))?;

    let page = response
        .query
        .and_then(|q| q.pages.into_iter().next())
        .ok_or_else(|| SourceError::NotFound(topic.to_string()))?;

    if page.missing || page.invalid {
        return Err(SourceError::NotFound(topic.to_string()));
    }
    if page.pageprops.is_some_and(|p| p.disambiguation.is_some()) {
        return Ok(Resolved::Disambiguation { title: page.title });
    }
    Ok(Resolved::Article { title: page.title, text: page.extract.unwrap_or_default() })
}

fn parse_links(body: &str) -> Vec<String> {
    serde_json::from_str::<QueryResponse>(body)
        .ok()
        .and_then(|r| r.query)
        .and_then(|q| q.pages.into_iter().next())
        .map(|p| p.links.into_iter().take(MAX_OPTIONS).map(|l| l.title).collect())
        .unwrap_or_default()
}

#[async_trait]
impl DocumentSource for WikipediaSource {
    async fn fetch(&self, topic: &str) -> std::result::Result<Document, SourceError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(SourceError::NotFound(String::new()));
        }

        debug!(source = "Wikipedia", topic, language = %self.language, "fetching page");

        let params = [
            ("action", "query"),
            ("format", "json"),
            ("formatversion", "2"),
            ("prop", "extracts|pageprops"),
            ("explaintext", "1"),
            ("redirects", "1"),
            ("titles", topic),
        ];
        let body = self.query(&params).await?;

        match parse_extract(topic, &body)? {
            Resolved::Article { title, text } => {
                let uri = self.page_url(&title);
                Ok(Document::new(title, text).with_source_uri(uri))
            }
            Resolved::Disambiguation { title } => {
                let options = self.disambiguation_options(&title).await;
                Err(SourceError::Ambiguous { topic: topic.to_string(), options })
            }
        }
    }
}
