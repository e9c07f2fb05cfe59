//! Reference discovery: topic string → bounded list of candidate URLs.
//!
//! Issues one web-search query per pipeline run and returns at most
//! `max_references` links in provider ranking order, after filtering out
//! the system's own publishing domain and video hosts. Provider failures
//! never propagate — the orchestrator only ever sees a stage outcome.

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use articleforge_shared::{ArticleForgeError, Result, RuntimeConfig, StageOutcome};

/// Timeout in seconds for the search call.
const SEARCH_TIMEOUT_SECS: u64 = 10;

/// User-Agent string for search requests.
const USER_AGENT: &str = concat!("ArticleForge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Provider response shape
// ---------------------------------------------------------------------------

/// Subset of the search provider's response we consume.
/// A missing `organic_results` field is tolerated as "no results."
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic_results: Vec<SearchResult>,
}

/// One ranked result. Results without a `link` field are skipped.
#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    link: Option<String>,
}

// ---------------------------------------------------------------------------
// ReferenceFinder
// ---------------------------------------------------------------------------

/// Discovers reference URLs for a topic via the web-search provider.
#[derive(Debug, Clone)]
pub struct ReferenceFinder {
    client: Client,
    base_url: String,
    api_key: String,
    excluded_hosts: Vec<String>,
    result_count: u32,
    max_references: usize,
}

impl ReferenceFinder {
    /// Build a finder from the resolved runtime configuration.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(SEARCH_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArticleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.search_base_url.clone(),
            api_key: config.search_api_key.clone(),
            excluded_hosts: config.excluded_hosts.clone(),
            result_count: config.result_count,
            max_references: config.max_references,
        })
    }

    /// Discover reference URLs for a topic.
    ///
    /// Returns at most `max_references` links, preserving provider order.
    /// A provider error yields `Failed`; a clean response with nothing
    /// usable yields `Empty`. Never returns an `Err` to the caller.
    #[instrument(skip(self))]
    pub async fn discover(&self, topic: &str) -> StageOutcome<Vec<String>> {
        info!(topic, "searching for reference material");

        let response = match self.search(topic).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "search provider call failed");
                return StageOutcome::Failed(e.to_string());
            }
        };

        let links = filter_links(
            response.organic_results,
            &self.excluded_hosts,
            self.max_references,
        );

        if links.is_empty() {
            debug!("no usable links after filtering");
            return StageOutcome::Empty;
        }

        info!(count = links.len(), ?links, "reference links discovered");
        StageOutcome::Ready(links)
    }

    /// Issue the single search query.
    async fn search(&self, topic: &str) -> Result<SearchResponse> {
        let num = self.result_count.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("engine", "google"),
                ("q", topic),
                ("api_key", self.api_key.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleForgeError::Network(format!(
                "search provider returned HTTP {status}"
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| ArticleForgeError::parse(format!("search response: {e}")))
    }
}

/// Drop results without a link or on an excluded host, keep provider
/// order, and truncate to the first `max` entries. Unparsable links are
/// dropped too — acquisition could never fetch them.
fn filter_links(results: Vec<SearchResult>, excluded_hosts: &[String], max: usize) -> Vec<String> {
    results
        .into_iter()
        .filter_map(|r| r.link)
        .filter(|link| match Url::parse(link) {
            Ok(url) => !is_excluded_host(url.host_str(), excluded_hosts),
            Err(_) => false,
        })
        .take(max)
        .collect()
}

/// Match a host against the exclusion list, covering subdomains
/// (`www.youtube.com` matches `youtube.com`).
fn is_excluded_host(host: Option<&str>, excluded_hosts: &[String]) -> bool {
    let Some(host) = host else {
        return false;
    };
    excluded_hosts
        .iter()
        .any(|excluded| host == excluded || host.ends_with(&format!(".{excluded}")))
}
