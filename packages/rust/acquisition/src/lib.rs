//! Content acquisition: reference URL → bounded plain-text excerpt.
//!
//! Fetches the page with a browser-like User-Agent (many sites reject
//! default client identifiers), strips non-article markup, and extracts
//! text from the most specific content container available. Any fetch or
//! parse failure yields an empty excerpt for that URL only — the caller
//! continues with whatever other URLs succeeded.

mod extract;

use reqwest::Client;
use tracing::{info, instrument, warn};

use articleforge_shared::{ArticleForgeError, Result, RuntimeConfig};

pub use extract::extract_excerpt;

/// Browser-like User-Agent for page fetches.
const USER_AGENT: &str = "Mozilla/5.0";

// ---------------------------------------------------------------------------
// PageReader
// ---------------------------------------------------------------------------

/// Fetches reference pages and extracts bounded plain-text excerpts.
#[derive(Debug, Clone)]
pub struct PageReader {
    client: Client,
    max_chars: usize,
}

impl PageReader {
    /// Build a reader from the resolved runtime configuration.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.fetch_timeout_secs))
            .build()
            .map_err(|e| ArticleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            max_chars: config.excerpt_max_chars,
        })
    }

    /// Fetch one URL and extract a plain-text excerpt of at most
    /// `excerpt_max_chars` characters. Returns an empty string on any
    /// failure; never returns an `Err` to the caller.
    #[instrument(skip(self))]
    pub async fn read_excerpt(&self, url: &str) -> String {
        let html = match self.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(url, error = %e, "page fetch failed, skipping URL");
                return String::new();
            }
        };

        let excerpt = extract_excerpt(&html, self.max_chars);
        info!(url, excerpt_len = excerpt.len(), "excerpt extracted");
        excerpt
    }

    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArticleForgeError::Network(format!("{url}: HTTP {status}")));
        }

        response
            .text()
            .await
            .map_err(|e| ArticleForgeError::Network(format!("{url}: failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use articleforge_shared::RuntimeConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            storage_base_url: "http://unused.test".into(),
            search_base_url: "http://unused.test".into(),
            search_api_key: "unused".into(),
            excluded_hosts: vec![],
            result_count: 8,
            max_references: 2,
            rewrite_base_url: "http://unused.test".into(),
            rewrite_api_key: "unused".into(),
            model: "test-model".into(),
            excerpt_max_chars: 6000,
            fetch_timeout_secs: 8,
        }
    }

    #[tokio::test]
    async fn read_excerpt_extracts_article_text() {
        let server = MockServer::start().await;

        let html = r#"<html><head><style>.x{}</style></head><body>
            <nav>Home | About</nav>
            <article><h1>Widget Trends</h1><p>Widgets are selling well.</p></article>
            <footer>Copyright</footer>
        </body></html>"#;

        Mock::given(method("GET"))
            .and(path("/post"))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;

        let reader = PageReader::new(&test_config()).expect("build reader");
        let excerpt = reader.read_excerpt(&format!("{}/post", server.uri())).await;

        assert!(excerpt.contains("Widgets are selling well."));
        assert!(!excerpt.contains("Home | About"));
        assert!(!excerpt.contains("Copyright"));
    }

    #[tokio::test]
    async fn read_excerpt_returns_empty_on_http_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let reader = PageReader::new(&test_config()).expect("build reader");
        let excerpt = reader.read_excerpt(&format!("{}/denied", server.uri())).await;

        assert_eq!(excerpt, "");
    }

    #[tokio::test]
    async fn read_excerpt_returns_empty_on_unreachable_host() {
        let reader = PageReader::new(&test_config()).expect("build reader");
        // Reserved TLD, guaranteed not to resolve
        let excerpt = reader.read_excerpt("http://nonexistent.invalid/page").await;

        assert_eq!(excerpt, "");
    }
}
