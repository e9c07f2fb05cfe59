//! HTTP client for the article storage collaborator.
//!
//! The collaborator is a plain REST CRUD service: `GET <base>` lists
//! articles newest-first, `POST <base>` creates one. The pipeline uses
//! only those two operations; the rest of the surface exists for the
//! CLI and for operational tooling.
//!
//! Unlike the stage crates, storage errors here ARE typed `Err`s — the
//! orchestrator decides what a failed list or create means for the run.

use reqwest::Client;
use tracing::{debug, instrument};

use articleforge_shared::{
    Article, ArticleForgeError, ArticlePayload, ArticleUpdate, Result, RuntimeConfig,
};

/// Timeout in seconds for storage API calls.
const STORAGE_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for storage requests.
const USER_AGENT: &str = concat!("ArticleForge/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// ArticleStore
// ---------------------------------------------------------------------------

/// Client for the article storage API.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    client: Client,
    base_url: String,
}

impl ArticleStore {
    /// Build a store from the resolved runtime configuration.
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        Self::from_base_url(config.storage_base_url.clone())
    }

    /// Build a store pointing at an explicit base URL.
    pub fn from_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(STORAGE_TIMEOUT_SECS))
            .build()
            .map_err(|e| ArticleForgeError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// List all articles, newest-first per the collaborator's contract.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Article>> {
        let response = self
            .client
            .get(&self.base_url)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("list: {e}")))?;

        let response = check_status(response, "list").await?;

        let articles: Vec<Article> = response
            .json()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("list: invalid response: {e}")))?;

        debug!(count = articles.len(), "articles listed");
        Ok(articles)
    }

    /// Fetch a single article by id.
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Article> {
        let response = self
            .client
            .get(format!("{}/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("get {id}: {e}")))?;

        let response = check_status(response, "get").await?;

        response
            .json()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("get {id}: invalid response: {e}")))
    }

    /// Create an article. The payload is validated client-side against
    /// the collaborator's required-field rules before sending.
    #[instrument(skip_all, fields(title = %payload.title, is_generated = payload.is_generated))]
    pub async fn create(&self, payload: &ArticlePayload) -> Result<Article> {
        payload.validate()?;

        let response = self
            .client
            .post(&self.base_url)
            .json(payload)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("create: {e}")))?;

        let response = check_status(response, "create").await?;

        let article: Article = response
            .json()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("create: invalid response: {e}")))?;

        debug!(id = article.id, "article created");
        Ok(article)
    }

    /// Update an existing article.
    #[instrument(skip(self, update))]
    pub async fn update(&self, id: i64, update: &ArticleUpdate) -> Result<Article> {
        let response = self
            .client
            .put(format!("{}/{id}", self.base_url))
            .json(update)
            .send()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("update {id}: {e}")))?;

        let response = check_status(response, "update").await?;

        response
            .json()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("update {id}: invalid response: {e}")))
    }

    /// Delete an article.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.base_url))
            .send()
            .await
            .map_err(|e| ArticleForgeError::Storage(format!("delete {id}: {e}")))?;

        check_status(response, "delete").await?;
        Ok(())
    }
}

/// Convert a non-2xx response into a storage error carrying a snippet
/// of the body (the collaborator returns validation details there).
async fn check_status(response: reqwest::Response, op: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let snippet: String = body.chars().take(200).collect();
    Err(ArticleForgeError::Storage(format!(
        "{op}: HTTP {status}: {snippet}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn list_parses_article_records() {
        let server = MockServer::start().await;

        let body = serde_json::json!([
            {"id": 2, "title": "Newest", "content": "B", "is_generated": false},
            {"id": 1, "title": "Older", "content": "A", "is_generated": true}
        ]);

        Mock::given(method("GET"))
            .and(path("/api/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&server)
            .await;

        let store =
            ArticleStore::from_base_url(format!("{}/api/articles", server.uri())).expect("store");
        let articles = store.list().await.expect("list");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Newest");
        assert!(articles[1].is_generated);
    }

    #[tokio::test]
    async fn get_fetches_single_record() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/articles/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "title": "Widget Trends",
                "content": "Body",
                "is_generated": false
            })))
            .mount(&server)
            .await;

        let store =
            ArticleStore::from_base_url(format!("{}/api/articles", server.uri())).expect("store");
        let article = store.get(7).await.expect("get");

        assert_eq!(article.id, 7);
        assert_eq!(article.title, "Widget Trends");
        assert!(!article.is_generated);
    }

    #[tokio::test]
    async fn update_puts_partial_payload() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/api/articles/7"))
            .and(body_partial_json(serde_json::json!({"title": "Revised"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": 7,
                "title": "Revised",
                "content": "Body",
                "is_generated": false
            })))
            .mount(&server)
            .await;

        let store =
            ArticleStore::from_base_url(format!("{}/api/articles", server.uri())).expect("store");
        let update = ArticleUpdate {
            title: Some("Revised".into()),
            ..Default::default()
        };
        let article = store.update(7, &update).await.expect("update");

        assert_eq!(article.title, "Revised");
    }

    #[tokio::test]
    async fn create_posts_payload_and_parses_record() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/articles"))
            .and(body_partial_json(serde_json::json!({
                "title": "Widget Market Outlook",
                "is_generated": true,
                "references": ["https://a.test"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "id": 42,
                "title": "Widget Market Outlook",
                "content": "Body",
                "is_generated": true,
                "references": ["https://a.test"]
            })))
            .mount(&server)
            .await;

        let store =
            ArticleStore::from_base_url(format!("{}/api/articles", server.uri())).expect("store");
        let payload = ArticlePayload {
            title: "Widget Market Outlook".into(),
            content: "Body".into(),
            source_url: Some("N/A".into()),
            is_generated: true,
            references: Some(vec!["https://a.test".into()]),
            original_article_id: None,
        };

        let created = store.create(&payload).await.expect("create");
        assert_eq!(created.id, 42);
    }

    #[tokio::test]
    async fn create_rejects_invalid_payload_without_sending() {
        let server = MockServer::start().await;
        // No mock mounted: a request would fail loudly

        let store = ArticleStore::from_base_url(server.uri()).expect("store");
        let payload = ArticlePayload {
            title: String::new(),
            content: "Body".into(),
            source_url: None,
            is_generated: true,
            references: None,
            original_article_id: None,
        };

        let err = store.create(&payload).await.expect_err("validation error");
        assert!(matches!(err, ArticleForgeError::Validation { .. }));
        assert!(server.received_requests().await.expect("requests").is_empty());
    }

    #[tokio::test]
    async fn storage_errors_carry_status_and_body() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(422)
                    .set_body_string(r#"{"message": "The title field is required."}"#),
            )
            .mount(&server)
            .await;

        let store = ArticleStore::from_base_url(server.uri()).expect("store");
        let err = store.list().await.expect_err("storage error");

        let msg = err.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("title field is required"));
    }

    #[tokio::test]
    async fn delete_succeeds_on_2xx() {
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/7"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"message": "Deleted"})),
            )
            .mount(&server)
            .await;

        let store = ArticleStore::from_base_url(server.uri()).expect("store");
        store.delete(7).await.expect("delete");
    }
}
