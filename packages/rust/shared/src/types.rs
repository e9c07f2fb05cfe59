//! Core domain types for ArticleForge articles and pipeline stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ArticleForgeError, Result};

/// Sentinel stored as `source_url` when the original article has none.
pub const SOURCE_URL_SENTINEL: &str = "N/A";

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// An article record as returned by the storage API.
///
/// Records with `is_generated = false` are originals eligible for
/// enrichment; generated records point back to their original through
/// `original_article_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Storage-assigned identifier.
    pub id: i64,
    /// Article title.
    pub title: String,
    /// Article body (markdown or plain text).
    pub content: String,
    /// URL the original was harvested from, if any.
    #[serde(default)]
    pub source_url: Option<String>,
    /// Whether this record was produced by the enrichment pipeline.
    #[serde(default)]
    pub is_generated: bool,
    /// Reference URLs appended by the pipeline (generated records only).
    #[serde(default)]
    pub references: Option<Vec<String>>,
    /// The original this record was generated from, if any.
    #[serde(default)]
    pub original_article_id: Option<i64>,
    /// When the record was created.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// When the record was last updated.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// ArticlePayload
// ---------------------------------------------------------------------------

/// Payload for the storage API's create operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlePayload {
    /// Required, non-empty.
    pub title: String,
    /// Required, non-empty.
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    pub is_generated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
    /// Must reference an existing record if present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_article_id: Option<i64>,
}

impl ArticlePayload {
    /// Check the collaborator's required-field rules before sending.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(ArticleForgeError::validation(
                "title must be a non-empty string",
            ));
        }
        if self.content.trim().is_empty() {
            return Err(ArticleForgeError::validation(
                "content must be a non-empty string",
            ));
        }
        Ok(())
    }
}

/// Partial payload for the storage API's update operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_generated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// StageOutcome
// ---------------------------------------------------------------------------

/// Tagged result of a pipeline stage.
///
/// External-call failures are caught inside each stage and converted to
/// `Failed`; a stage that ran cleanly but produced nothing yields `Empty`.
/// The orchestrator halts on both — the distinction only affects the
/// diagnostics it logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome<T> {
    /// The stage produced a usable value.
    Ready(T),
    /// The stage ran but produced nothing to carry forward.
    Empty,
    /// An external call failed; the reason is for diagnostics only.
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_deserializes_from_api_record() {
        let json = r#"{
            "id": 7,
            "title": "Widget Trends",
            "content": "Body text",
            "source_url": "https://blog.example.com/widget-trends",
            "is_generated": false,
            "references": null,
            "original_article_id": null,
            "created_at": "2026-01-15T10:30:00Z",
            "updated_at": "2026-01-15T10:30:00Z"
        }"#;
        let article: Article = serde_json::from_str(json).expect("deserialize");
        assert_eq!(article.id, 7);
        assert!(!article.is_generated);
        assert!(article.references.is_none());
    }

    #[test]
    fn article_tolerates_missing_optional_fields() {
        let json = r#"{"id": 1, "title": "T", "content": "C"}"#;
        let article: Article = serde_json::from_str(json).expect("deserialize");
        assert!(article.source_url.is_none());
        assert!(!article.is_generated);
        assert!(article.created_at.is_none());
    }

    #[test]
    fn payload_omits_absent_fields() {
        let payload = ArticlePayload {
            title: "T".into(),
            content: "C".into(),
            source_url: None,
            is_generated: true,
            references: Some(vec!["https://x.test".into()]),
            original_article_id: None,
        };
        let json = serde_json::to_string(&payload).expect("serialize");
        assert!(!json.contains("source_url"));
        assert!(!json.contains("original_article_id"));
        assert!(json.contains(r#""references":["https://x.test"]"#));
    }

    #[test]
    fn payload_validation_rejects_empty_fields() {
        let payload = ArticlePayload {
            title: "  ".into(),
            content: "C".into(),
            source_url: None,
            is_generated: true,
            references: None,
            original_article_id: None,
        };
        assert!(payload.validate().is_err());

        let payload = ArticlePayload {
            title: "T".into(),
            content: String::new(),
            source_url: None,
            is_generated: true,
            references: None,
            original_article_id: None,
        };
        assert!(payload.validate().is_err());
    }
}
