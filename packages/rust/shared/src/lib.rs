//! Shared types, configuration, and error handling for ArticleForge.

pub mod config;
pub mod error;
pub mod types;

pub use config::{
    AppConfig, LimitsConfig, RewriteConfig, RuntimeConfig, SearchConfig, StorageConfig,
    config_dir, config_file_path, init_config, load_config, load_config_from,
};
pub use error::{ArticleForgeError, Result};
pub use types::{Article, ArticlePayload, ArticleUpdate, StageOutcome};
