//! Quiz data sources
//!
//! CSV sheets are fetched per category, trying the `_qa_fixed.csv` variant
//! before the original `_qa.csv`. The JSON aggregate file is fetched once and
//! kept in a [`JsonCache`] owned by the loader.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::QuizConfig;
use crate::error::{QuizError, QuizResult};
use crate::quiz_data::{parse_quiz_csv, parse_quiz_json, QuizEntry};

/// Where quiz files come from
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the text body stored at `path`
    async fn fetch_text(&self, path: &str) -> QuizResult<String>;
}

/// Fetches over HTTP relative to a base URL
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> QuizResult<String> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(QuizError::HttpStatus { path: url, status: status.as_u16() });
        }
        Ok(response.text().await?)
    }
}

/// Reads files below a root directory
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl Fetcher for FsFetcher {
    async fn fetch_text(&self, path: &str) -> QuizResult<String> {
        let full = self.root.join(path.trim_start_matches('/'));
        Ok(tokio::fs::read_to_string(full).await?)
    }
}

/// Process-lifetime cache of the JSON aggregate
#[derive(Debug, Default)]
pub struct JsonCache {
    entries: Mutex<Option<Arc<Vec<QuizEntry>>>>,
}

impl JsonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_loaded(&self) -> bool {
        self.entries.lock().await.is_some()
    }

    /// Drop cached entries so the next load fetches again
    pub async fn invalidate(&self) {
        *self.entries.lock().await = None;
    }
}

/// Loads and normalizes quiz entries from a [`Fetcher`]
pub struct QuizDataLoader<F> {
    fetcher: F,
    csv_base_path: String,
    json_data_path: String,
    cache: JsonCache,
}

impl<F: Fetcher> QuizDataLoader<F> {
    pub fn new(fetcher: F, config: &QuizConfig) -> Self {
        Self {
            fetcher,
            csv_base_path: config.csv_base_path.clone(),
            json_data_path: config.json_data_path.clone(),
            cache: JsonCache::new(),
        }
    }

    pub fn cache(&self) -> &JsonCache {
        &self.cache
    }

    pub async fn invalidate_cache(&self) {
        self.cache.invalidate().await;
    }

    fn csv_path(&self, category_id: &str, suffix: &str) -> String {
        format!("{}/{}{}", self.csv_base_path.trim_end_matches('/'), category_id, suffix)
    }

    async fn fetch_non_empty(&self, path: &str) -> QuizResult<String> {
        let text = self.fetcher.fetch_text(path).await?;
        if text.is_empty() {
            return Err(QuizError::EmptySource(path.to_string()));
        }
        Ok(text)
    }

    /// Load one category's CSV sheet; any failure yields no entries
    pub async fn load_csv(&self, category_id: &str) -> Vec<QuizEntry> {
        let fixed = self.csv_path(category_id, "_qa_fixed.csv");
        debug!("Trying to fetch fixed CSV data from: {}", fixed);

        let text = match self.fetch_non_empty(&fixed).await {
            Ok(text) => text,
            Err(e) => {
                let original = self.csv_path(category_id, "_qa.csv");
                debug!("Fixed CSV unavailable ({}), fetching original: {}", e, original);
                match self.fetch_non_empty(&original).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Error loading CSV data for {}: {}", category_id, e);
                        return Vec::new();
                    }
                }
            }
        };

        let data = parse_quiz_csv(&text);
        info!(
            "Loaded {} quiz items for {} ({} diagnostics)",
            data.entries.len(),
            category_id,
            data.diagnostics.len()
        );
        data.entries
    }

    /// Load several categories back to back
    pub async fn load_categories<S: AsRef<str>>(&self, category_ids: &[S]) -> Vec<QuizEntry> {
        let mut entries = Vec::new();
        for id in category_ids {
            entries.extend(self.load_csv(id.as_ref()).await);
        }
        entries
    }

    /// All entries of the JSON aggregate, fetched at most once while cached
    pub async fn load_json(&self) -> Arc<Vec<QuizEntry>> {
        let mut cached = self.cache.entries.lock().await;
        if let Some(entries) = &*cached {
            return Arc::clone(entries);
        }

        let parsed = match self.fetch_non_empty(&self.json_data_path).await {
            Ok(text) => parse_quiz_json(&text),
            Err(e) => Err(e),
        };

        match parsed {
            Ok(data) => {
                info!("Cached {} quiz items from {}", data.entries.len(), self.json_data_path);
                let entries = Arc::new(data.entries);
                *cached = Some(Arc::clone(&entries));
                entries
            }
            Err(e) => {
                warn!("Error loading JSON data from {}: {}", self.json_data_path, e);
                Arc::new(Vec::new())
            }
        }
    }

    /// JSON entries of one category
    pub async fn load_json_for_category(&self, category_id: &str) -> Vec<QuizEntry> {
        self.load_json()
            .await
            .iter()
            .filter(|e| e.category == category_id)
            .cloned()
            .collect()
    }
}
