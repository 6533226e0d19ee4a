use std::{collections::HashSet, fs, path::Path, sync::Arc};

use anyhow::Context;
use hm_srs::Scheduler;
use hm_store::{ItemKey, MemoryStore, VocabularyItem};
use tokio::sync::Mutex;

use crate::{ApiConfig, config::Environment, error::ApiError};

/// The loaded vocabulary and the set of keys it answers to
#[derive(Debug)]
pub struct Vocabulary {
    items: Vec<VocabularyItem>,
    keys: HashSet<ItemKey>,
}

impl Vocabulary {
    pub fn new(items: Vec<VocabularyItem>) -> Self {
        let keys = items.iter().map(VocabularyItem::key).collect();
        Self { items, keys }
    }

    pub fn items(&self) -> &[VocabularyItem] {
        &self.items
    }

    pub fn contains(&self, key: &ItemKey) -> bool {
        self.keys.contains(key)
    }

    /// Reject keys that do not belong to any loaded item
    pub fn ensure_known(&self, key: &ItemKey) -> Result<(), ApiError> {
        if self.contains(key) {
            Ok(())
        } else {
            Err(ApiError::UnknownItem(key.clone()))
        }
    }
}

/// Scheduler and review history, always locked together so that reviews and
/// sync drains never interleave
#[derive(Debug)]
pub struct ReviewDesk {
    pub scheduler: Scheduler,
    pub history: MemoryStore,
}

#[derive(Clone, Debug)]
pub struct ApiState {
    pub vocabulary: Arc<Vocabulary>,
    pub desk: Arc<Mutex<ReviewDesk>>,
    pub environment: Environment,
}

impl ApiState {
    /// Load vocabulary and (optionally) a history snapshot from the configured paths
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let items = load_vocabulary(&config.vocabulary_path)?;
        tracing::info!(
            items = items.len(),
            path = %config.vocabulary_path.display(),
            "Vocabulary loaded"
        );

        let history = match &config.history_path {
            Some(path) => load_history(path)?,
            None => {
                tracing::warn!("No history snapshot configured, starting with empty history");
                MemoryStore::new()
            }
        };

        let scheduler = Scheduler::default().with_queue_limit(config.queue_limit);

        Ok(Self::from_parts(items, history, scheduler, config.env))
    }

    pub fn from_parts(
        items: Vec<VocabularyItem>,
        history: MemoryStore,
        scheduler: Scheduler,
        environment: Environment,
    ) -> Self {
        Self {
            vocabulary: Arc::new(Vocabulary::new(items)),
            desk: Arc::new(Mutex::new(ReviewDesk { scheduler, history })),
            environment,
        }
    }
}

fn load_vocabulary(path: &Path) -> anyhow::Result<Vec<VocabularyItem>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read vocabulary from {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("malformed vocabulary in {}", path.display()))
}

fn load_history(path: &Path) -> anyhow::Result<MemoryStore> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "History snapshot not found, starting empty");
        return Ok(MemoryStore::new());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read history from {}", path.display()))?;
    let history = MemoryStore::from_json(&raw)
        .with_context(|| format!("malformed history in {}", path.display()))?;
    tracing::info!(records = history.len(), path = %path.display(), "History loaded");

    Ok(history)
}
