use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;
use valuation_core::{AnalysisResult, KeyValueStore, SavedAnalysis, ValuationError};

/// Store key holding the saved list.
pub const SAVED_ANALYSES_KEY: &str = "nse-stock-valuations";

/// Maximum number of saved analyses kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// Bounded, newest-first list of named analyses.
///
/// Saving past capacity evicts the oldest entries. Clones share one write
/// lock, so read-modify-write cycles never interleave within a process.
#[derive(Clone)]
pub struct SavedAnalyses {
    store: Arc<dyn KeyValueStore>,
    capacity: usize,
    write_lock: Arc<Mutex<()>>,
}

impl SavedAnalyses {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_capacity(store, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(store: Arc<dyn KeyValueStore>, capacity: usize) -> Self {
        Self {
            store,
            capacity: capacity.max(1),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// All saved analyses, newest first.
    ///
    /// A payload that no longer parses is logged and treated as empty; the
    /// next save overwrites it.
    pub async fn list(&self) -> Result<Vec<SavedAnalysis>, ValuationError> {
        let Some(data) = self.store.get(SAVED_ANALYSES_KEY).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<SavedAnalysis>>(&data) {
            Ok(saved) => Ok(saved),
            Err(e) => {
                tracing::error!("Discarding unreadable saved analyses: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Name and prepend an analysis, evicting the oldest beyond capacity.
    pub async fn save(&self, name: &str, analysis: AnalysisResult) -> Result<SavedAnalysis, ValuationError> {
        let saved = SavedAnalysis {
            id: Uuid::new_v4().to_string(),
            name: name.trim().to_string(),
            analysis,
            created_at: Utc::now(),
        };

        let _guard = self.write_lock.lock().await;
        let mut existing = self.list().await?;
        existing.insert(0, saved.clone());
        if existing.len() > self.capacity {
            let evicted = existing.len() - self.capacity;
            existing.truncate(self.capacity);
            tracing::debug!("Evicted {} oldest saved analyses", evicted);
        }

        self.write(&existing).await?;
        tracing::info!("Saved analysis '{}' ({})", saved.name, saved.id);
        Ok(saved)
    }

    pub async fn load(&self, id: &str) -> Result<Option<SavedAnalysis>, ValuationError> {
        Ok(self.list().await?.into_iter().find(|a| a.id == id))
    }

    /// Returns false when no analysis had that id.
    pub async fn delete(&self, id: &str) -> Result<bool, ValuationError> {
        let _guard = self.write_lock.lock().await;
        let analyses = self.list().await?;
        let before = analyses.len();
        let remaining: Vec<SavedAnalysis> = analyses.into_iter().filter(|a| a.id != id).collect();

        if remaining.len() == before {
            return Ok(false);
        }

        self.write(&remaining).await?;
        Ok(true)
    }

    pub async fn clear(&self) -> Result<(), ValuationError> {
        let _guard = self.write_lock.lock().await;
        self.store.remove(SAVED_ANALYSES_KEY).await
    }

    async fn write(&self, analyses: &[SavedAnalysis]) -> Result<(), ValuationError> {
        let data = serde_json::to_string(analyses)?;
        self.store.set(SAVED_ANALYSES_KEY, data).await
    }
}
