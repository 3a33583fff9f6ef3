use analysis_store::SavedAnalyses;
use chrono::Utc;
use metrics_engine::MetricsEngine;
use scoring_engine::ScoringEngine;
use valuation_core::{validate_inputs, AnalysisResult, SavedAnalysis, ValuationError, ValuationInputs};

/// Runs both engines over one input snapshot and hands the resulting record
/// to the saved-analysis list when one is attached.
pub struct ValuationOrchestrator {
    metrics_engine: MetricsEngine,
    scoring_engine: ScoringEngine,
    /// Optional persistence for named analyses
    saved: Option<SavedAnalyses>,
}

impl ValuationOrchestrator {
    pub fn new() -> Self {
        Self {
            metrics_engine: MetricsEngine::new(),
            scoring_engine: ScoringEngine::new(),
            saved: None,
        }
    }

    /// Attach the saved-analysis list
    pub fn with_saved_analyses(mut self, saved: SavedAnalyses) -> Self {
        self.saved = Some(saved);
        self
    }

    /// Validate, compute metrics and scoring, and stamp the record.
    pub fn analyze(&self, inputs: ValuationInputs) -> Result<AnalysisResult, ValuationError> {
        if let Err(e) = validate_inputs(&inputs) {
            tracing::warn!("Rejected inputs for '{}': {}", inputs.company.name, e);
            return Err(e);
        }
        Ok(self.analyze_unchecked(inputs))
    }

    /// Skip validation. Both engines are total, so this never fails; it only
    /// stops guaranteeing that the numbers mean anything.
    pub fn analyze_unchecked(&self, inputs: ValuationInputs) -> AnalysisResult {
        let metrics = self.metrics_engine.calculate(&inputs);
        let scoring = self.scoring_engine.score(
            &metrics,
            inputs.assumptions.risk_free_rate,
            inputs.company.sector,
        );

        tracing::info!(
            "{} ({}): score {:.2} -> {}",
            inputs.company.name,
            inputs.company.financial_year,
            scoring.total_weighted_score,
            scoring.verdict.to_label()
        );

        AnalysisResult {
            inputs,
            metrics,
            scoring,
            timestamp: Utc::now(),
        }
    }

    /// Persist a named copy of the analysis.
    ///
    /// Storage failures never reach the caller: they are logged and the save
    /// becomes a no-op, returning `None`.
    pub async fn save(&self, name: &str, analysis: &AnalysisResult) -> Option<SavedAnalysis> {
        let Some(saved) = &self.saved else {
            tracing::warn!("No analysis store configured; '{}' not saved", name);
            return None;
        };

        match saved.save(name, analysis.clone()).await {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::error!("Error saving analysis '{}': {}", name, e);
                None
            }
        }
    }

    pub async fn list_saved(&self) -> Result<Vec<SavedAnalysis>, ValuationError> {
        self.store()?.list().await
    }

    pub async fn load_saved(&self, id: &str) -> Result<SavedAnalysis, ValuationError> {
        self.store()?
            .load(id)
            .await?
            .ok_or_else(|| ValuationError::NotFound(format!("saved analysis {}", id)))
    }

    pub async fn delete_saved(&self, id: &str) -> Result<bool, ValuationError> {
        self.store()?.delete(id).await
    }

    pub async fn clear_saved(&self) -> Result<(), ValuationError> {
        self.store()?.clear().await
    }

    fn store(&self) -> Result<&SavedAnalyses, ValuationError> {
        self.saved
            .as_ref()
            .ok_or_else(|| ValuationError::StorageError("No analysis store configured".to_string()))
    }
}

impl Default for ValuationOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}
