use std::sync::Arc;

use valuation_core::{KeyValueStore, ValuationError};

/// Store key for the acknowledgement flag.
pub const DISCLAIMER_KEY: &str = "nse-stock-valuations-disclaimer-accepted";

/// Whether the user acknowledged the risk disclosure in a prior session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisclaimerStatus {
    Accepted,
    Pending,
}

impl DisclaimerStatus {
    pub fn is_accepted(&self) -> bool {
        matches!(self, DisclaimerStatus::Accepted)
    }
}

/// Reads and records the acknowledgement. Read once at startup and pass the
/// resulting [`DisclaimerStatus`] to whatever presents results.
#[derive(Clone)]
pub struct DisclaimerGate {
    store: Arc<dyn KeyValueStore>,
}

impl DisclaimerGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// An unreadable store counts as not accepted.
    pub async fn status(&self) -> DisclaimerStatus {
        match self.store.get(DISCLAIMER_KEY).await {
            Ok(Some(value)) if value.trim() == "true" => DisclaimerStatus::Accepted,
            Ok(_) => DisclaimerStatus::Pending,
            Err(e) => {
                tracing::warn!("Could not read disclaimer acknowledgement: {}", e);
                DisclaimerStatus::Pending
            }
        }
    }

    pub async fn set_accepted(&self, accepted: bool) -> Result<(), ValuationError> {
        if accepted {
            self.store.set(DISCLAIMER_KEY, "true".to_string()).await
        } else {
            self.store.remove(DISCLAIMER_KEY).await
        }
    }
}
