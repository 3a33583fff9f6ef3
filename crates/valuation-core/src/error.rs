use thiserror::Error;

use crate::validation::FieldError;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Invalid input: {}", format_field_errors(.0))]
    InvalidInput(Vec<FieldError>),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

fn format_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
