use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadErrorKind {
    ListingUnavailable,
}

/// Failure of a whole load cycle.
///
/// Per-item detail failures are absorbed by the loader and never show up here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("catalog listing unavailable: {0}")]
    ListingUnavailable(String),
}

impl LoadError {
    pub fn listing_unavailable(message: impl Into<String>) -> Self {
        Self::ListingUnavailable(message.into())
    }

    pub fn kind(&self) -> LoadErrorKind {
        match self {
            LoadError::ListingUnavailable(_) => LoadErrorKind::ListingUnavailable,
        }
    }
}
