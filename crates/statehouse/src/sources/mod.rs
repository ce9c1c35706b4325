//! Converters for legislatures that publish structured data instead of HTML.
//!
//! The records here mirror the JSON the services return; the conversion
//! functions turn them into the same [`crate::types`] records the HTML
//! extractors produce, through the same history finaliser, sponsor rules and
//! response vocabularies.

pub mod az;
pub mod ga;

use crate::votes::VoteError;

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Malformed service response: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Vote(#[from] VoteError),
    #[error("Unknown session '{0}'")]
    UnknownSession(String),
}
