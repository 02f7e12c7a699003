//! Error types for spec parsing and code generation.

use thiserror::Error;

/// Errors surfaced by the parsing and generation pipeline.
///
/// Both variants are fatal for the run they occur in: generation never
/// proceeds on an invalid model, and a missing template resource never
/// degrades to a partial file set.
#[derive(Debug, Error)]
pub enum Error {
    /// The input document is malformed or structurally insufficient
    /// (for example an empty document, or a top level that is not a mapping).
    #[error("invalid API description: {0}")]
    InvalidSpec(String),

    /// A template resource required by a generator could not be fetched
    /// through the injected resource-fetch capability.
    #[error("missing resource: {0}")]
    MissingResource(String),
}

pub type Result<T> = std::result::Result<T, Error>;
