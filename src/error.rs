//! Error types for compilation and command transport.
//!
//! Compilation has exactly one class of hard failure: a document that is not
//! a JSON mapping at the top level.  Everything below the top level degrades
//! to documented defaults instead of erroring.

use thiserror::Error;

/// Structural failure of a storyboard document.
#[derive(Debug, Error)]
pub enum CompileError {
    /// The input could not be parsed as JSON at all.
    #[error("storyboard is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The input parsed, but its top level is not a mapping.
    #[error("storyboard must be a JSON object at the top level, found {found}")]
    NotAMapping {
        /// JSON type name of the value that was found instead.
        found: &'static str,
    },
}

pub type CompileResult<T> = Result<T, CompileError>;

/// Failure reported by a command transport for a single submission.
///
/// The scheduler records these per command; they never abort a run.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The world answered but refused the command.
    #[error("command rejected: {0}")]
    Rejected(String),

    /// No answer within the transport's own deadline.
    #[error("command timed out after {0} ms")]
    Timeout(u64),

    /// The connection to the world was lost or could not be opened.
    #[error("connection error: {0}")]
    Connection(String),

    /// The transport is not able to submit anything (e.g. not configured).
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}
