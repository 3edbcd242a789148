//! Error types for trade discovery.
//!
//! Invalid move applications are expected during search and are absorbed
//! by the orchestrator. Only usage errors (missing catalog, malformed
//! targets, pool construction) surface from `TradeSearch::search`.

use thiserror::Error;

use crate::models::{ClassMove, SectionKey};
use crate::validation::ValidationError;

/// Result type for trade operations.
pub type Result<T> = std::result::Result<T, TradeError>;

/// Errors raised by the ledger, the catalog accessors and the search API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradeError {
    /// A move could not be applied to the ledger.
    #[error("invalid move {mv}: {reason}")]
    InvalidMove {
        mv: ClassMove,
        reason: InvalidMoveReason,
    },

    /// A search or seed was attempted before a catalog was supplied.
    #[error("no catalog has been supplied")]
    NoCatalog,

    /// The student id is not known to the catalog.
    #[error("unknown student '{0}'")]
    UnknownStudent(String),

    /// The section does not exist in the catalog.
    #[error("unknown section {0}")]
    UnknownSection(SectionKey),

    /// The schedule holds no section of the lecture.
    #[error("schedule holds no section of lecture '{lecture_code}'")]
    LectureNotHeld { lecture_code: String },

    /// Search targets failed validation.
    #[error("invalid search targets: {}", join_messages(.0))]
    InvalidTargets(Vec<ValidationError>),

    /// The worker pool could not be built.
    #[error("worker pool error: {0}")]
    WorkerPool(String),

    /// A background search ended without reporting a result.
    #[error("search thread terminated without a result")]
    SearchAborted,
}

/// Why a `ClassMove` was rejected by `TradeCapture::add`.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidMoveReason {
    /// One of the endpoints is not a real section.
    #[error("endpoint section does not exist")]
    UnknownSection,
    /// The student is not currently enrolled in the source section.
    #[error("student is not enrolled in the source section")]
    NotEnrolled,
    /// The student's schedule holds no section of the lecture.
    #[error("student does not take the lecture")]
    LectureNotHeld,
}

impl TradeError {
    /// Whether this error is an expected, branch-local move rejection.
    pub fn is_invalid_move(&self) -> bool {
        matches!(self, TradeError::InvalidMove { .. })
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
