use crate::value::BindValue;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an index-origin invariant violation.
    pub(crate) fn index_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::Index, message)
    }

    /// Construct an index-origin unsupported error.
    pub(crate) fn index_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Index, message)
    }

    /// Construct an index-origin configuration error.
    ///
    /// These describe declarations that can never be written, so callers
    /// must not retry them.
    pub(crate) fn index_misconfigured(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Misconfigured, ErrorOrigin::Index, message)
    }

    /// Construct a schema-origin configuration error.
    pub(crate) fn schema_misconfigured(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Misconfigured, ErrorOrigin::Schema, message)
    }

    /// Construct a backend-origin internal error.
    pub(crate) fn backend_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Backend, message)
    }

    /// Construct a batch-write failure carrying the offending rows.
    pub(crate) fn batch_failed(failure: BatchFailure) -> Self {
        let message = format!(
            "batch insert into '{}' failed ({} of {} rows rejected): {}",
            failure.table,
            failure.failed_rows.len(),
            failure.total_rows,
            failure.cause
        );

        Self {
            class: ErrorClass::BatchFailed,
            origin: ErrorOrigin::Backend,
            message,
            detail: Some(ErrorDetail::Batch(Box::new(failure))),
        }
    }

    /// Whether this error describes a declaration problem rather than a runtime condition.
    #[must_use]
    pub const fn is_misconfigured(&self) -> bool {
        matches!(self.class, ErrorClass::Misconfigured)
    }

    /// Borrow batch-failure detail, if present.
    #[must_use]
    pub fn batch_failure(&self) -> Option<&BatchFailure> {
        match &self.detail {
            Some(ErrorDetail::Batch(failure)) => Some(&**failure),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

impl From<BackendError> for InternalError {
    fn from(err: BackendError) -> Self {
        Self::backend_internal(err.to_string())
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error payloads.
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Batch(Box<BatchFailure>),
}

///
/// BatchFailure
///
/// Diagnostic payload for a rejected batch insert: which statement ran and
/// which positions in its parameter list the backend refused.
///

#[derive(Clone, Debug, ThisError)]
#[error("batch failure on '{table}': {cause}")]
pub struct BatchFailure {
    pub table: String,
    pub sql: String,
    pub total_rows: usize,
    pub failed_rows: Vec<(usize, Vec<BindValue>)>,
    pub cause: String,
}

impl BatchFailure {
    /// Positions of the failed rows in the submitted parameter list.
    #[must_use]
    pub fn failed_positions(&self) -> Vec<usize> {
        self.failed_rows.iter().map(|(position, _)| *position).collect()
    }
}

///
/// BackendError
///
/// Failure reported by an external collaborator (connection, symbol table).
///

#[derive(Debug, ThisError)]
#[error("backend error: {message}")]
pub struct BackendError {
    pub message: String,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    BatchFailed,
    Internal,
    InvariantViolation,
    Misconfigured,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::BatchFailed => "batch_failed",
            Self::Internal => "internal",
            Self::InvariantViolation => "invariant_violation",
            Self::Misconfigured => "misconfigured",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Backend,
    Config,
    Index,
    Schema,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Backend => "backend",
            Self::Config => "config",
            Self::Index => "index",
            Self::Schema => "schema",
        };
        write!(f, "{label}")
    }
}
