//! Module: db::connection
//! Responsibility: statement shapes and the connection port that executes them.
//! Does not own: commits, rollbacks, retries, or timeouts.
//! Boundary: every call runs inside the caller's transaction.

use crate::{error::BackendError, value::BindValue};
use thiserror::Error as ThisError;
use uuid::Uuid;

///
/// InsertStatement
///
/// Parameterized insert for one physical index table. `columns` lists the
/// bound columns in parameter order.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    pub sql: String,
    pub columns: Vec<String>,
}

///
/// DeleteStatement
///
/// `DELETE … WHERE <id_column> IN (…)` over one physical index table.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub sql: String,
    pub id_column: String,
    pub ids: Vec<Uuid>,
}

///
/// UpdateCount
///
/// Per-row outcome reported by a batch execution.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum UpdateCount {
    Rows(u64),
    SuccessNoInfo,
    Failed,
}

///
/// BatchError
///
/// A rejected batch. `update_counts` holds what the driver reported before
/// or while failing; it may be shorter than the submitted batch when the
/// driver stopped at the first failure.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("batch execution failed: {message}")]
pub struct BatchError {
    pub message: String,
    pub update_counts: Vec<UpdateCount>,
}

impl BatchError {
    /// Positions of the rows that failed. When the driver reports no
    /// explicit failure but stopped early, the first unreported row is
    /// taken as the culprit.
    #[must_use]
    pub fn failed_positions(&self, submitted: usize) -> Vec<usize> {
        let failed: Vec<usize> = self
            .update_counts
            .iter()
            .enumerate()
            .filter(|(_, count)| matches!(count, UpdateCount::Failed))
            .map(|(position, _)| position)
            .collect();

        if failed.is_empty() && self.update_counts.len() < submitted {
            vec![self.update_counts.len()]
        } else {
            failed
        }
    }
}

///
/// IndexConnection
///

pub trait IndexConnection {
    /// Execute `statement` once per row in `rows`.
    fn execute_batch(
        &mut self,
        statement: &InsertStatement,
        rows: &[Vec<BindValue>],
    ) -> Result<Vec<UpdateCount>, BatchError>;

    /// Execute a delete and return the number of rows removed.
    fn execute_delete(&mut self, statement: &DeleteStatement) -> Result<u64, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_failures_are_reported() {
        let err = BatchError {
            message: "duplicate".to_string(),
            update_counts: vec![
                UpdateCount::Rows(1),
                UpdateCount::Failed,
                UpdateCount::SuccessNoInfo,
                UpdateCount::Failed,
            ],
        };

        assert_eq!(err.failed_positions(4), vec![1, 3]);
    }

    #[test]
    fn early_stop_reports_first_unreported_row() {
        let err = BatchError {
            message: "constraint".to_string(),
            update_counts: vec![UpdateCount::Rows(1), UpdateCount::Rows(1)],
        };

        assert_eq!(err.failed_positions(5), vec![2]);
    }

    #[test]
    fn statement_level_failure_reports_no_rows() {
        let err = BatchError {
            message: "syntax".to_string(),
            update_counts: vec![UpdateCount::Rows(1)],
        };

        assert!(err.failed_positions(1).is_empty());
    }
}
