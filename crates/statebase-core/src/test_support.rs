//! In-memory backend and connection for exercising the index writer.

use crate::{
    db::{
        backend::{AnsiVendor, IndexBackend, SqlVendor, SymbolTable},
        connection::{BatchError, DeleteStatement, IndexConnection, InsertStatement, UpdateCount},
    },
    error::BackendError,
    value::{BindValue, SymbolId},
};
use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet, HashMap},
};

///
/// MemorySymbols
///
/// Interns strings to ids in first-seen order, starting at 1.
///

#[derive(Debug, Default)]
pub struct MemorySymbols {
    ids: RefCell<HashMap<String, i32>>,
}

impl MemorySymbols {
    pub fn id_of(&self, symbol: &str) -> Option<SymbolId> {
        self.ids.borrow().get(symbol).copied().map(SymbolId)
    }
}

impl SymbolTable for MemorySymbols {
    fn symbol_id(&self, symbol: &str) -> Result<SymbolId, BackendError> {
        let mut ids = self.ids.borrow_mut();
        let next = i32::try_from(ids.len() + 1).map_err(|_| BackendError::new("symbol space exhausted"))?;
        let id = *ids.entry(symbol.to_string()).or_insert(next);

        Ok(SymbolId(id))
    }
}

///
/// MemoryBackend
///

#[derive(Debug, Default)]
pub struct MemoryBackend {
    tables: BTreeMap<String, BTreeSet<String>>,
    symbols: MemorySymbols,
    vendor: AnsiVendor,
    ignore_case: bool,
    in_row: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: &str, columns: &[&str]) -> Self {
        self.tables.insert(
            table.to_string(),
            columns.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Newest version of every built-in index table.
    pub fn with_current_tables(self) -> Self {
        const TYPED: &[&str] = &["id", "typeId", "symbolId", "value"];

        self.with_table("RecordLocation3", TYPED)
            .with_table("RecordRegion2", TYPED)
            .with_table("RecordNumber3", TYPED)
            .with_table("RecordString4", TYPED)
            .with_table("RecordUuid3", TYPED)
    }

    pub const fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self
    }

    pub const fn in_row(mut self) -> Self {
        self.in_row = true;
        self
    }

    pub const fn memory_symbols(&self) -> &MemorySymbols {
        &self.symbols
    }
}

impl IndexBackend for MemoryBackend {
    fn vendor(&self) -> &dyn SqlVendor {
        &self.vendor
    }

    fn symbols(&self) -> &dyn SymbolTable {
        &self.symbols
    }

    fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn has_column(&self, table: &str, column: &str) -> bool {
        self.tables
            .get(table)
            .is_some_and(|columns| columns.contains(column))
    }

    fn compares_ignore_case(&self) -> bool {
        self.ignore_case
    }

    fn has_in_row_index(&self) -> bool {
        self.in_row
    }
}

///
/// Failure
///
/// Injected batch failure for one table.
///

#[derive(Clone, Debug)]
pub enum Failure {
    /// Report these positions as failed and the rest as applied.
    Rows(Vec<usize>),
    /// Stop at this position without reporting it.
    StopAt(usize),
}

pub type MemoryRow = BTreeMap<String, BindValue>;

///
/// MemoryConnection
///

#[derive(Debug, Default)]
pub struct MemoryConnection {
    tables: BTreeMap<String, Vec<MemoryRow>>,
    executed: Vec<String>,
    failures: HashMap<String, Failure>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(mut self, table: &str, failure: Failure) -> Self {
        self.failures.insert(table.to_string(), failure);
        self
    }

    pub fn rows(&self, table: &str) -> &[MemoryRow] {
        self.tables.get(table).map_or(&[] as &[MemoryRow], Vec::as_slice)
    }

    pub fn total_rows(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    pub fn executed(&self) -> &[String] {
        &self.executed
    }
}

impl IndexConnection for MemoryConnection {
    fn execute_batch(
        &mut self,
        statement: &InsertStatement,
        rows: &[Vec<BindValue>],
    ) -> Result<Vec<UpdateCount>, BatchError> {
        self.executed.push(statement.sql.clone());

        if let Some(failure) = self.failures.get(&statement.table) {
            let update_counts = match failure {
                Failure::Rows(positions) => (0..rows.len())
                    .map(|position| {
                        if positions.contains(&position) {
                            UpdateCount::Failed
                        } else {
                            UpdateCount::Rows(1)
                        }
                    })
                    .collect(),
                Failure::StopAt(position) => vec![UpdateCount::Rows(1); (*position).min(rows.len())],
            };

            return Err(BatchError {
                message: format!("constraint violation on {}", statement.table),
                update_counts,
            });
        }

        let stored = self.tables.entry(statement.table.clone()).or_default();
        for row in rows {
            stored.push(
                statement
                    .columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect(),
            );
        }

        Ok(vec![UpdateCount::Rows(1); rows.len()])
    }

    fn execute_delete(&mut self, statement: &DeleteStatement) -> Result<u64, BackendError> {
        self.executed.push(statement.sql.clone());

        let Some(stored) = self.tables.get_mut(&statement.table) else {
            return Ok(0);
        };

        let before = stored.len();
        stored.retain(|row| match row.get(&statement.id_column) {
            Some(BindValue::Uuid(id)) => !statement.ids.contains(id),
            _ => true,
        });

        u64::try_from(before - stored.len()).map_err(|_| BackendError::new("row count overflow"))
    }
}
