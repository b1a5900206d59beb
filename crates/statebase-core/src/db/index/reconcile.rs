//! Module: index::reconcile
//! Responsibility: insert and delete index rows for a batch of states.
//! Does not own: commits, rollbacks, or retries; those belong to the caller.
//! Boundary: one call = collect, assemble per-table batches, flush.

use crate::{
    config::IndexConfig,
    db::{
        backend::{IndexBackend, render_row},
        connection::{BatchError, DeleteStatement, IndexConnection, InsertStatement},
        index::{
            IndexContext,
            collect::collect_index_values,
            in_row::{InRowIndex, encode_in_row},
            kind::IndexKind,
            table::RowSignature,
            value::IndexValue,
        },
    },
    error::{BatchFailure, InternalError},
    model::{index::IndexRef, schema::Schema, structure::StructModel},
    obs::sink::{self, ExecKind, MetricsEvent, Span},
    state::State,
    value::BindValue,
};
use std::collections::{BTreeMap, HashSet, btree_map::Entry};
use uuid::Uuid;

///
/// InsertReport
///
/// Outcome of `insert_by_states`. `in_row` is parallel to the input states
/// and holds an entry only for states that produced in-row tokens.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct InsertReport {
    pub in_row: Vec<Option<InRowIndex>>,
    pub tables: BTreeMap<String, usize>,
    pub rows_written: usize,
    pub blank_rows: usize,
    pub duplicate_rows: usize,
    pub in_row_tokens: usize,
}

///
/// DeleteReport
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeleteReport {
    pub tables: BTreeMap<String, u64>,
    pub statements: usize,
    pub rows_deleted: u64,
}

///
/// PendingBatch
///
/// Rows accumulated for one physical table during one insert call.
///

struct PendingBatch {
    statement: InsertStatement,
    seen: HashSet<RowSignature>,
    rows: Vec<Vec<BindValue>>,
}

impl PendingBatch {
    fn new(statement: InsertStatement) -> Self {
        Self {
            statement,
            seen: HashSet::new(),
            rows: Vec::new(),
        }
    }
}

///
/// IndexWriter
///
/// Entry point for index maintenance against one backend. Holds no state
/// between calls.
///

#[derive(Clone, Copy)]
pub struct IndexWriter<'a> {
    schema: &'a Schema,
    backend: &'a dyn IndexBackend,
    config: &'a IndexConfig,
}

impl<'a> IndexWriter<'a> {
    #[must_use]
    pub const fn new(
        schema: &'a Schema,
        backend: &'a dyn IndexBackend,
        config: &'a IndexConfig,
    ) -> Self {
        Self {
            schema,
            backend,
            config,
        }
    }

    #[must_use]
    pub const fn context(&self) -> IndexContext<'a> {
        IndexContext::new(self.backend, self.config)
    }

    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Index values of one state, as `insert_by_states` would compute them.
    pub fn index_values<'s>(&self, state: &'s State) -> Result<Vec<IndexValue<'s>>, InternalError>
    where
        'a: 's,
    {
        collect_index_values(self.schema, state)
    }

    /// Write every index row of `states`.
    ///
    /// Short-constant indexes are encoded in-row when enabled and supported;
    /// everything else is bound into one batch per physical table,
    /// deduplicated across the whole call, and flushed once all states are
    /// processed. A rejected batch stops the call with the failed rows
    /// attached; batches already flushed are left to the caller's
    /// transaction.
    pub fn insert_by_states<C>(
        &self,
        conn: &mut C,
        states: &[State],
    ) -> Result<InsertReport, InternalError>
    where
        C: IndexConnection + ?Sized,
    {
        let ctx = self.context();
        let in_row_enabled = self.config.in_row && self.backend.has_in_row_index();
        let mut span = Span::new(ExecKind::Insert, states.len());

        let mut report = InsertReport {
            in_row: vec![None; states.len()],
            ..InsertReport::default()
        };
        if states.is_empty() {
            return Ok(report);
        }

        // Phase 1: collect and bind rows per physical table.
        let mut pending: BTreeMap<String, PendingBatch> = BTreeMap::new();
        let mut index_value_count = 0usize;

        for (position, state) in states.iter().enumerate() {
            let index_values = collect_index_values(self.schema, state)?;
            index_value_count += index_values.len();

            for index_value in &index_values {
                let index = index_value.index();

                if in_row_enabled && index.model.short_constant {
                    let in_row = report.in_row[position].get_or_insert_with(InRowIndex::default);
                    report.in_row_tokens += encode_in_row(ctx, index_value, in_row)?;
                    continue;
                }

                for table in IndexKind::by_index(index).write_tables(ctx, Some(index))? {
                    let batch = match pending.entry(table.name(Some(index))?.to_string()) {
                        Entry::Occupied(entry) => entry.into_mut(),
                        Entry::Vacant(entry) => {
                            entry.insert(PendingBatch::new(table.prepare_insert(ctx, index)?))
                        }
                    };

                    let outcome = table.bind_insert_values(
                        ctx,
                        index_value,
                        state.id,
                        state.type_id,
                        &mut batch.seen,
                        &mut batch.rows,
                    )?;
                    report.blank_rows += outcome.blank;
                    report.duplicate_rows += outcome.duplicate;
                }
            }
        }

        tracing::debug!(
            states = states.len(),
            index_values = index_value_count,
            tables = pending.len(),
            in_row_tokens = report.in_row_tokens,
            "collected index rows"
        );

        // Phase 2: flush one batch per table.
        for (table, batch) in pending {
            if batch.rows.is_empty() {
                continue;
            }

            tracing::trace!(table = %table, sql = %batch.statement.sql, rows = batch.rows.len(), "executing index batch");
            if let Err(err) = conn.execute_batch(&batch.statement, &batch.rows) {
                return Err(self.batch_failed(table, batch, err));
            }

            sink::record(MetricsEvent::RowsWritten {
                table: table.clone(),
                rows: to_u64(batch.rows.len()),
            });
            report.rows_written += batch.rows.len();
            report.tables.insert(table, batch.rows.len());
        }

        sink::record(MetricsEvent::RowsSkipped {
            blank: to_u64(report.blank_rows),
            duplicate: to_u64(report.duplicate_rows),
        });
        if report.in_row_tokens > 0 {
            sink::record(MetricsEvent::InRowTokens {
                tokens: to_u64(report.in_row_tokens),
            });
        }
        span.set_rows(to_u64(report.rows_written));

        Ok(report)
    }

    /// Delete every index row of `states`, from every table version still
    /// being written. In-row indexes live on the record row and need no
    /// cleanup here.
    pub fn delete_by_states<C>(
        &self,
        conn: &mut C,
        states: &[State],
    ) -> Result<DeleteReport, InternalError>
    where
        C: IndexConnection + ?Sized,
    {
        let mut report = DeleteReport::default();
        if states.is_empty() {
            return Ok(report);
        }

        let ctx = self.context();
        let mut span = Span::new(ExecKind::Delete, states.len());

        // Phase 1: distinct ids and the structs they touch.
        let mut ids = Vec::with_capacity(states.len());
        let mut seen_ids = HashSet::with_capacity(states.len());
        let mut structs: Vec<&StructModel> = vec![self.schema.environment()];
        let mut seen_types: HashSet<Uuid> = HashSet::new();

        for state in states {
            if seen_ids.insert(state.id) {
                ids.push(state.id);
            }
            if let Some(ty) = self.schema.type_of(state)
                && let Some(type_id) = ty.type_id
                && seen_types.insert(type_id)
            {
                structs.push(ty);
            }
        }

        let custom_indexes: Vec<IndexRef<'_>> = structs
            .iter()
            .copied()
            .flat_map(StructModel::indexes)
            .filter(|index| IndexKind::is_custom_declaration(*index))
            .collect();

        // Phase 2: one statement per writable table.
        let mut statements: Vec<DeleteStatement> = Vec::new();
        let mut tables: HashSet<String> = HashSet::new();

        for kind in IndexKind::ALL {
            if kind == IndexKind::Custom {
                continue;
            }
            for table in kind.write_tables(ctx, None)? {
                let statement = table.prepare_delete(ctx, None, &ids)?;
                if tables.insert(statement.table.clone()) {
                    statements.push(statement);
                }
            }
        }

        for index in &custom_indexes {
            for table in IndexKind::Custom.write_tables(ctx, Some(*index))? {
                let statement = table.prepare_delete(ctx, Some(*index), &ids)?;
                if tables.insert(statement.table.clone()) {
                    statements.push(statement);
                }
            }
        }

        tracing::debug!(
            states = states.len(),
            ids = ids.len(),
            custom_indexes = custom_indexes.len(),
            statements = statements.len(),
            "deleting index rows"
        );

        // Phase 3: execute.
        for statement in statements {
            tracing::trace!(table = %statement.table, sql = %statement.sql, "executing index delete");
            let rows = conn.execute_delete(&statement)?;

            sink::record(MetricsEvent::RowsDeleted {
                table: statement.table.clone(),
                rows,
            });
            report.statements += 1;
            report.rows_deleted += rows;
            report.tables.insert(statement.table, rows);
        }
        span.set_rows(report.rows_deleted);

        Ok(report)
    }

    /// Log a rejected batch row by row and build the error carrying it.
    fn batch_failed(&self, table: String, batch: PendingBatch, err: BatchError) -> InternalError {
        let vendor = self.backend.vendor();
        let positions = err.failed_positions(batch.rows.len());

        tracing::error!(
            table = %table,
            sql = %batch.statement.sql,
            rows = batch.rows.len(),
            error = %err,
            "index batch rejected"
        );

        let mut failed_rows = Vec::with_capacity(positions.len());
        for position in positions {
            if let Some(row) = batch.rows.get(position) {
                tracing::error!(
                    table = %table,
                    position,
                    row = %render_row(vendor, row),
                    "rejected index row"
                );
                failed_rows.push((position, row.clone()));
            }
        }

        sink::record(MetricsEvent::BatchFailure {
            table: table.clone(),
        });

        InternalError::batch_failed(BatchFailure {
            table,
            sql: batch.statement.sql,
            total_rows: batch.rows.len(),
            failed_rows,
            cause: err.message,
        })
    }
}

fn to_u64(count: usize) -> u64 {
    u64::try_from(count).unwrap_or(u64::MAX)
}
