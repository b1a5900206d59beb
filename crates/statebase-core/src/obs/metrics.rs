use serde::Serialize;
use std::{cell::RefCell, collections::BTreeMap};
use time::OffsetDateTime;

///
/// EventState
/// Ephemeral, in-memory counters for index maintenance.
///

#[derive(Clone, Debug, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub tables: BTreeMap<String, TableCounters>,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            tables: BTreeMap::new(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventOps {
    // Entrypoints
    pub insert_calls: u64,
    pub delete_calls: u64,

    // States handled
    pub states_indexed: u64,
    pub states_deleted: u64,

    // Insert path
    pub rows_written: u64,
    pub blank_rows: u64,
    pub duplicate_rows: u64,
    pub in_row_tokens: u64,
    pub batch_failures: u64,

    // Delete path
    pub delete_statements: u64,
    pub rows_deleted: u64,
}

///
/// TableCounters
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct TableCounters {
    pub rows_written: u64,
    pub batches: u64,
    pub batch_failures: u64,
    pub delete_statements: u64,
    pub rows_deleted: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    u64::try_from(millis).unwrap_or_default()
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Borrow the counters of one table, creating them on first use.
pub(crate) fn with_table_mut<R>(table: &str, f: impl FnOnce(&mut TableCounters) -> R) -> R {
    with_state_mut(|m| f(m.tables.entry(table.to_string()).or_default()))
}

/// Reset all counters and restart the window.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

///
/// EventReport
/// Counter snapshot plus per-table summaries.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct EventReport {
    /// Counters since `since_ms`; absent when the window is older than requested.
    pub counters: Option<EventState>,
    pub table_counters: Vec<TableSummary>,
}

///
/// TableSummary
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct TableSummary {
    pub table: String,
    pub rows_written: u64,
    pub batches: u64,
    pub avg_rows_per_batch: f64,
    pub batch_failures: u64,
    pub delete_statements: u64,
    pub rows_deleted: u64,
}

/// Build a report from in-memory counters. Tables are ordered by rows
/// written (descending), then name.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);

    let mut table_counters: Vec<TableSummary> = snap
        .tables
        .iter()
        .map(|(table, counters)| TableSummary {
            table: table.clone(),
            rows_written: counters.rows_written,
            batches: counters.batches,
            avg_rows_per_batch: if counters.batches > 0 {
                counters.rows_written as f64 / counters.batches as f64
            } else {
                0.0
            },
            batch_failures: counters.batch_failures,
            delete_statements: counters.delete_statements,
            rows_deleted: counters.rows_deleted,
        })
        .collect();

    table_counters.sort_by(|a, b| {
        b.rows_written
            .cmp(&a.rows_written)
            .then_with(|| a.table.cmp(&b.table))
    });

    EventReport {
        counters: Some(snap),
        table_counters,
    }
}

/// Report only if the current window started at or after `window_start_ms`.
#[must_use]
pub(crate) fn report_window_start(window_start_ms: Option<u64>) -> EventReport {
    let since_ms = with_state(|m| m.since_ms);
    match window_start_ms {
        Some(start) if since_ms < start => EventReport::default(),
        _ => report(),
    }
}

///
/// TESTS
///
