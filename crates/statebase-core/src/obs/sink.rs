//! Metrics sink boundary.
//!
//! Index maintenance MUST NOT touch obs::metrics directly.
//! All instrumentation flows through MetricsEvent and MetricsSink.
//!
//! This module is the only allowed bridge between index logic
//! and the global metrics state.
use crate::obs::metrics::{self, EventReport};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = const { RefCell::new(None) };
}

///
/// ExecKind
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExecKind {
    Insert,
    Delete,
}

///
/// MetricsEvent
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    ExecStart {
        kind: ExecKind,
        states: u64,
    },
    ExecFinish {
        kind: ExecKind,
        rows_touched: u64,
    },
    RowsWritten {
        table: String,
        rows: u64,
    },
    RowsSkipped {
        blank: u64,
        duplicate: u64,
    },
    InRowTokens {
        tokens: u64,
    },
    RowsDeleted {
        table: String,
        rows: u64,
    },
    BatchFailure {
        table: String,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink that writes into the thread-local metrics state.
/// Acts as the concrete sink when no scoped override is installed.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        match event {
            MetricsEvent::ExecStart { kind, states } => {
                metrics::with_state_mut(|m| match kind {
                    ExecKind::Insert => {
                        m.ops.insert_calls = m.ops.insert_calls.saturating_add(1);
                        m.ops.states_indexed = m.ops.states_indexed.saturating_add(states);
                    }
                    ExecKind::Delete => {
                        m.ops.delete_calls = m.ops.delete_calls.saturating_add(1);
                        m.ops.states_deleted = m.ops.states_deleted.saturating_add(states);
                    }
                });
            }

            MetricsEvent::ExecFinish { kind, rows_touched } => {
                metrics::with_state_mut(|m| match kind {
                    ExecKind::Insert => {
                        m.ops.rows_written = m.ops.rows_written.saturating_add(rows_touched);
                    }
                    ExecKind::Delete => {
                        m.ops.rows_deleted = m.ops.rows_deleted.saturating_add(rows_touched);
                    }
                });
            }

            MetricsEvent::RowsWritten { table, rows } => {
                metrics::with_table_mut(&table, |t| {
                    t.rows_written = t.rows_written.saturating_add(rows);
                    t.batches = t.batches.saturating_add(1);
                });
            }

            MetricsEvent::RowsSkipped { blank, duplicate } => {
                metrics::with_state_mut(|m| {
                    m.ops.blank_rows = m.ops.blank_rows.saturating_add(blank);
                    m.ops.duplicate_rows = m.ops.duplicate_rows.saturating_add(duplicate);
                });
            }

            MetricsEvent::InRowTokens { tokens } => {
                metrics::with_state_mut(|m| {
                    m.ops.in_row_tokens = m.ops.in_row_tokens.saturating_add(tokens);
                });
            }

            MetricsEvent::RowsDeleted { table, rows } => {
                metrics::with_state_mut(|m| {
                    m.ops.delete_statements = m.ops.delete_statements.saturating_add(1);
                });
                metrics::with_table_mut(&table, |t| {
                    t.delete_statements = t.delete_statements.saturating_add(1);
                    t.rows_deleted = t.rows_deleted.saturating_add(rows);
                });
            }

            MetricsEvent::BatchFailure { table } => {
                metrics::with_state_mut(|m| {
                    m.ops.batch_failures = m.ops.batch_failures.saturating_add(1);
                });
                metrics::with_table_mut(&table, |t| {
                    t.batch_failures = t.batch_failures.saturating_add(1);
                });
            }
        }
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
///
/// `window_start_ms` filters by window start (`EventState::since_ms`),
/// not by per-event timestamps.
#[must_use]
pub fn metrics_report(window_start_ms: Option<u64>) -> EventReport {
    metrics::report_window_start(window_start_ms)
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with `sink` receiving every event recorded on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}

/// Span
/// RAII guard that emits start/finish events for one writer call.
/// Ensures finish accounting happens even on early return or unwind.

pub(crate) struct Span {
    kind: ExecKind,
    rows: u64,
}

impl Span {
    #[must_use]
    pub(crate) fn new(kind: ExecKind, states: usize) -> Self {
        record(MetricsEvent::ExecStart {
            kind,
            states: u64::try_from(states).unwrap_or(u64::MAX),
        });

        Self { kind, rows: 0 }
    }

    pub(crate) const fn set_rows(&mut self, rows: u64) {
        self.rows = rows;
    }
}

impl Drop for Span {
    fn drop(&mut self) {
        record(MetricsEvent::ExecFinish {
            kind: self.kind,
            rows_touched: self.rows,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct CapturingSink {
        events: RefCell<Vec<MetricsEvent>>,
    }

    impl MetricsSink for CapturingSink {
        fn record(&self, event: MetricsEvent) {
            self.events.borrow_mut().push(event);
        }
    }

    #[test]
    fn override_captures_and_restores() {
        metrics_reset_all();
        let sink = Rc::new(CapturingSink::default());

        with_metrics_sink(sink.clone(), || {
            let mut span = Span::new(ExecKind::Insert, 2);
            span.set_rows(5);
        });

        assert_eq!(
            *sink.events.borrow(),
            vec![
                MetricsEvent::ExecStart {
                    kind: ExecKind::Insert,
                    states: 2,
                },
                MetricsEvent::ExecFinish {
                    kind: ExecKind::Insert,
                    rows_touched: 5,
                },
            ]
        );

        // Global state saw nothing while the override was installed.
        let report = metrics_report(None);
        let counters = report.counters.expect("counters");
        assert_eq!(counters.ops.insert_calls, 0);

        // And receives events again afterwards.
        record(MetricsEvent::BatchFailure {
            table: "RecordString4".to_string(),
        });
        let counters = metrics_report(None).counters.expect("counters");
        assert_eq!(counters.ops.batch_failures, 1);
        assert_eq!(counters.tables["RecordString4"].batch_failures, 1);
    }

    #[test]
    fn global_sink_aggregates_per_table() {
        metrics_reset_all();

        record(MetricsEvent::RowsWritten {
            table: "RecordNumber3".to_string(),
            rows: 3,
        });
        record(MetricsEvent::RowsDeleted {
            table: "RecordNumber3".to_string(),
            rows: 2,
        });
        record(MetricsEvent::RowsSkipped {
            blank: 1,
            duplicate: 4,
        });

        let counters = metrics_report(None).counters.expect("counters");
        assert_eq!(counters.ops.delete_statements, 1);
        assert_eq!(counters.ops.blank_rows, 1);
        assert_eq!(counters.ops.duplicate_rows, 4);

        let table = &counters.tables["RecordNumber3"];
        assert_eq!(table.rows_written, 3);
        assert_eq!(table.batches, 1);
        assert_eq!(table.rows_deleted, 2);
    }
}
