//! Observability: runtime telemetry (metrics) and sink abstractions.
//!
//! Index maintenance reports through `MetricsEvent`; nothing here inspects
//! the backing store.

pub(crate) mod metrics;
pub(crate) mod sink;

// re-exports
pub use metrics::{EventOps, EventReport, EventState, TableCounters, TableSummary};
pub use sink::{
    ExecKind, MetricsEvent, MetricsSink, metrics_report, metrics_reset_all, with_metrics_sink,
};
