//! Module: db::index
//! Responsibility: derive index rows from states and reconcile them with
//! the versioned physical index tables.
//! Does not own: transactions, symbol caching, or reading indexes back.
//! Boundary: `IndexWriter` is the entry point; everything else is plumbing.

mod collect;
mod in_row;
mod kind;
mod normalize;
mod reconcile;
mod table;
mod value;


use crate::{config::IndexConfig, db::backend::IndexBackend};

// re-exports
pub use collect::collect_index_values;
pub use in_row::InRowIndex;
pub use kind::IndexKind;
pub use normalize::{epoch_millis, leaf_scalar};
pub use reconcile::{DeleteReport, IndexWriter, InsertReport};
pub use table::{BindOutcome, IndexTable, RowSignature, TableLayout, ValueRule};
pub use value::{IndexValue, PathSegment};

///
/// IndexContext
///
/// Backend capabilities and writer configuration threaded through table
/// resolution and value conversion.
///

#[derive(Clone, Copy)]
pub struct IndexContext<'a> {
    pub backend: &'a dyn IndexBackend,
    pub config: &'a IndexConfig,
}

impl<'a> IndexContext<'a> {
    #[must_use]
    pub const fn new(backend: &'a dyn IndexBackend, config: &'a IndexConfig) -> Self {
        Self { backend, config }
    }

    pub(crate) fn has_table(&self, table: &str) -> bool {
        self.backend.has_table(table)
    }
}
