//! Module: db
//! Responsibility: everything that touches the relational backing store.
//! Does not own: schema metadata or runtime value shapes.
//! Boundary: the backend and connection ports are implemented by callers.

pub mod backend;
pub mod connection;
pub mod index;

// re-exports
pub use backend::{AnsiVendor, IndexBackend, SqlVendor, SymbolTable, render_row};
pub use connection::{
    BatchError, DeleteStatement, IndexConnection, InsertStatement, UpdateCount,
};
pub use index::{
    DeleteReport, InRowIndex, IndexContext, IndexKind, IndexTable, IndexValue, IndexWriter,
    InsertReport, PathSegment, collect_index_values,
};
