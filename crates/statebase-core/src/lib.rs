//! Index maintenance for schemaless record storage: derives index rows from
//! record states and reconciles them with versioned relational index tables.

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod state;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, writers, backends, or helpers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        model::{
            field::{Container, FieldModel, FieldType},
            index::IndexModel,
            schema::Schema,
            structure::StructModel,
        },
        state::State,
        value::{Location, Region, Value},
    };
}
