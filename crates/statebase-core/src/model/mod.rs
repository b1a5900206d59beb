//! Runtime descriptor model.
//!
//! Structs, fields, and indexes are declared once (in code or TOML) and
//! then only read while indexing. The [`schema::Schema`] registry replaces
//! reflective type lookups: the collector and writer resolve everything
//! through it.
//!
//! In general:
//! - declarations define *what is indexed*
//! - `db::index` defines *how it is stored*

pub mod field;
pub mod index;
pub mod schema;
pub mod structure;

#[cfg(test)]
mod tests;
