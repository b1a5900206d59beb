//! Module: db::backend
//! Responsibility: the narrow collaborator surface the index writer consumes.
//! Does not own: connection lifecycles, transactions, or symbol caching.
//! Boundary: implementations live with the storage adapter.

use crate::{
    error::BackendError,
    value::{BindValue, SymbolId},
};
use uuid::Uuid;

///
/// SymbolTable
///
/// Interns strings into stable integer ids. The same string must always map
/// to the same id for the lifetime of the backing store.
///

pub trait SymbolTable {
    fn symbol_id(&self, symbol: &str) -> Result<SymbolId, BackendError>;
}

///
/// SqlVendor
///
/// Dialect-specific rendering. Defaults follow ANSI SQL with OGC geometry
/// constructors for spatial placeholders.
///

pub trait SqlVendor {
    fn append_identifier(&self, out: &mut String, identifier: &str) {
        out.push('"');
        out.push_str(&identifier.replace('"', "\"\""));
        out.push('"');
    }

    /// Placeholder for one location value.
    fn append_bind_location(&self, out: &mut String) {
        out.push_str("ST_GeomFromText(?)");
    }

    /// Placeholder for one region value.
    fn append_bind_region(&self, out: &mut String) {
        out.push_str("ST_GeomFromText(?)");
    }

    fn append_uuid(&self, out: &mut String, id: Uuid) {
        out.push('\'');
        out.push_str(&id.hyphenated().to_string());
        out.push('\'');
    }

    /// Render a value as a literal. Used for delete lists and diagnostics.
    fn append_value(&self, out: &mut String, value: &BindValue) {
        match value {
            BindValue::Null => out.push_str("NULL"),
            BindValue::Bool(v) => out.push_str(if *v { "1" } else { "0" }),
            BindValue::Bytes(bytes) => {
                out.push_str("X'");
                for byte in bytes {
                    out.push_str(&format!("{byte:02X}"));
                }
                out.push('\'');
            }
            BindValue::Float(v) => out.push_str(&v.to_string()),
            BindValue::Int(v) => out.push_str(&v.to_string()),
            BindValue::Symbol(v) => out.push_str(&v.to_string()),
            BindValue::Location(v) => append_quoted(out, &v.to_wkt()),
            BindValue::Region(v) => append_quoted(out, &v.to_wkt()),
            BindValue::Text(v) => append_quoted(out, v),
            BindValue::Uuid(v) => self.append_uuid(out, *v),
        }
    }
}

fn append_quoted(out: &mut String, text: &str) {
    out.push('\'');
    out.push_str(&text.replace('\'', "''"));
    out.push('\'');
}

///
/// AnsiVendor
///

#[derive(Clone, Copy, Debug, Default)]
pub struct AnsiVendor;

impl SqlVendor for AnsiVendor {}

///
/// IndexBackend
///
/// Capabilities of the backing store as seen by the index writer.
///

pub trait IndexBackend {
    fn vendor(&self) -> &dyn SqlVendor;

    fn symbols(&self) -> &dyn SymbolTable;

    fn has_table(&self, table: &str) -> bool;

    fn has_column(&self, table: &str, column: &str) -> bool;

    /// Whether string comparison in the store ignores case.
    fn compares_ignore_case(&self) -> bool {
        false
    }

    /// Whether record rows carry an in-row index column.
    fn has_in_row_index(&self) -> bool {
        false
    }
}

/// Render a bound row as literals, for logs and error messages.
#[must_use]
pub fn render_row(vendor: &dyn SqlVendor, row: &[BindValue]) -> String {
    let mut out = String::from("(");
    for (position, value) in row.iter().enumerate() {
        if position > 0 {
            out.push_str(", ");
        }
        vendor.append_value(&mut out, value);
    }
    out.push(')');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Location;

    #[test]
    fn identifiers_are_double_quoted_and_escaped() {
        let mut out = String::new();
        AnsiVendor.append_identifier(&mut out, "Record\"String");
        assert_eq!(out, "\"Record\"\"String\"");
    }

    #[test]
    fn rows_render_as_literals() {
        let row = [
            BindValue::Uuid(Uuid::from_u128(1)),
            BindValue::Symbol(SymbolId(7)),
            BindValue::Bytes(b"hi".to_vec()),
            BindValue::Text("it's".to_string()),
            BindValue::Location(Location::new(1.0, 2.0)),
            BindValue::Null,
        ];

        assert_eq!(
            render_row(&AnsiVendor, &row),
            "('00000000-0000-0000-0000-000000000001', 7, X'6869', 'it''s', 'POINT(1 2)', NULL)"
        );
    }
}
