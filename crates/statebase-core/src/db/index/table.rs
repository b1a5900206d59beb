//! Module: index::table
//! Responsibility: one versioned physical encoding of an index kind.
//! Does not own: deciding which versions to read or write.
//! Boundary: statements and bound rows are produced here and executed by the writer.

use crate::{
    db::{
        connection::{DeleteStatement, InsertStatement},
        index::{
            IndexContext,
            kind::IndexKind,
            normalize::{TextRule, normalize_default, truncate_bytes, truncate_text},
            value::IndexValue,
        },
    },
    error::InternalError,
    model::index::IndexRef,
    value::{BindValue, IndexScalar},
};
use std::collections::HashSet;
use uuid::Uuid;

const ID_FIELD: &str = "id";
const RECORD_ID_FIELD: &str = "recordId";
const TYPE_ID_FIELD: &str = "typeId";
const SYMBOL_ID_FIELD: &str = "symbolId";
const NAME_FIELD: &str = "name";
const VALUE_FIELD: &str = "value";

///
/// TableLayout
///
/// Column shape of a physical table.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TableLayout {
    /// Named per index via a field annotation; `typeId` only when the column exists.
    Custom,
    /// `recordId`, textual `name` key.
    Named,
    /// `id`, interned `symbolId` key.
    Symbol,
    /// `id`, `typeId`, interned `symbolId` key.
    TypedSymbol,
}

///
/// ValueRule
///
/// How index scalars are converted before binding.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValueRule {
    Default,
    /// Untrimmed text cut to the legacy budget.
    LegacyText,
    /// Untrimmed UTF-8 bytes cut to the string budget.
    RawBytes,
    /// Trimmed bytes, lower-cased for case-insensitive indexes regardless of
    /// how the backend compares strings.
    Folded,
}

///
/// BindOutcome
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BindOutcome {
    pub bound: usize,
    pub blank: usize,
    pub duplicate: usize,
}

///
/// RowSignature
///
/// Identity of a bound row for deduplication within one table: record id,
/// index key, and every converted value.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RowSignature {
    id: Uuid,
    key: BindValue,
    values: Vec<BindValue>,
}

///
/// IndexTable
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexTable {
    kind: IndexKind,
    version: u32,
    name: Option<&'static str>,
    layout: TableLayout,
    values: ValueRule,
}

impl IndexTable {
    pub(crate) const fn custom(version: u32) -> Self {
        Self {
            kind: IndexKind::Custom,
            version,
            name: None,
            layout: TableLayout::Custom,
            values: ValueRule::Default,
        }
    }

    pub(crate) const fn fixed(
        kind: IndexKind,
        version: u32,
        name: &'static str,
        layout: TableLayout,
    ) -> Self {
        Self {
            kind,
            version,
            name: Some(name),
            layout,
            values: ValueRule::Default,
        }
    }

    pub(crate) const fn with_values(mut self, values: ValueRule) -> Self {
        self.values = values;
        self
    }

    #[must_use]
    pub const fn kind(&self) -> IndexKind {
        self.kind
    }

    #[must_use]
    pub const fn version(&self) -> u32 {
        self.version
    }

    #[must_use]
    pub const fn layout(&self) -> TableLayout {
        self.layout
    }

    #[must_use]
    pub const fn value_rule(&self) -> ValueRule {
        self.values
    }

    /// Physical table name.
    ///
    /// Custom tables are named by the `index_table` option of the index's
    /// leading field; an index without one cannot be stored.
    pub fn name<'a>(&self, index: Option<IndexRef<'a>>) -> Result<&'a str, InternalError> {
        if let Some(name) = self.name {
            return Ok(name);
        }

        let Some(index) = index else {
            return Err(InternalError::index_invariant(
                "custom index table resolved without an index",
            ));
        };

        index
            .leading_field()
            .and_then(|field| field.sql.index_table.as_deref())
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                InternalError::index_misconfigured(format!(
                    "{index} needs an index_table option on its leading field"
                ))
            })
    }

    #[must_use]
    pub const fn id_field(&self) -> &'static str {
        match self.layout {
            TableLayout::Named => RECORD_ID_FIELD,
            TableLayout::Custom | TableLayout::Symbol | TableLayout::TypedSymbol => ID_FIELD,
        }
    }

    /// Type id column, if this table has one.
    pub fn type_id_field(
        &self,
        ctx: IndexContext<'_>,
        index: Option<IndexRef<'_>>,
    ) -> Result<Option<&'static str>, InternalError> {
        let field = match self.layout {
            TableLayout::TypedSymbol => Some(TYPE_ID_FIELD),
            TableLayout::Named | TableLayout::Symbol => None,
            TableLayout::Custom => {
                let name = self.name(index)?;
                ctx.backend
                    .has_column(name, TYPE_ID_FIELD)
                    .then_some(TYPE_ID_FIELD)
            }
        };

        Ok(field)
    }

    #[must_use]
    pub const fn key_field(&self) -> &'static str {
        match self.layout {
            TableLayout::Named => NAME_FIELD,
            TableLayout::Custom | TableLayout::Symbol | TableLayout::TypedSymbol => {
                SYMBOL_ID_FIELD
            }
        }
    }

    /// Value column for the index field at `position`.
    ///
    /// The first declared field that opts into same-name columns or names a
    /// column decides for the whole index; otherwise columns are `value`,
    /// `value2`, `value3`, ...
    #[must_use]
    pub fn value_field(&self, index: Option<IndexRef<'_>>, position: usize) -> String {
        if let Some(index) = index {
            for field in index.declared_fields() {
                if field.sql.index_table_same_column_names {
                    let logical = index.fields().get(position).map_or("", String::as_str);
                    let column = logical.rsplit('.').next().unwrap_or(logical);
                    return column.to_string();
                }
                if let Some(column) = &field.sql.index_table_column_name {
                    return column.clone();
                }
            }
        }

        if position > 0 {
            format!("{VALUE_FIELD}{}", position + 1)
        } else {
            VALUE_FIELD.to_string()
        }
    }

    /// Read-only tables are never written, only read.
    #[must_use]
    pub fn is_read_only(&self, index: Option<IndexRef<'_>>) -> bool {
        if self.layout != TableLayout::Custom {
            return false;
        }

        index
            .and_then(|index| index.declared_fields().next())
            .is_some_and(|field| field.sql.index_table_read_only)
    }

    /// Storage key for an index unique name.
    pub fn convert_key(&self, ctx: IndexContext<'_>, key: &str) -> Result<BindValue, InternalError> {
        match self.layout {
            TableLayout::Named => Ok(BindValue::Text(key.to_string())),
            TableLayout::Custom | TableLayout::Symbol | TableLayout::TypedSymbol => {
                Ok(BindValue::Symbol(ctx.backend.symbols().symbol_id(key)?))
            }
        }
    }

    /// Storage value for the scalar at index field `position`.
    #[must_use]
    pub fn convert_value(
        &self,
        ctx: IndexContext<'_>,
        index: IndexRef<'_>,
        position: usize,
        scalar: &IndexScalar,
    ) -> BindValue {
        let config = ctx.config;
        let case_insensitive = !index.model.case_sensitive;

        match self.values {
            ValueRule::Default => normalize_default(
                scalar,
                index.item_type(position),
                TextRule {
                    fold_case: case_insensitive && ctx.backend.compares_ignore_case(),
                    budget: config.string_byte_budget,
                    mode: config.truncation,
                },
            ),
            ValueRule::LegacyText => BindValue::Text(truncate_text(
                &scalar.to_string(),
                config.legacy_string_byte_budget,
            )),
            ValueRule::RawBytes => BindValue::Bytes(truncate_bytes(
                &scalar.to_string(),
                config.string_byte_budget,
                config.truncation,
            )),
            ValueRule::Folded => TextRule {
                fold_case: case_insensitive,
                budget: config.string_byte_budget,
                mode: config.truncation,
            }
            .apply(&scalar.to_string()),
        }
    }

    /// Parameterized insert naming the id, optional type id, key, and one
    /// column per index field.
    pub fn prepare_insert(
        &self,
        ctx: IndexContext<'_>,
        index: IndexRef<'_>,
    ) -> Result<InsertStatement, InternalError> {
        let vendor = ctx.backend.vendor();
        let name = self.name(Some(index))?;
        let type_id_field = self.type_id_field(ctx, Some(index))?;

        let mut columns = vec![self.id_field().to_string()];
        if let Some(field) = type_id_field {
            columns.push(field.to_string());
        }
        columns.push(self.key_field().to_string());
        columns.extend((0..index.fields().len()).map(|position| self.value_field(Some(index), position)));

        let mut sql = String::from("INSERT INTO ");
        vendor.append_identifier(&mut sql, name);
        sql.push_str(" (");
        for (position, column) in columns.iter().enumerate() {
            if position > 0 {
                sql.push(',');
            }
            vendor.append_identifier(&mut sql, column);
        }
        sql.push_str(") VALUES (?, ?, ");
        if type_id_field.is_some() {
            sql.push_str("?, ");
        }
        for position in 0..index.fields().len() {
            if position > 0 {
                sql.push_str(", ");
            }
            match self.kind {
                IndexKind::Location => vendor.append_bind_location(&mut sql),
                IndexKind::Region => vendor.append_bind_region(&mut sql),
                _ => sql.push('?'),
            }
        }
        sql.push(')');

        Ok(InsertStatement {
            table: name.to_string(),
            sql,
            columns,
        })
    }

    /// Append one parameter row per unseen `(id, key, values)` combination.
    ///
    /// Every row is written under the index's default key. Dynamic indexes
    /// also write rows with a non-empty suffix under a second key that
    /// carries the suffix, unless it interns to the default key. Rows with
    /// any blank converted value are skipped.
    pub fn bind_insert_values(
        &self,
        ctx: IndexContext<'_>,
        index_value: &IndexValue<'_>,
        id: Uuid,
        type_id: Option<Uuid>,
        seen: &mut HashSet<RowSignature>,
        rows: &mut Vec<Vec<BindValue>>,
    ) -> Result<BindOutcome, InternalError> {
        let index = index_value.index();
        let default_key = self.convert_key(ctx, &index_value.unique_name(None))?;
        let typed = self.type_id_field(ctx, Some(index))?.is_some();
        let mut outcome = BindOutcome::default();

        for (suffix, scalars) in index_value.rows() {
            let dynamic_key = if index.model.dynamic && !suffix.is_empty() {
                let key = self.convert_key(ctx, &index_value.unique_name(Some(suffix)))?;
                (key != default_key).then_some(key)
            } else {
                None
            };

            let values: Vec<BindValue> = scalars
                .iter()
                .enumerate()
                .map(|(position, scalar)| self.convert_value(ctx, index, position, scalar))
                .collect();

            let keys = std::iter::once(&default_key).chain(dynamic_key.as_ref());
            if values.iter().any(BindValue::is_blank) {
                outcome.blank += keys.count();
                continue;
            }

            for key in keys {
                let signature = RowSignature {
                    id,
                    key: key.clone(),
                    values: values.clone(),
                };
                if !seen.insert(signature) {
                    outcome.duplicate += 1;
                    continue;
                }

                let mut row = Vec::with_capacity(values.len() + 3);
                row.push(BindValue::Uuid(id));
                if typed {
                    row.push(BindValue::from(type_id));
                }
                row.push(key.clone());
                row.extend(values.iter().cloned());

                rows.push(row);
                outcome.bound += 1;
            }
        }

        Ok(outcome)
    }

    /// `DELETE FROM <table> WHERE <id> IN (...)` over `ids`.
    pub fn prepare_delete(
        &self,
        ctx: IndexContext<'_>,
        index: Option<IndexRef<'_>>,
        ids: &[Uuid],
    ) -> Result<DeleteStatement, InternalError> {
        let vendor = ctx.backend.vendor();
        let name = self.name(index)?;
        let id_field = self.id_field();

        let mut sql = String::from("DELETE FROM ");
        vendor.append_identifier(&mut sql, name);
        sql.push_str(" WHERE ");
        vendor.append_identifier(&mut sql, id_field);
        sql.push_str(" IN (");
        for (position, id) in ids.iter().enumerate() {
            if position > 0 {
                sql.push(',');
            }
            vendor.append_uuid(&mut sql, *id);
        }
        sql.push(')');

        Ok(DeleteStatement {
            table: name.to_string(),
            sql,
            id_column: id_field.to_string(),
            ids: ids.to_vec(),
        })
    }
}
