//! Module: index::kind
//! Responsibility: dispatch indexes to a kind and resolve its table versions.
//! Does not own: table encodings themselves.
//! Boundary: table existence is probed through the backend on every call.

use crate::{
    db::index::{
        IndexContext,
        table::{IndexTable, TableLayout, ValueRule},
    },
    error::InternalError,
    model::{field::FieldType, index::IndexRef},
};
use std::fmt::{self, Display};

const CUSTOM_TABLES: [IndexTable; 1] = [IndexTable::custom(2)];

const LOCATION_TABLES: [IndexTable; 3] = [
    IndexTable::fixed(IndexKind::Location, 1, "RecordLocation", TableLayout::Named),
    IndexTable::fixed(IndexKind::Location, 2, "RecordLocation2", TableLayout::Symbol),
    IndexTable::fixed(IndexKind::Location, 3, "RecordLocation3", TableLayout::TypedSymbol),
];

const REGION_TABLES: [IndexTable; 2] = [
    IndexTable::fixed(IndexKind::Region, 1, "RecordRegion", TableLayout::Symbol),
    IndexTable::fixed(IndexKind::Region, 2, "RecordRegion2", TableLayout::TypedSymbol),
];

const NUMBER_TABLES: [IndexTable; 3] = [
    IndexTable::fixed(IndexKind::Number, 1, "RecordNumber", TableLayout::Named),
    IndexTable::fixed(IndexKind::Number, 2, "RecordNumber2", TableLayout::Symbol),
    IndexTable::fixed(IndexKind::Number, 3, "RecordNumber3", TableLayout::TypedSymbol),
];

const STRING_TABLES: [IndexTable; 4] = [
    IndexTable::fixed(IndexKind::String, 1, "RecordString", TableLayout::Named)
        .with_values(ValueRule::LegacyText),
    IndexTable::fixed(IndexKind::String, 2, "RecordString2", TableLayout::Symbol)
        .with_values(ValueRule::RawBytes),
    IndexTable::fixed(IndexKind::String, 3, "RecordString3", TableLayout::Symbol)
        .with_values(ValueRule::Folded),
    IndexTable::fixed(IndexKind::String, 4, "RecordString4", TableLayout::TypedSymbol)
        .with_values(ValueRule::Folded),
];

const UUID_TABLES: [IndexTable; 3] = [
    IndexTable::fixed(IndexKind::Uuid, 1, "RecordUuid", TableLayout::Named),
    IndexTable::fixed(IndexKind::Uuid, 2, "RecordUuid2", TableLayout::Symbol),
    IndexTable::fixed(IndexKind::Uuid, 3, "RecordUuid3", TableLayout::TypedSymbol),
];

///
/// IndexKind
///
/// Family of physical encodings for one semantic value type. Each kind owns
/// its table versions oldest first.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IndexKind {
    Custom,
    Location,
    Region,
    Number,
    String,
    Uuid,
}

impl IndexKind {
    pub const ALL: [Self; 6] = [
        Self::Custom,
        Self::Location,
        Self::Region,
        Self::Number,
        Self::String,
        Self::Uuid,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Custom => "CUSTOM",
            Self::Location => "LOCATION",
            Self::Region => "REGION",
            Self::Number => "NUMBER",
            Self::String => "STRING",
            Self::Uuid => "UUID",
        }
    }

    /// Kind that stores values of a field item type.
    #[must_use]
    pub const fn by_type(item_type: FieldType) -> Self {
        match item_type {
            FieldType::Date | FieldType::Number => Self::Number,
            FieldType::Location => Self::Location,
            FieldType::Region => Self::Region,
            FieldType::Record | FieldType::Uuid => Self::Uuid,
            FieldType::Any | FieldType::Boolean | FieldType::Text => Self::String,
        }
    }

    /// Kind that stores an index. Multi-field indexes, and indexes whose
    /// leading field names a dedicated table, are custom.
    #[must_use]
    pub fn by_index(index: IndexRef<'_>) -> Self {
        let leading = index.leading_field();
        let dedicated = leading.is_some_and(|field| field.sql.index_table.is_some());

        if index.fields().len() > 1 || dedicated {
            Self::Custom
        } else {
            Self::by_type(index.item_type(0).unwrap_or_default())
        }
    }

    /// Whether the index would be stored in a custom table. Indexes whose
    /// leading field is undeclared never are.
    pub(crate) fn is_custom_declaration(index: IndexRef<'_>) -> bool {
        index.leading_field().is_some_and(|field| {
            index.fields().len() > 1 || field.sql.index_table.is_some()
        })
    }

    #[must_use]
    pub const fn tables(self) -> &'static [IndexTable] {
        match self {
            Self::Custom => &CUSTOM_TABLES,
            Self::Location => &LOCATION_TABLES,
            Self::Region => &REGION_TABLES,
            Self::Number => &NUMBER_TABLES,
            Self::String => &STRING_TABLES,
            Self::Uuid => &UUID_TABLES,
        }
    }

    fn newest(self) -> Result<&'static IndexTable, InternalError> {
        self.tables().last().ok_or_else(|| {
            InternalError::index_invariant(format!("index kind {self} has no tables"))
        })
    }

    /// Table readers should use: the oldest version that exists, or the
    /// newest version when none does.
    pub fn read_table(
        self,
        ctx: IndexContext<'_>,
        index: Option<IndexRef<'_>>,
    ) -> Result<&'static IndexTable, InternalError> {
        for table in self.tables() {
            if ctx.has_table(table.name(index)?) {
                return Ok(table);
            }
        }

        self.newest()
    }

    /// Tables writes must go to: every existing, writable version. When
    /// none qualifies the newest version is used, unless it is read-only.
    pub fn write_tables(
        self,
        ctx: IndexContext<'_>,
        index: Option<IndexRef<'_>>,
    ) -> Result<Vec<&'static IndexTable>, InternalError> {
        let mut tables = Vec::new();
        for table in self.tables() {
            let name = table.name(index)?;
            if !ctx.has_table(name) {
                continue;
            }
            if table.is_read_only(index) {
                tracing::debug!(table = name, kind = %self, "skipping read-only index table");
                continue;
            }

            tables.push(table);
        }

        if tables.is_empty() {
            let newest = self.newest()?;
            let name = newest.name(index)?;

            if newest.is_read_only(index) {
                tracing::warn!(table = name, kind = %self, "no writable index table");
            } else {
                tracing::debug!(
                    table = name,
                    kind = %self,
                    "no index table exists; writing newest version"
                );
                tables.push(newest);
            }
        }

        Ok(tables)
    }
}

impl Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
