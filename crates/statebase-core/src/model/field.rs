use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// FieldType
///
/// Semantic item type of a field. Container fields carry the type of their
/// items here and the container shape separately.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Any,
    Boolean,
    Date,
    Location,
    Number,
    Record,
    Region,
    #[default]
    Text,
    Uuid,
}

impl FieldType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Location => "location",
            Self::Number => "number",
            Self::Record => "record",
            Self::Region => "region",
            Self::Text => "text",
            Self::Uuid => "uuid",
        }
    }

    /// Types whose values are bound as-is rather than through text.
    #[must_use]
    pub const fn is_pass_through(self) -> bool {
        matches!(
            self,
            Self::Date | Self::Number | Self::Location | Self::Region
        )
    }
}

impl Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

///
/// Container
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    List,
    Map,
    Set,
}

impl Container {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Map => "map",
            Self::Set => "set",
        }
    }
}

///
/// FieldSqlOptions
///
/// Per-field overrides that steer how indexes over the field map onto
/// physical tables.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldSqlOptions {
    /// Dedicated table for indexes led by this field.
    pub index_table: Option<String>,
    /// Explicit value column name in the dedicated table.
    pub index_table_column_name: Option<String>,
    /// Value columns mirror the logical field names.
    pub index_table_same_column_names: bool,
    /// The dedicated table is readable but must not be written.
    pub index_table_read_only: bool,
}

///
/// FieldModel
/// Runtime field metadata consumed by index collection and table mapping.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FieldModel {
    pub name: String,

    #[serde(rename = "type", default)]
    pub item_type: FieldType,

    #[serde(default)]
    pub container: Option<Container>,

    #[serde(default)]
    pub embedded: bool,

    #[serde(default)]
    pub sql: FieldSqlOptions,
}

impl FieldModel {
    #[must_use]
    pub fn new(name: impl Into<String>, item_type: FieldType) -> Self {
        Self {
            name: name.into(),
            item_type,
            container: None,
            embedded: false,
            sql: FieldSqlOptions::default(),
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Text)
    }

    #[must_use]
    pub fn in_container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    #[must_use]
    pub fn with_index_table(mut self, table: impl Into<String>) -> Self {
        self.sql.index_table = Some(table.into());
        self
    }

    #[must_use]
    pub fn with_index_column(mut self, column: impl Into<String>) -> Self {
        self.sql.index_table_column_name = Some(column.into());
        self
    }

    #[must_use]
    pub fn with_same_column_names(mut self) -> Self {
        self.sql.index_table_same_column_names = true;
        self
    }

    #[must_use]
    pub fn read_only_index_table(mut self) -> Self {
        self.sql.index_table_read_only = true;
        self
    }

    /// Full internal type, e.g. `text` or `list/text`.
    #[must_use]
    pub fn internal_type(&self) -> String {
        match self.container {
            Some(container) => format!("{}/{}", container.as_str(), self.item_type),
            None => self.item_type.to_string(),
        }
    }
}
