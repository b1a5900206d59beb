use crate::model::{
    field::{FieldModel, FieldType},
    structure::StructModel,
};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

///
/// IndexModel
///
/// Declared index over one or more fields of a struct.
/// Keeps index collection decoupled from how the declaration was authored.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IndexModel {
    pub fields: Vec<String>,

    /// Rows are additionally keyed by their per-row suffix.
    #[serde(default)]
    pub dynamic: bool,

    #[serde(default)]
    pub case_sensitive: bool,

    /// Eligible for the in-row encoding on backends that support it.
    #[serde(default)]
    pub short_constant: bool,

    /// Declared value type, used for kind dispatch when the leading field
    /// is not declared on the struct.
    #[serde(default, rename = "type")]
    pub value_type: Option<FieldType>,
}

impl IndexModel {
    #[must_use]
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            dynamic: false,
            case_sensitive: false,
            short_constant: false,
            value_type: None,
        }
    }

    #[must_use]
    pub fn dynamic(mut self) -> Self {
        self.dynamic = true;
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self) -> Self {
        self.case_sensitive = true;
        self
    }

    #[must_use]
    pub fn short_constant(mut self) -> Self {
        self.short_constant = true;
        self
    }

    #[must_use]
    pub fn with_value_type(mut self, value_type: FieldType) -> Self {
        self.value_type = Some(value_type);
        self
    }
}

impl Display for IndexModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.fields.join(", "))
    }
}

///
/// IndexRef
///
/// An index together with the struct that declares it. Field lookups for
/// an index always resolve against its declaring struct.
///

#[derive(Clone, Copy, Debug)]
pub struct IndexRef<'a> {
    pub parent: &'a StructModel,
    pub model: &'a IndexModel,
}

impl<'a> IndexRef<'a> {
    #[must_use]
    pub const fn new(parent: &'a StructModel, model: &'a IndexModel) -> Self {
        Self { parent, model }
    }

    #[must_use]
    pub fn fields(&self) -> &'a [String] {
        &self.model.fields
    }

    /// Declared field at `position`, if the struct declares it.
    #[must_use]
    pub fn field(&self, position: usize) -> Option<&'a FieldModel> {
        self.model
            .fields
            .get(position)
            .and_then(|name| self.parent.field(name))
    }

    #[must_use]
    pub fn leading_field(&self) -> Option<&'a FieldModel> {
        self.field(0)
    }

    /// Declared fields in index order, skipping undeclared names.
    pub fn declared_fields(self) -> impl Iterator<Item = &'a FieldModel> + 'a {
        let parent = self.parent;
        self.model
            .fields
            .iter()
            .filter_map(move |name| parent.field(name))
    }

    /// Item type of the field at `position`, falling back to the index's
    /// declared value type.
    #[must_use]
    pub fn item_type(&self, position: usize) -> Option<FieldType> {
        self.field(position)
            .map(|field| field.item_type)
            .or(self.model.value_type)
    }

    /// Stable name of the index: `[<Type>/]field[,field...]`.
    #[must_use]
    pub fn unique_name(&self) -> String {
        let mut name = String::new();
        if let Some(type_name) = self.parent.type_name() {
            name.push_str(type_name);
            name.push('/');
        }
        name.push_str(&self.model.fields.join(","));

        name
    }
}

impl Display for IndexRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parent.type_name() {
            Some(type_name) => write!(f, "{type_name}{}", self.model),
            None => write!(f, "<environment>{}", self.model),
        }
    }
}
