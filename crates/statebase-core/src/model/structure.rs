use crate::model::{
    field::FieldModel,
    index::{IndexModel, IndexRef},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

///
/// StructModel
///
/// A record type, or the global environment when `type_id` is `None`.
/// Environment indexes apply to every record regardless of type.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StructModel {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub type_id: Option<Uuid>,

    /// Instances only ever live inside another record.
    #[serde(default)]
    pub embedded: bool,

    #[serde(default)]
    pub fields: Vec<FieldModel>,

    #[serde(default)]
    pub indexes: Vec<IndexModel>,
}

impl StructModel {
    /// Empty global environment.
    #[must_use]
    pub const fn environment() -> Self {
        Self {
            name: String::new(),
            type_id: None,
            embedded: false,
            fields: Vec::new(),
            indexes: Vec::new(),
        }
    }

    #[must_use]
    pub fn record_type(name: impl Into<String>, type_id: Uuid) -> Self {
        Self {
            name: name.into(),
            type_id: Some(type_id),
            ..Self::environment()
        }
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldModel) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: IndexModel) -> Self {
        self.indexes.push(index);
        self
    }

    #[must_use]
    pub const fn is_environment(&self) -> bool {
        self.type_id.is_none()
    }

    /// Name used to qualify field and index names; `None` for the environment.
    #[must_use]
    pub fn type_name(&self) -> Option<&str> {
        if self.is_environment() {
            None
        } else {
            Some(&self.name)
        }
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn indexes(&self) -> impl Iterator<Item = IndexRef<'_>> {
        self.indexes.iter().map(move |index| IndexRef::new(self, index))
    }

    /// Stable name of a field declared on this struct.
    #[must_use]
    pub fn field_unique_name(&self, field: &FieldModel) -> String {
        match self.type_name() {
            Some(type_name) => format!("{type_name}/{}", field.name),
            None => field.name.clone(),
        }
    }
}
