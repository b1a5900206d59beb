use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    model::structure::StructModel,
    state::State,
};
use serde::Deserialize;
use std::{
    collections::{BTreeSet, HashMap},
    fs,
    path::Path,
};
use uuid::Uuid;

///
/// Schema
///
/// Pre-built descriptor registry: the global environment plus every record
/// type, addressable by type id. Built once and shared by reference with the
/// collector and the writer.
///

#[derive(Clone, Debug, Default)]
pub struct Schema {
    environment: StructModel,
    types: Vec<StructModel>,
    by_id: HashMap<Uuid, usize>,
}

impl Schema {
    /// Build and validate a schema.
    pub fn new(environment: StructModel, types: Vec<StructModel>) -> Result<Self, InternalError> {
        if !environment.is_environment() {
            return Err(InternalError::schema_misconfigured(format!(
                "environment struct '{}' must not carry a type id",
                environment.name
            )));
        }

        validate_struct(&environment)?;

        let mut by_id = HashMap::with_capacity(types.len());
        for (position, ty) in types.iter().enumerate() {
            let Some(type_id) = ty.type_id else {
                return Err(InternalError::schema_misconfigured(format!(
                    "type '{}' is missing a type id",
                    ty.name
                )));
            };
            if ty.name.is_empty() {
                return Err(InternalError::schema_misconfigured(format!(
                    "type {type_id} has an empty name"
                )));
            }
            if by_id.insert(type_id, position).is_some() {
                return Err(InternalError::schema_misconfigured(format!(
                    "type id {type_id} is declared more than once"
                )));
            }

            validate_struct(ty)?;
        }

        Ok(Self {
            environment,
            types,
            by_id,
        })
    }

    /// Parse a schema from TOML:
    ///
    /// ```toml
    /// [environment]
    /// fields = [{ name = "tags", type = "text", container = "list" }]
    ///
    /// [[types]]
    /// name = "Article"
    /// type_id = "…"
    /// fields = [{ name = "title" }]
    /// indexes = [{ fields = ["title"] }]
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, InternalError> {
        let def: SchemaDef = toml::from_str(source).map_err(|err| {
            InternalError::new(
                ErrorClass::Misconfigured,
                ErrorOrigin::Schema,
                format!("invalid schema: {err}"),
            )
        })?;

        Self::new(def.environment, def.types)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, InternalError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|err| {
            InternalError::new(
                ErrorClass::Misconfigured,
                ErrorOrigin::Schema,
                format!("cannot read schema '{}': {err}", path.display()),
            )
        })?;

        Self::from_toml_str(&source)
    }

    #[must_use]
    pub const fn environment(&self) -> &StructModel {
        &self.environment
    }

    pub fn types(&self) -> impl Iterator<Item = &StructModel> {
        self.types.iter()
    }

    #[must_use]
    pub fn type_by_id(&self, type_id: Uuid) -> Option<&StructModel> {
        self.by_id.get(&type_id).map(|&position| &self.types[position])
    }

    /// Record type of `state`, if it has one this schema knows.
    #[must_use]
    pub fn type_of(&self, state: &State) -> Option<&StructModel> {
        state.type_id.and_then(|type_id| self.type_by_id(type_id))
    }
}

///
/// SchemaDef
/// Serialized schema shape, validated into [`Schema`].
///

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDef {
    #[serde(default)]
    environment: StructModel,
    #[serde(default)]
    types: Vec<StructModel>,
}

fn validate_struct(model: &StructModel) -> Result<(), InternalError> {
    let label = model.type_name().unwrap_or("<environment>");

    let mut names = BTreeSet::new();
    for field in &model.fields {
        if field.name.is_empty() {
            return Err(InternalError::schema_misconfigured(format!(
                "{label} declares a field with an empty name"
            )));
        }
        if !names.insert(field.name.as_str()) {
            return Err(InternalError::schema_misconfigured(format!(
                "{label} declares field '{}' more than once",
                field.name
            )));
        }
    }

    for index in &model.indexes {
        if index.fields.is_empty() {
            return Err(InternalError::schema_misconfigured(format!(
                "{label} declares an index without fields"
            )));
        }
        if index.fields.iter().any(String::is_empty) {
            return Err(InternalError::schema_misconfigured(format!(
                "{label} index {index} names an empty field"
            )));
        }
    }

    Ok(())
}
