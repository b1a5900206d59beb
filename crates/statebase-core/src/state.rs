use crate::value::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

///
/// State
///
/// One record instance as handed to the index writer: its id, the id of its
/// type (if it has one), and its field values keyed by field name.
///

#[derive(Clone, Debug, PartialEq)]
pub struct State {
    pub id: Uuid,
    pub type_id: Option<Uuid>,
    pub values: BTreeMap<String, Value>,
}

impl State {
    #[must_use]
    pub const fn new(id: Uuid) -> Self {
        Self {
            id,
            type_id: None,
            values: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_type(mut self, type_id: Uuid) -> Self {
        self.type_id = Some(type_id);
        self
    }

    #[must_use]
    pub fn with_value(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(field.into(), value.into());
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(field.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}
