mod bind;
mod geo;
mod scalar;

#[cfg(test)]
mod tests;

use crate::state::State;
use std::collections::BTreeMap;
use time::OffsetDateTime;
use uuid::Uuid;

// re-exports
pub use bind::{BindValue, SymbolId};
pub use geo::{Location, Region};
pub use scalar::IndexScalar;

///
/// Value
///
/// Runtime value held by one field of a [`State`]. Values nest freely:
/// sequences and maps hold further values, and records hold whole states
/// (either references to other records or embedded sub-records).
///

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Date(OffsetDateTime),
    /// Symbolic name of an enumeration constant.
    Enum(String),
    Float(f64),
    Int(i64),
    List(Vec<Self>),
    Location(Location),
    Map(BTreeMap<String, Self>),
    Record(Box<State>),
    Region(Region),
    Text(String),
    Uri(String),
    Uuid(Uuid),
}

impl Value {
    /// Build an enum value from its symbolic name.
    #[must_use]
    pub fn enum_name(name: impl Into<String>) -> Self {
        Self::Enum(name.into())
    }

    /// Build a URI/URL value.
    #[must_use]
    pub fn uri(uri: impl Into<String>) -> Self {
        Self::Uri(uri.into())
    }

    /// Build a map value from key/value pairs.
    #[must_use]
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Self>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value from anything convertible to values.
    #[must_use]
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Self>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Value {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Uuid> for Value {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Self::Date(value)
    }
}

impl From<Location> for Value {
    fn from(value: Location) -> Self {
        Self::Location(value)
    }
}

impl From<Region> for Value {
    fn from(value: Region) -> Self {
        Self::Region(value)
    }
}

impl From<State> for Value {
    fn from(value: State) -> Self {
        Self::Record(Box::new(value))
    }
}

impl<V: Into<Self>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Self::list(value)
    }
}

impl<V: Into<Self>> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
