use crate::value::{Location, Region};
use std::fmt::{self, Display};
use uuid::Uuid;

///
/// IndexScalar
///
/// One flattened leaf collected from a field value. Dates have already been
/// reduced to epoch milliseconds, enums to their names, and characters and
/// URIs to text, so only storage-shaped variants remain.
///

#[derive(Clone, Debug, PartialEq)]
pub enum IndexScalar {
    Bool(bool),
    Float(f64),
    Int(i64),
    Location(Location),
    Region(Region),
    Text(String),
    Uuid(Uuid),
}

impl IndexScalar {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl Display for IndexScalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Location(v) => write!(f, "{v}"),
            Self::Region(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{}", v.hyphenated()),
        }
    }
}

impl From<&str> for IndexScalar {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for IndexScalar {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Uuid> for IndexScalar {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}
