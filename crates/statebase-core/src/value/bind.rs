use crate::value::{Location, Region};
use derive_more::{Deref, Display};
use std::hash::{Hash, Hasher};
use uuid::Uuid;

///
/// SymbolId
///
/// Stable integer id assigned to a string by the external symbol table.
///

#[derive(Clone, Copy, Debug, Deref, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct SymbolId(pub i32);

///
/// BindValue
///
/// One storage-ready parameter bound into an index-table statement.
/// Equality and hashing treat floats bitwise so bound rows can be used as
/// dedup signatures.
///

#[derive(Clone, Debug)]
pub enum BindValue {
    Null,
    Bool(bool),
    Bytes(Vec<u8>),
    Float(f64),
    Int(i64),
    Location(Location),
    Region(Region),
    Symbol(SymbolId),
    Text(String),
    Uuid(Uuid),
}

impl BindValue {
    /// Blank values are never written: null, whitespace-only text, empty
    /// bytes, and empty regions.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Bytes(bytes) => bytes.is_empty(),
            Self::Region(region) => region.is_empty(),
            Self::Bool(_)
            | Self::Float(_)
            | Self::Int(_)
            | Self::Location(_)
            | Self::Symbol(_)
            | Self::Uuid(_) => false,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    const fn tag(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Bytes(_) => 2,
            Self::Float(_) => 3,
            Self::Int(_) => 4,
            Self::Location(_) => 5,
            Self::Region(_) => 6,
            Self::Symbol(_) => 7,
            Self::Text(_) => 8,
            Self::Uuid(_) => 9,
        }
    }
}

impl PartialEq for BindValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Location(a), Self::Location(b)) => a == b,
            (Self::Region(a), Self::Region(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Uuid(a), Self::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for BindValue {}

impl Hash for BindValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Self::Null => {}
            Self::Bool(v) => v.hash(state),
            Self::Bytes(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
            Self::Int(v) => v.hash(state),
            Self::Location(v) => v.hash(state),
            Self::Region(v) => v.hash(state),
            Self::Symbol(v) => v.hash(state),
            Self::Text(v) => v.hash(state),
            Self::Uuid(v) => v.hash(state),
        }
    }
}

impl From<Option<Uuid>> for BindValue {
    fn from(value: Option<Uuid>) -> Self {
        value.map_or(Self::Null, Self::Uuid)
    }
}

impl From<SymbolId> for BindValue {
    fn from(value: SymbolId) -> Self {
        Self::Symbol(value)
    }
}
