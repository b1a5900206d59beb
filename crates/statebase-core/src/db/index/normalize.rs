//! Module: index::normalize
//! Responsibility: reduce runtime values to storage-ready primitives.
//! Does not own: choosing which rule applies to which table.
//! Boundary: pure functions; no backend access.

use crate::{
    config::TruncationMode,
    model::field::FieldType,
    value::{BindValue, IndexScalar, Value},
};
use time::OffsetDateTime;

const NANOS_PER_MILLI: i128 = 1_000_000;

/// Reduce a leaf value to its indexable scalar.
///
/// Returns `None` for null and for values that are not leaves
/// (sequences, maps, records); the collector handles those itself.
#[must_use]
pub fn leaf_scalar(value: &Value) -> Option<IndexScalar> {
    let scalar = match value {
        Value::Bool(v) => IndexScalar::Bool(*v),
        Value::Char(v) => IndexScalar::Text(v.to_string()),
        Value::Date(v) => IndexScalar::Int(epoch_millis(*v)),
        Value::Enum(name) => IndexScalar::Text(name.clone()),
        Value::Float(v) => IndexScalar::Float(*v),
        Value::Int(v) => IndexScalar::Int(*v),
        Value::Location(v) => IndexScalar::Location(*v),
        Value::Region(v) => IndexScalar::Region(v.clone()),
        Value::Text(v) | Value::Uri(v) => IndexScalar::Text(v.clone()),
        Value::Uuid(v) => IndexScalar::Uuid(*v),
        Value::Null | Value::List(_) | Value::Map(_) | Value::Record(_) => return None,
    };

    Some(scalar)
}

/// Milliseconds since the Unix epoch, saturating outside the `i64` range.
#[must_use]
pub fn epoch_millis(date: OffsetDateTime) -> i64 {
    let millis = date.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI);
    i64::try_from(millis).unwrap_or(if millis < 0 { i64::MIN } else { i64::MAX })
}

/// Trim, and lower-case when `fold` is set.
#[must_use]
pub fn fold_text(text: &str, fold: bool) -> String {
    let trimmed = text.trim();
    if fold {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// UTF-8 encode `text`, cutting it to at most `budget` bytes.
#[must_use]
pub fn truncate_bytes(text: &str, budget: usize, mode: TruncationMode) -> Vec<u8> {
    let bytes = text.as_bytes();
    if bytes.len() <= budget {
        return bytes.to_vec();
    }

    match mode {
        TruncationMode::Bytes => bytes[..budget].to_vec(),
        TruncationMode::CharBoundary => text[..floor_char_boundary(text, budget)].as_bytes().to_vec(),
    }
}

/// Cut `text` to at most `budget` bytes without splitting a character.
#[must_use]
pub fn truncate_text(text: &str, budget: usize) -> String {
    if text.len() <= budget {
        return text.to_string();
    }

    text[..floor_char_boundary(text, budget)].to_string()
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }

    index
}

/// Bind a scalar unchanged.
#[must_use]
pub fn pass_through(scalar: &IndexScalar) -> BindValue {
    match scalar {
        IndexScalar::Bool(v) => BindValue::Bool(*v),
        IndexScalar::Float(v) => BindValue::Float(*v),
        IndexScalar::Int(v) => BindValue::Int(*v),
        IndexScalar::Location(v) => BindValue::Location(*v),
        IndexScalar::Region(v) => BindValue::Region(v.clone()),
        IndexScalar::Text(v) => BindValue::Text(v.clone()),
        IndexScalar::Uuid(v) => BindValue::Uuid(*v),
    }
}

///
/// TextRule
///
/// Parameters for turning a text scalar into stored bytes.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextRule {
    pub fold_case: bool,
    pub budget: usize,
    pub mode: TruncationMode,
}

impl TextRule {
    #[must_use]
    pub fn apply(&self, text: &str) -> BindValue {
        let folded = fold_text(text, self.fold_case);
        BindValue::Bytes(truncate_bytes(&folded, self.budget, self.mode))
    }
}

/// Normalization shared by every table without its own value rule.
///
/// Numeric, date, and geo fields pass through; uuids pass through; text is
/// folded and byte-truncated; anything else binds as its textual form.
#[must_use]
pub fn normalize_default(
    scalar: &IndexScalar,
    item_type: Option<FieldType>,
    text: TextRule,
) -> BindValue {
    if item_type.is_some_and(FieldType::is_pass_through) {
        return pass_through(scalar);
    }

    match scalar {
        IndexScalar::Uuid(id) => BindValue::Uuid(*id),
        IndexScalar::Text(value) => text.apply(value),
        other => BindValue::Text(other.to_string()),
    }
}
