use crate::{
    db::index::{IndexContext, value::IndexValue},
    error::InternalError,
    value::SymbolId,
};
use std::fmt::{self, Display};

///
/// InRowIndex
///
/// Compact index text stored on the record row itself: `;`-delimited
/// `<index name id>=<value id>` tokens, always starting with `;`.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InRowIndex(String);

impl Default for InRowIndex {
    fn default() -> Self {
        Self(";".to_string())
    }
}

impl InRowIndex {
    /// Append a token unless it is already present. Returns whether it was added.
    pub fn push(&mut self, name_id: SymbolId, value_id: SymbolId) -> bool {
        let token = format!("{name_id}={value_id};");
        if self.0.contains(&format!(";{token}")) {
            return false;
        }

        self.0.push_str(&token);
        true
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == ";"
    }

    /// Tokens without their delimiters.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.split(';').filter(|token| !token.is_empty())
    }
}

impl Display for InRowIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encode an index value into `in_row`, one token per row keyed by the
/// row's first value. Returns the number of tokens added.
pub(crate) fn encode_in_row(
    ctx: IndexContext<'_>,
    index_value: &IndexValue<'_>,
    in_row: &mut InRowIndex,
) -> Result<usize, InternalError> {
    let symbols = ctx.backend.symbols();
    let name_id = symbols.symbol_id(&index_value.index().unique_name())?;

    let mut added = 0;
    for row in index_value.values() {
        let Some(first) = row.first() else {
            continue;
        };

        let value_id = symbols.symbol_id(&first.to_string())?;
        if in_row.push(name_id, value_id) {
            added += 1;
        }
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_index_is_a_lone_delimiter() {
        let in_row = InRowIndex::default();
        assert_eq!(in_row.as_str(), ";");
        assert!(in_row.is_empty());
        assert_eq!(in_row.tokens().count(), 0);
    }

    #[test]
    fn tokens_are_appended_once() {
        let mut in_row = InRowIndex::default();

        assert!(in_row.push(SymbolId(4), SymbolId(7)));
        assert!(in_row.push(SymbolId(4), SymbolId(8)));
        assert!(!in_row.push(SymbolId(4), SymbolId(7)));

        assert_eq!(in_row.to_string(), ";4=7;4=8;");
        assert_eq!(in_row.tokens().collect::<Vec<_>>(), ["4=7", "4=8"]);
    }

    #[test]
    fn containment_check_is_anchored_on_the_delimiter() {
        let mut in_row = InRowIndex::default();

        assert!(in_row.push(SymbolId(14), SymbolId(7)));
        // "4=7;" is a substring of ";14=7;" but not a whole token.
        assert!(in_row.push(SymbolId(4), SymbolId(7)));
        assert_eq!(in_row.as_str(), ";14=7;4=7;");
    }
}
