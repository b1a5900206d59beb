use crate::{
    model::{field::FieldModel, index::IndexRef, structure::StructModel},
    value::IndexScalar,
};

///
/// PathSegment
///
/// One step of an embedding chain: the field (and its declaring struct)
/// through which an embedded record was reached.
///

#[derive(Clone, Copy, Debug)]
pub struct PathSegment<'a> {
    pub parent: &'a StructModel,
    pub field: &'a FieldModel,
}

impl<'a> PathSegment<'a> {
    #[must_use]
    pub const fn new(parent: &'a StructModel, field: &'a FieldModel) -> Self {
        Self { parent, field }
    }
}

///
/// IndexValue
///
/// Projection of one index over one state: a row per combination of field
/// values, each with the suffix key of the container path it came from.
/// `keys` and `values` are parallel, and every row holds one scalar per
/// index field.
///

#[derive(Clone, Debug)]
pub struct IndexValue<'a> {
    prefixes: Vec<PathSegment<'a>>,
    index: IndexRef<'a>,
    keys: Vec<String>,
    values: Vec<Vec<IndexScalar>>,
}

impl<'a> IndexValue<'a> {
    pub(crate) fn new(
        prefixes: Vec<PathSegment<'a>>,
        index: IndexRef<'a>,
        keys: Vec<String>,
        values: Vec<Vec<IndexScalar>>,
    ) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        debug_assert!(values.iter().all(|row| row.len() == index.fields().len()));

        Self {
            prefixes,
            index,
            keys,
            values,
        }
    }

    #[must_use]
    pub const fn index(&self) -> IndexRef<'a> {
        self.index
    }

    #[must_use]
    pub fn prefixes(&self) -> &[PathSegment<'a>] {
        &self.prefixes
    }

    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    #[must_use]
    pub fn values(&self) -> &[Vec<IndexScalar>] {
        &self.values
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Rows as `(suffix key, values)` pairs.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &[IndexScalar])> {
        self.keys
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(Vec::as_slice))
    }

    /// Stable name of the index this value belongs to.
    ///
    /// Top-level values are named `[<Type>/]field[,field...]`. Values found
    /// inside embedded records are named after the embedding chain instead:
    /// the first segment's qualified field name, then each further field
    /// name, each followed by `/`. A dynamic suffix is appended after `#`,
    /// without its leading `/`.
    #[must_use]
    pub fn unique_name(&self, dynamic_suffix: Option<&str>) -> String {
        let mut name = String::new();

        match self.prefixes.split_first() {
            None => {
                if let Some(type_name) = self.index.parent.type_name() {
                    name.push_str(type_name);
                    name.push('/');
                }
            }
            Some((first, rest)) => {
                name.push_str(&first.parent.field_unique_name(first.field));
                name.push('/');
                for segment in rest {
                    name.push_str(&segment.field.name);
                    name.push('/');
                }
            }
        }

        name.push_str(&self.index.fields().join(","));

        if let Some(suffix) = dynamic_suffix {
            name.push('#');
            name.push_str(suffix.strip_prefix('/').unwrap_or(suffix));
        }

        name
    }
}
