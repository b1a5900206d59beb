//! Module: index::collect
//! Responsibility: project a state's value graph onto its declared indexes.
//! Does not own: value conversion for storage or table selection.
//! Boundary: output is one `IndexValue` per index that produced rows.

use crate::{
    db::index::{
        normalize::leaf_scalar,
        value::{IndexValue, PathSegment},
    },
    error::InternalError,
    model::{
        field::{FieldModel, FieldType},
        index::IndexRef,
        schema::Schema,
        structure::StructModel,
    },
    state::State,
    value::{IndexScalar, Value},
};
use std::collections::BTreeMap;

///
/// KeyedScalars
///
/// Flattened values of one field: container suffix to scalar, in the order
/// they were first seen. Re-inserting a suffix replaces its scalar in place.
///

#[derive(Debug, Default)]
struct KeyedScalars(Vec<(String, IndexScalar)>);

impl KeyedScalars {
    fn insert(&mut self, suffix: String, scalar: IndexScalar) {
        match self.0.iter_mut().find(|(existing, _)| *existing == suffix) {
            Some(entry) => entry.1 = scalar,
            None => self.0.push((suffix, scalar)),
        }
    }

    const fn len(&self) -> usize {
        self.0.len()
    }

    const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Compute every index value of `state`: environment indexes first, then
/// those of the state's type, then (depth-first, at the point they are
/// reached) those of any embedded records.
pub fn collect_index_values<'a>(
    schema: &'a Schema,
    state: &'a State,
) -> Result<Vec<IndexValue<'a>>, InternalError> {
    let mut out = Vec::new();
    let mut collector = Collector {
        schema,
        out: &mut out,
    };

    collector.collect_struct(&[], schema.environment(), &state.values)?;
    if let Some(ty) = schema.type_of(state) {
        collector.collect_struct(&[], ty, &state.values)?;
    }

    Ok(out)
}

struct Collector<'a, 'o> {
    schema: &'a Schema,
    out: &'o mut Vec<IndexValue<'a>>,
}

impl<'a> Collector<'a, '_> {
    fn collect_struct(
        &mut self,
        prefixes: &[PathSegment<'a>],
        structure: &'a StructModel,
        values: &'a BTreeMap<String, Value>,
    ) -> Result<(), InternalError> {
        'index: for index in structure.indexes() {
            let mut per_field = Vec::with_capacity(index.fields().len());

            for field_name in index.fields() {
                let Some(field) = structure.field(field_name) else {
                    continue 'index;
                };

                let mut keyed = KeyedScalars::default();
                self.collect_field(
                    prefixes,
                    String::new(),
                    structure,
                    field,
                    &mut keyed,
                    values.get(&field.name),
                )?;
                if keyed.is_empty() {
                    continue 'index;
                }

                per_field.push(keyed);
            }

            let (keys, rows) = cartesian_product(index, &per_field)?;
            self.out
                .push(IndexValue::new(prefixes.to_vec(), index, keys, rows));
        }

        Ok(())
    }

    fn collect_field(
        &mut self,
        prefixes: &[PathSegment<'a>],
        suffix: String,
        structure: &'a StructModel,
        field: &'a FieldModel,
        keyed: &mut KeyedScalars,
        value: Option<&'a Value>,
    ) -> Result<(), InternalError> {
        let Some(value) = value else {
            return Ok(());
        };

        match value {
            Value::Null => {}
            Value::List(items) => {
                for (ordinal, item) in items.iter().enumerate() {
                    self.collect_field(
                        prefixes,
                        format!("{suffix}/{ordinal}"),
                        structure,
                        field,
                        keyed,
                        Some(item),
                    )?;
                }
            }
            Value::Map(entries) => {
                for (key, item) in entries {
                    self.collect_field(
                        prefixes,
                        format!("{suffix}/{key}"),
                        structure,
                        field,
                        keyed,
                        Some(item),
                    )?;
                }
            }
            Value::Record(record) => {
                let schema = self.schema;
                let record_type = schema.type_of(record);
                let embedded = field.embedded || record_type.is_some_and(|ty| ty.embedded);

                if field.item_type == FieldType::Record && embedded {
                    let mut nested = Vec::with_capacity(prefixes.len() + 1);
                    nested.extend_from_slice(prefixes);
                    nested.push(PathSegment::new(structure, field));

                    self.collect_struct(&nested, schema.environment(), &record.values)?;
                    if let Some(ty) = record_type {
                        self.collect_struct(&nested, ty, &record.values)?;
                    }
                } else {
                    keyed.insert(suffix, IndexScalar::Uuid(record.id));
                }
            }
            leaf => {
                if let Some(scalar) = leaf_scalar(leaf) {
                    keyed.insert(suffix, scalar);
                }
            }
        }

        Ok(())
    }
}

/// Expand per-field values into rows. The first field varies slowest; each
/// row's key is the suffix contributed by the last field.
fn cartesian_product(
    index: IndexRef<'_>,
    per_field: &[KeyedScalars],
) -> Result<(Vec<String>, Vec<Vec<IndexScalar>>), InternalError> {
    let total = per_field
        .iter()
        .try_fold(1usize, |acc, keyed| acc.checked_mul(keyed.len()))
        .ok_or_else(|| {
            InternalError::index_unsupported(format!(
                "index {index} expands to more rows than can be addressed"
            ))
        })?;

    let mut keys = vec![String::new(); total];
    let mut rows = vec![Vec::with_capacity(per_field.len()); total];

    let mut partition = total;
    for keyed in per_field {
        partition /= keyed.len();

        let mut position = 0;
        while position < total {
            for (suffix, scalar) in &keyed.0 {
                for _ in 0..partition {
                    keys[position].clone_from(suffix);
                    rows[position].push(scalar.clone());
                    position += 1;
                }
            }
        }
    }

    Ok((keys, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        field::{Container, FieldModel},
        index::IndexModel,
    };
    use proptest::prelude::*;
    use uuid::Uuid;

    fn keyed(entries: &[(&str, i64)]) -> KeyedScalars {
        let mut keyed = KeyedScalars::default();
        for (suffix, value) in entries {
            keyed.insert((*suffix).to_string(), IndexScalar::Int(*value));
        }
        keyed
    }

    #[test]
    fn keyed_scalars_replace_in_place() {
        let mut keyed = keyed(&[("/a", 1), ("/b", 2)]);
        keyed.insert("/a".to_string(), IndexScalar::Int(9));

        assert_eq!(
            keyed.0,
            vec![
                ("/a".to_string(), IndexScalar::Int(9)),
                ("/b".to_string(), IndexScalar::Int(2)),
            ]
        );
    }

    #[test]
    fn product_orders_outer_field_slowest() {
        let ty = StructModel::record_type("T", Uuid::from_u128(1))
            .with_field(FieldModel::text("a").in_container(Container::List))
            .with_field(FieldModel::text("b").in_container(Container::List))
            .with_index(IndexModel::new(["a", "b"]));
        let index = ty.indexes().next().expect("index");

        let (keys, rows) = cartesian_product(
            index,
            &[keyed(&[("/0", 1), ("/1", 2)]), keyed(&[("/0", 10), ("/1", 20), ("/2", 30)])],
        )
        .expect("product");

        assert_eq!(keys, ["/0", "/1", "/2", "/0", "/1", "/2"]);
        let flat: Vec<(i64, i64)> = rows
            .iter()
            .map(|row| match (&row[0], &row[1]) {
                (IndexScalar::Int(a), IndexScalar::Int(b)) => (*a, *b),
                other => panic!("unexpected row {other:?}"),
            })
            .collect();
        assert_eq!(flat, [(1, 10), (1, 20), (1, 30), (2, 10), (2, 20), (2, 30)]);
    }

    proptest! {
        #[test]
        fn product_has_every_combination(a in 1usize..6, b in 1usize..6, c in 1usize..4) {
            let ty = StructModel::record_type("T", Uuid::from_u128(1))
                .with_index(IndexModel::new(["a", "b", "c"]));
            let index = ty.indexes().next().expect("index");

            let field = |offset: i64, n: usize| {
                let mut keyed = KeyedScalars::default();
                for i in 0..n {
                    let value = offset + i64::try_from(i).expect("small");
                    keyed.insert(format!("/{i}"), IndexScalar::Int(value));
                }
                keyed
            };

            let (keys, rows) =
                cartesian_product(index, &[field(0, a), field(100, b), field(1000, c)])
                    .expect("product");

            prop_assert_eq!(keys.len(), a * b * c);
            prop_assert_eq!(rows.len(), a * b * c);
            prop_assert!(rows.iter().all(|row| row.len() == 3));

            let mut seen: Vec<_> = rows.iter().map(|row| format!("{row:?}")).collect();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(seen.len(), a * b * c);
        }
    }
}
