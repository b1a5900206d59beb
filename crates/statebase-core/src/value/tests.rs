use crate::value::{BindValue, IndexScalar, Location, Region, SymbolId, Value};
use std::collections::HashSet;
use uuid::Uuid;

#[test]
fn blank_detection_covers_text_bytes_and_null() {
    assert!(BindValue::Null.is_blank());
    assert!(BindValue::Text("   ".to_string()).is_blank());
    assert!(BindValue::Bytes(Vec::new()).is_blank());
    assert!(BindValue::Region(Region::default()).is_blank());

    assert!(!BindValue::Text(" a ".to_string()).is_blank());
    assert!(!BindValue::Bytes(vec![0]).is_blank());
    assert!(!BindValue::Int(0).is_blank());
    assert!(!BindValue::Symbol(SymbolId(0)).is_blank());
}

#[test]
fn float_bind_values_hash_bitwise() {
    let mut set = HashSet::new();
    assert!(set.insert(BindValue::Float(1.5)));
    assert!(!set.insert(BindValue::Float(1.5)));
    assert!(set.insert(BindValue::Float(-0.0)));
    assert!(set.insert(BindValue::Float(0.0)));
    assert!(set.insert(BindValue::Int(1)));
}

#[test]
fn variants_with_equal_payloads_are_distinct() {
    assert_ne!(BindValue::Int(7), BindValue::Symbol(SymbolId(7)));
    assert_ne!(
        BindValue::Text("a".to_string()),
        BindValue::Bytes(b"a".to_vec())
    );
}

#[test]
fn scalar_display_matches_textual_form() {
    let id = Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef);

    assert_eq!(IndexScalar::Int(-4).to_string(), "-4");
    assert_eq!(IndexScalar::Bool(true).to_string(), "true");
    assert_eq!(IndexScalar::from("x").to_string(), "x");
    assert_eq!(
        IndexScalar::Uuid(id).to_string(),
        "01234567-89ab-cdef-0123-456789abcdef"
    );
}

#[test]
fn region_wkt_lists_every_ring() {
    let region = Region::new(vec![vec![
        Location::new(0.0, 0.0),
        Location::new(1.0, 0.0),
        Location::new(0.0, 0.0),
    ]]);

    assert_eq!(region.to_wkt(), "MULTIPOLYGON(((0 0, 1 0, 0 0)))");
    assert_eq!(Location::new(1.5, -2.0).to_wkt(), "POINT(1.5 -2)");
}

#[test]
fn value_conversions_build_expected_variants() {
    assert_eq!(Value::from("a"), Value::Text("a".to_string()));
    assert_eq!(Value::from(3), Value::Int(3));
    assert_eq!(Value::from(None::<i64>), Value::Null);
    assert_eq!(
        Value::from(vec!["a", "b"]),
        Value::List(vec![Value::from("a"), Value::from("b")])
    );

    let Value::Map(map) = Value::map([("k", 1)]) else {
        panic!("expected map value");
    };
    assert_eq!(map.get("k"), Some(&Value::Int(1)));
}
