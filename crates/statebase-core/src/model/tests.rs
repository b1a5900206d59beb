use crate::{
    error::ErrorClass,
    model::{
        field::{Container, FieldModel, FieldType},
        index::IndexModel,
        schema::Schema,
        structure::StructModel,
    },
    state::State,
};
use uuid::Uuid;

const ARTICLE_ID: Uuid = Uuid::from_u128(0xa1);

fn article() -> StructModel {
    StructModel::record_type("Article", ARTICLE_ID)
        .with_field(FieldModel::text("title"))
        .with_field(FieldModel::text("tags").in_container(Container::List))
        .with_index(IndexModel::new(["title"]))
        .with_index(IndexModel::new(["title", "tags"]))
}

#[test]
fn index_unique_names_are_type_qualified() {
    let env = StructModel::environment()
        .with_field(FieldModel::text("slug"))
        .with_index(IndexModel::new(["slug"]));
    let ty = article();

    let env_names: Vec<_> = env.indexes().map(|i| i.unique_name()).collect();
    let ty_names: Vec<_> = ty.indexes().map(|i| i.unique_name()).collect();

    assert_eq!(env_names, ["slug"]);
    assert_eq!(ty_names, ["Article/title", "Article/title,tags"]);
}

#[test]
fn field_internal_type_includes_container() {
    let tags = FieldModel::text("tags").in_container(Container::Map);
    assert_eq!(tags.internal_type(), "map/text");
    assert_eq!(FieldModel::new("n", FieldType::Number).internal_type(), "number");
}

#[test]
fn index_ref_falls_back_to_declared_value_type() {
    let ty = StructModel::record_type("T", ARTICLE_ID)
        .with_index(IndexModel::new(["missing"]).with_value_type(FieldType::Number));
    let index = ty.indexes().next().expect("index");

    assert!(index.leading_field().is_none());
    assert_eq!(index.item_type(0), Some(FieldType::Number));
}

#[test]
fn schema_resolves_state_types() {
    let schema = Schema::new(StructModel::environment(), vec![article()]).expect("schema");

    let typed = State::new(Uuid::from_u128(1)).with_type(ARTICLE_ID);
    let untyped = State::new(Uuid::from_u128(2));
    let unknown = State::new(Uuid::from_u128(3)).with_type(Uuid::from_u128(0xff));

    assert_eq!(schema.type_of(&typed).map(|t| t.name.as_str()), Some("Article"));
    assert!(schema.type_of(&untyped).is_none());
    assert!(schema.type_of(&unknown).is_none());
}

#[test]
fn schema_rejects_duplicate_type_ids() {
    let err = Schema::new(StructModel::environment(), vec![article(), article()])
        .expect_err("duplicate ids must fail");

    assert_eq!(err.class, ErrorClass::Misconfigured);
    assert!(err.message.contains("more than once"));
}

#[test]
fn schema_rejects_empty_index() {
    let ty = StructModel::record_type("T", ARTICLE_ID).with_index(IndexModel::new(Vec::<String>::new()));
    let err = Schema::new(StructModel::environment(), vec![ty]).expect_err("empty index");

    assert!(err.is_misconfigured());
}

#[test]
fn schema_rejects_typed_environment() {
    let err = Schema::new(article(), Vec::new()).expect_err("typed environment");
    assert!(err.message.contains("environment"));
}

#[test]
fn schema_loads_from_toml() {
    let source = r#"
        [environment]
        fields = [{ name = "slug" }]
        indexes = [{ fields = ["slug"], short_constant = true }]

        [[types]]
        name = "Place"
        type_id = "00000000-0000-0000-0000-0000000000b2"
        fields = [
            { name = "point", type = "location" },
            { name = "labels", type = "text", container = "set" },
            { name = "owner", type = "record", embedded = true },
            { name = "code", sql = { index_table = "PlaceCode", index_table_read_only = true } },
        ]
        indexes = [{ fields = ["point"] }, { fields = ["labels"], case_sensitive = true }]
    "#;

    let schema = Schema::from_toml_str(source).expect("schema");
    let place = schema
        .type_by_id(Uuid::from_u128(0xb2))
        .expect("place type");

    assert_eq!(place.name, "Place");
    assert_eq!(place.field("point").map(|f| f.item_type), Some(FieldType::Location));
    assert_eq!(place.field("labels").and_then(|f| f.container), Some(Container::Set));
    assert!(place.field("owner").is_some_and(|f| f.embedded));
    assert_eq!(
        place.field("code").and_then(|f| f.sql.index_table.as_deref()),
        Some("PlaceCode")
    );
    assert!(place.indexes[1].case_sensitive);
    assert!(schema.environment().indexes[0].short_constant);
}

#[test]
fn schema_toml_rejects_unknown_keys() {
    let err = Schema::from_toml_str("[environment]\nbogus = 1\n").expect_err("unknown key");
    assert_eq!(err.class, ErrorClass::Misconfigured);
}
