use super::compile_plain;
use query_directives::query_builder::Pagination;
use query_directives::{Dialect, DirectiveCompiler, QueryBuilder};
use serde_json::json;

#[test]
fn test_select_fields() {
    let compiled = compile_plain(json!({"fields": ["id", "name", "created_at"]}));
    let expected = QueryBuilder::new("users").select(&["id", "name", "created_at"]);
    assert_eq!(compiled.components(), expected.components());
}

#[test]
fn test_single_field_string() {
    let compiled = compile_plain(json!({"fields": "id"}));
    assert_eq!(compiled.build_sql(), "SELECT id FROM users");
}

#[test]
fn test_order_by_single_field() {
    let compiled = compile_plain(json!({"order": "name"}));
    let expected = QueryBuilder::new("users").order_asc("name");
    assert_eq!(compiled.components(), expected.components());
}

#[test]
fn test_order_by_many_fields() {
    let compiled = compile_plain(json!({"order": ["id", "name"]}));
    let expected = QueryBuilder::new("users").order_asc("id").order_asc("name");
    assert_eq!(compiled.components(), expected.components());
}

#[test]
fn test_order_by_single_field_with_direction() {
    let compiled = compile_plain(json!({"order": "name ASC"}));
    let expected = QueryBuilder::new("users").order_asc("name");
    assert_eq!(compiled.components(), expected.components());
}

#[test]
fn test_order_by_many_fields_with_direction() {
    let compiled = compile_plain(json!({"order": ["id ASC", "name DESC"]}));
    let expected = QueryBuilder::new("users").order_asc("id").order_desc("name");
    assert_eq!(compiled.components(), expected.components());
    assert_eq!(
        compiled.build_sql(),
        "SELECT * FROM users ORDER BY id ASC, name DESC"
    );
}

#[test]
fn test_order_object_form_matches_string_form() {
    let object = compile_plain(json!({"order": {"field": "Name", "direction": "desc"}}));
    let string = compile_plain(json!({"order": "name DESC"}));
    assert_eq!(object.components(), string.components());
}

#[test]
fn test_empty_order_term_is_rejected() {
    let mut query = QueryBuilder::new("users");
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!({"order": "   "}))
        .unwrap_err();
    assert!(error.is_invalid_argument());
}

#[test]
fn test_limit_and_offset() {
    let compiled = compile_plain(json!({"limit": 10, "offset": 20}));
    assert_eq!(
        compiled.components().pagination,
        Some(Pagination::limit_offset(10, 20))
    );
    assert_eq!(compiled.build_sql(), "SELECT * FROM users LIMIT 10 OFFSET 20");
}

#[test]
fn test_skip_is_an_offset_alias() {
    let skip = compile_plain(json!({"skip": 5}));
    let offset = compile_plain(json!({"offset": 5}));
    assert_eq!(skip.components(), offset.components());

    let both = compile_plain(json!({"skip": 5, "offset": 7}));
    assert_eq!(both.components().pagination, Some(Pagination::offset_only(7)));
}

#[test]
fn test_integer_strings_are_accepted_for_bounds() {
    let compiled = compile_plain(json!({"limit": "25"}));
    assert_eq!(compiled.components().pagination, Some(Pagination::limit_only(25)));
}

#[test]
fn test_non_integer_limit_is_rejected() {
    let mut query = QueryBuilder::new("users");
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!({"limit": "ten"}))
        .unwrap_err();
    assert!(error.is_invalid_argument());
    assert_eq!(query.components().pagination, None);
}

#[test]
fn test_group_by_and_having() {
    let compiled = compile_plain(json!({
        "fields": ["customer_id", "COUNT(*) AS total"],
        "groupBy": "customer_id",
        "having": {"COUNT(*)": {"gt": 5}}
    }));
    let expected = QueryBuilder::new("users")
        .select(&["customer_id", "COUNT(*) AS total"])
        .group_by(&["customer_id"])
        .having("count(*)", ">", json!(5));
    assert_eq!(compiled.components(), expected.components());
    assert_eq!(
        compiled.build_sql(),
        "SELECT customer_id, COUNT(*) AS total FROM users GROUP BY customer_id HAVING count(*) > 5"
    );
}

#[test]
fn test_snake_case_group_by() {
    let compiled = compile_plain(json!({"group_by": ["a", "b"]}));
    assert_eq!(compiled.components().groups, vec!["a", "b"]);
}

#[test]
fn test_having_structural_forms() {
    let compiled = compile_plain(json!({
        "groupBy": "status",
        "having": {"total": {"between": [1, 10]}, "status": {"in": ["a", "b"]}}
    }));
    assert_eq!(
        compiled.build_sql(),
        "SELECT * FROM users GROUP BY status HAVING total BETWEEN 1 AND 10 AND status IN ('a', 'b')"
    );
}

#[test]
fn test_having_rejects_boolean_groups() {
    let mut query = QueryBuilder::new("users");
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!({"having": {"or": {"a": 1}}}))
        .unwrap_err();
    assert!(error.is_invalid_argument());
}

fn compile_having_search(dialect: Dialect) -> String {
    let mut query = QueryBuilder::new("orders").with_dialect(dialect);
    DirectiveCompiler::new()
        .apply(
            &mut query,
            &json!({"groupBy": "name", "having": {"name": {"search": " jo  ao "}}}),
        )
        .unwrap();
    query.build_sql()
}

#[test]
fn test_having_search_on_postgres() {
    assert_eq!(
        compile_having_search(Dialect::Postgres),
        "SELECT * FROM orders GROUP BY name HAVING name ilike '%jo%ao%'"
    );
}

#[test]
fn test_having_search_on_mysql() {
    assert_eq!(
        compile_having_search(Dialect::MySql),
        "SELECT * FROM orders GROUP BY name HAVING name COLLATE utf8_general_ci LIKE '%jo%ao%'"
    );
}

#[test]
fn test_having_search_on_other_dialects() {
    assert_eq!(
        compile_having_search(Dialect::Other),
        "SELECT * FROM orders GROUP BY name HAVING LOWER(name) LIKE LOWER('%jo%ao%')"
    );
}
