use query_directives::query_builder::conditions::*;
use query_directives::query_builder::{QueryBuilder, RelationDef};
use query_directives::{Connective, DirectiveCompiler};

#[test]
fn test_simple_condition() {
    let condition = Condition::Simple {
        field: "name".to_string(),
        operator: "=".to_string(),
        value: serde_json::Value::String("test".to_string()),
    };
    assert_eq!(condition.to_sql(), "name = 'test'");
}

#[test]
fn test_in_condition() {
    let condition = Condition::In {
        field: "id".to_string(),
        values: vec![
            serde_json::Value::Number(serde_json::Number::from(1)),
            serde_json::Value::Number(serde_json::Number::from(2)),
            serde_json::Value::Number(serde_json::Number::from(3)),
        ],
    };
    assert_eq!(condition.to_sql(), "id IN (1, 2, 3)");
}

#[test]
fn test_not_in_condition() {
    let condition = Condition::NotIn {
        field: "status".to_string(),
        values: vec![serde_json::json!("a"), serde_json::json!("b")],
    };
    assert_eq!(condition.to_sql(), "status NOT IN ('a', 'b')");
}

#[test]
fn test_empty_sets_render_valid_sql() {
    let empty_in = Condition::In {
        field: "id".to_string(),
        values: vec![],
    };
    let empty_not_in = Condition::NotIn {
        field: "id".to_string(),
        values: vec![],
    };
    assert_eq!(empty_in.to_sql(), "0 = 1");
    assert_eq!(empty_not_in.to_sql(), "1 = 1");
}

#[test]
fn test_empty_in_from_description() {
    let mut query = QueryBuilder::new("users");
    DirectiveCompiler::new()
        .apply(
            &mut query,
            &serde_json::json!({"where": {"id": {"in": []}, "role": {"nin": []}}}),
        )
        .unwrap();
    assert_eq!(query.build_sql(), "SELECT * FROM users WHERE 0 = 1 AND 1 = 1");
}

#[test]
fn test_between_condition() {
    let condition = Condition::Between {
        field: "created_at".to_string(),
        start: serde_json::json!("2014-10-10"),
        end: serde_json::json!("2015-10-10"),
    };
    assert_eq!(
        condition.to_sql(),
        "created_at BETWEEN '2014-10-10' AND '2015-10-10'"
    );
}

#[test]
fn test_is_not_null_condition() {
    let condition = Condition::IsNotNull {
        field: "deleted_at".to_string(),
    };
    assert_eq!(condition.to_sql(), "deleted_at IS NOT NULL");
}

#[test]
fn test_exists_condition() {
    let condition = Condition::Exists {
        relation: "roles".to_string(),
        target: RelationDef::new("roles", "roles.user_id = users.id"),
        clauses: vec![
            WhereClause::simple("name", "=", serde_json::json!("admin")),
            WhereClause::new(
                Condition::IsNotNull {
                    field: "granted_at".to_string(),
                },
                Connective::And,
            ),
        ],
    };
    assert_eq!(
        condition.to_sql(),
        "EXISTS (SELECT 1 FROM roles WHERE roles.user_id = users.id \
         AND (name = 'admin' AND granted_at IS NOT NULL))"
    );
}

#[test]
fn test_raw_without_binding_is_verbatim() {
    let condition = Condition::Raw {
        sql: "1 = 1".to_string(),
        binding: None,
    };
    assert_eq!(condition.to_sql(), "1 = 1");
}
