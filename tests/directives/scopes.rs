use query_directives::query_builder::scopes::{equals, not_null};
use query_directives::query_builder::ScopeRegistry;
use query_directives::{DirectiveCompiler, DirectiveError, QueryBuilder};
use serde_json::json;

fn users_with_scopes() -> QueryBuilder {
    QueryBuilder::new("users").scopes(
        ScopeRegistry::new()
            .register("active", not_null("activated_at"))
            .register("admins", equals("role", json!("admin"))),
    )
}

#[test]
fn test_single_scope() {
    let mut query = users_with_scopes();
    DirectiveCompiler::new()
        .apply(&mut query, &json!({"scopes": "active"}))
        .unwrap();

    let expected = QueryBuilder::new("users").where_not_null("activated_at");
    assert_eq!(query.components(), expected.components());
}

#[test]
fn test_scopes_apply_in_listed_order() {
    let mut query = users_with_scopes();
    DirectiveCompiler::new()
        .apply(&mut query, &json!({"scopes": ["admins", "active"]}))
        .unwrap();

    assert_eq!(
        query.build_sql(),
        "SELECT * FROM users WHERE role = 'admin' AND activated_at IS NOT NULL"
    );
}

#[test]
fn test_unknown_scope_is_rejected_before_mutation() {
    let mut query = users_with_scopes();
    let error = DirectiveCompiler::new()
        .apply(
            &mut query,
            &json!({"where": {"foo": "bar"}, "scopes": ["active", "drop_tables"]}),
        )
        .unwrap_err();

    assert_eq!(error, DirectiveError::unknown_scope("drop_tables"));
    assert!(query.wheres().is_empty());
}

#[test]
fn test_scope_names_are_case_sensitive() {
    let mut query = users_with_scopes();
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!({"scopes": "Active"}))
        .unwrap_err();
    assert!(matches!(error, DirectiveError::UnknownScope { .. }));
}

#[test]
fn test_scope_names_must_be_strings() {
    let mut query = users_with_scopes();
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!({"scopes": [1]}))
        .unwrap_err();
    assert!(error.is_invalid_argument());
}
