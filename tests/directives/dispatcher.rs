use super::{compile_entity, compile_plain};
use query_directives::query_builder::{RelationDef, ScopeRegistry};
use query_directives::{DirectiveCompiler, QueryBuilder, QueryDescription};
use serde_json::json;

#[test]
fn test_empty_query() {
    let compiled = compile_plain(json!({}));
    assert_eq!(compiled.components(), QueryBuilder::new("users").components());
    assert_eq!(compiled.build_sql(), "SELECT * FROM users");
}

#[test]
fn test_unknown_and_null_directives_are_ignored() {
    let compiled = compile_plain(json!({
        "where": null,
        "limit": null,
        "page": 3,
        "Where": {"foo": "bar"}
    }));
    assert_eq!(compiled.components(), QueryBuilder::new("users").components());
}

#[test]
fn test_non_mapping_description_is_rejected() {
    let mut query = QueryBuilder::new("users");
    let error = DirectiveCompiler::new()
        .apply(&mut query, &json!(["where"]))
        .unwrap_err();
    assert!(error.is_invalid_argument());
}

#[test]
fn test_apply_returns_builder_for_chaining() {
    let mut query = QueryBuilder::new("users");
    let sql = DirectiveCompiler::new()
        .apply(&mut query, &json!({"limit": 1}))
        .unwrap()
        .build_sql();
    assert_eq!(sql, "SELECT * FROM users LIMIT 1");
}

#[test]
fn test_directives_are_applied_in_fixed_order() {
    let registry = ScopeRegistry::new().register("active", |q: &mut QueryBuilder| {
        *q = q.clone().where_not_null("activated_at");
    });
    let mut query = QueryBuilder::entity("users")
        .relation("roles", RelationDef::new("roles", "roles.user_id = users.id"))
        .scopes(registry);

    // key order in the description does not matter
    DirectiveCompiler::new()
        .apply(
            &mut query,
            &json!({
                "scopes": "active",
                "has": "roles",
                "where": {"name": "joao"}
            }),
        )
        .unwrap();

    assert_eq!(
        query.build_sql(),
        "SELECT * FROM users WHERE name = 'joao' \
         AND EXISTS (SELECT 1 FROM roles WHERE roles.user_id = users.id) \
         AND activated_at IS NOT NULL"
    );
}

#[test]
fn test_has_accepts_one_or_many_relations() {
    let single = compile_plain(json!({"has": "roles"}));
    assert_eq!(
        single.build_sql(),
        "SELECT * FROM users WHERE EXISTS (SELECT 1 FROM roles)"
    );

    let many = compile_plain(json!({"has": ["roles", "tags"]}));
    let expected = QueryBuilder::new("users").has("roles").has("tags");
    assert_eq!(many.components(), expected.components());
}

#[test]
fn test_compiler_is_reusable_across_builders() {
    let compiler = DirectiveCompiler::new();
    let description = json!({"where": {"foo": "bar"}, "limit": 5});

    let mut first = QueryBuilder::new("users");
    let mut second = QueryBuilder::entity("users");
    compiler.apply(&mut first, &description).unwrap();
    compiler.apply(&mut second, &description).unwrap();

    assert_eq!(first.components(), second.components());
}

#[test]
fn test_compiled_description_can_be_applied_later() {
    let compiler = DirectiveCompiler::new();
    let description = compiler
        .compile(&json!({"where": {"foo": "bar"}, "order": "id desc"}))
        .unwrap();
    assert!(!description.is_empty());

    let mut query = QueryBuilder::new("users");
    compiler.apply_compiled(&mut query, &description).unwrap();
    assert_eq!(
        query.build_sql(),
        "SELECT * FROM users WHERE foo = 'bar' ORDER BY id DESC"
    );
}

#[test]
fn test_apply_compiled_checks_inclusion_support() {
    let compiler = DirectiveCompiler::new();
    let description = compiler.compile(&json!({"include": ["roles"]})).unwrap();

    let mut plain = QueryBuilder::new("users");
    assert!(compiler.apply_compiled(&mut plain, &description).is_err());

    let mut entity = QueryBuilder::entity("users");
    compiler.apply_compiled(&mut entity, &description).unwrap();
    assert_eq!(entity.eager_loads().len(), 1);
}

#[test]
fn test_empty_include_on_entity_is_a_no_op() {
    let compiled = compile_entity(json!({"include": []}));
    assert!(compiled.eager_loads().is_empty());
}

#[test]
fn test_description_is_shareable_across_threads() {
    let compiler = DirectiveCompiler::new();
    let description: QueryDescription = compiler.compile(&json!({"where": {"a": 1}})).unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let compiler = compiler.clone();
            let description = description.clone();
            std::thread::spawn(move || {
                let mut query = QueryBuilder::new("users");
                compiler.apply_compiled(&mut query, &description).unwrap();
                query.build_sql()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "SELECT * FROM users WHERE a = 1");
    }
}
