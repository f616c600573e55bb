use super::conditions::{clauses_to_sql, Condition, WhereClause};
use super::relations::{RelationDef, RelationMap};
use super::scopes::ScopeRegistry;
use super::Pagination;
use crate::directives::{Connective, Dialect, Direction, EagerLoad, OrderTerm, TargetBuilder};
use crate::error::{DirectiveError, Result};
use serde_json::Value;

/// Reference query builder rendering SQL text.
///
/// `QueryBuilder::new` is a plain data query; `QueryBuilder::entity` is relation
/// aware and accepts eager loads.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    base_table: String,
    dialect: Dialect,
    relation_aware: bool,
    select_fields: Vec<String>,
    where_clauses: Vec<WhereClause>,
    group_by: Vec<String>,
    having: Vec<WhereClause>,
    order_by: Vec<OrderTerm>,
    pagination: Option<Pagination>,
    eager_loads: Vec<EagerLoad>,
    relations: RelationMap,
    scopes: ScopeRegistry,
}

/// Comparable snapshot of everything a description can change on a builder
#[derive(Debug, Clone, PartialEq)]
pub struct QueryComponents {
    pub columns: Vec<String>,
    pub wheres: Vec<WhereClause>,
    pub groups: Vec<String>,
    pub havings: Vec<WhereClause>,
    pub orders: Vec<OrderTerm>,
    pub pagination: Option<Pagination>,
    pub eager_loads: Vec<EagerLoad>,
}

impl QueryBuilder {
    /// Create a plain query builder for the given table
    pub fn new(table: &str) -> Self {
        Self {
            base_table: table.to_string(),
            dialect: Dialect::Other,
            relation_aware: false,
            select_fields: vec!["*".to_string()],
            where_clauses: Vec::new(),
            group_by: Vec::new(),
            having: Vec::new(),
            order_by: Vec::new(),
            pagination: None,
            eager_loads: Vec::new(),
            relations: RelationMap::new(),
            scopes: ScopeRegistry::new(),
        }
    }

    /// Create a relation-aware query builder for the given table
    pub fn entity(table: &str) -> Self {
        Self {
            relation_aware: true,
            ..Self::new(table)
        }
    }

    /// Set the SQL grammar family
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Register how a named relation maps onto SQL
    pub fn relation(mut self, name: &str, relation: RelationDef) -> Self {
        self.relations.insert(name.to_string(), relation);
        self
    }

    /// Install the scope allow-list
    pub fn scopes(mut self, scopes: ScopeRegistry) -> Self {
        self.scopes = scopes;
        self
    }

    /// Set specific fields to select
    pub fn select(mut self, fields: &[&str]) -> Self {
        self.set_columns(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    /// Add an AND condition with an explicit operator
    pub fn where_op(mut self, field: &str, operator: &str, value: Value) -> Self {
        self.add_predicate(field, operator, value, Connective::And);
        self
    }

    /// Add a simple WHERE condition
    pub fn where_eq(self, field: &str, value: Value) -> Self {
        self.where_op(field, "=", value)
    }

    /// Add an OR condition with an explicit operator
    pub fn or_where(mut self, field: &str, operator: &str, value: Value) -> Self {
        self.add_predicate(field, operator, value, Connective::Or);
        self
    }

    /// Add WHERE BETWEEN condition
    pub fn where_between(mut self, field: &str, start: Value, end: Value) -> Self {
        self.add_range_predicate(field, start, end, Connective::And);
        self
    }

    /// Add WHERE IN condition
    pub fn where_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.add_set_predicate(field, values, Connective::And);
        self
    }

    /// Add WHERE NOT IN condition
    pub fn where_not_in(mut self, field: &str, values: Vec<Value>) -> Self {
        self.add_negated_set_predicate(field, values, Connective::And);
        self
    }

    /// Add WHERE IS NOT NULL condition
    pub fn where_not_null(mut self, field: &str) -> Self {
        self.add_not_null_predicate(field, Connective::And);
        self
    }

    /// Add a raw condition; `?` marks the binding
    pub fn where_raw(mut self, sql: &str, binding: Value) -> Self {
        self.add_raw_predicate(sql, binding, Connective::And);
        self
    }

    /// Add a parenthesized group built by `build`
    pub fn where_nested<F>(mut self, connective: Connective, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let group = build(self.sub_query(&self.base_table));
        self.push_nested(group.where_clauses, connective);
        self
    }

    /// Add WHERE EXISTS over a relation with predicates built by `build`
    pub fn where_has<F>(mut self, relation: &str, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let target = self.relation_target(relation);
        let related = build(self.sub_query(&target.table));
        self.push_exists(relation, target, related.where_clauses, Connective::And);
        self
    }

    /// Add WHERE EXISTS over a relation
    pub fn has(mut self, relation: &str) -> Self {
        self.relation_exists(relation, Connective::And);
        self
    }

    /// Add GROUP BY clause
    pub fn group_by(mut self, fields: &[&str]) -> Self {
        for field in fields {
            self.add_group_term(field);
        }
        self
    }

    /// Add HAVING clause
    pub fn having(mut self, field: &str, operator: &str, value: Value) -> Self {
        self.add_having_predicate(field, operator, value, Connective::And);
        self
    }

    /// Add ORDER BY clause
    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.add_order_term(field, direction);
        self
    }

    /// Add ORDER BY ASC
    pub fn order_asc(self, field: &str) -> Self {
        self.order_by(field, Direction::Asc)
    }

    /// Add ORDER BY DESC
    pub fn order_desc(self, field: &str) -> Self {
        self.order_by(field, Direction::Desc)
    }

    /// Add LIMIT clause
    pub fn limit(mut self, limit: i64) -> Self {
        self.set_limit(limit);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, offset: i64) -> Self {
        self.set_offset(offset);
        self
    }

    /// Eager-load relations; fails on a plain builder
    pub fn with(mut self, relations: Vec<EagerLoad>) -> Result<Self> {
        self.eager_load(relations)?;
        Ok(self)
    }

    pub fn table(&self) -> &str {
        &self.base_table
    }

    pub fn wheres(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    pub fn eager_loads(&self) -> &[EagerLoad] {
        &self.eager_loads
    }

    /// Snapshot of the query state for comparisons
    pub fn components(&self) -> QueryComponents {
        QueryComponents {
            columns: self.select_fields.clone(),
            wheres: self.where_clauses.clone(),
            groups: self.group_by.clone(),
            havings: self.having.clone(),
            orders: self.order_by.clone(),
            pagination: self.pagination,
            eager_loads: self.eager_loads.clone(),
        }
    }

    /// Materialize an eager-loaded relation: a query over the relation's table
    /// with its deferred configuration applied. `None` if not eager-loaded.
    pub fn relation_query(&self, relation: &str) -> Result<Option<QueryBuilder>> {
        let Some(load) = self
            .eager_loads
            .iter()
            .find(|load| load.relation == relation)
        else {
            return Ok(None);
        };

        let target = self.relation_target(relation);
        let mut query = QueryBuilder {
            relations: self.relations.clone(),
            ..QueryBuilder::entity(&target.table).with_dialect(self.dialect)
        };
        if let Some(config) = &load.config {
            config.apply(&mut query)?;
        }
        Ok(Some(query))
    }

    /// Build the complete SQL query string
    pub fn build_sql(&self) -> String {
        let mut sql = String::new();

        // SELECT clause
        sql.push_str("SELECT ");
        sql.push_str(&self.select_fields.join(", "));

        // FROM clause
        sql.push_str(&format!(" FROM {}", self.base_table));

        // WHERE clauses
        if !self.where_clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses_to_sql(&self.where_clauses));
        }

        // GROUP BY
        if !self.group_by.is_empty() {
            sql.push_str(&format!(" GROUP BY {}", self.group_by.join(", ")));
        }

        // HAVING
        if !self.having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&clauses_to_sql(&self.having));
        }

        // ORDER BY
        if !self.order_by.is_empty() {
            let terms: Vec<String> = self
                .order_by
                .iter()
                .map(|term| format!("{} {}", term.field, term.direction.to_sql()))
                .collect();
            sql.push_str(&format!(" ORDER BY {}", terms.join(", ")));
        }

        // LIMIT/OFFSET
        if let Some(ref pagination) = self.pagination {
            sql.push_str(&pagination.to_sql());
        }

        sql
    }

    fn sub_query(&self, table: &str) -> QueryBuilder {
        QueryBuilder {
            relation_aware: self.relation_aware,
            relations: self.relations.clone(),
            ..QueryBuilder::new(table).with_dialect(self.dialect)
        }
    }

    fn relation_target(&self, relation: &str) -> RelationDef {
        self.relations
            .get(relation)
            .cloned()
            .unwrap_or_else(|| RelationDef::uncorrelated(relation))
    }

    fn push_where(&mut self, condition: Condition, connective: Connective) {
        self.where_clauses
            .push(WhereClause::new(condition, connective));
    }

    fn push_nested(&mut self, clauses: Vec<WhereClause>, connective: Connective) {
        // empty groups add nothing
        if !clauses.is_empty() {
            self.push_where(Condition::Nested { clauses }, connective);
        }
    }

    fn push_exists(
        &mut self,
        relation: &str,
        target: RelationDef,
        clauses: Vec<WhereClause>,
        connective: Connective,
    ) {
        self.push_where(
            Condition::Exists {
                relation: relation.to_string(),
                target,
                clauses,
            },
            connective,
        );
    }

    fn pagination_mut(&mut self) -> &mut Pagination {
        self.pagination.get_or_insert_with(Pagination::default)
    }
}

impl TargetBuilder for QueryBuilder {
    fn add_predicate(&mut self, field: &str, operator: &str, value: Value, connective: Connective) {
        self.push_where(
            Condition::Simple {
                field: field.to_string(),
                operator: operator.to_string(),
                value,
            },
            connective,
        );
    }

    fn add_range_predicate(
        &mut self,
        field: &str,
        lower: Value,
        upper: Value,
        connective: Connective,
    ) {
        self.push_where(
            Condition::Between {
                field: field.to_string(),
                start: lower,
                end: upper,
            },
            connective,
        );
    }

    fn add_set_predicate(&mut self, field: &str, values: Vec<Value>, connective: Connective) {
        self.push_where(
            Condition::In {
                field: field.to_string(),
                values,
            },
            connective,
        );
    }

    fn add_negated_set_predicate(&mut self, field: &str, values: Vec<Value>, connective: Connective) {
        self.push_where(
            Condition::NotIn {
                field: field.to_string(),
                values,
            },
            connective,
        );
    }

    fn add_not_null_predicate(&mut self, field: &str, connective: Connective) {
        self.push_where(
            Condition::IsNotNull {
                field: field.to_string(),
            },
            connective,
        );
    }

    fn add_raw_predicate(&mut self, expression: &str, binding: Value, connective: Connective) {
        self.push_where(
            Condition::Raw {
                sql: expression.to_string(),
                binding: Some(binding),
            },
            connective,
        );
    }

    fn group_predicates<F>(&mut self, connective: Connective, build: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let mut group = self.sub_query(&self.base_table);
        build(&mut group)?;
        self.push_nested(group.where_clauses, connective);
        Ok(())
    }

    fn set_columns(&mut self, columns: Vec<String>) {
        self.select_fields = columns;
    }

    fn add_order_term(&mut self, field: &str, direction: Direction) {
        self.order_by.push(OrderTerm::new(field, direction));
    }

    fn set_limit(&mut self, limit: i64) {
        self.pagination_mut().limit = Some(limit);
    }

    fn set_offset(&mut self, offset: i64) {
        self.pagination_mut().offset = Some(offset);
    }

    fn add_group_term(&mut self, field: &str) {
        self.group_by.push(field.to_string());
    }

    fn add_having_predicate(
        &mut self,
        field: &str,
        operator: &str,
        value: Value,
        connective: Connective,
    ) {
        let field = field.to_string();
        let condition = match (operator, value) {
            ("between", Value::Array(mut bounds)) if bounds.len() == 2 => {
                let end = bounds.pop().unwrap_or(Value::Null);
                let start = bounds.pop().unwrap_or(Value::Null);
                Condition::Between { field, start, end }
            }
            ("in", Value::Array(values)) => Condition::In { field, values },
            ("not in", Value::Array(values)) => Condition::NotIn { field, values },
            ("not null", _) => Condition::IsNotNull { field },
            (operator, value) => Condition::Simple {
                field,
                operator: operator.to_string(),
                value,
            },
        };
        self.having.push(WhereClause::new(condition, connective));
    }

    fn add_raw_having_predicate(
        &mut self,
        expression: &str,
        binding: Value,
        connective: Connective,
    ) -> Result<()> {
        self.having.push(WhereClause::new(
            Condition::Raw {
                sql: expression.to_string(),
                binding: Some(binding),
            },
            connective,
        ));
        Ok(())
    }

    fn eager_load(&mut self, relations: Vec<EagerLoad>) -> Result<()> {
        if !self.relation_aware {
            return Err(DirectiveError::unsupported_capability(format!(
                "relation inclusion on plain query builder for '{}'",
                self.base_table
            )));
        }

        // later loads of the same relation replace earlier ones
        for load in relations {
            match self
                .eager_loads
                .iter_mut()
                .find(|existing| existing.relation == load.relation)
            {
                Some(existing) => *existing = load,
                None => self.eager_loads.push(load),
            }
        }
        Ok(())
    }

    fn relation_exists(&mut self, relation: &str, connective: Connective) {
        let target = self.relation_target(relation);
        self.push_exists(relation, target, Vec::new(), connective);
    }

    fn relation_filtered_exists<F>(
        &mut self,
        relation: &str,
        connective: Connective,
        build: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let target = self.relation_target(relation);
        let mut related = self.sub_query(&target.table);
        build(&mut related)?;
        self.push_exists(relation, target, related.where_clauses, connective);
        Ok(())
    }

    fn has_scope(&self, name: &str) -> bool {
        self.scopes.contains(name)
    }

    fn invoke_scope(&mut self, name: &str) -> Result<()> {
        let scope = self
            .scopes
            .get(name)
            .cloned()
            .ok_or_else(|| DirectiveError::unknown_scope(name))?;
        scope(self);
        Ok(())
    }

    fn supports_inclusion(&self) -> bool {
        self.relation_aware
    }

    fn dialect(&self) -> Dialect {
        self.dialect
    }
}
