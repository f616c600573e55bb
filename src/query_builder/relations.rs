use std::collections::HashMap;

/// How a named relation maps onto SQL: its table and the condition correlating
/// related rows with the parent row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationDef {
    pub table: String,
    pub on_condition: Option<String>,
}

pub type RelationMap = HashMap<String, RelationDef>;

impl RelationDef {
    /// Relation correlated through `on_condition`
    pub fn new(table: &str, on_condition: &str) -> Self {
        Self {
            table: table.to_string(),
            on_condition: Some(on_condition.to_string()),
        }
    }

    /// Relation without correlation, matched purely by its own predicates
    pub fn uncorrelated(table: &str) -> Self {
        Self {
            table: table.to_string(),
            on_condition: None,
        }
    }

    /// Render an EXISTS subquery over this relation; `inner` is already rendered
    pub fn exists_sql(&self, inner: Option<&str>, inner_len: usize) -> String {
        let mut sql = format!("EXISTS (SELECT 1 FROM {}", self.table);

        match (&self.on_condition, inner) {
            (Some(condition), Some(inner)) if inner_len > 1 => {
                sql.push_str(&format!(" WHERE {condition} AND ({inner})"));
            }
            (Some(condition), Some(inner)) => {
                sql.push_str(&format!(" WHERE {condition} AND {inner}"));
            }
            (Some(condition), None) => sql.push_str(&format!(" WHERE {condition}")),
            (None, Some(inner)) => sql.push_str(&format!(" WHERE {inner}")),
            (None, None) => {}
        }

        sql.push(')');
        sql
    }
}
