use super::relations::RelationDef;
use crate::directives::Connective;

/// Represents different types of SQL conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Simple {
        field: String,
        operator: String,
        value: serde_json::Value,
    },
    In {
        field: String,
        values: Vec<serde_json::Value>,
    },
    NotIn {
        field: String,
        values: Vec<serde_json::Value>,
    },
    Between {
        field: String,
        start: serde_json::Value,
        end: serde_json::Value,
    },
    IsNotNull {
        field: String,
    },
    /// Dialect-specific SQL; the first `?` is replaced by the binding
    Raw {
        sql: String,
        binding: Option<serde_json::Value>,
    },
    /// Parenthesized group
    Nested {
        clauses: Vec<WhereClause>,
    },
    /// Related rows exist, optionally matching `clauses`
    Exists {
        relation: String,
        target: RelationDef,
        clauses: Vec<WhereClause>,
    },
}

impl Condition {
    /// Convert condition to SQL string
    pub fn to_sql(&self) -> String {
        match self {
            Condition::Simple {
                field,
                operator,
                value,
            } => {
                format!("{} {} {}", field, operator, format_value(value))
            }
            // an empty set matches nothing, its negation everything
            Condition::In { values, .. } if values.is_empty() => "0 = 1".to_string(),
            Condition::NotIn { values, .. } if values.is_empty() => "1 = 1".to_string(),
            Condition::In { field, values } => {
                format!("{field} IN ({})", format_list(values))
            }
            Condition::NotIn { field, values } => {
                format!("{field} NOT IN ({})", format_list(values))
            }
            Condition::Between { field, start, end } => {
                format!(
                    "{} BETWEEN {} AND {}",
                    field,
                    format_value(start),
                    format_value(end)
                )
            }
            Condition::IsNotNull { field } => {
                format!("{field} IS NOT NULL")
            }
            Condition::Raw { sql, binding } => match binding {
                Some(value) => sql.replacen('?', &format_value(value), 1),
                None => sql.clone(),
            },
            Condition::Nested { clauses } => format!("({})", clauses_to_sql(clauses)),
            Condition::Exists {
                target, clauses, ..
            } => {
                if clauses.is_empty() {
                    target.exists_sql(None, 0)
                } else {
                    target.exists_sql(Some(&clauses_to_sql(clauses)), clauses.len())
                }
            }
        }
    }
}

/// A condition and the connective joining it to the preceding clause
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: Condition,
    pub connective: Connective,
}

impl WhereClause {
    pub fn new(condition: Condition, connective: Connective) -> Self {
        Self {
            condition,
            connective,
        }
    }

    /// Create a simple AND clause
    pub fn simple(field: &str, operator: &str, value: serde_json::Value) -> Self {
        Self::new(
            Condition::Simple {
                field: field.to_string(),
                operator: operator.to_string(),
                value,
            },
            Connective::And,
        )
    }

    /// Convert to SQL string
    pub fn to_sql(&self) -> String {
        self.condition.to_sql()
    }
}

/// Join clauses with their connectives; the first clause's connective is ignored
pub fn clauses_to_sql(clauses: &[WhereClause]) -> String {
    let mut sql = String::new();
    for (index, clause) in clauses.iter().enumerate() {
        if index > 0 {
            sql.push(' ');
            sql.push_str(clause.connective.to_sql());
            sql.push(' ');
        }
        sql.push_str(&clause.to_sql());
    }
    sql
}

fn format_list(values: &[serde_json::Value]) -> String {
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a JSON value for SQL
pub(crate) fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => "NULL".to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        _ => format!("'{}'", value.to_string().replace('\'', "''")),
    }
}
