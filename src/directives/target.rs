//! # Target Builder Capabilities
//!
//! The capability surface the compiler drives. Any fluent query builder can be
//! the target of a description by implementing [`TargetBuilder`]; the crate's own
//! [`QueryBuilder`](crate::query_builder::QueryBuilder) is the reference
//! implementation.

use super::includes::EagerLoad;
use crate::error::{DirectiveError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Boolean combinator joining sibling predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connective {
    #[default]
    And,
    Or,
}

impl Connective {
    /// Case-insensitive match of a filter key against `and` / `or`
    pub fn from_key(key: &str) -> Option<Self> {
        if key.eq_ignore_ascii_case("and") {
            Some(Self::And)
        } else if key.eq_ignore_ascii_case("or") {
            Some(Self::Or)
        } else {
            None
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            Connective::And => "AND",
            Connective::Or => "OR",
        }
    }
}

impl fmt::Display for Connective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Connective::And => f.write_str("and"),
            Connective::Or => f.write_str("or"),
        }
    }
}

/// Sort direction of an order term
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    /// Parse `asc` / `desc` in any case
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        if keyword.eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if keyword.eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Grammar family of the database a builder targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    #[default]
    Other,
}

impl Dialect {
    /// Default case-insensitive LIKE strategy for this grammar family
    pub fn case_insensitive_like(&self) -> CaseInsensitiveLike {
        match self {
            Dialect::Postgres => CaseInsensitiveLike::Operator("ilike"),
            Dialect::MySql => CaseInsensitiveLike::Collation("utf8_general_ci"),
            Dialect::Other => CaseInsensitiveLike::LowerBoth,
        }
    }
}

/// How a builder expresses a case-insensitive substring match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseInsensitiveLike {
    /// Native binary operator, e.g. PostgreSQL `ilike`
    Operator(&'static str),
    /// `field COLLATE <collation> LIKE ?` raw comparison
    Collation(&'static str),
    /// `LOWER(field) LIKE LOWER(?)` raw comparison
    LowerBoth,
}

impl CaseInsensitiveLike {
    /// Raw expression for the strategies that need one; `?` marks the binding
    pub fn raw_expression(&self, field: &str) -> Option<String> {
        match self {
            CaseInsensitiveLike::Operator(_) => None,
            CaseInsensitiveLike::Collation(collation) => {
                Some(format!("{field} COLLATE {collation} LIKE ?"))
            }
            CaseInsensitiveLike::LowerBoth => Some(format!("LOWER({field}) LIKE LOWER(?)")),
        }
    }
}

/// Fluent query construction surface consumed by the compiler.
///
/// The compiler assumes exclusive access to the builder for the duration of one
/// `apply` call; `&mut self` receivers make that a compile-time guarantee.
pub trait TargetBuilder: Sized {
    /// `field <operator> value`
    fn add_predicate(&mut self, field: &str, operator: &str, value: Value, connective: Connective);

    /// `field BETWEEN lower AND upper`
    fn add_range_predicate(
        &mut self,
        field: &str,
        lower: Value,
        upper: Value,
        connective: Connective,
    );

    /// `field IN (values)`
    fn add_set_predicate(&mut self, field: &str, values: Vec<Value>, connective: Connective);

    /// `field NOT IN (values)`
    fn add_negated_set_predicate(&mut self, field: &str, values: Vec<Value>, connective: Connective);

    /// `field IS NOT NULL`
    fn add_not_null_predicate(&mut self, field: &str, connective: Connective);

    /// Dialect-specific expression; `?` marks where `binding` goes
    fn add_raw_predicate(&mut self, expression: &str, binding: Value, connective: Connective);

    /// Parenthesized group built by `build`, attached with `connective`
    fn group_predicates<F>(&mut self, connective: Connective, build: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>;

    fn set_columns(&mut self, columns: Vec<String>);

    fn add_order_term(&mut self, field: &str, direction: Direction);

    fn set_limit(&mut self, limit: i64);

    fn set_offset(&mut self, offset: i64);

    fn add_group_term(&mut self, field: &str);

    /// Post-aggregate predicate. Structural forms arrive with operator
    /// `between` (two-element array), `in` / `not in` (array) or `not null`.
    fn add_having_predicate(
        &mut self,
        field: &str,
        operator: &str,
        value: Value,
        connective: Connective,
    );

    /// Dialect-specific post-aggregate expression; `?` marks where `binding` goes.
    /// Only reached by `search` in a having filter on builders without a native
    /// case-insensitive operator.
    fn add_raw_having_predicate(
        &mut self,
        expression: &str,
        binding: Value,
        connective: Connective,
    ) -> Result<()> {
        let _ = (expression, binding, connective);
        Err(DirectiveError::unsupported_capability("raw having predicate"))
    }

    /// Eager-load the given relations; only relation-aware builders support this
    fn eager_load(&mut self, relations: Vec<EagerLoad>) -> Result<()> {
        let _ = relations;
        Err(DirectiveError::unsupported_capability("relation inclusion"))
    }

    /// Records having at least one related row
    fn relation_exists(&mut self, relation: &str, connective: Connective);

    /// Records having at least one related row matching `build`
    fn relation_filtered_exists<F>(
        &mut self,
        relation: &str,
        connective: Connective,
        build: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>;

    /// Whether `name` is on the builder's scope allow-list
    fn has_scope(&self, name: &str) -> bool {
        let _ = name;
        false
    }

    /// Apply a pre-declared scope; only called for names passing `has_scope`
    fn invoke_scope(&mut self, name: &str) -> Result<()> {
        Err(DirectiveError::unknown_scope(name))
    }

    fn supports_inclusion(&self) -> bool {
        false
    }

    fn dialect(&self) -> Dialect {
        Dialect::Other
    }

    fn case_insensitive_like(&self) -> CaseInsensitiveLike {
        self.dialect().case_insensitive_like()
    }
}
