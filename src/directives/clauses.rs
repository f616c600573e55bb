//! Leaf translators for ordering, selection, pagination, grouping and the
//! name-list directives (`has`, `scopes`).

use super::target::{Direction, TargetBuilder};
use crate::error::{DirectiveError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderTerm {
    pub field: String,
    #[serde(default)]
    pub direction: Direction,
}

impl OrderTerm {
    pub fn new(field: impl Into<String>, direction: Direction) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    /// Parse `"field"`, `"field asc"` or `"field DESC"`.
    ///
    /// A trailing word that is not a direction keyword stays part of the field.
    pub fn parse(term: &str) -> Result<Self> {
        let term = term.trim();
        if term.is_empty() {
            return Err(DirectiveError::invalid_argument("order", "empty order term"));
        }

        let (field, direction) = match term.rsplit_once(char::is_whitespace) {
            Some((head, tail)) => match Direction::from_keyword(tail) {
                Some(direction) => (head.trim_end(), direction),
                None => (term, Direction::Asc),
            },
            None => (term, Direction::Asc),
        };

        Ok(Self::new(field.to_lowercase(), direction))
    }

    fn from_object(term: &serde_json::Map<String, Value>) -> Result<Self> {
        let field = term
            .get("field")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .ok_or_else(|| {
                DirectiveError::invalid_argument("order", "order object requires a 'field' string")
            })?;

        let direction = match term.get("direction") {
            None | Some(Value::Null) => Direction::Asc,
            Some(Value::String(keyword)) => Direction::from_keyword(keyword.trim()).ok_or_else(|| {
                DirectiveError::invalid_argument(
                    "order",
                    format!("unknown direction '{keyword}', expected asc or desc"),
                )
            })?,
            Some(other) => {
                return Err(DirectiveError::invalid_argument(
                    "order",
                    format!("direction must be a string, got {other}"),
                ))
            }
        };

        Ok(Self::new(field.to_lowercase(), direction))
    }
}

/// Parse an order directive: a term, an explicit term object, or a list of either
pub fn parse_order(order: &Value) -> Result<Vec<OrderTerm>> {
    match order {
        Value::Array(terms) => terms.iter().map(parse_order_item).collect(),
        single => Ok(vec![parse_order_item(single)?]),
    }
}

fn parse_order_item(item: &Value) -> Result<OrderTerm> {
    match item {
        Value::String(term) => OrderTerm::parse(term),
        Value::Object(term) => OrderTerm::from_object(term),
        other => Err(DirectiveError::invalid_argument(
            "order",
            format!("order terms must be strings or objects, got {other}"),
        )),
    }
}

/// Parse a column list (`fields`, `groupBy`); a single string is one column
pub fn parse_columns(columns: &Value, directive: &str) -> Result<Vec<String>> {
    parse_names(columns, directive)
}

/// Parse a name or list of names, kept verbatim
pub fn parse_names(names: &Value, directive: &str) -> Result<Vec<String>> {
    match names {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(name) => Ok(name.clone()),
                other => Err(DirectiveError::invalid_argument(
                    directive,
                    format!("expected a string, got {other}"),
                )),
            })
            .collect(),
        other => Err(DirectiveError::invalid_argument(
            directive,
            format!("expected a string or a list of strings, got {other}"),
        )),
    }
}

/// Parse a limit/offset bound; integer strings are accepted, sign is not checked
pub fn parse_bound(bound: &Value, directive: &str) -> Result<i64> {
    let parsed = match bound {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    parsed.ok_or_else(|| {
        DirectiveError::invalid_argument(directive, format!("expected an integer, got {bound}"))
    })
}

pub fn emit_order<B: TargetBuilder>(builder: &mut B, terms: &[OrderTerm]) {
    for term in terms {
        builder.add_order_term(&term.field, term.direction);
    }
}

pub fn emit_groups<B: TargetBuilder>(builder: &mut B, groups: &[String]) {
    for group in groups {
        builder.add_group_term(group);
    }
}
