//! # Predicate Compiler
//!
//! Filter mappings are parsed into a [`FilterNode`] tree first and emitted
//! against the target builder second. Parsing validates the whole shape, so a
//! malformed filter is rejected before the builder sees a single call.
//!
//! Grammar, per mapping entry:
//!
//! - `"and"` / `"or"` (any case) with a mapping value opens a nested group
//! - `"field": scalar` is an equality predicate
//! - `"field": {"op": value, ...}` is one predicate per operator entry
//! - `"relation.field": ...` filters on the related record set; the path is
//!   split at the last dot, so `a.b.c` is relation `a.b`, field `c`

use super::operators;
use super::target::{CaseInsensitiveLike, Connective, TargetBuilder};
use crate::config::CompilerConfig;
use crate::error::{DirectiveError, Result};
use serde_json::{Map, Value};
use tracing::trace;

/// A single resolved comparison against one field
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare { operator: String, value: Value },
    Between { lower: Value, upper: Value },
    In(Vec<Value>),
    NotIn(Vec<Value>),
    NotNull,
    /// Wildcard pattern for a case-insensitive substring match
    Search(String),
}

/// Parsed filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    Group {
        connective: Connective,
        nodes: Vec<FilterNode>,
    },
    Leaf {
        field: String,
        predicate: Predicate,
    },
    Relation {
        relation: String,
        field: String,
        predicate: Predicate,
    },
}

/// Post-aggregate filter entry; having filters are single-level
#[derive(Debug, Clone, PartialEq)]
pub struct HavingNode {
    pub field: String,
    pub predicate: Predicate,
}

/// Parses filter mappings under the compiler's configuration
#[derive(Debug, Clone, Copy)]
pub struct FilterParser<'a> {
    config: &'a CompilerConfig,
    directive: &'static str,
}

impl<'a> FilterParser<'a> {
    pub fn new(config: &'a CompilerConfig, directive: &'static str) -> Self {
        Self { config, directive }
    }

    /// Parse a `where`-style mapping
    pub fn parse(&self, filter: &Value) -> Result<Vec<FilterNode>> {
        self.parse_level(filter, 1)
    }

    /// Parse a `having` mapping: no groups, dotted names taken verbatim
    pub fn parse_having(&self, filter: &Value) -> Result<Vec<HavingNode>> {
        let entries = self.expect_mapping(filter, "expected a mapping of field filters")?;
        let mut nodes = Vec::new();

        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            if let Some(connective) = self.group_connective(key) {
                return Err(self.invalid(format!(
                    "boolean group '{connective}' is not supported in having filters"
                )));
            }

            let field = self.column_name(key)?;
            for predicate in self.parse_predicates(&field, value)? {
                nodes.push(HavingNode {
                    field: field.clone(),
                    predicate,
                });
            }
        }

        Ok(nodes)
    }

    fn parse_level(&self, filter: &Value, depth: usize) -> Result<Vec<FilterNode>> {
        if depth > self.config.max_nesting_depth {
            return Err(self.invalid(format!(
                "filter nesting exceeds the maximum depth of {}",
                self.config.max_nesting_depth
            )));
        }

        let entries = self.expect_mapping(filter, "expected a mapping of field filters")?;
        let mut nodes = Vec::with_capacity(entries.len());

        for (key, value) in entries {
            // Null filters are optional inputs left empty, not errors
            if value.is_null() {
                continue;
            }

            if let Some(connective) = self.group_connective(key) {
                if !value.is_object() {
                    return Err(self.invalid(format!(
                        "boolean group '{key}' expects a mapping of filters"
                    )));
                }
                nodes.push(FilterNode::Group {
                    connective,
                    nodes: self.parse_level(value, depth + 1)?,
                });
                continue;
            }

            match key.rsplit_once('.') {
                Some((relation, field)) => {
                    if relation.is_empty() || field.is_empty() {
                        return Err(self.invalid(format!("malformed relation path '{key}'")));
                    }
                    let relation = relation.to_lowercase();
                    for predicate in self.parse_predicates(field, value)? {
                        nodes.push(FilterNode::Relation {
                            relation: relation.clone(),
                            field: field.to_string(),
                            predicate,
                        });
                    }
                }
                None => {
                    let field = self.column_name(key)?;
                    for predicate in self.parse_predicates(&field, value)? {
                        nodes.push(FilterNode::Leaf {
                            field: field.clone(),
                            predicate,
                        });
                    }
                }
            }
        }

        Ok(nodes)
    }

    fn parse_predicates(&self, field: &str, value: &Value) -> Result<Vec<Predicate>> {
        match value {
            Value::Object(operators) => {
                let mut predicates = Vec::with_capacity(operators.len());
                for (token, operand) in operators {
                    let operator = operators::resolve(token);
                    if let Some(predicate) = self.parse_operator(field, &operator, operand)? {
                        predicates.push(predicate);
                    }
                }
                Ok(predicates)
            }
            Value::Array(_) => Err(self.invalid(format!(
                "'{field}' has a list value without an operator, use {{\"in\": [...]}}"
            ))),
            scalar => Ok(vec![Predicate::Compare {
                operator: "=".to_string(),
                value: scalar.clone(),
            }]),
        }
    }

    fn parse_operator(
        &self,
        field: &str,
        operator: &str,
        operand: &Value,
    ) -> Result<Option<Predicate>> {
        if operator == "not null" {
            return Ok(Some(Predicate::NotNull));
        }
        if operand.is_null() {
            return Ok(None);
        }

        let predicate = match operator {
            "between" => match operand {
                Value::Array(bounds) if bounds.len() == 2 => Predicate::Between {
                    lower: bounds[0].clone(),
                    upper: bounds[1].clone(),
                },
                Value::Array(bounds) => {
                    return Err(DirectiveError::InvalidOperatorArity {
                        field: field.to_string(),
                        operator: operator.to_string(),
                        expected: 2,
                        actual: bounds.len(),
                    })
                }
                _ => {
                    return Err(DirectiveError::InvalidOperatorArity {
                        field: field.to_string(),
                        operator: operator.to_string(),
                        expected: 2,
                        actual: 1,
                    })
                }
            },
            "in" => Predicate::In(as_set(operand)),
            "not in" => Predicate::NotIn(as_set(operand)),
            "search" => Predicate::Search(self.search_pattern(field, operand)?),
            _ => Predicate::Compare {
                operator: operator.to_string(),
                value: operand.clone(),
            },
        };

        Ok(Some(predicate))
    }

    fn search_pattern(&self, field: &str, operand: &Value) -> Result<String> {
        let text = match operand {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => {
                return Err(self.invalid(format!(
                    "search on '{field}' expects a string, got {operand}"
                )))
            }
        };
        Ok(search_pattern(&text))
    }

    fn group_connective(&self, key: &str) -> Option<Connective> {
        if self.config.is_literal_column(key) {
            return None;
        }
        Connective::from_key(key)
    }

    fn column_name(&self, key: &str) -> Result<String> {
        if key.trim().is_empty() {
            return Err(self.invalid("empty field name"));
        }
        Ok(key.to_lowercase())
    }

    fn expect_mapping<'v>(&self, value: &'v Value, message: &str) -> Result<&'v Map<String, Value>> {
        value.as_object().ok_or_else(|| self.invalid(message))
    }

    fn invalid(&self, message: impl Into<String>) -> DirectiveError {
        DirectiveError::invalid_argument(self.directive, message)
    }
}

/// Collapse whitespace and turn token boundaries into `%` wildcards:
/// `"  joao   silva "` becomes `"%joao%silva%"`
pub fn search_pattern(text: &str) -> String {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    format!("%{}%", tokens.join("%"))
}

fn as_set(operand: &Value) -> Vec<Value> {
    match operand {
        Value::Array(values) => values.clone(),
        single => vec![single.clone()],
    }
}

/// Emit parsed filter nodes, joining siblings with `connective`
pub fn emit_nodes<B: TargetBuilder>(
    builder: &mut B,
    nodes: &[FilterNode],
    connective: Connective,
) -> Result<()> {
    for node in nodes {
        match node {
            FilterNode::Group {
                connective: inner,
                nodes,
            } => {
                if nodes.is_empty() {
                    continue;
                }
                trace!(outer = %connective, inner = %inner, "opening predicate group");
                builder.group_predicates(connective, |group| emit_nodes(group, nodes, *inner))?;
            }
            FilterNode::Leaf { field, predicate } => {
                emit_predicate(builder, field, predicate, connective);
            }
            FilterNode::Relation {
                relation,
                field,
                predicate,
            } => {
                trace!(relation = %relation, field = %field, "relation predicate");
                builder.relation_filtered_exists(relation, connective, |related| {
                    emit_predicate(related, field, predicate, Connective::And);
                    Ok(())
                })?;
            }
        }
    }
    Ok(())
}

/// Emit one predicate against `field`
pub fn emit_predicate<B: TargetBuilder>(
    builder: &mut B,
    field: &str,
    predicate: &Predicate,
    connective: Connective,
) {
    trace!(field = %field, ?predicate, connective = %connective, "emitting predicate");

    match predicate {
        Predicate::Compare { operator, value } => {
            builder.add_predicate(field, operator, value.clone(), connective)
        }
        Predicate::Between { lower, upper } => {
            builder.add_range_predicate(field, lower.clone(), upper.clone(), connective)
        }
        Predicate::In(values) => builder.add_set_predicate(field, values.clone(), connective),
        Predicate::NotIn(values) => {
            builder.add_negated_set_predicate(field, values.clone(), connective)
        }
        Predicate::NotNull => builder.add_not_null_predicate(field, connective),
        Predicate::Search(pattern) => {
            let pattern = Value::String(pattern.clone());
            let strategy = builder.case_insensitive_like();
            if let CaseInsensitiveLike::Operator(operator) = strategy {
                builder.add_predicate(field, operator, pattern, connective);
            } else if let Some(expression) = strategy.raw_expression(field) {
                builder.add_raw_predicate(&expression, pattern, connective);
            }
        }
    }
}

/// Emit parsed having nodes as post-aggregate predicates
pub fn emit_having<B: TargetBuilder>(builder: &mut B, nodes: &[HavingNode]) -> Result<()> {
    for HavingNode { field, predicate } in nodes {
        let (operator, value) = match predicate {
            Predicate::Compare { operator, value } => (operator.clone(), value.clone()),
            Predicate::Between { lower, upper } => (
                "between".to_string(),
                Value::Array(vec![lower.clone(), upper.clone()]),
            ),
            Predicate::In(values) => ("in".to_string(), Value::Array(values.clone())),
            Predicate::NotIn(values) => ("not in".to_string(), Value::Array(values.clone())),
            Predicate::NotNull => ("not null".to_string(), Value::Null),
            Predicate::Search(pattern) => {
                let pattern = Value::String(pattern.clone());
                let strategy = builder.case_insensitive_like();
                if let CaseInsensitiveLike::Operator(operator) = strategy {
                    builder.add_having_predicate(field, operator, pattern, Connective::And);
                } else if let Some(expression) = strategy.raw_expression(field) {
                    builder.add_raw_having_predicate(&expression, pattern, Connective::And)?;
                }
                continue;
            }
        };
        builder.add_having_predicate(field, &operator, value, Connective::And);
    }
    Ok(())
}
