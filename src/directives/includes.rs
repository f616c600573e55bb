//! # Inclusion Compiler
//!
//! Compiles an `include` directive into [`EagerLoad`] entries. A relation with
//! its own `where` / `fields` / `order` carries a [`RelationConfig`]: parsed,
//! validated sub-directives the target builder applies to the relation's own
//! sub-query when it materializes that relation. The compiler never applies
//! them itself.

use super::clauses::{emit_order, parse_columns, parse_order, OrderTerm};
use super::filter::{emit_nodes, FilterNode, FilterParser};
use super::target::{Connective, TargetBuilder};
use crate::config::CompilerConfig;
use crate::error::{DirectiveError, Result};
use serde_json::{Map, Value};
use std::sync::Arc;

const DIRECTIVE: &str = "include";

/// Deferred configuration for one eager-loaded relation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RelationConfig {
    pub filters: Vec<FilterNode>,
    pub columns: Option<Vec<String>>,
    pub order: Vec<OrderTerm>,
}

impl RelationConfig {
    /// Parse `{where?, fields?, order?}` under `CompilerConfig::default()`;
    /// use [`RelationConfig::from_value_with`] to honour a loaded configuration
    pub fn from_value(payload: &Value) -> Result<Self> {
        Self::from_value_with(payload, &CompilerConfig::default())
    }

    /// Parse `{where?, fields?, order?}` under `config`
    pub fn from_value_with(payload: &Value, config: &CompilerConfig) -> Result<Self> {
        let entries = payload.as_object().ok_or_else(|| {
            DirectiveError::invalid_argument(DIRECTIVE, "relation configuration must be a mapping")
        })?;
        Self::parse(entries, config)
    }

    pub(crate) fn parse(entries: &Map<String, Value>, config: &CompilerConfig) -> Result<Self> {
        let mut relation = Self::default();

        if let Some(filter) = non_empty(entries.get("where")) {
            relation.filters = FilterParser::new(config, DIRECTIVE).parse(filter)?;
        }
        if let Some(columns) = non_empty(entries.get("fields")) {
            relation.columns = Some(parse_columns(columns, DIRECTIVE)?);
        }
        if let Some(order) = non_empty(entries.get("order")) {
            relation.order = parse_order(order)?;
        }

        Ok(relation)
    }

    /// Apply to the relation's sub-query: where, then fields, then order
    pub fn apply<B: TargetBuilder>(&self, builder: &mut B) -> Result<()> {
        emit_nodes(builder, &self.filters, Connective::And)?;
        if let Some(columns) = &self.columns {
            builder.set_columns(columns.clone());
        }
        emit_order(builder, &self.order);
        Ok(())
    }
}

/// One relation to eager-load, optionally with deferred configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EagerLoad {
    pub relation: String,
    pub config: Option<Arc<RelationConfig>>,
}

impl EagerLoad {
    pub fn plain(relation: impl Into<String>) -> Self {
        Self {
            relation: relation.into(),
            config: None,
        }
    }

    pub fn configured(relation: impl Into<String>, config: RelationConfig) -> Self {
        Self {
            relation: relation.into(),
            config: Some(Arc::new(config)),
        }
    }

    pub fn is_plain(&self) -> bool {
        self.config.is_none()
    }
}

/// Parse an `include` directive into eager loads, in insertion order
pub fn parse_includes(includes: &Value, config: &CompilerConfig) -> Result<Vec<EagerLoad>> {
    match includes {
        Value::String(relation) => Ok(vec![EagerLoad::plain(relation.clone())]),
        Value::Array(relations) => relations
            .iter()
            .map(|relation| match relation {
                Value::String(name) => Ok(EagerLoad::plain(name.clone())),
                other => Err(DirectiveError::invalid_argument(
                    DIRECTIVE,
                    format!("relation names must be strings, got {other}"),
                )),
            })
            .collect(),
        Value::Object(relations) => {
            let mut loads = Vec::with_capacity(relations.len());
            for (name, payload) in relations {
                if let Some(load) = parse_relation(name, payload, config)? {
                    loads.push(load);
                }
            }
            Ok(loads)
        }
        other => Err(DirectiveError::invalid_argument(
            DIRECTIVE,
            format!("expected a relation name, list or mapping, got {other}"),
        )),
    }
}

fn parse_relation(
    name: &str,
    payload: &Value,
    config: &CompilerConfig,
) -> Result<Option<EagerLoad>> {
    match payload {
        Value::Null | Value::Bool(false) => Ok(None),
        Value::Bool(true) => Ok(Some(EagerLoad::plain(name))),
        // sequential keys from a list serialized as a mapping: {"0": "roles"}
        Value::String(relation) if name.parse::<usize>().is_ok() => {
            Ok(Some(EagerLoad::plain(relation.clone())))
        }
        Value::Object(entries) => {
            let configured = ["where", "fields", "order"]
                .iter()
                .any(|key| non_empty(entries.get(*key)).is_some());
            if !configured {
                return Ok(Some(EagerLoad::plain(name)));
            }
            let relation = RelationConfig::parse(entries, config)?;
            Ok(Some(EagerLoad::configured(name, relation)))
        }
        other => Err(DirectiveError::invalid_argument(
            DIRECTIVE,
            format!("relation '{name}' expects true or a mapping, got {other}"),
        )),
    }
}

fn non_empty(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(entries) => !entries.is_empty(),
        _ => true,
    })
}
