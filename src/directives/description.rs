//! Typed form of a query description.
//!
//! [`QueryDescription::parse`] validates every directive up front, so applying
//! a parsed description never fails on shape.

use super::clauses::{parse_bound, parse_columns, parse_names, parse_order, OrderTerm};
use super::filter::{FilterNode, FilterParser, HavingNode};
use super::includes::{parse_includes, EagerLoad};
use crate::config::CompilerConfig;
use crate::error::{DirectiveError, Result};
use serde_json::{Map, Value};

/// Recognized directive keys; matching is exact and case-sensitive
pub mod directive {
    pub const INCLUDE: &str = "include";
    pub const WHERE: &str = "where";
    pub const HAS: &str = "has";
    pub const SCOPES: &str = "scopes";
    pub const FIELDS: &str = "fields";
    pub const ORDER: &str = "order";
    pub const LIMIT: &str = "limit";
    pub const OFFSET: &str = "offset";
    pub const SKIP: &str = "skip";
    pub const GROUP_BY: &str = "groupBy";
    pub const GROUP_BY_SNAKE: &str = "group_by";
    pub const HAVING: &str = "having";
}

/// A validated query description, ready to be applied to any target builder
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryDescription {
    pub include: Option<Vec<EagerLoad>>,
    pub filters: Vec<FilterNode>,
    pub has: Vec<String>,
    pub scopes: Vec<String>,
    pub fields: Option<Vec<String>>,
    pub order: Vec<OrderTerm>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub group_by: Vec<String>,
    pub having: Vec<HavingNode>,
}

impl QueryDescription {
    /// Parse a description mapping. Unknown keys and null directives are ignored.
    pub fn parse(description: &Value, config: &CompilerConfig) -> Result<Self> {
        let entries = description.as_object().ok_or_else(|| {
            DirectiveError::invalid_argument(
                "description",
                format!("expected a mapping of directives, got {description}"),
            )
        })?;

        let mut parsed = Self::default();

        if let Some(includes) = present(entries, directive::INCLUDE) {
            parsed.include = Some(parse_includes(includes, config)?);
        }
        if let Some(filter) = present(entries, directive::WHERE) {
            parsed.filters = FilterParser::new(config, directive::WHERE).parse(filter)?;
        }
        if let Some(relations) = present(entries, directive::HAS) {
            parsed.has = parse_names(relations, directive::HAS)?;
        }
        if let Some(scopes) = present(entries, directive::SCOPES) {
            parsed.scopes = parse_names(scopes, directive::SCOPES)?;
        }
        if let Some(fields) = present(entries, directive::FIELDS) {
            parsed.fields = Some(parse_columns(fields, directive::FIELDS)?);
        }
        if let Some(order) = present(entries, directive::ORDER) {
            parsed.order = parse_order(order)?;
        }
        if let Some(limit) = present(entries, directive::LIMIT) {
            parsed.limit = Some(parse_bound(limit, directive::LIMIT)?);
        }

        let offset = present(entries, directive::OFFSET)
            .map(|offset| (directive::OFFSET, offset))
            .or_else(|| present(entries, directive::SKIP).map(|skip| (directive::SKIP, skip)));
        if let Some((key, offset)) = offset {
            parsed.offset = Some(parse_bound(offset, key)?);
        }

        let group_by = present(entries, directive::GROUP_BY)
            .map(|groups| (directive::GROUP_BY, groups))
            .or_else(|| {
                present(entries, directive::GROUP_BY_SNAKE)
                    .map(|groups| (directive::GROUP_BY_SNAKE, groups))
            });
        if let Some((key, groups)) = group_by {
            parsed.group_by = parse_columns(groups, key)?;
        }

        if let Some(having) = present(entries, directive::HAVING) {
            parsed.having = FilterParser::new(config, directive::HAVING).parse_having(having)?;
        }

        Ok(parsed)
    }

    /// True when applying this description would not touch a builder
    pub fn is_empty(&self) -> bool {
        self.include.is_none()
            && self.filters.is_empty()
            && self.has.is_empty()
            && self.scopes.is_empty()
            && self.fields.is_none()
            && self.order.is_empty()
            && self.limit.is_none()
            && self.offset.is_none()
            && self.group_by.is_empty()
            && self.having.is_empty()
    }
}

fn present<'a>(entries: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    entries.get(key).filter(|value| !value.is_null())
}
