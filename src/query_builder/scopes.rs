//! Named, pre-declared query scopes.
//!
//! A [`ScopeRegistry`] is the builder's allow-list: the `scopes` directive can
//! only invoke names registered here.

use super::QueryBuilder;
use crate::directives::{Connective, TargetBuilder};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

pub type ScopeFn = Arc<dyn Fn(&mut QueryBuilder) + Send + Sync>;

#[derive(Clone, Default)]
pub struct ScopeRegistry {
    scopes: BTreeMap<String, ScopeFn>,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `scope` under `name`, replacing any previous entry
    pub fn register<F>(mut self, name: &str, scope: F) -> Self
    where
        F: Fn(&mut QueryBuilder) + Send + Sync + 'static,
    {
        self.scopes.insert(name.to_string(), Arc::new(scope));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.scopes.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&ScopeFn> {
        self.scopes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scopes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

impl fmt::Debug for ScopeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// Rows whose `column` is set
pub fn not_null(column: &str) -> impl Fn(&mut QueryBuilder) + Send + Sync + 'static {
    let column = column.to_string();
    move |query: &mut QueryBuilder| query.add_not_null_predicate(&column, Connective::And)
}

/// Rows whose `column` equals `value`
pub fn equals(
    column: &str,
    value: serde_json::Value,
) -> impl Fn(&mut QueryBuilder) + Send + Sync + 'static {
    let column = column.to_string();
    move |query: &mut QueryBuilder| {
        query.add_predicate(&column, "=", value.clone(), Connective::And)
    }
}

/// Rows whose timestamp `column` is later than `since`
pub fn created_since(
    column: &str,
    since: DateTime<Utc>,
) -> impl Fn(&mut QueryBuilder) + Send + Sync + 'static {
    let column = column.to_string();
    let since = serde_json::Value::String(since.to_rfc3339());
    move |query: &mut QueryBuilder| {
        query.add_predicate(&column, ">", since.clone(), Connective::And)
    }
}
