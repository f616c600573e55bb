//! # Query Directives
//!
//! Compiles a declarative query description (a JSON mapping of directives) into
//! calls against a [`TargetBuilder`].
//!
//! ## Directives
//!
//! | key | payload |
//! |-----|---------|
//! | `include` | relation names, or `{relation: true \| {where, fields, order}}` |
//! | `where` | filter mapping with `and` / `or` groups and dotted relation paths |
//! | `has` | relation name(s) that must have related rows |
//! | `scopes` | pre-declared scope name(s) from the builder's allow-list |
//! | `fields` | column list |
//! | `order` | `"field"`, `"field desc"`, `{field, direction}` or a list of them |
//! | `limit` | integer |
//! | `offset` / `skip` | integer, `offset` wins |
//! | `groupBy` / `group_by` | column(s), `groupBy` wins |
//! | `having` | single-level filter mapping, `search` included |
//!
//! Directives are applied in the order of the table above. The order only
//! affects the sequence of builder calls, which is visible in generated SQL.
//!
//! ## Example
//!
//! ```rust
//! use query_directives::directives::DirectiveCompiler;
//! use query_directives::query_builder::QueryBuilder;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), query_directives::DirectiveError> {
//! let mut query = QueryBuilder::new("users");
//! DirectiveCompiler::new().apply(
//!     &mut query,
//!     &json!({
//!         "where": {"name": {"like": "%joao%"}, "or": {"foo": "bar", "baz": "qux"}},
//!         "order": "name desc",
//!         "limit": 10
//!     }),
//! )?;
//!
//! assert_eq!(
//!     query.build_sql(),
//!     "SELECT * FROM users WHERE name like '%joao%' AND (foo = 'bar' OR baz = 'qux') \
//!      ORDER BY name DESC LIMIT 10"
//! );
//! # Ok(())
//! # }
//! ```

pub mod clauses;
pub mod description;
pub mod filter;
pub mod includes;
pub mod operators;
pub mod target;

pub use clauses::OrderTerm;
pub use description::QueryDescription;
pub use filter::{FilterNode, FilterParser, HavingNode, Predicate};
pub use includes::{EagerLoad, RelationConfig};
pub use target::{CaseInsensitiveLike, Connective, Dialect, Direction, TargetBuilder};

use crate::config::CompilerConfig;
use crate::error::{DirectiveError, Result};
use crate::logging::{log_compile_failure, log_directive_operation};
use description::directive;
use serde_json::Value;
use tracing::{debug, instrument};

/// Stateless compiler from query descriptions to target builder calls.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads and reused for any number of builders.
#[derive(Debug, Clone, Default)]
pub struct DirectiveCompiler {
    config: CompilerConfig,
}

impl DirectiveCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CompilerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Validate a description without touching any builder
    pub fn compile(&self, description: &Value) -> Result<QueryDescription> {
        QueryDescription::parse(description, &self.config)
    }

    /// Compile `description` onto `builder`, returning the builder for chaining.
    ///
    /// Inclusion support is checked before anything else, and the description is
    /// fully validated before the first builder call; on error the builder is
    /// untouched.
    #[instrument(skip_all, fields(dialect = ?builder.dialect()))]
    pub fn apply<'b, B: TargetBuilder>(
        &self,
        builder: &'b mut B,
        description: &Value,
    ) -> Result<&'b mut B> {
        let wants_include = description
            .get(directive::INCLUDE)
            .is_some_and(|includes| !includes.is_null());
        if wants_include && !builder.supports_inclusion() {
            let error = DirectiveError::unsupported_capability("relation inclusion");
            log_compile_failure(directive::INCLUDE, &error);
            return Err(error);
        }

        let compiled = self.compile(description).inspect_err(|error| {
            log_compile_failure("description", error);
        })?;

        self.apply_compiled(builder, &compiled)?;
        Ok(builder)
    }

    /// Apply an already validated description
    pub fn apply_compiled<B: TargetBuilder>(
        &self,
        builder: &mut B,
        description: &QueryDescription,
    ) -> Result<()> {
        if description.include.is_some() && !builder.supports_inclusion() {
            return Err(DirectiveError::unsupported_capability("relation inclusion"));
        }
        if let Some(unknown) = description
            .scopes
            .iter()
            .find(|scope| !builder.has_scope(scope))
        {
            let error = DirectiveError::unknown_scope(unknown.as_str());
            log_compile_failure(directive::SCOPES, &error);
            return Err(error);
        }

        if description.is_empty() {
            debug!("empty description, builder left unchanged");
            return Ok(());
        }

        if let Some(includes) = &description.include {
            log_directive_operation(directive::INCLUDE, includes.len());
            if !includes.is_empty() {
                builder.eager_load(includes.clone())?;
            }
        }

        if !description.filters.is_empty() {
            log_directive_operation(directive::WHERE, description.filters.len());
            filter::emit_nodes(builder, &description.filters, Connective::And)?;
        }

        for relation in &description.has {
            log_directive_operation(directive::HAS, 1);
            builder.relation_exists(relation, Connective::And);
        }

        for scope in &description.scopes {
            log_directive_operation(directive::SCOPES, 1);
            builder.invoke_scope(scope)?;
        }

        if let Some(fields) = &description.fields {
            log_directive_operation(directive::FIELDS, fields.len());
            builder.set_columns(fields.clone());
        }

        if !description.order.is_empty() {
            log_directive_operation(directive::ORDER, description.order.len());
            clauses::emit_order(builder, &description.order);
        }

        if let Some(limit) = description.limit {
            log_directive_operation(directive::LIMIT, 1);
            builder.set_limit(limit);
        }

        if let Some(offset) = description.offset {
            log_directive_operation(directive::OFFSET, 1);
            builder.set_offset(offset);
        }

        if !description.group_by.is_empty() {
            log_directive_operation(directive::GROUP_BY, description.group_by.len());
            clauses::emit_groups(builder, &description.group_by);
        }

        if !description.having.is_empty() {
            log_directive_operation(directive::HAVING, description.having.len());
            filter::emit_having(builder, &description.having)?;
        }

        Ok(())
    }

    /// Compile a filter mapping onto `builder`, siblings joined by `connective`
    pub fn compile_where<B: TargetBuilder>(
        &self,
        builder: &mut B,
        filter: &Value,
        connective: Connective,
    ) -> Result<()> {
        let nodes = FilterParser::new(&self.config, directive::WHERE).parse(filter)?;
        filter::emit_nodes(builder, &nodes, connective)
    }

    /// Compile an inclusion mapping onto `builder`
    pub fn compile_includes<B: TargetBuilder>(
        &self,
        builder: &mut B,
        includes: &Value,
    ) -> Result<()> {
        if !builder.supports_inclusion() {
            return Err(DirectiveError::unsupported_capability("relation inclusion"));
        }
        let loads = includes::parse_includes(includes, &self.config)?;
        builder.eager_load(loads)
    }
}
