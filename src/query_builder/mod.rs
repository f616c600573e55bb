//! # Query Builder
//!
//! Reference target for the directive compiler: a fluent builder that renders
//! SQL text.
//!
//! ## Key Components
//!
//! - [`builder`] - Core query builder with SQL generation
//! - [`conditions`] - WHERE / HAVING clause trees
//! - [`relations`] - Named relations and their EXISTS subqueries
//! - [`pagination`] - LIMIT/OFFSET
//! - [`scopes`] - Named scope allow-list and stock scopes
//!
//! Two flavours exist. [`QueryBuilder::new`] is a plain data query and rejects
//! eager loading; [`QueryBuilder::entity`] is relation aware and records eager
//! loads, materializing each one on demand through
//! [`QueryBuilder::relation_query`].
//!
//! ## Example Usage
//!
//! ```rust
//! use query_directives::query_builder::{QueryBuilder, RelationDef};
//! use serde_json::json;
//!
//! let sql = QueryBuilder::new("users")
//!     .relation("roles", RelationDef::new("roles", "roles.user_id = users.id"))
//!     .where_eq("active", json!(true))
//!     .has("roles")
//!     .order_asc("name")
//!     .build_sql();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM users WHERE active = true \
//!      AND EXISTS (SELECT 1 FROM roles WHERE roles.user_id = users.id) ORDER BY name ASC"
//! );
//! ```

pub mod builder;
pub mod conditions;
pub mod pagination;
pub mod relations;
pub mod scopes;

pub use builder::{QueryBuilder, QueryComponents};
pub use conditions::{Condition, WhereClause};
pub use pagination::Pagination;
pub use relations::{RelationDef, RelationMap};
pub use scopes::{ScopeFn, ScopeRegistry};
