#![allow(clippy::doc_markdown)] // Allow technical terms like PostgreSQL, MySQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Query Directives
//!
//! Compiles a declarative query description, a JSON mapping of directives such
//! as `where`, `include`, `order` and `limit`, into calls on a fluent query
//! builder.
//!
//! ## Overview
//!
//! A client describes the query it wants as data; the compiler validates the
//! whole description and then replays it onto any builder implementing
//! [`TargetBuilder`]. Filters support `and` / `or` groups, operator aliases
//! (`eq`, `neq`, `gt`, `gte`, `lt`, `lte`, `nlike`, `inq`, `nin`, `nn` /
//! `notnull`), ranges, sets, a dialect-aware `search` and dotted relation paths
//! such as `"roles.name"`. Any other operator token is passed through
//! lower-cased.
//!
//! ## Module Organization
//!
//! - [`directives`] - The compiler: description parsing, filters, inclusions, clauses
//! - [`query_builder`] - Reference SQL-rendering target builder
//! - [`config`] - Compiler configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use query_directives::{DirectiveCompiler, QueryBuilder};
//! use serde_json::json;
//!
//! # fn main() -> query_directives::Result<()> {
//! let mut query = QueryBuilder::new("users");
//! DirectiveCompiler::new().apply(
//!     &mut query,
//!     &json!({"where": {"age": {"gte": 18}}, "fields": ["id", "name"], "limit": 5}),
//! )?;
//!
//! assert_eq!(query.build_sql(), "SELECT id, name FROM users WHERE age >= 18 LIMIT 5");
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # All tests, including property-based tests
//! ```

pub mod config;
pub mod directives;
pub mod error;
pub mod logging;
pub mod query_builder;

pub use config::CompilerConfig;
pub use directives::{
    CaseInsensitiveLike, Connective, Dialect, Direction, DirectiveCompiler, EagerLoad,
    QueryDescription, RelationConfig, TargetBuilder,
};
pub use error::{DirectiveError, Result};
pub use query_builder::{QueryBuilder, QueryComponents, RelationDef, ScopeRegistry};
