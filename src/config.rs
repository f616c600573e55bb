//! # Compiler Configuration
//!
//! Layered loading with the `config` crate: built-in defaults, then an optional
//! file (format picked by extension), then `QUERY_DIRECTIVES_*` environment
//! variables.
//!
//! ```toml
//! max_nesting_depth = 16
//! literal_columns = ["or"]
//! ```

use crate::error::{DirectiveError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub const ENV_PREFIX: &str = "QUERY_DIRECTIVES";

pub const DEFAULT_MAX_NESTING_DEPTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Deepest allowed `and` / `or` group nesting in a filter
    pub max_nesting_depth: usize,

    /// Filter keys matched as plain columns even when they read `and` / `or`
    pub literal_columns: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
            literal_columns: Vec::new(),
        }
    }
}

impl CompilerConfig {
    /// Defaults overridden by the environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Defaults, then `path` if given, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            config::Config::builder().add_source(config::Config::try_from(&Self::default())?);

        if let Some(path) = path {
            debug!(path = %path.display(), "loading compiler configuration file");
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("literal_columns"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_nesting_depth == 0 {
            return Err(DirectiveError::configuration(
                "max_nesting_depth must be at least 1",
            ));
        }
        if let Some(column) = self
            .literal_columns
            .iter()
            .find(|column| column.trim().is_empty())
        {
            return Err(DirectiveError::configuration(format!(
                "literal_columns contains an empty name: {column:?}"
            )));
        }
        Ok(())
    }

    /// Case-insensitive membership in `literal_columns`
    pub fn is_literal_column(&self, key: &str) -> bool {
        self.literal_columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(key))
    }
}
