//! Serializer configuration.
//!
//! Configuration can be built in code, read from the environment, or loaded
//! from a TOML document with a `[serializer]` table:
//!
//! ```toml
//! [serializer]
//! filter_only = "reject"
//! pretty = true
//! ```

use std::env;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{QueryError, QueryResult};

/// What to do with a query node that carries a filter but no query clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOnlyPolicy {
    /// Drop the filter and emit the bare (empty) query shape.
    #[default]
    Drop,
    /// Fail serialization with a `FilterWithoutQuery` error.
    Reject,
}

impl FilterOnlyPolicy {
    /// Policy name as used in configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Drop => "drop",
            Self::Reject => "reject",
        }
    }
}

impl fmt::Display for FilterOnlyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOnlyPolicy {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "drop" => Ok(Self::Drop),
            "reject" => Ok(Self::Reject),
            other => Err(QueryError::invalid_configuration(format!(
                "unknown filter-only policy '{}'",
                other
            ))
            .with_field("filter_only")
            .with_suggestion("Use 'drop' or 'reject'")),
        }
    }
}

/// Serializer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DslConfig {
    /// Handling of filter-only query nodes.
    pub filter_only: FilterOnlyPolicy,
    /// Pretty-print string output.
    pub pretty: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    serializer: DslConfig,
}

impl DslConfig {
    /// Create a builder for configuration.
    pub fn builder() -> DslConfigBuilder {
        DslConfigBuilder::new()
    }

    /// Read configuration from `ESDSL_FILTER_ONLY` and `ESDSL_PRETTY`.
    ///
    /// Unset variables keep their defaults.
    pub fn from_env() -> QueryResult<Self> {
        let mut config = Self::default();
        if let Ok(policy) = env::var("ESDSL_FILTER_ONLY") {
            config.filter_only = policy.parse()?;
        }
        if let Ok(pretty) = env::var("ESDSL_PRETTY") {
            config.pretty = matches!(pretty.to_lowercase().as_str(), "true" | "1" | "yes");
        }
        Ok(config)
    }

    /// Load the `[serializer]` table of a TOML document.
    ///
    /// A document without the table yields the default configuration.
    pub fn from_toml_str(source: &str) -> QueryResult<Self> {
        let file: ConfigFile = toml::from_str(source).map_err(|e| {
            QueryError::invalid_configuration("failed to parse serializer configuration")
                .with_source(e)
        })?;
        Ok(file.serializer)
    }
}

/// Builder for [`DslConfig`].
#[derive(Debug, Default)]
pub struct DslConfigBuilder {
    filter_only: Option<FilterOnlyPolicy>,
    pretty: Option<bool>,
}

impl DslConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter-only policy.
    pub fn filter_only(mut self, policy: FilterOnlyPolicy) -> Self {
        self.filter_only = Some(policy);
        self
    }

    /// Enable or disable pretty-printed output.
    pub fn pretty(mut self, enabled: bool) -> Self {
        self.pretty = Some(enabled);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> DslConfig {
        DslConfig {
            filter_only: self.filter_only.unwrap_or_default(),
            pretty: self.pretty.unwrap_or(false),
        }
    }
}
