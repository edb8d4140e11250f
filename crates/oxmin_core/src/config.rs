use log::{debug, trace};
use std::env;

use crate::constants::{DEFAULT_NODE_ENV, DISABLE_STATS_VAR, NODE_ENV_VAR};

/// Settings for one minifier instance, resolved once and passed in explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinifierConfig {
    /// Value substituted for `process.env.NODE_ENV`
    pub node_env: String,
    /// Whether per-file size statistics are computed and attached
    pub stats_enabled: bool,
}

impl Default for MinifierConfig {
    fn default() -> Self {
        Self { node_env: DEFAULT_NODE_ENV.to_string(), stats_enabled: true }
    }
}

impl MinifierConfig {
    pub fn from_env() -> Self {
        debug!("Reading minifier config from environment");
        Self::from_vars(env::var(NODE_ENV_VAR).ok(), env::var(DISABLE_STATS_VAR).ok())
    }

    /// Builds the config from raw variable values. An empty `NODE_ENV` counts
    /// as unset, and stats stay on unless the disable flag is exactly `true`.
    pub fn from_vars(node_env: Option<String>, disable_stats: Option<String>) -> Self {
        let node_env = node_env
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_NODE_ENV.to_string());
        let stats_enabled = disable_stats.as_deref() != Some("true");
        trace!("Resolved NODE_ENV={:?}, stats_enabled={}", node_env, stats_enabled);
        Self { node_env, stats_enabled }
    }

    pub fn with_node_env(mut self, node_env: impl Into<String>) -> Self {
        self.node_env = node_env.into();
        self
    }

    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.stats_enabled = enabled;
        self
    }
}
