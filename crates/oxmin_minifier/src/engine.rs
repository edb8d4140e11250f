use oxmin_core::{MinifyError, MinifyOutput, NODE_ENV_EXPRESSION, SourceMap};

/// Compression settings handed to an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    /// ECMAScript edition the output must run on, e.g. `5` or `2015`
    pub ecma: u16,
    pub dead_code: bool,
    /// Remove unused bindings
    pub unused: bool,
    /// Fold branches on `typeof` checks. The oxc engines have no such switch
    /// and never read it.
    pub typeofs: bool,
    pub drop_debugger: bool,
    /// Work around Safari 10 bugs. The oxc engines have no such switch and
    /// never read it; the ES5 target already avoids the affected syntax.
    pub safari10: bool,
    /// Embed original sources in the output map instead of only merging positions
    pub inline_sources_content: bool,
    /// Expressions replaced by JS source text, e.g. `process.env.NODE_ENV`
    pub global_defs: Vec<(String, String)>,
}

impl EngineOptions {
    /// Settings for the strict engine, which gets to be aggressive.
    pub fn primary(node_env: &str) -> Self {
        Self {
            ecma: 5,
            dead_code: true,
            unused: true,
            // Code checks `typeof` against undeclared globals at runtime
            typeofs: false,
            drop_debugger: false,
            safari10: true,
            inline_sources_content: true,
            global_defs: node_env_defs(node_env),
        }
    }

    /// Settings for the lenient engine. Files only get here after the strict
    /// parser rejected them, so unused bindings are kept.
    pub fn fallback(node_env: &str) -> Self {
        Self {
            ecma: 5,
            dead_code: true,
            unused: false,
            typeofs: false,
            drop_debugger: false,
            safari10: true,
            inline_sources_content: false,
            global_defs: node_env_defs(node_env),
        }
    }
}

fn node_env_defs(node_env: &str) -> Vec<(String, String)> {
    let literal = serde_json::Value::String(node_env.to_string()).to_string();
    vec![(NODE_ENV_EXPRESSION.to_string(), literal)]
}

/// Everything an engine needs to minify one file.
#[derive(Debug, Clone, Copy)]
pub struct EngineInput<'a> {
    pub path: &'a str,
    pub code: &'a str,
    /// Maps `code` back to its original sources
    pub input_map: &'a SourceMap,
    pub options: &'a EngineOptions,
}

/// A minifier that turns source text plus an input map into minified code
/// plus a map pointing at the original sources.
pub trait MinifyEngine: Send + Sync {
    fn name(&self) -> &'static str;

    fn minify(&self, input: &EngineInput<'_>) -> Result<MinifyOutput, MinifyError>;
}
