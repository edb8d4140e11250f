//! Naming conventions and environment variables shared by the minifier and
//! its hosts.
//!
//! ## Environment
//!
//! - `NODE_ENV`: substituted for `process.env.NODE_ENV` in minified output
//!   (defaults to `development`)
//! - `DISABLE_CLIENT_STATS`: set to exactly `true` to skip size statistics

/// Suffix marking files that are already minified and must never be reprocessed
pub const PRE_MINIFIED_SUFFIX: &str = ".min.js";

/// Environment variable holding the build-time `NODE_ENV` value
pub const NODE_ENV_VAR: &str = "NODE_ENV";

/// Environment variable that turns off per-file size statistics
pub const DISABLE_STATS_VAR: &str = "DISABLE_CLIENT_STATS";

/// `NODE_ENV` value used when the environment does not provide one
pub const DEFAULT_NODE_ENV: &str = "development";

/// Expression replaced by the quoted `NODE_ENV` value during minification
pub const NODE_ENV_EXPRESSION: &str = "process.env.NODE_ENV";

/// Bundle paths that get their own profiling span label
pub const APP_ENTRY_PATH: &str = "app/app.js";
pub const MODULES_LOADER_PATH: &str = "packages/modules.js";

/// Returns true when `path` follows the pre-minified naming convention
pub fn is_pre_minified(path: &str) -> bool {
    path.ends_with(PRE_MINIFIED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_js_is_pre_minified() {
        assert!(is_pre_minified("packages/jquery/jquery.min.js"));
        assert!(is_pre_minified("vendor.min.js"));
    }

    #[test]
    fn test_regular_js_is_not_pre_minified() {
        assert!(!is_pre_minified("app/app.js"));
        assert!(!is_pre_minified("app/min.js"));
        assert!(!is_pre_minified("app/app.min.js.map"));
        assert!(!is_pre_minified("app/app.min.jsx"));
    }
}
