//! Core building blocks for oxmin.
//!
//! This crate holds everything the minification orchestrator needs that does
//! not depend on a particular minifier:
//! - The file, mode and artifact types exchanged with the host build
//! - Identity source map synthesis for files that arrive without a map
//! - Source map composition (minified -> input -> original)
//! - Per-module size statistics extracted from minified code
//! - Configuration resolved from the environment

mod config;
mod constants;
mod error;
mod package_map;
mod remap;
mod stats;
mod types;

// Re-export public API
pub use config::MinifierConfig;
pub use constants::{
    APP_ENTRY_PATH, DEFAULT_NODE_ENV, DISABLE_STATS_VAR, MODULES_LOADER_PATH, NODE_ENV_EXPRESSION,
    NODE_ENV_VAR, PRE_MINIFIED_SUFFIX, is_pre_minified,
};
pub use error::{FileMinifyError, MinifyError};
pub use package_map::synthesize;
pub use remap::{OriginalPosition, compose, map_to_json, original_position};
pub use stats::{
    FileStats, MeteorInstallRecognizer, ModuleRecognizer, SizeNode, SizeTree, extract_sizes,
    extract_sizes_with, leaf_total,
};
pub use types::{Artifact, BuildMode, MinifyOutput, SourceFile};

pub use sourcemap::SourceMap;
