//! Per-file JavaScript minification with source maps and a fallback engine.
//!
//! Each file of a bundle is minified on its own (never concatenated). The
//! strict engine runs first; input it rejects is retried with the lenient
//! engine, and a file only fails when both engines fail.
//!
//! # Examples
//!
//! ```no_run
//! use oxmin_core::{Artifact, BuildMode, MinifierConfig, SourceFile};
//! use oxmin_minifier::BundleProcessor;
//!
//! # fn main() -> anyhow::Result<()> {
//! let processor = BundleProcessor::new(MinifierConfig::from_env());
//! let files = vec![SourceFile::new("app/app.js", "var x = 1; console.log(x);")];
//!
//! let mut artifacts: Vec<Artifact> = Vec::new();
//! processor.process(&files, BuildMode::Production, &mut artifacts)?;
//! # Ok(())
//! # }
//! ```

mod cache;
mod dual;
mod engine;
mod oxc_engine;
mod processor;
pub mod profile;

// Re-export public API
pub use cache::CachingMinifier;
pub use dual::DualEngineMinifier;
pub use engine::{EngineInput, EngineOptions, MinifyEngine};
pub use oxc_engine::{LenientEngine, StrictEngine};
pub use processor::{BundleProcessor, OutputSink};
