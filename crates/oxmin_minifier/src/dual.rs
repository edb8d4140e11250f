use log::{debug, info, trace, warn};
use oxc_allocator::Allocator;
use oxc_parser::Parser as OxcParser;
use oxc_span::SourceType;
use oxmin_core::{
    FileMinifyError, MinifierConfig, MinifyError, MinifyOutput, SourceFile, synthesize,
};

use crate::engine::{EngineInput, EngineOptions, MinifyEngine};
use crate::oxc_engine::{LenientEngine, StrictEngine};

/// Minifies one file with the strict engine, falling back to the lenient one
/// when the strict engine rejects the input.
pub struct DualEngineMinifier {
    primary: Box<dyn MinifyEngine>,
    fallback: Box<dyn MinifyEngine>,
    config: MinifierConfig,
}

impl DualEngineMinifier {
    pub fn new(config: MinifierConfig) -> Self {
        Self::with_engines(config, Box::new(StrictEngine), Box::new(LenientEngine))
    }

    pub fn with_engines(
        config: MinifierConfig,
        primary: Box<dyn MinifyEngine>,
        fallback: Box<dyn MinifyEngine>,
    ) -> Self {
        Self { primary, fallback, config }
    }

    pub fn config(&self) -> &MinifierConfig {
        &self.config
    }

    /// Engines in the order they are tried, each with its own settings.
    fn attempts(&self) -> [(&dyn MinifyEngine, EngineOptions); 2] {
        let node_env = &self.config.node_env;
        [
            (self.primary.as_ref(), EngineOptions::primary(node_env)),
            (self.fallback.as_ref(), EngineOptions::fallback(node_env)),
        ]
    }

    /// Fails only when both engines fail. The reported error is the primary
    /// engine's, with the fallback engine's error attached to it.
    pub fn minify_one_file(&self, file: &SourceFile) -> Result<MinifyOutput, FileMinifyError> {
        let code = file.contents_as_string();
        let synthesized;
        let input_map = match &file.source_map {
            Some(map) => map,
            None => {
                trace!("No source map for {}, synthesizing one", file.path);
                synthesized = synthesize(&code, &file.path);
                &synthesized
            }
        };

        let [(primary, primary_options), (fallback, fallback_options)] = self.attempts();

        let input = EngineInput { path: &file.path, code: &code, input_map, options: &primary_options };
        let primary_err = match run_checked(primary, &input) {
            Ok(output) => return Ok(output),
            Err(err) => err,
        };
        debug!("{} failed on {}: {}", primary.name(), file.path, primary_err);

        let input = EngineInput { options: &fallback_options, ..input };
        match run_checked(fallback, &input) {
            Ok(output) => {
                info!("Minified {} with {} after: {}", file.path, fallback.name(), primary_err);
                Ok(output)
            }
            Err(fallback_err) => {
                warn!("{} also failed on {}: {}", fallback.name(), file.path, fallback_err);
                Err(FileMinifyError::new(file.path.as_str(), primary_err).with_fallback(fallback_err))
            }
        }
    }
}

/// Runs `engine`, turning a successful but empty result for input that has
/// code in it into a failure.
fn run_checked(
    engine: &dyn MinifyEngine,
    input: &EngineInput<'_>,
) -> Result<MinifyOutput, MinifyError> {
    let output = engine.minify(input)?;
    if output.code.trim().is_empty() && !is_blank(input.code) {
        debug!("{} returned no code for {}", engine.name(), input.path);
        return Err(MinifyError::MalformedResult { engine: engine.name() });
    }
    Ok(output)
}

/// Whitespace and comments only.
fn is_blank(code: &str) -> bool {
    if code.trim().is_empty() {
        return true;
    }
    let allocator = Allocator::default();
    let ret = OxcParser::new(&allocator, code, SourceType::default().with_module(false)).parse();
    !ret.panicked
        && ret.errors.is_empty()
        && ret.program.hashbang.is_none()
        && ret.program.directives.is_empty()
        && ret.program.body.is_empty()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use oxmin_core::SourceMap;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    /// Engine double that either echoes its input or fails, recording calls.
    pub(crate) struct FakeEngine {
        pub(crate) name: &'static str,
        pub(crate) fail_with: Option<String>,
        pub(crate) empty_output: bool,
        pub(crate) calls: Arc<AtomicUsize>,
        pub(crate) seen_sources: Arc<Mutex<Vec<String>>>,
    }

    impl FakeEngine {
        pub(crate) fn ok(name: &'static str) -> Self {
            Self {
                name,
                fail_with: None,
                empty_output: false,
                calls: Arc::new(AtomicUsize::new(0)),
                seen_sources: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub(crate) fn failing(name: &'static str, message: &str) -> Self {
            Self { fail_with: Some(message.to_string()), ..Self::ok(name) }
        }

        pub(crate) fn empty(name: &'static str) -> Self {
            Self { empty_output: true, ..Self::ok(name) }
        }
    }

    impl MinifyEngine for FakeEngine {
        fn name(&self) -> &'static str {
            self.name
        }

        fn minify(&self, input: &EngineInput<'_>) -> Result<MinifyOutput, MinifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let source = input.input_map.get_source(0).unwrap_or_default().to_string();
            self.seen_sources.lock().unwrap().push(source);
            match &self.fail_with {
                Some(message) => {
                    Err(MinifyError::Parse { engine: self.name, message: message.clone() })
                }
                None if self.empty_output => {
                    Ok(MinifyOutput { code: String::new(), map: Some(input.input_map.clone()) })
                }
                None => Ok(MinifyOutput {
                    code: format!("/*{}*/{}", self.name, input.code.trim()),
                    map: Some(input.input_map.clone()),
                }),
            }
        }
    }

    fn minifier(primary: FakeEngine, fallback: FakeEngine) -> DualEngineMinifier {
        DualEngineMinifier::with_engines(
            MinifierConfig::default(),
            Box::new(primary),
            Box::new(fallback),
        )
    }

    #[test]
    fn test_primary_success_skips_fallback() {
        let fallback = FakeEngine::ok("fallback");
        let fallback_calls = Arc::clone(&fallback.calls);
        let m = minifier(FakeEngine::ok("primary"), fallback);

        let out = m.minify_one_file(&SourceFile::new("a.js", "a()")).unwrap();
        assert_eq!(out.code, "/*primary*/a()");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_fallback_result_is_returned() {
        let m = minifier(FakeEngine::failing("primary", "not a module"), FakeEngine::ok("fallback"));
        let out = m.minify_one_file(&SourceFile::new("a.js", "a()")).unwrap();
        assert_eq!(out.code, "/*fallback*/a()");
    }

    #[test]
    fn test_both_fail_reports_primary_error_with_path() {
        let m = minifier(
            FakeEngine::failing("primary", "Unexpected token"),
            FakeEngine::failing("fallback", "something else"),
        );
        let err = m.minify_one_file(&SourceFile::new("packages/x.js", "???")).unwrap_err();
        assert_eq!(err.to_string(), "primary: Unexpected token while minifying packages/x.js");
        assert_eq!(err.path, "packages/x.js");
        assert!(
            matches!(&err.fallback, Some(MinifyError::Parse { message, .. }) if message == "something else")
        );
    }

    #[test]
    fn test_empty_output_falls_back() {
        let m = minifier(FakeEngine::empty("primary"), FakeEngine::ok("fallback"));
        let out = m.minify_one_file(&SourceFile::new("a.js", "console.log(1);")).unwrap();
        assert_eq!(out.code, "/*fallback*/console.log(1);");
    }

    #[test]
    fn test_empty_output_from_both_is_an_error() {
        let m = minifier(FakeEngine::empty("primary"), FakeEngine::empty("fallback"));
        let err = m.minify_one_file(&SourceFile::new("a.js", "console.log(1);")).unwrap_err();
        assert!(matches!(err.primary, MinifyError::MalformedResult { engine: "primary" }));
        assert!(matches!(err.fallback, Some(MinifyError::MalformedResult { engine: "fallback" })));
        assert_eq!(err.to_string(), "primary: minifier returned no usable code while minifying a.js");
    }

    #[test]
    fn test_empty_output_for_blank_input_is_fine() {
        let m = minifier(FakeEngine::empty("primary"), FakeEngine::failing("fallback", "unused"));
        for code in ["", "  \n", "/* license */\n// nothing else\n"] {
            let out = m.minify_one_file(&SourceFile::new("a.js", code)).unwrap();
            assert_eq!(out.code, "");
        }
    }

    #[test]
    fn test_is_blank() {
        assert!(is_blank(""));
        assert!(is_blank("// only a comment"));
        assert!(!is_blank("a()"));
        assert!(!is_blank("\"use strict\";"));
        assert!(!is_blank("var = ;"));
    }

    #[test]
    fn test_missing_map_is_synthesized() {
        let primary = FakeEngine::ok("primary");
        let seen = Arc::clone(&primary.seen_sources);
        let m = minifier(primary, FakeEngine::ok("fallback"));

        let out = m.minify_one_file(&SourceFile::new("app/app.js", "x()")).unwrap();
        assert_eq!(seen.lock().unwrap().as_slice(), ["app/app.js"]);
        let map = out.map.unwrap();
        assert_eq!(map.get_source_contents(0), Some("x()"));
    }

    #[test]
    fn test_existing_map_is_used_by_both_engines() {
        let existing: SourceMap = synthesize("x()", "original/source.js");
        let primary = FakeEngine::failing("primary", "nope");
        let fallback = FakeEngine::ok("fallback");
        let primary_seen = Arc::clone(&primary.seen_sources);
        let fallback_seen = Arc::clone(&fallback.seen_sources);
        let m = minifier(primary, fallback);

        let file = SourceFile::new("app/app.js", "x()").with_source_map(existing);
        m.minify_one_file(&file).unwrap();
        assert_eq!(primary_seen.lock().unwrap().as_slice(), ["original/source.js"]);
        assert_eq!(fallback_seen.lock().unwrap().as_slice(), ["original/source.js"]);
    }

    #[test]
    fn test_real_engines_fall_back_on_sloppy_code() {
        let m = DualEngineMinifier::new(MinifierConfig::default());
        let file = SourceFile::new("packages/legacy.js", "with (obj) { answer = 42; }\n");
        let out = m.minify_one_file(&file).unwrap();
        assert!(out.code.contains("with"));
        assert!(out.map.is_some());
    }

    #[test]
    fn test_real_engines_report_strict_error() {
        let m = DualEngineMinifier::new(MinifierConfig::default());
        let err = m.minify_one_file(&SourceFile::new("broken.js", "var = ;")).unwrap_err();
        assert!(err.to_string().starts_with("oxc-strict: "));
        assert!(err.to_string().ends_with(" while minifying broken.js"));
        assert_eq!(err.fallback.as_ref().map(|e| e.engine()), Some("oxc-lenient"));
    }
}
