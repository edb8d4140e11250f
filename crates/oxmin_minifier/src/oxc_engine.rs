use log::{debug, trace};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions, CodegenReturn, CommentOptions};
use oxc_compat::EngineTargets;
use oxc_minifier::{
    CompressOptions, CompressOptionsUnused, MangleOptions, Minifier, MinifierOptions,
};
use oxc_parser::{Parser as OxcParser, ParserReturn};
use oxc_semantic::{SemanticBuilder, SemanticBuilderReturn};
use oxc_span::SourceType;
use oxc_transformer_plugins::{ReplaceGlobalDefines, ReplaceGlobalDefinesConfig};
use oxmin_core::{MinifyError, MinifyOutput, SourceMap, compose};
use std::path::PathBuf;

use crate::engine::{EngineInput, MinifyEngine};

/// Primary engine: parses every file as an ES module and rejects anything the
/// module grammar or strict mode forbids.
#[derive(Debug, Default, Clone, Copy)]
pub struct StrictEngine;

/// Fallback engine: parses as a classic script, so sloppy-mode code such as
/// `with` statements or legacy octal literals still minifies.
#[derive(Debug, Default, Clone, Copy)]
pub struct LenientEngine;

impl MinifyEngine for StrictEngine {
    fn name(&self) -> &'static str {
        "oxc-strict"
    }

    fn minify(&self, input: &EngineInput<'_>) -> Result<MinifyOutput, MinifyError> {
        let pipeline = Pipeline {
            engine: self.name(),
            source_type: SourceType::default().with_module(true),
            check_syntax: true,
        };
        pipeline.run(input)
    }
}

impl MinifyEngine for LenientEngine {
    fn name(&self) -> &'static str {
        "oxc-lenient"
    }

    fn minify(&self, input: &EngineInput<'_>) -> Result<MinifyOutput, MinifyError> {
        let pipeline = Pipeline {
            engine: self.name(),
            source_type: SourceType::default().with_module(false),
            check_syntax: false,
        };
        pipeline.run(input)
    }
}

struct Pipeline {
    engine: &'static str,
    source_type: SourceType,
    /// Report early errors (strict mode violations and the like) found
    /// during semantic analysis, not just grammar errors
    check_syntax: bool,
}

impl Pipeline {
    fn parse_error(&self, messages: impl IntoIterator<Item = String>) -> MinifyError {
        let messages: Vec<String> = messages.into_iter().collect();
        let message = if messages.is_empty() {
            "parser aborted".to_string()
        } else {
            messages.join("; ")
        };
        MinifyError::Parse { engine: self.engine, message }
    }

    fn run(&self, input: &EngineInput<'_>) -> Result<MinifyOutput, MinifyError> {
        trace!("{}: minifying {}", self.engine, input.path);
        let options = input.options;
        let allocator = Allocator::default();

        let ParserReturn { mut program, errors, panicked, .. } =
            OxcParser::new(&allocator, input.code, self.source_type).parse();
        if panicked || !errors.is_empty() {
            debug!("{}: {} parse errors in {}", self.engine, errors.len(), input.path);
            return Err(self.parse_error(errors.iter().map(|e| e.to_string())));
        }

        let SemanticBuilderReturn { semantic, errors: semantic_errors, .. } =
            SemanticBuilder::new().with_check_syntax_error(self.check_syntax).build(&program);
        if !semantic_errors.is_empty() {
            debug!("{}: {} syntax errors in {}", self.engine, semantic_errors.len(), input.path);
            return Err(self.parse_error(semantic_errors.iter().map(|e| e.to_string())));
        }
        let scoping = semantic.into_scoping();

        if !options.global_defs.is_empty() {
            let config = ReplaceGlobalDefinesConfig::new(options.global_defs.as_slice())
                .map_err(|errs| self.parse_error(errs.iter().map(|e| e.to_string())))?;
            ReplaceGlobalDefines::new(&allocator, config).build(scoping, &mut program);
        }

        let target = EngineTargets::from_target(&format!("es{}", options.ecma))
            .map_err(|e| MinifyError::Options { engine: self.engine, message: e.to_string() })?;
        let compress = CompressOptions {
            target,
            drop_debugger: options.drop_debugger,
            unused: if options.unused {
                CompressOptionsUnused::Remove
            } else {
                CompressOptionsUnused::Keep
            },
            ..CompressOptions::default()
        };
        let minifier_options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: options.dead_code.then_some(compress),
        };
        let minified = Minifier::new(minifier_options).minify(&allocator, &mut program);

        let CodegenReturn { code, map, .. } = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                source_map_path: Some(PathBuf::from(input.path)),
                ..CodegenOptions::default()
            })
            .with_scoping(minified.scoping)
            .build(&program);

        let Some(map) = map else {
            return Err(MinifyError::MalformedResult { engine: self.engine });
        };
        let generated = SourceMap::from_slice(map.to_json_string().as_bytes()).map_err(|e| {
            MinifyError::Codegen { engine: self.engine, message: e.to_string() }
        })?;
        let map =
            compose(&generated, input.input_map, Some(input.path), options.inline_sources_content);

        debug!(
            "{}: {} minified from {} to {} bytes",
            self.engine,
            input.path,
            input.code.len(),
            code.len()
        );
        Ok(MinifyOutput { code, map: Some(map) })
    }
}
