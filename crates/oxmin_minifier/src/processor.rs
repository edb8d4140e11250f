use anyhow::Result;
use log::{debug, info, trace};
use oxmin_core::{
    Artifact, BuildMode, FileStats, MinifierConfig, SourceFile, extract_sizes, is_pre_minified,
    synthesize,
};

use crate::{cache::CachingMinifier, dual::DualEngineMinifier, profile};

/// Where processed files go. Implemented by the host build system.
pub trait OutputSink {
    fn add_javascript(&mut self, artifact: Artifact) -> Result<()>;

    /// Called after every file so the host can run other pending work.
    fn nudge(&mut self) {}
}

impl OutputSink for Vec<Artifact> {
    fn add_javascript(&mut self, artifact: Artifact) -> Result<()> {
        self.push(artifact);
        Ok(())
    }
}

/// Processes the files of one bundle, one at a time, in order.
pub struct BundleProcessor {
    minifier: CachingMinifier,
}

impl BundleProcessor {
    pub fn new(config: MinifierConfig) -> Self {
        Self::with_minifier(CachingMinifier::new(DualEngineMinifier::new(config)))
    }

    pub fn with_minifier(minifier: CachingMinifier) -> Self {
        Self { minifier }
    }

    pub fn minifier(&self) -> &CachingMinifier {
        &self.minifier
    }

    /// Emits one artifact per file into `sink`. The first file that cannot be
    /// minified aborts the whole bundle; nothing after it is emitted.
    pub fn process<S: OutputSink + ?Sized>(
        &self,
        files: &[SourceFile],
        mode: BuildMode,
        sink: &mut S,
    ) -> Result<()> {
        info!("Processing {} files in {:?} mode", files.len(), mode);
        for file in files {
            self.process_file(file, mode, sink)?;
            sink.nudge();
        }
        debug!(
            "Bundle done: cache hits={}, misses={}",
            self.minifier.hits(),
            self.minifier.misses()
        );
        Ok(())
    }

    fn process_file<S: OutputSink + ?Sized>(
        &self,
        file: &SourceFile,
        mode: BuildMode,
        sink: &mut S,
    ) -> Result<()> {
        if is_pre_minified(&file.path) {
            trace!("Keeping pre-minified file as is: {}", file.path);
            return sink.add_javascript(verbatim(file, file.source_map.clone()));
        }

        if mode.is_development() {
            trace!("Development mode, passing through: {}", file.path);
            let map = match &file.source_map {
                Some(map) => map.clone(),
                None => synthesize(&file.contents_as_string(), &file.path),
            };
            return sink.add_javascript(verbatim(file, Some(map)));
        }

        let minified =
            profile::time(profile::minify_label(&file.path), || self.minifier.minify_file(file))?;

        let stats = if self.minifier.config().stats_enabled {
            let tree = profile::time("extract module sizes", || extract_sizes(&minified.code));
            Some(FileStats::for_file(&file.path, &minified.code, tree))
        } else {
            None
        };

        let artifact = Artifact {
            data: minified.code.into_bytes(),
            source_map: minified.map,
            path: file.path.clone(),
            stats,
        };
        profile::time("add javascript", || sink.add_javascript(artifact))
    }
}

fn verbatim(file: &SourceFile, source_map: Option<oxmin_core::SourceMap>) -> Artifact {
    Artifact { data: file.contents.clone(), source_map, path: file.path.clone(), stats: None }
}
