use std::borrow::Cow;

use sourcemap::SourceMap;

use crate::stats::FileStats;

/// One resolved input file handed over by the host build system.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Logical path inside the bundle, unique within one build
    pub path: String,
    pub contents: Vec<u8>,
    pub source_map: Option<SourceMap>,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, contents: impl Into<Vec<u8>>) -> Self {
        Self { path: path.into(), contents: contents.into(), source_map: None }
    }

    pub fn with_source_map(mut self, map: SourceMap) -> Self {
        self.source_map = Some(map);
        self
    }

    pub fn contents_as_string(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.contents)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Development,
    Production,
}

impl BuildMode {
    pub fn is_development(self) -> bool {
        matches!(self, BuildMode::Development)
    }
}

impl From<&str> for BuildMode {
    /// Anything other than exactly `development` minifies.
    fn from(mode: &str) -> Self {
        if mode == "development" {
            BuildMode::Development
        } else {
            BuildMode::Production
        }
    }
}

/// Code and map produced by a successful minification.
#[derive(Debug, Clone)]
pub struct MinifyOutput {
    pub code: String,
    pub map: Option<SourceMap>,
}

/// Output registered back into the build for one input file.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub data: Vec<u8>,
    pub source_map: Option<SourceMap>,
    pub path: String,
    pub stats: Option<FileStats>,
}
