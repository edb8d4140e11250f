use anyhow::{Context, Result};
use log::{debug, trace};
use oxmin_core::{Artifact, FileStats, map_to_json};
use oxmin_minifier::OutputSink;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const STATS_FILE: &str = "stats.json";

/// Writes artifacts under one output directory. Maps go next to their file
/// as `<path>.map`, per-file stats are collected into `stats.json`.
#[derive(Debug)]
pub struct DirSink {
    out_dir: PathBuf,
    stats: FileStats,
    files_written: usize,
    bytes_written: u64,
}

impl DirSink {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stats: FileStats::default(),
            files_written: 0,
            bytes_written: 0,
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    pub fn files_written(&self) -> usize {
        self.files_written
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Writes the collected stats, if any, and returns what was written.
    pub fn finish(self) -> Result<SinkSummary> {
        let stats_written = !self.stats.is_empty();
        if stats_written {
            let path = self.out_dir.join(STATS_FILE);
            let json = serde_json::to_string_pretty(&self.stats)?;
            fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            debug!("Wrote stats for {} files to {}", self.stats.0.len(), path.display());
        }
        Ok(SinkSummary {
            out_dir: self.out_dir,
            files_written: self.files_written,
            bytes_written: self.bytes_written,
            stats_written,
        })
    }
}

impl OutputSink for DirSink {
    fn add_javascript(&mut self, artifact: Artifact) -> Result<()> {
        let target = self.out_dir.join(&artifact.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&target, &artifact.data)
            .with_context(|| format!("Failed to write {}", target.display()))?;

        if let Some(map) = &artifact.source_map {
            let mut map_path = target.clone().into_os_string();
            map_path.push(".map");
            fs::write(&map_path, map_to_json(map)?)
                .with_context(|| format!("Failed to write map for {}", target.display()))?;
        }

        if let Some(stats) = artifact.stats {
            self.stats.extend(stats);
        }

        self.files_written += 1;
        self.bytes_written += artifact.data.len() as u64;
        trace!("Wrote {} ({} bytes)", target.display(), artifact.data.len());
        Ok(())
    }

    fn nudge(&mut self) {
        trace!("{} files written to {}", self.files_written, self.out_dir.display());
    }
}

/// What one bundle left behind in its output directory.
#[derive(Debug, Clone)]
pub struct SinkSummary {
    pub out_dir: PathBuf,
    pub files_written: usize,
    pub bytes_written: u64,
    pub stats_written: bool,
}
