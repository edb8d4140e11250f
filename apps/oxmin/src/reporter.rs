use crate::writer::SinkSummary;
use colored::Colorize;
use log::debug;
use std::io::{self, Write};
use std::path::PathBuf;

/// Outcome of processing one bundle directory.
#[derive(Debug)]
pub enum BundleOutcome {
    Written { bundle: PathBuf, summary: SinkSummary },
    Failed { bundle: PathBuf, error: anyhow::Error },
}

impl BundleOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, BundleOutcome::Failed { .. })
    }
}

pub fn print_outcomes<W: Write>(writer: &mut W, outcomes: &[BundleOutcome]) -> io::Result<()> {
    debug!("Reporting {} bundle outcomes", outcomes.len());
    for outcome in outcomes {
        match outcome {
            BundleOutcome::Written { bundle, summary } => {
                writeln!(
                    writer,
                    "{} {} → {} ({} files, {})",
                    "✓".green().bold(),
                    bundle.display().to_string().blue(),
                    summary.out_dir.display(),
                    summary.files_written.to_string().cyan(),
                    format_bytes(summary.bytes_written).cyan()
                )?;
                if summary.stats_written {
                    writeln!(writer, "{}  size statistics written", "└──".dimmed())?;
                }
            }
            BundleOutcome::Failed { bundle, error } => {
                writeln!(
                    writer,
                    "{} {} failed",
                    "⚠".yellow().bold(),
                    bundle.display().to_string().bright_white().bold()
                )?;
                for (idx, cause) in error.chain().enumerate() {
                    let prefix = if idx == 0 { "└──" } else { "   " };
                    writeln!(writer, "{}  {}", prefix.dimmed(), cause.to_string().red())?;
                }
            }
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn print_cache_line<W: Write>(writer: &mut W, hits: usize, misses: usize) -> io::Result<()> {
    writeln!(
        writer,
        "  Minifier cache: {} hits, {} misses",
        hits.to_string().green(),
        misses.to_string().yellow()
    )
}

fn format_bytes(bytes: u64) -> String {
    const KIB: u64 = 1024;
    const MIB: u64 = KIB * 1024;
    if bytes >= MIB {
        format!("{:.1} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.1} KiB", bytes as f64 / KIB as f64)
    } else {
        format!("{bytes} B")
    }
}
