mod config;
mod loader;
mod reporter;
mod writer;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use config::Config;
use log::{debug, info};
use oxmin_minifier::BundleProcessor;
use rayon::prelude::*;
use reporter::BundleOutcome;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use writer::{DirSink, SinkSummary};

#[derive(Parser)]
#[command(name = "oxmin")]
#[command(about = "Per-file JavaScript minification for built bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Minify every JavaScript file of one or more bundle directories
    Minify(Config),
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    // See https://github.com/rust-lang/rust/issues/60673
    let mut stdout = BufWriter::new(std::io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    let start = Instant::now();

    match cli.command {
        Commands::Minify(cfg) => {
            let num_threads = rayon::current_num_threads();
            let mode = cfg.build_mode();
            let minifier_config = cfg.minifier_config();
            info!(
                "Minifying {} bundles in {:?} mode (NODE_ENV={}, using {} threads)",
                cfg.bundles.len(),
                mode,
                minifier_config.node_env,
                num_threads
            );

            let processor = BundleProcessor::new(minifier_config);
            let outcomes: Vec<BundleOutcome> = cfg
                .bundles
                .par_iter()
                .map(|bundle| match process_bundle(&processor, bundle, &cfg) {
                    Ok(summary) => BundleOutcome::Written { bundle: bundle.clone(), summary },
                    Err(error) => BundleOutcome::Failed { bundle: bundle.clone(), error },
                })
                .collect();

            reporter::print_outcomes(&mut stdout, &outcomes)?;
            reporter::print_cache_line(
                &mut stdout,
                processor.minifier().hits(),
                processor.minifier().misses(),
            )?;

            let elapsed_ms = start.elapsed().as_millis();
            writeln!(
                stdout,
                "\n{} Finished in {}ms on {} bundles (using {} threads).",
                "●".bright_blue(),
                elapsed_ms.to_string().cyan(),
                outcomes.len().to_string().cyan(),
                num_threads.to_string().cyan()
            )?;
            stdout.flush()?;

            if outcomes.iter().any(BundleOutcome::is_failure) {
                // Non-zero exit to fail the build
                std::process::exit(1);
            }

            Ok(())
        }
    }
}

fn process_bundle(processor: &BundleProcessor, bundle: &Path, cfg: &Config) -> Result<SinkSummary> {
    let files = loader::load_bundle(bundle)
        .with_context(|| format!("Failed to load bundle {}", bundle.display()))?;

    let name = bundle.file_name().map(|n| n.to_os_string()).unwrap_or_else(|| "bundle".into());
    let mut sink = DirSink::new(cfg.out_dir.join(name));
    processor
        .process(&files, cfg.build_mode(), &mut sink)
        .with_context(|| format!("Failed to process bundle {}", bundle.display()))?;
    debug!("{} files written to {}", sink.files_written(), sink.out_dir().display());
    sink.finish()
}
