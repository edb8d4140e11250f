use clap::Parser;
use oxmin_core::{BuildMode, MinifierConfig};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "minify")]
#[command(about = "Minify every JavaScript file of one or more bundle directories")]
pub struct Config {
    /// Bundle directories to process
    #[arg(required = true)]
    pub bundles: Vec<PathBuf>,

    /// Directory the processed bundles are written to
    #[arg(long, default_value = "minified")]
    pub out_dir: PathBuf,

    /// Build mode; anything other than `development` minifies
    #[arg(long, default_value = "production")]
    pub mode: String,

    /// Value substituted for `process.env.NODE_ENV`
    #[arg(long, env = "NODE_ENV", default_value = "development")]
    pub node_env: String,

    /// Skip per-file size statistics when set to `true`
    #[arg(long, env = "DISABLE_CLIENT_STATS")]
    pub disable_client_stats: Option<String>,
}

impl Config {
    pub fn build_mode(&self) -> BuildMode {
        BuildMode::from(self.mode.as_str())
    }

    pub fn minifier_config(&self) -> MinifierConfig {
        MinifierConfig::from_vars(Some(self.node_env.clone()), self.disable_client_stats.clone())
    }
}
