use crate::services::CONVERTER_ENV;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "heic_export")]
#[command(about = "Convert image sets within Xcode asset catalogs to HEIC resources")]
#[command(version)]
pub struct Cli {
    /// Project directory containing one or more .xcassets catalogs
    pub project_path: PathBuf,

    /// Number of worker tasks (default: CPU count x 2)
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Image converter executable
    #[arg(long, env = CONVERTER_ENV)]
    pub converter: Option<PathBuf>,

    /// Rewrite metadata with an external line editor (e.g. /usr/bin/sed) instead of in-process
    #[arg(long)]
    pub substitution_tool: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
