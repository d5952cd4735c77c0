use clap::Parser;

#[derive(Parser)]
#[command(
    name = "schoolsync",
    about = "Scan the school app's document database and repair legacy field shapes (dry-run unless --fix)",
    version
)]
pub struct Cli {
    /// Project ID of the document database
    #[arg(long)]
    pub project: String,

    /// Apply fixes (otherwise dry-run)
    #[arg(long, conflicts_with = "dry_run")]
    pub fix: bool,

    /// Only report pending fixes (the default)
    #[arg(long)]
    pub dry_run: bool,

    /// Limit processed documents per collection (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,

    /// Directory holding one mirror directory per project
    #[arg(long)]
    pub store_root: Option<String>,

    /// Path to a TOML config with store root and collection names
    #[arg(long)]
    pub config: Option<String>,

    /// Output the run report as JSON
    #[arg(long)]
    pub json: bool,
}
