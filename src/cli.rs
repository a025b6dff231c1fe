// src/cli.rs
use std::path::PathBuf;
use clap::{Parser, Subcommand, Args as ClapArgs};

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse, compare, and get recommendations for CAD software", long_about = None)]
pub struct Args {
    /// Path to a config file (defaults to <config dir>/cadguide/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Extra catalog JSON files, loaded after the builtin catalog
    #[arg(long = "catalog", global = true)]
    pub catalogs: Vec<PathBuf>,

    /// Do not load the builtin sample catalog
    #[arg(long, global = true)]
    pub no_builtin: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalog entries, flat or grouped into families
    List(ListArgs),
    /// Score the catalog against quiz answers
    Recommend(RecommendArgs),
    /// Compare up to three entries side by side
    Compare(CompareArgs),
    /// Show the top-rated entries
    Trending(TrendingArgs),
}

#[derive(ClapArgs, Debug)]
pub struct ListArgs {
    /// Fuzzy filter on name, version, or description
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Only entries in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Group versions of the same product into families
    #[arg(short, long)]
    pub grouped: bool,

    /// Output in JSON format instead of the default Text format
    #[arg(long)]
    pub json: bool,

    /// Output to a specific file (extension will be added automatically)
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct RecommendArgs {
    /// Primary use case (mechanical, architectural, 3dprinting, ..., any)
    #[arg(long = "use")]
    pub primary_use: Option<String>,

    /// Experience level (beginner, intermediate, advanced, professional)
    #[arg(long)]
    pub experience: Option<String>,

    /// Monthly budget ceiling; 10000 means no constraint
    #[arg(long)]
    pub budget: Option<f64>,

    /// Preferred platform (windows, mac, linux, web, any)
    #[arg(long)]
    pub platform: Option<String>,

    /// Important feature; repeat for several
    #[arg(long = "feature")]
    pub features: Vec<String>,

    /// Start from the answers saved by the last quiz
    #[arg(long)]
    pub saved: bool,

    /// Group recommendations into families
    #[arg(short, long)]
    pub grouped: bool,

    /// Keep only the best N results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output in JSON format instead of the default Text format
    #[arg(long)]
    pub json: bool,

    /// Output to a specific file (extension will be added automatically)
    #[arg(short, long)]
    pub output: Option<String>,
}

#[derive(ClapArgs, Debug)]
pub struct CompareArgs {
    /// Entries as NAME or NAME@VERSION (at most three)
    #[arg(required = true, num_args = 1..=3)]
    pub entries: Vec<String>,

    /// Output in JSON format instead of the default Text format
    #[arg(long)]
    pub json: bool,
}

#[derive(ClapArgs, Debug)]
pub struct TrendingArgs {
    /// How many entries to show
    #[arg(short, long, default_value_t = 5)]
    pub limit: usize,

    /// Output in JSON format instead of the default Text format
    #[arg(long)]
    pub json: bool,
}
