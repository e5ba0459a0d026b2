use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "copref",
    version,
    about = "Local roofing Code of Practice composition and cross-link tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Ingest(IngestArgs),
    Compose(ComposeArgs),
    Resolve(ResolveArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    #[arg(long, default_value = ".cache/copref")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "public/cop")]
    pub corpus_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(long, default_value = ".cache/copref")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "public/cop")]
    pub corpus_dir: PathBuf,

    #[arg(long, default_value = "seeds")]
    pub seed_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub ingest_manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ComposeArgs {
    #[arg(long, default_value = ".cache/copref")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "public/cop")]
    pub corpus_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub chapter: u32,

    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ResolveArgs {
    #[arg(long, default_value = "public/cop")]
    pub corpus_dir: PathBuf,

    #[arg(long)]
    pub section: String,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".cache/copref")]
    pub cache_root: PathBuf,

    #[arg(long, default_value = "public/cop")]
    pub corpus_dir: PathBuf,

    #[arg(long)]
    pub db_path: Option<PathBuf>,
}
