use clap::{Args, Parser, Subcommand};

use crate::model::{AssemblyLayout, AssemblyStrategy, LangDirection};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Assemble one bundle into an HTML document.
    Assemble(AssembleArgs),
    /// Print the document key of a bundle's request.
    Key(KeyArgs),
    /// Build a translation-words book from a checkout.
    TwBook(TwBookArgs),
    /// Assemble many bundles listed in a JSON Lines file.
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AssembleArgs {
    /// Bundle file (JSON, or YAML for `.yaml`/`.yml`).
    #[arg(long)]
    pub bundle: String,

    /// Output HTML file.
    #[arg(long)]
    pub out: String,

    /// Override the request's assembly strategy.
    #[arg(long, value_enum)]
    pub strategy: Option<AssemblyStrategy>,

    /// Override the layout selected for the request.
    #[arg(long, value_enum)]
    pub layout: Option<AssemblyLayout>,

    /// Provisioned resource checkouts, used to resolve translation-note links.
    #[arg(long)]
    pub assets_dir: Option<String>,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Bundle file (JSON, or YAML for `.yaml`/`.yml`).
    #[arg(long)]
    pub bundle: String,

    /// Override the request's assembly strategy.
    #[arg(long, value_enum)]
    pub strategy: Option<AssemblyStrategy>,

    /// Override the layout selected for the request.
    #[arg(long, value_enum)]
    pub layout: Option<AssemblyLayout>,
}

#[derive(Debug, Args)]
pub struct TwBookArgs {
    /// Translation-words checkout (contains `bible/{kt,names,other}`).
    #[arg(long)]
    pub dir: String,

    #[arg(long)]
    pub lang_code: String,

    #[arg(long, default_value = "")]
    pub lang_name: String,

    /// Book the definitions are attached to.
    #[arg(long)]
    pub book_code: String,

    #[arg(long, default_value = "Translation Words")]
    pub resource_type_name: String,

    #[arg(long, value_enum, default_value_t = LangDirection::Ltr)]
    pub lang_direction: LangDirection,

    /// Bundle whose resource requests decide which links resolve.
    #[arg(long)]
    pub bundle: Option<String>,

    /// Provisioned resource checkouts, used to resolve translation-note links.
    #[arg(long)]
    pub assets_dir: Option<String>,

    /// Output file for the book entry (JSON).
    #[arg(long)]
    pub out: String,

    /// Overwrite an existing output file.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON Lines file; each line holds `bundle`, `out` and optional overrides.
    #[arg(long)]
    pub jobs: String,

    /// Maximum documents assembled at once.
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,

    /// Overwrite existing output files.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}
