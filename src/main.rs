use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use docs2dict::convert::Converter;
use docs2dict::fetch;
use docs2dict::models::ConvertOptions;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "docs2dict")]
#[command(about = "Convert DevDocs documentation into offline dictionary files")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List documentation sets available on devdocs.io
    List,
    /// Download raw JSON documents for one documentation set
    Download(DownloadArgs),
    /// Generate dictionary files from downloaded documentation
    Generate(GenerateArgs),
}

#[derive(Args)]
struct DownloadArgs {
    /// Slug of the documentation set listed on devdocs.io
    #[arg(short, long)]
    slug: String,

    /// Directory for downloaded DevDocs files
    #[arg(long)]
    docdir: PathBuf,
}

#[derive(Args)]
struct GenerateArgs {
    /// Directory of downloaded DevDocs files
    #[arg(long)]
    docdir: PathBuf,

    /// Output directory for generated dictionary files
    #[arg(long)]
    outdir: PathBuf,

    /// Convert a single slug instead of every set under the doc directory
    #[arg(short, long)]
    slug: Option<String>,

    /// Process links and keys for compatibility with older readers
    #[arg(short, long)]
    compat: bool,

    /// Split keys into tokens for easier lookups
    #[arg(short, long)]
    tokenize: bool,

    /// Prefix added to the visible text of external links
    #[arg(short, long, value_name = "PREFIX", default_value = "")]
    external: String,

    /// Comma separated list of tokens excluded from tokenization
    #[arg(short, long, value_name = "CSV", default_value = "")]
    filter: String,
}

fn run_list() -> Result<()> {
    let docs = fetch::list_catalog()?;
    fetch::print_catalog(&docs);
    Ok(())
}

fn run_download(args: DownloadArgs) -> Result<()> {
    fetch::download_set(&args.docdir, &args.slug)
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    fs::create_dir_all(&args.outdir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            args.outdir.display()
        )
    })?;

    let opts = ConvertOptions::new(args.tokenize, args.compat, args.external, &args.filter);
    let converter = Converter::new(args.docdir, args.outdir, opts);
    converter.generate(args.slug.as_deref())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let result = match cli.command {
        Commands::List => run_list(),
        Commands::Download(args) => run_download(args),
        Commands::Generate(args) => run_generate(args),
    };

    match result {
        Ok(()) => {
            info!("Completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
