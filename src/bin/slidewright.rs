use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "slidewright", version)]
struct Cli {
    /// Log filter (`error`, `warn`, `info`, `debug`, `trace` or a full directive).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck against the in-memory recording host and write the report.
    Generate(GenerateArgs),
    /// Print radial node positions for a canvas-centered diagram.
    Layout(LayoutArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Input deck JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Engine config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report output path. Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Save the recorded document to this path.
    #[arg(long)]
    save: Option<PathBuf>,

    /// Live-handle ceiling of the recording host.
    #[arg(long)]
    pool_limit: Option<usize>,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Number of nodes.
    #[arg(long)]
    nodes: usize,

    /// Circle radius in points.
    #[arg(long, default_value_t = 170.0)]
    radius: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level)
                .with_context(|| format!("invalid log filter '{}'", cli.log_level))?,
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let deck = slidewright::DeckSpec::from_path(&args.in_path)?;
    let config = match &args.config {
        Some(path) => slidewright::EngineConfig::from_path(path)?,
        None => slidewright::EngineConfig::default(),
    };

    let mut host = slidewright::RecordingHost::default();
    if let Some(limit) = args.pool_limit {
        host = host.with_pool_limit(limit);
    }

    let mut generator = slidewright::DeckGenerator::new(config, &host);
    let report = match &args.save {
        Some(path) => generator.generate_and_save(&mut host, &deck.pages, path)?,
        None => generator.generate(&mut host, &deck.pages)?,
    };

    let json = serde_json::to_string_pretty(&report).context("serialize deck report")?;
    match &args.out {
        Some(path) => {
            create_parent_dir(path)?;
            std::fs::write(path, json)
                .with_context(|| format!("write report '{}'", path.display()))?;
            eprintln!(
                "wrote {} ({} pages, {} failed, {} skipped)",
                path.display(),
                report.pages.len(),
                report.failed_pages.len(),
                report.skipped_count()
            );
        }
        None => println!("{json}"),
    }

    if let Some(reason) = &report.aborted {
        anyhow::bail!("generation aborted: {reason}");
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let canvas = slidewright::Canvas::default();
    for (i, p) in slidewright::radial_layout(canvas.center(), args.radius, args.nodes)
        .into_iter()
        .enumerate()
    {
        println!("{i}\t{:.2}\t{:.2}", p.x, p.y);
    }
    Ok(())
}

fn create_parent_dir(path: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
