//! Screenplay Graphs — batch co-occurrence graphs for every configured title.
//!
//! Usage: screenplay_graphs --config <run.ron> [--output-dir <dir>] [--every <n>]
//!                          [--format <svg|png>] [--export] [-v]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use screenplay_graph::config::{Config, ImageFormat};
use screenplay_graph::core::graph::EmitSchedule;
use screenplay_graph::core::pipeline;
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser)]
#[command(name = "screenplay_graphs")]
#[command(about = "Build character co-occurrence graphs from screenplays", long_about = None)]
struct Cli {
    /// RON run configuration (directories, titles, style)
    #[arg(short, long)]
    config: PathBuf,

    /// Override the configured output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Emit an image after every N scenes instead of once per title
    #[arg(long)]
    every: Option<usize>,

    /// Override the configured image format
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Also write each final graph as <title>.ron
    #[arg(long)]
    export: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Svg,
    Png,
}

impl From<FormatArg> for ImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Svg => ImageFormat::Svg,
            FormatArg::Png => ImageFormat::Png,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = Config::load_from_ron(&cli.config)
        .with_context(|| format!("loading config {}", cli.config.display()))?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(n) = cli.every {
        config.emit = EmitSchedule::EveryScenes(n);
    }
    if let Some(format) = cli.format {
        config.image_format = format.into();
    }
    if cli.export {
        config.export_graph = true;
    }
    config.validate().context("invalid command-line overrides")?;

    let reports = pipeline::run(&config)?;

    for report in &reports {
        println!(
            "{}: {} scenes, {} characters, {} edges, {} image(s), most central: {}",
            report.title,
            report.scenes,
            report.vertices,
            report.edges,
            report.images.len(),
            if report.most_central.is_empty() {
                "-".to_string()
            } else {
                report.most_central.join(", ")
            }
        );
    }
    println!("Done.");
    Ok(())
}
