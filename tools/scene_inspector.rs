//! Scene Inspector — prints which characters each scene of a script contains,
//! with how often each name is mentioned in that scene.
//!
//! Usage: scene_inspector --script <file> --metadata <file> [--line-start]

use anyhow::{Context, Result};
use clap::Parser;
use screenplay_graph::core::metadata::load_metadata_file;
use screenplay_graph::core::presence::{character_names, present_characters};
use screenplay_graph::core::script::{load_script, MarkerMode};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scene_inspector")]
#[command(about = "Show per-scene character presence for one screenplay", long_about = None)]
struct Cli {
    /// Screenplay text file
    #[arg(short, long)]
    script: PathBuf,

    /// CSV metadata file (Name, Quality, Object, Role)
    #[arg(short, long)]
    metadata: PathBuf,

    /// Only split on headings at the start of a line
    #[arg(long)]
    line_start: bool,

    /// Also list scenes where nobody appears
    #[arg(long)]
    all: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let mode = if cli.line_start {
        MarkerMode::LineStart
    } else {
        MarkerMode::Anywhere
    };
    let scenes = load_script(&cli.script, mode)
        .with_context(|| format!("reading {}", cli.script.display()))?;
    let characters = load_metadata_file(&cli.metadata)
        .with_context(|| format!("reading {}", cli.metadata.display()))?;
    let names = character_names(&characters);
    let presence = present_characters(&scenes, &names);

    let mut appearances = vec![0usize; names.len()];
    for (i, present) in presence.iter().enumerate() {
        for name in present {
            if let Some(k) = names.iter().position(|n| n == name) {
                appearances[k] += 1;
            }
        }
        if present.is_empty() && !cli.all {
            continue;
        }
        let mentions: Vec<String> = present
            .iter()
            .map(|name| format!("{} ({})", name, scenes[i].count(name)))
            .collect();
        println!("scene {:>4}: {}", i, mentions.join(", "));
    }

    println!("\n=== Appearances ({} scenes) ===\n", scenes.len());
    for (name, count) in names.iter().zip(&appearances) {
        println!("{:<20} {}", name, count);
    }
    Ok(())
}
