//! The batch pipeline: script + metadata → graph → images.
//!
//! Wires script loading, presence extraction, graph building, rendering,
//! export, and centrality together for every configured title.

use rustc_hash::FxHashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::centrality::most_central;
use crate::core::graph::{save_graph, CooccurrenceGraph, EmitSchedule, Emission, GraphError};
use crate::core::metadata::{load_metadata_dir, MetadataError};
use crate::core::presence::{character_names, present_characters};
use crate::core::render::{render_to_file, RenderError};
use crate::core::script::{load_script, ScriptError};
use crate::schema::character::CharacterMeta;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("script error: {0}")]
    Script(#[from] ScriptError),
    #[error("metadata error: {0}")]
    Metadata(#[from] MetadataError),
    #[error("render error: {0}")]
    Render(#[from] RenderError),
    #[error("graph export error: {0}")]
    Graph(#[from] GraphError),
    #[error("script {0} has no INT./EXT. scene headings")]
    EmptyScript(String),
    #[error("no metadata file named {0}")]
    MissingMetadata(String),
}

/// Summary of one processed title.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleReport {
    pub title: String,
    /// Scene count, including the preamble before the first heading.
    pub scenes: usize,
    pub vertices: usize,
    pub edges: usize,
    /// Every image written for this title, in emission order.
    pub images: Vec<PathBuf>,
    pub graph_export: Option<PathBuf>,
    pub most_central: Vec<String>,
}

/// Process every configured title in order. Stops at the first failure.
pub fn run(config: &Config) -> Result<Vec<TitleReport>, PipelineError> {
    let metadata = load_metadata_dir(&config.metadata_dir, &config.metadata_extension)?;
    let mut reports = Vec::with_capacity(config.titles.len());
    for title in &config.titles {
        info!(title = %title, "starting");
        reports.push(process_title(config, title, &metadata)?);
    }
    info!(titles = reports.len(), "done");
    Ok(reports)
}

/// Build, render, and optionally export the graph for one title.
pub fn process_title(
    config: &Config,
    title: &str,
    metadata: &FxHashMap<String, Vec<CharacterMeta>>,
) -> Result<TitleReport, PipelineError> {
    let scenes = load_script(&config.script_path(title), config.marker_mode)?;
    if scenes.len() < 2 {
        return Err(PipelineError::EmptyScript(title.to_string()));
    }
    let characters = metadata
        .get(title)
        .ok_or_else(|| PipelineError::MissingMetadata(title.to_string()))?
        .clone();

    let names = character_names(&characters);
    let presence = present_characters(&scenes, &names);
    let stem = title_stem(title);

    let mut images = Vec::new();
    let graph = CooccurrenceGraph::build(
        characters,
        &presence,
        config.emit,
        |emission, graph| -> Result<(), PipelineError> {
            let path = image_path(config, stem, emission);
            render_to_file(graph, &config.style, &path, config.image_format)?;
            images.push(path);
            Ok(())
        },
    )?;

    let graph_export = if config.export_graph {
        let path = config.output_dir.join(format!("{}.ron", stem));
        save_graph(&graph, &path)?;
        Some(path)
    } else {
        None
    };

    let central = most_central(&graph);
    if graph.edge_count() == 0 {
        warn!(title = %title, "no characters ever share a scene");
    } else {
        info!(title = %title, most_central = ?central, "highest betweenness");
    }
    info!(
        title = %title,
        scenes = scenes.len(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        images = images.len(),
        "finished"
    );

    Ok(TitleReport {
        title: title.to_string(),
        scenes: scenes.len(),
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
        images,
        graph_export,
        most_central: central,
    })
}

/// Title without its extension: `it_follows.txt` → `it_follows`.
pub fn title_stem(title: &str) -> &str {
    title.split('.').next().unwrap_or(title)
}

/// `<out>/<stem>.<ext>` for the final-only schedule, otherwise
/// `<out>/<stem>/<scene_index>.<ext>`.
fn image_path(config: &Config, stem: &str, emission: Emission) -> PathBuf {
    let ext = config.image_format.extension();
    match config.emit {
        EmitSchedule::Final => config.output_dir.join(format!("{}.{}", stem, ext)),
        EmitSchedule::EveryScenes(_) => config
            .output_dir
            .join(stem)
            .join(format!("{}.{}", emission.scene_index(), ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_drops_extension() {
        assert_eq!(title_stem("it_follows.txt"), "it_follows");
        assert_eq!(title_stem("scream"), "scream");
        assert_eq!(title_stem("a.b.txt"), "a");
    }
}
