//! Script loader — scene splitting and word-frequency tokenization.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::schema::scene::Scene;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("cannot read script {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Literal scene-heading markers (interior / exterior).
pub const SCENE_MARKERS: [&str; 2] = ["INT.", "EXT."];

/// Where a scene-heading marker may appear to count as a split point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MarkerMode {
    /// Any occurrence, including mid-line and mid-word.
    #[default]
    Anywhere,
    /// Only at the start of a line, after optional spaces or tabs.
    LineStart,
}

/// Read a screenplay file and split it into scenes.
pub fn load_script(path: &Path, mode: MarkerMode) -> Result<Vec<Scene>, ScriptError> {
    let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let scenes = split_scenes(&text, mode);
    debug!(path = %path.display(), scenes = scenes.len(), "loaded script");
    Ok(scenes)
}

/// Split screenplay text into per-scene word-frequency tables.
///
/// The result always has `marker_count(text, mode) + 1` entries; the first
/// is whatever precedes the first heading (often empty).
pub fn split_scenes(text: &str, mode: MarkerMode) -> Vec<Scene> {
    scene_blocks(text, mode)
        .into_iter()
        .map(|block| Scene::from_tokens(tokenize(block)))
        .collect()
}

/// Split screenplay text into raw scene blocks, markers removed.
pub fn scene_blocks(text: &str, mode: MarkerMode) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut start = 0;
    for pos in marker_positions(text, mode) {
        blocks.push(&text[start..pos]);
        start = pos + marker_len(text, pos);
    }
    blocks.push(&text[start..]);
    blocks
}

/// Number of scene-heading markers that act as split points.
pub fn marker_count(text: &str, mode: MarkerMode) -> usize {
    marker_positions(text, mode).len()
}

fn marker_len(text: &str, pos: usize) -> usize {
    SCENE_MARKERS
        .iter()
        .find(|m| text[pos..].starts_with(**m))
        .map_or(0, |m| m.len())
}

/// Byte offsets of non-overlapping markers, scanned left to right.
fn marker_positions(text: &str, mode: MarkerMode) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut from = 0;
    while from < text.len() {
        let next = SCENE_MARKERS
            .iter()
            .filter_map(|m| text[from..].find(m).map(|i| (from + i, m.len())))
            .min_by_key(|(pos, _)| *pos);
        let Some((pos, len)) = next else { break };
        if mode == MarkerMode::Anywhere || at_line_start(text, pos) {
            positions.push(pos);
            from = pos + len;
        } else {
            from = pos + 1;
        }
    }
    positions
}

fn at_line_start(text: &str, pos: usize) -> bool {
    text[..pos]
        .chars()
        .rev()
        .find(|c| *c != ' ' && *c != '\t')
        .map_or(true, |c| c == '\n')
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokenize text into lowercase alphabetic words.
///
/// A word is a maximal run of word characters (letters, digits, `_`).
/// Runs containing a digit or underscore are dropped entirely, so `r2d2`
/// and `mr_x` produce nothing and a name never matches inside another word.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|run| !run.is_empty() && run.chars().all(char::is_alphabetic))
        .map(str::to_lowercase)
}
