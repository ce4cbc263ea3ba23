//! Run configuration — input/output directories, titles, and render style.
//!
//! Loaded from a RON file at startup:
//!
//! ```ron
//! (
//!     script_dir: "scripts",
//!     metadata_dir: "metadata",
//!     output_dir: "graphs",
//!     titles: ["it_follows.txt", "halloween.txt"],
//!     emit: EveryScenes(1),
//! )
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::graph::EmitSchedule;
use crate::core::script::MarkerMode;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Output image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageFormat {
    Svg,
    #[default]
    Png,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

/// Fixed drawing parameters shared by every image of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// Canvas (width, height) in pixels.
    pub canvas: (u32, u32),
    pub margin: f64,
    /// Vertex diameter in pixels.
    pub vertex_size: f64,
    pub font_size: f64,
    /// Stroke width per unit of edge weight.
    pub edge_width_scale: f64,
    /// Bend edges slightly so overlapping pairs stay readable.
    pub autocurve: bool,
    pub layout_seed: u64,
    pub layout_iterations: usize,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            canvas: (1000, 1000),
            margin: 80.0,
            vertex_size: 60.0,
            font_size: 14.0,
            edge_width_scale: 1.0,
            autocurve: true,
            layout_seed: 42,
            layout_iterations: 500,
        }
    }
}

/// Everything a batch run needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub script_dir: PathBuf,
    pub metadata_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Script file names, processed in order.
    pub titles: Vec<String>,
    #[serde(default = "default_metadata_extension")]
    pub metadata_extension: String,
    #[serde(default)]
    pub marker_mode: MarkerMode,
    #[serde(default)]
    pub emit: EmitSchedule,
    #[serde(default)]
    pub image_format: ImageFormat,
    #[serde(default)]
    pub export_graph: bool,
    #[serde(default)]
    pub style: RenderStyle,
}

fn default_metadata_extension() -> String {
    "txt".to_string()
}

impl Config {
    /// Load and validate a config from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<Config, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse_ron(&contents)
    }

    /// Parse and validate a config from a RON string.
    pub fn parse_ron(input: &str) -> Result<Config, ConfigError> {
        let config: Config = ron::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.titles.is_empty() {
            return Err(ConfigError::Invalid("no titles configured".to_string()));
        }
        if let EmitSchedule::EveryScenes(0) = self.emit {
            return Err(ConfigError::Invalid(
                "emit interval must be at least 1 scene".to_string(),
            ));
        }
        let (width, height) = self.style.canvas;
        let usable = (width.min(height) as f64) - 2.0 * self.style.margin;
        if usable <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "margin {} leaves no drawing area on a {}x{} canvas",
                self.style.margin, width, height
            )));
        }
        Ok(())
    }

    /// Path of the script file for a title.
    pub fn script_path(&self, title: &str) -> PathBuf {
        self.script_dir.join(title)
    }
}
