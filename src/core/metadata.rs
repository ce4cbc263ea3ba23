//! Metadata loader — per-title character tables (Name, Quality, Object, Role).

use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::schema::character::CharacterMeta;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed metadata in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("metadata file {path} has no {column:?} column")]
    MissingColumn { path: PathBuf, column: &'static str },
}

/// Columns every metadata file must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Name", "Quality", "Object", "Role"];

#[derive(Debug, Deserialize)]
struct MetadataRow {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Quality")]
    quality: String,
    #[serde(rename = "Object")]
    object: String,
    #[serde(rename = "Role")]
    role: String,
}

/// Parse one CSV metadata file. Extra columns are ignored.
pub fn load_metadata_file(path: &Path) -> Result<Vec<CharacterMeta>, MetadataError> {
    let csv_err = |source: csv::Error| MetadataError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| MetadataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);

    let headers = reader.headers().map_err(csv_err)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(MetadataError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }
    let trimmed: csv::StringRecord = headers.iter().map(str::trim).collect();
    reader.set_headers(trimmed);

    let mut characters = Vec::new();
    for row in reader.deserialize::<MetadataRow>() {
        let row = row.map_err(csv_err)?;
        characters.push(CharacterMeta::new(&row.name, &row.quality, &row.object, &row.role));
    }
    debug!(path = %path.display(), characters = characters.len(), "loaded metadata");
    Ok(characters)
}

/// Load every metadata file in `dir` whose name ends with `.{extension}`,
/// keyed by file name.
pub fn load_metadata_dir(
    dir: &Path,
    extension: &str,
) -> Result<FxHashMap<String, Vec<CharacterMeta>>, MetadataError> {
    let io_err = |source: std::io::Error| MetadataError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == extension) {
            files.push(path);
        }
    }
    files.sort();

    let mut metadata = FxHashMap::default();
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let name = name.to_string();
        metadata.insert(name, load_metadata_file(&path)?);
    }
    info!(dir = %dir.display(), titles = metadata.len(), "loaded metadata directory");
    Ok(metadata)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(name: &str, contents: &str) -> PathBuf {
        let dir = PathBuf::from("target/test_metadata_unit");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn parses_rows_in_order() {
        let path = write_fixture(
            "order.txt",
            concat!(
                "Name,Quality,Object,Role\n",
                "Jay,haunted,car,Victim\n",
                " Hugh ,deceptive,wheelchair,Perpetrator\n",
            ),
        );
        let rows = load_metadata_file(&path).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "jay");
        assert_eq!(rows[0].object, "car");
        assert_eq!(rows[1].name, "hugh");
        assert_eq!(rows[1].role, "Perpetrator");
    }

    #[test]
    fn column_order_and_extras_do_not_matter() {
        let path = write_fixture(
            "shuffled.txt",
            "Role,Age,Name,Object,Quality\nRescuer,40,Loomis,gun,obsessive\n",
        );
        let rows = load_metadata_file(&path).unwrap();
        assert_eq!(rows, vec![CharacterMeta::new("Loomis", "obsessive", "gun", "Rescuer")]);
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let path = write_fixture(
            "quoted.txt",
            "Name,Quality,Object,Role\nSidney,\"guarded, brave\",phone,Victim\n",
        );
        let rows = load_metadata_file(&path).unwrap();
        assert_eq!(rows[0].quality, "guarded, brave");
    }

    #[test]
    fn missing_column_is_reported() {
        let path = write_fixture("no_role.txt", "Name,Quality,Object\nJay,a,b\n");
        let err = load_metadata_file(&path).unwrap_err();
        assert!(matches!(err, MetadataError::MissingColumn { column: "Role", .. }));
    }

    #[test]
    fn short_row_is_malformed() {
        let path = write_fixture("short.txt", "Name,Quality,Object,Role\nJay,a\n");
        assert!(matches!(
            load_metadata_file(&path),
            Err(MetadataError::Csv { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_metadata_file(Path::new("target/no_such_meta.txt")).unwrap_err();
        assert!(matches!(err, MetadataError::Io { .. }));
    }
}
