use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use super::stage::{Stage, StageDef};

const STAGE_FILE_EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StageLoadError {
    #[error("failed to read stage directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read directory entry in {path}: {source}")]
    ReadDirEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read stage file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stage file {path} at {json_path}: {message}")]
    Parse {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("invalid stage file {path} at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("no stage files (*.json) found in {path}")]
    NoStages { path: PathBuf },
}

/// Loads every `*.json` stage in `dir`, ordered by file name.
pub fn load_stages(dir: &Path) -> Result<Vec<Stage>, StageLoadError> {
    let files = discover_stage_files(dir)?;
    if files.is_empty() {
        return Err(StageLoadError::NoStages {
            path: dir.to_path_buf(),
        });
    }

    let mut stages = Vec::with_capacity(files.len());
    for path in files {
        let stage = load_stage_file(&path)?;
        debug!(
            path = %path.display(),
            stage = stage.name.as_str(),
            "stage_file_loaded"
        );
        stages.push(stage);
    }
    info!(
        dir = %dir.display(),
        stage_count = stages.len(),
        "stages_loaded"
    );
    Ok(stages)
}

pub fn load_stage_file(path: &Path) -> Result<Stage, StageLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| StageLoadError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_stage(&raw, path)
}

pub fn parse_stage(raw: &str, source_path: &Path) -> Result<Stage, StageLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let def = serde_path_to_error::deserialize::<_, StageDef>(&mut deserializer).map_err(
        |error| {
            let json_path = error.path().to_string();
            StageLoadError::Parse {
                path: source_path.to_path_buf(),
                json_path,
                message: error.into_inner().to_string(),
            }
        },
    )?;
    def.into_stage()
        .map_err(|(field, message)| StageLoadError::Invalid {
            path: source_path.to_path_buf(),
            field,
            message,
        })
}

fn discover_stage_files(dir: &Path) -> Result<Vec<PathBuf>, StageLoadError> {
    let entries = fs::read_dir(dir).map_err(|source| StageLoadError::ReadDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StageLoadError::ReadDirEntry {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_stage_file = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(STAGE_FILE_EXTENSION));
        if is_stage_file {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::TempDir;

    use super::*;
    use crate::content::LaneSide;

    fn stage_json(name: &str) -> String {
        let lane = json!({
            "width": 600.0,
            "height": 300.0,
            "spawn": [20.0, 260.0],
            "objects": [
                { "id": "floor", "x": 0.0, "y": 260.0, "width": 600.0, "height": 40.0, "color": "gray" }
            ]
        });
        json!({ "name": name, "top": lane, "bottom": lane }).to_string()
    }

    #[test]
    fn stages_load_in_file_name_order() {
        let temp = TempDir::new().expect("tempdir");
        fs::write(temp.path().join("02_second.json"), stage_json("Second")).expect("write");
        fs::write(temp.path().join("01_first.json"), stage_json("First")).expect("write");
        fs::write(temp.path().join("notes.txt"), "ignored").expect("write");

        let stages = load_stages(temp.path()).expect("load");
        let names = stages.iter().map(|s| s.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["First", "Second"]);
        assert!(stages[0].find_object(LaneSide::Top, "floor").is_some());
    }

    #[test]
    fn empty_directory_reports_no_stages() {
        let temp = TempDir::new().expect("tempdir");
        let error = load_stages(temp.path()).expect_err("no stages");
        assert!(matches!(error, StageLoadError::NoStages { .. }));
    }

    #[test]
    fn missing_directory_reports_read_dir() {
        let temp = TempDir::new().expect("tempdir");
        let error = load_stages(&temp.path().join("absent")).expect_err("missing");
        assert!(matches!(error, StageLoadError::ReadDir { .. }));
    }

    #[test]
    fn parse_error_carries_json_path() {
        let raw = json!({
            "name": "Broken",
            "top": { "width": "wide", "height": 300.0, "spawn": [0.0, 0.0] },
            "bottom": { "width": 10.0, "height": 10.0, "spawn": [0.0, 0.0] }
        })
        .to_string();
        let error = parse_stage(&raw, Path::new("broken.json")).expect_err("parse");
        match error {
            StageLoadError::Parse { json_path, .. } => assert_eq!(json_path, "top.width"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn validation_error_names_field() {
        let raw = json!({
            "name": "Tiny",
            "top": { "width": 0.0, "height": 300.0, "spawn": [0.0, 0.0] },
            "bottom": { "width": 10.0, "height": 10.0, "spawn": [0.0, 0.0] }
        })
        .to_string();
        let error = parse_stage(&raw, Path::new("tiny.json")).expect_err("invalid");
        match error {
            StageLoadError::Invalid { field, .. } => assert_eq!(field, "top.width"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bundled_stages_parse() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("assets")
            .join("stages");
        let stages = load_stages(&dir).expect("bundled stages");
        assert!(!stages.is_empty());
    }
}
