use std::fs;
use std::path::Path;

use sd_core::{ErrorKind, ScriptDescError};
use tracing::info;
use walkdir::WalkDir;

use crate::database::{parse_source, DatabaseSource, GameDatabase};

/// Loads a database from one JSON document or from every `*.json` file
/// under a directory, merged in file-name order.
pub fn load_database(path: &Path) -> Result<GameDatabase, ScriptDescError> {
    if !path.exists() {
        return Err(ScriptDescError::new(
            ErrorKind::Io,
            format!("Database path does not exist: {}", path.display()),
        ));
    }

    let source = if path.is_dir() {
        read_source_dir(path)?
    } else {
        read_source_file(path)?
    };
    let db = GameDatabase::from_source(source)?;

    info!(
        target: "sd_api::database",
        path = %path.display(),
        constants = db.constant_count(),
        templates = db.template_count(),
        items = db.item_count(),
        "database loaded"
    );
    Ok(db)
}

fn read_source_file(path: &Path) -> Result<DatabaseSource, ScriptDescError> {
    let text = fs::read_to_string(path).map_err(|error| {
        ScriptDescError::new(
            ErrorKind::Io,
            format!("Cannot read {}: {}", path.display(), error),
        )
    })?;
    parse_source(&text).map_err(|error| {
        ScriptDescError::new(
            error.kind,
            format!("{}: {}", path.display(), error.message),
        )
    })
}

fn read_source_dir(dir: &Path) -> Result<DatabaseSource, ScriptDescError> {
    let mut merged = DatabaseSource::default();
    let mut files = 0;

    for entry in WalkDir::new(dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.path().extension().and_then(|ext| ext.to_str()) != Some("json") {
            continue;
        }
        merged.merge(read_source_file(entry.path())?);
        files += 1;
    }

    if files == 0 {
        return Err(ScriptDescError::new(
            ErrorKind::Database,
            format!("No .json database files under {}", dir.display()),
        ));
    }
    Ok(merged)
}

#[cfg(test)]
mod loader_tests {
    use super::*;
    use sd_core::GameData;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after epoch")
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("sd-api-{}-{}", name, nanos));
        fs::create_dir_all(&dir).expect("temp dir should be created");
        dir
    }

    #[test]
    fn directory_tables_are_merged() {
        let dir = temp_dir("merge");
        fs::write(
            dir.join("constants.json"),
            r#"{"constants": [{"identifier": "Ele_Fire", "value": 3, "group": "element"}]}"#,
        )
        .expect("write constants");
        fs::create_dir_all(dir.join("items")).expect("items dir");
        fs::write(
            dir.join("items").join("potions.json"),
            r#"{"items": [{"id": 501, "aegis_name": "Red_Potion", "name": "Red Potion"}]}"#,
        )
        .expect("write items");
        fs::write(dir.join("notes.txt"), "ignored").expect("write notes");

        let db = load_database(&dir).expect("directory should load");
        assert!(db.constant_by_identifier("Ele_Fire").is_some());
        assert_eq!(db.item_count(), 1);

        fs::remove_dir_all(&dir).expect("cleanup");
    }

    #[test]
    fn missing_and_empty_paths_fail() {
        let missing = std::env::temp_dir().join("sd-api-definitely-missing.json");
        let error = load_database(&missing).expect_err("missing path");
        assert_eq!(error.kind, ErrorKind::Io);

        let dir = temp_dir("empty");
        let error = load_database(&dir).expect_err("empty dir");
        assert_eq!(error.kind, ErrorKind::Database);
        fs::remove_dir_all(&dir).expect("cleanup");
    }
}
