use anyhow::{Context, Result};
use mindful_storage::{Database, Settings};
use std::path::PathBuf;

/// Get the local data directory for mindful.
///
/// `MINDFUL_DATA_DIR` takes precedence over the platform default.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os("MINDFUL_DATA_DIR") {
        return Ok(PathBuf::from(dir));
    }

    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("mindful");
    Ok(path)
}

/// Settings store location inside the data directory.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn database_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("mindful.db"))
}

/// Open the settings store at [`database_path`].
///
/// # Errors
///
/// Returns an error if the path cannot be resolved or the store cannot be opened.
pub fn open_database() -> Result<Database> {
    let path = database_path()?;
    Database::new(&path).with_context(|| format!("Failed to open {}", path.display()))
}

/// Socket a browsing context listens on unless told otherwise.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn default_socket_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("mindful.sock"))
}

/// Log file for interactive contexts, whose terminal belongs to the overlay.
///
/// # Errors
///
/// Returns an error if the data directory cannot be determined.
pub fn log_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("mindful.log"))
}

#[must_use]
pub fn debug_enabled() -> bool {
    std::env::var("MINDFUL_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Read settings, falling back to the built-in defaults when the store
/// cannot be read.
#[must_use]
pub fn load_settings(database: &Database) -> Settings {
    match database.get_settings() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Failed to read settings, using defaults: {e:#}");
            Settings::default_settings()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_follow_data_dir_override() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("MINDFUL_DATA_DIR", dir.path());

        assert_eq!(get_data_dir().unwrap(), dir.path());
        assert_eq!(database_path().unwrap(), dir.path().join("mindful.db"));
        assert_eq!(default_socket_path().unwrap(), dir.path().join("mindful.sock"));

        let db = open_database().unwrap();
        db.seed_defaults().unwrap();
        assert!(dir.path().join("mindful.db").exists());

        std::env::remove_var("MINDFUL_DATA_DIR");
    }

    #[test]
    fn test_load_settings_from_store() {
        let db = Database::in_memory().unwrap();
        db.update_settings(&Settings {
            block_list: vec!["reddit.com".to_string()],
            warning_delay: 42,
        })
        .unwrap();

        let settings = load_settings(&db);
        assert_eq!(settings.block_list, vec!["reddit.com".to_string()]);
        assert_eq!(settings.warning_delay, 42);
    }

    #[test]
    fn test_load_settings_falls_back_on_malformed_store() {
        let db = Database::in_memory().unwrap();
        db.set_value(mindful_storage::BLOCK_LIST_KEY, "not a list")
            .unwrap();

        assert_eq!(load_settings(&db), Settings::default_settings());
    }
}
