//! CLI configuration utilities

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracker_frontend_common::ClientConfig;

/// File holding the persisted session inside the data directory
pub const SESSION_FILE: &str = "session.json";

/// Pick the data directory: explicit override, then the platform data dir
pub fn resolve_data_dir(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| {
        ProjectDirs::from("com", "IssueTracker", "tracker").map_or_else(
            // Fallback to current directory
            || PathBuf::from("./.tracker"),
            |dirs| dirs.data_dir().to_path_buf(),
        )
    })
}

/// Load the client configuration and apply the `--base-url` override
pub fn load_client_config(path: Option<&Path>, base_url: Option<String>) -> Result<ClientConfig> {
    let mut config = match path {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::load().context("Failed to load configuration")?,
    };

    if let Some(url) = base_url {
        config.api_base_url = url;
    }
    Ok(config)
}

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_override_data_dir_wins() {
        let dir = resolve_data_dir(Some(PathBuf::from("/tmp/tracker-test")));
        assert_eq!(dir, PathBuf::from("/tmp/tracker-test"));
        assert_eq!(session_path(&dir), PathBuf::from("/tmp/tracker-test/session.json"));
    }

    #[test]
    fn test_base_url_override() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("tracker.toml");
        std::fs::write(&path, "api_base_url = \"https://from-file.example.com\"\n").unwrap();

        let config = load_client_config(Some(&path), None).unwrap();
        assert_eq!(config.api_base_url, "https://from-file.example.com");

        let config =
            load_client_config(Some(&path), Some("https://override.example.com".into())).unwrap();
        assert_eq!(config.api_base_url, "https://override.example.com");
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_client_config(Some(&temp_dir.path().join("absent.toml")), None).is_err());
    }
}
