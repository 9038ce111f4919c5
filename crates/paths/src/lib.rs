use directories::ProjectDirs;
use opchecklist_runtime_config::CONFIG_FILE_NAME;
use std::path::PathBuf;

/// Overrides the data directory (preference store) when set.
pub const DATA_DIR_ENV: &str = "OPCHECKLIST_DATA_DIR";
/// Overrides the config directory when set.
pub const CONFIG_DIR_ENV: &str = "OPCHECKLIST_CONFIG_DIR";

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("could not determine home directory")]
    HomeUnavailable,
}

fn project_dirs() -> Result<ProjectDirs, PathError> {
    ProjectDirs::from("org", "opchecklist", "opchecklist").ok_or(PathError::HomeUnavailable)
}

fn env_dir(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn config_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = env_dir(CONFIG_DIR_ENV) {
        return Ok(dir);
    }
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn config_path() -> Result<PathBuf, PathError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Directory holding durable key-value preferences.
pub fn store_dir() -> Result<PathBuf, PathError> {
    if let Some(dir) = env_dir(DATA_DIR_ENV) {
        return Ok(dir);
    }
    Ok(project_dirs()?.data_dir().join("store"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_path_ends_with_canonical_file_name() {
        if let Ok(path) = config_path() {
            assert!(path.ends_with(CONFIG_FILE_NAME));
        }
    }
}
