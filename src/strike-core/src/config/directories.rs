use crate::error::config::ConfigError;
use crate::error::config::ConfigError::NoHomeInEnvironment;
use directories_next::ProjectDirs;
use std::path::PathBuf;

pub fn project_dirs() -> Result<&'static ProjectDirs, ConfigError> {
    lazy_static::lazy_static! {
        static ref DIRS: Option<ProjectDirs> = ProjectDirs::from("org", "strike", "strike");
    }
    DIRS.as_ref().ok_or(NoHomeInEnvironment)
}

/// Where `strike.json` lives unless `--config` says otherwise.
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?
        .config_dir()
        .join(crate::config::model::client_config::CONFIG_FILE_NAME))
}

/// Where sessions and the last-used wallet are persisted.
pub fn get_storage_directory() -> Result<PathBuf, ConfigError> {
    Ok(project_dirs()?.data_local_dir().join("storage"))
}
