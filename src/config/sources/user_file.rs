//! User config file: `$XDG_CONFIG_HOME/glossa/config.toml` or the platform equivalent

use directories::ProjectDirs;
use std::path::PathBuf;

/// Platform config directory for glossa, if a home directory can be determined.
pub fn config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "glossa").map(|dirs| dirs.config_dir().to_path_buf())
}

/// User config file inside `dir`, if present.
pub fn locate(dir: &std::path::Path) -> Option<PathBuf> {
    let path = dir.join("config.toml");
    path.is_file().then_some(path)
}
