//! Project config file: `glossa.toml` (or `glossa.json`) in the working directory

use std::path::{Path, PathBuf};

const CANDIDATES: [&str; 2] = ["glossa.toml", "glossa.json"];

/// First project config file present in `working_dir`.
pub fn locate(working_dir: &Path) -> Option<PathBuf> {
    CANDIDATES
        .iter()
        .map(|name| working_dir.join(name))
        .find(|path| path.is_file())
}
