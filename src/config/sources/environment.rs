//! Environment overrides: `GLOSSA__SEARCH__BACKEND=http` sets `search.backend`.

use config::Environment;

pub const PREFIX: &str = "GLOSSA";
pub const SEPARATOR: &str = "__";

pub fn source() -> Environment {
    Environment::with_prefix(PREFIX)
        .separator(SEPARATOR)
        .try_parsing(true)
}
