//! CLI output: error mapping from domain errors to the CLI surface.

use crate::error::{ConfigError, PipelineError, StoreError};

/// Full error chain on one line
pub fn map_error(e: &anyhow::Error) -> String {
    format!("{:#}", e)
}

/// Follow-up suggestion for errors an operator can act on
pub fn exit_hint(e: &anyhow::Error) -> Option<&'static str> {
    let pipeline = e.chain().find_map(|cause| cause.downcast_ref::<PipelineError>())?;
    match pipeline {
        PipelineError::Config(ConfigError::NotFound(_)) => {
            Some("Pass --config <path> or create glossa.toml in the working directory.")
        }
        PipelineError::Config(ConfigError::Invalid(_)) => {
            Some("Fix the listed settings in the configuration file and run again.")
        }
        PipelineError::Store(StoreError::CorruptFile { .. }) => {
            Some("Repair the results file or run with --restore-backup.")
        }
        PipelineError::Store(StoreError::NoBackup(_)) => {
            Some("No backup exists yet; one is written before every results update.")
        }
        PipelineError::Progress(_) => {
            Some("Delete the progress file or run with --no-resume to start fresh.")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_hint_for_missing_backup() {
        let err = anyhow::Error::new(PipelineError::Store(StoreError::NoBackup(PathBuf::from(
            "a.js.backup",
        ))))
        .context("restore failed");
        assert!(map_error(&err).starts_with("restore failed: No backup found"));
        assert!(exit_hint(&err).unwrap().contains("No backup exists"));
    }

    #[test]
    fn test_no_hint_for_other_errors() {
        let err = anyhow::anyhow!("boom");
        assert!(exit_hint(&err).is_none());
    }
}
