//! Command orchestration for CLI subcommands.
//!
//! - `run` - round-trip snippets and report failures
//! - `list` - show what the catalogue contains

pub mod list;
pub mod run;

pub use list::execute_list;
pub use run::{execute_run, run_catalogue};

use tracing::debug;

use crate::catalogue::{self, Catalogue};
use crate::cli::SourceArgs;
use crate::error::LoadError;

/// Exit codes for the syncat CLI.
pub mod codes {
    /// Every snippet round-tripped.
    pub const SUCCESS: u8 = 0;
    /// At least one snippet failed, or a requested category does not exist.
    pub const FAILURES: u8 = 1;
    /// The catalogue or configuration could not be loaded.
    pub const LOAD_ERROR: u8 = 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Passed,
    Failed,
}

impl RunStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            RunStatus::Passed => codes::SUCCESS,
            RunStatus::Failed => codes::FAILURES,
        }
    }
}

/// The embedded catalogue, or every snapshot under `--catalogue`, narrowed
/// by `--snapshot`.
pub fn load_catalogues(source: &SourceArgs) -> Result<Vec<Catalogue>, LoadError> {
    let catalogues = match source.catalogue {
        Some(ref path) => catalogue::load(path)?,
        None => vec![Catalogue::builtin()?],
    };
    debug!(count = catalogues.len(), "catalogues loaded");

    match source.snapshot {
        Some(ref name) => {
            let selected: Vec<Catalogue> = catalogues
                .into_iter()
                .filter(|c| c.name() == name)
                .collect();
            if selected.is_empty() {
                return Err(LoadError::SnapshotNotFound { name: name.clone() });
            }
            Ok(selected)
        }
        None => Ok(catalogues),
    }
}
