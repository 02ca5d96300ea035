use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
#[error("category not found: {category}")]
pub struct NotFoundError {
    pub category: String,
}

impl NotFoundError {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read catalogue '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to scan catalogue directory '{path}': {source}")]
    DirectoryScanError {
        path: PathBuf,
        source: walkdir::Error,
    },

    #[error("cannot detect catalogue language from extension: {path}")]
    UnknownLanguage { path: PathBuf },

    #[error("no catalogue files found in {path}")]
    NoCatalogues { path: PathBuf },

    #[error("line {line}: content before the first section header")]
    OrphanContent { line: usize },

    #[error("line {line}: section header has no name")]
    EmptyHeader { line: usize },

    #[error("line {line}: unknown header annotation '{annotation}'")]
    UnknownAnnotation { line: usize, annotation: String },

    #[error("line {line}: duplicate category '{category}'")]
    DuplicateCategory { line: usize, category: String },

    #[error("category '{category}' has no snippets")]
    EmptyCategory { category: String },

    #[error("category '{category}' does not parse at line {line}, column {column}: {message}")]
    Malformed {
        category: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("expected outputs in '{path}' do not match the catalogue: {message}")]
    ExpectedMismatch { path: PathBuf, message: String },

    #[error("snapshot '{name}' not found")]
    SnapshotNotFound { name: String },

    #[error("failed to set parser language: {language}")]
    LanguageSetupFailed { language: String },

    #[error("{path}: {source}")]
    InFile {
        path: PathBuf,
        source: Box<LoadError>,
    },
}

impl LoadError {
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadError {
            path: path.into(),
            source,
        }
    }

    pub fn unknown_language(path: impl Into<PathBuf>) -> Self {
        Self::UnknownLanguage { path: path.into() }
    }

    pub fn duplicate_category(line: usize, category: impl Into<String>) -> Self {
        Self::DuplicateCategory {
            line,
            category: category.into(),
        }
    }

    pub fn empty_category(category: impl Into<String>) -> Self {
        Self::EmptyCategory {
            category: category.into(),
        }
    }

    pub fn malformed(
        category: impl Into<String>,
        line: usize,
        column: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            category: category.into(),
            line,
            column,
            message: message.into(),
        }
    }

    pub fn expected_mismatch(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ExpectedMismatch {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Attach the catalogue path to an error raised while sectioning its text.
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        match self {
            Self::ReadError { .. }
            | Self::ExpectedMismatch { .. }
            | Self::UnknownLanguage { .. }
            | Self::InFile { .. } => self,
            other => Self::InFile {
                path: path.into(),
                source: Box::new(other),
            },
        }
    }
}
