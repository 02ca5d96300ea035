use anyhow::{Context as AnyhowContext, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Go,
    Python,
    Rust,
    Javascript,
    Typescript,
}

/// Round-trip tool the harness drives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// Tree-sitter parse, re-emit every token with its original spacing
    #[default]
    Lossless,
    /// Like lossless, but unify Python string quotes to double quotes
    NormalizeQuotes,
    /// Pipe each snippet through an external command (see --command)
    Command,
}

#[derive(Parser, Debug)]
#[command(name = "syncat")]
#[command(about = "Syntax catalogue harness - round-trip every catalogued construct through a parser/printer", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Round-trip catalogue snippets and report failures
    Run(RunArgs),
    /// List catalogue categories and snippet counts
    List(ListArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Catalogue file or directory (the embedded catalogue if not specified)
    #[arg(long, value_name = "PATH")]
    pub catalogue: Option<PathBuf>,

    /// Only use the snapshot with this name (file stem)
    #[arg(long, value_name = "NAME")]
    pub snapshot: Option<String>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Category to run. Can be specified multiple times.
    #[arg(long, value_name = "ID")]
    pub category: Vec<String>,

    /// Per-snippet timeout in milliseconds
    #[arg(long, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Tool under test
    #[arg(long)]
    pub tool: Option<ToolKind>,

    /// Shell command for --tool command (snippet on stdin, output on stdout)
    #[arg(long = "command", value_name = "CMD")]
    pub tool_command: Option<String>,

    /// Number of worker threads
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: OutputFormat,

    /// Output file path (prints to stdout if not specified)
    #[arg(short = 'O', long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Harness config file (JSON or YAML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format (text, json)
    #[arg(short = 'f', long, default_value = "text")]
    pub format: OutputFormat,
}

impl SourceArgs {
    pub fn validate(&self) -> Result<()> {
        if let Some(ref path) = self.catalogue {
            validate_path(path)?;
        }
        Ok(())
    }
}

impl RunArgs {
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        if let Some(ref config_path) = self.config {
            if !config_path.is_file() {
                anyhow::bail!("Config file does not exist: {}", config_path.display());
            }
        }
        if self.jobs == Some(0) {
            anyhow::bail!("--jobs must be at least 1");
        }
        if self.timeout == Some(0) {
            anyhow::bail!("--timeout must be at least 1 ms");
        }
        Ok(())
    }
}

pub fn detect_language(file_path: &Path) -> Option<Language> {
    file_path.extension()?.to_str().and_then(|ext| match ext {
        "go" => Some(Language::Go),
        "py" => Some(Language::Python),
        "rs" => Some(Language::Rust),
        "js" => Some(Language::Javascript),
        "ts" => Some(Language::Typescript),
        _ => None,
    })
}

pub fn validate_path(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("Path does not exist: {}", path.display());
    }

    if path.is_file() {
        std::fs::metadata(path).with_context(|| format!("Cannot read file: {}", path.display()))?;
    } else if path.is_dir() {
        std::fs::metadata(path)
            .with_context(|| format!("Cannot read directory: {}", path.display()))?;
    } else {
        anyhow::bail!("Path is neither a file nor a directory: {}", path.display());
    }

    Ok(())
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Go => "go",
            Language::Python => "python",
            Language::Rust => "rust",
            Language::Javascript => "javascript",
            Language::Typescript => "typescript",
        }
    }

    /// Prefix of a line comment, which is also the section header marker.
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Language::Python => "#",
            Language::Go | Language::Rust | Language::Javascript | Language::Typescript => "//",
        }
    }

    pub fn tree_sitter_language(&self) -> tree_sitter::Language {
        match self {
            Language::Go => tree_sitter_go::LANGUAGE.into(),
            Language::Python => tree_sitter_python::LANGUAGE.into(),
            Language::Rust => tree_sitter_rust::LANGUAGE.into(),
            Language::Javascript => tree_sitter_javascript::LANGUAGE.into(),
            Language::Typescript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        }
    }
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Lossless => "lossless",
            ToolKind::NormalizeQuotes => "normalize-quotes",
            ToolKind::Command => "command",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_detect_language_python() {
        let path = Path::new("basic_syntax.py");
        assert_eq!(detect_language(path), Some(Language::Python));
    }

    #[test]
    fn test_detect_language_rust() {
        let path = Path::new("literals.rs");
        assert_eq!(detect_language(path), Some(Language::Rust));
    }

    #[test]
    fn test_detect_language_typescript() {
        let path = Path::new("types.ts");
        assert_eq!(detect_language(path), Some(Language::Typescript));
    }

    #[test]
    fn test_detect_language_unknown() {
        let path = Path::new("notes.txt");
        assert_eq!(detect_language(path), None);
    }

    #[test]
    fn test_detect_language_no_extension() {
        let path = Path::new("Makefile");
        assert_eq!(detect_language(path), None);
    }

    #[test]
    fn test_comment_prefix() {
        assert_eq!(Language::Python.comment_prefix(), "#");
        assert_eq!(Language::Rust.comment_prefix(), "//");
        assert_eq!(Language::Go.comment_prefix(), "//");
        assert_eq!(Language::Javascript.comment_prefix(), "//");
        assert_eq!(Language::Typescript.comment_prefix(), "//");
    }

    #[test]
    fn test_tool_kind_as_str() {
        assert_eq!(ToolKind::Lossless.as_str(), "lossless");
        assert_eq!(ToolKind::NormalizeQuotes.as_str(), "normalize-quotes");
        assert_eq!(ToolKind::Command.as_str(), "command");
    }

    #[test]
    fn test_parse_run_subcommand() {
        let args = Args::try_parse_from([
            "syncat",
            "run",
            "--category",
            "float-literals",
            "--category",
            "asyncio",
            "--timeout",
            "250",
        ])
        .unwrap();

        match args.command {
            Command::Run(run) => {
                assert_eq!(run.category, vec!["float-literals", "asyncio"]);
                assert_eq!(run.timeout, Some(250));
                assert_eq!(run.format, OutputFormat::Text);
                assert!(run.tool.is_none());
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_verbosity_after_subcommand() {
        let args = Args::try_parse_from(["syncat", "list", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::List(_)));
    }

    #[test]
    fn test_parse_tool_command() {
        let args = Args::try_parse_from([
            "syncat",
            "run",
            "--tool",
            "command",
            "--command",
            "cat",
        ])
        .unwrap();

        let Command::Run(run) = args.command else {
            panic!("expected run");
        };
        assert_eq!(run.tool, Some(ToolKind::Command));
        assert_eq!(run.tool_command.as_deref(), Some("cat"));
    }

    #[test]
    fn test_validate_path_file_exists() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("basic.py");
        fs::write(&file_path, "# ints\na = 1\n").unwrap();

        assert!(validate_path(&file_path).is_ok());
    }

    #[test]
    fn test_validate_path_not_exists() {
        let path = Path::new("/nonexistent/path/that/does/not/exist");
        assert!(validate_path(path).is_err());
    }

    #[test]
    fn test_run_args_validate_rejects_zero_jobs() {
        let args = RunArgs {
            jobs: Some(0),
            ..RunArgs::default()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_run_args_validate_missing_config() {
        let args = RunArgs {
            config: Some(PathBuf::from("/nonexistent/syncat.yaml")),
            ..RunArgs::default()
        };
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_run_args_validate_defaults() {
        assert!(RunArgs::default().validate().is_ok());
    }
}
