//! Harness settings: defaults, an optional JSON/YAML file, then CLI flags.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};

use crate::cli::{RunArgs, ToolKind};
use crate::error::ConfigError;
use crate::harness::{HarnessConfig, DEFAULT_TIMEOUT};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub timeout_ms: u64,
    pub jobs: usize,
    pub tool: ToolKind,
    pub command: Option<String>,
    pub categories: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout_ms: u64::try_from(DEFAULT_TIMEOUT.as_millis()).unwrap_or(u64::MAX),
            jobs: 1,
            tool: ToolKind::default(),
            command: None,
            categories: Vec::new(),
        }
    }
}

impl RunConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        trace!(path = %path.display(), "loading config");

        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::read_error(path, e.to_string()))?;

        let format = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let config: RunConfig = match format {
            "json" => serde_json::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| ConfigError::parse_error(path, e.to_string()))?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        debug!(?config, "loaded config file");
        Ok(config)
    }

    /// Defaults, overlaid with the `--config` file, overlaid with CLI flags.
    pub fn resolve(args: &RunArgs) -> Result<Self, ConfigError> {
        let base = match args.config {
            Some(ref path) => Self::load(path)?,
            None => Self::default(),
        };
        let config = base.merge_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn merge_args(mut self, args: &RunArgs) -> Self {
        if let Some(timeout) = args.timeout {
            self.timeout_ms = timeout;
        }
        if let Some(jobs) = args.jobs {
            self.jobs = jobs;
        }
        if let Some(tool) = args.tool {
            self.tool = tool;
        }
        if let Some(ref command) = args.tool_command {
            self.command = Some(command.clone());
        }
        if !args.category.is_empty() {
            self.categories = args.category.clone();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_ms == 0 {
            return Err(ConfigError::invalid("timeout_ms must be at least 1"));
        }
        if self.jobs == 0 {
            return Err(ConfigError::invalid("jobs must be at least 1"));
        }
        if self.tool == ToolKind::Command && self.command.is_none() {
            return Err(ConfigError::invalid("tool 'command' requires --command"));
        }
        Ok(())
    }

    pub fn harness_config(&self) -> HarnessConfig {
        HarnessConfig {
            timeout: Duration::from_millis(self.timeout_ms),
            jobs: self.jobs,
        }
    }
}
