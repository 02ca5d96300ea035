//! Round-trip tools bundled with the harness.
//!
//! Real consumers plug their own parser/printer in through
//! [`RoundTripTool`](crate::harness::RoundTripTool) or `--tool command`; the
//! tree-sitter printers make the catalogue checkable out of the box.

mod command;
mod reprint;

use std::sync::Arc;
use std::time::Duration;

use crate::cli::{Language, ToolKind};
use crate::error::ConfigError;
use crate::harness::RoundTripTool;

pub use command::CommandTool;
pub use reprint::{LosslessPrinter, QuoteNormalizer};

pub fn build(
    kind: ToolKind,
    language: Language,
    command: Option<&str>,
    timeout: Duration,
) -> Result<Arc<dyn RoundTripTool>, ConfigError> {
    let tool: Arc<dyn RoundTripTool> = match kind {
        ToolKind::Lossless => Arc::new(LosslessPrinter::new(language)),
        ToolKind::NormalizeQuotes => Arc::new(QuoteNormalizer::new(language)),
        ToolKind::Command => {
            let command = command
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| ConfigError::invalid("tool 'command' requires --command"))?;
            Arc::new(CommandTool::new(command).with_timeout(timeout))
        }
    };
    Ok(tool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::DEFAULT_TIMEOUT;

    #[test]
    fn test_build_lossless() {
        let tool = build(ToolKind::Lossless, Language::Python, None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(tool.name(), "lossless");
    }

    #[test]
    fn test_build_command_requires_command() {
        let err = build(ToolKind::Command, Language::Python, None, DEFAULT_TIMEOUT).err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid config: tool 'command' requires --command"
        );
        assert!(build(ToolKind::Command, Language::Python, Some("  "), DEFAULT_TIMEOUT).is_err());
    }

    #[test]
    fn test_build_command() {
        let tool = build(ToolKind::Command, Language::Python, Some("cat"), DEFAULT_TIMEOUT).unwrap();
        assert_eq!(tool.name(), "cat");
    }
}
