use thiserror::Error;

/// Raised by a round-trip tool that cannot parse or re-emit a snippet.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("failed to set parser language: {language}")]
    LanguageSetupFailed { language: String },

    #[error("parser produced no tree for {language} source")]
    ParseFailed { language: String },

    #[error("syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("failed to run '{command}': {source}")]
    CommandIo {
        command: String,
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("'{command}' was killed after {timeout_ms} ms")]
    CommandTimedOut { command: String, timeout_ms: u64 },

    #[error("'{command}' produced non-UTF-8 output")]
    InvalidOutput { command: String },

    #[error("tool '{tool}' panicked")]
    ToolPanicked { tool: String },
}

impl ParseError {
    pub fn language_setup_failed(language: impl Into<String>) -> Self {
        Self::LanguageSetupFailed {
            language: language.into(),
        }
    }

    pub fn parse_failed(language: impl Into<String>) -> Self {
        Self::ParseFailed {
            language: language.into(),
        }
    }

    pub fn syntax_error(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::SyntaxError {
            line,
            column,
            message: message.into(),
        }
    }

    pub fn command_io(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::CommandIo {
            command: command.into(),
            source,
        }
    }

    pub fn command_failed(
        command: impl Into<String>,
        status: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self::CommandFailed {
            command: command.into(),
            status: status.into(),
            stderr: stderr.into(),
        }
    }

    pub fn command_timed_out(command: impl Into<String>, timeout: std::time::Duration) -> Self {
        Self::CommandTimedOut {
            command: command.into(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }
    }

    pub fn tool_panicked(tool: impl Into<String>) -> Self {
        Self::ToolPanicked { tool: tool.into() }
    }
}
