//! Round-trip harness: feed each snippet through a tool under test and
//! compare the re-emitted text against the original or the expected form.
//!
//! Tool failures, panics and timeouts all become failed results, so a single
//! bad snippet never aborts a batch.

mod diff;

use serde::Serialize;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

use crate::catalogue::Snippet;
use crate::error::{Error, ParseError, TimeoutError};

pub use diff::SnippetDiff;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);
const CLEANUP_GRACE: Duration = Duration::from_millis(500);

/// The parse/re-emit collaborator: `render(parse(source))`.
pub trait RoundTripTool: Send + Sync {
    fn name(&self) -> &str;

    fn round_trip(&self, source: &str) -> Result<String, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Pass,
    Mismatch,
    ParseError,
    Timeout,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Pass => "PASS",
            Outcome::Mismatch => "MISMATCH",
            Outcome::ParseError => "PARSE_ERROR",
            Outcome::Timeout => "TIMEOUT",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundTripResult {
    pub category: String,
    pub index: usize,
    pub line: usize,
    pub success: bool,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed: Option<String>,
    /// Mismatch diff, or the tool's error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    pub elapsed_ms: u64,
}

impl RoundTripResult {
    pub fn id(&self) -> String {
        format!("{}/{}", self.category, self.index)
    }

    fn new(snippet: &Snippet, outcome: Outcome, elapsed: Duration) -> Self {
        Self {
            category: snippet.category().to_string(),
            index: snippet.index(),
            line: snippet.line(),
            success: outcome.is_success(),
            outcome,
            observed: None,
            diff: None,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    pub timeout: Duration,
    pub jobs: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            jobs: 1,
        }
    }
}

pub struct Harness {
    tool: Arc<dyn RoundTripTool>,
    config: HarnessConfig,
}

impl Harness {
    pub fn new(tool: Arc<dyn RoundTripTool>, config: HarnessConfig) -> Self {
        Self { tool, config }
    }

    pub fn tool_name(&self) -> &str {
        self.tool.name()
    }

    pub fn config(&self) -> HarnessConfig {
        self.config
    }

    pub fn run(&self, snippet: &Snippet) -> RoundTripResult {
        let started = Instant::now();
        let invoked = self.invoke(snippet.text());
        let elapsed = started.elapsed();

        match invoked {
            Ok(observed) => {
                let expected = snippet.expected().unwrap_or(snippet.text());
                match SnippetDiff::new(expected, &observed) {
                    None => {
                        trace!(snippet = %snippet.id(), "round-trip matched");
                        RoundTripResult::new(snippet, Outcome::Pass, elapsed)
                    }
                    Some(diff) => {
                        debug!(snippet = %snippet.id(), line = diff.first_diff_line, "round-trip mismatch");
                        RoundTripResult {
                            observed: Some(observed),
                            diff: Some(diff.to_string()),
                            ..RoundTripResult::new(snippet, Outcome::Mismatch, elapsed)
                        }
                    }
                }
            }
            Err(Error::Timeout(err)) => {
                warn!(snippet = %snippet.id(), tool = self.tool.name(), "{err}");
                RoundTripResult {
                    diff: Some(err.to_string()),
                    ..RoundTripResult::new(snippet, Outcome::Timeout, elapsed)
                }
            }
            Err(err) => {
                debug!(snippet = %snippet.id(), error = %err, "tool rejected snippet");
                RoundTripResult {
                    diff: Some(err.to_string()),
                    ..RoundTripResult::new(snippet, Outcome::ParseError, elapsed)
                }
            }
        }
    }

    /// Run every snippet, preserving input order. With more than one job the
    /// snippets are spread over a worker pool.
    pub fn run_all(&self, snippets: &[&Snippet]) -> Vec<RoundTripResult> {
        use rayon::prelude::*;

        if self.config.jobs <= 1 || snippets.len() <= 1 {
            return snippets.iter().map(|s| self.run(s)).collect();
        }

        rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs)
            .thread_name(|i| format!("syncat-worker-{i}"))
            .build()
            .map(|pool| pool.install(|| snippets.par_iter().map(|s| self.run(s)).collect::<Vec<_>>()))
            .unwrap_or_else(|e| {
                warn!("failed to create thread pool ({e}), running sequentially");
                snippets.iter().map(|s| self.run(s)).collect()
            })
    }

    /// Call the tool on a helper thread so a hung call is abandoned after the
    /// timeout instead of stalling the batch.
    fn invoke(&self, source: &str) -> Result<String, Error> {
        let (tx, rx) = mpsc::channel();
        let tool = Arc::clone(&self.tool);
        let owned = source.to_string();

        let spawned = thread::Builder::new()
            .name("syncat-tool".to_string())
            .spawn(move || {
                let _ = tx.send(tool.round_trip(&owned));
            });

        if let Err(e) = spawned {
            warn!("failed to spawn tool thread ({e}), calling without timeout");
            return self.tool.round_trip(source).map_err(Error::from);
        }

        match rx.recv_timeout(self.config.timeout) {
            Ok(Err(ParseError::CommandTimedOut { .. })) => {
                Err(TimeoutError::new(self.config.timeout).into())
            }
            Ok(result) => result.map_err(Error::from),
            Err(RecvTimeoutError::Timeout) => {
                // Tools that bound themselves (`CommandTool`) kill their child
                // at the same deadline; let that finish before moving on.
                let _ = rx.recv_timeout(CLEANUP_GRACE);
                Err(TimeoutError::new(self.config.timeout).into())
            }
            Err(RecvTimeoutError::Disconnected) => {
                Err(ParseError::tool_panicked(self.tool.name()).into())
            }
        }
    }
}
