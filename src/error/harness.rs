use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("round-trip exceeded {} ms", .timeout.as_millis())]
pub struct TimeoutError {
    pub timeout: Duration,
}

impl TimeoutError {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}
