//! Summaries of a harness run.

mod formatter;

use serde::Serialize;
use std::fmt;

use crate::harness::{Outcome, RoundTripResult};

pub use formatter::{JsonOutput, ReportFormatter, SnapshotReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedSnippet {
    pub category: String,
    pub index: usize,
    pub outcome: Outcome,
}

impl fmt::Display for FailedSnippet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}: {}", self.category, self.index, self.outcome.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub category: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub failures: Vec<FailedSnippet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<CategorySummary>,
}

impl Summary {
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Count results overall and per category. Failures and categories keep the
/// order in which they appear in `results`.
pub fn summarize(results: &[RoundTripResult]) -> Summary {
    let mut summary = Summary::default();

    for result in results {
        summary.total += 1;

        let position = summary
            .categories
            .iter()
            .position(|c| c.category == result.category);
        let category = match position {
            Some(i) => &mut summary.categories[i],
            None => {
                summary.categories.push(CategorySummary {
                    category: result.category.clone(),
                    total: 0,
                    passed: 0,
                    failed: 0,
                });
                let last = summary.categories.len() - 1;
                &mut summary.categories[last]
            }
        };
        category.total += 1;

        if result.success {
            summary.passed += 1;
            category.passed += 1;
        } else {
            summary.failed += 1;
            category.failed += 1;
            summary.failures.push(FailedSnippet {
                category: result.category.clone(),
                index: result.index,
                outcome: result.outcome,
            });
        }
    }

    summary
}
