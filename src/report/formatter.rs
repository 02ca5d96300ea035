use anyhow::Result;
use serde::Serialize;
use std::fmt::Write;

use crate::cli::OutputFormat;
use crate::harness::RoundTripResult;

use super::Summary;

/// Results of running one catalogue snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotReport {
    pub snapshot: String,
    pub tool: String,
    pub summary: Summary,
    pub results: Vec<RoundTripResult>,
    pub unknown_categories: Vec<String>,
}

impl SnapshotReport {
    pub fn passed(&self) -> bool {
        self.summary.all_passed() && self.unknown_categories.is_empty()
    }
}

#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub snapshots_run: usize,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub snapshots: Vec<SnapshotJson>,
}

#[derive(Debug, Serialize)]
pub struct SnapshotJson {
    pub snapshot: String,
    pub tool: String,
    #[serde(flatten)]
    pub summary: Summary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unknown_categories: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_results: Vec<RoundTripResult>,
}

pub struct ReportFormatter;

impl ReportFormatter {
    pub fn format(
        reports: &[SnapshotReport],
        format: OutputFormat,
        show_diffs: bool,
    ) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(Self::render_text(reports, show_diffs)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(&Self::build_output(reports))?),
        }
    }

    pub fn build_output(reports: &[SnapshotReport]) -> JsonOutput {
        let snapshots: Vec<SnapshotJson> = reports
            .iter()
            .map(|report| SnapshotJson {
                snapshot: report.snapshot.clone(),
                tool: report.tool.clone(),
                summary: report.summary.clone(),
                unknown_categories: report.unknown_categories.clone(),
                failed_results: report
                    .results
                    .iter()
                    .filter(|r| !r.success)
                    .cloned()
                    .collect(),
            })
            .collect();

        JsonOutput {
            snapshots_run: snapshots.len(),
            total: reports.iter().map(|r| r.summary.total).sum(),
            passed: reports.iter().map(|r| r.summary.passed).sum(),
            failed: reports.iter().map(|r| r.summary.failed).sum(),
            snapshots,
        }
    }

    /// One `<category>/<index>: <KIND>` line per failure, then a totals line
    /// per snapshot. Diffs are indented under their failure line.
    pub fn render_text(reports: &[SnapshotReport], show_diffs: bool) -> String {
        let mut out = String::new();
        let with_headers = reports.len() > 1;

        for report in reports {
            if with_headers {
                let _ = writeln!(out, "== {} ({}) ==", report.snapshot, report.tool);
            }

            for category in &report.unknown_categories {
                let _ = writeln!(out, "unknown category: {category}");
            }

            for failure in &report.summary.failures {
                let _ = writeln!(out, "{failure}");
                if !show_diffs {
                    continue;
                }
                let detail = report
                    .results
                    .iter()
                    .find(|r| r.category == failure.category && r.index == failure.index)
                    .and_then(|r| r.diff.as_deref());
                if let Some(detail) = detail {
                    for line in detail.lines() {
                        let _ = writeln!(out, "    {line}");
                    }
                }
            }

            let summary = &report.summary;
            let _ = writeln!(
                out,
                "{}: {} total, {} passed, {} failed",
                report.snapshot, summary.total, summary.passed, summary.failed
            );
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::Outcome;
    use crate::report::summarize;
    use pretty_assertions::assert_eq;

    fn result(category: &str, index: usize, outcome: Outcome, diff: Option<&str>) -> RoundTripResult {
        RoundTripResult {
            category: category.to_string(),
            index,
            line: 1,
            success: outcome.is_success(),
            outcome,
            observed: None,
            diff: diff.map(str::to_string),
            elapsed_ms: 0,
        }
    }

    fn report(results: Vec<RoundTripResult>, unknown: Vec<String>) -> SnapshotReport {
        SnapshotReport {
            snapshot: "basic_syntax".to_string(),
            tool: "lossless".to_string(),
            summary: summarize(&results),
            results,
            unknown_categories: unknown,
        }
    }

    #[test]
    fn test_render_text_lists_failures() {
        let reports = vec![report(
            vec![
                result("int-literals", 0, Outcome::Pass, None),
                result("string-literals", 1, Outcome::Mismatch, Some("line 1:\n-a\n+b")),
                result("asyncio", 0, Outcome::Timeout, Some("round-trip exceeded 5 ms")),
            ],
            vec![],
        )];

        let text = ReportFormatter::render_text(&reports, false);
        assert_eq!(
            text,
            "string-literals/1: MISMATCH\nasyncio/0: TIMEOUT\nbasic_syntax: 3 total, 1 passed, 2 failed\n"
        );
    }

    #[test]
    fn test_render_text_with_diffs() {
        let reports = vec![report(
            vec![result("string-literals", 1, Outcome::Mismatch, Some("line 1:\n-a\n+b"))],
            vec![],
        )];

        let text = ReportFormatter::render_text(&reports, true);
        assert_eq!(
            text,
            "string-literals/1: MISMATCH\n    line 1:\n    -a\n    +b\nbasic_syntax: 1 total, 0 passed, 1 failed\n"
        );
    }

    #[test]
    fn test_unknown_category_fails_report() {
        let report = report(
            vec![result("maths", 0, Outcome::Pass, None)],
            vec!["matmul".to_string()],
        );
        assert!(!report.passed());
        let text = ReportFormatter::render_text(std::slice::from_ref(&report), false);
        assert!(text.starts_with("unknown category: matmul\n"));
    }

    #[test]
    fn test_json_output_totals() {
        let reports = vec![report(
            vec![
                result("maths", 0, Outcome::Pass, None),
                result("maths", 1, Outcome::ParseError, Some("syntax error")),
            ],
            vec![],
        )];

        let json = ReportFormatter::format(&reports, OutputFormat::Json, false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["snapshots"][0]["snapshot"], "basic_syntax");
        assert_eq!(value["snapshots"][0]["failures"][0]["outcome"], "parse_error");
        assert_eq!(value["snapshots"][0]["failed_results"][0]["diff"], "syntax error");
    }
}
