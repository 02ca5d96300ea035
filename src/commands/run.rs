use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::{load_catalogues, RunStatus};
use crate::catalogue::Catalogue;
use crate::cli::RunArgs;
use crate::config::RunConfig;
use crate::error::ConfigError;
use crate::harness::Harness;
use crate::logging::Verbosity;
use crate::report::{summarize, ReportFormatter, SnapshotReport};
use crate::tools;

pub fn execute_run(args: &RunArgs, verbosity: Verbosity) -> Result<RunStatus> {
    args.validate().context("Invalid arguments")?;
    let config = RunConfig::resolve(args).context("Invalid configuration")?;
    let catalogues = load_catalogues(&args.source).context("Failed to load catalogue")?;

    let reports = catalogues
        .iter()
        .map(|catalogue| run_catalogue(catalogue, &config))
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to set up the round-trip tool")?;

    debug!(format = args.format.as_str(), reports = reports.len(), "rendering report");
    let rendered = ReportFormatter::format(&reports, args.format, verbosity.show_diffs())?;
    write_output(&rendered, args.output_file.as_deref())?;

    if reports.iter().all(SnapshotReport::passed) {
        Ok(RunStatus::Passed)
    } else {
        Ok(RunStatus::Failed)
    }
}

/// Run the configured categories of one snapshot. Unknown categories are
/// recorded on the report and never stop the known ones from running.
pub fn run_catalogue(catalogue: &Catalogue, config: &RunConfig) -> Result<SnapshotReport, ConfigError> {
    let harness_config = config.harness_config();
    let tool = tools::build(
        config.tool,
        catalogue.language(),
        config.command.as_deref(),
        harness_config.timeout,
    )?;
    let harness = Harness::new(tool, harness_config);

    let (snippets, missing) = catalogue.select(&config.categories);
    for err in &missing {
        warn!(snapshot = catalogue.name(), "{err}");
    }

    info!(
        snapshot = catalogue.name(),
        snippets = snippets.len(),
        tool = harness.tool_name(),
        kind = config.tool.as_str(),
        jobs = config.jobs,
        "running round-trips"
    );
    let results = harness.run_all(&snippets);
    let summary = summarize(&results);
    info!(
        snapshot = catalogue.name(),
        passed = summary.passed,
        failed = summary.failed,
        "round-trips finished"
    );

    Ok(SnapshotReport {
        snapshot: catalogue.name().to_string(),
        tool: harness.tool_name().to_string(),
        summary,
        results,
        unknown_categories: missing.into_iter().map(|e| e.category).collect(),
    })
}

fn write_output(rendered: &str, output_file: Option<&Path>) -> Result<()> {
    match output_file {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("Failed to write report: {}", path.display())),
        None => {
            print!("{rendered}");
            Ok(())
        }
    }
}
