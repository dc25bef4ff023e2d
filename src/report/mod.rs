pub mod html;
pub mod json_export;

use chrono::{DateTime, Utc};
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::config::{OutputConfig, SearchCriteria};
use crate::domain::DashboardEntry;
use crate::error::Result;

/// Paths of the artifacts one run produced.
#[derive(Debug)]
pub struct ReportArtifacts {
    pub dashboard: PathBuf,
    pub data: PathBuf,
}

/// Writes both run artifacts: the browsable dashboard and the JSON export.
/// The run exists to produce these files, so any write failure here is the
/// run's failure.
pub fn write_report(
    entries: &[DashboardEntry],
    criteria: &SearchCriteria,
    output: &OutputConfig,
    generated_at: DateTime<Utc>,
) -> Result<ReportArtifacts> {
    fs::create_dir_all(&output.dir)?;

    let data_path = output.dir.join(&output.data_filename);
    json_export::write_export(&data_path, entries, criteria, generated_at)?;

    let dashboard_path = output.dir.join(&output.dashboard_filename);
    let shown = entries.len().min(output.max_dashboard_listings);
    let html = html::render_dashboard(&entries[..shown], entries.len(), generated_at)?;
    fs::write(&dashboard_path, html)?;

    info!(
        dashboard = %dashboard_path.display(),
        data = %data_path.display(),
        "report written"
    );

    Ok(ReportArtifacts {
        dashboard: dashboard_path,
        data: data_path,
    })
}
