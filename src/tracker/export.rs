use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;

use crate::{
    storage::{
        attendance::AttendanceLog,
        entities::{Configuration, RuntimeState},
    },
    utils::time::date_to_record_name,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Settings, runtime state and attendance.
    Full,
    Attendance,
}

impl ExportKind {
    pub fn file_name(&self, date: NaiveDate) -> String {
        let prefix = match self {
            ExportKind::Full => "salary_data",
            ExportKind::Attendance => "attendance_records",
        };
        format!("{prefix}_{}.json", date_to_record_name(date))
    }
}

#[derive(Serialize)]
struct FullExport<'a> {
    config: &'a Configuration,
    state: &'a RuntimeState,
    attendance_records: &'a AttendanceLog,
    export_date: DateTime<Utc>,
}

#[derive(Serialize)]
struct AttendanceExport<'a> {
    attendance_records: &'a AttendanceLog,
    export_date: DateTime<Utc>,
}

/// A rendered export, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportDocument {
    pub file_name: String,
    pub content: String,
}

impl ExportDocument {
    pub fn new(
        kind: ExportKind,
        config: &Configuration,
        state: &RuntimeState,
        attendance: &AttendanceLog,
        export_date: DateTime<Utc>,
        local_date: NaiveDate,
    ) -> Result<Self> {
        let content = match kind {
            ExportKind::Full => serde_json::to_string_pretty(&FullExport {
                config,
                state,
                attendance_records: attendance,
                export_date,
            })?,
            ExportKind::Attendance => serde_json::to_string_pretty(&AttendanceExport {
                attendance_records: attendance,
                export_date,
            })?,
        };
        Ok(Self {
            file_name: kind.file_name(local_date),
            content,
        })
    }

    /// Saves the document into `dir` under its file name.
    pub async fn write_into(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {dir:?}"))?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.content)
            .await
            .with_context(|| format!("Failed to write export into {path:?}"))?;
        info!("Exported into {path:?}");
        Ok(path)
    }
}
