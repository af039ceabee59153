use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use jobharvest_core::error::AppError;
use jobharvest_core::models::{CleanRecord, NormalizedRecord};
use jobharvest_core::traits::{ExportedFiles, Exporter};
use serde::Serialize;

/// Writes a run's records as two CSV files under a directory created on demand:
/// `jobs_full_<date>.csv` with every column and `jobs_clean_<date>.csv`
/// without the description.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn full_path(&self, run_date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("jobs_full_{}.csv", run_date.format("%Y-%m-%d")))
    }

    pub fn clean_path(&self, run_date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("jobs_clean_{}.csv", run_date.format("%Y-%m-%d")))
    }
}

impl Exporter for CsvExporter {
    fn export(
        &self,
        records: &[NormalizedRecord],
        run_date: NaiveDate,
    ) -> Result<ExportedFiles, AppError> {
        fs::create_dir_all(&self.dir).map_err(|e| {
            AppError::ExportError(format!(
                "Failed to create output directory {}: {e}",
                self.dir.display()
            ))
        })?;

        let full = self.full_path(run_date);
        write_csv(&full, records.iter())?;

        let clean = self.clean_path(run_date);
        write_csv(&clean, records.iter().map(CleanRecord::from))?;

        tracing::debug!(full = %full.display(), clean = %clean.display(), "CSV written");

        Ok(ExportedFiles {
            full,
            clean,
            rows: records.len(),
        })
    }
}

fn write_csv<T, I>(path: &Path, rows: I) -> Result<(), AppError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let export_err = |e: csv::Error| AppError::ExportError(format!("{}: {e}", path.display()));

    let mut writer = csv::Writer::from_path(path).map_err(export_err)?;
    for row in rows {
        writer.serialize(row).map_err(export_err)?;
    }
    writer
        .flush()
        .map_err(|e| AppError::ExportError(format!("{}: {e}", path.display())))
}
