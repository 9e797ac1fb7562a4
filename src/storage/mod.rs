use crate::tables::{FilmTables, Table};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// File stems for the five output tables, in build order.
pub const TABLE_STEMS: [&str; 5] = [
    "fc_generaldata",
    "fc_cast",
    "fc_crew",
    "fc_details",
    "fc_genresthemes",
];

/// Field separator shared by every output table and the downstream analysis
/// stage.
pub const DELIMITER: u8 = b';';

// ── Table store ───────────────────────────────────────────────────────────────

/// CSV persistence for the five tables. Files are rebuilt wholesale on every
/// run; a previous run's files are comparison inputs, never mutated.
pub struct TableStore {
    data_dir: PathBuf,
}

impl TableStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Could not create dir {:?}", data_dir))?;
        Ok(Self {
            data_dir: data_dir.to_path_buf(),
        })
    }

    /// Path of one table file.  ("fc_cast", "_new") → <dir>/fc_cast_new.csv
    pub fn csv_path(&self, stem: &str, suffix: &str) -> PathBuf {
        self.data_dir.join(format!("{}{}.csv", stem, suffix))
    }

    /// Write all five tables, returning (stem, path) pairs in build order.
    pub fn write_all(
        &self,
        tables: &FilmTables,
        suffix: &str,
    ) -> Result<Vec<(&'static str, PathBuf)>> {
        let mut written = Vec::new();
        for (stem, table) in tables.iter_named() {
            let path = self.csv_path(stem, suffix);
            write_csv(&path, table)?;
            info!("{}: {} rows → {:?}", stem, table.rows.len(), path);
            written.push((stem, path));
        }
        Ok(written)
    }

    pub fn read_table(&self, stem: &str, suffix: &str) -> Result<Table> {
        read_csv(&self.csv_path(stem, suffix))
    }
}

// ── CSV round-trip ────────────────────────────────────────────────────────────

pub fn write_csv(path: &Path, table: &Table) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?} for writing", path))?;

    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)
        .with_context(|| format!("Failed to open {:?} for reading", path))?;

    let columns = reader
        .headers()
        .with_context(|| format!("Failed to read header of {:?}", path))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.with_context(|| format!("Malformed row in {:?}", path))?;
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }

    Ok(Table { columns, rows })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
