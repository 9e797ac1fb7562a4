//! Pipeline orchestrator: listing → film pages → tables → CSVs → report.
//!
//! Sequential by design: one page is fetched and processed at a time, in
//! reference order. There is no retry layer and no concurrent fan-out, so a
//! failed run is simply rerun — extraction is idempotent against unchanged
//! site content.

use crate::config::AppConfig;
use crate::report;
use crate::scraper::{self, FilmPageSource, LetterboxdSource};
use crate::storage::TableStore;
use crate::tables;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

pub struct Pipeline {
    config: AppConfig,
}

#[derive(Debug)]
pub struct PipelineStats {
    pub films_processed: usize,
    pub rows_written: usize,
    pub all_match: bool,
}

impl Pipeline {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub async fn run(&self, list_url: &str, suffix: &str, report_path: &Path) -> Result<PipelineStats> {
        let source = LetterboxdSource::new(&self.config.scraper)
            .context("Failed to build page source")?;
        self.run_with_source(&source, list_url, suffix, report_path).await
    }

    /// The full pipeline against any page source — the seam tests use to run
    /// it over fixture pages.
    pub async fn run_with_source(
        &self,
        source: &dyn FilmPageSource,
        list_url: &str,
        suffix: &str,
        report_path: &Path,
    ) -> Result<PipelineStats> {
        // ── 1. Collect film references ────────────────────────────────────────
        info!("=== Step 1: Collecting film references ===");
        let refs = scraper::collect_film_refs(source, list_url)
            .await
            .context("Listing pagination failed")?;

        // ── 2. Extract every film page, in reference order ────────────────────
        info!("=== Step 2: Extracting {} film pages ===", refs.len());
        let mut records = Vec::with_capacity(refs.len());
        for (i, film_ref) in refs.iter().enumerate() {
            info!("Extracting film {}/{}: {}", i + 1, refs.len(), film_ref);
            let record = scraper::assemble_film(source, film_ref)
                .await
                .with_context(|| format!("Extraction failed for {}", film_ref))?;
            records.push(record);
        }

        // ── 3. Build and persist the tables ───────────────────────────────────
        info!("=== Step 3: Building tables ===");
        let film_tables = tables::build_tables(&records).context("Table build failed")?;

        let store = TableStore::open(&self.config.output.data_dir)?;
        let written = store.write_all(&film_tables, suffix)?;
        let rows_written = film_tables.iter_named().map(|(_, t)| t.rows.len()).sum();

        // ── 4. Compare against the previous snapshot ──────────────────────────
        info!("=== Step 4: Consistency report ===");
        let pairs: Vec<_> = written
            .iter()
            .map(|(stem, path)| (*stem, path.clone(), store.csv_path(stem, "")))
            .collect();
        let (text, all_match) = report::build_report(&pairs, report_path)?;
        println!("{}", text);

        Ok(PipelineStats {
            films_processed: records.len(),
            rows_written,
            all_match,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
