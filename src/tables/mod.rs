//! Table builder: folds the ordered collection of composite film records
//! into the five relational tables.
//!
//! Row order is record order, then intra-record extraction order; no sorting
//! happens here. The general table is the only one with typed columns — a
//! cell that will not coerce aborts the run (`SchemaError`), everything else
//! stays textual.

use crate::models::{FilmRecord, GeneralRow};
use crate::scraper::cleaner::{self, SchemaError};
use std::collections::HashSet;
use tracing::warn;

// ── Table ─────────────────────────────────────────────────────────────────────

/// A tidy relational table: fixed column schema, textual cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// (row count, column count)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }
}

// ── Column schemas ────────────────────────────────────────────────────────────

pub const GENERAL_COLUMNS: &[&str] = &[
    "letterboxd_id",
    "letterboxd_shorttitle",
    "letterboxd_longtitle",
    "letterboxd_slug",
    "letterboxd_url",
    "imdb_url",
    "tmdb_url",
    "tmdb_id",
    "release_year",
    "duration",
    "avg_rating",
];
pub const CAST_COLUMNS: &[&str] = &["name", "link", "character_name", "film_id", "film_title"];
pub const CREW_COLUMNS: &[&str] = &["name", "role", "link", "film_id", "film_title"];
pub const DETAIL_COLUMNS: &[&str] = &["key", "value", "link", "film_id", "film_title"];
pub const GENRE_COLUMNS: &[&str] = &["value", "film_id", "film_title"];

// ── Film tables ───────────────────────────────────────────────────────────────

/// The five output tables of one extraction run.
#[derive(Debug)]
pub struct FilmTables {
    pub general: Table,
    pub cast: Table,
    pub crew: Table,
    pub details: Table,
    pub genres_themes: Table,
}

impl FilmTables {
    fn empty() -> Self {
        Self {
            general: Table::new(GENERAL_COLUMNS),
            cast: Table::new(CAST_COLUMNS),
            crew: Table::new(CREW_COLUMNS),
            details: Table::new(DETAIL_COLUMNS),
            genres_themes: Table::new(GENRE_COLUMNS),
        }
    }

    /// Tables paired with their output file stems, in build order.
    pub fn iter_named(&self) -> impl Iterator<Item = (&'static str, &Table)> {
        [
            ("fc_generaldata", &self.general),
            ("fc_cast", &self.cast),
            ("fc_crew", &self.crew),
            ("fc_details", &self.details),
            ("fc_genresthemes", &self.genres_themes),
        ]
        .into_iter()
    }
}

/// Build the five tables from the ordered record collection. The owning
/// film's id and short title are injected into every cast / crew / detail /
/// genre row.
pub fn build_tables(records: &[FilmRecord]) -> Result<FilmTables, SchemaError> {
    let mut seen_ids: HashSet<String> = HashSet::new();

    records.iter().try_fold(FilmTables::empty(), |mut tables, record| {
        let row = cleaner::general_to_row(&record.general, &record.film_ref)?;

        if !seen_ids.insert(row.letterboxd_id.clone()) {
            warn!(
                "Duplicate film id {:?} for {} — listing should be duplicate-free",
                row.letterboxd_id, record.film_ref
            );
        }

        let film_id = row.letterboxd_id.clone();
        let film_title = row.letterboxd_shorttitle.clone();
        tables.general.rows.push(general_cells(&row));

        for member in &record.cast {
            tables.cast.rows.push(vec![
                member.name.clone(),
                member.link.clone(),
                member.character_name.clone().unwrap_or_default(),
                film_id.clone(),
                film_title.clone(),
            ]);
        }

        for member in &record.crew {
            tables.crew.rows.push(vec![
                member.name.clone(),
                member.role.clone(),
                member.link.clone(),
                film_id.clone(),
                film_title.clone(),
            ]);
        }

        for detail in &record.details {
            tables.details.rows.push(vec![
                detail.key.clone(),
                detail.value.clone(),
                detail.link.clone(),
                film_id.clone(),
                film_title.clone(),
            ]);
        }

        for tag in &record.genres_themes {
            tables
                .genres_themes
                .rows
                .push(vec![tag.clone(), film_id.clone(), film_title.clone()]);
        }

        Ok(tables)
    })
}

/// Render one typed general row as textual cells. Rating is fixed at two
/// decimal places in the output.
fn general_cells(row: &GeneralRow) -> Vec<String> {
    vec![
        row.letterboxd_id.clone(),
        row.letterboxd_shorttitle.clone(),
        row.letterboxd_longtitle.clone(),
        row.letterboxd_slug.clone(),
        row.letterboxd_url.clone(),
        row.imdb_url.clone(),
        row.tmdb_url.clone(),
        row.tmdb_id.clone(),
        row.release_year.to_string(),
        row.duration.to_string(),
        format!("{:.2}", row.avg_rating),
    ]
}

// ── Tests ─────────────────────────────────────────────────────────────────────
