use serde::{Deserialize, Serialize};

// ── Raw general metadata ──────────────────────────────────────────────────────

/// Per-film general metadata exactly as found in the markup.
///
/// Every field is optional: the extractors record absence, the table builder
/// decides what absence means. No sentinel values — "no rating" is `None`,
/// never `0`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawGeneralData {
    pub letterboxd_id: Option<String>,
    pub shorttitle: Option<String>,
    pub longtitle: Option<String>,
    pub slug: Option<String>,
    pub url: Option<String>,
    pub imdb_url: Option<String>,
    pub tmdb_url: Option<String>,
    pub tmdb_id: Option<String>,
    pub release_year: Option<String>,
    pub duration: Option<String>,
    pub avg_rating: Option<String>,
}

// ── Cast / crew / details / tags ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct CastMember {
    pub name: String,
    pub link: String,
    /// From the anchor's title attribute; uncredited roles have none.
    pub character_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrewMember {
    pub name: String,
    /// Open vocabulary taken from the link structure (director, writer, …).
    pub role: String,
    pub link: String,
}

/// Key for a detail anchor whose href matches none of the known patterns.
pub const DETAIL_KEY_UNRECOGNIZED: &str = "ERROR";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailItem {
    /// studio | country | language | ERROR
    pub key: String,
    pub value: String,
    pub link: String,
}

// ── Composite record ──────────────────────────────────────────────────────────

/// Everything extracted for a single film: the five category fragments plus
/// the reference that produced them.
#[derive(Debug, Clone, Default)]
pub struct FilmRecord {
    pub film_ref: String,
    pub general: RawGeneralData,
    pub cast: Vec<CastMember>,
    pub crew: Vec<CrewMember>,
    pub details: Vec<DetailItem>,
    pub genres_themes: Vec<String>,
}

// ── Typed general row ─────────────────────────────────────────────────────────

/// One row of the general table after schema coercion. String fields default
/// to empty when absent; the numeric columns must coerce or the run aborts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralRow {
    pub letterboxd_id: String,
    pub letterboxd_shorttitle: String,
    pub letterboxd_longtitle: String,
    pub letterboxd_slug: String,
    pub letterboxd_url: String,
    pub imdb_url: String,
    pub tmdb_url: String,
    pub tmdb_id: String,
    pub release_year: i64,
    pub duration: i64,
    pub avg_rating: f64,
}
