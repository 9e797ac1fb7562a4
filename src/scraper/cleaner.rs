use crate::models::{DETAIL_KEY_UNRECOGNIZED, GeneralRow, RawGeneralData};
use regex::Regex;

// ── Text extraction helpers ───────────────────────────────────────────────────

/// Release year: first parenthesized 4-digit number, twitter card title
/// first, open-graph title second.
/// "Dune: Part Two (2024)" → "2024"
pub fn search_year(twitter_title: &str, og_title: &str) -> Option<String> {
    let re = Regex::new(r"\((\d{4})\)").ok()?;
    re.captures(twitter_title)
        .or_else(|| re.captures(og_title))
        .map(|c| c[1].to_string())
}

/// Runtime in minutes from the footer text block.
/// "166 mins   More at IMDb TMDb" → "166"
pub fn search_duration(footer_text: &str) -> Option<String> {
    let text = footer_text.replace('\u{a0}', " ");
    let re = Regex::new(r"(\d+)\s+mins").ok()?;
    re.captures(&text).map(|c| c[1].to_string())
}

/// Average rating from the twitter "data2" card. "4.3 out of 5" → "4.3"
pub fn search_rating(twitter_data: &str) -> Option<String> {
    let re = Regex::new(r"\d+(\.\d+)?").ok()?;
    re.find(twitter_data).map(|m| m.as_str().to_string())
}

/// Short title from a long open-graph title: cut at the first " (".
/// "Dune: Part Two (2024)" → "Dune: Part Two"
pub fn short_title_from_og(og_title: &str) -> String {
    match og_title.split_once(" (") {
        Some((short, _)) => short.to_string(),
        None => og_title.to_string(),
    }
}

// ── Link helpers ──────────────────────────────────────────────────────────────

/// Site-relative film path from an item link. Absolute URLs are cut down to
/// their "/film/…" segment; an absolute URL without one yields nothing.
pub fn film_path(link: &str) -> Option<String> {
    if !link.starts_with("http") {
        return Some(link.to_string());
    }
    link.split_once("/film/")
        .map(|(_, rest)| format!("/film/{}", rest))
}

/// Last non-empty path segment of a film link.
/// "/film/dune-part-two/" → "dune-part-two"
pub fn slug_from_link(link: &str) -> Option<String> {
    let slug = link.trim_end_matches('/').rsplit('/').next()?;
    if slug.is_empty() {
        None
    } else {
        Some(slug.to_string())
    }
}

/// TMDb numeric id: second-to-last path segment of the outbound URL.
/// "https://www.themoviedb.org/movie/693134/" → "693134"
pub fn tmdb_id_from_url(url: &str) -> Option<String> {
    let mut segments = url.split('/').rev();
    segments.next()?;
    let id = segments.next()?;
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Canonical TMDb URL synthesized from the page's data attributes.
pub fn synthesize_tmdb_url(kind: &str, id: &str) -> String {
    format!("https://www.themoviedb.org/{}/{}", kind, id)
}

/// Crew role from a person link: path segment at position 1.
/// "/director/denis-villeneuve/" → "director"
///
/// Assumes the crew tab links people as /{role}/{person}/. The site has kept
/// that shape for every role label seen so far, but it is an assumption about
/// markup, not a guarantee; a link that does not fit yields `None` and the
/// caller degrades the whole crew block.
pub fn role_from_link(href: &str) -> Option<String> {
    let role = href.split('/').nth(1)?;
    if role.is_empty() {
        None
    } else {
        Some(role.to_string())
    }
}

/// Classify a detail anchor by href substring, in priority order
/// studio → country → language. Unrecognized patterns are tagged, never
/// dropped.
pub fn classify_detail_key(href: &str) -> &'static str {
    if href.contains("studio") {
        "studio"
    } else if href.contains("country") {
        "country"
    } else if href.contains("language") {
        "language"
    } else {
        DETAIL_KEY_UNRECOGNIZED
    }
}

// ── Schema coercion ───────────────────────────────────────────────────────────

/// A general-table cell that will not coerce to its column type. Fatal for
/// the run: it means the site's markup shape has drifted past the extractors'
/// assumptions.
#[derive(Debug, thiserror::Error)]
#[error("film {film}: column {column} value {value:?} is not {expected}")]
pub struct SchemaError {
    pub film: String,
    pub column: &'static str,
    pub value: String,
    pub expected: &'static str,
}

/// Coerce one film's raw general data into a typed general row.
pub fn general_to_row(raw: &RawGeneralData, film: &str) -> Result<GeneralRow, SchemaError> {
    Ok(GeneralRow {
        letterboxd_id: raw.letterboxd_id.clone().unwrap_or_default(),
        letterboxd_shorttitle: raw.shorttitle.clone().unwrap_or_default(),
        letterboxd_longtitle: raw.longtitle.clone().unwrap_or_default(),
        letterboxd_slug: raw.slug.clone().unwrap_or_default(),
        letterboxd_url: raw.url.clone().unwrap_or_default(),
        imdb_url: raw.imdb_url.clone().unwrap_or_default(),
        tmdb_url: raw.tmdb_url.clone().unwrap_or_default(),
        tmdb_id: raw.tmdb_id.clone().unwrap_or_default(),
        release_year: coerce_int(film, "release_year", raw.release_year.as_deref())?,
        duration: coerce_int(film, "duration", raw.duration.as_deref())?,
        avg_rating: coerce_float(film, "avg_rating", raw.avg_rating.as_deref())?,
    })
}

fn coerce_int(film: &str, column: &'static str, value: Option<&str>) -> Result<i64, SchemaError> {
    let value = value.unwrap_or("");
    value.trim().parse().map_err(|_| SchemaError {
        film: film.to_string(),
        column,
        value: value.to_string(),
        expected: "an integer",
    })
}

fn coerce_float(film: &str, column: &'static str, value: Option<&str>) -> Result<f64, SchemaError> {
    let value = value.unwrap_or("");
    value.trim().parse().map_err(|_| SchemaError {
        film: film.to_string(),
        column,
        value: value.to_string(),
        expected: "a decimal",
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
