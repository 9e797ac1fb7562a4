pub mod cleaner;
pub mod http_client;
pub mod parsers;

use crate::config::ScraperConfig;
use crate::models::FilmRecord;
use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::Html;
use tracing::{debug, info};
use url::Url;

use self::http_client::HttpClient;

// ── Source trait ──────────────────────────────────────────────────────────────

/// Swappable page source abstraction. The pipeline only ever asks for raw
/// markup, so tests can feed it fixture pages instead of the live site.
#[async_trait]
pub trait FilmPageSource: Send + Sync {
    /// Raw markup for one page of the film listing (1-based).
    async fn listing_page(&self, list_url: &str, page: u32) -> Result<String>;

    /// Raw markup for one film's detail page, given its reference path.
    async fn film_page(&self, film_ref: &str) -> Result<String>;
}

// ── Letterboxd source ─────────────────────────────────────────────────────────

pub struct LetterboxdSource {
    client: HttpClient,
    base_url: String,
}

impl LetterboxdSource {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL for one page of a listing.  page 2 → <list>/page/2/
    fn listing_url(list_url: &str, page: u32) -> String {
        let mut url = list_url.to_string();
        if !url.ends_with('/') {
            url.push('/');
        }
        format!("{}page/{}/", url, page)
    }

    /// Absolute URL for a film reference path.
    fn film_url(&self, film_ref: &str) -> Result<String> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL {}", self.base_url))?;
        let url = base
            .join(film_ref)
            .with_context(|| format!("Invalid film reference {}", film_ref))?;
        Ok(url.into())
    }
}

#[async_trait]
impl FilmPageSource for LetterboxdSource {
    async fn listing_page(&self, list_url: &str, page: u32) -> Result<String> {
        let url = Self::listing_url(list_url, page);
        self.client
            .get_text(&url)
            .await
            .with_context(|| format!("Failed to fetch listing page {}", page))
    }

    async fn film_page(&self, film_ref: &str) -> Result<String> {
        let url = self.film_url(film_ref)?;
        self.client
            .get_text(&url)
            .await
            .with_context(|| format!("Failed to fetch film page {}", film_ref))
    }
}

// ── List paginator ────────────────────────────────────────────────────────────

/// Walk listing pages in order until the first page with no film references.
/// An empty page means end-of-list; a fetch failure aborts the run.
pub async fn collect_film_refs(
    source: &dyn FilmPageSource,
    list_url: &str,
) -> Result<Vec<String>> {
    let mut all_refs = Vec::new();
    let mut page = 1u32;

    loop {
        info!("Fetching listing page {}", page);
        let html = source.listing_page(list_url, page).await?;

        let refs = parsers::parse_listing_refs(&html);
        if refs.is_empty() {
            debug!("Empty page {} — end of list", page);
            break;
        }

        info!("  Page {}: {} film references", page, refs.len());
        all_refs.extend(refs);
        page += 1;
    }

    info!("Total film references discovered: {}", all_refs.len());
    Ok(all_refs)
}

// ── Record assembler ──────────────────────────────────────────────────────────

/// Fetch one film's detail page and run every extractor against the same
/// parsed markup. The extractors are independent of each other; the parse
/// tree lives only for the duration of this call.
pub async fn assemble_film(source: &dyn FilmPageSource, film_ref: &str) -> Result<FilmRecord> {
    let html = source.film_page(film_ref).await?;
    let doc = Html::parse_document(&html);

    Ok(FilmRecord {
        film_ref: film_ref.to_string(),
        general: parsers::extract_general(&doc),
        cast: parsers::extract_cast(&doc),
        crew: parsers::extract_crew(&doc),
        details: parsers::extract_details(&doc),
        genres_themes: parsers::extract_genres_themes(&doc),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
