use crate::models::{CastMember, CrewMember, DetailItem, RawGeneralData};
use scraper::{ElementRef, Html, Selector};

use super::cleaner;

// ── Selector helpers ──────────────────────────────────────────────────────────

// Lookups for optional fields return Option instead of erroring: a missing
// element, a malformed attribute, even an unparseable selector all read as
// "not found" and leave the remaining fields untouched.

fn select_first<'a>(doc: &'a Html, selector: &str) -> Option<ElementRef<'a>> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel).next()
}

fn attr_of(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let value = select_first(doc, selector)?.value().attr(attr)?;
    Some(value.to_string())
}

fn text_of(doc: &Html, selector: &str) -> Option<String> {
    let el = select_first(doc, selector)?;
    let text = el.text().collect::<String>().trim().to_string();
    if text.is_empty() { None } else { Some(text) }
}

fn meta_content(doc: &Html, selector: &str) -> Option<String> {
    attr_of(doc, selector, "content")
}

fn anchor_text(a: &ElementRef) -> String {
    a.text().collect::<String>().trim().to_string()
}

// ── Listing page ──────────────────────────────────────────────────────────────

/// Ranked selector strategies for film references on a listing page, tried in
/// order; the first strategy yielding any results wins for that page.
const REF_STRATEGIES: &[(&str, &str)] = &[
    ("[data-item-link]", "data-item-link"),
    ("[data-target-link]", "data-target-link"),
    (r#"a[href^="/film/"]"#, "href"),
];

pub fn parse_listing_refs(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);

    for (selector_str, attr) in REF_STRATEGIES {
        let Ok(sel) = Selector::parse(selector_str) else {
            continue;
        };

        let refs: Vec<String> = doc
            .select(&sel)
            .filter_map(|el| el.value().attr(attr))
            .filter(|href| !href.is_empty())
            .map(|href| href.to_string())
            .collect();

        if !refs.is_empty() {
            return refs;
        }
    }

    Vec::new()
}

// ── General metadata ──────────────────────────────────────────────────────────

/// Extract the general metadata block. Each field's lookup is isolated: one
/// field failing to resolve leaves every other field intact.
pub fn extract_general(doc: &Html) -> RawGeneralData {
    let mut data = RawGeneralData::default();

    // Item-link element first, film-id attribute carrier second
    let film_el =
        select_first(doc, "[data-item-link]").or_else(|| select_first(doc, "[data-film-id]"));

    data.letterboxd_id = film_el
        .and_then(|el| el.value().attr("data-film-id"))
        .map(str::to_string);

    let og_url = meta_content(doc, r#"meta[property="og:url"]"#);

    let film_link = film_el
        .and_then(|el| el.value().attr("data-item-link"))
        .map(str::to_string)
        .or_else(|| og_url.clone())
        .and_then(|link| cleaner::film_path(&link));

    data.slug = film_link.as_deref().and_then(cleaner::slug_from_link);
    data.url = og_url;

    let og_title = meta_content(doc, r#"meta[property="og:title"]"#);
    data.shorttitle = text_of(doc, "h1.filmtitle")
        .or_else(|| og_title.as_deref().map(cleaner::short_title_from_og));
    data.longtitle = og_title.clone();

    let twitter_title = meta_content(doc, r#"meta[name="twitter:title"]"#);
    data.release_year = cleaner::search_year(
        twitter_title.as_deref().unwrap_or(""),
        og_title.as_deref().unwrap_or(""),
    );

    data.duration = text_of(doc, ".text-footer")
        .as_deref()
        .and_then(cleaner::search_duration);

    data.avg_rating = text_of(doc, "a.has-icon.icon-watched.icon-16.tooltip").or_else(|| {
        meta_content(doc, r#"meta[name="twitter:data2"]"#)
            .as_deref()
            .and_then(cleaner::search_rating)
    });

    data.imdb_url = attr_of(doc, r#"a[data-track-action="IMDb"]"#, "href");
    data.tmdb_url = attr_of(doc, r#"a[data-track-action="TMDb"]"#, "href");

    match &data.tmdb_url {
        // Tracked outbound link carries the id in its path
        Some(url) => data.tmdb_id = cleaner::tmdb_id_from_url(url),
        // No outbound link: the body data attributes carry id and type
        None => {
            if let Some(id) = attr_of(doc, "body", "data-tmdb-id") {
                let kind =
                    attr_of(doc, "body", "data-tmdb-type").unwrap_or_else(|| "movie".to_string());
                data.tmdb_url = Some(cleaner::synthesize_tmdb_url(&kind, &id));
                data.tmdb_id = Some(id);
            }
        }
    }

    data
}

// ── Cast ──────────────────────────────────────────────────────────────────────

/// Every tooltip anchor in the cast container is one cast entry. A missing
/// container or a malformed anchor degrades to an empty list.
pub fn extract_cast(doc: &Html) -> Vec<CastMember> {
    try_extract_cast(doc).unwrap_or_default()
}

fn try_extract_cast(doc: &Html) -> Option<Vec<CastMember>> {
    let container = select_first(doc, "div.cast-list")?;
    let sel = Selector::parse("a.tooltip").ok()?;

    let mut cast = Vec::new();
    for a in container.select(&sel) {
        let link = a.value().attr("href")?.to_string();
        cast.push(CastMember {
            name: anchor_text(&a),
            link,
            character_name: a.value().attr("title").map(str::to_string),
        });
    }
    Some(cast)
}

// ── Crew ──────────────────────────────────────────────────────────────────────

/// Every anchor in the crew tab is one crew entry; the role comes from the
/// link structure. Same whole-block degradation policy as cast.
pub fn extract_crew(doc: &Html) -> Vec<CrewMember> {
    try_extract_crew(doc).unwrap_or_default()
}

fn try_extract_crew(doc: &Html) -> Option<Vec<CrewMember>> {
    let tab = select_first(doc, "#tab-crew")?;
    let sel = Selector::parse("a").ok()?;

    let mut crew = Vec::new();
    for a in tab.select(&sel) {
        let link = a.value().attr("href")?.to_string();
        let role = cleaner::role_from_link(&link)?;
        crew.push(CrewMember {
            name: anchor_text(&a),
            role,
            link,
        });
    }
    Some(crew)
}

// ── Details ───────────────────────────────────────────────────────────────────

/// Every anchor in the details tab is one entry, keyed by href pattern. An
/// unrecognized pattern is tagged with the explicit marker key so the gap
/// shows up in the output instead of vanishing.
pub fn extract_details(doc: &Html) -> Vec<DetailItem> {
    let Some(tab) = select_first(doc, "#tab-details") else {
        return Vec::new();
    };
    let Ok(sel) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut details = Vec::new();
    for a in tab.select(&sel) {
        let link = a.value().attr("href").unwrap_or_default().to_string();
        details.push(DetailItem {
            key: cleaner::classify_detail_key(&link).to_string(),
            value: anchor_text(&a),
            link,
        });
    }
    details
}

// ── Genres & themes ───────────────────────────────────────────────────────────

/// Every anchor in the genres tab except the trailing "show all" control.
pub fn extract_genres_themes(doc: &Html) -> Vec<String> {
    let Some(tab) = select_first(doc, "#tab-genres") else {
        return Vec::new();
    };
    let Ok(sel) = Selector::parse("a") else {
        return Vec::new();
    };

    let mut tags: Vec<String> = tab.select(&sel).map(|a| anchor_text(&a)).collect();
    tags.pop();
    tags
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    const FILM_PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta property="og:url" content="https://letterboxd.com/film/dune-part-two/" />
<meta property="og:title" content="Dune: Part Two (2024)" />
<meta name="twitter:title" content="Dune: Part Two (2024)" />
<meta name="twitter:data2" content="4.3 out of 5" />
</head>
<body data-tmdb-id="693134" data-tmdb-type="movie">
<div data-item-link="/film/dune-part-two/" data-film-id="526406"></div>
<h1 class="filmtitle">Dune: Part Two</h1>
<a data-track-action="IMDb" href="http://www.imdb.com/title/tt15239678/maindetails">IMDb</a>
<div class="cast-list">
  <a class="tooltip" href="/actor/timothee-chalamet/" title="Paul Atreides">Timothée Chalamet</a>
  <a class="tooltip" href="/actor/zendaya/">Zendaya</a>
</div>
<div id="tab-crew">
  <a href="/director/denis-villeneuve/">Denis Villeneuve</a>
  <a href="/writer/jon-spaihts/">Jon Spaihts</a>
</div>
<div id="tab-details">
  <a href="/studio/legendary-pictures/">Legendary Pictures</a>
  <a href="/films/country/usa/">USA</a>
  <a href="/films/language/english/">English</a>
  <a href="/films/decade/2020s/">2020s</a>
</div>
<div id="tab-genres">
  <a href="/films/genre/science-fiction/">Science Fiction</a>
  <a href="/films/genre/adventure/">Adventure</a>
  <a href="/films/genre/all/">Show All…</a>
</div>
<p class="text-footer">166&nbsp;mins &nbsp; More at IMDb TMDb</p>
</body>
</html>"#;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    // ── Listing strategies ────────────────────────────────────────────────────

    #[test]
    fn test_listing_primary_attribute_wins() {
        let html = r#"
            <div data-item-link="/film/first/"></div>
            <div data-item-link="/film/second/"></div>
            <a href="/film/ignored/">ignored</a>
        "#;
        assert_eq!(parse_listing_refs(html), vec!["/film/first/", "/film/second/"]);
    }

    #[test]
    fn test_listing_secondary_attribute_fallback() {
        let html = r#"<div data-target-link="/film/only/"></div>"#;
        assert_eq!(parse_listing_refs(html), vec!["/film/only/"]);
    }

    #[test]
    fn test_listing_anchor_fallback() {
        let html = r#"
            <a href="/film/one/">One</a>
            <a href="/lists/unrelated/">not a film</a>
        "#;
        assert_eq!(parse_listing_refs(html), vec!["/film/one/"]);
    }

    #[test]
    fn test_listing_empty_page() {
        let html = r#"<div class="pagination"><a href="/page/2/">Next</a></div>"#;
        assert!(parse_listing_refs(html).is_empty());
    }

    // ── General ───────────────────────────────────────────────────────────────

    #[test]
    fn test_general_full_page() {
        let data = extract_general(&doc(FILM_PAGE));
        assert_eq!(data.letterboxd_id.as_deref(), Some("526406"));
        assert_eq!(data.shorttitle.as_deref(), Some("Dune: Part Two"));
        assert_eq!(data.longtitle.as_deref(), Some("Dune: Part Two (2024)"));
        assert_eq!(data.slug.as_deref(), Some("dune-part-two"));
        assert_eq!(
            data.url.as_deref(),
            Some("https://letterboxd.com/film/dune-part-two/")
        );
        assert_eq!(
            data.imdb_url.as_deref(),
            Some("http://www.imdb.com/title/tt15239678/maindetails")
        );
        assert_eq!(data.release_year.as_deref(), Some("2024"));
        assert_eq!(data.duration.as_deref(), Some("166"));
        // No rating anchor on the page: twitter data2 fallback
        assert_eq!(data.avg_rating.as_deref(), Some("4.3"));
        // No TMDb anchor: synthesized from body data attributes
        assert_eq!(data.tmdb_id.as_deref(), Some("693134"));
        assert_eq!(
            data.tmdb_url.as_deref(),
            Some("https://www.themoviedb.org/movie/693134")
        );
    }

    #[test]
    fn test_general_link_falls_back_to_og_url() {
        let html = r#"
            <head>
            <meta property="og:url" content="https://letterboxd.com/film/heat/" />
            <meta property="og:title" content="Heat (1995)" />
            </head>
        "#;
        let data = extract_general(&doc(html));
        assert_eq!(data.letterboxd_id, None);
        assert_eq!(data.slug.as_deref(), Some("heat"));
        assert_eq!(data.shorttitle.as_deref(), Some("Heat"));
        assert_eq!(data.release_year.as_deref(), Some("1995"));
    }

    #[test]
    fn test_general_rating_prefers_tooltip_anchor() {
        let html = r#"
            <meta name="twitter:data2" content="3.9 out of 5" />
            <a class="has-icon icon-watched icon-16 tooltip">4.12</a>
        "#;
        let data = extract_general(&doc(html));
        assert_eq!(data.avg_rating.as_deref(), Some("4.12"));
    }

    #[test]
    fn test_general_tmdb_anchor_preferred_over_body_attrs() {
        let html = r#"
            <body data-tmdb-id="999" data-tmdb-type="tv">
            <a data-track-action="TMDb" href="https://www.themoviedb.org/movie/693134/">TMDb</a>
            </body>
        "#;
        let data = extract_general(&doc(html));
        assert_eq!(
            data.tmdb_url.as_deref(),
            Some("https://www.themoviedb.org/movie/693134/")
        );
        assert_eq!(data.tmdb_id.as_deref(), Some("693134"));
    }

    #[test]
    fn test_general_empty_page_yields_all_absent() {
        let data = extract_general(&doc("<html><body></body></html>"));
        assert_eq!(data, RawGeneralData::default());
    }

    // ── Cast ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_cast_entries_and_optional_character() {
        let cast = extract_cast(&doc(FILM_PAGE));
        assert_eq!(cast.len(), 2);
        assert_eq!(cast[0].name, "Timothée Chalamet");
        assert_eq!(cast[0].link, "/actor/timothee-chalamet/");
        assert_eq!(cast[0].character_name.as_deref(), Some("Paul Atreides"));
        assert_eq!(cast[1].character_name, None);
    }

    #[test]
    fn test_cast_missing_container_is_empty() {
        let cast = extract_cast(&doc("<html><body><p>nothing</p></body></html>"));
        assert!(cast.is_empty());
    }

    #[test]
    fn test_cast_malformed_anchor_degrades_whole_block() {
        let html = r#"
            <div class="cast-list">
              <a class="tooltip" href="/actor/ok/">Fine</a>
              <a class="tooltip">No link</a>
            </div>
        "#;
        assert!(extract_cast(&doc(html)).is_empty());
    }

    // ── Crew ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_crew_roles_from_link_structure() {
        let crew = extract_crew(&doc(FILM_PAGE));
        assert_eq!(crew.len(), 2);
        assert_eq!(crew[0].name, "Denis Villeneuve");
        assert_eq!(crew[0].role, "director");
        assert_eq!(crew[1].role, "writer");
    }

    #[test]
    fn test_crew_missing_tab_is_empty() {
        assert!(extract_crew(&doc("<html></html>")).is_empty());
    }

    #[test]
    fn test_crew_unexpected_link_shape_degrades_whole_block() {
        let html = r#"<div id="tab-crew"><a href="flat-link">Someone</a></div>"#;
        assert!(extract_crew(&doc(html)).is_empty());
    }

    // ── Details ───────────────────────────────────────────────────────────────

    #[test]
    fn test_details_classification() {
        let details = extract_details(&doc(FILM_PAGE));
        let keys: Vec<&str> = details.iter().map(|d| d.key.as_str()).collect();
        assert_eq!(keys, vec!["studio", "country", "language", "ERROR"]);
        assert_eq!(details[0].value, "Legendary Pictures");
        assert_eq!(details[0].link, "/studio/legendary-pictures/");
    }

    #[test]
    fn test_details_missing_tab_is_empty() {
        assert!(extract_details(&doc("<html></html>")).is_empty());
    }

    // ── Genres & themes ───────────────────────────────────────────────────────

    #[test]
    fn test_genres_drop_trailing_show_all() {
        let tags = extract_genres_themes(&doc(FILM_PAGE));
        assert_eq!(tags, vec!["Science Fiction", "Adventure"]);
    }

    #[test]
    fn test_genres_missing_tab_is_empty() {
        assert!(extract_genres_themes(&doc("<html></html>")).is_empty());
    }
}
