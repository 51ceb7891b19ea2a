//! Catalog listing page scraper
//!
//! Extracts partial signature records from one catalog page. The page fetch
//! and extraction are retried as a whole when the page comes back with zero
//! rows, which the source site intermittently does on otherwise healthy
//! pages. Individual rows that fail structural extraction are dropped
//! without aborting the page.
//!
//! Column extraction relies on ordinal position among same-class sibling
//! elements, which is fragile to markup changes. The positional contract is
//! isolated in [`RowSelectors::nth_classed_div`] so a markup shift is a
//! one-place change.

use crate::config::Config;
use crate::model::PartialRecord;
use crate::scrape::discovery::DETAIL_TARGET_PATTERN;
use crate::scrape::fetcher::fetch_page;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

/// Alt-text marker identifying a filled rating icon
const FILLED_ICON_MARKER: &str = "black-background";

/// Compiled selectors and patterns shared across the rows of one page
struct RowSelectors {
    row: Selector,
    name_column: Selector,
    bold: Selector,
    small: Selector,
    classed_div: Selector,
    icon: Selector,
    detail_target: Regex,
    trailing_category: Regex,
}

impl RowSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            row: Selector::parse("div.row[onclick]").ok()?,
            name_column: Selector::parse("div.col-md-3").ok()?,
            bold: Selector::parse("b").ok()?,
            small: Selector::parse("small").ok()?,
            classed_div: Selector::parse("div[class]").ok()?,
            icon: Selector::parse("img[alt]").ok()?,
            detail_target: Regex::new(DETAIL_TARGET_PATTERN).ok()?,
            trailing_category: Regex::new(r"\(([^)]+)\)$").ok()?,
        })
    }

    /// Returns the n-th class-bearing div inside a row (0-based ordinal)
    ///
    /// This is the single place encoding the positional column contract:
    /// ordinal 2 is the risk column, ordinal 3 is popularity.
    fn nth_classed_div<'a>(&self, row: ElementRef<'a>, ordinal: usize) -> Option<ElementRef<'a>> {
        row.select(&self.classed_div).nth(ordinal)
    }
}

/// Builds the URL for a catalog page
///
/// Page 1 uses the bare base URL; later pages select the page through the
/// catalog's filter query string with empty filter fields.
pub fn page_url(base_url: &str, page: u32) -> String {
    if page <= 1 {
        base_url.to_string()
    } else {
        format!("{}?category=&popularity=&risk=&page={}", base_url, page)
    }
}

/// Scrapes a single catalog page into partial records
///
/// Retries the entire fetch+extract up to `max_retries` times when the
/// fetch fails or the page yields zero rows, sleeping the flat retry delay
/// between attempts. Exhausting retries returns an empty vec; the loss is
/// logged but never escalated. A nonzero row count that differs from
/// `expected_items` is logged without retrying (expected for the final
/// page).
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `page` - 1-based page number
/// * `expected_items` - Row count observed on page 1
/// * `config` - The harvester configuration
pub async fn scrape_page(
    client: &Client,
    page: u32,
    expected_items: usize,
    config: &Config,
) -> Vec<PartialRecord> {
    let url = page_url(&config.catalog.base_url, page);
    let max_retries = config.http.max_retries;

    for attempt in 0..max_retries {
        let last_attempt = attempt + 1 >= max_retries;

        let Some(body) = fetch_page(client, &url, &config.http).await else {
            if last_attempt {
                tracing::warn!("Giving up on page {} after {} attempts", page, max_retries);
                return Vec::new();
            }
            tracing::warn!(
                "Failed to fetch page {} (attempt {}/{}), retrying...",
                page,
                attempt + 1,
                max_retries
            );
            tokio::time::sleep(config.http.retry_delay()).await;
            continue;
        };

        let (row_count, records) = extract_records(&body);

        if row_count == 0 {
            if last_attempt {
                tracing::warn!(
                    "Page {} returned 0 rows after {} attempts",
                    page,
                    max_retries
                );
                return Vec::new();
            }
            tracing::warn!(
                "Page {} returned 0 rows (attempt {}/{}), retrying...",
                page,
                attempt + 1,
                max_retries
            );
            tokio::time::sleep(config.http.retry_delay()).await;
            continue;
        }

        if row_count != expected_items && page > 1 {
            tracing::warn!(
                "Page {} has {} rows, expected {}",
                page,
                row_count,
                expected_items
            );
        }

        return records;
    }

    Vec::new()
}

/// Extracts all rows from a listing document
///
/// Returns the number of row elements found alongside the records that
/// survived extraction; the two differ when malformed rows are dropped.
pub fn extract_records(body: &str) -> (usize, Vec<PartialRecord>) {
    let Some(selectors) = RowSelectors::new() else {
        return (0, Vec::new());
    };

    let document = Html::parse_document(body);
    let mut row_count = 0;
    let mut records = Vec::new();

    for row in document.select(&selectors.row) {
        let Some(target) = row.value().attr("onclick") else {
            continue;
        };
        if !selectors.detail_target.is_match(target) {
            continue;
        }
        row_count += 1;

        match extract_row(row, &selectors) {
            Some(record) => records.push(record),
            None => {
                tracing::debug!("Dropping malformed catalog row: {}", target);
            }
        }
    }

    (row_count, records)
}

/// Extracts one partial record from a row element
///
/// Returns None when any structurally required piece (app id, name column,
/// bolded name) is absent; the caller drops the row.
fn extract_row(row: ElementRef<'_>, selectors: &RowSelectors) -> Option<PartialRecord> {
    let target = row.value().attr("onclick")?;
    let app_id: u32 = selectors.detail_target.captures(target)?[1].parse().ok()?;

    // Name lives in the first col-md-3 styled with a word-break marker.
    let name_column = row
        .select(&selectors.name_column)
        .find(|col| {
            col.value()
                .attr("style")
                .is_some_and(|style| style.contains("word-break"))
        })?;
    let raw_name = element_text(name_column.select(&selectors.bold).next()?);
    let (name, category) = split_category(&raw_name, &selectors.trailing_category);

    // Description is the <small> of the second col-md-3, when present.
    let description = row
        .select(&selectors.name_column)
        .nth(1)
        .and_then(|col| col.select(&selectors.small).next())
        .map(element_text)
        .unwrap_or_default();

    let risk = rating_count(selectors.nth_classed_div(row, 2), selectors);
    let popularity = rating_count(selectors.nth_classed_div(row, 3), selectors);

    Some(PartialRecord {
        app_id,
        name,
        description,
        category,
        risk,
        popularity,
    })
}

/// Splits a trailing parenthesized category suffix off a raw name
///
/// `"DNF (Update)"` becomes `("DNF", "Update")`; a name without the suffix
/// passes through unchanged with an empty category.
fn split_category(raw_name: &str, pattern: &Regex) -> (String, String) {
    match pattern.captures(raw_name) {
        Some(captures) => {
            let suffix_start = captures.get(0).map(|m| m.start()).unwrap_or(0);
            let category = captures[1].to_string();
            let name = raw_name[..suffix_start].trim_end().to_string();
            (name, category)
        }
        None => (raw_name.to_string(), String::new()),
    }
}

/// Counts the filled rating icons within a rating column
///
/// Filled icons carry the dark-background marker in their alt text; unfilled
/// icons do not and are skipped. The count is not clamped beyond what the
/// markup yields.
fn rating_count(column: Option<ElementRef<'_>>, selectors: &RowSelectors) -> u8 {
    let Some(column) = column else {
        return 0;
    };

    let count = column
        .select(&selectors.icon)
        .filter(|icon| {
            icon.value()
                .attr("alt")
                .is_some_and(|alt| alt.contains(FILLED_ICON_MARKER))
        })
        .count();

    count.min(u8::MAX as usize) as u8
}

/// Collects and trims the text content of an element
fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
