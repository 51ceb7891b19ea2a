//! Catalog shape discovery from the first listing page
//!
//! Before the concurrent rounds can be planned, the harvester needs the
//! total item count and the page size. Both come from page 1: the count from
//! a "Total:" marker element, the page size from the number of catalog rows
//! actually present. Failures here are fatal; nothing downstream can run
//! without a page count.

use crate::config::Config;
use crate::model::CatalogShape;
use crate::scrape::fetcher::fetch_page;
use crate::DiscoveryError;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};

/// CSS class of the element carrying the "Total: N" marker
const TOTAL_MARKER_SELECTOR: &str = "p.m-2";

/// Rows are divs whose navigation target points at an item detail page
const ROW_SELECTOR: &str = "div.row[onclick]";

/// Navigation target pattern identifying a catalog row
pub const DETAIL_TARGET_PATTERN: &str = r"/appcontrol/(\d+)";

/// Fetches page 1 and derives the catalog shape
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `config` - The harvester configuration
///
/// # Returns
///
/// * `Ok(CatalogShape)` - Total item count and observed page size
/// * `Err(DiscoveryError)` - Page 1 unreachable or structurally unusable
pub async fn discover(client: &Client, config: &Config) -> Result<CatalogShape, DiscoveryError> {
    let body = fetch_page(client, &config.catalog.base_url, &config.http)
        .await
        .ok_or(DiscoveryError::InitialPageUnreachable)?;

    let document = Html::parse_document(&body);

    let total_items = parse_total_count(&document)?;
    let items_per_page = count_catalog_rows(&document);

    if items_per_page == 0 {
        return Err(DiscoveryError::NoCatalogRows);
    }

    tracing::info!(
        "Discovered catalog shape: {} items, {} per page",
        total_items,
        items_per_page
    );

    CatalogShape::new(total_items, items_per_page)
}

/// Extracts the total item count from the marker element
///
/// The marker text looks like `Total: 6,556` (the number may carry bold
/// tags and thousands separators). A missing marker or a marker without a
/// parseable number is a fatal structural error.
pub fn parse_total_count(document: &Html) -> Result<u64, DiscoveryError> {
    let selector =
        Selector::parse(TOTAL_MARKER_SELECTOR).map_err(|_| DiscoveryError::TotalCountMissing)?;

    let marker = document
        .select(&selector)
        .next()
        .ok_or(DiscoveryError::TotalCountMissing)?;

    let text: String = marker.text().collect();

    let pattern = Regex::new(r"Total:\s*([\d,]+)")
        .map_err(|_| DiscoveryError::TotalCountUnparseable(text.clone()))?;

    let captures = pattern
        .captures(&text)
        .ok_or_else(|| DiscoveryError::TotalCountUnparseable(text.trim().to_string()))?;

    captures[1]
        .replace(',', "")
        .parse::<u64>()
        .map_err(|_| DiscoveryError::TotalCountUnparseable(text.trim().to_string()))
}

/// Counts the catalog rows present in a listing document
///
/// A row is any `div.row` whose onclick navigation target matches the item
/// detail URL pattern.
pub fn count_catalog_rows(document: &Html) -> usize {
    let (Ok(selector), Ok(pattern)) = (
        Selector::parse(ROW_SELECTOR),
        Regex::new(DETAIL_TARGET_PATTERN),
    ) else {
        return 0;
    };

    document
        .select(&selector)
        .filter(|row| {
            row.value()
                .attr("onclick")
                .is_some_and(|target| pattern.is_match(target))
        })
        .count()
}
