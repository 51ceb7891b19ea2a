//! Detail page enricher
//!
//! Fetches one signature's detail page and extracts a fixed vocabulary of
//! named sections. This stage never fails: any fetch or parse problem
//! yields the all-empty [`DetailFields`], and the owning record is still
//! emitted with those empty fields.

use crate::config::Config;
use crate::model::DetailFields;
use crate::scrape::fetcher::fetch_page;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors for walking a detail page
struct DetailSelectors {
    section: Selector,
    heading: Selector,
    paragraph: Selector,
    list_item: Selector,
    link: Selector,
}

impl DetailSelectors {
    fn new() -> Option<Self> {
        Some(Self {
            section: Selector::parse("div.detail-item").ok()?,
            heading: Selector::parse("h3").ok()?,
            paragraph: Selector::parse("p").ok()?,
            list_item: Selector::parse("ul li").ok()?,
            link: Selector::parse("a").ok()?,
        })
    }
}

/// Fetches and extracts the detail fields for one signature
///
/// The detail URL is `{base_url}/{app_id}`. A fetch that exhausts its
/// retries logs a warning and returns empty fields; the partial record is
/// unaffected.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `app_id` - The signature's application id
/// * `config` - The harvester configuration
pub async fn fetch_details(client: &Client, app_id: u32, config: &Config) -> DetailFields {
    let url = format!("{}/{}", config.catalog.base_url, app_id);

    let Some(body) = fetch_page(client, &url, &config.http).await else {
        tracing::warn!("Could not fetch details for app {}", app_id);
        return DetailFields::default();
    };

    parse_details(&body)
}

/// Extracts the known detail sections from a detail page document
///
/// Each detail section's heading is matched by substring against the fixed
/// vocabulary; the first vocabulary entry that matches wins for that
/// section. Unmatched headings are ignored. When multiple sections match
/// the same entry, the last one overwrites the earlier value.
pub fn parse_details(body: &str) -> DetailFields {
    let mut details = DetailFields::default();

    let Some(selectors) = DetailSelectors::new() else {
        return details;
    };

    let document = Html::parse_document(body);

    for section in document.select(&selectors.section) {
        let Some(heading) = section.select(&selectors.heading).next() else {
            continue;
        };
        let title = element_text(heading);

        if title.contains("Default Ports") {
            details.default_ports = join_list_items(section, &selectors);
        } else if title.contains("Affected Products") {
            details.affected_products = match first_paragraph(section, &selectors) {
                Some(text) => text,
                None => join_list_items(section, &selectors),
            };
        } else if title.contains("Impact") {
            if let Some(text) = first_paragraph(section, &selectors) {
                details.impact = text;
            }
        } else if title.contains("Technology") {
            if let Some(text) = first_paragraph(section, &selectors) {
                details.technology = text;
            }
        } else if title.contains("Behavior") {
            let joined = join_list_items(section, &selectors);
            if joined.is_empty() {
                if let Some(text) = first_paragraph(section, &selectors) {
                    details.behavior = text;
                }
            } else {
                details.behavior = joined;
            }
        } else if title.contains("References") {
            details.references = join_reference_items(section, &selectors);
        }
    }

    details
}

/// Joins the non-empty list item texts of a section with ", "
fn join_list_items(section: ElementRef<'_>, selectors: &DetailSelectors) -> String {
    let items: Vec<String> = section
        .select(&selectors.list_item)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect();

    items.join(", ")
}

/// Joins reference list items, preferring each item's link target
///
/// An item with an `<a>` contributes its href; an item without one
/// contributes its text.
fn join_reference_items(section: ElementRef<'_>, selectors: &DetailSelectors) -> String {
    let mut refs = Vec::new();

    for item in section.select(&selectors.list_item) {
        match item.select(&selectors.link).next() {
            Some(link) => {
                if let Some(href) = link.value().attr("href") {
                    let href = href.trim();
                    if !href.is_empty() {
                        refs.push(href.to_string());
                    }
                }
            }
            None => {
                let text = element_text(item);
                if !text.is_empty() {
                    refs.push(text);
                }
            }
        }
    }

    refs.join(", ")
}

/// Text of the section's first paragraph, if it has one
fn first_paragraph(section: ElementRef<'_>, selectors: &DetailSelectors) -> Option<String> {
    section
        .select(&selectors.paragraph)
        .next()
        .map(element_text)
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
