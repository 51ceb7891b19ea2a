//! Scraping module: the two-phase fetch/extract pipeline
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry and backoff
//! - Catalog shape discovery from page 1
//! - Listing page and detail page extraction
//! - The bounded worker pool running both concurrent rounds

mod coordinator;
mod detail;
mod discovery;
mod fetcher;
mod list_page;
mod scheduler;

pub use coordinator::run_harvest;
pub use detail::{fetch_details, parse_details};
pub use discovery::{count_catalog_rows, discover, parse_total_count};
pub use fetcher::{build_http_client, fetch_page};
pub use list_page::{extract_records, page_url, scrape_page};
pub use scheduler::{run_round, RoundOutcome, TaskFailure};
