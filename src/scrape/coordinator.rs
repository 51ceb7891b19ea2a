//! Harvest orchestration
//!
//! Runs the full pipeline: discover the catalog shape from page 1, scrape
//! every listing page in one concurrent round, then fetch every record's
//! detail page in a second round, and merge the two into the final record
//! set. Only discovery failures abort the run; page and detail failures
//! are logged and their contributions omitted, so the run completes with a
//! possibly-incomplete record set.

use crate::config::Config;
use crate::model::{AppRecord, DetailFields, PartialRecord};
use crate::progress::ProgressReporter;
use crate::scrape::detail::fetch_details;
use crate::scrape::discovery::discover;
use crate::scrape::fetcher::build_http_client;
use crate::scrape::list_page::scrape_page;
use crate::scrape::scheduler::run_round;
use crate::Result;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Runs the complete harvest and returns the enriched record set
///
/// The output order is unspecified; exporters sort as they see fit.
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `reporter` - Progress sink for per-task notifications
///
/// # Returns
///
/// * `Ok(Vec<AppRecord>)` - One record per signature that survived scraping
/// * `Err(HarvestError)` - Discovery failed; no output was produced
pub async fn run_harvest(
    config: &Config,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<Vec<AppRecord>> {
    // Discovery uses its own session, like every task after it.
    let client = build_http_client(&config.http)?;
    let shape = discover(&client, config).await?;
    drop(client);

    let total_pages = shape.total_pages();
    tracing::info!(
        "Scraping {} pages ({} items expected)",
        total_pages,
        shape.total_items
    );

    let partials = scrape_all_pages(config, total_pages, shape.items_per_page, &reporter).await;
    tracing::info!(
        "Collected {} partial records from {} pages",
        partials.len(),
        total_pages
    );

    let details = fetch_all_details(config, &partials, &reporter).await;

    let records = merge(partials, details);
    tracing::info!(
        "Harvest complete: {} of {} records collected",
        records.len(),
        shape.total_items
    );

    Ok(records)
}

/// Round 1: scrapes all listing pages concurrently
///
/// Page results are keyed by page number into an ordered map so the
/// flattened intermediate sequence is deterministic even though tasks
/// complete out of order.
async fn scrape_all_pages(
    config: &Config,
    total_pages: u32,
    expected_items: usize,
    reporter: &Arc<dyn ProgressReporter>,
) -> Vec<PartialRecord> {
    let mut tasks = Vec::with_capacity(total_pages as usize);

    for page in 1..=total_pages {
        let config = config.clone();
        let task = async move {
            // Each task owns its transport session.
            let client = build_http_client(&config.http).map_err(|e| e.to_string())?;
            let records = scrape_page(&client, page, expected_items, &config).await;
            Ok::<(u32, Vec<PartialRecord>), String>((page, records))
        };
        tasks.push((format!("page {}", page), task));
    }

    let outcome = run_round(config.http.max_workers, tasks, Arc::clone(reporter)).await;

    for failure in &outcome.failures {
        tracing::error!("Lost {}: {}", failure.label, failure.error);
    }

    let mut by_page: BTreeMap<u32, Vec<PartialRecord>> = BTreeMap::new();
    for (page, records) in outcome.successes {
        by_page.insert(page, records);
    }

    by_page.into_values().flatten().collect()
}

/// Round 2: fetches detail fields for every partial record concurrently
async fn fetch_all_details(
    config: &Config,
    partials: &[PartialRecord],
    reporter: &Arc<dyn ProgressReporter>,
) -> HashMap<u32, DetailFields> {
    let mut tasks = Vec::with_capacity(partials.len());

    for record in partials {
        let config = config.clone();
        let app_id = record.app_id;
        let task = async move {
            let client = build_http_client(&config.http).map_err(|e| e.to_string())?;
            let details = fetch_details(&client, app_id, &config).await;
            Ok::<(u32, DetailFields), String>((app_id, details))
        };
        tasks.push((format!("app {}", app_id), task));
    }

    let outcome = run_round(config.http.max_workers, tasks, Arc::clone(reporter)).await;

    for failure in &outcome.failures {
        tracing::error!("Lost {}: {}", failure.label, failure.error);
    }

    outcome.successes.into_iter().collect()
}

/// Merges partial records with their detail enrichment
///
/// A record whose detail task was lost gets all-empty detail fields rather
/// than being dropped.
fn merge(
    partials: Vec<PartialRecord>,
    mut details: HashMap<u32, DetailFields>,
) -> Vec<AppRecord> {
    partials
        .into_iter()
        .map(|partial| {
            let fields = details.remove(&partial.app_id).unwrap_or_default();
            AppRecord::from_parts(partial, fields)
        })
        .collect()
}
