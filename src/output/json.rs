//! JSON export
//!
//! Writes the record set as a pretty-printed JSON array, sorted by app id.

use crate::model::AppRecord;
use crate::Result;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Writes records to a JSON file, sorted by app id
///
/// # Arguments
///
/// * `records` - The harvested record set (any order)
/// * `path` - Destination file path
pub fn write_json(records: &[AppRecord], path: &Path) -> Result<()> {
    let mut sorted: Vec<&AppRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.app_id);

    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), &sorted)?;

    Ok(())
}
