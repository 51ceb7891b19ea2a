//! CSV export
//!
//! Writes the record set as a 12-column CSV, sorted by app id. Column
//! headers come from the record's serde field names, matching the original
//! export order.

use crate::model::AppRecord;
use crate::Result;
use std::path::Path;

/// Writes records to a CSV file, sorted by app id
///
/// # Arguments
///
/// * `records` - The harvested record set (any order)
/// * `path` - Destination file path
pub fn write_csv(records: &[AppRecord], path: &Path) -> Result<()> {
    let mut sorted: Vec<&AppRecord> = records.iter().collect();
    sorted.sort_by_key(|record| record.app_id);

    let mut writer = csv::Writer::from_path(path)?;
    for record in sorted {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
