//! Output module for exporting harvested records
//!
//! Pure serialization collaborators for the pipeline: CSV (the default)
//! and JSON. Both sort by app id before writing; the pipeline itself makes
//! no ordering promise.

mod csv;
mod json;

pub use self::csv::write_csv;
pub use self::json::write_json;
