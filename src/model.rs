//! Data model for harvested signature records
//!
//! The pipeline produces data in two stages: `PartialRecord` from the catalog
//! listing pages, and `DetailFields` from each signature's detail page. The
//! two are merged into the final `AppRecord` keyed by application id.

use crate::DiscoveryError;
use serde::Serialize;

/// Signature data available from a catalog listing page alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialRecord {
    /// Application id, unique across the catalog
    pub app_id: u32,

    /// Signature name with any trailing category suffix removed
    pub name: String,

    /// Short description from the listing row
    pub description: String,

    /// Category split from the name's trailing parenthetical, or empty
    pub category: String,

    /// Risk rating, a count of filled rating icons
    pub risk: u8,

    /// Popularity rating, a count of filled rating icons
    pub popularity: u8,
}

/// Extended metadata from a signature's detail page
///
/// Each field is a flattened, comma-joined representation of an underlying
/// list or paragraph. An empty string means the section was not present.
/// A failed detail fetch yields the all-empty value rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailFields {
    pub default_ports: String,
    pub affected_products: String,
    pub impact: String,
    pub technology: String,
    pub behavior: String,
    pub references: String,
}

/// One fully-enriched signature record
///
/// Field order matches the original export column order; serde field names
/// are the export header names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppRecord {
    pub app_id: u32,
    #[serde(rename = "app_name")]
    pub name: String,
    pub description: String,
    pub category: String,
    pub risk: u8,
    pub popularity: u8,
    pub default_ports: String,
    pub affected_products: String,
    pub impact: String,
    pub technology: String,
    pub behavior: String,
    pub references: String,
}

impl AppRecord {
    /// Merges a partial record with its detail enrichment
    pub fn from_parts(partial: PartialRecord, details: DetailFields) -> Self {
        Self {
            app_id: partial.app_id,
            name: partial.name,
            description: partial.description,
            category: partial.category,
            risk: partial.risk,
            popularity: partial.popularity,
            default_ports: details.default_ports,
            affected_products: details.affected_products,
            impact: details.impact,
            technology: details.technology,
            behavior: details.behavior,
            references: details.references,
        }
    }
}

/// Pagination shape derived from the first catalog page
///
/// `items_per_page` is the row count actually observed on page 1, not a
/// declared page-size field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogShape {
    pub total_items: u64,
    pub items_per_page: usize,
}

impl CatalogShape {
    /// Creates a catalog shape, rejecting a zero page size
    ///
    /// A zero `items_per_page` would make the page count undefined; it is a
    /// fatal structural error, never a retryable condition.
    pub fn new(total_items: u64, items_per_page: usize) -> Result<Self, DiscoveryError> {
        if items_per_page == 0 {
            return Err(DiscoveryError::ZeroPageSize);
        }
        Ok(Self {
            total_items,
            items_per_page,
        })
    }

    /// Number of catalog pages needed to cover all items (ceiling division)
    pub fn total_pages(&self) -> u32 {
        let per_page = self.items_per_page as u64;
        ((self.total_items + per_page - 1) / per_page) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_exact_division() {
        let shape = CatalogShape::new(2500, 25).unwrap();
        assert_eq!(shape.total_pages(), 100);
    }

    #[test]
    fn test_total_pages_rounds_up() {
        let shape = CatalogShape::new(2501, 25).unwrap();
        assert_eq!(shape.total_pages(), 101);

        let shape = CatalogShape::new(1, 25).unwrap();
        assert_eq!(shape.total_pages(), 1);
    }

    #[test]
    fn test_total_pages_empty_catalog() {
        let shape = CatalogShape::new(0, 25).unwrap();
        assert_eq!(shape.total_pages(), 0);
    }

    #[test]
    fn test_zero_page_size_is_fatal() {
        assert_eq!(
            CatalogShape::new(2500, 0).unwrap_err(),
            DiscoveryError::ZeroPageSize
        );
        assert_eq!(
            CatalogShape::new(0, 0).unwrap_err(),
            DiscoveryError::ZeroPageSize
        );
    }

    #[test]
    fn test_from_parts_merges_all_fields() {
        let partial = PartialRecord {
            app_id: 59958,
            name: "DNF".to_string(),
            description: "Package manager".to_string(),
            category: "Update".to_string(),
            risk: 1,
            popularity: 4,
        };
        let details = DetailFields {
            default_ports: "80, 443".to_string(),
            affected_products: "Linux".to_string(),
            ..DetailFields::default()
        };

        let record = AppRecord::from_parts(partial, details);
        assert_eq!(record.app_id, 59958);
        assert_eq!(record.name, "DNF");
        assert_eq!(record.category, "Update");
        assert_eq!(record.default_ports, "80, 443");
        assert_eq!(record.affected_products, "Linux");
        assert_eq!(record.impact, "");
    }

    #[test]
    fn test_from_parts_with_empty_details() {
        let partial = PartialRecord {
            app_id: 1,
            name: "App".to_string(),
            description: String::new(),
            category: String::new(),
            risk: 0,
            popularity: 0,
        };

        let record = AppRecord::from_parts(partial, DetailFields::default());
        assert_eq!(record.default_ports, "");
        assert_eq!(record.references, "");
    }
}
