//! Catalog listing.

use super::shared::{table, to_json, OutputFormat};
use crate::catalog::Catalog;
use crate::error::ForgeError;
use serde_json::json;

pub fn format_catalog(catalog: &Catalog, format: OutputFormat) -> Result<String, ForgeError> {
    match format {
        OutputFormat::Json => {
            let entries: Vec<_> = catalog
                .specifications()
                .iter()
                .enumerate()
                .map(|(index, spec)| {
                    json!({
                        "index": index,
                        "id": spec.id,
                        "title": spec.display_title(),
                        "category": spec.category,
                    })
                })
                .collect();
            to_json(&json!({ "specifications": entries, "total": catalog.len() }))
        }
        OutputFormat::Text => {
            if catalog.is_empty() {
                return Ok("Catalog is empty.".to_string());
            }
            let mut table = table(vec!["Index", "ID", "Title", "Category"]);
            for (index, spec) in catalog.specifications().iter().enumerate() {
                table.add_row(vec![
                    index.to_string(),
                    spec.id.clone(),
                    spec.display_title(),
                    spec.category.clone(),
                ]);
            }
            Ok(format!("{}\n\nTotal: {} specification(s)", table, catalog.len()))
        }
    }
}
