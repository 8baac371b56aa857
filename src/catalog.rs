//! Specification catalog and canonical title table.
//!
//! Both are plain data files (TOML) supplied by the caller. The catalog is an
//! ordered list of [`Specification`] records; the title table maps zero-padded
//! notebook ids to their canonical titles and is consumed by the repair pass.

use crate::error::ForgeError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

/// Declarative description of one notebook to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    /// Zero-padded ordinal, e.g. `"079"`.
    #[serde(alias = "number")]
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default, alias = "post_silicon_focus")]
    pub domain_focus: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub learning_objectives: Option<Vec<String>>,
}

impl Specification {
    /// Canonical heading line for this specification: `# <id>: <title>`.
    ///
    /// Underscores in catalog titles stand in for spaces.
    pub fn heading(&self) -> String {
        format!("# {}: {}", self.id, self.display_title())
    }

    pub fn display_title(&self) -> String {
        self.title.replace('_', " ")
    }

    fn validate(&self) -> Result<(), String> {
        if self.id.is_empty() {
            return Err("specification id cannot be empty".to_string());
        }
        if !self.id.chars().all(|c| c.is_ascii_digit()) {
            return Err(format!("specification id '{}' must be numeric", self.id));
        }
        if self.title.trim().is_empty() {
            return Err(format!("specification {} has an empty title", self.id));
        }
        if self.category.trim().is_empty() {
            return Err(format!("specification {} has an empty category", self.id));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "specification")]
    specifications: Vec<Specification>,
}

/// Ordered, validated sequence of specifications.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    specifications: Vec<Specification>,
}

impl Catalog {
    /// Build a catalog from in-memory specifications, validating them.
    pub fn new(specifications: Vec<Specification>) -> Result<Self, ForgeError> {
        let catalog = Self { specifications };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a TOML file of `[[specification]]` tables.
    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::CatalogError(format!("Failed to read catalog {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
            .map_err(|e| ForgeError::CatalogError(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ForgeError> {
        let file: CatalogFile = toml::from_str(raw)
            .map_err(|e| ForgeError::CatalogError(format!("Invalid catalog: {}", e)))?;
        Self::new(file.specifications)
    }

    /// Reject malformed records and duplicate ids.
    pub fn validate(&self) -> Result<(), ForgeError> {
        let mut seen = HashSet::new();
        for spec in &self.specifications {
            spec.validate().map_err(ForgeError::CatalogError)?;
            if !seen.insert(spec.id.as_str()) {
                return Err(ForgeError::CatalogError(format!(
                    "Duplicate specification id: {}",
                    spec.id
                )));
            }
        }
        Ok(())
    }

    pub fn specifications(&self) -> &[Specification] {
        &self.specifications
    }

    pub fn len(&self) -> usize {
        self.specifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specifications.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Specification> {
        self.specifications.iter().find(|spec| spec.id == id)
    }

    /// Batch range `[start, start + count)`, clamped to the end of the catalog.
    pub fn slice(&self, start: usize, count: usize) -> Result<&[Specification], ForgeError> {
        if start >= self.specifications.len() {
            return Err(ForgeError::CatalogError(format!(
                "Start index {} is out of range (catalog has {} specifications)",
                start,
                self.specifications.len()
            )));
        }
        let end = start.saturating_add(count).min(self.specifications.len());
        Ok(&self.specifications[start..end])
    }
}

#[derive(Debug, Deserialize)]
struct TitleFile {
    #[serde(default)]
    titles: BTreeMap<String, String>,
}

/// Canonical titles keyed by zero-padded notebook id.
#[derive(Debug, Clone, Default)]
pub struct TitleTable {
    titles: BTreeMap<String, String>,
}

impl TitleTable {
    pub fn new(titles: BTreeMap<String, String>) -> Self {
        Self { titles }
    }

    pub fn load(path: &Path) -> Result<Self, ForgeError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ForgeError::ConfigError(format!(
                "Failed to read title table {}: {}",
                path.display(),
                e
            ))
        })?;
        let file: TitleFile = toml::from_str(&raw).map_err(|e| {
            ForgeError::ConfigError(format!("Invalid title table {}: {}", path.display(), e))
        })?;
        Ok(Self::new(file.titles))
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.titles.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}

impl FromIterator<(String, String)> for TitleTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
