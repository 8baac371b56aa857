//! Artifact store
//!
//! Artifacts live in a directory tree under a single root. Each one is stored at
//! `{root}/{category_dir}/{id}_{Title_With_Underscores}.ipynb`; the category
//! directory comes from an injected [`CategoryDirectories`] table.

use crate::artifact::Artifact;
use crate::catalog::Specification;
use crate::error::StorageError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const ARTIFACT_EXTENSION: &str = "ipynb";

/// Category → directory table with a fallback for unknown categories.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDirectories {
    pub categories: BTreeMap<String, String>,
    pub default_directory: String,
}

impl CategoryDirectories {
    pub fn new(categories: BTreeMap<String, String>, default_directory: String) -> Self {
        Self {
            categories,
            default_directory,
        }
    }

    /// Exact match first; layered config may have lowercased the keys.
    pub fn directory_for(&self, category: &str) -> &str {
        self.categories
            .get(category)
            .or_else(|| {
                self.categories
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(category))
                    .map(|(_, dir)| dir)
            })
            .map(String::as_str)
            .unwrap_or(&self.default_directory)
    }
}

impl Default for CategoryDirectories {
    fn default() -> Self {
        Self::new(default_categories(), "08_Modern_AI".to_string())
    }
}

pub fn default_categories() -> BTreeMap<String, String> {
    [
        ("Foundations", "01_Foundations"),
        ("Machine_Learning", "02_Machine_Learning"),
        ("ML_Engineering", "06_ML_Engineering"),
        ("Deep_Learning", "07_Deep_Learning"),
        ("Modern_AI", "08_Modern_AI"),
        ("Data_Engineering", "09_Data_Engineering"),
        ("MLOps", "10_MLOps"),
        ("Cloud_Deployment", "11_Cloud_Deployment"),
    ]
    .into_iter()
    .map(|(category, dir)| (category.to_string(), dir.to_string()))
    .collect()
}

/// File name for a specification's artifact: `<id>_<title-with-separators>.ipynb`.
pub fn artifact_file_name(spec: &Specification) -> String {
    let title: String = spec
        .title
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}_{}.{}", spec.id, title, ARTIFACT_EXTENSION)
}

/// Filesystem-backed artifact store.
pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical destination directory for a specification.
    pub fn destination_for(
        &self,
        spec: &Specification,
        directories: &CategoryDirectories,
    ) -> PathBuf {
        self.root.join(directories.directory_for(&spec.category))
    }

    /// Canonical artifact path for a specification.
    pub fn path_for(&self, spec: &Specification, directories: &CategoryDirectories) -> PathBuf {
        self.destination_for(spec, directories)
            .join(artifact_file_name(spec))
    }

    /// Write an artifact to `path`, creating parent directories.
    pub fn write(&self, artifact: &Artifact, path: &Path) -> Result<PathBuf, StorageError> {
        write_artifact(artifact, path)
    }

    /// Persist a generated artifact at its canonical location; overwrites.
    pub fn persist(
        &self,
        artifact: &Artifact,
        spec: &Specification,
        directories: &CategoryDirectories,
    ) -> Result<PathBuf, StorageError> {
        let path = self.path_for(spec, directories);
        self.write(artifact, &path)
    }

    /// Read and decode an artifact.
    pub fn read(&self, path: &Path) -> Result<Artifact, StorageError> {
        read_artifact(path)
    }
}

/// Write an artifact to `path`, creating parent directories.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target,
/// so an existing artifact is replaced whole or not at all.
pub fn write_artifact(artifact: &Artifact, path: &Path) -> Result<PathBuf, StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                e.kind(),
                format!("Failed to create directory {:?}: {}", parent, e),
            ))
        })?;
    }

    let encoded = artifact
        .to_json_string()
        .map_err(|e| StorageError::Encoding(format!("Failed to encode artifact: {}", e)))?;

    let temp_path = path.with_extension(format!("{}.tmp", ARTIFACT_EXTENSION));
    fs::write(&temp_path, encoded.as_bytes()).map_err(|e| {
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to write artifact to {:?}: {}", temp_path, e),
        ))
    })?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        StorageError::IoError(std::io::Error::new(
            e.kind(),
            format!("Failed to rename temp file to {:?}: {}", path, e),
        ))
    })?;

    Ok(path.to_path_buf())
}

/// Read and decode an artifact.
pub fn read_artifact(path: &Path) -> Result<Artifact, StorageError> {
    let raw = read_raw(path)?;
    Artifact::from_json_str(&raw)
        .map_err(|e| StorageError::Encoding(format!("Failed to decode artifact {:?}: {}", path, e)))
}

/// Read an artifact's encoded text without decoding it.
pub fn read_raw(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(path.to_path_buf())
        } else {
            StorageError::IoError(e)
        }
    })
}
