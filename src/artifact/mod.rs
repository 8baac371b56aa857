//! Artifact model: a notebook as an ordered sequence of typed blocks.
//!
//! The on-disk encoding is Jupyter's nbformat 4 JSON. Decoding keeps every key
//! it does not model (cell ids, attachments, notebook-level extras) so that an
//! artifact read from disk and written back loses nothing.

pub mod repair;
pub mod store;
pub mod validate;

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

pub use repair::{canonical_heading, repair_artifact, repair_title, RepairAnomaly, RepairOutcome};
pub use store::{ArtifactStore, CategoryDirectories};
pub use validate::{validate, validate_encoded, ValidationCounts, ValidationPolicy, ValidationResult};

/// Block kind.
///
/// `Raw` is nbformat's third cell type; it is preserved but counts as neither
/// narrative nor executable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Narrative,
    Executable,
    Raw,
}

impl BlockKind {
    fn cell_type(self) -> &'static str {
        match self {
            BlockKind::Narrative => "markdown",
            BlockKind::Executable => "code",
            BlockKind::Raw => "raw",
        }
    }

    fn from_cell_type(cell_type: &str) -> Option<Self> {
        match cell_type {
            "markdown" => Some(BlockKind::Narrative),
            "code" => Some(BlockKind::Executable),
            "raw" => Some(BlockKind::Raw),
            _ => None,
        }
    }
}

/// One block of an artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub kind: BlockKind,
    /// nbformat source elements. Each element starts a new line whether or not
    /// the previous one kept its trailing newline.
    pub lines: Vec<String>,
    pub metadata: Map<String, Value>,
    /// Execution marker; only meaningful for executable blocks.
    pub execution_count: Option<u64>,
    pub outputs: Vec<Value>,
    extra: Map<String, Value>,
}

impl Block {
    pub fn new(kind: BlockKind, text: &str) -> Self {
        Self {
            kind,
            lines: split_source(text),
            metadata: Map::new(),
            execution_count: None,
            outputs: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn narrative(text: &str) -> Self {
        Self::new(BlockKind::Narrative, text)
    }

    pub fn executable(text: &str) -> Self {
        Self::new(BlockKind::Executable, text)
    }

    pub fn is_narrative(&self) -> bool {
        self.kind == BlockKind::Narrative
    }

    pub fn is_executable(&self) -> bool {
        self.kind == BlockKind::Executable
    }

    /// Joined block content.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 && !self.lines[index - 1].ends_with('\n') {
                text.push('\n');
            }
            text.push_str(line);
        }
        text
    }

    pub fn set_text(&mut self, text: &str) {
        self.lines = split_source(text);
    }

    /// Number of text lines; every source element counts at least once.
    pub fn line_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.lines().count().max(1))
            .sum()
    }

    /// First line of the content, trimmed.
    pub fn first_line(&self) -> String {
        self.text()
            .split('\n')
            .next()
            .map(|line| line.trim().to_string())
            .unwrap_or_default()
    }

    fn to_value(&self) -> Value {
        let mut cell = Map::new();
        cell.insert("cell_type".to_string(), json!(self.kind.cell_type()));
        if self.kind == BlockKind::Executable {
            cell.insert("execution_count".to_string(), json!(self.execution_count));
        }
        cell.insert("metadata".to_string(), Value::Object(self.metadata.clone()));
        if self.kind == BlockKind::Executable {
            cell.insert("outputs".to_string(), Value::Array(self.outputs.clone()));
        }
        cell.insert("source".to_string(), json!(self.lines));
        for (key, value) in &self.extra {
            cell.entry(key.clone()).or_insert_with(|| value.clone());
        }
        Value::Object(cell)
    }
}

/// Split text into nbformat source lines, keeping line terminators.
fn split_source(text: &str) -> Vec<String> {
    text.split_inclusive('\n').map(str::to_string).collect()
}

/// A notebook artifact.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub blocks: Vec<Block>,
    pub metadata: Map<String, Value>,
    pub nbformat: u32,
    pub nbformat_minor: u32,
    extra: Map<String, Value>,
}

impl Artifact {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            metadata: default_metadata(),
            nbformat: 4,
            nbformat_minor: 2,
            extra: Map::new(),
        }
    }

    /// Decode an nbformat JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let doc: NotebookDoc = serde_json::from_str(raw)?;
        let mut blocks = Vec::with_capacity(doc.cells.len());
        for (index, cell) in doc.cells.into_iter().enumerate() {
            let kind = BlockKind::from_cell_type(&cell.cell_type).ok_or_else(|| {
                <serde_json::Error as serde::de::Error>::custom(format!(
                    "cell {} has unknown cell_type '{}'",
                    index, cell.cell_type
                ))
            })?;
            blocks.push(Block {
                kind,
                lines: cell.source.into_lines(),
                metadata: cell.metadata,
                execution_count: cell.execution_count,
                outputs: cell.outputs,
                extra: cell.extra,
            });
        }
        Ok(Self {
            blocks,
            metadata: doc.metadata,
            nbformat: doc.nbformat,
            nbformat_minor: doc.nbformat_minor,
            extra: doc.extra,
        })
    }

    /// Encode as nbformat JSON with Jupyter's one-space indentation.
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        let mut doc = Map::new();
        doc.insert(
            "cells".to_string(),
            Value::Array(self.blocks.iter().map(Block::to_value).collect()),
        );
        doc.insert("metadata".to_string(), Value::Object(self.metadata.clone()));
        doc.insert("nbformat".to_string(), json!(self.nbformat));
        doc.insert("nbformat_minor".to_string(), json!(self.nbformat_minor));
        for (key, value) in &self.extra {
            doc.entry(key.clone()).or_insert_with(|| value.clone());
        }

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        Value::Object(doc).serialize(&mut serializer)?;
        let mut encoded = String::from_utf8(out)
            .map_err(|e| <serde_json::Error as serde::ser::Error>::custom(e.to_string()))?;
        encoded.push('\n');
        Ok(encoded)
    }

    pub fn first_block(&self) -> Option<&Block> {
        self.blocks.first()
    }

    /// Reset generated output to a pending state.
    ///
    /// Executable blocks lose their execution markers and outputs; missing
    /// notebook metadata is filled with the default kernel description.
    pub fn normalize_generated(&mut self) {
        for block in &mut self.blocks {
            if block.is_executable() {
                block.execution_count = None;
                block.outputs.clear();
            }
        }
        for (key, value) in default_metadata() {
            self.metadata.entry(key).or_insert(value);
        }
    }
}

fn default_metadata() -> Map<String, Value> {
    let mut metadata = Map::new();
    metadata.insert(
        "kernelspec".to_string(),
        json!({
            "display_name": "Python 3",
            "language": "python",
            "name": "python3"
        }),
    );
    metadata.insert(
        "language_info".to_string(),
        json!({
            "name": "python",
            "version": "3.12.0"
        }),
    );
    metadata
}

fn default_nbformat() -> u32 {
    4
}

fn default_nbformat_minor() -> u32 {
    2
}

#[derive(Deserialize)]
struct NotebookDoc {
    cells: Vec<CellDoc>,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default = "default_nbformat")]
    nbformat: u32,
    #[serde(default = "default_nbformat_minor")]
    nbformat_minor: u32,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct CellDoc {
    cell_type: String,
    #[serde(default)]
    metadata: Map<String, Value>,
    #[serde(default)]
    source: SourceDoc,
    #[serde(default)]
    execution_count: Option<u64>,
    #[serde(default)]
    outputs: Vec<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// nbformat allows source as one string or as a list of lines.
#[derive(Deserialize)]
#[serde(untagged)]
enum SourceDoc {
    Lines(Vec<String>),
    Text(String),
}

impl Default for SourceDoc {
    fn default() -> Self {
        SourceDoc::Lines(Vec::new())
    }
}

impl SourceDoc {
    fn into_lines(self) -> Vec<String> {
        match self {
            SourceDoc::Lines(lines) => lines,
            SourceDoc::Text(text) => split_source(&text),
        }
    }
}
