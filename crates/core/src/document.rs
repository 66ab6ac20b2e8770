use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::DocchatError;

/// Caller-supplied identifier of an ingested document.
pub type DocumentId = String;

/// Tables of a section keyed by their position in the section body.
///
/// Insertion order is document order and is preserved through serde.
pub type TableMap = IndexMap<usize, String>;

/// One heading and the body that follows it, as produced by the PDF parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionRecord {
    /// Heading text without markup. Empty for text that precedes any heading.
    #[serde(default)]
    pub heading_text: String,
    /// Heading depth, 1 = top-level.
    pub level: u32,
    /// Prose belonging to this heading, excluding subsection text.
    #[serde(default)]
    pub body_text: String,
    #[serde(default)]
    pub tables: TableMap,
}

impl SectionRecord {
    pub fn new(heading_text: impl Into<String>, level: u32, body_text: impl Into<String>) -> Self {
        Self {
            heading_text: heading_text.into(),
            level,
            body_text: body_text.into(),
            tables: TableMap::new(),
        }
    }

    /// Attach a table at `position` within the body.
    pub fn with_table(mut self, position: usize, table: impl Into<String>) -> Self {
        self.tables.insert(position, table.into());
        self
    }

    /// Parse a JSON array of records.
    pub fn list_from_json(json: &str) -> Result<Vec<SectionRecord>, DocchatError> {
        Ok(serde_json::from_str(json)?)
    }
}
