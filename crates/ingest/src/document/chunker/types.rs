//! Chunk configuration and output types.

use docchat_core::config::ChunkingSettings;
use serde::{Deserialize, Serialize};

use crate::document::route::HeaderRoute;
use crate::error::ValidationError;

// ── Configuration ───────────────────────────────────────────────────────────

/// Configuration for the chunking engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Maximum tokens per text slice (default: 500). Tables may exceed it.
    pub max_tokens_per_chunk: usize,
    /// Tokens repeated between consecutive slices of a section (default: 50).
    pub token_overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_tokens_per_chunk: 500,
            token_overlap: 50,
        }
    }
}

impl From<&ChunkingSettings> for ChunkerConfig {
    fn from(settings: &ChunkingSettings) -> Self {
        Self {
            max_tokens_per_chunk: settings.max_tokens_per_chunk,
            token_overlap: settings.token_overlap,
        }
    }
}

impl ChunkerConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_tokens_per_chunk == 0
            || self.token_overlap == 0
            || self.max_tokens_per_chunk <= self.token_overlap
        {
            return Err(ValidationError::InvalidChunkBudget {
                max: self.max_tokens_per_chunk,
                overlap: self.token_overlap,
            });
        }
        Ok(())
    }
}

// ── Chunk output ────────────────────────────────────────────────────────────

/// Provenance attached to every chunk payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    /// Section titles joined with `" > "`. Display only, never used for ordering.
    pub header_route: String,
    pub header_route_levels: HeaderRoute,
    /// 1-based position among the chunks of the same section.
    pub order: u32,
    /// 1-based position among all chunks of the document.
    pub total_order: u32,
    pub tokens: usize,
    pub char_count: usize,
    pub table: bool,
    pub section_id: String,
    #[serde(default)]
    pub reconciled: bool,
    /// Leading words repeated from the previous slice of the same section.
    #[serde(default)]
    pub overlap_words: usize,
}

/// A chunk of text with metadata for reassembly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    #[serde(rename = "payloadText")]
    pub text: String,
    #[serde(flatten)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn route(&self) -> &HeaderRoute {
        &self.metadata.header_route_levels
    }

    pub fn order(&self) -> u32 {
        self.metadata.order
    }

    pub fn is_table(&self) -> bool {
        self.metadata.table
    }
}
