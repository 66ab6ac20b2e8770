//! Post-chunking merge pass that folds undersized chunks into their
//! same-section neighbours.

use std::collections::HashMap;

use docchat_core::config::ReconcileSettings;
use tracing::debug;

use super::chunker::helpers::skip_leading_words;
use super::chunker::Chunk;
use super::route::HeaderRoute;
use crate::error::{StructureError, ValidationError};
use crate::tokenizer::{Tokenizer, TokenizerError};

/// Size band for reconciled chunks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Chunks below this many tokens are merge candidates (default: 50).
    pub min_tokens_per_chunk: usize,
    /// A merged chunk never grows past this many tokens (default: 500).
    pub max_tokens_per_chunk: usize,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            min_tokens_per_chunk: 50,
            max_tokens_per_chunk: 500,
        }
    }
}

impl From<&ReconcileSettings> for ReconcileConfig {
    fn from(settings: &ReconcileSettings) -> Self {
        Self {
            min_tokens_per_chunk: settings.min_tokens_per_chunk,
            max_tokens_per_chunk: settings.max_tokens_per_chunk,
        }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_tokens_per_chunk >= self.max_tokens_per_chunk {
            return Err(ValidationError::InvalidReconcileBudget {
                min: self.min_tokens_per_chunk,
                max: self.max_tokens_per_chunk,
            });
        }
        Ok(())
    }
}

/// Consecutive text chunks of one section being folded together.
struct Group<'a> {
    first: &'a Chunk,
    text: String,
    /// Token count of `text`, never above the sum of member token counts.
    tokens: usize,
    last_order: u32,
    members: usize,
}

impl<'a> Group<'a> {
    fn start(chunk: &'a Chunk) -> Self {
        Self {
            first: chunk,
            text: chunk.text.clone(),
            tokens: chunk.metadata.tokens,
            last_order: chunk.order(),
            members: 1,
        }
    }

    /// Fold `chunk` in when one side is undersized and the recounted merged
    /// text fits the budget without costing more than its parts.
    fn try_push(
        &mut self,
        chunk: &Chunk,
        config: &ReconcileConfig,
        tokenizer: &dyn Tokenizer,
    ) -> Result<bool, TokenizerError> {
        let min = config.min_tokens_per_chunk;
        if chunk.route() != self.first.route()
            || (self.tokens >= min && chunk.metadata.tokens >= min)
        {
            return Ok(false);
        }

        // The overlap prefix repeats the tail of the previous slice, which is
        // already in the group when the two are adjacent.
        let tail = if chunk.order() == self.last_order + 1 {
            skip_leading_words(&chunk.text, chunk.metadata.overlap_words)
        } else {
            chunk.text.as_str()
        };
        if !tail.is_empty() {
            let merged = format!("{}\n{}", self.text, tail);
            let tokens = tokenizer.count(&merged)?;
            if tokens > config.max_tokens_per_chunk
                || tokens > self.tokens + chunk.metadata.tokens
            {
                return Ok(false);
            }
            self.text = merged;
            self.tokens = tokens;
        }
        self.last_order = chunk.order();
        self.members += 1;
        Ok(true)
    }

    fn finish(self) -> Chunk {
        let mut metadata = self.first.metadata.clone();
        if self.members > 1 {
            metadata.tokens = self.tokens;
            metadata.char_count = self.text.chars().count();
        }
        metadata.reconciled = true;
        Chunk {
            text: self.text,
            metadata,
        }
    }
}

/// Merge runs of undersized text chunks within each section.
///
/// A merge is kept only when the tokenizer's count of the joined text stays
/// within `max_tokens_per_chunk` and within the sum of the merged chunks, so
/// reconciliation never adds tokens.
///
/// Input is taken in `total_order`. Tables are never merged or split and
/// close any open run on either side. Every output chunk is marked
/// reconciled, and `order`/`total_order` are renumbered for the reduced set.
pub fn reconcile_chunks(
    chunks: &[Chunk],
    config: &ReconcileConfig,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<Chunk>, StructureError> {
    config.validate()?;

    let mut ordered: Vec<&Chunk> = chunks.iter().collect();
    ordered.sort_by_key(|c| c.metadata.total_order);

    let mut out: Vec<Chunk> = Vec::with_capacity(chunks.len());
    let mut group: Option<Group<'_>> = None;

    for chunk in ordered {
        if chunk.is_table() {
            if let Some(g) = group.take() {
                out.push(g.finish());
            }
            let mut table = chunk.clone();
            table.metadata.reconciled = true;
            out.push(table);
            continue;
        }
        let merged = match group.as_mut() {
            Some(g) => g.try_push(chunk, config, tokenizer)?,
            None => false,
        };
        if !merged {
            if let Some(g) = group.replace(Group::start(chunk)) {
                out.push(g.finish());
            }
        }
    }
    if let Some(g) = group.take() {
        out.push(g.finish());
    }

    renumber(&mut out);
    debug!(
        input = chunks.len(),
        output = out.len(),
        "reconciled chunk sequence"
    );
    Ok(out)
}

fn renumber(chunks: &mut [Chunk]) {
    let mut per_section: HashMap<HeaderRoute, u32> = HashMap::new();
    for (i, chunk) in chunks.iter_mut().enumerate() {
        let order = per_section
            .entry(chunk.metadata.header_route_levels.clone())
            .or_insert(0);
        *order += 1;
        chunk.metadata.order = *order;
        chunk.metadata.total_order = i as u32 + 1;
    }
}
