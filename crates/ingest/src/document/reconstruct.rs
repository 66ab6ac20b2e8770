//! Reading-order reconstruction for chunks returned by similarity search.
//!
//! Only header-route metadata is consulted; the source document is never
//! re-parsed. Input may be any subset of a document's chunks, in any order,
//! with duplicates. Missing sections are simply absent from the output.

use std::cmp::Ordering;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::chunker::helpers::skip_leading_words;
use super::chunker::Chunk;
use super::route::HeaderRoute;

const SEPARATOR: &str = "\n";

/// Consecutive same-route chunks joined back into prose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructedSection {
    pub header_route: String,
    pub header_route_levels: HeaderRoute,
    pub text: String,
    /// Summed from the member chunks.
    pub tokens: usize,
    /// Summed from the member chunks.
    pub char_count: usize,
}

/// Document order: by route (ancestor first, then sibling index), then by
/// `order` within a section.
pub fn compare_chunks(a: &Chunk, b: &Chunk) -> Ordering {
    a.route()
        .cmp(b.route())
        .then_with(|| a.order().cmp(&b.order()))
}

/// Stable sort into document order. Exact duplicates keep their input order.
pub fn sort_chunks(chunks: &mut [Chunk]) {
    chunks.sort_by(compare_chunks);
}

/// Drop repeated `(route, order)` pairs, keeping the first occurrence.
pub fn dedup_chunks(chunks: &[Chunk]) -> Vec<Chunk> {
    let mut seen: HashSet<(&HeaderRoute, u32)> = HashSet::with_capacity(chunks.len());
    chunks
        .iter()
        .filter(|&c| seen.insert((c.route(), c.order())))
        .cloned()
        .collect()
}

/// Deduplicate, order, and group chunks into reconstructed sections.
pub fn reconstruct_sections(chunks: &[Chunk]) -> Vec<ReconstructedSection> {
    let mut ordered = dedup_chunks(chunks);
    sort_chunks(&mut ordered);

    let mut sections: Vec<ReconstructedSection> = Vec::new();
    let mut last_order = 0u32;

    for chunk in &ordered {
        let extends = sections
            .last()
            .is_some_and(|s| s.header_route_levels == *chunk.route());
        if let Some(section) = sections.last_mut().filter(|_| extends) {
            // Adjacent slices repeat the previous tail; drop it once.
            let text = if chunk.order() == last_order + 1 {
                skip_leading_words(&chunk.text, chunk.metadata.overlap_words)
            } else {
                chunk.text.as_str()
            };
            if !text.is_empty() {
                section.text.push_str(SEPARATOR);
                section.text.push_str(text);
            }
            section.tokens += chunk.metadata.tokens;
            section.char_count += chunk.metadata.char_count;
        } else {
            sections.push(ReconstructedSection {
                header_route: chunk.metadata.header_route.clone(),
                header_route_levels: chunk.route().clone(),
                text: chunk.text.clone(),
                tokens: chunk.metadata.tokens,
                char_count: chunk.metadata.char_count,
            });
        }
        last_order = chunk.order();
    }
    sections
}

/// Render sections as markdown-headed blocks for the answer model.
pub fn render_context(sections: &[ReconstructedSection]) -> String {
    sections
        .iter()
        .map(|s| {
            if s.header_route.is_empty() {
                s.text.clone()
            } else {
                format!("## {}\n{}", s.header_route, s.text)
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
