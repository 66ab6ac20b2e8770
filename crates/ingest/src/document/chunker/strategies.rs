//! Pre-order section walk: tables first, then windowed body text.

use tracing::debug;

use super::helpers::{measure, section_id, window_slices};
use super::types::{Chunk, ChunkMetadata, ChunkerConfig};
use crate::document::tree::SectionNode;
use crate::error::StructureError;
use crate::tokenizer::Tokenizer;

/// Chunk every section of `root` in document order.
///
/// `order` counts within a section (tables first, then text slices);
/// `total_order` is assigned afterwards in one pass over the pre-order output.
pub fn chunk_tree(
    root: &SectionNode,
    document_id: &str,
    config: &ChunkerConfig,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<Chunk>, StructureError> {
    config.validate()?;

    let mut chunks = Vec::new();
    // Titles along the current path, indexed by depth.
    let mut titles: Vec<&str> = Vec::new();
    let mut stack = vec![(root, 0usize)];
    while let Some((node, depth)) = stack.pop() {
        titles.truncate(depth);
        titles.push(&node.title);

        // The root has no route of its own and carries no content.
        if !node.is_root() {
            let header_route = titles
                .iter()
                .filter(|t| !t.is_empty())
                .copied()
                .collect::<Vec<_>>()
                .join(" > ");
            chunk_section(node, document_id, config, tokenizer, &header_route, &mut chunks)?;
        }
        stack.extend(node.subsections.iter().rev().map(|child| (child, depth + 1)));
    }

    // Assign global indices.
    for (i, c) in chunks.iter_mut().enumerate() {
        c.metadata.total_order = i as u32 + 1;
    }

    debug!(
        document_id,
        sections = root.section_count() - 1,
        chunks = chunks.len(),
        tokenizer = tokenizer.name(),
        "chunked section tree"
    );
    Ok(chunks)
}

fn chunk_section(
    node: &SectionNode,
    document_id: &str,
    config: &ChunkerConfig,
    tokenizer: &dyn Tokenizer,
    header_route: &str,
    out: &mut Vec<Chunk>,
) -> Result<(), StructureError> {
    let route = &node.header_route_levels;
    let section_id = section_id(document_id, route);
    let mut order = 0u32;

    let mut push = |text: String, table: bool, overlap_words: usize| -> Result<(), StructureError> {
        let (tokens, char_count) = measure(&text, route, tokenizer)?;
        order += 1;
        out.push(Chunk {
            text,
            metadata: ChunkMetadata {
                header_route: header_route.to_string(),
                header_route_levels: route.clone(),
                order,
                total_order: 0, // filled later
                tokens,
                char_count,
                table,
                section_id: section_id.clone(),
                reconciled: false,
                overlap_words,
            },
        });
        Ok(())
    };

    // Tables are atomic: one chunk each, even past the token budget.
    for table in node.tables.values() {
        let table = table.trim();
        if !table.is_empty() {
            push(table.to_string(), true, 0)?;
        }
    }
    for slice in window_slices(&node.content, config, tokenizer)? {
        push(slice.text, false, slice.overlap_words)?;
    }
    Ok(())
}
