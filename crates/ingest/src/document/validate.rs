//! Metadata checks applied where data enters the pipeline: trees handed over
//! by a structure-aware parser, and chunks handed back by the vector store.
//! Internal passes rely on the types instead of re-checking.

use std::collections::{BTreeMap, HashSet};

use super::chunker::Chunk;
use super::route::HeaderRoute;
use super::tree::{SectionNode, MAX_SECTION_DEPTH};
use crate::error::ValidationError;

/// Check route derivation, depth, and uniqueness across a prebuilt tree.
pub fn validate_tree(root: &SectionNode) -> Result<(), ValidationError> {
    if !root.header_route_levels.is_root() {
        return Err(ValidationError::InvalidRoute {
            route: root.header_route_levels.to_string(),
            reason: "root section must have the empty route".to_string(),
        });
    }
    if !root.content.trim().is_empty() || !root.tables.is_empty() {
        return Err(ValidationError::RootContent);
    }
    let mut seen = HashSet::new();
    validate_children(root, &mut seen)
}

fn validate_children<'a>(
    node: &'a SectionNode,
    seen: &mut HashSet<&'a HeaderRoute>,
) -> Result<(), ValidationError> {
    let mut sibling_indices = HashSet::with_capacity(node.subsections.len());
    for child in &node.subsections {
        let route = &child.header_route_levels;
        if route.parent().as_ref() != Some(&node.header_route_levels) {
            return Err(ValidationError::RouteMismatch {
                parent: node.header_route_levels.to_string(),
                child: route.to_string(),
            });
        }
        if route.depth() > MAX_SECTION_DEPTH as usize {
            return Err(ValidationError::TooDeep {
                route: route.to_string(),
                max: MAX_SECTION_DEPTH,
            });
        }
        let index = route.last().unwrap_or_default();
        if !sibling_indices.insert(index) || !seen.insert(route) {
            return Err(ValidationError::DuplicateSiblingIndex {
                route: route.to_string(),
            });
        }
        validate_children(child, seen)?;
    }
    Ok(())
}

/// Check one chunk's metadata shape.
pub fn validate_chunk(chunk: &Chunk) -> Result<(), ValidationError> {
    let meta = &chunk.metadata;
    let route = meta.header_route_levels.to_string();
    if meta.header_route_levels.is_root() {
        return Err(ValidationError::EmptyRoute);
    }
    let positive = [
        ("order", meta.order as usize),
        ("total_order", meta.total_order as usize),
        ("tokens", meta.tokens),
        ("char_count", meta.char_count),
    ];
    for (field, value) in positive {
        if value == 0 {
            return Err(ValidationError::NonPositive {
                field,
                route: route.clone(),
            });
        }
    }
    if meta.section_id.trim().is_empty() {
        return Err(ValidationError::EmptySectionId { route });
    }
    Ok(())
}

/// Check a complete document's chunk set: every chunk is well-formed, each
/// section's `order` values run 1..k, and `total_order` is injective.
pub fn validate_chunk_set(chunks: &[Chunk]) -> Result<(), ValidationError> {
    let mut totals = HashSet::with_capacity(chunks.len());
    let mut per_section: BTreeMap<&HeaderRoute, Vec<u32>> = BTreeMap::new();

    for chunk in chunks {
        validate_chunk(chunk)?;
        if !totals.insert(chunk.metadata.total_order) {
            return Err(ValidationError::DuplicateTotalOrder {
                total_order: chunk.metadata.total_order,
            });
        }
        per_section
            .entry(chunk.route())
            .or_default()
            .push(chunk.order());
    }

    for (route, mut orders) in per_section {
        orders.sort_unstable();
        let contiguous = orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order as usize == i + 1);
        if !contiguous {
            return Err(ValidationError::OrderGap {
                route: route.to_string(),
            });
        }
    }
    Ok(())
}
