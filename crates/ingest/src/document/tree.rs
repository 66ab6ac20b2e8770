//! Section tree built from a flat sequence of parsed heading records.

use docchat_core::{SectionRecord, TableMap};
use serde::{Deserialize, Serialize};

use super::route::HeaderRoute;
use crate::error::ValidationError;

/// Deepest heading level a section may sit at. Deeper records are nested
/// directly under the open section instead.
pub const MAX_SECTION_DEPTH: u32 = 64;

/// A titled section with its own body text, tables, and ordered subsections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionNode {
    /// Heading text. Empty for the root and for synthetic sections.
    #[serde(default)]
    pub title: String,
    /// Heading depth, 0 for the root.
    pub level: u32,
    pub header_route_levels: HeaderRoute,
    /// Body text of this section only, excluding subsections.
    #[serde(default)]
    pub content: String,
    /// Tables keyed by their position in `content`, in document order.
    #[serde(default)]
    pub tables: TableMap,
    #[serde(default)]
    pub subsections: Vec<SectionNode>,
}

impl SectionNode {
    pub fn root() -> Self {
        Self::default()
    }

    fn synthetic(level: u32) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    fn from_record(record: &SectionRecord, level: u32) -> Self {
        Self {
            title: record.heading_text.trim().to_string(),
            level,
            header_route_levels: HeaderRoute::root(),
            content: record.body_text.clone(),
            tables: record.tables.clone(),
            subsections: Vec::new(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.header_route_levels.is_root()
    }

    /// Number of sections in this subtree, including `self`.
    pub fn section_count(&self) -> usize {
        1 + self
            .subsections
            .iter()
            .map(SectionNode::section_count)
            .sum::<usize>()
    }

    /// Look up a descendant (or `self`) by route.
    pub fn find(&self, route: &HeaderRoute) -> Option<&SectionNode> {
        let mut node = self;
        for &index in route.segments() {
            node = node.subsections.get(index.checked_sub(1)? as usize)?;
        }
        Some(node)
    }

    /// Pre-order traversal of this subtree.
    pub fn preorder(&self) -> Vec<&SectionNode> {
        let mut out = Vec::with_capacity(self.section_count());
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.subsections.iter().rev());
        }
        out
    }

    /// Number every subsection from this node down, with `self` as the root.
    fn assign_routes(&mut self) {
        self.header_route_levels = HeaderRoute::root();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            let route = node.header_route_levels.clone();
            for (i, child) in node.subsections.iter_mut().enumerate() {
                child.header_route_levels = route.child(i as u32 + 1);
                stack.push(child);
            }
        }
    }
}

/// A heading whose level skipped past the open ancestors or past
/// [`MAX_SECTION_DEPTH`]. The builder fills gaps with empty-titled sections
/// and pulls runaway levels up; the caller decides how to report it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuralInconsistency {
    /// Index of the offending record in the input.
    pub record_index: usize,
    pub heading: String,
    /// Level the section was placed at.
    pub level: u32,
    /// Level the record asked for.
    pub requested_level: u32,
    /// Level of the deepest section open when the record arrived.
    pub open_level: u32,
    /// Number of synthetic sections inserted.
    pub synthesized: u32,
}

#[derive(Debug, Clone)]
pub struct SectionTree {
    pub root: SectionNode,
    pub anomalies: Vec<StructuralInconsistency>,
}

/// Build a section tree from parsed records.
///
/// Only empty input is rejected. Nesting jumps never fail: a level-3 heading
/// with no open level-2 ancestor gets an empty-titled level-2 parent. Records
/// at level 0 are treated as level 1, and records deeper than
/// [`MAX_SECTION_DEPTH`] become a child of the open section.
pub fn build_section_tree(records: &[SectionRecord]) -> Result<SectionTree, ValidationError> {
    if records.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let mut anomalies = Vec::new();
    // stack[0] is the root; stack[i] is the open section at depth i.
    let mut stack: Vec<SectionNode> = vec![SectionNode::root()];

    for (record_index, record) in records.iter().enumerate() {
        let requested_level = record.level.max(1);
        let level = if requested_level > MAX_SECTION_DEPTH {
            let open_level = stack.last().map_or(0, |top| top.level);
            (open_level + 1).min(MAX_SECTION_DEPTH)
        } else {
            requested_level
        };
        close_open_sections(&mut stack, level);

        let open_level = stack.last().map_or(0, |top| top.level);
        let synthesized = level.saturating_sub(open_level + 1);
        if synthesized > 0 || level != requested_level {
            anomalies.push(StructuralInconsistency {
                record_index,
                heading: record.heading_text.clone(),
                level,
                requested_level,
                open_level,
                synthesized,
            });
            for synthetic_level in open_level + 1..level {
                stack.push(SectionNode::synthetic(synthetic_level));
            }
        }
        stack.push(SectionNode::from_record(record, level));
    }
    close_open_sections(&mut stack, 1);

    let mut root = stack.pop().unwrap_or_default();
    root.assign_routes();
    Ok(SectionTree { root, anomalies })
}

/// Pop every open section at `level` or deeper into its parent.
fn close_open_sections(stack: &mut Vec<SectionNode>, level: u32) {
    while stack.len() > 1 && stack.last().is_some_and(|top| top.level >= level) {
        if let Some(node) = stack.pop() {
            if let Some(parent) = stack.last_mut() {
                parent.subsections.push(node);
            }
        }
    }
}
