//! Tests for the chunking engine.

use std::collections::BTreeMap;

use docchat_core::SectionRecord;

use super::helpers::{section_id, skip_leading_words, window_slices};
use super::strategies::chunk_tree;
use super::types::{Chunk, ChunkerConfig};
use crate::document::route::HeaderRoute;
use crate::document::tree::{build_section_tree, SectionNode};
use crate::error::{StructureError, ValidationError};
use crate::tokenizer::{Tokenizer, TokenizerError, WhitespaceTokenizer};

fn words(prefix: &str, n: usize) -> String {
    (0..n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>().join(" ")
}

fn tree(records: Vec<SectionRecord>) -> SectionNode {
    build_section_tree(&records).unwrap().root
}

fn config(max: usize, overlap: usize) -> ChunkerConfig {
    ChunkerConfig {
        max_tokens_per_chunk: max,
        token_overlap: overlap,
    }
}

fn chunk(root: &SectionNode, config: &ChunkerConfig) -> Vec<Chunk> {
    chunk_tree(root, "doc-1", config, &WhitespaceTokenizer).unwrap()
}

/// Counts characters as tokens, so multi-letter words cost more than one.
struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(text.chars().filter(|c| !c.is_whitespace()).count())
    }

    fn name(&self) -> &str {
        "chars"
    }
}

/// Counts every byte, separators included, so a joined window costs more
/// than the sum of its words.
struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn count(&self, text: &str) -> Result<usize, TokenizerError> {
        Ok(text.len())
    }

    fn name(&self) -> &str {
        "bytes"
    }
}

struct FailingTokenizer;

impl Tokenizer for FailingTokenizer {
    fn count(&self, _text: &str) -> Result<usize, TokenizerError> {
        Err(TokenizerError::new("failing", "backend unavailable"))
    }

    fn name(&self) -> &str {
        "failing"
    }
}

// ── Ordering ────────────────────────────────────────────────────────

#[test]
fn total_order_is_dense_and_sequential() {
    let root = tree(vec![
        SectionRecord::new("Intro", 1, words("a", 25)),
        SectionRecord::new("Background", 2, words("b", 7)),
        SectionRecord::new("Methods", 1, words("c", 12)).with_table(0, "| x | y |"),
    ]);
    let chunks = chunk(&root, &config(10, 2));

    let totals: Vec<u32> = chunks.iter().map(|c| c.metadata.total_order).collect();
    let expected: Vec<u32> = (1..=chunks.len() as u32).collect();
    assert_eq!(totals, expected);
}

#[test]
fn order_restarts_per_section_without_gaps() {
    let root = tree(vec![
        SectionRecord::new("Intro", 1, words("a", 25)),
        SectionRecord::new("Methods", 1, words("c", 12))
            .with_table(0, "| t1 |")
            .with_table(5, "| t2 |"),
    ]);
    let chunks = chunk(&root, &config(10, 2));

    let mut per_route: BTreeMap<HeaderRoute, Vec<u32>> = BTreeMap::new();
    for c in &chunks {
        per_route.entry(c.route().clone()).or_default().push(c.order());
    }
    for orders in per_route.values() {
        let expected: Vec<u32> = (1..=orders.len() as u32).collect();
        assert_eq!(orders, &expected);
    }
}

#[test]
fn tables_come_before_text_in_section_order() {
    let root = tree(vec![SectionRecord::new("Results", 1, words("r", 5))
        .with_table(3, "| a | b |\n|---|---|\n| 1 | 2 |")]);
    let chunks = chunk(&root, &config(50, 5));

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].is_table());
    assert_eq!(chunks[0].order(), 1);
    assert!(chunks[0].text.starts_with("| a | b |"));
    assert!(!chunks[1].is_table());
    assert_eq!(chunks[1].order(), 2);
}

#[test]
fn preorder_walk_visits_parent_before_children() {
    let root = tree(vec![
        SectionRecord::new("A", 1, "parent text"),
        SectionRecord::new("A1", 2, "child text"),
        SectionRecord::new("B", 1, "sibling text"),
    ]);
    let chunks = chunk(&root, &config(50, 5));
    let routes: Vec<String> = chunks.iter().map(|c| c.route().to_string()).collect();
    assert_eq!(routes, vec!["1", "1>1", "2"]);
}

// ── Windowing ───────────────────────────────────────────────────────

#[test]
fn slices_respect_budget_and_overlap() {
    let root = tree(vec![SectionRecord::new("Long", 1, words("w", 10))]);
    let chunks = chunk(&root, &config(4, 2));

    let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["w0 w1 w2 w3", "w2 w3 w4 w5", "w4 w5 w6 w7", "w6 w7 w8 w9"]
    );
    let overlaps: Vec<usize> = chunks.iter().map(|c| c.metadata.overlap_words).collect();
    assert_eq!(overlaps, vec![0, 2, 2, 2]);
    for c in &chunks {
        assert!(c.metadata.tokens <= 4);
    }
}

#[test]
fn dropping_overlap_reproduces_content() {
    let content = words("w", 57);
    let root = tree(vec![SectionRecord::new("Long", 1, content.clone())]);
    let chunks = chunk(&root, &config(9, 3));

    let rebuilt = chunks
        .iter()
        .map(|c| skip_leading_words(&c.text, c.metadata.overlap_words))
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rebuilt, content);
}

#[test]
fn counts_reflect_emitted_text() {
    let root = tree(vec![SectionRecord::new("S", 1, "  héllo   wörld  ")]);
    let chunks = chunk(&root, &config(10, 2));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text, "héllo wörld");
    assert_eq!(chunks[0].metadata.tokens, 2);
    assert_eq!(chunks[0].metadata.char_count, 11);
}

#[test]
fn costly_words_get_windows_of_their_own() {
    let cfg = config(5, 2);
    let slices = window_slices("tiny enormousword ok", &cfg, &CharTokenizer).unwrap();
    let texts: Vec<&str> = slices.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["tiny", "enormousword", "ok"]);
    assert!(slices.iter().all(|s| s.overlap_words == 0));
}

#[test]
fn separator_costs_shrink_the_window() {
    let cfg = config(10, 3);
    let slices = window_slices("aaa bbb ccc ddd eee fff", &cfg, &ByteTokenizer).unwrap();
    let texts: Vec<&str> = slices.iter().map(|s| s.text.as_str()).collect();
    assert_eq!(
        texts,
        vec!["aaa bbb", "bbb ccc", "ccc ddd", "ddd eee", "eee fff"]
    );
    let overlaps: Vec<usize> = slices.iter().map(|s| s.overlap_words).collect();
    assert_eq!(overlaps, vec![0, 1, 1, 1, 1]);
}

#[test]
fn emitted_slices_fit_budget_under_byte_counts() {
    let content = words("w", 40);
    let root = tree(vec![SectionRecord::new("Long", 1, content.clone())]);
    let cfg = config(12, 4);
    let chunks = chunk_tree(&root, "doc-1", &cfg, &ByteTokenizer).unwrap();

    assert!(chunks.len() > 1);
    for c in &chunks {
        assert!(c.metadata.tokens <= 12, "{:?} costs {}", c.text, c.metadata.tokens);
        assert_eq!(c.metadata.tokens, c.text.len());
    }
    let rebuilt = chunks
        .iter()
        .map(|c| skip_leading_words(&c.text, c.metadata.overlap_words))
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(rebuilt, content);
}

#[test]
fn oversized_table_is_emitted_whole() {
    let table = words("cell", 2000);
    let root = tree(vec![SectionRecord::new("Data", 1, "").with_table(0, table.clone())]);
    let chunks = chunk(&root, &config(500, 50));

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].is_table());
    assert_eq!(chunks[0].text, table);
    assert_eq!(chunks[0].metadata.tokens, 2000);
}

// ── Metadata ────────────────────────────────────────────────────────

#[test]
fn empty_sections_emit_nothing_but_children_are_walked() {
    let root = tree(vec![
        SectionRecord::new("Empty", 1, "   "),
        SectionRecord::new("Child", 2, "child body"),
    ]);
    let chunks = chunk(&root, &config(10, 2));
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].route().to_string(), "1>1");
    assert_eq!(chunks[0].metadata.header_route, "Empty > Child");
    assert_eq!(chunks[0].metadata.total_order, 1);
}

#[test]
fn synthetic_titles_are_left_out_of_header_route() {
    let root = tree(vec![
        SectionRecord::new("Top", 1, ""),
        SectionRecord::new("Deep", 3, "deep body"),
    ]);
    let chunks = chunk(&root, &config(10, 2));
    assert_eq!(chunks[0].route().to_string(), "1>1>1");
    assert_eq!(chunks[0].metadata.header_route, "Top > Deep");
}

#[test]
fn section_ids_are_stable_and_distinct() {
    let root = tree(vec![
        SectionRecord::new("A", 1, words("a", 30)),
        SectionRecord::new("B", 1, "b"),
    ]);
    let first = chunk(&root, &config(10, 2));
    let second = chunk(&root, &config(10, 2));
    assert_eq!(first, second);

    let a_ids: Vec<&str> = first
        .iter()
        .filter(|c| c.route().to_string() == "1")
        .map(|c| c.metadata.section_id.as_str())
        .collect();
    assert!(a_ids.len() > 1);
    assert!(a_ids.iter().all(|id| *id == a_ids[0]));
    assert_eq!(a_ids[0].len(), 32);

    let b = first.last().unwrap();
    assert_ne!(b.metadata.section_id, a_ids[0]);
    assert_ne!(
        section_id("doc-1", b.route()),
        section_id("doc-2", b.route())
    );
}

#[test]
fn chunks_are_not_marked_reconciled() {
    let root = tree(vec![SectionRecord::new("A", 1, "text")]);
    assert!(chunk(&root, &config(10, 2))
        .iter()
        .all(|c| !c.metadata.reconciled));
}

// ── Failures ────────────────────────────────────────────────────────

#[test]
fn invalid_budgets_are_rejected() {
    let root = tree(vec![SectionRecord::new("A", 1, "text")]);
    for (max, overlap) in [(10, 10), (5, 8), (0, 0), (10, 0)] {
        let err = chunk_tree(&root, "doc", &config(max, overlap), &WhitespaceTokenizer)
            .unwrap_err();
        assert!(
            matches!(
                err,
                StructureError::Validation(ValidationError::InvalidChunkBudget { .. })
            ),
            "({max}, {overlap}) should be rejected"
        );
    }
}

#[test]
fn tokenizer_errors_propagate_unchanged() {
    let root = tree(vec![SectionRecord::new("A", 1, "text")]);
    let err = chunk_tree(&root, "doc", &config(10, 2), &FailingTokenizer).unwrap_err();
    match err {
        StructureError::Tokenizer(e) => {
            assert_eq!(e, TokenizerError::new("failing", "backend unavailable"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn skip_leading_words_handles_edges() {
    assert_eq!(skip_leading_words("a b c", 0), "a b c");
    assert_eq!(skip_leading_words("a b c", 2), "c");
    assert_eq!(skip_leading_words("a b c", 3), "");
    assert_eq!(skip_leading_words("a b", 5), "");
    assert_eq!(skip_leading_words("  a\n b", 1), "b");
}
