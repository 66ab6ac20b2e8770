//! Token-bounded chunking of a section tree.
//!
//! Walks the tree depth-first and emits table chunks and overlapping text
//! windows, each tagged with its section's header route and position.

pub(crate) mod helpers;
mod strategies;
mod types;

pub use strategies::chunk_tree;
pub use types::{Chunk, ChunkMetadata, ChunkerConfig};

#[cfg(test)]
mod tests;
