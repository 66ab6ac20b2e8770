//! Document structuring: section trees, chunking, reconciliation, and
//! reading-order reconstruction.

pub mod chunker;
pub mod reconcile;
pub mod reconstruct;
pub mod records;
pub mod route;
pub mod tree;
pub mod validate;

pub use chunker::{chunk_tree, Chunk, ChunkMetadata, ChunkerConfig};
pub use reconcile::{reconcile_chunks, ReconcileConfig};
pub use reconstruct::{
    compare_chunks, dedup_chunks, reconstruct_sections, render_context, sort_chunks,
    ReconstructedSection,
};
pub use records::records_from_markdown;
pub use route::HeaderRoute;
pub use tree::{
    build_section_tree, SectionNode, SectionTree, StructuralInconsistency, MAX_SECTION_DEPTH,
};
pub use validate::{validate_chunk, validate_chunk_set, validate_tree};
