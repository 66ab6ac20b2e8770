//! Document structuring pipeline.
//!
//! Turns parsed document records into a hierarchical section tree, splits the
//! tree into token-bounded chunks tagged with their header route, reconciles
//! undersized chunks, and restores reading order for chunks that come back
//! from similarity search in arbitrary order.

pub mod document;
pub mod error;
pub mod pipeline;
pub mod tokenizer;

pub use error::{StructureError, ValidationError};
pub use pipeline::{IngestPipeline, IngestedDocument};
pub use tokenizer::{Tokenizer, TokenizerError, WhitespaceTokenizer};
