use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Malformed configuration or metadata. Fails fast and is never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("section records must not be empty")]
    EmptyInput,

    #[error(
        "chunk budget invalid: max_tokens_per_chunk ({max}) and token_overlap ({overlap}) \
         must be positive with max > overlap"
    )]
    InvalidChunkBudget { max: usize, overlap: usize },

    #[error("min_tokens_per_chunk ({min}) must be below max_tokens_per_chunk ({max})")]
    InvalidReconcileBudget { min: usize, max: usize },

    #[error("invalid header route {route:?}: {reason}")]
    InvalidRoute { route: String, reason: String },

    #[error("chunk metadata has an empty header route")]
    EmptyRoute,

    #[error("{field} must be positive (route {route})")]
    NonPositive { field: &'static str, route: String },

    #[error("chunk at route {route} has an empty section id")]
    EmptySectionId { route: String },

    #[error("duplicate sibling index at route {route}")]
    DuplicateSiblingIndex { route: String },

    #[error("section route {child} is not a direct child of {parent}")]
    RouteMismatch { parent: String, child: String },

    #[error("section route {route} is deeper than {max} levels")]
    TooDeep { route: String, max: u32 },

    #[error("root section must not carry content or tables")]
    RootContent,

    #[error("order values for route {route} do not form a run starting at 1")]
    OrderGap { route: String },

    #[error("total order {total_order} appears more than once")]
    DuplicateTotalOrder { total_order: u32 },
}

#[derive(Debug, Error)]
pub enum StructureError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}
