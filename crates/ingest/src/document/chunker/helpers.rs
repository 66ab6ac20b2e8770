//! Text windowing and measuring utilities used by the chunker and its
//! downstream passes.

use sha2::{Digest, Sha256};

use super::types::ChunkerConfig;
use crate::document::route::HeaderRoute;
use crate::error::{StructureError, ValidationError};
use crate::tokenizer::{Tokenizer, TokenizerError};

/// One window of section text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Slice {
    pub text: String,
    /// Leading words copied from the tail of the previous slice.
    pub overlap_words: usize,
}

/// Split `content` into word windows of at most `max_tokens_per_chunk`
/// tokens, each starting with up to `token_overlap` tokens of the previous
/// window. A single word costlier than the budget gets a window of its own.
///
/// Per-word costs size the window greedily; the joined text is then recounted
/// and trailing words dropped until it fits, since separators may cost tokens
/// of their own.
pub(crate) fn window_slices(
    content: &str,
    config: &ChunkerConfig,
    tokenizer: &dyn Tokenizer,
) -> Result<Vec<Slice>, TokenizerError> {
    let words: Vec<&str> = content.split_whitespace().collect();
    if words.is_empty() {
        return Ok(Vec::new());
    }
    let costs = words
        .iter()
        .map(|w| tokenizer.count(w))
        .collect::<Result<Vec<_>, _>>()?;
    let joined_cost = |from: usize, to: usize| tokenizer.count(&words[from..to].join(" "));

    let max = config.max_tokens_per_chunk;
    let mut slices = Vec::new();
    let mut start = 0;
    let mut overlap_words = 0;

    loop {
        let mut end = start;
        let mut used = 0;
        while end < words.len() && (end == start || used + costs[end] <= max) {
            used += costs[end];
            end += 1;
        }
        // Keep the carried words and at least one new word.
        let floor = start + overlap_words + 1;
        while end > floor && joined_cost(start, end)? > max {
            end -= 1;
        }
        slices.push(Slice {
            text: words[start..end].join(" "),
            overlap_words,
        });
        if end >= words.len() {
            break;
        }

        // Carry tail words into the next window while the carried tokens stay
        // within the overlap and still leave room for the next new word.
        let mut back = 0;
        let mut carried = 0;
        while back + 1 < end - start {
            let cost = costs[end - 1 - back];
            if carried + cost > config.token_overlap || carried + cost + costs[end] > max {
                break;
            }
            carried += cost;
            back += 1;
        }
        while back > 0
            && (joined_cost(end - back, end)? > config.token_overlap
                || joined_cost(end - back, end + 1)? > max)
        {
            back -= 1;
        }
        start = end - back;
        overlap_words = back;
    }
    Ok(slices)
}

/// Drop the first `n` whitespace-delimited words of `text`.
pub(crate) fn skip_leading_words(text: &str, n: usize) -> &str {
    if n == 0 {
        return text;
    }
    let mut rest = text.trim_start();
    for _ in 0..n {
        match rest.find(char::is_whitespace) {
            Some(i) => rest = rest[i..].trim_start(),
            None => return "",
        }
    }
    rest
}

/// Token and character counts of emitted text. Both must be positive.
pub(crate) fn measure(
    text: &str,
    route: &HeaderRoute,
    tokenizer: &dyn Tokenizer,
) -> Result<(usize, usize), StructureError> {
    let tokens = tokenizer.count(text)?;
    if tokens == 0 {
        return Err(ValidationError::NonPositive {
            field: "tokens",
            route: route.to_string(),
        }
        .into());
    }
    let chars = text.chars().count();
    if chars == 0 {
        return Err(ValidationError::NonPositive {
            field: "char_count",
            route: route.to_string(),
        }
        .into());
    }
    Ok((tokens, chars))
}

/// Stable section identifier: hex of the first 16 bytes of
/// SHA-256(document id, NUL, route).
pub(crate) fn section_id(document_id: &str, route: &HeaderRoute) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(route.to_string().as_bytes());
    let digest = hasher.finalize();
    digest[..16].iter().map(|b| format!("{b:02x}")).collect()
}
