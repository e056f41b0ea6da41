use crate::item::Fragment;

use super::tokens::TokenCounter;

pub const CHUNK_SEPARATOR: &str = " [...] ";

/// Join fragments into one string with the default gap marker.
pub fn assemble_chunks(chunks: Vec<Fragment>) -> String {
    assemble_chunks_with(chunks, CHUNK_SEPARATOR)
}

/// Join fragments into one string.
///
/// When every fragment knows its source offset the fragments are put back in
/// source order (stable, so equal offsets keep retrieval order); otherwise
/// retrieval order is kept.
pub fn assemble_chunks_with(mut chunks: Vec<Fragment>, separator: &str) -> String {
    if !chunks.is_empty() && chunks.iter().all(|c| c.start.is_some()) {
        chunks.sort_by_key(|c| c.start);
    }

    chunks
        .iter()
        .map(|c| c.text.as_str())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Longest prefix of `chunks` whose total token count is within `max_tokens`.
pub fn truncate_chunks<T>(chunks: Vec<Fragment>, max_tokens: usize, counter: &T) -> Vec<Fragment>
where
    T: TokenCounter + ?Sized,
{
    let mut result = Vec::new();
    let mut used_tokens = 0;

    for chunk in chunks {
        let chunk_tokens = counter.count_tokens(&chunk.text);
        if used_tokens + chunk_tokens <= max_tokens {
            used_tokens += chunk_tokens;
            result.push(chunk);
        } else {
            break;
        }
    }

    result
}

/// Longest prefix of `chunks` that still fits `max_tokens` once joined with
/// `separator`.
pub fn fit_chunks<T>(
    chunks: Vec<Fragment>,
    max_tokens: usize,
    separator: &str,
    counter: &T,
) -> Vec<Fragment>
where
    T: TokenCounter + ?Sized,
{
    let mut kept = truncate_chunks(chunks, max_tokens, counter);
    while kept.len() > 1 {
        let joined = assemble_chunks_with(kept.clone(), separator);
        if counter.count_tokens(&joined) <= max_tokens {
            break;
        }
        kept.pop();
    }
    kept
}
