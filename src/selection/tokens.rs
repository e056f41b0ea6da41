pub trait TokenCounter: Send + Sync {
    fn count_tokens(&self, content: &str) -> usize;
}

/// v0: Approximate GPT-style tokenization
/// tokens(content) := ceil(len(content) / 4)
#[derive(Debug, Clone, Copy, Default)]
pub struct ApproxTokenCounter;

impl TokenCounter for ApproxTokenCounter {
    fn count_tokens(&self, content: &str) -> usize {
        // Integer division ceil(len / 4) equivalent to (len + 4 - 1) / 4
        if content.is_empty() {
            0
        } else {
            (content.len() + 3) / 4
        }
    }
}

/// Largest char boundary of `s` that is `<= index`.
pub(crate) fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Clip `text` to at most `max_tokens` tokens.
///
/// Starts from a four-bytes-per-token estimate and shrinks until the counter
/// agrees, so the result is always a char-boundary prefix that fits.
pub fn truncate_text<'a, T>(text: &'a str, max_tokens: usize, counter: &T) -> &'a str
where
    T: TokenCounter + ?Sized,
{
    if counter.count_tokens(text) <= max_tokens {
        return text;
    }

    let mut end = floor_char_boundary(text, max_tokens.saturating_mul(4));
    loop {
        let tokens = counter.count_tokens(&text[..end]);
        if end == 0 || tokens <= max_tokens {
            break;
        }
        let over = tokens - max_tokens;
        end = floor_char_boundary(text, end.saturating_sub(over));
    }

    &text[..end]
}
