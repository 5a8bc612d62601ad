//! Splits oversized text into segments the gateways accept.
//!
//! Width is measured in display columns so wide characters count for what
//! they occupy on screen. Splitting prefers whitespace boundaries; text that
//! offers no boundary at all is cut on character boundaries instead.

use unicode_width::UnicodeWidthStr;

/// Largest segment any backend accepts in one text message.
pub const MAX_CHUNK_SIZE: usize = 4096;

/// One piece of a split message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSegment<'a> {
    pub text: &'a str,
    /// Set on the final segment; only this one may carry reply markup.
    pub is_last: bool,
}

/// Display width of `text`.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Split `text` into segments no wider than `limit` columns.
///
/// `limit` is clamped to `1..=MAX_CHUNK_SIZE`. The segments concatenate back
/// to `text` exactly. A single word wider than the limit stays whole when the
/// rest of the text can still be wrapped around it.
pub fn chunk(text: &str, limit: usize) -> Vec<ChunkSegment<'_>> {
    let limit = limit.clamp(1, MAX_CHUNK_SIZE);

    let pieces = if display_width(text) <= limit {
        vec![text]
    } else {
        let wrapped = wrap_words(text, limit);
        if wrapped.len() > 1 {
            wrapped
        } else {
            hard_split(text, limit)
        }
    };

    let last = pieces.len().saturating_sub(1);
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| ChunkSegment {
            text,
            is_last: index == last,
        })
        .collect()
}

/// Greedy word wrap over words and single whitespace characters, so a break
/// never drops characters and a run of spaces can be split anywhere.
fn wrap_words(text: &str, limit: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut width = 0;

    for (token_start, token) in tokens(text) {
        let token_width = display_width(token);
        if width > 0 && width + token_width > limit {
            segments.push(&text[start..token_start]);
            start = token_start;
            width = 0;
        }
        width += token_width;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Cut on character boundaries, filling each segment up to `limit` columns.
fn hard_split(text: &str, limit: usize) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut width = 0;

    for (offset, ch) in text.char_indices() {
        let ch_width = display_width(&text[offset..offset + ch.len_utf8()]);
        if width > 0 && width + ch_width > limit {
            segments.push(&text[start..offset]);
            start = offset;
            width = 0;
        }
        width += ch_width;
    }
    if start < text.len() {
        segments.push(&text[start..]);
    }
    segments
}

/// Runs of non-whitespace and individual whitespace characters, paired with
/// byte offsets.
fn tokens(text: &str) -> Vec<(usize, &str)> {
    let mut out = Vec::new();
    let mut word_start = None;

    for (offset, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = word_start.take() {
                out.push((start, &text[start..offset]));
            }
            out.push((offset, &text[offset..offset + ch.len_utf8()]));
        } else if word_start.is_none() {
            word_start = Some(offset);
        }
    }
    if let Some(start) = word_start {
        out.push((start, &text[start..]));
    }
    out
}
