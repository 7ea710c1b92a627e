//! Text processing utilities for interactive mode
//!
//! Unicode-aware width calculation and truncation for list rows.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: char = '…';

/// Calculate the display width of text considering Unicode characters
pub fn text_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Calculate the display width of a single character
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(0)
}

/// Cut text to at most `max_width` columns, marking the cut with an ellipsis
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - char_width(ELLIPSIS);
    let mut out = String::new();
    let mut width = 0;
    for ch in text.chars() {
        let w = char_width(ch);
        if width + w > budget {
            break;
        }
        out.push(ch);
        width += w;
    }
    out.push(ELLIPSIS);
    out
}

/// Keep the last `max_width` columns of text, used for the query line
pub fn tail_to_width(text: &str, max_width: usize) -> &str {
    let mut width = 0;
    for (index, ch) in text.char_indices().rev() {
        width += char_width(ch);
        if width > max_width {
            return &text[index + ch.len_utf8()..];
        }
    }
    text
}
