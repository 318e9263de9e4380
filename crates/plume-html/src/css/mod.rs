//! Minimal CSS support for inline-style output.
//!
//! Only what the HTML phase needs: declaration lists, a tolerant stylesheet
//! tokenizer, simple selectors and `var()` resolution.

mod declarations;
mod selector;
mod sheet;
mod vars;

pub use declarations::Declarations;
pub use selector::Selector;
pub use sheet::{StyleRule, parse_rules};
pub use vars::{CssVariables, MAX_VAR_DEPTH, resolve_inline_styles, resolve_style_blocks};

/// Split `s` on `sep` where it is not nested in parentheses or quotes.
pub(crate) fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, c) if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Index of the bracket closing the one at `open`, skipping quoted strings.
pub(crate) fn matching_close(s: &str, open: usize, open_ch: char, close_ch: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote = None;
    for (i, c) in s[open..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, c) if c == open_ch => depth += 1,
            (None, c) if c == close_ch => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}
