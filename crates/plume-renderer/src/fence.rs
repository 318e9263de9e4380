//! Line-level scanning helpers shared by the source preprocessors.
//!
//! Footnote and callout syntax must be ignored inside fenced code blocks and
//! inline code spans.

/// Tracks whether a line sequence is inside a fenced code block.
#[derive(Default)]
pub(crate) struct FenceTracker {
    /// Character used for the current fence (backtick or tilde).
    fence_char: Option<char>,
    /// Length of the opening fence (minimum length for closing).
    fence_len: usize,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn in_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state with the next line.
    ///
    /// Returns `true` if the line is a fence marker (opening or closing).
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            false
        } else if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            true
        } else {
            false
        }
    }
}

/// Detect an opening code fence, returning its character and length.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let count = trimmed.chars().take_while(|&c| c == first).count();
    // Backtick fences cannot carry backticks in their info string.
    if first == '`' && trimmed[count..].contains('`') {
        return None;
    }
    (count >= 3).then_some((first, count))
}

/// Closing fence: same character, at least as long, nothing but whitespace after.
fn is_closing_fence(trimmed: &str, expected: char, min_len: usize) -> bool {
    let count = trimmed.chars().take_while(|&c| c == expected).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Split a line into alternating (is_code, text) segments, where code segments
/// are complete inline code spans including their backtick delimiters.
///
/// An unmatched backtick run is treated as plain text.
pub(crate) fn split_code_spans(line: &str) -> Vec<(bool, &str)> {
    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }
        let run_start = i;
        while i < bytes.len() && bytes[i] == b'`' {
            i += 1;
        }
        let run_len = i - run_start;

        if let Some(close_end) = find_closing_run(bytes, i, run_len) {
            if plain_start < run_start {
                segments.push((false, &line[plain_start..run_start]));
            }
            segments.push((true, &line[run_start..close_end]));
            plain_start = close_end;
            i = close_end;
        }
    }

    if plain_start < line.len() {
        segments.push((false, &line[plain_start..]));
    }
    segments
}

/// Find a backtick run of exactly `len` starting at or after `from`; return the
/// index just past it.
fn find_closing_run(bytes: &[u8], from: usize, len: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            if i - start == len {
                return Some(i);
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Strip up to three spaces of indentation, the block-level allowance.
///
/// Returns `None` when the line is indented four or more spaces (or by a tab).
pub(crate) fn strip_block_indent(line: &str) -> Option<(&str, &str)> {
    let spaces = line.bytes().take_while(|&b| b == b' ').count();
    if spaces > 3 || line[spaces..].starts_with('\t') {
        return None;
    }
    Some(line.split_at(spaces))
}
