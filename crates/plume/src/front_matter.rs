//! YAML front matter handling.

/// Return `markdown` without a leading `---` front matter block.
///
/// The block must open on the first line and close with a `---` or `...`
/// line. An unclosed block is treated as content.
pub(crate) fn strip_front_matter(markdown: &str) -> &str {
    let text = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let mut lines = text.split_inclusive('\n');
    let Some(first) = lines.next() else {
        return markdown;
    };
    if first.trim_end() != "---" {
        return markdown;
    }

    let mut offset = first.len();
    for line in lines {
        offset += line.len();
        if matches!(line.trim_end(), "---" | "...") {
            return text[offset..].trim_start_matches(['\r', '\n']);
        }
    }
    markdown
}
