//! Per-render mutable state.
//!
//! A [`RenderContext`] is created for every top-level render and threaded
//! through each markdown plugin call. Plugins never keep render state in
//! themselves, so one plugin set can serve any number of concurrent renders.

use std::collections::BTreeMap;
use std::fmt::Write;

use crate::state::HeadingIds;

/// Prefix of the HTML comment standing in for a rendered fragment.
const FRAGMENT_PREFIX: &str = "<!--plume-fragment-";
const FRAGMENT_SUFFIX: &str = "-->";

/// Footnote definitions plus reference ids in first-occurrence order.
#[derive(Debug, Default)]
pub struct FootnoteTable {
    definitions: BTreeMap<String, String>,
    order: Vec<String>,
}

impl FootnoteTable {
    /// Reset to empty.
    pub fn clear(&mut self) {
        self.definitions.clear();
        self.order.clear();
    }

    /// Store a definition. A later definition of the same id wins.
    pub fn define(&mut self, id: impl Into<String>, content: impl Into<String>) {
        self.definitions.insert(id.into(), content.into());
    }

    /// Record a reference and return its 1-based number.
    ///
    /// The first reference to an id appends it to the order; repeated references
    /// reuse the existing number. The `bool` is `true` on first occurrence.
    pub fn reference(&mut self, id: &str) -> (usize, bool) {
        if let Some(pos) = self.order.iter().position(|r| r == id) {
            (pos + 1, false)
        } else {
            self.order.push(id.to_owned());
            (self.order.len(), true)
        }
    }

    /// Definition text of an id.
    #[must_use]
    pub fn definition(&self, id: &str) -> Option<&str> {
        self.definitions.get(id).map(String::as_str)
    }

    /// Referenced ids in numbering order.
    #[must_use]
    pub fn references(&self) -> &[String] {
        &self.order
    }

    /// Defined ids that were never referenced.
    pub fn unreferenced(&self) -> impl Iterator<Item = &str> {
        self.definitions
            .keys()
            .filter(|id| !self.order.contains(id))
            .map(String::as_str)
    }

    /// Whether no reference has been seen.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Mutable state of a single render.
#[derive(Debug, Default)]
pub struct RenderContext {
    footnotes: FootnoteTable,
    callouts: BTreeMap<String, usize>,
    fragments: Vec<String>,
    heading_ids: HeadingIds,
    warnings: Vec<String>,
    depth: usize,
}

impl RenderContext {
    /// Create a fresh context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Footnote table.
    #[must_use]
    pub fn footnotes(&self) -> &FootnoteTable {
        &self.footnotes
    }

    /// Mutable footnote table.
    pub fn footnotes_mut(&mut self) -> &mut FootnoteTable {
        &mut self.footnotes
    }

    /// Count a rendered callout of `kind`; returns its 1-based index in the document.
    pub fn record_callout(&mut self, kind: &str) -> usize {
        *self.callouts.entry(kind.to_owned()).or_default() += 1;
        self.callout_count()
    }

    /// Callouts rendered so far.
    #[must_use]
    pub fn callout_count(&self) -> usize {
        self.callouts.values().sum()
    }

    /// Callouts rendered so far, per type.
    #[must_use]
    pub fn callouts_by_type(&self) -> &BTreeMap<String, usize> {
        &self.callouts
    }

    /// Store rendered HTML and return the placeholder to emit in its place.
    ///
    /// The placeholder is an HTML comment so pulldown-cmark passes it through as
    /// a raw HTML block regardless of the fragment's own blank lines.
    pub fn store_fragment(&mut self, html: String) -> String {
        let index = self.fragments.len();
        self.fragments.push(html);
        format!("{FRAGMENT_PREFIX}{index}{FRAGMENT_SUFFIX}")
    }

    /// Replace every fragment placeholder in `html` with its stored content.
    ///
    /// Single pass: substituted content is not scanned again.
    #[must_use]
    pub fn substitute_fragments(&self, html: &str) -> String {
        if self.fragments.is_empty() || !html.contains(FRAGMENT_PREFIX) {
            return html.to_owned();
        }

        let mut out = String::with_capacity(html.len());
        let mut rest = html;
        while let Some(start) = rest.find(FRAGMENT_PREFIX) {
            out.push_str(&rest[..start]);
            let after = &rest[start + FRAGMENT_PREFIX.len()..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let fragment = after[..digits]
                .parse::<usize>()
                .ok()
                .filter(|_| after[digits..].starts_with(FRAGMENT_SUFFIX))
                .and_then(|i| self.fragments.get(i));

            if let Some(fragment) = fragment {
                out.push_str(fragment);
                rest = &after[digits + FRAGMENT_SUFFIX.len()..];
            } else {
                out.push_str(FRAGMENT_PREFIX);
                rest = after;
            }
        }
        out.push_str(rest);
        out
    }

    /// Take the heading ids used so far, for a renderer to continue from.
    ///
    /// Hand them back with [`RenderContext::restore_heading_ids`] once the
    /// renderer is done.
    pub fn take_heading_ids(&mut self) -> HeadingIds {
        std::mem::take(&mut self.heading_ids)
    }

    /// Store the heading ids a renderer finished with.
    pub fn restore_heading_ids(&mut self, ids: HeadingIds) {
        self.heading_ids = ids;
    }

    /// Record a non-fatal problem with the document.
    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(message = %message, "Render warning");
        self.warnings.push(message);
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Consume the context, returning its warnings.
    #[must_use]
    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }

    /// Current nesting depth of fragment renders.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    pub(crate) fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

/// Debug summary used in logs.
impl std::fmt::Display for RenderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds = String::new();
        for (kind, n) in &self.callouts {
            if !kinds.is_empty() {
                kinds.push_str(", ");
            }
            let _ = write!(kinds, "{kind}={n}");
        }
        write!(
            f,
            "footnotes={} callouts=[{kinds}] warnings={}",
            self.footnotes.references().len(),
            self.warnings.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reference_order_is_first_occurrence() {
        let mut table = FootnoteTable::default();
        assert_eq!(table.reference("z"), (1, true));
        assert_eq!(table.reference("a"), (2, true));
        assert_eq!(table.reference("z"), (1, false));
        assert_eq!(table.references(), ["z".to_owned(), "a".to_owned()]);
    }

    #[test]
    fn test_unreferenced_definitions() {
        let mut table = FootnoteTable::default();
        table.define("used", "x");
        table.define("spare", "y");
        table.reference("used");
        assert_eq!(table.unreferenced().collect::<Vec<_>>(), vec!["spare"]);
    }

    #[test]
    fn test_clear() {
        let mut table = FootnoteTable::default();
        table.define("a", "x");
        table.reference("a");
        table.clear();
        assert!(table.is_empty());
        assert!(table.definition("a").is_none());
    }

    #[test]
    fn test_fragment_roundtrip() {
        let mut ctx = RenderContext::new();
        let first = ctx.store_fragment("<div>one</div>".to_owned());
        let second = ctx.store_fragment("<div>two</div>".to_owned());
        let html = format!("<p>a</p>{second}\n{first}");
        assert_eq!(
            ctx.substitute_fragments(&html),
            "<p>a</p><div>two</div>\n<div>one</div>"
        );
    }

    #[test]
    fn test_unknown_fragment_left_alone() {
        let mut ctx = RenderContext::new();
        ctx.store_fragment("x".to_owned());
        let html = "<!--plume-fragment-9--><!--plume-fragment-x-->";
        assert_eq!(ctx.substitute_fragments(html), html);
    }

    #[test]
    fn test_callout_counters() {
        let mut ctx = RenderContext::new();
        assert_eq!(ctx.record_callout("tip"), 1);
        assert_eq!(ctx.record_callout("note"), 2);
        assert_eq!(ctx.record_callout("tip"), 3);
        assert_eq!(ctx.callouts_by_type()["tip"], 2);
        assert_eq!(ctx.to_string(), "footnotes=0 callouts=[note=1, tip=2] warnings=0");
    }
}
