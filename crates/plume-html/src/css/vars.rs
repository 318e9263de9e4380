//! CSS custom property resolution.
//!
//! Constrained platforms drop `var()` entirely, so every reference is replaced
//! with a literal before output. The table starts from built-in defaults and is
//! overridden by `:root` declarations found in the document's `<style>` blocks.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::declarations::Declarations;
use super::matching_close;
use super::sheet::{Item, parse_items, write_items};
use super::split_top_level;
use crate::error::CssError;
use crate::tree::escape;

/// Nesting depth at which a chain of references resolves to empty.
pub const MAX_VAR_DEPTH: usize = 10;

static STYLE_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)(<style\b[^>]*>)(.*?)(</style\s*>)").unwrap());

static STYLE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\sstyle\s*=\s*)(?:"([^"]*)"|'([^']*)')"#).unwrap()
});

const DEFAULTS: &[(&str, &str)] = &[
    ("--primary-color", "#0F4C81"),
    ("--text-color", "#333333"),
    (
        "--font-family",
        r#"-apple-system, BlinkMacSystemFont, "Helvetica Neue", "PingFang SC", "Microsoft YaHei", sans-serif"#,
    ),
    ("--font-size", "16px"),
    ("--line-height", "1.75"),
    ("--code-background", "#f6f8fa"),
    ("--code-color", "#24292e"),
    ("--blockquote-background", "#f7f7f7"),
    ("--blockquote-border", "var(--primary-color)"),
    ("--table-border", "#dfe2e5"),
    ("--heading-color", "var(--primary-color)"),
    ("--link-color", "var(--primary-color)"),
    ("--muted-color", "#888888"),
];

/// Custom property table used by both resolution passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CssVariables {
    vars: BTreeMap<String, String>,
}

impl CssVariables {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in defaults, with `--primary-color` replaced when a theme colour
    /// is given.
    #[must_use]
    pub fn with_defaults(theme_color: Option<&str>) -> Self {
        let mut table = Self::new();
        for (name, value) in DEFAULTS {
            table.set(name, *value);
        }
        if let Some(color) = theme_color {
            table.set("--primary-color", color);
        }
        table
    }

    /// Define or replace a variable.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_owned(), value.into());
    }

    /// Raw (unresolved) value of a variable.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Fully resolved value of a variable, empty when unknown.
    #[must_use]
    pub fn literal(&self, name: &str) -> String {
        self.get(name)
            .and_then(|raw| self.resolve_value(raw).ok())
            .unwrap_or_default()
    }

    /// Iterate variables by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add every `:root` custom property declared in `css`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stylesheet has an unterminated block; the table
    /// is left unchanged in that case.
    pub fn collect_root(&mut self, css: &str) -> Result<(), CssError> {
        for item in parse_items(css)? {
            let Item::Rule { prelude, body } = item else {
                continue;
            };
            if !is_root_rule(&prelude) {
                continue;
            }
            for (prop, value) in Declarations::parse(&body).iter() {
                if prop.starts_with("--") {
                    self.set(prop, value);
                }
            }
        }
        Ok(())
    }

    /// Add the `:root` declarations of every `<style>` block in `html`.
    ///
    /// Later blocks win. A block that cannot be tokenized is skipped.
    pub fn collect_from_html(&mut self, html: &str) {
        for caps in STYLE_BLOCK.captures_iter(html) {
            if let Err(e) = self.collect_root(&caps[2]) {
                tracing::warn!(error = %e, "Skipping <style> block while collecting variables");
            }
        }
    }

    /// Replace every `var()` in a value.
    ///
    /// Unknown variables use the fallback, or resolve to empty without one.
    ///
    /// # Errors
    ///
    /// Returns an error for unbalanced parentheses or a `var()` whose first
    /// argument is not a custom property name.
    pub fn resolve_value(&self, value: &str) -> Result<String, CssError> {
        self.resolve_at(value, 0).map(|v| v.trim().to_owned())
    }

    fn resolve_at(&self, value: &str, depth: usize) -> Result<String, CssError> {
        let mut out = String::with_capacity(value.len());
        let mut rest = value;

        while let Some(start) = find_var(rest) {
            out.push_str(&rest[..start]);
            let open = start + 3;
            let close = matching_close(rest, open, '(', ')')
                .ok_or_else(|| CssError::UnbalancedParens(value.to_owned()))?;
            let args = &rest[open + 1..close];
            let parts = split_top_level(args, ',');
            let (name, fallback) = if parts.len() > 1 {
                (parts[0].trim(), Some(args[parts[0].len() + 1..].trim()))
            } else {
                (args.trim(), None)
            };
            if !name.starts_with("--") {
                return Err(CssError::InvalidVar(args.to_owned()));
            }

            if depth >= MAX_VAR_DEPTH {
                tracing::warn!(variable = name, "Variable nesting too deep, resolving to empty");
            } else if let Some(raw) = self.vars.get(name) {
                out.push_str(&self.resolve_at(raw, depth + 1)?);
            } else if let Some(fallback) = fallback {
                out.push_str(&self.resolve_at(fallback, depth + 1)?);
            }
            rest = &rest[close + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Resolve a declaration list.
    ///
    /// Custom property declarations are removed, declarations that resolve to
    /// empty are dropped, and a malformed declaration is kept as written.
    #[must_use]
    pub fn resolve_declarations(&self, decls: &Declarations) -> Declarations {
        let mut out = Declarations::new();
        for (prop, value) in decls.iter() {
            if prop.starts_with("--") {
                continue;
            }
            match self.resolve_value(value) {
                Ok(resolved) if resolved.is_empty() => {
                    tracing::debug!(property = prop, "Dropping declaration with empty value");
                }
                Ok(resolved) => out.set(prop, resolved),
                Err(e) => {
                    tracing::warn!(property = prop, error = %e, "Leaving declaration unresolved");
                    out.set(prop, value);
                }
            }
        }
        out
    }

    /// Resolve a whole stylesheet.
    ///
    /// `:root` rules left empty are removed; `@`-rule blocks that contain rules
    /// are resolved recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if the stylesheet has an unterminated block.
    pub fn resolve_stylesheet(&self, css: &str) -> Result<String, CssError> {
        let mut items = Vec::new();
        for item in parse_items(css)? {
            match item {
                Item::Rule { prelude, body } => {
                    let decls = self.resolve_declarations(&Declarations::parse(&body));
                    if decls.is_empty() && is_root_rule(&prelude) {
                        continue;
                    }
                    items.push(Item::Rule {
                        prelude,
                        body: decls.to_string(),
                    });
                }
                Item::AtRule {
                    prelude,
                    body: Some(body),
                } => {
                    let body = if body.contains('{') {
                        self.resolve_stylesheet(&body)?
                    } else {
                        self.resolve_declarations(&Declarations::parse(&body))
                            .to_string()
                    };
                    items.push(Item::AtRule {
                        prelude,
                        body: Some(body),
                    });
                }
                other @ Item::AtRule { body: None, .. } => items.push(other),
            }
        }
        Ok(write_items(&items))
    }

    /// A `:root { ... }` block declaring every variable, for output that keeps
    /// `var()` references.
    #[must_use]
    pub fn root_block(&self) -> String {
        let decls: Declarations = self.iter().collect();
        format!(":root {{ {decls} }}")
    }
}

fn is_root_rule(prelude: &str) -> bool {
    split_top_level(prelude, ',')
        .iter()
        .any(|s| s.trim() == ":root")
}

/// Byte offset of the next `var(` that is not part of a longer identifier.
fn find_var(s: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(pos) = s[from..].find("var(") {
        let at = from + pos;
        let preceded_by_ident = s[..at]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_');
        if !preceded_by_ident {
            return Some(at);
        }
        from = at + 4;
    }
    None
}

/// Resolve `var()` inside every `<style>` block and strip custom property
/// declarations. A block that fails is left as it was.
#[must_use]
pub fn resolve_style_blocks(html: &str, vars: &CssVariables) -> String {
    STYLE_BLOCK
        .replace_all(html, |caps: &Captures| {
            match vars.resolve_stylesheet(&caps[2]) {
                Ok(css) => format!("{}{}{}", &caps[1], css, &caps[3]),
                Err(e) => {
                    tracing::warn!(error = %e, "Leaving <style> block unresolved");
                    caps[0].to_owned()
                }
            }
        })
        .into_owned()
}

/// Resolve `var()` inside every `style` attribute that still contains one.
#[must_use]
pub fn resolve_inline_styles(html: &str, vars: &CssVariables) -> String {
    if !html.contains("var(") {
        return html.to_owned();
    }
    STYLE_ATTR
        .replace_all(html, |caps: &Captures| {
            let raw = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
            if !raw.contains("var(") {
                return caps[0].to_owned();
            }
            let decls = vars.resolve_declarations(&Declarations::parse(&unescape_attr(raw)));
            format!(r#"{}"{}""#, &caps[1], escape(&decls.to_string()))
        })
        .into_owned()
}

fn unescape_attr(value: &str) -> String {
    value
        .replace("&quot;", "\"")
        .replace("&#x27;", "'")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
