//! Built-in callout types.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Visual variant of a callout: accent colours and icon.
#[derive(Debug, PartialEq, Eq)]
pub struct CalloutStyle {
    /// Variant name shared by all its aliases.
    pub variant: &'static str,
    /// Accent colour for the border, icon and title.
    pub color: &'static str,
    /// Container background.
    pub background: &'static str,
    /// Inline SVG icon.
    pub icon: &'static str,
}

const fn style(
    variant: &'static str,
    color: &'static str,
    background: &'static str,
    icon: &'static str,
) -> CalloutStyle {
    CalloutStyle {
        variant,
        color,
        background,
        icon,
    }
}

macro_rules! svg {
    ($body:literal) => {
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round">"#,
            $body,
            "</svg>"
        )
    };
}

static NOTE: CalloutStyle = style(
    "note",
    "#086DDD",
    "rgba(8, 109, 221, 0.1)",
    svg!(r#"<path d="M12 20h9"/><path d="M16.5 3.5a2.12 2.12 0 0 1 3 3L7 19l-4 1 1-4Z"/>"#),
);
static ABSTRACT: CalloutStyle = style(
    "abstract",
    "#00BFBC",
    "rgba(0, 191, 188, 0.1)",
    svg!(
        r#"<rect x="8" y="2" width="8" height="4" rx="1" ry="1"/><path d="M16 4h2a2 2 0 0 1 2 2v14a2 2 0 0 1-2 2H6a2 2 0 0 1-2-2V6a2 2 0 0 1 2-2h2"/><path d="M12 11h4"/><path d="M12 16h4"/><path d="M8 11h.01"/><path d="M8 16h.01"/>"#
    ),
);
static INFO: CalloutStyle = style(
    "info",
    "#086DDD",
    "rgba(8, 109, 221, 0.1)",
    svg!(r#"<circle cx="12" cy="12" r="10"/><path d="M12 16v-4"/><path d="M12 8h.01"/>"#),
);
static TODO: CalloutStyle = style(
    "todo",
    "#086DDD",
    "rgba(8, 109, 221, 0.1)",
    svg!(r#"<circle cx="12" cy="12" r="10"/><path d="m9 12 2 2 4-4"/>"#),
);
static TIP: CalloutStyle = style(
    "tip",
    "#00BFBC",
    "rgba(0, 191, 188, 0.1)",
    svg!(
        r#"<path d="M8.5 14.5A2.5 2.5 0 0 0 11 12c0-1.38-.5-2-1-3-1.07-2.14-.22-4.05 2-6 .5 2.5 2 4.9 4 6.5 2 1.6 3 3.5 3 5.5a7 7 0 1 1-14 0c0-1.15.43-2.29 1-3a2.5 2.5 0 0 0 2.5 2.5z"/>"#
    ),
);
static SUCCESS: CalloutStyle = style(
    "success",
    "#08B94E",
    "rgba(8, 185, 78, 0.1)",
    svg!(r#"<path d="M20 6 9 17l-5-5"/>"#),
);
static QUESTION: CalloutStyle = style(
    "question",
    "#EC7500",
    "rgba(236, 117, 0, 0.1)",
    svg!(
        r#"<circle cx="12" cy="12" r="10"/><path d="M9.09 9a3 3 0 0 1 5.83 1c0 2-3 3-3 3"/><path d="M12 17h.01"/>"#
    ),
);
static WARNING: CalloutStyle = style(
    "warning",
    "#EC7500",
    "rgba(236, 117, 0, 0.1)",
    svg!(
        r#"<path d="m21.73 18-8-14a2 2 0 0 0-3.48 0l-8 14A2 2 0 0 0 4 21h16a2 2 0 0 0 1.73-3Z"/><path d="M12 9v4"/><path d="M12 17h.01"/>"#
    ),
);
static FAILURE: CalloutStyle = style(
    "failure",
    "#E93147",
    "rgba(233, 49, 71, 0.1)",
    svg!(r#"<path d="M18 6 6 18"/><path d="m6 6 12 12"/>"#),
);
static DANGER: CalloutStyle = style(
    "danger",
    "#E93147",
    "rgba(233, 49, 71, 0.1)",
    svg!(r#"<path d="M13 2 3 14h9l-1 8 10-12h-9l1-8z"/>"#),
);
static BUG: CalloutStyle = style(
    "bug",
    "#E93147",
    "rgba(233, 49, 71, 0.1)",
    svg!(
        r#"<rect x="8" y="6" width="8" height="14" rx="4"/><path d="m19 7-3 2"/><path d="m5 7 3 2"/><path d="m19 19-3-2"/><path d="m5 19 3-2"/><path d="M20 13h-4"/><path d="M4 13h4"/><path d="m10 4 1 2"/><path d="m14 4-1 2"/>"#
    ),
);
static EXAMPLE: CalloutStyle = style(
    "example",
    "#7852EE",
    "rgba(120, 82, 238, 0.1)",
    svg!(
        r#"<line x1="8" y1="6" x2="21" y2="6"/><line x1="8" y1="12" x2="21" y2="12"/><line x1="8" y1="18" x2="21" y2="18"/><line x1="3" y1="6" x2="3.01" y2="6"/><line x1="3" y1="12" x2="3.01" y2="12"/><line x1="3" y1="18" x2="3.01" y2="18"/>"#
    ),
);
static QUOTE: CalloutStyle = style(
    "quote",
    "#9E9E9E",
    "rgba(158, 158, 158, 0.1)",
    svg!(
        r#"<path d="M3 21c3 0 7-1 7-8V5c0-1.25-.76-2.02-2-2H4c-1.25 0-2 .75-2 1.97V11c0 1.25.75 2 2 2 1 0 1 0 1 1v1c0 1-1 2-2 2s-1 .01-1 1.03V20c0 1 0 1 1 1z"/><path d="M15 21c3 0 7-1 7-8V5c0-1.25-.76-2.02-2-2h-4c-1.25 0-2 .75-2 1.97V11c0 1.25.75 2 2 2h.75c0 2.25.25 4-2.75 4v3c0 1 0 1 1 1z"/>"#
    ),
);

/// Alias to style table.
static TYPES: LazyLock<HashMap<&'static str, &'static CalloutStyle>> = LazyLock::new(|| {
    HashMap::from([
        ("note", &NOTE),
        ("abstract", &ABSTRACT),
        ("summary", &ABSTRACT),
        ("tldr", &ABSTRACT),
        ("info", &INFO),
        ("todo", &TODO),
        ("tip", &TIP),
        ("hint", &TIP),
        ("important", &TIP),
        ("success", &SUCCESS),
        ("check", &SUCCESS),
        ("done", &SUCCESS),
        ("question", &QUESTION),
        ("help", &QUESTION),
        ("faq", &QUESTION),
        ("warning", &WARNING),
        ("caution", &WARNING),
        ("attention", &WARNING),
        ("failure", &FAILURE),
        ("fail", &FAILURE),
        ("missing", &FAILURE),
        ("danger", &DANGER),
        ("error", &DANGER),
        ("bug", &BUG),
        ("example", &EXAMPLE),
        ("quote", &QUOTE),
        ("cite", &QUOTE),
    ])
});

/// Look up a callout type (case-insensitive).
#[must_use]
pub fn lookup(kind: &str) -> Option<&'static CalloutStyle> {
    TYPES.get(kind.to_lowercase().as_str()).copied()
}

/// Style used for unknown types.
#[must_use]
pub fn fallback() -> &'static CalloutStyle {
    &NOTE
}

/// Every known alias, sorted.
#[must_use]
pub fn aliases() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = TYPES.keys().copied().collect();
    names.sort_unstable();
    names
}
