//! Named HTML entities.
//!
//! The tokenizer only knows the five XML entities, so named HTML entities are
//! replaced by their characters before parsing. Unknown names are left alone.

use std::sync::LazyLock;

use regex::Regex;

static NAMED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&([a-zA-Z][a-zA-Z0-9]*);").expect("invalid entity regex"));

/// Replace named HTML entities (`&nbsp;`, `&hellip;`, ...) with characters.
///
/// `&amp;`, `&lt;`, `&gt;`, `&quot;` and `&apos;` are kept for the tokenizer.
pub fn convert_named_entities(html: &str) -> String {
    if !html.contains('&') {
        return html.to_owned();
    }
    NAMED_ENTITY
        .replace_all(html, |caps: &regex::Captures| {
            named_entity(&caps[1]).map_or_else(|| caps[0].to_owned(), str::to_owned)
        })
        .into_owned()
}

/// Decode the body of an entity reference (`amp`, `#160`, `#xA0`).
///
/// Anything unrecognized comes back as the literal `&name;`.
pub(crate) fn decode_reference(name: &str) -> String {
    let decoded = match name {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "apos" => Some('\''),
        "quot" => Some('"'),
        s if s.starts_with("#x") || s.starts_with("#X") => {
            u32::from_str_radix(&s[2..], 16).ok().and_then(char::from_u32)
        }
        s if s.starts_with('#') => s[1..].parse::<u32>().ok().and_then(char::from_u32),
        _ => None,
    };
    decoded.map_or_else(
        || named_entity(name).map_or_else(|| format!("&{name};"), str::to_owned),
        |c| c.to_string(),
    )
}

fn named_entity(name: &str) -> Option<&'static str> {
    Some(match name {
        "nbsp" => "\u{00a0}",
        "ensp" => "\u{2002}",
        "emsp" => "\u{2003}",
        "thinsp" => "\u{2009}",
        "zwj" => "\u{200d}",
        "zwnj" => "\u{200c}",
        "mdash" => "\u{2014}",
        "ndash" => "\u{2013}",
        "ldquo" => "\u{201c}",
        "rdquo" => "\u{201d}",
        "lsquo" => "\u{2018}",
        "rsquo" => "\u{2019}",
        "laquo" => "\u{00ab}",
        "raquo" => "\u{00bb}",
        "bull" => "\u{2022}",
        "middot" => "\u{00b7}",
        "hellip" => "\u{2026}",

        "rarr" => "\u{2192}",
        "larr" => "\u{2190}",
        "harr" => "\u{2194}",
        "uarr" => "\u{2191}",
        "darr" => "\u{2193}",
        "crarr" => "\u{21b5}",

        "le" => "\u{2264}",
        "ge" => "\u{2265}",
        "ne" => "\u{2260}",
        "plusmn" => "\u{00b1}",
        "times" => "\u{00d7}",
        "divide" => "\u{00f7}",
        "minus" => "\u{2212}",
        "infin" => "\u{221e}",
        "deg" => "\u{00b0}",
        "micro" => "\u{00b5}",

        "copy" => "\u{00a9}",
        "reg" => "\u{00ae}",
        "trade" => "\u{2122}",
        "para" => "\u{00b6}",
        "sect" => "\u{00a7}",
        "dagger" => "\u{2020}",
        "Dagger" => "\u{2021}",

        "euro" => "\u{20ac}",
        "pound" => "\u{00a3}",
        "yen" => "\u{00a5}",
        "cent" => "\u{00a2}",

        "frac14" => "\u{00bc}",
        "frac12" => "\u{00bd}",
        "frac34" => "\u{00be}",
        "sup1" => "\u{00b9}",
        "sup2" => "\u{00b2}",
        "sup3" => "\u{00b3}",

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_entities_replaced() {
        assert_eq!(
            convert_named_entities("a&nbsp;b&mdash;c&hellip;"),
            "a\u{00a0}b\u{2014}c\u{2026}"
        );
    }

    #[test]
    fn test_xml_entities_kept() {
        assert_eq!(convert_named_entities("&amp;&lt;&gt;&quot;"), "&amp;&lt;&gt;&quot;");
    }

    #[test]
    fn test_unknown_entity_kept() {
        assert_eq!(convert_named_entities("&bogus;"), "&bogus;");
    }

    #[test]
    fn test_decode_reference() {
        assert_eq!(decode_reference("amp"), "&");
        assert_eq!(decode_reference("#91"), "[");
        assert_eq!(decode_reference("#x2014"), "\u{2014}");
        assert_eq!(decode_reference("nbsp"), "\u{00a0}");
        assert_eq!(decode_reference("bogus"), "&bogus;");
        assert_eq!(decode_reference("#xZZ"), "&#xZZ;");
    }
}
