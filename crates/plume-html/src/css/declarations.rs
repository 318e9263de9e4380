//! Inline declaration lists (`color: red; margin: 0;`).

use std::fmt;

use super::split_top_level;

/// Ordered list of `property: value` pairs.
///
/// Setting a property that already exists replaces its value in place, so
/// the written order stays stable across passes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations(Vec<(String, String)>);

impl Declarations {
    /// Empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a `style` attribute or rule body. Malformed entries are skipped.
    #[must_use]
    pub fn parse(style: &str) -> Self {
        let mut decls = Self::new();
        for part in split_top_level(style, ';') {
            let Some((prop, value)) = part.split_once(':') else {
                continue;
            };
            let prop = prop.trim();
            let value = value.trim();
            if prop.is_empty() || value.is_empty() {
                continue;
            }
            decls.set(prop, value);
        }
        decls
    }

    /// Value of a property.
    #[must_use]
    pub fn get(&self, prop: &str) -> Option<&str> {
        let prop = normalize(prop);
        self.0.iter().find(|(p, _)| *p == prop).map(|(_, v)| v.as_str())
    }

    /// Set a property, replacing an existing value in place.
    pub fn set(&mut self, prop: &str, value: impl Into<String>) {
        let prop = normalize(prop);
        let value = value.into();
        match self.0.iter_mut().find(|(p, _)| *p == prop) {
            Some((_, v)) => *v = value,
            None => self.0.push((prop, value)),
        }
    }

    /// Remove a property.
    pub fn remove(&mut self, prop: &str) -> Option<String> {
        let prop = normalize(prop);
        let pos = self.0.iter().position(|(p, _)| *p == prop)?;
        Some(self.0.remove(pos).1)
    }

    /// Apply every declaration of `other` on top of this list.
    pub fn merge(&mut self, other: &Self) {
        for (prop, value) in &other.0 {
            self.set(prop, value.clone());
        }
    }

    /// Keep only declarations for which `f` returns true.
    pub fn retain(&mut self, mut f: impl FnMut(&str, &str) -> bool) {
        self.0.retain(|(p, v)| f(p, v));
    }

    /// Iterate in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(p, v)| (p.as_str(), v.as_str()))
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Custom properties are case-sensitive, everything else is not.
fn normalize(prop: &str) -> String {
    let prop = prop.trim();
    if prop.starts_with("--") {
        prop.to_owned()
    } else {
        prop.to_ascii_lowercase()
    }
}

impl fmt::Display for Declarations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (prop, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{prop}: {value};")?;
        }
        Ok(())
    }
}

impl<'a> FromIterator<(&'a str, &'a str)> for Declarations {
    fn from_iter<I: IntoIterator<Item = (&'a str, &'a str)>>(iter: I) -> Self {
        let mut decls = Self::new();
        for (prop, value) in iter {
            decls.set(prop, value);
        }
        decls
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_and_format() {
        let decls = Declarations::parse("Color: red;margin:0 ; ; bogus; font-family: \"A; B\", serif");
        assert_eq!(decls.len(), 3);
        assert_eq!(decls.get("color"), Some("red"));
        assert_eq!(
            decls.to_string(),
            r#"color: red; margin: 0; font-family: "A; B", serif;"#
        );
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut decls = Declarations::parse("a: 1; b: 2");
        decls.set("A", "3");
        assert_eq!(decls.to_string(), "a: 3; b: 2;");
    }

    #[test]
    fn test_merge_other_wins() {
        let mut base = Declarations::parse("color: red; margin: 0");
        base.merge(&Declarations::parse("color: blue; padding: 1px"));
        assert_eq!(base.to_string(), "color: blue; margin: 0; padding: 1px;");
    }

    #[test]
    fn test_custom_property_case_kept() {
        let decls = Declarations::parse("--Main: red");
        assert_eq!(decls.get("--Main"), Some("red"));
        assert_eq!(decls.get("--main"), None);
    }
}
