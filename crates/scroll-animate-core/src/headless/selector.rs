//! Minimal CSS selector matching for the headless document
//!
//! Supports type (`div`, `*`), id (`#hero`), class (`.reveal`) and attribute
//! (`[data-animate]`, `[data-kind=card]`, `[data-kind="card"]`) selectors,
//! compounds of those, and comma-separated lists. Combinators are rejected.

use crate::dom::Element;
use crate::error::{Error, Result};

use super::HeadlessElement;

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<(String, Option<String>)>,
}

impl Compound {
    fn matches(&self, el: &HeadlessElement) -> bool {
        if let Some(ref tag) = self.tag {
            if tag != "*" && !tag.eq_ignore_ascii_case(el.tag()) {
                return false;
            }
        }
        if let Some(ref id) = self.id {
            if el.id().as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| el.has_class(class)) {
            return false;
        }
        self.attributes.iter().all(|(name, expected)| match expected {
            Some(value) => el.attribute(name).as_deref() == Some(value.as_str()),
            None => el.has_attribute(name),
        })
    }
}

/// Parsed selector list
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self> {
        let alternatives = input
            .split(',')
            .map(|part| parse_compound(part.trim(), input))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { alternatives })
    }

    pub fn matches(&self, el: &HeadlessElement) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(part: &str, full: &str) -> Result<Compound> {
    let err = |reason: &str| Error::Selector(format!("{} in '{}'", reason, full));

    if part.is_empty() {
        return Err(err("empty selector"));
    }
    if part.chars().any(|c| c.is_whitespace() || c == '>' || c == '+' || c == '~') {
        return Err(err("combinators are not supported"));
    }

    let mut compound = Compound::default();
    let mut rest = part;

    let tag_len = rest
        .find(|c: char| !(is_ident_char(c) || c == '*'))
        .unwrap_or(rest.len());
    if tag_len > 0 {
        compound.tag = Some(rest[..tag_len].to_ascii_lowercase());
        rest = &rest[tag_len..];
    }

    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let body = &rest[1..];
                let len = body.find(|c: char| !is_ident_char(c)).unwrap_or(body.len());
                if len == 0 {
                    return Err(err("missing name after '#' or '.'"));
                }
                let name = body[..len].to_string();
                if first == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
                rest = &body[len..];
            }
            '[' => {
                let close = rest.find(']').ok_or_else(|| err("unterminated '['"))?;
                let inner = &rest[1..close];
                let attribute = match inner.split_once('=') {
                    Some((name, value)) => {
                        let value = value.trim_matches(|c| c == '"' || c == '\'');
                        (name.to_string(), Some(value.to_string()))
                    }
                    None => (inner.to_string(), None),
                };
                if attribute.0.is_empty() || !attribute.0.chars().all(is_ident_char) {
                    return Err(err("invalid attribute name"));
                }
                compound.attributes.push(attribute);
                rest = &rest[close + 1..];
            }
            other => return Err(err(&format!("unexpected character '{}'", other))),
        }
    }

    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> HeadlessElement {
        HeadlessElement::new("div")
            .with_id("first")
            .with_class("card")
            .with_class("reveal")
            .with_attribute("data-animate", "")
            .with_attribute("data-kind", "hero")
    }

    #[test]
    fn test_attribute_presence() {
        assert!(Selector::parse("[data-animate]").unwrap().matches(&card()));
        assert!(!Selector::parse("[data-missing]").unwrap().matches(&card()));
    }

    #[test]
    fn test_attribute_value() {
        assert!(Selector::parse("[data-kind=hero]").unwrap().matches(&card()));
        assert!(Selector::parse("[data-kind=\"hero\"]").unwrap().matches(&card()));
        assert!(!Selector::parse("[data-kind='card']").unwrap().matches(&card()));
    }

    #[test]
    fn test_compound_and_list() {
        assert!(Selector::parse("div.card.reveal#first").unwrap().matches(&card()));
        assert!(!Selector::parse("section.card").unwrap().matches(&card()));
        assert!(Selector::parse("section, .reveal").unwrap().matches(&card()));
        assert!(Selector::parse("*[data-animate]").unwrap().matches(&card()));
    }

    #[test]
    fn test_rejects_unsupported() {
        assert!(Selector::parse("div .card").is_err());
        assert!(Selector::parse("div > p").is_err());
        assert!(Selector::parse("").is_err());
        assert!(Selector::parse("[data-animate").is_err());
        assert!(Selector::parse(".").is_err());
    }
}
