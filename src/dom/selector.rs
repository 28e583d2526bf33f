// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! CSS selector parsing and matching
//!
//! Supports selector lists of compound selectors (no combinators):
//! `form.bookmarks_form`, `#id`, `[name=key]`, `:input`, `:not(...)`.

use crate::error::{Error, Result};

use super::node::Node;

/// A parsed selector list (`a, b, c`); matches if any member matches
#[derive(Debug, Clone)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

/// One compound selector: every part must match
#[derive(Debug, Clone)]
struct Compound {
    parts: Vec<SelectorPart>,
}

#[derive(Debug, Clone)]
enum SelectorPart {
    Universal,
    Tag(String),
    Id(String),
    Class(String),
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
}

#[derive(Debug, Clone)]
struct AttributeSelector {
    name: String,
    operator: Option<AttributeOperator>,
    value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeOperator {
    Equals,
    Includes,
    Prefix,
    Suffix,
    Substring,
}

#[derive(Debug, Clone)]
enum PseudoClass {
    /// Form controls: input, textarea, select, button
    Input,
    Checked,
    Disabled,
    Enabled,
    Not(Box<Selector>),
}

/// Tags matched by `:input`
pub const INPUT_TAGS: [&str; 4] = ["input", "textarea", "select", "button"];

impl Selector {
    /// Parse a selector list
    pub fn parse(selector: &str) -> Result<Self> {
        let trimmed = selector.trim();
        if trimmed.is_empty() {
            return Err(Error::selector(selector, "empty selector"));
        }

        let alternatives = split_top_level(trimmed)
            .into_iter()
            .map(|part| SelectorParser::new(part, selector).parse())
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { alternatives })
    }

    /// Check if a node matches this selector
    pub fn matches(&self, node: &Node) -> bool {
        if !node.is_element() {
            return false;
        }
        self.alternatives.iter().any(|c| c.matches(node))
    }
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        self.parts.iter().all(|part| part_matches(part, node))
    }
}

fn part_matches(part: &SelectorPart, node: &Node) -> bool {
    match part {
        SelectorPart::Universal => true,
        SelectorPart::Tag(tag) => node
            .local_name()
            .map(|n| n.eq_ignore_ascii_case(tag))
            .unwrap_or(false),
        SelectorPart::Id(id) => node.get_attribute("id").as_deref() == Some(id.as_str()),
        SelectorPart::Class(class) => node
            .get_attribute("class")
            .map(|c| c.split_whitespace().any(|c| c == class))
            .unwrap_or(false),
        SelectorPart::Attribute(attr) => attribute_matches(attr, node),
        SelectorPart::Pseudo(pseudo) => pseudo_matches(pseudo, node),
    }
}

fn attribute_matches(attr: &AttributeSelector, node: &Node) -> bool {
    let Some(value) = node.get_attribute(&attr.name) else {
        return false;
    };
    let target = attr.value.as_str();

    match attr.operator {
        None => true,
        Some(AttributeOperator::Equals) => value == target,
        Some(AttributeOperator::Includes) => value.split_whitespace().any(|w| w == target),
        Some(AttributeOperator::Prefix) => !target.is_empty() && value.starts_with(target),
        Some(AttributeOperator::Suffix) => !target.is_empty() && value.ends_with(target),
        Some(AttributeOperator::Substring) => !target.is_empty() && value.contains(target),
    }
}

fn pseudo_matches(pseudo: &PseudoClass, node: &Node) -> bool {
    match pseudo {
        PseudoClass::Input => node
            .local_name()
            .map(|n| INPUT_TAGS.contains(&n.as_str()))
            .unwrap_or(false),
        PseudoClass::Checked => node.has_attribute("checked") || node.has_attribute("selected"),
        PseudoClass::Disabled => node.has_attribute("disabled"),
        PseudoClass::Enabled => !node.has_attribute("disabled"),
        PseudoClass::Not(inner) => !inner.matches(node),
    }
}

/// Split on commas that are not nested in parentheses or brackets
fn split_top_level(input: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

struct SelectorParser<'a> {
    input: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl<'a> SelectorParser<'a> {
    fn new(input: &str, source: &'a str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
            source,
        }
    }

    fn error(&self, reason: impl Into<String>) -> Error {
        Error::selector(self.source, reason)
    }

    fn parse(mut self) -> Result<Compound> {
        let mut parts = Vec::new();

        while let Some(c) = self.peek() {
            match c {
                '#' => {
                    self.advance();
                    parts.push(SelectorPart::Id(self.read_identifier()?));
                }
                '.' => {
                    self.advance();
                    parts.push(SelectorPart::Class(self.read_identifier()?));
                }
                '[' => parts.push(SelectorPart::Attribute(self.parse_attribute()?)),
                ':' => parts.push(SelectorPart::Pseudo(self.parse_pseudo()?)),
                '*' => {
                    self.advance();
                    parts.push(SelectorPart::Universal);
                }
                c if c.is_alphabetic() || c == '_' || c == '-' => {
                    let tag = self.read_identifier()?;
                    parts.push(SelectorPart::Tag(tag.to_lowercase()));
                }
                c if c.is_whitespace() || matches!(c, '>' | '+' | '~') => {
                    return Err(self.error("combinators are not supported"));
                }
                c => return Err(self.error(format!("unexpected character '{}'", c))),
            }
        }

        if parts.is_empty() {
            return Err(self.error("empty compound selector"));
        }

        Ok(Compound { parts })
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn read_identifier(&mut self) -> Result<String> {
        let mut result = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                result.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if result.is_empty() {
            return Err(self.error("expected identifier"));
        }
        Ok(result)
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector> {
        self.advance();
        self.skip_whitespace();
        let name = self.read_identifier()?.to_lowercase();
        self.skip_whitespace();

        let operator = match self.peek() {
            Some(']') => None,
            Some('=') => Some(AttributeOperator::Equals),
            Some(c @ ('~' | '^' | '$' | '*')) => {
                self.advance();
                Some(match c {
                    '~' => AttributeOperator::Includes,
                    '^' => AttributeOperator::Prefix,
                    '$' => AttributeOperator::Suffix,
                    _ => AttributeOperator::Substring,
                })
            }
            Some(c) => return Err(self.error(format!("unknown attribute operator '{}'", c))),
            None => return Err(self.error("unterminated attribute selector")),
        };

        let mut value = String::new();
        if operator.is_some() {
            self.expect('=')?;
            self.skip_whitespace();
            value = self.read_string_or_ident()?;
            self.skip_whitespace();
        }

        self.expect(']')?;
        Ok(AttributeSelector {
            name,
            operator,
            value,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass> {
        self.advance();
        let name = self.read_identifier()?.to_lowercase();

        match name.as_str() {
            "input" => Ok(PseudoClass::Input),
            "checked" | "selected" => Ok(PseudoClass::Checked),
            "disabled" => Ok(PseudoClass::Disabled),
            "enabled" => Ok(PseudoClass::Enabled),
            "not" => {
                let inner = self.parse_function_arg()?;
                Ok(PseudoClass::Not(Box::new(Selector::parse(&inner)?)))
            }
            other => Err(self.error(format!("unsupported pseudo-class ':{}'", other))),
        }
    }

    fn parse_function_arg(&mut self) -> Result<String> {
        self.expect('(')?;
        let mut depth = 1;
        let mut result = String::new();

        while let Some(c) = self.advance() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(result.trim().to_string());
                    }
                }
                _ => {}
            }
            result.push(c);
        }

        Err(self.error("unterminated argument"))
    }

    fn read_string_or_ident(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.advance();
                let mut result = String::new();
                while let Some(c) = self.advance() {
                    if c == quote {
                        return Ok(result);
                    }
                    if c == '\\' {
                        if let Some(escaped) = self.advance() {
                            result.push(escaped);
                        }
                    } else {
                        result.push(c);
                    }
                }
                Err(self.error("unterminated string"))
            }
            _ => self.read_identifier(),
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        match self.advance() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{}', got '{}'", expected, c))),
            None => Err(self.error(format!("expected '{}', got end of input", expected))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_selector_parsing() {
        assert!(Selector::parse("div").is_ok());
        assert!(Selector::parse(".bookmarks_form").is_ok());
        assert!(Selector::parse("#id").is_ok());
        assert!(Selector::parse("[name]").is_ok());
        assert!(Selector::parse("[name='key']").is_ok());
        assert!(Selector::parse("form.bookmarks_form#b1").is_ok());
        assert!(Selector::parse("input, textarea , select").is_ok());
        assert!(Selector::parse(":input:not([type=hidden])").is_ok());
    }

    #[test]
    fn test_selector_errors() {
        assert!(matches!(Selector::parse(""), Err(Error::Selector { .. })));
        assert!(Selector::parse("form input").is_err());
        assert!(Selector::parse("[name").is_err());
        assert!(Selector::parse(":hover").is_err());
        assert!(Selector::parse("a,").is_err());
    }

    #[test]
    fn test_selector_list_and_input_pseudo() {
        let doc = parse_html(
            r#"<form>
                <input name="a"><textarea name="b"></textarea>
                <select name="c"></select><button name="d">go</button>
                <span class="bookmarks_toggle">x</span>
            </form>"#,
        )
        .unwrap();

        assert_eq!(doc.query_selector_all(":input").len(), 4);
        assert_eq!(doc.query_selector_all("input, textarea").len(), 2);
        assert_eq!(doc.query_selector_all(":input:not(button)").len(), 3);
        assert_eq!(doc.query_selector_all("[name^=a]").len(), 1);
        assert_eq!(doc.query_selector_all("span.bookmarks_toggle").len(), 1);
    }
}
