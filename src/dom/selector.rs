//! CSS selector subset used by detection and enhancement passes.
//!
//! Supported:
//!
//! | Syntax                 | Example                       |
//! |------------------------|-------------------------------|
//! | type / universal       | `img`, `*`                    |
//! | class / id             | `.btn`, `#main`               |
//! | attribute presence     | `[required]`                  |
//! | attribute operators    | `=`, `*=`, `^=`, `$=`, `~=`   |
//! | negation               | `:not(.card)`                 |
//! | structural             | `:first-child`                |
//! | combinators            | descendant (` `), child (`>`) |
//! | lists                  | `header, .header`             |
//!
//! Anything else fails with [`SelectorError`]; the document query boundary
//! turns that into an empty result.

use thiserror::Error;

use super::{Document, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected `{found}` at offset {pos}")]
    Unexpected { pos: usize, found: char },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported selector feature `{0}`")]
    Unsupported(String),
}

// ============================================================================
// Types
// ============================================================================

/// A parsed comma-separated selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<Complex>);

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Compounds left to right.
    compounds: Vec<Compound>,
    /// `combinators[i]` joins `compounds[i]` and `compounds[i + 1]`.
    combinators: Vec<Combinator>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
    negations: Vec<Compound>,
    first_child: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    test: Option<(AttrOp, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
}

// ============================================================================
// Parsing
// ============================================================================

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(input);
        let mut list = Vec::new();

        loop {
            list.push(parser.complex()?);
            parser.skip_ws();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                }
                Some(c) => {
                    return Err(SelectorError::Unexpected {
                        pos: parser.pos,
                        found: c,
                    });
                }
            }
        }

        Ok(Self(list))
    }

    /// Test a single element against the list.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_element(node) && self.0.iter().any(|complex| complex.matches(doc, node))
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(found) => Err(SelectorError::Unexpected {
                pos: self.pos - 1,
                found,
            }),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn complex(&mut self) -> Result<Complex, SelectorError> {
        self.skip_ws();
        if self.peek().is_none() {
            return Err(SelectorError::Empty);
        }

        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    Combinator::Child
                }
                Some('+') | Some('~') => {
                    return Err(SelectorError::Unsupported("sibling combinator".into()));
                }
                Some(_) if had_ws => Combinator::Descendant,
                Some(found) => {
                    return Err(SelectorError::Unexpected {
                        pos: self.pos,
                        found,
                    });
                }
            };
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        Ok(Complex {
            compounds,
            combinators,
        })
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();
        let start = self.pos;

        match self.peek() {
            Some('*') => {
                self.bump();
            }
            Some(c) if is_ident_char(c) => compound.tag = Some(self.ident()?.to_ascii_lowercase()),
            _ => {}
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => {
                    self.bump();
                    self.pseudo(&mut compound)?;
                }
                _ => break,
            }
        }

        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected {
                    pos: self.pos,
                    found,
                }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(compound)
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if self.pos == start {
            return match self.peek() {
                Some(found) => Err(SelectorError::Unexpected {
                    pos: self.pos,
                    found,
                }),
                None => Err(SelectorError::UnexpectedEnd),
            };
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn attribute(&mut self) -> Result<AttrSelector, SelectorError> {
        self.skip_ws();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_ws();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttrSelector { name, test: None });
            }
            Some('=') => {
                self.bump();
                AttrOp::Equals
            }
            Some(c @ ('*' | '^' | '$' | '~')) => {
                self.bump();
                self.expect('=')?;
                match c {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    _ => AttrOp::Includes,
                }
            }
            Some('|') => return Err(SelectorError::Unsupported("|=".into())),
            Some(found) => {
                return Err(SelectorError::Unexpected {
                    pos: self.pos,
                    found,
                });
            }
            None => return Err(SelectorError::UnexpectedEnd),
        };

        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                self.expect(quote)?;
                value
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        self.expect(']')?;

        Ok(AttrSelector {
            name,
            test: Some((op, value)),
        })
    }

    fn pseudo(&mut self, compound: &mut Compound) -> Result<(), SelectorError> {
        let name = self.ident()?.to_ascii_lowercase();
        match name.as_str() {
            "first-child" => compound.first_child = true,
            "not" => {
                self.expect('(')?;
                self.skip_ws();
                let inner = self.compound()?;
                self.skip_ws();
                self.expect(')')?;
                compound.negations.push(inner);
            }
            other => return Err(SelectorError::Unsupported(format!(":{other}"))),
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

// ============================================================================
// Matching
// ============================================================================

impl Complex {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.match_at(doc, node, self.compounds.len() - 1)
    }

    fn match_at(&self, doc: &Document, node: NodeId, idx: usize) -> bool {
        if !self.compounds[idx].matches(doc, node) {
            return false;
        }
        if idx == 0 {
            return true;
        }

        match self.combinators[idx - 1] {
            Combinator::Child => doc
                .parent(node)
                .is_some_and(|parent| doc.is_element(parent) && self.match_at(doc, parent, idx - 1)),
            Combinator::Descendant => doc
                .ancestors(node)
                .filter(|&a| doc.is_element(a))
                .any(|a| self.match_at(doc, a, idx - 1)),
        }
    }
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(el) = doc.element(node) else {
            return false;
        };

        if let Some(tag) = &self.tag
            && el.tag() != tag
        {
            return false;
        }
        if !self.ids.iter().all(|id| el.attr("id") == Some(id.as_str())) {
            return false;
        }
        if !self.classes.iter().all(|class| el.has_class(class)) {
            return false;
        }
        if !self.attrs.iter().all(|attr| attr.matches(el.attr(&attr.name))) {
            return false;
        }
        if self.first_child
            && doc
                .parent(node)
                .and_then(|parent| doc.element_children(parent).next())
                != Some(node)
        {
            return false;
        }
        !self.negations.iter().any(|neg| neg.matches(doc, node))
    }
}

impl AttrSelector {
    fn matches(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        let Some((op, want)) = &self.test else {
            return true;
        };
        match op {
            AttrOp::Equals => value == want,
            // Empty operands never match for substring operators
            AttrOp::Contains => !want.is_empty() && value.contains(want.as_str()),
            AttrOp::Prefix => !want.is_empty() && value.starts_with(want.as_str()),
            AttrOp::Suffix => !want.is_empty() && value.ends_with(want.as_str()),
            AttrOp::Includes => value.split_whitespace().any(|token| token == want),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::parse(
            r##"<html><head></head><body>
                <section id="s"><div class="card big">a</div><div>b</div></section>
                <a href="#top">top</a>
                <a href="https://fonts.googleapis.com/css">f</a>
                <input type="text" required>
                <input type="checkbox">
            </body></html>"##,
        )
    }

    fn select(doc: &Document, sel: &str) -> Vec<NodeId> {
        let list = SelectorList::parse(sel).unwrap();
        doc.descendants(doc.root())
            .filter(|&n| list.matches(doc, n))
            .collect()
    }

    #[test]
    fn test_parse_rejects_unsupported_features() {
        assert!(matches!(
            SelectorList::parse("a:hover"),
            Err(SelectorError::Unsupported(_))
        ));
        assert!(matches!(
            SelectorList::parse("h1 + p"),
            Err(SelectorError::Unsupported(_))
        ));
        assert_eq!(SelectorList::parse("  "), Err(SelectorError::Empty));
        assert!(SelectorList::parse("uac-essential-styles").is_ok());
        assert!(SelectorList::parse("[unterminated").is_err());
    }

    #[test]
    fn test_attribute_operators() {
        let doc = doc();
        assert_eq!(select(&doc, r##"a[href^="#"]"##).len(), 1);
        assert_eq!(select(&doc, r#"a[href*="fonts.googleapis.com"]"#).len(), 1);
        assert_eq!(select(&doc, "[required]").len(), 1);
        assert_eq!(select(&doc, r#"[class~="big"]"#).len(), 1);
        assert_eq!(select(&doc, r#"[class*="card"]"#).len(), 1);
        assert_eq!(select(&doc, r#"[href$=".css"]"#).len(), 0);
    }

    #[test]
    fn test_negation_and_structure() {
        let doc = doc();
        let inputs = select(
            &doc,
            r#"input:not([type="checkbox"]):not([type="radio"])"#,
        );
        assert_eq!(inputs.len(), 1);
        assert_eq!(select(&doc, "section > div:first-child").len(), 1);
        assert_eq!(select(&doc, "body div").len(), 2);
        assert_eq!(select(&doc, "#s > .card, a").len(), 3);
    }
}
