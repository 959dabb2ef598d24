//! Concept expressions under Gödel fuzzy semantics.
//!
//! Queries speak about nested concepts built from node names with
//! `and`, `or`, `neg` and `impl`. Expressions are immutable trees with
//! `Rc`-shared subterms; the parser interns syntactically equal subterms so
//! that evaluation can memoize by structural identity.
//!
//! With maximal degree `N`, the Gödel connectives are
//! `and = min`, `or = max`, `neg v = N − v`, and
//! `impl v w = N if v ≤ w else w`.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::breakpoints::Level;
use crate::error::{CoreError, Result};

/// A concept expression.
#[derive(Debug, PartialEq, Eq)]
pub enum Concept {
    /// A graph node, by name.
    Named(String),
    /// The concept every individual belongs to (degree `N`).
    Top,
    /// The empty concept (degree 0).
    Bot,
    /// Gödel conjunction.
    And(Rc<Concept>, Rc<Concept>),
    /// Gödel disjunction.
    Or(Rc<Concept>, Rc<Concept>),
    /// Involutive negation.
    Neg(Rc<Concept>),
    /// Gödel implication.
    Impl(Rc<Concept>, Rc<Concept>),
}

impl Concept {
    /// Parses the concrete syntax
    /// `and(x,y) | or(x,y) | neg(x) | impl(x,y) | top | bot | name`.
    pub fn parse(text: &str) -> Result<Rc<Concept>> {
        let mut parser = Parser {
            source: text,
            bytes: text.as_bytes(),
            position: 0,
            interned: HashMap::new(),
        };
        let concept = parser.term()?;
        parser.skip_spaces();
        if parser.position != parser.bytes.len() {
            return Err(parser.error("trailing input"));
        }
        Ok(concept)
    }

    /// Evaluates under Gödel semantics, memoized by shared subterm.
    ///
    /// `lookup` resolves a named concept to its degree in the current
    /// solution; an unresolved name is an error. Memoization is keyed by
    /// the subterm's address, so interned shared subtrees evaluate once.
    pub fn evaluate<F>(&self, max: Level, lookup: &F) -> Result<Level>
    where
        F: Fn(&str) -> Option<Level>,
    {
        let mut memo = HashMap::new();
        self.evaluate_memo(max, lookup, &mut memo)
    }

    fn evaluate_memo<F>(
        &self,
        max: Level,
        lookup: &F,
        memo: &mut HashMap<usize, Level>,
    ) -> Result<Level>
    where
        F: Fn(&str) -> Option<Level>,
    {
        let key = self as *const Concept as usize;
        if let Some(value) = memo.get(&key) {
            return Ok(*value);
        }
        let value = match self {
            Concept::Named(name) => lookup(name).ok_or_else(|| CoreError::UnknownNode {
                name: name.clone(),
            })?,
            Concept::Top => max,
            Concept::Bot => 0,
            Concept::And(a, b) => a
                .evaluate_memo(max, lookup, memo)?
                .min(b.evaluate_memo(max, lookup, memo)?),
            Concept::Or(a, b) => a
                .evaluate_memo(max, lookup, memo)?
                .max(b.evaluate_memo(max, lookup, memo)?),
            Concept::Neg(a) => max - a.evaluate_memo(max, lookup, memo)?,
            Concept::Impl(a, b) => {
                let premise = a.evaluate_memo(max, lookup, memo)?;
                let conclusion = b.evaluate_memo(max, lookup, memo)?;
                if premise <= conclusion {
                    max
                } else {
                    conclusion
                }
            }
        };
        memo.insert(key, value);
        Ok(value)
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concept::Named(name) => write!(f, "{name}"),
            Concept::Top => write!(f, "top"),
            Concept::Bot => write!(f, "bot"),
            Concept::And(a, b) => write!(f, "and({a},{b})"),
            Concept::Or(a, b) => write!(f, "or({a},{b})"),
            Concept::Neg(a) => write!(f, "neg({a})"),
            Concept::Impl(a, b) => write!(f, "impl({a},{b})"),
        }
    }
}

struct Parser<'a> {
    source: &'a str,
    bytes: &'a [u8],
    position: usize,
    interned: HashMap<String, Rc<Concept>>,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> CoreError {
        CoreError::InvalidConcept {
            text: self.source.to_string(),
            reason: format!("{reason} at offset {}", self.position),
        }
    }

    fn skip_spaces(&mut self) {
        while self.position < self.bytes.len() && self.bytes[self.position].is_ascii_whitespace() {
            self.position += 1;
        }
    }

    fn expect(&mut self, byte: u8) -> Result<()> {
        self.skip_spaces();
        if self.bytes.get(self.position) == Some(&byte) {
            self.position += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected `{}`", byte as char)))
        }
    }

    fn identifier(&mut self) -> Result<&'a str> {
        self.skip_spaces();
        let start = self.position;
        while self
            .bytes
            .get(self.position)
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_')
        {
            self.position += 1;
        }
        if self.position == start {
            return Err(self.error("expected an identifier"));
        }
        Ok(&self.source[start..self.position])
    }

    fn intern(&mut self, concept: Concept) -> Rc<Concept> {
        let key = concept.to_string();
        if let Some(shared) = self.interned.get(&key) {
            return Rc::clone(shared);
        }
        let shared = Rc::new(concept);
        self.interned.insert(key, Rc::clone(&shared));
        shared
    }

    fn term(&mut self) -> Result<Rc<Concept>> {
        let name = self.identifier()?;
        self.skip_spaces();
        let concept = match (name, self.bytes.get(self.position)) {
            ("and", Some(&b'(')) => {
                let (a, b) = self.pair()?;
                Concept::And(a, b)
            }
            ("or", Some(&b'(')) => {
                let (a, b) = self.pair()?;
                Concept::Or(a, b)
            }
            ("impl", Some(&b'(')) => {
                let (a, b) = self.pair()?;
                Concept::Impl(a, b)
            }
            ("neg", Some(&b'(')) => {
                self.expect(b'(')?;
                let a = self.term()?;
                self.expect(b')')?;
                Concept::Neg(a)
            }
            (_, Some(&b'(')) => return Err(self.error("unknown connective")),
            ("top", _) => Concept::Top,
            ("bot", _) => Concept::Bot,
            (_, _) => Concept::Named(name.to_string()),
        };
        Ok(self.intern(concept))
    }

    fn pair(&mut self) -> Result<(Rc<Concept>, Rc<Concept>)> {
        self.expect(b'(')?;
        let a = self.term()?;
        self.expect(b',')?;
        let b = self.term()?;
        self.expect(b')')?;
        Ok((a, b))
    }
}
