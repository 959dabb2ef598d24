//! Atoms and literals.
//!
//! Atoms are opaque integer identities handed out by the engine; callers
//! keep their own maps from domain objects to atoms. A literal is an atom
//! with a polarity.

use std::fmt;

/// An opaque boolean variable owned by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(u32);

impl Atom {
    pub(crate) fn new(index: u32) -> Self {
        Atom(index)
    }

    /// The atom's dense index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// An atom with a polarity.
///
/// # Example
///
/// ```
/// use gradus_engine::Engine;
///
/// let mut engine = Engine::new();
/// let atom = engine.new_atom();
/// let lit = gradus_engine::Lit::positive(atom);
/// assert_eq!(lit.negated().atom(), atom);
/// assert!(!lit.negated().is_positive());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit {
    atom: Atom,
    positive: bool,
}

impl Lit {
    /// The literal asserting `atom`.
    pub fn positive(atom: Atom) -> Self {
        Lit {
            atom,
            positive: true,
        }
    }

    /// The literal denying `atom`.
    pub fn negative(atom: Atom) -> Self {
        Lit {
            atom,
            positive: false,
        }
    }

    /// The underlying atom.
    pub fn atom(self) -> Atom {
        self.atom
    }

    /// Whether this literal asserts its atom.
    pub fn is_positive(self) -> bool {
        self.positive
    }

    /// The complementary literal.
    pub fn negated(self) -> Lit {
        Lit {
            atom: self.atom,
            positive: !self.positive,
        }
    }

    /// Dense index over both polarities, used for watch lists.
    pub(crate) fn watch_index(self) -> usize {
        self.atom.index() * 2 + usize::from(self.positive)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.positive {
            write!(f, "x{}", self.atom.0)
        } else {
            write!(f, "~x{}", self.atom.0)
        }
    }
}
