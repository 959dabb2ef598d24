//! The incremental propagator protocol.
//!
//! A propagator is a stateful callback object enforcing one constraint
//! inside the engine's backtracking loop. The engine calls it
//! synchronously; callbacks must not block or perform I/O.
//!
//! Protocol guarantees:
//! - `init` runs once before search, with every atom already created;
//!   it registers watch literals and may assert root-level facts.
//! - `propagate` is called once for each newly-true watched literal, in
//!   assignment order.
//! - `undo` is called exactly once for every `propagate` notification
//!   whose literal is retracted, in reverse notification order (strict
//!   stack discipline). A propagator must therefore commit its state
//!   update *before* reporting a conflict, so the matching `undo` always
//!   has something exact to reverse.
//! - `check` receives total assignments as a redundant final validator.

use crate::atom::{Atom, Lit};
use crate::engine::EngineCore;
use smallvec::SmallVec;

/// A propagation failure: a minimal set of currently-fixed literals
/// sufficient to derive the contradiction.
#[derive(Debug, Clone)]
pub struct Conflict {
    /// The offending fixed literals.
    pub explanation: Vec<Lit>,
}

impl Conflict {
    /// Builds a conflict from its explanation.
    pub fn new(explanation: Vec<Lit>) -> Self {
        Conflict { explanation }
    }
}

/// A constraint enforced incrementally during search.
pub trait Propagator {
    /// Registers watches (and optionally root facts) before search.
    fn init(&mut self, ctx: &mut InitContext<'_>);

    /// Reacts to a newly-true watched literal.
    fn propagate(&mut self, ctx: &mut PropagateContext<'_>, changed: Lit) -> Result<(), Conflict>;

    /// Reverses the state update of the matching `propagate` call.
    fn undo(&mut self, changed: Lit) {
        let _ = changed;
    }

    /// Validates a total assignment from scratch.
    fn check(&self, model: &ModelView<'_>) -> Result<(), Conflict> {
        let _ = model;
        Ok(())
    }
}

/// Registration context passed to [`Propagator::init`].
pub struct InitContext<'a> {
    pub(crate) propagator: u32,
    pub(crate) watches: &'a mut Vec<SmallVec<[u32; 4]>>,
    pub(crate) facts: &'a mut Vec<Lit>,
}

impl InitContext<'_> {
    /// Asks to be notified whenever `lit` becomes true.
    pub fn watch(&mut self, lit: Lit) {
        let slot = &mut self.watches[lit.watch_index()];
        if !slot.contains(&self.propagator) {
            slot.push(self.propagator);
        }
    }

    /// Asserts a literal that holds unconditionally.
    pub fn assert_fact(&mut self, lit: Lit) {
        self.facts.push(lit);
    }
}

/// Assignment view and consequence sink passed to [`Propagator::propagate`].
pub struct PropagateContext<'a> {
    pub(crate) core: &'a mut EngineCore,
}

impl PropagateContext<'_> {
    /// The literal's current truth value, if fixed.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.core.value(lit)
    }

    /// Whether the literal is currently fixed true.
    pub fn is_true(&self, lit: Lit) -> bool {
        self.value(lit) == Some(true)
    }

    /// Forces `lit` as a consequence of `explanation`.
    ///
    /// A no-op if already true; a conflict if fixed false.
    pub fn force(&mut self, lit: Lit, explanation: &[Lit]) -> Result<(), Conflict> {
        match self.core.value(lit) {
            Some(true) => Ok(()),
            Some(false) => {
                let mut full = explanation.to_vec();
                full.push(lit.negated());
                Err(Conflict::new(full))
            }
            None => {
                tracing::trace!(%lit, "forced");
                self.core.assign(lit);
                Ok(())
            }
        }
    }
}

/// A total assignment, for final checking and model read-back.
pub struct ModelView<'a> {
    pub(crate) values: &'a [bool],
}

impl ModelView<'_> {
    /// Whether the atom is true.
    pub fn atom_true(&self, atom: Atom) -> bool {
        self.values[atom.index()]
    }

    /// Whether the literal is true.
    pub fn is_true(&self, lit: Lit) -> bool {
        self.values[lit.atom().index()] == lit.is_positive()
    }
}
