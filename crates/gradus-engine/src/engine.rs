//! The engine: assignment, trail, watches, and exhaustive enumeration.
//!
//! The search loop is a chronological depth-first traversal: decide the
//! next unassigned atom (positive branch first), propagate to fixpoint,
//! backtrack on conflict, and emit every total assignment that survives
//! propagation and the final `check` pass. Enumeration order is
//! deterministic, so read-back never depends on timing.
//!
//! Logging levels:
//! - **DEBUG**: solve entry/exit, model and conflict totals
//! - **TRACE**: individual decisions, forced literals, conflicts

use smallvec::SmallVec;

use crate::atom::{Atom, Lit};
use crate::builtins::clause::ClauseSet;
use crate::builtins::exactly_one::ExactlyOneSet;
use crate::builtins::linear::{LinearConstraint, LinearSet};
use crate::error::{EngineError, Result};
use crate::propagator::{Conflict, InitContext, ModelView, PropagateContext, Propagator};

/// Assignment state shared with propagation contexts.
pub(crate) struct EngineCore {
    values: Vec<Option<bool>>,
    trail: Vec<Lit>,
    queue_head: usize,
}

impl EngineCore {
    pub(crate) fn new() -> Self {
        EngineCore {
            values: Vec::new(),
            trail: Vec::new(),
            queue_head: 0,
        }
    }

    pub(crate) fn push_atom(&mut self) -> Atom {
        let atom = Atom::new(self.values.len() as u32);
        self.values.push(None);
        atom
    }

    pub(crate) fn value(&self, lit: Lit) -> Option<bool> {
        self.values[lit.atom().index()].map(|v| v == lit.is_positive())
    }

    pub(crate) fn assign(&mut self, lit: Lit) {
        debug_assert!(self.values[lit.atom().index()].is_none());
        self.values[lit.atom().index()] = Some(lit.is_positive());
        self.trail.push(lit);
    }

    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn trail(&self) -> &[Lit] {
        &self.trail
    }

    /// Pops the next unprocessed trail entry for propagation.
    pub(crate) fn next_queued(&mut self) -> Option<(Lit, usize)> {
        if self.queue_head < self.trail.len() {
            let position = self.queue_head;
            self.queue_head += 1;
            Some((self.trail[position], position))
        } else {
            None
        }
    }

    pub(crate) fn undo_to(&mut self, mark: usize) {
        for lit in self.trail.drain(mark..) {
            self.values[lit.atom().index()] = None;
        }
        self.queue_head = self.queue_head.min(mark);
    }
}

/// A total assignment reported by [`Engine::solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// Whether the atom is true in this model.
    pub fn atom_true(&self, atom: Atom) -> bool {
        self.values[atom.index()]
    }

    /// Whether the literal is true in this model.
    pub fn is_true(&self, lit: Lit) -> bool {
        self.values[lit.atom().index()] == lit.is_positive()
    }
}

struct Notification {
    propagator: u32,
    lit: Lit,
    trail_position: usize,
}

struct Decision {
    atom: Atom,
    flipped: bool,
    trail_mark: usize,
}

/// The search engine.
///
/// Constraints and propagators are registered up front; [`Engine::solve`]
/// consumes the engine, so propagator state is scoped to exactly one run
/// and reclaimed on return - an aborted enumeration (model limit) leaves
/// nothing behind.
///
/// # Example
///
/// ```
/// use gradus_engine::{Engine, Lit};
///
/// let mut engine = Engine::new();
/// let a = engine.new_atom();
/// let b = engine.new_atom();
/// engine.add_clause(&[Lit::positive(a), Lit::positive(b)]);
/// let models = engine.solve(None).unwrap();
/// assert_eq!(models.len(), 3);
/// ```
pub struct Engine {
    core: EngineCore,
    watches: Vec<SmallVec<[u32; 4]>>,
    propagators: Vec<Box<dyn Propagator>>,
    clauses: ClauseSet,
    groups: ExactlyOneSet,
    linears: LinearSet,
    unsat: bool,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Engine {
            core: EngineCore::new(),
            watches: Vec::new(),
            propagators: Vec::new(),
            clauses: ClauseSet::default(),
            groups: ExactlyOneSet::default(),
            linears: LinearSet::default(),
            unsat: false,
        }
    }

    /// Creates a fresh atom.
    pub fn new_atom(&mut self) -> Atom {
        let atom = Atom::new(self.core.values.len() as u32);
        self.core.values.push(None);
        self.watches.push(SmallVec::new());
        self.watches.push(SmallVec::new());
        atom
    }

    /// Number of atoms created so far.
    pub fn atom_count(&self) -> usize {
        self.core.values.len()
    }

    /// Adds a disjunction of literals; the empty clause makes the
    /// program unsatisfiable.
    pub fn add_clause(&mut self, lits: &[Lit]) {
        if lits.is_empty() {
            self.unsat = true;
        } else {
            self.clauses.add(lits);
        }
    }

    /// Adds an exactly-one group over `atoms`.
    pub fn add_exactly_one(&mut self, atoms: &[Atom]) {
        if atoms.is_empty() {
            self.unsat = true;
        } else {
            self.groups.add(atoms);
        }
    }

    /// Adds a linear-sum constraint.
    pub fn add_linear(&mut self, constraint: LinearConstraint) {
        self.linears.add(constraint);
    }

    /// Registers a user propagator.
    pub fn add_propagator(&mut self, propagator: Box<dyn Propagator>) {
        self.propagators.push(propagator);
    }

    /// Enumerates models, up to `limit` if given.
    ///
    /// Returns models in deterministic order. The only error is a
    /// propagator whose final `check` disagrees with its own incremental
    /// propagation.
    pub fn solve(mut self, limit: Option<usize>) -> Result<Vec<Model>> {
        let mut propagators = std::mem::take(&mut self.propagators);
        let mut builtins: Vec<Box<dyn Propagator>> = vec![
            Box::new(std::mem::take(&mut self.clauses)),
            Box::new(std::mem::take(&mut self.groups)),
            Box::new(std::mem::take(&mut self.linears)),
        ];
        let mut all: Vec<Box<dyn Propagator>> = Vec::new();
        all.append(&mut builtins);
        all.append(&mut propagators);

        let mut facts = Vec::new();
        for (index, propagator) in all.iter_mut().enumerate() {
            let mut ctx = InitContext {
                propagator: index as u32,
                watches: &mut self.watches,
                facts: &mut facts,
            };
            propagator.init(&mut ctx);
        }

        if self.unsat {
            tracing::debug!("trivially unsatisfiable program");
            return Ok(Vec::new());
        }
        for fact in facts {
            match self.core.value(fact) {
                Some(true) => {}
                Some(false) => {
                    tracing::debug!(%fact, "root facts are contradictory");
                    return Ok(Vec::new());
                }
                None => self.core.assign(fact),
            }
        }

        let mut search = Search {
            core: self.core,
            watches: self.watches,
            propagators: all,
            notifications: Vec::new(),
            decisions: Vec::new(),
        };
        search.run(limit)
    }
}

struct Search {
    core: EngineCore,
    watches: Vec<SmallVec<[u32; 4]>>,
    propagators: Vec<Box<dyn Propagator>>,
    notifications: Vec<Notification>,
    decisions: Vec<Decision>,
}

impl Search {
    fn run(&mut self, limit: Option<usize>) -> Result<Vec<Model>> {
        let mut models = Vec::new();
        let mut conflicts = 0_u64;
        loop {
            match self.propagate_fixpoint() {
                Err(conflict) => {
                    conflicts += 1;
                    tracing::trace!(explanation = ?conflict.explanation, "conflict");
                    if !self.backtrack() {
                        break;
                    }
                }
                Ok(()) => {
                    if let Some(atom) = self.next_unassigned() {
                        let trail_mark = self.core.trail_len();
                        tracing::trace!(atom = atom.index(), "decide");
                        self.core.assign(Lit::positive(atom));
                        self.decisions.push(Decision {
                            atom,
                            flipped: false,
                            trail_mark,
                        });
                    } else {
                        let model = self.extract_model();
                        self.final_check(&model)?;
                        models.push(model);
                        if limit.is_some_and(|l| models.len() >= l) {
                            break;
                        }
                        if !self.backtrack() {
                            break;
                        }
                    }
                }
            }
        }
        tracing::debug!(models = models.len(), conflicts, "enumeration finished");
        Ok(models)
    }

    fn propagate_fixpoint(&mut self) -> std::result::Result<(), Conflict> {
        while self.core.queue_head < self.core.trail_len() {
            let trail_position = self.core.queue_head;
            let lit = self.core.trail[trail_position];
            self.core.queue_head += 1;
            let watchers = self.watches[lit.watch_index()].clone();
            for propagator in watchers {
                self.notifications.push(Notification {
                    propagator,
                    lit,
                    trail_position,
                });
                let mut ctx = PropagateContext {
                    core: &mut self.core,
                };
                self.propagators[propagator as usize].propagate(&mut ctx, lit)?;
            }
        }
        Ok(())
    }

    /// Unwinds to the most recent decision with an untried branch.
    fn backtrack(&mut self) -> bool {
        while let Some(mut decision) = self.decisions.pop() {
            self.undo_to(decision.trail_mark);
            if !decision.flipped {
                decision.flipped = true;
                self.core.assign(Lit::negative(decision.atom));
                self.decisions.push(decision);
                return true;
            }
        }
        false
    }

    /// Retracts trail entries above `mark`, notifying propagators in
    /// reverse notification order before the assignment disappears.
    fn undo_to(&mut self, mark: usize) {
        while self
            .notifications
            .last()
            .is_some_and(|n| n.trail_position >= mark)
        {
            if let Some(notification) = self.notifications.pop() {
                self.propagators[notification.propagator as usize].undo(notification.lit);
            }
        }
        self.core.undo_to(mark);
    }

    fn next_unassigned(&self) -> Option<Atom> {
        self.core
            .values
            .iter()
            .position(Option::is_none)
            .map(|index| Atom::new(index as u32))
    }

    fn extract_model(&self) -> Model {
        Model {
            values: self
                .core
                .values
                .iter()
                .map(|value| *value == Some(true))
                .collect(),
        }
    }

    fn final_check(&self, model: &Model) -> Result<()> {
        let view = ModelView {
            values: &model.values,
        };
        for propagator in &self.propagators {
            if let Err(conflict) = propagator.check(&view) {
                return Err(EngineError::CheckRejected {
                    explanation: conflict.explanation,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_free_atoms() {
        let mut engine = Engine::new();
        engine.new_atom();
        engine.new_atom();
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 4);
    }

    #[test]
    fn respects_the_model_limit() {
        let mut engine = Engine::new();
        engine.new_atom();
        engine.new_atom();
        engine.new_atom();
        let models = engine.solve(Some(3)).unwrap();
        assert_eq!(models.len(), 3);
    }

    #[test]
    fn empty_clause_is_unsat() {
        let mut engine = Engine::new();
        engine.new_atom();
        engine.add_clause(&[]);
        assert!(engine.solve(None).unwrap().is_empty());
    }

    #[test]
    fn unit_clauses_pin_the_model() {
        let mut engine = Engine::new();
        let a = engine.new_atom();
        let b = engine.new_atom();
        engine.add_clause(&[Lit::positive(a)]);
        engine.add_clause(&[Lit::negative(b)]);
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 1);
        assert!(models[0].atom_true(a));
        assert!(!models[0].atom_true(b));
    }
}
