//! Scripted driving of a single propagator.
//!
//! `TestBed` replays the engine's callback protocol - init, watched
//! notifications in assignment order, LIFO undo - against one propagator
//! under manual control. Tests use it to pin down protocol properties
//! (reversibility, exact undo) that are hard to observe through full
//! enumeration.

use smallvec::SmallVec;

use crate::atom::{Atom, Lit};
use crate::engine::EngineCore;
use crate::propagator::{Conflict, InitContext, PropagateContext, Propagator};

/// A miniature engine around exactly one propagator.
pub struct TestBed {
    core: EngineCore,
    watches: Vec<SmallVec<[u32; 4]>>,
    notified: Vec<(Lit, usize)>,
    marks: Vec<usize>,
}

impl Default for TestBed {
    fn default() -> Self {
        Self::new()
    }
}

impl TestBed {
    /// Creates an empty bed.
    pub fn new() -> Self {
        TestBed {
            core: EngineCore::new(),
            watches: Vec::new(),
            notified: Vec::new(),
            marks: Vec::new(),
        }
    }

    /// Creates a fresh atom.
    pub fn new_atom(&mut self) -> Atom {
        let atom = self.core.push_atom();
        self.watches.push(SmallVec::new());
        self.watches.push(SmallVec::new());
        atom
    }

    /// Runs `init` and asserts any root facts, notifying as the engine
    /// would. Returns the literals fixed at the root.
    pub fn init(&mut self, propagator: &mut dyn Propagator) -> Result<Vec<Lit>, Conflict> {
        let mut facts = Vec::new();
        let mut ctx = InitContext {
            propagator: 0,
            watches: &mut self.watches,
            facts: &mut facts,
        };
        propagator.init(&mut ctx);
        let mark = self.core.trail_len();
        for fact in facts {
            match self.core.value(fact) {
                Some(true) => {}
                Some(false) => {
                    return Err(Conflict::new(vec![fact.negated()]));
                }
                None => self.core.assign(fact),
            }
        }
        self.drain_queue(propagator)?;
        Ok(self.trail_since(mark))
    }

    /// Assumes `lit` as a decision and propagates to fixpoint.
    ///
    /// Returns every literal fixed by the assumption (itself included).
    /// On conflict the assumption stays on the trail; retract it.
    pub fn assume(&mut self, propagator: &mut dyn Propagator, lit: Lit) -> Result<Vec<Lit>, Conflict> {
        let mark = self.core.trail_len();
        self.marks.push(mark);
        self.core.assign(lit);
        self.drain_queue(propagator)?;
        Ok(self.trail_since(mark))
    }

    /// Retracts the most recent assumption and its consequences,
    /// delivering `undo` notifications in reverse order.
    pub fn retract(&mut self, propagator: &mut dyn Propagator) {
        let Some(mark) = self.marks.pop() else {
            return;
        };
        while self.notified.last().is_some_and(|(_, pos)| *pos >= mark) {
            if let Some((lit, _)) = self.notified.pop() {
                propagator.undo(lit);
            }
        }
        self.core.undo_to(mark);
    }

    /// The literal's current truth value, if fixed.
    pub fn value(&self, lit: Lit) -> Option<bool> {
        self.core.value(lit)
    }

    fn drain_queue(&mut self, propagator: &mut dyn Propagator) -> Result<(), Conflict> {
        while let Some((lit, position)) = self.core.next_queued() {
            if self.watches[lit.watch_index()].contains(&0) {
                self.notified.push((lit, position));
                let mut ctx = PropagateContext {
                    core: &mut self.core,
                };
                propagator.propagate(&mut ctx, lit)?;
            }
        }
        Ok(())
    }

    fn trail_since(&self, mark: usize) -> Vec<Lit> {
        self.core.trail()[mark..].to_vec()
    }
}
