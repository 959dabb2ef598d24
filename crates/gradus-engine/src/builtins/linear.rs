//! Linear-sum constraints.
//!
//! A constraint ties a head literal to a comparison over a weighted sum
//! of indicator literals:
//!
//! `head  ⟺  lower < Σ coeff_i · [lit_i]  ≤ upper`
//!
//! with `None` standing for an open end. The propagator maintains exact
//! `[lo, hi]` bounds over the sum (fixed indicators contribute their
//! coefficient or nothing; open indicators contribute their sign-extreme)
//! and forces the head as soon as the bound interval is entirely inside
//! or entirely outside the comparison range. Undo restores the previous
//! bounds verbatim from a saved-value stack, so repeated
//! propagate/undo cycles cannot drift.

use gradus_core::Real;
use smallvec::SmallVec;

use crate::atom::Lit;
use crate::propagator::{Conflict, InitContext, ModelView, PropagateContext, Propagator};

/// A declarative linear comparison constraint.
#[derive(Debug, Clone)]
pub struct LinearConstraint {
    /// Literal equivalent to the comparison holding.
    pub head: Lit,
    /// Weighted indicator literals.
    pub terms: Vec<(Real, Lit)>,
    /// Exclusive lower bound; `None` is an open end.
    pub lower: Option<Real>,
    /// Inclusive upper bound; `None` is an open end.
    pub upper: Option<Real>,
}

struct LinearState {
    constraint: LinearConstraint,
    lo: Real,
    hi: Real,
    head_value: Option<bool>,
}

impl LinearState {
    fn inside(&self) -> bool {
        self.constraint.lower.map_or(true, |l| self.lo > l)
            && self.constraint.upper.map_or(true, |u| self.hi <= u)
    }

    fn outside(&self) -> bool {
        self.constraint.lower.is_some_and(|l| self.hi <= l)
            || self.constraint.upper.is_some_and(|u| self.lo > u)
    }
}

enum Saved {
    Bounds {
        lit: Lit,
        constraint: u32,
        lo: Real,
        hi: Real,
    },
    Head {
        lit: Lit,
        constraint: u32,
        value: Option<bool>,
    },
}

impl Saved {
    fn lit(&self) -> Lit {
        match self {
            Saved::Bounds { lit, .. } | Saved::Head { lit, .. } => *lit,
        }
    }
}

/// All linear constraints of a program, as one propagator.
#[derive(Default)]
pub(crate) struct LinearSet {
    states: Vec<LinearState>,
    /// `(constraint, term)` pairs listening on an indicator fixing true,
    /// keyed by watch index of the notification literal.
    term_set: Vec<Vec<(u32, u32)>>,
    /// Same, for an indicator fixing false.
    term_unset: Vec<Vec<(u32, u32)>>,
    /// Constraints whose head literal is the notification literal
    /// (positive entry) or its negation (negative entry).
    head_set: Vec<Vec<u32>>,
    head_unset: Vec<Vec<u32>>,
    saved: SmallVec<[Saved; 16]>,
}

impl LinearSet {
    pub(crate) fn add(&mut self, constraint: LinearConstraint) {
        let mut lo = Real::ZERO;
        let mut hi = Real::ZERO;
        for (coeff, _) in &constraint.terms {
            if coeff.is_negative() {
                lo += *coeff;
            } else {
                hi += *coeff;
            }
        }
        self.states.push(LinearState {
            constraint,
            lo,
            hi,
            head_value: None,
        });
    }

    fn grow_tables(&mut self) {
        let mut max_index = 0;
        for state in &self.states {
            max_index = max_index.max(state.constraint.head.watch_index());
            max_index = max_index.max(state.constraint.head.negated().watch_index());
            for (_, lit) in &state.constraint.terms {
                max_index = max_index.max(lit.watch_index());
                max_index = max_index.max(lit.negated().watch_index());
            }
        }
        self.term_set = vec![Vec::new(); max_index + 1];
        self.term_unset = vec![Vec::new(); max_index + 1];
        self.head_set = vec![Vec::new(); max_index + 1];
        self.head_unset = vec![Vec::new(); max_index + 1];
    }

    fn explanation(&self, ctx: &PropagateContext<'_>, index: u32) -> Vec<Lit> {
        let state = &self.states[index as usize];
        let mut explanation: Vec<Lit> = Vec::new();
        for (_, lit) in &state.constraint.terms {
            match ctx.value(*lit) {
                Some(true) => explanation.push(*lit),
                Some(false) => explanation.push(lit.negated()),
                None => {}
            }
        }
        explanation
    }

    /// Re-judges one constraint after a bounds or head update.
    fn evaluate(&self, ctx: &mut PropagateContext<'_>, index: u32) -> Result<(), Conflict> {
        let state = &self.states[index as usize];
        let inside = state.inside();
        let outside = state.outside();
        match state.head_value {
            Some(true) if outside => {
                let mut explanation = self.explanation(ctx, index);
                explanation.push(state.constraint.head);
                Err(Conflict::new(explanation))
            }
            Some(false) if inside => {
                let mut explanation = self.explanation(ctx, index);
                explanation.push(state.constraint.head.negated());
                Err(Conflict::new(explanation))
            }
            None if inside => {
                let explanation = self.explanation(ctx, index);
                ctx.force(state.constraint.head, &explanation)
            }
            None if outside => {
                let explanation = self.explanation(ctx, index);
                ctx.force(state.constraint.head.negated(), &explanation)
            }
            _ => Ok(()),
        }
    }
}

impl Propagator for LinearSet {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        self.grow_tables();
        for (index, state) in self.states.iter().enumerate() {
            let head = state.constraint.head;
            ctx.watch(head);
            ctx.watch(head.negated());
            self.head_set[head.watch_index()].push(index as u32);
            self.head_unset[head.negated().watch_index()].push(index as u32);
            for (term, (_, lit)) in state.constraint.terms.iter().enumerate() {
                ctx.watch(*lit);
                ctx.watch(lit.negated());
                self.term_set[lit.watch_index()].push((index as u32, term as u32));
                self.term_unset[lit.negated().watch_index()].push((index as u32, term as u32));
            }
            // A constraint decided by its initial bounds becomes a fact.
            if state.inside() {
                ctx.assert_fact(head);
            } else if state.outside() {
                ctx.assert_fact(head.negated());
            }
        }
    }

    fn propagate(&mut self, ctx: &mut PropagateContext<'_>, changed: Lit) -> Result<(), Conflict> {
        let mut touched: SmallVec<[u32; 8]> = SmallVec::new();

        let sets = self
            .term_set
            .get(changed.watch_index())
            .cloned()
            .unwrap_or_default();
        for (index, term) in sets {
            let state = &mut self.states[index as usize];
            let (coeff, _) = state.constraint.terms[term as usize];
            self.saved.push(Saved::Bounds {
                lit: changed,
                constraint: index,
                lo: state.lo,
                hi: state.hi,
            });
            // The indicator's contribution collapses from its sign-extreme
            // range to exactly `coeff`.
            if coeff.is_negative() {
                state.hi += coeff;
            } else {
                state.lo += coeff;
            }
            touched.push(index);
        }

        let unsets = self
            .term_unset
            .get(changed.watch_index())
            .cloned()
            .unwrap_or_default();
        for (index, term) in unsets {
            let state = &mut self.states[index as usize];
            let (coeff, _) = state.constraint.terms[term as usize];
            self.saved.push(Saved::Bounds {
                lit: changed,
                constraint: index,
                lo: state.lo,
                hi: state.hi,
            });
            // The indicator's contribution collapses to zero.
            if coeff.is_negative() {
                state.lo = state.lo - coeff;
            } else {
                state.hi = state.hi - coeff;
            }
            touched.push(index);
        }

        for &index in self
            .head_set
            .get(changed.watch_index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            let state = &mut self.states[index as usize];
            self.saved.push(Saved::Head {
                lit: changed,
                constraint: index,
                value: state.head_value,
            });
            state.head_value = Some(true);
            touched.push(index);
        }
        for &index in self
            .head_unset
            .get(changed.watch_index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
        {
            let state = &mut self.states[index as usize];
            self.saved.push(Saved::Head {
                lit: changed,
                constraint: index,
                value: state.head_value,
            });
            state.head_value = Some(false);
            touched.push(index);
        }

        for index in touched {
            self.evaluate(ctx, index)?;
        }
        Ok(())
    }

    fn undo(&mut self, changed: Lit) {
        while self.saved.last().is_some_and(|s| s.lit() == changed) {
            match self.saved.pop() {
                Some(Saved::Bounds {
                    constraint, lo, hi, ..
                }) => {
                    let state = &mut self.states[constraint as usize];
                    state.lo = lo;
                    state.hi = hi;
                }
                Some(Saved::Head {
                    constraint, value, ..
                }) => {
                    self.states[constraint as usize].head_value = value;
                }
                None => {}
            }
        }
    }

    fn check(&self, model: &ModelView<'_>) -> Result<(), Conflict> {
        for state in &self.states {
            let sum: Real = state
                .constraint
                .terms
                .iter()
                .filter(|(_, lit)| model.is_true(*lit))
                .map(|(coeff, _)| *coeff)
                .sum();
            let holds = state.constraint.lower.map_or(true, |l| sum > l)
                && state.constraint.upper.map_or(true, |u| sum <= u);
            if holds != model.is_true(state.constraint.head) {
                let mut explanation: Vec<Lit> = state
                    .constraint
                    .terms
                    .iter()
                    .map(|(_, lit)| if model.is_true(*lit) { *lit } else { lit.negated() })
                    .collect();
                explanation.push(if model.is_true(state.constraint.head) {
                    state.constraint.head
                } else {
                    state.constraint.head.negated()
                });
                return Err(Conflict::new(explanation));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use gradus_core::Real;

    use crate::atom::Lit;
    use crate::engine::Engine;

    use super::LinearConstraint;

    #[test]
    fn head_follows_the_sum() {
        // head <=> 0 < a + b (unit coefficients).
        let mut engine = Engine::new();
        let a = engine.new_atom();
        let b = engine.new_atom();
        let head = engine.new_atom();
        engine.add_linear(LinearConstraint {
            head: Lit::positive(head),
            terms: vec![
                (Real::from_int(1), Lit::positive(a)),
                (Real::from_int(1), Lit::positive(b)),
            ],
            lower: Some(Real::ZERO),
            upper: None,
        });
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 4);
        for model in &models {
            let expected = model.atom_true(a) || model.atom_true(b);
            assert_eq!(model.atom_true(head), expected);
        }
    }

    #[test]
    fn fixed_head_constrains_the_indicators() {
        // head <=> a - b > 0, head forced true: only a=1, b=0 survives.
        let mut engine = Engine::new();
        let a = engine.new_atom();
        let b = engine.new_atom();
        let head = engine.new_atom();
        engine.add_linear(LinearConstraint {
            head: Lit::positive(head),
            terms: vec![
                (Real::from_int(1), Lit::positive(a)),
                (Real::from_int(-1), Lit::positive(b)),
            ],
            lower: Some(Real::ZERO),
            upper: None,
        });
        engine.add_clause(&[Lit::positive(head)]);
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 1);
        assert!(models[0].atom_true(a));
        assert!(!models[0].atom_true(b));
    }

    #[test]
    fn decided_constraint_becomes_a_fact() {
        // Empty sum: 0 <= 0 holds, head pinned true at the root.
        let mut engine = Engine::new();
        let head = engine.new_atom();
        engine.add_linear(LinearConstraint {
            head: Lit::positive(head),
            terms: vec![],
            lower: None,
            upper: Some(Real::ZERO),
        });
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 1);
        assert!(models[0].atom_true(head));
    }

    #[test]
    fn bounded_window_selects_exact_counts() {
        // head <=> 1 < a + b + c <= 2, i.e. exactly two of three.
        let mut engine = Engine::new();
        let atoms = [engine.new_atom(), engine.new_atom(), engine.new_atom()];
        let head = engine.new_atom();
        engine.add_linear(LinearConstraint {
            head: Lit::positive(head),
            terms: atoms
                .iter()
                .map(|a| (Real::from_int(1), Lit::positive(*a)))
                .collect(),
            lower: Some(Real::from_int(1)),
            upper: Some(Real::from_int(2)),
        });
        engine.add_clause(&[Lit::positive(head)]);
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 3);
        for model in &models {
            assert_eq!(atoms.iter().filter(|a| model.atom_true(**a)).count(), 2);
        }
    }
}
