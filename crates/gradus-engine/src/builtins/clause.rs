//! Clause propagation.
//!
//! Counter-based unit propagation: each clause tracks how many of its
//! literals are fixed false. At `len - 1` the remaining literal is
//! forced; at `len` the clause is conflicting. Counters are reversed
//! exactly on undo.

use crate::atom::Lit;
use crate::propagator::{Conflict, InitContext, ModelView, PropagateContext, Propagator};

struct Clause {
    lits: Vec<Lit>,
    num_false: u32,
}

/// All clauses of a program, as one propagator.
#[derive(Default)]
pub(crate) struct ClauseSet {
    clauses: Vec<Clause>,
    /// Clause indices listening on each falsifying literal, keyed by
    /// watch index of that literal.
    occurrences: Vec<Vec<u32>>,
}

impl ClauseSet {
    pub(crate) fn add(&mut self, lits: &[Lit]) {
        self.clauses.push(Clause {
            lits: lits.to_vec(),
            num_false: 0,
        });
    }

    fn explanation(&self, clause: &Clause) -> Vec<Lit> {
        clause.lits.iter().map(|l| l.negated()).collect()
    }
}

impl Propagator for ClauseSet {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        let mut max_index = 0;
        for clause in &self.clauses {
            for lit in &clause.lits {
                max_index = max_index.max(lit.negated().watch_index() + 1);
            }
        }
        self.occurrences = vec![Vec::new(); max_index];
        for (index, clause) in self.clauses.iter().enumerate() {
            if let [unit] = clause.lits[..] {
                ctx.assert_fact(unit);
                continue;
            }
            for lit in &clause.lits {
                // Notification when a clause literal becomes false.
                ctx.watch(lit.negated());
                self.occurrences[lit.negated().watch_index()].push(index as u32);
            }
        }
    }

    fn propagate(&mut self, ctx: &mut PropagateContext<'_>, changed: Lit) -> Result<(), Conflict> {
        let affected = self
            .occurrences
            .get(changed.watch_index())
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        for &index in affected {
            let clause = &mut self.clauses[index as usize];
            clause.num_false += 1;
        }
        for &index in affected {
            let clause = &self.clauses[index as usize];
            let len = clause.lits.len() as u32;
            if clause.num_false == len {
                return Err(Conflict::new(self.explanation(clause)));
            }
            if clause.num_false == len - 1 {
                if let Some(remaining) = clause
                    .lits
                    .iter()
                    .find(|l| ctx.value(**l) != Some(false))
                    .copied()
                {
                    let reason: Vec<Lit> = clause
                        .lits
                        .iter()
                        .filter(|l| **l != remaining)
                        .map(|l| l.negated())
                        .collect();
                    ctx.force(remaining, &reason)?;
                }
            }
        }
        Ok(())
    }

    fn undo(&mut self, changed: Lit) {
        if let Some(affected) = self.occurrences.get(changed.watch_index()) {
            for &index in affected {
                self.clauses[index as usize].num_false -= 1;
            }
        }
    }

    fn check(&self, model: &ModelView<'_>) -> Result<(), Conflict> {
        for clause in &self.clauses {
            if !clause.lits.iter().any(|l| model.is_true(*l)) {
                return Err(Conflict::new(self.explanation(clause)));
            }
        }
        Ok(())
    }
}
