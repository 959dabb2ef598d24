//! Exactly-one groups.
//!
//! A group over atoms `{a_1 .. a_k}` admits exactly one true member.
//! Singleton groups degenerate to root facts.

use crate::atom::{Atom, Lit};
use crate::propagator::{Conflict, InitContext, ModelView, PropagateContext, Propagator};

struct Group {
    atoms: Vec<Atom>,
    num_true: u32,
    num_false: u32,
}

/// All exactly-one groups of a program, as one propagator.
#[derive(Default)]
pub(crate) struct ExactlyOneSet {
    groups: Vec<Group>,
    /// Group indices per notification literal, keyed by watch index.
    occurrences: Vec<Vec<u32>>,
}

impl ExactlyOneSet {
    pub(crate) fn add(&mut self, atoms: &[Atom]) {
        self.groups.push(Group {
            atoms: atoms.to_vec(),
            num_true: 0,
            num_false: 0,
        });
    }
}

impl Propagator for ExactlyOneSet {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        let mut max_index = 0;
        for group in &self.groups {
            for atom in &group.atoms {
                max_index = max_index.max(Lit::positive(*atom).watch_index() + 1);
            }
        }
        self.occurrences = vec![Vec::new(); max_index];
        for (index, group) in self.groups.iter().enumerate() {
            if let [single] = group.atoms[..] {
                ctx.assert_fact(Lit::positive(single));
                continue;
            }
            for atom in &group.atoms {
                ctx.watch(Lit::positive(*atom));
                ctx.watch(Lit::negative(*atom));
                self.occurrences[Lit::positive(*atom).watch_index()].push(index as u32);
                self.occurrences[Lit::negative(*atom).watch_index()].push(index as u32);
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
            let group = &mut self.groups[index as usize];
            if changed.is_positive() {
                group.num_true += 1;
            } else {
                group.num_false += 1;
            }
        }
        for &index in affected {
            let group = &self.groups[index as usize];
            let len = group.atoms.len() as u32;
            if changed.is_positive() {
                if group.num_true > 1 {
                    let both: Vec<Lit> = group
                        .atoms
                        .iter()
                        .filter(|a| ctx.is_true(Lit::positive(**a)))
                        .map(|a| Lit::positive(*a))
                        .collect();
                    return Err(Conflict::new(both));
                }
                for atom in &group.atoms {
                    if *atom != changed.atom() {
                        ctx.force(Lit::negative(*atom), &[changed])?;
                    }
                }
            } else {
                if group.num_false == len {
                    let all: Vec<Lit> = group.atoms.iter().map(|a| Lit::negative(*a)).collect();
                    return Err(Conflict::new(all));
                }
                if group.num_false == len - 1 && group.num_true == 0 {
                    if let Some(remaining) = group
                        .atoms
                        .iter()
                        .find(|a| ctx.value(Lit::positive(**a)) != Some(false))
                        .copied()
                    {
                        let reason: Vec<Lit> = group
                            .atoms
                            .iter()
                            .filter(|a| **a != remaining)
                            .map(|a| Lit::negative(*a))
                            .collect();
                        ctx.force(Lit::positive(remaining), &reason)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn undo(&mut self, changed: Lit) {
        if let Some(affected) = self.occurrences.get(changed.watch_index()) {
            for &index in affected {
                let group = &mut self.groups[index as usize];
                if changed.is_positive() {
                    group.num_true -= 1;
                } else {
                    group.num_false -= 1;
                }
            }
        }
    }

    fn check(&self, model: &ModelView<'_>) -> Result<(), Conflict> {
        for group in &self.groups {
            let true_members: Vec<Lit> = group
                .atoms
                .iter()
                .filter(|a| model.atom_true(**a))
                .map(|a| Lit::positive(*a))
                .collect();
            if true_members.len() != 1 {
                let explanation = if true_members.is_empty() {
                    group.atoms.iter().map(|a| Lit::negative(*a)).collect()
                } else {
                    true_members
                };
                return Err(Conflict::new(explanation));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::atom::Lit;
    use crate::engine::Engine;

    #[test]
    fn group_admits_one_model_per_member() {
        let mut engine = Engine::new();
        let atoms = [engine.new_atom(), engine.new_atom(), engine.new_atom()];
        engine.add_exactly_one(&atoms);
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 3);
        for model in &models {
            let true_count = atoms.iter().filter(|a| model.atom_true(**a)).count();
            assert_eq!(true_count, 1);
        }
    }

    #[test]
    fn singleton_group_pins_its_atom() {
        let mut engine = Engine::new();
        let a = engine.new_atom();
        let b = engine.new_atom();
        engine.add_exactly_one(&[a]);
        let models = engine.solve(None).unwrap();
        assert_eq!(models.len(), 2);
        assert!(models.iter().all(|m| m.atom_true(a)));
        assert!(models.iter().any(|m| m.atom_true(b)));
    }

    #[test]
    fn overlapping_groups_intersect() {
        let mut engine = Engine::new();
        let a = engine.new_atom();
        let b = engine.new_atom();
        let c = engine.new_atom();
        engine.add_exactly_one(&[a, b]);
        engine.add_exactly_one(&[b, c]);
        let models = engine.solve(None).unwrap();
        // Either b alone, or a and c together.
        assert_eq!(models.len(), 2);
    }
}
