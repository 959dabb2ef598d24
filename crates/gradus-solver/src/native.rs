//! The native incremental staircase propagator.
//!
//! One instance owns the quantization constraint of one target node. It
//! tracks running `[lo, hi]` bounds over the target's weighted input sum:
//! fixed sources contribute their exact weighted degree, open sources
//! their sign-extreme swing. Under the ordered encoding every at-least
//! indicator tightens the bounds on its own, well before the source's
//! final degree is known.
//!
//! As soon as both bounds quantize to the same degree the target is
//! forced; a target degree committed by the engine outside the achievable
//! degree window is a conflict, explained by the fixed literals that
//! produced the window. Undo restores the previous bounds verbatim from a
//! saved-value stack, so propagate/undo cycles cannot drift.

use std::collections::HashMap;
use std::sync::Arc;

use gradus_core::{BreakpointTable, DependencyGraph, Level, NodeId, Real};
use gradus_engine::{
    Atom, Conflict, InitContext, Lit, ModelView, PropagateContext, Propagator,
};
use smallvec::SmallVec;

use crate::config::Encoding;
use crate::layout::AtomLayout;

struct SourceState {
    weight: Real,
    fixed: Option<Level>,
    val_atoms: Vec<Atom>,
    ge_atoms: Vec<Atom>,
}

#[derive(Clone, Copy)]
enum Tag {
    /// A source's degree literal became true (plain encoding).
    SourceLevel { source: usize, level: Level },
    /// A source's at-least indicator was decided (ordered encoding).
    Indicator { source: usize },
    /// The target's own degree literal became true.
    TargetLevel { level: Level },
}

enum Saved {
    Bounds {
        lit: Lit,
        lo: Real,
        hi: Real,
        source: usize,
        fixed: Option<Level>,
    },
    Commit {
        lit: Lit,
        previous: Option<Level>,
    },
}

impl Saved {
    fn lit(&self) -> Lit {
        match self {
            Saved::Bounds { lit, .. } | Saved::Commit { lit, .. } => *lit,
        }
    }
}

/// Incremental quantization constraint for one target node.
pub struct StaircasePropagator {
    table: Arc<BreakpointTable>,
    encoding: Encoding,
    target: NodeId,
    target_val: Vec<Atom>,
    sources: Vec<SourceState>,
    lo: Real,
    hi: Real,
    committed: Option<Level>,
    saved: SmallVec<[Saved; 8]>,
    tags: HashMap<Lit, Tag>,
}

impl StaircasePropagator {
    /// Builds the propagator for `target` against an existing atom layout.
    ///
    /// Parallel edges from the same source are merged by summing their
    /// weights.
    pub fn new(
        graph: &DependencyGraph,
        table: Arc<BreakpointTable>,
        layout: &AtomLayout,
        target: NodeId,
    ) -> Self {
        let encoding = if layout.has_ordered() {
            Encoding::Ordered
        } else {
            Encoding::Plain
        };
        let max = table.max_level();

        let mut merged: Vec<(NodeId, Real)> = Vec::new();
        for edge in graph.incoming(target) {
            if let Some(entry) = merged.iter_mut().find(|(s, _)| *s == edge.source) {
                entry.1 += edge.weight;
            } else {
                merged.push((edge.source, edge.weight));
            }
        }

        let mut tags = HashMap::new();
        let mut sources = Vec::new();
        let mut lo = Real::ZERO;
        let mut hi = Real::ZERO;
        for (index, (source, weight)) in merged.iter().enumerate() {
            match encoding {
                Encoding::Plain => {
                    let span = weight.scale_by(max as i64);
                    if span.is_negative() {
                        lo += span;
                    } else {
                        hi += span;
                    }
                    let val_atoms: Vec<Atom> = (0..=max).map(|v| layout.val(*source, v)).collect();
                    for (level, atom) in val_atoms.iter().enumerate() {
                        tags.insert(
                            Lit::positive(*atom),
                            Tag::SourceLevel {
                                source: index,
                                level,
                            },
                        );
                    }
                    sources.push(SourceState {
                        weight: *weight,
                        fixed: None,
                        val_atoms,
                        ge_atoms: Vec::new(),
                    });
                }
                Encoding::Ordered => {
                    let span = weight.scale_by(max as i64);
                    if span.is_negative() {
                        lo += span;
                    } else {
                        hi += span;
                    }
                    let ge_atoms: Vec<Atom> = (1..=max).map(|k| layout.ge(*source, k)).collect();
                    for atom in &ge_atoms {
                        tags.insert(Lit::positive(*atom), Tag::Indicator { source: index });
                        tags.insert(Lit::negative(*atom), Tag::Indicator { source: index });
                    }
                    sources.push(SourceState {
                        weight: *weight,
                        fixed: None,
                        val_atoms: Vec::new(),
                        ge_atoms,
                    });
                }
            }
        }

        let target_val: Vec<Atom> = (0..=max).map(|v| layout.val(target, v)).collect();
        for (level, atom) in target_val.iter().enumerate() {
            tags.insert(Lit::positive(*atom), Tag::TargetLevel { level });
        }

        StaircasePropagator {
            table,
            encoding,
            target,
            target_val,
            sources,
            lo,
            hi,
            committed: None,
            saved: SmallVec::new(),
            tags,
        }
    }

    /// The current running sum bounds.
    pub fn bounds(&self) -> (Real, Real) {
        (self.lo, self.hi)
    }

    /// The target degree committed by the engine, if any.
    pub fn committed(&self) -> Option<Level> {
        self.committed
    }

    /// The fixed literals currently pinning the sum window.
    fn explanation(&self, ctx: &PropagateContext<'_>) -> Vec<Lit> {
        let mut lits = Vec::new();
        for state in &self.sources {
            match self.encoding {
                Encoding::Plain => {
                    if let Some(level) = state.fixed {
                        lits.push(Lit::positive(state.val_atoms[level]));
                    }
                }
                Encoding::Ordered => {
                    for atom in &state.ge_atoms {
                        match ctx.value(Lit::positive(*atom)) {
                            Some(true) => lits.push(Lit::positive(*atom)),
                            Some(false) => lits.push(Lit::negative(*atom)),
                            None => {}
                        }
                    }
                }
            }
        }
        lits
    }

    /// Re-judges the achievable degree window after an update.
    fn judge(&self, ctx: &mut PropagateContext<'_>) -> Result<(), Conflict> {
        let window_lo = self.table.level_of(self.lo);
        let window_hi = self.table.level_of(self.hi);
        if let Some(committed) = self.committed {
            if committed < window_lo || window_hi < committed {
                let mut explanation = self.explanation(ctx);
                explanation.push(Lit::positive(self.target_val[committed]));
                tracing::trace!(
                    target_node = self.target.index(),
                    committed,
                    window_lo,
                    window_hi,
                    "staircase conflict"
                );
                return Err(Conflict::new(explanation));
            }
        }
        if window_lo == window_hi {
            let explanation = self.explanation(ctx);
            ctx.force(Lit::positive(self.target_val[window_lo]), &explanation)?;
        }
        Ok(())
    }
}

impl Propagator for StaircasePropagator {
    fn init(&mut self, ctx: &mut InitContext<'_>) {
        for lit in self.tags.keys() {
            ctx.watch(*lit);
        }
        // A window that is already a single degree (no inputs, or zero
        // swing) pins the target unconditionally, independent of any
        // search order.
        let window_lo = self.table.level_of(self.lo);
        let window_hi = self.table.level_of(self.hi);
        if window_lo == window_hi {
            ctx.assert_fact(Lit::positive(self.target_val[window_lo]));
        }
    }

    fn propagate(&mut self, ctx: &mut PropagateContext<'_>, changed: Lit) -> Result<(), Conflict> {
        let Some(tag) = self.tags.get(&changed).copied() else {
            return Ok(());
        };
        match tag {
            Tag::TargetLevel { level } => {
                self.saved.push(Saved::Commit {
                    lit: changed,
                    previous: self.committed,
                });
                self.committed = Some(level);
            }
            Tag::SourceLevel { source, level } => {
                let state = &self.sources[source];
                debug_assert!(state.fixed.is_none());
                self.saved.push(Saved::Bounds {
                    lit: changed,
                    lo: self.lo,
                    hi: self.hi,
                    source,
                    fixed: state.fixed,
                });
                // The source's contribution collapses from its extreme
                // swing to exactly weight × degree.
                let span = state.weight.scale_by(self.table.max_level() as i64);
                let exact = state.weight.scale_by(level as i64);
                let (lo_extreme, hi_extreme) = if span.is_negative() {
                    (span, Real::ZERO)
                } else {
                    (Real::ZERO, span)
                };
                self.lo = self.lo + exact - lo_extreme;
                self.hi = self.hi + exact - hi_extreme;
                self.sources[source].fixed = Some(level);
            }
            Tag::Indicator { source } => {
                let state = &self.sources[source];
                self.saved.push(Saved::Bounds {
                    lit: changed,
                    lo: self.lo,
                    hi: self.hi,
                    source,
                    fixed: state.fixed,
                });
                // One indicator either contributes its per-unit weight or
                // drops out of the achievable range.
                let weight = state.weight;
                if changed.is_positive() {
                    if weight.is_negative() {
                        self.hi += weight;
                    } else {
                        self.lo += weight;
                    }
                } else if weight.is_negative() {
                    self.lo = self.lo - weight;
                } else {
                    self.hi = self.hi - weight;
                }
            }
        }
        self.judge(ctx)
    }

    fn undo(&mut self, changed: Lit) {
        while self.saved.last().is_some_and(|s| s.lit() == changed) {
            match self.saved.pop() {
                Some(Saved::Bounds {
                    lo,
                    hi,
                    source,
                    fixed,
                    ..
                }) => {
                    self.lo = lo;
                    self.hi = hi;
                    self.sources[source].fixed = fixed;
                }
                Some(Saved::Commit { previous, .. }) => {
                    self.committed = previous;
                }
                None => {}
            }
        }
    }

    fn check(&self, model: &ModelView<'_>) -> Result<(), Conflict> {
        let mut sum = Real::ZERO;
        for state in &self.sources {
            let level = match self.encoding {
                Encoding::Plain => state
                    .val_atoms
                    .iter()
                    .position(|atom| model.atom_true(*atom))
                    .unwrap_or(0),
                Encoding::Ordered => state
                    .ge_atoms
                    .iter()
                    .filter(|atom| model.atom_true(**atom))
                    .count(),
            };
            sum += state.weight.scale_by(level as i64);
        }
        let expected = self.table.level_of(sum);
        let actual = self
            .target_val
            .iter()
            .position(|atom| model.atom_true(*atom))
            .unwrap_or(0);
        if expected != actual {
            let mut explanation: Vec<Lit> = self
                .sources
                .iter()
                .flat_map(|s| s.val_atoms.iter().chain(s.ge_atoms.iter()))
                .filter(|atom| model.atom_true(**atom))
                .map(|atom| Lit::positive(*atom))
                .collect();
            explanation.push(Lit::positive(self.target_val[actual]));
            return Err(Conflict::new(explanation));
        }
        Ok(())
    }
}
