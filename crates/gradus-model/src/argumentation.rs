//! Weighted argumentation graphs.
//!
//! Text format: one `attack(attacker,attacked,weight).` fact per line,
//! with a real-valued attack weight (negative weights are the common
//! case - an attack lowers the attacked argument's acceptability
//! degree). Arguments are introduced by appearance; none are crisp.

use std::collections::HashMap;

use gradus_core::{BreakpointTable, DependencyGraph, GraphBuilder, Real};

use crate::error::{ModelError, Result};

/// A parsed argumentation graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentationGraph {
    attacks: Vec<(String, String, Real)>,
}

impl ArgumentationGraph {
    /// Parses `attack/3` facts, one per line.
    pub fn parse(text: &str) -> Result<Self> {
        let mut attacks = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let number = index + 1;
            let fact = line.trim_end_matches('.');
            let inner = fact
                .strip_prefix("attack(")
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| ModelError::parse(number, "expected `attack(a,b,w).`"))?;
            let mut parts = inner.split(',').map(str::trim);
            let (attacker, attacked, weight) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
                (Some(a), Some(b), Some(w), None) => (a, b, w),
                _ => return Err(ModelError::parse(number, "expected three arguments")),
            };
            if attacker.is_empty() || attacked.is_empty() {
                return Err(ModelError::parse(number, "empty argument name"));
            }
            let weight: Real = weight
                .parse()
                .map_err(|_| ModelError::parse(number, format!("bad weight `{weight}`")))?;
            attacks.push((attacker.to_string(), attacked.to_string(), weight));
        }
        if attacks.is_empty() {
            return Err(ModelError::EmptyNetwork);
        }
        Ok(ArgumentationGraph { attacks })
    }

    /// The parsed attack facts.
    pub fn attacks(&self) -> &[(String, String, Real)] {
        &self.attacks
    }

    /// Compiles into a dependency graph validated against `table`.
    pub fn compile(&self, table: &BreakpointTable) -> Result<DependencyGraph> {
        let mut builder = GraphBuilder::new();
        let mut ids = HashMap::new();
        for (attacker, attacked, _) in &self.attacks {
            for name in [attacker.as_str(), attacked.as_str()] {
                if !ids.contains_key(name) {
                    ids.insert(name, builder.add_node(name.to_string(), false)?);
                }
            }
        }
        for (attacker, attacked, weight) in &self.attacks {
            builder.add_edge(ids[attacked.as_str()], ids[attacker.as_str()], *weight)?;
        }
        Ok(builder.build(table)?)
    }
}
