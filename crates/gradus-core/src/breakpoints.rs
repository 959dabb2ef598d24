//! Breakpoint tables and the staircase function.
//!
//! A table of `N` strictly ascending breakpoints partitions the real line
//! into `N + 1` intervals, one per truth degree `0..=N`. The staircase
//! function maps a weighted sum onto the degree whose interval contains it.
//! Every realization of the quantization constraint shares this one
//! definition; the boundary convention is open below degree 0, open above
//! degree `N`, and half-open `(lo, hi]` everywhere else.

use crate::error::{CoreError, Result};
use crate::real::Real;

/// A quantized truth degree in `0..=max_level`.
pub type Level = usize;

/// Strictly ascending breakpoints defining the staircase partition.
///
/// # Example
///
/// ```
/// use gradus_core::{BreakpointTable, Real};
///
/// let table = BreakpointTable::new(vec![
///     Real::from_int(-2),
///     Real::from_int(0),
///     Real::from_int(2),
/// ]).unwrap();
/// assert_eq!(table.max_level(), 3);
/// assert_eq!(table.level_of(Real::from_int(0)), 1);
/// assert_eq!(table.level_of(Real::from_scaled(1)), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointTable {
    breakpoints: Vec<Real>,
}

impl BreakpointTable {
    /// Builds a table, rejecting empty or non-ascending input.
    pub fn new(breakpoints: Vec<Real>) -> Result<Self> {
        if breakpoints.is_empty() {
            return Err(CoreError::EmptyBreakpoints);
        }
        for index in 1..breakpoints.len() {
            if breakpoints[index] <= breakpoints[index - 1] {
                return Err(CoreError::MalformedBreakpoints { index });
            }
        }
        Ok(Self { breakpoints })
    }

    /// Parses a table from text with one real per line.
    ///
    /// Blank lines are skipped.
    pub fn parse_lines(text: &str) -> Result<Self> {
        let mut breakpoints = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            breakpoints.push(line.parse()?);
        }
        Self::new(breakpoints)
    }

    /// The maximal truth degree `N` (= number of breakpoints).
    pub fn max_level(&self) -> Level {
        self.breakpoints.len()
    }

    /// All truth degrees, `0..=N`.
    pub fn levels(&self) -> std::ops::RangeInclusive<Level> {
        0..=self.max_level()
    }

    /// The staircase function: the degree whose interval contains `sum`.
    ///
    /// Equal to the number of breakpoints strictly below `sum`, which is
    /// monotone non-decreasing in `sum`.
    pub fn level_of(&self, sum: Real) -> Level {
        self.breakpoints.partition_point(|b| *b < sum)
    }

    /// The `(lower, upper]` interval of a degree, with `None` for the open
    /// ends below degree 0 and above degree `N`.
    pub fn bounds_of(&self, level: Level) -> (Option<Real>, Option<Real>) {
        debug_assert!(level <= self.max_level());
        let lower = level.checked_sub(1).map(|i| self.breakpoints[i]);
        let upper = self.breakpoints.get(level).copied();
        (lower, upper)
    }

    /// The raw breakpoints.
    pub fn breakpoints(&self) -> &[Real] {
        &self.breakpoints
    }
}

impl Default for BreakpointTable {
    /// The historical five-degree table, a scaled logistic activation.
    fn default() -> Self {
        let breakpoints = [-10987, -4237, 0, 4236, 10986]
            .into_iter()
            .map(Real::from_int)
            .collect();
        Self::new(breakpoints).unwrap_or_else(|_| unreachable!("default table is ascending"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> BreakpointTable {
        BreakpointTable::new(vec![
            Real::from_int(-2),
            Real::from_int(0),
            Real::from_int(2),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_non_ascending() {
        let err = BreakpointTable::new(vec![Real::from_int(0), Real::from_int(0)]);
        assert!(matches!(
            err,
            Err(CoreError::MalformedBreakpoints { index: 1 })
        ));
        assert!(matches!(
            BreakpointTable::new(vec![]),
            Err(CoreError::EmptyBreakpoints)
        ));
    }

    #[test]
    fn breakpoint_lands_on_its_own_level() {
        let t = table();
        for (k, b) in t.breakpoints().iter().enumerate() {
            assert_eq!(t.level_of(*b), k);
            assert_eq!(t.level_of(*b + Real::from_scaled(1)), k + 1);
        }
    }

    #[test]
    fn open_ends() {
        let t = table();
        assert_eq!(t.level_of(Real::from_int(-1_000_000)), 0);
        assert_eq!(t.level_of(Real::from_int(1_000_000)), t.max_level());
    }

    #[test]
    fn monotone_in_the_sum() {
        let t = table();
        let mut previous = 0;
        for units in -3000..=3000 {
            let level = t.level_of(Real::from_scaled(units));
            assert!(level >= previous);
            previous = level;
        }
    }

    #[test]
    fn bounds_match_level_of() {
        let t = table();
        for level in t.levels() {
            let (lower, upper) = t.bounds_of(level);
            if let Some(lower) = lower {
                assert_eq!(t.level_of(lower), level - 1);
                assert_eq!(t.level_of(lower + Real::from_scaled(1)), level);
            }
            if let Some(upper) = upper {
                assert_eq!(t.level_of(upper), level);
            }
        }
    }

    #[test]
    fn default_table_has_five_degrees() {
        let t = BreakpointTable::default();
        assert_eq!(t.max_level(), 5);
        assert_eq!(t.level_of(Real::ZERO), 2);
    }

    #[test]
    fn parses_lines() {
        let t = BreakpointTable::parse_lines("-2\n\n0\n2\n").unwrap();
        assert_eq!(t, table());
    }
}
