use crate::algorithms::{AlgorithmKind, Outcome};
use crate::graph::Cost;
use std::fmt;
use std::time::Duration;

/// Slack allowed when comparing costs summed along different paths.
pub const COST_TOLERANCE: Cost = 1e-9;

/// Whether two optional path costs agree up to [`COST_TOLERANCE`].
pub fn same_cost(a: Option<Cost>, b: Option<Cost>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => (a - b).abs() <= COST_TOLERANCE,
        (None, None) => true,
        _ => false,
    }
}

/// Result summary of one query.
#[derive(Debug, Clone)]
pub struct QueryStats {
    pub algorithm: AlgorithmKind,
    pub outcome: Outcome,
    /// Number of locations in the path, start and goal included.
    pub path_len: usize,
    pub path_cost: Option<Cost>,
    pub expansions: usize,
    pub elapsed: Duration,
    /// Cheapest achievable cost as computed by an independent solver.
    pub reference_cost: Option<Cost>,
    pub cost_ratio: f64,
}

impl QueryStats {
    pub fn new(algorithm: AlgorithmKind, reference_cost: Option<Cost>) -> Self {
        QueryStats {
            algorithm,
            outcome: Outcome::NotRun,
            path_len: 0,
            path_cost: None,
            expansions: 0,
            elapsed: Duration::ZERO,
            reference_cost,
            cost_ratio: 0.0,
        }
    }

    /// `path_cost / reference_cost`; 1.0 means optimal.
    pub fn calculate_cost_ratio(&mut self) {
        self.cost_ratio = match (self.path_cost, self.reference_cost) {
            (Some(cost), Some(reference)) if reference > 0.0 => cost / reference,
            (Some(cost), Some(_)) if cost == 0.0 => 1.0,
            _ => 0.0,
        };
    }

    /// The reference path is only optimal up to the rounding its solver
    /// works with, so anything no dearer than it counts.
    pub fn is_optimal(&self) -> bool {
        match (self.path_cost, self.reference_cost) {
            (Some(cost), Some(reference)) => cost <= reference + COST_TOLERANCE,
            (None, None) => self.outcome.is_unreachable(),
            _ => false,
        }
    }

    fn outcome_label(&self) -> String {
        match &self.outcome {
            Outcome::NotRun => "not run".to_string(),
            Outcome::Found { .. } => "found".to_string(),
            Outcome::Unreachable => "unreachable".to_string(),
            Outcome::Failed(err) => format!("failed: {}", err),
        }
    }

    /// Header matching [`QueryStats::table_row`].
    pub fn table_header() -> String {
        format!(
            "{:<10} {:<12} {:>6} {:>8} {:>8} {:>10} {:>8}",
            "algorithm", "outcome", "length", "cost", "optimal", "expanded", "time"
        )
    }

    pub fn table_row(&self) -> String {
        let cost = self
            .path_cost
            .map_or_else(|| "-".to_string(), |c| format!("{:.0}", c));
        let optimal = if self.is_optimal() { "yes" } else { "no" };
        format!(
            "{:<10} {:<12} {:>6} {:>8} {:>8} {:>10} {:>6}us",
            self.algorithm.name(),
            self.outcome_label(),
            self.path_len,
            cost,
            optimal,
            self.expansions,
            self.elapsed.as_micros()
        )
    }
}

impl fmt::Display for QueryStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm: {}", self.algorithm)?;
        writeln!(f, "Outcome: {}", self.outcome_label())?;
        writeln!(f, "Path Length: {}", self.path_len)?;
        match self.path_cost {
            Some(cost) => writeln!(f, "Path Cost: {:.0}", cost)?,
            None => writeln!(f, "Path Cost: -")?,
        }
        match self.reference_cost {
            Some(cost) => writeln!(f, "Reference Cost: {:.0}", cost)?,
            None => writeln!(f, "Reference Cost: unreachable")?,
        }
        writeln!(f, "Expanded Nodes: {}", self.expansions)?;
        writeln!(f, "Elapsed: {:?}", self.elapsed)?;

        if self.cost_ratio > 0.0 {
            writeln!(f, "Cost Ratio: {:.3}", self.cost_ratio)?;
            if self.cost_ratio > 1.0 {
                writeln!(f, "Note: path is {:.1}% more expensive than the cheapest", (self.cost_ratio - 1.0) * 100.0)?;
            }
        }
        Ok(())
    }
}

/// Work done by the incremental replanning demo.
#[derive(Debug, Clone, Default)]
pub struct ReplanStats {
    pub edits: usize,
    pub repair_expansions: usize,
    pub scratch_expansions: usize,
    pub costs_agree: bool,
}

impl ReplanStats {
    /// Share of the from-scratch work the repairs needed.
    pub fn repair_ratio(&self) -> f64 {
        if self.scratch_expansions > 0 {
            self.repair_expansions as f64 / self.scratch_expansions as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for ReplanStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Incremental Replanning Statistics:")?;
        writeln!(f, "Edits applied: {}", self.edits)?;
        writeln!(f, "LPA* repair expansions: {}", self.repair_expansions)?;
        writeln!(f, "From-scratch expansions: {}", self.scratch_expansions)?;
        if self.scratch_expansions > 0 {
            writeln!(f, "Repair work: {:.1}% of from-scratch", self.repair_ratio() * 100.0)?;
        }
        if self.costs_agree {
            writeln!(f, "✓ Repaired paths match from-scratch costs")?;
        } else {
            writeln!(f, "⚠ Repaired path cost differs from a from-scratch run")?;
        }
        Ok(())
    }
}
