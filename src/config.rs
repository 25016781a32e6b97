use crate::error::SearchError;
use crate::graph::{Cost, Location, DEFAULT_COST, DEFAULT_PENALTY};
use clap::Parser;

/// Largest accepted `straight_bias`.
pub const MAX_STRAIGHT_BIAS: Cost = 0.5;

/// Default alternating-direction penalty. The bias is accumulated apart
/// from the path cost and only compared between equally cheap paths, so any
/// value up to [`MAX_STRAIGHT_BIAS`] leaves the cost of the result unchanged.
pub const DEFAULT_STRAIGHT_BIAS: Cost = 0.001;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 11)]
    pub width: i32,

    #[arg(long, default_value_t = 11)]
    pub height: i32,

    /// Start cell as `x,y` (defaults to the bottom-left corner)
    #[arg(long)]
    pub start: Option<Location>,

    /// Goal cell as `x,y` (defaults to the top-right corner)
    #[arg(long)]
    pub goal: Option<Location>,

    /// bfs, greedy, dijkstra, a_star, lpa_star or all
    #[arg(long, default_value = "a_star")]
    pub algorithm: String,

    #[arg(long, default_value_t = 12)]
    pub num_slow_cells: usize,

    #[arg(long, default_value_t = 8)]
    pub num_walls: usize,

    #[arg(long, default_value_t = DEFAULT_PENALTY)]
    pub slow_cost: Cost,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = DEFAULT_STRAIGHT_BIAS)]
    pub straight_bias: Cost,

    /// Animate a single algorithm one expansion at a time
    #[arg(long, default_value_t = false)]
    pub step: bool,

    #[arg(long, default_value_t = 50)]
    pub delay_ms: u64,

    /// Cells to toggle in the incremental replanning demo (0 disables it)
    #[arg(long, default_value_t = 5)]
    pub replan_edits: usize,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,
}

impl Config {
    pub fn start(&self) -> Location {
        self.start.unwrap_or(Location::new(0, self.height - 1))
    }

    pub fn goal(&self) -> Location {
        self.goal.unwrap_or(Location::new(self.width - 1, 0))
    }

    /// Slow cells cheaper than open ground lower the heuristic scale so A*
    /// and LPA* stay optimal.
    pub fn search_config(&self) -> SearchConfig {
        let min_edge_cost = if self.slow_cost >= 0.0 {
            self.slow_cost.min(DEFAULT_COST)
        } else {
            DEFAULT_COST
        };
        SearchConfig {
            straight_bias: self.straight_bias,
            min_edge_cost,
            ..SearchConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.width <= 0 || self.height <= 0 {
            return Err(SearchError::InvalidConfig(format!(
                "grid must be at least 1x1, got {}x{}",
                self.width, self.height
            )));
        }
        self.search_config().validate()
    }
}

/// Tunables shared by the search algorithms.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Tie-break weight for a horizontal step out of an even cell or a
    /// vertical step out of an odd cell (parity of `x + y`). Favours
    /// staircase paths over long straight runs when costs tie, and never
    /// changes the cost of the result. Must be in `[0, MAX_STRAIGHT_BIAS]`.
    pub straight_bias: Cost,
    /// Lower bound on every passable edge cost. A* and LPA* multiply the
    /// Manhattan heuristic by it; 0 turns them into uniform-cost searches.
    pub min_edge_cost: Cost,
    /// Breadth-first search orders each node's neighbours by distance to
    /// the goal before queueing them.
    pub sort_neighbors: bool,
    /// Breadth-first and greedy search skip edges costing more than this.
    pub unweighted_cost_limit: Cost,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            straight_bias: DEFAULT_STRAIGHT_BIAS,
            min_edge_cost: DEFAULT_COST,
            sort_neighbors: true,
            unweighted_cost_limit: 1.0,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), SearchError> {
        if !(0.0..=MAX_STRAIGHT_BIAS).contains(&self.straight_bias) {
            return Err(SearchError::InvalidConfig(format!(
                "straight_bias must be within [0, {}], got {}",
                MAX_STRAIGHT_BIAS, self.straight_bias
            )));
        }
        if !(self.min_edge_cost >= 0.0 && self.min_edge_cost.is_finite()) {
            return Err(SearchError::InvalidConfig(format!(
                "min_edge_cost must be finite and non-negative, got {}",
                self.min_edge_cost
            )));
        }
        if !(self.unweighted_cost_limit >= 0.0) {
            return Err(SearchError::InvalidConfig(format!(
                "unweighted_cost_limit must be non-negative, got {}",
                self.unweighted_cost_limit
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_search_config_is_valid() {
        assert_eq!(SearchConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_bias_bounds() {
        let negative = SearchConfig {
            straight_bias: -0.1,
            ..SearchConfig::default()
        };
        assert!(matches!(negative.validate(), Err(SearchError::InvalidConfig(_))));

        let too_large = SearchConfig {
            straight_bias: 0.6,
            ..SearchConfig::default()
        };
        assert!(too_large.validate().is_err());

        let nan = SearchConfig {
            straight_bias: f64::NAN,
            ..SearchConfig::default()
        };
        assert!(nan.validate().is_err());
    }

    #[test]
    fn test_min_edge_cost_bounds() {
        for bad in [-1.0, f64::NAN, f64::INFINITY] {
            let config = SearchConfig {
                min_edge_cost: bad,
                ..SearchConfig::default()
            };
            assert!(config.validate().is_err(), "{}", bad);
        }
        let zero = SearchConfig {
            min_edge_cost: 0.0,
            ..SearchConfig::default()
        };
        assert_eq!(zero.validate(), Ok(()));
    }

    #[test]
    fn test_cheap_slow_cells_scale_down_the_heuristic() {
        let config = Config::parse_from(["grid_pathfinding", "--slow-cost", "0.25"]);
        assert_eq!(config.search_config().min_edge_cost, 0.25);
        let walls = Config::parse_from(["grid_pathfinding", "--slow-cost=-1"]);
        assert_eq!(walls.search_config().min_edge_cost, 1.0);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        for args in [["grid_pathfinding", "--width=0"], ["grid_pathfinding", "--height=-3"]] {
            let config = Config::parse_from(args);
            assert!(matches!(config.validate(), Err(SearchError::InvalidConfig(_))));
        }
        assert_eq!(Config::parse_from(["grid_pathfinding"]).validate(), Ok(()));
    }

    #[test]
    fn test_cli_defaults_use_opposite_corners() {
        let config = Config::parse_from(["grid_pathfinding"]);
        assert_eq!(config.start(), Location::new(0, 10));
        assert_eq!(config.goal(), Location::new(10, 0));
        assert_eq!(config.search_config(), SearchConfig::default());
    }

    #[test]
    fn test_cli_parses_locations() {
        let config = Config::parse_from([
            "grid_pathfinding",
            "--start",
            "1,2",
            "--goal",
            "3,4",
            "--algorithm",
            "all",
        ]);
        assert_eq!(config.start(), Location::new(1, 2));
        assert_eq!(config.goal(), Location::new(3, 4));
        assert_eq!(config.algorithm, "all");
    }
}
