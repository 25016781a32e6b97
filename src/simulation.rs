use crate::algorithms::common::Path;
use crate::algorithms::{
    create_algorithm, AlgorithmKind, AlgorithmRegistry, LpaStar, Outcome, PathfindingAlgorithm,
    TaskStatus,
};
use crate::config::Config;
use crate::error::SearchError;
use crate::graph::{Cost, Graph, Location, BLOCKED, DEFAULT_COST};
use crate::statistics::{same_cost, QueryStats, ReplanStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};

/// Randomly generated terrain: which cells are slow and which are walls.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub width: i32,
    pub height: i32,
    pub start: Location,
    pub goal: Location,
    pub walls: HashSet<Location>,
    pub slow_cells: HashSet<Location>,
    pub slow_cost: Cost,
    pub seed: u64,
}

impl Scenario {
    /// Generate terrain for `config`. The same seed always gives the same
    /// terrain; start and goal are never covered.
    pub fn generate(config: &Config, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let start = config.start();
        let goal = config.goal();

        let mut walls = HashSet::new();
        let mut attempts = 0;
        while walls.len() < config.num_walls && attempts < config.num_walls * 10 {
            let cell = random_cell(&mut rng, config.width, config.height);
            if cell != start && cell != goal {
                walls.insert(cell);
            }
            attempts += 1;
        }

        let mut slow_cells = HashSet::new();
        let mut attempts = 0;
        while slow_cells.len() < config.num_slow_cells && attempts < config.num_slow_cells * 10 {
            let cell = random_cell(&mut rng, config.width, config.height);
            if cell != start && cell != goal && !walls.contains(&cell) {
                slow_cells.insert(cell);
            }
            attempts += 1;
        }

        log::debug!(
            "generated scenario: seed {}, {} walls, {} slow cells",
            seed,
            walls.len(),
            slow_cells.len()
        );

        Scenario {
            width: config.width,
            height: config.height,
            start,
            goal,
            walls,
            slow_cells,
            slow_cost: config.slow_cost,
            seed,
        }
    }

    /// Builds the 4-connected grid with this terrain applied.
    pub fn build_graph(&self) -> Result<Graph, SearchError> {
        let mut graph = Graph::grid(self.width, self.height, DEFAULT_COST);
        for &wall in &self.walls {
            graph.set_cell_cost(wall, BLOCKED)?;
        }
        for &cell in &self.slow_cells {
            graph.set_cell_cost(cell, self.slow_cost)?;
        }
        Ok(graph)
    }

    /// Draws the grid row by row. Cell symbols come from the graph, so edits
    /// made after generation show up.
    pub fn render(&self, graph: &Graph, path: &[Location], visited: &[Location]) -> String {
        let path: HashSet<&Location> = path.iter().collect();
        let visited: HashSet<&Location> = visited.iter().collect();

        let mut out = String::new();
        out.push_str("Legend: S=Start, G=Goal, *=Path, +=Expanded, #=Wall, ~=Slow, .=Empty\n");
        out.push_str("   ");
        for x in 0..self.width {
            out.push_str(&format!("{:2}", x % 10));
        }
        out.push('\n');

        for y in 0..self.height {
            out.push_str(&format!("{:2} ", y));
            for x in 0..self.width {
                let cell = Location::new(x, y);
                let symbol = if cell == self.start {
                    'S'
                } else if cell == self.goal {
                    'G'
                } else if path.contains(&cell) {
                    '*'
                } else {
                    match cell_cost(graph, cell) {
                        Some(cost) if cost < 0.0 => '#',
                        _ if visited.contains(&cell) => '+',
                        Some(cost) if cost > DEFAULT_COST => '~',
                        _ => '.',
                    }
                };
                out.push(symbol);
                out.push(' ');
            }
            out.push('\n');
        }
        out
    }
}

fn random_cell(rng: &mut StdRng, width: i32, height: i32) -> Location {
    Location::new(rng.gen_range(0..width), rng.gen_range(0..height))
}

/// Cost of entering `cell`, read from one of its incoming edges.
fn cell_cost(graph: &Graph, cell: Location) -> Option<Cost> {
    let from = *graph.predecessors(cell).first()?;
    graph.edge(from, cell).map(|edge| edge.cost)
}

/// Cheapest `start -> goal` cost computed with the `pathfinding` crate, used
/// to check the engine's answers. The crate needs integer costs, so the
/// search runs in thousandths; the returned cost is the exact cost of the
/// path it settled on.
pub fn reference_path_cost(graph: &Graph, start: Location, goal: Location) -> Option<Cost> {
    let successors = |location: &Location| -> Vec<(Location, u64)> {
        graph
            .node(*location)
            .map(|node| {
                node.edges()
                    .iter()
                    .filter(|edge| edge.is_passable())
                    .map(|edge| (edge.target(), (edge.cost * 1000.0).round() as u64))
                    .collect()
            })
            .unwrap_or_default()
    };
    let (path, _) = pathfinding::prelude::dijkstra(&start, successors, |location| *location == goal)?;
    graph.path_cost(&path)
}

/// Runs one query through the catching boundary and summarises it.
pub fn run_query(
    algorithm: &mut dyn PathfindingAlgorithm,
    graph: &Graph,
    start: Location,
    goal: Location,
    reference_cost: Option<Cost>,
) -> (Path, QueryStats) {
    let mut stats = QueryStats::new(algorithm.kind(), reference_cost);
    let started = Instant::now();
    let path = algorithm.find_nearest_path(graph, start, goal);
    stats.elapsed = started.elapsed();

    stats.outcome = algorithm.outcome().clone();
    stats.path_len = path.len();
    stats.path_cost = graph.path_cost(&path);
    stats.expansions = algorithm.visited().len();
    stats.calculate_cost_ratio();
    (path, stats)
}

pub struct Simulation {
    config: Config,
    scenario: Scenario,
    graph: Graph,
    registry: AlgorithmRegistry,
}

impl Simulation {
    pub fn new(config: Config) -> Result<Self, SearchError> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random::<u64>);
        let scenario = Scenario::generate(&config, seed);
        Self::with_scenario(config, scenario)
    }

    pub fn with_scenario(config: Config, scenario: Scenario) -> Result<Self, SearchError> {
        let graph = scenario.build_graph()?;
        if !graph.contains(scenario.start) {
            return Err(SearchError::NodeNotFound(scenario.start));
        }
        if !graph.contains(scenario.goal) {
            return Err(SearchError::NodeNotFound(scenario.goal));
        }
        let registry = AlgorithmRegistry::new(config.search_config())?;
        Ok(Simulation {
            config,
            scenario,
            graph,
            registry,
        })
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The algorithms named by `--algorithm`.
    pub fn selected_algorithms(&self) -> Result<Vec<AlgorithmKind>, SearchError> {
        if self.config.algorithm.eq_ignore_ascii_case("all") {
            Ok(AlgorithmKind::ALL.to_vec())
        } else {
            Ok(vec![self.config.algorithm.parse()?])
        }
    }

    /// Runs every algorithm in `kinds` on the same terrain.
    pub fn run_algorithms(&mut self, kinds: &[AlgorithmKind]) -> Vec<QueryStats> {
        let (start, goal) = (self.scenario.start, self.scenario.goal);
        let reference = reference_path_cost(&self.graph, start, goal);
        if reference.is_none() {
            log::info!("goal {} is unreachable from {} on this terrain", goal, start);
        }

        let mut results = Vec::new();
        for &kind in kinds {
            let algorithm = self.registry.get(kind);
            let (path, stats) = run_query(algorithm, &self.graph, start, goal, reference);

            if !self.config.quiet {
                println!("=== {} ===", kind);
                println!("{}", algorithm.description());
                print!("{}", self.scenario.render(&self.graph, &path, algorithm.visited()));
                println!("{}", stats);
            }
            results.push(stats);
        }
        results
    }

    /// Drives one algorithm a single expansion at a time, redrawing the grid
    /// after each step.
    pub fn animate(&mut self, kind: AlgorithmKind) -> Result<QueryStats, SearchError> {
        let (start, goal) = (self.scenario.start, self.scenario.goal);
        let reference = reference_path_cost(&self.graph, start, goal);
        let mut algorithm = create_algorithm(kind, &self.config.search_config());
        let mut task = algorithm.new_task(&self.graph, start, goal)?;

        let started = Instant::now();
        let mut steps = 0;
        while algorithm.advance(&self.graph, &mut task)? == TaskStatus::Running {
            steps += 1;
            if !self.config.quiet {
                self.clear_screen();
                println!("=== {} | step {} | frontier {} ===", kind, steps, task.frontier.len());
                print!("{}", self.scenario.render(&self.graph, &[], &task.visited));
                thread::sleep(Duration::from_millis(self.config.delay_ms));
            }
        }

        let mut stats = QueryStats::new(kind, reference);
        stats.elapsed = started.elapsed();
        stats.expansions = task.visited.len();
        let path = task.take_path();
        stats.path_len = path.len();
        stats.path_cost = self.graph.path_cost(&path);
        stats.outcome = if path.is_empty() {
            Outcome::Unreachable
        } else {
            Outcome::Found { length: path.len() }
        };
        stats.calculate_cost_ratio();

        if !self.config.quiet {
            self.clear_screen();
            println!("=== {} finished after {} steps ===", kind, steps);
            print!("{}", self.scenario.render(&self.graph, &path, &task.visited));
            println!("{}", stats);
        }
        Ok(stats)
    }

    /// Slows down cells on the current path one at a time and lets LPA*
    /// repair its answer, comparing each repair with a from-scratch run.
    pub fn replan(&mut self) -> Result<ReplanStats, SearchError> {
        let (start, goal) = (self.scenario.start, self.scenario.goal);
        let mut rng = StdRng::seed_from_u64(self.scenario.seed.wrapping_add(1));
        let mut lpa = LpaStar::with_config(self.registry.config());
        let mut path = lpa.find_path(&self.graph, start, goal)?;
        let mut stats = ReplanStats {
            costs_agree: true,
            ..ReplanStats::default()
        };

        for edit in 0..self.config.replan_edits {
            let candidates: Vec<Location> = path
                .iter()
                .copied()
                .filter(|&cell| cell != start && cell != goal)
                .collect();
            if candidates.is_empty() {
                break;
            }
            let cell = candidates[rng.gen_range(0..candidates.len())];

            let changed = self.graph.toggle_cell_cost(cell, self.scenario.slow_cost)?;
            lpa.edges_changed(&self.graph, &changed);
            path = lpa.find_path(&self.graph, start, goal)?;
            let repair = lpa.visited().len();

            let mut fresh = LpaStar::with_config(self.registry.config());
            let scratch_path = fresh.find_path(&self.graph, start, goal)?;
            let scratch = fresh.visited().len();

            let agree = same_cost(self.graph.path_cost(&path), self.graph.path_cost(&scratch_path));
            log::debug!(
                "replan edit {}: toggled {}, repair expanded {}, scratch expanded {}",
                edit + 1,
                cell,
                repair,
                scratch
            );
            if !agree {
                log::warn!("replan edit {}: repaired cost differs from scratch", edit + 1);
            }

            stats.edits += 1;
            stats.repair_expansions += repair;
            stats.scratch_expansions += scratch;
            stats.costs_agree &= agree;

            if !self.config.quiet {
                println!("Edit {}: toggled cell {}", edit + 1, cell);
                print!("{}", self.scenario.render(&self.graph, &path, lpa.visited()));
            }
        }
        Ok(stats)
    }

    /// Print comparison results in a table
    pub fn print_comparison_results(results: &[QueryStats]) {
        println!("\n=== ALGORITHM COMPARISON RESULTS ===");
        println!();
        println!("{}", QueryStats::table_header());
        println!("{}", "-".repeat(72));
        for result in results {
            println!("{}", result.table_row());
        }
        println!();

        let found: Vec<&QueryStats> = results.iter().filter(|r| r.outcome.is_found()).collect();
        if found.is_empty() {
            println!("No algorithm found a path.");
            return;
        }

        println!("=== PERFORMANCE ANALYSIS ===");
        if let Some(fewest) = found.iter().min_by_key(|r| r.expansions) {
            println!("Fewest expansions: {} ({} nodes)", fewest.algorithm, fewest.expansions);
        }
        if let Some(fastest) = found.iter().min_by_key(|r| r.elapsed) {
            println!("Fastest: {} ({:.2?})", fastest.algorithm, fastest.elapsed);
        }
        let suboptimal: Vec<String> = found
            .iter()
            .filter(|r| !r.is_optimal())
            .map(|r| format!("{} ({:.3}x)", r.algorithm, r.cost_ratio))
            .collect();
        if suboptimal.is_empty() {
            println!("Every path matched the reference cost.");
        } else {
            println!("More expensive than the reference: {}", suboptimal.join(", "));
        }
    }

    /// Clear the terminal screen (only used when animating)
    fn clear_screen(&self) {
        print!("\x1B[2J\x1B[1;1H");
    }
}
