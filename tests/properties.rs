use grid_pathfinding::algorithms::common::{SearchTask, SearchTrace, TaskStatus};
use grid_pathfinding::algorithms::dijkstra::Dijkstra;
use grid_pathfinding::algorithms::{create_algorithm, AlgorithmKind, Outcome, PathfindingAlgorithm};
use grid_pathfinding::config::MAX_STRAIGHT_BIAS;
use grid_pathfinding::graph::{Cost, Graph, Location, Node, BLOCKED};
use grid_pathfinding::simulation::reference_path_cost;
use grid_pathfinding::statistics::same_cost;
use grid_pathfinding::{SearchConfig, SearchError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashSet;

fn loc(x: i32, y: i32) -> Location {
    Location::new(x, y)
}

/// A grid whose every directed edge gets its own cost in `1..=5`, or is
/// blocked with probability `blocked`.
fn random_grid(rng: &mut StdRng, width: i32, height: i32, blocked: f64) -> Graph {
    random_grid_with(rng, width, height, blocked, 0.0, |rng| rng.gen_range(1..=5) as Cost)
}

/// Like [`random_grid`] with costs drawn by `draw`, plus a second edge in
/// parallel to each grid edge with probability `parallel`.
fn random_grid_with<F>(rng: &mut StdRng, width: i32, height: i32, blocked: f64, parallel: f64, mut draw: F) -> Graph
where
    F: FnMut(&mut StdRng) -> Cost,
{
    let mut graph = Graph::grid(width, height, 1.0);
    let edges: Vec<(Location, Location)> = graph
        .locations()
        .flat_map(|from| graph.neighbors(from).map(move |to| (from, to)).collect::<Vec<_>>())
        .collect();
    for (from, to) in edges {
        let cost = if rng.gen_bool(blocked) { BLOCKED } else { draw(rng) };
        graph.set_edge_cost(from, to, cost).unwrap();
        if rng.gen_bool(parallel) {
            let extra = if rng.gen_bool(blocked) { BLOCKED } else { draw(rng) };
            graph.add_edge(from, to, extra).unwrap();
        }
    }
    graph
}

const COST_AWARE: [AlgorithmKind; 3] = [AlgorithmKind::Dijkstra, AlgorithmKind::AStar, AlgorithmKind::LpaStar];

/// Cheapest cost over every simple path, by exhaustive search.
fn brute_force_cost(graph: &Graph, start: Location, goal: Location) -> Option<Cost> {
    fn walk(
        graph: &Graph,
        current: Location,
        goal: Location,
        cost: Cost,
        seen: &mut FxHashSet<Location>,
        best: &mut Option<Cost>,
    ) {
        if current == goal {
            *best = Some(best.map_or(cost, |b: Cost| b.min(cost)));
            return;
        }
        let Some(node) = graph.node(current) else {
            return;
        };
        for edge in node.edges().iter().filter(|e| e.is_passable()) {
            let next = edge.target();
            if seen.insert(next) {
                walk(graph, next, goal, cost + edge.cost, seen, best);
                seen.remove(&next);
            }
        }
    }

    let mut seen = FxHashSet::default();
    seen.insert(start);
    let mut best = None;
    walk(graph, start, goal, 0.0, &mut seen, &mut best);
    best
}

fn all_algorithms() -> Vec<Box<dyn PathfindingAlgorithm>> {
    let config = SearchConfig::default();
    AlgorithmKind::ALL
        .into_iter()
        .map(|kind| create_algorithm(kind, &config))
        .collect()
}

#[test]
fn test_cost_aware_algorithms_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(2024);
    let config = SearchConfig::default();
    for _ in 0..40 {
        let graph = random_grid(&mut rng, 3, 3, 0.2);
        let start = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let goal = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let expected = brute_force_cost(&graph, start, goal);

        for kind in [AlgorithmKind::Dijkstra, AlgorithmKind::AStar, AlgorithmKind::LpaStar] {
            let mut algorithm = create_algorithm(kind, &config);
            let path = algorithm.find_path(&graph, start, goal).unwrap();
            assert_eq!(graph.path_cost(&path), expected, "{} {} -> {}", kind, start, goal);
        }
    }
}

#[test]
fn test_cost_aware_algorithms_match_reference_on_larger_grids() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = SearchConfig::default();
    for _ in 0..10 {
        let graph = random_grid(&mut rng, 12, 12, 0.15);
        let start = loc(rng.gen_range(0..12), rng.gen_range(0..12));
        let goal = loc(rng.gen_range(0..12), rng.gen_range(0..12));
        let expected = reference_path_cost(&graph, start, goal);

        for kind in [AlgorithmKind::Dijkstra, AlgorithmKind::AStar, AlgorithmKind::LpaStar] {
            let mut algorithm = create_algorithm(kind, &config);
            let path = algorithm.find_path(&graph, start, goal).unwrap();
            assert_eq!(graph.path_cost(&path), expected, "{} {} -> {}", kind, start, goal);
        }
    }
}

#[test]
fn test_zero_fractional_and_parallel_edges_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(404);
    // zero-cost edges leave nothing to scale the estimate by
    let config = SearchConfig {
        min_edge_cost: 0.0,
        ..SearchConfig::default()
    };
    for _ in 0..60 {
        let graph = random_grid_with(&mut rng, 3, 3, 0.15, 0.3, |rng| match rng.gen_range(0..4) {
            0 => 0.0,
            1 => rng.gen_range(0..=8) as Cost * 0.25,
            _ => rng.gen_range(0.0..3.0),
        });
        let start = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let goal = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let expected = brute_force_cost(&graph, start, goal);

        for kind in COST_AWARE {
            let mut algorithm = create_algorithm(kind, &config);
            let path = algorithm.find_nearest_path(&graph, start, goal);
            assert!(!algorithm.outcome().is_invariant_violation(), "{} {:?}", kind, algorithm.outcome());
            let got = graph.path_cost(&path);
            assert!(same_cost(got, expected), "{} {} -> {}: {:?} vs {:?}", kind, start, goal, got, expected);
        }
    }
}

#[test]
fn test_cheap_edges_with_scaled_heuristic_match_brute_force() {
    let mut rng = StdRng::seed_from_u64(77);
    let config = SearchConfig {
        min_edge_cost: 0.5,
        ..SearchConfig::default()
    };
    for _ in 0..40 {
        let graph = random_grid_with(&mut rng, 3, 3, 0.1, 0.2, |rng| rng.gen_range(0.5..2.5));
        let start = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let goal = loc(rng.gen_range(0..3), rng.gen_range(0..3));
        let expected = brute_force_cost(&graph, start, goal);

        for kind in COST_AWARE {
            let mut algorithm = create_algorithm(kind, &config);
            let got = graph.path_cost(&algorithm.find_path(&graph, start, goal).unwrap());
            assert!(same_cost(got, expected), "{} {} -> {}: {:?} vs {:?}", kind, start, goal, got, expected);
        }
    }
}

#[test]
fn test_largest_bias_never_costs_optimality() {
    let mut rng = StdRng::seed_from_u64(600);
    let config = SearchConfig {
        straight_bias: MAX_STRAIGHT_BIAS,
        ..SearchConfig::default()
    };
    for _ in 0..100 {
        let graph = random_grid_with(&mut rng, 5, 5, 0.1, 0.0, |rng| rng.gen_range(1..=3) as Cost);
        let start = loc(rng.gen_range(0..5), rng.gen_range(0..5));
        let goal = loc(rng.gen_range(0..5), rng.gen_range(0..5));
        let expected = reference_path_cost(&graph, start, goal);

        for kind in COST_AWARE {
            let mut algorithm = create_algorithm(kind, &config);
            let path = algorithm.find_path(&graph, start, goal).unwrap();
            assert_eq!(graph.path_cost(&path), expected, "{} {} -> {}", kind, start, goal);
        }
    }
}

#[test]
fn test_default_bias_is_invisible_in_fractional_costs() {
    let mut rng = StdRng::seed_from_u64(300);
    let unbiased = SearchConfig {
        straight_bias: 0.0,
        ..SearchConfig::default()
    };
    let steps = [1.0, 1.0005, 1.001, 1.0015];
    for _ in 0..60 {
        let graph = random_grid_with(&mut rng, 6, 6, 0.0, 0.0, |rng| steps[rng.gen_range(0..steps.len())]);
        let start = loc(rng.gen_range(0..6), rng.gen_range(0..6));
        let goal = loc(rng.gen_range(0..6), rng.gen_range(0..6));
        let mut plain = create_algorithm(AlgorithmKind::Dijkstra, &unbiased);
        let expected = graph.path_cost(&plain.find_path(&graph, start, goal).unwrap());

        for kind in [AlgorithmKind::Dijkstra, AlgorithmKind::AStar] {
            let mut algorithm = create_algorithm(kind, &SearchConfig::default());
            let got = graph.path_cost(&algorithm.find_path(&graph, start, goal).unwrap());
            assert!(same_cost(got, expected), "{} {} -> {}: {:?} vs {:?}", kind, start, goal, got, expected);
        }
    }
}

#[test]
fn test_unweighted_algorithms_take_manhattan_length() {
    let graph = Graph::grid(8, 6, 1.0);
    let mut rng = StdRng::seed_from_u64(11);
    let config = SearchConfig::default();
    for _ in 0..30 {
        let start = loc(rng.gen_range(0..8), rng.gen_range(0..6));
        let goal = loc(rng.gen_range(0..8), rng.gen_range(0..6));
        for kind in [AlgorithmKind::BreadthFirst, AlgorithmKind::GreedyBestFirst] {
            let mut algorithm = create_algorithm(kind, &config);
            let path = algorithm.find_path(&graph, start, goal).unwrap();
            assert_eq!(path.len() as i32 - 1, start.manhattan(goal), "{} {} -> {}", kind, start, goal);
        }
    }
}

#[test]
fn test_three_by_three_example() {
    let graph = Graph::grid(3, 3, 1.0);
    for mut algorithm in all_algorithms() {
        let path = algorithm.find_path(&graph, loc(0, 0), loc(2, 2)).unwrap();
        assert_eq!(path.len(), 5, "{}", algorithm.kind());
        assert_eq!(graph.path_cost(&path), Some(4.0), "{}", algorithm.kind());
    }
}

#[test]
fn test_repeated_queries_are_identical() {
    let mut rng = StdRng::seed_from_u64(99);
    let graph = random_grid(&mut rng, 7, 7, 0.1);
    let (start, goal) = (loc(0, 6), loc(6, 0));
    for mut algorithm in all_algorithms() {
        let first = algorithm.find_path(&graph, start, goal).unwrap();
        let second = algorithm.find_path(&graph, start, goal).unwrap();
        assert_eq!(first, second, "{}", algorithm.kind());
    }
}

#[test]
fn test_stepping_matches_full_run() {
    let mut rng = StdRng::seed_from_u64(5);
    for _ in 0..5 {
        let graph = random_grid(&mut rng, 6, 6, 0.2);
        let start = loc(rng.gen_range(0..6), rng.gen_range(0..6));
        let goal = loc(rng.gen_range(0..6), rng.gen_range(0..6));

        for (mut stepped, mut full) in all_algorithms().into_iter().zip(all_algorithms()) {
            let mut task = stepped.new_task(&graph, start, goal).unwrap();
            while stepped.advance(&graph, &mut task).unwrap() == TaskStatus::Running {}
            let expected = full.find_path(&graph, start, goal).unwrap();
            assert_eq!(task.path.as_ref(), Some(&expected), "{}", full.kind());
            assert_eq!(task.visited.as_slice(), full.visited(), "{}", full.kind());

            // further steps are no-ops
            assert_eq!(stepped.advance(&graph, &mut task), Ok(TaskStatus::Complete));
        }
    }
}

#[test]
fn test_disconnected_goal_is_unreachable_for_everyone() {
    let mut graph = Graph::new();
    for x in 0..4 {
        graph.add_node(Node::new(loc(x, 0))).unwrap();
    }
    graph.add_edge(loc(0, 0), loc(1, 0), 1.0).unwrap();
    graph.add_edge(loc(1, 0), loc(0, 0), 1.0).unwrap();
    graph.add_edge(loc(2, 0), loc(3, 0), 1.0).unwrap();

    for mut algorithm in all_algorithms() {
        assert_eq!(algorithm.find_path(&graph, loc(0, 0), loc(3, 0)), Ok(Vec::new()));
        assert!(algorithm.find_nearest_path(&graph, loc(0, 0), loc(3, 0)).is_empty());
        assert_eq!(algorithm.outcome(), &Outcome::Unreachable, "{}", algorithm.kind());
    }
}

#[test]
fn test_missing_endpoint_is_a_lookup_failure() {
    let graph = Graph::grid(3, 3, 1.0);
    for mut algorithm in all_algorithms() {
        let path = algorithm.find_nearest_path(&graph, loc(0, 0), loc(3, 3));
        assert!(path.is_empty());
        assert_eq!(
            algorithm.outcome(),
            &Outcome::Failed(SearchError::NodeNotFound(loc(3, 3))),
            "{}",
            algorithm.kind()
        );
        assert!(!algorithm.outcome().is_invariant_violation());
        assert!(algorithm.path_flow_graph(&graph, loc(-1, 0)).is_empty());
    }
}

/// Dijkstra whose goal provenance is overwritten before every step, as a
/// relaxation bookkeeping bug would.
#[derive(Default)]
struct ForgetfulDijkstra {
    inner: Dijkstra,
    trace: SearchTrace,
}

impl PathfindingAlgorithm for ForgetfulDijkstra {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::Dijkstra
    }

    fn description(&self) -> &'static str {
        "Dijkstra that forgets where the goal came from"
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        if let Some(previous) = task.came_from.get_mut(&task.goal) {
            *previous = Some(Location::new(50, 50));
        }
        self.inner.advance(graph, task)
    }
}

#[test]
fn test_lost_provenance_is_reported_distinctly_from_unreachable() {
    let graph = Graph::grid(4, 4, 1.0);
    let mut algorithm = ForgetfulDijkstra::default();
    let err = algorithm.find_path(&graph, loc(0, 0), loc(3, 3)).unwrap_err();
    assert_eq!(err, SearchError::MissingPredecessor(loc(50, 50)));

    assert!(algorithm.find_nearest_path(&graph, loc(0, 0), loc(3, 3)).is_empty());
    assert!(algorithm.outcome().is_invariant_violation());
    assert!(!algorithm.outcome().is_unreachable());
}

#[test]
fn test_flow_maps_are_shortest_path_trees() {
    let mut rng = StdRng::seed_from_u64(31);
    let graph = random_grid(&mut rng, 6, 6, 0.1);
    let start = loc(2, 3);
    let config = SearchConfig::default();

    for kind in [AlgorithmKind::Dijkstra, AlgorithmKind::AStar] {
        let algorithm = create_algorithm(kind, &config);
        assert!(algorithm.supports_flow_map());
        let flow = algorithm.flow_map(&graph, start).unwrap();
        assert_eq!(flow.get(&start), Some(&start));
        for &to in flow.keys() {
            // following the tree back to the start costs the optimum
            let mut path = vec![to];
            let mut current = to;
            while current != start {
                current = flow[&current];
                path.push(current);
            }
            path.reverse();
            assert_eq!(graph.path_cost(&path), reference_path_cost(&graph, start, to), "{} {}", kind, to);
        }
    }

    for kind in [AlgorithmKind::GreedyBestFirst, AlgorithmKind::LpaStar] {
        let algorithm = create_algorithm(kind, &config);
        assert!(!algorithm.supports_flow_map());
        assert!(algorithm.path_flow_graph(&graph, start).is_empty());
    }
}
