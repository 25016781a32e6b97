use crate::algorithms::common::{
    heuristic, Path, PathfindingAlgorithm, SearchTask, SearchTrace, TaskStatus,
};
use crate::algorithms::AlgorithmKind;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::frontier::{Frontier, Order};
use crate::graph::{Cost, Graph, Location, DEFAULT_COST};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

/// Priority of an inconsistent node. Compared lexicographically, so `k2`
/// only breaks ties on `k1`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Key {
    pub k1: Cost,
    pub k2: Cost,
}

/// What one pop of the frontier did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The node was made consistent (or raised to infinity) and its
    /// successors were updated.
    Expanded(Location),
    /// The node's key had gone stale and it was queued again.
    Requeued(Location),
    /// The goal is consistent and nothing cheaper is queued.
    Converged,
}

/// Implements Lifelong Planning A* after the 2004 paper by S. Koenig,
/// M. Likhachev and D. Furcy.
///
/// `g` and `rhs` survive between queries with the same endpoints. After
/// editing edge costs, report the edits through [`LpaStar::edge_changed`]
/// and query again: only the affected region is re-relaxed. Costs are read
/// over incoming edges, so directed graphs with asymmetric costs are handled.
/// Of several parallel edges the cheapest passable one counts.
#[derive(Debug)]
pub struct LpaStar {
    heuristic_scale: Cost,
    g: FxHashMap<Location, Cost>,
    rhs: FxHashMap<Location, Cost>,
    frontier: Frontier<Location, Key>,
    start: Option<Location>,
    goal: Option<Location>,
    trace: SearchTrace,
}

impl Default for LpaStar {
    fn default() -> Self {
        Self::new()
    }
}

impl LpaStar {
    pub fn new() -> Self {
        LpaStar {
            heuristic_scale: DEFAULT_COST,
            g: FxHashMap::default(),
            rhs: FxHashMap::default(),
            frontier: Frontier::new(Order::Ascending),
            start: None,
            goal: None,
            trace: SearchTrace::default(),
        }
    }

    /// Scales the Manhattan estimate by `config.min_edge_cost`.
    pub fn with_config(config: &SearchConfig) -> Self {
        LpaStar {
            heuristic_scale: config.min_edge_cost,
            ..Self::new()
        }
    }

    /// The endpoints the state was built for, if any.
    pub fn endpoints(&self) -> Option<(Location, Location)> {
        self.start.zip(self.goal)
    }

    pub fn g(&self, location: Location) -> Cost {
        self.g.get(&location).copied().unwrap_or(Cost::INFINITY)
    }

    pub fn rhs(&self, location: Location) -> Cost {
        self.rhs.get(&location).copied().unwrap_or(Cost::INFINITY)
    }

    pub fn is_consistent(&self, location: Location) -> bool {
        self.g(location) == self.rhs(location)
    }

    /// Number of locally inconsistent nodes waiting in the frontier.
    pub fn pending(&self) -> usize {
        self.frontier.len()
    }

    /// Corresponds to `CalculateKey(s)` in the paper.
    pub fn calculate_key(&self, location: Location) -> Key {
        let best = self.g(location).min(self.rhs(location));
        let h = self
            .goal
            .map_or(0.0, |goal| self.heuristic_scale * heuristic(location, goal));
        // {01}
        Key { k1: best + h, k2: best }
    }

    /// Corresponds to `Initialize()` in the paper.
    pub fn initialize(&mut self, graph: &Graph, start: Location, goal: Location) -> Result<(), SearchError> {
        if !graph.contains(start) {
            return Err(SearchError::NodeNotFound(start));
        }
        if !graph.contains(goal) {
            return Err(SearchError::NodeNotFound(goal));
        }
        self.start = Some(start);
        self.goal = Some(goal);

        // {02}
        self.frontier.clear();
        // {03}
        self.g.clear();
        self.rhs.clear();
        for location in graph.locations() {
            self.g.insert(location, Cost::INFINITY);
            self.rhs.insert(location, Cost::INFINITY);
        }
        // {04}
        self.rhs.insert(start, 0.0);
        // {05}
        let key = self.calculate_key(start);
        self.frontier.put(start, key);
        log::debug!("lpa_star: initialised {} -> {} over {} nodes", start, goal, graph.len());
        Ok(())
    }

    /// Forgets all state; the next query starts from scratch.
    pub fn reset(&mut self) {
        self.g.clear();
        self.rhs.clear();
        self.frontier.clear();
        self.start = None;
        self.goal = None;
    }

    /// Corresponds to `UpdateVertex(u)` in the paper. Does nothing before
    /// the first query.
    pub fn update_vertex(&mut self, graph: &Graph, u: Location) {
        let Some(start) = self.start else {
            return;
        };

        // {06}
        if u != start {
            let best = graph
                .predecessors(u)
                .iter()
                .filter_map(|&p| Some(self.g(p) + graph.edge_cost(p, u)?))
                .fold(Cost::INFINITY, Cost::min);
            self.rhs.insert(u, best);
        }

        // {07} - {08}
        if self.is_consistent(u) {
            self.frontier.remove(&u);
        } else {
            let key = self.calculate_key(u);
            self.frontier.update(u, key);
        }
    }

    /// Reports that the cost of the edge `from -> to` was changed on the
    /// graph. Corresponds to line {20} of the paper.
    pub fn edge_changed(&mut self, graph: &Graph, from: Location, to: Location) {
        self.update_vertex(graph, from);
        self.update_vertex(graph, to);
    }

    /// [`LpaStar::edge_changed`] for every pair, e.g. the list returned by
    /// [`Graph::set_cell_cost`].
    pub fn edges_changed(&mut self, graph: &Graph, edges: &[(Location, Location)]) {
        for &(from, to) in edges {
            self.edge_changed(graph, from, to);
        }
    }

    /// Performs a single iteration of `ComputeShortestPath()`.
    pub fn compute_step(&mut self, graph: &Graph) -> Step {
        let Some(goal) = self.goal else {
            return Step::Converged;
        };

        // {09}
        let goal_key = self.calculate_key(goal);
        let top_key = match self.frontier.peek() {
            Some((_, key)) if key < goal_key || !self.is_consistent(goal) => key,
            _ => return Step::Converged,
        };

        // {10}
        let Some(u) = self.frontier.get() else {
            return Step::Converged;
        };
        let fresh_key = self.calculate_key(u);
        if top_key < fresh_key {
            self.frontier.put(u, fresh_key);
            return Step::Requeued(u);
        }

        let g_u = self.g(u);
        let rhs_u = self.rhs(u);
        if g_u > rhs_u {
            // {11} - {13} over-consistent
            self.g.insert(u, rhs_u);
            for s in graph.neighbors(u) {
                self.update_vertex(graph, s);
            }
        } else {
            // {14} - {15} under-consistent
            self.g.insert(u, Cost::INFINITY);
            self.update_vertex(graph, u);
            for s in graph.neighbors(u) {
                self.update_vertex(graph, s);
            }
        }
        Step::Expanded(u)
    }

    /// Runs `ComputeShortestPath()` to convergence and returns the number of
    /// nodes expanded.
    pub fn compute_shortest_path(&mut self, graph: &Graph) -> usize {
        let mut expanded = 0;
        loop {
            match self.compute_step(graph) {
                Step::Expanded(_) => expanded += 1,
                Step::Requeued(_) => {}
                Step::Converged => break,
            }
        }
        log::debug!("lpa_star: converged after {} expansions", expanded);
        expanded
    }

    /// Searches back from the goal over tight edges, those with
    /// `g(p) + c(p, current) == g(current)`, until the start is reached.
    /// Zero-cost edges can tie several predecessors, so a single greedy
    /// descent could circle; each location is entered at most once here.
    /// Only valid once converged.
    pub fn extract_path(&self, graph: &Graph) -> Result<Path, SearchError> {
        let Some((start, goal)) = self.endpoints() else {
            return Ok(Vec::new());
        };
        if self.g(goal).is_infinite() {
            return Ok(Vec::new());
        }

        let mut toward_goal: FxHashMap<Location, Location> = FxHashMap::default();
        let mut reached = FxHashSet::default();
        reached.insert(goal);
        let mut queue = VecDeque::from([goal]);
        while let Some(current) = queue.pop_front() {
            if current == start {
                break;
            }
            let g_current = self.g(current);
            let mut tight: Vec<(Location, Cost)> = graph
                .predecessors(current)
                .iter()
                .filter_map(|&p| {
                    let through = self.g(p) + graph.edge_cost(p, current)?;
                    (through.is_finite() && through <= g_current).then(|| (p, self.g(p)))
                })
                .collect();
            // closest to the start first
            tight.sort_by(|a, b| a.1.total_cmp(&b.1));
            for (p, _) in tight {
                if reached.insert(p) {
                    toward_goal.insert(p, current);
                    queue.push_back(p);
                }
            }
        }

        let mut path = vec![start];
        let mut current = start;
        while current != goal {
            current = *toward_goal
                .get(&current)
                .ok_or(SearchError::MissingPredecessor(current))?;
            path.push(current);
        }
        Ok(path)
    }
}

impl PathfindingAlgorithm for LpaStar {
    fn kind(&self) -> AlgorithmKind {
        AlgorithmKind::LpaStar
    }

    fn description(&self) -> &'static str {
        "Lifelong Planning A*: keeps g/rhs between queries and repairs only what edge-cost edits invalidate."
    }

    fn trace(&self) -> &SearchTrace {
        &self.trace
    }

    fn trace_mut(&mut self) -> &mut SearchTrace {
        &mut self.trace
    }

    /// The task only carries the endpoints; the search state lives on `self`.
    fn new_task(&self, graph: &Graph, start: Location, goal: Location) -> Result<SearchTask, SearchError> {
        SearchTask::bare(graph, start, goal, Order::Ascending)
    }

    /// Pops one node. Re-initialises first if the task's endpoints differ
    /// from the ones the current state was built for.
    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError> {
        if task.is_complete() {
            return Ok(TaskStatus::Complete);
        }
        if self.endpoints() != Some((task.start, task.goal)) {
            self.initialize(graph, task.start, task.goal)?;
        }

        match self.compute_step(graph) {
            Step::Expanded(location) => {
                task.visited.push(location);
                Ok(TaskStatus::Running)
            }
            Step::Requeued(_) => Ok(TaskStatus::Running),
            Step::Converged => {
                task.path = Some(self.extract_path(graph)?);
                Ok(TaskStatus::Complete)
            }
        }
    }
}
