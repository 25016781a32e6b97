use crate::algorithms::AlgorithmKind;
use crate::error::SearchError;
use crate::frontier::{Frontier, Order};
use crate::graph::{Cost, Graph, Location, Node};
use rustc_hash::FxHashMap;

/// Locations from start to goal inclusive; empty when there is no path.
pub type Path = Vec<Location>;

/// Every reached location mapped to the location it was discovered from.
/// The source maps to itself.
pub type FlowMap = FxHashMap<Location, Location>;

/// Predecessor of each discovered location; `None` only for the start.
pub type CameFrom = FxHashMap<Location, Option<Location>>;

/// Frontier priority: the ordering cost first, then the accumulated straight
/// bias, which only decides between equal costs.
pub type Priority = (Cost, Cost);

/// How the most recent query ended.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Outcome {
    #[default]
    NotRun,
    Found { length: usize },
    Unreachable,
    Failed(SearchError),
}

impl Outcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found { .. })
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, Outcome::Unreachable)
    }

    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Outcome::Failed(err) if err.is_invariant_violation())
    }
}

/// Diagnostics kept by an algorithm instance for its last query.
#[derive(Debug, Clone, Default)]
pub struct SearchTrace {
    /// Locations in the order they were expanded.
    pub visited: Vec<Location>,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Complete,
}

/// Everything a stepwise search needs between calls to
/// [`PathfindingAlgorithm::advance`].
#[derive(Debug, Clone)]
pub struct SearchTask {
    pub start: Location,
    pub goal: Location,
    pub came_from: CameFrom,
    pub cost_so_far: FxHashMap<Location, Cost>,
    /// Straight bias summed along the path to each location. Kept apart from
    /// `cost_so_far` so it can never outweigh a real cost difference.
    pub bias_so_far: FxHashMap<Location, Cost>,
    pub frontier: Frontier<Location, Priority>,
    pub visited: Vec<Location>,
    /// Set once the task completes; empty if the goal was unreachable.
    pub path: Option<Path>,
}

impl SearchTask {
    /// A task with `start` discovered at cost 0 and queued.
    pub fn new(graph: &Graph, start: Location, goal: Location, order: Order) -> Result<Self, SearchError> {
        let mut task = Self::bare(graph, start, goal, order)?;
        task.came_from.insert(start, None);
        task.cost_so_far.insert(start, 0.0);
        task.bias_so_far.insert(start, 0.0);
        task.frontier.put(start, (0.0, 0.0));
        Ok(task)
    }

    /// A task with nothing discovered yet.
    pub fn bare(graph: &Graph, start: Location, goal: Location, order: Order) -> Result<Self, SearchError> {
        if !graph.contains(start) {
            return Err(SearchError::NodeNotFound(start));
        }
        if !graph.contains(goal) {
            return Err(SearchError::NodeNotFound(goal));
        }
        Ok(SearchTask {
            start,
            goal,
            came_from: CameFrom::default(),
            cost_so_far: FxHashMap::default(),
            bias_so_far: FxHashMap::default(),
            frontier: Frontier::new(order),
            visited: Vec::new(),
            path: None,
        })
    }

    pub fn is_complete(&self) -> bool {
        self.path.is_some()
    }

    pub fn take_path(&mut self) -> Path {
        self.path.take().unwrap_or_default()
    }
}

/// Common interface of the search strategies.
///
/// Algorithms borrow the graph for the duration of each call; the caller may
/// edit edge costs between calls but never during one.
pub trait PathfindingAlgorithm {
    fn kind(&self) -> AlgorithmKind;

    /// One-line human-readable summary.
    fn description(&self) -> &'static str;

    fn trace(&self) -> &SearchTrace;

    fn trace_mut(&mut self) -> &mut SearchTrace;

    /// Creates the stepwise record for a query.
    fn new_task(&self, graph: &Graph, start: Location, goal: Location) -> Result<SearchTask, SearchError> {
        SearchTask::new(graph, start, goal, Order::Ascending)
    }

    /// Performs one frontier pop. Repeating this until it returns
    /// [`TaskStatus::Complete`] is exactly what [`find_path`] does.
    ///
    /// [`find_path`]: PathfindingAlgorithm::find_path
    fn advance(&mut self, graph: &Graph, task: &mut SearchTask) -> Result<TaskStatus, SearchError>;

    /// Runs a full query. Unreachable goals give `Ok` with an empty path.
    fn find_path(&mut self, graph: &Graph, start: Location, goal: Location) -> Result<Path, SearchError> {
        self.trace_mut().visited.clear();
        let mut task = self.new_task(graph, start, goal)?;
        let result = loop {
            match self.advance(graph, &mut task) {
                Ok(TaskStatus::Running) => {}
                Ok(TaskStatus::Complete) => break Ok(task.take_path()),
                Err(err) => break Err(err),
            }
        };
        self.trace_mut().visited = std::mem::take(&mut task.visited);
        result
    }

    /// Runs a full query and never fails: errors become an empty path and
    /// are kept in [`SearchTrace::outcome`].
    fn find_nearest_path(&mut self, graph: &Graph, start: Location, goal: Location) -> Path {
        let kind = self.kind();
        match self.find_path(graph, start, goal) {
            Ok(path) => {
                log::debug!(
                    "{}: {} -> {} gave {} nodes after {} expansions",
                    kind,
                    start,
                    goal,
                    path.len(),
                    self.trace().visited.len()
                );
                self.trace_mut().outcome = if path.is_empty() {
                    Outcome::Unreachable
                } else {
                    Outcome::Found { length: path.len() }
                };
                path
            }
            Err(err) => {
                if err.is_invariant_violation() {
                    log::error!("{}: {} -> {}: {}", kind, start, goal, err);
                } else {
                    log::warn!("{}: {} -> {}: {}", kind, start, goal, err);
                }
                self.trace_mut().outcome = Outcome::Failed(err);
                Vec::new()
            }
        }
    }

    /// Locations expanded by the last query, in order.
    fn visited(&self) -> &[Location] {
        &self.trace().visited
    }

    fn outcome(&self) -> &Outcome {
        &self.trace().outcome
    }

    fn supports_flow_map(&self) -> bool {
        false
    }

    /// Full discovery tree from `start`.
    fn flow_map(&self, _graph: &Graph, _start: Location) -> Result<FlowMap, SearchError> {
        Ok(FlowMap::default())
    }

    /// [`flow_map`] with errors logged and turned into an empty map.
    ///
    /// [`flow_map`]: PathfindingAlgorithm::flow_map
    fn path_flow_graph(&self, graph: &Graph, start: Location) -> FlowMap {
        self.flow_map(graph, start).unwrap_or_else(|err| {
            log::warn!("{}: flow map from {}: {}", self.kind(), start, err);
            FlowMap::default()
        })
    }
}

/// Manhattan distance as a cost.
///
/// Only a lower bound on the remaining cost when every passable edge costs
/// at least 1. Graphs with cheaper edges should scale it down, see
/// [`SearchConfig::min_edge_cost`](crate::config::SearchConfig::min_edge_cost).
pub fn heuristic(from: Location, to: Location) -> Cost {
    from.manhattan(to) as Cost
}

/// The alternating-direction bias of one step: horizontal steps out of cells
/// with even `x + y` and vertical steps out of odd cells pay `bias`.
pub fn step_bias(from: Location, to: Location, bias: Cost) -> Cost {
    let horizontal = from.y == to.y && from.x != to.x;
    let vertical = from.x == to.x && from.y != to.y;
    let even = (from.x + from.y).rem_euclid(2) == 0;
    if (even && horizontal) || (!even && vertical) {
        bias
    } else {
        0.0
    }
}

/// Walks `came_from` back from `goal` to `start` and returns the path in
/// start-to-goal order.
pub fn backtrack_path(came_from: &CameFrom, start: Location, goal: Location) -> Result<Path, SearchError> {
    let mut path = vec![goal];
    let mut current = goal;
    while current != start {
        match came_from.get(&current) {
            Some(Some(previous)) => current = *previous,
            _ => return Err(SearchError::MissingPredecessor(current)),
        }
        path.push(current);
        if path.len() > came_from.len() + 1 {
            return Err(SearchError::PathCycle(path.len()));
        }
    }
    path.reverse();
    Ok(path)
}

/// Pops one location and hands its node to `relax`, finishing the task
/// when the goal is popped or the frontier runs dry.
pub(crate) fn expand<F>(graph: &Graph, task: &mut SearchTask, relax: F) -> Result<TaskStatus, SearchError>
where
    F: FnOnce(&mut SearchTask, &Node) -> Result<(), SearchError>,
{
    if task.is_complete() {
        return Ok(TaskStatus::Complete);
    }
    let Some(current) = task.frontier.get() else {
        task.path = Some(Vec::new());
        return Ok(TaskStatus::Complete);
    };
    if current == task.goal {
        task.frontier.clear();
        task.path = Some(backtrack_path(&task.came_from, task.start, task.goal)?);
        return Ok(TaskStatus::Complete);
    }

    task.visited.push(current);
    let node = graph
        .node(current)
        .ok_or(SearchError::NodeNotFound(current))?;
    relax(task, node)?;
    Ok(TaskStatus::Running)
}

/// Cost-aware relaxation shared by Dijkstra and A*: a neighbour is updated
/// when undiscovered or reached more cheaply, and queued at its new cost
/// plus `estimate(neighbour)`. The straight bias is compared only between
/// equal costs.
pub(crate) fn relax_weighted<H>(task: &mut SearchTask, node: &Node, bias: Cost, estimate: H) -> Result<(), SearchError>
where
    H: Fn(Location) -> Cost,
{
    let current = node.location();
    let base = *task
        .cost_so_far
        .get(&current)
        .ok_or(SearchError::MissingCost(current))?;
    let base_bias = task.bias_so_far.get(&current).copied().unwrap_or_default();

    for edge in node.edges().iter().filter(|e| e.is_passable()) {
        let next = edge.target();
        let new_cost = base + edge.cost;
        let new_bias = base_bias + step_bias(current, next, bias);
        let improved = match task.cost_so_far.get(&next) {
            None => true,
            Some(&known) => {
                let known_bias = task.bias_so_far.get(&next).copied().unwrap_or_default();
                new_cost < known || (new_cost == known && new_bias < known_bias)
            }
        };
        if improved {
            task.cost_so_far.insert(next, new_cost);
            task.bias_so_far.insert(next, new_bias);
            task.came_from.insert(next, Some(current));
            task.frontier.put(next, (new_cost + estimate(next), new_bias));
        }
    }
    Ok(())
}

/// Drains a task seeded at its start without ever stopping at a goal and
/// turns its `came_from` into a flow map.
pub(crate) fn flow_tree<F>(graph: &Graph, start: Location, order: Order, mut relax: F) -> Result<FlowMap, SearchError>
where
    F: FnMut(&mut SearchTask, &Node) -> Result<(), SearchError>,
{
    let mut task = SearchTask::new(graph, start, start, order)?;
    while let Some(current) = task.frontier.get() {
        let node = graph
            .node(current)
            .ok_or(SearchError::NodeNotFound(current))?;
        relax(&mut task, node)?;
    }
    Ok(task
        .came_from
        .into_iter()
        .map(|(to, from)| (to, from.unwrap_or(start)))
        .collect())
}
