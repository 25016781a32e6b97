use crate::error::SearchError;
use rustc_hash::FxHashMap;
use std::fmt;
use std::str::FromStr;

/// Edge weight. Negative values mark an edge as impassable.
pub type Cost = f64;

/// Cost of an ordinary grid step.
pub const DEFAULT_COST: Cost = 1.0;

/// Cost a toggled cell switches to (slow terrain).
pub const DEFAULT_PENALTY: Cost = 5.0;

/// Sentinel cost for a blocked edge.
pub const BLOCKED: Cost = -1.0;

/// 4-connected neighbourhood in the order edges are added: right, left, down, up.
const GRID_DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Integer grid coordinate; the identity of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Location { x, y }
    }

    pub fn manhattan(self, other: Location) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn offset(self, dx: i32, dy: i32) -> Location {
        Location::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected `x,y`, got `{}`", s))?;
        let x = x.trim().parse().map_err(|_| format!("bad x coordinate in `{}`", s))?;
        let y = y.trim().parse().map_err(|_| format!("bad y coordinate in `{}`", s))?;
        Ok(Location { x, y })
    }
}

/// Directed edge to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    target: Location,
    pub cost: Cost,
}

impl Edge {
    pub fn target(&self) -> Location {
        self.target
    }

    pub fn is_passable(&self) -> bool {
        self.cost >= 0.0
    }
}

/// A graph node with its outgoing edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    location: Location,
    edges: Vec<Edge>,
}

impl Node {
    pub fn new(location: Location) -> Self {
        Node {
            location,
            edges: Vec::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }
}

/// Owns every node and edge. Algorithms borrow it per query; only edge
/// costs may change between queries.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    index: FxHashMap<Location, usize>,
    // target -> sources with an edge into it, in insertion order
    incoming: FxHashMap<Location, Vec<Location>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a `width` x `height` 4-connected grid where every cell links
    /// to each in-bounds neighbour in both directions with `cost`.
    pub fn grid(width: i32, height: i32, cost: Cost) -> Self {
        let mut graph = Graph::new();
        for y in 0..height {
            for x in 0..width {
                graph.push_node(Node::new(Location::new(x, y)));
            }
        }

        for y in 0..height {
            for x in 0..width {
                let here = Location::new(x, y);
                for (dx, dy) in GRID_DIRECTIONS {
                    let next = here.offset(dx, dy);
                    if next.x >= 0 && next.x < width && next.y >= 0 && next.y < height {
                        graph.push_edge(here, next, cost);
                    }
                }
            }
        }
        graph
    }

    /// Inserts `node`. Fails if its location is already taken.
    pub fn add_node(&mut self, node: Node) -> Result<(), SearchError> {
        if self.index.contains_key(&node.location) {
            return Err(SearchError::DuplicateNode(node.location));
        }
        self.push_node(node);
        Ok(())
    }

    /// Appends a directed edge `from -> to`. The reverse edge is not added.
    pub fn add_edge(&mut self, from: Location, to: Location, cost: Cost) -> Result<(), SearchError> {
        if !self.contains(to) {
            return Err(SearchError::NodeNotFound(to));
        }
        if !self.contains(from) {
            return Err(SearchError::NodeNotFound(from));
        }
        self.push_edge(from, to, cost);
        Ok(())
    }

    pub fn node(&self, location: Location) -> Option<&Node> {
        self.index.get(&location).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, location: Location) -> bool {
        self.index.contains_key(&location)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn locations(&self) -> impl Iterator<Item = Location> + '_ {
        self.nodes.iter().map(|n| n.location)
    }

    /// Targets of every outgoing edge of `location`, passable or not.
    pub fn neighbors(&self, location: Location) -> impl Iterator<Item = Location> + '_ {
        self.node(location)
            .into_iter()
            .flat_map(|node| node.edges.iter().map(|e| e.target))
    }

    /// Sources of every edge that ends at `location`.
    pub fn predecessors(&self, location: Location) -> &[Location] {
        self.incoming
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First edge `from -> to`. Parallel edges after it are not seen here;
    /// use [`Graph::edge_cost`] when the cheapest one matters.
    pub fn edge(&self, from: Location, to: Location) -> Option<&Edge> {
        self.node(from)?.edges.iter().find(|e| e.target == to)
    }

    /// Cheapest passable cost over all parallel edges `from -> to`.
    pub fn edge_cost(&self, from: Location, to: Location) -> Option<Cost> {
        self.node(from)?
            .edges
            .iter()
            .filter(|e| e.target == to && e.is_passable())
            .map(|e| e.cost)
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Mutable access for in-place cost edits.
    pub fn edge_mut(&mut self, from: Location, to: Location) -> Option<&mut Edge> {
        let i = *self.index.get(&from)?;
        self.nodes[i].edges.iter_mut().find(|e| e.target == to)
    }

    /// Sets the cost of `from -> to`, returning the previous cost.
    pub fn set_edge_cost(&mut self, from: Location, to: Location, cost: Cost) -> Result<Cost, SearchError> {
        let edge = self
            .edge_mut(from, to)
            .ok_or(SearchError::EdgeNotFound { from, to })?;
        let old = edge.cost;
        edge.cost = cost;
        Ok(old)
    }

    /// Sets the cost of stepping into `location` from any neighbour.
    /// Returns the `(from, to)` pairs whose cost actually changed.
    pub fn set_cell_cost(&mut self, location: Location, cost: Cost) -> Result<Vec<(Location, Location)>, SearchError> {
        self.edit_cell(location, |_| cost)
    }

    /// Flips every edge into `location` between [`DEFAULT_COST`] and `penalty`.
    pub fn toggle_cell_cost(&mut self, location: Location, penalty: Cost) -> Result<Vec<(Location, Location)>, SearchError> {
        self.edit_cell(location, |old| if old == DEFAULT_COST { penalty } else { DEFAULT_COST })
    }

    /// Total edge cost along `path`, or `None` if a hop is missing or
    /// impassable.
    pub fn path_cost(&self, path: &[Location]) -> Option<Cost> {
        if path.is_empty() {
            return None;
        }
        path.windows(2)
            .try_fold(0.0, |total, hop| Some(total + self.edge_cost(hop[0], hop[1])?))
    }

    fn edit_cell<F>(&mut self, location: Location, new_cost: F) -> Result<Vec<(Location, Location)>, SearchError>
    where
        F: Fn(Cost) -> Cost,
    {
        if !self.contains(location) {
            return Err(SearchError::NodeNotFound(location));
        }
        let sources = self.predecessors(location).to_vec();
        let mut changed = Vec::new();
        for from in sources {
            let Some(&i) = self.index.get(&from) else {
                continue;
            };
            let mut touched = false;
            for edge in self.nodes[i].edges.iter_mut().filter(|e| e.target == location) {
                let cost = new_cost(edge.cost);
                if cost != edge.cost {
                    edge.cost = cost;
                    touched = true;
                }
            }
            if touched {
                changed.push((from, location));
            }
        }
        Ok(changed)
    }

    fn push_node(&mut self, node: Node) {
        for edge in &node.edges {
            let sources = self.incoming.entry(edge.target).or_default();
            if !sources.contains(&node.location) {
                sources.push(node.location);
            }
        }
        self.index.insert(node.location, self.nodes.len());
        self.nodes.push(node);
    }

    fn push_edge(&mut self, from: Location, to: Location, cost: Cost) {
        if let Some(&i) = self.index.get(&from) {
            self.nodes[i].edges.push(Edge { target: to, cost });
            let sources = self.incoming.entry(to).or_default();
            if !sources.contains(&from) {
                sources.push(from);
            }
        }
    }
}
