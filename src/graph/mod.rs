//! The graph core shared by every model
//!
//! A `Graph` is a registry of nodes (random variables) and typed edges keyed by id, plus a dense
//! adjacency index over the nodes that the analysis routines in `analysis` work on.

pub mod analysis;
mod edge;

pub use self::edge::{Edge, EdgeKind};

use bidir_map::BidirMap;
use indexmap::IndexMap;

use crate::error::{PgmError, Result};
use crate::variable::Var;


/// Anything that exposes a `Graph`
pub trait GraphLike {

    fn graph(&self) -> &Graph;

    /// Look up a node by id
    fn node(&self, id: &str) -> Option<&Var> {
        self.graph().node(id)
    }

    /// The number of nodes
    fn order(&self) -> usize {
        self.graph().order()
    }

    /// A graph is trivial if it has at most one node
    fn is_trivial(&self) -> bool {
        self.graph().is_trivial()
    }

    fn neighbours_of(&self, id: &str) -> Vec<&str> {
        self.graph().neighbours_of(id)
    }

    fn is_neighbour_of(&self, a: &str, b: &str) -> bool {
        self.graph().is_neighbour_of(a, b)
    }

}


#[derive(Clone, Debug)]
pub struct Graph {
    id: String,

    /// Nodes by id, in insertion order
    nodes: IndexMap<String, Var>,

    /// Edges by id, in insertion order
    edges: IndexMap<String, Edge>,

    /// Node id <-> position in `adjacency`
    index: BidirMap<String, usize>,

    /// For every node, the (neighbour, edge position) pairs of its incident edges
    adjacency: Vec<Vec<(usize, usize)>>
}

impl GraphLike for Graph {
    fn graph(&self) -> &Graph {
        self
    }
}

impl Graph {

    /// Create a new `Graph`
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if a node or edge id is used twice, an edge references
    ///   a node outside the graph, or an edge is a self loop
    pub fn new(id: &str, nodes: Vec<Var>, edges: Vec<Edge>) -> Result<Self> {
        let mut node_map: IndexMap<String, Var> = IndexMap::new();
        for v in nodes {
            if node_map.contains_key(v.id()) {
                return Err(PgmError::StructuralValidation(format!("node {} declared twice", v.id())));
            }
            node_map.insert(String::from(v.id()), v);
        }

        let mut edge_map: IndexMap<String, Edge> = IndexMap::new();
        for e in edges {
            if edge_map.contains_key(e.id()) {
                return Err(PgmError::StructuralValidation(format!("edge {} declared twice", e.id())));
            }

            for end in &[e.start(), e.end()] {
                if ! node_map.contains_key(*end) {
                    return Err(PgmError::StructuralValidation(
                        format!("edge {} references unknown node {}", e.id(), end)
                    ));
                }
            }

            if e.start() == e.end() {
                return Err(PgmError::StructuralValidation(format!("edge {} is a self loop", e.id())));
            }

            edge_map.insert(String::from(e.id()), e);
        }

        Ok(Graph::assemble(id, node_map, edge_map))
    }


    /// Build the adjacency index over already validated registries
    fn assemble(id: &str, nodes: IndexMap<String, Var>, edges: IndexMap<String, Edge>) -> Self {
        let mut index = BidirMap::new();
        for (i, k) in nodes.keys().enumerate() {
            index.insert(k.clone(), i);
        }

        let mut adjacency = vec![Vec::new(); nodes.len()];
        for (pos, e) in edges.values().enumerate() {
            if let (Some(s), Some(t)) = (nodes.get_index_of(e.start()), nodes.get_index_of(e.end())) {
                adjacency[s].push((t, pos));
                adjacency[t].push((s, pos));
            }
        }

        Graph { id: String::from(id), nodes, edges, index, adjacency }
    }


    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node(&self, id: &str) -> Option<&Var> {
        self.nodes.get(id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Var> {
        self.nodes.values()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|k| k.as_str())
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The number of nodes
    pub fn order(&self) -> usize {
        self.nodes.len()
    }

    /// The number of edges
    pub fn size(&self) -> usize {
        self.edges.len()
    }

    pub fn is_trivial(&self) -> bool {
        self.order() <= 1
    }

    /// Dense position of a node, as used by `analysis`
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get_by_first(&String::from(id)).cloned()
    }

    /// Node id at a dense position
    pub fn node_at(&self, idx: usize) -> Option<&str> {
        self.index.get_by_second(&idx).map(|k| k.as_str())
    }

    /// (neighbour position, edge position) pairs of every edge incident to the node at `idx`
    pub fn incident(&self, idx: usize) -> &[(usize, usize)] {
        self.adjacency.get(idx).map(|a| a.as_slice()).unwrap_or(&[])
    }

    /// Every node joined to `id` by an edge of any kind, in graph order
    pub fn neighbours_of(&self, id: &str) -> Vec<&str> {
        let idx = match self.index_of(id) {
            Some(idx) => idx,
            None => return vec![]
        };

        let mut found: Vec<usize> = self.incident(idx).iter().map(|&(n, _)| n).collect();
        found.sort();
        found.dedup();
        found.into_iter().filter_map(|n| self.node_at(n)).collect()
    }

    pub fn is_neighbour_of(&self, a: &str, b: &str) -> bool {
        self.edge_between(a, b).is_some()
    }

    /// The first edge joining `a` and `b`, in either orientation
    pub fn edge_between(&self, a: &str, b: &str) -> Option<&Edge> {
        self.edges.values().find(|e| e.connects(a, b))
    }

    /// Tails of the directed edges pointing at `id`
    pub fn parents_of(&self, id: &str) -> Vec<&str> {
        self.edges.values()
            .filter(|e| e.is_directed() && e.end() == id)
            .map(|e| e.start())
            .collect()
    }

    /// Heads of the directed edges leaving `id`
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.edges.values()
            .filter(|e| e.is_directed() && e.start() == id)
            .map(|e| e.end())
            .collect()
    }

    /// Check if every edge is directed
    pub fn is_directed(&self) -> bool {
        self.edges.values().all(|e| e.is_directed())
    }

    /// Check if every edge is undirected
    pub fn is_undirected(&self) -> bool {
        self.edges.values().all(|e| ! e.is_directed())
    }

    /// The subgraph induced by `ids`. Unknown ids are ignored.
    pub fn subgraph(&self, id: &str, ids: &[&str]) -> Graph {
        let nodes: IndexMap<String, Var> = self.nodes.iter()
            .filter(|(k, _)| ids.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let edges: IndexMap<String, Edge> = self.edges.iter()
            .filter(|(_, e)| nodes.contains_key(e.start()) && nodes.contains_key(e.end()))
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();

        Graph::assemble(id, nodes, edges)
    }

    /// The same nodes with only the undirected edges
    pub fn undirected_part(&self) -> Graph {
        let edges = self.edges.iter()
            .filter(|(_, e)| ! e.is_directed())
            .map(|(k, e)| (k.clone(), e.clone()))
            .collect();

        Graph::assemble(&self.id, self.nodes.clone(), edges)
    }

}
