//! Typed edges between the nodes of a `Graph`

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Directed,
    Undirected
}


/// An edge between two nodes, referenced by their ids. For a directed edge `start` is the tail
/// (the parent) and `end` the head (the child).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    id: String,
    kind: EdgeKind,
    start: String,
    end: String
}

impl Edge {

    pub fn new(id: &str, kind: EdgeKind, start: &str, end: &str) -> Self {
        Edge {
            id: String::from(id),
            kind,
            start: String::from(start),
            end: String::from(end)
        }
    }

    /// A directed edge `start -> end` with the id `"start->end"`
    pub fn directed(start: &str, end: &str) -> Self {
        Edge::new(&format!("{}->{}", start, end), EdgeKind::Directed, start, end)
    }

    /// An undirected edge `a -- b` with the id `"a--b"`
    pub fn undirected(a: &str, b: &str) -> Self {
        Edge::new(&format!("{}--{}", a, b), EdgeKind::Undirected, a, b)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn is_directed(&self) -> bool {
        self.kind == EdgeKind::Directed
    }

    /// Check if the edge joins `a` and `b`, in either orientation
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    /// The endpoint opposite `node`, if `node` is an endpoint
    pub fn other(&self, node: &str) -> Option<&str> {
        if self.start == node {
            Some(&self.end)
        } else if self.end == node {
            Some(&self.start)
        } else {
            None
        }
    }

    /// The same edge with its direction dropped. The id is kept.
    pub fn to_undirected(&self) -> Edge {
        Edge { kind: EdgeKind::Undirected, ..self.clone() }
    }

}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            EdgeKind::Directed => write!(f, "{} -> {}", self.start, self.end),
            EdgeKind::Undirected => write!(f, "{} -- {}", self.start, self.end)
        }
    }
}
