//! Defines an `LwfChainGraph`, a model mixing directed and undirected edges under the
//! Lauritzen-Wermuth-Frydenberg interpretation.
//!
//! The connected components of the undirected part are the chain components. Edges inside a
//! component are undirected, edges between components are directed, and the components form a
//! DAG. Reference: Cowell, "Local Propagation in Conditional Gaussian Bayesian Networks" (2005).

use itertools::Itertools;
use tracing::debug;

use super::{ConditionalRandomField, MarkovNetwork, Model, Pgm};
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::{analysis, Edge, Graph, GraphLike};
use crate::variable::Var;


#[derive(Clone, Debug)]
pub struct LwfChainGraph {
    pgm: Pgm,

    /// The chain components in topological order, members sorted by id
    components: Vec<Vec<String>>
}


impl LwfChainGraph {

    /// Create a new `LwfChainGraph`
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if a directed edge joins two nodes of the same chain
    ///   component, the components do not form a DAG, or the factors do not fit the nodes
    pub fn new(id: &str, nodes: Vec<Var>, edges: Vec<Edge>, factors: Vec<Factor>) -> Result<Self> {
        LwfChainGraph::from_pgm(Pgm::new(id, nodes, edges, factors)?)
    }


    pub(crate) fn from_pgm(pgm: Pgm) -> Result<Self> {
        ///////////////////////////////////////////////////////////////////////
        // 1) Components of the undirected part, ordered by their smallest id
        let mut components: Vec<Vec<String>> = analysis::connected_components(&pgm.graph().undirected_part())
            .into_iter()
            .map(|c| c.into_iter().sorted().collect())
            .collect();
        components.sort();

        let component_of = |id: &str| components.iter().position(|c| c.iter().any(|m| m == id));

        ///////////////////////////////////////////////////////////////////////
        // 2) Directed edges run between components
        let mut arcs = Vec::new();
        for e in pgm.graph().edges().filter(|e| e.is_directed()) {
            match (component_of(e.start()), component_of(e.end())) {
                (Some(s), Some(t)) if s == t => {
                    return Err(PgmError::StructuralValidation(
                        format!("directed edge {} inside a chain component", e.id())
                    ));
                },
                (Some(s), Some(t)) => arcs.push((s, t)),
                _ => ()
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) The components form a DAG
        let arcs: Vec<(usize, usize)> = arcs.into_iter().unique().collect();
        let order = analysis::topological_sort(components.len(), &arcs).ok_or_else(|| {
            PgmError::StructuralValidation(String::from("chain components not acyclic"))
        })?;

        let components: Vec<Vec<String>> = order.into_iter().map(|i| components[i].clone()).collect();

        debug!(model = pgm.id(), components = components.len(), "chain graph");
        Ok(LwfChainGraph { pgm, components })
    }


    /// The chain components, in an order consistent with the directed edges between them. Ties
    /// go to the component with the smallest member id; members are sorted by id.
    pub fn decompose_into_chain_components(&self) -> &[Vec<String>] {
        &self.components
    }


    /// Position of the component containing `id`
    pub fn component_of(&self, id: &str) -> Option<usize> {
        self.components.iter().position(|c| c.iter().any(|m| m == id))
    }


    /// The nodes outside component `i` with a directed edge into it, sorted by id
    pub fn parents_of_component(&self, i: usize) -> Vec<&str> {
        let members = match self.components.get(i) {
            Some(members) => members,
            None => return vec![]
        };

        self.graph().edges()
            .filter(|e| e.is_directed() && members.iter().any(|m| m == e.end()))
            .map(|e| e.start())
            .filter(|p| ! members.iter().any(|m| m == p))
            .sorted()
            .dedup()
            .collect()
    }


    /// The factors whose scope lies within component `i`
    pub fn component_factors(&self, i: usize) -> Vec<&Factor> {
        match self.components.get(i) {
            Some(members) => {
                let ids: Vec<&str> = members.iter().map(|m| m.as_str()).collect();
                self.scope_subset_factors(&ids)
            },
            None => vec![]
        }
    }


    /// The moral graph: the parents of every chain component are married, then every edge loses
    /// its direction.
    pub fn moralize(&self) -> Result<MarkovNetwork> {
        let mut edges: Vec<Edge> = self.graph().edges().map(|e| e.to_undirected()).collect();

        for i in 0..self.components.len() {
            for (p, q) in self.parents_of_component(i).into_iter().tuple_combinations() {
                if ! self.is_neighbour_of(p, q) && ! edges.iter().any(|e| e.connects(p, q)) {
                    edges.push(Edge::undirected(p, q));
                }
            }
        }

        debug!(model = self.id(), edges = edges.len(), "moralized");
        MarkovNetwork::new(
            self.id(),
            self.graph().nodes().cloned().collect(),
            edges,
            self.factors().to_vec()
        )
    }


    /// One `ConditionalRandomField` per chain component K: the targets are the members of K, the
    /// observed variables are its parents, the factors are those over K and its parents that
    /// touch K, and the edges are the edges among those nodes, made undirected.
    pub fn decompose_into_crfs(&self) -> Result<Vec<ConditionalRandomField>> {
        let mut crfs = Vec::with_capacity(self.components.len());

        for (i, members) in self.components.iter().enumerate() {
            let parents = self.parents_of_component(i);

            let nodes = |ids: &[&str]| -> Vec<Var> {
                ids.iter().filter_map(|id| self.node(id).cloned()).collect()
            };
            let targets: Vec<&str> = members.iter().map(|m| m.as_str()).collect();
            let family: Vec<&str> = targets.iter().chain(parents.iter()).cloned().collect();

            let factors: Vec<Factor> = self.scope_subset_factors(&family)
                .into_iter()
                .filter(|f| targets.iter().any(|t| f.contains(t)))
                .cloned()
                .collect();

            let edges: Vec<Edge> = self.graph().edges()
                .filter(|e| family.contains(&e.start()) && family.contains(&e.end()))
                .map(|e| e.to_undirected())
                .collect();

            crfs.push(ConditionalRandomField::new(
                &format!("{}[{}]", self.id(), members.join(",")),
                nodes(&parents[..]),
                nodes(&targets[..]),
                edges,
                factors
            )?);
        }

        Ok(crfs)
    }

}


impl GraphLike for LwfChainGraph {
    fn graph(&self) -> &Graph {
        self.pgm.graph()
    }
}

impl Model for LwfChainGraph {
    fn factors(&self) -> &[Factor] {
        self.pgm.factors()
    }
}
