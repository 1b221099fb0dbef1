//! Defines a `MarkovNetwork`, an undirected model whose factors need not be normalized

use tracing::debug;

use super::{Model, Pgm};
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::{analysis, Edge, Graph, GraphLike};
use crate::variable::Var;


/// Represents a Markov Network - an Undirected Probabilistic Graphical Model.
#[derive(Clone, Debug)]
pub struct MarkovNetwork {
    pgm: Pgm
}


impl MarkovNetwork {

    /// Create a new `MarkovNetwork`
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if an edge is directed or the factors do not fit the nodes
    pub fn new(id: &str, nodes: Vec<Var>, edges: Vec<Edge>, factors: Vec<Factor>) -> Result<Self> {
        MarkovNetwork::from_pgm(Pgm::new(id, nodes, edges, factors)?)
    }


    /// Create a `MarkovNetwork` with one factor per maximal clique of the graph. Each factor is
    /// the product of the marginal distributions of the clique's members.
    pub fn from_cliques(id: &str, nodes: Vec<Var>, edges: Vec<Edge>) -> Result<Self> {
        let graph = Graph::new(id, nodes, edges)?;

        let mut factors = Vec::new();
        for clique in analysis::maximal_cliques(&graph) {
            let scope: Vec<Var> = clique.iter().filter_map(|v| graph.node(v).cloned()).collect();
            factors.push(Factor::from_marginals(&format!("phi({})", clique.join(",")), scope)?);
        }

        MarkovNetwork::from_pgm(Pgm::from_graph(graph, factors)?)
    }


    pub(crate) fn from_pgm(pgm: Pgm) -> Result<Self> {
        if ! pgm.graph().is_undirected() {
            return Err(PgmError::StructuralValidation(String::from("edge set not undirected")));
        }

        debug!(model = pgm.id(), "markov network");
        Ok(MarkovNetwork { pgm })
    }

    pub(crate) fn into_pgm(self) -> Pgm {
        self.pgm
    }

}


impl GraphLike for MarkovNetwork {
    fn graph(&self) -> &Graph {
        self.pgm.graph()
    }
}

impl Model for MarkovNetwork {
    fn factors(&self) -> &[Factor] {
        self.pgm.factors()
    }
}
