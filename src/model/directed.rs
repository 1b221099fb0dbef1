//! Defines a `BayesianNetwork`, a directed model that represents the factorization of a
//! probability distribution P into one conditional distribution per variable

use tracing::debug;

use super::{Model, Pgm};
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::{analysis, Edge, Graph, GraphLike};
use crate::variable::Var;


/// Represents a Bayesian Network - a Directed Probabilistic Graphical Model.
///
/// # Representation
/// Every edge is directed and the edges form a Directed Acyclic Graph (DAG). The Conditional
/// Probability Distribution (CPD) of a variable ```X``` is the factor whose scope is exactly
/// ```X U Pa(X)```.
#[derive(Clone, Debug)]
pub struct BayesianNetwork {
    pgm: Pgm
}


impl BayesianNetwork {

    /// Create a new `BayesianNetwork`
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if an edge is undirected, the edges contain a cycle, or
    ///   the factors do not fit the nodes
    pub fn new(id: &str, nodes: Vec<Var>, edges: Vec<Edge>, factors: Vec<Factor>) -> Result<Self> {
        BayesianNetwork::from_pgm(Pgm::new(id, nodes, edges, factors)?)
    }


    /// Create a `BayesianNetwork` with one CPD per node, built by `cpd` from the node and its
    /// parents.
    ///
    /// # Args
    /// * `cpd`: called once per node, in graph order, with the node and its parents
    pub fn from_cpds<F>(id: &str, nodes: Vec<Var>, edges: Vec<Edge>, cpd: F) -> Result<Self>
        where F: Fn(&Var, &[Var]) -> Result<Factor>
    {
        let graph = Graph::new(id, nodes, edges)?;

        let mut factors = Vec::with_capacity(graph.order());
        for var in graph.nodes() {
            let parents: Vec<Var> = graph.parents_of(var.id()).iter()
                .filter_map(|p| graph.node(p).cloned())
                .collect();
            factors.push(cpd(var, &parents)?);
        }

        BayesianNetwork::from_pgm(Pgm::from_graph(graph, factors)?)
    }


    pub(crate) fn from_pgm(pgm: Pgm) -> Result<Self> {
        if ! pgm.graph().is_directed() {
            return Err(PgmError::StructuralValidation(String::from("edge set not directed")));
        }

        if ! analysis::is_acyclic(pgm.graph()) {
            return Err(PgmError::StructuralValidation(String::from("edge set not acyclic")));
        }

        debug!(model = pgm.id(), "bayesian network");
        Ok(BayesianNetwork { pgm })
    }


    /// The tails of the edges pointing at `id`
    pub fn parents_of(&self, id: &str) -> Vec<&str> {
        self.graph().parents_of(id)
    }

    /// The heads of the edges leaving `id`
    pub fn children_of(&self, id: &str) -> Vec<&str> {
        self.graph().children_of(id)
    }

    /// A topological order of the nodes
    pub fn topological_order(&self) -> Vec<String> {
        // acyclicity is checked at construction
        analysis::topological_order(self.graph()).unwrap_or_default()
    }

    /// Get the CPD of `id`: the factor whose scope is `id` and its parents.
    ///
    /// Node evidence has already reduced the factors, so members of the family fixed by node
    /// evidence are left out of the scope looked for. When `id` itself is fixed, the reduced CPD
    /// may share its scope with another factor; the first such factor is returned.
    pub fn cpd(&self, id: &str) -> Option<&Factor> {
        let mut family = self.parents_of(id);
        family.push(id);
        family.retain(|v| self.node(v).map_or(false, |var| var.evidence().is_none()));
        family.sort();

        self.factors().iter().find(|f| f.scope_ids() == family)
    }

}


impl GraphLike for BayesianNetwork {
    fn graph(&self) -> &Graph {
        self.pgm.graph()
    }
}

impl Model for BayesianNetwork {
    fn factors(&self) -> &[Factor] {
        self.pgm.factors()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::Query;
    use crate::init::Initialization;
    use crate::variable::{Assignment, RandomVariable};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn var(id: &str) -> Var {
        RandomVariable::binary(id, |_| 0.5).shared()
    }

    #[test]
    fn validation() {
        let err = BayesianNetwork::new("bn", vec![ var("a"), var("b") ], vec![ Edge::undirected("a", "b") ], vec![]);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        let edges = vec![ Edge::directed("a", "b"), Edge::directed("b", "c"), Edge::directed("c", "a") ];
        let err = BayesianNetwork::new("bn", vec![ var("a"), var("b"), var("c") ], edges, vec![]);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(msg) => assert_eq!("edge set not acyclic", msg),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    /// The student network of Koller & Friedman Figure 3.4, without the letter's dependence on
    /// anything but the grade
    fn student() {
        let d = var("d");
        let i = var("i");
        let g = var("g");
        let s = var("s");
        let l = var("l");

        let edges = vec![
            Edge::directed("i", "g"),
            Edge::directed("d", "g"),
            Edge::directed("i", "s"),
            Edge::directed("g", "l")
        ];

        let model = BayesianNetwork::from_cpds("student", vec![ d, i, g, s, l ], edges, |v, parents| {
            let init = match v.id() {
                "d" => Initialization::Binomial(0.6),
                "i" => Initialization::Binomial(0.7),
                "g" => Initialization::Table(array![[[0.3, 0.7], [0.05, 0.95]], [[0.9, 0.1], [0.5, 0.5]]].into_dyn()),
                "s" => Initialization::Table(array![[0.95, 0.05], [0.2, 0.8]].into_dyn()),
                _ => Initialization::Table(array![[0.9, 0.1], [0.4, 0.6]].into_dyn())
            };
            init.build_cpd(&format!("P({})", v.id()), v, parents)
        }).expect("Unexpected error");

        assert_eq!(vec!["i", "d"], model.parents_of("g"));
        assert_eq!(vec!["g", "s"], model.children_of("i"));
        assert_eq!(vec!["d", "i", "g", "s", "l"], model.topological_order());
        assert_eq!("P(g)", model.cpd("g").expect("missing cpd").id());
        assert_eq!(vec!["d", "g", "i"], model.cpd("g").expect("missing cpd").scope_ids());

        // every CPD is normalized, so the joint already sums to 1
        assert_abs_diff_eq!(1., model.partition_function().expect("Unexpected error"), epsilon = 1e-9);

        let query = Query::new(&["i"]).given("d", true).given("l", false).given("s", true);
        let result = model.query(&query).expect("Unexpected error");

        let assn = Assignment::new().with("i", false);
        assert_abs_diff_eq!(0.02919708, result.probability(&assn).expect("Unexpected error"), epsilon = 1e-6);
    }

    #[test]
    fn cpd_after_node_evidence() {
        let a = RandomVariable::binary("a", |_| 0.5).with_evidence(false).expect("Unexpected error").shared();
        let b = var("b");

        let model = BayesianNetwork::from_cpds("ab", vec![ a, b ], vec![ Edge::directed("a", "b") ], |v, parents| {
            let init = match v.id() {
                "a" => Initialization::Binomial(0.3),
                _ => Initialization::Table(array![[0.9, 0.1], [0.4, 0.6]].into_dyn())
            };
            init.build_cpd(&format!("P({})", v.id()), v, parents)
        }).expect("Unexpected error");

        let cpd = model.cpd("b").expect("missing cpd");
        assert_eq!("P(b)", cpd.id());
        assert_eq!(vec!["b"], cpd.scope_ids());
        assert_abs_diff_eq!(0.4, cpd.value(&Assignment::new().with("b", true)).expect("Unexpected error"), epsilon = 1e-12);

        assert_eq!("P(a)", model.cpd("a").expect("missing cpd").id());
    }
}
