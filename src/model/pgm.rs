//! The generic probabilistic graphical model

use std::collections::HashSet;

use tracing::debug;

use super::Model;
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::{Edge, Graph, GraphLike};
use crate::variable::{Assignment, Var};


/// A graph over random variables plus a factor set. Every factor's scope is a subset of the nodes.
#[derive(Clone, Debug)]
pub struct Pgm {
    graph: Graph,
    factors: Vec<Factor>
}


impl Pgm {

    /// Create a new `Pgm`
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if the graph is malformed, two factors share an id,
    ///   or a factor mentions a variable that is not a node of the graph
    pub fn new(id: &str, nodes: Vec<Var>, edges: Vec<Edge>, factors: Vec<Factor>) -> Result<Self> {
        Pgm::from_graph(Graph::new(id, nodes, edges)?, factors)
    }


    /// Create a `Pgm` with one factor per edge, over the edge's endpoints, whose values are the
    /// product of the endpoints' marginal distributions.
    pub fn with_edge_marginals(id: &str, nodes: Vec<Var>, edges: Vec<Edge>) -> Result<Self> {
        let graph = Graph::new(id, nodes, edges)?;

        let mut factors = Vec::with_capacity(graph.size());
        for e in graph.edges() {
            let scope: Vec<Var> = [e.start(), e.end()].iter()
                .filter_map(|v| graph.node(v).cloned())
                .collect();
            factors.push(Factor::from_marginals(&format!("phi({})", e.id()), scope)?);
        }

        Pgm::from_graph(graph, factors)
    }


    /// Wrap an existing graph. Factors are checked against the nodes and reduced by any
    /// node-level evidence.
    pub fn from_graph(graph: Graph, factors: Vec<Factor>) -> Result<Self> {
        ///////////////////////////////////////////////////////////////////////
        // 1) Factor ids are unique
        let mut seen: HashSet<&str> = HashSet::new();
        for f in &factors {
            if ! seen.insert(f.id()) {
                return Err(PgmError::StructuralValidation(format!("factor {} declared twice", f.id())));
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Every scope variable is a node, with the same domain
        for f in &factors {
            for v in f.scope() {
                match graph.node(v.id()) {
                    Some(node) if node.domain() == v.domain() => (),
                    Some(_) => {
                        return Err(PgmError::StructuralValidation(
                            format!("factor {}: domain of {} differs from the node", f.id(), v.id())
                        ));
                    },
                    None => {
                        return Err(PgmError::StructuralValidation(
                            format!("factor {}: scope variable {} is not a node", f.id(), v.id())
                        ));
                    }
                }
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) Apply node-level evidence
        let evidence: Assignment = graph.nodes()
            .filter_map(|v| v.evidence().map(|x| (String::from(v.id()), x.clone())))
            .collect();

        let factors = if evidence.is_empty() {
            factors
        } else {
            debug!(model = graph.id(), evidence = %evidence, "applying node evidence");
            factors.iter().map(|f| f.reduce(&evidence)).collect::<Result<Vec<Factor>>>()?
        };

        debug!(
            model = graph.id(),
            nodes = graph.order(),
            edges = graph.size(),
            factors = factors.len(),
            "built model"
        );

        Ok(Pgm { graph, factors })
    }


    /// Take the graph and the factors back out
    pub fn into_parts(self) -> (Graph, Vec<Factor>) {
        (self.graph, self.factors)
    }

}


impl GraphLike for Pgm {
    fn graph(&self) -> &Graph {
        &self.graph
    }
}

impl Model for Pgm {
    fn factors(&self) -> &[Factor] {
        &self.factors
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::{RandomVariable, Value};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn nodes() -> Vec<Var> {
        vec![
            RandomVariable::binary("a", |v| if *v == Value::Bool(true) { 0.4 } else { 0.6 }).shared(),
            RandomVariable::binary("b", |v| if *v == Value::Bool(true) { 0.9 } else { 0.1 }).shared(),
            RandomVariable::binary("c", |_| 0.5).shared()
        ]
    }

    fn edges() -> Vec<Edge> {
        vec![ Edge::undirected("a", "b"), Edge::undirected("b", "c") ]
    }

    #[test]
    fn edge_marginals() {
        let pgm = Pgm::with_edge_marginals("g", nodes(), edges()).expect("Unexpected error");

        assert_eq!(2, pgm.factors().len());
        let phi = pgm.factor("phi(a--b)").expect("missing factor");
        assert_eq!(vec!["a", "b"], phi.scope_ids());

        let assn = Assignment::new().with("a", true).with("b", false);
        assert_abs_diff_eq!(0.04, phi.value(&assn).expect("Unexpected error"), epsilon = 1e-12);
    }

    #[test]
    fn no_default_factors() {
        let pgm = Pgm::new("g", nodes(), edges(), vec![]).expect("Unexpected error");
        assert!(pgm.factors().is_empty());
        assert_eq!(3, pgm.order());
    }

    #[test]
    fn blanket_and_closure() {
        let pgm = Pgm::new("g", nodes(), edges(), vec![]).expect("Unexpected error");

        assert_eq!(vec!["b"], pgm.markov_blanket("a").expect("Unexpected error"));
        assert_eq!(vec!["a", "c"], pgm.markov_blanket("b").expect("Unexpected error"));
        assert_eq!(vec!["a", "b"], pgm.closure_of("a").expect("Unexpected error"));

        match pgm.markov_blanket("x") {
            Err(PgmError::InvalidVariable(_)) => assert!(true),
            _ => panic!("expected invalid variable")
        };
    }

    #[test]
    fn factor_validation() {
        let ns = nodes();
        let phi = Factor::ones("phi", vec![ ns[0].clone() ]).expect("Unexpected error");

        // duplicate factor ids
        let err = Pgm::new("g", nodes(), edges(), vec![ phi.clone(), phi.clone() ]);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // scope outside the nodes
        let x = RandomVariable::binary("x", |_| 0.5).shared();
        let psi = Factor::ones("psi", vec![ x ]).expect("Unexpected error");
        let err = Pgm::new("g", nodes(), edges(), vec![ psi ]);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // same id, different domain
        let a3 = RandomVariable::new("a", vec![ Value::from(1), Value::from(2), Value::from(3) ], |_| 1. / 3.)
            .expect("Unexpected error")
            .shared();
        let psi = Factor::ones("psi", vec![ a3 ]).expect("Unexpected error");
        let err = Pgm::new("g", nodes(), edges(), vec![ psi ]);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn node_evidence_reduces_factors() {
        let a = RandomVariable::binary("a", |_| 0.5).with_evidence(true).expect("Unexpected error").shared();
        let b = RandomVariable::binary("b", |_| 0.5).shared();

        let phi = Factor::new("phi", vec![ a.clone(), b.clone() ], array![[1., 2.], [3., 4.]].into_dyn())
            .expect("Unexpected error");
        let pgm = Pgm::new("g", vec![ a, b ], vec![ Edge::undirected("a", "b") ], vec![ phi ])
            .expect("Unexpected error");

        let phi = pgm.factor("phi").expect("missing factor");
        assert_eq!(vec!["b"], phi.scope_ids());
        assert_eq!(&array![1., 2.].into_dyn(), phi.table());

        // node evidence carries into every query
        let p = pgm.marginal(&["b"], &Assignment::new()).expect("Unexpected error");
        let assn = Assignment::new().with("b", true);
        assert_abs_diff_eq!(1. / 3., p.value(&assn).expect("Unexpected error"), epsilon = 1e-12);
    }

    #[test]
    fn joint_and_probability() {
        let ns = nodes();
        let phi_ab = Factor::new("phi_ab", vec![ ns[0].clone(), ns[1].clone() ], array![[1., 2.], [3., 4.]].into_dyn())
            .expect("Unexpected error");
        let phi_bc = Factor::new("phi_bc", vec![ ns[1].clone(), ns[2].clone() ], array![[1., 1.], [2., 0.]].into_dyn())
            .expect("Unexpected error");
        let pgm = Pgm::new("g", ns, edges(), vec![ phi_ab, phi_bc ]).expect("Unexpected error");

        let assn = Assignment::new().with("a", false).with("b", true).with("c", true);
        assert_abs_diff_eq!(3., pgm.joint_value(&assn).expect("Unexpected error"), epsilon = 1e-12);

        // Z = sum_b (sum_a phi_ab) (sum_c phi_bc) = 4 * 2 + 6 * 2
        assert_abs_diff_eq!(20., pgm.partition_function().expect("Unexpected error"), epsilon = 1e-12);
        assert_abs_diff_eq!(0.15, pgm.probability(&assn).expect("Unexpected error"), epsilon = 1e-12);

        assert_eq!(2, pgm.scope_subset_factors(&["a", "b", "c"]).len());
        assert_eq!(1, pgm.scope_subset_factors(&["a", "b"]).len());

        let (best, value) = pgm.most_probable(&Assignment::new()).expect("Unexpected error");
        assert_abs_diff_eq!(8., value, epsilon = 1e-12);
        let expected = Assignment::new().with("a", false).with("b", false).with("c", true);
        assert_eq!(expected, best);
    }
}
