//! Defines a `ConditionalRandomField`, an undirected model of the distribution of a set of target
//! variables given a set of observed variables

use std::collections::HashSet;

use tracing::debug;

use super::{MarkovNetwork, Model, Pgm};
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::{Edge, Graph, GraphLike};
use crate::inference::{Query, QueryResult};
use crate::variable::{Assignment, Var};


#[derive(Clone, Debug)]
pub struct ConditionalRandomField {
    pgm: Pgm,
    observed: Vec<String>,
    targets: Vec<String>
}


impl ConditionalRandomField {

    /// Create a new `ConditionalRandomField`
    ///
    /// # Args
    /// * `observed`: the variables conditioned on
    /// * `targets`: the variables whose conditional distribution the model represents
    ///
    /// # Errors
    /// * `PgmError::StructuralValidation` if a variable is both observed and a target, an edge is
    ///   directed, a factor mentions a variable outside the observed and target sets, or a factor
    ///   mentions no target
    pub fn new(
        id: &str,
        observed: Vec<Var>,
        targets: Vec<Var>,
        edges: Vec<Edge>,
        factors: Vec<Factor>
    ) -> Result<Self> {
        let observed_ids: Vec<String> = observed.iter().map(|v| String::from(v.id())).collect();
        let target_ids: Vec<String> = targets.iter().map(|v| String::from(v.id())).collect();

        ///////////////////////////////////////////////////////////////////////
        // 1) Observed and target variables are disjoint
        if let Some(v) = target_ids.iter().find(|t| observed_ids.contains(t)) {
            return Err(PgmError::StructuralValidation(format!("{} is both observed and a target", v)));
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Every factor lives on observed ∪ target and touches a target
        let known: HashSet<&str> = observed_ids.iter().chain(target_ids.iter()).map(|v| v.as_str()).collect();
        for f in &factors {
            if ! f.scope_ids().iter().all(|v| known.contains(v)) {
                return Err(PgmError::StructuralValidation(
                    format!("factor scope not subset of observed ∪ target: {}", f.id())
                ));
            }

            if ! f.scope_ids().iter().any(|v| target_ids.iter().any(|t| t == v)) {
                return Err(PgmError::StructuralValidation(
                    format!("factor {} does not touch a target variable", f.id())
                ));
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 3) The rest is an undirected model
        let nodes = observed.into_iter().chain(targets).collect();
        let pgm = MarkovNetwork::new(id, nodes, edges, factors)?.into_pgm();

        debug!(model = id, observed = observed_ids.len(), targets = target_ids.len(), "conditional random field");
        Ok(ConditionalRandomField { pgm, observed: observed_ids, targets: target_ids })
    }


    /// Restrict a `MarkovNetwork` to the factors that touch `targets`. Every other node is
    /// observed.
    pub fn from_markov_network(mn: &MarkovNetwork, targets: &[&str]) -> Result<Self> {
        if let Some(t) = targets.iter().find(|t| ! mn.graph().contains_node(t)) {
            return Err(PgmError::StructuralValidation(format!("target {} is not a node of {}", t, mn.id())));
        }

        let (target_vars, observed): (Vec<Var>, Vec<Var>) = mn.graph().nodes()
            .cloned()
            .partition(|v| targets.contains(&v.id()));

        let factors: Vec<Factor> = mn.factors().iter()
            .filter(|f| targets.iter().any(|t| f.contains(t)))
            .cloned()
            .collect();

        ConditionalRandomField::new(mn.id(), observed, target_vars, mn.graph().edges().cloned().collect(), factors)
    }


    /// Ids of the observed variables
    pub fn observed(&self) -> &[String] {
        &self.observed
    }

    /// Ids of the target variables
    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn is_observed(&self, id: &str) -> bool {
        self.observed.iter().any(|v| v == id)
    }


    /// The distribution of the targets given the values of observed variables
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` if an observation is not of an observed variable
    pub fn conditional(&self, observations: &Assignment) -> Result<QueryResult> {
        if let Some(v) = observations.ids().find(|v| ! self.is_observed(v)) {
            return Err(PgmError::InvalidEvidence(format!("{} is not an observed variable", v)));
        }

        let targets: Vec<&str> = self.targets.iter().map(|t| t.as_str()).collect();
        self.query(&Query::new(&targets).with_evidence(observations))
    }

}


impl GraphLike for ConditionalRandomField {
    fn graph(&self) -> &Graph {
        self.pgm.graph()
    }
}

impl Model for ConditionalRandomField {
    fn factors(&self) -> &[Factor] {
        self.pgm.factors()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::RandomVariable;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn var(id: &str) -> Var {
        RandomVariable::binary(id, |_| 0.5).shared()
    }

    /// x -- y -- z with y the only target
    fn pieces() -> (Vec<Var>, Vec<Var>, Vec<Edge>, Vec<Factor>) {
        let x = var("x");
        let y = var("y");
        let z = var("z");

        let phi_xy = Factor::new("phi_xy", vec![ x.clone(), y.clone() ], array![[4., 1.], [1., 4.]].into_dyn())
            .expect("Unexpected error");
        let phi_yz = Factor::new("phi_yz", vec![ y.clone(), z.clone() ], array![[1., 2.], [1., 1.]].into_dyn())
            .expect("Unexpected error");

        (
            vec![ x, z ],
            vec![ y ],
            vec![ Edge::undirected("x", "y"), Edge::undirected("y", "z") ],
            vec![ phi_xy, phi_yz ]
        )
    }

    #[test]
    fn conditional() {
        let (observed, targets, edges, factors) = pieces();
        let crf = ConditionalRandomField::new("crf", observed, targets, edges, factors).expect("Unexpected error");

        assert_eq!(&[String::from("x"), String::from("z")], crf.observed());
        assert_eq!(&[String::from("y")], crf.targets());

        let obs = Assignment::new().with("x", true).with("z", false);
        let result = crf.conditional(&obs).expect("Unexpected error");

        // P(y = true | x = true, z = false) = 4 * 2 / (4 * 2 + 1 * 1)
        let assn = Assignment::new().with("y", true);
        assert_abs_diff_eq!(8. / 9., result.probability(&assn).expect("Unexpected error"), epsilon = 1e-9);

        let obs = Assignment::new().with("y", true);
        match crf.conditional(&obs) {
            Err(PgmError::InvalidEvidence(_)) => assert!(true),
            _ => panic!("expected invalid evidence")
        };
    }

    #[test]
    fn validation() {
        // overlapping sets
        let (_, targets, edges, factors) = pieces();
        let err = ConditionalRandomField::new("crf", vec![ var("x"), var("y"), var("z") ], targets, edges, factors);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // a factor with no target
        let (observed, targets, edges, mut factors) = pieces();
        factors.push(Factor::ones("phi_x", vec![ observed[0].clone() ]).expect("Unexpected error"));
        let err = ConditionalRandomField::new("crf", observed, targets, edges, factors);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(_) => assert!(true),
            _ => panic!("wrong error type")
        };

        // a factor outside observed ∪ target
        let (observed, targets, edges, mut factors) = pieces();
        let w = var("w");
        factors.push(Factor::ones("phi_wy", vec![ w, targets[0].clone() ]).expect("Unexpected error"));
        let err = ConditionalRandomField::new("crf", observed, targets, edges, factors);
        match err.expect_err("missing error") {
            PgmError::StructuralValidation(msg) => assert!(msg.starts_with("factor scope not subset")),
            _ => panic!("wrong error type")
        };
    }

    #[test]
    fn from_markov_network() {
        let (observed, targets, edges, mut factors) = pieces();
        factors.push(Factor::ones("phi_x", vec![ observed[0].clone() ]).expect("Unexpected error"));
        let nodes = observed.into_iter().chain(targets).collect();
        let mn = MarkovNetwork::new("mn", nodes, edges, factors).expect("Unexpected error");

        let crf = ConditionalRandomField::from_markov_network(&mn, &["y"]).expect("Unexpected error");
        assert_eq!(&[String::from("y")], crf.targets());
        assert_eq!(2, crf.factors().len());
        assert!(crf.factor("phi_x").is_none());
    }
}
