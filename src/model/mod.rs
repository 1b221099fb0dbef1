//! Defines a `Model`: a graph of random variables together with a set of factors whose product
//! represents the (unnormalized) joint distribution over those variables.
//!
//! `Pgm` is the generic model. The variants `BayesianNetwork`, `MarkovNetwork`,
//! `ConditionalRandomField` and `LwfChainGraph` each wrap a `Pgm` and add the structural
//! invariants of their kind.

mod builder;
mod chain;
mod crf;
mod directed;
mod pgm;
mod undirected;

pub use self::builder::ModelBuilder;
pub use self::chain::LwfChainGraph;
pub use self::crf::ConditionalRandomField;
pub use self::directed::BayesianNetwork;
pub use self::pgm::Pgm;
pub use self::undirected::MarkovNetwork;

use crate::error::{PgmError, Result};
use crate::factor::{Factor, Mode};
use crate::graph::GraphLike;
use crate::inference::{Query, QueryResult, VariableElimination};
use crate::variable::Assignment;


/// The `Model` trait represents a Probabilistic Graphical Model.
pub trait Model: GraphLike {

    /// The factors of the model, after node-level evidence has been applied
    fn factors(&self) -> &[Factor];


    fn id(&self) -> &str {
        self.graph().id()
    }


    /// Look up a factor by id
    fn factor(&self, id: &str) -> Option<&Factor> {
        self.factors().iter().find(|f| f.id() == id)
    }


    /// Answer a query by variable elimination.
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` for an invalid query, see `VariableElimination::apply_evidence`
    fn query(&self, query: &Query) -> Result<QueryResult> {
        VariableElimination::new(self.graph(), self.factors(), query).run()
    }


    /// The posterior distribution ```P(variables | evidence)``` as a normalized factor
    ///
    /// # Errors
    /// * `PgmError::DivisionByZero` if the evidence has probability zero
    fn marginal(&self, variables: &[&str], evidence: &Assignment) -> Result<Factor> {
        self.query(&Query::new(variables).with_evidence(evidence))?.normalized()
    }


    /// The most probable explanation of the evidence and its unnormalized value
    fn most_probable(&self, evidence: &Assignment) -> Result<(Assignment, f64)> {
        let query = Query::new(&[]).with_evidence(evidence).with_mode(Mode::MaxProduct);
        VariableElimination::new(self.graph(), self.factors(), &query).most_probable()
    }


    /// The product of every factor at a full assignment. An assignment that disagrees with
    /// node-level evidence has value 0.
    ///
    /// # Errors
    /// * `PgmError::UnknownAssignment` if the assignment misses a variable some factor needs
    fn joint_value(&self, assignment: &Assignment) -> Result<f64> {
        // the factors no longer mention variables fixed by node evidence
        let contradicts = self.graph().nodes().any(|v| match (v.evidence(), assignment.get(v.id())) {
            (Some(fixed), Some(value)) => fixed != value,
            _ => false
        });

        if contradicts {
            return Ok(0.);
        }

        self.factors().iter().try_fold(1., |acc, f| f.value(assignment).map(|v| acc * v))
    }


    /// The sum of the joint over every assignment of the model
    fn partition_function(&self) -> Result<f64> {
        Ok(self.query(&Query::new(&[]))?.factor().partition())
    }


    /// The joint value of a full assignment divided by the partition function
    ///
    /// # Errors
    /// * `PgmError::DivisionByZero` if the partition function is zero
    fn probability(&self, assignment: &Assignment) -> Result<f64> {
        let z = self.partition_function()?;
        if z == 0. {
            return Err(PgmError::DivisionByZero);
        }

        Ok(self.joint_value(assignment)? / z)
    }


    /// The variables adjacent to `id`
    ///
    /// # Errors
    /// * `PgmError::InvalidVariable` if `id` is not a node of the model
    fn markov_blanket(&self, id: &str) -> Result<Vec<&str>> {
        if self.node(id).is_none() {
            return Err(PgmError::InvalidVariable(format!("{} is not in {}", id, self.id())));
        }

        Ok(self.neighbours_of(id))
    }


    /// `id` together with its Markov blanket
    fn closure_of(&self, id: &str) -> Result<Vec<&str>> {
        let mut closure = self.markov_blanket(id)?;
        if let Some(var) = self.node(id) {
            closure.insert(0, var.id());
        }
        Ok(closure)
    }


    /// Check whether `a` and `b` are independent given every other variable: true when no edge
    /// joins them (the pairwise Markov property)
    ///
    /// # Errors
    /// * `PgmError::InvalidVariable` if either is not a node of the model, or both are the same node
    fn is_conditionally_independent_of(&self, a: &str, b: &str) -> Result<bool> {
        for id in &[a, b] {
            if self.node(id).is_none() {
                return Err(PgmError::InvalidVariable(format!("{} is not in {}", id, self.id())));
            }
        }

        if a == b {
            return Err(PgmError::InvalidVariable(format!("{} compared with itself", a)));
        }

        Ok(! self.is_neighbour_of(a, b))
    }


    /// Every factor whose scope lies within `ids`
    fn scope_subset_factors(&self, ids: &[&str]) -> Vec<&Factor> {
        self.factors().iter()
            .filter(|f| f.scope_ids().iter().all(|v| ids.contains(v)))
            .collect()
    }

}
