//! Defines the interface to exact inference
//!
//! A `Query` names the variables of interest, the evidence to condition on, whether to sum or
//! maximize the other variables away, and the policy that orders their elimination. Running it
//! produces a `QueryResult`: the resultant factor over the query variables together with either
//! its normalization constant or the most probable explanation.

mod ordering;
mod variable_elimination;

pub use self::ordering::EliminationOrder;
pub use self::variable_elimination::{Stage, VariableElimination};
pub use crate::factor::Mode;

use crate::error::Result;
use crate::factor::Factor;
use crate::variable::{Assignment, Value};


#[derive(Clone, Debug, Default, PartialEq)]
pub struct Query {
    variables: Vec<String>,
    evidence: Assignment,
    mode: Mode,
    order: EliminationOrder
}

impl Query {

    /// A sum-product query over `variables` with no evidence and the default elimination order
    pub fn new(variables: &[&str]) -> Self {
        Query {
            variables: variables.iter().map(|v| String::from(*v)).collect(),
            ..Query::default()
        }
    }

    /// Condition on the variable `id` taking `value`
    pub fn given<V: Into<Value>>(mut self, id: &str, value: V) -> Self {
        self.evidence.set(id, value);
        self
    }

    /// Condition on every pair of `evidence`
    pub fn with_evidence(mut self, evidence: &Assignment) -> Self {
        self.evidence.extend(evidence);
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_order(mut self, order: EliminationOrder) -> Self {
        self.order = order;
        self
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn order(&self) -> &EliminationOrder {
        &self.order
    }

}


/// The second half of a query's answer
#[derive(Clone, Debug, PartialEq)]
pub enum Answer {
    /// Sum of the resultant factor over all of its assignments (sum-product)
    Normalization(f64),

    /// A maximizing assignment to every variable of the model, evidence included (max-product)
    Explanation(Assignment)
}


#[derive(Clone, Debug)]
pub struct QueryResult {
    factor: Factor,
    answer: Answer,
    order: Vec<String>
}

impl QueryResult {

    pub(crate) fn new(factor: Factor, answer: Answer, order: Vec<String>) -> Self {
        QueryResult { factor, answer, order }
    }

    /// The unnormalized resultant factor over the query variables
    pub fn factor(&self) -> &Factor {
        &self.factor
    }

    pub fn answer(&self) -> &Answer {
        &self.answer
    }

    /// The normalization constant of a sum-product query
    pub fn normalization(&self) -> Option<f64> {
        match self.answer {
            Answer::Normalization(z) => Some(z),
            Answer::Explanation(_) => None
        }
    }

    /// The most probable explanation of a max-product query
    pub fn explanation(&self) -> Option<&Assignment> {
        match self.answer {
            Answer::Normalization(_) => None,
            Answer::Explanation(ref a) => Some(a)
        }
    }

    /// The variables that were eliminated, in order
    pub fn elimination_order(&self) -> &[String] {
        &self.order
    }

    /// Unnormalized value of the resultant factor at `assignment`
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        self.factor.value(assignment)
    }

    /// Value of the resultant factor at `assignment` divided by its sum
    ///
    /// # Errors
    /// * `PgmError::DivisionByZero` if the evidence has probability zero
    pub fn probability(&self, assignment: &Assignment) -> Result<f64> {
        self.factor.normalized_value(assignment)
    }

    /// The resultant factor scaled to sum to 1
    pub fn normalized(&self) -> Result<Factor> {
        self.factor.normalize()
    }

    pub fn into_parts(self) -> (Factor, Answer) {
        (self.factor, self.answer)
    }

}
