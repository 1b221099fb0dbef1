//! Exact inference by variable elimination
//!
//! Implementation of Koller & Friedman Algorithm 9.1 (Sum-Product-VE) and its max-product
//! counterpart with traceback (Algorithm 13.1). The engine is a small state machine so callers
//! can step through the elimination one variable at a time.

use std::collections::VecDeque;
use std::mem;

use itertools::Itertools;
use tracing::{debug, trace};

use super::{Answer, Query, QueryResult};
use crate::error::{PgmError, Result};
use crate::factor::{Factor, Mode};
use crate::graph::Graph;
use crate::variable::Assignment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// Nothing has been done yet
    Uninitialized,

    /// The query is validated, the factors are reduced and the elimination order is fixed
    EvidenceApplied,

    /// At least one variable has been eliminated
    Eliminating,

    /// The remaining factors have been multiplied into the resultant factor
    Combined,

    /// The answer has been computed
    Normalized
}


pub struct VariableElimination<'a> {
    graph: &'a Graph,
    query: &'a Query,
    stage: Stage,

    /// The query variables, deduplicated
    targets: Vec<String>,

    /// Query evidence merged with node-level evidence
    evidence: Assignment,

    /// The working set of factors
    working: Vec<Factor>,

    /// The full elimination order and the part of it still to go
    order: Vec<String>,
    pending: VecDeque<String>,

    /// For max-product, the product factor formed at each step
    traceback: Vec<(String, Factor)>,

    combined: Option<Factor>
}


impl<'a> VariableElimination<'a> {

    /// Prepare to answer `query` over the nodes of `graph` and the factors `factors`
    pub fn new(graph: &'a Graph, factors: &[Factor], query: &'a Query) -> Self {
        VariableElimination {
            graph,
            query,
            stage: Stage::Uninitialized,
            targets: query.variables().iter().unique().cloned().collect(),
            evidence: Assignment::new(),
            working: factors.to_vec(),
            order: Vec::new(),
            pending: VecDeque::new(),
            traceback: Vec::new(),
            combined: None
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The current working set of factors
    pub fn working_set(&self) -> &[Factor] {
        &self.working
    }

    /// The evidence in force, once applied
    pub fn evidence(&self) -> &Assignment {
        &self.evidence
    }

    /// The elimination order, once evidence is applied
    pub fn elimination_order(&self) -> &[String] {
        &self.order
    }

    /// The variables still to be eliminated
    pub fn remaining(&self) -> impl Iterator<Item = &str> {
        self.pending.iter().map(|v| v.as_str())
    }


    /// Validate the query, reduce every factor by the evidence and fix the elimination order.
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` if a query or evidence variable is not in the graph, an
    ///   evidence value is outside its domain, a variable is both queried and observed, or the
    ///   evidence contradicts node-level evidence
    pub fn apply_evidence(&mut self) -> Result<()> {
        if self.stage != Stage::Uninitialized {
            return Ok(());
        }

        ///////////////////////////////////////////////////////////////////////
        // 1) Validate the evidence and the query variables
        let mut evidence = Assignment::new();
        for (id, value) in self.query.evidence() {
            let var = self.graph.node(id).ok_or_else(|| {
                PgmError::InvalidEvidence(format!("unknown evidence variable {}", id))
            })?;

            if var.index_of(value).is_none() {
                return Err(PgmError::InvalidEvidence(format!("{} is not in the domain of {}", value, id)));
            }

            evidence.set(id, value.clone());
        }

        for id in &self.targets {
            let var = self.graph.node(id).ok_or_else(|| {
                PgmError::InvalidEvidence(format!("unknown query variable {}", id))
            })?;

            if evidence.contains(id) {
                return Err(PgmError::InvalidEvidence(format!("{} is both queried and observed", id)));
            }

            if var.evidence().is_some() {
                return Err(PgmError::InvalidEvidence(format!("{} is fixed by node evidence", id)));
            }
        }

        for var in self.graph.nodes() {
            if let Some(fixed) = var.evidence() {
                if let Some(v) = evidence.get(var.id()) {
                    if v != fixed {
                        return Err(PgmError::InvalidEvidence(
                            format!("{}={} contradicts node evidence {}", var.id(), v, fixed)
                        ));
                    }
                }
                evidence.set(var.id(), fixed.clone());
            }
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Reduce every factor by the evidence
        self.working = self.working.iter()
            .map(|f| f.reduce(&evidence))
            .collect::<Result<Vec<Factor>>>()?;

        ///////////////////////////////////////////////////////////////////////
        // 3) Order the variables that are neither queried nor observed
        let candidates: Vec<String> = self.graph.node_ids()
            .filter(|id| ! self.targets.iter().any(|t| t == id) && ! evidence.contains(id))
            .map(String::from)
            .collect();

        self.order = self.query.order().order(&candidates, &self.working);
        self.pending = self.order.iter().cloned().collect();

        if self.order.is_empty() {
            debug!("every unobserved variable is queried, nothing to eliminate");
        }

        debug!(evidence = %evidence, order = ?self.order, "evidence applied");
        self.evidence = evidence;
        self.stage = Stage::EvidenceApplied;

        Ok(())
    }


    /// Eliminate the next variable of the order: multiply every working factor that mentions it
    /// and sum (or maximize) it out of the product.
    ///
    /// # Returns
    /// the eliminated variable, or `None` once the order is exhausted
    pub fn eliminate_next(&mut self) -> Result<Option<String>> {
        match self.stage {
            Stage::Uninitialized => self.apply_evidence()?,
            Stage::Combined | Stage::Normalized => return Ok(None),
            _ => ()
        }

        let var = match self.pending.pop_front() {
            Some(var) => var,
            None => return Ok(None)
        };

        self.stage = Stage::Eliminating;

        let (relevant, rest): (Vec<Factor>, Vec<Factor>) = mem::take(&mut self.working)
            .into_iter()
            .partition(|f| f.contains(&var));
        self.working = rest;

        if relevant.is_empty() {
            trace!(variable = %var, "no factor mentions the variable, dropped");
            return Ok(Some(var));
        }

        // product step
        let psi = Factor::product_all(&relevant)?;

        // sum (or max) step
        let tau = psi.marginalize(&var, self.query.mode())?;
        trace!(variable = %var, consumed = relevant.len(), scope = ?tau.scope_ids(), "eliminated");

        if self.query.mode() == Mode::MaxProduct {
            self.traceback.push((var.clone(), psi));
        }

        self.working.push(tau);
        Ok(Some(var))
    }


    /// Eliminate whatever is left and multiply the remaining factors into the resultant factor.
    /// Query variables no factor mentions enter with a factor of ones, so the result is over
    /// exactly the query variables.
    pub fn combine(&mut self) -> Result<&Factor> {
        let phi = match self.combined.take() {
            Some(phi) => phi,
            None => {
                while self.eliminate_next()?.is_some() {}

                let mut phi = Factor::product_all(&self.working)?;
                for id in &self.targets {
                    if ! phi.contains(id) {
                        if let Some(var) = self.graph.node(id) {
                            phi = phi.product(&Factor::ones(id, vec![ var.clone() ])?)?;
                        }
                    }
                }

                debug!(scope = ?phi.scope_ids(), "combined");
                phi
            }
        };

        if self.stage < Stage::Combined {
            self.stage = Stage::Combined;
        }

        Ok(self.combined.insert(phi))
    }


    /// Compute the answer: the normalization constant for sum-product, the most probable
    /// explanation for max-product.
    pub fn finish(&mut self) -> Result<QueryResult> {
        let phi = self.combine()?.clone();

        let answer = match self.query.mode() {
            Mode::SumProduct => {
                let z = phi.partition();
                debug!(normalization = z, "normalized");
                Answer::Normalization(z)
            },
            Mode::MaxProduct => {
                let explanation = self.trace_back(&phi)?;
                debug!(explanation = %explanation, "traced back");
                Answer::Explanation(explanation)
            }
        };

        self.stage = Stage::Normalized;
        Ok(QueryResult::new(phi, answer, self.order.clone()))
    }


    /// Run every stage
    pub fn run(mut self) -> Result<QueryResult> {
        self.apply_evidence()?;
        while self.eliminate_next()?.is_some() {}
        self.finish()
    }


    /// Run a max-product elimination straight to a maximizing assignment and its value. The
    /// query must be in `Mode::MaxProduct`.
    pub(crate) fn most_probable(mut self) -> Result<(Assignment, f64)> {
        let phi = self.combine()?.clone();
        let explanation = self.trace_back(&phi)?;
        self.stage = Stage::Normalized;

        Ok((explanation, phi.argmax().1))
    }


    /// Recover a maximizing assignment: maximize the resultant factor, then walk the elimination
    /// steps backwards, maximizing each product factor given the values already chosen.
    fn trace_back(&self, phi: &Factor) -> Result<Assignment> {
        let mut assignment = self.evidence.clone();
        assignment.extend(&phi.argmax().0);

        for (_, psi) in self.traceback.iter().rev() {
            let (best, _) = psi.reduce(&assignment)?.argmax();
            assignment.extend(&best);
        }

        // variables no factor mentions take their first value
        for id in &self.order {
            if ! assignment.contains(id) {
                if let Some(value) = self.graph.node(id).and_then(|v| v.domain().first()) {
                    assignment.set(id, value.clone());
                }
            }
        }

        Ok(assignment)
    }

}
