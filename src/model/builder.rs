//! An implementation of the [builder pattern] for assembling any kind of model.
//!
//! The builder records the first error it runs into and reports it when the model is built, so
//! calls can be chained without checking each one.
//!
//! [builder pattern]: https://en.wikipedia.org/wiki/Builder_pattern

use indexmap::IndexMap;

use super::{BayesianNetwork, ConditionalRandomField, LwfChainGraph, MarkovNetwork, Pgm};
use crate::error::{PgmError, Result};
use crate::factor::Factor;
use crate::graph::Edge;
use crate::init::Initialization;
use crate::variable::{Assignment, Var};


pub struct ModelBuilder {

    id: String,

    /// The variables, by id
    nodes: IndexMap<String, Var>,

    edges: Vec<Edge>,

    factors: Vec<Factor>,

    /// The error state of the builder
    err: Option<PgmError>

}


impl ModelBuilder {

    /// Construct a new `ModelBuilder` representing an empty model
    pub fn new(id: &str) -> Self {
        ModelBuilder {
            id: String::from(id),
            nodes: IndexMap::new(),
            edges: Vec::new(),
            factors: Vec::new(),
            err: None
        }
    }


    /// Add a variable to the model
    pub fn with_variable(mut self, var: Var) -> Self {
        if self.err.is_some() {
            return self;
        }

        if self.nodes.contains_key(var.id()) {
            return self.fail(PgmError::StructuralValidation(format!("node {} declared twice", var.id())));
        }

        self.nodes.insert(String::from(var.id()), var);
        self
    }


    pub fn with_edge(mut self, edge: Edge) -> Self {
        if self.err.is_none() {
            self.edges.push(edge);
        }
        self
    }


    /// Add the edge ```start -> end```
    pub fn with_directed(self, start: &str, end: &str) -> Self {
        self.with_edge(Edge::directed(start, end))
    }


    /// Add the edge ```a -- b```
    pub fn with_undirected(self, a: &str, b: &str) -> Self {
        self.with_edge(Edge::undirected(a, b))
    }


    pub fn with_factor(mut self, factor: Factor) -> Self {
        if self.err.is_none() {
            self.factors.push(factor);
        }
        self
    }


    /// Add a factor tabulated from a function over the variables `scope`, which must already be
    /// in the model.
    pub fn with_factor_fn<F>(self, id: &str, scope: &[&str], f: F) -> Self
        where F: Fn(&Assignment) -> Option<f64>
    {
        if self.err.is_some() {
            return self;
        }

        let factor = self.lookup(scope).and_then(|vars| Factor::from_fn(id, vars, f));
        self.add_factor(factor)
    }


    /// Add a factor over the variables `scope` built by `init`
    pub fn with_initialized(self, id: &str, scope: &[&str], init: Initialization) -> Self {
        if self.err.is_some() {
            return self;
        }

        let factor = self.lookup(scope).and_then(|vars| init.build_factor(id, vars));
        self.add_factor(factor)
    }


    /// Add the CPD ```P(var | parents)``` built by `init`, together with a directed edge from
    /// every parent to `var`.
    ///
    /// # Args
    /// * `var`: the variable the distribution is over
    /// * `parents`: the variables it is conditioned on. For a table, these are the leading axes.
    /// * `init`: the initialization mechanism for the CPD
    pub fn with_cpd(mut self, var: &str, parents: &[&str], init: Initialization) -> Self {
        ///////////////////////////////////////////////////////////////////////
        // 1) if we are in an error state, do nothing
        if self.err.is_some() {
            return self;
        }

        ///////////////////////////////////////////////////////////////////////
        // 2) Look up the variables
        let target = match self.lookup(&[var]) {
            Ok(mut v) => v.remove(0),
            Err(e) => return self.fail(e)
        };

        let parent_vars = match self.lookup(parents) {
            Ok(vs) => vs,
            Err(e) => return self.fail(e)
        };

        ///////////////////////////////////////////////////////////////////////
        // 3) Build the factor based on the initialization
        let factor = match init.build_cpd(&format!("P({})", var), &target, &parent_vars) {
            Ok(f) => f,
            Err(e) => return self.fail(e)
        };

        ///////////////////////////////////////////////////////////////////////
        // 4) Add to current model
        for p in parents {
            let edge = Edge::directed(p, var);
            if ! self.edges.iter().any(|e| e.id() == edge.id()) {
                self.edges.push(edge);
            }
        }

        self.factors.push(factor);
        self
    }


    /// Complete building a generic model.
    ///
    /// # Returns
    /// the `Pgm`, or the first error generated during the building process
    pub fn build(self) -> Result<Pgm> {
        if let Some(e) = self.err {
            return Err(e);
        }

        Pgm::new(&self.id, self.nodes.into_iter().map(|(_, v)| v).collect(), self.edges, self.factors)
    }


    pub fn build_bayesian(self) -> Result<BayesianNetwork> {
        BayesianNetwork::from_pgm(self.build()?)
    }


    pub fn build_markov(self) -> Result<MarkovNetwork> {
        MarkovNetwork::from_pgm(self.build()?)
    }


    /// Build a `ConditionalRandomField` with the variables `observed` observed and every other
    /// variable a target
    pub fn build_crf(self, observed: &[&str]) -> Result<ConditionalRandomField> {
        if let Some(e) = self.err {
            return Err(e);
        }

        if let Some(v) = observed.iter().find(|v| ! self.nodes.contains_key(**v)) {
            return Err(PgmError::InvalidVariable(format!("{} is not a variable of {}", v, self.id)));
        }

        let (obs, targets): (Vec<Var>, Vec<Var>) = self.nodes.into_iter()
            .map(|(_, v)| v)
            .partition(|v| observed.contains(&v.id()));

        ConditionalRandomField::new(&self.id, obs, targets, self.edges, self.factors)
    }


    pub fn build_chain(self) -> Result<LwfChainGraph> {
        LwfChainGraph::from_pgm(self.build()?)
    }


    /// Internal function to look up variables already added to the builder
    fn lookup(&self, ids: &[&str]) -> Result<Vec<Var>> {
        ids.iter()
            .map(|id| {
                self.nodes.get(*id).cloned().ok_or_else(|| {
                    PgmError::InvalidVariable(format!("{} is not a variable of {}", id, self.id))
                })
            })
            .collect()
    }


    fn add_factor(self, factor: Result<Factor>) -> Self {
        match factor {
            Ok(f) => self.with_factor(f),
            Err(e) => self.fail(e)
        }
    }


    fn fail(mut self, e: PgmError) -> Self {
        self.err = Some(e);
        self
    }

}
