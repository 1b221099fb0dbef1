//! Probabilistic graphical models over discrete random variables: Bayesian networks, Markov
//! networks, conditional random fields and LWF chain graphs, with exact inference by variable
//! elimination.

pub mod error;
pub mod variable;
pub mod factor;
pub mod init;
pub mod graph;
pub mod model;
pub mod inference;

pub use crate::error::{PgmError, Result};
pub use crate::factor::{Factor, FactorFn, Mode};
pub use crate::graph::{Edge, EdgeKind, Graph, GraphLike};
pub use crate::inference::{Answer, EliminationOrder, Query, QueryResult};
pub use crate::model::{
    BayesianNetwork,
    ConditionalRandomField,
    LwfChainGraph,
    MarkovNetwork,
    Model,
    ModelBuilder,
    Pgm
};
pub use crate::variable::{Assignment, RandomVariable, Value, Var};
