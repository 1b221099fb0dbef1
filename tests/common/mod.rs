//! Fixtures shared by the integration tests

#![allow(dead_code)]

use ndarray::ArrayD;
use pgmodel::{Factor, RandomVariable, Var};
use tracing::Level;

/// Route library logs through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

/// A binary variable with a uniform marginal
pub fn binary(id: &str) -> Var {
    RandomVariable::binary(id, |_| 0.5).shared()
}

/// Look up variables by id
pub fn vars(all: &[Var], ids: &[&str]) -> Vec<Var> {
    ids.iter()
        .filter_map(|id| all.iter().find(|v| v.id() == *id).cloned())
        .collect()
}

/// A factor whose table axes follow `ids`
pub fn factor(id: &str, all: &[Var], ids: &[&str], table: ArrayD<f64>) -> Factor {
    Factor::new(id, vars(all, ids), table).expect("Unexpected error")
}
