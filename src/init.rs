//! Module containing initialization routines for the factors of a model.

use ndarray::prelude as nd;
use ndarray::IxDyn;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::error::{PgmError, Result};
use crate::factor::{Factor, Table};
use crate::variable::Var;

/// Largest deviation from 1 tolerated in the rows of a conditional distribution
const CPD_TOLERANCE: f64 = 0.001;

/// Defines possible ways to initialize a `Factor` or a CPD.
#[derive(Clone, Debug)]
pub enum Initialization<'a> {
    /// A uniform distribution over all possibilities
    Uniform,

    /// Randomly initialize the weights
    Random,

    /// Randomly initialize the weights from a generator seeded with the given value
    Seeded(u64),

    /// The product of the marginal distributions of the scope variables
    Marginals,

    /// Initialize the CPD as a Binomial distribution with parameter ```p```.
    /// Note that this `Initialization` is valid only to a binary variable with no parents.
    Binomial(f64),

    /// Initialize the CPD as a Multinomial distribution with parameters ```p_0, p_1...```.
    /// Note that this `Initialization` is valid only to a `Variable` with no parents.
    Multinomial(&'a [f64]),

    /// User defined table. Axes follow the order of the scope handed to the builder; for a CPD
    /// the parents come first and the variable itself is the last axis.
    Table(Table)
}


impl<'a> Initialization<'a> {

    /// Construct a CPD P(var | parents), initialized based on ```self```
    ///
    /// # Args
    /// * `id`: the id of the resulting `Factor`
    /// * `var`: the variable the distribution is over
    /// * `parents`: the variables it is conditioned on
    ///
    /// # Returns
    /// a `Factor` over `parents` and `var` whose values sum to 1 for every assignment of the
    /// parents.
    ///
    /// # Errors
    /// * `PgmError::InvalidFactor` if the initialization does not fit the scope, or a
    ///   user-provided table is not a conditional distribution
    /// * `PgmError::InvalidScope` if `var` is one of its own parents
    pub fn build_cpd(self, id: &str, var: &Var, parents: &[Var]) -> Result<Factor> {
        ///////////////////////////////////////////////////////////////////////////////
        // Check for errors
        match self {
            // A binomial distribution on a non-binary variable
            Initialization::Binomial(_) if var.cardinality() != 2 || ! parents.is_empty() => {
                return Err(PgmError::InvalidFactor(
                    format!("{}: binomial CPD requires a binary variable without parents", id)
                ));
            },

            // A multinomial distribution with an incorrect number of parameters
            Initialization::Multinomial(ps) if ps.len() != var.cardinality() || ! parents.is_empty() => {
                return Err(PgmError::InvalidFactor(
                    format!("{}: multinomial CPD requires one parameter per value and no parents", id)
                ));
            },

            _ => ()
        }

        ///////////////////////////////////////////////////////////////////////////////
        // now, build CPD
        let mut scope: Vec<Var> = parents.to_vec();
        scope.push(var.clone());

        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();
        let last = nd::Axis(shape.len() - 1);

        let tbl = match self {
            Initialization::Uniform => {
                // normalizing constant is just the number of values
                Table::from_elem(IxDyn(&shape), 1. / (var.cardinality() as f64))
            },
            Initialization::Random | Initialization::Seeded(_) => {
                let tbl = self.weights(&shape);
                let z = tbl.sum_axis(last).insert_axis(last);
                &tbl / &z
            },
            Initialization::Marginals => {
                let row: Vec<f64> = var.domain().iter().map(|x| var.marginal(x)).collect();
                Table::from_shape_fn(IxDyn(&shape), |idx| row[idx[shape.len() - 1]])
            },
            Initialization::Binomial(p) => {
                nd::arr1(&[p, 1. - p]).into_dyn()
            },
            Initialization::Multinomial(ps) => {
                nd::arr1(ps).into_dyn()
            },
            Initialization::Table(tbl) => tbl
        };

        check_cpd(id, &tbl, last)?;
        Factor::new(id, scope, tbl)
    }


    /// Construct a factor, initialized based on ```self```
    ///
    /// # Args
    /// * `id`: the id of the resulting `Factor`
    /// * `scope`: the `Variable`s over which to build the `Factor`
    ///
    /// # Returns
    /// a `Factor`, initialized according to ```self```. Uniform and random initializations sum to
    /// 1 over the whole scope.
    ///
    /// # Errors
    /// * `PgmError::InvalidScope` if the scope is empty
    /// * `PgmError::InvalidFactor` if the initialization does not fit the scope
    pub fn build_factor(self, id: &str, scope: Vec<Var>) -> Result<Factor> {
        if scope.is_empty() {
            return Err(PgmError::InvalidScope(format!("{} has an empty scope", id)));
        }

        if scope.len() > 1 {
            match self {
                Initialization::Binomial(_) | Initialization::Multinomial(_) => {
                    return Err(PgmError::InvalidFactor(
                        format!("{}: binomial and multinomial factors need a single variable", id)
                    ));
                },
                _ => ()
            }
        }

        let shape: Vec<usize> = scope.iter().map(|v| v.cardinality()).collect();

        let tbl = match self {
            Initialization::Uniform => {
                let n: usize = shape.iter().product();
                Table::from_elem(IxDyn(&shape), 1. / (n as f64))
            },
            Initialization::Random | Initialization::Seeded(_) => {
                let tbl = self.weights(&shape);
                let z = tbl.sum();
                tbl / z
            },
            Initialization::Marginals => {
                return Factor::from_marginals(id, scope);
            },
            Initialization::Binomial(p) => {
                if shape[0] != 2 {
                    return Err(PgmError::InvalidFactor(format!("{}: binomial on a non-binary variable", id)));
                }
                nd::arr1(&[p, 1. - p]).into_dyn()
            },
            Initialization::Multinomial(ps) => {
                if shape[0] != ps.len() {
                    return Err(PgmError::InvalidFactor(
                        format!("{}: expected {} parameters, got {}", id, shape[0], ps.len())
                    ));
                }
                nd::arr1(ps).into_dyn()
            },
            Initialization::Table(tbl) => tbl
        };

        Factor::new(id, scope, tbl)
    }


    /// Random weights in [1, 100) for the random initializations
    fn weights(&self, shape: &[usize]) -> Table {
        let range = Uniform::new(1., 100.);
        match *self {
            Initialization::Seeded(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                Table::random_using(IxDyn(shape), range, &mut rng)
            },
            _ => Table::random(IxDyn(shape), range)
        }
    }

}


/// Verify that every slice of `tbl` along `axis` sums to 1
fn check_cpd(id: &str, tbl: &Table, axis: nd::Axis) -> Result<()> {
    if axis.index() >= tbl.ndim() {
        return Err(PgmError::InvalidFactor(format!("{}: table has too few dimensions", id)));
    }

    if tbl.sum_axis(axis).iter().any(|&z| (z - 1.).abs() > CPD_TOLERANCE) {
        return Err(PgmError::InvalidFactor(format!("{} is not a conditional distribution", id)));
    }

    Ok(())
}
