//! Definition of the factor module
//!
//! A `Factor` represents a relationship between some set of `RandomVariable`s: a non-negative
//! function over every joint assignment of its scope, stored as a dense table. Axis `i` of the
//! table is indexed by the domain position of the `i`th scope variable, and the scope is always
//! kept sorted by variable id.

mod ops;

pub use self::ops::Mode;

use itertools::Itertools;
use ndarray::prelude as nd;
use ndarray::{Dimension, IxDyn};

use crate::error::{PgmError, Result};
use crate::variable::{all_assignments, Assignment, Var};

/// Alias f64 ndarray::Array as Table
pub type Table = nd::ArrayD<f64>;


/// A function that assigns a non-negative value to an assignment of a factor's scope.
///
/// Returning `None` means the function does not recognize the assignment, which surfaces as
/// `PgmError::UnknownAssignment` when the factor is built.
pub trait FactorFn {

    fn evaluate(&self, assignment: &Assignment) -> Option<f64>;

}

impl<F> FactorFn for F where F: Fn(&Assignment) -> Option<f64> {

    fn evaluate(&self, assignment: &Assignment) -> Option<f64> {
        self(assignment)
    }

}


#[derive(Clone, Debug)]
pub struct Factor {
    /// The id of the `Factor`. Derived factors get an id built from their scope.
    id: String,

    /// The scope of the `Factor`, sorted by variable id
    scope: Vec<Var>,

    /// The values of the `Factor` table
    table: Table
}


impl Factor {

    /// Create a new `Factor` from a table whose axes follow the order of `scope`.
    ///
    /// # Args
    /// * `id`: the id of the factor
    /// * `scope`: the variables of the factor, in the order of the table's axes
    /// * `table`: the values of the factor
    ///
    /// # Errors
    /// * `PgmError::InvalidFactor` if the table dimensions do not match the scope, or the table
    ///   holds a negative or non-finite value
    /// * `PgmError::InvalidScope` if a variable appears twice in the scope
    pub fn new(id: &str, scope: Vec<Var>, table: Table) -> Result<Self> {
        if scope.len() != table.ndim() {
            return Err(PgmError::InvalidFactor(format!(
                "{}: scope has {} variables but the table has {} dimensions",
                id, scope.len(), table.ndim()
            )));
        }

        for (v, &n) in scope.iter().zip(table.shape().iter()) {
            if v.cardinality() != n {
                return Err(PgmError::InvalidFactor(format!(
                    "{}: {} has {} values but the table axis has length {}",
                    id, v.id(), v.cardinality(), n
                )));
            }
        }

        if table.iter().any(|&x| ! (x >= 0.) || ! x.is_finite()) {
            return Err(PgmError::InvalidFactor(format!("{}: values must be finite and non-negative", id)));
        }

        check_unique(id, &scope)?;

        // put the axes in id order
        let perm: Vec<usize> = (0..scope.len())
            .sorted_by(|&i, &j| scope[i].id().cmp(scope[j].id()))
            .collect();
        let table = table.permuted_axes(&perm[..]).as_standard_layout().into_owned();
        let scope = perm.iter().map(|&i| scope[i].clone()).collect();

        Ok(Factor { id: String::from(id), scope, table })
    }


    /// Create a new `Factor` by evaluating `f` on every assignment of `scope`.
    ///
    /// # Errors
    /// * `PgmError::UnknownAssignment` if `f` returns `None` for some assignment
    /// * `PgmError::InvalidFactor` if `f` returns a negative or non-finite value
    /// * `PgmError::InvalidScope` if a variable appears twice in the scope
    pub fn from_fn<F>(id: &str, scope: Vec<Var>, f: F) -> Result<Self>
        where F: Fn(&Assignment) -> Option<f64>
    {
        Factor::tabulate(id, scope, &f)
    }


    /// Create a new `Factor` from any `FactorFn`
    pub fn tabulate(id: &str, scope: Vec<Var>, f: &dyn FactorFn) -> Result<Self> {
        let scope = sorted_scope(id, scope)?;
        let shape = shape_of(&scope);

        let mut values = Vec::with_capacity(shape.iter().product());
        for assignment in all_assignments(&scope) {
            match f.evaluate(&assignment) {
                Some(v) if v >= 0. && v.is_finite() => values.push(v),
                Some(v) => {
                    return Err(PgmError::InvalidFactor(format!("{} maps {} to {}", id, assignment, v)));
                },
                None => {
                    return Err(PgmError::UnknownAssignment(format!("{} cannot evaluate {}", id, assignment)));
                }
            }
        }

        let table = Table::from_shape_vec(IxDyn(&shape), values)
            .map_err(|e| PgmError::InvalidFactor(format!("{}: {}", id, e)))?;

        Ok(Factor { id: String::from(id), scope, table })
    }


    /// The product of the marginal distributions of the scope variables. This is the default
    /// factor placed on an edge when a model is built without explicit factors.
    pub fn from_marginals(id: &str, scope: Vec<Var>) -> Result<Self> {
        let vars = scope.clone();
        Factor::from_fn(id, scope, move |assignment| {
            vars.iter()
                .map(|v| assignment.get(v.id()).map(|x| v.marginal(x)))
                .product()
        })
    }


    /// Get the identity factor: empty scope, value 1
    pub fn identity() -> Self {
        Factor {
            id: String::from("identity"),
            scope: vec![],
            table: Table::from_elem(IxDyn(&[]), 1.)
        }
    }


    /// A factor with value 1 on every assignment of `scope`
    pub fn ones(id: &str, scope: Vec<Var>) -> Result<Self> {
        let scope = sorted_scope(id, scope)?;
        let table = Table::ones(IxDyn(&shape_of(&scope)));
        Ok(Factor { id: String::from(id), scope, table })
    }


    pub fn id(&self) -> &str {
        &self.id
    }


    /// Rename the factor
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = String::from(id);
        self
    }


    /// Retrieve the scope of the `Factor`, sorted by id
    pub fn scope(&self) -> &[Var] {
        &self.scope
    }


    /// Retrieve the ids of the scope variables, sorted
    pub fn scope_ids(&self) -> Vec<&str> {
        self.scope.iter().map(|v| v.id()).collect()
    }


    /// Check if the variable `id` is part of the scope
    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }


    /// Look up a scope variable by id
    pub fn variable(&self, id: &str) -> Option<&Var> {
        self.position(id).map(|i| &self.scope[i])
    }


    pub fn table(&self) -> &Table {
        &self.table
    }


    /// Check if the `Factor` has an empty scope
    pub fn is_scalar(&self) -> bool {
        self.scope.is_empty()
    }


    /// Check if the `Factor` is the identity `Factor`
    pub fn is_identity(&self) -> bool {
        self.is_scalar() && self.table.iter().all(|&x| x == 1.)
    }


    /// Retrieve the value for an assignment over the scope of this `Factor`
    ///
    /// # Args
    /// assignment: a full assignment to the scope of a `Factor`. The assignment's scope may be a
    ///             superset of the `Factor`s scope.
    ///
    /// # Returns
    /// the value of the assignment, or an error.
    ///
    /// # Errors
    /// * `PgmError::UnknownAssignment`, if a scope variable is missing from the assignment or has
    ///   a value outside its domain
    pub fn value(&self, assignment: &Assignment) -> Result<f64> {
        let idx = self.locate(assignment)?;
        Ok(self.table[IxDyn(&idx)])
    }


    /// The sum of the factor over every assignment of its scope
    pub fn partition(&self) -> f64 {
        self.table.sum()
    }


    /// The value of `assignment` divided by the sum over every assignment of the scope.
    ///
    /// # Errors
    /// * `PgmError::DivisionByZero` if the factor sums to zero
    /// * `PgmError::UnknownAssignment` as for `value`
    pub fn normalized_value(&self, assignment: &Assignment) -> Result<f64> {
        let z = self.partition();
        if z == 0. {
            return Err(PgmError::DivisionByZero);
        }

        Ok(self.value(assignment)? / z)
    }


    /// A copy of the factor scaled to sum to 1
    ///
    /// # Errors
    /// * `PgmError::DivisionByZero` if the factor sums to zero
    pub fn normalize(&self) -> Result<Self> {
        let z = self.partition();
        if z == 0. {
            return Err(PgmError::DivisionByZero);
        }

        Ok(Factor {
            id: self.id.clone(),
            scope: self.scope.clone(),
            table: &self.table / z
        })
    }


    /// The first assignment, in table order, that attains the largest value, and that value
    pub fn argmax(&self) -> (Assignment, f64) {
        let mut best_idx = vec![0; self.scope.len()];
        let mut best = f64::NEG_INFINITY;

        for (idx, &v) in self.table.indexed_iter() {
            if v > best {
                best = v;
                best_idx = idx.slice().to_vec();
            }
        }

        (self.assignment_at(&best_idx), best)
    }


    /// Every assignment of the scope paired with its value, in table order
    pub fn assignments(&self) -> impl Iterator<Item = (Assignment, f64)> + '_ {
        all_assignments(&self.scope).zip(self.table.iter().cloned())
    }


    fn position(&self, id: &str) -> Option<usize> {
        self.scope.iter().position(|v| v.id() == id)
    }


    fn locate(&self, assignment: &Assignment) -> Result<Vec<usize>> {
        self.scope.iter()
            .map(|v| {
                let value = assignment.get(v.id()).ok_or_else(|| {
                    PgmError::UnknownAssignment(format!("{} has no value for {}", assignment, v.id()))
                })?;

                v.index_of(value).ok_or_else(|| {
                    PgmError::UnknownAssignment(format!("{} is not in the domain of {}", value, v.id()))
                })
            })
            .collect()
    }


    fn assignment_at(&self, idx: &[usize]) -> Assignment {
        self.scope.iter()
            .zip(idx.iter())
            .map(|(v, &i)| (String::from(v.id()), v.domain()[i].clone()))
            .collect()
    }

}


fn shape_of(scope: &[Var]) -> Vec<usize> {
    scope.iter().map(|v| v.cardinality()).collect()
}


fn check_unique(id: &str, scope: &[Var]) -> Result<()> {
    match scope.iter().map(|v| v.id()).duplicates().next() {
        Some(dup) => Err(PgmError::InvalidScope(format!("{} names {} twice", id, dup))),
        None => Ok(())
    }
}


fn sorted_scope(id: &str, mut scope: Vec<Var>) -> Result<Vec<Var>> {
    check_unique(id, &scope)?;
    scope.sort();
    Ok(scope)
}
