//! The algebra defined over `Factor`s: product, marginalization and evidence reduction

use itertools::Itertools;
use ndarray::{Axis, IxDyn};

use super::{shape_of, Factor, Table};
use crate::error::{PgmError, Result};
use crate::variable::{Assignment, Value, Var};

/// How a variable is removed from a factor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Sum over the variable's domain. Used for marginal and posterior queries.
    SumProduct,

    /// Maximize over the variable's domain. Used for most probable explanation queries.
    MaxProduct
}

impl Default for Mode {
    fn default() -> Self {
        Mode::SumProduct
    }
}


impl Factor {

    /// Product of this `Factor` and another `Factor`.
    ///
    /// Defined in Koller & Friedman Section 4.2.1. The scopes need not intersect; the product of
    /// factors over disjoint scopes is their outer product.
    ///
    /// # Args
    /// other: the `Factor` to multiply with.
    ///
    /// # Returns
    /// A new `Factor` of scope union(self.scope(), other.scope())
    ///
    /// # Errors
    /// * `PgmError::InvalidScope`, if both scopes hold a variable with the same id but different
    ///   domains
    pub fn product(&self, other: &Factor) -> Result<Factor> {
        for v in other.scope() {
            if let Some(u) = self.variable(v.id()) {
                if u.domain() != v.domain() {
                    return Err(PgmError::InvalidScope(format!(
                        "{} and {} disagree on the domain of {}", self.id, other.id, v.id()
                    )));
                }
            }
        }

        // Psi(X, Y, Z) = phi1(X, Y) * phi2(Y, Z). See Koller & Friedman Definition 4.2
        let scope: Vec<Var> = self.scope.iter()
            .chain(other.scope.iter())
            .cloned()
            .unique()
            .sorted()
            .collect();

        let lhs = axes_within(&self.scope, &scope)?;
        let rhs = axes_within(&other.scope, &scope)?;

        let table = Table::from_shape_fn(IxDyn(&shape_of(&scope)), |idx| {
            let l: Vec<usize> = lhs.iter().map(|&i| idx[i]).collect();
            let r: Vec<usize> = rhs.iter().map(|&i| idx[i]).collect();
            self.table[IxDyn(&l)] * other.table[IxDyn(&r)]
        });

        Ok(Factor { id: derived_id(&scope), scope, table })
    }


    /// Product of every factor in `factors`. The product of no factors is the identity.
    pub fn product_all<'a, I>(factors: I) -> Result<Factor>
        where I: IntoIterator<Item = &'a Factor>
    {
        factors.into_iter().try_fold(Factor::identity(), |acc, f| acc.product(f))
    }


    /// Remove the variable `id` from the `Factor`, summing or maximizing over its domain.
    ///
    /// Defined in Koller & Friedman 9.3.1 (sum) and 13.2.1 (max)
    ///
    /// # Errors
    /// * `PgmError::InvalidScope` if `id` is not in the scope of the factor
    pub fn marginalize(&self, id: &str, mode: Mode) -> Result<Factor> {
        let axis = self.position(id).ok_or_else(|| {
            PgmError::InvalidScope(format!("{} is not in the scope of {}", id, self.id))
        })?;

        let table = match mode {
            Mode::SumProduct => self.table.sum_axis(Axis(axis)),
            Mode::MaxProduct => {
                self.table.fold_axis(Axis(axis), f64::NEG_INFINITY, |acc, &x| acc.max(x))
            }
        };

        let scope: Vec<Var> = self.scope.iter().filter(|v| v.id() != id).cloned().collect();
        Ok(Factor { id: derived_id(&scope), scope, table })
    }


    /// Reduce the `Factor` by fixing the variable `id` to `value`. A factor that does not mention
    /// `id` is returned unchanged.
    ///
    /// Defined in Koller & Friedman 4.2.3
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` if `value` is outside the domain of the variable
    pub fn reduce_var(&self, id: &str, value: &Value) -> Result<Factor> {
        let axis = match self.position(id) {
            Some(axis) => axis,
            None => return Ok(self.clone())
        };

        let index = self.scope[axis].index_of(value).ok_or_else(|| {
            PgmError::InvalidEvidence(format!("{} is not in the domain of {}", value, id))
        })?;

        let table = self.table.index_axis(Axis(axis), index).to_owned();
        let scope = self.scope.iter().filter(|v| v.id() != id).cloned().collect();

        Ok(Factor { id: self.id.clone(), scope, table })
    }


    /// Reduce the `Factor` over the given partial assignment. Variables of the assignment that are
    /// not in the scope are ignored.
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` if a value is outside the domain of its variable
    pub fn reduce(&self, evidence: &Assignment) -> Result<Factor> {
        evidence.iter().try_fold(self.clone(), |f, (id, value)| f.reduce_var(id, value))
    }

}


/// Position of every variable of `sub` within `sup`
fn axes_within(sub: &[Var], sup: &[Var]) -> Result<Vec<usize>> {
    sub.iter()
        .map(|v| {
            sup.iter()
                .position(|u| u.id() == v.id())
                .ok_or_else(|| PgmError::InvalidScope(format!("{} is missing from the product scope", v.id())))
        })
        .collect()
}


fn derived_id(scope: &[Var]) -> String {
    format!("phi({})", scope.iter().map(|v| v.id()).join(","))
}
