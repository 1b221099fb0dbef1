//! Definition of the variable module
//!
//! A `RandomVariable` represents a discrete random variable in a Probabilistic Graphical Model: a
//! string id, an ordered finite domain of `Value`s, and a marginal distribution over that domain.
//! Variables are immutable once built and are shared between graphs, factors and models as `Var`
//! (an `Arc<RandomVariable>`).

use std::cmp::Ordering;
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::{self, FromIterator};
use std::sync::Arc;

use itertools::Itertools;

use crate::error::{PgmError, Result};

/// A single outcome of a `RandomVariable`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Text(String)
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl<'a> From<&'a str> for Value {
    fn from(v: &'a str) -> Self {
        Value::Text(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Text(v) => write!(f, "{}", v)
        }
    }
}


/// The marginal distribution of a `RandomVariable`
pub type Distribution = Arc<dyn Fn(&Value) -> f64 + Send + Sync>;

/// A shared handle to a `RandomVariable`
pub type Var = Arc<RandomVariable>;


/// A discrete random variable.
///
/// Two variables are the same variable when their ids are equal. Hashing and ordering follow the
/// id as well, which keeps every scope and registry in the crate keyed consistently.
#[derive(Clone)]
pub struct RandomVariable {
    /// The unique id of the variable
    id: String,

    /// The ordered outcomes of the variable
    domain: Vec<Value>,

    /// Marginal probability of each outcome
    distribution: Distribution,

    /// Node-level evidence, fixed for every model the variable takes part in
    evidence: Option<Value>
}

impl RandomVariable {

    /// Create a new `RandomVariable`
    ///
    /// # Args
    /// * `id`: the unique id of the variable
    /// * `domain`: the ordered outcomes of the variable
    /// * `distribution`: the marginal probability of each outcome
    ///
    /// # Errors
    /// * `PgmError::InvalidVariable` if the domain is empty or holds a value twice
    pub fn new<F>(id: &str, domain: Vec<Value>, distribution: F) -> Result<Self>
        where F: Fn(&Value) -> f64 + Send + Sync + 'static
    {
        if domain.is_empty() {
            return Err(PgmError::InvalidVariable(format!("{} has an empty domain", id)));
        }

        if domain.iter().unique().count() != domain.len() {
            return Err(
                PgmError::InvalidVariable(format!("{} has duplicate values in its domain", id))
            );
        }

        Ok(RandomVariable {
            id: String::from(id),
            domain,
            distribution: Arc::new(distribution),
            evidence: None
        })
    }

    /// Create a binary variable with the domain `[true, false]`
    pub fn binary<F>(id: &str, distribution: F) -> Self
        where F: Fn(&Value) -> f64 + Send + Sync + 'static
    {
        RandomVariable {
            id: String::from(id),
            domain: vec![ Value::Bool(true), Value::Bool(false) ],
            distribution: Arc::new(distribution),
            evidence: None
        }
    }

    /// Fix the value of this variable. Every model built over the variable reduces its factors by
    /// this value at construction time.
    ///
    /// # Errors
    /// * `PgmError::InvalidEvidence` if the value is not in the domain
    pub fn with_evidence<V: Into<Value>>(mut self, value: V) -> Result<Self> {
        let value = value.into();
        if ! self.domain.contains(&value) {
            return Err(
                PgmError::InvalidEvidence(format!("{} is not in the domain of {}", value, self.id))
            );
        }

        self.evidence = Some(value);
        Ok(self)
    }

    /// Wrap the variable for sharing
    pub fn shared(self) -> Var {
        Arc::new(self)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn domain(&self) -> &[Value] {
        &self.domain
    }

    /// The number of outcomes of this variable
    pub fn cardinality(&self) -> usize {
        self.domain.len()
    }

    /// The position of a value in the domain, if present
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.domain.iter().position(|v| v == value)
    }

    /// The marginal probability of `value`. Values outside the domain have probability 0.
    pub fn marginal(&self, value: &Value) -> f64 {
        if self.domain.contains(value) {
            (self.distribution)(value)
        } else {
            0.
        }
    }

    pub fn evidence(&self) -> Option<&Value> {
        self.evidence.as_ref()
    }


    /// The expectation of `phi` applied to the variable, ```E[phi(X)] = sum_i phi(x_i) p(x_i)```
    /// (Biagini & Campanino, p. 11)
    ///
    /// # Errors
    /// * `PgmError::InvalidVariable` if the domain holds a value that is not an integer
    pub fn expectation_of<F>(&self, phi: F) -> Result<f64>
        where F: Fn(f64) -> f64
    {
        self.domain.iter().try_fold(0., |acc, value| match value {
            Value::Int(x) => Ok(acc + phi(*x as f64) * self.marginal(value)),
            _ => Err(PgmError::InvalidVariable(format!("{} has a non-numeric value {}", self.id, value)))
        })
    }

    /// ```E[X]```, Koller & Friedman p. 31
    pub fn expected_value(&self) -> Result<f64> {
        self.expectation_of(|x| x)
    }

    /// ```E[X^2] - E[X]^2```, Koller & Friedman p. 33
    pub fn variance(&self) -> Result<f64> {
        let mean = self.expected_value()?;
        Ok(self.expectation_of(|x| x * x)? - mean * mean)
    }

    pub fn standard_deviation(&self) -> Result<f64> {
        self.variance().map(f64::sqrt)
    }

    /// ```E[XY]``` for `other` independent of this variable, the product of the expected values
    pub fn joint(&self, other: &RandomVariable) -> Result<f64> {
        Ok(self.expected_value()? * other.expected_value()?)
    }

}

impl fmt::Debug for RandomVariable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("RandomVariable")
            .field("id", &self.id)
            .field("domain", &self.domain)
            .field("evidence", &self.evidence)
            .finish()
    }
}

impl PartialEq for RandomVariable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RandomVariable {}

impl Hash for RandomVariable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for RandomVariable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RandomVariable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}


/// An `Assignment` maps variable ids to values. At most one value per id; equality does not
/// depend on the order in which values were set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Assignment {
    values: BTreeMap<String, Value>
}

impl Assignment {

    /// Create an empty `Assignment`
    pub fn new() -> Self {
        Assignment { values: BTreeMap::new() }
    }

    /// Assign `value` to the variable `id`, replacing any previous value
    pub fn set<V: Into<Value>>(&mut self, id: &str, value: V) {
        self.values.insert(String::from(id), value.into());
    }

    /// Builder form of `set`
    pub fn with<V: Into<Value>>(mut self, id: &str, value: V) -> Self {
        self.set(id, value);
        self
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.values.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.values.contains_key(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Value> {
        self.values.remove(id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The assigned variable ids, in id order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> btree_map::Iter<String, Value> {
        self.values.iter()
    }

    /// Copy every pair of `other` into this assignment. Values in `other` win.
    pub fn extend(&mut self, other: &Assignment) {
        for (k, v) in other.iter() {
            self.values.insert(k.clone(), v.clone());
        }
    }

    /// The restriction of this assignment to the given ids
    pub fn restrict<'a, I>(&self, ids: I) -> Assignment
        where I: IntoIterator<Item = &'a str>
    {
        ids.into_iter()
            .filter_map(|id| self.values.get(id).map(|v| (String::from(id), v.clone())))
            .collect()
    }

}

impl FromIterator<(String, Value)> for Assignment {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Assignment { values: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a Assignment {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.values.iter().map(|(k, v)| format!("{}={}", k, v)).join(", ")
        )
    }
}


/// Every joint assignment over `scope`, in row-major order of the scope as given (the last
/// variable changes fastest). The empty scope has exactly one assignment, the empty one.
pub fn all_assignments<'a>(scope: &'a [Var]) -> Box<dyn Iterator<Item = Assignment> + 'a> {
    if scope.is_empty() {
        return Box::new(iter::once(Assignment::new()));
    }

    Box::new(
        scope.iter()
            .map(|v| v.domain().iter().map(move |x| (String::from(v.id()), x.clone())))
            .multi_cartesian_product()
            .map(|pairs| pairs.into_iter().collect())
    )
}
