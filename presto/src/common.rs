// Copyright 2020 Xavier Gillard
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of
// this software and associated documentation files (the "Software"), to deal in
// the Software without restriction, including without limitation the rights to
// use, copy, modify, merge, publish, distribute, sublicense, and/or sell copies of
// the Software, and to permit persons to whom the Software is furnished to do so,
// subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS
// FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR
// COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER
// IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN
// CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! This module defines the most basic data types that are used throughout all
//! the code of our library (both at the abstraction and implementation levels).
//! These are also the types your client code is likely to work with.

use rand::{rngs::StdRng, Rng};
use thiserror::Error;

// ----------------------------------------------------------------------------
// --- ERRORS -----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The errors that can be detected while declaring a model, before any search
/// is started. When `Solver::solve` returns one of these, no search has been
/// performed at all.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A variable was declared with an empty domain.
    #[error("variable '{name}' has an empty domain")]
    EmptyDomain { name: String },
    /// A variable was declared with the same value twice in its domain.
    #[error("variable '{name}' has duplicate value {value} in its domain")]
    DuplicateValue { name: String, value: isize },
    /// A variable was declared with an initial index outside of its domain.
    #[error("variable '{name}' has initial index {index} but a domain of size {size}")]
    IndexOutOfDomain { name: String, index: usize, size: usize },
    /// A constraint references a variable id that does not exist in the model.
    #[error("constraint {constraint_id} references unknown variable id {variable_id}")]
    UnknownVariableInConstraint {
        constraint_id: usize,
        variable_id: usize,
    },
    /// The objective references a variable id that does not exist in the model.
    #[error("objective references unknown variable id {variable_id}")]
    UnknownVariableInObjective { variable_id: usize },
    /// A coefficient vector does not have one entry per variable in scope.
    #[error("expected {expected} coefficients but {actual} were given")]
    CoefficientMismatch { expected: usize, actual: usize },
}

/// The error returned by `Variable::set_value` when the requested value does
/// not belong to the variable domain. The engine never triggers this error on
/// a legal path: observing it from within a search is a modeling bug and makes
/// the worker halt with its best solution so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value {value} does not belong to the domain of the variable")]
pub struct ValueOutOfDomain {
    pub value: isize,
}

// ----------------------------------------------------------------------------
// --- VARIABLE ---------------------------------------------------------------
// ----------------------------------------------------------------------------

/// This type denotes a variable from the problem at hand. Each variable has a
/// finite ordered domain of integers (held in declaration order, not
/// necessarily contiguous) and carries a current value, tracked as an index
/// into that domain. Within a model, a variable is identified by its position
/// in the variables vector declared by the `ModelBuilder`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    name: String,
    domain: Vec<isize>,
    index: usize,
    value: isize,
}

impl Variable {
    /// Creates a new variable with the given domain, initially assigned to the
    /// first domain value. Fails if the domain is empty or contains the same
    /// value twice.
    pub fn new(name: impl Into<String>, domain: Vec<isize>) -> Result<Self, ModelError> {
        Self::with_index(name, domain, 0)
    }

    /// Creates a new variable initially assigned to `domain[index]`.
    pub fn with_index(
        name: impl Into<String>,
        domain: Vec<isize>,
        index: usize,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if domain.is_empty() {
            return Err(ModelError::EmptyDomain { name });
        }
        if index >= domain.len() {
            return Err(ModelError::IndexOutOfDomain {
                name,
                index,
                size: domain.len(),
            });
        }
        for (i, &value) in domain.iter().enumerate() {
            if domain[..i].contains(&value) {
                return Err(ModelError::DuplicateValue { name, value });
            }
        }
        let value = domain[index];
        Ok(Variable {
            name,
            domain,
            index,
            value,
        })
    }

    /// Creates a new variable whose domain is the integer interval
    /// `[start, start + size)`.
    pub fn range(
        name: impl Into<String>,
        start: isize,
        size: usize,
    ) -> Result<Self, ModelError> {
        Self::new(name, (start..start + size as isize).collect())
    }

    /// The name of this variable.
    pub fn name(&self) -> &str {
        &self.name
    }
    /// The value currently assigned to this variable.
    #[inline]
    pub fn value(&self) -> isize {
        self.value
    }
    /// The index (position in the domain) of the current value.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }
    /// The number of values in the domain.
    #[inline]
    pub fn domain_size(&self) -> usize {
        self.domain.len()
    }
    /// The first value of the domain (minimal value for sorted domains).
    pub fn domain_first(&self) -> isize {
        self.domain[0]
    }
    /// The last value of the domain (maximal value for sorted domains).
    pub fn domain_last(&self) -> isize {
        self.domain[self.domain.len() - 1]
    }
    /// Tells whether the given value belongs to the domain.
    pub fn domain_contains(&self, value: isize) -> bool {
        self.domain.contains(&value)
    }
    /// The complete domain, in declaration order.
    pub fn full_domain(&self) -> &[isize] {
        &self.domain
    }

    /// A window of (at most) `range` domain values around the current index.
    /// The window starts at `index - range/2`, wraps around the domain
    /// boundaries, and its values are returned in ascending domain-position
    /// order. Asking for a window at least as large as the domain returns the
    /// full domain.
    pub fn partial_domain(&self, range: usize) -> Vec<isize> {
        let size = self.domain.len();
        if range >= size {
            return self.domain.clone();
        }
        let start = (self.index + size - range / 2) % size;
        let mut positions: Vec<usize> = (0..range).map(|i| (start + i) % size).collect();
        positions.sort_unstable();
        positions.into_iter().map(|p| self.domain[p]).collect()
    }

    /// Assigns the given value to the variable. Fails with `ValueOutOfDomain`
    /// if the value does not belong to the domain.
    pub fn set_value(&mut self, value: isize) -> Result<(), ValueOutOfDomain> {
        match self.domain.iter().position(|&v| v == value) {
            Some(index) => {
                self.index = index;
                self.value = value;
                Ok(())
            }
            None => Err(ValueOutOfDomain { value }),
        }
    }

    /// Assigns a uniformly random domain value to the variable.
    pub(crate) fn pick_random_value(&mut self, rng: &mut StdRng) {
        self.index = rng.gen_range(0..self.domain.len());
        self.value = self.domain[self.index];
    }
}

/// Creates `n` variables sharing the integer interval domain
/// `[start, start + size)`, named `v0` to `v{n-1}`.
pub fn create_n_variables(
    n: usize,
    start: isize,
    size: usize,
) -> Result<Vec<Variable>, ModelError> {
    (0..n).map(|i| Variable::range(format!("v{i}"), start, size)).collect()
}

/// Creates `n` variables sharing the same explicit domain, named `v0` to
/// `v{n-1}`.
pub fn create_n_variables_with_domain(
    n: usize,
    domain: &[isize],
) -> Result<Vec<Variable>, ModelError> {
    (0..n).map(|i| Variable::new(format!("v{i}"), domain.to_vec())).collect()
}

// ----------------------------------------------------------------------------
// --- MOVE -------------------------------------------------------------------
// ----------------------------------------------------------------------------

/// A local move: the single-step transition the engine considers between two
/// configurations. Regular problems reassign one variable; permutation
/// problems exchange the values of two variables (which preserves the
/// multiset of values taken by the assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Move {
    /// Assign `value` to the variable identified by `variable`.
    Assign { variable: usize, value: isize },
    /// Exchange the values of the two identified variables.
    Swap { first: usize, second: usize },
}

impl Move {
    /// The variable this move was selected for (the one subject to tabu
    /// marking when the move is accepted or rejected).
    pub fn selected_variable(&self) -> usize {
        match *self {
            Move::Assign { variable, .. } => variable,
            Move::Swap { first, .. } => first,
        }
    }
}

/// A candidate local move together with the per-constraint error deltas its
/// application would cause. The deltas are listed in incidence-row order
/// (both rows, deduplicated, for a swap) so that they can be replayed onto
/// the constraint errors if the candidate is accepted.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub mv: Move,
    pub deltas: Vec<f64>,
}

impl Candidate {
    /// The cumulated error delta of this candidate.
    pub fn conflict(&self) -> f64 {
        self.deltas.iter().sum()
    }
}

// ----------------------------------------------------------------------------
// --- DIAGNOSTICS ------------------------------------------------------------
// ----------------------------------------------------------------------------

/// An injected sink for diagnostics. The engine performs no I/O on its own:
/// when an implementation of this trait is carried by the options, candidate
/// printing and per-worker diagnostic events (incremental-delta fallbacks,
/// worker aborts) are routed through it.
pub trait Print: Send + Sync {
    /// Renders an assignment, typically for tracing purposes.
    fn candidate(&self, variables: &[Variable]) -> String {
        let mut out = String::new();
        for variable in variables {
            if !out.is_empty() {
                out.push_str(", ");
            }
            out.push_str(&format!("{}={}", variable.name(), variable.value()));
        }
        out
    }
    /// Receives one diagnostic event raised by the given worker.
    fn diagnostic(&self, worker_id: usize, message: &str) {
        let _ = (worker_id, message);
    }
}

// ----------------------------------------------------------------------------
// --- OUTCOME ----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The counters maintained by a search unit over one run. The outcome of a
/// solve carries the counters of the dominant worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStatistics {
    /// Number of full re-samplings of the configuration.
    pub restarts: u64,
    /// Number of partial random re-samplings triggered by the tabu threshold.
    pub resets: u64,
    /// Number of accepted local moves.
    pub local_moves: u64,
    /// Number of iterations of the main search loop.
    pub search_iterations: u64,
    /// Number of local minima escaped by tabu marking.
    pub local_minimum: u64,
    /// Number of accepted zero-delta moves.
    pub plateau_moves: u64,
    /// Number of plateaus escaped by tabu marking instead of walking.
    pub plateau_local_minimum: u64,
}

/// The outcome of a solve: the best assignment found by the dominant worker,
/// its satisfaction error, and (for optimization problems that reached a
/// satisfying assignment) the best objective value.
///
/// The engine is incomplete: `satisfied == false` means "no solution found
/// within budget", never a proof of infeasibility.
#[derive(Debug, Clone)]
pub struct Outcome {
    /// True iff the returned assignment satisfies every constraint.
    pub satisfied: bool,
    /// The satisfaction error of the returned assignment (0 iff satisfied).
    pub best_sat_error: f64,
    /// The objective value of the returned assignment, in the user's
    /// direction (maximization values are reported un-negated). Only present
    /// for optimization problems on which a satisfying assignment was found.
    pub best_cost: Option<f64>,
    /// The best assignment found, one value per variable.
    pub solution: Vec<isize>,
    /// Counters of the worker which produced this outcome.
    pub statistics: SearchStatistics,
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_variable {
    use crate::{ModelError, Variable};

    fn fixture() -> Variable {
        Variable::with_index("x", vec![1, 9, 5, 7, 3], 3).unwrap()
    }

    #[test]
    fn empty_domains_are_rejected() {
        assert_eq!(
            Variable::new("x", vec![]),
            Err(ModelError::EmptyDomain { name: "x".to_string() })
        );
    }

    #[test]
    fn duplicate_values_are_rejected() {
        assert_eq!(
            Variable::new("x", vec![1, 2, 1]),
            Err(ModelError::DuplicateValue { name: "x".to_string(), value: 1 })
        );
    }

    #[test]
    fn initial_index_must_be_in_domain() {
        assert!(Variable::with_index("x", vec![1, 2], 2).is_err());
    }

    #[test]
    fn set_value_roundtrips_over_the_whole_domain() {
        let mut var = fixture();
        for value in [1, 9, 5, 7, 3] {
            var.set_value(value).unwrap();
            assert_eq!(var.value(), value);
        }
    }

    #[test]
    fn set_value_rejects_values_outside_of_the_domain() {
        let mut var = fixture();
        assert!(var.set_value(2).is_err());
        assert!(var.set_value(4).is_err());
        // the failed attempts must not have clobbered the assignment
        assert_eq!(var.value(), 7);
    }

    #[test]
    fn range_builds_a_contiguous_domain() {
        let var = Variable::range("x", 7, 10).unwrap();
        assert_eq!(var.full_domain(), (7..17).collect::<Vec<_>>());
        assert_eq!(var.domain_first(), 7);
        assert_eq!(var.domain_last(), 16);
    }

    #[test]
    fn partial_domain_is_centered_on_the_current_index() {
        let mut var = fixture();
        assert_eq!(var.partial_domain(3), vec![5, 7, 3]);
        assert_eq!(var.partial_domain(5), vec![1, 9, 5, 7, 3]);
        assert_eq!(var.partial_domain(6), vec![1, 9, 5, 7, 3]);

        var.set_value(5).unwrap();
        assert_eq!(var.partial_domain(4), vec![1, 9, 5, 7]);
        assert_eq!(var.partial_domain(1), vec![5]);
    }

    #[test]
    fn partial_domain_wraps_around_the_domain_boundaries() {
        // current index is 0: the window extends to the other end of the
        // domain, and values come back in domain order.
        let var = Variable::new("y", vec![2, 8, 6, 4, 0]).unwrap();
        assert_eq!(var.partial_domain(3), vec![2, 8, 0]);
        assert_eq!(var.partial_domain(5), vec![2, 8, 6, 4, 0]);

        let mut var = Variable::range("z", 7, 10).unwrap();
        var.set_value(8).unwrap();
        assert_eq!(var.partial_domain(5), vec![7, 8, 9, 10, 16]);
    }

    #[test]
    fn helpers_create_homogeneous_variables() {
        let vars = crate::create_n_variables(3, 0, 5).unwrap();
        assert_eq!(vars.len(), 3);
        assert!(vars.iter().all(|v| v.full_domain() == [0, 1, 2, 3, 4]));
        assert_eq!(vars[2].name(), "v2");

        let vars = crate::create_n_variables_with_domain(2, &[3, 1, 4]).unwrap();
        assert!(vars.iter().all(|v| v.full_domain() == [3, 1, 4]));
    }
}

#[cfg(test)]
mod test_move {
    use crate::{Candidate, Move};

    #[test]
    fn selected_variable_is_the_tabu_target() {
        assert_eq!(Move::Assign { variable: 3, value: 1 }.selected_variable(), 3);
        assert_eq!(Move::Swap { first: 2, second: 5 }.selected_variable(), 2);
    }

    #[test]
    fn conflict_is_the_cumulated_delta() {
        let candidate = Candidate {
            mv: Move::Assign { variable: 0, value: 1 },
            deltas: vec![1.5, -0.5, 2.0],
        };
        assert_eq!(candidate.conflict(), 3.0);
    }
}
