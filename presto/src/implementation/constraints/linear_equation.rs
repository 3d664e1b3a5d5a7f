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

//! This module provides the linear (in)equation constraint over a weighted
//! sum of the scope variables, in its three comparison flavors.

use crate::{Constraint, ModelError, Scope, Variable};

/// The comparison flavor of a `LinearEquation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    /// `sum <= rhs`; the error is the excess `max(0, sum - rhs)`.
    LessThanOrEqual,
    /// `sum == rhs`; the error is the distance `|sum - rhs|`.
    Equal,
    /// `sum >= rhs`; the error is the shortfall `max(0, rhs - sum)`.
    GreaterThanOrEqual,
}

/// The constraint `sum(coefficients[i] * variables[i]) <cmp> rhs`. A cached
/// running sum, maintained across accepted moves, makes the delta simulation
/// O(changed variables).
pub struct LinearEquation {
    scope: Scope,
    coefficients: Vec<f64>,
    comparator: Comparator,
    rhs: f64,
    current_sum: f64,
}

impl LinearEquation {
    /// Creates the constraint with one coefficient per scope variable. Fails
    /// if the coefficient vector length does not match the scope.
    pub fn new(
        variable_ids: Vec<usize>,
        coefficients: Vec<f64>,
        comparator: Comparator,
        rhs: f64,
    ) -> Result<Self, ModelError> {
        if coefficients.len() != variable_ids.len() {
            return Err(ModelError::CoefficientMismatch {
                expected: variable_ids.len(),
                actual: coefficients.len(),
            });
        }
        Ok(LinearEquation {
            scope: Scope::new(variable_ids),
            coefficients,
            comparator,
            rhs,
            current_sum: 0.0,
        })
    }

    /// Creates the constraint with all coefficients set to one.
    pub fn sum(variable_ids: Vec<usize>, comparator: Comparator, rhs: f64) -> Self {
        let coefficients = vec![1.0; variable_ids.len()];
        LinearEquation {
            scope: Scope::new(variable_ids),
            coefficients,
            comparator,
            rhs,
            current_sum: 0.0,
        }
    }

    fn compute_error(&self, sum: f64) -> f64 {
        match self.comparator {
            Comparator::LessThanOrEqual => (sum - self.rhs).max(0.0),
            Comparator::Equal => (sum - self.rhs).abs(),
            Comparator::GreaterThanOrEqual => (self.rhs - sum).max(0.0),
        }
    }

    fn compute_sum(&self, variables: &[Variable]) -> f64 {
        self.scope
            .ids()
            .iter()
            .zip(&self.coefficients)
            .map(|(&id, &coefficient)| coefficient * variables[id].value() as f64)
            .sum()
    }
}

impl Constraint for LinearEquation {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn required_error(&self, variables: &[Variable]) -> f64 {
        self.compute_error(self.compute_sum(variables))
    }

    fn simulate_delta(
        &self,
        variables: &[Variable],
        changed: &[usize],
        new_values: &[isize],
    ) -> Option<f64> {
        let mut sum = self.current_sum;
        for (&id, &new_value) in changed.iter().zip(new_values) {
            let position = self.scope.position_of(id)?;
            sum += self.coefficients[position]
                * (new_value - variables[id].value()) as f64;
        }
        Some(self.compute_error(sum) - self.compute_error(self.current_sum))
    }

    fn update_after_move(&mut self, variables: &[Variable], variable_id: usize, new_value: isize) {
        if let Some(position) = self.scope.position_of(variable_id) {
            self.current_sum += self.coefficients[position]
                * (new_value - variables[variable_id].value()) as f64;
        }
    }

    fn refresh(&mut self, variables: &[Variable]) {
        self.current_sum = self.compute_sum(variables);
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_linear_equation {
    use crate::*;

    fn variables(values: &[isize]) -> Vec<Variable> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut var = Variable::range(format!("v{i}"), 0, 11).unwrap();
                var.set_value(v).unwrap();
                var
            })
            .collect()
    }

    #[test]
    fn coefficient_vector_length_is_checked() {
        let err = LinearEquation::new(vec![0, 1], vec![1.0], Comparator::Equal, 3.0);
        assert!(matches!(
            err,
            Err(ModelError::CoefficientMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn the_three_flavors_score_the_same_sum_differently() {
        let vars = variables(&[4, 3]);
        let leq = LinearEquation::sum(vec![0, 1], Comparator::LessThanOrEqual, 5.0);
        let eq = LinearEquation::sum(vec![0, 1], Comparator::Equal, 5.0);
        let geq = LinearEquation::sum(vec![0, 1], Comparator::GreaterThanOrEqual, 5.0);

        assert_eq!(leq.required_error(&vars), 2.0);
        assert_eq!(eq.required_error(&vars), 2.0);
        assert_eq!(geq.required_error(&vars), 0.0);

        let vars = variables(&[1, 2]);
        assert_eq!(leq.required_error(&vars), 0.0);
        assert_eq!(eq.required_error(&vars), 2.0);
        assert_eq!(geq.required_error(&vars), 2.0);
    }

    #[test]
    fn weighted_sums_honor_their_coefficients() {
        let vars = variables(&[2, 1]);
        let constraint =
            LinearEquation::new(vec![0, 1], vec![1.0, 1.25], Comparator::LessThanOrEqual, 3.0)
                .unwrap();
        assert_eq!(constraint.required_error(&vars), 0.25);
    }

    #[test]
    fn delta_matches_a_full_reevaluation() {
        let mut vars = variables(&[4, 3]);
        let mut constraint =
            LinearEquation::new(vec![0, 1], vec![2.0, 1.0], Comparator::Equal, 9.0).unwrap();
        constraint.refresh(&vars);
        let before = constraint.required_error(&vars);

        for candidate in 0..=10isize {
            let delta = constraint.simulate_delta(&vars, &[0], &[candidate]).unwrap();
            let backup = vars[0].value();
            vars[0].set_value(candidate).unwrap();
            let after = constraint.required_error(&vars);
            vars[0].set_value(backup).unwrap();
            assert_eq!(delta, after - before, "candidate {candidate}");
        }
    }

    #[test]
    fn update_tracks_the_running_sum() {
        let mut vars = variables(&[4, 3]);
        let mut constraint = LinearEquation::sum(vec![0, 1], Comparator::Equal, 9.0);
        constraint.refresh(&vars);

        constraint.update_after_move(&vars, 1, 5);
        vars[1].set_value(5).unwrap();

        // a delta simulated from the updated sum equals a recomputation
        let before = constraint.required_error(&vars);
        let delta = constraint.simulate_delta(&vars, &[0], &[0]).unwrap();
        vars[0].set_value(0).unwrap();
        assert_eq!(delta, constraint.required_error(&vars) - before);
    }
}
