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

//! This module provides a ready-made linear objective over a weighted sum of
//! the scope variables.

use crate::{ModelError, Objective, Scope, Variable};

/// The objective `sum(coefficients[i] * variables[i])`, either minimized or
/// maximized. This is the objective kind exposed through the C surface.
pub struct LinearObjective {
    scope: Scope,
    coefficients: Vec<f64>,
    maximize: bool,
}

impl LinearObjective {
    /// Creates the objective with one coefficient per scope variable. Fails
    /// if the coefficient vector length does not match the scope.
    pub fn new(
        variable_ids: Vec<usize>,
        coefficients: Vec<f64>,
        maximize: bool,
    ) -> Result<Self, ModelError> {
        if coefficients.len() != variable_ids.len() {
            return Err(ModelError::CoefficientMismatch {
                expected: variable_ids.len(),
                actual: coefficients.len(),
            });
        }
        Ok(LinearObjective { scope: Scope::new(variable_ids), coefficients, maximize })
    }

    /// Convenience constructor for a minimization objective.
    pub fn minimize(variable_ids: Vec<usize>, coefficients: Vec<f64>) -> Result<Self, ModelError> {
        Self::new(variable_ids, coefficients, false)
    }

    /// Convenience constructor for a maximization objective.
    pub fn maximize(variable_ids: Vec<usize>, coefficients: Vec<f64>) -> Result<Self, ModelError> {
        Self::new(variable_ids, coefficients, true)
    }
}

impl Objective for LinearObjective {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn required_cost(&self, variables: &[Variable]) -> f64 {
        self.scope
            .ids()
            .iter()
            .zip(&self.coefficients)
            .map(|(&id, &coefficient)| coefficient * variables[id].value() as f64)
            .sum()
    }

    fn is_maximization(&self) -> bool {
        self.maximize
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_linear_objective {
    use crate::*;

    #[test]
    fn cost_is_the_weighted_sum() {
        let mut vars = create_n_variables(2, 0, 60).unwrap();
        vars[0].set_value(20).unwrap();
        vars[1].set_value(8).unwrap();

        let objective = LinearObjective::maximize(vec![0, 1], vec![500.0, 650.0]).unwrap();
        assert_eq!(objective.required_cost(&vars), 15200.0);
        assert!(objective.is_maximization());
    }

    #[test]
    fn coefficient_vector_length_is_checked() {
        assert!(matches!(
            LinearObjective::minimize(vec![0, 1, 2], vec![1.0]),
            Err(ModelError::CoefficientMismatch { expected: 3, actual: 1 })
        ));
    }
}
