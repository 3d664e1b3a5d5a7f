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

//! This module provides the FixValue global constraint: every variable in
//! scope must take one given value.

use crate::{Constraint, Scope, Variable};

/// The FixValue constraint. The error is the cumulated distance between the
/// scope variables and the target value; it needs no private state, so the
/// delta simulation is stateless as well.
pub struct FixValue {
    scope: Scope,
    value: isize,
}

impl FixValue {
    pub fn new(variable_ids: Vec<usize>, value: isize) -> Self {
        FixValue { scope: Scope::new(variable_ids), value }
    }
}

impl Constraint for FixValue {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn required_error(&self, variables: &[Variable]) -> f64 {
        self.scope
            .ids()
            .iter()
            .map(|&id| (variables[id].value() - self.value).abs() as f64)
            .sum()
    }

    fn simulate_delta(
        &self,
        variables: &[Variable],
        changed: &[usize],
        new_values: &[isize],
    ) -> Option<f64> {
        let mut delta = 0.0;
        for (&id, &new_value) in changed.iter().zip(new_values) {
            delta += ((new_value - self.value).abs()
                - (variables[id].value() - self.value).abs()) as f64;
        }
        Some(delta)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
