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

//! This module provides the AllEqual global constraint: all variables in
//! scope must take the same value.

use fxhash::FxHashMap;

use crate::{Constraint, Scope, Variable};

/// The AllEqual constraint. The error is the number of variables that would
/// have to change for the scope to agree on one value, i.e. the scope size
/// minus the highest value frequency. A value-frequency table supports the
/// delta simulation.
pub struct AllEqual {
    scope: Scope,
    count: FxHashMap<isize, i64>,
}

impl AllEqual {
    pub fn new(variable_ids: Vec<usize>) -> Self {
        AllEqual { scope: Scope::new(variable_ids), count: FxHashMap::default() }
    }

    fn highest_frequency(count: &FxHashMap<isize, i64>) -> i64 {
        count.values().copied().max().unwrap_or(0)
    }
}

impl Constraint for AllEqual {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn required_error(&self, variables: &[Variable]) -> f64 {
        let mut count: FxHashMap<isize, i64> = FxHashMap::default();
        for &id in self.scope.ids() {
            *count.entry(variables[id].value()).or_insert(0) += 1;
        }
        (self.scope.len() as i64 - Self::highest_frequency(&count)) as f64
    }

    fn simulate_delta(
        &self,
        variables: &[Variable],
        changed: &[usize],
        new_values: &[isize],
    ) -> Option<f64> {
        // adjustments implied by the hypothetical move, at most 4 distinct
        let mut touched: [(isize, i64); 4] = [(0, 0); 4];
        let mut used = 0;
        let mut bump = |touched: &mut [(isize, i64); 4], value: isize, by: i64| {
            for slot in touched.iter_mut().take(used) {
                if slot.0 == value {
                    slot.1 += by;
                    return;
                }
            }
            touched[used] = (value, by);
            used += 1;
        };
        for (&id, &new_value) in changed.iter().zip(new_values) {
            bump(&mut touched, variables[id].value(), -1);
            bump(&mut touched, new_value, 1);
        }

        let adjustment_of = |value: isize| {
            touched
                .iter()
                .take(used)
                .find(|&&(v, _)| v == value)
                .map(|&(_, by)| by)
                .unwrap_or(0)
        };

        let old_max = Self::highest_frequency(&self.count);
        let mut new_max = 0;
        for (&value, &occurrences) in self.count.iter() {
            new_max = new_max.max(occurrences + adjustment_of(value));
        }
        for &(value, adjustment) in touched.iter().take(used) {
            if !self.count.contains_key(&value) {
                new_max = new_max.max(adjustment);
            }
        }
        Some((old_max - new_max) as f64)
    }

    fn update_after_move(&mut self, variables: &[Variable], variable_id: usize, new_value: isize) {
        let previous = variables[variable_id].value();
        if let Some(count) = self.count.get_mut(&previous) {
            *count -= 1;
            if *count == 0 {
                self.count.remove(&previous);
            }
        }
        *self.count.entry(new_value).or_insert(0) += 1;
    }

    fn refresh(&mut self, variables: &[Variable]) {
        self.count.clear();
        for &id in self.scope.ids() {
            *self.count.entry(variables[id].value()).or_insert(0) += 1;
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_all_equal {
    use crate::*;

    fn variables(values: &[isize]) -> Vec<Variable> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let mut var = Variable::range(format!("v{i}"), 1, 5).unwrap();
                var.set_value(v).unwrap();
                var
            })
            .collect()
    }

    #[test]
    fn error_is_the_distance_to_unanimity() {
        let constraint = AllEqual::new(vec![0, 1, 2]);
        assert_eq!(constraint.required_error(&variables(&[2, 2, 2])), 0.0);
        assert_eq!(constraint.required_error(&variables(&[2, 2, 3])), 1.0);
        assert_eq!(constraint.required_error(&variables(&[1, 2, 3])), 2.0);
    }

    #[test]
    fn delta_matches_a_full_reevaluation() {
        let mut vars = variables(&[2, 2, 3]);
        let mut constraint = AllEqual::new(vec![0, 1, 2]);
        constraint.refresh(&vars);
        let before = constraint.required_error(&vars);

        for candidate in 1..=5isize {
            let delta = constraint.simulate_delta(&vars, &[2], &[candidate]).unwrap();
            let backup = vars[2].value();
            vars[2].set_value(candidate).unwrap();
            let after = constraint.required_error(&vars);
            vars[2].set_value(backup).unwrap();
            assert_eq!(delta, after - before, "candidate {candidate}");
        }
    }

    #[test]
    fn delta_handles_two_simultaneous_changes() {
        let mut vars = variables(&[1, 2, 3]);
        let mut constraint = AllEqual::new(vec![0, 1, 2]);
        constraint.refresh(&vars);
        let before = constraint.required_error(&vars);

        let delta = constraint.simulate_delta(&vars, &[0, 1], &[3, 3]).unwrap();
        vars[0].set_value(3).unwrap();
        vars[1].set_value(3).unwrap();
        assert_eq!(delta, constraint.required_error(&vars) - before);
    }
}
