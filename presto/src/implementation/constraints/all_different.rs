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

//! This module provides the AllDifferent global constraint: all variables in
//! scope must take pairwise distinct values.

use fxhash::FxHashMap;

use crate::{Constraint, Scope, Variable};

/// Number of violated difference pairs among `occurrences` equal values.
fn pairs(occurrences: i64) -> f64 {
    if occurrences <= 1 {
        0.0
    } else {
        (occurrences * (occurrences - 1) / 2) as f64
    }
}

/// The AllDifferent constraint, with the soft-alldiff violation measure: the
/// error is the number of pairs of scope variables sharing a value. A
/// value-frequency table keeps `simulate_delta` in O(changed values).
pub struct AllDifferent {
    scope: Scope,
    count: FxHashMap<isize, i64>,
}

impl AllDifferent {
    pub fn new(variable_ids: Vec<usize>) -> Self {
        AllDifferent { scope: Scope::new(variable_ids), count: FxHashMap::default() }
    }

    /// Accumulates one count adjustment, merging repeated values. At most
    /// four slots are ever needed (two changed variables, two values each).
    fn bump(touched: &mut [(isize, i64); 4], used: &mut usize, value: isize, by: i64) {
        for slot in touched.iter_mut().take(*used) {
            if slot.0 == value {
                slot.1 += by;
                return;
            }
        }
        touched[*used] = (value, by);
        *used += 1;
    }
}

impl Constraint for AllDifferent {
    fn scope(&self) -> &Scope {
        &self.scope
    }

    fn required_error(&self, variables: &[Variable]) -> f64 {
        let mut count: FxHashMap<isize, i64> = FxHashMap::default();
        for &id in self.scope.ids() {
            *count.entry(variables[id].value()).or_insert(0) += 1;
        }
        count.values().map(|&c| pairs(c)).sum()
    }

    fn simulate_delta(
        &self,
        variables: &[Variable],
        changed: &[usize],
        new_values: &[isize],
    ) -> Option<f64> {
        let mut touched = [(0isize, 0i64); 4];
        let mut used = 0;
        for (&id, &new_value) in changed.iter().zip(new_values) {
            Self::bump(&mut touched, &mut used, variables[id].value(), -1);
            Self::bump(&mut touched, &mut used, new_value, 1);
        }

        let mut delta = 0.0;
        for &(value, adjustment) in touched.iter().take(used) {
            if adjustment != 0 {
                let occurrences = self.count.get(&value).copied().unwrap_or(0);
                delta += pairs(occurrences + adjustment) - pairs(occurrences);
            }
        }
        Some(delta)
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
mod test_all_different {
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
    fn error_counts_the_violated_pairs() {
        let constraint = AllDifferent::new(vec![0, 1, 2]);
        assert_eq!(constraint.required_error(&variables(&[1, 2, 3])), 0.0);
        assert_eq!(constraint.required_error(&variables(&[1, 1, 3])), 1.0);
        assert_eq!(constraint.required_error(&variables(&[2, 2, 2])), 3.0);
    }

    #[test]
    fn delta_matches_a_full_reevaluation() {
        let mut vars = variables(&[1, 1, 3]);
        let mut constraint = AllDifferent::new(vec![0, 1, 2]);
        constraint.refresh(&vars);
        let before = constraint.required_error(&vars);

        for candidate in 1..=5isize {
            let delta = constraint.simulate_delta(&vars, &[0], &[candidate]).unwrap();
            let backup = vars[0].value();
            vars[0].set_value(candidate).unwrap();
            let after = constraint.required_error(&vars);
            vars[0].set_value(backup).unwrap();
            assert_eq!(delta, after - before, "candidate {candidate}");
        }
    }

    #[test]
    fn swapping_two_scope_variables_leaves_the_error_unchanged() {
        let vars = variables(&[1, 2, 2]);
        let mut constraint = AllDifferent::new(vec![0, 1, 2]);
        constraint.refresh(&vars);
        let delta = constraint.simulate_delta(&vars, &[0, 1], &[2, 1]).unwrap();
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn update_keeps_the_frequency_table_in_sync() {
        let mut vars = variables(&[1, 1, 3]);
        let mut constraint = AllDifferent::new(vec![0, 1, 2]);
        constraint.refresh(&vars);

        // move v0 from 1 to 2, informing the constraint before the change
        constraint.update_after_move(&vars, 0, 2);
        vars[0].set_value(2).unwrap();

        // a delta simulated from the updated table equals a recomputation
        let before = constraint.required_error(&vars);
        let delta = constraint.simulate_delta(&vars, &[1], &[3]).unwrap();
        vars[1].set_value(3).unwrap();
        assert_eq!(delta, constraint.required_error(&vars) - before);
    }
}
