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

//! This module provides the ephemeral state a search unit maintains while it
//! runs: the incidence matrix, the tabu deadlines, the error vectors, the
//! best-known records and the run counters.

use crate::{Model, SearchStatistics};

/// The per-worker search state. One such object is owned by every search
/// unit; nothing in it is ever shared across workers.
pub struct SearchUnitData {
    /// Number of variables of the instance.
    pub number_variables: usize,
    /// Number of constraints of the instance.
    pub number_constraints: usize,
    /// Whether the instance carries an objective.
    pub is_optimization: bool,

    /// Incidence matrix: `matrix_var_ctr[variable_id]` is the sorted list of
    /// the ids of the constraints whose scope contains that variable. Built
    /// once, immutable afterwards.
    pub matrix_var_ctr: Vec<Vec<usize>>,

    /// Tabu deadlines: `tabu_until[variable_id]` is the local-move index at
    /// which the variable stops being tabu. A variable is tabu iff its
    /// deadline is strictly greater than `local_moves`; entries decay only
    /// through the local-move counter.
    pub tabu_until: Vec<u64>,

    /// Per-constraint current errors; their sum is `current_sat_error`.
    pub constraint_errors: Vec<f64>,
    /// Per-variable projected errors, maintained by the projection policy.
    pub error_variables: Vec<f64>,

    /// Best satisfaction error seen so far.
    pub best_sat_error: f64,
    /// Best internal objective cost seen on a satisfying assignment.
    pub best_opt_cost: f64,
    /// Satisfaction error of the current assignment.
    pub current_sat_error: f64,
    /// Internal objective cost of the current assignment.
    pub current_opt_cost: f64,

    /// Counters over the whole run.
    pub restarts: u64,
    pub resets: u64,
    pub local_moves: u64,
    pub search_iterations: u64,
    pub local_minimum: u64,
    pub plateau_moves: u64,
    pub plateau_local_minimum: u64,
}

impl SearchUnitData {
    pub fn new(model: &Model) -> Self {
        let number_variables = model.variables.len();
        let number_constraints = model.constraints.len();

        let mut data = SearchUnitData {
            number_variables,
            number_constraints,
            is_optimization: model.is_optimization(),
            matrix_var_ctr: vec![Vec::new(); number_variables],
            tabu_until: vec![0; number_variables],
            constraint_errors: vec![0.0; number_constraints],
            error_variables: vec![0.0; number_variables],
            best_sat_error: f64::MAX,
            best_opt_cost: f64::MAX,
            current_sat_error: f64::MAX,
            current_opt_cost: f64::MAX,
            restarts: 0,
            resets: 0,
            local_moves: 0,
            search_iterations: 0,
            local_minimum: 0,
            plateau_moves: 0,
            plateau_local_minimum: 0,
        };
        data.initialize_matrix(model);
        data
    }

    /// Builds the variable -> constraints incidence matrix as the inverse of
    /// the constraint scopes.
    fn initialize_matrix(&mut self, model: &Model) {
        for variable_id in 0..self.number_variables {
            for (constraint_id, constraint) in model.constraints.iter().enumerate() {
                if constraint.has_variable(variable_id) {
                    self.matrix_var_ctr[variable_id].push(constraint_id);
                }
            }
        }
    }

    /// Tells whether the given variable is currently tabu.
    #[inline]
    pub fn is_tabu(&self, variable_id: usize) -> bool {
        self.tabu_until[variable_id] > self.local_moves
    }

    /// Number of variables currently tabu.
    pub fn tabu_count(&self) -> usize {
        self.tabu_until.iter().filter(|&&until| until > self.local_moves).count()
    }

    /// The run counters, as reported on the outcome.
    pub fn statistics(&self) -> SearchStatistics {
        SearchStatistics {
            restarts: self.restarts,
            resets: self.resets,
            local_moves: self.local_moves,
            search_iterations: self.search_iterations,
            local_minimum: self.local_minimum,
            plateau_moves: self.plateau_moves,
            plateau_local_minimum: self.plateau_local_minimum,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_search_unit_data {
    use crate::*;

    struct TwoConstraints;
    impl ModelBuilder for TwoConstraints {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            create_n_variables(3, 1, 3)
        }
        fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
            vec![
                Box::new(AllDifferent::new(vec![0, 1])),
                Box::new(AllDifferent::new(vec![1, 2])),
            ]
        }
    }

    #[test]
    fn matrix_is_the_inverse_of_the_scopes() {
        let model = Model::build(&TwoConstraints).unwrap();
        let data = SearchUnitData::new(&model);
        assert_eq!(data.matrix_var_ctr, vec![vec![0], vec![0, 1], vec![1]]);

        // incidence symmetry
        for (constraint_id, constraint) in model.constraints.iter().enumerate() {
            for variable_id in 0..data.number_variables {
                assert_eq!(
                    constraint.has_variable(variable_id),
                    data.matrix_var_ctr[variable_id].contains(&constraint_id)
                );
            }
        }
    }

    #[test]
    fn tabu_entries_decay_through_the_local_move_counter() {
        let model = Model::build(&TwoConstraints).unwrap();
        let mut data = SearchUnitData::new(&model);
        assert_eq!(data.tabu_count(), 0);

        data.tabu_until[1] = 2;
        assert!(data.is_tabu(1));
        assert_eq!(data.tabu_count(), 1);

        data.local_moves = 2;
        assert!(!data.is_tabu(1));
        assert_eq!(data.tabu_count(), 0);
    }
}
