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

//! This module defines the `Objective` contract and the engine-side wrapper
//! that normalizes every objective into a minimization. Pure satisfaction
//! problems simply carry no objective: the wrapper then reports a constant
//! zero cost.

use crate::{Scope, Variable};

/// The contract of an objective function. Like a constraint, an objective
/// bears on a scope of variables and scores the current assignment; unlike a
/// constraint, its score carries no satisfaction meaning and the engine only
/// ever compares scores with each other.
///
/// Maximization is declared through `is_maximization`: the engine negates the
/// raw cost internally so that the whole search machinery deals with
/// minimization only, and un-negates it again when reporting results.
pub trait Objective {
    /// The scope of this objective.
    fn scope(&self) -> &Scope;

    /// The exact cost of the given assignment, in the user's direction (a
    /// maximization objective returns the quantity to maximize).
    fn required_cost(&self, variables: &[Variable]) -> f64;

    /// Whether this objective is to be maximized. Defaults to minimization.
    fn is_maximization(&self) -> bool {
        false
    }

    /// Called after an accepted local move, once per updated variable, with
    /// the pre-move assignment still in place. Lets the objective refresh
    /// whatever private state it maintains.
    fn update_after_move(&mut self, variables: &[Variable], variable_id: usize, new_value: isize) {
        let _ = (variables, variable_id, new_value);
    }
}

/// The engine-side view of the (possibly absent) objective. All costs flowing
/// through the search are *internal* costs: already negated for maximization
/// problems, so that lower always means better.
pub struct ObjectiveState {
    function: Option<Box<dyn Objective>>,
    sign: f64,
}

impl ObjectiveState {
    pub fn new(function: Option<Box<dyn Objective>>) -> Self {
        let sign = match &function {
            Some(objective) if objective.is_maximization() => -1.0,
            _ => 1.0,
        };
        ObjectiveState { function, sign }
    }

    /// True iff the model carries an actual objective.
    pub fn is_optimization(&self) -> bool {
        self.function.is_some()
    }

    /// The internal (minimization-direction) cost of the given assignment.
    /// Zero when there is no objective.
    pub fn cost(&self, variables: &[Variable]) -> f64 {
        match &self.function {
            Some(objective) => self.sign * objective.required_cost(variables),
            None => 0.0,
        }
    }

    /// Translates an internal cost back into the user's direction.
    pub fn user_cost(&self, internal_cost: f64) -> f64 {
        self.sign * internal_cost
    }

    /// Forwards an accepted move to the objective, if any and if the updated
    /// variable is in its scope.
    pub fn update_after_move(
        &mut self,
        variables: &[Variable],
        variable_id: usize,
        new_value: isize,
    ) {
        if let Some(objective) = &mut self.function {
            if objective.scope().contains(variable_id) {
                objective.update_after_move(variables, variable_id, new_value);
            }
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_objective_state {
    use crate::{Objective, ObjectiveState, Scope, Variable};

    struct SumOf {
        scope: Scope,
        maximize: bool,
    }
    impl Objective for SumOf {
        fn scope(&self) -> &Scope {
            &self.scope
        }
        fn required_cost(&self, variables: &[Variable]) -> f64 {
            self.scope.ids().iter().map(|&id| variables[id].value() as f64).sum()
        }
        fn is_maximization(&self) -> bool {
            self.maximize
        }
    }

    fn variables() -> Vec<Variable> {
        vec![
            Variable::with_index("a", vec![0, 1, 2], 2).unwrap(),
            Variable::with_index("b", vec![0, 1, 2], 1).unwrap(),
        ]
    }

    #[test]
    fn no_objective_means_constant_zero() {
        let state = ObjectiveState::new(None);
        assert!(!state.is_optimization());
        assert_eq!(state.cost(&variables()), 0.0);
    }

    #[test]
    fn minimization_costs_flow_through_unchanged() {
        let state = ObjectiveState::new(Some(Box::new(SumOf {
            scope: Scope::new(vec![0, 1]),
            maximize: false,
        })));
        assert!(state.is_optimization());
        assert_eq!(state.cost(&variables()), 3.0);
        assert_eq!(state.user_cost(3.0), 3.0);
    }

    #[test]
    fn maximization_costs_are_negated_internally() {
        let state = ObjectiveState::new(Some(Box::new(SumOf {
            scope: Scope::new(vec![0, 1]),
            maximize: true,
        })));
        assert_eq!(state.cost(&variables()), -3.0);
        assert_eq!(state.user_cost(-3.0), 3.0);
    }
}
