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

//! This module defines the `ModelBuilder` contract -- the object through
//! which users declare their problem -- and the `Model` itself: one
//! independent instance of the declared problem. The driver asks the builder
//! for one fresh instance per worker, so that workers never share any
//! mutable state.

use crate::{
    AuxiliaryData, Constraint, ModelError, Move, NullAuxiliaryData, Objective, ObjectiveState,
    ValueOutOfDomain, Variable,
};

/// The contract through which users declare a problem instance: its
/// variables, its constraints, optionally an objective and an auxiliary
/// derived-state object, and whether the problem must be solved in
/// permutation mode (local moves swap values between variables instead of
/// reassigning one variable, preserving the starting multiset of values).
///
/// The builder is shared by reference across workers; every call must
/// produce an independent, fully fresh set of objects.
pub trait ModelBuilder: Sync {
    /// Declares the variables of the problem. The position of a variable in
    /// the returned vector is its id for the whole run.
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError>;

    /// Declares the constraints of the problem. The position of a constraint
    /// in the returned vector is its id for the whole run.
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![]
    }

    /// Declares the objective function, if the problem is an optimization
    /// problem. Defaults to pure satisfaction.
    fn declare_objective(&self) -> Option<Box<dyn Objective>> {
        None
    }

    /// Declares the auxiliary data, if the model needs any.
    fn declare_auxiliary_data(&self) -> Option<Box<dyn AuxiliaryData>> {
        None
    }

    /// Whether this is a permutation problem.
    fn permutation_problem(&self) -> bool {
        false
    }
}

/// One independent instance of the declared problem: its own copy of the
/// variables, constraints, objective and auxiliary data. Multiple instances
/// coexist during a parallel solve (one per worker).
pub struct Model {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Box<dyn Constraint>>,
    pub objective: ObjectiveState,
    pub auxiliary: Box<dyn AuxiliaryData>,
    pub permutation_problem: bool,
}

impl std::fmt::Debug for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Model")
            .field("variables", &self.variables)
            .field("constraints", &self.constraints.len())
            .field("permutation_problem", &self.permutation_problem)
            .finish()
    }
}

impl Model {
    /// Builds and validates one fresh instance from the given builder. All
    /// the modeling errors (empty or duplicated domains are caught by
    /// `Variable` construction; dangling variable ids in constraint or
    /// objective scopes are caught here) surface before any search starts.
    pub fn build(builder: &dyn ModelBuilder) -> Result<Self, ModelError> {
        let variables = builder.declare_variables()?;
        let constraints = builder.declare_constraints();
        let objective = builder.declare_objective();
        let auxiliary = builder
            .declare_auxiliary_data()
            .unwrap_or_else(|| Box::new(NullAuxiliaryData));

        let n = variables.len();
        for (constraint_id, constraint) in constraints.iter().enumerate() {
            if let Some(&variable_id) =
                constraint.scope().ids().iter().find(|&&id| id >= n)
            {
                return Err(ModelError::UnknownVariableInConstraint {
                    constraint_id,
                    variable_id,
                });
            }
        }
        if let Some(objective) = &objective {
            if let Some(&variable_id) = objective.scope().ids().iter().find(|&&id| id >= n) {
                return Err(ModelError::UnknownVariableInObjective { variable_id });
            }
        }

        Ok(Model {
            variables,
            constraints,
            objective: ObjectiveState::new(objective),
            auxiliary,
            permutation_problem: builder.permutation_problem(),
        })
    }

    /// True iff the model carries an objective.
    pub fn is_optimization(&self) -> bool {
        self.objective.is_optimization()
    }

    /// Applies a local move to the assignment, notifying the auxiliary data
    /// of every changed variable, and returns the inverse move. All state
    /// mutations of the engine -- accepted moves, simulations and their
    /// rollbacks -- are routed through this single function.
    pub fn apply_move(&mut self, mv: Move) -> Result<Move, ValueOutOfDomain> {
        match mv {
            Move::Assign { variable, value } => {
                let previous = self.variables[variable].value();
                self.variables[variable].set_value(value)?;
                self.auxiliary.update(&self.variables, variable, value);
                Ok(Move::Assign { variable, value: previous })
            }
            Move::Swap { first, second } => {
                let first_value = self.variables[first].value();
                let second_value = self.variables[second].value();
                self.variables[first].set_value(second_value)?;
                self.variables[second].set_value(first_value).map_err(|e| {
                    // leave the assignment as it was before the half-applied swap
                    let _ = self.variables[first].set_value(first_value);
                    e
                })?;
                self.auxiliary.update(&self.variables, first, second_value);
                self.auxiliary.update(&self.variables, second, first_value);
                Ok(mv)
            }
        }
    }

    /// The internal objective cost of the current assignment.
    pub fn objective_cost(&self) -> f64 {
        self.objective.cost(&self.variables)
    }

    /// The error delta `constraint_id` would incur if the variables listed in
    /// `changed` took the values listed in `new_values`. Prefers the
    /// constraint's own incremental simulation; falls back to a full
    /// re-evaluation on a temporarily patched assignment when the constraint
    /// does not provide one. `current_error` must be the constraint's error
    /// on the present assignment.
    pub(crate) fn simulate_constraint_delta(
        &mut self,
        constraint_id: usize,
        changed: &[usize],
        new_values: &[isize],
        current_error: f64,
    ) -> Result<f64, ValueOutOfDomain> {
        if let Some(delta) =
            self.constraints[constraint_id].simulate_delta(&self.variables, changed, new_values)
        {
            return Ok(delta);
        }
        // Full re-evaluation: patch, measure, restore.
        let mut saved = [(0usize, 0isize); 2];
        debug_assert!(changed.len() <= 2);
        for (slot, (&id, &value)) in saved.iter_mut().zip(changed.iter().zip(new_values)) {
            *slot = (id, self.variables[id].value());
            self.variables[id].set_value(value)?;
        }
        let error = self.constraints[constraint_id].required_error(&self.variables);
        for &(id, value) in saved.iter().take(changed.len()).rev() {
            self.variables[id].set_value(value)?;
        }
        Ok(error - current_error)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_model {
    use crate::*;

    struct Pair {
        permutation: bool,
    }
    impl ModelBuilder for Pair {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            create_n_variables(2, 1, 3)
        }
        fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
            vec![Box::new(crate::AllDifferent::new(vec![0, 1]))]
        }
        fn permutation_problem(&self) -> bool {
            self.permutation
        }
    }

    struct Dangling;
    impl ModelBuilder for Dangling {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            create_n_variables(2, 1, 3)
        }
        fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
            vec![Box::new(crate::AllDifferent::new(vec![0, 5]))]
        }
    }

    #[test]
    fn build_validates_constraint_scopes() {
        let err = Model::build(&Dangling).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownVariableInConstraint { constraint_id: 0, variable_id: 5 }
        );
    }

    #[test]
    fn assignment_moves_are_invertible() {
        let mut model = Model::build(&Pair { permutation: false }).unwrap();
        let inverse = model
            .apply_move(Move::Assign { variable: 0, value: 3 })
            .unwrap();
        assert_eq!(model.variables[0].value(), 3);
        assert_eq!(inverse, Move::Assign { variable: 0, value: 1 });

        model.apply_move(inverse).unwrap();
        assert_eq!(model.variables[0].value(), 1);
    }

    #[test]
    fn swap_moves_are_their_own_inverse() {
        let mut model = Model::build(&Pair { permutation: true }).unwrap();
        model.apply_move(Move::Assign { variable: 1, value: 2 }).unwrap();

        let inverse = model.apply_move(Move::Swap { first: 0, second: 1 }).unwrap();
        assert_eq!(model.variables[0].value(), 2);
        assert_eq!(model.variables[1].value(), 1);
        assert_eq!(inverse, Move::Swap { first: 0, second: 1 });

        model.apply_move(inverse).unwrap();
        assert_eq!(model.variables[0].value(), 1);
        assert_eq!(model.variables[1].value(), 2);
    }

    #[test]
    fn applying_an_out_of_domain_value_fails() {
        let mut model = Model::build(&Pair { permutation: false }).unwrap();
        assert!(model.apply_move(Move::Assign { variable: 0, value: 9 }).is_err());
        assert_eq!(model.variables[0].value(), 1);
    }

    #[test]
    fn fallback_delta_matches_full_reevaluation() {
        struct NoDelta(Scope);
        impl Constraint for NoDelta {
            fn scope(&self) -> &Scope {
                &self.0
            }
            fn required_error(&self, variables: &[Variable]) -> f64 {
                // satisfied iff both variables are equal
                (variables[0].value() - variables[1].value()).abs() as f64
            }
        }
        struct NoDeltaBuilder;
        impl ModelBuilder for NoDeltaBuilder {
            fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
                create_n_variables(2, 0, 5)
            }
            fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
                vec![Box::new(NoDelta(Scope::new(vec![0, 1])))]
            }
        }

        let mut model = Model::build(&NoDeltaBuilder).unwrap();
        let before = model.constraints[0].required_error(&model.variables);
        let delta = model
            .simulate_constraint_delta(0, &[0], &[4], before)
            .unwrap();
        assert_eq!(delta, 4.0);
        // the simulation must not have mutated the assignment
        assert_eq!(model.variables[0].value(), 0);
    }
}
