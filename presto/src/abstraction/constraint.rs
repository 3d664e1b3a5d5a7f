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

//! This module defines the `Constraint` contract: the complete vocabulary
//! through which the engine talks to a constraint. Constraints own nothing
//! but variable ids; on every call, the engine hands them a read-only view
//! of the whole variable array.

use fxhash::FxHashMap;

use crate::Variable;

/// The scope of a constraint (or of an objective): the ordered list of ids of
/// the variables it bears on, together with the inverse mapping from a global
/// variable id to the position of that variable within the scope. The inverse
/// mapping is computed once, at construction.
#[derive(Debug, Clone)]
pub struct Scope {
    ids: Vec<usize>,
    positions: FxHashMap<usize, usize>,
}

impl Scope {
    pub fn new(ids: Vec<usize>) -> Self {
        let positions = ids.iter().enumerate().map(|(pos, &id)| (id, pos)).collect();
        Scope { ids, positions }
    }
    /// The ids of the variables in scope, in declaration order.
    #[inline]
    pub fn ids(&self) -> &[usize] {
        &self.ids
    }
    /// The number of variables in scope.
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
    /// Tells whether the given variable belongs to the scope.
    #[inline]
    pub fn contains(&self, variable_id: usize) -> bool {
        self.positions.contains_key(&variable_id)
    }
    /// The position of the given variable within the scope, if any.
    #[inline]
    pub fn position_of(&self, variable_id: usize) -> Option<usize> {
        self.positions.get(&variable_id).copied()
    }
}

impl FromIterator<usize> for Scope {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        Scope::new(iter.into_iter().collect())
    }
}

/// This trait defines the contract between the engine and a constraint.
///
/// A constraint scores the current assignment with a nonnegative *error*
/// which must be zero iff the constraint is satisfied. On the hot path, the
/// engine never re-evaluates that error from scratch: it asks the constraint
/// to *simulate* the error delta a hypothetical move would cause
/// (`simulate_delta`) and, once a move is accepted, informs the constraint so
/// it can refresh whatever private counters it maintains to answer those
/// simulations in O(scope) or better (`update_after_move`).
pub trait Constraint {
    /// The scope of this constraint.
    fn scope(&self) -> &Scope;

    /// The exact error of this constraint on the given assignment. Must be
    /// nonnegative, and zero iff the constraint is satisfied. This is only
    /// called outside of the hot loop (at initialization and after resets)
    /// and must not rely on the incremental counters.
    fn required_error(&self, variables: &[Variable]) -> f64;

    /// Returns `required_error(after) - required_error(before)` if the
    /// variables listed in `changed` hypothetically took the values listed in
    /// `new_values`, without mutating anything. Returning `None` signals that
    /// no incremental simulation is available, in which case the engine falls
    /// back to a full re-evaluation on a temporarily patched assignment.
    fn simulate_delta(
        &self,
        variables: &[Variable],
        changed: &[usize],
        new_values: &[isize],
    ) -> Option<f64> {
        let _ = (variables, changed, new_values);
        None
    }

    /// Called after an accepted local move, once per updated variable in
    /// scope, *before* the variable array reflects the change: `variables`
    /// still holds the pre-move assignment while `new_value` is the value
    /// about to be taken by `variable_id`. Lets the constraint refresh its
    /// private counters.
    fn update_after_move(&mut self, variables: &[Variable], variable_id: usize, new_value: isize) {
        let _ = (variables, variable_id, new_value);
    }

    /// Rebuilds the private counters from scratch for the given assignment.
    /// Called at initialization and after every reset or restart.
    fn refresh(&mut self, variables: &[Variable]) {
        let _ = variables;
    }

    /// Scope membership test.
    fn has_variable(&self, variable_id: usize) -> bool {
        self.scope().contains(variable_id)
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
