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

//! This module defines the three strategy seams of the search: the
//! error-projection policy (how per-constraint errors are blamed onto
//! variables), the variable-selection heuristic (which variable the next
//! local move bears on) and the value-selection heuristic (which candidate
//! move is attempted). Concrete strategies are selected at runtime through
//! the solver options.

use rand::rngs::StdRng;

use crate::{Candidate, Model, SearchUnitData, ValueOutOfDomain};

/// Projects the per-constraint errors onto the variables, yielding the
/// per-variable scalars the variable-selection heuristic ranks on. Policies
/// offer a full rebuild (`compute`) and a post-move incremental update
/// (`update`); both read the constraint errors from, and write the variable
/// errors into, the shared search-unit data.
pub trait ErrorProjection {
    /// Name of the policy, for diagnostics.
    fn name(&self) -> &'static str;

    /// Dimensions the policy's private structures for the given instance.
    /// Called once before the search starts.
    fn initialize(&mut self, data: &SearchUnitData) {
        let _ = data;
    }

    /// Rebuilds the whole variable-error vector. The vector is zeroed by the
    /// caller beforehand.
    fn compute(&mut self, model: &mut Model, data: &mut SearchUnitData)
        -> Result<(), ValueOutOfDomain>;

    /// Incrementally accounts for an accepted move having changed the error
    /// of `constraint_id` by `delta`. Called once per affected constraint,
    /// after the constraint error has been updated and before the variable
    /// assignment itself changes.
    fn update(
        &mut self,
        model: &mut Model,
        data: &mut SearchUnitData,
        constraint_id: usize,
        delta: f64,
    ) -> Result<(), ValueOutOfDomain>;
}

/// Selects the variable the next local move bears on.
///
/// Implementations may cache a candidate list across calls: `invalidate` is
/// called whenever the landscape changed (accepted move, tabu marking,
/// reset), and `exhausted` reports whether the current cache has run out of
/// candidates -- the signal the local-minimum policy uses to decide between
/// trying another variable and marking the selected one tabu.
pub trait VariableSelection {
    /// Name of the heuristic, for diagnostics.
    fn name(&self) -> &'static str;

    /// Drops any cached candidate list.
    fn invalidate(&mut self);

    /// Selects a variable id among the currently eligible ones.
    fn select(&mut self, data: &SearchUnitData, rng: &mut StdRng) -> usize;

    /// True iff there is no other candidate left to try before escaping a
    /// local minimum.
    fn exhausted(&self) -> bool;
}

/// The candidate move retained by a value-selection heuristic, together with
/// its cumulated error delta (`min_conflict` in the classification step of
/// the search loop).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// Index of the retained candidate in the candidate list.
    pub index: usize,
    /// Cumulated error delta of the retained candidate.
    pub min_conflict: f64,
}

/// Selects, among the candidate moves enumerated for the chosen variable, the
/// one the engine will attempt. The model is handed mutably so that
/// heuristics may run simulations (tie-breaking on the objective cost
/// simulates each tied candidate and rolls it back).
pub trait ValueSelection {
    /// Name of the heuristic, for diagnostics.
    fn name(&self) -> &'static str;

    /// Retains one candidate. `candidates` is never empty.
    fn select(
        &mut self,
        candidates: &[Candidate],
        model: &mut Model,
        data: &SearchUnitData,
        rng: &mut StdRng,
    ) -> Result<Selection, ValueOutOfDomain>;
}
