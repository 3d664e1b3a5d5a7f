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

//! This module provides the two variable-selection heuristics of the engine.
//!
//! *Adaptive Search* deterministically restricts its attention to the
//! variables of maximal projected error (ties split uniformly at random),
//! while *Antidote Search* samples a variable from the discrete distribution
//! whose unnormalized weights are the projected errors themselves.

use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, Rng};

use crate::{SearchUnitData, VariableSelection};

/// Uniform pick among the non-tabu variables; falls back on the whole range
/// when everything is tabu. Shared degenerate-landscape escape hatch of both
/// heuristics.
fn uniform_fallback(data: &SearchUnitData, rng: &mut StdRng) -> usize {
    let untabu: Vec<usize> =
        (0..data.number_variables).filter(|&id| !data.is_tabu(id)).collect();
    if untabu.is_empty() {
        rng.gen_range(0..data.number_variables)
    } else {
        untabu[rng.gen_range(0..untabu.len())]
    }
}

// ----------------------------------------------------------------------------
// --- ADAPTIVE SEARCH --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Adaptive Search variable selection. It maintains the list of *worst*
/// variables: the non-tabu, non-isolated variables of maximal projected
/// error (a variable is isolated when no constraint contains it -- such a
/// variable is only worth moving when optimizing an already-satisfied
/// configuration). Each call picks one list entry uniformly at random and
/// consumes it, so that a rejected move can try the next-best candidate
/// without recomputation; the list is rebuilt lazily after `invalidate`.
#[derive(Debug, Default)]
pub struct AdaptiveSearchVariableSelection {
    worst_variables: Vec<usize>,
    stale: bool,
}

impl AdaptiveSearchVariableSelection {
    pub fn new() -> Self {
        AdaptiveSearchVariableSelection { worst_variables: Vec::new(), stale: true }
    }

    fn recompute(&mut self, data: &SearchUnitData) {
        self.worst_variables.clear();
        let mut worst_error = -1.0;

        for variable_id in 0..data.number_variables {
            let error = data.error_variables[variable_id];
            let eligible = !data.is_tabu(variable_id)
                && (!data.matrix_var_ctr[variable_id].is_empty()
                    || (data.is_optimization && data.current_sat_error == 0.0));
            if eligible && error >= worst_error {
                if error > worst_error {
                    self.worst_variables.clear();
                    worst_error = error;
                }
                self.worst_variables.push(variable_id);
            }
        }
    }
}

impl VariableSelection for AdaptiveSearchVariableSelection {
    fn name(&self) -> &'static str {
        "Adaptive Search"
    }

    fn invalidate(&mut self) {
        self.stale = true;
    }

    fn select(&mut self, data: &SearchUnitData, rng: &mut StdRng) -> usize {
        if self.stale {
            self.recompute(data);
            self.stale = false;
        }
        if self.worst_variables.is_empty() {
            return uniform_fallback(data, rng);
        }
        let picked = rng.gen_range(0..self.worst_variables.len());
        self.worst_variables.swap_remove(picked)
    }

    fn exhausted(&self) -> bool {
        self.worst_variables.is_empty()
    }
}

// ----------------------------------------------------------------------------
// --- ANTIDOTE SEARCH --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Antidote Search variable selection: the projected-error vector, with
/// tabu variables masked to zero, is used as the unnormalized weights of a
/// discrete distribution from which one variable is sampled. When every
/// weight vanishes, the pick degrades to a uniform draw over the non-tabu
/// variables. This heuristic keeps no candidate list, so a local minimum
/// always escalates to tabu marking.
#[derive(Debug, Default)]
pub struct AntidoteSearchVariableSelection;

impl AntidoteSearchVariableSelection {
    pub fn new() -> Self {
        AntidoteSearchVariableSelection
    }
}

impl VariableSelection for AntidoteSearchVariableSelection {
    fn name(&self) -> &'static str {
        "Antidote Search"
    }

    fn invalidate(&mut self) {}

    fn select(&mut self, data: &SearchUnitData, rng: &mut StdRng) -> usize {
        let weights: Vec<f64> = (0..data.number_variables)
            .map(|id| if data.is_tabu(id) { 0.0 } else { data.error_variables[id].max(0.0) })
            .collect();
        if weights.iter().sum::<f64>() <= 0.0 {
            return uniform_fallback(data, rng);
        }
        match WeightedIndex::new(&weights) {
            Ok(distribution) => distribution.sample(rng),
            Err(_) => uniform_fallback(data, rng),
        }
    }

    fn exhausted(&self) -> bool {
        true
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
