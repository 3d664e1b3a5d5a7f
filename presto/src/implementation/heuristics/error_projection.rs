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

//! This module provides the two error-projection policies of the engine.
//!
//! *Adaptive Search* blames every variable with the plain sum of the current
//! errors of the constraints it appears in. *Culprit Search* refines that
//! picture: for each violated constraint, it estimates each scope variable's
//! share of blame by probing the neighboring values of its domain, and
//! distributes the constraint error proportionally to those shares.

use crate::{ErrorProjection, Model, SearchUnitData, ValueOutOfDomain};

// ----------------------------------------------------------------------------
// --- ADAPTIVE SEARCH --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Adaptive Search projection: the projected error of a variable is the
/// sum of the current errors of the constraints containing it. Incremental
/// updates are exact: a delta on a constraint error is added to every
/// variable of its scope.
#[derive(Debug, Default)]
pub struct AdaptiveSearchProjection;

impl ErrorProjection for AdaptiveSearchProjection {
    fn name(&self) -> &'static str {
        "Adaptive Search"
    }

    fn compute(
        &mut self,
        _model: &mut Model,
        data: &mut SearchUnitData,
    ) -> Result<(), ValueOutOfDomain> {
        for variable_id in 0..data.number_variables {
            let mut sum = 0.0;
            for &constraint_id in &data.matrix_var_ctr[variable_id] {
                sum += data.constraint_errors[constraint_id];
            }
            data.error_variables[variable_id] += sum;
        }
        Ok(())
    }

    fn update(
        &mut self,
        model: &mut Model,
        data: &mut SearchUnitData,
        constraint_id: usize,
        delta: f64,
    ) -> Result<(), ValueOutOfDomain> {
        for &variable_id in model.constraints[constraint_id].scope().ids() {
            data.error_variables[variable_id] += delta;
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// --- CULPRIT SEARCH ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Culprit Search projection. For every constraint with a positive
/// current error, each scope variable is probed on the neighboring values of
/// its domain (previous and next around the current index, wrapping; the
/// other value for binary domains; the value itself for singletons) and the
/// summed simulated deltas measure how much relief moving that variable could
/// bring. Smaller deltas mean bigger blame: the probe vector is flipped
/// around its maximum, then normalized so the scope shares sum up to the
/// constraint error. The policy keeps one share vector per constraint so that
/// post-move updates only re-derive the rows of the affected constraints.
pub struct CulpritSearchProjection {
    /// `shares[constraint_id][variable_id]`, nonzero on scope entries only.
    shares: Vec<Vec<f64>>,
    /// Probe buffer, one slot per scope variable of the processed constraint.
    probes: Vec<f64>,
}

impl CulpritSearchProjection {
    pub fn new() -> Self {
        CulpritSearchProjection { shares: Vec::new(), probes: Vec::new() }
    }

    /// Rebuilds the share row of one constraint from the current assignment.
    fn compute_row(
        &mut self,
        model: &mut Model,
        data: &SearchUnitData,
        constraint_id: usize,
    ) -> Result<(), ValueOutOfDomain> {
        let error = data.constraint_errors[constraint_id];
        let scope_len = model.constraints[constraint_id].scope().len();

        // wipe the previous row (scope entries are the only nonzero ones)
        for position in 0..scope_len {
            let variable_id = model.constraints[constraint_id].scope().ids()[position];
            self.shares[constraint_id][variable_id] = 0.0;
        }
        if error <= 0.0 {
            return Ok(());
        }

        self.probes.clear();
        for position in 0..scope_len {
            let variable_id = model.constraints[constraint_id].scope().ids()[position];
            let current = model.variables[variable_id].value();
            let probe = match model.variables[variable_id].domain_size() {
                1 => model.simulate_constraint_delta(
                    constraint_id,
                    &[variable_id],
                    &[current],
                    error,
                )?,
                2 => {
                    let other = model.variables[variable_id]
                        .full_domain()
                        .iter()
                        .copied()
                        .find(|&v| v != current)
                        .unwrap_or(current);
                    model.simulate_constraint_delta(
                        constraint_id,
                        &[variable_id],
                        &[other],
                        error,
                    )?
                }
                _ => {
                    let range = model.variables[variable_id].partial_domain(3);
                    model.simulate_constraint_delta(
                        constraint_id,
                        &[variable_id],
                        &[range[0]],
                        error,
                    )? + model.simulate_constraint_delta(
                        constraint_id,
                        &[variable_id],
                        &[range[2]],
                        error,
                    )?
                }
            };
            self.probes.push(probe);
        }

        // flip around the maximum so that the lowest delta carries the
        // biggest blame, then normalize the scope shares to the error
        let max = self.probes.iter().fold(f64::MIN, |a, &b| a.max(b));
        for probe in self.probes.iter_mut() {
            *probe = max - *probe;
        }
        let sum: f64 = self.probes.iter().sum();
        for (position, &probe) in self.probes.iter().enumerate() {
            let variable_id = model.constraints[constraint_id].scope().ids()[position];
            self.shares[constraint_id][variable_id] =
                if probe == 0.0 { 0.0 } else { (probe / sum) * error };
        }
        Ok(())
    }

    /// Adds (sign = 1) or removes (sign = -1) one share row from the
    /// projected error vector.
    fn fold_row(&self, model: &Model, data: &mut SearchUnitData, constraint_id: usize, sign: f64) {
        for &variable_id in model.constraints[constraint_id].scope().ids() {
            data.error_variables[variable_id] += sign * self.shares[constraint_id][variable_id];
        }
    }
}

impl Default for CulpritSearchProjection {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorProjection for CulpritSearchProjection {
    fn name(&self) -> &'static str {
        "Culprit Search"
    }

    fn initialize(&mut self, data: &SearchUnitData) {
        self.shares = vec![vec![0.0; data.number_variables]; data.number_constraints];
        self.probes = Vec::with_capacity(data.number_variables);
    }

    fn compute(
        &mut self,
        model: &mut Model,
        data: &mut SearchUnitData,
    ) -> Result<(), ValueOutOfDomain> {
        for constraint_id in 0..data.number_constraints {
            self.compute_row(model, data, constraint_id)?;
            self.fold_row(model, data, constraint_id, 1.0);
        }
        Ok(())
    }

    fn update(
        &mut self,
        model: &mut Model,
        data: &mut SearchUnitData,
        constraint_id: usize,
        _delta: f64,
    ) -> Result<(), ValueOutOfDomain> {
        self.fold_row(model, data, constraint_id, -1.0);
        self.compute_row(model, data, constraint_id)?;
        self.fold_row(model, data, constraint_id, 1.0);
        Ok(())
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
