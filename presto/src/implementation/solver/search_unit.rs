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

//! This module provides the search unit: the stochastic local-search loop the
//! driver runs once per worker. Each iteration selects a variable through the
//! variable-selection heuristic, enumerates the candidate moves around it
//! (value reassignments, or value swaps in permutation mode), lets the
//! value-selection heuristic retain one, and classifies it as an improving
//! move, a plateau or a local minimum. Tabu marking, resets and restarts
//! steer the walk out of the traps; the best assignment seen is snapshotted
//! along the way and restored on exit.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

use crate::{
    Candidate, ErrorProjection, Model, Move, SearchStatistics, SearchUnitData, ValueOutOfDomain,
    ValueSelection, VariableSelection,
};

use super::options::ResolvedOptions;

/// What a worker hands back to the driver once it has exited.
pub(crate) struct WorkerReport {
    pub worker_id: usize,
    /// Best satisfaction error seen by this worker.
    pub best_sat_error: f64,
    /// Best internal objective cost seen on a satisfying assignment.
    pub best_opt_cost: f64,
    /// The assignment achieving the figures above.
    pub solution: Vec<isize>,
    pub statistics: SearchStatistics,
    /// True iff `best_sat_error` is zero.
    pub satisfied: bool,
    /// True iff the worker halted on an invariant violation instead of
    /// running its budget down.
    pub aborted: bool,
}

/// One independent local-search run over one model instance. The unit owns
/// everything it touches except the cooperative stop flag, polled once per
/// iteration.
pub(crate) struct SearchUnit<'a> {
    worker_id: usize,
    model: Model,
    data: SearchUnitData,
    options: ResolvedOptions,
    rng: StdRng,
    stop: &'a AtomicBool,

    variable_selection: Box<dyn VariableSelection>,
    value_selection: Box<dyn ValueSelection>,
    error_projection: Box<dyn ErrorProjection>,

    /// The assignment declared by the builder, for custom starts and resumes.
    variables_at_start: Vec<isize>,
    /// The best assignment seen so far.
    final_solution: Vec<isize>,

    /// Reusable candidate buffer.
    candidates: Vec<Candidate>,
    /// Reusable visited-constraints buffer for swap enumeration.
    constraint_checked: Vec<bool>,
}

impl<'a> SearchUnit<'a> {
    pub fn new(
        worker_id: usize,
        model: Model,
        options: ResolvedOptions,
        stop: &'a AtomicBool,
    ) -> Self {
        let data = SearchUnitData::new(&model);
        let rng = StdRng::seed_from_u64(options.seed.wrapping_add(worker_id as u64));
        let variable_selection = options.variable_heuristic.instantiate();
        let value_selection = options.value_heuristic.instantiate();
        let mut error_projection = options.error_projection.instantiate();
        error_projection.initialize(&data);

        let variables_at_start: Vec<isize> = model.variables.iter().map(|v| v.value()).collect();
        let final_solution = variables_at_start.clone();
        let number_constraints = data.number_constraints;

        let mut unit = SearchUnit {
            worker_id,
            model,
            data,
            options,
            rng,
            stop,
            variable_selection,
            value_selection,
            error_projection,
            variables_at_start,
            final_solution,
            candidates: Vec::new(),
            constraint_checked: vec![false; number_constraints],
        };
        unit.probe_incremental_deltas();
        unit
    }

    /// Checks, once per constraint, whether an incremental delta simulation
    /// is available, and reports the ones that will run on the full
    /// re-evaluation fallback.
    fn probe_incremental_deltas(&mut self) {
        for (constraint_id, constraint) in self.model.constraints.iter().enumerate() {
            let Some(&variable_id) = constraint.scope().ids().first() else {
                continue;
            };
            let value = self.model.variables[variable_id].value();
            if constraint
                .simulate_delta(&self.model.variables, &[variable_id], &[value])
                .is_none()
            {
                self.options.diagnostic(
                    self.worker_id,
                    &format!(
                        "constraint {constraint_id} provides no incremental delta; \
                         full re-evaluation will be used"
                    ),
                );
            }
        }
    }

    /// Runs the search until the stop flag is raised, the budget runs out, or
    /// a pure satisfaction problem is solved. Returns the report the driver
    /// aggregates.
    pub fn search(&mut self, budget: Duration) -> WorkerReport {
        let start = Instant::now();
        let aborted = match self.run(budget, start) {
            Ok(()) => false,
            Err(error) => {
                self.options.diagnostic(
                    self.worker_id,
                    &format!("worker halted on invariant violation: {error}"),
                );
                // hand back the best-so-far nonetheless
                let _ = self.restore_final_solution();
                true
            }
        };
        WorkerReport {
            worker_id: self.worker_id,
            best_sat_error: self.data.best_sat_error,
            best_opt_cost: self.data.best_opt_cost,
            solution: self.final_solution.clone(),
            statistics: self.data.statistics(),
            satisfied: self.data.best_sat_error == 0.0,
            aborted,
        }
    }

    fn run(&mut self, budget: Duration, start: Instant) -> Result<(), ValueOutOfDomain> {
        self.data.best_sat_error = f64::MAX;
        self.data.best_opt_cost = f64::MAX;

        self.initialize_variable_values()?;
        self.initialize_data_structures()?;
        self.snapshot_solution();

        if self.data.number_variables == 0 {
            return Ok(());
        }

        while !self.stop_requested()
            && start.elapsed() < budget
            && (self.data.best_sat_error > 0.0 || self.data.is_optimization)
        {
            self.data.search_iterations += 1;

            // 1. when the tabu list saturates, reset instead of selecting
            if self.data.tabu_count() >= self.options.reset_threshold {
                self.reset()?;
                continue;
            }
            let variable_to_change = self.variable_selection.select(&self.data, &mut self.rng);

            // 2. enumerate the candidate moves around that variable
            self.enumerate_candidates(variable_to_change)?;
            if self.candidates.is_empty() {
                // nothing to move to (singleton domain, no legal swap
                // partner): treat as a local minimum
                self.manage_local_minimum(variable_to_change);
                continue;
            }

            // 3. let the value heuristic retain one candidate
            let candidates = std::mem::take(&mut self.candidates);
            let selection = self.value_selection.select(
                &candidates,
                &mut self.model,
                &self.data,
                &mut self.rng,
            )?;
            let chosen = &candidates[selection.index];
            let min_conflict = selection.min_conflict;

            // 4. classify the move and act
            if min_conflict < 0.0 {
                self.local_move(chosen, min_conflict)?;
                if self.data.is_optimization {
                    self.data.current_opt_cost = self.model.objective_cost();
                }
            } else if min_conflict == 0.0 {
                if self.data.is_optimization {
                    let inverse = self.model.apply_move(chosen.mv)?;
                    let candidate_cost = self.model.objective_cost();
                    self.model.apply_move(inverse)?;

                    if candidate_cost < self.data.current_opt_cost {
                        self.local_move(chosen, min_conflict)?;
                        self.data.current_opt_cost = candidate_cost;
                    } else if candidate_cost == self.data.current_opt_cost {
                        self.manage_plateau(chosen)?;
                    } else {
                        self.manage_local_minimum(chosen.mv.selected_variable());
                    }
                } else {
                    self.manage_plateau(chosen)?;
                }
            } else {
                self.manage_local_minimum(chosen.mv.selected_variable());
            }

            self.candidates = candidates;
            self.candidates.clear();

            // 5. best-known bookkeeping
            if self.data.best_sat_error > self.data.current_sat_error {
                self.data.best_sat_error = self.data.current_sat_error;
                self.snapshot_solution();
            } else if self.data.is_optimization
                && self.data.current_sat_error == 0.0
                && self.data.best_opt_cost > self.data.current_opt_cost
            {
                self.data.best_opt_cost = self.data.current_opt_cost;
                self.snapshot_solution();
            }
        }

        self.restore_final_solution()
    }

    #[inline]
    fn stop_requested(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Copies the current assignment into the best-solution slot.
    fn snapshot_solution(&mut self) {
        for (slot, variable) in self.final_solution.iter_mut().zip(&self.model.variables) {
            *slot = variable.value();
        }
    }

    /// Writes the best-solution slot back into the variables.
    fn restore_final_solution(&mut self) -> Result<(), ValueOutOfDomain> {
        for (variable, &value) in self.model.variables.iter_mut().zip(&self.final_solution) {
            variable.set_value(value)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // --- INITIAL CONFIGURATION ----------------------------------------------
    // ------------------------------------------------------------------------

    fn initialize_variable_values(&mut self) -> Result<(), ValueOutOfDomain> {
        if self.options.custom_starting_point || self.options.resume_search {
            for (variable, &value) in
                self.model.variables.iter_mut().zip(&self.variables_at_start)
            {
                variable.set_value(value)?;
            }
            self.model.auxiliary.refresh(&self.model.variables);
        } else {
            self.set_initial_configuration(self.options.number_start_samplings)?;
        }
        Ok(())
    }

    /// Draws `samplings` random configurations and keeps the one with the
    /// lowest total constraint error, stopping early on a satisfying one.
    fn set_initial_configuration(&mut self, samplings: usize) -> Result<(), ValueOutOfDomain> {
        let mut best_error_so_far = f64::MAX;
        let mut best_values: Vec<isize> = Vec::new();
        let mut loops = 0;

        loop {
            if self.model.permutation_problem {
                self.random_permutations(None)?;
            } else {
                self.monte_carlo_sampling(None);
            }
            self.model.auxiliary.refresh(&self.model.variables);

            let mut current_error = 0.0;
            for constraint in &self.model.constraints {
                current_error += constraint.required_error(&self.model.variables);
            }
            if best_error_so_far > current_error {
                best_error_so_far = current_error;
                best_values = self.model.variables.iter().map(|v| v.value()).collect();
            }

            loops += 1;
            if loops >= samplings || current_error == 0.0 {
                break;
            }
        }

        for (variable, &value) in self.model.variables.iter_mut().zip(&best_values) {
            variable.set_value(value)?;
        }
        self.model.auxiliary.refresh(&self.model.variables);
        Ok(())
    }

    /// Assigns a random domain value to `count` variables (all of them when
    /// `None`), visiting them in shuffled order.
    fn monte_carlo_sampling(&mut self, count: Option<usize>) {
        let n = self.data.number_variables;
        let count = count.unwrap_or(n).min(n);
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);
        for &variable_id in order.iter().take(count) {
            self.model.variables[variable_id].pick_random_value(&mut self.rng);
        }
    }

    /// Shuffles the assignment by value swaps only, preserving its multiset
    /// of values. A swap is legal when the two values differ and each belongs
    /// to the other variable's domain. `None` visits every pair with a 50%
    /// swap chance; `Some(count)` tries `count` random pairs.
    fn random_permutations(&mut self, count: Option<usize>) -> Result<(), ValueOutOfDomain> {
        let n = self.data.number_variables;
        match count {
            None => {
                for i in 0..n.saturating_sub(1) {
                    for j in i + 1..n {
                        if self.rng.gen_range(0..2) == 0 && self.legal_swap(i, j) {
                            self.swap_values(i, j)?;
                        }
                    }
                }
            }
            Some(count) => {
                let mut first: Vec<usize> = (0..n).collect();
                let mut second: Vec<usize> = (0..n).collect();
                first.shuffle(&mut self.rng);
                second.shuffle(&mut self.rng);
                for i in 0..count.min(n) {
                    if first[i] != second[i] && self.legal_swap(first[i], second[i]) {
                        self.swap_values(first[i], second[i])?;
                    }
                }
            }
        }
        Ok(())
    }

    fn legal_swap(&self, i: usize, j: usize) -> bool {
        let value_i = self.model.variables[i].value();
        let value_j = self.model.variables[j].value();
        value_i != value_j
            && self.model.variables[i].domain_contains(value_j)
            && self.model.variables[j].domain_contains(value_i)
    }

    /// Raw value exchange, without auxiliary-data notification: sampling
    /// paths refresh the auxiliary data in bulk afterwards.
    fn swap_values(&mut self, i: usize, j: usize) -> Result<(), ValueOutOfDomain> {
        let value_i = self.model.variables[i].value();
        let value_j = self.model.variables[j].value();
        self.model.variables[i].set_value(value_j)?;
        self.model.variables[j].set_value(value_i)?;
        Ok(())
    }

    /// Recomputes every piece of derived state for the current assignment:
    /// constraint counters and errors, total satisfaction error, objective
    /// cost, projected variable errors; clears the tabu list and refreshes
    /// the best-known records.
    fn initialize_data_structures(&mut self) -> Result<(), ValueOutOfDomain> {
        self.variable_selection.invalidate();
        self.data.tabu_until.iter_mut().for_each(|t| *t = 0);

        self.data.current_sat_error = 0.0;
        for (constraint_id, constraint) in self.model.constraints.iter_mut().enumerate() {
            constraint.refresh(&self.model.variables);
            let error = constraint.required_error(&self.model.variables);
            self.data.constraint_errors[constraint_id] = error;
            self.data.current_sat_error += error;
        }

        if self.data.best_sat_error > self.data.current_sat_error {
            self.data.best_sat_error = self.data.current_sat_error;
            self.snapshot_solution();
        }

        if self.data.is_optimization {
            if self.data.current_sat_error == 0.0 {
                self.data.current_opt_cost = self.model.objective_cost();
                if self.data.best_opt_cost > self.data.current_opt_cost {
                    self.data.best_opt_cost = self.data.current_opt_cost;
                    self.snapshot_solution();
                }
            } else {
                self.data.current_opt_cost = f64::MAX;
            }
        }

        self.data.error_variables.iter_mut().for_each(|e| *e = 0.0);
        self.error_projection.compute(&mut self.model, &mut self.data)?;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // --- CANDIDATE ENUMERATION ----------------------------------------------
    // ------------------------------------------------------------------------

    /// Fills the candidate buffer with every possible move around the given
    /// variable: one `Assign` per other domain value in regular mode, one
    /// `Swap` per legal partner variable in permutation mode. Each candidate
    /// carries its per-constraint deltas, in incidence-row order.
    fn enumerate_candidates(&mut self, variable_to_change: usize) -> Result<(), ValueOutOfDomain> {
        self.candidates.clear();
        if self.model.permutation_problem {
            self.enumerate_swaps(variable_to_change)
        } else {
            self.enumerate_assignments(variable_to_change)
        }
    }

    fn enumerate_assignments(&mut self, variable: usize) -> Result<(), ValueOutOfDomain> {
        let current = self.model.variables[variable].value();
        let domain = self.model.variables[variable].full_domain().to_vec();
        let row_len = self.data.matrix_var_ctr[variable].len();

        for value in domain {
            if value == current {
                continue;
            }
            let mut deltas = Vec::with_capacity(row_len.max(1));
            if row_len == 0 {
                deltas.push(0.0);
            }
            for index in 0..row_len {
                let constraint_id = self.data.matrix_var_ctr[variable][index];
                let current_error = self.data.constraint_errors[constraint_id];
                deltas.push(self.model.simulate_constraint_delta(
                    constraint_id,
                    &[variable],
                    &[value],
                    current_error,
                )?);
            }
            self.candidates.push(Candidate { mv: Move::Assign { variable, value }, deltas });
        }
        Ok(())
    }

    fn enumerate_swaps(&mut self, variable: usize) -> Result<(), ValueOutOfDomain> {
        let current = self.model.variables[variable].value();
        let row_len = self.data.matrix_var_ctr[variable].len();

        for other in 0..self.data.number_variables {
            if other == variable {
                continue;
            }
            let other_value = self.model.variables[other].value();
            if other_value == current
                || !self.model.variables[variable].domain_contains(other_value)
                || !self.model.variables[other].domain_contains(current)
            {
                continue;
            }

            self.constraint_checked.iter_mut().for_each(|c| *c = false);
            let mut deltas = Vec::with_capacity(row_len);

            // the swap changes both sides: walk our incidence row first...
            for index in 0..row_len {
                let constraint_id = self.data.matrix_var_ctr[variable][index];
                self.constraint_checked[constraint_id] = true;
                let current_error = self.data.constraint_errors[constraint_id];
                let delta = if self.model.constraints[constraint_id].has_variable(other) {
                    self.model.simulate_constraint_delta(
                        constraint_id,
                        &[variable, other],
                        &[other_value, current],
                        current_error,
                    )?
                } else {
                    self.model.simulate_constraint_delta(
                        constraint_id,
                        &[variable],
                        &[other_value],
                        current_error,
                    )?
                };
                deltas.push(delta);
            }
            // ... then the partner's row, skipping what was already counted
            let other_row_len = self.data.matrix_var_ctr[other].len();
            for index in 0..other_row_len {
                let constraint_id = self.data.matrix_var_ctr[other][index];
                if self.constraint_checked[constraint_id] {
                    continue;
                }
                let current_error = self.data.constraint_errors[constraint_id];
                deltas.push(self.model.simulate_constraint_delta(
                    constraint_id,
                    &[other],
                    &[current],
                    current_error,
                )?);
            }

            self.candidates
                .push(Candidate { mv: Move::Swap { first: variable, second: other }, deltas });
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // --- MOVE APPLICATION & TRAPS -------------------------------------------
    // ------------------------------------------------------------------------

    /// A. The accepted transition: book-keeps the counters and the tabu
    /// deadline, replays the candidate deltas onto the constraint errors and
    /// the error projection, informs the constraints and the objective, and
    /// finally applies the move itself.
    fn local_move(
        &mut self,
        candidate: &Candidate,
        min_conflict: f64,
    ) -> Result<(), ValueOutOfDomain> {
        self.data.local_moves += 1;
        self.data.current_sat_error += min_conflict;
        self.data.tabu_until[candidate.mv.selected_variable()] =
            self.data.local_moves + self.options.tabu_time_selected;
        self.variable_selection.invalidate();

        self.update_errors(candidate)?;
        self.model.apply_move(candidate.mv)?;
        Ok(())
    }

    fn update_errors(&mut self, candidate: &Candidate) -> Result<(), ValueOutOfDomain> {
        match candidate.mv {
            Move::Assign { variable, value } => {
                let row_len = self.data.matrix_var_ctr[variable].len();
                for index in 0..row_len {
                    let constraint_id = self.data.matrix_var_ctr[variable][index];
                    let delta = candidate.deltas[index];
                    self.data.constraint_errors[constraint_id] += delta;
                    self.error_projection.update(
                        &mut self.model,
                        &mut self.data,
                        constraint_id,
                        delta,
                    )?;
                    self.model.constraints[constraint_id].update_after_move(
                        &self.model.variables,
                        variable,
                        value,
                    );
                }
                if self.data.is_optimization {
                    self.model.objective.update_after_move(&self.model.variables, variable, value);
                }
            }
            Move::Swap { first, second } => {
                let first_new = self.model.variables[second].value();
                let second_new = self.model.variables[first].value();
                self.constraint_checked.iter_mut().for_each(|c| *c = false);
                let mut delta_index = 0;

                let row_len = self.data.matrix_var_ctr[first].len();
                for index in 0..row_len {
                    let constraint_id = self.data.matrix_var_ctr[first][index];
                    self.constraint_checked[constraint_id] = true;
                    let delta = candidate.deltas[delta_index];
                    delta_index += 1;
                    self.data.constraint_errors[constraint_id] += delta;
                    self.error_projection.update(
                        &mut self.model,
                        &mut self.data,
                        constraint_id,
                        delta,
                    )?;
                    self.model.constraints[constraint_id].update_after_move(
                        &self.model.variables,
                        first,
                        first_new,
                    );
                    if self.model.constraints[constraint_id].has_variable(second) {
                        self.model.constraints[constraint_id].update_after_move(
                            &self.model.variables,
                            second,
                            second_new,
                        );
                    }
                }
                let other_row_len = self.data.matrix_var_ctr[second].len();
                for index in 0..other_row_len {
                    let constraint_id = self.data.matrix_var_ctr[second][index];
                    if self.constraint_checked[constraint_id] {
                        continue;
                    }
                    let delta = candidate.deltas[delta_index];
                    delta_index += 1;
                    self.data.constraint_errors[constraint_id] += delta;
                    self.error_projection.update(
                        &mut self.model,
                        &mut self.data,
                        constraint_id,
                        delta,
                    )?;
                    self.model.constraints[constraint_id].update_after_move(
                        &self.model.variables,
                        second,
                        second_new,
                    );
                }
                if self.data.is_optimization {
                    self.model.objective.update_after_move(&self.model.variables, first, first_new);
                    self.model.objective.update_after_move(
                        &self.model.variables,
                        second,
                        second_new,
                    );
                }
            }
        }
        Ok(())
    }

    /// B. Plateau management: walk on the plateau, with a configured chance
    /// to escape it by marking the selected variable tabu instead.
    fn manage_plateau(&mut self, candidate: &Candidate) -> Result<(), ValueOutOfDomain> {
        if self.rng.gen_range(0..100) < self.options.percent_chance_escape_plateau {
            self.data.tabu_until[candidate.mv.selected_variable()] =
                self.data.local_moves + self.options.tabu_time_local_min;
            self.variable_selection.invalidate();
            self.data.plateau_local_minimum += 1;
        } else {
            self.local_move(candidate, 0.0)?;
            self.data.plateau_moves += 1;
        }
        Ok(())
    }

    /// C. Local-minimum management: when no other candidate variable remains
    /// (or with a 10% chance regardless), mark the selected variable tabu;
    /// otherwise do nothing so that the next iteration tries another one.
    fn manage_local_minimum(&mut self, variable: usize) {
        if self.variable_selection.exhausted() || self.rng.gen_range(0..100) < 10 {
            self.data.tabu_until[variable] =
                self.data.local_moves + self.options.tabu_time_local_min;
            self.variable_selection.invalidate();
            self.data.local_minimum += 1;
        }
    }

    /// Reset: when the tabu list saturates, randomly re-sample part of the
    /// assignment; every `restart_threshold`-th reset re-samples the whole
    /// starting configuration instead.
    fn reset(&mut self) -> Result<(), ValueOutOfDomain> {
        self.data.resets += 1;

        if self.options.restart_threshold > 0
            && self.data.resets % self.options.restart_threshold == 0
        {
            self.data.restarts += 1;
            self.initialize_variable_values()?;
        } else {
            let count = Some(self.options.number_variables_to_reset);
            if self.model.permutation_problem {
                self.random_permutations(count)?;
            } else {
                self.monte_carlo_sampling(count);
            }
            self.model.auxiliary.refresh(&self.model.variables);
        }

        self.initialize_data_structures()
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
