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

//! This module provides the options of `Solver::solve`. Every tunable is
//! optional: unset fields resolve at solve time from the size of the
//! instance, so that the common case remains `Options::default()`.

use std::sync::Arc;

use derive_builder::Builder;
use rand::Rng;

use crate::{
    AdaptiveSearchProjection, AdaptiveSearchValueSelection, AdaptiveSearchVariableSelection,
    AntidoteSearchValueSelection, AntidoteSearchVariableSelection, CulpritSearchProjection,
    ErrorProjection, Print, ValueSelection, VariableSelection,
};

// ----------------------------------------------------------------------------
// --- STRATEGY KINDS ---------------------------------------------------------
// ----------------------------------------------------------------------------

/// Runtime selection of the variable-selection heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableHeuristicKind {
    #[default]
    AdaptiveSearch,
    AntidoteSearch,
}

/// Runtime selection of the value-selection heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueHeuristicKind {
    #[default]
    AdaptiveSearch,
    AntidoteSearch,
}

/// Runtime selection of the error-projection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorProjectionKind {
    #[default]
    AdaptiveSearch,
    CulpritSearch,
}

impl VariableHeuristicKind {
    pub(crate) fn instantiate(self) -> Box<dyn VariableSelection> {
        match self {
            Self::AdaptiveSearch => Box::new(AdaptiveSearchVariableSelection::new()),
            Self::AntidoteSearch => Box::new(AntidoteSearchVariableSelection::new()),
        }
    }
}
impl ValueHeuristicKind {
    pub(crate) fn instantiate(self) -> Box<dyn ValueSelection> {
        match self {
            Self::AdaptiveSearch => Box::new(AdaptiveSearchValueSelection::new()),
            Self::AntidoteSearch => Box::new(AntidoteSearchValueSelection::new()),
        }
    }
}
impl ErrorProjectionKind {
    pub(crate) fn instantiate(self) -> Box<dyn ErrorProjection> {
        match self {
            Self::AdaptiveSearch => Box::new(AdaptiveSearchProjection),
            Self::CulpritSearch => Box::new(CulpritSearchProjection::new()),
        }
    }
}

// ----------------------------------------------------------------------------
// --- OPTIONS ----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// The optional arguments of `Solver::solve`.
///
/// ```
/// # use presto::{Options, OptionsBuilder};
/// let options = OptionsBuilder::default()
///     .parallel_runs(true)
///     .number_start_samplings(Some(20))
///     .build()
///     .unwrap();
/// assert!(options.parallel_runs);
/// ```
#[derive(Clone, Builder)]
#[builder(default)]
pub struct Options {
    /// Start the search from the assignment declared by the builder instead
    /// of sampling a random one.
    pub custom_starting_point: bool,
    /// Resume the search from the assignment declared by the builder
    /// (stop-and-resume computation across consecutive solves).
    pub resume_search: bool,
    /// Run one search unit per thread instead of a single one.
    pub parallel_runs: bool,
    /// Number of worker threads for parallel runs. Unset means the hardware
    /// default, clamped to at least two.
    pub number_threads: Option<usize>,
    /// Number of local moves a variable stays tabu after escaping a local
    /// minimum or a plateau. Unset resolves to
    /// `max(min(5, n - 1), ceil(n / 5))`.
    pub tabu_time_local_min: Option<u64>,
    /// Number of local moves a variable stays tabu after being selected for
    /// an accepted move. Unset resolves to zero.
    pub tabu_time_selected: Option<u64>,
    /// Percentage chance (0 to 100) to escape a plateau rather than walking
    /// on it. Unset resolves to 10.
    pub percent_chance_escape_plateau: Option<u32>,
    /// Number of simultaneously tabu variables that triggers a reset. Unset
    /// resolves to the tabu time for local minima.
    pub reset_threshold: Option<usize>,
    /// Perform a restart instead of every `restart_threshold`-th reset. Zero
    /// (the unset default) never restarts.
    pub restart_threshold: Option<u64>,
    /// Number of variables randomly re-sampled by a reset. Unset resolves to
    /// `max(2, ceil(n / 10))`.
    pub number_variables_to_reset: Option<usize>,
    /// Number of random assignments drawn to pick the starting configuration.
    /// Unset resolves to 10.
    pub number_start_samplings: Option<usize>,
    /// The variable-selection heuristic.
    pub variable_heuristic: VariableHeuristicKind,
    /// The value-selection heuristic.
    pub value_heuristic: ValueHeuristicKind,
    /// The error-projection policy.
    pub error_projection: ErrorProjectionKind,
    /// Base seed of the per-worker random generators (worker k derives its
    /// own stream from `seed + k`). Unset draws a seed from entropy.
    pub seed: Option<u64>,
    /// Diagnostics sink. Unset disables all diagnostics.
    pub print: Option<Arc<dyn Print>>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            custom_starting_point: false,
            resume_search: false,
            parallel_runs: false,
            number_threads: None,
            tabu_time_local_min: None,
            tabu_time_selected: None,
            percent_chance_escape_plateau: None,
            reset_threshold: None,
            restart_threshold: None,
            number_variables_to_reset: None,
            number_start_samplings: None,
            variable_heuristic: VariableHeuristicKind::default(),
            value_heuristic: ValueHeuristicKind::default(),
            error_projection: ErrorProjectionKind::default(),
            seed: None,
            print: None,
        }
    }
}

impl Options {
    /// Resolves every unset field against the number of variables of the
    /// instance about to be solved.
    pub(crate) fn resolve(&self, number_variables: usize) -> ResolvedOptions {
        let n = number_variables as i64;
        let tabu_time_local_min = self
            .tabu_time_local_min
            .unwrap_or_else(|| (5.min(n - 1)).max((n + 4) / 5).max(0) as u64);
        ResolvedOptions {
            custom_starting_point: self.custom_starting_point,
            resume_search: self.resume_search,
            parallel_runs: self.parallel_runs,
            number_threads: self.number_threads.unwrap_or_else(|| 2.max(num_cpus::get())),
            tabu_time_local_min,
            tabu_time_selected: self.tabu_time_selected.unwrap_or(0),
            percent_chance_escape_plateau: self.percent_chance_escape_plateau.unwrap_or(10),
            reset_threshold: self.reset_threshold.unwrap_or(tabu_time_local_min as usize),
            restart_threshold: self.restart_threshold.unwrap_or(0),
            number_variables_to_reset: self
                .number_variables_to_reset
                .unwrap_or_else(|| 2.max((number_variables + 9) / 10))
                .min(number_variables.max(1)),
            number_start_samplings: self.number_start_samplings.unwrap_or(10).max(1),
            variable_heuristic: self.variable_heuristic,
            value_heuristic: self.value_heuristic,
            error_projection: self.error_projection,
            seed: self.seed.unwrap_or_else(|| rand::thread_rng().gen()),
            print: self.print.clone(),
        }
    }
}

/// The options with every default resolved, as handed to the search units.
#[derive(Clone)]
pub(crate) struct ResolvedOptions {
    pub custom_starting_point: bool,
    pub resume_search: bool,
    pub parallel_runs: bool,
    pub number_threads: usize,
    pub tabu_time_local_min: u64,
    pub tabu_time_selected: u64,
    pub percent_chance_escape_plateau: u32,
    pub reset_threshold: usize,
    pub restart_threshold: u64,
    pub number_variables_to_reset: usize,
    pub number_start_samplings: usize,
    pub variable_heuristic: VariableHeuristicKind,
    pub value_heuristic: ValueHeuristicKind,
    pub error_projection: ErrorProjectionKind,
    pub seed: u64,
    pub print: Option<Arc<dyn Print>>,
}

impl ResolvedOptions {
    pub fn diagnostic(&self, worker_id: usize, message: &str) {
        if let Some(print) = &self.print {
            print.diagnostic(worker_id, message);
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################
