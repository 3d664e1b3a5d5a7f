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

//! This module provides the solver driver. It builds one fresh model instance
//! per worker from the user's builder, runs one search unit per worker for
//! the shared wall-clock budget, and aggregates the workers' best results.
//! Workers share nothing but a one-shot stop flag: the first one to satisfy a
//! pure satisfaction problem raises it, and everyone else winds down within
//! one iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::{Model, ModelBuilder, ModelError, Outcome, SearchStatistics};

use super::search_unit::{SearchUnit, WorkerReport};
use super::Options;

/// The solver itself. To solve a problem, instantiate a `Solver` over your
/// `ModelBuilder` and call `solve` with a wall-clock budget.
///
/// ```
/// # use std::time::Duration;
/// # use presto::*;
/// struct ThreeDifferent;
/// impl ModelBuilder for ThreeDifferent {
///     fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
///         create_n_variables(3, 1, 3)
///     }
///     fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
///         vec![Box::new(AllDifferent::new(vec![0, 1, 2]))]
///     }
/// }
///
/// let mut solver = Solver::new(&ThreeDifferent);
/// let outcome = solver.solve(Duration::from_millis(100)).unwrap();
/// assert!(outcome.satisfied);
/// ```
pub struct Solver<'a> {
    builder: &'a dyn ModelBuilder,
    options: Options,
}

impl<'a> Solver<'a> {
    /// Creates a solver over the given builder, with default options.
    pub fn new(builder: &'a dyn ModelBuilder) -> Self {
        Solver { builder, options: Options::default() }
    }

    /// Replaces the options of this solver.
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Searches for the best assignment reachable within the given wall-clock
    /// budget. Modeling errors surface immediately, before any search starts;
    /// budget expiration is not an error (the outcome then carries the best
    /// assignment found so far, possibly unsatisfying).
    pub fn solve(&mut self, budget: Duration) -> Result<Outcome, ModelError> {
        // probe instance: validates the declaration and fixes the figures
        // every worker will share
        let probe = Model::build(self.builder)?;
        let number_variables = probe.variables.len();
        let is_optimization = probe.is_optimization();

        let resolved = self.options.resolve(number_variables);
        let workers = if resolved.parallel_runs { resolved.number_threads.max(2) } else { 1 };

        let stop = AtomicBool::new(false);
        let reports: Mutex<Vec<WorkerReport>> = Mutex::new(Vec::with_capacity(workers));

        std::thread::scope(|scope| {
            for worker_id in 0..workers {
                let builder = self.builder;
                let options = resolved.clone();
                let stop = &stop;
                let reports = &reports;
                scope.spawn(move || {
                    let model = match Model::build(builder) {
                        Ok(model) => model,
                        Err(error) => {
                            options
                                .diagnostic(worker_id, &format!("model build failed: {error}"));
                            return;
                        }
                    };
                    let mut unit = SearchUnit::new(worker_id, model, options, stop);
                    let report = unit.search(budget);
                    if report.satisfied && !is_optimization {
                        stop.store(true, Ordering::Relaxed);
                    }
                    reports.lock().push(report);
                });
            }
        });

        let reports = reports.into_inner();
        Ok(Self::aggregate(&probe, reports, is_optimization))
    }

    /// Picks the dominant worker: lower satisfaction error first, then (for
    /// optimization problems tied at zero error) lower internal objective
    /// cost, then worker id as a deterministic tiebreak. Aborted workers only
    /// count when no healthy worker reported anything.
    fn aggregate(probe: &Model, reports: Vec<WorkerReport>, is_optimization: bool) -> Outcome {
        let pick = |aborted: bool| {
            reports
                .iter()
                .filter(|report| report.aborted == aborted)
                .min_by(|a, b| {
                    (a.best_sat_error, a.best_opt_cost, a.worker_id)
                        .partial_cmp(&(b.best_sat_error, b.best_opt_cost, b.worker_id))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
        };
        let Some(winner) = pick(false).or_else(|| pick(true)) else {
            return Outcome {
                satisfied: false,
                best_sat_error: f64::MAX,
                best_cost: None,
                solution: Vec::new(),
                statistics: SearchStatistics::default(),
            };
        };

        let satisfied = winner.best_sat_error == 0.0;
        let best_cost = if is_optimization && satisfied && winner.best_opt_cost < f64::MAX {
            Some(probe.objective.user_cost(winner.best_opt_cost))
        } else {
            None
        };
        Outcome {
            satisfied,
            best_sat_error: winner.best_sat_error,
            best_cost,
            solution: winner.solution.clone(),
            statistics: winner.statistics,
        }
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

/// The solver module is mostly exercised end to end (see the integration
/// tests): these unit tests only pin down the aggregation and configuration
/// behaviors that are awkward to observe from outside.
#[cfg(test)]
mod test_solver {
    use std::time::Duration;

    use crate::*;

    struct ThreeDifferent;
    impl ModelBuilder for ThreeDifferent {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            create_n_variables(3, 1, 3)
        }
        fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
            vec![Box::new(AllDifferent::new(vec![0, 1, 2]))]
        }
    }

    struct BrokenDeclaration;
    impl ModelBuilder for BrokenDeclaration {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            Ok(vec![Variable::new("x", vec![1, 2])?, Variable::new("y", vec![])?])
        }
    }

    #[test]
    fn modeling_errors_surface_before_any_search() {
        let mut solver = Solver::new(&BrokenDeclaration);
        let error = solver.solve(Duration::from_millis(10)).unwrap_err();
        assert_eq!(error, ModelError::EmptyDomain { name: "y".to_string() });
    }

    #[test]
    fn a_sequential_run_uses_a_single_worker() {
        let options = OptionsBuilder::default().seed(Some(11)).build().unwrap();
        let mut solver = Solver::new(&ThreeDifferent).with_options(options);
        let outcome = solver.solve(Duration::from_millis(200)).unwrap();

        assert!(outcome.satisfied);
        assert_eq!(outcome.best_sat_error, 0.0);
        assert_eq!(outcome.best_cost, None);

        let mut solution = outcome.solution.clone();
        solution.sort_unstable();
        assert_eq!(solution, vec![1, 2, 3]);
    }

    #[test]
    fn parallel_runs_spawn_at_least_two_workers_and_agree() {
        let options = OptionsBuilder::default()
            .parallel_runs(true)
            .number_threads(Some(3))
            .seed(Some(23))
            .build()
            .unwrap();
        let mut solver = Solver::new(&ThreeDifferent).with_options(options);
        let outcome = solver.solve(Duration::from_millis(500)).unwrap();
        assert!(outcome.satisfied);
    }

    #[test]
    fn the_same_seed_yields_the_same_sequential_outcome() {
        let run = || {
            let options = OptionsBuilder::default().seed(Some(99)).build().unwrap();
            Solver::new(&ThreeDifferent)
                .with_options(options)
                .solve(Duration::from_millis(200))
                .unwrap()
        };
        let first = run();
        let second = run();
        assert_eq!(first.solution, second.solution);
        assert_eq!(first.statistics, second.statistics);
    }
}
