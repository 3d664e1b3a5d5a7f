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

//! End-to-end satisfaction scenarios.

use std::time::{Duration, Instant};

use presto::*;

struct ThreeDifferent;
impl ModelBuilder for ThreeDifferent {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        Ok(vec![
            Variable::range("x", 1, 3)?,
            Variable::range("y", 1, 3)?,
            Variable::range("z", 1, 3)?,
        ])
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![Box::new(AllDifferent::new(vec![0, 1, 2]))]
    }
}

#[test]
fn three_variables_all_different() {
    let mut solver = Solver::new(&ThreeDifferent);
    let outcome = solver.solve(Duration::from_millis(500)).unwrap();

    assert!(outcome.satisfied);
    assert_eq!(outcome.best_sat_error, 0.0);
    let mut solution = outcome.solution.clone();
    solution.sort_unstable();
    assert_eq!(solution, vec![1, 2, 3]);
}

/// The picnic knapsack as a pure satisfaction problem: pack bottles and
/// sandwiches under a volume cap while reaching a calorie threshold.
struct PicnicFeasibility {
    calorie_threshold: f64,
}
impl ModelBuilder for PicnicFeasibility {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        Ok(vec![
            Variable::range("bottle", 0, 52)?,
            Variable::range("sandwich", 0, 12)?,
        ])
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![
            Box::new(
                LinearEquation::new(
                    vec![0, 1],
                    vec![1.0, 1.25],
                    Comparator::LessThanOrEqual,
                    30.0,
                )
                .unwrap(),
            ),
            Box::new(
                LinearEquation::new(
                    vec![0, 1],
                    vec![500.0, 650.0],
                    Comparator::GreaterThanOrEqual,
                    self.calorie_threshold,
                )
                .unwrap(),
            ),
        ]
    }
}

#[test]
fn unreachable_calorie_threshold_is_not_claimed_solved() {
    // 16000 calories cannot fit in 30 liters (the volume-feasible maximum is
    // 15000): the solver must time out without pretending otherwise
    let mut solver = Solver::new(&PicnicFeasibility { calorie_threshold: 16000.0 });
    let outcome = solver.solve(Duration::from_millis(200)).unwrap();

    assert!(!outcome.satisfied);
    assert!(outcome.best_sat_error > 0.0);
}

#[test]
fn relaxed_calorie_threshold_is_satisfied() {
    // relaxing the threshold to 12000 opens feasible packings, e.g. 20
    // bottles and 8 sandwiches (30 liters, 15200 calories)
    let mut solver = Solver::new(&PicnicFeasibility { calorie_threshold: 12000.0 });
    let outcome = solver.solve(Duration::from_millis(500)).unwrap();

    assert!(outcome.satisfied);
    let bottle = outcome.solution[0] as f64;
    let sandwich = outcome.solution[1] as f64;
    assert!(bottle + 1.25 * sandwich <= 30.0);
    assert!(500.0 * bottle + 650.0 * sandwich >= 12000.0);
}

struct BoundedSum;
impl ModelBuilder for BoundedSum {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        create_n_variables(4, 0, 11)
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![Box::new(LinearEquation::sum(
            vec![0, 1, 2, 3],
            Comparator::LessThanOrEqual,
            5.0,
        ))]
    }
}

#[test]
fn linear_inequation_over_four_variables() {
    let mut solver = Solver::new(&BoundedSum);
    let outcome = solver.solve(Duration::from_millis(500)).unwrap();

    assert!(outcome.satisfied);
    let sum: isize = outcome.solution.iter().sum();
    assert!(sum <= 5);
}

struct SixDifferent;
impl ModelBuilder for SixDifferent {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        create_n_variables(6, 1, 6)
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![Box::new(AllDifferent::new(vec![0, 1, 2, 3, 4, 5]))]
    }
}

#[test]
fn adaptive_and_culprit_projections_both_solve() {
    for projection in [ErrorProjectionKind::AdaptiveSearch, ErrorProjectionKind::CulpritSearch] {
        let options = OptionsBuilder::default().error_projection(projection).build().unwrap();
        let mut solver = Solver::new(&SixDifferent).with_options(options);
        let outcome = solver.solve(Duration::from_millis(500)).unwrap();

        assert!(outcome.satisfied, "projection {projection:?} failed to solve");
        let mut solution = outcome.solution.clone();
        solution.sort_unstable();
        assert_eq!(solution, vec![1, 2, 3, 4, 5, 6]);
    }
}

#[test]
fn antidote_heuristics_solve_as_well() {
    let options = OptionsBuilder::default()
        .variable_heuristic(VariableHeuristicKind::AntidoteSearch)
        .value_heuristic(ValueHeuristicKind::AntidoteSearch)
        .build()
        .unwrap();
    let mut solver = Solver::new(&SixDifferent).with_options(options);
    let outcome = solver.solve(Duration::from_millis(500)).unwrap();
    assert!(outcome.satisfied);
}

#[test]
fn solve_returns_within_the_budget_plus_a_bounded_slack() {
    // an unsatisfiable instance keeps every worker busy until the deadline
    let mut solver = Solver::new(&PicnicFeasibility { calorie_threshold: 16000.0 });
    let start = Instant::now();
    let _ = solver.solve(Duration::from_millis(200)).unwrap();
    assert!(start.elapsed() < Duration::from_secs(2));
}

#[test]
fn custom_starting_point_is_honored_when_already_solved() {
    struct Fixed;
    impl ModelBuilder for Fixed {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            Ok(vec![
                Variable::with_index("x", vec![1, 2, 3], 0)?,
                Variable::with_index("y", vec![1, 2, 3], 1)?,
                Variable::with_index("z", vec![1, 2, 3], 2)?,
            ])
        }
        fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
            vec![Box::new(AllDifferent::new(vec![0, 1, 2]))]
        }
    }

    let options = OptionsBuilder::default().custom_starting_point(true).build().unwrap();
    let mut solver = Solver::new(&Fixed).with_options(options);
    let outcome = solver.solve(Duration::from_millis(100)).unwrap();

    // the declared assignment [1, 2, 3] already satisfies the constraint
    assert!(outcome.satisfied);
    assert_eq!(outcome.solution, vec![1, 2, 3]);
}
