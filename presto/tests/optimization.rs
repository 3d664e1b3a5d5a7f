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

//! End-to-end optimization scenarios.

use std::time::Duration;

use presto::*;

/// The picnic knapsack as an optimization problem: maximize the calorie
/// count under the volume cap alone.
struct PicnicPacking;
impl ModelBuilder for PicnicPacking {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        Ok(vec![
            Variable::range("bottle", 0, 52)?,
            Variable::range("sandwich", 0, 12)?,
        ])
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![Box::new(
            LinearEquation::new(vec![0, 1], vec![1.0, 1.25], Comparator::LessThanOrEqual, 30.0)
                .unwrap(),
        )]
    }
    fn declare_objective(&self) -> Option<Box<dyn Objective>> {
        Some(Box::new(
            LinearObjective::maximize(vec![0, 1], vec![500.0, 650.0]).unwrap(),
        ))
    }
}

#[test]
fn maximization_reaches_the_volume_feasible_optimum() {
    let mut solver = Solver::new(&PicnicPacking);
    let outcome = solver.solve(Duration::from_secs(1)).unwrap();

    assert!(outcome.satisfied);
    let best = outcome.best_cost.expect("satisfied optimization outcomes carry a cost");
    assert!(best >= 15000.0, "found {best}, expected at least 15000");

    // the reported cost matches the reported assignment
    let bottle = outcome.solution[0] as f64;
    let sandwich = outcome.solution[1] as f64;
    assert!(bottle + 1.25 * sandwich <= 30.0);
    assert_eq!(500.0 * bottle + 650.0 * sandwich, best);
}

#[test]
fn parallel_maximization_agrees_with_sequential() {
    let options = OptionsBuilder::default()
        .parallel_runs(true)
        .number_threads(Some(4))
        .build()
        .unwrap();
    let mut solver = Solver::new(&PicnicPacking).with_options(options);
    let outcome = solver.solve(Duration::from_secs(1)).unwrap();

    assert!(outcome.satisfied);
    assert!(outcome.best_cost.unwrap() >= 15000.0);
}

/// Minimization flows through without the sign dance: spread four variables
/// as low as their disequality allows.
struct LowSpread;
impl ModelBuilder for LowSpread {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        create_n_variables(4, 1, 10)
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        vec![Box::new(AllDifferent::new(vec![0, 1, 2, 3]))]
    }
    fn declare_objective(&self) -> Option<Box<dyn Objective>> {
        Some(Box::new(
            LinearObjective::minimize(vec![0, 1, 2, 3], vec![1.0, 1.0, 1.0, 1.0]).unwrap(),
        ))
    }
}

#[test]
fn minimization_reports_costs_in_the_user_direction() {
    let mut solver = Solver::new(&LowSpread);
    let outcome = solver.solve(Duration::from_secs(1)).unwrap();

    assert!(outcome.satisfied);
    // four pairwise distinct values in [1, 10] sum to at least 1+2+3+4
    let best = outcome.best_cost.unwrap();
    assert!(best >= 10.0);
    let sum: isize = outcome.solution.iter().sum();
    assert_eq!(sum as f64, best);
}

#[test]
fn best_cost_is_absent_until_a_satisfying_assignment_exists() {
    // an unsatisfiable base: maximize under a threshold no packing reaches
    struct Unreachable;
    impl ModelBuilder for Unreachable {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            Ok(vec![Variable::range("bottle", 0, 52)?, Variable::range("sandwich", 0, 12)?])
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
                        16000.0,
                    )
                    .unwrap(),
                ),
            ]
        }
        fn declare_objective(&self) -> Option<Box<dyn Objective>> {
            Some(Box::new(LinearObjective::maximize(vec![0, 1], vec![500.0, 650.0]).unwrap()))
        }
    }

    let mut solver = Solver::new(&Unreachable);
    let outcome = solver.solve(Duration::from_millis(200)).unwrap();

    assert!(!outcome.satisfied);
    assert_eq!(outcome.best_cost, None);
}
