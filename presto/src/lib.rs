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

//! # PRESTO
//! PRESTO is a metaheuristic solver for combinatorial constraint-satisfaction
//! and constraint-optimization problems over integer-domain variables. You
//! model a problem by declaring variables with finite domains, constraints
//! over subsets of those variables, and optionally an objective function to
//! minimize or maximize; the solver then searches, within a wall-clock budget
//! you supply on every call, for an assignment that satisfies every
//! constraint and optimizes the objective.
//!
//! The engine is a stochastic local search tuned for *reactive* use: it aims
//! at high-quality answers within milliseconds rather than proofs of
//! optimality. It maintains per-constraint errors incrementally, projects
//! them onto variables to decide what to change next, walks plateaus, escapes
//! local minima with tabu marking, resets or restarts when stuck, and runs
//! one independent search unit per thread with cooperative best-solution
//! aggregation.
//!
//! ## Quick Example
//! The following models a tiny knapsack: how many water bottles and
//! sandwiches fit in a 30-liter bag if we want to maximize the calorie count?
//!
//! #### Declare the model
//! ```
//! use std::time::Duration;
//! use presto::*;
//!
//! struct Knapsack;
//! impl ModelBuilder for Knapsack {
//!     // two variables: the number of bottles and of sandwiches we pack
//!     fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
//!         Ok(vec![
//!             Variable::range("bottles", 0, 52)?,
//!             Variable::range("sandwiches", 0, 12)?,
//!         ])
//!     }
//!     // one constraint: the packed volume must fit in the bag
//!     fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
//!         let capacity = LinearEquation::new(
//!             vec![0, 1],
//!             vec![1.0, 1.25],
//!             Comparator::LessThanOrEqual,
//!             30.0,
//!         );
//!         vec![Box::new(capacity.expect("two coefficients for two variables"))]
//!     }
//!     // the objective: maximize the calorie count
//!     fn declare_objective(&self) -> Option<Box<dyn Objective>> {
//!         let calories = LinearObjective::maximize(vec![0, 1], vec![500.0, 650.0]);
//!         Some(Box::new(calories.expect("two coefficients for two variables")))
//!     }
//! }
//!
//! // instantiate the solver and give it 100 milliseconds
//! let mut solver = Solver::new(&Knapsack);
//! let outcome = solver.solve(Duration::from_millis(100)).unwrap();
//!
//! assert!(outcome.satisfied);
//! assert!(outcome.best_cost.is_some());
//! ```
//!
//! Constraints beyond the built-in catalog (`AllDifferent`, `AllEqual`,
//! `LinearEquation`, `FixValue`) are one trait away: implement
//! [`Constraint`], ideally with a `simulate_delta` that answers in O(scope)
//! thanks to whatever private counters your semantics allow, and the engine
//! will treat it exactly like the built-in kinds (constraints without an
//! incremental delta are handled through full re-evaluation, they are just
//! slower). The same goes for objectives ([`Objective`]) and derived state
//! kept in sync with the assignment ([`AuxiliaryData`]).
//!
//! Scheduling-like problems whose solutions permute a fixed multiset of
//! values should set the `permutation_problem` flag on their builder: the
//! engine then explores value *swaps* between variables instead of single
//! reassignments, which prunes the search space considerably.

mod abstraction;
mod common;
mod implementation;

pub use abstraction::*;
pub use common::*;
pub use implementation::*;
