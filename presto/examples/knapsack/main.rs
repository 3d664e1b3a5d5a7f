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

//! This example shows how to solve a small optimization problem with presto:
//! an unbounded knapsack where bottles and sandwiches compete for the volume
//! of a picnic bag while we try to pack as many calories as possible.

use std::time::Duration;

use clap::Parser;
use presto::*;

/// Solve the picnic knapsack: maximize calories under a volume cap.
#[derive(Parser)]
struct Args {
    /// The volume of the bag, in liters.
    #[clap(short, long, default_value = "30.0")]
    capacity: f64,
    /// The wall-clock budget of the solver, in milliseconds.
    #[clap(short, long, default_value = "100")]
    timeout: u64,
    /// Use one search unit per hardware thread.
    #[clap(short, long)]
    parallel: bool,
}

/// One packable item kind: its name, unit volume and unit calorie count.
struct Item {
    name: &'static str,
    volume: f64,
    calories: f64,
    most: usize,
}

const ITEMS: [Item; 2] = [
    Item { name: "bottle", volume: 1.0, calories: 500.0, most: 51 },
    Item { name: "sandwich", volume: 1.25, calories: 650.0, most: 11 },
];

struct Knapsack {
    capacity: f64,
}
impl ModelBuilder for Knapsack {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        ITEMS.iter().map(|item| Variable::range(item.name, 0, item.most + 1)).collect()
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        let ids = (0..ITEMS.len()).collect();
        let volumes = ITEMS.iter().map(|item| item.volume).collect();
        let capacity =
            LinearEquation::new(ids, volumes, Comparator::LessThanOrEqual, self.capacity)
                .expect("one volume per item");
        vec![Box::new(capacity)]
    }
    fn declare_objective(&self) -> Option<Box<dyn Objective>> {
        let ids = (0..ITEMS.len()).collect();
        let calories = ITEMS.iter().map(|item| item.calories).collect();
        let objective = LinearObjective::maximize(ids, calories).expect("one count per item");
        Some(Box::new(objective))
    }
}

fn main() {
    let args = Args::parse();
    let options = OptionsBuilder::default()
        .parallel_runs(args.parallel)
        .build()
        .expect("the default options are complete");

    let problem = Knapsack { capacity: args.capacity };
    let mut solver = Solver::new(&problem).with_options(options);
    let outcome = solver
        .solve(Duration::from_millis(args.timeout))
        .expect("the picnic model is well formed");

    if outcome.satisfied {
        println!("best packing within {} liters:", args.capacity);
        for (item, &count) in ITEMS.iter().zip(&outcome.solution) {
            println!("  {:10} x {}", item.name, count);
        }
        if let Some(calories) = outcome.best_cost {
            println!("total calories: {calories}");
        }
    } else {
        println!(
            "no feasible packing found within {} ms (best error {})",
            args.timeout, outcome.best_sat_error
        );
    }
}
