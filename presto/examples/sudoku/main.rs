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

//! This example shows how to model a pure satisfaction problem with presto:
//! a sudoku grid, with one AllDifferent constraint per row, column and box,
//! and FixValue constraints pinning the given cells.

use std::time::Duration;

use clap::Parser;
use presto::*;

/// Solve a sudoku grid with stochastic local search.
#[derive(Parser)]
struct Args {
    /// The 81 cells of the grid in row-major order, given digits as '1'-'9'
    /// and blanks as '.'.
    #[clap(default_value =
        "..3.2.6..9..3.5..1..18.64....81.29..7.......8..67.82....26.95..8..2.3..9..5.1.3..")]
    grid: String,
    /// The wall-clock budget of the solver, in milliseconds.
    #[clap(short, long, default_value = "2000")]
    timeout: u64,
    /// Use one search unit per hardware thread.
    #[clap(short, long)]
    parallel: bool,
}

struct Sudoku {
    givens: Vec<Option<isize>>,
}

impl Sudoku {
    fn parse(grid: &str) -> Self {
        let givens = grid
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_digit(10).map(|d| d as isize))
            .collect();
        Sudoku { givens }
    }
}

impl ModelBuilder for Sudoku {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        create_n_variables(81, 1, 9)
    }
    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        let mut constraints: Vec<Box<dyn Constraint>> = Vec::new();
        for unit in 0..9usize {
            let row = (0..9).map(|c| unit * 9 + c).collect();
            let column = (0..9).map(|r| r * 9 + unit).collect();
            let cell = (unit / 3) * 27 + (unit % 3) * 3;
            let square = (0..9).map(|i| cell + (i / 3) * 9 + i % 3).collect();
            constraints.push(Box::new(AllDifferent::new(row)));
            constraints.push(Box::new(AllDifferent::new(column)));
            constraints.push(Box::new(AllDifferent::new(square)));
        }
        for (cell, given) in self.givens.iter().enumerate() {
            if let Some(digit) = given {
                constraints.push(Box::new(FixValue::new(vec![cell], *digit)));
            }
        }
        constraints
    }
}

fn print_grid(values: &[isize]) {
    for row in 0..9 {
        if row % 3 == 0 {
            println!("+-------+-------+-------+");
        }
        for column in 0..9 {
            if column % 3 == 0 {
                print!("| ");
            }
            print!("{} ", values[row * 9 + column]);
        }
        println!("|");
    }
    println!("+-------+-------+-------+");
}

fn main() {
    let args = Args::parse();
    let problem = Sudoku::parse(&args.grid);
    if problem.givens.len() != 81 {
        eprintln!("expected 81 cells, got {}", problem.givens.len());
        std::process::exit(1);
    }

    let options = OptionsBuilder::default()
        .parallel_runs(args.parallel)
        .build()
        .expect("the default options are complete");
    let mut solver = Solver::new(&problem).with_options(options);
    let outcome = solver
        .solve(Duration::from_millis(args.timeout))
        .expect("the sudoku model is well formed");

    print_grid(&outcome.solution);
    if outcome.satisfied {
        println!("solved ({} local moves)", outcome.statistics.local_moves);
    } else {
        println!("no solution found within {} ms", args.timeout);
    }
}
