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

//! This module provides the two value-selection heuristics of the engine.
//!
//! *Adaptive Search* retains the candidate of minimal cumulated delta,
//! breaking ties on the simulated objective cost for optimization problems
//! and uniformly at random otherwise. *Antidote Search* samples a candidate
//! from the distribution obtained by clamping positive cumulated deltas to
//! zero and negating the improving ones.

use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, Rng};

use crate::{Candidate, Model, SearchUnitData, Selection, ValueOutOfDomain, ValueSelection};

// ----------------------------------------------------------------------------
// --- ADAPTIVE SEARCH --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Adaptive Search value selection: keep the candidates of minimal
/// cumulated error delta, then tie-break. For an optimization problem the
/// tie-break simulates each tied move (applying it, reading the objective
/// cost and rolling it back) and keeps the cheapest; ties on that second
/// criterion, or on pure satisfaction problems, are split uniformly.
#[derive(Debug, Default)]
pub struct AdaptiveSearchValueSelection;

impl AdaptiveSearchValueSelection {
    pub fn new() -> Self {
        AdaptiveSearchValueSelection
    }

    /// The objective-driven tie-break, common to assignment and swap moves.
    fn tie_break_on_objective(
        ties: &[usize],
        candidates: &[Candidate],
        model: &mut Model,
        rng: &mut StdRng,
    ) -> Result<usize, ValueOutOfDomain> {
        let mut best_cost = f64::MAX;
        let mut best: Vec<usize> = Vec::new();
        for &index in ties {
            let inverse = model.apply_move(candidates[index].mv)?;
            let cost = model.objective_cost();
            model.apply_move(inverse)?;

            if cost < best_cost {
                best_cost = cost;
                best.clear();
            }
            if cost == best_cost {
                best.push(index);
            }
        }
        Ok(best[rng.gen_range(0..best.len())])
    }
}

impl ValueSelection for AdaptiveSearchValueSelection {
    fn name(&self) -> &'static str {
        "Adaptive Search"
    }

    fn select(
        &mut self,
        candidates: &[Candidate],
        model: &mut Model,
        data: &SearchUnitData,
        rng: &mut StdRng,
    ) -> Result<Selection, ValueOutOfDomain> {
        let mut min_conflict = f64::MAX;
        let mut ties: Vec<usize> = Vec::new();
        for (index, candidate) in candidates.iter().enumerate() {
            let conflict = candidate.conflict();
            if conflict < min_conflict {
                min_conflict = conflict;
                ties.clear();
            }
            if conflict == min_conflict {
                ties.push(index);
            }
        }

        let index = if ties.len() == 1 {
            ties[0]
        } else if data.is_optimization {
            Self::tie_break_on_objective(&ties, candidates, model, rng)?
        } else {
            ties[rng.gen_range(0..ties.len())]
        };
        Ok(Selection { index, min_conflict })
    }
}

// ----------------------------------------------------------------------------
// --- ANTIDOTE SEARCH --------------------------------------------------------
// ----------------------------------------------------------------------------

/// The Antidote Search value selection: cumulated deltas are mapped through
/// `d -> max(0, -d)` (worsening and neutral candidates weigh nothing,
/// improving candidates weigh their improvement) and one candidate is
/// sampled from the resulting distribution; when no candidate improves, the
/// pick is uniform.
#[derive(Debug, Default)]
pub struct AntidoteSearchValueSelection;

impl AntidoteSearchValueSelection {
    pub fn new() -> Self {
        AntidoteSearchValueSelection
    }
}

impl ValueSelection for AntidoteSearchValueSelection {
    fn name(&self) -> &'static str {
        "Antidote Search"
    }

    fn select(
        &mut self,
        candidates: &[Candidate],
        _model: &mut Model,
        _data: &SearchUnitData,
        rng: &mut StdRng,
    ) -> Result<Selection, ValueOutOfDomain> {
        let cumulated: Vec<f64> = candidates.iter().map(Candidate::conflict).collect();
        let weights: Vec<f64> = cumulated.iter().map(|&d| if d >= 0.0 { 0.0 } else { -d }).collect();

        let index = if weights.iter().all(|&w| w == 0.0) {
            rng.gen_range(0..candidates.len())
        } else {
            match WeightedIndex::new(&weights) {
                Ok(distribution) => distribution.sample(rng),
                Err(_) => rng.gen_range(0..candidates.len()),
            }
        };
        Ok(Selection { index, min_conflict: cumulated[index] })
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_value_selection {
    use rand::{rngs::StdRng, SeedableRng};

    use crate::*;

    struct TwoVars {
        maximize: bool,
    }
    impl ModelBuilder for TwoVars {
        fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
            create_n_variables(2, 0, 5)
        }
        fn declare_objective(&self) -> Option<Box<dyn Objective>> {
            let objective =
                LinearObjective::new(vec![0, 1], vec![1.0, 1.0], self.maximize).unwrap();
            Some(Box::new(objective))
        }
    }

    fn candidates(deltas: &[f64]) -> Vec<Candidate> {
        deltas
            .iter()
            .enumerate()
            .map(|(value, &delta)| Candidate {
                mv: Move::Assign { variable: 0, value: value as isize },
                deltas: vec![delta],
            })
            .collect()
    }

    #[test]
    fn adaptive_selection_retains_the_minimal_cumulated_delta() {
        let mut model = Model::build(&TwoVars { maximize: false }).unwrap();
        let data = SearchUnitData::new(&model);
        let mut rng = StdRng::seed_from_u64(0);

        let selection = AdaptiveSearchValueSelection::new()
            .select(&candidates(&[1.0, -2.0, 0.0]), &mut model, &data, &mut rng)
            .unwrap();
        assert_eq!(selection.index, 1);
        assert_eq!(selection.min_conflict, -2.0);
    }

    #[test]
    fn adaptive_ties_are_broken_on_the_objective() {
        // both candidates keep the error stable but assign different values
        // to a variable the objective wants as large as possible
        let mut model = Model::build(&TwoVars { maximize: true }).unwrap();
        let data = SearchUnitData::new(&model);
        let mut rng = StdRng::seed_from_u64(0);

        let tied = vec![
            Candidate { mv: Move::Assign { variable: 0, value: 1 }, deltas: vec![0.0] },
            Candidate { mv: Move::Assign { variable: 0, value: 4 }, deltas: vec![0.0] },
        ];
        let selection = AdaptiveSearchValueSelection::new()
            .select(&tied, &mut model, &data, &mut rng)
            .unwrap();
        assert_eq!(selection.index, 1);
        // the simulations must have been rolled back
        assert_eq!(model.variables[0].value(), 0);
    }

    #[test]
    fn antidote_selection_only_samples_improving_candidates() {
        let mut model = Model::build(&TwoVars { maximize: false }).unwrap();
        let data = SearchUnitData::new(&model);
        let mut rng = StdRng::seed_from_u64(0);
        let mut heuristic = AntidoteSearchValueSelection::new();

        for _ in 0..50 {
            let selection = heuristic
                .select(&candidates(&[2.0, -1.0, 0.0, -3.0]), &mut model, &data, &mut rng)
                .unwrap();
            assert!(selection.index == 1 || selection.index == 3);
            assert!(selection.min_conflict < 0.0);
        }
    }

    #[test]
    fn antidote_selection_degrades_to_uniform_without_improvement() {
        let mut model = Model::build(&TwoVars { maximize: false }).unwrap();
        let data = SearchUnitData::new(&model);
        let mut rng = StdRng::seed_from_u64(7);
        let mut heuristic = AntidoteSearchValueSelection::new();

        let mut seen = [false; 3];
        for _ in 0..100 {
            let selection = heuristic
                .select(&candidates(&[2.0, 1.0, 0.0]), &mut model, &data, &mut rng)
                .unwrap();
            seen[selection.index] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }
}
