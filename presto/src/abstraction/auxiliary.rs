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

//! This module defines the `AuxiliaryData` contract: user-provided derived
//! state kept coherent with the variable assignment for the whole duration of
//! a search.

use crate::Variable;

/// User-provided derived state that must stay coherent with the variable
/// values (think of a grid mirroring position variables). The engine notifies
/// it on every accepted variable change, and asks for a full rebuild whenever
/// the assignment jumps (initial sampling, resets, restarts).
pub trait AuxiliaryData {
    /// Rebuilds the derived state from scratch for the given assignment.
    fn refresh(&mut self, variables: &[Variable]);

    /// Notifies an accepted change: `variable_id` now holds `new_value` (the
    /// variable array passed here already reflects the change).
    fn update(&mut self, variables: &[Variable], variable_id: usize, new_value: isize);
}

/// The no-op auxiliary data, used when the model declares none.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAuxiliaryData;

impl AuxiliaryData for NullAuxiliaryData {
    fn refresh(&mut self, _: &[Variable]) {}
    fn update(&mut self, _: &[Variable], _: usize, _: isize) {}
}
