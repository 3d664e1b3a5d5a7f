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

//! C embedding surface for the presto solver.
//!
//! The surface is session-based: a `PrestoSession` accumulates the model
//! declaration (variables, constraints, objective), `presto_solve` runs the
//! engine, and the result accessors read the outcome back. Handles are
//! opaque; every function is defensive against null handles and malformed
//! arguments, and the per-session last-error string stays valid until the
//! next call on the same handle.

use std::ffi::{c_char, c_double, c_int, CStr, CString};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use presto::{
    AllDifferent, AllEqual, Comparator, Constraint, FixValue, LinearEquation, LinearObjective,
    ModelBuilder, ModelError, Objective, Options, Solver, Variable,
};

// ----------------------------------------------------------------------------
// --- STATUS CODES -----------------------------------------------------------
// ----------------------------------------------------------------------------

/// Status codes returned by the C API functions.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrestoStatus {
    /// Operation completed successfully.
    Success = 0,
    /// Feasible solution found (satisfaction problem).
    SatFound = 1,
    /// Optimal solution found (optimization problem, if provable). The
    /// engine is incomplete and never proves optimality itself.
    OptimalFound = 2,
    /// Feasible solution found (optimization problem, may not be optimal).
    FeasibleFound = 3,
    /// No solution found within the timeout (never a proof of infeasibility).
    Infeasible = -1,
    /// An unspecified error occurred.
    ErrorUnknown = -2,
    /// A required handle was NULL.
    ErrorNullHandle = -3,
    /// An invalid argument was provided (null pointer, bad length).
    ErrorInvalidArg = -4,
    /// An invalid variable or constraint id was provided.
    ErrorInvalidId = -5,
    /// Memory allocation failed.
    ErrorMemory = -6,
    /// An internal solver error occurred during the search.
    ErrorSolver = -7,
    /// Incorrect API usage (e.g. reading results before solving).
    ErrorApiUsage = -8,
}

/// Solution status codes, for querying results after a solve.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrestoSolutionStatus {
    /// The solver has not been run yet.
    Unknown = 0,
    /// Feasible solution found (satisfaction).
    Sat = 1,
    /// Optimal solution found (optimization).
    Optimal = 2,
    /// Feasible, possibly non-optimal solution found (optimization).
    Feasible = 3,
    /// No solution found within the timeout.
    Infeasible = -1,
}

/// Comparison flavor of a linear constraint.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrestoComparator {
    /// `sum <= rhs`
    LessThanOrEqual = 0,
    /// `sum == rhs`
    Equal = 1,
    /// `sum >= rhs`
    GreaterThanOrEqual = 2,
}

impl From<PrestoComparator> for Comparator {
    fn from(value: PrestoComparator) -> Self {
        match value {
            PrestoComparator::LessThanOrEqual => Comparator::LessThanOrEqual,
            PrestoComparator::Equal => Comparator::Equal,
            PrestoComparator::GreaterThanOrEqual => Comparator::GreaterThanOrEqual,
        }
    }
}

// ----------------------------------------------------------------------------
// --- HANDLES ----------------------------------------------------------------
// ----------------------------------------------------------------------------

enum ConstraintSpec {
    AllDifferent(Vec<usize>),
    AllEqual(Vec<usize>),
    FixValue(Vec<usize>, isize),
    Linear { ids: Vec<usize>, coefficients: Vec<f64>, comparator: Comparator, rhs: f64 },
}

struct ObjectiveSpec {
    ids: Vec<usize>,
    coefficients: Vec<f64>,
    maximize: bool,
}

/// Opaque modeling-and-solving session.
pub struct PrestoSession {
    variables: Vec<(String, Vec<isize>)>,
    constraints: Vec<ConstraintSpec>,
    objective: Option<ObjectiveSpec>,
    last_error: CString,
    solution_status: PrestoSolutionStatus,
    solution: Vec<isize>,
    sat_error: f64,
    objective_value: f64,
}

/// Opaque solver options.
pub struct PrestoOptions {
    inner: Options,
}

impl PrestoSession {
    fn set_error(&mut self, message: &str) {
        // a NUL inside the message would truncate it, never fail the call
        self.last_error = CString::new(message).unwrap_or_default();
    }
}

impl ModelBuilder for PrestoSession {
    fn declare_variables(&self) -> Result<Vec<Variable>, ModelError> {
        self.variables
            .iter()
            .map(|(name, domain)| Variable::new(name.clone(), domain.clone()))
            .collect()
    }

    fn declare_constraints(&self) -> Vec<Box<dyn Constraint>> {
        self.constraints
            .iter()
            .filter_map(|spec| -> Option<Box<dyn Constraint>> {
                match spec {
                    ConstraintSpec::AllDifferent(ids) => {
                        Some(Box::new(AllDifferent::new(ids.clone())))
                    }
                    ConstraintSpec::AllEqual(ids) => Some(Box::new(AllEqual::new(ids.clone()))),
                    ConstraintSpec::FixValue(ids, value) => {
                        Some(Box::new(FixValue::new(ids.clone(), *value)))
                    }
                    ConstraintSpec::Linear { ids, coefficients, comparator, rhs } => {
                        LinearEquation::new(ids.clone(), coefficients.clone(), *comparator, *rhs)
                            .ok()
                            .map(|c| Box::new(c) as Box<dyn Constraint>)
                    }
                }
            })
            .collect()
    }

    fn declare_objective(&self) -> Option<Box<dyn Objective>> {
        let spec = self.objective.as_ref()?;
        LinearObjective::new(spec.ids.clone(), spec.coefficients.clone(), spec.maximize)
            .ok()
            .map(|objective| Box::new(objective) as Box<dyn Objective>)
    }
}

// ----------------------------------------------------------------------------
// --- SESSION LIFECYCLE ------------------------------------------------------
// ----------------------------------------------------------------------------

/// Creates a new modeling session. Returns NULL on allocation failure.
#[no_mangle]
pub extern "C" fn presto_create_session() -> *mut PrestoSession {
    Box::into_raw(Box::new(PrestoSession {
        variables: Vec::new(),
        constraints: Vec::new(),
        objective: None,
        last_error: CString::default(),
        solution_status: PrestoSolutionStatus::Unknown,
        solution: Vec::new(),
        sat_error: f64::NAN,
        objective_value: f64::NAN,
    }))
}

/// Destroys a session. NULL is tolerated.
///
/// # Safety
/// `session` must be a pointer previously returned by
/// `presto_create_session` and not destroyed since.
#[no_mangle]
pub unsafe extern "C" fn presto_destroy_session(session: *mut PrestoSession) {
    if !session.is_null() {
        drop(unsafe { Box::from_raw(session) });
    }
}

/// The error message of the last failed call on this session. The pointer
/// stays valid until the next call taking the same session.
///
/// # Safety
/// `session` must be a live session handle.
#[no_mangle]
pub unsafe extern "C" fn presto_last_error(session: *const PrestoSession) -> *const c_char {
    match unsafe { session.as_ref() } {
        Some(session) => session.last_error.as_ptr(),
        None => std::ptr::null(),
    }
}

// ----------------------------------------------------------------------------
// --- MODEL DECLARATION ------------------------------------------------------
// ----------------------------------------------------------------------------

unsafe fn read_ids(
    session: &mut PrestoSession,
    ids: *const i64,
    length: usize,
) -> Result<Vec<usize>, PrestoStatus> {
    if ids.is_null() || length == 0 {
        session.set_error("variable id array is null or empty");
        return Err(PrestoStatus::ErrorInvalidArg);
    }
    let raw = unsafe { std::slice::from_raw_parts(ids, length) };
    let mut out = Vec::with_capacity(length);
    for &id in raw {
        if id < 0 || id as usize >= session.variables.len() {
            session.set_error(&format!("unknown variable id {id}"));
            return Err(PrestoStatus::ErrorInvalidId);
        }
        out.push(id as usize);
    }
    Ok(out)
}

/// Declares a variable with an explicit domain and returns its nonnegative
/// id, or a negative `PrestoStatus` on error.
///
/// # Safety
/// `session` must be a live session handle; `name` must be a NUL-terminated
/// string or NULL; `domain` must point to `length` readable values.
#[no_mangle]
pub unsafe extern "C" fn presto_add_variable(
    session: *mut PrestoSession,
    name: *const c_char,
    domain: *const i64,
    length: usize,
) -> i64 {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle as i64;
    };
    if domain.is_null() || length == 0 {
        session.set_error("variable domain is null or empty");
        return PrestoStatus::ErrorInvalidArg as i64;
    }
    let name = if name.is_null() {
        format!("v{}", session.variables.len())
    } else {
        unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned()
    };
    let domain: Vec<isize> =
        unsafe { std::slice::from_raw_parts(domain, length) }.iter().map(|&v| v as isize).collect();

    // reject malformed domains now, so that the id is never handed out
    if let Err(error) = Variable::new(name.clone(), domain.clone()) {
        session.set_error(&error.to_string());
        return PrestoStatus::ErrorInvalidArg as i64;
    }
    session.variables.push((name, domain));
    (session.variables.len() - 1) as i64
}

/// Declares a variable with the contiguous domain `[start, start + size)`
/// and returns its nonnegative id, or a negative `PrestoStatus` on error.
///
/// # Safety
/// `session` must be a live session handle; `name` as in
/// `presto_add_variable`.
#[no_mangle]
pub unsafe extern "C" fn presto_add_variable_range(
    session: *mut PrestoSession,
    name: *const c_char,
    start: i64,
    size: usize,
) -> i64 {
    let domain: Vec<i64> = (start..start + size as i64).collect();
    unsafe { presto_add_variable(session, name, domain.as_ptr(), domain.len()) }
}

/// Adds an AllDifferent constraint and returns its nonnegative id, or a
/// negative `PrestoStatus` on error.
///
/// # Safety
/// `session` must be a live session handle; `ids` must point to `length`
/// readable values.
#[no_mangle]
pub unsafe extern "C" fn presto_add_all_different(
    session: *mut PrestoSession,
    ids: *const i64,
    length: usize,
) -> i64 {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle as i64;
    };
    match unsafe { read_ids(session, ids, length) } {
        Ok(ids) => {
            session.constraints.push(ConstraintSpec::AllDifferent(ids));
            (session.constraints.len() - 1) as i64
        }
        Err(status) => status as i64,
    }
}

/// Adds an AllEqual constraint and returns its nonnegative id, or a negative
/// `PrestoStatus` on error.
///
/// # Safety
/// As for `presto_add_all_different`.
#[no_mangle]
pub unsafe extern "C" fn presto_add_all_equal(
    session: *mut PrestoSession,
    ids: *const i64,
    length: usize,
) -> i64 {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle as i64;
    };
    match unsafe { read_ids(session, ids, length) } {
        Ok(ids) => {
            session.constraints.push(ConstraintSpec::AllEqual(ids));
            (session.constraints.len() - 1) as i64
        }
        Err(status) => status as i64,
    }
}

/// Adds a FixValue constraint and returns its nonnegative id, or a negative
/// `PrestoStatus` on error.
///
/// # Safety
/// As for `presto_add_all_different`.
#[no_mangle]
pub unsafe extern "C" fn presto_add_fix_value(
    session: *mut PrestoSession,
    ids: *const i64,
    length: usize,
    value: i64,
) -> i64 {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle as i64;
    };
    match unsafe { read_ids(session, ids, length) } {
        Ok(ids) => {
            session.constraints.push(ConstraintSpec::FixValue(ids, value as isize));
            (session.constraints.len() - 1) as i64
        }
        Err(status) => status as i64,
    }
}

/// Adds the linear constraint `sum(coefficients[i] * ids[i]) <cmp> rhs` and
/// returns its nonnegative id, or a negative `PrestoStatus` on error.
///
/// # Safety
/// `session` must be a live session handle; `ids` and `coefficients` must
/// both point to `length` readable values.
#[no_mangle]
pub unsafe extern "C" fn presto_add_linear_equation(
    session: *mut PrestoSession,
    ids: *const i64,
    coefficients: *const c_double,
    length: usize,
    comparator: PrestoComparator,
    rhs: c_double,
) -> i64 {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle as i64;
    };
    if coefficients.is_null() {
        session.set_error("coefficient array is null");
        return PrestoStatus::ErrorInvalidArg as i64;
    }
    match unsafe { read_ids(session, ids, length) } {
        Ok(ids) => {
            let coefficients = unsafe { std::slice::from_raw_parts(coefficients, length) }.to_vec();
            session.constraints.push(ConstraintSpec::Linear {
                ids,
                coefficients,
                comparator: comparator.into(),
                rhs,
            });
            (session.constraints.len() - 1) as i64
        }
        Err(status) => status as i64,
    }
}

/// Sets the (linear) objective `sum(coefficients[i] * ids[i])`, to maximize
/// when `maximize` is nonzero. Replaces any previously set objective.
///
/// # Safety
/// As for `presto_add_linear_equation`.
#[no_mangle]
pub unsafe extern "C" fn presto_set_linear_objective(
    session: *mut PrestoSession,
    ids: *const i64,
    coefficients: *const c_double,
    length: usize,
    maximize: c_int,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    if coefficients.is_null() {
        session.set_error("coefficient array is null");
        return PrestoStatus::ErrorInvalidArg;
    }
    match unsafe { read_ids(session, ids, length) } {
        Ok(ids) => {
            let coefficients = unsafe { std::slice::from_raw_parts(coefficients, length) }.to_vec();
            session.objective = Some(ObjectiveSpec { ids, coefficients, maximize: maximize != 0 });
            PrestoStatus::Success
        }
        Err(status) => status,
    }
}

// ----------------------------------------------------------------------------
// --- OPTIONS ----------------------------------------------------------------
// ----------------------------------------------------------------------------

/// Creates an options handle with every field unset (engine defaults).
#[no_mangle]
pub extern "C" fn presto_create_options() -> *mut PrestoOptions {
    Box::into_raw(Box::new(PrestoOptions { inner: Options::default() }))
}

/// Destroys an options handle. NULL is tolerated.
///
/// # Safety
/// `options` must be a pointer previously returned by
/// `presto_create_options` and not destroyed since.
#[no_mangle]
pub unsafe extern "C" fn presto_destroy_options(options: *mut PrestoOptions) {
    if !options.is_null() {
        drop(unsafe { Box::from_raw(options) });
    }
}

macro_rules! option_setter {
    ($(#[$doc:meta])* $name:ident, $field:ident, $ty:ty, $convert:expr) => {
        $(#[$doc])*
        ///
        /// # Safety
        /// `options` must be a live options handle.
        #[no_mangle]
        pub unsafe extern "C" fn $name(options: *mut PrestoOptions, value: $ty) -> PrestoStatus {
            let Some(options) = (unsafe { options.as_mut() }) else {
                return PrestoStatus::ErrorNullHandle;
            };
            let convert = $convert;
            options.inner.$field = convert(value);
            PrestoStatus::Success
        }
    };
}

option_setter!(
    /// Enables or disables parallel runs (one search unit per thread).
    presto_options_set_parallel_runs,
    parallel_runs,
    c_int,
    |v: c_int| v != 0
);
option_setter!(
    /// Starts the search from the declared assignment instead of sampling.
    presto_options_set_custom_starting_point,
    custom_starting_point,
    c_int,
    |v: c_int| v != 0
);
option_setter!(
    /// Resumes the search from the declared assignment.
    presto_options_set_resume_search,
    resume_search,
    c_int,
    |v: c_int| v != 0
);
option_setter!(
    /// Number of worker threads; zero or negative restores the hardware default.
    presto_options_set_number_threads,
    number_threads,
    i64,
    |v: i64| if v <= 0 { None } else { Some(v as usize) }
);
option_setter!(
    /// Tabu tenure after a local minimum; negative restores the default.
    presto_options_set_tabu_time_local_min,
    tabu_time_local_min,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as u64) }
);
option_setter!(
    /// Tabu tenure after a selected move; negative restores the default.
    presto_options_set_tabu_time_selected,
    tabu_time_selected,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as u64) }
);
option_setter!(
    /// Percentage chance (0-100) to escape a plateau; negative restores the default.
    presto_options_set_percent_chance_escape_plateau,
    percent_chance_escape_plateau,
    i64,
    |v: i64| if v < 0 { None } else { Some((v as u32).min(100)) }
);
option_setter!(
    /// Tabu count triggering a reset; negative restores the default.
    presto_options_set_reset_threshold,
    reset_threshold,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as usize) }
);
option_setter!(
    /// Resets between restarts (0 = never restart); negative restores the default.
    presto_options_set_restart_threshold,
    restart_threshold,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as u64) }
);
option_setter!(
    /// Variables re-sampled by a reset; negative restores the default.
    presto_options_set_number_variables_to_reset,
    number_variables_to_reset,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as usize) }
);
option_setter!(
    /// Random assignments drawn for the start; negative restores the default.
    presto_options_set_number_start_samplings,
    number_start_samplings,
    i64,
    |v: i64| if v < 0 { None } else { Some(v as usize) }
);
option_setter!(
    /// Base seed of the per-worker random generators.
    presto_options_set_seed,
    seed,
    u64,
    |v: u64| Some(v)
);

// ----------------------------------------------------------------------------
// --- SOLVE & RESULTS --------------------------------------------------------
// ----------------------------------------------------------------------------

/// Runs the solver for at most `timeout_microseconds`. `options` may be NULL
/// for defaults. Returns `SatFound` / `FeasibleFound` when a satisfying
/// assignment was found, `Infeasible` when none was found within the budget.
///
/// # Safety
/// `session` must be a live session handle; `options`, when non-NULL, a live
/// options handle.
#[no_mangle]
pub unsafe extern "C" fn presto_solve(
    session: *mut PrestoSession,
    options: *const PrestoOptions,
    timeout_microseconds: u64,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    let options =
        unsafe { options.as_ref() }.map(|o| o.inner.clone()).unwrap_or_default();
    let budget = Duration::from_micros(timeout_microseconds);
    let is_optimization = session.objective.is_some();

    let solved = catch_unwind(AssertUnwindSafe(|| {
        Solver::new(session).with_options(options).solve(budget)
    }));
    match solved {
        Ok(Ok(outcome)) => {
            session.solution = outcome.solution;
            session.sat_error = outcome.best_sat_error;
            session.objective_value = outcome.best_cost.unwrap_or(f64::NAN);
            if outcome.satisfied {
                if is_optimization {
                    session.solution_status = PrestoSolutionStatus::Feasible;
                    PrestoStatus::FeasibleFound
                } else {
                    session.solution_status = PrestoSolutionStatus::Sat;
                    PrestoStatus::SatFound
                }
            } else {
                session.solution_status = PrestoSolutionStatus::Infeasible;
                PrestoStatus::Infeasible
            }
        }
        Ok(Err(error)) => {
            session.set_error(&error.to_string());
            session.solution_status = PrestoSolutionStatus::Unknown;
            PrestoStatus::ErrorInvalidArg
        }
        Err(_) => {
            session.set_error("internal solver panic");
            session.solution_status = PrestoSolutionStatus::Unknown;
            PrestoStatus::ErrorSolver
        }
    }
}

/// Reads the value of one variable from the last solution.
///
/// # Safety
/// `session` must be a live session handle; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn presto_get_variable_value(
    session: *mut PrestoSession,
    variable_id: i64,
    out: *mut i64,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    if out.is_null() {
        session.set_error("output pointer is null");
        return PrestoStatus::ErrorInvalidArg;
    }
    if session.solution_status == PrestoSolutionStatus::Unknown {
        session.set_error("no solve has been run on this session");
        return PrestoStatus::ErrorApiUsage;
    }
    if variable_id < 0 || variable_id as usize >= session.solution.len() {
        session.set_error(&format!("unknown variable id {variable_id}"));
        return PrestoStatus::ErrorInvalidId;
    }
    unsafe { *out = session.solution[variable_id as usize] as i64 };
    PrestoStatus::Success
}

/// Reads the whole solution (one value per declared variable) into `out`.
///
/// # Safety
/// `session` must be a live session handle; `out` must point to `length`
/// writable values.
#[no_mangle]
pub unsafe extern "C" fn presto_get_variable_values(
    session: *mut PrestoSession,
    out: *mut i64,
    length: usize,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    if out.is_null() || length < session.solution.len() {
        session.set_error("output buffer is null or too small");
        return PrestoStatus::ErrorInvalidArg;
    }
    if session.solution_status == PrestoSolutionStatus::Unknown {
        session.set_error("no solve has been run on this session");
        return PrestoStatus::ErrorApiUsage;
    }
    for (index, &value) in session.solution.iter().enumerate() {
        unsafe { *out.add(index) = value as i64 };
    }
    PrestoStatus::Success
}

/// Reads the satisfaction error of the last solution (0 iff satisfied).
///
/// # Safety
/// `session` must be a live session handle; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn presto_get_sat_error(
    session: *mut PrestoSession,
    out: *mut c_double,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    if out.is_null() {
        session.set_error("output pointer is null");
        return PrestoStatus::ErrorInvalidArg;
    }
    if session.solution_status == PrestoSolutionStatus::Unknown {
        session.set_error("no solve has been run on this session");
        return PrestoStatus::ErrorApiUsage;
    }
    unsafe { *out = session.sat_error };
    PrestoStatus::Success
}

/// Reads the objective value of the last solution (NaN when none applies).
///
/// # Safety
/// `session` must be a live session handle; `out` must be writable.
#[no_mangle]
pub unsafe extern "C" fn presto_get_objective_value(
    session: *mut PrestoSession,
    out: *mut c_double,
) -> PrestoStatus {
    let Some(session) = (unsafe { session.as_mut() }) else {
        return PrestoStatus::ErrorNullHandle;
    };
    if out.is_null() {
        session.set_error("output pointer is null");
        return PrestoStatus::ErrorInvalidArg;
    }
    if session.solution_status == PrestoSolutionStatus::Unknown {
        session.set_error("no solve has been run on this session");
        return PrestoStatus::ErrorApiUsage;
    }
    unsafe { *out = session.objective_value };
    PrestoStatus::Success
}

/// The solution status of the last solve on this session.
///
/// # Safety
/// `session` must be a live session handle.
#[no_mangle]
pub unsafe extern "C" fn presto_get_solution_status(
    session: *const PrestoSession,
) -> PrestoSolutionStatus {
    match unsafe { session.as_ref() } {
        Some(session) => session.solution_status,
        None => PrestoSolutionStatus::Unknown,
    }
}

// ############################################################################
// #### TESTS #################################################################
// ############################################################################

#[cfg(test)]
mod test_capi {
    use super::*;

    #[test]
    fn session_lifecycle_and_satisfaction_roundtrip() {
        unsafe {
            let session = presto_create_session();
            assert!(!session.is_null());

            let domain = [1i64, 2, 3];
            let x = presto_add_variable(session, std::ptr::null(), domain.as_ptr(), 3);
            let y = presto_add_variable_range(session, std::ptr::null(), 1, 3);
            let z = presto_add_variable_range(session, std::ptr::null(), 1, 3);
            assert_eq!((x, y, z), (0, 1, 2));

            let ids = [x, y, z];
            let constraint = presto_add_all_different(session, ids.as_ptr(), 3);
            assert_eq!(constraint, 0);

            let status = presto_solve(session, std::ptr::null(), 500_000);
            assert_eq!(status, PrestoStatus::SatFound);
            assert_eq!(presto_get_solution_status(session), PrestoSolutionStatus::Sat);

            let mut values = [0i64; 3];
            let status = presto_get_variable_values(session, values.as_mut_ptr(), 3);
            assert_eq!(status, PrestoStatus::Success);
            values.sort_unstable();
            assert_eq!(values, [1, 2, 3]);

            let mut error = f64::NAN;
            assert_eq!(presto_get_sat_error(session, &mut error), PrestoStatus::Success);
            assert_eq!(error, 0.0);

            presto_destroy_session(session);
        }
    }

    #[test]
    fn optimization_roundtrip_reports_a_feasible_cost() {
        unsafe {
            let session = presto_create_session();
            let bottle = presto_add_variable_range(session, std::ptr::null(), 0, 52);
            let sandwich = presto_add_variable_range(session, std::ptr::null(), 0, 12);

            let ids = [bottle, sandwich];
            let volumes = [1.0, 1.25];
            let calories = [500.0, 650.0];
            assert!(
                presto_add_linear_equation(
                    session,
                    ids.as_ptr(),
                    volumes.as_ptr(),
                    2,
                    PrestoComparator::LessThanOrEqual,
                    30.0,
                ) >= 0
            );
            assert_eq!(
                presto_set_linear_objective(session, ids.as_ptr(), calories.as_ptr(), 2, 1),
                PrestoStatus::Success
            );

            let options = presto_create_options();
            assert_eq!(
                presto_options_set_number_start_samplings(options, 20),
                PrestoStatus::Success
            );

            let status = presto_solve(session, options, 1_000_000);
            assert_eq!(status, PrestoStatus::FeasibleFound);

            let mut value = f64::NAN;
            assert_eq!(presto_get_objective_value(session, &mut value), PrestoStatus::Success);
            assert!(value >= 14000.0);

            presto_destroy_options(options);
            presto_destroy_session(session);
        }
    }

    #[test]
    fn null_handles_and_bad_ids_are_reported() {
        unsafe {
            assert_eq!(
                presto_solve(std::ptr::null_mut(), std::ptr::null(), 1000),
                PrestoStatus::ErrorNullHandle
            );

            let session = presto_create_session();
            let _ = presto_add_variable_range(session, std::ptr::null(), 0, 3);

            // dangling variable id in a constraint scope
            let bad = [7i64];
            assert_eq!(
                presto_add_all_different(session, bad.as_ptr(), 1),
                PrestoStatus::ErrorInvalidId as i64
            );
            let message = CStr::from_ptr(presto_last_error(session));
            assert!(message.to_string_lossy().contains("unknown variable id"));

            // results before any solve
            let mut out = 0i64;
            assert_eq!(
                presto_get_variable_value(session, 0, &mut out),
                PrestoStatus::ErrorApiUsage
            );

            // malformed domain
            let dup = [1i64, 1];
            assert_eq!(
                presto_add_variable(session, std::ptr::null(), dup.as_ptr(), 2),
                PrestoStatus::ErrorInvalidArg as i64
            );

            presto_destroy_session(session);
        }
    }
}
