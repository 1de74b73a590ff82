use nalgebra::{DVector, DVectorSlice, RealField};
use numeric_literals::replace_float_literals;

use crate::time_discretization::TimeDiscretization;

/// The implicit (backward) Euler scheme.
///
/// The time derivative over a step of size `dt` is approximated by
///
/// ```ignore
///    dx/dt ≈ (x_new - x_old) / dt,
/// ```
///
/// and the operators are evaluated at the end of the step, i.e. at
/// `(t_old + dt, x_new)`.
#[derive(Debug, Clone)]
pub struct BackwardEuler<T: RealField> {
    t: T,
    dt: T,
    x_old: DVector<T>,
}

impl<T: RealField> BackwardEuler<T> {
    pub fn new(ndof: usize) -> Self {
        Self {
            t: T::zero(),
            dt: T::one(),
            x_old: DVector::zeros(ndof),
        }
    }
}

impl<T: RealField> TimeDiscretization<T> for BackwardEuler<T> {
    fn current_time(&self) -> T {
        self.t
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn current_x_weight(&self) -> T {
        1.0 / self.dt
    }

    fn weighted_old_x(&self) -> DVector<T> {
        &self.x_old * self.current_x_weight()
    }

    fn current_x(&self, x_new: DVectorSlice<T>) -> DVector<T> {
        x_new.clone_owned()
    }

    fn dx_dx(&self) -> T {
        T::one()
    }

    fn set_initial_state(&mut self, t0: T, x0: DVectorSlice<T>) {
        self.t = t0;
        self.x_old = x0.clone_owned();
    }

    fn push_state(&mut self, x: DVectorSlice<T>) {
        self.x_old.copy_from(&x);
    }

    fn next_timestep(&mut self, dt: T) {
        self.dt = dt;
        self.t += dt;
    }
}

/// The explicit (forward) Euler scheme.
///
/// Uses the same difference quotient as [`BackwardEuler`] but evaluates the
/// operators at the start of the step, i.e. at `(t_old, x_old)`. The
/// resulting per-step system is linear in `x_new` regardless of the physics,
/// and the stiffness contribution is applied against the old state, which the
/// scheme advertises through [`TimeDiscretization::x_old`].
#[derive(Debug, Clone)]
pub struct ForwardEuler<T: RealField> {
    t: T,
    t_old: T,
    dt: T,
    x_old: DVector<T>,
}

impl<T: RealField> ForwardEuler<T> {
    pub fn new(ndof: usize) -> Self {
        Self {
            t: T::zero(),
            t_old: T::zero(),
            dt: T::one(),
            x_old: DVector::zeros(ndof),
        }
    }
}

impl<T: RealField> TimeDiscretization<T> for ForwardEuler<T> {
    fn current_time(&self) -> T {
        self.t_old
    }

    #[replace_float_literals(T::from_f64(literal).unwrap())]
    fn current_x_weight(&self) -> T {
        1.0 / self.dt
    }

    fn weighted_old_x(&self) -> DVector<T> {
        &self.x_old * self.current_x_weight()
    }

    fn current_x(&self, _x_new: DVectorSlice<T>) -> DVector<T> {
        self.x_old.clone()
    }

    fn dx_dx(&self) -> T {
        T::zero()
    }

    fn is_linear(&self) -> bool {
        true
    }

    fn x_old(&self) -> Option<DVectorSlice<T>> {
        Some(DVectorSlice::from(&self.x_old))
    }

    fn set_initial_state(&mut self, t0: T, x0: DVectorSlice<T>) {
        self.t = t0;
        self.t_old = t0;
        self.x_old = x0.clone_owned();
    }

    fn push_state(&mut self, x: DVectorSlice<T>) {
        self.x_old.copy_from(&x);
    }

    fn next_timestep(&mut self, dt: T) {
        self.dt = dt;
        self.t_old = self.t;
        self.t += dt;
    }
}
