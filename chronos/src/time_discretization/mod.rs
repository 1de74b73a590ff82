use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};

mod euler;

pub use euler::{BackwardEuler, ForwardEuler};

/// A single-step time discretization of a first-order ODE system.
///
/// A scheme approximates the time derivative of the unknown `x` over the
/// current step as
///
/// ```ignore
///    dx/dt ≈ alpha * x_new - x_old_weighted,
/// ```
///
/// where `alpha` is the weight of the new unknown and `x_old_weighted` a
/// weighted combination of previously accepted states, both scheme- and
/// step-size-dependent. The scheme owns the accepted state of the previous
/// step; the stepping driver advances it between steps through
/// [`push_state`](TimeDiscretization::push_state) and
/// [`next_timestep`](TimeDiscretization::next_timestep).
pub trait TimeDiscretization<T: RealField> {
    /// The time at which the current step's operators are to be evaluated.
    fn current_time(&self) -> T;

    /// The weight `alpha` of the new unknown in the discrete time derivative.
    fn current_x_weight(&self) -> T;

    /// The weighted combination of previously accepted states entering the
    /// discrete time derivative.
    fn weighted_old_x(&self) -> DVector<T>;

    /// The state the operators are evaluated at, blended from `x_new` and the
    /// old state according to the scheme.
    fn current_x(&self, x_new: DVectorSlice<T>) -> DVector<T>;

    /// Derivative of the blended state with respect to the new unknown.
    fn dx_dx(&self) -> T;

    /// Apply scheme-specific corrections to an assembled Jacobian in place,
    /// e.g. elimination of boundary-condition rows.
    fn adjust_jacobian(&self, _jac: &mut DMatrix<T>) {}

    /// Whether the per-step algebraic system is linear in the new unknown
    /// regardless of the physics.
    fn is_linear(&self) -> bool {
        false
    }

    /// The raw previous-step state, for schemes that apply the stiffness
    /// operator to the old state instead of solving for it.
    ///
    /// Returning `Some` advertises the scheme as explicit. Translator
    /// selection keys on this capability rather than on the concrete scheme
    /// type, so new explicit schemes need no registration anywhere else.
    fn x_old(&self) -> Option<DVectorSlice<T>> {
        None
    }

    /// Set the state the scheme starts stepping from.
    fn set_initial_state(&mut self, t0: T, x0: DVectorSlice<T>);

    /// Accept the converged solution of the completed step as the new old
    /// state. Called by the stepping driver, never by the adapters.
    fn push_state(&mut self, x: DVectorSlice<T>);

    /// Advance the scheme to the next step of size `dt`.
    fn next_timestep(&mut self, dt: T);
}
