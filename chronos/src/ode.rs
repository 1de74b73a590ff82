use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};
use std::error::Error;

/// A spatially discretized ODE system that is first order in time.
///
/// The system is represented in the form
///
/// ```ignore
///    M(t, x) dx/dt + K(t, x) x = b(t, x),
/// ```
///
/// where the mass operator `M`, the stiffness operator `K` and the load
/// vector `b` are recomputed by an external discretizer once per nonlinear
/// iteration.
pub trait FirstOrderOdeSystem<T: RealField> {
    /// Number of degrees of freedom of the discretized system.
    fn ndof(&self) -> usize;

    /// Whether the system is linear in the unknown `x`.
    fn is_linear(&self) -> bool;

    /// Recompute `m`, `k` and `b` at the given time and state.
    ///
    /// The buffers are overwritten in place and must keep their dimensions.
    fn assemble(
        &mut self,
        t: T,
        x_curr: DVectorSlice<T>,
        m: &mut DMatrix<T>,
        k: &mut DMatrix<T>,
        b: &mut DVector<T>,
    ) -> Result<(), Box<dyn Error>>;
}

/// A first-order ODE system that can also assemble the Jacobian of its
/// residual, as required by Newton iterations.
pub trait DifferentiableOdeSystem<T: RealField>: FirstOrderOdeSystem<T> {
    /// Recompute the residual Jacobian `jac` at the given time and state.
    ///
    /// `dxdot_dx` is the derivative of the discrete time derivative with
    /// respect to the new unknown (the scheme weight `alpha`), and `dx_dx`
    /// the derivative of the scheme's blended state with respect to the new
    /// unknown. The buffer is overwritten in place.
    fn assemble_jacobian(
        &mut self,
        t: T,
        x_curr: DVectorSlice<T>,
        dxdot_dx: T,
        dx_dx: T,
        jac: &mut DMatrix<T>,
    ) -> Result<(), Box<dyn Error>>;
}
