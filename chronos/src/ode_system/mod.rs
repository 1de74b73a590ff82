use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};
use std::error::Error;

mod newton;
mod picard;

pub use newton::NewtonOdeSystem;
pub use picard::PicardOdeSystem;

/// The contract a Newton iteration driver works against.
///
/// The driver must assemble at a trial state before reading the corresponding
/// getter for that state. The getters never reassemble; reading them against
/// a trial state other than the one last assembled for is a caller error that
/// is not detected here.
pub trait NonlinearSystemNewton<T: RealField> {
    /// Recompute the operators entering the residual at the trial state.
    fn assemble_residual(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>>;

    /// Recompute the Jacobian at the trial state.
    fn assemble_jacobian(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>>;

    /// The residual at the trial state, evaluated from the most recently
    /// assembled operators.
    fn residual(&self, x_new: DVectorSlice<T>) -> DVector<T>;

    /// The Jacobian from the most recent [`assemble_jacobian`](Self::assemble_jacobian) call.
    fn jacobian(&self) -> DMatrix<T>;

    /// Whether a single linear solve suffices for the current step.
    fn is_linear(&self) -> bool;
}

/// The contract a fixed-point (Picard) iteration driver works against.
///
/// The same caller discipline as for [`NonlinearSystemNewton`] applies:
/// assemble first, then read.
pub trait NonlinearSystemPicard<T: RealField> {
    /// Recompute the operators entering the per-step linear system at the
    /// trial state.
    fn assemble(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>>;

    /// The matrix of the per-step linear system for the current iterate.
    fn system_matrix(&self) -> DMatrix<T>;

    /// The right-hand side of the per-step linear system.
    fn rhs(&self) -> Result<DVector<T>, Box<dyn Error>>;

    /// Whether a single linear solve suffices for the current step.
    fn is_linear(&self) -> bool;
}

/// Read-only access to the raw per-step operators of a parabolic equation.
///
/// A narrow capability for diagnostics and consumers other than the nonlinear
/// solver; both adapters implement it alongside their solver contract.
pub trait ParabolicEquation<T: RealField> {
    /// The most recently assembled `(M, K, b)` triple.
    fn matrices(&self) -> (&DMatrix<T>, &DMatrix<T>, &DVector<T>);
}

/// Verify that the adapter-owned operators still match the dimension the ODE
/// source reports. A mismatch is a configuration error, surfaced before any
/// arithmetic touches the buffers.
pub(crate) fn check_operator_dimensions<T: RealField>(
    ndof: usize,
    m: &DMatrix<T>,
    k: &DMatrix<T>,
    b: &DVector<T>,
) -> Result<(), Box<dyn Error>> {
    if m.shape() != (ndof, ndof) || k.shape() != (ndof, ndof) || b.len() != ndof {
        return Err(Box::from(format!(
            "ODE system reports {} degrees of freedom, but the assembled operators have \
             dimensions {}x{} (M), {}x{} (K) and {} (b)",
            ndof,
            m.nrows(),
            m.ncols(),
            k.nrows(),
            k.ncols(),
            b.len()
        )));
    }
    Ok(())
}
