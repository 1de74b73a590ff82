use log::debug;
use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};
use std::error::Error;

use crate::time_discretization::TimeDiscretization;

/// The family of physical equations a translator produces systems for.
///
/// Exactly one family exists today. The enum is matched exhaustively at
/// translator selection, so adding a family is a compile-checked extension
/// rather than a silent fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EquationKind {
    /// First-order-in-time equations of the form `M dx/dt + K x = b`.
    Parabolic,
}

/// Stateless strategy converting the per-step operators `(M, K, b)` into the
/// quantities consumed by the nonlinear solver.
///
/// The variant is selected once per adapter, from the equation kind and the
/// explicit capability of the scheme the adapter is bound to. The residual is
/// always evaluated against the true equation and therefore shares a single
/// code path across both variants; only the linearized per-step system
/// `(A, rhs)` differs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixTranslator {
    /// For schemes that solve for the stiffness contribution of the new
    /// state:
    ///
    /// ```ignore
    ///    A = M * alpha + K,    rhs = b + M * x_old_weighted.
    /// ```
    General,
    /// For schemes that apply the stiffness operator against the old state:
    ///
    /// ```ignore
    ///    A = M * alpha,    rhs = b + M * x_old_weighted - K * x_old.
    /// ```
    Explicit,
}

impl MatrixTranslator {
    /// Select the translator variant for the given equation kind and scheme.
    ///
    /// This is the single registration point for new schemes and equation
    /// kinds: any scheme advertising the explicit capability
    /// ([`TimeDiscretization::x_old`] returning `Some`) takes the explicit
    /// translation path, everything else the general one.
    pub fn new<T: RealField>(kind: EquationKind, time_disc: &impl TimeDiscretization<T>) -> Self {
        match kind {
            EquationKind::Parabolic => {
                if time_disc.x_old().is_some() {
                    debug!("selected explicit matrix translation");
                    MatrixTranslator::Explicit
                } else {
                    debug!("selected general (implicit) matrix translation");
                    MatrixTranslator::General
                }
            }
        }
    }

    /// The matrix `A` of the per-step linear system `A x_new = rhs`.
    pub fn system_matrix<T: RealField>(
        &self,
        time_disc: &impl TimeDiscretization<T>,
        m: &DMatrix<T>,
        k: &DMatrix<T>,
    ) -> DMatrix<T> {
        let alpha = time_disc.current_x_weight();
        match self {
            MatrixTranslator::General => m * alpha + k,
            // K is applied against the old state on the right-hand side and
            // does not enter the solved-for matrix.
            MatrixTranslator::Explicit => m * alpha,
        }
    }

    /// The right-hand side of the per-step linear system.
    pub fn rhs<T: RealField>(
        &self,
        time_disc: &impl TimeDiscretization<T>,
        m: &DMatrix<T>,
        k: &DMatrix<T>,
        b: &DVector<T>,
    ) -> Result<DVector<T>, Box<dyn Error>> {
        let weighted_old_x = time_disc.weighted_old_x();
        match self {
            MatrixTranslator::General => Ok(b + m * weighted_old_x),
            MatrixTranslator::Explicit => {
                let x_old = time_disc.x_old().ok_or_else(|| {
                    Box::<dyn Error>::from(
                        "explicit translation was selected, but the scheme no longer \
                         provides its previous-step state",
                    )
                })?;
                Ok(b + m * weighted_old_x - k * x_old)
            }
        }
    }

    /// The residual of the true equation at the trial state `x_new`,
    ///
    /// ```ignore
    ///    r = M * (alpha * x_new - x_old_weighted) + K * x_curr - b.
    /// ```
    ///
    /// Identical for both variants: how the linear system is structured for
    /// the step does not change the equation being solved.
    pub fn residual<T: RealField>(
        &self,
        time_disc: &impl TimeDiscretization<T>,
        m: &DMatrix<T>,
        k: &DMatrix<T>,
        b: &DVector<T>,
        x_new: DVectorSlice<T>,
    ) -> DVector<T> {
        let alpha = time_disc.current_x_weight();
        let x_curr = time_disc.current_x(x_new);
        let x_dot = x_new * alpha - time_disc.weighted_old_x();

        m * x_dot + k * x_curr - b
    }

    /// Transformation of an already-assembled Jacobian.
    ///
    /// The identity for the parabolic family, where the ODE source and the
    /// scheme produce the fully time-adjusted Jacobian before this call; kept
    /// so future equation kinds can apply further adjustment without touching
    /// the adapters.
    pub fn jacobian<T: RealField>(&self, jac: DMatrix<T>) -> DMatrix<T> {
        jac
    }
}
