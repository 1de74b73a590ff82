use coarse_prof::profile;
use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};
use std::error::Error;

use crate::ode::DifferentiableOdeSystem;
use crate::ode_system::{check_operator_dimensions, NonlinearSystemNewton, ParabolicEquation};
use crate::time_discretization::TimeDiscretization;
use crate::translator::{EquationKind, MatrixTranslator};

/// Adapter binding an ODE source and a time discretization into the system a
/// Newton driver iterates on.
///
/// Owns the per-step operators `M`, `K`, `b` and the Jacobian. All four are
/// sized once from the ODE source at construction and overwritten in place by
/// every assembly call; no assembly result outlives a newer assembly call.
pub struct NewtonOdeSystem<T: RealField, Ode, Td> {
    ode: Ode,
    time_disc: Td,
    translator: MatrixTranslator,
    jac: DMatrix<T>,
    m: DMatrix<T>,
    k: DMatrix<T>,
    b: DVector<T>,
}

impl<T, Ode, Td> NewtonOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: DifferentiableOdeSystem<T>,
    Td: TimeDiscretization<T>,
{
    /// Bind `ode` and `time_disc` together, selecting the matching translator
    /// variant for the scheme.
    pub fn new(ode: Ode, time_disc: Td) -> Self {
        let ndof = ode.ndof();
        let translator = MatrixTranslator::new(EquationKind::Parabolic, &time_disc);
        Self {
            ode,
            time_disc,
            translator,
            jac: DMatrix::zeros(ndof, ndof),
            m: DMatrix::zeros(ndof, ndof),
            k: DMatrix::zeros(ndof, ndof),
            b: DVector::zeros(ndof),
        }
    }

    pub fn ode(&self) -> &Ode {
        &self.ode
    }

    pub fn time_discretization(&self) -> &Td {
        &self.time_disc
    }

    /// The stepping driver advances the scheme through this between steps.
    pub fn time_discretization_mut(&mut self) -> &mut Td {
        &mut self.time_disc
    }

    fn check_jacobian_dimensions(&self) -> Result<(), Box<dyn Error>> {
        let ndof = self.ode.ndof();
        if self.jac.shape() != (ndof, ndof) {
            return Err(Box::from(format!(
                "ODE system reports {} degrees of freedom, but the assembled Jacobian has \
                 dimensions {}x{}",
                ndof,
                self.jac.nrows(),
                self.jac.ncols()
            )));
        }
        Ok(())
    }
}

impl<T, Ode, Td> NonlinearSystemNewton<T> for NewtonOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: DifferentiableOdeSystem<T>,
    Td: TimeDiscretization<T>,
{
    fn assemble_residual(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>> {
        profile!("assemble M, K, b");

        check_operator_dimensions(self.ode.ndof(), &self.m, &self.k, &self.b)?;

        let t = self.time_disc.current_time();
        let x_curr = self.time_disc.current_x(x_new);
        self.ode.assemble(
            t,
            DVectorSlice::from(&x_curr),
            &mut self.m,
            &mut self.k,
            &mut self.b,
        )?;

        // A misbehaving source may have resized the buffers through the
        // mutable references it was handed.
        check_operator_dimensions(self.ode.ndof(), &self.m, &self.k, &self.b)
    }

    fn assemble_jacobian(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>> {
        profile!("assemble jacobian");

        self.check_jacobian_dimensions()?;

        let t = self.time_disc.current_time();
        let x_curr = self.time_disc.current_x(x_new);
        let dxdot_dx = self.time_disc.current_x_weight();
        self.ode.assemble_jacobian(
            t,
            DVectorSlice::from(&x_curr),
            dxdot_dx,
            self.time_disc.dx_dx(),
            &mut self.jac,
        )?;
        self.time_disc.adjust_jacobian(&mut self.jac);

        self.check_jacobian_dimensions()
    }

    fn residual(&self, x_new: DVectorSlice<T>) -> DVector<T> {
        self.translator
            .residual(&self.time_disc, &self.m, &self.k, &self.b, x_new)
    }

    fn jacobian(&self) -> DMatrix<T> {
        self.translator.jacobian(self.jac.clone())
    }

    fn is_linear(&self) -> bool {
        self.time_disc.is_linear() || self.ode.is_linear()
    }
}

impl<T, Ode, Td> ParabolicEquation<T> for NewtonOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: DifferentiableOdeSystem<T>,
    Td: TimeDiscretization<T>,
{
    fn matrices(&self) -> (&DMatrix<T>, &DMatrix<T>, &DVector<T>) {
        (&self.m, &self.k, &self.b)
    }
}
