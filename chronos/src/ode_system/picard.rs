use coarse_prof::profile;
use nalgebra::{DMatrix, DVector, DVectorSlice, RealField};
use std::error::Error;

use crate::ode::FirstOrderOdeSystem;
use crate::ode_system::{check_operator_dimensions, NonlinearSystemPicard, ParabolicEquation};
use crate::time_discretization::TimeDiscretization;
use crate::translator::{EquationKind, MatrixTranslator};

/// Adapter binding an ODE source and a time discretization into the per-step
/// linear system a fixed-point driver repeatedly solves.
///
/// Owns the per-step operators `M`, `K` and `b`; no Jacobian is ever
/// assembled. The linear system is produced by the same translator the Newton
/// adapter uses for its residual, so the two strategies can never drift apart
/// in their formulas.
pub struct PicardOdeSystem<T: RealField, Ode, Td> {
    ode: Ode,
    time_disc: Td,
    translator: MatrixTranslator,
    m: DMatrix<T>,
    k: DMatrix<T>,
    b: DVector<T>,
}

impl<T, Ode, Td> PicardOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: FirstOrderOdeSystem<T>,
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
}

impl<T, Ode, Td> NonlinearSystemPicard<T> for PicardOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: FirstOrderOdeSystem<T>,
    Td: TimeDiscretization<T>,
{
    fn assemble(&mut self, x_new: DVectorSlice<T>) -> Result<(), Box<dyn Error>> {
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

        check_operator_dimensions(self.ode.ndof(), &self.m, &self.k, &self.b)
    }

    fn system_matrix(&self) -> DMatrix<T> {
        self.translator.system_matrix(&self.time_disc, &self.m, &self.k)
    }

    fn rhs(&self) -> Result<DVector<T>, Box<dyn Error>> {
        self.translator.rhs(&self.time_disc, &self.m, &self.k, &self.b)
    }

    fn is_linear(&self) -> bool {
        self.time_disc.is_linear() || self.ode.is_linear()
    }
}

impl<T, Ode, Td> ParabolicEquation<T> for PicardOdeSystem<T, Ode, Td>
where
    T: RealField,
    Ode: FirstOrderOdeSystem<T>,
    Td: TimeDiscretization<T>,
{
    fn matrices(&self) -> (&DMatrix<T>, &DMatrix<T>, &DVector<T>) {
        (&self.m, &self.k, &self.b)
    }
}
