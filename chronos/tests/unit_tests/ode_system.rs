use nalgebra::{DMatrix, DVector, DVectorSlice};
use std::cell::Cell;
use std::rc::Rc;

use chronos::{
    BackwardEuler, ForwardEuler, NewtonOdeSystem, NonlinearSystemNewton, NonlinearSystemPicard,
    ParabolicEquation, PicardOdeSystem, TimeDiscretization,
};

use crate::assert_approx_matrix_eq;
use crate::unit_tests::mocks::{BufferResizingOde, LinearOde, QuadraticOde, ShapeShiftingOde};

fn linear_ode() -> LinearOde {
    LinearOde {
        m: DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]),
        k: DMatrix::from_row_slice(2, 2, &[2.0, -1.0, -1.0, 2.0]),
        b: DVector::from_column_slice(&[1.0, -2.0]),
    }
}

fn backward_euler(x_old: &DVector<f64>, dt: f64) -> BackwardEuler<f64> {
    let mut scheme = BackwardEuler::new(x_old.len());
    scheme.set_initial_state(0.0, DVectorSlice::from(x_old));
    scheme.next_timestep(dt);
    scheme
}

#[test]
fn newton_adapter_assembles_and_translates() {
    let ode = linear_ode();
    let (m, k, b) = (ode.m.clone(), ode.k.clone(), ode.b.clone());
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);
    let dt = 0.5;

    let mut system = NewtonOdeSystem::new(ode, backward_euler(&x_old, dt));
    let x_new = DVector::from_column_slice(&[1.5, 2.5]);

    system.assemble_residual(DVectorSlice::from(&x_new)).unwrap();
    system.assemble_jacobian(DVectorSlice::from(&x_new)).unwrap();

    let alpha = 1.0 / dt;
    let expected_residual = &m * ((&x_new - &x_old) * alpha) + &k * &x_new - &b;
    assert_approx_matrix_eq!(
        system.residual(DVectorSlice::from(&x_new)),
        expected_residual,
        abstol = 1e-14
    );

    // For a linear system the Jacobian is alpha M + K.
    assert_approx_matrix_eq!(system.jacobian(), &m * alpha + &k, abstol = 1e-14);

    // The secondary equation-matrix capability sees the raw snapshot.
    let (m_stored, k_stored, b_stored) = system.matrices();
    assert_approx_matrix_eq!(m_stored, &m, abstol = 0.0);
    assert_approx_matrix_eq!(k_stored, &k, abstol = 0.0);
    assert_approx_matrix_eq!(b_stored, &b, abstol = 0.0);
}

/// A scheme that eliminates the first row of the Jacobian, in the manner of a
/// Dirichlet boundary condition.
struct FirstRowEliminatingScheme {
    inner: BackwardEuler<f64>,
}

impl TimeDiscretization<f64> for FirstRowEliminatingScheme {
    fn current_time(&self) -> f64 {
        self.inner.current_time()
    }

    fn current_x_weight(&self) -> f64 {
        self.inner.current_x_weight()
    }

    fn weighted_old_x(&self) -> DVector<f64> {
        self.inner.weighted_old_x()
    }

    fn current_x(&self, x_new: DVectorSlice<f64>) -> DVector<f64> {
        self.inner.current_x(x_new)
    }

    fn dx_dx(&self) -> f64 {
        self.inner.dx_dx()
    }

    fn adjust_jacobian(&self, jac: &mut DMatrix<f64>) {
        jac.row_mut(0).fill(0.0);
        jac[(0, 0)] = 1.0;
    }

    fn set_initial_state(&mut self, t0: f64, x0: DVectorSlice<f64>) {
        self.inner.set_initial_state(t0, x0);
    }

    fn push_state(&mut self, x: DVectorSlice<f64>) {
        self.inner.push_state(x);
    }

    fn next_timestep(&mut self, dt: f64) {
        self.inner.next_timestep(dt);
    }
}

#[test]
fn newton_adapter_applies_scheme_jacobian_adjustment() {
    let ode = linear_ode();
    let (m, k) = (ode.m.clone(), ode.k.clone());
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);
    let dt = 0.5;

    let scheme = FirstRowEliminatingScheme {
        inner: backward_euler(&x_old, dt),
    };
    let mut system = NewtonOdeSystem::new(ode, scheme);

    let x_new = DVector::from_column_slice(&[1.5, 2.5]);
    system.assemble_jacobian(DVectorSlice::from(&x_new)).unwrap();

    let mut expected = &m * (1.0 / dt) + &k;
    expected.row_mut(0).fill(0.0);
    expected[(0, 0)] = 1.0;
    assert_approx_matrix_eq!(system.jacobian(), expected, abstol = 1e-14);
}

#[test]
fn linearity_is_an_or_of_scheme_and_physics() {
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);

    // Nonlinear physics, implicit scheme: nonlinear.
    let system = NewtonOdeSystem::new(
        QuadraticOde { b: DVector::zeros(2) },
        backward_euler(&x_old, 0.5),
    );
    assert!(!NonlinearSystemNewton::is_linear(&system));

    // Nonlinear physics, explicit scheme: the scheme wins.
    let mut explicit = ForwardEuler::new(2);
    explicit.set_initial_state(0.0, DVectorSlice::from(&x_old));
    explicit.next_timestep(0.5);
    let system = NewtonOdeSystem::new(QuadraticOde { b: DVector::zeros(2) }, explicit);
    assert!(NonlinearSystemNewton::is_linear(&system));

    // Linear physics, implicit scheme: the physics wins.
    let system = PicardOdeSystem::new(linear_ode(), backward_euler(&x_old, 0.5));
    assert!(NonlinearSystemPicard::is_linear(&system));
}

#[test]
fn reassembly_replaces_the_previous_snapshot() {
    let x_old = DVector::from_column_slice(&[1.0, 1.0]);
    let dt = 1.0;
    let mut system = NewtonOdeSystem::new(
        QuadraticOde { b: DVector::zeros(2) },
        backward_euler(&x_old, dt),
    );

    let x_first = DVector::from_column_slice(&[2.0, 3.0]);
    let x_second = DVector::from_column_slice(&[-1.0, 4.0]);

    system.assemble_residual(DVectorSlice::from(&x_first)).unwrap();
    let r_first = system.residual(DVectorSlice::from(&x_first));

    system.assemble_residual(DVectorSlice::from(&x_second)).unwrap();
    let r_second = system.residual(DVectorSlice::from(&x_second));

    // r = (x_new - x_old) / dt + x_new ∘ x_new for this mock.
    let expected_first = (&x_first - &x_old) / dt + x_first.component_mul(&x_first);
    let expected_second = (&x_second - &x_old) / dt + x_second.component_mul(&x_second);
    assert_approx_matrix_eq!(r_first, expected_first, abstol = 1e-14);
    assert_approx_matrix_eq!(r_second, expected_second, abstol = 1e-14);
}

#[test]
fn dof_mismatch_is_rejected_before_assembly() {
    let ndof = Rc::new(Cell::new(2));
    let ode = ShapeShiftingOde { ndof: ndof.clone() };
    let mut system = NewtonOdeSystem::new(ode, backward_euler(&DVector::zeros(2), 1.0));

    let x_new = DVector::zeros(2);
    assert!(system.assemble_residual(DVectorSlice::from(&x_new)).is_ok());
    assert!(system.assemble_jacobian(DVectorSlice::from(&x_new)).is_ok());

    // The source changes its reported size after construction.
    ndof.set(3);
    assert!(system.assemble_residual(DVectorSlice::from(&x_new)).is_err());
    assert!(system.assemble_jacobian(DVectorSlice::from(&x_new)).is_err());
}

#[test]
fn resized_operator_buffers_are_rejected() {
    let mut system = PicardOdeSystem::new(
        BufferResizingOde { ndof: 2 },
        backward_euler(&DVector::zeros(2), 1.0),
    );

    let x_new = DVector::zeros(2);
    assert!(system.assemble(DVectorSlice::from(&x_new)).is_err());
}

/// Documents the stale-read contract: getters before any assembly read the
/// zero-initialized buffers, not the true residual. The adapter keeps no
/// staleness flag; assembling first is the caller's responsibility.
#[test]
fn getter_before_assembly_reads_the_empty_snapshot() {
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);
    let system = NewtonOdeSystem::new(linear_ode(), backward_euler(&x_old, 0.5));

    let x_new = DVector::from_column_slice(&[1.5, 2.5]);
    let r = system.residual(DVectorSlice::from(&x_new));
    assert_approx_matrix_eq!(r, DVector::zeros(2), abstol = 0.0);
}

#[test]
fn picard_adapter_produces_the_implicit_linear_system() {
    let ode = linear_ode();
    let (m, k, b) = (ode.m.clone(), ode.k.clone(), ode.b.clone());
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);
    let dt = 0.5;

    let mut system = PicardOdeSystem::new(ode, backward_euler(&x_old, dt));
    let x_new = DVector::from_column_slice(&[1.5, 2.5]);
    system.assemble(DVectorSlice::from(&x_new)).unwrap();

    let alpha = 1.0 / dt;
    assert_approx_matrix_eq!(system.system_matrix(), &m * alpha + &k, abstol = 1e-14);
    assert_approx_matrix_eq!(
        system.rhs().unwrap(),
        &b + &m * (&x_old * alpha),
        abstol = 1e-14
    );
}

#[test]
fn picard_adapter_produces_the_explicit_linear_system() {
    let ode = linear_ode();
    let (m, k, b) = (ode.m.clone(), ode.k.clone(), ode.b.clone());
    let x_old = DVector::from_column_slice(&[1.0, 2.0]);
    let dt = 0.5;

    let mut scheme = ForwardEuler::new(2);
    scheme.set_initial_state(0.0, DVectorSlice::from(&x_old));
    scheme.next_timestep(dt);

    let mut system = PicardOdeSystem::new(ode, scheme);
    let x_new = DVector::from_column_slice(&[1.5, 2.5]);
    system.assemble(DVectorSlice::from(&x_new)).unwrap();

    let alpha = 1.0 / dt;
    assert_approx_matrix_eq!(system.system_matrix(), &m * alpha, abstol = 1e-14);
    assert_approx_matrix_eq!(
        system.rhs().unwrap(),
        &b + &m * (&x_old * alpha) - &k * &x_old,
        abstol = 1e-14
    );
}
