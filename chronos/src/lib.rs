#![allow(clippy::too_many_arguments)]

/// Contracts for spatially discretized first-order ODE systems.
pub mod ode;
/// Adapters binding an ODE source and a scheme to the nonlinear-solver contracts.
pub mod ode_system;
/// Time-stepping schemes and the contract they satisfy.
pub mod time_discretization;
/// Translation of per-step operators into solver-facing systems.
pub mod translator;

pub use ode::{DifferentiableOdeSystem, FirstOrderOdeSystem};
pub use ode_system::{
    NewtonOdeSystem, NonlinearSystemNewton, NonlinearSystemPicard, ParabolicEquation, PicardOdeSystem,
};
pub use time_discretization::{BackwardEuler, ForwardEuler, TimeDiscretization};
pub use translator::{EquationKind, MatrixTranslator};
