/// Effective load-carrying capability bisection solver.
pub mod elcc;
/// Adequacy metric reductions over a net capacity matrix.
pub mod metrics;
/// The Monte Carlo simulator producing the net capacity matrix.
pub mod simulation;
