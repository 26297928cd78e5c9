//! Consistent-labelling solvers.
//!
//! The update formula is a strategy ([`UpdateRule`]) behind a stable
//! `solve(problem) -> SolveReport` interface.

mod relax;
mod rule;

pub use relax::{RelaxationSolver, SolveReport};
pub use rule::UpdateRule;
