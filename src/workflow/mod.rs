pub mod solve_ctx;
pub mod solve_flow;

pub use solve_ctx::SolveCtx;
pub use solve_flow::{SolveBackend, SolveFlow};
