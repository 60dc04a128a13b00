pub mod construction_engine;
pub mod engine;
pub mod progress;
pub mod solve_outcome;
pub mod solver_task;
