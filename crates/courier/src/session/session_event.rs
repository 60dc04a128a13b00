use crate::{
    problem::routing_solution::RoutingSolution,
    solver::{progress::TickerHandle, solve_outcome::SolveOutcome, solver_task::SolveHandle},
};

/// Messages sent by the background activities to the owning `Session`.
#[derive(Debug)]
pub enum SessionEvent {
    Tick {
        handle: TickerHandle,
        elapsed: u64,
    },
    TickerFinished {
        handle: TickerHandle,
    },
    BestSolution {
        handle: SolveHandle,
        solution: RoutingSolution,
    },
    SolveFinished {
        handle: SolveHandle,
        outcome: SolveOutcome,
    },
}
