use crate::{
    problem::routing_solution::RoutingSolution,
    solver::{engine::EngineError, solver_task::SolverStatus},
};

/// How a solve ended. Every variant carries the best solution there is, the
/// unmodified start problem when the engine failed before publishing any.
#[derive(Debug, Clone)]
pub enum SolveOutcome {
    Completed(RoutingSolution),
    Cancelled(RoutingSolution),
    Failed {
        error: EngineError,
        best: RoutingSolution,
    },
}

impl SolveOutcome {
    pub fn solution(&self) -> &RoutingSolution {
        match self {
            SolveOutcome::Completed(solution) | SolveOutcome::Cancelled(solution) => solution,
            SolveOutcome::Failed { best, .. } => best,
        }
    }

    pub fn into_solution(self) -> RoutingSolution {
        match self {
            SolveOutcome::Completed(solution) | SolveOutcome::Cancelled(solution) => solution,
            SolveOutcome::Failed { best, .. } => best,
        }
    }

    pub fn status(&self) -> SolverStatus {
        match self {
            SolveOutcome::Completed(_) => SolverStatus::Completed,
            SolveOutcome::Cancelled(_) => SolverStatus::Cancelled,
            SolveOutcome::Failed { .. } => SolverStatus::Failed,
        }
    }

    pub fn error(&self) -> Option<&EngineError> {
        match self {
            SolveOutcome::Failed { error, .. } => Some(error),
            _ => None,
        }
    }
}
