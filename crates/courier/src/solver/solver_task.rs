use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::SignedDuration;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

use crate::{
    problem::routing_solution::RoutingSolution,
    session::{error::SessionError, session_event::SessionEvent},
    solver::{
        engine::{Algorithm, EngineError, RoutingEngine, SolveContext},
        solve_outcome::SolveOutcome,
    },
};

/// Identifies one call to `SolverTaskController::start`. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SolveHandle(u64);

impl std::fmt::Display for SolveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "solve#{}", self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum SolverStatus {
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl SolverStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SolverStatus::Running)
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SolverStatus::Running => write!(f, "running"),
            SolverStatus::Completed => write!(f, "completed"),
            SolverStatus::Cancelled => write!(f, "cancelled"),
            SolverStatus::Failed => write!(f, "failed"),
        }
    }
}

struct SolverTask {
    handle: SolveHandle,
    stop: Arc<AtomicBool>,
    status: Arc<RwLock<SolverStatus>>,
}

impl SolverTask {
    fn status(&self) -> SolverStatus {
        *self.status.read()
    }
}

/// Runs one engine invocation at a time on the blocking pool. Results come
/// back as `SessionEvent::SolveFinished`, exactly once per handle.
pub struct SolverTaskController<E> {
    engine: Arc<E>,
    events: UnboundedSender<SessionEvent>,
    active: Option<SolverTask>,
    next_id: u64,
}

impl<E: RoutingEngine> SolverTaskController<E> {
    pub fn new(engine: E, events: UnboundedSender<SessionEvent>) -> Self {
        Self {
            engine: Arc::new(engine),
            events,
            active: None,
            next_id: 0,
        }
    }

    /// Starts solving a copy of `problem`. Must be called from within a
    /// tokio runtime.
    pub fn start(
        &mut self,
        problem: &RoutingSolution,
        time_limit: SignedDuration,
        algorithm: Algorithm,
    ) -> Result<SolveHandle, SessionError> {
        if let Some(active) = self.running_task() {
            return Err(SessionError::AlreadyRunning(active.handle));
        }

        self.next_id += 1;
        let handle = SolveHandle(self.next_id);
        let stop = Arc::new(AtomicBool::new(false));
        let status = Arc::new(RwLock::new(SolverStatus::Running));

        let mut context = SolveContext::new(time_limit, algorithm, Arc::clone(&stop));
        let best_events = self.events.clone();
        context.on_best_solution(move |solution| {
            let _ = best_events.send(SessionEvent::BestSolution {
                handle,
                solution: solution.clone(),
            });
        });

        info!(%handle, %algorithm, %time_limit, name = problem.name(), "starting solver");

        let engine = Arc::clone(&self.engine);
        let events = self.events.clone();
        let task_status = Arc::clone(&status);
        let start_problem = problem.clone();

        tokio::spawn(async move {
            let mut solution = start_problem.clone();
            let result = tokio::task::spawn_blocking(move || {
                let result = engine.solve(&mut solution, &context);
                (solution, result, context)
            })
            .await;

            let outcome = match result {
                Ok((solution, Ok(()), context)) if context.is_cancelled() => {
                    SolveOutcome::Cancelled(solution)
                }
                Ok((solution, Ok(()), _)) => SolveOutcome::Completed(solution),
                Ok((_, Err(error), context)) => SolveOutcome::Failed {
                    error,
                    best: context.take_best().unwrap_or(start_problem),
                },
                Err(join_error) => SolveOutcome::Failed {
                    error: EngineError::Panicked(join_error.to_string()),
                    best: start_problem,
                },
            };

            match outcome.error() {
                Some(error) => warn!(%handle, %error, "solver failed"),
                None => info!(%handle, status = %outcome.status(), "solver finished"),
            }

            *task_status.write() = outcome.status();
            let _ = events.send(SessionEvent::SolveFinished { handle, outcome });
        });

        self.active = Some(SolverTask {
            handle,
            stop,
            status,
        });

        Ok(handle)
    }

    pub fn is_running(&self, handle: SolveHandle) -> bool {
        self.status(handle) == Some(SolverStatus::Running)
    }

    /// Status of the latest handle. Older handles are forgotten.
    pub fn status(&self, handle: SolveHandle) -> Option<SolverStatus> {
        self.active
            .as_ref()
            .filter(|task| task.handle == handle)
            .map(SolverTask::status)
    }

    pub fn active_handle(&self) -> Option<SolveHandle> {
        self.running_task().map(|task| task.handle)
    }

    /// Asks the engine to stop at its next checkpoint. Returns immediately.
    pub fn cancel(&self, handle: SolveHandle) {
        if let Some(task) = self.running_task().filter(|task| task.handle == handle) {
            info!(%handle, "stopping solver");
            task.stop.store(true, Ordering::Relaxed);
        }
    }

    fn running_task(&self) -> Option<&SolverTask> {
        self.active
            .as_ref()
            .filter(|task| task.status() == SolverStatus::Running)
    }
}
