use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

use crate::{
    parsers::parser::ProblemImporter,
    problem::routing_solution::RoutingSolution,
    session::{error::SessionError, session_config::SessionConfig, session_event::SessionEvent},
    solver::{
        engine::{EngineError, RoutingEngine},
        progress::{ProgressReporter, TickerHandle},
        solver_task::{SolveHandle, SolverStatus, SolverTaskController},
    },
};

/// What the run/stop control currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunAction {
    Run,
    Stop,
}

/// What changed after applying an event, for the caller to redraw.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Progress { elapsed: u64, total: u64 },
    ProgressFinished,
    SolutionChanged,
    RunFinished {
        status: SolverStatus,
        error: Option<EngineError>,
    },
}

/// One interactive run over a problem: owns the solution shown to the user,
/// the solver task and the progress ticker. Background work reports through
/// events that only `apply` turns into state changes.
pub struct Session<E> {
    config: SessionConfig,
    solution: RoutingSolution,
    controller: SolverTaskController<E>,
    reporter: ProgressReporter,
    active_solve: Option<SolveHandle>,
    active_ticker: Option<TickerHandle>,
    elapsed: u64,
    run_action: RunAction,
    events: UnboundedReceiver<SessionEvent>,
}

impl<E: RoutingEngine> Session<E> {
    /// Imports the problem first; nothing is started when that fails.
    pub fn open<I: ProblemImporter>(
        bytes: &[u8],
        importer: &I,
        engine: E,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let solution = importer.parse(bytes)?;
        Ok(Self::new(solution, engine, config))
    }

    pub fn new(solution: RoutingSolution, engine: E, config: SessionConfig) -> Self {
        let (sender, events) = mpsc::unbounded_channel();

        info!(
            name = solution.name(),
            vehicles = solution.vehicles().len(),
            customers = solution.customers().len(),
            "session opened"
        );

        Self {
            config,
            solution,
            controller: SolverTaskController::new(engine, sender.clone()),
            reporter: ProgressReporter::new(sender),
            active_solve: None,
            active_ticker: None,
            elapsed: 0,
            run_action: RunAction::Run,
            events,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn solution(&self) -> &RoutingSolution {
        &self.solution
    }

    pub fn run_action(&self) -> RunAction {
        self.run_action
    }

    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }

    pub fn active_solve(&self) -> Option<SolveHandle> {
        self.active_solve
    }

    pub fn active_ticker(&self) -> Option<TickerHandle> {
        self.active_ticker
    }

    pub fn is_running(&self) -> bool {
        self.active_solve
            .is_some_and(|handle| self.controller.is_running(handle))
    }

    /// Runs when idle, stops when running. Returns the action offered next.
    pub fn toggle(&mut self) -> Result<RunAction, SessionError> {
        match self.run_action {
            RunAction::Run => {
                self.start()?;
            }
            RunAction::Stop => self.stop(),
        }
        Ok(self.run_action)
    }

    /// Solves a copy of the current solution with the configured budget and
    /// starts the progress ticker next to it.
    pub fn start(&mut self) -> Result<SolveHandle, SessionError> {
        let handle = self.controller.start(
            &self.solution,
            self.config.time_limit,
            self.config.algorithm,
        )?;

        if let Some(ticker) = self.active_ticker.take() {
            self.reporter.cancel(ticker);
        }
        self.active_ticker = Some(self.reporter.start(self.config.time_limit_secs()));
        self.active_solve = Some(handle);
        self.elapsed = 0;
        self.run_action = RunAction::Stop;

        Ok(handle)
    }

    /// Cancels both activities. The solver still delivers its best solution
    /// through a `SolveFinished` event.
    pub fn stop(&mut self) {
        if let Some(handle) = self.active_solve {
            self.controller.cancel(handle);
        }
        if let Some(ticker) = self.active_ticker.take() {
            self.reporter.cancel(ticker);
        }
        self.run_action = RunAction::Run;
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }

    /// Applies one background event. Events of activities that are no longer
    /// current are dropped.
    pub fn apply(&mut self, event: SessionEvent) -> Option<SessionUpdate> {
        if !self.reporter.accept(&event) {
            return None;
        }

        match event {
            SessionEvent::Tick { handle, elapsed } if self.active_ticker == Some(handle) => {
                self.elapsed = elapsed;
                Some(SessionUpdate::Progress {
                    elapsed,
                    total: self.config.time_limit_secs(),
                })
            }
            SessionEvent::TickerFinished { handle } if self.active_ticker == Some(handle) => {
                self.active_ticker = None;
                Some(SessionUpdate::ProgressFinished)
            }
            SessionEvent::BestSolution { handle, solution } if self.active_solve == Some(handle) => {
                self.solution = solution;
                Some(SessionUpdate::SolutionChanged)
            }
            SessionEvent::SolveFinished { handle, outcome } if self.active_solve == Some(handle) => {
                let status = outcome.status();
                let error = outcome.error().cloned();

                self.solution = outcome.into_solution();
                self.active_solve = None;
                if let Some(ticker) = self.active_ticker.take() {
                    self.reporter.cancel(ticker);
                }
                self.run_action = RunAction::Run;

                info!(%handle, %status, "run finished");
                Some(SessionUpdate::RunFinished { status, error })
            }
            event => {
                debug!(?event, "dropping stale event");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use jiff::SignedDuration;
    use tokio::time::timeout;

    use super::*;
    use crate::{
        parsers::vrp_file::VrpFileImporter,
        solver::{
            construction_engine::ConstructionEngine,
            engine::{Algorithm, SolveContext},
        },
        test_utils::planar_solution,
    };

    struct WaitingEngine;

    impl RoutingEngine for WaitingEngine {
        fn solve(
            &self,
            _: &mut RoutingSolution,
            context: &SolveContext,
        ) -> Result<(), EngineError> {
            while !context.should_terminate() {
                std::thread::sleep(Duration::from_millis(1));
            }
            Ok(())
        }
    }

    fn config(time_limit: SignedDuration) -> SessionConfig {
        SessionConfig {
            time_limit,
            algorithm: Algorithm::NearestNeighbour,
            ..SessionConfig::default()
        }
    }

    fn problem() -> RoutingSolution {
        planar_solution(
            (0.0, 0.0),
            &[(1.0, 0.0, 2), (2.0, 0.0, 2), (0.0, 2.0, 2)],
            &[4, 4],
        )
    }

    async fn run_until_finished<E: RoutingEngine>(
        session: &mut Session<E>,
    ) -> Vec<SessionUpdate> {
        let mut updates = Vec::new();
        loop {
            let event = timeout(Duration::from_secs(10), session.next_event())
                .await
                .expect("session did not finish in time")
                .expect("channel closed");
            if let Some(update) = session.apply(event) {
                let finished = matches!(update, SessionUpdate::RunFinished { .. });
                updates.push(update);
                if finished {
                    return updates;
                }
            }
        }
    }

    #[test]
    fn test_open_fails_fast_on_invalid_input() {
        let result = Session::open(
            b"NAME : broken\nDIMENSION : two\n",
            &VrpFileImporter,
            ConstructionEngine,
            SessionConfig::default(),
        );

        assert!(matches!(result, Err(SessionError::Import(_))));
    }

    #[tokio::test]
    async fn test_run_adopts_final_solution() {
        let mut session = Session::new(problem(), ConstructionEngine, config(SignedDuration::from_secs(5)));
        assert_eq!(session.run_action(), RunAction::Run);

        assert_eq!(session.toggle().unwrap(), RunAction::Stop);
        assert!(session.active_ticker().is_some());

        let updates = run_until_finished(&mut session).await;

        assert!(updates.contains(&SessionUpdate::SolutionChanged));
        assert_eq!(
            updates.last(),
            Some(&SessionUpdate::RunFinished {
                status: SolverStatus::Completed,
                error: None,
            })
        );
        assert_eq!(session.solution().unassigned_customers().count(), 0);
        assert_eq!(session.run_action(), RunAction::Run);
        assert_eq!(session.active_solve(), None);
        assert_eq!(session.active_ticker(), None);
    }

    #[tokio::test]
    async fn test_toggle_stops_running_solve() {
        let mut session = Session::new(problem(), WaitingEngine, config(SignedDuration::from_secs(60)));

        session.toggle().unwrap();
        assert!(session.is_running());

        assert_eq!(session.toggle().unwrap(), RunAction::Run);
        assert_eq!(session.active_ticker(), None);

        let updates = run_until_finished(&mut session).await;

        assert_eq!(
            updates,
            vec![SessionUpdate::RunFinished {
                status: SolverStatus::Cancelled,
                error: None,
            }]
        );
        assert!(!session.is_running());
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let mut session = Session::new(problem(), WaitingEngine, config(SignedDuration::from_secs(60)));

        let first = session.start().unwrap();
        let second = session.start();

        assert!(matches!(second, Err(SessionError::AlreadyRunning(handle)) if handle == first));

        session.stop();
        run_until_finished(&mut session).await;

        let third = session.start().unwrap();
        assert_ne!(third, first);
        session.stop();
        run_until_finished(&mut session).await;
    }

    #[tokio::test]
    async fn test_stale_ticks_are_dropped() {
        let mut session = Session::new(problem(), WaitingEngine, config(SignedDuration::from_secs(60)));

        session.start().unwrap();
        let old_ticker = session.active_ticker().unwrap();
        session.stop();

        let update = session.apply(SessionEvent::Tick {
            handle: old_ticker,
            elapsed: 1,
        });

        assert_eq!(update, None);
        assert_eq!(session.elapsed(), 0);
        run_until_finished(&mut session).await;
    }
}
