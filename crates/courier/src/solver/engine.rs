use std::{
    str::FromStr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};

use jiff::SignedDuration;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::problem::{route_chain::RouteError, routing_solution::RoutingSolution};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    FirstFit,
    #[default]
    NearestNeighbour,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown algorithm `{0}`, expected `first-fit` or `nearest-neighbour`")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-fit" => Ok(Algorithm::FirstFit),
            "nearest-neighbour" | "nearest-neighbor" => Ok(Algorithm::NearestNeighbour),
            _ => Err(UnknownAlgorithm(s.to_string())),
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Algorithm::FirstFit => write!(f, "first-fit"),
            Algorithm::NearestNeighbour => write!(f, "nearest-neighbour"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("algorithm {0} is not supported by this engine")]
    UnsupportedAlgorithm(Algorithm),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("solver panicked: {0}")]
    Panicked(String),

    #[error("{0}")]
    Other(String),
}

type BestSolutionListener = Arc<dyn Fn(&RoutingSolution) + Send + Sync + 'static>;

/// Everything a running engine may look at besides the solution itself:
/// the time budget, the selected algorithm and the stop flag.
pub struct SolveContext {
    time_limit: SignedDuration,
    algorithm: Algorithm,
    started: Instant,
    stop: Arc<AtomicBool>,
    best: Mutex<Option<RoutingSolution>>,
    on_best_solution: Option<BestSolutionListener>,
}

impl SolveContext {
    pub fn new(time_limit: SignedDuration, algorithm: Algorithm, stop: Arc<AtomicBool>) -> Self {
        Self {
            time_limit,
            algorithm,
            started: Instant::now(),
            stop,
            best: Mutex::new(None),
            on_best_solution: None,
        }
    }

    pub fn on_best_solution<F>(&mut self, callback: F)
    where
        F: Fn(&RoutingSolution) + Send + Sync + 'static,
    {
        self.on_best_solution = Some(Arc::new(callback));
    }

    pub fn time_limit(&self) -> SignedDuration {
        self.time_limit
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn elapsed(&self) -> SignedDuration {
        SignedDuration::try_from(self.started.elapsed()).unwrap_or(SignedDuration::MAX)
    }

    /// Stop was requested from outside.
    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    pub fn deadline_reached(&self) -> bool {
        self.elapsed() >= self.time_limit
    }

    /// Engines call this at every checkpoint and return their best solution
    /// as soon as it is true.
    pub fn should_terminate(&self) -> bool {
        self.is_cancelled() || self.deadline_reached()
    }

    /// Records an improving solution and forwards it to the listener.
    pub fn publish_best(&self, solution: &RoutingSolution) {
        *self.best.lock() = Some(solution.clone());

        if let Some(listener) = &self.on_best_solution {
            listener(solution);
        }
    }

    pub fn take_best(&self) -> Option<RoutingSolution> {
        self.best.lock().take()
    }
}

/// A black-box optimizer. It improves `solution` in place and must return
/// soon after `SolveContext::should_terminate` turns true, leaving the best
/// solution it found in `solution`.
pub trait RoutingEngine: Send + Sync + 'static {
    fn solve(&self, solution: &mut RoutingSolution, context: &SolveContext) -> Result<(), EngineError>;
}
