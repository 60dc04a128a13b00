use thiserror::Error;

use crate::{
    parsers::parser::ImportError,
    session::session_config::ConfigError,
    solver::solver_task::SolveHandle,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("{0} is still running")]
    AlreadyRunning(SolveHandle),

    #[error("could not import problem: {0}")]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
