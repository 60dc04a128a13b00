use std::path::Path;

use thiserror::Error;

use crate::problem::routing_solution::RoutingSolution;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("failed to read problem file: {0}")]
    Io(#[from] std::io::Error),

    #[error("problem file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    #[error("missing {0}")]
    Missing(&'static str),

    #[error("invalid {field}: {value}")]
    Invalid { field: &'static str, value: String },

    #[error("unsupported edge weight type: {0}")]
    UnsupportedEdgeWeightType(String),

    #[error("{section} has {found} entries, expected {expected}")]
    DimensionMismatch {
        section: &'static str,
        found: usize,
        expected: usize,
    },
}

pub trait ProblemImporter {
    fn parse(&self, bytes: &[u8]) -> Result<RoutingSolution, ImportError>;

    fn read<P: AsRef<Path>>(&self, file: P) -> Result<RoutingSolution, ImportError> {
        let bytes = std::fs::read(file)?;
        self.parse(&bytes)
    }
}
