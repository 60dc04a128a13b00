use serde::{Deserialize, Serialize};

/// How distances were measured, which also decides how a solution is drawn:
/// road problems go on a map, planar problems on an abstract view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DistanceType {
    Road,
    Planar,
}
