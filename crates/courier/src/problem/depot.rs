use crate::typed_index;

use super::location::LocationIdx;

typed_index!(DepotIdx, Depot, "depot");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Depot {
    id: i64,
    location: LocationIdx,
}

impl Depot {
    pub fn new(id: i64, location: LocationIdx) -> Self {
        Self { id, location }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn location(&self) -> LocationIdx {
        self.location
    }
}
