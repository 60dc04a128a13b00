use crate::typed_index;

use super::depot::DepotIdx;

typed_index!(VehicleIdx, Vehicle, "vehicle");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vehicle {
    id: i64,
    capacity: u32,
    depot: DepotIdx,
}

impl Vehicle {
    pub fn new(id: i64, capacity: u32, depot: DepotIdx) -> Self {
        Self {
            id,
            capacity,
            depot,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Home base, the route starts and ends at its location.
    pub fn depot(&self) -> DepotIdx {
        self.depot
    }
}
