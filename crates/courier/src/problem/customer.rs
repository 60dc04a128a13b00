use crate::typed_index;

use super::{location::LocationIdx, standstill::Standstill, vehicle::VehicleIdx};

typed_index!(CustomerIdx, Customer, "customer");

/// A stop with a demand. The planning fields (`vehicle`, `previous_standstill`,
/// `next_customer`, `distance_from_previous_standstill`) are only changed
/// through the chain editing methods of `RoutingSolution`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: i64,
    demand: u32,
    location: LocationIdx,
    pub(crate) vehicle: Option<VehicleIdx>,
    pub(crate) previous_standstill: Option<Standstill>,
    pub(crate) next_customer: Option<CustomerIdx>,
    pub(crate) distance_from_previous_standstill: u64,
}

impl Customer {
    pub fn new(id: i64, demand: u32, location: LocationIdx) -> Self {
        Self {
            id,
            demand,
            location,
            vehicle: None,
            previous_standstill: None,
            next_customer: None,
            distance_from_previous_standstill: 0,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn demand(&self) -> u32 {
        self.demand
    }

    pub fn location(&self) -> LocationIdx {
        self.location
    }

    pub fn vehicle(&self) -> Option<VehicleIdx> {
        self.vehicle
    }

    pub fn previous_standstill(&self) -> Option<Standstill> {
        self.previous_standstill
    }

    pub fn next_customer(&self) -> Option<CustomerIdx> {
        self.next_customer
    }

    pub fn distance_from_previous_standstill(&self) -> u64 {
        self.distance_from_previous_standstill
    }

    pub fn is_assigned(&self) -> bool {
        self.vehicle.is_some()
    }

    pub(crate) fn detach(&mut self) {
        self.vehicle = None;
        self.previous_standstill = None;
        self.next_customer = None;
        self.distance_from_previous_standstill = 0;
    }
}
