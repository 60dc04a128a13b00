use fxhash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::{
    customer::CustomerIdx, routing_solution::RoutingSolution, standstill::Standstill,
    vehicle::VehicleIdx,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformedReason {
    /// Two customers of the route claim the same predecessor.
    Branch(Standstill),
    /// Following predecessors from this customer never ends.
    Cycle(CustomerIdx),
    /// The predecessors of this customer never reach the vehicle's depot.
    Detached(CustomerIdx),
}

impl std::fmt::Display for MalformedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedReason::Branch(standstill) => {
                write!(f, "{standstill} precedes more than one customer")
            }
            MalformedReason::Cycle(customer) => write!(f, "{customer} is part of a cycle"),
            MalformedReason::Detached(customer) => {
                write!(f, "{customer} is not connected to the depot")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("route of {vehicle} is malformed: {reason}")]
    MalformedRoute {
        vehicle: VehicleIdx,
        reason: MalformedReason,
    },

    #[error("{standstill} is not on the route of {vehicle}")]
    ForeignStandstill {
        vehicle: VehicleIdx,
        standstill: Standstill,
    },
}

/// The stops of one vehicle in driving order, flattened from the
/// predecessor links of its customers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteChain {
    vehicle: VehicleIdx,
    depot: Standstill,
    stops: Vec<CustomerIdx>,
}

impl RouteChain {
    pub fn build(solution: &RoutingSolution, vehicle: VehicleIdx) -> Result<Self, RouteError> {
        let depot = Standstill::Depot(solution.vehicle(vehicle).depot());
        let assigned: Vec<CustomerIdx> = solution.customers_of(vehicle).collect();

        let mut successors: FxHashMap<Standstill, CustomerIdx> = FxHashMap::default();
        for &customer in &assigned {
            let Some(previous) = solution.customer(customer).previous_standstill() else {
                return Err(malformed(vehicle, MalformedReason::Detached(customer)));
            };
            if successors.insert(previous, customer).is_some() {
                return Err(malformed(vehicle, MalformedReason::Branch(previous)));
            }
        }

        let mut stops = Vec::with_capacity(assigned.len());
        let mut current = depot;
        while stops.len() < assigned.len() {
            let Some(&next) = successors.get(&current) else {
                break;
            };
            stops.push(next);
            current = Standstill::Customer(next);
        }

        if stops.len() < assigned.len() {
            let reached: FxHashSet<CustomerIdx> = stops.iter().copied().collect();
            if let Some(&unreached) = assigned.iter().find(|c| !reached.contains(c)) {
                let reason = classify_unreached(solution, vehicle, unreached, assigned.len());
                return Err(malformed(vehicle, reason));
            }
        }

        Ok(Self {
            vehicle,
            depot,
            stops,
        })
    }

    pub fn vehicle(&self) -> VehicleIdx {
        self.vehicle
    }

    pub fn stops(&self) -> &[CustomerIdx] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn last(&self) -> Option<CustomerIdx> {
        self.stops.last().copied()
    }

    /// Every stop paired with the standstill it is driven to from.
    pub fn legs(&self) -> impl Iterator<Item = (Standstill, CustomerIdx)> + '_ {
        let previous = std::iter::once(self.depot)
            .chain(self.stops.iter().copied().map(Standstill::Customer));
        previous.zip(self.stops.iter().copied())
    }
}

fn malformed(vehicle: VehicleIdx, reason: MalformedReason) -> RouteError {
    RouteError::MalformedRoute { vehicle, reason }
}

/// Walks the predecessors of a customer the depot walk could not reach. More
/// steps than there are customers on the route means the walk is looping.
fn classify_unreached(
    solution: &RoutingSolution,
    vehicle: VehicleIdx,
    customer: CustomerIdx,
    limit: usize,
) -> MalformedReason {
    let mut current = customer;
    for _ in 0..=limit {
        match solution.customer(current).previous_standstill() {
            Some(Standstill::Customer(previous))
                if solution.customer(previous).vehicle() == Some(vehicle) =>
            {
                current = previous;
            }
            _ => return MalformedReason::Detached(customer),
        }
    }

    MalformedReason::Cycle(customer)
}
