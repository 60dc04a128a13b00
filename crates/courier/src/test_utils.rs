use crate::problem::{
    customer::CustomerIdx,
    depot::DepotIdx,
    distance_type::DistanceType,
    location::Location,
    routing_solution::{RoutingSolution, RoutingSolutionBuilder},
    standstill::Standstill,
    vehicle::VehicleIdx,
};

pub fn customer(index: usize) -> CustomerIdx {
    CustomerIdx::new(index)
}

pub fn vehicle(index: usize) -> VehicleIdx {
    VehicleIdx::new(index)
}

/// Planar problem with one depot, customers given as `(x, y, demand)` and one
/// vehicle per capacity. Nothing is assigned yet.
pub fn planar_solution(
    depot: (f64, f64),
    customers: &[(f64, f64, u32)],
    capacities: &[u32],
) -> RoutingSolution {
    let mut builder = RoutingSolutionBuilder::default();
    builder.set_name("test");
    builder.set_distance_type(DistanceType::Planar);

    let depot_location = builder.add_location(Location::from_cartesian(1, depot.0, depot.1));
    let depot = builder.add_depot(depot_location);

    for &capacity in capacities {
        builder.add_vehicle(capacity, depot);
    }

    for (index, &(x, y, demand)) in customers.iter().enumerate() {
        let location = builder.add_location(Location::from_cartesian(index as i64 + 2, x, y));
        builder.add_customer(demand, location);
    }

    builder.build()
}

/// Points a customer at an arbitrary predecessor without any of the
/// bookkeeping `assign_after` does, to build broken chains.
pub fn link(
    solution: &mut RoutingSolution,
    customer_index: usize,
    vehicle_index: usize,
    previous: Standstill,
) {
    let target = solution.customer_mut(customer(customer_index));
    target.vehicle = Some(vehicle(vehicle_index));
    target.previous_standstill = Some(previous);
}

/// Overrides the stored distance from the previous standstill.
pub fn set_distance(solution: &mut RoutingSolution, customer_index: usize, distance: u64) {
    solution
        .customer_mut(customer(customer_index))
        .distance_from_previous_standstill = distance;
}

pub fn depot_standstill() -> Standstill {
    Standstill::Depot(DepotIdx::new(0))
}
