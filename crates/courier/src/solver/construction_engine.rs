use tracing::{debug, info};

use crate::{
    problem::{
        customer::CustomerIdx, route_chain::RouteChain, routing_solution::RoutingSolution,
        standstill::Standstill, vehicle::VehicleIdx,
    },
    solver::engine::{Algorithm, EngineError, RoutingEngine, SolveContext},
};

/// Builds routes for every unassigned customer without an improvement phase.
/// Customers already on a route are left where they are.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstructionEngine;

impl RoutingEngine for ConstructionEngine {
    fn solve(&self, solution: &mut RoutingSolution, context: &SolveContext) -> Result<(), EngineError> {
        info!(
            name = solution.name(),
            algorithm = %context.algorithm(),
            unassigned = solution.unassigned_customers().count(),
            "construction started"
        );

        match context.algorithm() {
            Algorithm::FirstFit => first_fit(solution, context)?,
            Algorithm::NearestNeighbour => nearest_neighbour(solution, context)?,
        }

        info!(
            unassigned = solution.unassigned_customers().count(),
            cancelled = context.is_cancelled(),
            "construction finished"
        );
        Ok(())
    }
}

struct Tail {
    standstill: Standstill,
    remaining_capacity: u64,
}

fn tail(solution: &RoutingSolution, vehicle: VehicleIdx) -> Result<Tail, EngineError> {
    let chain = RouteChain::build(solution, vehicle)?;
    let standstill = chain
        .last()
        .map_or(Standstill::Depot(solution.vehicle(vehicle).depot()), Standstill::Customer);

    Ok(Tail {
        standstill,
        remaining_capacity: u64::from(solution.vehicle(vehicle).capacity())
            .saturating_sub(solution.total_demand(vehicle)),
    })
}

/// Every customer, in list order, goes to the end of the first vehicle that
/// still has room for it.
fn first_fit(solution: &mut RoutingSolution, context: &SolveContext) -> Result<(), EngineError> {
    let mut tails = solution
        .vehicle_indices()
        .map(|vehicle| tail(solution, vehicle))
        .collect::<Result<Vec<_>, _>>()?;
    let pending: Vec<CustomerIdx> = solution.unassigned_customers().collect();

    for customer in pending {
        if context.should_terminate() {
            return Ok(());
        }

        let demand = u64::from(solution.customer(customer).demand());
        let Some(vehicle) = tails
            .iter()
            .position(|tail| tail.remaining_capacity >= demand)
        else {
            debug!(%customer, demand, "no vehicle has room left");
            continue;
        };

        let tail = &mut tails[vehicle];
        solution.assign_after(customer, VehicleIdx::new(vehicle), tail.standstill)?;
        tail.standstill = Standstill::Customer(customer);
        tail.remaining_capacity -= demand;
    }

    context.publish_best(solution);
    Ok(())
}

/// Fills the vehicles one after the other, always driving to the closest
/// customer that still fits.
fn nearest_neighbour(
    solution: &mut RoutingSolution,
    context: &SolveContext,
) -> Result<(), EngineError> {
    for vehicle in solution.vehicle_indices() {
        let mut tail = tail(solution, vehicle)?;

        loop {
            if context.should_terminate() {
                return Ok(());
            }

            let from = solution.standstill_location_idx(tail.standstill);
            let closest = solution
                .unassigned_customers()
                .filter(|&customer| {
                    u64::from(solution.customer(customer).demand()) <= tail.remaining_capacity
                })
                .min_by_key(|&customer| solution.distance(from, solution.customer(customer).location()));

            let Some(customer) = closest else {
                break;
            };

            solution.assign_after(customer, vehicle, tail.standstill)?;
            tail.standstill = Standstill::Customer(customer);
            tail.remaining_capacity -= u64::from(solution.customer(customer).demand());
        }

        debug!(%vehicle, stops = solution.customers_of(vehicle).count(), "vehicle filled");
        context.publish_best(solution);

        if solution.unassigned_customers().next().is_none() {
            break;
        }
    }

    Ok(())
}
