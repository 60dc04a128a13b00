use tracing::debug;

use super::{
    customer::{Customer, CustomerIdx},
    depot::{Depot, DepotIdx},
    distance_matrix::DistanceMatrix,
    distance_type::DistanceType,
    location::{Location, LocationIdx},
    route_chain::{RouteChain, RouteError},
    standstill::Standstill,
    vehicle::{Vehicle, VehicleIdx},
};

/// Road distances are kept as integers in thousandths of the file unit.
const ROAD_DISTANCE_SCALE: f64 = 1000.0;

/// A routing problem together with its current planning state. It owns every
/// entity; customers point at vehicles and standstills through typed indices.
#[derive(Debug, Clone)]
pub struct RoutingSolution {
    name: String,
    distance_type: DistanceType,
    locations: Vec<Location>,
    road_distances: Option<DistanceMatrix>,
    depots: Vec<Depot>,
    vehicles: Vec<Vehicle>,
    customers: Vec<Customer>,
}

impl RoutingSolution {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn distance_type(&self) -> DistanceType {
        self.distance_type
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn depots(&self) -> &[Depot] {
        &self.depots
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    pub fn location(&self, index: LocationIdx) -> &Location {
        &self.locations[index]
    }

    pub fn depot(&self, index: DepotIdx) -> &Depot {
        &self.depots[index]
    }

    pub fn vehicle(&self, index: VehicleIdx) -> &Vehicle {
        &self.vehicles[index]
    }

    pub fn customer(&self, index: CustomerIdx) -> &Customer {
        &self.customers[index]
    }

    #[cfg(test)]
    pub(crate) fn customer_mut(&mut self, index: CustomerIdx) -> &mut Customer {
        &mut self.customers[index]
    }

    pub fn vehicle_indices(&self) -> impl Iterator<Item = VehicleIdx> + use<> {
        (0..self.vehicles.len()).map(VehicleIdx::new)
    }

    pub fn customer_indices(&self) -> impl Iterator<Item = CustomerIdx> + use<> {
        (0..self.customers.len()).map(CustomerIdx::new)
    }

    /// Customers assigned to `vehicle`, in customer list order.
    pub fn customers_of(&self, vehicle: VehicleIdx) -> impl Iterator<Item = CustomerIdx> + '_ {
        self.customer_indices()
            .filter(move |&customer| self.customers[customer].vehicle == Some(vehicle))
    }

    pub fn unassigned_customers(&self) -> impl Iterator<Item = CustomerIdx> + '_ {
        self.customer_indices()
            .filter(|&customer| !self.customers[customer].is_assigned())
    }

    pub fn vehicle_location(&self, vehicle: VehicleIdx) -> &Location {
        let depot = self.vehicle(vehicle).depot();
        self.location(self.depot(depot).location())
    }

    pub fn standstill_location(&self, standstill: Standstill) -> &Location {
        self.location(self.standstill_location_idx(standstill))
    }

    pub fn standstill_location_idx(&self, standstill: Standstill) -> LocationIdx {
        match standstill {
            Standstill::Depot(depot) => self.depot(depot).location(),
            Standstill::Customer(customer) => self.customer(customer).location(),
        }
    }

    /// Distance between two locations. Road problems without a matrix fall
    /// back to the straight line between their coordinates.
    pub fn distance(&self, from: LocationIdx, to: LocationIdx) -> u64 {
        match (self.distance_type, &self.road_distances) {
            (DistanceType::Road, Some(matrix)) => {
                (matrix.get(from, to) * ROAD_DISTANCE_SCALE).round() as u64
            }
            _ => self.location(from).planar_distance(self.location(to)),
        }
    }

    pub fn total_demand(&self, vehicle: VehicleIdx) -> u64 {
        self.customers_of(vehicle)
            .map(|customer| u64::from(self.customer(customer).demand()))
            .sum()
    }

    /// Length of the route of `vehicle`, including the way back home.
    pub fn total_distance(&self, vehicle: VehicleIdx) -> Result<u64, RouteError> {
        let chain = RouteChain::build(self, vehicle)?;
        let legs: u64 = chain
            .stops()
            .iter()
            .map(|&customer| self.customer(customer).distance_from_previous_standstill())
            .sum();
        let home = self.depot(self.vehicle(vehicle).depot()).location();
        let back = chain
            .last()
            .map_or(0, |last| self.distance(self.customer(last).location(), home));

        Ok(legs + back)
    }

    /// Inserts `customer` into the route of `vehicle` directly after `after`,
    /// taking it out of its current route first.
    pub fn assign_after(
        &mut self,
        customer: CustomerIdx,
        vehicle: VehicleIdx,
        after: Standstill,
    ) -> Result<(), RouteError> {
        let on_route = match after {
            Standstill::Depot(depot) => depot == self.vehicle(vehicle).depot(),
            Standstill::Customer(previous) => {
                previous != customer && self.customer(previous).vehicle == Some(vehicle)
            }
        };
        if !on_route {
            return Err(RouteError::ForeignStandstill {
                vehicle,
                standstill: after,
            });
        }

        self.unassign(customer);
        let next = self.successor(vehicle, after);

        let inserted = &mut self.customers[customer];
        inserted.vehicle = Some(vehicle);
        inserted.previous_standstill = Some(after);
        inserted.next_customer = next;

        if let Standstill::Customer(previous) = after {
            self.customers[previous].next_customer = Some(customer);
        }
        if let Some(next) = next {
            self.customers[next].previous_standstill = Some(Standstill::Customer(customer));
            self.refresh_distance(next);
        }
        self.refresh_distance(customer);

        debug!(%customer, %vehicle, %after, "assigned customer");
        Ok(())
    }

    /// Appends `customer` as the last stop of `vehicle`.
    pub fn append(&mut self, customer: CustomerIdx, vehicle: VehicleIdx) -> Result<(), RouteError> {
        let tail = RouteChain::build(self, vehicle)?
            .last()
            .map_or(Standstill::Depot(self.vehicle(vehicle).depot()), Standstill::Customer);

        self.assign_after(customer, vehicle, tail)
    }

    /// Takes `customer` out of its route and closes the gap it leaves.
    pub fn unassign(&mut self, customer: CustomerIdx) {
        if !self.customers[customer].is_assigned() {
            return;
        }

        let previous = self.customers[customer].previous_standstill;
        let next = self.customers[customer].next_customer;

        if let Some(next) = next {
            self.customers[next].previous_standstill = previous;
            self.refresh_distance(next);
        }
        if let Some(Standstill::Customer(previous)) = previous {
            self.customers[previous].next_customer = next;
        }

        self.customers[customer].detach();
    }

    pub fn clear_routes(&mut self) {
        for customer in &mut self.customers {
            customer.detach();
        }
    }

    fn successor(&self, vehicle: VehicleIdx, standstill: Standstill) -> Option<CustomerIdx> {
        match standstill {
            Standstill::Customer(customer) => self.customer(customer).next_customer,
            Standstill::Depot(_) => self.customer_indices().find(|&customer| {
                let candidate = &self.customers[customer];
                candidate.vehicle == Some(vehicle)
                    && candidate.previous_standstill == Some(standstill)
            }),
        }
    }

    fn refresh_distance(&mut self, customer: CustomerIdx) {
        let to = self.customers[customer].location();
        let distance = self.customers[customer]
            .previous_standstill
            .map_or(0, |previous| {
                self.distance(self.standstill_location_idx(previous), to)
            });

        self.customers[customer].distance_from_previous_standstill = distance;
    }
}

#[derive(Default)]
pub struct RoutingSolutionBuilder {
    name: Option<String>,
    distance_type: Option<DistanceType>,
    locations: Vec<Location>,
    road_distances: Option<DistanceMatrix>,
    depots: Vec<Depot>,
    vehicles: Vec<Vehicle>,
    customers: Vec<Customer>,
}

impl RoutingSolutionBuilder {
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    pub fn set_distance_type(&mut self, distance_type: DistanceType) -> &mut Self {
        self.distance_type = Some(distance_type);
        self
    }

    pub fn set_road_distances(&mut self, matrix: DistanceMatrix) -> &mut Self {
        self.road_distances = Some(matrix);
        self
    }

    pub fn add_location(&mut self, location: Location) -> LocationIdx {
        self.locations.push(location);
        LocationIdx::new(self.locations.len() - 1)
    }

    /// Depots share the id of their location.
    pub fn add_depot(&mut self, location: LocationIdx) -> DepotIdx {
        let id = self.locations[location].id();
        self.depots.push(Depot::new(id, location));
        DepotIdx::new(self.depots.len() - 1)
    }

    pub fn add_vehicle(&mut self, capacity: u32, depot: DepotIdx) -> VehicleIdx {
        let id = self.vehicles.len() as i64;
        self.vehicles.push(Vehicle::new(id, capacity, depot));
        VehicleIdx::new(self.vehicles.len() - 1)
    }

    /// Customers share the id of their location.
    pub fn add_customer(&mut self, demand: u32, location: LocationIdx) -> CustomerIdx {
        let id = self.locations[location].id();
        self.customers.push(Customer::new(id, demand, location));
        CustomerIdx::new(self.customers.len() - 1)
    }

    pub fn build(self) -> RoutingSolution {
        RoutingSolution {
            name: self.name.unwrap_or_default(),
            distance_type: self.distance_type.unwrap_or(DistanceType::Planar),
            locations: self.locations,
            road_distances: self.road_distances,
            depots: self.depots,
            vehicles: self.vehicles,
            customers: self.customers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{customer, planar_solution, vehicle};

    fn assert_linked(solution: &RoutingSolution, vehicle: VehicleIdx, expected: &[usize]) {
        let chain = RouteChain::build(solution, vehicle).unwrap();
        let stops: Vec<usize> = chain.stops().iter().map(|stop| stop.get()).collect();
        assert_eq!(stops, expected);

        for (position, &stop) in chain.stops().iter().enumerate() {
            let next = chain.stops().get(position + 1).copied();
            assert_eq!(solution.customer(stop).next_customer(), next);
            assert_eq!(solution.customer(stop).vehicle(), Some(vehicle));
        }
    }

    #[test]
    fn test_append_links_both_directions() {
        let mut solution =
            planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1), (3.0, 0.0, 1)], &[10]);

        for index in 0..3 {
            solution.append(customer(index), vehicle(0)).unwrap();
        }

        assert_linked(&solution, vehicle(0), &[0, 1, 2]);
        assert_eq!(
            solution.customer(customer(0)).previous_standstill(),
            Some(Standstill::Depot(DepotIdx::new(0)))
        );
        assert_eq!(
            solution.customer(customer(2)).previous_standstill(),
            Some(Standstill::Customer(customer(1)))
        );
        assert_eq!(
            solution
                .customer(customer(1))
                .distance_from_previous_standstill(),
            1000
        );
        assert_eq!(solution.total_distance(vehicle(0)).unwrap(), 6000);
        assert_eq!(solution.total_demand(vehicle(0)), 3);
    }

    #[test]
    fn test_total_demand_exceeds_single_demand_range() {
        let mut solution = planar_solution(
            (0.0, 0.0),
            &[(1.0, 0.0, u32::MAX), (2.0, 0.0, u32::MAX)],
            &[u32::MAX],
        );
        solution.append(customer(0), vehicle(0)).unwrap();
        solution.append(customer(1), vehicle(0)).unwrap();

        assert_eq!(solution.total_demand(vehicle(0)), 2 * u64::from(u32::MAX));
    }

    #[test]
    fn test_assign_after_inserts_in_the_middle() {
        let mut solution =
            planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1), (3.0, 0.0, 1)], &[10]);
        solution.append(customer(0), vehicle(0)).unwrap();
        solution.append(customer(2), vehicle(0)).unwrap();

        solution
            .assign_after(customer(1), vehicle(0), Standstill::Customer(customer(0)))
            .unwrap();

        assert_linked(&solution, vehicle(0), &[0, 1, 2]);
        assert_eq!(
            solution
                .customer(customer(2))
                .distance_from_previous_standstill(),
            1000
        );
    }

    #[test]
    fn test_assign_after_depot_becomes_first_stop() {
        let mut solution = planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1)], &[10]);
        solution.append(customer(0), vehicle(0)).unwrap();

        solution
            .assign_after(customer(1), vehicle(0), Standstill::Depot(DepotIdx::new(0)))
            .unwrap();

        assert_linked(&solution, vehicle(0), &[1, 0]);
    }

    #[test]
    fn test_unassign_closes_the_gap() {
        let mut solution =
            planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1), (3.0, 0.0, 1)], &[10]);
        for index in 0..3 {
            solution.append(customer(index), vehicle(0)).unwrap();
        }

        solution.unassign(customer(1));

        assert_linked(&solution, vehicle(0), &[0, 2]);
        assert!(!solution.customer(customer(1)).is_assigned());
        assert_eq!(
            solution
                .customer(customer(2))
                .distance_from_previous_standstill(),
            2000
        );
        assert_eq!(solution.unassigned_customers().count(), 1);
    }

    #[test]
    fn test_moving_between_vehicles() {
        let mut solution = planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1)], &[10, 10]);
        solution.append(customer(0), vehicle(0)).unwrap();
        solution.append(customer(1), vehicle(0)).unwrap();

        solution.append(customer(0), vehicle(1)).unwrap();

        assert_linked(&solution, vehicle(0), &[1]);
        assert_linked(&solution, vehicle(1), &[0]);
    }

    #[test]
    fn test_assign_after_foreign_standstill_is_rejected() {
        let mut solution = planar_solution((0.0, 0.0), &[(1.0, 0.0, 1), (2.0, 0.0, 1)], &[10, 10]);
        solution.append(customer(0), vehicle(0)).unwrap();

        let result =
            solution.assign_after(customer(1), vehicle(1), Standstill::Customer(customer(0)));

        assert_eq!(
            result,
            Err(RouteError::ForeignStandstill {
                vehicle: vehicle(1),
                standstill: Standstill::Customer(customer(0)),
            })
        );
        assert!(!solution.customer(customer(1)).is_assigned());
    }

    #[test]
    fn test_road_distance_uses_matrix() {
        let mut builder = RoutingSolutionBuilder::default();
        builder.set_distance_type(DistanceType::Road);
        let a = builder.add_location(Location::from_lat_lon(1, 50.0, 4.0));
        let b = builder.add_location(Location::from_lat_lon(2, 51.0, 5.0));
        builder.set_road_distances(DistanceMatrix::new(2, vec![0.0, 12.5, 13.25, 0.0]).unwrap());

        let solution = builder.build();

        assert_eq!(solution.distance(a, b), 12500);
        assert_eq!(solution.distance(b, a), 13250);
    }
}
