use geo::{Centroid, Line, Rect};
use tracing::warn;

use crate::{
    problem::{
        customer::CustomerIdx,
        route_chain::{RouteChain, RouteError},
        routing_solution::RoutingSolution,
        standstill::Standstill,
        vehicle::VehicleIdx,
    },
    render::{
        bounds::BoundsAccumulator,
        color::{Color, Palette},
    },
};

/// Margin around the framed locations, in display units.
pub const CAMERA_PADDING: u32 = 100;

pub const DEPOT_MARKER_TITLE: &str = "Depot";

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: geo::Point,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// From the previous standstill to a customer.
    Leg,
    /// From the last customer back to the vehicle's home.
    Return,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub from: geo::Point,
    pub to: geo::Point,
    pub kind: SegmentKind,
}

/// Annotation anchored on the longest leg between two customers of a route.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLabel {
    pub customer: CustomerIdx,
    pub position: geo::Point,
    pub route_distance: u64,
    pub demand: u64,
    pub capacity: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRoute {
    pub vehicle: VehicleIdx,
    pub color: Color,
    pub segments: Vec<Segment>,
    pub label: Option<RouteLabel>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub bounds: Rect,
    pub padding: u32,
}

/// Everything a map surface needs to draw one solution.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSolution {
    pub markers: Vec<Marker>,
    pub camera: Option<CameraFrame>,
    pub routes: Vec<VehicleRoute>,
}

impl RenderedSolution {
    pub fn segment_count(&self) -> usize {
        self.routes.iter().map(|route| route.segments.len()).sum()
    }
}

pub struct RouteRenderer {
    palette: Palette,
    padding: u32,
}

impl RouteRenderer {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            padding: CAMERA_PADDING,
        }
    }

    pub fn with_padding(mut self, padding: u32) -> Self {
        self.padding = padding;
        self
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn render(&self, solution: &RoutingSolution) -> Result<RenderedSolution, RouteError> {
        let mut markers: Vec<Marker> = solution
            .locations()
            .iter()
            .map(|location| Marker {
                position: location.point(),
                title: location.name(),
            })
            .collect();
        markers.extend(solution.depots().iter().map(|depot| Marker {
            position: solution.location(depot.location()).point(),
            title: DEPOT_MARKER_TITLE.to_string(),
        }));

        let camera = BoundsAccumulator::accumulate(solution.locations()).map(|bounds| CameraFrame {
            bounds,
            padding: self.padding,
        });

        let routes = solution
            .vehicle_indices()
            .zip(self.palette.cycle())
            .map(|(vehicle, color_index)| {
                self.render_vehicle(solution, vehicle, self.palette.get(color_index))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RenderedSolution {
            markers,
            camera,
            routes,
        })
    }

    fn render_vehicle(
        &self,
        solution: &RoutingSolution,
        vehicle: VehicleIdx,
        color: &Color,
    ) -> Result<VehicleRoute, RouteError> {
        let chain = RouteChain::build(solution, vehicle)?;
        let mut segments = Vec::with_capacity(chain.len() + 1);

        for (previous, customer) in chain.legs() {
            segments.push(Segment {
                from: solution.standstill_location(previous).point(),
                to: customer_point(solution, customer),
                kind: SegmentKind::Leg,
            });
        }

        if let Some(last) = chain.last() {
            match solution.customer(last).next_customer() {
                None => segments.push(Segment {
                    from: customer_point(solution, last),
                    to: solution.vehicle_location(vehicle).point(),
                    kind: SegmentKind::Return,
                }),
                Some(next) => {
                    warn!(%vehicle, %last, %next, "last stop still points at a next customer");
                }
            }
        }

        let assigned: Vec<CustomerIdx> = solution.customers_of(vehicle).collect();
        let label = select_label_customer(solution, &assigned).map(|customer| {
            let previous = solution
                .customer(customer)
                .previous_standstill()
                .map_or(solution.vehicle_location(vehicle).point(), |previous| {
                    solution.standstill_location(previous).point()
                });
            let leg = Line::new(previous, customer_point(solution, customer));

            RouteLabel {
                customer,
                position: leg.centroid(),
                route_distance: route_distance(solution, &chain),
                demand: solution.total_demand(vehicle),
                capacity: solution.vehicle(vehicle).capacity(),
            }
        });

        Ok(VehicleRoute {
            vehicle,
            color: color.clone(),
            segments,
            label,
        })
    }
}

fn customer_point(solution: &RoutingSolution, customer: CustomerIdx) -> geo::Point {
    solution
        .location(solution.customer(customer).location())
        .point()
}

fn route_distance(solution: &RoutingSolution, chain: &RouteChain) -> u64 {
    let legs: u64 = chain
        .stops()
        .iter()
        .map(|&customer| solution.customer(customer).distance_from_previous_standstill())
        .sum();
    let home = solution
        .depot(solution.vehicle(chain.vehicle()).depot())
        .location();

    legs + chain.last().map_or(0, |last| {
        solution.distance(solution.customer(last).location(), home)
    })
}

/// Picks the customer that carries the route label: the one with the longest
/// distance from a previous customer. Routes where every stop comes straight
/// from the depot fall back to the first such stop. Ties go to the customer
/// listed first in `customers`, which the renderer passes in problem order.
pub fn select_label_customer(
    solution: &RoutingSolution,
    customers: &[CustomerIdx],
) -> Option<CustomerIdx> {
    let mut label = None;
    let mut longest_non_depot: Option<u64> = None;

    for &customer in customers {
        let Some(previous) = solution.customer(customer).previous_standstill() else {
            continue;
        };
        let distance = solution.customer(customer).distance_from_previous_standstill();

        match previous {
            Standstill::Customer(_) => {
                if longest_non_depot.is_none_or(|longest| distance > longest) {
                    longest_non_depot = Some(distance);
                    label = Some(customer);
                }
            }
            Standstill::Depot(_) => {
                if label.is_none() {
                    label = Some(customer);
                }
            }
        }
    }

    label
}
