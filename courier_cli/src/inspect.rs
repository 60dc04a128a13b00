use std::path::PathBuf;

use clap::Args;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use courier::{
    parsers::{parser::ProblemImporter, vrp_file::VrpFileImporter},
    problem::{
        route_chain::{RouteChain, RouteError},
        routing_solution::RoutingSolution,
    },
};
use tracing::info;

#[derive(Args)]
pub struct InspectArgs {
    /// The .vrp file to inspect
    #[arg(short, long)]
    input: PathBuf,
}

pub fn run(args: InspectArgs) -> Result<(), anyhow::Error> {
    let solution = VrpFileImporter.read(&args.input)?;

    info!(
        name = solution.name(),
        distance_type = ?solution.distance_type(),
        locations = solution.locations().len(),
        customers = solution.customers().len(),
        "loaded {:?}",
        args.input
    );

    println!("{}", routes_table(&solution)?);
    Ok(())
}

/// One row per vehicle with its load and the length of its route.
pub fn routes_table(solution: &RoutingSolution) -> Result<Table, RouteError> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Vehicle", "Depot", "Stops", "Demand", "Capacity", "Distance"]);

    for vehicle in solution.vehicle_indices() {
        let chain = RouteChain::build(solution, vehicle)?;
        let distance = solution.total_distance(vehicle)?;

        table.add_row(vec![
            Cell::new(solution.vehicle(vehicle).id()),
            Cell::new(solution.vehicle_location(vehicle).name()),
            Cell::new(chain.len()),
            Cell::new(solution.total_demand(vehicle)),
            Cell::new(solution.vehicle(vehicle).capacity()),
            Cell::new(format!("{:.3}", distance as f64 / 1000.0)),
        ]);
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use courier::problem::{customer::CustomerIdx, vehicle::VehicleIdx};

    use super::*;

    const SAMPLE: &str = "NAME : T-n3-k2
DIMENSION : 3
EDGE_WEIGHT_TYPE : EUC_2D
CAPACITY : 15
NODE_COORD_SECTION
1 0 0 HUB
2 3 4
3 6 8
DEMAND_SECTION
1 0
2 5
3 7
DEPOT_SECTION
1
-1
";

    #[test]
    fn test_routes_table() {
        let mut solution = VrpFileImporter.parse(SAMPLE.as_bytes()).unwrap();
        solution
            .append(CustomerIdx::new(0), VehicleIdx::new(0))
            .unwrap();
        solution
            .append(CustomerIdx::new(1), VehicleIdx::new(0))
            .unwrap();

        let rendered = routes_table(&solution).unwrap().to_string();

        assert!(rendered.contains("HUB"));
        assert!(rendered.contains("20.000"));
        assert!(rendered.contains("12"));
        assert!(rendered.contains("0.000"));
    }
}
