use tracing::debug;

use crate::{
    parsers::parser::{ImportError, ProblemImporter},
    problem::{
        depot::DepotIdx,
        distance_matrix::DistanceMatrix,
        distance_type::DistanceType,
        location::{Location, LocationIdx},
        routing_solution::{RoutingSolution, RoutingSolutionBuilder},
    },
};

/// Reads CVRPLIB style `.vrp` files. `EUC_2D` instances become planar
/// problems, `EXPLICIT` instances with a full matrix become road problems
/// whose coordinates are latitude and longitude.
pub struct VrpFileImporter;

impl ProblemImporter for VrpFileImporter {
    fn parse(&self, bytes: &[u8]) -> Result<RoutingSolution, ImportError> {
        let text = std::str::from_utf8(bytes)?;
        let instance = parse(text)?;

        debug!(
            name = %instance.name,
            nodes = instance.nodes.len(),
            depots = instance.depots.len(),
            "parsed vrp file"
        );

        Ok(build_solution(instance))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWeightType {
    Euc2d,
    Explicit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VrpNode {
    pub id: i64,
    pub first: f64,
    pub second: f64,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct VrpInstance {
    pub name: String,
    pub dimension: usize,
    pub capacity: u32,
    pub vehicles: Option<usize>,
    pub edge_weight_type: EdgeWeightType,
    pub nodes: Vec<VrpNode>,
    pub demands: Vec<u32>,
    /// Positions into `nodes`.
    pub depots: Vec<usize>,
    pub edge_weights: Option<Vec<f64>>,
}

impl VrpInstance {
    /// Explicit `VEHICLES`, else the `-k<N>` suffix of the name, else one
    /// vehicle per depot.
    pub fn vehicle_count(&self) -> usize {
        self.vehicles
            .or_else(|| vehicles_from_name(&self.name))
            .unwrap_or(self.depots.len())
            .max(1)
    }

    /// One vehicle per customer, or per depot when there are more depots.
    pub fn max_vehicles(&self) -> usize {
        self.nodes
            .len()
            .saturating_sub(self.depots.len())
            .max(self.depots.len())
            .max(1)
    }
}

fn vehicles_from_name(name: &str) -> Option<usize> {
    let (_, suffix) = name.rsplit_once("-k")?;
    let digits: String = suffix.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().ok()
}

fn invalid(field: &'static str, value: &str) -> ImportError {
    ImportError::Invalid {
        field,
        value: value.to_string(),
    }
}

fn is_section_end(line: &str) -> bool {
    line.contains("SECTION") || line == "EOF"
}

pub fn parse(text: &str) -> Result<VrpInstance, ImportError> {
    let mut name: Option<String> = None;
    let mut dimension: Option<usize> = None;
    let mut capacity: Option<u32> = None;
    let mut vehicles: Option<usize> = None;
    let mut edge_weight_type = EdgeWeightType::Euc2d;
    let mut nodes: Option<Vec<VrpNode>> = None;
    let mut demands: Option<Vec<u32>> = None;
    let mut depot_ids: Option<Vec<i64>> = None;
    let mut edge_weights: Option<Vec<f64>> = None;

    let lines: Vec<&str> = text.lines().map(|l| l.trim()).collect();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if line.is_empty() || line == "EOF" {
            i += 1;
            continue;
        }

        if let Some((key, value)) = line.split_once(':') {
            let key = key.trim().to_uppercase();
            let value = value.trim();

            match key.as_str() {
                "NAME" => name = Some(value.to_string()),
                "DIMENSION" => {
                    dimension = Some(value.parse().map_err(|_| invalid("dimension", value))?);
                }
                "CAPACITY" => {
                    capacity = Some(value.parse().map_err(|_| invalid("capacity", value))?);
                }
                "VEHICLES" => {
                    vehicles = Some(value.parse().map_err(|_| invalid("vehicles", value))?);
                }
                "EDGE_WEIGHT_TYPE" => {
                    edge_weight_type = match value {
                        "EUC_2D" => EdgeWeightType::Euc2d,
                        "EXPLICIT" => EdgeWeightType::Explicit,
                        other => {
                            return Err(ImportError::UnsupportedEdgeWeightType(other.to_string()));
                        }
                    };
                }
                "EDGE_WEIGHT_FORMAT" if value != "FULL_MATRIX" => {
                    return Err(ImportError::UnsupportedEdgeWeightType(format!(
                        "EXPLICIT {value}"
                    )));
                }
                _ => {}
            }
            i += 1;
            continue;
        }

        if line.contains("NODE_COORD_SECTION") {
            i += 1;
            let mut parsed_nodes = Vec::new();
            while i < lines.len() && !is_section_end(lines[i]) {
                let parts: Vec<&str> = lines[i].split_whitespace().collect();
                if parts.len() >= 3 {
                    let id = parts[0].parse().map_err(|_| invalid("node id", parts[0]))?;
                    let first = parts[1]
                        .parse()
                        .map_err(|_| invalid("coordinate", parts[1]))?;
                    let second = parts[2]
                        .parse()
                        .map_err(|_| invalid("coordinate", parts[2]))?;
                    let node_name = (parts.len() > 3).then(|| parts[3..].join(" "));
                    parsed_nodes.push(VrpNode {
                        id,
                        first,
                        second,
                        name: node_name,
                    });
                }
                i += 1;
            }
            nodes = Some(parsed_nodes);
            continue;
        }

        if line.contains("DEMAND_SECTION") {
            i += 1;
            let mut parsed_demands = Vec::new();
            while i < lines.len() && !is_section_end(lines[i]) {
                let parts: Vec<&str> = lines[i].split_whitespace().collect();
                if parts.len() >= 2 {
                    let demand = parts[1].parse().map_err(|_| invalid("demand", parts[1]))?;
                    parsed_demands.push(demand);
                }
                i += 1;
            }
            demands = Some(parsed_demands);
            continue;
        }

        if line.contains("DEPOT_SECTION") {
            i += 1;
            let mut parsed_depots = Vec::new();
            'section: while i < lines.len() && !is_section_end(lines[i]) {
                for part in lines[i].split_whitespace() {
                    let id: i64 = part.parse().map_err(|_| invalid("depot id", part))?;
                    if id == -1 {
                        i += 1;
                        break 'section;
                    }
                    parsed_depots.push(id);
                }
                i += 1;
            }
            depot_ids = Some(parsed_depots);
            continue;
        }

        if line.contains("EDGE_WEIGHT_SECTION") {
            i += 1;
            let mut weights = Vec::new();
            while i < lines.len() && !is_section_end(lines[i]) {
                for part in lines[i].split_whitespace() {
                    weights.push(part.parse().map_err(|_| invalid("edge weight", part))?);
                }
                i += 1;
            }
            edge_weights = Some(weights);
            continue;
        }

        i += 1;
    }

    let dimension = dimension.ok_or(ImportError::Missing("DIMENSION"))?;
    let nodes = nodes.ok_or(ImportError::Missing("NODE_COORD_SECTION"))?;
    let demands = demands.ok_or(ImportError::Missing("DEMAND_SECTION"))?;

    expect_len("NODE_COORD_SECTION", nodes.len(), dimension)?;
    expect_len("DEMAND_SECTION", demands.len(), dimension)?;

    if edge_weight_type == EdgeWeightType::Explicit {
        let weights = edge_weights
            .as_ref()
            .ok_or(ImportError::Missing("EDGE_WEIGHT_SECTION"))?;
        expect_len("EDGE_WEIGHT_SECTION", weights.len(), dimension * dimension)?;
    }

    let depots = match depot_ids {
        Some(ids) if !ids.is_empty() => ids
            .iter()
            .map(|id| {
                nodes
                    .iter()
                    .position(|node| node.id == *id)
                    .ok_or_else(|| invalid("depot id", &id.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?,
        _ => vec![0],
    };

    let instance = VrpInstance {
        name: name.unwrap_or_default(),
        dimension,
        capacity: capacity.ok_or(ImportError::Missing("CAPACITY"))?,
        vehicles,
        edge_weight_type,
        nodes,
        demands,
        depots,
        edge_weights,
    };

    let vehicle_count = instance.vehicle_count();
    if vehicle_count > instance.max_vehicles() {
        return Err(invalid("vehicles", &vehicle_count.to_string()));
    }

    Ok(instance)
}

fn expect_len(section: &'static str, found: usize, expected: usize) -> Result<(), ImportError> {
    if found == expected {
        Ok(())
    } else {
        Err(ImportError::DimensionMismatch {
            section,
            found,
            expected,
        })
    }
}

fn build_solution(instance: VrpInstance) -> RoutingSolution {
    let distance_type = match instance.edge_weight_type {
        EdgeWeightType::Euc2d => DistanceType::Planar,
        EdgeWeightType::Explicit => DistanceType::Road,
    };
    let vehicle_count = instance.vehicle_count();

    let mut builder = RoutingSolutionBuilder::default();
    builder.set_name(instance.name);
    builder.set_distance_type(distance_type);

    let locations: Vec<LocationIdx> = instance
        .nodes
        .into_iter()
        .map(|node| {
            let location = match distance_type {
                DistanceType::Road => Location::from_lat_lon(node.id, node.first, node.second),
                DistanceType::Planar => Location::from_cartesian(node.id, node.first, node.second),
            };
            let location = match node.name {
                Some(name) => location.with_name(name),
                None => location,
            };
            builder.add_location(location)
        })
        .collect();

    if let Some(matrix) = instance
        .edge_weights
        .and_then(|weights| DistanceMatrix::new(instance.dimension, weights))
    {
        builder.set_road_distances(matrix);
    }

    let depots: Vec<DepotIdx> = instance
        .depots
        .iter()
        .map(|&position| builder.add_depot(locations[position]))
        .collect();

    for vehicle in 0..vehicle_count {
        builder.add_vehicle(instance.capacity, depots[vehicle % depots.len()]);
    }

    for (position, &location) in locations.iter().enumerate() {
        if !instance.depots.contains(&position) {
            builder.add_customer(instance.demands[position], location);
        }
    }

    builder.build()
}
