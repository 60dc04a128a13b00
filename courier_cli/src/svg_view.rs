use courier::{
    problem::{
        route_chain::{RouteChain, RouteError},
        routing_solution::RoutingSolution,
    },
    render::{bounds::BoundsAccumulator, color::Palette, display::PlanarView},
};
use geo::Rect;

const WIDTH: f64 = 800.0;
const MARGIN: f64 = 20.0;

/// Draws planar problems as an SVG document, y axis pointing up.
pub struct SvgView {
    palette: Palette,
    document: Option<String>,
}

impl SvgView {
    pub fn new(palette: Palette) -> Self {
        Self {
            palette,
            document: None,
        }
    }

    pub fn document(&self) -> Option<&str> {
        self.document.as_deref()
    }
}

struct Projection {
    bounds: Rect,
    scale: f64,
}

impl Projection {
    fn new(bounds: Rect) -> Self {
        let extent = bounds.width().max(bounds.height());
        let scale = if extent > 0.0 { WIDTH / extent } else { 1.0 };
        Self { bounds, scale }
    }

    fn project(&self, point: geo::Point) -> (f64, f64) {
        (
            (point.x() - self.bounds.min().x) * self.scale + MARGIN,
            (self.bounds.max().y - point.y()) * self.scale + MARGIN,
        )
    }

    fn size(&self) -> (f64, f64) {
        (
            self.bounds.width() * self.scale + 2.0 * MARGIN,
            self.bounds.height() * self.scale + 2.0 * MARGIN,
        )
    }
}

impl PlanarView for SvgView {
    fn show_solution(&mut self, solution: &RoutingSolution) -> Result<(), RouteError> {
        let Some(bounds) = BoundsAccumulator::accumulate(solution.locations()) else {
            self.document = None;
            return Ok(());
        };
        let projection = Projection::new(bounds);
        let (width, height) = projection.size();

        let mut svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.0}" height="{height:.0}">"#
        );
        svg.push('\n');

        for (vehicle, color_index) in solution.vehicle_indices().zip(self.palette.cycle()) {
            let chain = RouteChain::build(solution, vehicle)?;
            let Some(last) = chain.last() else {
                continue;
            };

            let mut points: Vec<geo::Point> = chain
                .legs()
                .map(|(previous, _)| solution.standstill_location(previous).point())
                .collect();
            points.push(solution.location(solution.customer(last).location()).point());
            if solution.customer(last).next_customer().is_none() {
                points.push(solution.vehicle_location(vehicle).point());
            }

            let path: Vec<String> = points
                .into_iter()
                .map(|point| {
                    let (x, y) = projection.project(point);
                    format!("{x:.1},{y:.1}")
                })
                .collect();
            svg.push_str(&format!(
                r#"  <polyline fill="none" stroke="{}" stroke-width="2" points="{}"/>"#,
                self.palette.get(color_index),
                path.join(" ")
            ));
            svg.push('\n');
        }

        for customer in solution.customers() {
            let (x, y) = projection.project(solution.location(customer.location()).point());
            svg.push_str(&format!(r#"  <circle cx="{x:.1}" cy="{y:.1}" r="3"/>"#));
            svg.push('\n');
        }
        for depot in solution.depots() {
            let (x, y) = projection.project(solution.location(depot.location()).point());
            svg.push_str(&format!(
                r#"  <rect x="{:.1}" y="{:.1}" width="8" height="8"/>"#,
                x - 4.0,
                y - 4.0
            ));
            svg.push('\n');
        }

        svg.push_str("</svg>\n");
        self.document = Some(svg);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use courier::{
        parsers::{parser::ProblemImporter, vrp_file::VrpFileImporter},
        problem::{customer::CustomerIdx, vehicle::VehicleIdx},
    };

    use super::*;

    const SAMPLE: &str = "NAME : square-n4-k2
DIMENSION : 4
EDGE_WEIGHT_TYPE : EUC_2D
CAPACITY : 10
NODE_COORD_SECTION
1 0 0
2 10 0
3 10 10
4 0 10
DEMAND_SECTION
1 0
2 1
3 1
4 1
DEPOT_SECTION
1
-1
";

    #[test]
    fn test_polyline_per_used_vehicle() {
        let mut solution = VrpFileImporter.parse(SAMPLE.as_bytes()).unwrap();
        solution
            .append(CustomerIdx::new(0), VehicleIdx::new(0))
            .unwrap();
        solution
            .append(CustomerIdx::new(1), VehicleIdx::new(0))
            .unwrap();
        let mut view = SvgView::new(Palette::parse_list("#aa0000,#00aa00").unwrap());

        view.show_solution(&solution).unwrap();

        let document = view.document().unwrap();
        assert_eq!(document.matches("<polyline").count(), 1);
        assert!(document.contains(r##"stroke="#aa0000""##));
        assert!(document.contains(r#"points="20.0,820.0 820.0,820.0 820.0,20.0 20.0,820.0""#));
        assert_eq!(document.matches("<circle").count(), 3);
        assert_eq!(document.matches("<rect").count(), 1);
    }

    #[test]
    fn test_empty_routes_draw_nothing() {
        let mut solution = VrpFileImporter.parse(SAMPLE.as_bytes()).unwrap();
        solution
            .append(CustomerIdx::new(0), VehicleIdx::new(0))
            .unwrap();
        let mut view = SvgView::new(Palette::default());
        view.show_solution(&solution).unwrap();

        let mut broken = solution.clone();
        broken.unassign(CustomerIdx::new(0));
        view.show_solution(&broken).unwrap();
        assert_eq!(view.document().unwrap().matches("<polyline").count(), 0);
    }
}
