use courier::render::{
    color::Color,
    display::MapSurface,
    route_renderer::{CameraFrame, Marker, RouteLabel, Segment, SegmentKind},
};
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};

fn position(point: geo::Point) -> Vec<f64> {
    vec![point.x(), point.y()]
}

/// Collects the drawn scene as GeoJSON features, ready to be written out.
#[derive(Default)]
pub struct GeoJsonSurface {
    features: Vec<Feature>,
    camera: Option<CameraFrame>,
}

impl GeoJsonSurface {
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_geojson(self) -> GeoJson {
        let mut foreign_members = JsonObject::new();
        let bbox = self.camera.map(|camera| {
            foreign_members.insert("padding".to_string(), camera.padding.into());
            vec![
                camera.bounds.min().x,
                camera.bounds.min().y,
                camera.bounds.max().x,
                camera.bounds.max().y,
            ]
        });

        GeoJson::FeatureCollection(FeatureCollection {
            bbox,
            features: self.features,
            foreign_members: (!foreign_members.is_empty()).then_some(foreign_members),
        })
    }
}

impl MapSurface for GeoJsonSurface {
    fn clear(&mut self) {
        self.features.clear();
        self.camera = None;
    }

    fn add_marker(&mut self, marker: &Marker) {
        let mut feature = Feature {
            geometry: Some(Geometry::new(Value::Point(position(marker.position)))),
            ..Default::default()
        };
        feature.set_property("title", marker.title.clone());
        self.features.push(feature);
    }

    fn frame_camera(&mut self, camera: &CameraFrame) {
        self.camera = Some(*camera);
    }

    fn add_segment(&mut self, segment: &Segment, color: &Color) {
        let mut feature = Feature {
            geometry: Some(Geometry::new(Value::LineString(vec![
                position(segment.from),
                position(segment.to),
            ]))),
            ..Default::default()
        };
        feature.set_property("stroke", color.as_str());
        feature.set_property(
            "kind",
            match segment.kind {
                SegmentKind::Leg => "leg",
                SegmentKind::Return => "return",
            },
        );
        self.features.push(feature);
    }

    fn add_label(&mut self, label: &RouteLabel, color: &Color) {
        let mut feature = Feature {
            geometry: Some(Geometry::new(Value::Point(position(label.position)))),
            ..Default::default()
        };
        feature.set_property("stroke", color.as_str());
        feature.set_property(
            "label",
            format!(
                "{:.1} / {} of {}",
                label.route_distance as f64 / 1000.0,
                label.demand,
                label.capacity
            ),
        );
        self.features.push(feature);
    }
}

#[cfg(test)]
mod tests {
    use courier::{
        parsers::{parser::ProblemImporter, vrp_file::VrpFileImporter},
        problem::{customer::CustomerIdx, vehicle::VehicleIdx},
        render::{color::Palette, display::draw, route_renderer::RouteRenderer},
    };

    use super::*;

    const SAMPLE: &str = "NAME: road-n3-k1
DIMENSION: 3
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
CAPACITY: 10
NODE_COORD_SECTION
1 50.85 4.35 BRUSSELS
2 51.22 4.40 ANTWERPEN
3 51.05 3.72 GENT
EDGE_WEIGHT_SECTION
0 45 56
46 0 60
55 59 0
DEMAND_SECTION
1 0
2 3
3 4
DEPOT_SECTION
1
-1
";

    #[test]
    fn test_scene_as_geojson() {
        let mut solution = VrpFileImporter.parse(SAMPLE.as_bytes()).unwrap();
        solution
            .append(CustomerIdx::new(0), VehicleIdx::new(0))
            .unwrap();
        solution
            .append(CustomerIdx::new(1), VehicleIdx::new(0))
            .unwrap();
        let rendered = RouteRenderer::new(Palette::default())
            .render(&solution)
            .unwrap();

        let mut surface = GeoJsonSurface::default();
        draw(&mut surface, &rendered);

        // 4 markers, 3 segments, 1 label
        assert_eq!(surface.features().len(), 8);
        let label = surface.features()[7]
            .property("label")
            .and_then(|value| value.as_str())
            .unwrap();
        assert_eq!(label, "160.0 / 7 of 10");

        let GeoJson::FeatureCollection(collection) = surface.into_geojson() else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.bbox, Some(vec![3.72, 50.85, 4.40, 51.22]));
        assert_eq!(
            collection
                .foreign_members
                .and_then(|members| members.get("padding").cloned()),
            Some(100.into())
        );
    }
}
