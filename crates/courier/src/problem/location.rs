use geo::{Distance, Euclidean};

use crate::typed_index;

typed_index!(LocationIdx, Location, "location");

/// A point loaded from the problem file. Road problems store latitude and
/// longitude, planar problems store `x` as longitude and `y` as latitude.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    id: i64,
    name: Option<String>,
    point: geo::Point,
}

/// Planar distances are kept as integers in thousandths of a unit.
const PLANAR_DISTANCE_SCALE: f64 = 1000.0;

impl Location {
    pub fn from_lat_lon(id: i64, lat: f64, lon: f64) -> Self {
        Self {
            id,
            name: None,
            point: geo::Point::new(lon, lat),
        }
    }

    pub fn from_cartesian(id: i64, x: f64, y: f64) -> Self {
        Self {
            id,
            name: None,
            point: geo::Point::new(x, y),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Display name, falling back to the numeric id for unnamed locations.
    pub fn name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self.id.to_string(),
        }
    }

    pub fn lat(&self) -> f64 {
        self.point.y()
    }

    pub fn lon(&self) -> f64 {
        self.point.x()
    }

    pub fn point(&self) -> geo::Point {
        self.point
    }

    pub fn planar_distance(&self, to: &Location) -> u64 {
        let euclidean = Euclidean;
        (euclidean.distance(self.point, to.point) * PLANAR_DISTANCE_SCALE).round() as u64
    }
}

impl From<&Location> for geo::Point<f64> {
    fn from(location: &Location) -> Self {
        location.point
    }
}

impl From<&Location> for geo::Coord<f64> {
    fn from(location: &Location) -> Self {
        location.point.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planar_distance_is_scaled_and_rounded() {
        let a = Location::from_cartesian(1, 0.0, 0.0);
        let b = Location::from_cartesian(2, 3.0, 4.0);
        let c = Location::from_cartesian(3, 1.0, 1.0);

        assert_eq!(a.planar_distance(&b), 5000);
        assert_eq!(a.planar_distance(&c), 1414);
        assert_eq!(b.planar_distance(&b), 0);
    }

    #[test]
    fn test_name_falls_back_to_id() {
        let unnamed = Location::from_lat_lon(7, 50.8, 4.3);
        let named = Location::from_lat_lon(8, 50.8, 4.3).with_name("BRUSSELS");

        assert_eq!(unnamed.name(), "7");
        assert_eq!(named.name(), "BRUSSELS");
        assert_eq!(named.lat(), 50.8);
        assert_eq!(named.lon(), 4.3);
    }
}
