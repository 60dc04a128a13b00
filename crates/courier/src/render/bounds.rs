use geo::{Coord, Rect, coord};

/// Grows a rectangle until it covers every included point.
#[derive(Debug, Default, Clone, Copy)]
pub struct BoundsAccumulator {
    bounds: Option<Rect>,
}

impl BoundsAccumulator {
    pub fn include(&mut self, point: impl Into<Coord>) {
        let point = point.into();
        self.bounds = Some(match self.bounds {
            None => Rect::new(point, point),
            Some(bounds) => Rect::new(
                coord! { x: bounds.min().x.min(point.x), y: bounds.min().y.min(point.y) },
                coord! { x: bounds.max().x.max(point.x), y: bounds.max().y.max(point.y) },
            ),
        });
    }

    /// `None` until at least one point was included.
    pub fn build(&self) -> Option<Rect> {
        self.bounds
    }

    pub fn accumulate<I, P>(points: I) -> Option<Rect>
    where
        I: IntoIterator<Item = P>,
        P: Into<Coord>,
    {
        let mut accumulator = Self::default();
        for point in points {
            accumulator.include(point);
        }
        accumulator.build()
    }
}
