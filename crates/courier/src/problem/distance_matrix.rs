use super::location::LocationIdx;

/// Square matrix of road distances between locations, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    dimension: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Returns `None` when `values` is not `dimension * dimension` long.
    pub fn new(dimension: usize, values: Vec<f64>) -> Option<Self> {
        (values.len() == dimension * dimension).then_some(Self { dimension, values })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn get(&self, from: LocationIdx, to: LocationIdx) -> f64 {
        self.values[from.get() * self.dimension + to.get()]
    }
}
