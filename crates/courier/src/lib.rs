pub mod parsers;
pub mod problem;
pub mod render;
pub mod session;
pub mod solver;
mod utils;

#[cfg(test)]
pub(crate) mod test_utils;
