pub mod customer;
pub mod depot;
pub mod distance_matrix;
pub mod distance_type;
pub mod location;
pub mod route_chain;
pub mod routing_solution;
pub mod standstill;
pub mod vehicle;
