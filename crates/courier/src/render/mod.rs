pub mod bounds;
pub mod color;
pub mod display;
pub mod route_renderer;
