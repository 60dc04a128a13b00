pub mod error;
#[allow(clippy::module_inception)]
pub mod session;
pub mod session_config;
pub mod session_event;
