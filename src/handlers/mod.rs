// handlers/mod.rs - one module per /api sub-router
//
// Handlers stay thin: extract and validate, call the matching service,
// wrap the result. Routing lives in app.rs.

pub mod auth;
pub mod group;
pub mod post;
pub mod system;
pub mod user;
