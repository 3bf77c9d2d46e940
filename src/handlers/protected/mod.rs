// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route in this tier sits behind `middleware::require_auth`, which
// puts the resolved `CurrentUser` into request extensions.

pub mod users;
