// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token resolved to a stored user)
pub mod protected;
pub mod public;
