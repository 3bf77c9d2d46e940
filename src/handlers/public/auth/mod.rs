// handlers/public/auth/mod.rs - Public authentication handlers
//
// Account creation and token acquisition. Neither requires a token.

pub mod register; // POST /register/ - create new account
pub mod token;    // POST /token - authenticate and get JWT
pub mod utils;

pub use register::register;
pub use token::login;
