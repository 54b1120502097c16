pub mod actor;
pub mod controllers;
pub mod error;
pub mod jwt;
pub mod routes;
pub mod util;

pub use actor::Actor;
pub use error::{Error, Result};
pub use jwt::Jwt;
