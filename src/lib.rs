#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]
pub mod app;
pub mod config;
pub mod database;
pub mod http;
pub mod logging;
pub mod schema;
pub mod services;
pub mod shopping;
pub mod store;
pub mod types;
pub mod util;

pub use app::App;

pub(crate) mod internal;

#[cfg(test)]
pub(crate) mod test_utils;
