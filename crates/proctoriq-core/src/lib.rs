//! Configuration loading, secret resolution and component wiring.

pub mod bootstrap;
pub mod config;
pub mod vault;

pub use bootstrap::{App, AppBuilder};
pub use config::Config;
