pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod palette;
pub mod protocol;
pub mod registry;
pub mod rng;
pub mod server;
pub mod types;
pub mod world;
