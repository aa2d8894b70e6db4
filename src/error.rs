use std::io;

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("spawn padding {padding} leaves no room in a {width}x{height} arena")]
    PaddingTooLarge { padding: f32, width: f32, height: f32 },
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid game config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("server runtime failed: {0}")]
    Serve(#[source] io::Error),
}
