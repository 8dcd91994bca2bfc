//! Error types for the simulation shell.
//!
//! The simulation itself never fails; these cover configuration, imagery and
//! command parsing at the edges.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// Config file could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for [`crate::config::SimConfig`].
    #[error("invalid config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Config parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Sprite exists but could not be decoded.
    #[error("failed to load sprite {}: {source}", path.display())]
    Sprite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Rendered frame could not be written.
    #[error("failed to write image {}: {source}", path.display())]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("unknown command: {0:?}")]
    UnknownCommand(String),
}

pub type Result<T> = std::result::Result<T, Error>;
