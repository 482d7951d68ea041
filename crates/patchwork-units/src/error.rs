//! Error types for composite units and their configuration.

use patchwork_core::GraphError;
use thiserror::Error;

/// Errors raised while building, driving, or tearing down a composite.
#[derive(Debug, Error)]
pub enum UnitError {
    /// The underlying graph refused an operation. Range errors on tunables
    /// arrive here as [`GraphError::OutOfRange`].
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// The composite was used after `dispose`.
    #[error("{0} has been disposed")]
    Disposed(&'static str),

    /// The composite has no port at this index.
    #[error("{unit} has no port {index}")]
    PortOutOfRange {
        /// Name of the composite.
        unit: &'static str,
        /// Port index requested.
        index: usize,
    },
}

/// Errors that can occur while loading unit configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse TOML
    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}
