//! TOML configuration for the engine context and every composite.
//!
//! ```toml
//! [engine]
//! sample_rate = 44100.0
//! bpm = 90.0
//!
//! [follower]
//! attack = { milliseconds = 5.0 }
//!
//! [ping_pong]
//! delay_time = { note = "eighth" }
//! feedback = 0.4
//! ```

use patchwork_core::Context;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::options::{FollowerOptions, GreaterThanOptions, PingPongOptions};

/// Engine settings used to build a [`Context`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Frames per render block.
    pub block_size: usize,
    /// Tempo for note-relative times.
    pub bpm: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let ctx = Context::default();
        Self {
            sample_rate: ctx.sample_rate(),
            block_size: ctx.block_size(),
            bpm: ctx.bpm(),
        }
    }
}

impl EngineConfig {
    /// Builds the engine context. Invalid values fall back to defaults.
    pub fn context(&self) -> Context {
        Context::new(self.sample_rate, self.block_size).with_bpm(self.bpm)
    }
}

/// Top-level configuration file.
///
/// Each composite's table is optional; absent tables mean default options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Engine settings.
    pub engine: EngineConfig,
    /// Envelope follower options.
    pub follower: Option<FollowerOptions>,
    /// Comparator options.
    pub greater_than: Option<GreaterThanOptions>,
    /// Ping-pong delay options.
    pub ping_pong: Option<PingPongOptions>,
}

impl UnitsConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str(text)?;
        #[cfg(feature = "tracing")]
        tracing::debug!("config_load: {config:?}");
        Ok(config)
    }

    /// Follower options, defaulted if the table was absent.
    pub fn follower_options(&self) -> FollowerOptions {
        self.follower.unwrap_or_default()
    }

    /// Comparator options, defaulted if the table was absent.
    pub fn greater_than_options(&self) -> GreaterThanOptions {
        self.greater_than.unwrap_or_default()
    }

    /// Ping-pong options, defaulted if the table was absent.
    pub fn ping_pong_options(&self) -> PingPongOptions {
        self.ping_pong.unwrap_or_default()
    }
}
