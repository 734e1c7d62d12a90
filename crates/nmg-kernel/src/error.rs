//! Configuration errors.

use std::path::PathBuf;

use nmg_kernel_math::ToleranceError;
use thiserror::Error;

/// Errors raised while loading or applying an [`NmgConfig`](crate::NmgConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The text is not valid TOML for a config.
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The `[tolerance]` section is unusable.
    #[error(transparent)]
    Tolerance(#[from] ToleranceError),

    /// Some other setting is out of range.
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
}

/// Result type for configuration.
pub type Result<T> = std::result::Result<T, ConfigError>;
