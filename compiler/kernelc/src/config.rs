//! Target configuration for new components.

use kernel_ir::{CompiledMode, Component, KernelVersion};
use thiserror::Error;

/// Environment variable naming the kernel format version to target.
pub const VERSION_VAR: &str = "KERNEL_VERSION";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("`{value}` is not a kernel format version")]
    InvalidVersion { value: String },

    #[error("kernel format version {version} is not supported (supported: {}..={})",
        KernelVersion::OLDEST_SUPPORTED.format, KernelVersion::LATEST.format)]
    UnsupportedVersion { version: u32 },
}

/// What a new component targets: the format version it is written in and
/// the null-safety mode recorded in its index.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KernelConfig {
    pub version: KernelVersion,
    pub compiled_mode: CompiledMode,
}

impl Default for KernelConfig {
    fn default() -> Self {
        KernelConfig {
            version: KernelVersion::LATEST,
            compiled_mode: CompiledMode::default(),
        }
    }
}

impl KernelConfig {
    #[must_use]
    pub fn with_version(mut self, version: KernelVersion) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn with_compiled_mode(mut self, compiled_mode: CompiledMode) -> Self {
        self.compiled_mode = compiled_mode;
        self
    }

    /// Default configuration, with the version taken from `KERNEL_VERSION`
    /// when it is set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = KernelConfig::default();
        match std::env::var(VERSION_VAR) {
            Ok(value) => Ok(config.with_version(parse_version(&value)?)),
            Err(_) => Ok(config),
        }
    }

    /// An empty component targeting this configuration.
    pub fn new_component(&self) -> Component {
        let mut component = Component::with_version(self.version);
        component.compiled_mode = self.compiled_mode;
        component
    }
}

/// A format version number such as `41`.
pub fn parse_version(value: &str) -> Result<KernelVersion, ConfigError> {
    let format: u32 = value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidVersion {
            value: value.to_owned(),
        })?;
    KernelVersion::from_format(format).ok_or(ConfigError::UnsupportedVersion { version: format })
}
