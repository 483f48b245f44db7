//! Kernel component files.
//!
//! Entry points over the binary codec:
//!
//! ```text
//! Component ──serialize──► bytes ──deserialize──► Vec<Component>
//! ```
//!
//! A file may hold several components back to back; [`serialize_all`]
//! writes them and [`deserialize`] returns all of them in order.

mod config;

#[cfg(test)]
mod tests;

use std::sync::Once;

use rayon::prelude::*;
use thiserror::Error;

pub use config::{parse_version, ConfigError, KernelConfig, VERSION_VAR};
pub use kernel_binary::{ReadError, VariableSlots, WriteError};
pub use kernel_ir::{Component, IdentityError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KernelError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Enable with `RUST_LOG=kernel_binary=debug`
/// or `RUST_LOG=kernel_binary=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Serialize one component in the format version it carries.
pub fn serialize(component: &Component) -> Result<Vec<u8>, KernelError> {
    Ok(kernel_binary::write_component(component)?)
}

/// Serialize one component and report the scope slot of every variable.
pub fn serialize_with_slots(
    component: &Component,
) -> Result<(Vec<u8>, VariableSlots), KernelError> {
    Ok(kernel_binary::write_component_with_slots(component)?)
}

/// Serialize several components into one file, in order.
///
/// Components share nothing, so each is written on its own worker and the
/// results are concatenated.
#[tracing::instrument(level = "debug", skip_all, fields(components = components.len()))]
pub fn serialize_all(components: &[Component]) -> Result<Vec<u8>, KernelError> {
    let parts = components
        .par_iter()
        .map(kernel_binary::write_component)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parts.concat())
}

/// Every component in `bytes`, in file order.
pub fn deserialize(bytes: &[u8]) -> Result<Vec<Component>, KernelError> {
    Ok(kernel_binary::read_components(bytes)?)
}
