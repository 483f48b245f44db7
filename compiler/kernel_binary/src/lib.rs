//! Kernel component binary format.
//!
//! - [`write_component`]: one component to bytes, in a single depth-first pass
//! - [`read_components`]: every component in a buffer, located from its tail
//! - [`write_components`]: several components concatenated into one file
//!
//! All offsets stored inside a component are relative to its start, so
//! components can be concatenated byte for byte and read back in order.

mod codec;
mod error;
mod indexer;
mod reader;
mod stack;
pub mod tags;
mod writer;

pub use codec::MAX_UINT;
pub use error::{ReadError, WriteError};
pub use reader::read_components;
pub use writer::{write_component, write_component_with_slots, VariableSlots};

use kernel_ir::Component;

/// Serialize `components` one after another into a single buffer.
pub fn write_components(components: &[Component]) -> Result<Vec<u8>, WriteError> {
    let mut bytes = Vec::new();
    for component in components {
        bytes.extend(write_component(component)?);
    }
    Ok(bytes)
}
