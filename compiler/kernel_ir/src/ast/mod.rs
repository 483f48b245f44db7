//! Node payloads stored in the [`Tree`](crate::Tree) arenas.

mod expr;
mod function;
mod members;
mod stmt;
mod types;

pub use expr::*;
pub use function::*;
pub use members::*;
pub use stmt::*;
pub use types::*;
