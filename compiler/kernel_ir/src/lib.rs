//! Kernel IR: the in-memory form of a Kernel component.
//!
//! - [`names`]: canonical names and the references that bind to them
//! - [`Tree`]: per-kind node arenas with parent tracking
//! - [`ast`]: node payloads (declarations, expressions, statements, types)
//! - [`Component`]: libraries, names, and sources of one compilation unit
//! - [`visitor`]: dispatch traits over every node kind
//! - [`dump`]: text rendering for inspection and structural comparison
//!
//! Nodes never point at each other directly. Ownership goes through typed
//! ids; cross-references go through [`Reference`]s resolved by the
//! component's [`CanonicalNames`].

pub mod ast;
mod component;
pub mod dump;
mod flags;
mod ids;
pub mod names;
mod source;
pub mod tree;
mod version;
pub mod visitor;

pub use ast::*;
pub use component::Component;
pub use flags::{
    AsExpressionFlags, ClassFlags, ConstructorFlags, FieldFlags, IsExpressionFlags, LibraryFlags,
    ProcedureFlags, TryCatchFlags, TypeParameterFlags, VariableFlags,
};
pub use ids::{
    ClassId, ConstructorId, ExprId, FieldId, FunctionId, InitializerId, LibraryId, MemberId,
    MemberOwner, NamedNodeId, ProcedureId, StmtId, TreeNodeId, TypeParameterId, VariableId,
};
pub use names::{CanonicalName, CanonicalNames, IdentityError, Reference};
pub use source::{line_starts, FileOffset, Source, Uri};
pub use tree::{Tree, TreeError, TreeIndex, TreeNode};
pub use version::{CompiledMode, KernelVersion, LanguageVersion};

/// Compile-time size check for hot types.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

#[cfg(target_pointer_width = "64")]
mod size_asserts {
    use super::{FileOffset, Reference, TreeNodeId};
    crate::static_assert_size!(FileOffset, 4);
    crate::static_assert_size!(Reference, 4);
    crate::static_assert_size!(TreeNodeId, 8);
}
