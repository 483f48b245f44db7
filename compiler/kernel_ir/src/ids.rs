//! Typed indices into the node arenas of a [`Tree`](crate::Tree).
//!
//! Every node kind lives in its own arena, so ids are plain `u32` newtypes.
//! The wrapper enums ([`TreeNodeId`], [`MemberId`], [`NamedNodeId`]) are
//! used wherever a slot can hold more than one kind of node.

use std::fmt;

macro_rules! define_id {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
            #[repr(transparent)]
            pub struct $name(u32);

            impl $name {
                #[inline]
                pub const fn new(index: u32) -> Self {
                    $name(index)
                }

                #[inline]
                pub const fn index(self) -> usize {
                    self.0 as usize
                }

                #[inline]
                pub const fn raw(self) -> u32 {
                    self.0
                }
            }

            impl fmt::Debug for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, concat!(stringify!($name), "({})"), self.0)
                }
            }
        )*
    };
}

define_id! {
    /// Index of a [`Library`](crate::Library).
    LibraryId;
    /// Index of a [`Class`](crate::Class).
    ClassId;
    /// Index of a [`Field`](crate::Field).
    FieldId;
    /// Index of a [`Procedure`](crate::Procedure).
    ProcedureId;
    /// Index of a [`Constructor`](crate::Constructor).
    ConstructorId;
    /// Index of an [`Initializer`](crate::Initializer).
    InitializerId;
    /// Index of a [`FunctionNode`](crate::FunctionNode).
    FunctionId;
    /// Index of an [`Expression`](crate::Expression).
    ExprId;
    /// Index of a [`Statement`](crate::Statement).
    StmtId;
    /// Index of a [`VariableDeclaration`](crate::VariableDeclaration).
    VariableId;
    /// Index of a [`TypeParameter`](crate::TypeParameter).
    TypeParameterId;
}

/// Any node that can own children or be owned.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TreeNodeId {
    /// The component itself; owns the libraries.
    Component,
    Library(LibraryId),
    Class(ClassId),
    Field(FieldId),
    Procedure(ProcedureId),
    Constructor(ConstructorId),
    Initializer(InitializerId),
    Function(FunctionId),
    Expr(ExprId),
    Stmt(StmtId),
    Variable(VariableId),
    TypeParameter(TypeParameterId),
}

/// A class or library member.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberId {
    Field(FieldId),
    Procedure(ProcedureId),
    Constructor(ConstructorId),
}

/// A node that carries a [`Reference`](crate::Reference) and can therefore
/// be the target of a canonical name.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum NamedNodeId {
    Library(LibraryId),
    Class(ClassId),
    Field(FieldId),
    Procedure(ProcedureId),
    Constructor(ConstructorId),
}

/// Where a member is declared.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MemberOwner {
    Library(LibraryId),
    Class(ClassId),
}

macro_rules! impl_from {
    ($target:ident: $($id:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$id> for $target {
                #[inline]
                fn from(id: $id) -> Self {
                    $target::$variant(id)
                }
            }
        )*
    };
}

impl_from!(TreeNodeId:
    LibraryId => Library,
    ClassId => Class,
    FieldId => Field,
    ProcedureId => Procedure,
    ConstructorId => Constructor,
    InitializerId => Initializer,
    FunctionId => Function,
    ExprId => Expr,
    StmtId => Stmt,
    VariableId => Variable,
    TypeParameterId => TypeParameter,
);

impl_from!(MemberId:
    FieldId => Field,
    ProcedureId => Procedure,
    ConstructorId => Constructor,
);

impl_from!(NamedNodeId:
    LibraryId => Library,
    ClassId => Class,
    FieldId => Field,
    ProcedureId => Procedure,
    ConstructorId => Constructor,
);

impl_from!(MemberOwner:
    LibraryId => Library,
    ClassId => Class,
);

impl From<MemberId> for NamedNodeId {
    fn from(member: MemberId) -> Self {
        match member {
            MemberId::Field(id) => NamedNodeId::Field(id),
            MemberId::Procedure(id) => NamedNodeId::Procedure(id),
            MemberId::Constructor(id) => NamedNodeId::Constructor(id),
        }
    }
}

impl From<MemberId> for TreeNodeId {
    fn from(member: MemberId) -> Self {
        match member {
            MemberId::Field(id) => TreeNodeId::Field(id),
            MemberId::Procedure(id) => TreeNodeId::Procedure(id),
            MemberId::Constructor(id) => TreeNodeId::Constructor(id),
        }
    }
}

impl From<NamedNodeId> for TreeNodeId {
    fn from(node: NamedNodeId) -> Self {
        match node {
            NamedNodeId::Library(id) => TreeNodeId::Library(id),
            NamedNodeId::Class(id) => TreeNodeId::Class(id),
            NamedNodeId::Field(id) => TreeNodeId::Field(id),
            NamedNodeId::Procedure(id) => TreeNodeId::Procedure(id),
            NamedNodeId::Constructor(id) => TreeNodeId::Constructor(id),
        }
    }
}

impl From<MemberOwner> for TreeNodeId {
    fn from(owner: MemberOwner) -> Self {
        match owner {
            MemberOwner::Library(id) => TreeNodeId::Library(id),
            MemberOwner::Class(id) => TreeNodeId::Class(id),
        }
    }
}

impl From<MemberOwner> for NamedNodeId {
    fn from(owner: MemberOwner) -> Self {
        match owner {
            MemberOwner::Library(id) => NamedNodeId::Library(id),
            MemberOwner::Class(id) => NamedNodeId::Class(id),
        }
    }
}
