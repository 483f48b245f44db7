//! Dart types.
//!
//! Types are values, not tree nodes: they are cloned freely and never carry
//! a parent. A type refers to a class through its [`Reference`] and to a
//! type parameter through the parameter's arena id.

use crate::{ExprId, Reference, TypeParameterFlags, TypeParameterId};

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Nullability {
    /// Undetermined, for type parameters whose bound is nullable.
    Neither,
    Nullable,
    NonNullable,
    /// Pre-null-safety code.
    Legacy,
}

impl Nullability {
    pub const fn to_byte(self) -> u8 {
        match self {
            Nullability::Neither => 0,
            Nullability::Nullable => 1,
            Nullability::NonNullable => 2,
            Nullability::Legacy => 3,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Nullability> {
        match byte {
            0 => Some(Nullability::Neither),
            1 => Some(Nullability::Nullable),
            2 => Some(Nullability::NonNullable),
            3 => Some(Nullability::Legacy),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum DartType {
    Invalid,
    Dynamic,
    Void,
    Bottom,
    Never(Nullability),
    Interface(InterfaceType),
    TypeParameter(TypeParameterType),
}

impl DartType {
    /// Interface type without type arguments.
    pub fn interface(class: Reference, nullability: Nullability) -> DartType {
        DartType::Interface(InterfaceType {
            nullability,
            class,
            type_arguments: Vec::new(),
        })
    }

    pub fn nullability(&self) -> Option<Nullability> {
        match self {
            DartType::Never(n) => Some(*n),
            DartType::Interface(ty) => Some(ty.nullability),
            DartType::TypeParameter(ty) => Some(ty.nullability),
            DartType::Invalid | DartType::Dynamic | DartType::Void | DartType::Bottom => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct InterfaceType {
    pub nullability: Nullability,
    pub class: Reference,
    pub type_arguments: Vec<DartType>,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeParameterType {
    pub nullability: Nullability,
    pub parameter: TypeParameterId,
    /// Promoted bound, when narrower than the declared one.
    pub bound: Option<Box<DartType>>,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Variance {
    Unrelated,
    Covariant,
    Contravariant,
    #[default]
    Invariant,
}

impl Variance {
    pub const fn to_byte(self) -> u8 {
        match self {
            Variance::Unrelated => 0,
            Variance::Covariant => 1,
            Variance::Contravariant => 2,
            Variance::Invariant => 3,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<Variance> {
        match byte {
            0 => Some(Variance::Unrelated),
            1 => Some(Variance::Covariant),
            2 => Some(Variance::Contravariant),
            3 => Some(Variance::Invariant),
            _ => None,
        }
    }
}

/// Declaration of a class or function type parameter.
#[derive(Clone, PartialEq, Debug)]
pub struct TypeParameter {
    pub name: Option<String>,
    pub flags: TypeParameterFlags,
    pub variance: Variance,
    pub annotations: Vec<ExprId>,
    pub bound: DartType,
    pub default_type: Option<DartType>,
}

impl TypeParameter {
    pub fn new(name: impl Into<String>) -> Self {
        TypeParameter {
            name: Some(name.into()),
            flags: TypeParameterFlags::empty(),
            variance: Variance::default(),
            annotations: Vec::new(),
            bound: DartType::Dynamic,
            default_type: None,
        }
    }
}
