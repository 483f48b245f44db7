//! Flag words carried by declarations and a few expressions.
//!
//! Bit positions match the binary format, so the writer emits `bits()`
//! directly and the reader uses `from_bits_retain`.

use bitflags::bitflags;

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct LibraryFlags: u8 {
        const EXTERNAL = 1 << 0;
        const SYNTHETIC = 1 << 1;
        const NON_NULLABLE_BY_DEFAULT = 1 << 2;
        const NNBD_MODE_BIT_0 = 1 << 3;
        const NNBD_MODE_BIT_1 = 1 << 4;
    }
}

bitflags! {
    /// The two low bits hold the class level; new classes start fully loaded.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ClassFlags: u8 {
        const LEVEL_BIT_0 = 1 << 0;
        const LEVEL_BIT_1 = 1 << 1;
        const ABSTRACT = 1 << 2;
        const ENUM = 1 << 3;
        const ANONYMOUS_MIXIN = 1 << 4;
        const ELIMINATED_MIXIN = 1 << 5;
        const MIXIN_DECLARATION = 1 << 6;
        const HAS_CONST_CONSTRUCTOR = 1 << 7;

        const BODY_LEVEL = Self::LEVEL_BIT_0.bits() | Self::LEVEL_BIT_1.bits();
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct FieldFlags: u32 {
        const FINAL = 1 << 0;
        const CONST = 1 << 1;
        const STATIC = 1 << 2;
        const HAS_IMPLICIT_GETTER = 1 << 3;
        const HAS_IMPLICIT_SETTER = 1 << 4;
        const COVARIANT = 1 << 5;
        const GENERIC_COVARIANT_IMPL = 1 << 6;
        const LATE = 1 << 7;
        const EXTENSION_MEMBER = 1 << 8;
        const NON_NULLABLE_BY_DEFAULT = 1 << 9;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ProcedureFlags: u32 {
        const STATIC = 1 << 0;
        const ABSTRACT = 1 << 1;
        const EXTERNAL = 1 << 2;
        const CONST = 1 << 3;
        const FORWARDING_STUB = 1 << 4;
        const FORWARDING_SEMI_STUB = 1 << 5;
        const REDIRECTING_FACTORY_CONSTRUCTOR = 1 << 6;
        const NO_SUCH_METHOD_FORWARDER = 1 << 7;
        const EXTENSION_MEMBER = 1 << 8;
        const MEMBER_SIGNATURE = 1 << 9;
        const NON_NULLABLE_BY_DEFAULT = 1 << 10;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
    pub struct ConstructorFlags: u8 {
        const CONST = 1 << 0;
        const EXTERNAL = 1 << 1;
        const SYNTHETIC = 1 << 2;
        const NON_NULLABLE_BY_DEFAULT = 1 << 3;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct VariableFlags: u8 {
        const FINAL = 1 << 0;
        const CONST = 1 << 1;
        const FIELD_FORMAL = 1 << 2;
        const COVARIANT = 1 << 3;
        const IN_SCOPE = 1 << 4;
        const GENERIC_COVARIANT_IMPL = 1 << 5;
        const LATE = 1 << 6;
        const REQUIRED = 1 << 7;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TryCatchFlags: u8 {
        /// Recomputed from the catch clauses whenever the node is written.
        const ANY_CATCH_NEEDS_STACK_TRACE = 1 << 0;
        const SYNTHESIZED = 1 << 1;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct IsExpressionFlags: u8 {
        const FOR_NON_NULLABLE_BY_DEFAULT = 1 << 0;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct AsExpressionFlags: u8 {
        const TYPE_ERROR = 1 << 0;
        const COVARIANCE_CHECK = 1 << 1;
        const FOR_DYNAMIC = 1 << 2;
        const FOR_NON_NULLABLE_BY_DEFAULT = 1 << 3;
    }
}

bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct TypeParameterFlags: u8 {
        const GENERIC_COVARIANT_IMPL = 1 << 0;
    }
}

impl Default for LibraryFlags {
    fn default() -> Self {
        LibraryFlags::NON_NULLABLE_BY_DEFAULT
    }
}

impl Default for ClassFlags {
    fn default() -> Self {
        ClassFlags::BODY_LEVEL
    }
}

impl Default for FieldFlags {
    fn default() -> Self {
        FieldFlags::NON_NULLABLE_BY_DEFAULT
    }
}

impl Default for ProcedureFlags {
    fn default() -> Self {
        ProcedureFlags::NON_NULLABLE_BY_DEFAULT
    }
}

impl Default for ConstructorFlags {
    fn default() -> Self {
        ConstructorFlags::NON_NULLABLE_BY_DEFAULT
    }
}
