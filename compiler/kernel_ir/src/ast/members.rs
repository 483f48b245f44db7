//! Libraries, classes, and members.

use crate::{
    Arguments, ClassFlags, ClassId, ConstructorFlags, ConstructorId, DartType, ExprId,
    FieldFlags, FieldId, FileOffset, FunctionId, InitializerId, LanguageVersion, LibraryFlags,
    ProcedureFlags, ProcedureId, Reference, TypeParameterId, Uri,
};

/// Member name. Names starting with `_` are private to a library and only
/// compare equal within it.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Name {
    pub text: String,
    /// Owning library of a private name.
    pub library: Option<Reference>,
}

impl Name {
    pub fn new(text: impl Into<String>) -> Self {
        Name {
            text: text.into(),
            library: None,
        }
    }

    pub fn private(text: impl Into<String>, library: Reference) -> Self {
        Name {
            text: text.into(),
            library: Some(library),
        }
    }

    #[inline]
    pub fn is_private(&self) -> bool {
        self.text.starts_with('_')
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Library {
    pub reference: Reference,
    pub name: Option<String>,
    pub file_uri: Option<Uri>,
    pub flags: LibraryFlags,
    pub language_version: LanguageVersion,
    pub annotations: Vec<ExprId>,
    pub classes: Vec<ClassId>,
    pub fields: Vec<FieldId>,
    pub procedures: Vec<ProcedureId>,
    /// Files that contributed to the library, beyond `file_uri`.
    pub source_uris: Vec<Uri>,
}

impl Library {
    pub fn new(reference: Reference, language_version: LanguageVersion) -> Self {
        Library {
            reference,
            name: None,
            file_uri: None,
            flags: LibraryFlags::default(),
            language_version,
            annotations: Vec::new(),
            classes: Vec::new(),
            fields: Vec::new(),
            procedures: Vec::new(),
            source_uris: Vec::new(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Class {
    pub reference: Reference,
    pub name: String,
    pub file_uri: Option<Uri>,
    pub flags: ClassFlags,
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub annotations: Vec<ExprId>,
    pub type_parameters: Vec<TypeParameterId>,
    pub supertype: Option<DartType>,
    pub mixed_in_type: Option<DartType>,
    pub implemented_types: Vec<DartType>,
    pub fields: Vec<FieldId>,
    pub constructors: Vec<ConstructorId>,
    pub procedures: Vec<ProcedureId>,
}

impl Class {
    pub fn new(reference: Reference, name: impl Into<String>) -> Self {
        Class {
            reference,
            name: name.into(),
            file_uri: None,
            flags: ClassFlags::default(),
            start_file_offset: FileOffset::NONE,
            file_offset: FileOffset::NONE,
            file_end_offset: FileOffset::NONE,
            annotations: Vec::new(),
            type_parameters: Vec::new(),
            supertype: None,
            mixed_in_type: None,
            implemented_types: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
            procedures: Vec::new(),
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub reference: Reference,
    pub name: Name,
    pub ty: DartType,
    pub initializer: Option<ExprId>,
    pub flags: FieldFlags,
    pub file_uri: Option<Uri>,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub annotations: Vec<ExprId>,
}

impl Field {
    pub fn new(reference: Reference, name: Name, ty: DartType) -> Self {
        Field {
            reference,
            name,
            ty,
            initializer: None,
            flags: FieldFlags::default(),
            file_uri: None,
            file_offset: FileOffset::NONE,
            file_end_offset: FileOffset::NONE,
            annotations: Vec::new(),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ProcedureKind {
    Method,
    Getter,
    Setter,
    Operator,
    Factory,
}

impl ProcedureKind {
    pub const fn to_byte(self) -> u8 {
        match self {
            ProcedureKind::Method => 0,
            ProcedureKind::Getter => 1,
            ProcedureKind::Setter => 2,
            ProcedureKind::Operator => 3,
            ProcedureKind::Factory => 4,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<ProcedureKind> {
        match byte {
            0 => Some(ProcedureKind::Method),
            1 => Some(ProcedureKind::Getter),
            2 => Some(ProcedureKind::Setter),
            3 => Some(ProcedureKind::Operator),
            4 => Some(ProcedureKind::Factory),
            _ => None,
        }
    }

    /// Canonical-name segment the procedure is filed under.
    pub const fn name_segment(self) -> &'static str {
        match self {
            ProcedureKind::Method | ProcedureKind::Operator => "@methods",
            ProcedureKind::Getter => "@getters",
            ProcedureKind::Setter => "@setters",
            ProcedureKind::Factory => "@factories",
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Procedure {
    pub reference: Reference,
    pub name: Name,
    pub kind: ProcedureKind,
    /// Absent for abstract and external procedures.
    pub function: Option<FunctionId>,
    pub flags: ProcedureFlags,
    pub file_uri: Option<Uri>,
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub annotations: Vec<ExprId>,
}

impl Procedure {
    pub fn new(
        reference: Reference,
        kind: ProcedureKind,
        name: Name,
        function: Option<FunctionId>,
    ) -> Self {
        Procedure {
            reference,
            name,
            kind,
            function,
            flags: ProcedureFlags::default(),
            file_uri: None,
            start_file_offset: FileOffset::NONE,
            file_offset: FileOffset::NONE,
            file_end_offset: FileOffset::NONE,
            annotations: Vec::new(),
        }
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.flags.contains(ProcedureFlags::STATIC)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct Constructor {
    pub reference: Reference,
    pub name: Name,
    pub function: FunctionId,
    pub initializers: Vec<InitializerId>,
    pub flags: ConstructorFlags,
    pub file_uri: Option<Uri>,
    pub start_file_offset: FileOffset,
    pub file_offset: FileOffset,
    pub file_end_offset: FileOffset,
    pub annotations: Vec<ExprId>,
}

impl Constructor {
    pub fn new(reference: Reference, name: Name, function: FunctionId) -> Self {
        Constructor {
            reference,
            name,
            function,
            initializers: Vec::new(),
            flags: ConstructorFlags::default(),
            file_uri: None,
            start_file_offset: FileOffset::NONE,
            file_offset: FileOffset::NONE,
            file_end_offset: FileOffset::NONE,
            annotations: Vec::new(),
        }
    }
}

/// Entry of a constructor's initializer list. Runs with the constructor's
/// parameters in scope.
#[derive(Clone, PartialEq, Debug)]
pub struct Initializer {
    pub kind: InitializerKind,
    pub is_synthetic: bool,
    pub file_offset: FileOffset,
}

impl Initializer {
    pub fn new(kind: InitializerKind) -> Self {
        Initializer {
            kind,
            is_synthetic: false,
            file_offset: FileOffset::NONE,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum InitializerKind {
    Field(FieldInitializer),
    Super(SuperInitializer),
    Redirecting(RedirectingInitializer),
}

/// `this.field = value`
#[derive(Clone, PartialEq, Debug)]
pub struct FieldInitializer {
    pub field: Reference,
    pub value: ExprId,
}

/// `super(...)`
#[derive(Clone, PartialEq, Debug)]
pub struct SuperInitializer {
    pub target: Reference,
    pub arguments: Arguments,
}

/// `this(...)`
#[derive(Clone, PartialEq, Debug)]
pub struct RedirectingInitializer {
    pub target: Reference,
    pub arguments: Arguments,
}
