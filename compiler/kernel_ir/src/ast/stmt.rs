//! Statement nodes and variable declarations.

use crate::{DartType, ExprId, FileOffset, StmtId, TryCatchFlags, VariableFlags, VariableId};

#[derive(Clone, PartialEq, Debug)]
pub struct Statement {
    pub kind: StmtKind,
    pub file_offset: FileOffset,
}

impl Statement {
    pub fn new(kind: StmtKind) -> Self {
        Statement {
            kind,
            file_offset: FileOffset::NONE,
        }
    }

    pub fn at(kind: StmtKind, file_offset: FileOffset) -> Self {
        Statement { kind, file_offset }
    }
}

impl From<StmtKind> for Statement {
    fn from(kind: StmtKind) -> Self {
        Statement::new(kind)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum StmtKind {
    Expression(ExprId),
    Block(Vec<StmtId>),
    Empty,
    Assert(AssertStatement),
    /// A statement that `break` can target.
    Labeled(StmtId),
    /// Jumps out of the enclosing labeled statement `target`.
    Break(StmtId),
    While(WhileStatement),
    Do(DoStatement),
    If(IfStatement),
    Return(Option<ExprId>),
    TryCatch(TryCatch),
    TryFinally(TryFinally),
    VariableDeclaration(VariableId),
}

#[derive(Clone, PartialEq, Debug)]
pub struct AssertStatement {
    pub condition: ExprId,
    pub message: Option<ExprId>,
    pub condition_start_offset: FileOffset,
    pub condition_end_offset: FileOffset,
}

#[derive(Clone, PartialEq, Debug)]
pub struct WhileStatement {
    pub condition: ExprId,
    pub body: StmtId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DoStatement {
    pub body: StmtId,
    pub condition: ExprId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct IfStatement {
    pub condition: ExprId,
    pub then: StmtId,
    pub otherwise: Option<StmtId>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TryCatch {
    pub body: StmtId,
    pub catches: Vec<Catch>,
    pub flags: TryCatchFlags,
}

impl TryCatch {
    /// Flags as they are written: the stack-trace bit reflects the clauses.
    pub fn effective_flags(&self) -> TryCatchFlags {
        let mut flags = self.flags;
        flags.set(
            TryCatchFlags::ANY_CATCH_NEEDS_STACK_TRACE,
            self.catches.iter().any(|c| c.stack_trace.is_some()),
        );
        flags
    }
}

/// One `on T catch (e, s)` clause. Opens its own variable scope.
#[derive(Clone, PartialEq, Debug)]
pub struct Catch {
    pub file_offset: FileOffset,
    pub guard: DartType,
    pub exception: Option<VariableId>,
    pub stack_trace: Option<VariableId>,
    pub body: StmtId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct TryFinally {
    pub body: StmtId,
    pub finalizer: StmtId,
}

/// A local variable or parameter.
#[derive(Clone, PartialEq, Debug)]
pub struct VariableDeclaration {
    pub name: Option<String>,
    pub ty: DartType,
    pub initializer: Option<ExprId>,
    pub flags: VariableFlags,
    pub annotations: Vec<ExprId>,
    pub file_offset: FileOffset,
    pub file_equals_offset: FileOffset,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, ty: DartType) -> Self {
        VariableDeclaration {
            name: Some(name.into()),
            ty,
            initializer: None,
            flags: VariableFlags::empty(),
            annotations: Vec::new(),
            file_offset: FileOffset::NONE,
            file_equals_offset: FileOffset::NONE,
        }
    }

    #[must_use]
    pub fn with_initializer(mut self, initializer: ExprId) -> Self {
        self.initializer = Some(initializer);
        self
    }
}
