//! Expression nodes.
//!
//! Sub-expressions are referenced by [`ExprId`]; they are children of the
//! expression that holds the id. Everything else an expression points at
//! (variables, targets, labels) is a plain back-reference.

use crate::{
    AsExpressionFlags, DartType, ExprId, FileOffset, IsExpressionFlags, Name, Reference, StmtId,
    VariableId,
};

#[derive(Clone, PartialEq, Debug)]
pub struct Expression {
    pub kind: ExprKind,
    pub file_offset: FileOffset,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Expression {
            kind,
            file_offset: FileOffset::NONE,
        }
    }

    pub fn at(kind: ExprKind, file_offset: FileOffset) -> Self {
        Expression { kind, file_offset }
    }
}

impl From<ExprKind> for Expression {
    fn from(kind: ExprKind) -> Self {
        Expression::new(kind)
    }
}

#[derive(Clone, PartialEq, Debug)]
pub enum ExprKind {
    /// Placeholder for code that failed to compile.
    Invalid(String),
    VariableGet(VariableGet),
    VariableSet(VariableSet),
    PropertyGet(PropertyGet),
    PropertySet(PropertySet),
    StaticGet(Reference),
    StaticSet(StaticSet),
    MethodInvocation(MethodInvocation),
    StaticInvocation(StaticInvocation),
    ConstructorInvocation(ConstructorInvocation),
    Not(ExprId),
    Logical(LogicalExpression),
    Conditional(ConditionalExpression),
    StringConcatenation(Vec<ExprId>),
    Is(IsExpression),
    As(AsExpression),
    StringLiteral(String),
    IntLiteral(i64),
    DoubleLiteral(f64),
    BoolLiteral(bool),
    NullLiteral,
    ListLiteral(ListLiteral),
    This,
    Throw(ExprId),
    /// `e!`
    NullCheck(ExprId),
    Block(BlockExpression),
}

#[derive(Clone, PartialEq, Debug)]
pub struct VariableGet {
    pub variable: VariableId,
    pub promoted_type: Option<DartType>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct VariableSet {
    pub variable: VariableId,
    pub value: ExprId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PropertyGet {
    pub receiver: ExprId,
    pub name: Name,
    pub interface_target: Option<Reference>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct PropertySet {
    pub receiver: ExprId,
    pub name: Name,
    pub value: ExprId,
    pub interface_target: Option<Reference>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct StaticSet {
    pub target: Reference,
    pub value: ExprId,
}

/// Call arguments; every expression in here is a child of the invocation.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Arguments {
    pub type_arguments: Vec<DartType>,
    pub positional: Vec<ExprId>,
    pub named: Vec<NamedExpression>,
}

impl Arguments {
    pub fn positional(positional: Vec<ExprId>) -> Self {
        Arguments {
            positional,
            ..Arguments::default()
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.positional
            .iter()
            .copied()
            .chain(self.named.iter().map(|named| named.value))
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct NamedExpression {
    pub name: String,
    pub value: ExprId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct MethodInvocation {
    pub receiver: ExprId,
    pub name: Name,
    pub arguments: Arguments,
    pub interface_target: Option<Reference>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct StaticInvocation {
    pub target: Reference,
    pub arguments: Arguments,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ConstructorInvocation {
    pub target: Reference,
    pub arguments: Arguments,
    pub is_const: bool,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LogicalOperator {
    And,
    Or,
}

impl LogicalOperator {
    pub const fn to_byte(self) -> u8 {
        match self {
            LogicalOperator::And => 0,
            LogicalOperator::Or => 1,
        }
    }

    pub const fn from_byte(byte: u8) -> Option<LogicalOperator> {
        match byte {
            0 => Some(LogicalOperator::And),
            1 => Some(LogicalOperator::Or),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Debug)]
pub struct LogicalExpression {
    pub left: ExprId,
    pub operator: LogicalOperator,
    pub right: ExprId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ConditionalExpression {
    pub condition: ExprId,
    pub then: ExprId,
    pub otherwise: ExprId,
    pub static_type: Option<DartType>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct IsExpression {
    pub operand: ExprId,
    pub target_type: DartType,
    pub flags: IsExpressionFlags,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AsExpression {
    pub operand: ExprId,
    pub target_type: DartType,
    pub flags: AsExpressionFlags,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ListLiteral {
    pub type_argument: DartType,
    pub values: Vec<ExprId>,
    pub is_const: bool,
}

/// Statements evaluated for effect followed by a value, `{ s1; s2; } => e`.
#[derive(Clone, PartialEq, Debug)]
pub struct BlockExpression {
    pub body: Vec<StmtId>,
    pub value: ExprId,
}
