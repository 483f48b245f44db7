use kernel_ir::{
    Arguments, AsExpression, AsExpressionFlags, BlockExpression, ConditionalExpression,
    ConstructorInvocation, ExprId, ExprKind, Expression, FieldInitializer, FileOffset,
    Initializer, InitializerId, InitializerKind, IsExpression, IsExpressionFlags, ListLiteral,
    LogicalExpression, LogicalOperator, MethodInvocation, NamedExpression, PropertyGet,
    PropertySet, RedirectingInitializer, StaticInvocation, StaticSet, SuperInitializer,
    VariableGet, VariableId, VariableSet,
};

use super::KernelReader;
use crate::stack::ensure_sufficient_stack;
use crate::tags;
use crate::ReadError;

impl KernelReader<'_> {
    pub(super) fn read_expr(&mut self) -> Result<ExprId, ReadError> {
        ensure_sufficient_stack(|| self.read_expression())
    }

    pub(super) fn read_exprs(&mut self) -> Result<Vec<ExprId>, ReadError> {
        self.read_list(Self::read_expr)
    }

    /// Variable in scope at `slot`.
    fn variable(&self, slot: u32, offset: usize) -> Result<VariableId, ReadError> {
        self.variables
            .get(slot as usize)
            .copied()
            .ok_or_else(|| Self::out_of_range("variable", slot, self.variables.len(), offset))
    }

    fn read_arguments(&mut self) -> Result<Arguments, ReadError> {
        let count_offset = self.cursor.offset();
        let count = self.read_uint()?;
        let arguments = Arguments {
            type_arguments: self.read_types()?,
            positional: self.read_exprs()?,
            named: self.read_list(|r| {
                Ok(NamedExpression {
                    name: r.read_string_ref()?,
                    value: r.read_expr()?,
                })
            })?,
        };
        if count as usize != arguments.len() {
            return Err(ReadError::Malformed {
                message: format!(
                    "argument count {count} does not match {} arguments",
                    arguments.len()
                ),
                offset: count_offset,
            });
        }
        Ok(arguments)
    }

    fn read_expression(&mut self) -> Result<ExprId, ReadError> {
        let offset = self.cursor.offset();
        let tag = self.read_byte()?;
        let (base, payload) = tags::split_specialized(tag);
        let expression = match base {
            tags::INVALID_EXPRESSION => {
                let at = self.read_offset()?;
                Expression::at(ExprKind::Invalid(self.read_string_ref()?), at)
            }
            tags::VARIABLE_GET => {
                let at = self.read_offset()?;
                let _declaration = self.read_uint()?;
                let slot_offset = self.cursor.offset();
                let slot = self.read_uint()?;
                let variable = self.variable(slot, slot_offset)?;
                let promoted_type = self.read_option(Self::read_type)?;
                Expression::at(
                    ExprKind::VariableGet(VariableGet {
                        variable,
                        promoted_type,
                    }),
                    at,
                )
            }
            tags::SPECIALIZED_VARIABLE_GET => {
                let variable = self.variable(u32::from(payload), offset)?;
                let at = self.read_offset()?;
                let _declaration = self.read_uint()?;
                Expression::at(
                    ExprKind::VariableGet(VariableGet {
                        variable,
                        promoted_type: None,
                    }),
                    at,
                )
            }
            tags::VARIABLE_SET => {
                let at = self.read_offset()?;
                let _declaration = self.read_uint()?;
                let slot_offset = self.cursor.offset();
                let slot = self.read_uint()?;
                let variable = self.variable(slot, slot_offset)?;
                let value = self.read_expr()?;
                Expression::at(ExprKind::VariableSet(VariableSet { variable, value }), at)
            }
            tags::SPECIALIZED_VARIABLE_SET => {
                let variable = self.variable(u32::from(payload), offset)?;
                let at = self.read_offset()?;
                let _declaration = self.read_uint()?;
                let value = self.read_expr()?;
                Expression::at(ExprKind::VariableSet(VariableSet { variable, value }), at)
            }
            tags::PROPERTY_GET => {
                let at = self.read_offset()?;
                let receiver = self.read_expr()?;
                let name = self.read_name()?;
                let interface_target = self.read_optional_reference()?;
                Expression::at(
                    ExprKind::PropertyGet(PropertyGet {
                        receiver,
                        name,
                        interface_target,
                    }),
                    at,
                )
            }
            tags::PROPERTY_SET => {
                let at = self.read_offset()?;
                let receiver = self.read_expr()?;
                let name = self.read_name()?;
                let value = self.read_expr()?;
                let interface_target = self.read_optional_reference()?;
                Expression::at(
                    ExprKind::PropertySet(PropertySet {
                        receiver,
                        name,
                        value,
                        interface_target,
                    }),
                    at,
                )
            }
            tags::STATIC_GET => {
                let at = self.read_offset()?;
                let target = self.read_reference("static get target")?;
                Expression::at(ExprKind::StaticGet(target), at)
            }
            tags::STATIC_SET => {
                let at = self.read_offset()?;
                let target = self.read_reference("static set target")?;
                let value = self.read_expr()?;
                Expression::at(ExprKind::StaticSet(StaticSet { target, value }), at)
            }
            tags::METHOD_INVOCATION => {
                let at = self.read_offset()?;
                let receiver = self.read_expr()?;
                let name = self.read_name()?;
                let arguments = self.read_arguments()?;
                let interface_target = self.read_optional_reference()?;
                Expression::at(
                    ExprKind::MethodInvocation(MethodInvocation {
                        receiver,
                        name,
                        arguments,
                        interface_target,
                    }),
                    at,
                )
            }
            tags::STATIC_INVOCATION => {
                let at = self.read_offset()?;
                let target = self.read_reference("static invocation target")?;
                let arguments = self.read_arguments()?;
                Expression::at(
                    ExprKind::StaticInvocation(StaticInvocation { target, arguments }),
                    at,
                )
            }
            tags::CONSTRUCTOR_INVOCATION | tags::CONST_CONSTRUCTOR_INVOCATION => {
                let at = self.read_offset()?;
                let target = self.read_reference("constructor invocation target")?;
                let arguments = self.read_arguments()?;
                Expression::at(
                    ExprKind::ConstructorInvocation(ConstructorInvocation {
                        target,
                        arguments,
                        is_const: base == tags::CONST_CONSTRUCTOR_INVOCATION,
                    }),
                    at,
                )
            }
            tags::NOT => Expression::new(ExprKind::Not(self.read_expr()?)),
            tags::LOGICAL_EXPRESSION => {
                let left = self.read_expr()?;
                let operator_byte = self.read_byte()?;
                let operator = LogicalOperator::from_byte(operator_byte).ok_or_else(|| {
                    self.malformed(format!("unknown logical operator {operator_byte}"))
                })?;
                let right = self.read_expr()?;
                Expression::new(ExprKind::Logical(LogicalExpression {
                    left,
                    operator,
                    right,
                }))
            }
            tags::CONDITIONAL_EXPRESSION => {
                let condition = self.read_expr()?;
                let then = self.read_expr()?;
                let otherwise = self.read_expr()?;
                let static_type = self.read_option(Self::read_type)?;
                Expression::new(ExprKind::Conditional(ConditionalExpression {
                    condition,
                    then,
                    otherwise,
                    static_type,
                }))
            }
            tags::STRING_CONCATENATION => {
                let at = self.read_offset()?;
                Expression::at(ExprKind::StringConcatenation(self.read_exprs()?), at)
            }
            tags::IS_EXPRESSION => {
                let at = self.read_offset()?;
                let flags = IsExpressionFlags::from_bits_retain(self.read_byte()?);
                let operand = self.read_expr()?;
                let target_type = self.read_type()?;
                Expression::at(
                    ExprKind::Is(IsExpression {
                        operand,
                        target_type,
                        flags,
                    }),
                    at,
                )
            }
            tags::AS_EXPRESSION => {
                let at = self.read_offset()?;
                let flags = AsExpressionFlags::from_bits_retain(self.read_byte()?);
                let operand = self.read_expr()?;
                let target_type = self.read_type()?;
                Expression::at(
                    ExprKind::As(AsExpression {
                        operand,
                        target_type,
                        flags,
                    }),
                    at,
                )
            }
            tags::STRING_LITERAL => {
                Expression::new(ExprKind::StringLiteral(self.read_string_ref()?))
            }
            tags::SPECIALIZED_INT_LITERAL => Expression::new(ExprKind::IntLiteral(
                i64::from(payload) - tags::SPECIALIZED_INT_LITERAL_BIAS,
            )),
            tags::POSITIVE_INT_LITERAL => {
                Expression::new(ExprKind::IntLiteral(i64::from(self.read_uint()?)))
            }
            tags::NEGATIVE_INT_LITERAL => {
                Expression::new(ExprKind::IntLiteral(-i64::from(self.read_uint()?)))
            }
            tags::BIG_INT_LITERAL => {
                let text = self.read_string_ref()?;
                let value = text.parse::<i64>().map_err(|_| {
                    self.malformed(format!("integer literal `{text}` does not fit in 64 bits"))
                })?;
                Expression::new(ExprKind::IntLiteral(value))
            }
            tags::DOUBLE_LITERAL => {
                Expression::new(ExprKind::DoubleLiteral(self.cursor.read_double()?))
            }
            tags::TRUE_LITERAL => Expression::new(ExprKind::BoolLiteral(true)),
            tags::FALSE_LITERAL => Expression::new(ExprKind::BoolLiteral(false)),
            tags::NULL_LITERAL => Expression::new(ExprKind::NullLiteral),
            tags::LIST_LITERAL | tags::CONST_LIST_LITERAL => {
                let at = self.read_offset()?;
                let type_argument = self.read_type()?;
                let values = self.read_exprs()?;
                Expression::at(
                    ExprKind::ListLiteral(ListLiteral {
                        type_argument,
                        values,
                        is_const: base == tags::CONST_LIST_LITERAL,
                    }),
                    at,
                )
            }
            tags::THIS_EXPRESSION => Expression::new(ExprKind::This),
            tags::THROW => {
                let at = self.read_offset()?;
                Expression::at(ExprKind::Throw(self.read_expr()?), at)
            }
            tags::NULL_CHECK => {
                let at = self.read_offset()?;
                Expression::at(ExprKind::NullCheck(self.read_expr()?), at)
            }
            tags::BLOCK_EXPRESSION => {
                let height = self.variables.len();
                let body = self.read_list(Self::read_stmt)?;
                let value = self.read_expr()?;
                self.variables.truncate(height);
                Expression::new(ExprKind::Block(BlockExpression { body, value }))
            }
            _ => {
                return Err(ReadError::UnexpectedTag {
                    kind: "expression",
                    tag,
                    offset,
                })
            }
        };
        Ok(self.component.tree.alloc(expression))
    }

    pub(super) fn read_initializer(&mut self) -> Result<InitializerId, ReadError> {
        let offset = self.cursor.offset();
        let tag = self.read_byte()?;
        let is_synthetic = self.cursor.read_bool()?;
        let (kind, file_offset) = match tag {
            tags::FIELD_INITIALIZER => {
                let field = self.read_reference("initialized field")?;
                let value = self.read_expr()?;
                (
                    InitializerKind::Field(FieldInitializer { field, value }),
                    FileOffset::NONE,
                )
            }
            tags::SUPER_INITIALIZER => {
                let at = self.read_offset()?;
                let target = self.read_reference("initializer target")?;
                let arguments = self.read_arguments()?;
                (
                    InitializerKind::Super(SuperInitializer { target, arguments }),
                    at,
                )
            }
            tags::REDIRECTING_INITIALIZER => {
                let at = self.read_offset()?;
                let target = self.read_reference("initializer target")?;
                let arguments = self.read_arguments()?;
                (
                    InitializerKind::Redirecting(RedirectingInitializer { target, arguments }),
                    at,
                )
            }
            _ => {
                return Err(ReadError::UnexpectedTag {
                    kind: "initializer",
                    tag,
                    offset,
                })
            }
        };
        Ok(self.component.tree.alloc(Initializer {
            kind,
            is_synthetic,
            file_offset,
        }))
    }
}
