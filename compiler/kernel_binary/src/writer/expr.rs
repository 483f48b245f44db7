use kernel_ir::visitor::{ExpressionVisitor, InitializerVisitor};
use kernel_ir::{
    Arguments, AsExpression, BlockExpression, ConditionalExpression, ConstructorInvocation, ExprId,
    FieldInitializer, FileOffset, InitializerId, IsExpression, ListLiteral, LogicalExpression,
    MethodInvocation, PropertyGet, PropertySet, RedirectingInitializer, Reference,
    StaticInvocation, StaticSet, SuperInitializer, VariableGet, VariableId, VariableSet,
};

use super::KernelWriter;
use crate::codec::MAX_UINT;
use crate::tags;
use crate::WriteError;

impl<'a> KernelWriter<'a> {
    pub(super) fn write_arguments(&mut self, arguments: &'a Arguments) -> Result<(), WriteError> {
        self.sink.write_len(arguments.len(), "argument count")?;
        self.write_types(&arguments.type_arguments)?;
        self.write_exprs(&arguments.positional)?;
        self.write_list(&arguments.named, "named argument count", |w, named| {
            w.write_string_ref(&named.name)?;
            w.write_expr(named.value)
        })
    }

    /// Slot and declaration offset of a variable in scope.
    fn variable_position(&self, variable: VariableId) -> Result<(u32, u32), WriteError> {
        let not_in_scope = || WriteError::VariableNotInScope { variable };
        let slot = self.variables.slot(variable).ok_or_else(not_in_scope)?;
        let declaration = *self
            .declaration_offsets
            .get(&variable)
            .ok_or_else(not_in_scope)?;
        Ok((slot, declaration))
    }

    fn offset_of(&self, id: ExprId) -> FileOffset {
        self.tree.get(id).file_offset
    }

    /// Super and redirecting initializers share a layout.
    fn write_redirecting_initializer(
        &mut self,
        tag: u8,
        id: InitializerId,
        target: Reference,
        arguments: &'a Arguments,
    ) -> Result<(), WriteError> {
        let node = self.tree.get(id);
        self.sink.write_byte(tag);
        self.sink.write_bool(node.is_synthetic);
        self.sink.write_file_offset(node.file_offset)?;
        self.write_reference(target, "initializer target")?;
        self.write_arguments(arguments)
    }
}

impl<'a> ExpressionVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_expression(&mut self, _id: ExprId) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "expression" })
    }

    fn visit_invalid_expression(&mut self, id: ExprId, message: &'a str) -> Result<(), WriteError> {
        self.sink.write_byte(tags::INVALID_EXPRESSION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_string_ref(message)
    }

    fn visit_variable_get(&mut self, id: ExprId, node: &'a VariableGet) -> Result<(), WriteError> {
        let (slot, declaration) = self.variable_position(node.variable)?;
        let offset = self.offset_of(id);
        if slot < tags::SPECIALIZED_VARIABLE_LIMIT && node.promoted_type.is_none() {
            self.sink
                .write_byte(tags::SPECIALIZED_VARIABLE_GET + slot as u8);
            self.sink.write_file_offset(offset)?;
            self.sink.write_uint(declaration, "declaration offset")
        } else {
            self.sink.write_byte(tags::VARIABLE_GET);
            self.sink.write_file_offset(offset)?;
            self.sink.write_uint(declaration, "declaration offset")?;
            self.sink.write_uint(slot, "variable slot")?;
            self.write_option(node.promoted_type.as_ref(), Self::write_type)
        }
    }

    fn visit_variable_set(&mut self, id: ExprId, node: &'a VariableSet) -> Result<(), WriteError> {
        let (slot, declaration) = self.variable_position(node.variable)?;
        let offset = self.offset_of(id);
        if slot < tags::SPECIALIZED_VARIABLE_LIMIT {
            self.sink
                .write_byte(tags::SPECIALIZED_VARIABLE_SET + slot as u8);
            self.sink.write_file_offset(offset)?;
            self.sink.write_uint(declaration, "declaration offset")?;
        } else {
            self.sink.write_byte(tags::VARIABLE_SET);
            self.sink.write_file_offset(offset)?;
            self.sink.write_uint(declaration, "declaration offset")?;
            self.sink.write_uint(slot, "variable slot")?;
        }
        self.write_expr(node.value)
    }

    fn visit_property_get(&mut self, id: ExprId, node: &'a PropertyGet) -> Result<(), WriteError> {
        self.sink.write_byte(tags::PROPERTY_GET);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_expr(node.receiver)?;
        self.write_name(&node.name)?;
        self.write_optional_reference(node.interface_target, "interface target")
    }

    fn visit_property_set(&mut self, id: ExprId, node: &'a PropertySet) -> Result<(), WriteError> {
        self.sink.write_byte(tags::PROPERTY_SET);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_expr(node.receiver)?;
        self.write_name(&node.name)?;
        self.write_expr(node.value)?;
        self.write_optional_reference(node.interface_target, "interface target")
    }

    fn visit_static_get(&mut self, id: ExprId, target: Reference) -> Result<(), WriteError> {
        self.sink.write_byte(tags::STATIC_GET);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_reference(target, "static get target")
    }

    fn visit_static_set(&mut self, id: ExprId, node: &'a StaticSet) -> Result<(), WriteError> {
        self.sink.write_byte(tags::STATIC_SET);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_reference(node.target, "static set target")?;
        self.write_expr(node.value)
    }

    fn visit_method_invocation(
        &mut self,
        id: ExprId,
        node: &'a MethodInvocation,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::METHOD_INVOCATION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_expr(node.receiver)?;
        self.write_name(&node.name)?;
        self.write_arguments(&node.arguments)?;
        self.write_optional_reference(node.interface_target, "interface target")
    }

    fn visit_static_invocation(
        &mut self,
        id: ExprId,
        node: &'a StaticInvocation,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::STATIC_INVOCATION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_reference(node.target, "static invocation target")?;
        self.write_arguments(&node.arguments)
    }

    fn visit_constructor_invocation(
        &mut self,
        id: ExprId,
        node: &'a ConstructorInvocation,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(if node.is_const {
            tags::CONST_CONSTRUCTOR_INVOCATION
        } else {
            tags::CONSTRUCTOR_INVOCATION
        });
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_reference(node.target, "constructor invocation target")?;
        self.write_arguments(&node.arguments)
    }

    fn visit_not(&mut self, _id: ExprId, operand: ExprId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::NOT);
        self.write_expr(operand)
    }

    fn visit_logical_expression(
        &mut self,
        _id: ExprId,
        node: &'a LogicalExpression,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::LOGICAL_EXPRESSION);
        self.write_expr(node.left)?;
        self.sink.write_byte(node.operator.to_byte());
        self.write_expr(node.right)
    }

    fn visit_conditional_expression(
        &mut self,
        _id: ExprId,
        node: &'a ConditionalExpression,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::CONDITIONAL_EXPRESSION);
        self.write_expr(node.condition)?;
        self.write_expr(node.then)?;
        self.write_expr(node.otherwise)?;
        self.write_option(node.static_type.as_ref(), Self::write_type)
    }

    fn visit_string_concatenation(
        &mut self,
        id: ExprId,
        parts: &'a [ExprId],
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::STRING_CONCATENATION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_exprs(parts)
    }

    fn visit_is_expression(&mut self, id: ExprId, node: &'a IsExpression) -> Result<(), WriteError> {
        self.sink.write_byte(tags::IS_EXPRESSION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.sink.write_byte(node.flags.bits());
        self.write_expr(node.operand)?;
        self.write_type(&node.target_type)
    }

    fn visit_as_expression(&mut self, id: ExprId, node: &'a AsExpression) -> Result<(), WriteError> {
        self.sink.write_byte(tags::AS_EXPRESSION);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.sink.write_byte(node.flags.bits());
        self.write_expr(node.operand)?;
        self.write_type(&node.target_type)
    }

    fn visit_string_literal(&mut self, _id: ExprId, value: &'a str) -> Result<(), WriteError> {
        self.sink.write_byte(tags::STRING_LITERAL);
        self.write_string_ref(value)
    }

    fn visit_int_literal(&mut self, _id: ExprId, value: i64) -> Result<(), WriteError> {
        let bias = tags::SPECIALIZED_INT_LITERAL_BIAS;
        if (-bias..=i64::from(tags::SPECIALIZED_PAYLOAD_MASK) - bias).contains(&value) {
            self.sink
                .write_byte(tags::SPECIALIZED_INT_LITERAL + (value + bias) as u8);
        } else if value.unsigned_abs() <= u64::from(MAX_UINT) {
            let magnitude = value.unsigned_abs() as u32;
            self.sink.write_byte(if value < 0 {
                tags::NEGATIVE_INT_LITERAL
            } else {
                tags::POSITIVE_INT_LITERAL
            });
            self.sink.write_uint30(magnitude);
        } else {
            // Wider literals go through the string table.
            self.sink.write_byte(tags::BIG_INT_LITERAL);
            self.write_string_ref(&value.to_string())?;
        }
        Ok(())
    }

    fn visit_double_literal(&mut self, _id: ExprId, value: f64) -> Result<(), WriteError> {
        self.sink.write_byte(tags::DOUBLE_LITERAL);
        self.sink.write_double(value);
        Ok(())
    }

    fn visit_bool_literal(&mut self, _id: ExprId, value: bool) -> Result<(), WriteError> {
        self.sink.write_byte(if value {
            tags::TRUE_LITERAL
        } else {
            tags::FALSE_LITERAL
        });
        Ok(())
    }

    fn visit_null_literal(&mut self, _id: ExprId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::NULL_LITERAL);
        Ok(())
    }

    fn visit_list_literal(&mut self, id: ExprId, node: &'a ListLiteral) -> Result<(), WriteError> {
        self.sink.write_byte(if node.is_const {
            tags::CONST_LIST_LITERAL
        } else {
            tags::LIST_LITERAL
        });
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_type(&node.type_argument)?;
        self.write_exprs(&node.values)
    }

    fn visit_this(&mut self, _id: ExprId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::THIS_EXPRESSION);
        Ok(())
    }

    fn visit_throw(&mut self, id: ExprId, value: ExprId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::THROW);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_expr(value)
    }

    fn visit_null_check(&mut self, id: ExprId, operand: ExprId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::NULL_CHECK);
        self.sink.write_file_offset(self.offset_of(id))?;
        self.write_expr(operand)
    }

    fn visit_block_expression(
        &mut self,
        _id: ExprId,
        node: &'a BlockExpression,
    ) -> Result<(), WriteError> {
        self.variables.push_scope();
        self.sink.write_byte(tags::BLOCK_EXPRESSION);
        self.write_list(&node.body, "statement count", |w, &stmt| w.write_stmt(stmt))?;
        self.write_expr(node.value)?;
        self.variables.pop_scope();
        Ok(())
    }
}

impl<'a> InitializerVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_initializer(&mut self, _id: InitializerId) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "initializer" })
    }

    fn visit_field_initializer(
        &mut self,
        id: InitializerId,
        node: &'a FieldInitializer,
    ) -> Result<(), WriteError> {
        let is_synthetic = self.tree.get(id).is_synthetic;
        self.sink.write_byte(tags::FIELD_INITIALIZER);
        self.sink.write_bool(is_synthetic);
        self.write_reference(node.field, "initialized field")?;
        self.write_expr(node.value)
    }

    fn visit_super_initializer(
        &mut self,
        id: InitializerId,
        node: &'a SuperInitializer,
    ) -> Result<(), WriteError> {
        self.write_redirecting_initializer(tags::SUPER_INITIALIZER, id, node.target, &node.arguments)
    }

    fn visit_redirecting_initializer(
        &mut self,
        id: InitializerId,
        node: &'a RedirectingInitializer,
    ) -> Result<(), WriteError> {
        self.write_redirecting_initializer(
            tags::REDIRECTING_INITIALIZER,
            id,
            node.target,
            &node.arguments,
        )
    }
}
