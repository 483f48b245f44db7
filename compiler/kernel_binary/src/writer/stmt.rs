use kernel_ir::visitor::StatementVisitor;
use kernel_ir::{
    AssertStatement, Catch, DoStatement, ExprId, IfStatement, StmtId, TryCatch, TryFinally,
    VariableId, WhileStatement,
};

use super::KernelWriter;
use crate::tags;
use crate::WriteError;

impl<'a> KernelWriter<'a> {
    /// A variable declaration without its statement tag. The variable is
    /// declared after its initializer, which cannot see it.
    pub(super) fn write_variable(&mut self, id: VariableId) -> Result<(), WriteError> {
        let tree = self.tree;
        let node = tree.get(id);
        self.declaration_offsets.insert(id, self.sink.offset());
        self.sink.write_file_offset(node.file_offset)?;
        self.sink.write_file_offset(node.file_equals_offset)?;
        self.write_exprs(&node.annotations)?;
        self.sink.write_byte(node.flags.bits());
        self.write_string_ref(node.name.as_deref().unwrap_or(""))?;
        self.write_type(&node.ty)?;
        self.write_option(node.initializer, Self::write_expr)?;
        let slot = self.variables.declare(id);
        self.slots.insert(id, slot);
        Ok(())
    }

    fn write_catch(&mut self, node: &'a Catch) -> Result<(), WriteError> {
        self.variables.push_scope();
        self.sink.write_file_offset(node.file_offset)?;
        self.write_type(&node.guard)?;
        self.write_option(node.exception, Self::write_variable)?;
        self.write_option(node.stack_trace, Self::write_variable)?;
        self.write_stmt(node.body)?;
        self.variables.pop_scope();
        Ok(())
    }

    fn write_stmt_offset(&mut self, id: StmtId) -> Result<(), WriteError> {
        let offset = self.tree.get(id).file_offset;
        self.sink.write_file_offset(offset)
    }
}

impl<'a> StatementVisitor<'a, Result<(), WriteError>> for KernelWriter<'a> {
    fn default_statement(&mut self, _id: StmtId) -> Result<(), WriteError> {
        Err(WriteError::Unsupported { what: "statement" })
    }

    fn visit_expression_statement(
        &mut self,
        _id: StmtId,
        expression: ExprId,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::EXPRESSION_STATEMENT);
        self.write_expr(expression)
    }

    fn visit_block(&mut self, _id: StmtId, statements: &'a [StmtId]) -> Result<(), WriteError> {
        self.variables.push_scope();
        self.sink.write_byte(tags::BLOCK);
        self.write_list(statements, "statement count", |w, &stmt| w.write_stmt(stmt))?;
        self.variables.pop_scope();
        Ok(())
    }

    fn visit_empty_statement(&mut self, _id: StmtId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::EMPTY_STATEMENT);
        Ok(())
    }

    fn visit_assert_statement(
        &mut self,
        _id: StmtId,
        node: &'a AssertStatement,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::ASSERT_STATEMENT);
        self.write_expr(node.condition)?;
        self.sink.write_file_offset(node.condition_start_offset)?;
        self.sink.write_file_offset(node.condition_end_offset)?;
        self.write_option(node.message, Self::write_expr)
    }

    fn visit_labeled_statement(&mut self, id: StmtId, body: StmtId) -> Result<(), WriteError> {
        self.sink.write_byte(tags::LABELED_STATEMENT);
        self.labels.enter(id);
        self.write_stmt(body)?;
        self.labels.exit();
        Ok(())
    }

    fn visit_break_statement(&mut self, id: StmtId, target: StmtId) -> Result<(), WriteError> {
        let index = self
            .labels
            .index(target)
            .ok_or(WriteError::LabelNotInScope { target })?;
        self.sink.write_byte(tags::BREAK_STATEMENT);
        self.write_stmt_offset(id)?;
        self.sink.write_uint(index, "label index")
    }

    fn visit_while_statement(
        &mut self,
        id: StmtId,
        node: &'a WhileStatement,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::WHILE_STATEMENT);
        self.write_stmt_offset(id)?;
        self.write_expr(node.condition)?;
        self.write_stmt(node.body)
    }

    fn visit_do_statement(&mut self, id: StmtId, node: &'a DoStatement) -> Result<(), WriteError> {
        self.sink.write_byte(tags::DO_STATEMENT);
        self.write_stmt_offset(id)?;
        self.write_stmt(node.body)?;
        self.write_expr(node.condition)
    }

    fn visit_if_statement(&mut self, id: StmtId, node: &'a IfStatement) -> Result<(), WriteError> {
        self.sink.write_byte(tags::IF_STATEMENT);
        self.write_stmt_offset(id)?;
        self.write_expr(node.condition)?;
        self.write_stmt(node.then)?;
        // The else branch is not optional in the format; a missing one is empty.
        match node.otherwise {
            Some(otherwise) => self.write_stmt(otherwise),
            None => {
                self.sink.write_byte(tags::EMPTY_STATEMENT);
                Ok(())
            }
        }
    }

    fn visit_return_statement(
        &mut self,
        id: StmtId,
        value: Option<ExprId>,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::RETURN_STATEMENT);
        self.write_stmt_offset(id)?;
        self.write_option(value, Self::write_expr)
    }

    fn visit_try_catch(&mut self, _id: StmtId, node: &'a TryCatch) -> Result<(), WriteError> {
        self.sink.write_byte(tags::TRY_CATCH);
        self.write_stmt(node.body)?;
        self.sink.write_byte(node.effective_flags().bits());
        self.write_list(&node.catches, "catch count", Self::write_catch)
    }

    fn visit_try_finally(&mut self, _id: StmtId, node: &'a TryFinally) -> Result<(), WriteError> {
        self.sink.write_byte(tags::TRY_FINALLY);
        self.write_stmt(node.body)?;
        self.write_stmt(node.finalizer)
    }

    fn visit_variable_declaration(
        &mut self,
        _id: StmtId,
        variable: VariableId,
    ) -> Result<(), WriteError> {
        self.sink.write_byte(tags::VARIABLE_DECLARATION);
        self.write_variable(variable)
    }
}
