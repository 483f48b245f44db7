use kernel_ir::{
    AssertStatement, Catch, DoStatement, IfStatement, Statement, StmtId, StmtKind, TryCatch,
    TryCatchFlags, TryFinally, VariableDeclaration, VariableFlags, VariableId, WhileStatement,
};

use super::KernelReader;
use crate::stack::ensure_sufficient_stack;
use crate::tags;
use crate::ReadError;

impl KernelReader<'_> {
    pub(super) fn read_stmt(&mut self) -> Result<StmtId, ReadError> {
        ensure_sufficient_stack(|| self.read_statement())
    }

    /// A variable declaration without its statement tag. The variable is
    /// in scope from the end of its own declaration.
    pub(super) fn read_variable(&mut self) -> Result<VariableId, ReadError> {
        let file_offset = self.read_offset()?;
        let file_equals_offset = self.read_offset()?;
        let annotations = self.read_exprs()?;
        let flags = VariableFlags::from_bits_retain(self.read_byte()?);
        let name = self.read_optional_string()?;
        let ty = self.read_type()?;
        let initializer = self.read_option(Self::read_expr)?;
        let id = self.component.tree.alloc(VariableDeclaration {
            name,
            ty,
            initializer,
            flags,
            annotations,
            file_offset,
            file_equals_offset,
        });
        self.variables.push(id);
        Ok(id)
    }

    fn read_catch(&mut self) -> Result<Catch, ReadError> {
        let height = self.variables.len();
        let file_offset = self.read_offset()?;
        let guard = self.read_type()?;
        let exception = self.read_option(Self::read_variable)?;
        let stack_trace = self.read_option(Self::read_variable)?;
        let body = self.read_stmt()?;
        self.variables.truncate(height);
        Ok(Catch {
            file_offset,
            guard,
            exception,
            stack_trace,
            body,
        })
    }

    fn read_statement(&mut self) -> Result<StmtId, ReadError> {
        let offset = self.cursor.offset();
        let tag = self.read_byte()?;
        let statement = match tag {
            tags::EXPRESSION_STATEMENT => Statement::new(StmtKind::Expression(self.read_expr()?)),
            tags::BLOCK => {
                let height = self.variables.len();
                let statements = self.read_list(Self::read_stmt)?;
                self.variables.truncate(height);
                Statement::new(StmtKind::Block(statements))
            }
            tags::EMPTY_STATEMENT => Statement::new(StmtKind::Empty),
            tags::ASSERT_STATEMENT => {
                let condition = self.read_expr()?;
                let condition_start_offset = self.read_offset()?;
                let condition_end_offset = self.read_offset()?;
                let message = self.read_option(Self::read_expr)?;
                Statement::new(StmtKind::Assert(AssertStatement {
                    condition,
                    message,
                    condition_start_offset,
                    condition_end_offset,
                }))
            }
            tags::LABELED_STATEMENT => return self.read_labeled_statement(),
            tags::BREAK_STATEMENT => {
                let at = self.read_offset()?;
                let index_offset = self.cursor.offset();
                let index = self.read_uint()?;
                let target = self
                    .labels
                    .get(self.label_base + index as usize)
                    .copied()
                    .ok_or_else(|| {
                        Self::out_of_range(
                            "label",
                            index,
                            self.labels.len() - self.label_base,
                            index_offset,
                        )
                    })?;
                Statement::at(StmtKind::Break(target), at)
            }
            tags::WHILE_STATEMENT => {
                let at = self.read_offset()?;
                let condition = self.read_expr()?;
                let body = self.read_stmt()?;
                Statement::at(StmtKind::While(WhileStatement { condition, body }), at)
            }
            tags::DO_STATEMENT => {
                let at = self.read_offset()?;
                let body = self.read_stmt()?;
                let condition = self.read_expr()?;
                Statement::at(StmtKind::Do(DoStatement { body, condition }), at)
            }
            tags::IF_STATEMENT => {
                let at = self.read_offset()?;
                let condition = self.read_expr()?;
                let then = self.read_stmt()?;
                // A missing else branch is written as an empty statement.
                let otherwise = if self.cursor.peek_byte() == Some(tags::EMPTY_STATEMENT) {
                    self.read_byte()?;
                    None
                } else {
                    Some(self.read_stmt()?)
                };
                Statement::at(
                    StmtKind::If(IfStatement {
                        condition,
                        then,
                        otherwise,
                    }),
                    at,
                )
            }
            tags::RETURN_STATEMENT => {
                let at = self.read_offset()?;
                Statement::at(StmtKind::Return(self.read_option(Self::read_expr)?), at)
            }
            tags::TRY_CATCH => {
                let body = self.read_stmt()?;
                let flags = TryCatchFlags::from_bits_retain(self.read_byte()?);
                let catches = self.read_list(Self::read_catch)?;
                Statement::new(StmtKind::TryCatch(TryCatch {
                    body,
                    catches,
                    flags,
                }))
            }
            tags::TRY_FINALLY => {
                let body = self.read_stmt()?;
                let finalizer = self.read_stmt()?;
                Statement::new(StmtKind::TryFinally(TryFinally { body, finalizer }))
            }
            tags::VARIABLE_DECLARATION => {
                Statement::new(StmtKind::VariableDeclaration(self.read_variable()?))
            }
            _ => {
                return Err(ReadError::UnexpectedTag {
                    kind: "statement",
                    tag,
                    offset,
                })
            }
        };
        Ok(self.component.tree.alloc(statement))
    }

    /// Breaks inside the body refer to the labeled statement, so it exists
    /// as an empty placeholder until the body has been read.
    fn read_labeled_statement(&mut self) -> Result<StmtId, ReadError> {
        let id = self.component.tree.alloc(Statement::new(StmtKind::Empty));
        self.labels.push(id);
        let body = self.read_stmt()?;
        self.labels.pop();
        self.component
            .tree
            .edit(id, |node| node.kind = StmtKind::Labeled(body));
        Ok(id)
    }
}
