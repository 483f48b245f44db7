//! Visitor traits over types, expressions, statements, members, and the
//! rest of the tree.
//!
//! Every trait has one required `default_*` method; each `visit_*` method
//! falls back to it, so an implementor only overrides what it handles.
//! Dispatch happens in the `accept_*` functions, which match on the node
//! kind and call the matching `visit_*` method with the node's payload.
//!
//! [`TreeVisitor`] combines all of them and adds the declarations that are
//! not members. `walk_children` gives unit-returning visitors a generic
//! descent.

use crate::{
    AsExpression, AssertStatement, BlockExpression, Class, ClassId, Component, ConditionalExpression,
    Constructor, ConstructorId, ConstructorInvocation, DartType, DoStatement, ExprId, ExprKind,
    Field, FieldId, FieldInitializer, FunctionId, FunctionNode, IfStatement, InitializerId,
    InitializerKind, InterfaceType, IsExpression, Library, LibraryId, ListLiteral,
    LogicalExpression, MemberId, MethodInvocation, Nullability, Procedure, ProcedureId,
    PropertyGet, PropertySet, RedirectingInitializer, Reference, StaticInvocation, StaticSet,
    StmtId, StmtKind, SuperInitializer, Tree, TreeNodeId, TryCatch, TryFinally, TypeParameter,
    TypeParameterId, TypeParameterType, VariableDeclaration, VariableGet, VariableId,
    VariableSet, WhileStatement,
};

pub trait DartTypeVisitor<'a, R> {
    fn default_dart_type(&mut self, ty: &'a DartType) -> R;

    fn visit_invalid_type(&mut self, ty: &'a DartType) -> R {
        self.default_dart_type(ty)
    }

    fn visit_dynamic_type(&mut self, ty: &'a DartType) -> R {
        self.default_dart_type(ty)
    }

    fn visit_void_type(&mut self, ty: &'a DartType) -> R {
        self.default_dart_type(ty)
    }

    fn visit_bottom_type(&mut self, ty: &'a DartType) -> R {
        self.default_dart_type(ty)
    }

    fn visit_never_type(&mut self, ty: &'a DartType, _nullability: Nullability) -> R {
        self.default_dart_type(ty)
    }

    fn visit_interface_type(&mut self, ty: &'a DartType, _node: &'a InterfaceType) -> R {
        self.default_dart_type(ty)
    }

    fn visit_type_parameter_type(&mut self, ty: &'a DartType, _node: &'a TypeParameterType) -> R {
        self.default_dart_type(ty)
    }
}

pub fn accept_type<'a, R, V>(visitor: &mut V, ty: &'a DartType) -> R
where
    V: DartTypeVisitor<'a, R> + ?Sized,
{
    match ty {
        DartType::Invalid => visitor.visit_invalid_type(ty),
        DartType::Dynamic => visitor.visit_dynamic_type(ty),
        DartType::Void => visitor.visit_void_type(ty),
        DartType::Bottom => visitor.visit_bottom_type(ty),
        DartType::Never(nullability) => visitor.visit_never_type(ty, *nullability),
        DartType::Interface(node) => visitor.visit_interface_type(ty, node),
        DartType::TypeParameter(node) => visitor.visit_type_parameter_type(ty, node),
    }
}

pub trait ExpressionVisitor<'a, R> {
    fn default_expression(&mut self, id: ExprId) -> R;

    fn visit_invalid_expression(&mut self, id: ExprId, _message: &'a str) -> R {
        self.default_expression(id)
    }

    fn visit_variable_get(&mut self, id: ExprId, _node: &'a VariableGet) -> R {
        self.default_expression(id)
    }

    fn visit_variable_set(&mut self, id: ExprId, _node: &'a VariableSet) -> R {
        self.default_expression(id)
    }

    fn visit_property_get(&mut self, id: ExprId, _node: &'a PropertyGet) -> R {
        self.default_expression(id)
    }

    fn visit_property_set(&mut self, id: ExprId, _node: &'a PropertySet) -> R {
        self.default_expression(id)
    }

    fn visit_static_get(&mut self, id: ExprId, _target: Reference) -> R {
        self.default_expression(id)
    }

    fn visit_static_set(&mut self, id: ExprId, _node: &'a StaticSet) -> R {
        self.default_expression(id)
    }

    fn visit_method_invocation(&mut self, id: ExprId, _node: &'a MethodInvocation) -> R {
        self.default_expression(id)
    }

    fn visit_static_invocation(&mut self, id: ExprId, _node: &'a StaticInvocation) -> R {
        self.default_expression(id)
    }

    fn visit_constructor_invocation(&mut self, id: ExprId, _node: &'a ConstructorInvocation) -> R {
        self.default_expression(id)
    }

    fn visit_not(&mut self, id: ExprId, _operand: ExprId) -> R {
        self.default_expression(id)
    }

    fn visit_logical_expression(&mut self, id: ExprId, _node: &'a LogicalExpression) -> R {
        self.default_expression(id)
    }

    fn visit_conditional_expression(&mut self, id: ExprId, _node: &'a ConditionalExpression) -> R {
        self.default_expression(id)
    }

    fn visit_string_concatenation(&mut self, id: ExprId, _parts: &'a [ExprId]) -> R {
        self.default_expression(id)
    }

    fn visit_is_expression(&mut self, id: ExprId, _node: &'a IsExpression) -> R {
        self.default_expression(id)
    }

    fn visit_as_expression(&mut self, id: ExprId, _node: &'a AsExpression) -> R {
        self.default_expression(id)
    }

    fn visit_string_literal(&mut self, id: ExprId, _value: &'a str) -> R {
        self.default_expression(id)
    }

    fn visit_int_literal(&mut self, id: ExprId, _value: i64) -> R {
        self.default_expression(id)
    }

    fn visit_double_literal(&mut self, id: ExprId, _value: f64) -> R {
        self.default_expression(id)
    }

    fn visit_bool_literal(&mut self, id: ExprId, _value: bool) -> R {
        self.default_expression(id)
    }

    fn visit_null_literal(&mut self, id: ExprId) -> R {
        self.default_expression(id)
    }

    fn visit_list_literal(&mut self, id: ExprId, _node: &'a ListLiteral) -> R {
        self.default_expression(id)
    }

    fn visit_this(&mut self, id: ExprId) -> R {
        self.default_expression(id)
    }

    fn visit_throw(&mut self, id: ExprId, _value: ExprId) -> R {
        self.default_expression(id)
    }

    fn visit_null_check(&mut self, id: ExprId, _operand: ExprId) -> R {
        self.default_expression(id)
    }

    fn visit_block_expression(&mut self, id: ExprId, _node: &'a BlockExpression) -> R {
        self.default_expression(id)
    }
}

pub fn accept_expression<'a, R, V>(visitor: &mut V, tree: &'a Tree, id: ExprId) -> R
where
    V: ExpressionVisitor<'a, R> + ?Sized,
{
    match &tree.get(id).kind {
        ExprKind::Invalid(message) => visitor.visit_invalid_expression(id, message),
        ExprKind::VariableGet(node) => visitor.visit_variable_get(id, node),
        ExprKind::VariableSet(node) => visitor.visit_variable_set(id, node),
        ExprKind::PropertyGet(node) => visitor.visit_property_get(id, node),
        ExprKind::PropertySet(node) => visitor.visit_property_set(id, node),
        ExprKind::StaticGet(target) => visitor.visit_static_get(id, *target),
        ExprKind::StaticSet(node) => visitor.visit_static_set(id, node),
        ExprKind::MethodInvocation(node) => visitor.visit_method_invocation(id, node),
        ExprKind::StaticInvocation(node) => visitor.visit_static_invocation(id, node),
        ExprKind::ConstructorInvocation(node) => visitor.visit_constructor_invocation(id, node),
        ExprKind::Not(operand) => visitor.visit_not(id, *operand),
        ExprKind::Logical(node) => visitor.visit_logical_expression(id, node),
        ExprKind::Conditional(node) => visitor.visit_conditional_expression(id, node),
        ExprKind::StringConcatenation(parts) => visitor.visit_string_concatenation(id, parts),
        ExprKind::Is(node) => visitor.visit_is_expression(id, node),
        ExprKind::As(node) => visitor.visit_as_expression(id, node),
        ExprKind::StringLiteral(value) => visitor.visit_string_literal(id, value),
        ExprKind::IntLiteral(value) => visitor.visit_int_literal(id, *value),
        ExprKind::DoubleLiteral(value) => visitor.visit_double_literal(id, *value),
        ExprKind::BoolLiteral(value) => visitor.visit_bool_literal(id, *value),
        ExprKind::NullLiteral => visitor.visit_null_literal(id),
        ExprKind::ListLiteral(node) => visitor.visit_list_literal(id, node),
        ExprKind::This => visitor.visit_this(id),
        ExprKind::Throw(value) => visitor.visit_throw(id, *value),
        ExprKind::NullCheck(operand) => visitor.visit_null_check(id, *operand),
        ExprKind::Block(node) => visitor.visit_block_expression(id, node),
    }
}

pub trait StatementVisitor<'a, R> {
    fn default_statement(&mut self, id: StmtId) -> R;

    fn visit_expression_statement(&mut self, id: StmtId, _expression: ExprId) -> R {
        self.default_statement(id)
    }

    fn visit_block(&mut self, id: StmtId, _statements: &'a [StmtId]) -> R {
        self.default_statement(id)
    }

    fn visit_empty_statement(&mut self, id: StmtId) -> R {
        self.default_statement(id)
    }

    fn visit_assert_statement(&mut self, id: StmtId, _node: &'a AssertStatement) -> R {
        self.default_statement(id)
    }

    fn visit_labeled_statement(&mut self, id: StmtId, _body: StmtId) -> R {
        self.default_statement(id)
    }

    fn visit_break_statement(&mut self, id: StmtId, _target: StmtId) -> R {
        self.default_statement(id)
    }

    fn visit_while_statement(&mut self, id: StmtId, _node: &'a WhileStatement) -> R {
        self.default_statement(id)
    }

    fn visit_do_statement(&mut self, id: StmtId, _node: &'a DoStatement) -> R {
        self.default_statement(id)
    }

    fn visit_if_statement(&mut self, id: StmtId, _node: &'a IfStatement) -> R {
        self.default_statement(id)
    }

    fn visit_return_statement(&mut self, id: StmtId, _value: Option<ExprId>) -> R {
        self.default_statement(id)
    }

    fn visit_try_catch(&mut self, id: StmtId, _node: &'a TryCatch) -> R {
        self.default_statement(id)
    }

    fn visit_try_finally(&mut self, id: StmtId, _node: &'a TryFinally) -> R {
        self.default_statement(id)
    }

    fn visit_variable_declaration(&mut self, id: StmtId, _variable: VariableId) -> R {
        self.default_statement(id)
    }
}

pub fn accept_statement<'a, R, V>(visitor: &mut V, tree: &'a Tree, id: StmtId) -> R
where
    V: StatementVisitor<'a, R> + ?Sized,
{
    match &tree.get(id).kind {
        StmtKind::Expression(expression) => visitor.visit_expression_statement(id, *expression),
        StmtKind::Block(statements) => visitor.visit_block(id, statements),
        StmtKind::Empty => visitor.visit_empty_statement(id),
        StmtKind::Assert(node) => visitor.visit_assert_statement(id, node),
        StmtKind::Labeled(body) => visitor.visit_labeled_statement(id, *body),
        StmtKind::Break(target) => visitor.visit_break_statement(id, *target),
        StmtKind::While(node) => visitor.visit_while_statement(id, node),
        StmtKind::Do(node) => visitor.visit_do_statement(id, node),
        StmtKind::If(node) => visitor.visit_if_statement(id, node),
        StmtKind::Return(value) => visitor.visit_return_statement(id, *value),
        StmtKind::TryCatch(node) => visitor.visit_try_catch(id, node),
        StmtKind::TryFinally(node) => visitor.visit_try_finally(id, node),
        StmtKind::VariableDeclaration(variable) => visitor.visit_variable_declaration(id, *variable),
    }
}

pub trait MemberVisitor<'a, R> {
    fn default_member(&mut self, member: MemberId) -> R;

    fn visit_field(&mut self, id: FieldId, _node: &'a Field) -> R {
        self.default_member(id.into())
    }

    fn visit_procedure(&mut self, id: ProcedureId, _node: &'a Procedure) -> R {
        self.default_member(id.into())
    }

    fn visit_constructor(&mut self, id: ConstructorId, _node: &'a Constructor) -> R {
        self.default_member(id.into())
    }
}

pub fn accept_member<'a, R, V>(visitor: &mut V, tree: &'a Tree, member: MemberId) -> R
where
    V: MemberVisitor<'a, R> + ?Sized,
{
    match member {
        MemberId::Field(id) => visitor.visit_field(id, tree.get(id)),
        MemberId::Procedure(id) => visitor.visit_procedure(id, tree.get(id)),
        MemberId::Constructor(id) => visitor.visit_constructor(id, tree.get(id)),
    }
}

pub trait InitializerVisitor<'a, R> {
    fn default_initializer(&mut self, id: InitializerId) -> R;

    fn visit_field_initializer(&mut self, id: InitializerId, _node: &'a FieldInitializer) -> R {
        self.default_initializer(id)
    }

    fn visit_super_initializer(&mut self, id: InitializerId, _node: &'a SuperInitializer) -> R {
        self.default_initializer(id)
    }

    fn visit_redirecting_initializer(
        &mut self,
        id: InitializerId,
        _node: &'a RedirectingInitializer,
    ) -> R {
        self.default_initializer(id)
    }
}

pub fn accept_initializer<'a, R, V>(visitor: &mut V, tree: &'a Tree, id: InitializerId) -> R
where
    V: InitializerVisitor<'a, R> + ?Sized,
{
    match &tree.get(id).kind {
        InitializerKind::Field(node) => visitor.visit_field_initializer(id, node),
        InitializerKind::Super(node) => visitor.visit_super_initializer(id, node),
        InitializerKind::Redirecting(node) => visitor.visit_redirecting_initializer(id, node),
    }
}

/// Visitor over every node kind.
pub trait TreeVisitor<'a, R>:
    ExpressionVisitor<'a, R>
    + StatementVisitor<'a, R>
    + MemberVisitor<'a, R>
    + InitializerVisitor<'a, R>
    + DartTypeVisitor<'a, R>
{
    fn default_tree_node(&mut self, node: TreeNodeId) -> R;

    fn visit_component(&mut self, _component: &'a Component) -> R {
        self.default_tree_node(TreeNodeId::Component)
    }

    fn visit_library(&mut self, id: LibraryId, _node: &'a Library) -> R {
        self.default_tree_node(id.into())
    }

    fn visit_class(&mut self, id: ClassId, _node: &'a Class) -> R {
        self.default_tree_node(id.into())
    }

    fn visit_function_node(&mut self, id: FunctionId, _node: &'a FunctionNode) -> R {
        self.default_tree_node(id.into())
    }

    fn visit_type_parameter(&mut self, id: TypeParameterId, _node: &'a TypeParameter) -> R {
        self.default_tree_node(id.into())
    }

    /// A parameter, catch variable, or the declaration inside a
    /// variable-declaration statement.
    fn visit_variable(&mut self, id: VariableId, _node: &'a VariableDeclaration) -> R {
        self.default_tree_node(id.into())
    }
}

/// Dispatch any node to its `visit_*` method. `TreeNodeId::Component` goes
/// to `default_tree_node`, since the component is not stored in the tree.
pub fn accept_node<'a, R, V>(visitor: &mut V, tree: &'a Tree, node: TreeNodeId) -> R
where
    V: TreeVisitor<'a, R> + ?Sized,
{
    match node {
        TreeNodeId::Component => visitor.default_tree_node(node),
        TreeNodeId::Library(id) => visitor.visit_library(id, tree.get(id)),
        TreeNodeId::Class(id) => visitor.visit_class(id, tree.get(id)),
        TreeNodeId::Field(id) => accept_member(visitor, tree, id.into()),
        TreeNodeId::Procedure(id) => accept_member(visitor, tree, id.into()),
        TreeNodeId::Constructor(id) => accept_member(visitor, tree, id.into()),
        TreeNodeId::Initializer(id) => accept_initializer(visitor, tree, id),
        TreeNodeId::Function(id) => visitor.visit_function_node(id, tree.get(id)),
        TreeNodeId::Expr(id) => accept_expression(visitor, tree, id),
        TreeNodeId::Stmt(id) => accept_statement(visitor, tree, id),
        TreeNodeId::Variable(id) => visitor.visit_variable(id, tree.get(id)),
        TreeNodeId::TypeParameter(id) => visitor.visit_type_parameter(id, tree.get(id)),
    }
}

/// Visit every child of `node` in slot order.
pub fn walk_children<'a, V>(visitor: &mut V, tree: &'a Tree, node: TreeNodeId)
where
    V: TreeVisitor<'a, ()> + ?Sized,
{
    for child in tree.children(node) {
        accept_node(visitor, tree, child);
    }
}
