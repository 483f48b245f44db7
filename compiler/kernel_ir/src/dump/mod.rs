//! Human-readable text rendering of a component.
//!
//! The output names declarations by canonical path, variables and labels
//! by their order of appearance, and omits file offsets. Two trees that
//! are structurally the same print the same text, which makes `dump` the
//! comparison used by round-trip tests.

use std::fmt::Write;

use rustc_hash::FxHashMap;

use crate::visitor::{
    accept_expression, accept_initializer, accept_member, accept_statement, accept_type,
    DartTypeVisitor, ExpressionVisitor, InitializerVisitor, MemberVisitor, StatementVisitor,
    TreeVisitor,
};
use crate::{
    Arguments, AsExpression, AssertStatement, BlockExpression, Class, ClassId, Component,
    ConditionalExpression, Constructor, ConstructorId, ConstructorInvocation, DartType,
    DoStatement, ExprId, Field, FieldId, FieldInitializer, FunctionId, FunctionNode, IfStatement,
    InitializerId, InterfaceType, IsExpression, Library, LibraryId, ListLiteral,
    LogicalExpression, LogicalOperator, MemberId, MethodInvocation, Name, Nullability, Procedure,
    ProcedureId, PropertyGet, PropertySet, RedirectingInitializer, Reference, StaticInvocation,
    StaticSet, StmtId, SuperInitializer, Tree, TreeNodeId, TryCatch, TryFinally, TypeParameter,
    TypeParameterId, TypeParameterType, VariableDeclaration, VariableGet, VariableId,
    VariableSet, WhileStatement,
};

/// Render `component` as indented text.
pub fn dump(component: &Component) -> String {
    let mut printer = Printer {
        component,
        out: String::new(),
        indent: 0,
        variables: FxHashMap::default(),
        next_variable: 0,
        labels: FxHashMap::default(),
    };
    printer.visit_component(component);
    printer.out
}

struct Printer<'a> {
    component: &'a Component,
    out: String,
    indent: usize,
    variables: FxHashMap<VariableId, usize>,
    next_variable: usize,
    labels: FxHashMap<StmtId, usize>,
}

impl<'a> Printer<'a> {
    fn tree(&self) -> &'a Tree {
        &self.component.tree
    }

    fn line(&mut self) {
        if !self.out.is_empty() {
            self.out.push('\n');
        }
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn text(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn reference(&mut self, reference: Reference) {
        let names = &self.component.names;
        match names.canonical_name(reference) {
            Some(name) => {
                let _ = write!(self.out, "{}", names.display(name));
            }
            None => self.out.push_str("<unbound>"),
        }
    }

    fn name(&mut self, name: &Name) {
        self.out.push_str(&name.text);
    }

    fn expr(&mut self, id: ExprId) {
        let tree = self.tree();
        accept_expression(self, tree, id);
    }

    fn exprs(&mut self, ids: &[ExprId]) {
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            self.expr(id);
        }
    }

    fn stmt(&mut self, id: StmtId) {
        let tree = self.tree();
        accept_statement(self, tree, id);
    }

    fn indented_stmt(&mut self, id: StmtId) {
        self.indent += 1;
        self.stmt(id);
        self.indent -= 1;
    }

    fn ty(&mut self, ty: &'a DartType) {
        accept_type(self, ty);
    }

    fn types(&mut self, types: &'a [DartType]) {
        for (i, ty) in types.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            self.ty(ty);
        }
    }

    fn arguments(&mut self, arguments: &'a Arguments) {
        if !arguments.type_arguments.is_empty() {
            self.text("<");
            self.types(&arguments.type_arguments);
            self.text(">");
        }
        self.text("(");
        self.exprs(&arguments.positional);
        for (i, named) in arguments.named.iter().enumerate() {
            if i > 0 || !arguments.positional.is_empty() {
                self.text(", ");
            }
            let _ = write!(self.out, "{}: ", named.name);
            self.expr(named.value);
        }
        self.text(")");
    }

    fn annotations(&mut self, annotations: &[ExprId]) {
        for &annotation in annotations {
            self.line();
            self.text("@");
            self.expr(annotation);
        }
    }

    fn member(&mut self, member: MemberId) {
        let tree = self.tree();
        accept_member(self, tree, member);
    }

    fn variable_ref(&mut self, id: VariableId) {
        let name = self.tree().get(id).name.as_deref().unwrap_or("");
        match self.variables.get(&id) {
            Some(n) => {
                let _ = write!(self.out, "{name}#{n}");
            }
            None => {
                let _ = write!(self.out, "{name}#?");
            }
        }
    }

    fn type_parameters(&mut self, ids: &[TypeParameterId]) {
        if ids.is_empty() {
            return;
        }
        self.text("<");
        for (i, &id) in ids.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            let node = self.tree().get(id);
            self.visit_type_parameter(id, node);
        }
        self.text(">");
    }

    fn nullability(&mut self, nullability: Nullability) {
        self.text(match nullability {
            Nullability::Neither => "%",
            Nullability::Nullable => "?",
            Nullability::NonNullable => "",
            Nullability::Legacy => "*",
        });
    }
}

impl<'a> DartTypeVisitor<'a, ()> for Printer<'a> {
    fn default_dart_type(&mut self, ty: &'a DartType) {
        let _ = write!(self.out, "{ty:?}");
    }

    fn visit_invalid_type(&mut self, _ty: &'a DartType) {
        self.text("invalid-type");
    }

    fn visit_dynamic_type(&mut self, _ty: &'a DartType) {
        self.text("dynamic");
    }

    fn visit_void_type(&mut self, _ty: &'a DartType) {
        self.text("void");
    }

    fn visit_bottom_type(&mut self, _ty: &'a DartType) {
        self.text("bottom");
    }

    fn visit_never_type(&mut self, _ty: &'a DartType, nullability: Nullability) {
        self.text("Never");
        self.nullability(nullability);
    }

    fn visit_interface_type(&mut self, _ty: &'a DartType, node: &'a InterfaceType) {
        self.reference(node.class);
        if !node.type_arguments.is_empty() {
            self.text("<");
            self.types(&node.type_arguments);
            self.text(">");
        }
        self.nullability(node.nullability);
    }

    fn visit_type_parameter_type(&mut self, _ty: &'a DartType, node: &'a TypeParameterType) {
        let name = self.tree().get(node.parameter).name.as_deref().unwrap_or("T?");
        self.text(name);
        self.nullability(node.nullability);
        if let Some(bound) = &node.bound {
            self.text(" & ");
            self.ty(bound);
        }
    }
}

impl<'a> ExpressionVisitor<'a, ()> for Printer<'a> {
    fn default_expression(&mut self, id: ExprId) {
        let tree = self.tree();
        let _ = write!(self.out, "{:?}", tree.get(id).kind);
    }

    fn visit_invalid_expression(&mut self, _id: ExprId, message: &'a str) {
        let _ = write!(self.out, "invalid({message:?})");
    }

    fn visit_variable_get(&mut self, _id: ExprId, node: &'a VariableGet) {
        self.variable_ref(node.variable);
        if let Some(promoted) = &node.promoted_type {
            self.text("{");
            self.ty(promoted);
            self.text("}");
        }
    }

    fn visit_variable_set(&mut self, _id: ExprId, node: &'a VariableSet) {
        self.variable_ref(node.variable);
        self.text(" = ");
        self.expr(node.value);
    }

    fn visit_property_get(&mut self, _id: ExprId, node: &'a PropertyGet) {
        self.expr(node.receiver);
        self.text(".");
        self.name(&node.name);
    }

    fn visit_property_set(&mut self, _id: ExprId, node: &'a PropertySet) {
        self.expr(node.receiver);
        self.text(".");
        self.name(&node.name);
        self.text(" = ");
        self.expr(node.value);
    }

    fn visit_static_get(&mut self, _id: ExprId, target: Reference) {
        self.reference(target);
    }

    fn visit_static_set(&mut self, _id: ExprId, node: &'a StaticSet) {
        self.reference(node.target);
        self.text(" = ");
        self.expr(node.value);
    }

    fn visit_method_invocation(&mut self, _id: ExprId, node: &'a MethodInvocation) {
        self.expr(node.receiver);
        self.text(".");
        self.name(&node.name);
        self.arguments(&node.arguments);
    }

    fn visit_static_invocation(&mut self, _id: ExprId, node: &'a StaticInvocation) {
        self.reference(node.target);
        self.arguments(&node.arguments);
    }

    fn visit_constructor_invocation(&mut self, _id: ExprId, node: &'a ConstructorInvocation) {
        self.text(if node.is_const { "const " } else { "new " });
        self.reference(node.target);
        self.arguments(&node.arguments);
    }

    fn visit_not(&mut self, _id: ExprId, operand: ExprId) {
        self.text("!");
        self.expr(operand);
    }

    fn visit_logical_expression(&mut self, _id: ExprId, node: &'a LogicalExpression) {
        self.text("(");
        self.expr(node.left);
        self.text(match node.operator {
            LogicalOperator::And => " && ",
            LogicalOperator::Or => " || ",
        });
        self.expr(node.right);
        self.text(")");
    }

    fn visit_conditional_expression(&mut self, _id: ExprId, node: &'a ConditionalExpression) {
        self.text("(");
        self.expr(node.condition);
        self.text(" ? ");
        self.expr(node.then);
        self.text(" : ");
        self.expr(node.otherwise);
        self.text(")");
        if let Some(ty) = &node.static_type {
            self.text(": ");
            self.ty(ty);
        }
    }

    fn visit_string_concatenation(&mut self, _id: ExprId, parts: &'a [ExprId]) {
        self.text("concat(");
        self.exprs(parts);
        self.text(")");
    }

    fn visit_is_expression(&mut self, _id: ExprId, node: &'a IsExpression) {
        self.text("(");
        self.expr(node.operand);
        self.text(" is ");
        self.ty(&node.target_type);
        let _ = write!(self.out, " {:?})", node.flags);
    }

    fn visit_as_expression(&mut self, _id: ExprId, node: &'a AsExpression) {
        self.text("(");
        self.expr(node.operand);
        self.text(" as ");
        self.ty(&node.target_type);
        let _ = write!(self.out, " {:?})", node.flags);
    }

    fn visit_string_literal(&mut self, _id: ExprId, value: &'a str) {
        let _ = write!(self.out, "{value:?}");
    }

    fn visit_int_literal(&mut self, _id: ExprId, value: i64) {
        let _ = write!(self.out, "{value}");
    }

    fn visit_double_literal(&mut self, _id: ExprId, value: f64) {
        let _ = write!(self.out, "{value:?}");
    }

    fn visit_bool_literal(&mut self, _id: ExprId, value: bool) {
        let _ = write!(self.out, "{value}");
    }

    fn visit_null_literal(&mut self, _id: ExprId) {
        self.text("null");
    }

    fn visit_list_literal(&mut self, _id: ExprId, node: &'a ListLiteral) {
        if node.is_const {
            self.text("const ");
        }
        self.text("<");
        self.ty(&node.type_argument);
        self.text(">[");
        self.exprs(&node.values);
        self.text("]");
    }

    fn visit_this(&mut self, _id: ExprId) {
        self.text("this");
    }

    fn visit_throw(&mut self, _id: ExprId, value: ExprId) {
        self.text("throw ");
        self.expr(value);
    }

    fn visit_null_check(&mut self, _id: ExprId, operand: ExprId) {
        self.expr(operand);
        self.text("!");
    }

    fn visit_block_expression(&mut self, _id: ExprId, node: &'a BlockExpression) {
        self.text("block {");
        self.indent += 1;
        for &stmt in &node.body {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line();
        self.text("} => ");
        self.expr(node.value);
    }
}

impl<'a> StatementVisitor<'a, ()> for Printer<'a> {
    fn default_statement(&mut self, id: StmtId) {
        self.line();
        let tree = self.tree();
        let _ = write!(self.out, "{:?}", tree.get(id).kind);
    }

    fn visit_expression_statement(&mut self, _id: StmtId, expression: ExprId) {
        self.line();
        self.expr(expression);
        self.text(";");
    }

    fn visit_block(&mut self, _id: StmtId, statements: &'a [StmtId]) {
        self.line();
        self.text("{");
        self.indent += 1;
        for &stmt in statements {
            self.stmt(stmt);
        }
        self.indent -= 1;
        self.line();
        self.text("}");
    }

    fn visit_empty_statement(&mut self, _id: StmtId) {
        self.line();
        self.text(";");
    }

    fn visit_assert_statement(&mut self, _id: StmtId, node: &'a AssertStatement) {
        self.line();
        self.text("assert(");
        self.expr(node.condition);
        if let Some(message) = node.message {
            self.text(", ");
            self.expr(message);
        }
        self.text(");");
    }

    fn visit_labeled_statement(&mut self, id: StmtId, body: StmtId) {
        let label = self.labels.len();
        self.labels.insert(id, label);
        self.line();
        let _ = write!(self.out, "L{label}:");
        self.indented_stmt(body);
    }

    fn visit_break_statement(&mut self, _id: StmtId, target: StmtId) {
        self.line();
        match self.labels.get(&target) {
            Some(label) => {
                let _ = write!(self.out, "break L{label};");
            }
            None => self.text("break L?;"),
        }
    }

    fn visit_while_statement(&mut self, _id: StmtId, node: &'a WhileStatement) {
        self.line();
        self.text("while (");
        self.expr(node.condition);
        self.text(")");
        self.indented_stmt(node.body);
    }

    fn visit_do_statement(&mut self, _id: StmtId, node: &'a DoStatement) {
        self.line();
        self.text("do");
        self.indented_stmt(node.body);
        self.line();
        self.text("while (");
        self.expr(node.condition);
        self.text(");");
    }

    fn visit_if_statement(&mut self, _id: StmtId, node: &'a IfStatement) {
        self.line();
        self.text("if (");
        self.expr(node.condition);
        self.text(")");
        self.indented_stmt(node.then);
        if let Some(otherwise) = node.otherwise {
            self.line();
            self.text("else");
            self.indented_stmt(otherwise);
        }
    }

    fn visit_return_statement(&mut self, _id: StmtId, value: Option<ExprId>) {
        self.line();
        self.text("return");
        if let Some(value) = value {
            self.text(" ");
            self.expr(value);
        }
        self.text(";");
    }

    fn visit_try_catch(&mut self, _id: StmtId, node: &'a TryCatch) {
        self.line();
        let _ = write!(self.out, "try {:?}", node.effective_flags());
        self.indented_stmt(node.body);
        for catch in &node.catches {
            self.line();
            self.text("on ");
            self.ty(&catch.guard);
            self.text(" catch (");
            for (i, variable) in [catch.exception, catch.stack_trace].into_iter().enumerate() {
                if i > 0 {
                    self.text(", ");
                }
                match variable {
                    Some(variable) => {
                        let node = self.tree().get(variable);
                        self.visit_variable(variable, node);
                    }
                    None => self.text("_"),
                }
            }
            self.text(")");
            self.indented_stmt(catch.body);
        }
    }

    fn visit_try_finally(&mut self, _id: StmtId, node: &'a TryFinally) {
        self.line();
        self.text("try");
        self.indented_stmt(node.body);
        self.line();
        self.text("finally");
        self.indented_stmt(node.finalizer);
    }

    fn visit_variable_declaration(&mut self, _id: StmtId, variable: VariableId) {
        self.line();
        self.text("var ");
        let node = self.tree().get(variable);
        self.visit_variable(variable, node);
        self.text(";");
    }
}

impl<'a> MemberVisitor<'a, ()> for Printer<'a> {
    fn default_member(&mut self, member: MemberId) {
        self.line();
        let _ = write!(self.out, "{member:?}");
    }

    fn visit_field(&mut self, _id: FieldId, node: &'a Field) {
        self.annotations(&node.annotations);
        self.line();
        let _ = write!(self.out, "field {:?} ", node.flags);
        self.reference(node.reference);
        self.text(": ");
        self.ty(&node.ty);
        if let Some(initializer) = node.initializer {
            self.text(" = ");
            self.expr(initializer);
        }
    }

    fn visit_procedure(&mut self, _id: ProcedureId, node: &'a Procedure) {
        self.annotations(&node.annotations);
        self.line();
        let _ = write!(self.out, "{:?} {:?} ", node.kind, node.flags);
        self.reference(node.reference);
        if let Some(function) = node.function {
            let tree = self.tree();
            self.visit_function_node(function, tree.get(function));
        }
    }

    fn visit_constructor(&mut self, _id: ConstructorId, node: &'a Constructor) {
        self.annotations(&node.annotations);
        self.line();
        let _ = write!(self.out, "constructor {:?} ", node.flags);
        self.reference(node.reference);
        let tree = self.tree();
        self.visit_function_node(node.function, tree.get(node.function));
        self.indent += 1;
        for &initializer in &node.initializers {
            self.line();
            self.text(": ");
            accept_initializer(self, tree, initializer);
        }
        self.indent -= 1;
    }
}

impl<'a> InitializerVisitor<'a, ()> for Printer<'a> {
    fn default_initializer(&mut self, id: InitializerId) {
        let tree = self.tree();
        let _ = write!(self.out, "{:?}", tree.get(id).kind);
    }

    fn visit_field_initializer(&mut self, _id: InitializerId, node: &'a FieldInitializer) {
        self.reference(node.field);
        self.text(" = ");
        self.expr(node.value);
    }

    fn visit_super_initializer(&mut self, _id: InitializerId, node: &'a SuperInitializer) {
        self.text("super ");
        self.reference(node.target);
        self.arguments(&node.arguments);
    }

    fn visit_redirecting_initializer(
        &mut self,
        _id: InitializerId,
        node: &'a RedirectingInitializer,
    ) {
        self.text("this ");
        self.reference(node.target);
        self.arguments(&node.arguments);
    }
}

impl<'a> TreeVisitor<'a, ()> for Printer<'a> {
    fn default_tree_node(&mut self, node: TreeNodeId) {
        self.line();
        let _ = write!(self.out, "{node:?}");
    }

    fn visit_component(&mut self, component: &'a Component) {
        self.line();
        let _ = write!(
            self.out,
            "component {} mode={:?} main=",
            component.version, component.compiled_mode
        );
        match component.main_method {
            Some(main) => self.reference(main),
            None => self.text("none"),
        }

        let mut sources: Vec<_> = component.sources.iter().collect();
        sources.sort_by(|a, b| a.0.cmp(b.0));
        for (uri, source) in sources {
            self.line();
            let _ = write!(
                self.out,
                "source {uri} lines={:?} import={:?} content={:?}",
                source.line_starts,
                source.import_uri.as_ref().map(crate::Uri::as_str),
                source.content
            );
        }

        for &library in component.libraries() {
            self.visit_library(library, component.tree.get(library));
        }
    }

    fn visit_library(&mut self, _id: LibraryId, node: &'a Library) {
        self.line();
        self.text("library ");
        self.reference(node.reference);
        let _ = write!(
            self.out,
            " name={:?} file={:?} {:?} language={}",
            node.name,
            node.file_uri.as_ref().map(crate::Uri::as_str),
            node.flags,
            node.language_version
        );
        if !node.source_uris.is_empty() {
            let _ = write!(self.out, " sources={:?}", node.source_uris);
        }
        self.indent += 1;
        self.annotations(&node.annotations);
        let tree = self.tree();
        for &class in &node.classes {
            self.visit_class(class, tree.get(class));
        }
        for &field in &node.fields {
            self.member(field.into());
        }
        for &procedure in &node.procedures {
            self.member(procedure.into());
        }
        self.indent -= 1;
    }

    fn visit_class(&mut self, _id: ClassId, node: &'a Class) {
        self.annotations(&node.annotations);
        self.line();
        let _ = write!(self.out, "class {} {:?} ", node.name, node.flags);
        self.reference(node.reference);
        self.type_parameters(&node.type_parameters);
        if let Some(supertype) = &node.supertype {
            self.text(" extends ");
            self.ty(supertype);
        }
        if let Some(mixin) = &node.mixed_in_type {
            self.text(" with ");
            self.ty(mixin);
        }
        if !node.implemented_types.is_empty() {
            self.text(" implements ");
            self.types(&node.implemented_types);
        }
        self.indent += 1;
        for &field in &node.fields {
            self.member(field.into());
        }
        for &constructor in &node.constructors {
            self.member(constructor.into());
        }
        for &procedure in &node.procedures {
            self.member(procedure.into());
        }
        self.indent -= 1;
    }

    fn visit_function_node(&mut self, _id: FunctionId, node: &'a FunctionNode) {
        self.type_parameters(&node.type_parameters);
        self.text("(");
        let tree = self.tree();
        let required = node.required_positional_count() as usize;
        for (i, &parameter) in node.positional_parameters.iter().enumerate() {
            if i > 0 {
                self.text(", ");
            }
            if i == required {
                self.text("[");
            }
            self.visit_variable(parameter, tree.get(parameter));
        }
        if required < node.positional_parameters.len() {
            self.text("]");
        }
        if !node.named_parameters.is_empty() {
            self.text(" {");
            for &parameter in &node.named_parameters {
                self.text(" ");
                self.visit_variable(parameter, tree.get(parameter));
            }
            self.text(" }");
        }
        let _ = write!(
            self.out,
            ") {:?}/{:?} -> ",
            node.async_marker, node.dart_async_marker
        );
        self.ty(&node.return_type);
        if let Some(body) = node.body {
            self.indented_stmt(body);
        }
    }

    fn visit_type_parameter(&mut self, _id: TypeParameterId, node: &'a TypeParameter) {
        let _ = write!(
            self.out,
            "{} {:?} {:?} extends ",
            node.name.as_deref().unwrap_or(""),
            node.variance,
            node.flags
        );
        self.ty(&node.bound);
        if let Some(default) = &node.default_type {
            self.text(" = ");
            self.ty(default);
        }
    }

    fn visit_variable(&mut self, id: VariableId, node: &'a VariableDeclaration) {
        let _ = write!(self.out, "{:?} ", node.flags);
        let number = self.next_variable;
        self.next_variable += 1;
        self.ty(&node.ty);
        let _ = write!(
            self.out,
            " {}#{number}",
            node.name.as_deref().unwrap_or("")
        );
        if let Some(initializer) = node.initializer {
            self.text(" = ");
            self.expr(initializer);
        }
        // Not in scope inside its own initializer.
        self.variables.insert(id, number);
    }
}

#[cfg(test)]
mod tests;
