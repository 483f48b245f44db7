use super::*;
use crate::{
    Expression, ExprKind, FunctionNode, ProcedureKind, Statement, StmtKind, Uri, VariableGet,
};
use pretty_assertions::assert_eq;

fn build(value: i64) -> Component {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let tree = &mut component.tree;

    let init = tree.alloc(Expression::new(ExprKind::IntLiteral(value)));
    let x = tree.alloc(VariableDeclaration::new("x", DartType::Dynamic).with_initializer(init));
    let decl = tree.alloc(Statement::new(StmtKind::VariableDeclaration(x)));
    let get = tree.alloc(Expression::new(ExprKind::VariableGet(VariableGet {
        variable: x,
        promoted_type: None,
    })));
    let ret = tree.alloc(Statement::new(StmtKind::Return(Some(get))));
    let brk = tree.alloc(Statement::new(StmtKind::Empty));
    let block = tree.alloc(Statement::new(StmtKind::Block(vec![decl, ret, brk])));
    let labeled = tree.alloc(Statement::new(StmtKind::Labeled(block)));
    tree.edit(brk, |node| node.kind = StmtKind::Break(labeled));
    let function = tree.alloc(FunctionNode::new(Some(labeled)).with_return_type(DartType::Void));

    let main = component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("main"), Some(function))
        .unwrap();
    component.set_main_method(main);
    component
}

#[test]
fn test_dump_names_declarations_and_locals() {
    let text = dump(&build(1));
    assert!(text.starts_with("component v41"), "{text}");
    assert!(text.contains("main=file:///a.dart::@methods::main"), "{text}");
    assert!(text.contains("library file:///a.dart"), "{text}");
    assert!(text.contains("dynamic x#0 = 1"), "{text}");
    assert!(text.contains("return x#0;"), "{text}");
    assert!(text.contains("L0:"), "{text}");
    assert!(text.contains("break L0;"), "{text}");
}

#[test]
fn test_dump_is_structural() {
    assert_eq!(dump(&build(7)), dump(&build(7)));
    assert_ne!(dump(&build(7)), dump(&build(8)));
}
