use super::*;
use crate::{DartType, IfStatement};
use pretty_assertions::assert_eq;

fn int(tree: &mut Tree, value: i64) -> ExprId {
    tree.alloc(Expression::new(ExprKind::IntLiteral(value)))
}

fn expr_stmt(tree: &mut Tree, value: i64) -> StmtId {
    let expr = int(tree, value);
    tree.alloc(Statement::new(StmtKind::Expression(expr)))
}

#[test]
fn test_alloc_sets_parent_of_children() {
    let mut tree = Tree::new();
    let a = int(&mut tree, 1);
    let b = int(&mut tree, 2);
    let concat = tree.alloc(Expression::new(ExprKind::StringConcatenation(vec![a, b])));

    assert_eq!(tree.parent(a), Some(TreeNodeId::Expr(concat)));
    assert_eq!(tree.parent(b), Some(TreeNodeId::Expr(concat)));
    assert_eq!(tree.parent(concat), None);
    assert_eq!(
        tree.children(concat.into()).to_vec(),
        vec![TreeNodeId::Expr(a), TreeNodeId::Expr(b)]
    );
}

#[test]
fn test_edit_replacing_slot_moves_parent() {
    let mut tree = Tree::new();
    let condition = tree.alloc(Expression::new(ExprKind::BoolLiteral(true)));
    let then = expr_stmt(&mut tree, 1);
    let replacement = expr_stmt(&mut tree, 2);
    let stmt = tree.alloc(Statement::new(StmtKind::If(IfStatement {
        condition,
        then,
        otherwise: None,
    })));
    assert_eq!(tree.parent(then), Some(TreeNodeId::Stmt(stmt)));

    tree.edit(stmt, |node| {
        if let StmtKind::If(if_stmt) = &mut node.kind {
            if_stmt.then = replacement;
        }
    });

    assert_eq!(tree.parent(then), None);
    assert_eq!(tree.parent(replacement), Some(TreeNodeId::Stmt(stmt)));
    assert_eq!(tree.parent(condition), Some(TreeNodeId::Stmt(stmt)));
}

#[test]
fn test_push_and_remove_statement() {
    let mut tree = Tree::new();
    let first = expr_stmt(&mut tree, 1);
    let block = tree.alloc(Statement::new(StmtKind::Block(vec![first])));
    let second = expr_stmt(&mut tree, 2);

    tree.push_statement(block, second).unwrap();
    assert_eq!(tree.parent(second), Some(TreeNodeId::Stmt(block)));

    assert!(tree.remove_statement(block, first).unwrap());
    assert_eq!(tree.parent(first), None);
    assert!(!tree.remove_statement(block, first).unwrap());

    match &tree.get(block).kind {
        StmtKind::Block(statements) => assert_eq!(statements, &vec![second]),
        other => panic!("expected block, got {other:?}"),
    }
}

#[test]
fn test_push_statement_into_non_block_fails() {
    let mut tree = Tree::new();
    let stmt = expr_stmt(&mut tree, 1);
    let other = expr_stmt(&mut tree, 2);
    assert_eq!(
        tree.push_statement(stmt, other),
        Err(TreeError::NotABlock(stmt))
    );
    assert_eq!(tree.parent(other), None);
}

#[test]
fn test_move_between_blocks_keeps_new_parent() {
    let mut tree = Tree::new();
    let moved = expr_stmt(&mut tree, 1);
    let from = tree.alloc(Statement::new(StmtKind::Block(vec![moved])));
    let to = tree.alloc(Statement::new(StmtKind::Block(vec![])));

    // Insert first, then remove: the removal must not clear the new parent.
    tree.push_statement(to, moved).unwrap();
    tree.remove_statement(from, moved).unwrap();
    assert_eq!(tree.parent(moved), Some(TreeNodeId::Stmt(to)));
    tree.check_parents(&[from.into(), to.into()]).unwrap();
}

#[test]
fn test_check_parents_reports_shared_child() {
    let mut tree = Tree::new();
    let shared = expr_stmt(&mut tree, 1);
    let first = tree.alloc(Statement::new(StmtKind::Block(vec![shared])));
    let second = tree.alloc(Statement::new(StmtKind::Block(vec![shared])));

    assert_eq!(tree.parent(shared), Some(TreeNodeId::Stmt(second)));
    let err = tree.check_parents(&[first.into()]).unwrap_err();
    assert_eq!(
        err,
        TreeError::StaleParent {
            child: TreeNodeId::Stmt(shared),
            owner: TreeNodeId::Stmt(first),
            parent: Some(TreeNodeId::Stmt(second)),
        }
    );
}

#[test]
fn test_variable_declaration_children() {
    let mut tree = Tree::new();
    let init = int(&mut tree, 3);
    let var = tree.alloc(VariableDeclaration::new("x", DartType::Dynamic).with_initializer(init));
    let decl = tree.alloc(Statement::new(StmtKind::VariableDeclaration(var)));

    assert_eq!(tree.parent(init), Some(TreeNodeId::Variable(var)));
    assert_eq!(tree.parent(var), Some(TreeNodeId::Stmt(decl)));
}

#[test]
fn test_arena_iteration_order() {
    let mut tree = Tree::new();
    let a = int(&mut tree, 1);
    let b = int(&mut tree, 2);
    let ids: Vec<ExprId> = tree.arena::<ExprId>().iter().map(|(id, _)| id).collect();
    assert_eq!(ids, vec![a, b]);
    assert_eq!(tree.arena::<StmtId>().len(), 0);
}
