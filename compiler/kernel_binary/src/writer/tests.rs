use super::*;
use kernel_ir::{
    ExprKind, Expression, KernelVersion, Nullability, ProcedureKind, Statement, StmtKind,
    TypeParameter, TypeParameterType, VariableDeclaration, VariableGet,
};
use pretty_assertions::assert_eq;

use crate::MAX_UINT;

/// A component whose only library holds `main` with the given body.
fn component_with_main(body: impl FnOnce(&mut Tree) -> StmtId) -> Component {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let body = body(&mut component.tree);
    let function = component.tree.alloc(FunctionNode::new(Some(body)));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("main"), Some(function))
        .unwrap();
    component
}

fn declare(tree: &mut Tree, name: &str) -> (VariableId, StmtId) {
    let variable = tree.alloc(VariableDeclaration::new(name, DartType::Dynamic));
    let stmt = tree.alloc(Statement::new(StmtKind::VariableDeclaration(variable)));
    (variable, stmt)
}

fn get(tree: &mut Tree, variable: VariableId) -> ExprId {
    tree.alloc(Expression::new(ExprKind::VariableGet(VariableGet {
        variable,
        promoted_type: None,
    })))
}

fn expression_bytes(component: &Component, expr: ExprId) -> Vec<u8> {
    let mut writer = KernelWriter::new(component);
    writer.write_expr(expr).unwrap();
    writer.sink.into_bytes()
}

fn int_literal_bytes(value: i64) -> Vec<u8> {
    let mut component = Component::new();
    let literal = component
        .tree
        .alloc(Expression::new(ExprKind::IntLiteral(value)));
    expression_bytes(&component, literal)
}

#[test]
fn test_empty_component_layout() {
    let bytes = write_component(&Component::new()).unwrap();
    assert_eq!(&bytes[..4], &[0x90, 0xAB, 0xCD, 0xEF]);
    assert_eq!(&bytes[4..8], &41u32.to_be_bytes());
    assert_eq!(bytes.len() % 8, 0);

    let len = bytes.len();
    assert_eq!(&bytes[len - 4..], &(len as u32).to_be_bytes());
    assert_eq!(&bytes[len - 8..len - 4], &0u32.to_be_bytes());
}

#[test]
fn test_component_is_padded_to_eight_bytes() {
    for name in ["a", "ab", "abc", "abcd", "abcde"] {
        let mut component = component_with_main(|tree| {
            tree.alloc(Statement::new(StmtKind::Block(Vec::new())))
        });
        component.add_class(component.libraries()[0], name).unwrap();
        let bytes = write_component(&component).unwrap();
        assert_eq!(bytes.len() % 8, 0, "class {name}");
    }
}

#[test]
fn test_older_format_has_no_compiled_mode_word() {
    let latest = write_component(&Component::new()).unwrap();
    let older = write_component(&Component::with_version(KernelVersion::V40)).unwrap();
    assert_eq!(&older[4..8], &40u32.to_be_bytes());
    // Both end on an 8-byte boundary; the older index is one word shorter
    // before padding.
    assert!(older.len() <= latest.len());
}

#[test]
fn test_small_int_literals_use_specialized_tag() {
    for value in -3..=4 {
        assert_eq!(
            int_literal_bytes(value),
            vec![tags::SPECIALIZED_INT_LITERAL + (value + 3) as u8],
            "literal {value}"
        );
    }
}

#[test]
fn test_medium_int_literals_use_sign_tag_and_four_bytes() {
    assert_eq!(
        int_literal_bytes(5),
        vec![tags::POSITIVE_INT_LITERAL, 0xC0, 0x00, 0x00, 0x05]
    );
    assert_eq!(
        int_literal_bytes(-4),
        vec![tags::NEGATIVE_INT_LITERAL, 0xC0, 0x00, 0x00, 0x04]
    );
    assert_eq!(
        int_literal_bytes(i64::from(MAX_UINT)),
        vec![tags::POSITIVE_INT_LITERAL, 0xFF, 0xFF, 0xFF, 0xFF]
    );
}

#[test]
fn test_large_int_literals_go_through_string_table() {
    let mut component = Component::new();
    let literal = component
        .tree
        .alloc(Expression::new(ExprKind::IntLiteral(1 << 40)));
    let mut writer = KernelWriter::new(&component);
    writer.write_expr(literal).unwrap();
    assert_eq!(writer.strings.strings()[1], (1i64 << 40).to_string());
    assert_eq!(writer.sink.into_bytes(), vec![tags::BIG_INT_LITERAL, 1]);
}

#[test]
fn test_variable_get_specialized_below_slot_eight() {
    let mut component = Component::new();
    let variables: Vec<VariableId> = (0..9)
        .map(|i| {
            component
                .tree
                .alloc(VariableDeclaration::new(format!("v{i}"), DartType::Dynamic))
        })
        .collect();
    let low = get(&mut component.tree, variables[7]);
    let high = get(&mut component.tree, variables[8]);

    let mut writer = KernelWriter::new(&component);
    for &variable in &variables {
        writer.variables.declare(variable);
        writer.declaration_offsets.insert(variable, 0);
    }
    writer.write_expr(low).unwrap();
    writer.write_expr(high).unwrap();
    assert_eq!(
        writer.sink.into_bytes(),
        vec![
            tags::SPECIALIZED_VARIABLE_GET + 7,
            0, // no file offset
            0, // declaration offset
            tags::VARIABLE_GET,
            0,
            0,
            8, // slot
            tags::NOTHING,
        ]
    );
}

#[test]
fn test_nested_block_slots_rewind() {
    // { var a; { var b; } var c; }
    let mut vars = Vec::new();
    let component = component_with_main(|tree| {
        let (a, decl_a) = declare(tree, "a");
        let (b, decl_b) = declare(tree, "b");
        let (c, decl_c) = declare(tree, "c");
        vars = vec![a, b, c];
        let inner = tree.alloc(Statement::new(StmtKind::Block(vec![decl_b])));
        tree.alloc(Statement::new(StmtKind::Block(vec![decl_a, inner, decl_c])))
    });

    let (_, slots) = write_component_with_slots(&component).unwrap();
    assert_eq!(slots[&vars[0]], 0);
    assert_eq!(slots[&vars[1]], 1);
    assert_eq!(slots[&vars[2]], 1);
}

#[test]
fn test_slots_follow_parameters() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let tree = &mut component.tree;
    let p = tree.alloc(VariableDeclaration::new("p", DartType::Dynamic));
    let (local, decl) = declare(tree, "local");
    let body = tree.alloc(Statement::new(StmtKind::Block(vec![decl])));
    let function = tree.alloc(FunctionNode::new(Some(body)).with_positional(vec![p]));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("f"), Some(function))
        .unwrap();

    let (_, slots) = write_component_with_slots(&component).unwrap();
    assert_eq!(slots[&p], 0);
    assert_eq!(slots[&local], 1);
}

#[test]
fn test_slot_assignment_is_deterministic() {
    let component = component_with_main(|tree| {
        let (a, decl_a) = declare(tree, "a");
        let use_a = get(tree, a);
        let ret = tree.alloc(Statement::new(StmtKind::Return(Some(use_a))));
        tree.alloc(Statement::new(StmtKind::Block(vec![decl_a, ret])))
    });
    let first = write_component_with_slots(&component).unwrap();
    let second = write_component_with_slots(&component).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_undeclared_variable_is_rejected() {
    let mut stray = None;
    let component = component_with_main(|tree| {
        let variable = tree.alloc(VariableDeclaration::new("x", DartType::Dynamic));
        stray = Some(variable);
        let use_x = get(tree, variable);
        tree.alloc(Statement::new(StmtKind::Return(Some(use_x))))
    });
    assert_eq!(
        write_component(&component),
        Err(WriteError::VariableNotInScope {
            variable: stray.unwrap()
        })
    );
}

#[test]
fn test_variable_from_closed_block_is_rejected() {
    // { { var a; } var b; return a; }
    let mut hidden = None;
    let component = component_with_main(|tree| {
        let (a, decl_a) = declare(tree, "a");
        let (_, decl_b) = declare(tree, "b");
        hidden = Some(a);
        let inner = tree.alloc(Statement::new(StmtKind::Block(vec![decl_a])));
        let use_a = get(tree, a);
        let ret = tree.alloc(Statement::new(StmtKind::Return(Some(use_a))));
        tree.alloc(Statement::new(StmtKind::Block(vec![inner, decl_b, ret])))
    });
    assert_eq!(
        write_component(&component),
        Err(WriteError::VariableNotInScope {
            variable: hidden.unwrap()
        })
    );
}

#[test]
fn test_break_outside_its_label_is_rejected() {
    let mut target = None;
    let component = component_with_main(|tree| {
        let empty = tree.alloc(Statement::new(StmtKind::Empty));
        let labeled = tree.alloc(Statement::new(StmtKind::Labeled(empty)));
        target = Some(labeled);
        let stray_break = tree.alloc(Statement::new(StmtKind::Break(labeled)));
        tree.alloc(Statement::new(StmtKind::Block(vec![labeled, stray_break])))
    });
    assert_eq!(
        write_component(&component),
        Err(WriteError::LabelNotInScope {
            target: target.unwrap()
        })
    );
}

#[test]
fn test_unbound_reference_is_rejected() {
    let mut component = Component::new();
    let dangling = component.names.new_reference();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let tree = &mut component.tree;
    let read = tree.alloc(Expression::new(ExprKind::StaticGet(dangling)));
    let body = tree.alloc(Statement::new(StmtKind::Expression(read)));
    let function = tree.alloc(FunctionNode::new(Some(body)));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("main"), Some(function))
        .unwrap();

    assert_eq!(
        write_component(&component),
        Err(WriteError::UnboundReference {
            what: "static get target"
        })
    );
}

#[test]
fn test_type_parameter_outside_its_declaration_is_rejected() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let parameter = component.tree.alloc(TypeParameter::new("T"));
    let field_type = DartType::TypeParameter(TypeParameterType {
        nullability: Nullability::NonNullable,
        parameter,
        bound: None,
    });
    component
        .add_field(lib.into(), Name::new("x"), field_type)
        .unwrap();

    assert_eq!(
        write_component(&component),
        Err(WriteError::TypeParameterNotInScope { parameter })
    );
}

#[test]
fn test_canonical_names_are_written_parent_first() {
    let component = component_with_main(|tree| tree.alloc(Statement::new(StmtKind::Empty)));
    let mut writer = KernelWriter::new(&component);
    writer.visit_component(&component).unwrap();
    let table = &component.names;
    let names = writer.names.names();
    for (position, &name) in names.iter().enumerate() {
        if let Some(parent) = table.parent(name).filter(|&p| !table.is_root(p)) {
            let parent_position = names.iter().position(|&n| n == parent).unwrap();
            assert!(parent_position < position, "{}", table.display(name));
        }
    }
}
