use super::*;
use kernel_ir::dump::dump;
use kernel_ir::{
    CompiledMode, DartType, ExprKind, Expression, InterfaceType, Nullability, Statement,
    StmtKind, VariableDeclaration, VariableGet,
};
use pretty_assertions::assert_eq;

use crate::{write_component, write_components};

/// `main() { L0: { var x = value; return x; break L0; } }`
fn labeled_main(value: i64) -> Component {
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

/// `main() { return 4; }`
fn return_four() -> Component {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let tree = &mut component.tree;
    let four = tree.alloc(Expression::new(ExprKind::IntLiteral(4)));
    let ret = tree.alloc(Statement::new(StmtKind::Return(Some(four))));
    let function = tree.alloc(FunctionNode::new(Some(ret)));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("main"), Some(function))
        .unwrap();
    component
}

/// `List<List<...<dynamic>>>`, `depth` levels deep.
fn nested_list_type(list: Reference, depth: usize) -> DartType {
    let mut ty = DartType::Dynamic;
    for _ in 0..depth {
        ty = DartType::Interface(InterfaceType {
            nullability: Nullability::NonNullable,
            class: list,
            type_arguments: vec![ty],
        });
    }
    ty
}

/// Take a nested type apart one level at a time and return its depth.
fn unnest(mut ty: DartType) -> usize {
    let mut depth = 0;
    while let DartType::Interface(mut node) = ty {
        depth += 1;
        ty = node.type_arguments.pop().unwrap_or(DartType::Dynamic);
    }
    depth
}

fn take_main_return_type(component: &mut Component) -> DartType {
    let main = component.tree.get(component.libraries()[0]).procedures[0];
    let function = component.tree.get(main).function.unwrap();
    component
        .tree
        .edit(function, |node| std::mem::replace(&mut node.return_type, DartType::Dynamic))
}

fn read_one(bytes: &[u8]) -> Component {
    let mut components = read_components(bytes).unwrap();
    assert_eq!(components.len(), 1);
    components.remove(0)
}

#[test]
fn test_labeled_block_round_trips() {
    let original = labeled_main(7);
    let decoded = read_one(&write_component(&original).unwrap());
    assert_eq!(dump(&decoded), dump(&original));
    decoded.check_parents().unwrap();
}

#[test]
fn test_main_method_resolves_after_read() {
    let decoded = read_one(&write_component(&labeled_main(1)).unwrap());
    let main = decoded.main_procedure().unwrap();
    assert_eq!(decoded.tree.get(main).name.text, "main");
}

#[test]
fn test_sources_round_trip() {
    let mut original = return_four();
    let file = Uri::new("file:///a.dart");
    original.add_source(file.clone(), Source::new("main() {\n  return 4;\n}\n", Some(file.clone())));

    let decoded = read_one(&write_component(&original).unwrap());
    assert_eq!(decoded.sources.get(&file), original.sources.get(&file));
}

#[test]
fn test_version_and_mode_round_trip() {
    let mut latest = return_four();
    latest.compiled_mode = CompiledMode::Weak;
    let decoded = read_one(&write_component(&latest).unwrap());
    assert_eq!(decoded.version, KernelVersion::V41);
    assert_eq!(decoded.compiled_mode, CompiledMode::Weak);

    let mut older = Component::with_version(KernelVersion::V40);
    older.compiled_mode = CompiledMode::Weak;
    let decoded = read_one(&write_component(&older).unwrap());
    assert_eq!(decoded.version, KernelVersion::V40);
    // The older index has no word for the mode.
    assert_eq!(decoded.compiled_mode, CompiledMode::default());
}

#[test]
fn test_concatenated_components_read_in_order() {
    let first = labeled_main(1);
    let second = labeled_main(2);
    let bytes = write_components(&[first.clone(), second.clone()]).unwrap();

    let decoded = read_components(&bytes).unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(dump(&decoded[0]), dump(&first));
    assert_eq!(dump(&decoded[1]), dump(&second));
}

#[test]
fn test_empty_component_reads_back_empty() {
    let decoded = read_one(&write_component(&Component::new()).unwrap());
    assert!(decoded.libraries().is_empty());
    assert_eq!(decoded.main_method, None);
}

#[test]
fn test_bad_magic_is_incompatible() {
    let mut bytes = write_component(&return_four()).unwrap();
    bytes[..4].copy_from_slice(&0xDEAD_BEEFu32.to_be_bytes());
    let err = read_components(&bytes).unwrap_err();
    assert_eq!(
        err,
        ReadError::InvalidMagic {
            found: 0xDEAD_BEEF,
            offset: 0
        }
    );
    assert!(err.is_incompatible());
}

#[test]
fn test_unknown_version_is_incompatible() {
    let mut bytes = write_component(&return_four()).unwrap();
    bytes[4..8].copy_from_slice(&39u32.to_be_bytes());
    let err = read_components(&bytes).unwrap_err();
    assert_eq!(
        err,
        ReadError::UnsupportedVersion {
            version: 39,
            offset: 4
        }
    );
    assert!(err.is_incompatible());
}

#[test]
fn test_short_input_is_eof() {
    let err = read_components(&[0x90, 0xAB]).unwrap_err();
    assert!(matches!(err, ReadError::UnexpectedEof { .. }), "{err}");
    assert!(!err.is_incompatible());
}

#[test]
fn test_truncated_component_is_rejected() {
    let bytes = write_component(&labeled_main(3)).unwrap();
    for cut in [8, bytes.len() / 2, bytes.len() - 4] {
        let result = read_components(&bytes[..cut]);
        assert!(result.is_err(), "truncated to {cut} bytes");
    }
}

#[test]
fn test_unknown_expression_tag_reports_offset() {
    let mut bytes = write_component(&return_four()).unwrap();
    // return, no offset, some value, the literal 4
    let pattern = [
        tags::RETURN_STATEMENT,
        0,
        tags::SOMETHING,
        tags::SPECIALIZED_INT_LITERAL + 7,
    ];
    let at = bytes
        .windows(pattern.len())
        .position(|window| window == pattern)
        .unwrap()
        + 3;
    bytes[at] = 0x7F;

    assert_eq!(
        read_components(&bytes).unwrap_err(),
        ReadError::UnexpectedTag {
            kind: "expression",
            tag: 0x7F,
            offset: at
        }
    );
}

#[test]
fn test_bad_library_count_is_malformed() {
    let mut bytes = write_component(&return_four()).unwrap();
    let len = bytes.len();
    bytes[len - 8..len - 4].copy_from_slice(&u32::MAX.to_be_bytes());
    assert!(matches!(
        read_components(&bytes).unwrap_err(),
        ReadError::Malformed { .. }
    ));
}

#[test]
fn test_deeply_nested_type_reads_on_small_stack() {
    const DEPTH: usize = 100_000;
    let mut original = return_four();
    let list = original.reference_to(&["dart:core", "List"]);
    let main = original.tree.get(original.libraries()[0]).procedures[0];
    let function = original.tree.get(main).function.unwrap();
    original.tree.edit(function, |node| {
        node.return_type = nested_list_type(list, DEPTH);
    });
    let bytes = write_component(&original).unwrap();
    assert_eq!(unnest(take_main_return_type(&mut original)), DEPTH);

    let depth = std::thread::Builder::new()
        .stack_size(1024 * 1024)
        .spawn(move || {
            let mut decoded = read_one(&bytes);
            unnest(take_main_return_type(&mut decoded))
        })
        .unwrap()
        .join()
        .unwrap();
    assert_eq!(depth, DEPTH);
}
