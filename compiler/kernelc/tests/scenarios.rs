//! End-to-end scenarios: build a component, write it, read it back.

use kernel_ir::dump::dump;
use kernel_ir::{
    Catch, Component, DartType, ExprKind, Expression, FieldInitializer, FileOffset, FunctionNode,
    Initializer, InitializerKind, KernelVersion, NamedNodeId, Nullability, ProcedureKind,
    Statement, StmtId, StmtKind, Tree, TryCatch, TryCatchFlags, Uri, VariableDeclaration,
    VariableGet, VariableId,
};
use kernelc::{deserialize, serialize, serialize_with_slots, KernelConfig};
use pretty_assertions::assert_eq;

fn single(bytes: &[u8]) -> Component {
    let mut components = deserialize(bytes).unwrap();
    assert_eq!(components.len(), 1);
    components.remove(0)
}

fn declare(tree: &mut Tree, name: &str) -> (VariableId, StmtId) {
    let variable = tree.alloc(VariableDeclaration::new(name, DartType::Dynamic));
    let stmt = tree.alloc(Statement::new(StmtKind::VariableDeclaration(variable)));
    (variable, stmt)
}

/// One library holding `main() {}`.
fn empty_main(config: &KernelConfig) -> Component {
    let mut component = config.new_component();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let body = component
        .tree
        .alloc(Statement::new(StmtKind::Block(Vec::new())));
    let function = component.tree.alloc(FunctionNode::new(Some(body)));
    let main = component
        .add_procedure(lib.into(), ProcedureKind::Method, "main".into(), Some(function))
        .unwrap();
    component.set_main_method(main);
    component
}

#[test]
fn test_scenario_a_empty_main() {
    for version in [KernelVersion::V40, KernelVersion::V41] {
        let config = KernelConfig::default().with_version(version);
        let bytes = serialize(&empty_main(&config)).unwrap();
        assert_eq!(&bytes[..4], &[0x90, 0xAB, 0xCD, 0xEF]);
        assert_eq!(&bytes[4..8], &version.format.to_be_bytes());

        let decoded = single(&bytes);
        assert_eq!(decoded.version, version);
        let libraries = decoded.libraries();
        assert_eq!(libraries.len(), 1);
        let library = decoded.tree.get(libraries[0]);
        assert_eq!(library.procedures.len(), 1);

        let procedure = decoded.tree.get(library.procedures[0]);
        assert_eq!(procedure.name.text, "main");
        assert_eq!(decoded.main_procedure(), Some(library.procedures[0]));

        let function = decoded.tree.get(procedure.function.unwrap());
        assert_eq!(function.parameter_count(), 0);
        let body = decoded.tree.get(function.body.unwrap());
        assert_eq!(body.kind, StmtKind::Block(Vec::new()));
    }
}

#[test]
fn test_scenario_b_field_initializer() {
    let mut component = KernelConfig::default().new_component();
    let lib = component.add_library(&Uri::new("file:///foo.dart")).unwrap();
    let foo = component.add_class(lib, "Foo").unwrap();
    let string = component.reference_to(&["dart:core", "String"]);
    let x = component
        .add_field(
            foo.into(),
            "x".into(),
            DartType::interface(string, Nullability::NonNullable),
        )
        .unwrap();
    let x_reference = component.tree.get(x).reference;

    let tree = &mut component.tree;
    let value = tree.alloc(Expression::new(ExprKind::StringLiteral("hello".to_owned())));
    let initializer = tree.alloc(Initializer::new(InitializerKind::Field(FieldInitializer {
        field: x_reference,
        value,
    })));
    let body = tree.alloc(Statement::new(StmtKind::Empty));
    let function = tree.alloc(FunctionNode::new(Some(body)));
    let constructor = component.add_constructor(foo, "".into(), function).unwrap();
    component
        .tree
        .edit(constructor, |node| node.initializers.push(initializer));
    component.check_parents().unwrap();

    let decoded = single(&serialize(&component).unwrap());
    assert_eq!(dump(&decoded), dump(&component));

    let library = decoded.tree.get(decoded.libraries()[0]);
    assert_eq!(library.classes.len(), 1);
    let class = decoded.tree.get(library.classes[0]);
    assert_eq!(class.name, "Foo");
    assert_eq!(class.fields.len(), 1);
    let field = class.fields[0];
    assert_eq!(decoded.tree.get(field).name.text, "x");

    assert_eq!(class.constructors.len(), 1);
    let constructor = decoded.tree.get(class.constructors[0]);
    assert_eq!(constructor.initializers.len(), 1);
    match &decoded.tree.get(constructor.initializers[0]).kind {
        InitializerKind::Field(initializer) => {
            assert_eq!(
                decoded.resolve(initializer.field),
                Some(NamedNodeId::Field(field))
            );
        }
        other => panic!("expected a field initializer, found {other:?}"),
    }
}

#[test]
fn test_scenario_c_nested_block_slots() {
    // { var a; { var b; } var c; return c; }
    let mut component = KernelConfig::default().new_component();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let tree = &mut component.tree;
    let (a, decl_a) = declare(tree, "a");
    let (b, decl_b) = declare(tree, "b");
    let (c, decl_c) = declare(tree, "c");
    let inner = tree.alloc(Statement::new(StmtKind::Block(vec![decl_b])));
    let use_c = tree.alloc(Expression::new(ExprKind::VariableGet(VariableGet {
        variable: c,
        promoted_type: None,
    })));
    let ret = tree.alloc(Statement::new(StmtKind::Return(Some(use_c))));
    let body = tree.alloc(Statement::new(StmtKind::Block(vec![
        decl_a, inner, decl_c, ret,
    ])));
    let function = tree.alloc(FunctionNode::new(Some(body)));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, "main".into(), Some(function))
        .unwrap();

    let (bytes, slots) = serialize_with_slots(&component).unwrap();
    assert_eq!((slots[&a], slots[&b], slots[&c]), (0, 1, 1));

    // The read side resolves `c` by the same slot.
    let decoded = single(&bytes);
    assert_eq!(dump(&decoded), dump(&component));
    assert!(dump(&decoded).contains("return c#2;"));
}

#[test]
fn test_slot_assignment_repeats_across_passes() {
    // main(p, q) {
    //   var a;
    //   { var b; }
    //   try { var t; } catch (e, s) { var inner; }
    //   var c;
    // }
    let mut component = KernelConfig::default().new_component();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let tree = &mut component.tree;
    let p = tree.alloc(VariableDeclaration::new("p", DartType::Dynamic));
    let q = tree.alloc(VariableDeclaration::new("q", DartType::Dynamic));
    let (a, decl_a) = declare(tree, "a");
    let (b, decl_b) = declare(tree, "b");
    let (t, decl_t) = declare(tree, "t");
    let (inner, decl_inner) = declare(tree, "inner");
    let (c, decl_c) = declare(tree, "c");
    let e = tree.alloc(VariableDeclaration::new("e", DartType::Dynamic));
    let s = tree.alloc(VariableDeclaration::new("s", DartType::Dynamic));

    let nested = tree.alloc(Statement::new(StmtKind::Block(vec![decl_b])));
    let try_body = tree.alloc(Statement::new(StmtKind::Block(vec![decl_t])));
    let catch_body = tree.alloc(Statement::new(StmtKind::Block(vec![decl_inner])));
    let try_catch = tree.alloc(Statement::new(StmtKind::TryCatch(TryCatch {
        body: try_body,
        catches: vec![Catch {
            file_offset: FileOffset::NONE,
            guard: DartType::Dynamic,
            exception: Some(e),
            stack_trace: Some(s),
            body: catch_body,
        }],
        flags: TryCatchFlags::empty(),
    })));
    let body = tree.alloc(Statement::new(StmtKind::Block(vec![
        decl_a, nested, try_catch, decl_c,
    ])));
    let function = tree.alloc(FunctionNode::new(Some(body)).with_positional(vec![p, q]));
    component
        .add_procedure(lib.into(), ProcedureKind::Method, "main".into(), Some(function))
        .unwrap();

    let (first_bytes, first_slots) = serialize_with_slots(&component).unwrap();
    let (second_bytes, second_slots) = serialize_with_slots(&component).unwrap();
    assert_eq!(first_slots.len(), 9);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(first_slots, second_slots);

    let slots: Vec<u32> = [p, q, a, b, t, e, s, inner, c]
        .iter()
        .map(|variable| first_slots[variable])
        .collect();
    assert_eq!(slots, [0, 1, 2, 3, 3, 3, 4, 5, 3]);
}
