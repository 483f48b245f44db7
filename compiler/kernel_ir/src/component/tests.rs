use super::*;
use crate::{FunctionNode, Nullability};
use pretty_assertions::assert_eq;

fn path(component: &Component, node: NamedNodeId) -> String {
    let name = component.canonical_name_of(node).unwrap();
    component.names.display(name).to_string()
}

#[test]
fn test_library_class_and_members_are_named_by_owner() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let class = component.add_class(lib, "A").unwrap();
    let field = component
        .add_field(class.into(), Name::new("x"), DartType::Dynamic)
        .unwrap();
    let function = component.tree.alloc(FunctionNode::new(None));
    let getter = component
        .add_procedure(class.into(), ProcedureKind::Getter, Name::new("y"), Some(function))
        .unwrap();
    let ctor_fn = component.tree.alloc(FunctionNode::new(None));
    let ctor = component.add_constructor(class, Name::new(""), ctor_fn).unwrap();

    assert_eq!(path(&component, lib.into()), "file:///a.dart");
    assert_eq!(path(&component, class.into()), "file:///a.dart::A");
    assert_eq!(path(&component, field.into()), "file:///a.dart::A::@fields::x");
    assert_eq!(path(&component, getter.into()), "file:///a.dart::A::@getters::y");
    assert_eq!(path(&component, ctor.into()), "file:///a.dart::A::@constructors::");
    assert_eq!(component.library_uri(lib), Some("file:///a.dart"));
}

#[test]
fn test_private_member_name_includes_library_uri() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let class = component.add_class(lib, "A").unwrap();
    let method = component
        .add_procedure(class.into(), ProcedureKind::Method, Name::new("_m"), None)
        .unwrap();

    assert_eq!(
        path(&component, method.into()),
        "file:///a.dart::A::@methods::file:///a.dart::_m"
    );
    let library_ref = component.tree.get(lib).reference;
    assert_eq!(component.tree.get(method).name.library, Some(library_ref));
}

#[test]
fn test_operator_shares_method_segment() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("dart:core")).unwrap();
    let op = component
        .add_procedure(lib.into(), ProcedureKind::Operator, Name::new("+"), None)
        .unwrap();
    assert_eq!(path(&component, op.into()), "dart:core::@methods::+");
}

#[test]
fn test_duplicate_declaration_is_rejected() {
    let mut component = Component::new();
    let uri = Uri::new("file:///a.dart");
    let lib = component.add_library(&uri).unwrap();
    component.add_class(lib, "A").unwrap();

    assert!(matches!(
        component.add_class(lib, "A"),
        Err(IdentityError::NameAlreadyBound { .. })
    ));
    assert!(component.add_library(&uri).is_err());
}

#[test]
fn test_forward_reference_is_adopted_by_declaration() {
    let mut component = Component::new();
    let forward = component.reference_to(&["file:///a.dart", "A"]);
    assert_eq!(component.resolve(forward), None);

    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let class = component.add_class(lib, "A").unwrap();
    assert_eq!(component.tree.get(class).reference, forward);
    assert_eq!(component.resolve(forward), Some(NamedNodeId::Class(class)));
}

#[test]
fn test_rename_moves_binding() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let class = component.add_class(lib, "A").unwrap();
    let old = component.canonical_name_of(class.into()).unwrap();

    let library_name = component.canonical_name_of(lib.into()).unwrap();
    let new = component.names.get_child(library_name, "B");
    component.rename(class.into(), Some(new)).unwrap();

    assert_eq!(component.canonical_name_of(class.into()), Some(new));
    assert_eq!(component.names.reference_of(old), None);

    component.rename(class.into(), None).unwrap();
    assert_eq!(component.canonical_name_of(class.into()), None);
}

#[test]
fn test_rename_onto_bound_name_fails_atomically() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let a = component.add_class(lib, "A").unwrap();
    let b = component.add_class(lib, "B").unwrap();
    let b_name = component.canonical_name_of(b.into()).unwrap();
    let a_name = component.canonical_name_of(a.into()).unwrap();

    assert!(component.rename(a.into(), Some(b_name)).is_err());
    assert_eq!(component.canonical_name_of(a.into()), Some(a_name));
}

#[test]
fn test_parents_of_declarations() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///a.dart")).unwrap();
    let class = component.add_class(lib, "A").unwrap();
    let object = component.reference_to(&["dart:core", "Object"]);
    let field = component
        .add_field(
            class.into(),
            Name::new("f"),
            DartType::interface(object, Nullability::NonNullable),
        )
        .unwrap();

    assert_eq!(component.tree.parent(lib), Some(TreeNodeId::Component));
    assert_eq!(component.tree.parent(class), Some(TreeNodeId::Library(lib)));
    assert_eq!(component.tree.parent(field), Some(TreeNodeId::Class(class)));
    component.check_parents().unwrap();
}

#[test]
fn test_main_method() {
    let mut component = Component::new();
    let lib = component.add_library(&Uri::new("file:///main.dart")).unwrap();
    let function = component.tree.alloc(FunctionNode::new(None));
    let main = component
        .add_procedure(lib.into(), ProcedureKind::Method, Name::new("main"), Some(function))
        .unwrap();
    assert_eq!(component.main_procedure(), None);
    component.set_main_method(main);
    assert_eq!(component.main_procedure(), Some(main));
}
