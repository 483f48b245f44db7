use super::*;
use crate::{ClassId, NamedNodeId};
use pretty_assertions::assert_eq;

#[test]
fn test_get_child_is_idempotent() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let a = names.get_child(root, "dart:core");
    let b = names.get_child(root, "dart:core");
    assert_eq!(a, b);
    assert_eq!(names.len(), 2);
    assert_eq!(names.parent(a), Some(root));
    assert_eq!(names.text(a), "dart:core");
}

#[test]
fn test_same_segment_under_different_parents() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let lib = names.get_child(root, "lib");
    let other = names.get_child(root, "other");
    let a = names.get_child(lib, "Foo");
    let b = names.get_child(other, "Foo");
    assert_ne!(a, b);
    assert_eq!(names.child(lib, "Foo"), Some(a));
    assert_eq!(names.child(lib, "Bar"), None);
}

#[test]
fn test_bind_twice_to_same_reference_is_noop() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let name = names.get_child(root, "lib");
    let reference = names.new_reference();
    names.bind_to(name, reference).unwrap();
    names.bind_to(name, reference).unwrap();
    assert_eq!(names.reference_of(name), Some(reference));
    assert_eq!(names.canonical_name(reference), Some(name));
}

#[test]
fn test_bind_to_other_reference_fails() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let name = names.get_child(root, "lib");
    let first = names.new_reference();
    let second = names.new_reference();
    names.bind_to(name, first).unwrap();

    let err = names.bind_to(name, second).unwrap_err();
    assert_eq!(
        err,
        IdentityError::NameAlreadyBound {
            name: "lib".to_string()
        }
    );
    assert_eq!(names.canonical_name(second), None);
    assert_eq!(names.reference_of(name), Some(first));
}

#[test]
fn test_bound_reference_cannot_take_second_name() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let a = names.get_child(root, "a");
    let b = names.get_child(root, "b");
    let reference = names.new_reference();
    names.bind_to(a, reference).unwrap();

    let err = names.bind_to(b, reference).unwrap_err();
    assert!(matches!(err, IdentityError::ReferenceAlreadyBound { .. }));
    assert_eq!(names.reference_of(b), None);
}

#[test]
fn test_root_is_not_bindable() {
    let mut names = CanonicalNames::new();
    let reference = names.new_reference();
    let root = names.root();
    assert_eq!(
        names.bind_to(root, reference),
        Err(IdentityError::RootNotBindable)
    );
}

#[test]
fn test_unbind_then_rebind() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let name = names.get_child(root, "lib");
    let first = names.new_reference();
    let second = names.new_reference();
    names.bind_to(name, first).unwrap();
    names.unbind(name);
    assert_eq!(names.canonical_name(first), None);
    names.bind_to(name, second).unwrap();
    assert_eq!(names.reference_of(name), Some(second));
}

#[test]
fn test_reference_for_reuses_binding() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let name = names.get_child(root, "lib");
    let a = names.reference_for(name);
    let b = names.reference_for(name);
    assert_eq!(a, b);
    assert_eq!(names.canonical_name(a), Some(name));
}

#[test]
fn test_node_lookup() {
    let mut names = CanonicalNames::new();
    let reference = names.new_reference();
    assert_eq!(names.node(reference), None);
    names.set_node(reference, NamedNodeId::Class(ClassId::new(3)));
    assert_eq!(names.node(reference), Some(NamedNodeId::Class(ClassId::new(3))));
}

#[test]
fn test_display_path() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let name = names.get_path(root, ["file:///a.dart", "A", "@methods", "foo"]);
    assert_eq!(
        names.display(name).to_string(),
        "file:///a.dart::A::@methods::foo"
    );
    assert_eq!(names.display(root).to_string(), "<root>");
    assert_eq!(names.path(name), vec!["file:///a.dart", "A", "@methods", "foo"]);
}

#[test]
fn test_remove_child_detaches_subtree() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let lib = names.get_child(root, "lib");
    let removed = names.remove_child(root, "lib");
    assert_eq!(removed, Some(lib));
    assert_eq!(names.child(root, "lib"), None);
    assert_eq!(names.parent(lib), None);
    let fresh = names.get_child(root, "lib");
    assert_ne!(fresh, lib);
}

#[cfg(target_pointer_width = "64")]
#[test]
#[should_panic(expected = "too many canonical names")]
fn test_name_capacity_overflow_panics() {
    to_u32(u32::MAX as usize + 1, "canonical names");
}
