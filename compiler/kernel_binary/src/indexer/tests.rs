use super::*;
use kernel_ir::{CanonicalNames, StmtId, TypeParameterId, Uri, VariableId};
use pretty_assertions::assert_eq;

#[test]
fn test_string_indexer_reserves_empty_string() {
    let mut strings = StringIndexer::new();
    assert_eq!(strings.put(""), 0);
    assert_eq!(strings.put("a"), 1);
    assert_eq!(strings.put("b"), 2);
    assert_eq!(strings.put("a"), 1);
    assert_eq!(strings.strings(), &["", "a", "b"]);
}

#[test]
fn test_name_indexer_indexes_parents_first() {
    let mut names = CanonicalNames::new();
    let root = names.root();
    let lib = names.get_child(root, "lib");
    let class = names.get_child(lib, "A");
    let method = names.get_path(class, ["@methods", "m"]);

    let mut indexer = NameIndexer::new();
    assert_eq!(indexer.index(&names, root), 0);
    // lib, A, @methods are indexed before m.
    assert_eq!(indexer.index(&names, method), 4);
    assert_eq!(indexer.index(&names, lib), 1);
    assert_eq!(indexer.index(&names, class), 2);
    assert_eq!(indexer.get(method), Some(4));
    assert_eq!(indexer.names().len(), 4);
    assert_eq!(indexer.names()[0], lib);
}

#[test]
fn test_uri_indexer_reserves_none() {
    let mut uris = UriIndexer::new();
    let a = Uri::new("file:///a.dart");
    assert_eq!(uris.put(None), 0);
    assert_eq!(uris.put(Some(&a)), 1);
    assert_eq!(uris.put(Some(&a)), 1);
    assert_eq!(uris.uris(), &[None, Some(a)]);
}

#[test]
fn test_variable_slots_are_reused_after_scope() {
    // { var a; { var b; } var c; }
    let (a, b, c) = (VariableId::new(0), VariableId::new(1), VariableId::new(2));
    let mut variables = VariableIndexer::new();
    variables.push_scope();
    assert_eq!(variables.declare(a), 0);
    variables.push_scope();
    assert_eq!(variables.declare(b), 1);
    variables.pop_scope();
    assert_eq!(variables.slot(b), None);
    assert_eq!(variables.declare(c), 1);
    assert_eq!(variables.slot(a), Some(0));
    variables.pop_scope();
    assert_eq!(variables.height(), 0);
}

#[test]
fn test_restore_scope_brings_parameters_back() {
    let (p, q) = (VariableId::new(0), VariableId::new(1));
    let mut variables = VariableIndexer::new();
    variables.push_scope();
    variables.declare(p);
    variables.declare(q);
    variables.pop_scope();
    assert_eq!(variables.slot(q), None);

    variables.restore_scope([p, q]);
    assert_eq!(variables.slot(p), Some(0));
    assert_eq!(variables.slot(q), Some(1));
}

#[test]
fn test_reused_slot_hides_the_earlier_variable() {
    // { { var a; } var b; use(a) }
    let (a, b) = (VariableId::new(0), VariableId::new(1));
    let mut variables = VariableIndexer::new();
    variables.push_scope();
    variables.push_scope();
    assert_eq!(variables.declare(a), 0);
    variables.pop_scope();
    assert_eq!(variables.declare(b), 0);
    assert_eq!(variables.slot(a), None);
    assert_eq!(variables.slot(b), Some(0));
}

#[test]
fn test_label_indexer_nesting() {
    let (outer, inner) = (StmtId::new(0), StmtId::new(1));
    let mut labels = LabelIndexer::new();
    assert_eq!(labels.enter(outer), 0);
    assert_eq!(labels.enter(inner), 1);
    assert_eq!(labels.index(outer), Some(0));
    labels.exit();
    assert_eq!(labels.index(inner), None);
    assert_eq!(labels.index(outer), Some(0));
}

#[test]
fn test_type_parameter_indexer() {
    let (t, u) = (TypeParameterId::new(0), TypeParameterId::new(1));
    let mut parameters = TypeParameterIndexer::new();
    parameters.extend(&[t]);
    let height = parameters.height();
    parameters.extend(&[u]);
    assert_eq!(parameters.index(u), Some(1));
    parameters.truncate(height);
    assert_eq!(parameters.index(u), None);
    assert_eq!(parameters.index(t), Some(0));
}
