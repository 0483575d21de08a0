//! Computed values, scope tree and inline style handling of `MemoryStyleStore`.

use css_custom_properties::{CustomPropertiesManager, MemoryStyleStore, ScopeKey, StyleStore};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build `<root><parent><child/></parent></root>` and return (parent, child).
fn tree(store: &MemoryStyleStore) -> (ScopeKey, ScopeKey) {
    let parent = store.create_scope(ScopeKey::ROOT).unwrap();
    let child = store.create_scope(parent).unwrap();
    (parent, child)
}

#[test]
fn custom_properties_inherit_down_the_tree() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, child) = tree(&store);
    store.set_property(ScopeKey::ROOT, "--accent", "teal").unwrap();

    let child_props = CustomPropertiesManager::with_target(&store, child);
    assert_eq!(child_props.get("accent").unwrap().as_deref(), Some("teal"));

    store.set_property(parent, "--accent", "navy").unwrap();
    assert_eq!(child_props.get("accent").unwrap().as_deref(), Some("navy"));
    assert_eq!(store.computed_value(ScopeKey::ROOT, "--accent").unwrap(), "teal");
}

#[test]
fn regular_properties_do_not_inherit() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, _child) = tree(&store);
    store.set_property(ScopeKey::ROOT, "Margin-Top", "2px").unwrap();
    assert_eq!(store.computed_value(ScopeKey::ROOT, "margin-top").unwrap(), "2px");
    assert_eq!(store.computed_value(parent, "margin-top").unwrap(), "");
}

#[test]
fn inline_wins_over_rules() {
    init_logging();
    let store = MemoryStyleStore::new();
    let props = CustomPropertiesManager::new(&store);
    store.set_rule_property(ScopeKey::ROOT, "--gap", "8px").unwrap();
    assert_eq!(props.get("gap").unwrap().as_deref(), Some("8px"));

    props.set("gap", "16px").unwrap();
    assert_eq!(props.get("gap").unwrap().as_deref(), Some("16px"));

    props.remove("gap").unwrap();
    assert_eq!(props.get("gap").unwrap().as_deref(), Some("8px"), "rule value shows again");

    store.remove_rule_property(ScopeKey::ROOT, "--gap").unwrap();
    assert_eq!(props.get("gap").unwrap(), None);
}

#[test]
fn var_references_are_substituted() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, child) = tree(&store);
    store.set_property(ScopeKey::ROOT, "--unit", "4px").unwrap();
    store.set_property(parent, "--pad", "calc(var(--unit) * 2)").unwrap();
    store.set_property(child, "padding", "var(--pad) var(--missing, 1px)").unwrap();

    let child_props = CustomPropertiesManager::with_target(&store, child);
    assert_eq!(child_props.get("pad").unwrap().as_deref(), Some("calc(4px * 2)"));
    assert_eq!(store.computed_value(child, "padding").unwrap(), "calc(4px * 2) 1px");
    assert_eq!(
        store.inline_value(parent, "--pad").as_deref(),
        Some("calc(var(--unit) * 2)"),
        "declared value keeps the reference"
    );
}

#[test]
fn inherited_values_are_substituted_where_declared() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, child) = tree(&store);
    store.set_property(ScopeKey::ROOT, "--size", "1px").unwrap();
    store.set_property(ScopeKey::ROOT, "--border", "var(--size) solid").unwrap();
    store.set_property(parent, "--size", "9px").unwrap();

    let child_props = CustomPropertiesManager::with_target(&store, child);
    assert_eq!(child_props.get("border").unwrap().as_deref(), Some("1px solid"));
    assert_eq!(child_props.get("size").unwrap().as_deref(), Some("9px"));
}

#[test]
fn cyclic_references_compute_to_absent() {
    init_logging();
    let store = MemoryStyleStore::new();
    let props = CustomPropertiesManager::new(&store);
    props.set_many([("x", "var(--y)"), ("y", "var(--x)")]).unwrap();
    assert_eq!(props.get("x").unwrap(), None);
    assert_eq!(props.get("y").unwrap(), None);

    store.set_property(ScopeKey::ROOT, "width", "var(--x, 5px)").unwrap();
    assert_eq!(store.computed_value(ScopeKey::ROOT, "width").unwrap(), "5px");

    props.set("self", "var(--self, 5px)").unwrap();
    assert_eq!(props.get("self").unwrap(), None, "self reference ignores its fallback");

    props.set_many([("a", "var(--b, 1px)"), ("b", "var(--a)")]).unwrap();
    assert_eq!(props.get("a").unwrap(), None);
    assert_eq!(props.get("b").unwrap(), None);

    props.set("outside", "var(--a, 2px)").unwrap();
    assert_eq!(props.get("outside").unwrap().as_deref(), Some("2px"));
}

#[test]
fn empty_value_removes_declaration() {
    init_logging();
    let store = MemoryStyleStore::new();
    let props = CustomPropertiesManager::new(&store);
    props.set("tone", "warm").unwrap();
    props.set("tone", "").unwrap();
    assert_eq!(props.get("tone").unwrap(), None);
    assert_eq!(store.inline_value(ScopeKey::ROOT, "--tone"), None);
}

#[test]
fn custom_property_names_are_case_sensitive() {
    init_logging();
    let store = MemoryStyleStore::new();
    let props = CustomPropertiesManager::new(&store);
    props.set("Brand", "red").unwrap();
    assert_eq!(props.get("brand").unwrap(), None);
    assert_eq!(props.get("Brand").unwrap().as_deref(), Some("red"));
}

#[test]
fn css_text_round_trips_inline_style() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, _child) = tree(&store);
    store
        .set_css_text(parent, "--a: 1; COLOR: red; --bad: 1px); --a: 2")
        .unwrap();
    assert_eq!(store.css_text(parent), "--a: 2; color: red;");

    let props = CustomPropertiesManager::with_target(&store, parent);
    props.set("b", "3").unwrap();
    assert_eq!(store.css_text(parent), "--a: 2; color: red; --b: 3;");

    store
        .set_css_text(parent, r#"--sep: "a;b"; --paren: ')'; content: "x""#)
        .unwrap();
    assert_eq!(store.css_text(parent), r#"--sep: "a;b"; --paren: ')'; content: "x";"#);
    assert_eq!(props.get("sep").unwrap().as_deref(), Some(r#""a;b""#));

    store.set_css_text(parent, "").unwrap();
    assert_eq!(store.css_text(parent), "");
    assert_eq!(props.get("a").unwrap(), None);
}

#[test]
fn detaching_removes_descendants() {
    init_logging();
    let store = MemoryStyleStore::new();
    let (parent, child) = tree(&store);
    assert!(store.contains(child));

    store.detach(parent);
    assert!(!store.contains(parent));
    assert!(!store.contains(child));
    assert!(store.create_scope(child).is_err());

    store.detach(ScopeKey::ROOT);
    assert!(store.contains(ScopeKey::ROOT), "the root stays attached");
}
