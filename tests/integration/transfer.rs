use super::{leaf_key, IntegrationHarness};
use scriptmenu::{Catalog, Category, MenuError, Script, ScriptContext};
use std::fs;
use uuid::Uuid;

#[test]
fn resync_is_idempotent() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    for name in ["Foo", "Bar"] {
        store
            .add_script(harness.new_script(
                name,
                Some(tools),
                &[ScriptContext::File, ScriptContext::Directory],
            ))
            .unwrap()
            .into_result()
            .unwrap();
    }
    let before = store.menu_store().root().clone();

    for _ in 0..2 {
        let outcomes = store.resync().unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|outcome| outcome.is_clean()));
        assert_eq!(store.menu_store().root(), &before);
    }
}

#[test]
fn tool_path_change_rewrites_commands() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let id = store
        .add_script(harness.new_script("Foo", None, &[ScriptContext::File]))
        .unwrap()
        .into_result()
        .unwrap();
    let command_key = leaf_key(ScriptContext::File, &["ScriptTools", "Foo"]).join("command");
    let stored = store
        .artifacts()
        .path_of(&store.script(&id).unwrap().stored_file)
        .unwrap();

    assert!(matches!(
        store.set_tool_path("  ", true),
        Err(MenuError::Validation { .. })
    ));
    assert_eq!(store.tool_path(), "python");

    store.set_tool_path("pythonw", false).unwrap();
    assert!(store
        .menu_store()
        .value(&command_key, "")
        .unwrap()
        .starts_with("\"python\" "));

    let outcomes = store.set_tool_path("pythonw", true).unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(
        store.menu_store().value(&command_key, ""),
        Some(format!("\"pythonw\" \"{}\" \"%1\"", stored.display()).as_str())
    );
}

#[test]
fn import_replaces_catalog_and_registrations() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let foo = store
        .add_script(harness.new_script("Foo", Some(tools), &[ScriptContext::File]))
        .unwrap()
        .into_result()
        .unwrap();
    let export = harness.workspace_path().join("export.json");
    store.export_catalog(&export).unwrap();

    let bar = store
        .add_script(harness.new_script("Bar", None, &[ScriptContext::Directory]))
        .unwrap()
        .into_result()
        .unwrap();
    store.remove_category(&tools).unwrap();

    let outcomes = store.import_catalog(&export).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.is_clean()));
    let dropped = outcomes
        .iter()
        .find(|outcome| outcome.script_id == bar)
        .unwrap();
    assert!(dropped.registered.is_none());

    assert!(store.script(&bar).is_none());
    assert_eq!(
        store.resolve_script(&foo).unwrap(),
        super::segments(&["ScriptTools", "Tools", "Foo"])
    );
    let menu = store.menu_store();
    assert!(menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Tools", "Foo"])));
    assert!(!menu.contains(&leaf_key(ScriptContext::Directory, &["ScriptTools", "Bar"])));
}

#[test]
fn import_rejects_cyclic_documents() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    store.add_category("Tools", None).unwrap();
    let before = store.catalog().clone();

    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let mut cyclic = Catalog::new("python");
    cyclic.categories = vec![
        Category {
            id: a,
            name: "A".into(),
            parent: Some(b),
        },
        Category {
            id: b,
            name: "B".into(),
            parent: Some(a),
        },
    ];
    let path = harness.workspace_path().join("cyclic.json");
    fs::write(&path, serde_json::to_vec(&cyclic).unwrap()).unwrap();

    assert!(matches!(
        store.import_catalog(&path),
        Err(MenuError::Cycle { .. })
    ));
    assert_eq!(store.catalog(), &before);
    assert!(store.journal().pending().unwrap().is_empty());
}

fn imported_script(name: &str, stored_file: &str) -> Script {
    Script {
        id: Uuid::new_v4(),
        name: name.into(),
        category: None,
        contexts: [ScriptContext::File].into_iter().collect(),
        stored_file: stored_file.into(),
        icon: None,
    }
}

#[test]
fn import_refuses_artifact_names_outside_storage() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let victim = harness.write_source("victim.txt", "not managed");
    let before = store.catalog().clone();

    let mut escaping = Catalog::new("python");
    escaping
        .scripts
        .push(imported_script("Evil", "../../sources/victim.txt"));
    let mut foreign_icon = Catalog::new("python");
    let mut script = imported_script("Icon", "");
    script.stored_file = format!("{}.py", script.id);
    script.icon = Some("../../sources/victim.txt".into());
    foreign_icon.scripts.push(script);

    for (file_name, document) in [("escaping.json", escaping), ("icon.json", foreign_icon)] {
        let path = harness.workspace_path().join(file_name);
        fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();
        assert!(matches!(
            store.import_catalog(&path),
            Err(MenuError::Validation { .. })
        ));
    }
    assert_eq!(store.catalog(), &before);
    assert!(victim.exists());
}

#[test]
fn import_rejects_colliding_sibling_names() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let before = store.catalog().clone();

    let mut document = Catalog::new("python");
    for name in ["Foo", "foo"] {
        let mut script = imported_script(name, "");
        script.stored_file = format!("{}.py", script.id);
        document.scripts.push(script);
    }
    let path = harness.workspace_path().join("twins.json");
    fs::write(&path, serde_json::to_vec(&document).unwrap()).unwrap();

    assert!(matches!(
        store.import_catalog(&path),
        Err(MenuError::Validation { .. })
    ));
    assert_eq!(store.catalog(), &before);
}
