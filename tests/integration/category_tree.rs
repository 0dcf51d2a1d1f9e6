use super::{leaf_key, menu_root_key, segments, IntegrationHarness};
use scriptmenu::menu::MenuStore;
use scriptmenu::{CategoryUpdate, EntityKind, MenuError, ScriptContext};
use uuid::Uuid;

#[test]
fn category_paths_resolve_from_the_menu_root() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let text = store.add_category("Text", Some(tools)).unwrap();

    assert_eq!(store.resolve_category(None).unwrap(), segments(&["ScriptTools"]));
    assert_eq!(
        store.resolve_category(Some(text)).unwrap(),
        segments(&["ScriptTools", "Tools", "Text"])
    );
    assert!(matches!(
        store.resolve_category(Some(Uuid::new_v4())),
        Err(MenuError::NotFound {
            kind: EntityKind::Category,
            ..
        })
    ));
    assert!(matches!(
        store.add_category("Orphan", Some(Uuid::new_v4())),
        Err(MenuError::NotFound { .. })
    ));
    assert_eq!(store.categories().len(), 2);
}

#[test]
fn removing_a_category_cascades_to_its_subtree() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let sub = store.add_category("Sub", Some(tools)).unwrap();
    let keep = store.add_category("Keep", None).unwrap();
    let files = [ScriptContext::File];
    let foo = store
        .add_script(harness.new_script("Foo", Some(tools), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let bar = store
        .add_script(harness.new_script("Bar", Some(sub), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let baz = store
        .add_script(harness.new_script("Baz", Some(keep), &files))
        .unwrap()
        .into_result()
        .unwrap();
    assert_eq!(store.scripts_under(&tools).unwrap().len(), 2);

    let outcomes = store.remove_category(&tools).unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.is_clean()));

    assert!(store.category(&tools).is_none());
    assert!(store.category(&sub).is_none());
    assert!(store.script(&foo).is_none());
    assert!(store.script(&bar).is_none());
    assert!(store.script(&baz).is_some());

    let menu = store.menu_store();
    let root = menu_root_key(ScriptContext::File).join("shell");
    assert!(!menu.contains(&root.join("Tools")));
    assert!(menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Keep", "Baz"])));
}

#[test]
fn reparenting_under_a_descendant_is_rejected() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let a = store.add_category("A", None).unwrap();
    let b = store.add_category("B", Some(a)).unwrap();
    let c = store.add_category("C", Some(b)).unwrap();
    let before = store.catalog().clone();

    for parent in [c, a] {
        let err = store
            .update_category(
                &a,
                CategoryUpdate {
                    name: Some("Renamed".into()),
                    parent: Some(Some(parent)),
                },
            )
            .unwrap_err();
        assert!(matches!(err, MenuError::Cycle { category, .. } if category == a));
    }
    assert_eq!(store.catalog(), &before);
    assert!(store.journal().pending().unwrap().is_empty());
}

#[test]
fn renaming_and_moving_categories_re_registers_descendants() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let sub = store.add_category("Sub", Some(tools)).unwrap();
    let contexts = [ScriptContext::File, ScriptContext::Directory];
    store
        .add_script(harness.new_script("Foo", Some(tools), &contexts))
        .unwrap()
        .into_result()
        .unwrap();
    store
        .add_script(harness.new_script("Bar", Some(sub), &contexts))
        .unwrap()
        .into_result()
        .unwrap();

    let outcomes = store
        .update_category(
            &tools,
            CategoryUpdate {
                name: Some("Utils".into()),
                parent: None,
            },
        )
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|outcome| outcome.is_clean()));
    for context in contexts {
        let menu = store.menu_store();
        let root = menu_root_key(context).join("shell");
        assert!(!menu.contains(&root.join("Tools")));
        assert!(menu.contains(&leaf_key(context, &["ScriptTools", "Utils", "Foo"])));
        assert!(menu.contains(&leaf_key(context, &["ScriptTools", "Utils", "Sub", "Bar"])));
    }

    let outcomes = store
        .update_category(
            &sub,
            CategoryUpdate {
                name: None,
                parent: Some(None),
            },
        )
        .unwrap();
    assert_eq!(outcomes.len(), 1);
    for context in contexts {
        let menu = store.menu_store();
        assert!(!menu.contains(&leaf_key(context, &["ScriptTools", "Utils", "Sub", "Bar"])));
        assert!(menu.contains(&leaf_key(context, &["ScriptTools", "Sub", "Bar"])));
        assert!(menu.contains(&leaf_key(context, &["ScriptTools", "Utils", "Foo"])));
    }
}

#[test]
fn pruning_keeps_siblings_and_foreign_keys() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let files = [ScriptContext::File];
    let foo = store
        .add_script(harness.new_script("Foo", Some(tools), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let bar = store
        .add_script(harness.new_script("Bar", Some(tools), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let foreign = menu_root_key(ScriptContext::File)
        .join("shell")
        .join("Foreign");
    store
        .menu_store_mut()
        .ensure_group(&foreign, "Foreign")
        .unwrap();

    store.remove_script(&foo).unwrap().into_result().unwrap();
    let menu = store.menu_store();
    assert!(!menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Tools", "Foo"])));
    assert!(menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Tools", "Bar"])));

    store.remove_script(&bar).unwrap().into_result().unwrap();
    let menu = store.menu_store();
    let root = menu_root_key(ScriptContext::File);
    assert!(!menu.contains(&root.join("shell").join("Tools")));
    assert!(menu.contains(&foreign));
    assert!(menu.contains(&root));
}
