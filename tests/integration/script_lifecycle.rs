use super::{leaf_key, menu_root_key, segments, IntegrationHarness};
use scriptmenu::menu::{ICON_VALUE, LABEL_VALUE};
use scriptmenu::{EntityKind, MenuError, RegistrationStatus, ScriptContext, ScriptUpdate};
use uuid::Uuid;

#[test]
fn add_script_registers_nested_entries_for_each_context() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let outcome = store
        .add_script(harness.new_script(
            "Foo",
            Some(tools),
            &[ScriptContext::File, ScriptContext::Directory],
        ))
        .unwrap();

    assert_eq!(outcome.status(), RegistrationStatus::Registered);
    let id = outcome.into_result().unwrap();
    assert_eq!(
        store.resolve_script(&id).unwrap(),
        segments(&["ScriptTools", "Tools", "Foo"])
    );

    let script = store.script(&id).unwrap().clone();
    assert_eq!(script.stored_file, format!("{id}.py"));
    let stored = store.artifacts().path_of(&script.stored_file).unwrap();
    assert!(stored.is_file());

    for context in [ScriptContext::File, ScriptContext::Directory] {
        let leaf = leaf_key(context, &["ScriptTools", "Tools", "Foo"]);
        let menu = store.menu_store();
        assert_eq!(menu.value(&leaf, ""), Some("Foo"));
        assert_eq!(
            menu.value(&leaf.join("command"), ""),
            Some(format!("\"python\" \"{}\" \"%1\"", stored.display()).as_str())
        );
        let group = menu_root_key(context).join("shell").join("Tools");
        assert_eq!(menu.value(&group, LABEL_VALUE), Some("Tools"));
    }
}

#[test]
fn failure_in_one_context_reports_partial_registration() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    store
        .menu_store_mut()
        .deny_writes_under(menu_root_key(ScriptContext::Directory));

    let outcome = store
        .add_script(harness.new_script(
            "Foo",
            Some(tools),
            &[ScriptContext::File, ScriptContext::Directory],
        ))
        .unwrap();
    let id = outcome.script_id;

    assert_eq!(outcome.status(), RegistrationStatus::PartiallyRegistered);
    assert!(!outcome.is_clean());
    let registered = outcome.registered.as_ref().unwrap();
    assert_eq!(registered.succeeded, vec![ScriptContext::File]);
    assert_eq!(registered.failed.len(), 1);
    assert_eq!(registered.failed[0].context, ScriptContext::Directory);
    assert!(matches!(
        registered.failed[0].error,
        MenuError::NativeStore { .. }
    ));
    match outcome.into_result() {
        Err(MenuError::PartialRegistration(report)) => assert_eq!(report.script_id, id),
        other => panic!("expected partial registration, got {other:?}"),
    }

    // The record is kept even though one context failed.
    assert!(store.script(&id).is_some());
    let menu = store.menu_store();
    assert!(menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Tools", "Foo"])));
    assert!(!menu.contains(&menu_root_key(ScriptContext::Directory)));
}

#[test]
fn rejected_requests_leave_no_side_effects() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();

    let err = store
        .add_script(harness.new_script("Foo", None, &[]))
        .unwrap_err();
    assert!(matches!(err, MenuError::Validation { field: "contexts", .. }));

    let mut request = harness.new_script("Foo", None, &[ScriptContext::File]);
    request.name = "Foo\\Bar".into();
    let err = store.add_script(request).unwrap_err();
    assert!(matches!(err, MenuError::Validation { .. }));

    let missing = Uuid::new_v4();
    let mut request = harness.new_script("Foo", None, &[ScriptContext::File]);
    request.category = Some(missing);
    let err = store.add_script(request).unwrap_err();
    assert!(matches!(
        err,
        MenuError::NotFound {
            kind: EntityKind::Category,
            ..
        }
    ));

    let err = store
        .update_script(&missing, ScriptUpdate::default())
        .unwrap_err();
    assert!(matches!(
        err,
        MenuError::NotFound {
            kind: EntityKind::Script,
            ..
        }
    ));
    assert!(matches!(
        store.remove_script(&missing),
        Err(MenuError::NotFound { .. })
    ));

    assert!(store.scripts().is_empty());
    assert!(store.menu_store().all_keys().is_empty());
    let stored = std::fs::read_dir(store.artifacts().dir()).unwrap().count();
    assert_eq!(stored, 0);
}

#[test]
fn moving_a_script_prunes_the_old_group() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let other = store.add_category("Other", None).unwrap();
    let id = store
        .add_script(harness.new_script("Foo", Some(tools), &[ScriptContext::File]))
        .unwrap()
        .into_result()
        .unwrap();

    let outcome = store
        .update_script(
            &id,
            ScriptUpdate {
                name: Some("Bar".into()),
                category: Some(Some(other)),
                ..ScriptUpdate::default()
            },
        )
        .unwrap();
    assert!(outcome.is_clean());
    assert_eq!(
        outcome.unregistered.as_ref().unwrap().path,
        segments(&["ScriptTools", "Tools", "Foo"])
    );
    assert_eq!(
        outcome.registered.as_ref().unwrap().path,
        segments(&["ScriptTools", "Other", "Bar"])
    );

    let menu = store.menu_store();
    let root = menu_root_key(ScriptContext::File).join("shell");
    assert!(!menu.contains(&root.join("Tools")));
    assert!(menu.contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Other", "Bar"])));
}

#[test]
fn changing_contexts_removes_entries_from_dropped_context() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let id = store
        .add_script(harness.new_script("Foo", None, &[ScriptContext::File]))
        .unwrap()
        .into_result()
        .unwrap();

    store
        .update_script(
            &id,
            ScriptUpdate {
                contexts: Some([ScriptContext::Directory].into_iter().collect()),
                ..ScriptUpdate::default()
            },
        )
        .unwrap()
        .into_result()
        .unwrap();

    let menu = store.menu_store();
    assert!(!menu.contains(&menu_root_key(ScriptContext::File)));
    assert!(menu.contains(&leaf_key(ScriptContext::Directory, &["ScriptTools", "Foo"])));
}

#[test]
fn icon_is_stored_swapped_and_cleared() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let id = store
        .add_script(harness.new_script("Foo", None, &[ScriptContext::File]))
        .unwrap()
        .into_result()
        .unwrap();
    let leaf = leaf_key(ScriptContext::File, &["ScriptTools", "Foo"]);
    assert_eq!(store.menu_store().value(&leaf, ICON_VALUE), None);

    let icon = harness.write_source("foo.ico", "icon-bytes");
    store
        .update_script(
            &id,
            ScriptUpdate {
                icon: Some(icon),
                ..ScriptUpdate::default()
            },
        )
        .unwrap()
        .into_result()
        .unwrap();
    let stored_icon = store.script(&id).unwrap().icon.clone().unwrap();
    assert_eq!(stored_icon, format!("{id}_icon.ico"));
    let icon_path = store.artifacts().path_of(&stored_icon).unwrap();
    assert!(icon_path.is_file());
    assert_eq!(
        store.menu_store().value(&leaf, ICON_VALUE),
        Some(icon_path.display().to_string().as_str())
    );

    store
        .update_script(
            &id,
            ScriptUpdate {
                clear_icon: true,
                ..ScriptUpdate::default()
            },
        )
        .unwrap()
        .into_result()
        .unwrap();
    assert!(store.script(&id).unwrap().icon.is_none());
    assert!(!icon_path.exists());
    assert_eq!(store.menu_store().value(&leaf, ICON_VALUE), None);
}

#[test]
fn removing_a_script_deletes_entries_record_and_artifacts() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let id = store
        .add_script(harness.new_script(
            "Foo",
            Some(tools),
            &[ScriptContext::File, ScriptContext::Directory],
        ))
        .unwrap()
        .into_result()
        .unwrap();
    let stored = store
        .artifacts()
        .path_of(&store.script(&id).unwrap().stored_file)
        .unwrap();

    let outcome = store.remove_script(&id).unwrap();
    assert_eq!(outcome.status(), RegistrationStatus::Unregistered);
    assert!(outcome.is_clean());

    assert!(store.script(&id).is_none());
    assert!(!stored.exists());
    for context in [ScriptContext::File, ScriptContext::Directory] {
        assert!(!store.menu_store().contains(&menu_root_key(context)));
    }
    // The category itself is untouched.
    assert!(store.category(&tools).is_some());
}

#[test]
fn sibling_names_must_be_unique_within_a_menu() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    let tools = store.add_category("Tools", None).unwrap();
    let other = store.add_category("Other", None).unwrap();
    let files = [ScriptContext::File];
    let foo = store
        .add_script(harness.new_script("Foo", Some(tools), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let bar = store
        .add_script(harness.new_script("Foo", Some(other), &files))
        .unwrap()
        .into_result()
        .unwrap();
    let before = store.catalog().clone();
    let menu_before = store.menu_store().root().clone();

    for name in ["Foo", "FOO"] {
        let err = store
            .add_script(harness.new_script(name, Some(tools), &files))
            .unwrap_err();
        assert!(matches!(err, MenuError::Validation { field: "script name", .. }));
    }
    assert!(matches!(
        store.add_category("foo", Some(tools)),
        Err(MenuError::Validation { .. })
    ));
    assert!(matches!(
        store.add_category("tools", None),
        Err(MenuError::Validation { .. })
    ));
    assert!(matches!(
        store.update_script(
            &bar,
            ScriptUpdate {
                category: Some(Some(tools)),
                ..ScriptUpdate::default()
            },
        ),
        Err(MenuError::Validation { .. })
    ));
    assert!(matches!(
        store.update_category(
            &other,
            scriptmenu::CategoryUpdate {
                name: Some("TOOLS".into()),
                parent: None,
            },
        ),
        Err(MenuError::Validation { .. })
    ));

    assert_eq!(store.catalog(), &before);
    assert_eq!(store.menu_store().root(), &menu_before);
    assert_eq!(std::fs::read_dir(store.artifacts().dir()).unwrap().count(), 2);
    assert!(store.journal().pending().unwrap().is_empty());

    // Each script still owns its own leaf, so removing one keeps the other.
    store.remove_script(&foo).unwrap().into_result().unwrap();
    assert!(store
        .menu_store()
        .contains(&leaf_key(ScriptContext::File, &["ScriptTools", "Other", "Foo"])));

    // Renaming onto its own name (different case) is not a collision.
    store
        .update_script(
            &bar,
            ScriptUpdate {
                name: Some("foo".into()),
                ..ScriptUpdate::default()
            },
        )
        .unwrap()
        .into_result()
        .unwrap();
}

#[test]
fn add_script_journals_before_recording_the_script() {
    let harness = IntegrationHarness::new();
    let mut store = harness.open_store();
    // A directory where the journal file belongs makes every append fail.
    std::fs::create_dir_all(&store.layout().journal_file).unwrap();

    let err = store
        .add_script(harness.new_script("Foo", None, &[ScriptContext::File]))
        .unwrap_err();
    assert!(matches!(err, MenuError::Io { .. }));

    assert!(store.scripts().is_empty());
    let persisted: scriptmenu::Catalog =
        serde_json::from_slice(&std::fs::read(&store.layout().catalog_file).unwrap()).unwrap();
    assert!(persisted.scripts.is_empty());
    assert_eq!(std::fs::read_dir(store.artifacts().dir()).unwrap().count(), 0);
    assert!(store.menu_store().all_keys().is_empty());
}
