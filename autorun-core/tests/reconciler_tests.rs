//! Reconciler operations against an in-memory Run key and a temp-dir cache.

use std::fs;
use std::path::{Path, PathBuf};

use autorun_core::{
    CacheDocument, CacheStore, ErrorKind, ItemFilter, JsonCacheStore, MemoryRunKey,
    ReconcileError, Reconciler, RunKey, StartupItem,
};
use tempfile::TempDir;

type TestReconciler = Reconciler<MemoryRunKey, JsonCacheStore>;

fn reconciler(home: &TempDir, key: MemoryRunKey) -> TestReconciler {
    Reconciler::new(key, JsonCacheStore::new(home.path().join("autostart.json")))
}

fn seed_cache(home: &TempDir, items: Vec<StartupItem>) {
    JsonCacheStore::new(home.path().join("autostart.json"))
        .save(&CacheDocument { items })
        .expect("seed cache");
}

fn cached(r: &TestReconciler) -> CacheDocument {
    r.store().load().expect("load cache")
}

fn make_exe(dir: &Path, file: &str) -> PathBuf {
    let path = dir.join(file);
    fs::write(&path, b"MZ").expect("write exe");
    path
}

// ---------------------------------------------------------------------------
// 1. Sync scenarios
// ---------------------------------------------------------------------------

#[test]
fn sync_imports_registry_value_into_empty_cache() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(&home, MemoryRunKey::with_values([("Foo", "\"C:\\a.exe\"")]));

    r.sync().expect("sync");

    assert_eq!(
        cached(&r).items,
        vec![StartupItem::new("Foo", "\"C:\\a.exe\"", true)]
    );
}

#[test]
fn sync_soft_disables_item_missing_from_registry() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Bar", "bar.exe", true)]);
    let mut r = reconciler(&home, MemoryRunKey::new());

    let report = r.sync().expect("sync");

    assert_eq!(cached(&r).items, vec![StartupItem::new("Bar", "bar.exe", false)]);
    assert_eq!(report.disabled, vec!["Bar".to_string()]);
}

#[test]
fn sync_is_idempotent() {
    let home = TempDir::new().unwrap();
    seed_cache(
        &home,
        vec![
            StartupItem::new("Gone", "gone.exe", true),
            StartupItem::new("Kept", "old.exe", false),
        ],
    );
    let mut r = reconciler(
        &home,
        MemoryRunKey::with_values([("Kept", "new.exe"), ("Fresh", "fresh.exe")]),
    );

    let first = r.sync().expect("first sync");
    let after_first = cached(&r);
    let bytes_first = fs::read(r.store().path()).unwrap();

    let second = r.sync().expect("second sync");

    assert!(!first.is_empty());
    assert!(second.is_empty(), "second sync changed: {second:?}");
    assert_eq!(cached(&r), after_first);
    assert_eq!(fs::read(r.store().path()).unwrap(), bytes_first);
}

#[test]
fn sync_recovers_from_corrupt_cache() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("autostart.json"), b"{ \"items\": [ broken").unwrap();
    let mut r = reconciler(&home, MemoryRunKey::with_values([("Foo", "foo.exe")]));

    r.sync().expect("corrupt cache must not abort sync");

    assert_eq!(cached(&r).items, vec![StartupItem::new("Foo", "foo.exe", true)]);
}

#[test]
fn sync_rewrites_corrupt_cache_even_without_registry_values() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join("autostart.json"), b"garbage").unwrap();
    let mut r = reconciler(&home, MemoryRunKey::new());

    let report = r.sync().expect("sync");

    assert!(report.is_empty());
    assert!(cached(&r).is_empty(), "file must parse again after sync");
}

#[test]
fn sync_collapses_duplicate_names_in_cache() {
    let home = TempDir::new().unwrap();
    seed_cache(
        &home,
        vec![
            StartupItem::new("Foo", "a.exe", true),
            StartupItem::new("Foo", "b.exe", false),
        ],
    );
    let mut r = reconciler(&home, MemoryRunKey::with_values([("Foo", "c.exe")]));

    let report = r.sync().expect("sync");

    assert_eq!(report.deduplicated, vec!["Foo".to_string()]);
    assert_eq!(cached(&r).items, vec![StartupItem::new("Foo", "c.exe", true)]);

    r.disable("Foo").expect("disable");
    assert_eq!(cached(&r).items, vec![StartupItem::new("Foo", "c.exe", false)]);
    r.enable("Foo").expect("enable after dedup");
    assert_eq!(r.run_key().values()["Foo"], "c.exe");
    assert_eq!(r.items(ItemFilter::All).len(), 1);
}

#[test]
fn sync_skipped_when_registry_unreadable() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Bar", "bar.exe", true)]);
    let mut key = MemoryRunKey::new();
    key.set_fail_reads(true);
    let mut r = reconciler(&home, key);

    let err = r.sync().unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RegistryAccess);
    assert_eq!(cached(&r).items, vec![StartupItem::new("Bar", "bar.exe", true)]);
}

// ---------------------------------------------------------------------------
// 2. Add program / add command
// ---------------------------------------------------------------------------

#[test]
fn add_program_quotes_absolute_path() {
    let home = TempDir::new().unwrap();
    let apps = TempDir::new().unwrap();
    let exe = make_exe(apps.path(), "My Tool.exe");
    let mut r = reconciler(&home, MemoryRunKey::new());

    let item = r.add_program(&exe, "My Tool").expect("add");

    let expected = format!("\"{}\"", exe.display());
    assert_eq!(item, StartupItem::new("My Tool", expected.clone(), true));
    assert_eq!(r.run_key().values()["My Tool"], expected);
    assert_eq!(cached(&r).items, vec![item]);
}

#[test]
fn add_program_overwrites_existing_value_in_place() {
    let home = TempDir::new().unwrap();
    let apps = TempDir::new().unwrap();
    let exe = make_exe(apps.path(), "tool.exe");
    seed_cache(&home, vec![StartupItem::new("tool", "old.exe", false)]);
    let mut r = reconciler(&home, MemoryRunKey::with_values([("tool", "old.exe")]));

    r.add_program(&exe, "tool").expect("add");

    let doc = cached(&r);
    assert_eq!(doc.len(), 1);
    assert!(doc.items[0].enabled);
    assert!(doc.items[0].command.contains("tool.exe"));
}

#[test]
fn add_program_missing_file_is_not_found() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(&home, MemoryRunKey::new());

    let err = r
        .add_program(&home.path().join("nope.exe"), "nope")
        .unwrap_err();

    assert!(matches!(err, ReconcileError::ProgramNotFound { .. }), "got: {err}");
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(r.run_key().values().is_empty());
    assert!(!r.store().path().exists());
}

#[test]
fn add_program_rejects_directory_and_empty_name() {
    let home = TempDir::new().unwrap();
    let apps = TempDir::new().unwrap();
    let exe = make_exe(apps.path(), "tool.exe");
    let mut r = reconciler(&home, MemoryRunKey::new());

    let dir_err = r.add_program(apps.path(), "dir").unwrap_err();
    let name_err = r.add_program(&exe, "   ").unwrap_err();

    assert_eq!(dir_err.kind(), ErrorKind::InvalidInput);
    assert_eq!(name_err.kind(), ErrorKind::InvalidInput);
    assert!(r.run_key().values().is_empty());
}

#[test]
fn add_program_registry_failure_leaves_cache_unchanged() {
    let home = TempDir::new().unwrap();
    let apps = TempDir::new().unwrap();
    let exe = make_exe(apps.path(), "tool.exe");
    seed_cache(&home, vec![StartupItem::new("Other", "other.exe", true)]);
    let before = fs::read(home.path().join("autostart.json")).unwrap();
    let mut key = MemoryRunKey::new();
    key.set_fail_writes(true);
    let mut r = reconciler(&home, key);

    let err = r.add_program(&exe, "tool").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RegistryAccess);
    assert!(err.to_string().contains("Access is denied."), "got: {err}");
    assert_eq!(fs::read(r.store().path()).unwrap(), before);
}

#[test]
fn add_command_stores_command_verbatim() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(&home, MemoryRunKey::new());
    let command = r"python E:\project\task-manager\main.py --minimized";

    r.add_command(command, "TaskManager").expect("add");

    assert_eq!(r.run_key().values()["TaskManager"], command);
    assert_eq!(
        cached(&r).items,
        vec![StartupItem::new("TaskManager", command, true)]
    );
}

#[test]
fn add_command_rejects_blank_command() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(&home, MemoryRunKey::new());

    let err = r.add_command("  ", "Blank").unwrap_err();

    assert!(matches!(err, ReconcileError::InvalidInput(_)));
    assert!(!r.contains("Blank").unwrap());
}

#[test]
fn add_command_registry_failure_leaves_cache_unchanged() {
    let home = TempDir::new().unwrap();
    let mut key = MemoryRunKey::new();
    key.set_fail_writes(true);
    let mut r = reconciler(&home, key);

    assert!(r.add_command("calc.exe", "Calc").is_err());
    assert!(!r.store().path().exists(), "no phantom cache entry");
}

// ---------------------------------------------------------------------------
// 3. Remove
// ---------------------------------------------------------------------------

#[test]
fn remove_program_forgets_item_entirely() {
    let home = TempDir::new().unwrap();
    seed_cache(
        &home,
        vec![
            StartupItem::new("Foo", "foo.exe", true),
            StartupItem::new("Bar", "bar.exe", false),
        ],
    );
    let mut r = reconciler(&home, MemoryRunKey::with_values([("Foo", "foo.exe")]));

    r.remove_program("Foo").expect("remove");

    assert!(r.run_key().values().is_empty());
    assert_eq!(cached(&r).items, vec![StartupItem::new("Bar", "bar.exe", false)]);
}

#[test]
fn remove_missing_value_is_not_found() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Foo", "foo.exe", false)]);
    let mut r = reconciler(&home, MemoryRunKey::new());

    let err = r.remove_program("Foo").unwrap_err();

    assert!(matches!(err, ReconcileError::EntryNotFound { ref name } if name == "Foo"));
    assert_eq!(cached(&r).len(), 1, "cache untouched on failure");
}

#[test]
fn remove_registry_failure_is_distinct_from_not_found() {
    let home = TempDir::new().unwrap();
    let mut key = MemoryRunKey::with_values([("Foo", "foo.exe")]);
    key.set_fail_writes(true);
    let mut r = reconciler(&home, key);

    let err = r.remove_program("Foo").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RegistryAccess);
}

// ---------------------------------------------------------------------------
// 4. Enable / disable
// ---------------------------------------------------------------------------

#[test]
fn disable_then_enable_restores_registry_value() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(
        &home,
        MemoryRunKey::with_values([("Foo", "\"C:\\Program Files\\foo.exe\" --tray")]),
    );
    r.sync().expect("sync");
    let original = r.run_key().values()["Foo"].clone();

    let disabled = r.disable("Foo").expect("disable");
    assert!(!disabled.enabled);
    assert!(r.run_key().get("Foo").unwrap().is_none());
    assert_eq!(cached(&r).get("Foo").unwrap().command, original);

    let enabled = r.enable("Foo").expect("enable");
    assert!(enabled.enabled);
    assert_eq!(r.run_key().values()["Foo"], original);
    assert_eq!(cached(&r).items, vec![StartupItem::new("Foo", original, true)]);
}

#[test]
fn disable_value_already_removed_externally_succeeds() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Foo", "foo.exe", true)]);
    let mut r = reconciler(&home, MemoryRunKey::new());

    let item = r.disable("Foo").expect("disable must tolerate a missing value");

    assert_eq!(item, StartupItem::new("Foo", "foo.exe", false));
    assert_eq!(cached(&r).items, vec![item]);
}

#[test]
fn enable_registry_failure_keeps_item_disabled() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Foo", "foo.exe", false)]);
    let mut key = MemoryRunKey::new();
    key.set_fail_writes(true);
    let mut r = reconciler(&home, key);

    let err = r.enable("Foo").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RegistryAccess);
    assert!(!cached(&r).get("Foo").unwrap().enabled);
}

#[test]
fn disable_registry_failure_keeps_item_enabled() {
    let home = TempDir::new().unwrap();
    seed_cache(&home, vec![StartupItem::new("Foo", "foo.exe", true)]);
    let mut key = MemoryRunKey::with_values([("Foo", "foo.exe")]);
    key.set_fail_writes(true);
    let mut r = reconciler(&home, key);

    assert!(r.disable("Foo").is_err());
    assert!(cached(&r).get("Foo").unwrap().enabled);
}

#[test]
fn enable_and_disable_check_item_state() {
    let home = TempDir::new().unwrap();
    seed_cache(
        &home,
        vec![
            StartupItem::new("On", "on.exe", true),
            StartupItem::new("Off", "off.exe", false),
        ],
    );
    let mut r = reconciler(&home, MemoryRunKey::with_values([("On", "on.exe")]));

    assert_eq!(r.enable("On").unwrap_err().kind(), ErrorKind::InvalidInput);
    assert_eq!(r.disable("Off").unwrap_err().kind(), ErrorKind::InvalidInput);
    assert!(matches!(
        r.enable("Missing").unwrap_err(),
        ReconcileError::EntryNotFound { .. }
    ));
    assert!(matches!(
        r.disable("Missing").unwrap_err(),
        ReconcileError::EntryNotFound { .. }
    ));
}

// ---------------------------------------------------------------------------
// 5. Queries
// ---------------------------------------------------------------------------

#[test]
fn is_registered_strips_quotes_and_resolves_paths() {
    let home = TempDir::new().unwrap();
    let apps = TempDir::new().unwrap();
    let exe = make_exe(apps.path(), "tool.exe");
    let mut r = reconciler(&home, MemoryRunKey::new());
    r.add_program(&exe, "tool").expect("add");

    assert!(r.is_registered(&exe, "tool").unwrap());
    assert!(!r.is_registered(&apps.path().join("other.exe"), "tool").unwrap());
    assert!(!r.is_registered(&exe, "absent").unwrap());
}

#[test]
fn is_registered_compares_relative_against_absolute() {
    let home = TempDir::new().unwrap();
    let cwd = std::env::current_dir().unwrap();
    let exe = cwd.join("relative-tool.exe");
    let mut r = reconciler(
        &home,
        MemoryRunKey::with_values([("rel", format!("\"{}\"", exe.display()))]),
    );

    assert!(r.is_registered(Path::new("relative-tool.exe"), "rel").unwrap());
    r.run_key_mut().values_mut().clear();
    assert!(!r.is_registered(Path::new("relative-tool.exe"), "rel").unwrap());
}

#[test]
fn items_are_sorted_and_filtered() {
    let home = TempDir::new().unwrap();
    seed_cache(
        &home,
        vec![
            StartupItem::new("b", "b.exe", true),
            StartupItem::new("c", "c.exe", false),
            StartupItem::new("a", "a.exe", true),
        ],
    );
    let r = reconciler(&home, MemoryRunKey::new());

    let all: Vec<_> = r.items(ItemFilter::All).into_iter().map(|i| i.name).collect();
    let enabled: Vec<_> = r.items(ItemFilter::Enabled).into_iter().map(|i| i.name).collect();
    let disabled: Vec<_> = r.items(ItemFilter::Disabled).into_iter().map(|i| i.name).collect();

    assert_eq!(all, ["a", "b", "c"]);
    assert_eq!(enabled, ["a", "b"]);
    assert_eq!(disabled, ["c"]);
    assert_eq!(cached(&r).items[0].name, "b", "stored order untouched");
}

#[test]
fn registered_reads_live_values() {
    let home = TempDir::new().unwrap();
    let mut r = reconciler(&home, MemoryRunKey::with_values([("Foo", "foo.exe")]));
    r.run_key_mut()
        .values_mut()
        .insert("Late".into(), "late.exe".into());

    let live = r.registered().unwrap();

    assert_eq!(live.keys().collect::<Vec<_>>(), ["Foo", "Late"]);
    assert!(r.contains("Late").unwrap());
}

#[test]
fn registered_entries_include_unreadable_values() {
    let home = TempDir::new().unwrap();
    let mut key = MemoryRunKey::with_values([("Foo", "foo.exe")]);
    key.insert_unreadable("Blob");
    let mut r = reconciler(&home, key);

    let entries = r.registered_entries().unwrap();

    assert_eq!(
        entries,
        vec![
            ("Blob".to_string(), None),
            ("Foo".to_string(), Some("foo.exe".to_string())),
        ]
    );
    assert!(!r.registered().unwrap().contains_key("Blob"));
    assert!(r.contains("Blob").unwrap());

    r.remove_program("Blob").expect("unreadable value can be removed");
    assert!(!r.contains("Blob").unwrap());
}

#[test]
fn is_registered_surfaces_unreadable_value() {
    let home = TempDir::new().unwrap();
    let mut key = MemoryRunKey::new();
    key.insert_unreadable("tool");
    let r = reconciler(&home, key);

    let err = r.is_registered(Path::new("tool.exe"), "tool").unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RegistryAccess);
}
