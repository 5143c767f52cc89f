//! Results file persistence on disk

use glossa::error::StoreError;
use glossa::generation::Description;
use glossa::store::ResultStore;
use std::fs;
use tempfile::TempDir;

fn description(title: &str) -> Description {
    Description::new(title, format!("Определение и основные концепции. {}", title))
}

/// Writing the same entry twice leaves exactly one copy
#[test]
fn test_upsert_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("topicDescriptions.js"));

    store.upsert("5", &description("Алгебра")).unwrap();
    let once = fs::read_to_string(store.path()).unwrap();
    store.upsert("5", &description("Алгебра")).unwrap();
    let twice = fs::read_to_string(store.path()).unwrap();

    assert_eq!(once, twice);
    assert_eq!(store.read_all().unwrap().len(), 1);
}

/// Upserting replaces the existing entry and keeps the others
#[test]
fn test_upsert_replaces_entry() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("topicDescriptions.js"));
    store.upsert("1", &description("Логика")).unwrap();
    store.upsert("2", &description("Алгебра")).unwrap();
    store.upsert("1", &description("Логика высказываний")).unwrap();

    let all = store.read_all().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all["1"].title, "Логика высказываний");
    assert_eq!(all["2"].title, "Алгебра");
}

/// Every write keeps the previous file as the backup
#[test]
fn test_backup_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("topicDescriptions.js"));
    store.upsert("1", &description("Логика")).unwrap();
    assert!(!store.backup_path().exists());

    let before = fs::read_to_string(store.path()).unwrap();
    store.upsert("2", &description("Алгебра")).unwrap();
    assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), before);

    store.restore_from_backup().unwrap();
    let restored = store.read_all().unwrap();
    assert_eq!(restored.keys().collect::<Vec<_>>(), vec!["1"]);

    store.delete_backup().unwrap();
    store.delete_backup().unwrap();
    assert!(matches!(
        store.restore_from_backup().unwrap_err(),
        StoreError::NoBackup(_)
    ));
}

/// A hand-edited file with comments and single quotes is still readable
#[test]
fn test_reads_hand_edited_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("topicDescriptions.js");
    fs::write(
        &path,
        "/* edited */\nexport const topicDescriptions = {\n  7: { title: 'Физика', description: \"Механика\\nи оптика\", },\n  'x': { description: \"d\", title: \"t\", note: \"ignored\" },\n};\n",
    )
    .unwrap();

    let all = ResultStore::new(&path).read_all().unwrap();
    assert_eq!(all["7"], Description::new("Физика", "Механика\nи оптика"));
    assert_eq!(all["x"].title, "t");
}

/// A corrupt file is reported and never overwritten by an upsert
#[test]
fn test_corrupt_file_is_not_overwritten() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("topicDescriptions.js");
    fs::write(&path, "export const topicDescriptions = { \"1\": ").unwrap();
    let store = ResultStore::new(&path);

    assert!(matches!(
        store.upsert("2", &description("Алгебра")).unwrap_err(),
        StoreError::CorruptFile { .. }
    ));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "export const topicDescriptions = { \"1\": "
    );
    assert!(!ResultStore::validate_syntax(&fs::read_to_string(&path).unwrap()));
}

/// Parent directories are created on first write
#[test]
fn test_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let store = ResultStore::new(dir.path().join("web").join("data").join("out.js"));
    store.upsert("1", &description("Логика")).unwrap();
    assert!(store.path().exists());
    assert!(ResultStore::validate_syntax(&fs::read_to_string(store.path()).unwrap()));
}
