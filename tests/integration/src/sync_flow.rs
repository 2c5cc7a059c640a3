//! End-to-end sync flow across crates
//!
//! This test exercises the complete flow: account setup -> local snapshots ->
//! client messages -> reconcile into a durable index configured from a file.

use std::fs;
use std::sync::Arc;
use std::thread;

use filebox_core::{
    Client, Error, File, FileAction, IndexStore, Reconciler, Settings, User, codec,
    compute_files,
};
use filebox_fs::{NormalizedPath, checksum};
use filebox_test_utils::store::TestStore;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Snapshot a real file under `dir`, reporting it by its relative path.
fn snapshot(dir: &TempDir, rel: &str) -> File {
    let native = dir.path().join(rel);
    let content = fs::read(&native).unwrap();
    File::new(rel, checksum::content_hash(&content)).with_size(content.len() as u64)
}

fn messages(client: &Client, actions: Vec<FileAction>) -> Vec<String> {
    actions
        .into_iter()
        .map(|a| a.with_client(client.id).to_json().unwrap())
        .collect()
}

fn settings_for(dir: &TempDir, extension: &str, body: &str) -> Settings {
    let path = dir.path().join(format!("filebox.{extension}"));
    fs::write(&path, body).unwrap();
    Settings::load(&NormalizedPath::new(&path)).unwrap()
}

#[test]
fn test_edit_session_reconciles_to_final_state() {
    let workspace = TempDir::new().unwrap();
    let store = TestStore::new();

    let user = User::register(1, "owner@example.com", "pw").unwrap();
    user.verify_password("pw").unwrap();
    let laptop = Client::issue(10, &user).unwrap();
    let reconciler = Reconciler::new(filebox_core::Applier::new(store.index()));

    // First session: two files appear
    fs::create_dir_all(workspace.path().join("docs")).unwrap();
    fs::write(workspace.path().join("docs/a.txt"), "v1").unwrap();
    fs::write(workspace.path().join("b.txt"), "bee").unwrap();
    let a_v1 = snapshot(&workspace, "docs/a.txt");
    let b = snapshot(&workspace, "b.txt");
    reconciler
        .reconcile_messages(
            &messages(&laptop, vec![FileAction::create(a_v1.clone()), FileAction::create(b.clone())]),
            &user,
        )
        .unwrap();

    // Second session: a.txt is edited twice and a scratch file comes and goes
    fs::write(workspace.path().join("docs/a.txt"), "v2").unwrap();
    let a_v2 = snapshot(&workspace, "docs/a.txt");
    fs::write(workspace.path().join("docs/a.txt"), "v3").unwrap();
    let a_v3 = snapshot(&workspace, "docs/a.txt");
    fs::write(workspace.path().join("tmp.swp"), "x").unwrap();
    let swp = snapshot(&workspace, "tmp.swp");

    let session = vec![
        FileAction::delete(a_v1.clone()),
        FileAction::create(swp.clone()),
        FileAction::create(a_v2.clone()),
        FileAction::delete(a_v2.clone()),
        FileAction::delete(swp.clone()),
        FileAction::create(a_v3.clone()),
    ];
    let report = reconciler
        .reconcile_messages(&messages(&laptop, session), &user)
        .unwrap();

    assert_eq!(report.compaction.cancelled, 4);
    assert_eq!(report.applied.deleted, ["docs/a.txt"]);
    assert_eq!(report.applied.inserted, ["docs/a.txt"]);
    assert_eq!(
        store.rows(1),
        [
            ("b.txt".to_string(), b.hash.clone()),
            ("docs/a.txt".to_string(), a_v3.hash.clone()),
        ]
    );
    assert_eq!(store.table(1).get("docs/a.txt").unwrap().name, "a.txt");
}

#[test]
fn test_rejected_batch_is_invisible_after_reopen() {
    let store = TestStore::new();
    let user = User::new(1, "owner@example.com", "");
    let reconciler = Reconciler::new(filebox_core::Applier::new(store.index()));

    reconciler
        .reconcile(&[FileAction::create(File::new("a.txt", "H1"))], &user)
        .unwrap();

    let stale = [
        FileAction::create(File::new("new.txt", "N")),
        FileAction::delete(File::new("a.txt", "OLD")),
    ];
    let err = reconciler.reconcile(&stale, &user).unwrap_err();
    assert!(matches!(err, Error::HashMismatch { index: 1, .. }));

    let reopened = store.reopen();
    let table = reopened.load(1).unwrap();
    assert_eq!(table.len(), 1);
    assert!(!table.contains("new.txt"));
}

#[test]
fn test_yaml_settings_drive_replace_policy() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("idx");
    let settings = settings_for(
        &dir,
        "yaml",
        &format!(
            "index:\n  root: {}\napply:\n  on_conflict: replace\nio:\n  fsync: false\n",
            root.display()
        ),
    );
    assert!(!settings.io.fsync);

    let reconciler = Reconciler::from_settings(&settings).unwrap();
    let user = User::new(5, "", "");
    reconciler.reconcile(&[FileAction::create(File::new("a", "H1"))], &user).unwrap();
    let report = reconciler
        .reconcile(&[FileAction::create(File::new("a", "H2"))], &user)
        .unwrap();

    assert_eq!(report.applied.replaced, ["a"]);
    assert!(root.join("5.json").exists());
}

#[test]
fn test_json_settings_select_memory_backend() {
    let dir = TempDir::new().unwrap();
    let settings = settings_for(&dir, "json", r#"{"index":{"backend":"memory"}}"#);

    let reconciler = Reconciler::from_settings(&settings).unwrap();
    reconciler
        .reconcile(&[FileAction::create(File::new("a", "H1"))], &User::new(1, "", ""))
        .unwrap();

    assert_eq!(reconciler.applier().store().load(1).unwrap().len(), 1);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_two_clients_of_one_owner_never_interleave() {
    let store = TestStore::new();
    let reconciler = Arc::new(Reconciler::new(filebox_core::Applier::new(store.index())));
    let user = User::new(1, "", "");

    // Each client owns disjoint paths and cycles create/delete pairs
    let handles: Vec<_> = (0..2u64)
        .map(|client| {
            let reconciler = Arc::clone(&reconciler);
            let user = user.clone();
            thread::spawn(move || {
                for round in 0..10 {
                    let path = format!("c{client}/f{round}");
                    let create = FileAction::create(File::new(&path, "H")).with_client(client);
                    reconciler.reconcile(&[create], &user).unwrap();
                    if round % 2 == 1 {
                        let delete = FileAction::delete(File::new(&path, "H")).with_client(client);
                        reconciler.reconcile(&[delete], &user).unwrap();
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread should not panic");
    }

    // Lost updates would drop rows written by the other client
    assert_eq!(store.table(1).len(), 10);
}

#[test]
fn test_batch_file_round_trip_through_codec() {
    let dir = TempDir::new().unwrap();
    let batch = vec![
        FileAction::create(File::new("a.txt", "H1")),
        FileAction::delete(File::new("a.txt", "H1")),
        FileAction::create(File::new("b.txt", "H2")),
    ];
    let path = dir.path().join("batch.jsonl");
    fs::write(&path, codec::encode_batch(&batch).unwrap()).unwrap();

    let decoded = codec::decode_batch(&fs::read_to_string(&path).unwrap()).unwrap();
    let files = compute_files(&decoded);

    assert_eq!(files.len(), 1);
    assert_eq!(files[0].path, "b.txt");
    assert_eq!(files[0].hash, "H2");
}
