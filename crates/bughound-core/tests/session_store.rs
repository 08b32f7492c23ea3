//! Integration tests for the session checkpoint store.

use bughound_core::SessionStore;
use serde_json::json;
use tempfile::TempDir;

fn store_in(dir: &TempDir) -> SessionStore {
    SessionStore::new(dir.path()).expect("store should open in temp dir")
}

#[test]
fn progress_appends_in_call_order() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.start_session("nightly").unwrap();

    store.save_plugin_progress("plugin-sql", json!({"errors_found": 5}));
    store.save_plugin_progress("plugin-web", json!({"errors_found": 0}));
    store.save_plugin_progress("plugin-tee", json!({"warnings": 2}));

    let session = store.load_latest_session(Some("nightly")).unwrap();
    assert_eq!(session.plugins_analyzed.len(), 3);
    let names: Vec<&str> = session
        .plugins_analyzed
        .iter()
        .map(|p| p.plugin_name.as_str())
        .collect();
    assert_eq!(names, vec!["plugin-sql", "plugin-web", "plugin-tee"]);
    assert_eq!(session.plugins_analyzed[0].results["errors_found"], 5);
}

#[test]
fn add_error_without_session_leaves_no_file() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.add_error("plugin-x", "boom");

    let files: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(files.is_empty());
    assert!(store.load_latest_session(None).is_none());
}

#[test]
fn errors_are_recorded_against_the_session() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.start_session("run").unwrap();

    store.add_error("plugin-x", "linter exited abnormally");

    let session = store.load_latest_session(Some("run")).unwrap();
    assert_eq!(session.errors.len(), 1);
    assert_eq!(session.errors[0].plugin_name, "plugin-x");
    assert_eq!(session.errors[0].error, "linter exited abnormally");
}

#[test]
fn sequence_increments_across_sessions() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.start_session("first").unwrap();
    store.start_session("second").unwrap();

    let first = store.load_latest_session(Some("first")).unwrap();
    let second = store.load_latest_session(Some("second")).unwrap();
    assert_eq!(first.sequence, 1);
    assert_eq!(second.sequence, 2);
}

#[test]
fn latest_session_is_highest_sequence() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.start_session("alpha").unwrap();
    store.start_session("beta").unwrap();

    // Progress lands on the most recently started session.
    store.save_plugin_progress("plugin-x", json!({}));

    let latest = store.load_latest_session(None).unwrap();
    assert_eq!(latest.session_name, "beta");
    assert_eq!(latest.plugins_analyzed.len(), 1);

    let alpha = store.load_latest_session(Some("alpha")).unwrap();
    assert!(alpha.plugins_analyzed.is_empty());
}

#[test]
fn malformed_snapshot_is_treated_as_absent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("broken_20250101_000000.json"), "{ not json").unwrap();

    let store = store_in(&dir);
    assert!(store.load_latest_session(Some("broken")).is_none());

    // A valid session alongside the broken file is still found.
    store.start_session("fresh").unwrap();
    assert!(store.load_latest_session(Some("fresh")).is_some());
}

#[test]
fn list_sessions_is_ordered_by_sequence() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);

    store.start_session("one").unwrap();
    store.start_session("two").unwrap();

    let sessions = store.list_sessions();
    assert_eq!(sessions.len(), 2);
    assert!(sessions[0].sequence < sessions[1].sequence);
    assert_eq!(sessions[0].session_name, "one");
}

#[test]
fn resume_sees_prior_progress() {
    let dir = TempDir::new().unwrap();
    let store = store_in(&dir);
    store.start_session("resumable").unwrap();
    store.save_plugin_progress("plugin-done", json!({"ok": true}));

    // A separate store instance, as a resumed process would create.
    let resumed = store_in(&dir);
    let session = resumed.load_latest_session(Some("resumable")).unwrap();
    assert!(session.has_analyzed("plugin-done"));
    assert!(!session.has_analyzed("plugin-pending"));
}
