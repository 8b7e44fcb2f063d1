// SPDX-License-Identifier: Apache-2.0

use taskdeck_release::{FileTagState, Tag, TagStateStore};

fn store_in(dir: &tempfile::TempDir) -> FileTagState {
    FileTagState::new(dir.path().join("release/tags.json"))
}

#[test]
fn first_issue_bumps_the_seed_and_creates_the_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    assert_eq!(store.load().expect("load"), None);

    let issued = store.issue_next(Tag::new(1, 0)).expect("issue");
    assert_eq!(issued, Tag::new(1, 1));

    let state = store.load().expect("load").expect("state");
    assert_eq!(state.current, issued);
    assert_eq!(state.last_known_good, None);
    assert_eq!(state.history.len(), 1);
    assert_eq!(state.history[0].tag, issued);
}

/// The defect this store exists to fix: independent invocations must issue
/// strictly increasing tags, not re-bump a constant.
#[test]
fn successive_issues_are_strictly_increasing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    let seed = Tag::new(1, 0);
    let a = store.issue_next(seed).expect("issue a");
    let b = store.issue_next(seed).expect("issue b");
    let c = store.issue_next(seed).expect("issue c");
    assert!(a < b && b < c);
    assert_eq!(c, Tag::new(1, 3));

    let state = store.load().expect("load").expect("state");
    assert_eq!(state.history.len(), 3);
}

#[test]
fn seed_is_ignored_once_state_exists() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store.issue_next(Tag::new(1, 0)).expect("issue");
    let issued = store.issue_next(Tag::new(9, 9)).expect("issue again");
    assert_eq!(issued, Tag::new(1, 2));
}

#[test]
fn mark_known_good_survives_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    let issued = store.issue_next(Tag::new(1, 0)).expect("issue");
    store.mark_known_good(issued).expect("mark");

    let reopened = store_in(&dir);
    let state = reopened.load().expect("load").expect("state");
    assert_eq!(state.last_known_good, Some(issued));
}

#[test]
fn corrupt_state_file_is_an_error_not_a_reset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tags.json");
    std::fs::write(&path, b"{ not json").expect("write");
    let store = FileTagState::new(path);
    assert!(store.load().is_err());
    assert!(store.issue_next(Tag::new(1, 0)).is_err());
}

#[test]
fn save_leaves_no_tmp_file_behind() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = store_in(&dir);
    store.issue_next(Tag::new(1, 0)).expect("issue");
    let entries: Vec<String> = std::fs::read_dir(dir.path().join("release"))
        .expect("read dir")
        .map(|e| e.expect("entry").file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries, vec!["tags.json".to_string()]);
}
