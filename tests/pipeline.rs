#[path = "common/mod.rs"]
mod common;

use common::*;
use subsnap::{Snapshot, COMMENT_TABLE, SUBMISSION_TABLE};

/// End-to-end against a fake subreddit: two submissions, three comments on
/// the first (one a report placeholder), none on the second. Expect 2
/// submission records and 2 comment records.
#[test]
fn end_to_end_counts() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let mut source = FakeSource::new(vec![
        (
            raw_submission("s1", "bob"),
            vec![
                raw_comment("c1", "first!", "t3_s1"),
                raw_comment("c2", "**User Report** rule 3", "t1_c1"),
                raw_comment("c3", "nice find", "t3_s1"),
            ],
        ),
        (raw_submission("s2", "carol"), vec![]),
    ]);

    let summary = Snapshot::new()
        .subreddit("worldnews")
        .limit(2)
        .db_path(&db)
        .run(&mut source)
        .unwrap();

    assert_eq!(summary.submissions, 2);
    assert_eq!(summary.comments, 2, "placeholder comment must be filtered out");

    let doc = read_store(&db);
    assert_eq!(table_len(&doc, SUBMISSION_TABLE), 2);
    assert_eq!(table_len(&doc, COMMENT_TABLE), 2);

    let bodies: Vec<&str> = doc[COMMENT_TABLE]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["body"].as_str().unwrap())
        .collect();
    assert_eq!(bodies, vec!["first!", "nice find"]);

    // every surviving comment links to its submission
    for c in doc[COMMENT_TABLE].as_array().unwrap() {
        assert_eq!(c["submission"], "s1");
    }
}

/// The fetch window is exactly `limit` submissions; nothing beyond it is
/// touched.
#[test]
fn limit_bounds_the_window() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let mut source = FakeSource::new(vec![
        (raw_submission("s1", "bob"), vec![]),
        (raw_submission("s2", "carol"), vec![]),
        (raw_submission("s3", "dave"), vec![]),
    ]);

    let summary = Snapshot::new()
        .subreddit("worldnews")
        .limit(2)
        .db_path(&db)
        .run(&mut source)
        .unwrap();

    assert_eq!(summary.submissions, 2);
    let doc = read_store(&db);
    assert_eq!(table_len(&doc, SUBMISSION_TABLE), 2);
}

/// Full-refresh semantics: a second run starts from an empty store, so
/// counts never accumulate across runs.
#[test]
fn rerun_resets_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let mut source = FakeSource::new(vec![(
        raw_submission("s1", "bob"),
        vec![raw_comment("c1", "hello", "t3_s1")],
    )]);

    let snapshot = Snapshot::new().subreddit("worldnews").limit(10).db_path(&db);
    snapshot.run(&mut source).unwrap();
    snapshot.run(&mut source).unwrap();

    let doc = read_store(&db);
    assert_eq!(table_len(&doc, SUBMISSION_TABLE), 1);
    assert_eq!(table_len(&doc, COMMENT_TABLE), 1);
}

/// No per-submission isolation: a mapping failure aborts the run, but the
/// records committed by earlier iterations stay in the store.
#[test]
fn failure_mid_run_keeps_earlier_writes() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let mut source = FakeSource::new(vec![
        (
            raw_submission("s1", "bob"),
            vec![raw_comment("c1", "fine", "t3_s1")],
        ),
        (
            raw_submission("s2", "carol"),
            vec![deleted_author_comment("c2", "t3_s2")],
        ),
    ]);

    let err = Snapshot::new()
        .subreddit("worldnews")
        .limit(2)
        .db_path(&db)
        .run(&mut source)
        .unwrap_err();
    assert!(err.to_string().contains("author"), "unexpected error: {err}");

    // s1 and its comment were committed before the abort; s2 was not.
    let doc = read_store(&db);
    assert_eq!(table_len(&doc, SUBMISSION_TABLE), 1);
    assert_eq!(doc[SUBMISSION_TABLE][0]["submission_id"], "s1");
    assert_eq!(table_len(&doc, COMMENT_TABLE), 1);
}

#[test]
fn subreddit_is_required() {
    let mut source = FakeSource::new(vec![]);
    let err = Snapshot::new().run(&mut source).unwrap_err();
    assert!(err.to_string().contains("subreddit is required"));
}

/// The "r/" prefix and casing are normalized away before the fetch.
#[test]
fn subreddit_prefix_is_normalized() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("db.json");

    let mut source = FakeSource::new(vec![]);
    let summary = Snapshot::new()
        .subreddit("r/WorldNews")
        .db_path(&db)
        .run(&mut source)
        .unwrap();
    assert_eq!(summary.submissions, 0);
    assert_eq!(
        source.seen_subreddits,
        vec!["worldnews"],
        "fetch should see the normalized name"
    );
}
