use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::path::Path;
use subsnap::{RawComment, RawSubmission, SubmissionSource};

/// In-memory stand-in for the live API: a fixed list of submissions, each
/// with a pre-flattened comment tree. Drives the pipeline in tests.
pub struct FakeSource {
    pub submissions: Vec<(RawSubmission, Vec<RawComment>)>,
    /// Subreddit names received by `newest`, in call order, so tests can
    /// assert what the pipeline actually asked for.
    pub seen_subreddits: Vec<String>,
}

impl FakeSource {
    pub fn new(submissions: Vec<(RawSubmission, Vec<RawComment>)>) -> Self {
        Self { submissions, seen_subreddits: Vec::new() }
    }
}

impl SubmissionSource for FakeSource {
    fn authenticate(&mut self) -> Result<String> {
        Ok("fake-agent (read-only)".to_string())
    }

    fn newest(&mut self, subreddit: &str, limit: u32) -> Result<Vec<RawSubmission>> {
        self.seen_subreddits.push(subreddit.to_string());
        Ok(self
            .submissions
            .iter()
            .take(limit as usize)
            .map(|(s, _)| s.clone())
            .collect())
    }

    fn comment_tree(&mut self, _subreddit: &str, submission_id: &str) -> Result<Vec<RawComment>> {
        self.submissions
            .iter()
            .find(|(s, _)| s.id == submission_id)
            .map(|(_, c)| c.clone())
            .ok_or_else(|| anyhow!("unknown submission {}", submission_id))
    }
}

/// A fully-populated submission payload by `author`.
pub fn raw_submission(id: &str, author: &str) -> RawSubmission {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("title of {id}"),
        "score": 42,
        "url": format!("https://example.com/{id}"),
        "created_utc": 1_700_000_000.0,
        "author": author,
        "author_fullname": format!("t2_{author}"),
        "author_verified": true,
        "link_flair_text": "News",
        "upvote_ratio": 0.97
    }))
    .unwrap()
}

/// A submission whose author account is gone: the API substitutes
/// `"[deleted]"` and drops the nested author fields.
pub fn deleted_author_submission(id: &str) -> RawSubmission {
    serde_json::from_value(json!({
        "id": id,
        "title": format!("title of {id}"),
        "score": 1,
        "url": format!("https://example.com/{id}"),
        "created_utc": 1_700_000_000.0,
        "author": "[deleted]",
        "link_flair_text": null,
        "upvote_ratio": 0.5
    }))
    .unwrap()
}

/// A fully-populated comment payload by "alice" under the given parent
/// fullname (`t3_*` for top-level, `t1_*` for replies).
pub fn raw_comment(id: &str, body: &str, parent_id: &str) -> RawComment {
    serde_json::from_value(json!({
        "id": id,
        "body": body,
        "created_utc": 1_700_000_100.0,
        "depth": if parent_id.starts_with("t3_") { 0 } else { 1 },
        "downs": 0,
        "ups": 3,
        "score": 3,
        "edited": false,
        "is_submitter": false,
        "likes": null,
        "parent_id": parent_id,
        "total_awards_received": 0,
        "author": "alice",
        "author_fullname": "t2_alice",
        "author_verified": false
    }))
    .unwrap()
}

/// Same shape as [`raw_comment`] but with the author fields stripped.
pub fn deleted_author_comment(id: &str, parent_id: &str) -> RawComment {
    serde_json::from_value(json!({
        "id": id,
        "body": "what did it say?",
        "created_utc": 1_700_000_100.0,
        "depth": 0,
        "downs": 0,
        "ups": 0,
        "score": 0,
        "edited": false,
        "is_submitter": false,
        "likes": null,
        "parent_id": parent_id,
        "total_awards_received": 0,
        "author": "[deleted]"
    }))
    .unwrap()
}

/// Parse the on-disk store document.
pub fn read_store(path: &Path) -> Value {
    let bytes = std::fs::read(path).unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Number of records in a named table of a store document.
pub fn table_len(doc: &Value, table: &str) -> usize {
    doc.get(table)
        .and_then(|v| v.as_array())
        .map(|a| a.len())
        .unwrap_or_else(|| panic!("table {} missing or not an array", table))
}
