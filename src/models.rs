use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw submission payload as returned by the listing endpoint.
///
/// Author fields are `Option` because the API substitutes a deleted-author
/// sentinel (`"[deleted]"` with the fullname absent) when the account is gone.
/// Everything downstream of [`map_submission`] sees only fully-shaped records.
#[derive(Clone, Debug, Deserialize)]
pub struct RawSubmission {
    pub id: String,
    pub title: String,
    pub score: i64,
    pub url: String,
    pub created_utc: f64,
    pub author: Option<String>,
    pub author_fullname: Option<String>,
    #[serde(default)]
    pub author_verified: Option<bool>,
    pub link_flair_text: Option<String>,
    pub upvote_ratio: f64,
}

/// Raw comment payload from a comment-tree node (or a `morechildren` thing).
#[derive(Clone, Debug, Deserialize)]
pub struct RawComment {
    pub id: String,
    pub body: String,
    pub created_utc: f64,
    /// Nesting level within the tree. The tree endpoint includes it per node;
    /// defaults to 0 for payloads that omit it.
    #[serde(default)]
    pub depth: u32,
    #[serde(default)]
    pub downs: i64,
    #[serde(default)]
    pub ups: i64,
    pub score: i64,
    /// `false` for unedited comments, an epoch timestamp otherwise.
    #[serde(default)]
    pub edited: Value,
    #[serde(default)]
    pub is_submitter: bool,
    pub likes: Option<bool>,
    /// Fullname of the parent: `t3_*` for top-level, `t1_*` for replies.
    pub parent_id: String,
    #[serde(default)]
    pub total_awards_received: i64,
    pub author: Option<String>,
    pub author_fullname: Option<String>,
    #[serde(default)]
    pub author_verified: Option<bool>,
}

/// Flat submission record as persisted in `submission_tb`.
/// Field declaration order is the stored key order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: String,
    pub title: String,
    pub score: i64,
    pub url: String,
    pub created_utc: f64,
    pub author_id: String,
    pub author_name: String,
    pub author_verified: bool,
    pub link_flare_text: Option<String>,
    pub upvote_ratio: f64,
}

/// Flat comment record as persisted in `comment_tb`.
/// Field declaration order is the stored key order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommentRecord {
    pub comment_id: String,
    /// Owning submission id (explicit linkage, never derived from the payload).
    pub submission: String,
    pub author_id: String,
    pub author_name: String,
    pub author_verified: bool,
    pub body: String,
    pub created_utc: f64,
    pub depth: u32,
    pub downs: i64,
    pub edited: Value,
    pub is_root: bool,
    pub is_submitter: bool,
    pub likes: Option<bool>,
    pub parent_id: String,
    pub score: i64,
    pub total_awards_received: i64,
    pub ups: i64,
}

/// Resolve the author triple or fail on the deleted-author sentinel.
/// The `t2_` fullname prefix is stripped so `author_id` is the bare id.
fn author_fields(
    name: &Option<String>,
    fullname: &Option<String>,
    verified: Option<bool>,
    what: &str,
    id: &str,
) -> Result<(String, String, bool)> {
    let name = name
        .as_deref()
        .filter(|n| *n != "[deleted]")
        .ok_or_else(|| anyhow!("missing author on {} {}", what, id))?;
    let fullname = fullname
        .as_deref()
        .ok_or_else(|| anyhow!("missing author_fullname on {} {}", what, id))?;
    let author_id = fullname.strip_prefix("t2_").unwrap_or(fullname).to_string();
    Ok((author_id, name.to_string(), verified.unwrap_or(false)))
}

/// Adapt a raw submission into its flat record.
///
/// This is the only place submission shape mismatches may fail: a deleted
/// author yields an error and no partial record. All other values pass
/// through unmodified.
pub fn map_submission(s: &RawSubmission) -> Result<SubmissionRecord> {
    let (author_id, author_name, author_verified) =
        author_fields(&s.author, &s.author_fullname, s.author_verified, "submission", &s.id)?;
    Ok(SubmissionRecord {
        submission_id: s.id.clone(),
        title: s.title.clone(),
        score: s.score,
        url: s.url.clone(),
        created_utc: s.created_utc,
        author_id,
        author_name,
        author_verified,
        link_flare_text: s.link_flair_text.clone(),
        upvote_ratio: s.upvote_ratio,
    })
}

/// Adapt a raw comment into its flat record, linked to `submission_id`.
///
/// The owning submission id is an explicit parameter because tree nodes do
/// not carry a reliable back-reference before flattening. Same author
/// constraint and failure mode as [`map_submission`].
pub fn map_comment(c: &RawComment, submission_id: &str) -> Result<CommentRecord> {
    let (author_id, author_name, author_verified) =
        author_fields(&c.author, &c.author_fullname, c.author_verified, "comment", &c.id)?;
    Ok(CommentRecord {
        comment_id: c.id.clone(),
        submission: submission_id.to_string(),
        author_id,
        author_name,
        author_verified,
        body: c.body.clone(),
        created_utc: c.created_utc,
        depth: c.depth,
        downs: c.downs,
        edited: if c.edited.is_null() { Value::Bool(false) } else { c.edited.clone() },
        is_root: c.parent_id.starts_with("t3_"),
        is_submitter: c.is_submitter,
        likes: c.likes,
        parent_id: c.parent_id.clone(),
        score: c.score,
        total_awards_received: c.total_awards_received,
        ups: c.ups,
    })
}
