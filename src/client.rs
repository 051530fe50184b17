//! Read-only API client and the fetch seam the pipeline runs against.
//!
//! All network calls are blocking and sequential with no timeout, retry, or
//! backoff: an unresponsive endpoint stalls the process, and any failure
//! propagates straight up as fatal. Comment-tree expansion resolves every
//! `more` continuation node it encounters, which is unbounded work for
//! heavily-commented submissions unless a cap is set via [`RedditClient::more_limit`].

use crate::models::{RawComment, RawSubmission};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Maximum continuation ids per `morechildren` call (API-imposed).
const MORE_BATCH: usize = 100;

/// Where the pipeline gets its data. The HTTP client implements this; tests
/// drive the pipeline with an in-memory fake.
pub trait SubmissionSource {
    /// Authenticate the source; returns an identity string for logging.
    fn authenticate(&mut self) -> Result<String>;

    /// The `limit` newest submissions of `subreddit`, in API (newest-first)
    /// order. One window; no continuation across calls. A nonexistent
    /// subreddit is not checked for here — it surfaces as an erroring or
    /// empty fetch.
    fn newest(&mut self, subreddit: &str, limit: u32) -> Result<Vec<RawSubmission>>;

    /// The submission's full comment tree, sorted newest-first, with every
    /// `more` continuation resolved, flattened depth-first in traversal order.
    fn comment_tree(&mut self, subreddit: &str, submission_id: &str) -> Result<Vec<RawComment>>;
}

/// API credentials, read from an external profile-keyed JSON file
/// (`credentials.json` in the working directory, or `$SUBSNAP_CREDENTIALS`).
///
/// ```json
/// {"bot1": {"client_id": "...", "client_secret": "...", "user_agent": "..."}}
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

impl Credentials {
    pub fn from_profile(profile: &str) -> Result<Self> {
        let path = std::env::var("SUBSNAP_CREDENTIALS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("credentials.json"));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read credentials file {}", path.display()))?;
        let mut profiles: HashMap<String, Credentials> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse credentials file {}", path.display()))?;
        profiles
            .remove(profile)
            .ok_or_else(|| anyhow!("no profile {:?} in {}", profile, path.display()))
    }
}

// ----------------------------- wire envelopes ------------------------------

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Thing>,
}

#[derive(Deserialize)]
struct Thing {
    kind: String,
    data: Value,
}

/// Payload of a `more` continuation node.
#[derive(Deserialize)]
struct MoreNode {
    #[serde(default)]
    children: Vec<String>,
}

#[derive(Deserialize)]
struct MoreChildrenResponse {
    json: MoreChildrenBody,
}

#[derive(Deserialize)]
struct MoreChildrenBody {
    data: MoreChildrenData,
}

#[derive(Deserialize)]
struct MoreChildrenData {
    #[serde(default)]
    things: Vec<Thing>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

// ------------------------------- the client --------------------------------

/// Blocking read-only client (OAuth2 client-credentials grant).
pub struct RedditClient {
    http: reqwest::blocking::Client,
    creds: Credentials,
    token: Option<String>,
    more_limit: Option<usize>,
}

impl RedditClient {
    pub fn new(creds: Credentials) -> Result<Self> {
        // No request timeout: calls block for as long as the API takes.
        let http = reqwest::blocking::Client::builder()
            .user_agent(creds.user_agent.clone())
            .timeout(None)
            .build()
            .context("build HTTP client")?;
        Ok(Self { http, creds, token: None, more_limit: None })
    }

    /// Cap the number of `morechildren` continuation fetches per submission.
    /// Unset by default: expansion is unbounded, matching full-tree semantics.
    pub fn more_limit(mut self, fetches: usize) -> Self {
        self.more_limit = Some(fetches);
        self
    }

    fn bearer(&self) -> Result<&str> {
        self.token
            .as_deref()
            .ok_or_else(|| anyhow!("client is not authenticated"))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{API_BASE}{path}");
        let resp = self
            .http
            .get(&url)
            .bearer_auth(self.bearer()?)
            .query(query)
            .send()
            .with_context(|| format!("GET {path}"))?
            .error_for_status()
            .with_context(|| format!("GET {path}"))?;
        resp.json().with_context(|| format!("decode response of {path}"))
    }

    /// Depth-first walk over listing children: collect comments in traversal
    /// order, queue `more` continuation ids for later resolution.
    fn walk_children(
        children: Vec<Thing>,
        out: &mut Vec<RawComment>,
        pending: &mut Vec<String>,
    ) -> Result<()> {
        for thing in children {
            match thing.kind.as_str() {
                "t1" => {
                    let mut data = thing.data;
                    // Detach replies first; the comment payload itself must
                    // decode without them.
                    let replies = match data.as_object_mut() {
                        Some(obj) => obj.remove("replies"),
                        None => None,
                    };
                    let comment: RawComment =
                        serde_json::from_value(data).context("decode comment payload")?;
                    out.push(comment);
                    if let Some(replies) = replies {
                        if replies.is_object() {
                            let listing: Listing = serde_json::from_value(replies)
                                .context("decode replies listing")?;
                            Self::walk_children(listing.data.children, out, pending)?;
                        }
                    }
                }
                "more" => {
                    let node: MoreNode =
                        serde_json::from_value(thing.data).context("decode more node")?;
                    pending.extend(node.children);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl SubmissionSource for RedditClient {
    fn authenticate(&mut self) -> Result<String> {
        let resp = self
            .http
            .post(TOKEN_URL)
            .basic_auth(&self.creds.client_id, Some(&self.creds.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .context("request access token")?
            .error_for_status()
            .context("request access token")?;
        let token: TokenResponse = resp.json().context("decode access token")?;
        self.token = Some(token.access_token);
        // Client-credentials auth carries no user context; the identity we
        // can report is the application's.
        Ok(format!("{} (read-only)", self.creds.user_agent))
    }

    fn newest(&mut self, subreddit: &str, limit: u32) -> Result<Vec<RawSubmission>> {
        let listing: Listing = self.get_json(
            &format!("/r/{subreddit}/new"),
            &[("limit", limit.to_string()), ("raw_json", "1".to_string())],
        )?;
        listing
            .data
            .children
            .into_iter()
            .filter(|t| t.kind == "t3")
            .map(|t| serde_json::from_value(t.data).context("decode submission payload"))
            .collect()
    }

    fn comment_tree(&mut self, subreddit: &str, submission_id: &str) -> Result<Vec<RawComment>> {
        // The comment page returns two listings: [submission, comment forest].
        let pages: Vec<Listing> = self.get_json(
            &format!("/r/{subreddit}/comments/{submission_id}"),
            &[("sort", "new".to_string()), ("raw_json", "1".to_string())],
        )?;
        let forest = pages
            .into_iter()
            .nth(1)
            .ok_or_else(|| anyhow!("no comment listing for submission {submission_id}"))?;

        let mut out = Vec::new();
        let mut pending: Vec<String> = Vec::new();
        Self::walk_children(forest.data.children, &mut out, &mut pending)?;

        // Resolve continuations until the tree is fully expanded (or the
        // optional fetch cap is reached).
        let mut fetches = 0usize;
        while !pending.is_empty() {
            if let Some(cap) = self.more_limit {
                if fetches >= cap {
                    tracing::debug!(
                        "more-expansion cap {} reached for {}; {} ids left unresolved",
                        cap,
                        submission_id,
                        pending.len()
                    );
                    break;
                }
            }
            let take = pending.len().min(MORE_BATCH);
            let batch: Vec<String> = pending.drain(..take).collect();
            let resp: MoreChildrenResponse = self.get_json(
                "/api/morechildren",
                &[
                    ("link_id", format!("t3_{submission_id}")),
                    ("children", batch.join(",")),
                    ("api_type", "json".to_string()),
                    ("sort", "new".to_string()),
                    ("raw_json", "1".to_string()),
                ],
            )?;
            fetches += 1;
            Self::walk_children(resp.json.data.things, &mut out, &mut pending)?;
        }
        Ok(out)
    }
}
