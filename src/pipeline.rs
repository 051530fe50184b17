use crate::client::SubmissionSource;
use crate::config::SnapOptions;
use crate::filter::is_report_placeholder;
use crate::models::{map_comment, map_submission, CommentRecord};
use crate::store::{destroy_store, DocStore, COMMENT_TABLE, SUBMISSION_TABLE};
use crate::util::init_tracing_once;
use anyhow::{anyhow, Context, Result};

/// One full-refresh ingestion pass over a subreddit's newest submissions.
///
/// Each run is `reset -> auth -> fetch -> (map -> filter -> persist)*` with no
/// state carried across runs and no per-submission isolation: the first error
/// aborts the run, leaving records from earlier iterations already committed.
#[derive(Clone, Default)]
pub struct Snapshot {
    pub(crate) opts: SnapOptions,
}

/// Record counts from a completed run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub submissions: usize,
    pub comments: usize,
}

impl Snapshot {
    pub fn new() -> Self {
        Self { opts: SnapOptions::default() }
    }

    // -------- Builder methods --------
    pub fn subreddit(mut self, sub: impl AsRef<str>) -> Self { self.opts = self.opts.with_subreddit(sub); self }
    pub fn limit(mut self, limit: u32) -> Self { self.opts = self.opts.with_limit(limit); self }
    pub fn db_path(mut self, path: impl AsRef<std::path::Path>) -> Self { self.opts = self.opts.with_db_path(path); self }

    /// Run the pipeline against `source`. Strictly sequential; every step is
    /// a hard dependency on the previous one succeeding.
    pub fn run<S: SubmissionSource>(&self, source: &mut S) -> Result<RunSummary> {
        let subreddit = self.opts.subreddit.clone().ok_or_else(|| anyhow!("subreddit is required"))?;
        init_tracing_once();

        // Full reset: destroy then reinitialize the local store.
        destroy_store(&self.opts.db_path)?;
        let mut store = DocStore::open(&self.opts.db_path)?;

        let identity = source.authenticate().context("authenticate API client")?;
        tracing::info!("authenticated as: {}", identity);
        tracing::info!("reading newest submissions in: {}", subreddit);

        let submissions = source
            .newest(&subreddit, self.opts.limit)
            .with_context(|| format!("fetch newest submissions of r/{}", subreddit))?;

        tracing::debug!("begin processing {} newest submissions", self.opts.limit);
        let mut summary = RunSummary::default();
        for s in &submissions {
            tracing::debug!("loading submission: {}", s.id);
            let record = map_submission(s)?;

            tracing::debug!("loading comments for submission: {}", s.id);
            let tree = source
                .comment_tree(&subreddit, &s.id)
                .with_context(|| format!("expand comment tree of submission {}", s.id))?;
            let comments: Vec<CommentRecord> = tree
                .iter()
                .filter(|c| !is_report_placeholder(&c.body))
                .map(|c| map_comment(c, &record.submission_id))
                .collect::<Result<_>>()?;

            tracing::debug!("inserting submission");
            store.insert(SUBMISSION_TABLE, &record)?;

            tracing::debug!("inserting {} comments", comments.len());
            store.insert_many(COMMENT_TABLE, &comments)?;

            summary.submissions += 1;
            summary.comments += comments.len();
        }
        Ok(summary)
    }
}
