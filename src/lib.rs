mod client;
mod config;
mod filter;
mod models;
mod pipeline;
mod store;
mod util;

pub use crate::config::SnapOptions;
pub use crate::pipeline::{RunSummary, Snapshot};

pub use crate::client::{Credentials, RedditClient, SubmissionSource};
pub use crate::models::{map_comment, map_submission, CommentRecord, RawComment, RawSubmission, SubmissionRecord};

pub use crate::filter::is_report_placeholder;
pub use crate::store::{destroy_store, DocStore, COMMENT_TABLE, SUBMISSION_TABLE};
