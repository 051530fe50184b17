//! Comment exclusion predicate.
//!
//! Subreddit moderation bots leave placeholder comments whose body embeds the
//! literal `**user report**` marker. Those are forum-software artifacts, not
//! user content, and are dropped before persistence. The check is deliberately
//! narrow: lower-cased substring match on that one marker, nothing broader.

const REPORT_MARKER: &str = "**user report**";

/// True iff the body contains the report-placeholder marker
/// (case-insensitive, substring — not exact match).
pub fn is_report_placeholder(body: &str) -> bool {
    body.to_lowercase().contains(REPORT_MARKER)
}
