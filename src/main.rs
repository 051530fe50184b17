use anyhow::Result;
use subsnap::{Credentials, RedditClient, Snapshot};

// Compiled-in run parameters; there is no CLI surface.
const SUBREDDIT: &str = "worldnews";
const LIMIT: u32 = 10;
const CREDENTIALS_PROFILE: &str = "bot1";

fn main() -> Result<()> {
    let creds = Credentials::from_profile(CREDENTIALS_PROFILE)?;
    let mut client = RedditClient::new(creds)?;

    let summary = Snapshot::new()
        .subreddit(SUBREDDIT)
        .limit(LIMIT)
        .run(&mut client)?;

    tracing::debug!(
        "end of process: {} submissions, {} comments stored",
        summary.submissions,
        summary.comments
    );
    Ok(())
}
