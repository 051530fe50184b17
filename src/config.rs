use std::path::{Path, PathBuf};

/// User-facing options with sensible defaults and builder chaining.
#[derive(Clone, Debug)]
pub struct SnapOptions {
    pub subreddit: Option<String>, // normalized lowercase, no "r/"
    pub limit: u32,                // newest-window size; one fetch, no pagination
    pub db_path: PathBuf,          // document store location, recreated each run
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self {
            subreddit: None,
            limit: 10,
            db_path: PathBuf::from("db.json"),
        }
    }
}

impl SnapOptions {
    pub fn with_subreddit(mut self, sub: impl AsRef<str>) -> Self {
        let mut s = sub.as_ref().trim().to_lowercase();
        if let Some(rest) = s.strip_prefix("r/") {
            s = rest.to_string();
        }
        self.subreddit = Some(s);
        self
    }
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }
    pub fn with_db_path(mut self, path: impl AsRef<Path>) -> Self {
        self.db_path = path.as_ref().to_path_buf();
        self
    }
}
