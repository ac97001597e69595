//! MarkerStore — approval state kept as marker files in the pending directory.
//!
//! For a token `T` the directory may hold:
//!
//! ```text
//! T.pending      written by the job producer while T awaits review
//! APPROVE_T      written here when a reviewer approves
//! REJECT_T       written here when a reviewer rejects
//! ```
//!
//! Only the existence of a marker carries meaning. The single line written
//! into `APPROVE_T` / `REJECT_T` is for humans and is never read back.
//!
//! Writes are create-or-overwrite with no locking. Two reviewers racing on
//! the same token can leave both terminal markers behind; [`MarkerStore::status`]
//! then reports `approved`, because markers are probed approve-first.

use std::io;
use std::path::{Path, PathBuf};

use crate::models::approval::{timestamp_now, ApprovalStatus, Decision, PendingEntry};

const PENDING_SUFFIX: &str = ".pending";

#[derive(Debug, Clone)]
pub struct MarkerStore {
    dir: PathBuf,
}

impl MarkerStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the pending directory (and parents) if it does not exist yet.
    pub async fn ensure_dir(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await
    }

    pub fn pending_path(&self, token: &str) -> PathBuf {
        self.marker_path(format!("{}{}", token, PENDING_SUFFIX))
    }

    pub fn decision_path(&self, token: &str, decision: Decision) -> PathBuf {
        self.marker_path(format!("{}{}", decision.marker_prefix(), token))
    }

    /// Marker `name` inside the pending directory. Leading slashes are
    /// stripped so an absolute-looking token cannot replace the base path.
    fn marker_path(&self, name: String) -> PathBuf {
        self.dir.join(name.trim_start_matches('/'))
    }

    /// Record `decision` for `token`, overwriting any earlier marker of the same kind.
    ///
    /// Returns the path of the marker that was written.
    pub async fn record(&self, token: &str, decision: Decision) -> io::Result<PathBuf> {
        self.ensure_dir().await?;

        let path = self.decision_path(token, decision);
        let line = format!("{} at {}\n", decision, timestamp_now());
        tokio::fs::write(&path, line).await?;

        tracing::debug!(path = %path.display(), "decision marker written");
        Ok(path)
    }

    /// Derive the status of `token` from the markers on disk.
    ///
    /// A probe that fails for any reason counts as "marker absent".
    pub async fn status(&self, token: &str) -> ApprovalStatus {
        if exists(&self.decision_path(token, Decision::Approved)).await {
            ApprovalStatus::Approved
        } else if exists(&self.decision_path(token, Decision::Rejected)).await {
            ApprovalStatus::Rejected
        } else if exists(&self.pending_path(token)).await {
            ApprovalStatus::Pending
        } else {
            ApprovalStatus::Unknown
        }
    }

    /// Tokens that have a `.pending` marker, sorted, each with its derived status.
    ///
    /// A missing pending directory yields an empty list.
    pub async fn list_pending(&self) -> io::Result<Vec<PendingEntry>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut tokens = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if let Some(token) = name.strip_suffix(PENDING_SUFFIX) {
                if !token.is_empty() {
                    tokens.push(token.to_string());
                }
            }
        }
        tokens.sort();

        let mut pending = Vec::with_capacity(tokens.len());
        for token in tokens {
            let status = self.status(&token).await;
            pending.push(PendingEntry { token, status });
        }
        Ok(pending)
    }
}

async fn exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MarkerStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MarkerStore::new(dir.path().join("pending"));
        (dir, store)
    }

    #[tokio::test]
    async fn test_unknown_without_markers() {
        let (_dir, store) = store();
        assert_eq!(store.status("missing").await, ApprovalStatus::Unknown);
    }

    #[tokio::test]
    async fn test_pending_marker_only() {
        let (_dir, store) = store();
        store.ensure_dir().await.unwrap();
        std::fs::write(store.pending_path("job-7"), "").unwrap();
        assert_eq!(store.status("job-7").await, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_record_creates_directory_and_marker() {
        let (_dir, store) = store();
        let path = store.record("abc123", Decision::Approved).await.unwrap();

        assert_eq!(path, store.dir().join("APPROVE_abc123"));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("approved at "), "got {:?}", content);
        assert!(content.ends_with('\n'));
        assert_eq!(store.status("abc123").await, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_reject_overrides_pending() {
        let (_dir, store) = store();
        store.ensure_dir().await.unwrap();
        std::fs::write(store.pending_path("abc"), "").unwrap();
        store.record("abc", Decision::Rejected).await.unwrap();
        assert_eq!(store.status("abc").await, ApprovalStatus::Rejected);
    }

    #[tokio::test]
    async fn test_approve_wins_when_both_markers_exist() {
        let (_dir, store) = store();
        store.record("both", Decision::Rejected).await.unwrap();
        store.record("both", Decision::Approved).await.unwrap();
        assert_eq!(store.status("both").await, ApprovalStatus::Approved);
    }

    #[tokio::test]
    async fn test_repeated_record_overwrites() {
        let (_dir, store) = store();
        store.record("again", Decision::Rejected).await.unwrap();
        let path = store.record("again", Decision::Rejected).await.unwrap();

        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.starts_with("rejected at "));
    }

    #[tokio::test]
    async fn test_record_fails_when_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("pending");
        std::fs::write(&blocker, "not a directory").unwrap();

        let store = MarkerStore::new(&blocker);
        assert!(store.record("tok", Decision::Approved).await.is_err());
    }

    #[tokio::test]
    async fn test_absolute_token_stays_inside_dir() {
        let (dir, store) = store();
        let outside = dir.path().join("outside");
        std::fs::write(dir.path().join("outside.pending"), "").unwrap();

        let token = outside.display().to_string();
        assert!(token.starts_with('/'));
        assert!(store.pending_path(&token).starts_with(store.dir()));
        assert!(store
            .decision_path(&token, Decision::Approved)
            .starts_with(store.dir()));
        assert_eq!(store.status(&token).await, ApprovalStatus::Unknown);
    }

    #[tokio::test]
    async fn test_list_pending() {
        let (_dir, store) = store();
        assert!(store.list_pending().await.unwrap().is_empty());

        store.ensure_dir().await.unwrap();
        std::fs::write(store.pending_path("b-job"), "").unwrap();
        std::fs::write(store.pending_path("a-job"), "").unwrap();
        store.record("b-job", Decision::Approved).await.unwrap();
        store.record("orphan", Decision::Rejected).await.unwrap();

        let listed = store.list_pending().await.unwrap();
        assert_eq!(
            listed,
            vec![
                PendingEntry {
                    token: "a-job".into(),
                    status: ApprovalStatus::Pending,
                },
                PendingEntry {
                    token: "b-job".into(),
                    status: ApprovalStatus::Approved,
                },
            ]
        );
    }
}
