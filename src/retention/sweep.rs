use crate::retention::RetentionPolicyStore;
use crate::storage::{KeyValueStore, UploadRecord, UploadSource};
use chrono::{DateTime, Days, Local, TimeZone};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Deletes local copies of uploaded files whose retention window, as
/// registered in the [`RetentionPolicyStore`], has elapsed.
///
/// Deletion decisions always use the policy state at sweep time; a
/// directory whose registration was removed protects its files regardless
/// of their age.
pub struct SweepEngine<'a, S: KeyValueStore, U: UploadSource> {
    policies: &'a RetentionPolicyStore<S>,
    uploads: &'a U,
}

impl<'a, S: KeyValueStore, U: UploadSource> SweepEngine<'a, S, U> {
    pub fn new(policies: &'a RetentionPolicyStore<S>, uploads: &'a U) -> Self {
        Self { policies, uploads }
    }

    /// Runs one sweep against the wall clock. Returns the number of files
    /// actually deleted.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Local::now())
    }

    /// Runs one sweep with an explicit "now", for deterministic testing.
    pub fn sweep_at(&self, now: DateTime<Local>) -> usize {
        let mut deleted = 0;
        for record in self.uploads.stored_uploads() {
            let Some(dir) = governing_directory(&record) else {
                continue;
            };
            if !self.policies.is_directory_added(&dir) {
                continue;
            }
            let offset_days = self.policies.directory_offset(&dir);
            if !retention_elapsed(&record, offset_days, now) {
                continue;
            }

            let path = Path::new(&record.local_path);
            if !path.exists() {
                continue;
            }
            match fs::remove_file(path) {
                Ok(()) => {
                    info!("Deleted expired local file {}", record.local_path);
                    deleted += 1;
                }
                Err(e) => {
                    warn!("Failed to delete {}: {}", record.local_path, e);
                }
            }
        }
        deleted
    }
}

/// True when the upload completed and strictly more than `offset_days`
/// calendar days lie between its end timestamp and `now`.
fn retention_elapsed(record: &UploadRecord, offset_days: i64, now: DateTime<Local>) -> bool {
    if record.upload_end_timestamp <= 0 || offset_days <= 0 {
        return false;
    }
    let Some(uploaded) = Local
        .timestamp_millis_opt(record.upload_end_timestamp)
        .single()
    else {
        return false;
    };
    let Some(deadline) = uploaded.checked_add_days(Days::new(offset_days as u64)) else {
        return false;
    };
    now > deadline
}

/// Derives the directory key governing `record`: the parent of the part of
/// `local_path` that follows the account's storage root, in trailing-slash
/// form. A root parent stays `/`.
///
/// Records whose path does not embed the sanitized account name, or whose
/// relative path has no parent, are not governed by any policy.
fn governing_directory(record: &UploadRecord) -> Option<String> {
    let account = sanitize_account(&record.account_name)?;
    let (_, relative) = record.local_path.split_once(account.as_str())?;
    let parent = Path::new(relative).parent()?;
    if parent.as_os_str().is_empty() {
        return None;
    }
    let parent = parent.to_str()?;
    Some(if parent == "/" {
        parent.to_string()
    } else {
        format!("{}/", parent)
    })
}

/// On-disk account naming: the username part verbatim, the host part after
/// the last `@` URL-encoded. Account names without `@` never match.
fn sanitize_account(account_name: &str) -> Option<String> {
    let (username, host) = account_name.rsplit_once('@')?;
    Some(format!("{}@{}", username, urlencoding::encode(host)))
}
