/// One stored upload, as recorded by the host application's upload queue.
///
/// Read-only from the retention core's perspective.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRecord {
    pub account_name: String,
    /// Absolute local filesystem path of the uploaded copy.
    pub local_path: String,
    /// Epoch millis when the upload finished; `<= 0` means not completed.
    pub upload_end_timestamp: i64,
}

impl UploadRecord {
    pub fn new(
        account_name: impl Into<String>,
        local_path: impl Into<String>,
        upload_end_timestamp: i64,
    ) -> Self {
        Self {
            account_name: account_name.into(),
            local_path: local_path.into(),
            upload_end_timestamp,
        }
    }
}

/// Source of all stored upload records for the current account context.
pub trait UploadSource {
    fn stored_uploads(&self) -> Vec<UploadRecord>;
}

/// In-memory [`UploadSource`] with the bookkeeping the host's upload queue
/// offers: store, update by local path, clear. Used by tests and embedders
/// that already hold the records.
#[derive(Debug, Default)]
pub struct InMemoryUploadSource {
    records: Vec<UploadRecord>,
}

impl InMemoryUploadSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store_upload(&mut self, record: UploadRecord) {
        self.records.push(record);
    }

    /// Replaces the record with the same `local_path`, or appends.
    pub fn update_upload(&mut self, record: UploadRecord) {
        match self
            .records
            .iter_mut()
            .find(|r| r.local_path == record.local_path)
        {
            Some(existing) => *existing = record,
            None => self.records.push(record),
        }
    }

    pub fn remove_all_uploads(&mut self) {
        self.records.clear();
    }
}

impl UploadSource for InMemoryUploadSource {
    fn stored_uploads(&self) -> Vec<UploadRecord> {
        self.records.clone()
    }
}
