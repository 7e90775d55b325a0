mod kv;
mod uploads;

pub use kv::{FileKeyValueStore, KeyValueStore};
pub use uploads::{InMemoryUploadSource, UploadRecord, UploadSource};
