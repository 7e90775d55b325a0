pub mod config;
pub mod error;
pub mod prelude;
pub mod retention;
pub mod storage;

pub use retention::{RetentionPolicyStore, SweepEngine};
pub use storage::{
    FileKeyValueStore, InMemoryUploadSource, KeyValueStore, UploadRecord, UploadSource,
};
