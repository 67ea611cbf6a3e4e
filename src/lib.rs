//! Student records sidecar: an in-memory store of students, attendance, exam
//! marks and fee payments persisted as flat JSON files, driven over a
//! JSON-lines protocol on stdin/stdout.

pub mod backup;
pub mod db;
pub mod error;
pub mod ipc;
pub mod model;
pub mod store;

pub use error::{Result, StoreError};
pub use store::DataStore;
