// Declare modules at the root level
pub mod domain;
pub mod error;
pub mod memory_store;
pub mod object_store;
pub mod record_store;
pub mod s3_store;
pub mod summary;
pub mod time;

// Test utilities module (available in test and integration test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export everything under a shared namespace for external access
pub mod shared {
    pub use super::domain;
    pub use super::error;
    pub use super::memory_store;
    pub use super::object_store;
    pub use super::record_store;
    pub use super::s3_store;
    pub use super::summary;
    pub use super::time;
}

// Also re-export at root for convenience
pub use domain::*;
pub use error::*;
pub use memory_store::*;
pub use object_store::*;
pub use record_store::*;
pub use s3_store::*;
pub use summary::*;
pub use time::*;
