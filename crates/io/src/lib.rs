// Local persistence

pub mod store;

pub use store::{PackageStore, StoreError};

/// Stored package file version
/// Increment when the schema changes in a way that old versions can't read
pub const STORE_FORMAT_VERSION: u32 = 1;
