//! `parceltrack-recon`: package reconciliation engine.
//!
//! Pure engine crate: receives the current collection and an extraction
//! result, returns the new collection. Storage and network belong to callers.

pub mod engine;
pub mod error;
pub mod evidence;
pub mod matcher;
pub mod model;
pub mod ops;

pub use engine::{reconcile, reconcile_now};
pub use error::LookupError;
pub use evidence::CollectionSummary;
pub use model::{Outcome, Reconciliation, RejectReason};
pub use ops::{delete_package, filter_view, toggle_status};
