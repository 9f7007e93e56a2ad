//! `parceltrack-core`: shared types for tracked packages.
//!
//! No IO or clock access; ids are assigned by callers. Everything here is
//! plain data plus the small rules that belong to the data itself: the status
//! toggle, view membership and lenient label parsing.

pub mod carrier;
pub mod package;
pub mod status;
pub mod view;

pub use carrier::Carrier;
pub use package::{Package, ParseResult, UNKNOWN_SENDER};
pub use status::PackageStatus;
pub use view::ViewMode;
