use parceltrack_core::{Package, PackageStatus};
use serde::Serialize;

/// Per-status counts over the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub total: usize,
    pub in_transit: usize,
    pub ready_for_pickup: usize,
    pub picked_up: usize,
}

impl CollectionSummary {
    pub fn from_packages(packages: &[Package]) -> Self {
        let mut summary = Self {
            total: packages.len(),
            ..Self::default()
        };
        for p in packages {
            match p.status {
                PackageStatus::InTransit => summary.in_transit += 1,
                PackageStatus::ReadyForPickup => summary.ready_for_pickup += 1,
                PackageStatus::PickedUp => summary.picked_up += 1,
            }
        }
        summary
    }

    /// Size of the current view.
    pub fn current(&self) -> usize {
        self.in_transit + self.ready_for_pickup
    }
}
