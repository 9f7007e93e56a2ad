use serde::{Deserialize, Serialize};

use crate::status::PackageStatus;

/// Which slice of the collection a list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Everything not yet picked up.
    #[default]
    Current,
    /// Picked-up packages.
    History,
}

impl ViewMode {
    pub fn includes(&self, status: PackageStatus) -> bool {
        match self {
            ViewMode::Current => !status.is_picked_up(),
            ViewMode::History => status.is_picked_up(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ViewMode::Current => "Current",
            ViewMode::History => "History",
        }
    }
}
