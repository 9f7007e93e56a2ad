use serde::{Deserialize, Serialize};

/// Delivery status of a tracked package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageStatus {
    #[default]
    InTransit,
    ReadyForPickup,
    PickedUp,
}

impl PackageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InTransit => "IN_TRANSIT",
            Self::ReadyForPickup => "READY_FOR_PICKUP",
            Self::PickedUp => "PICKED_UP",
        }
    }

    /// Human label for list output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InTransit => "In transit",
            Self::ReadyForPickup => "Ready for pickup",
            Self::PickedUp => "Picked up",
        }
    }

    pub fn is_picked_up(&self) -> bool {
        matches!(self, Self::PickedUp)
    }

    /// User toggle: `PickedUp` goes back to `ReadyForPickup`, every other
    /// state goes to `PickedUp`. Not a rotation; `InTransit` is never a target.
    pub fn toggled(&self) -> Self {
        match self {
            Self::PickedUp => Self::ReadyForPickup,
            Self::InTransit | Self::ReadyForPickup => Self::PickedUp,
        }
    }

    /// Lenient parse of a status label coming from the extraction service.
    ///
    /// Only the two states the service may assign are recognized. Anything
    /// else returns `None` and the caller falls back to the default.
    pub fn from_extracted(label: &str) -> Option<Self> {
        let norm: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match norm.as_str() {
            "intransit" | "transit" | "onitsway" | "shipped" => Some(Self::InTransit),
            "readyforpickup" | "readytopickup" | "ready" | "awaitingpickup" => {
                Some(Self::ReadyForPickup)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
