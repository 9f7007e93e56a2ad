use parceltrack_core::Package;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Why an extraction result was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// Extraction failed or returned nothing.
    NoResult,
    /// Extraction succeeded but found no tracking number.
    MissingTrackingNumber,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoResult => write!(f, "no_result"),
            Self::MissingTrackingNumber => write!(f, "missing_tracking_number"),
        }
    }
}

/// What a reconciliation did to the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Outcome {
    /// New package prepended.
    Created { id: String },
    /// Existing package merged in place.
    Updated { id: String },
    /// Collection left untouched.
    Rejected { reason: RejectReason },
}

impl Outcome {
    pub fn accepted(&self) -> bool {
        !matches!(self, Outcome::Rejected { .. })
    }

    /// Id of the created or updated package.
    pub fn package_id(&self) -> Option<&str> {
        match self {
            Outcome::Created { id } | Outcome::Updated { id } => Some(id),
            Outcome::Rejected { .. } => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// Collection after reconciliation plus what happened.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub packages: Vec<Package>,
    pub outcome: Outcome,
}

impl Reconciliation {
    pub fn accepted(&self) -> bool {
        self.outcome.accepted()
    }

    /// The created or updated package, if any.
    pub fn touched(&self) -> Option<&Package> {
        let id = self.outcome.package_id()?;
        self.packages.iter().find(|p| p.id == id)
    }
}
