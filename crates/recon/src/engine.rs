use chrono::{DateTime, Utc};
use parceltrack_core::{Package, ParseResult, UNKNOWN_SENDER};

use crate::matcher::position_by_tracking_number;
use crate::model::{Outcome, Reconciliation, RejectReason};

/// Merge an extraction result into the collection.
///
/// Tracking number is the only merge key. A match updates status, sender
/// (only when the result names one) and `last_updated`, in place. No match
/// prepends a new package. A missing result or tracking number returns the
/// collection untouched with a `Rejected` outcome.
///
/// `new_id` is called only when a package is created.
pub fn reconcile(
    result: Option<&ParseResult>,
    source_text: &str,
    mut packages: Vec<Package>,
    now: DateTime<Utc>,
    new_id: impl FnOnce() -> String,
) -> Reconciliation {
    let Some(result) = result else {
        return rejected(packages, RejectReason::NoResult);
    };
    let Some(tracking_number) = result.tracking_key() else {
        return rejected(packages, RejectReason::MissingTrackingNumber);
    };

    if let Some(idx) = position_by_tracking_number(&packages, tracking_number) {
        let existing = &mut packages[idx];
        existing.status = result.status;
        if let Some(sender) = result.sender_value() {
            existing.sender = sender.to_string();
        }
        existing.last_updated = now;
        let id = existing.id.clone();
        return Reconciliation {
            packages,
            outcome: Outcome::Updated { id },
        };
    }

    let id = new_id();
    let package = Package {
        id: id.clone(),
        tracking_number: tracking_number.to_string(),
        carrier: result.carrier,
        sender: result
            .sender_value()
            .unwrap_or(UNKNOWN_SENDER)
            .to_string(),
        status: result.status,
        received_date: now,
        original_text: source_text.to_string(),
        last_updated: now,
    };
    packages.insert(0, package);

    Reconciliation {
        packages,
        outcome: Outcome::Created { id },
    }
}

/// `reconcile` against the wall clock with a random UUID v4 id.
pub fn reconcile_now(
    result: Option<&ParseResult>,
    source_text: &str,
    packages: Vec<Package>,
) -> Reconciliation {
    reconcile(result, source_text, packages, Utc::now(), || {
        uuid::Uuid::new_v4().to_string()
    })
}

fn rejected(packages: Vec<Package>, reason: RejectReason) -> Reconciliation {
    Reconciliation {
        packages,
        outcome: Outcome::Rejected { reason },
    }
}
