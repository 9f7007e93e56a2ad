//! User-initiated edits and view derivation over the collection.

use parceltrack_core::{Package, PackageStatus, ViewMode};

/// Toggle the status of the package with `id`.
///
/// Returns the new status, or `None` when no package has that id (the
/// collection is then unchanged). `last_updated` is not touched: only
/// creation and merges refresh it.
pub fn toggle_status(packages: &mut [Package], id: &str) -> Option<PackageStatus> {
    let pkg = packages.iter_mut().find(|p| p.id == id)?;
    pkg.status = pkg.status.toggled();
    Some(pkg.status)
}

/// Remove the package with `id`. Returns the removed package, if any.
pub fn delete_package(packages: &mut Vec<Package>, id: &str) -> Option<Package> {
    let idx = packages.iter().position(|p| p.id == id)?;
    Some(packages.remove(idx))
}

/// Packages visible in `mode`, in collection order.
pub fn filter_view(packages: &[Package], mode: ViewMode) -> Vec<&Package> {
    packages
        .iter()
        .filter(|p| mode.includes(p.status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parceltrack_core::Carrier;

    fn pkg(id: &str, status: PackageStatus) -> Package {
        let now = Utc::now();
        Package {
            id: id.into(),
            tracking_number: format!("TN-{id}"),
            carrier: Carrier::Bring,
            sender: "s".into(),
            status,
            received_date: now,
            original_text: String::new(),
            last_updated: now,
        }
    }

    #[test]
    fn toggle_follows_status_law() {
        let mut packages = vec![
            pkg("a", PackageStatus::InTransit),
            pkg("b", PackageStatus::PickedUp),
        ];
        assert_eq!(toggle_status(&mut packages, "a"), Some(PackageStatus::PickedUp));
        assert_eq!(toggle_status(&mut packages, "b"), Some(PackageStatus::ReadyForPickup));
        assert_eq!(toggle_status(&mut packages, "a"), Some(PackageStatus::ReadyForPickup));
    }

    #[test]
    fn toggle_unknown_id_changes_nothing() {
        let mut packages = vec![pkg("a", PackageStatus::InTransit)];
        let before = packages.clone();
        assert_eq!(toggle_status(&mut packages, "zzz"), None);
        assert_eq!(packages, before);
    }

    #[test]
    fn toggle_keeps_last_updated() {
        let mut packages = vec![pkg("a", PackageStatus::InTransit)];
        let stamp = packages[0].last_updated;
        toggle_status(&mut packages, "a");
        assert_eq!(packages[0].last_updated, stamp);
    }

    #[test]
    fn delete_removes_only_that_package() {
        let mut packages = vec![
            pkg("a", PackageStatus::InTransit),
            pkg("b", PackageStatus::InTransit),
            pkg("c", PackageStatus::PickedUp),
        ];
        let removed = delete_package(&mut packages, "b").unwrap();
        assert_eq!(removed.id, "b");
        let ids: Vec<_> = packages.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(delete_package(&mut packages, "b").is_none());
    }

    #[test]
    fn views_split_on_picked_up() {
        let packages = vec![
            pkg("a", PackageStatus::InTransit),
            pkg("b", PackageStatus::PickedUp),
            pkg("c", PackageStatus::ReadyForPickup),
        ];
        let current: Vec<_> = filter_view(&packages, ViewMode::Current)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        let history: Vec<_> = filter_view(&packages, ViewMode::History)
            .into_iter()
            .map(|p| p.id.as_str())
            .collect();
        assert_eq!(current, ["a", "c"]);
        assert_eq!(history, ["b"]);
    }
}
