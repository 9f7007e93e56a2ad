use parceltrack_core::Package;

use crate::error::LookupError;

/// Index of the package with exactly this tracking number (case-sensitive).
pub fn position_by_tracking_number(packages: &[Package], tracking_number: &str) -> Option<usize> {
    packages
        .iter()
        .position(|p| p.tracking_number == tracking_number)
}

/// Resolve a user-typed id or unique id prefix to a full package id.
///
/// An exact id match wins even if it is also a prefix of another id.
pub fn find_by_id_prefix<'a>(packages: &'a [Package], prefix: &str) -> Result<&'a Package, LookupError> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(LookupError::NotFound(String::new()));
    }
    if let Some(exact) = packages.iter().find(|p| p.id == prefix) {
        return Ok(exact);
    }

    let candidates: Vec<&Package> = packages
        .iter()
        .filter(|p| p.id.starts_with(prefix))
        .collect();

    match candidates.as_slice() {
        [] => Err(LookupError::NotFound(prefix.to_string())),
        [only] => Ok(*only),
        many => Err(LookupError::Ambiguous {
            prefix: prefix.to_string(),
            matches: many.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use parceltrack_core::{Carrier, PackageStatus};

    fn pkg(id: &str, tn: &str) -> Package {
        let now = Utc::now();
        Package {
            id: id.into(),
            tracking_number: tn.into(),
            carrier: Carrier::Other,
            sender: "s".into(),
            status: PackageStatus::InTransit,
            received_date: now,
            original_text: String::new(),
            last_updated: now,
        }
    }

    #[test]
    fn tracking_number_exact_match() {
        let packages = vec![pkg("a", "TN1"), pkg("b", "TN2")];
        assert_eq!(position_by_tracking_number(&packages, "TN2"), Some(1));
        assert_eq!(position_by_tracking_number(&packages, "tn2"), None);
        assert_eq!(position_by_tracking_number(&packages, "TN"), None);
    }

    #[test]
    fn unique_prefix_resolves() {
        let packages = vec![pkg("abc-111", "TN1"), pkg("def-222", "TN2")];
        assert_eq!(find_by_id_prefix(&packages, "de").unwrap().id, "def-222");
    }

    #[test]
    fn ambiguous_prefix_is_an_error() {
        let packages = vec![pkg("abc-111", "TN1"), pkg("abd-222", "TN2")];
        let err = find_by_id_prefix(&packages, "ab").unwrap_err();
        assert_eq!(err, LookupError::Ambiguous { prefix: "ab".into(), matches: 2 });
    }

    #[test]
    fn exact_id_beats_prefix() {
        let packages = vec![pkg("abc", "TN1"), pkg("abcd", "TN2")];
        assert_eq!(find_by_id_prefix(&packages, "abc").unwrap().tracking_number, "TN1");
    }

    #[test]
    fn unknown_id_not_found() {
        let packages = vec![pkg("abc", "TN1")];
        assert!(matches!(
            find_by_id_prefix(&packages, "zzz"),
            Err(LookupError::NotFound(_))
        ));
        assert!(find_by_id_prefix(&packages, "  ").is_err());
    }
}
