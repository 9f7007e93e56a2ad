use chrono::{DateTime, Utc};
use tempfile::tempdir;

use parceltrack_core::{Carrier, Package, PackageStatus};
use parceltrack_io::{PackageStore, STORE_FORMAT_VERSION};

fn sample(id: &str, tn: &str) -> Package {
    let ts = DateTime::parse_from_rfc3339("2026-02-14T07:45:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Package {
        id: id.into(),
        tracking_number: tn.into(),
        carrier: Carrier::PostNord,
        sender: "Zalando".into(),
        status: PackageStatus::ReadyForPickup,
        received_date: ts,
        original_text: "Din pakke er klar til afhentning".into(),
        last_updated: ts,
    }
}

#[test]
fn missing_file_loads_empty() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    assert!(store.load().is_empty());
}

#[test]
fn save_then_load_preserves_order_and_fields() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(&dir.path().join("nested"));
    let packages = vec![sample("b", "TN-2"), sample("a", "TN-1")];

    store.save(&packages).unwrap();
    assert_eq!(store.load(), packages);
}

#[test]
fn saved_file_has_versioned_envelope() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    store.save(&[sample("a", "TN-1")]).unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["version"], STORE_FORMAT_VERSION);
    assert_eq!(raw["packages"][0]["trackingNumber"], "TN-1");
    assert!(!dir.path().join("packages.json.tmp").exists());
}

#[test]
fn bare_array_is_accepted() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    let json = serde_json::to_string(&vec![sample("a", "TN-1")]).unwrap();
    std::fs::write(store.path(), json).unwrap();

    let loaded = store.load();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].tracking_number, "TN-1");
}

#[test]
fn corrupt_file_loads_empty_and_is_kept_aside() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    std::fs::write(store.path(), "{ not json").unwrap();

    assert!(store.load().is_empty());
    assert!(dir.path().join("packages.json.bak").exists());

    // A later save starts cleanly.
    store.save(&[sample("a", "TN-1")]).unwrap();
    assert_eq!(store.load().len(), 1);
}

#[test]
fn non_utf8_file_is_kept_aside_not_overwritten() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    let raw: &[u8] = b"{\"packages\": [\xff\xfe]}";
    std::fs::write(store.path(), raw).unwrap();

    assert!(store.load().is_empty());
    let backup = dir.path().join("packages.json.bak");
    assert_eq!(std::fs::read(&backup).unwrap(), raw);

    store.save(&[sample("a", "TN-1")]).unwrap();
    assert_eq!(std::fs::read(&backup).unwrap(), raw);
    assert_eq!(store.load().len(), 1);
}

#[test]
fn unknown_status_value_is_treated_as_corrupt() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    let mut raw = serde_json::to_value(vec![sample("a", "TN-1")]).unwrap();
    raw[0]["status"] = serde_json::json!("LOST");
    std::fs::write(store.path(), raw.to_string()).unwrap();

    assert!(store.load().is_empty());
}

#[test]
fn clear_removes_data() {
    let dir = tempdir().unwrap();
    let store = PackageStore::in_dir(dir.path());
    store.save(&[sample("a", "TN-1")]).unwrap();

    store.clear().unwrap();
    assert!(!store.path().exists());
    assert!(store.load().is_empty());
}
