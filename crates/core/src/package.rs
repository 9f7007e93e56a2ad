use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::carrier::Carrier;
use crate::status::PackageStatus;

/// Sender shown when the extraction did not name one.
pub const UNKNOWN_SENDER: &str = "Unknown supplier";

// ---------------------------------------------------------------------------
// Package
// ---------------------------------------------------------------------------

/// A tracked delivery. One per unique tracking number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Opaque unique id, assigned at creation.
    pub id: String,
    pub tracking_number: String,
    pub carrier: Carrier,
    pub sender: String,
    pub status: PackageStatus,
    /// Set once at creation.
    pub received_date: DateTime<Utc>,
    /// Pasted text, or a synthetic label for screenshot sources.
    pub original_text: String,
    /// Refreshed on create and on every merge.
    pub last_updated: DateTime<Utc>,
}

impl Package {
    /// Short form of the id for tables.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(8)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }
}

// ---------------------------------------------------------------------------
// Extraction result
// ---------------------------------------------------------------------------

/// Structured guess produced by the extraction service.
///
/// Every field is untrusted. Missing carrier/status deserialize to their
/// defaults (`Other`, `InTransit`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParseResult {
    pub tracking_number: Option<String>,
    pub carrier: Carrier,
    pub sender: Option<String>,
    pub status: PackageStatus,
}

impl ParseResult {
    /// Tracking number usable as a merge key: present and not blank.
    /// Returned verbatim (no trimming or case folding).
    pub fn tracking_key(&self) -> Option<&str> {
        self.tracking_number
            .as_deref()
            .filter(|tn| !tn.trim().is_empty())
    }

    /// Sender if present and not blank.
    pub fn sender_value(&self) -> Option<&str> {
        self.sender.as_deref().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_result_defaults_missing_fields() {
        let r: ParseResult = serde_json::from_str(r#"{"trackingNumber":"TNT123"}"#).unwrap();
        assert_eq!(r.tracking_number.as_deref(), Some("TNT123"));
        assert_eq!(r.carrier, Carrier::Other);
        assert_eq!(r.status, PackageStatus::InTransit);
        assert!(r.sender.is_none());
    }

    #[test]
    fn parse_result_null_tracking_number() {
        let r: ParseResult =
            serde_json::from_str(r#"{"trackingNumber":null,"carrier":"GLS"}"#).unwrap();
        assert!(r.tracking_key().is_none());
        assert_eq!(r.carrier, Carrier::Gls);
    }

    #[test]
    fn blank_tracking_number_is_not_a_key() {
        let r = ParseResult {
            tracking_number: Some("   ".into()),
            ..Default::default()
        };
        assert!(r.tracking_key().is_none());
    }

    #[test]
    fn tracking_key_is_verbatim() {
        let r = ParseResult {
            tracking_number: Some("abc123".into()),
            ..Default::default()
        };
        assert_eq!(r.tracking_key(), Some("abc123"));
    }

    #[test]
    fn package_serializes_camel_case() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let pkg = Package {
            id: "0f8e".into(),
            tracking_number: "TNT123".into(),
            carrier: Carrier::PostNord,
            sender: UNKNOWN_SENDER.into(),
            status: PackageStatus::InTransit,
            received_date: now,
            original_text: "hello".into(),
            last_updated: now,
        };
        let json = serde_json::to_value(&pkg).unwrap();
        assert_eq!(json["trackingNumber"], "TNT123");
        assert_eq!(json["carrier"], "PostNord");
        assert_eq!(json["status"], "IN_TRANSIT");
        assert_eq!(json["originalText"], "hello");
        assert!(json["receivedDate"].is_string());
    }

    #[test]
    fn short_id_truncates() {
        let now = Utc::now();
        let pkg = Package {
            id: "123456789abc".into(),
            tracking_number: "X".into(),
            carrier: Carrier::Other,
            sender: String::new(),
            status: PackageStatus::InTransit,
            received_date: now,
            original_text: String::new(),
            last_updated: now,
        };
        assert_eq!(pkg.short_id(), "12345678");
    }
}
