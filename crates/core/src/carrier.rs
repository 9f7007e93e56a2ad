use serde::{Deserialize, Serialize};

/// Shipping carrier. Closed set; anything unrecognized is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Carrier {
    PostNord,
    #[serde(rename = "GLS")]
    Gls,
    #[serde(rename = "DAO")]
    Dao,
    Bring,
    #[serde(rename = "DHL")]
    Dhl,
    #[serde(rename = "UPS")]
    Ups,
    FedEx,
    #[default]
    Other,
}

impl Carrier {
    pub const ALL: [Carrier; 8] = [
        Carrier::PostNord,
        Carrier::Gls,
        Carrier::Dao,
        Carrier::Bring,
        Carrier::Dhl,
        Carrier::Ups,
        Carrier::FedEx,
        Carrier::Other,
    ];

    /// Display name, identical to the serialized form.
    pub fn name(&self) -> &'static str {
        match self {
            Carrier::PostNord => "PostNord",
            Carrier::Gls => "GLS",
            Carrier::Dao => "DAO",
            Carrier::Bring => "Bring",
            Carrier::Dhl => "DHL",
            Carrier::Ups => "UPS",
            Carrier::FedEx => "FedEx",
            Carrier::Other => "Other",
        }
    }

    /// Best-effort classification of a free-form carrier label.
    ///
    /// Case, whitespace and punctuation are ignored ("Post Nord", "dhl-express",
    /// "Fed Ex" all classify). Unknown labels map to `Other`.
    pub fn from_label(label: &str) -> Carrier {
        let norm: String = label
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();

        match norm.as_str() {
            "postnord" | "postdanmark" => Carrier::PostNord,
            "gls" => Carrier::Gls,
            "dao" | "dao365" => Carrier::Dao,
            "bring" => Carrier::Bring,
            "ups" => Carrier::Ups,
            "fedex" | "federalexpress" => Carrier::FedEx,
            s if s.starts_with("dhl") => Carrier::Dhl,
            _ => Carrier::Other,
        }
    }
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
