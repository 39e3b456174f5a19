use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Column order of the usage log. Written once as the header row.
pub const LEDGER_COLUMNS: [&str; 7] = [
    "timestamp_utc",
    "month",
    "chars",
    "voice",
    "language",
    "format",
    "output_file",
];

/// Format a UTC instant as its `YYYY-MM` month key
pub fn month_key(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m").to_string()
}

/// Check a `YYYY-MM` month key, as accepted by `--month` and the HTTP API
pub fn is_valid_month_key(key: &str) -> bool {
    key.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", key), "%Y-%m-%d").is_ok()
}

/// Pricing family of a voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyTag {
    Chirp3Hd,
    ChirpHd,
    Studio,
    Polyglot,
    Neural2,
    News,
    Casual,
    Wavenet,
    Standard,
    Unknown,
}

impl FamilyTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyTag::Chirp3Hd => "Chirp3-HD",
            FamilyTag::ChirpHd => "Chirp-HD",
            FamilyTag::Studio => "Studio",
            FamilyTag::Polyglot => "Polyglot",
            FamilyTag::Neural2 => "Neural2",
            FamilyTag::News => "News",
            FamilyTag::Casual => "Casual",
            FamilyTag::Wavenet => "Wavenet",
            FamilyTag::Standard => "Standard",
            FamilyTag::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FamilyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Families sort by their display name so reports come out alphabetical.
impl Ord for FamilyTag {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for FamilyTag {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for FamilyTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single synthesis event, recorded once and never modified.
#[derive(Debug, Clone)]
pub struct UsageEvent {
    pub timestamp: DateTime<Utc>,
    pub character_count: u64,
    pub voice_identifier: String,
    pub language_code: String,
    pub audio_format: String,
    pub output_path: String,
}

impl UsageEvent {
    pub fn month_key(&self) -> String {
        month_key(&self.timestamp)
    }
}

/// One row of the usage log exactly as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRow {
    pub timestamp_utc: String,
    pub month: String,
    pub chars: u64,
    pub voice: String,
    pub language: String,
    pub format: String,
    pub output_file: String,
}

impl From<&UsageEvent> for LedgerRow {
    fn from(event: &UsageEvent) -> Self {
        Self {
            timestamp_utc: event.timestamp.to_rfc3339(),
            month: event.month_key(),
            chars: event.character_count,
            voice: event.voice_identifier.clone(),
            language: event.language_code.clone(),
            format: event.audio_format.clone(),
            output_file: event.output_path.clone(),
        }
    }
}

/// Free tier and rate for one pricing family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FamilyPricing {
    pub free_characters_per_month: u64,
    /// USD per 1,000,000 characters
    pub rate_per_million_characters: f64,
}

/// Month-to-date usage of one family, with the billable remainder priced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyUsage {
    pub chars: u64,
    pub free_tier: u64,
    pub billable_chars: u64,
    pub estimated_cost_usd: f64,
}

impl FamilyUsage {
    pub fn compute(chars: u64, pricing: FamilyPricing) -> Self {
        let billable_chars = chars.saturating_sub(pricing.free_characters_per_month);
        Self {
            chars,
            free_tier: pricing.free_characters_per_month,
            billable_chars,
            estimated_cost_usd: billable_chars as f64 * pricing.rate_per_million_characters
                / 1_000_000.0,
        }
    }
}

/// Usage picture returned alongside each synthesis request
#[derive(Debug, Clone, Serialize)]
pub struct UsageSnapshot {
    pub chars_this_request: u64,
    pub voice_family: FamilyTag,
    pub month_key: String,
    pub month_to_date_by_family: BTreeMap<FamilyTag, FamilyUsage>,
}

impl UsageSnapshot {
    pub fn total_estimated_cost_usd(&self) -> f64 {
        self.month_to_date_by_family
            .values()
            .map(|u| u.estimated_cost_usd)
            .sum()
    }
}

/// Per-family report for a whole month, without a triggering request
#[derive(Debug, Clone, Serialize)]
pub struct MonthReport {
    pub month_key: String,
    pub by_family: BTreeMap<FamilyTag, FamilyUsage>,
    pub total_chars: u64,
    pub total_estimated_cost_usd: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_billable_never_negative() {
        let pricing = FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 30.0,
        };
        let usage = FamilyUsage::compute(10, pricing);
        assert_eq!(usage.billable_chars, 0);
        assert!((usage.estimated_cost_usd).abs() < 1e-9);

        let usage = FamilyUsage::compute(1_000_000, pricing);
        assert_eq!(usage.billable_chars, 0);
    }

    #[test]
    fn test_billable_above_free_tier() {
        let pricing = FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 30.0,
        };
        let usage = FamilyUsage::compute(1_100_000, pricing);
        assert_eq!(usage.billable_chars, 100_000);
        assert!((usage.estimated_cost_usd - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_month_key_uses_utc() {
        let at = Utc.with_ymd_and_hms(2025, 6, 30, 23, 59, 59).unwrap();
        assert_eq!(month_key(&at), "2025-06");
    }

    #[test]
    fn test_month_key_validation() {
        assert!(is_valid_month_key("2025-06"));
        assert!(!is_valid_month_key("2025-13"));
        assert!(!is_valid_month_key("2025-6"));
        assert!(!is_valid_month_key("june"));
    }

    #[test]
    fn test_families_sort_by_name() {
        let mut tags = vec![FamilyTag::Wavenet, FamilyTag::Chirp3Hd, FamilyTag::Neural2];
        tags.sort();
        assert_eq!(
            tags,
            vec![FamilyTag::Chirp3Hd, FamilyTag::Neural2, FamilyTag::Wavenet]
        );
    }

    #[test]
    fn test_family_tag_serializes_as_name() {
        let json = serde_json::to_string(&FamilyTag::Chirp3Hd).unwrap();
        assert_eq!(json, "\"Chirp3-HD\"");
    }
}
