use super::types::{FamilyPricing, FamilyTag};

/// Hand-maintained monthly free tier and USD rate per 1M characters.
///
/// Families missing from this table price at zero.
const BILLING_TABLE: &[(FamilyTag, FamilyPricing)] = &[
    (
        FamilyTag::Chirp3Hd,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 30.0,
        },
    ),
    (
        FamilyTag::ChirpHd,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 30.0,
        },
    ),
    (
        FamilyTag::Studio,
        FamilyPricing {
            free_characters_per_month: 100_000,
            rate_per_million_characters: 160.0,
        },
    ),
    (
        FamilyTag::Polyglot,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 16.0,
        },
    ),
    (
        FamilyTag::Neural2,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 16.0,
        },
    ),
    (
        FamilyTag::News,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 16.0,
        },
    ),
    (
        FamilyTag::Casual,
        FamilyPricing {
            free_characters_per_month: 1_000_000,
            rate_per_million_characters: 16.0,
        },
    ),
    (
        FamilyTag::Wavenet,
        FamilyPricing {
            free_characters_per_month: 4_000_000,
            rate_per_million_characters: 4.0,
        },
    ),
    (
        FamilyTag::Standard,
        FamilyPricing {
            free_characters_per_month: 4_000_000,
            rate_per_million_characters: 4.0,
        },
    ),
];

const ZERO_PRICING: FamilyPricing = FamilyPricing {
    free_characters_per_month: 0,
    rate_per_million_characters: 0.0,
};

/// Look up pricing for a family. Returns a zero record for `Unknown`.
pub fn pricing_for(family: FamilyTag) -> FamilyPricing {
    BILLING_TABLE
        .iter()
        .find(|(tag, _)| *tag == family)
        .map(|(_, pricing)| *pricing)
        .unwrap_or(ZERO_PRICING)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usage::family::FAMILY_PRIORITY;

    #[test]
    fn test_chirp3_pricing() {
        let p = pricing_for(FamilyTag::Chirp3Hd);
        assert_eq!(p.free_characters_per_month, 1_000_000);
        assert!((p.rate_per_million_characters - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_neural2_free_tier() {
        assert_eq!(
            pricing_for(FamilyTag::Neural2).free_characters_per_month,
            1_000_000
        );
    }

    #[test]
    fn test_unknown_is_free_and_zero_rate() {
        let p = pricing_for(FamilyTag::Unknown);
        assert_eq!(p.free_characters_per_month, 0);
        assert!((p.rate_per_million_characters).abs() < 1e-9);
    }

    #[test]
    fn test_every_classified_family_is_priced() {
        for (_, tag) in FAMILY_PRIORITY {
            let p = pricing_for(*tag);
            assert!(p.rate_per_million_characters > 0.0, "{} has no rate", tag);
        }
    }
}
