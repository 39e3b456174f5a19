use super::types::FamilyTag;

/// Substring markers checked in order; the first one found in the voice name wins.
///
/// `Chirp3-HD` must stay ahead of `Chirp-HD`, and the Neural2-priced variants
/// (`News`, `Casual`) after `Neural2` itself.
pub const FAMILY_PRIORITY: &[(&str, FamilyTag)] = &[
    ("Chirp3-HD", FamilyTag::Chirp3Hd),
    ("Chirp-HD", FamilyTag::ChirpHd),
    ("Studio", FamilyTag::Studio),
    ("Polyglot", FamilyTag::Polyglot),
    ("Neural2", FamilyTag::Neural2),
    ("News", FamilyTag::News),
    ("Casual", FamilyTag::Casual),
    ("Wavenet", FamilyTag::Wavenet),
    ("Standard", FamilyTag::Standard),
];

/// Classify a voice name (e.g. `en-US-Chirp3-HD-Fenrir`) into its pricing family.
///
/// Case-sensitive; voices matching no marker are `Unknown`.
pub fn classify(voice_identifier: &str) -> FamilyTag {
    FAMILY_PRIORITY
        .iter()
        .find(|(marker, _)| voice_identifier.contains(marker))
        .map(|(_, tag)| *tag)
        .unwrap_or(FamilyTag::Unknown)
}
