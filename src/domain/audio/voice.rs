use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SAMPLE_RATE_HERTZ: u32 = 48_000;
pub const HANDSET_EFFECTS_PROFILE: &str = "handset-class-device";

/// Synthesis engine tier. Premium first, standard as fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceTier {
    Wavenet,
    Standard,
}

impl VoiceTier {
    /// Order in which tiers are attempted for every request
    pub const FALLBACK_ORDER: [VoiceTier; 2] = [VoiceTier::Wavenet, VoiceTier::Standard];

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceTier::Wavenet => "Wavenet",
            VoiceTier::Standard => "Standard",
        }
    }
}

impl fmt::Display for VoiceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SsmlGender {
    Female,
}

/// Voice selection sent to the synthesis API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceProfile {
    pub tier: VoiceTier,
    pub language_code: String,
    pub gender: SsmlGender,
    pub name: String,
}

impl VoiceProfile {
    /// `<languageCode>-<Tier>-A`, female
    pub fn for_tier(language_code: &str, tier: VoiceTier) -> Self {
        Self {
            tier,
            language_code: language_code.to_string(),
            gender: SsmlGender::Female,
            name: format!("{}-{}-A", language_code, tier.as_str()),
        }
    }

    pub fn fallback_chain(language_code: &str) -> [VoiceProfile; 2] {
        VoiceTier::FALLBACK_ORDER.map(|tier| Self::for_tier(language_code, tier))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    Mp3,
}

/// Output format shared by every voice profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSettings {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub effects_profile_ids: Vec<String>,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            encoding: AudioEncoding::Mp3,
            sample_rate_hertz: DEFAULT_SAMPLE_RATE_HERTZ,
            effects_profile_ids: vec![HANDSET_EFFECTS_PROFILE.to_string()],
        }
    }
}
