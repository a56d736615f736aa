//! Speakers, turns, and the speaker-to-voice mapping.

use {podforge_config::ElevenLabsConfig, tracing::warn};

/// One of the two fixed podcast roles. `Primary` is the male-voiced host,
/// `Secondary` the female-voiced co-host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    Primary,
    Secondary,
}

impl Speaker {
    /// The other speaker, used by the alternation fallback when the model
    /// omits a tag.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Primary => Self::Secondary,
            Self::Secondary => Self::Primary,
        }
    }

    /// Tag used in scripts and transcripts.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Primary => "male-1",
            Self::Secondary => "female-1",
        }
    }

    /// Resolve a script tag from the recognized set.
    ///
    /// `male`/`host` normalize to [`Speaker::Primary`], `female`/`guest`
    /// to [`Speaker::Secondary`]; the numbered forms pass through.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "male-1" | "male" | "host" => Some(Self::Primary),
            "female-1" | "female" | "guest" => Some(Self::Secondary),
            _ => None,
        }
    }

    /// Resolve a tag, failing closed: unrecognized tags log a warning and
    /// map to the primary speaker instead of dropping the turn.
    #[must_use]
    pub fn from_tag_or_primary(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or_else(|| {
            warn!(tag, "unknown speaker tag, defaulting to primary voice");
            Self::Primary
        })
    }
}

/// One attributed utterance in the generated dialogue. Immutable once
/// created; the text is non-empty and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogueTurn {
    speaker: Speaker,
    text: String,
}

impl DialogueTurn {
    /// Create a turn, returning `None` for blank text.
    #[must_use]
    pub fn new(speaker: Speaker, text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            speaker,
            text: text.to_string(),
        })
    }

    #[must_use]
    pub fn speaker(&self) -> Speaker {
        self.speaker
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Transcript line for this turn.
    #[must_use]
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.speaker.label(), self.text)
    }
}

/// Fixed speaker-to-voice lookup, owned by configuration.
#[derive(Debug, Clone)]
pub struct VoiceMap {
    primary: String,
    secondary: String,
}

impl VoiceMap {
    #[must_use]
    pub fn new(primary: impl Into<String>, secondary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            secondary: secondary.into(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ElevenLabsConfig) -> Self {
        Self::new(&config.primary_voice_id, &config.secondary_voice_id)
    }

    /// Voice ID for a speaker. Exhaustive; there is no unknown case.
    #[must_use]
    pub fn voice_id(&self, speaker: Speaker) -> &str {
        match speaker {
            Speaker::Primary => &self.primary,
            Speaker::Secondary => &self.secondary,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_normalization() {
        assert_eq!(Speaker::from_tag("male-1"), Some(Speaker::Primary));
        assert_eq!(Speaker::from_tag("male"), Some(Speaker::Primary));
        assert_eq!(Speaker::from_tag("HOST"), Some(Speaker::Primary));
        assert_eq!(Speaker::from_tag("female-1"), Some(Speaker::Secondary));
        assert_eq!(Speaker::from_tag("Female"), Some(Speaker::Secondary));
        assert_eq!(Speaker::from_tag("guest"), Some(Speaker::Secondary));
        assert_eq!(Speaker::from_tag("narrator"), None);
    }

    #[test]
    fn test_unknown_tag_defaults_to_primary() {
        assert_eq!(Speaker::from_tag_or_primary("narrator"), Speaker::Primary);
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Speaker::Primary.opposite(), Speaker::Secondary);
        assert_eq!(Speaker::Secondary.opposite(), Speaker::Primary);
    }

    #[test]
    fn test_turn_trims_and_rejects_blank() {
        let turn = DialogueTurn::new(Speaker::Primary, "  hello  ").unwrap();
        assert_eq!(turn.text(), "hello");
        assert!(DialogueTurn::new(Speaker::Primary, "   ").is_none());
    }

    #[test]
    fn test_transcript_line() {
        let turn = DialogueTurn::new(Speaker::Secondary, "hi there").unwrap();
        assert_eq!(turn.transcript_line(), "female-1: hi there");
    }

    #[test]
    fn test_voice_map_is_exhaustive() {
        let voices = VoiceMap::new("voice-a", "voice-b");
        assert_eq!(voices.voice_id(Speaker::Primary), "voice-a");
        assert_eq!(voices.voice_id(Speaker::Secondary), "voice-b");
    }
}
