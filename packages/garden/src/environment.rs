//! Environment and mood presets.
//!
//! An [`Environment`] selects the landscape geometry and its soundtrack; a
//! [`Mood`] only changes sky and lighting colors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Named landscape preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Valley,
    Forest,
    Park,
}

impl Environment {
    pub const ALL: [Environment; 3] = [Environment::Valley, Environment::Forest, Environment::Park];

    pub fn name(self) -> &'static str {
        match self {
            Environment::Valley => "valley",
            Environment::Forest => "forest",
            Environment::Park => "park",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Environment {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "valley" => Ok(Environment::Valley),
            "forest" => Ok(Environment::Forest),
            "park" => Ok(Environment::Park),
            _ => Err(ParsePresetError::new("environment", s)),
        }
    }
}

/// Lighting / time-of-day preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Morning,
    Sunset,
    Night,
}

impl Mood {
    pub const ALL: [Mood; 3] = [Mood::Morning, Mood::Sunset, Mood::Night];

    pub fn name(self) -> &'static str {
        match self {
            Mood::Morning => "morning",
            Mood::Sunset => "sunset",
            Mood::Night => "night",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mood {
    type Err = ParsePresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "morning" => Ok(Mood::Morning),
            "sunset" => Ok(Mood::Sunset),
            "night" => Ok(Mood::Night),
            _ => Err(ParsePresetError::new("mood", s)),
        }
    }
}

/// Returned when a preset name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParsePresetError {
    kind: &'static str,
    value: String,
}

impl ParsePresetError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse_is_case_insensitive() {
        assert_eq!("Forest".parse::<Environment>().unwrap(), Environment::Forest);
        assert_eq!(" park ".parse::<Environment>().unwrap(), Environment::Park);
        assert!("desert".parse::<Environment>().is_err());
    }

    #[test]
    fn test_mood_display_round_trips() {
        for mood in Mood::ALL {
            assert_eq!(mood.to_string().parse::<Mood>().unwrap(), mood);
        }
    }

    #[test]
    fn test_serde_uses_lowercase_names() {
        let json = serde_json::to_string(&Environment::Valley).unwrap();
        assert_eq!(json, "\"valley\"");
        let mood: Mood = serde_json::from_str("\"night\"").unwrap();
        assert_eq!(mood, Mood::Night);
    }

    #[test]
    fn test_parse_error_message() {
        let err = "dusk".parse::<Mood>().unwrap_err();
        assert_eq!(err.to_string(), "unknown mood 'dusk'");
    }
}
