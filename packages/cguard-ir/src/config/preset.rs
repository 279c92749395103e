//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// CI: constant indices and call-site rules only
    ///
    /// - Loop off-by-one checks off
    /// - Only direct dereferences count as unchecked use
    Fast,

    /// Development: every rule, lenient null policy
    #[default]
    Balanced,

    /// Security audit: every rule, strict null policy
    ///
    /// - Passing an unchecked allocation to `strcpy`/`printf`/... counts
    ///   as a use
    Thorough,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: fast, balanced, thorough",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }

    pub fn strict_null_checks(&self) -> bool {
        matches!(self, Self::Thorough)
    }

    pub fn loop_bounds(&self) -> bool {
        !matches!(self, Self::Fast)
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("fast").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("FAST").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("balanced").unwrap(), Preset::Balanced);
        assert_eq!(Preset::from_str("thorough").unwrap(), Preset::Thorough);
        assert!(Preset::from_str("custom").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Fast.to_string(), "fast");
        assert_eq!(Preset::Thorough.to_string(), "thorough");
        assert_eq!(Preset::default(), Preset::Balanced);
    }

    #[test]
    fn test_preset_switches() {
        assert!(!Preset::Fast.loop_bounds());
        assert!(Preset::Balanced.loop_bounds());
        assert!(!Preset::Balanced.strict_null_checks());
        assert!(Preset::Thorough.strict_null_checks());
    }
}
