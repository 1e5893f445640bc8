//! Display names.
//!
//! Names are unauthenticated labels. They are validated once, where the user
//! enters them; the sync core compares them as plain strings afterwards.

use std::{fmt, str::FromStr};

use crate::error::DisplayNameError;

/// Minimum display name length in characters.
pub const MIN_DISPLAY_NAME_CHARS: usize = 2;

/// Maximum display name length in characters.
pub const MAX_DISPLAY_NAME_CHARS: usize = 20;

/// A trimmed display name of 2 to 20 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim and validate a user-entered name.
    pub fn parse(raw: &str) -> Result<Self, DisplayNameError> {
        let trimmed = raw.trim();
        let chars = trimmed.chars().count();
        if chars < MIN_DISPLAY_NAME_CHARS {
            return Err(DisplayNameError::TooShort);
        }
        if chars > MAX_DISPLAY_NAME_CHARS {
            return Err(DisplayNameError::TooLong);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DisplayName {
    type Err = DisplayNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_trimmed() {
        assert_eq!(DisplayName::parse("  alice ").unwrap().as_str(), "alice");
    }

    #[test]
    fn length_bounds_are_inclusive() {
        assert!(DisplayName::parse("ab").is_ok());
        assert!(DisplayName::parse(&"x".repeat(20)).is_ok());
        assert_eq!(DisplayName::parse("a"), Err(DisplayNameError::TooShort));
        assert_eq!(DisplayName::parse("   "), Err(DisplayNameError::TooShort));
        assert_eq!(DisplayName::parse(&"x".repeat(21)), Err(DisplayNameError::TooLong));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // 10 two-byte characters
        assert!(DisplayName::parse(&"é".repeat(10)).is_ok());
    }
}
