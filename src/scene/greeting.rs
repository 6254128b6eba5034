//! Bounded greeting text shown beneath the tree

use std::fmt;

/// Maximum greeting length, in characters
pub const MAX_GREETING_CHARS: usize = 30;

pub const DEFAULT_GREETING: &str = "Merry Christmas";

/// User-edited greeting, never longer than [`MAX_GREETING_CHARS`] characters
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Greeting(String);

impl Greeting {
    /// Builds a greeting, truncating anything past the length cap
    pub fn new(text: impl Into<String>) -> Self {
        let mut text = text.into();
        truncate_chars(&mut text, MAX_GREETING_CHARS);
        Self(text)
    }

    /// Whether `text` would have to be truncated to fit
    pub fn exceeds_limit(text: &str) -> bool {
        text.chars().count() > MAX_GREETING_CHARS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl Default for Greeting {
    fn default() -> Self {
        Self(DEFAULT_GREETING.to_string())
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Greeting {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Truncates `text` in place to at most `max` characters, on a char boundary
pub fn truncate_chars(text: &mut String, max: usize) {
    if let Some((index, _)) = text.char_indices().nth(max) {
        text.truncate(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_greeting() {
        assert_eq!(Greeting::default().as_str(), "Merry Christmas");
    }

    #[test]
    fn test_long_greeting_is_truncated() {
        let long = "A".repeat(45);
        assert!(Greeting::exceeds_limit(&long));
        let greeting = Greeting::new(long);
        assert_eq!(greeting.char_count(), MAX_GREETING_CHARS);
        assert_eq!(greeting.as_str(), "A".repeat(30));
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "Feliz Navidad 🎄🎄🎄 y próspero año nuevo";
        let greeting = Greeting::new(text);
        assert_eq!(greeting.char_count(), 30);
        assert!(text.starts_with(greeting.as_str()));
    }

    #[test]
    fn test_short_greeting_untouched() {
        let greeting = Greeting::from("Happy Holidays");
        assert_eq!(greeting.to_string(), "Happy Holidays");
        assert!(!Greeting::exceeds_limit("Happy Holidays"));

        let exact = "x".repeat(30);
        assert_eq!(Greeting::new(exact.clone()).as_str(), exact);
    }
}
