//! Classification outcome for a single domain.

use std::fmt;

/// Verdict is the result of running the classification chain on a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Verdict {
    /// The domain belongs to the domestic network or domain space
    Domestic,
    /// No rule matched, or classification failed
    #[default]
    NotDomestic,
}

impl Verdict {
    /// Build a verdict from a rule chain result.
    pub fn from_bool(domestic: bool) -> Self {
        if domestic {
            Verdict::Domestic
        } else {
            Verdict::NotDomestic
        }
    }

    /// Whether the verdict is [`Verdict::Domestic`].
    pub fn is_domestic(self) -> bool {
        self == Verdict::Domestic
    }

    /// Get the string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Domestic => "DOMESTIC",
            Verdict::NotDomestic => "NOT-DOMESTIC",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_from_bool() {
        assert_eq!(Verdict::from_bool(true), Verdict::Domestic);
        assert_eq!(Verdict::from_bool(false), Verdict::NotDomestic);
        assert!(Verdict::Domestic.is_domestic());
        assert!(!Verdict::default().is_domestic());
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Domestic.to_string(), "DOMESTIC");
        assert_eq!(Verdict::NotDomestic.to_string(), "NOT-DOMESTIC");
    }
}
