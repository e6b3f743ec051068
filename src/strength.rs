// 🔐 Password Strength - Advisory classification, never gates submission

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrengthLevel {
    Weak,
    Medium,
    Strong,
}

impl StrengthLevel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=2 => StrengthLevel::Weak,
            3..=4 => StrengthLevel::Medium,
            _ => StrengthLevel::Strong,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "Weak",
            StrengthLevel::Medium => "Medium",
            StrengthLevel::Strong => "Strong",
        }
    }

    pub fn fill_percent(&self) -> u8 {
        match self {
            StrengthLevel::Weak => 20,
            StrengthLevel::Medium => 60,
            StrengthLevel::Strong => 100,
        }
    }

    /// CSS color of the bar and label
    pub fn color(&self) -> &'static str {
        match self {
            StrengthLevel::Weak => "red",
            StrengthLevel::Medium => "orange",
            StrengthLevel::Strong => "var(--success)",
        }
    }
}

/// Score out of five plus its level; `level` is `None` for an empty password.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub level: Option<StrengthLevel>,
}

impl PasswordStrength {
    pub const MAX_SCORE: u8 = 5;

    pub fn empty() -> Self {
        PasswordStrength {
            score: 0,
            level: None,
        }
    }

    pub fn evaluate(password: &str) -> Self {
        if password.is_empty() {
            return Self::empty();
        }

        let score = Self::score(password);
        PasswordStrength {
            score,
            level: Some(StrengthLevel::from_score(score)),
        }
    }

    /// One point each: longer than 5, longer than 8, uppercase, digit, symbol
    pub fn score(password: &str) -> u8 {
        let length = password.chars().count();
        let criteria = [
            length > 5,
            length > 8,
            password.chars().any(|c| c.is_ascii_uppercase()),
            password.chars().any(|c| c.is_ascii_digit()),
            password.chars().any(|c| !c.is_ascii_alphanumeric()),
        ];
        criteria.iter().filter(|met| **met).count() as u8
    }

    pub fn fill_percent(&self) -> u8 {
        self.level.map_or(0, |level| level.fill_percent())
    }

    pub fn label(&self) -> &'static str {
        self.level.map_or("", |level| level.label())
    }

    pub fn color(&self) -> Option<&'static str> {
        self.level.map(|level| level.color())
    }
}

impl Default for PasswordStrength {
    fn default() -> Self {
        Self::empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_password_has_no_label() {
        let strength = PasswordStrength::evaluate("");
        assert_eq!(strength.fill_percent(), 0);
        assert_eq!(strength.label(), "");
        assert_eq!(strength.color(), None);
    }

    #[test]
    fn test_weak() {
        let strength = PasswordStrength::evaluate("abc");
        assert_eq!(strength.score, 0);
        assert_eq!(strength.label(), "Weak");
        assert_eq!(strength.fill_percent(), 20);
        assert_eq!(strength.color(), Some("red"));
    }

    #[test]
    fn test_two_points_is_still_weak() {
        // longer than 5 + digit
        let strength = PasswordStrength::evaluate("abc12345");
        assert_eq!(strength.score, 2);
        assert_eq!(strength.level, Some(StrengthLevel::Weak));
    }

    #[test]
    fn test_medium() {
        let strength = PasswordStrength::evaluate("Abc12345");
        assert_eq!(strength.score, 3);
        assert_eq!(strength.label(), "Medium");
        assert_eq!(strength.fill_percent(), 60);
        assert_eq!(strength.color(), Some("orange"));
    }

    #[test]
    fn test_strong() {
        let strength = PasswordStrength::evaluate("StrongPass123!");
        assert_eq!(strength.score, PasswordStrength::MAX_SCORE);
        assert_eq!(strength.label(), "Strong");
        assert_eq!(strength.fill_percent(), 100);
        assert_eq!(strength.color(), Some("var(--success)"));
    }

    #[test]
    fn test_non_ascii_counts_as_symbol() {
        assert_eq!(PasswordStrength::score("é"), 1);
    }

    proptest! {
        #[test]
        fn prop_level_monotonic_in_score(a in 0u8..=5, b in 0u8..=5) {
            if a <= b {
                prop_assert!(StrengthLevel::from_score(a) <= StrengthLevel::from_score(b));
                prop_assert!(
                    StrengthLevel::from_score(a).fill_percent()
                        <= StrengthLevel::from_score(b).fill_percent()
                );
            }
        }

        #[test]
        fn prop_appending_never_lowers_strength(base in ".{1,20}", extra in ".{0,10}") {
            let before = PasswordStrength::evaluate(&base);
            let after = PasswordStrength::evaluate(&format!("{}{}", base, extra));
            prop_assert!(after.score >= before.score);
            prop_assert!(after.fill_percent() >= before.fill_percent());
        }

        #[test]
        fn prop_score_bounded(password in ".*") {
            prop_assert!(PasswordStrength::score(&password) <= PasswordStrength::MAX_SCORE);
        }
    }
}
