// ✅ Field Validator Registry - One predicate chain per field
// Predicates are pure: value + sibling values + deny-list in, verdict out

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::fields::{FieldDefinition, FieldName, FieldRegistry, FieldValue, FormValues, Requirement};

/// `local@domain.tld`, no whitespace, exactly one `@`
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"));

/// Optional leading `+`, then at least ten digits, spaces or hyphens
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9\s-]{10,}$").expect("Invalid phone regex"));

pub const DEFAULT_DISPOSABLE_DOMAINS: [&str; 3] =
    ["tempmail.com", "mailinator.com", "10minutemail.com"];

// ============================================================================
// PREDICATES
// ============================================================================

pub fn is_email_shape(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

/// Domain part of an address, compared case-insensitively against the deny-list
pub fn is_disposable(value: &str, disposable_domains: &[String]) -> bool {
    match value.split_once('@') {
        Some((_, domain)) => disposable_domains
            .iter()
            .any(|denied| denied.eq_ignore_ascii_case(domain)),
        None => false,
    }
}

pub fn is_valid_email(value: &str, disposable_domains: &[String]) -> bool {
    is_email_shape(value) && !is_disposable(value, disposable_domains)
}

pub fn is_valid_phone(value: &str) -> bool {
    PHONE_REGEX.is_match(value)
}

/// Empty passes; otherwise an integer within `[min, max]`
pub fn is_valid_age(value: &str, min: i64, max: i64) -> bool {
    if value.is_empty() {
        return true;
    }
    value
        .trim()
        .parse::<i64>()
        .map(|age| (min..=max).contains(&age))
        .unwrap_or(false)
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    NonEmpty,
    EmailShape,
    NotDisposable,
    PhoneNumber,
    IntegerRange { min: i64, max: i64 },
    MinLength(usize),
    MatchesField(FieldName),
    /// Value is one of the field's declared options
    OneOf,
    Checked,
}

/// What a rule may look at besides the field's own value.
pub struct RuleContext<'a> {
    pub definition: &'a FieldDefinition,
    pub values: &'a FormValues,
    pub disposable_domains: &'a [String],
}

impl Rule {
    pub fn evaluate(&self, value: &FieldValue, ctx: &RuleContext<'_>) -> bool {
        let text = value.as_text();
        match self {
            Rule::NonEmpty => !value.is_empty(),
            Rule::EmailShape => is_email_shape(text),
            Rule::NotDisposable => !is_disposable(text, ctx.disposable_domains),
            Rule::PhoneNumber => is_valid_phone(text),
            Rule::IntegerRange { min, max } => is_valid_age(text, *min, *max),
            Rule::MinLength(min) => text.chars().count() >= *min,
            Rule::MatchesField(other) => text == ctx.values.text(*other),
            Rule::OneOf => ctx.definition.options.iter().any(|option| option == text),
            Rule::Checked => value.is_checked(),
        }
    }
}

/// A rule plus the message shown when it is the first to fail.
#[derive(Debug, Clone)]
pub struct Check {
    pub rule: Rule,
    pub message: Option<String>,
}

impl Check {
    pub fn new(rule: Rule) -> Self {
        Check { rule, message: None }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

// ============================================================================
// VIOLATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: FieldName,
    pub message: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type FieldVerdict = Result<(), FieldViolation>;

// ============================================================================
// VALIDATOR
// ============================================================================

/// Runs each field's checks against the current form values.
pub struct Validator {
    registry: FieldRegistry,
    disposable_domains: Vec<String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::with_disposable_domains(DEFAULT_DISPOSABLE_DOMAINS.iter().map(|d| d.to_string()))
    }

    pub fn with_disposable_domains(domains: impl IntoIterator<Item = String>) -> Self {
        Validator {
            registry: FieldRegistry::new(),
            disposable_domains: domains.into_iter().collect(),
        }
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn disposable_domains(&self) -> &[String] {
        &self.disposable_domains
    }

    /// Whether the field has to carry a value right now.
    ///
    /// `enabled` is the control's current enabled state; it only matters for
    /// fields whose requirement is conditional on a parent selection.
    pub fn is_required(&self, name: FieldName, enabled: bool) -> bool {
        match self.registry.get(name).map(|def| def.requirement) {
            Some(Requirement::Required) => true,
            Some(Requirement::WhenEnabled { .. }) => enabled,
            Some(Requirement::Optional) | None => false,
        }
    }

    /// Check one field. Fields without a definition always pass.
    ///
    /// Only failing rules produce a violation, so a required value that its
    /// rules accept while empty passes here. See [`Validator::is_missing`].
    pub fn check(&self, name: FieldName, values: &FormValues, enabled: bool) -> FieldVerdict {
        let Some(definition) = self.registry.get(name) else {
            return Ok(());
        };

        if let Requirement::WhenEnabled { .. } = definition.requirement {
            if !enabled {
                return Ok(());
            }
        }

        let blank = definition.kind.blank_value();
        let value = values.get(name).unwrap_or(&blank);

        if value.is_empty() && !self.is_required(name, enabled) {
            return Ok(());
        }

        let ctx = RuleContext {
            definition,
            values,
            disposable_domains: &self.disposable_domains,
        };

        for check in &definition.checks {
            if !check.rule.evaluate(value, &ctx) {
                return Err(FieldViolation {
                    field: name,
                    message: check.message.clone().unwrap_or_else(|| definition.message.clone()),
                });
            }
        }

        // A required field with no rules still needs a value
        if value.is_empty() && definition.checks.is_empty() {
            return Err(FieldViolation {
                field: name,
                message: definition.message.clone(),
            });
        }

        Ok(())
    }

    /// Required and still empty. Blocks submission without an inline message.
    pub fn is_missing(&self, name: FieldName, values: &FormValues, enabled: bool) -> bool {
        self.is_required(name, enabled) && values.get(name).map_or(true, FieldValue::is_empty)
    }

    /// Check a single free-standing value, siblings blank
    pub fn check_value(&self, name: FieldName, value: FieldValue) -> FieldVerdict {
        let mut values = FormValues::blank(&self.registry);
        values.set(name, value);
        self.check(name, &values, true)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn deny_list() -> Vec<String> {
        DEFAULT_DISPOSABLE_DOMAINS.iter().map(|d| d.to_string()).collect()
    }

    fn text(value: &str) -> FieldValue {
        FieldValue::Text(value.to_string())
    }

    #[test]
    fn test_email_shape() {
        assert!(is_email_shape("ayush@example.com"));
        assert!(is_email_shape("ayush.valid@gmail.com"));
        assert!(!is_email_shape("ayush@example"));
        assert!(!is_email_shape("ayush example@x.com"));
        assert!(!is_email_shape("a@b@c.com"));
        assert!(!is_email_shape(""));
    }

    #[test]
    fn test_disposable_domain_rejected_despite_shape() {
        let deny = deny_list();
        assert!(is_email_shape("user@mailinator.com"));
        assert!(!is_valid_email("user@mailinator.com", &deny));
        assert!(!is_valid_email("user@tempmail.com", &deny));
        assert!(!is_valid_email("user@10minutemail.com", &deny));
        assert!(!is_valid_email("user@MAILINATOR.com", &deny));
        assert!(is_valid_email("user@gmail.com", &deny));
    }

    #[test]
    fn test_phone_numbers() {
        assert!(is_valid_phone("9876543210"));
        assert!(is_valid_phone("+91 9876543210"));
        assert!(is_valid_phone("+1 123-456-7890"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("98765abc3210"));
        assert!(!is_valid_phone("++919876543210"));
        assert!(!is_valid_phone(""));
    }

    #[test]
    fn test_age_bounds() {
        assert!(is_valid_age("", 18, 100));
        assert!(is_valid_age("18", 18, 100));
        assert!(is_valid_age("100", 18, 100));
        assert!(is_valid_age("25", 18, 100));
        assert!(!is_valid_age("17", 18, 100));
        assert!(!is_valid_age("101", 18, 100));
        assert!(!is_valid_age("25.5", 18, 100));
        assert!(!is_valid_age("abc", 18, 100));
    }

    #[test]
    fn test_required_messages() {
        let validator = Validator::new();
        let err = validator.check_value(FieldName::LastName, text("")).unwrap_err();
        assert_eq!(err.message, "Last name is required");
        assert_eq!(err.field, FieldName::LastName);
    }

    #[test]
    fn test_email_messages() {
        let validator = Validator::new();
        assert_eq!(
            validator.check_value(FieldName::Email, text("nope")).unwrap_err().message,
            "Please enter a valid email address"
        );
        assert_eq!(
            validator.check_value(FieldName::Email, text("user@mailinator.com")).unwrap_err().message,
            "Disposable email addresses are not allowed"
        );
        assert!(validator.check_value(FieldName::Email, text("ayush@example.com")).is_ok());
    }

    #[test]
    fn test_custom_deny_list() {
        let validator = Validator::with_disposable_domains(vec!["example.org".to_string()]);
        assert!(validator.check_value(FieldName::Email, text("a@example.org")).is_err());
        assert!(validator.check_value(FieldName::Email, text("a@mailinator.com")).is_ok());
    }

    #[test]
    fn test_optional_age() {
        let validator = Validator::new();
        assert!(validator.check_value(FieldName::Age, text("")).is_ok());
        assert!(validator.check_value(FieldName::Age, text("40")).is_ok());
        assert_eq!(
            validator.check_value(FieldName::Age, text("12")).unwrap_err().message,
            "Age must be between 18 and 100"
        );
    }

    #[test]
    fn test_gender_must_be_declared_option() {
        let validator = Validator::new();
        assert!(validator.check_value(FieldName::Gender, text("male")).is_ok());
        assert!(validator.check_value(FieldName::Gender, text("")).is_err());
        assert!(validator.check_value(FieldName::Gender, text("robot")).is_err());
    }

    #[test]
    fn test_state_exempt_while_disabled() {
        let validator = Validator::new();
        let values = FormValues::blank(validator.registry());
        assert!(validator.check(FieldName::State, &values, false).is_ok());
        assert!(!validator.is_required(FieldName::State, false));
        assert_eq!(
            validator.check(FieldName::State, &values, true).unwrap_err().message,
            "Please select a state"
        );
    }

    #[test]
    fn test_confirm_password_cross_field() {
        let validator = Validator::new();
        let mut values = FormValues::blank(validator.registry());
        values.set_text(FieldName::Password, "Password123");
        values.set_text(FieldName::ConfirmPassword, "Password456");
        assert_eq!(
            validator.check(FieldName::ConfirmPassword, &values, true).unwrap_err().message,
            "Passwords do not match"
        );

        values.set_text(FieldName::ConfirmPassword, "Password123");
        assert!(validator.check(FieldName::ConfirmPassword, &values, true).is_ok());

        values.set_text(FieldName::ConfirmPassword, "");
        assert_eq!(
            validator.check(FieldName::ConfirmPassword, &values, true).unwrap_err().message,
            "Passwords do not match"
        );
        assert!(validator.is_missing(FieldName::ConfirmPassword, &values, true));
    }

    #[test]
    fn test_empty_confirm_matches_empty_password() {
        let validator = Validator::new();
        let values = FormValues::blank(validator.registry());
        assert!(validator.check(FieldName::ConfirmPassword, &values, true).is_ok());
        assert!(validator.is_missing(FieldName::ConfirmPassword, &values, true));
        assert!(!validator.is_missing(FieldName::Address, &values, true));
    }

    #[test]
    fn test_password_min_length() {
        let validator = Validator::new();
        assert!(validator.check_value(FieldName::Password, text("abcdef")).is_ok());
        assert!(validator.check_value(FieldName::Password, text("abcde")).is_err());
    }

    #[test]
    fn test_terms_checkbox() {
        let validator = Validator::new();
        assert!(validator.check_value(FieldName::Terms, FieldValue::Flag(true)).is_ok());
        assert_eq!(
            validator.check_value(FieldName::Terms, FieldValue::Flag(false)).unwrap_err().message,
            "You must accept the terms and conditions"
        );
    }

    #[test]
    fn test_address_never_fails() {
        let validator = Validator::new();
        assert!(validator.check_value(FieldName::Address, text("")).is_ok());
        assert!(validator.check_value(FieldName::Address, text("123 Tech Park")).is_ok());
    }
}
