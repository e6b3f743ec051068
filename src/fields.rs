// 🏷️ Field Metadata - Declarative description of every form control
// Requirement, kind, rules and messages live here instead of in scattered conditionals

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FormError;
use crate::validators::{Check, Rule};

// ============================================================================
// FIELD NAMES
// ============================================================================

/// Stable identifiers of the form controls, in page order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    FirstName,
    LastName,
    Email,
    Phone,
    Age,
    Gender,
    Address,
    Country,
    State,
    City,
    Password,
    ConfirmPassword,
    Terms,
}

impl FieldName {
    pub const ALL: [FieldName; 13] = [
        FieldName::FirstName,
        FieldName::LastName,
        FieldName::Email,
        FieldName::Phone,
        FieldName::Age,
        FieldName::Gender,
        FieldName::Address,
        FieldName::Country,
        FieldName::State,
        FieldName::City,
        FieldName::Password,
        FieldName::ConfirmPassword,
        FieldName::Terms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldName::FirstName => "firstName",
            FieldName::LastName => "lastName",
            FieldName::Email => "email",
            FieldName::Phone => "phone",
            FieldName::Age => "age",
            FieldName::Gender => "gender",
            FieldName::Address => "address",
            FieldName::Country => "country",
            FieldName::State => "state",
            FieldName::City => "city",
            FieldName::Password => "password",
            FieldName::ConfirmPassword => "confirmPassword",
            FieldName::Terms => "terms",
        }
    }

    /// Id of the inline error node for this field, e.g. `lastNameError`
    pub fn error_id(&self) -> String {
        format!("{}Error", self.as_str())
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldName {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim_start_matches('#');
        FieldName::ALL
            .into_iter()
            .find(|name| name.as_str() == trimmed)
            .ok_or_else(|| FormError::UnknownField(s.to_string()))
    }
}

// ============================================================================
// FIELD VALUES
// ============================================================================

/// Current raw value of a control. Checkboxes hold a flag, everything else text
/// (a radio group holds the chosen option, empty when nothing is chosen).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Flag(bool),
    Text(String),
}

impl FieldValue {
    pub fn as_text(&self) -> &str {
        match self {
            FieldValue::Text(text) => text,
            FieldValue::Flag(_) => "",
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, FieldValue::Flag(true))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(text) => text.is_empty(),
            FieldValue::Flag(checked) => !checked,
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

/// Values of every control, keyed by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormValues {
    values: BTreeMap<FieldName, FieldValue>,
}

impl FormValues {
    /// All controls blank, checkboxes unchecked
    pub fn blank(registry: &FieldRegistry) -> Self {
        let values = registry
            .list_all()
            .into_iter()
            .map(|def| (def.name, def.kind.blank_value()))
            .collect();
        FormValues { values }
    }

    pub fn get(&self, name: FieldName) -> Option<&FieldValue> {
        self.values.get(&name)
    }

    /// Text of a field, empty when unset or a checkbox
    pub fn text(&self, name: FieldName) -> &str {
        self.values.get(&name).map(FieldValue::as_text).unwrap_or("")
    }

    pub fn is_checked(&self, name: FieldName) -> bool {
        self.values.get(&name).is_some_and(FieldValue::is_checked)
    }

    pub fn is_empty(&self, name: FieldName) -> bool {
        self.values.get(&name).map_or(true, FieldValue::is_empty)
    }

    pub fn set(&mut self, name: FieldName, value: FieldValue) {
        self.values.insert(name, value);
    }

    pub fn set_text(&mut self, name: FieldName, value: impl Into<String>) {
        self.values.insert(name, FieldValue::Text(value.into()));
    }

    pub fn clear(&mut self, name: FieldName) {
        if let Some(value) = self.values.get_mut(&name) {
            *value = match value {
                FieldValue::Flag(_) => FieldValue::Flag(false),
                FieldValue::Text(_) => FieldValue::Text(String::new()),
            };
        }
    }
}

// ============================================================================
// FIELD DEFINITION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Email,
    Tel,
    Number,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Password,
}

impl FieldKind {
    pub fn blank_value(&self) -> FieldValue {
        match self {
            FieldKind::Checkbox => FieldValue::Flag(false),
            _ => FieldValue::default(),
        }
    }

    /// Free-text controls that accept `fill`
    pub fn is_typed(&self) -> bool {
        !matches!(self, FieldKind::Select | FieldKind::Radio | FieldKind::Checkbox)
    }
}

/// When a field has to carry a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    Required,
    /// Empty is fine; a non-empty value must still satisfy the rules
    Optional,
    /// Required only while the control is enabled by its parent selection
    WhenEnabled { parent: FieldName },
}

/// Everything the form knows about one control.
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub name: FieldName,
    pub kind: FieldKind,
    pub label: String,
    pub requirement: Requirement,
    /// Shown when no rule-specific message applies
    pub message: String,
    pub checks: Vec<Check>,
    pub placeholder: Option<String>,
    /// Radio choices
    pub options: Vec<String>,
}

impl FieldDefinition {
    pub fn new(name: FieldName, kind: FieldKind, label: impl Into<String>) -> Self {
        FieldDefinition {
            name,
            kind,
            label: label.into(),
            requirement: Requirement::Required,
            message: String::new(),
            checks: Vec::new(),
            placeholder: None,
            options: Vec::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.requirement = Requirement::Optional;
        self
    }

    pub fn when_enabled_by(mut self, parent: FieldName) -> Self {
        self.requirement = Requirement::WhenEnabled { parent };
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.checks.push(Check::new(rule));
        self
    }

    /// Rule with its own message instead of the field's default one
    pub fn with_rule_message(mut self, rule: Rule, message: impl Into<String>) -> Self {
        self.checks.push(Check::new(rule).with_message(message));
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Statically required, ignoring conditional requirements
    pub fn is_required(&self) -> bool {
        !matches!(self.requirement, Requirement::Optional)
    }
}

// ============================================================================
// FIELD REGISTRY
// ============================================================================

/// The registration form's fields, in page order.
pub struct FieldRegistry {
    fields: BTreeMap<FieldName, FieldDefinition>,
}

impl FieldRegistry {
    pub fn new() -> Self {
        let mut registry = FieldRegistry {
            fields: BTreeMap::new(),
        };

        registry.register_registration_fields();
        registry
    }

    fn register_registration_fields(&mut self) {
        // ====================================================================
        // PERSONAL DETAILS
        // ====================================================================

        self.register(
            FieldDefinition::new(FieldName::FirstName, FieldKind::Text, "First Name")
                .with_message("First name is required")
                .with_rule(Rule::NonEmpty)
                .with_placeholder("Enter your first name"),
        );

        self.register(
            FieldDefinition::new(FieldName::LastName, FieldKind::Text, "Last Name")
                .with_message("Last name is required")
                .with_rule(Rule::NonEmpty)
                .with_placeholder("Enter your last name"),
        );

        self.register(
            FieldDefinition::new(FieldName::Email, FieldKind::Email, "Email")
                .with_message("Please enter a valid email address")
                .with_rule(Rule::NonEmpty)
                .with_rule(Rule::EmailShape)
                .with_rule_message(
                    Rule::NotDisposable,
                    "Disposable email addresses are not allowed",
                )
                .with_placeholder("you@example.com"),
        );

        self.register(
            FieldDefinition::new(FieldName::Phone, FieldKind::Tel, "Phone Number")
                .with_message("Please enter a valid phone number")
                .with_rule(Rule::PhoneNumber),
        );

        self.register(
            FieldDefinition::new(FieldName::Age, FieldKind::Number, "Age")
                .optional()
                .with_message("Age must be between 18 and 100")
                .with_rule(Rule::IntegerRange { min: 18, max: 100 })
                .with_placeholder("Optional"),
        );

        self.register(
            FieldDefinition::new(FieldName::Gender, FieldKind::Radio, "Gender")
                .with_message("Please select a gender")
                .with_rule(Rule::OneOf)
                .with_option("male")
                .with_option("female")
                .with_option("other"),
        );

        self.register(
            FieldDefinition::new(FieldName::Address, FieldKind::Textarea, "Address")
                .optional()
                .with_placeholder("Street, building, landmark"),
        );

        // ====================================================================
        // LOCATION
        // ====================================================================

        self.register(
            FieldDefinition::new(FieldName::Country, FieldKind::Select, "Country")
                .with_message("Please select a country")
                .with_rule(Rule::NonEmpty)
                .with_placeholder("Select Country"),
        );

        self.register(
            FieldDefinition::new(FieldName::State, FieldKind::Select, "State")
                .when_enabled_by(FieldName::Country)
                .with_message("Please select a state")
                .with_rule(Rule::NonEmpty)
                .with_placeholder("Select State"),
        );

        self.register(
            FieldDefinition::new(FieldName::City, FieldKind::Select, "City")
                .when_enabled_by(FieldName::State)
                .with_message("Please select a city")
                .with_rule(Rule::NonEmpty)
                .with_placeholder("Select City"),
        );

        // ====================================================================
        // CREDENTIALS
        // ====================================================================

        self.register(
            FieldDefinition::new(FieldName::Password, FieldKind::Password, "Password")
                .with_message("Password must be at least 6 characters")
                .with_rule(Rule::MinLength(6)),
        );

        self.register(
            FieldDefinition::new(FieldName::ConfirmPassword, FieldKind::Password, "Confirm Password")
                .with_message("Passwords do not match")
                .with_rule(Rule::MatchesField(FieldName::Password)),
        );

        self.register(
            FieldDefinition::new(FieldName::Terms, FieldKind::Checkbox, "I agree to the Terms & Conditions")
                .with_message("You must accept the terms and conditions")
                .with_rule(Rule::Checked),
        );
    }

    pub fn register(&mut self, field: FieldDefinition) {
        self.fields.insert(field.name, field);
    }

    pub fn get(&self, name: FieldName) -> Option<&FieldDefinition> {
        self.fields.get(&name)
    }

    /// Fields in page order
    pub fn list_all(&self) -> Vec<&FieldDefinition> {
        self.fields.values().collect()
    }

    pub fn list_required(&self) -> Vec<&FieldDefinition> {
        self.fields.values().filter(|f| f.is_required()).collect()
    }

    /// Fields whose requirement hangs on `parent`
    pub fn dependents_of(&self, parent: FieldName) -> Vec<FieldName> {
        self.fields
            .values()
            .filter(|f| f.requirement == Requirement::WhenEnabled { parent })
            .map(|f| f.name)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.fields.len()
    }
}

impl Default for FieldRegistry {
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

    #[test]
    fn test_registry_has_every_control() {
        let registry = FieldRegistry::new();
        assert_eq!(registry.count(), FieldName::ALL.len());
        for name in FieldName::ALL {
            assert!(registry.get(name).is_some(), "{} missing", name);
        }
    }

    #[test]
    fn test_list_all_in_page_order() {
        let registry = FieldRegistry::new();
        let names: Vec<FieldName> = registry.list_all().iter().map(|f| f.name).collect();
        assert_eq!(names, FieldName::ALL.to_vec());
    }

    #[test]
    fn test_optional_fields() {
        let registry = FieldRegistry::new();
        let required: Vec<FieldName> = registry.list_required().iter().map(|f| f.name).collect();
        assert!(!required.contains(&FieldName::Age));
        assert!(!required.contains(&FieldName::Address));
        assert!(required.contains(&FieldName::State));
        assert_eq!(required.len(), 11);
    }

    #[test]
    fn test_conditional_dependents() {
        let registry = FieldRegistry::new();
        assert_eq!(registry.dependents_of(FieldName::Country), vec![FieldName::State]);
        assert_eq!(registry.dependents_of(FieldName::State), vec![FieldName::City]);
        assert!(registry.dependents_of(FieldName::City).is_empty());
    }

    #[test]
    fn test_field_name_parsing() {
        assert_eq!("confirmPassword".parse::<FieldName>().unwrap(), FieldName::ConfirmPassword);
        assert_eq!("#lastName".parse::<FieldName>().unwrap(), FieldName::LastName);
        assert_eq!(
            "nickname".parse::<FieldName>().unwrap_err(),
            FormError::UnknownField("nickname".to_string())
        );
    }

    #[test]
    fn test_error_id() {
        assert_eq!(FieldName::LastName.error_id(), "lastNameError");
        assert_eq!(FieldName::ConfirmPassword.error_id(), "confirmPasswordError");
    }

    #[test]
    fn test_blank_values() {
        let values = FormValues::blank(&FieldRegistry::new());
        assert_eq!(values.get(FieldName::Terms), Some(&FieldValue::Flag(false)));
        assert_eq!(values.text(FieldName::Email), "");
        assert!(values.is_empty(FieldName::Gender));
    }

    #[test]
    fn test_clear_keeps_value_kind() {
        let mut values = FormValues::blank(&FieldRegistry::new());
        values.set(FieldName::Terms, FieldValue::Flag(true));
        values.set_text(FieldName::Email, "a@b.co");
        values.clear(FieldName::Terms);
        values.clear(FieldName::Email);
        assert_eq!(values.get(FieldName::Terms), Some(&FieldValue::Flag(false)));
        assert_eq!(values.get(FieldName::Email), Some(&FieldValue::Text(String::new())));
    }

    #[test]
    fn test_field_name_serializes_as_ui_id() {
        let json = serde_json::to_string(&FieldName::ConfirmPassword).unwrap();
        assert_eq!(json, "\"confirmPassword\"");
    }
}
