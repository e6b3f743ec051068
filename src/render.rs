// 🖼️ Rendering Boundary - What a page would show for the current form state
// Read-only projection; nothing in here mutates the form

use serde::Serialize;
use std::collections::BTreeMap;

use crate::cascade::Tier;
use crate::fields::{FieldKind, FieldName};
use crate::form::RegistrationForm;

pub const SUBMIT_ID: &str = "submitBtn";
pub const DIALOG_ID: &str = "successModal";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionView {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlView {
    pub id: FieldName,
    pub kind: FieldKind,
    pub label: String,
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub required: bool,
    pub placeholder: Option<String>,
    /// Classes on the control itself (`error`, `valid`)
    pub classes: Vec<String>,
    /// Classes on the enclosing group (`form-group`, `has-error`, ...)
    pub group_classes: Vec<String>,
    pub options: Vec<OptionView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorNode {
    pub id: String,
    pub visible: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrengthView {
    /// CSS width of the bar, `0` when the password is empty
    pub width: String,
    pub color: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitView {
    pub id: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogView {
    pub id: String,
    pub visible: bool,
    pub classes: Vec<String>,
    pub title: String,
    pub message: String,
}

impl DialogView {
    /// Everything the dialog displays, for substring checks
    pub fn text(&self) -> String {
        format!("{}\n{}", self.title, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedView {
    pub controls: BTreeMap<FieldName, ControlView>,
    /// Keyed by node id, e.g. `lastNameError`
    pub errors: BTreeMap<String, ErrorNode>,
    pub strength: StrengthView,
    pub submit: SubmitView,
    pub dialog: DialogView,
}

impl RenderedView {
    pub fn control(&self, name: FieldName) -> Option<&ControlView> {
        self.controls.get(&name)
    }

    pub fn error(&self, name: FieldName) -> Option<&ErrorNode> {
        self.errors.get(&name.error_id())
    }

    pub fn is_error_visible(&self, name: FieldName) -> bool {
        self.error(name).is_some_and(|node| node.visible)
    }

    pub fn error_text(&self, name: FieldName) -> Option<&str> {
        self.error(name).map(|node| node.text.as_str())
    }

    pub fn has_class(&self, name: FieldName, class: &str) -> bool {
        self.control(name)
            .is_some_and(|control| control.classes.iter().any(|c| c == class))
    }

    pub fn group_has_class(&self, name: FieldName, class: &str) -> bool {
        self.control(name)
            .is_some_and(|control| control.group_classes.iter().any(|c| c == class))
    }

    pub fn is_disabled(&self, name: FieldName) -> bool {
        self.control(name).is_some_and(|control| control.disabled)
    }

    pub fn option_labels(&self, name: FieldName) -> Vec<&str> {
        self.control(name)
            .map(|control| control.options.iter().map(|o| o.label.as_str()).collect())
            .unwrap_or_default()
    }
}

// ============================================================================
// RENDER
// ============================================================================

pub fn render(form: &RegistrationForm) -> RenderedView {
    let snapshot = form.snapshot();
    let cascade = form.cascade();
    let mut controls = BTreeMap::new();
    let mut errors = BTreeMap::new();

    for definition in form.validator().registry().list_all() {
        let name = definition.name;
        let Some(state) = snapshot.field(name) else {
            continue;
        };

        let shows_error = state.shows_error();
        let mut classes = Vec::new();
        // group-level validity for radio groups, never on a single radio
        if definition.kind != FieldKind::Radio {
            if shows_error {
                classes.push("error".to_string());
            } else if form.is_marked_valid(name) {
                classes.push("valid".to_string());
            }
        }

        let mut group_classes = vec![match definition.kind {
            FieldKind::Checkbox => "checkbox-group".to_string(),
            _ => "form-group".to_string(),
        }];
        if shows_error {
            group_classes.push("has-error".to_string());
        }

        let placeholder = if name == FieldName::Phone {
            Some(cascade.phone_placeholder().to_string())
        } else {
            definition.placeholder.clone()
        };

        let options = match definition.kind {
            FieldKind::Select => std::iter::once(OptionView {
                value: String::new(),
                label: definition.placeholder.clone().unwrap_or_default(),
            })
            .chain(cascade.options(name).iter().map(|option| OptionView {
                value: option.clone(),
                label: option.clone(),
            }))
            .collect(),
            FieldKind::Radio => definition
                .options
                .iter()
                .map(|option| OptionView {
                    value: option.clone(),
                    label: capitalize(option),
                })
                .collect(),
            _ => Vec::new(),
        };

        controls.insert(
            name,
            ControlView {
                id: name,
                kind: definition.kind,
                label: definition.label.clone(),
                value: state.raw_value.as_text().to_string(),
                checked: state.raw_value.is_checked(),
                disabled: Tier::of(name).is_some() && !cascade.is_enabled(name),
                required: state.is_required,
                placeholder,
                classes,
                group_classes,
                options,
            },
        );

        if !definition.message.is_empty() {
            let id = name.error_id();
            errors.insert(
                id.clone(),
                ErrorNode {
                    id,
                    visible: shows_error,
                    text: state
                        .error_message
                        .clone()
                        .unwrap_or_else(|| definition.message.clone()),
                },
            );
        }
    }

    let strength = form.strength();
    let dialog = form.dialog();
    let confirmation = dialog.confirmation();

    let mut dialog_classes = Vec::new();
    if dialog.is_visible() {
        dialog_classes.push("modal".to_string());
    }
    if dialog.is_open() {
        dialog_classes.push("show".to_string());
    }

    RenderedView {
        controls,
        errors,
        strength: StrengthView {
            width: match strength.fill_percent() {
                0 => "0".to_string(),
                percent => format!("{}%", percent),
            },
            color: strength.color().map(String::from),
            label: strength.label().to_string(),
        },
        submit: SubmitView {
            id: SUBMIT_ID.to_string(),
            disabled: !form.is_submit_enabled(),
        },
        dialog: DialogView {
            id: DIALOG_ID.to_string(),
            visible: dialog.is_visible(),
            classes: dialog_classes,
            title: confirmation.map(|c| c.title.clone()).unwrap_or_default(),
            message: confirmation.map(|c| c.message.clone()).unwrap_or_default(),
        },
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegistrationForm {
        RegistrationForm::with_defaults().unwrap()
    }

    #[test]
    fn test_pristine_view() {
        let view = render(&form());
        assert!(view.submit.disabled);
        assert!(view.is_disabled(FieldName::State));
        assert!(view.is_disabled(FieldName::City));
        assert!(!view.is_disabled(FieldName::Country));
        assert_eq!(
            view.option_labels(FieldName::Country),
            vec!["Select Country", "USA", "India", "UK"]
        );
        assert_eq!(view.option_labels(FieldName::State), vec!["Select State"]);
        assert_eq!(view.strength.width, "0");
        assert_eq!(view.strength.label, "");
        assert!(!view.dialog.visible);
        assert!(view.errors.values().all(|node| !node.visible));
        assert!(view.error(FieldName::Address).is_none());
    }

    #[test]
    fn test_error_classes() {
        let mut form = form();
        form.on_blur(FieldName::LastName).unwrap();
        form.on_input(FieldName::FirstName, "Ayush").unwrap();
        let view = render(&form);

        assert!(view.is_error_visible(FieldName::LastName));
        assert_eq!(view.error_text(FieldName::LastName), Some("Last name is required"));
        assert!(view.has_class(FieldName::LastName, "error"));
        assert!(view.group_has_class(FieldName::LastName, "has-error"));
        assert!(view.has_class(FieldName::FirstName, "valid"));
        assert!(!view.has_class(FieldName::FirstName, "error"));
    }

    #[test]
    fn test_gender_error_on_group_only() {
        let mut form = form();
        form.on_submit();
        let view = render(&form);
        assert!(view.group_has_class(FieldName::Gender, "has-error"));
        assert!(!view.has_class(FieldName::Gender, "error"));
        assert_eq!(
            view.option_labels(FieldName::Gender),
            vec!["Male", "Female", "Other"]
        );
    }

    #[test]
    fn test_phone_placeholder_follows_country() {
        let mut form = form();
        form.on_country_change("India").unwrap();
        let view = render(&form);
        assert_eq!(
            view.control(FieldName::Phone).unwrap().placeholder.as_deref(),
            Some("+91 98765 43210")
        );
    }

    #[test]
    fn test_strength_indicator() {
        let mut form = form();
        form.on_input(FieldName::Password, "abc").unwrap();
        let view = render(&form);
        assert_eq!(view.strength.width, "20%");
        assert_eq!(view.strength.color.as_deref(), Some("red"));
        assert_eq!(view.strength.label, "Weak");
    }

    #[test]
    fn test_checkbox_group_class() {
        let mut form = form();
        form.on_check(FieldName::Terms, true).unwrap();
        form.on_check(FieldName::Terms, false).unwrap();
        let view = render(&form);
        assert!(view.group_has_class(FieldName::Terms, "checkbox-group"));
        assert!(view.group_has_class(FieldName::Terms, "has-error"));
        assert!(!view.control(FieldName::Terms).unwrap().checked);
    }

    #[test]
    fn test_view_serializes_with_ui_ids() {
        let json = serde_json::to_value(render(&form())).unwrap();
        assert!(json["controls"]["confirmPassword"].is_object());
        assert!(json["errors"]["lastNameError"].is_object());
        assert_eq!(json["submit"]["id"], "submitBtn");
    }
}
