// 🕹️ Driver - The harness-facing surface
// Commands mirror what a browser automation tool does to a page; read-back is a RenderedView

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

use crate::cascade::Tier;
use crate::error::FormError;
use crate::fields::{FieldKind, FieldName};
use crate::form::RegistrationForm;
use crate::render::{render, RenderedView};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DriverCommand {
    /// Replace a text control's value and fire `input`
    Fill { field: FieldName, value: String },
    /// Check a checkbox, or the radio option `value` of a group
    Check {
        field: FieldName,
        #[serde(default)]
        value: Option<String>,
    },
    Uncheck { field: FieldName },
    SelectOption { field: FieldName, value: String },
    Focus { field: FieldName },
    Blur { field: FieldName },
    ClickSubmit,
    ClickDismiss,
    /// Let time pass for pending timers
    Wait { millis: u64 },
}

/// Applies driver commands to one form.
pub struct Driver {
    form: RegistrationForm,
}

impl Driver {
    pub fn new(form: RegistrationForm) -> Self {
        Driver { form }
    }

    pub fn form(&self) -> &RegistrationForm {
        &self.form
    }

    pub fn view(&self) -> RenderedView {
        render(&self.form)
    }

    pub fn apply(&mut self, command: &DriverCommand) -> Result<(), FormError> {
        let result = self.dispatch(command);
        if let Err(err) = &result {
            warn!(?command, %err, "driver command rejected");
        }
        result
    }

    /// Apply commands in order, stopping at the first rejection
    pub fn run<'a>(
        &mut self,
        commands: impl IntoIterator<Item = &'a DriverCommand>,
    ) -> Result<RenderedView, FormError> {
        for command in commands {
            self.apply(command)?;
        }
        Ok(self.view())
    }

    fn dispatch(&mut self, command: &DriverCommand) -> Result<(), FormError> {
        match command {
            DriverCommand::Fill { field, value } => self.fill(*field, value),
            DriverCommand::Check { field, value } => self.check(*field, value.as_deref()),
            DriverCommand::Uncheck { field } => self.uncheck(*field),
            DriverCommand::SelectOption { field, value } => self.select_option(*field, value),
            DriverCommand::Focus { field } => self.focus(*field),
            DriverCommand::Blur { field } => self.blur(*field),
            DriverCommand::ClickSubmit => {
                self.click_submit();
                Ok(())
            }
            DriverCommand::ClickDismiss => self.click_dismiss(),
            DriverCommand::Wait { millis } => {
                self.wait(Duration::from_millis(*millis));
                Ok(())
            }
        }
    }

    // ------------------------------------------------------------------------
    // Page-style helpers
    // ------------------------------------------------------------------------

    pub fn fill(&mut self, field: FieldName, value: &str) -> Result<(), FormError> {
        self.form.on_input(field, value).map(|_| ())
    }

    pub fn check(&mut self, field: FieldName, value: Option<&str>) -> Result<(), FormError> {
        match (self.form.definition(field)?.kind, value) {
            (FieldKind::Checkbox, _) => self.form.on_check(field, true).map(|_| ()),
            (FieldKind::Radio, Some(option)) => self.form.on_choose(field, option).map(|_| ()),
            _ => Err(FormError::UnsupportedAction {
                field,
                action: "check",
            }),
        }
    }

    pub fn uncheck(&mut self, field: FieldName) -> Result<(), FormError> {
        self.form.on_check(field, false).map(|_| ())
    }

    pub fn select_option(&mut self, field: FieldName, value: &str) -> Result<(), FormError> {
        if Tier::of(field).is_some() && !self.form.cascade().is_enabled(field) {
            return Err(FormError::ControlDisabled(field.to_string()));
        }
        self.form.on_select(field, value).map(|_| ())
    }

    pub fn focus(&mut self, field: FieldName) -> Result<(), FormError> {
        self.form.on_focus(field)
    }

    pub fn blur(&mut self, field: FieldName) -> Result<(), FormError> {
        self.form.on_blur(field).map(|_| ())
    }

    /// A disabled submit control swallows the click
    pub fn click_submit(&mut self) {
        if self.form.is_submit_enabled() {
            self.form.on_submit();
        }
    }

    pub fn click_dismiss(&mut self) -> Result<(), FormError> {
        self.form.dismiss_confirmation()
    }

    pub fn wait(&mut self, elapsed: Duration) {
        self.form.advance(elapsed);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn driver() -> Driver {
        Driver::new(RegistrationForm::with_defaults().unwrap())
    }

    #[test]
    fn test_commands_deserialize() {
        let script = r#"[
            {"action": "fill", "field": "firstName", "value": "Ayush"},
            {"action": "check", "field": "gender", "value": "male"},
            {"action": "check", "field": "terms"},
            {"action": "select_option", "field": "country", "value": "India"},
            {"action": "click_submit"},
            {"action": "wait", "millis": 300}
        ]"#;
        let commands: Vec<DriverCommand> = serde_json::from_str(script).unwrap();
        assert_eq!(commands.len(), 6);
        assert_eq!(
            commands[2],
            DriverCommand::Check {
                field: FieldName::Terms,
                value: None
            }
        );
    }

    #[test]
    fn test_select_on_disabled_control_fails() {
        let mut driver = driver();
        assert_eq!(
            driver.select_option(FieldName::State, "Karnataka"),
            Err(FormError::ControlDisabled("state".to_string()))
        );
    }

    #[test]
    fn test_click_on_disabled_submit_is_noop() {
        let mut driver = driver();
        driver.fill(FieldName::FirstName, "Ayush").unwrap();
        driver.click_submit();
        let view = driver.view();
        assert!(!view.dialog.visible);
        // a swallowed click does not reveal errors
        assert!(!view.is_error_visible(FieldName::LastName));
    }

    #[test]
    fn test_run_stops_at_first_rejection() {
        let mut driver = driver();
        let commands = vec![
            DriverCommand::Fill {
                field: FieldName::FirstName,
                value: "Ayush".to_string(),
            },
            DriverCommand::Fill {
                field: FieldName::Country,
                value: "USA".to_string(),
            },
            DriverCommand::Fill {
                field: FieldName::LastName,
                value: "Kumar".to_string(),
            },
        ];
        assert!(driver.run(&commands).is_err());
        assert_eq!(driver.form().values().text(FieldName::FirstName), "Ayush");
        assert_eq!(driver.form().values().text(FieldName::LastName), "");
    }

    #[test]
    fn test_check_radio_requires_value() {
        let mut driver = driver();
        assert!(driver.check(FieldName::Gender, None).is_err());
        driver.check(FieldName::Gender, Some("female")).unwrap();
        assert_eq!(driver.form().values().text(FieldName::Gender), "female");
    }

    #[test]
    fn test_dismiss_without_dialog_fails() {
        assert_eq!(driver().click_dismiss(), Err(FormError::NoDialog));
    }
}
