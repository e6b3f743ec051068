// 📝 Registration Form - Event-driven state machine
// Every handler runs to completion and leaves a fresh snapshot behind

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate::FormSnapshot;
use crate::cascade::{CascadeController, Tier};
use crate::catalog::LocationCatalog;
use crate::config::FormConfig;
use crate::error::{CatalogError, FormError};
use crate::fields::{FieldDefinition, FieldKind, FieldName, FieldValue, FormValues};
use crate::strength::PasswordStrength;
use crate::validators::Validator;

pub const CONFIRMATION_TITLE: &str = "Registration Successful!";

// ============================================================================
// CONFIRMATION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub title: String,
    pub message: String,
}

impl Confirmation {
    fn for_registrant(first_name: &str, last_name: &str) -> Self {
        let name = format!("{} {}", first_name, last_name);
        Confirmation {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            title: CONFIRMATION_TITLE.to_string(),
            message: format!(
                "Welcome aboard, {}! Your account has been created.",
                name.trim()
            ),
        }
    }
}

/// Success dialog lifecycle. `Closing` keeps the dialog on screen until the
/// dismissal delay has elapsed, then the form resets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DialogState {
    Hidden,
    Open {
        confirmation: Confirmation,
    },
    Closing {
        confirmation: Confirmation,
        remaining: Duration,
    },
}

impl DialogState {
    pub fn is_visible(&self) -> bool {
        !matches!(self, DialogState::Hidden)
    }

    /// Fully shown, not fading out
    pub fn is_open(&self) -> bool {
        matches!(self, DialogState::Open { .. })
    }

    pub fn confirmation(&self) -> Option<&Confirmation> {
        match self {
            DialogState::Hidden => None,
            DialogState::Open { confirmation } | DialogState::Closing { confirmation, .. } => {
                Some(confirmation)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SubmitOutcome {
    Accepted { confirmation: Confirmation },
    Blocked { invalid: Vec<FieldName> },
}

impl SubmitOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmitOutcome::Accepted { .. })
    }
}

// ============================================================================
// REGISTRATION FORM
// ============================================================================

pub struct RegistrationForm {
    catalog: LocationCatalog,
    validator: Validator,
    cascade: CascadeController,
    values: FormValues,
    touched: BTreeSet<FieldName>,
    focused: Option<FieldName>,
    strength: PasswordStrength,
    snapshot: FormSnapshot,
    dialog: DialogState,
    /// Valid markers left on screen by a successful submit until the reset
    retained_valid: BTreeSet<FieldName>,
    dismiss_delay: Duration,
}

impl RegistrationForm {
    pub fn new(catalog: LocationCatalog, validator: Validator, dismiss_delay: Duration) -> Self {
        let cascade = CascadeController::new(&catalog);
        let values = FormValues::blank(validator.registry());
        let touched = BTreeSet::new();
        let snapshot = FormSnapshot::compute(&validator, &values, &cascade, &touched);

        RegistrationForm {
            catalog,
            validator,
            cascade,
            values,
            touched,
            focused: None,
            strength: PasswordStrength::empty(),
            snapshot,
            dialog: DialogState::Hidden,
            retained_valid: BTreeSet::new(),
            dismiss_delay,
        }
    }

    /// Built-in catalog and deny-list, 300ms dismissal
    pub fn with_defaults() -> Result<Self, CatalogError> {
        Self::from_config(&FormConfig::default())
    }

    pub fn from_config(config: &FormConfig) -> Result<Self, CatalogError> {
        let catalog = match &config.catalog_path {
            Some(path) => LocationCatalog::from_file(path)?,
            None => LocationCatalog::builtin()?,
        };
        let validator = Validator::with_disposable_domains(config.disposable_domains.clone());
        Ok(Self::new(catalog, validator, config.dismiss_delay()))
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn catalog(&self) -> &LocationCatalog {
        &self.catalog
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn cascade(&self) -> &CascadeController {
        &self.cascade
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn snapshot(&self) -> &FormSnapshot {
        &self.snapshot
    }

    pub fn strength(&self) -> &PasswordStrength {
        &self.strength
    }

    pub fn dialog(&self) -> &DialogState {
        &self.dialog
    }

    pub fn focused(&self) -> Option<FieldName> {
        self.focused
    }

    pub fn is_submit_enabled(&self) -> bool {
        self.snapshot.is_submittable
    }

    /// Valid marker, including markers retained after a successful submit
    pub fn is_marked_valid(&self, name: FieldName) -> bool {
        self.retained_valid.contains(&name)
            || self.snapshot.field(name).is_some_and(|field| field.shows_valid())
    }

    pub fn definition(&self, name: FieldName) -> Result<&FieldDefinition, FormError> {
        self.validator
            .registry()
            .get(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    // ------------------------------------------------------------------------
    // Field events
    // ------------------------------------------------------------------------

    pub fn on_focus(&mut self, name: FieldName) -> Result<(), FormError> {
        self.definition(name)?;
        self.focused = Some(name);
        Ok(())
    }

    /// Text typed into a free-text control
    pub fn on_input(
        &mut self,
        name: FieldName,
        value: impl Into<String>,
    ) -> Result<&FormSnapshot, FormError> {
        let kind = self.definition(name)?.kind;
        if !kind.is_typed() {
            return Err(FormError::UnsupportedAction {
                field: name,
                action: "fill",
            });
        }

        let value = value.into();
        if name == FieldName::Password {
            self.strength = PasswordStrength::evaluate(&value);
            debug!(score = self.strength.score, label = self.strength.label(), "password strength updated");
        }
        self.values.set_text(name, value);
        self.touched.insert(name);

        debug!(field = %name, "input");
        Ok(self.recompute())
    }

    pub fn on_blur(&mut self, name: FieldName) -> Result<&FormSnapshot, FormError> {
        self.definition(name)?;
        if self.focused == Some(name) {
            self.focused = None;
        }
        self.touched.insert(name);

        debug!(field = %name, "blur");
        Ok(self.recompute())
    }

    /// Option picked on one of the cascading selectors
    pub fn on_select(&mut self, name: FieldName, value: &str) -> Result<&FormSnapshot, FormError> {
        let tier = Tier::of(name).ok_or(FormError::UnsupportedAction {
            field: name,
            action: "select_option",
        })?;

        let effect = self
            .cascade
            .select(&self.catalog, &mut self.values, tier, value)?;
        for cleared in &effect.cleared {
            self.touched.remove(&cleared.field());
        }
        self.touched.insert(name);

        Ok(self.recompute())
    }

    pub fn on_country_change(&mut self, country: &str) -> Result<&FormSnapshot, FormError> {
        self.on_select(FieldName::Country, country)
    }

    pub fn on_state_change(&mut self, state: &str) -> Result<&FormSnapshot, FormError> {
        self.on_select(FieldName::State, state)
    }

    pub fn on_city_change(&mut self, city: &str) -> Result<&FormSnapshot, FormError> {
        self.on_select(FieldName::City, city)
    }

    /// Checkbox toggled
    pub fn on_check(&mut self, name: FieldName, checked: bool) -> Result<&FormSnapshot, FormError> {
        if self.definition(name)?.kind != FieldKind::Checkbox {
            return Err(FormError::UnsupportedAction {
                field: name,
                action: "check",
            });
        }

        self.values.set(name, FieldValue::Flag(checked));
        self.touched.insert(name);

        debug!(field = %name, checked, "checkbox changed");
        Ok(self.recompute())
    }

    /// Radio option chosen within a group
    pub fn on_choose(&mut self, name: FieldName, option: &str) -> Result<&FormSnapshot, FormError> {
        let definition = self.definition(name)?;
        if definition.kind != FieldKind::Radio {
            return Err(FormError::UnsupportedAction {
                field: name,
                action: "choose",
            });
        }
        if !definition.options.iter().any(|o| o == option) {
            return Err(FormError::UnknownOption {
                field: name,
                value: option.to_string(),
            });
        }

        self.values.set_text(name, option);
        self.touched.insert(name);

        debug!(field = %name, option, "radio changed");
        Ok(self.recompute())
    }

    // ------------------------------------------------------------------------
    // Submission & reset
    // ------------------------------------------------------------------------

    /// Re-check the whole form; on success open the confirmation and clear
    /// every value, otherwise reveal all errors and leave values untouched.
    pub fn on_submit(&mut self) -> SubmitOutcome {
        if !self.recompute().is_submittable {
            self.touched.extend(FieldName::ALL);
            let invalid = self.recompute().invalid_fields();
            info!(?invalid, "submission blocked");
            return SubmitOutcome::Blocked { invalid };
        }

        let confirmation = Confirmation::for_registrant(
            self.values.text(FieldName::FirstName),
            self.values.text(FieldName::LastName),
        );
        info!(id = %confirmation.id, "registration accepted");

        self.retained_valid = FieldName::ALL
            .into_iter()
            .filter(|name| self.is_marked_valid(*name))
            .collect();
        self.values = FormValues::blank(self.validator.registry());
        self.touched.clear();
        self.recompute();

        self.dialog = DialogState::Open {
            confirmation: confirmation.clone(),
        };
        SubmitOutcome::Accepted { confirmation }
    }

    /// Start closing the confirmation; the reset runs once the delay elapses
    pub fn dismiss_confirmation(&mut self) -> Result<(), FormError> {
        let DialogState::Open { confirmation } = &self.dialog else {
            return Err(FormError::NoDialog);
        };

        if self.dismiss_delay.is_zero() {
            self.reset();
        } else {
            self.dialog = DialogState::Closing {
                confirmation: confirmation.clone(),
                remaining: self.dismiss_delay,
            };
        }
        Ok(())
    }

    /// Move the dismissal timer forward. Returns true when the reset ran.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        let DialogState::Closing { remaining, .. } = &mut self.dialog else {
            return false;
        };

        *remaining = remaining.saturating_sub(elapsed);
        if !remaining.is_zero() {
            return false;
        }

        self.reset();
        true
    }

    /// Back to the page-load state
    pub fn reset(&mut self) {
        self.dialog = DialogState::Hidden;
        self.cascade.reset();
        self.values = FormValues::blank(self.validator.registry());
        self.touched.clear();
        self.focused = None;
        self.strength = PasswordStrength::empty();
        self.retained_valid.clear();
        self.recompute();

        info!("form reset to pristine state");
    }

    fn recompute(&mut self) -> &FormSnapshot {
        self.snapshot =
            FormSnapshot::compute(&self.validator, &self.values, &self.cascade, &self.touched);
        &self.snapshot
    }
}

// ============================================================================
// TESTS
// ============================================================================
