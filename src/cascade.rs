// 🔗 Cascade Controller - Country → State → City selectors
// Changing a tier clears and disables everything below it, then repopulates the next tier

use serde::Serialize;
use tracing::debug;

use crate::catalog::LocationCatalog;
use crate::error::FormError;
use crate::fields::{FieldName, FormValues};

pub const DEFAULT_PHONE_PLACEHOLDER: &str = "Enter your phone number";

/// Example number format for a country, when one is known
pub fn phone_placeholder_for(country: &str) -> Option<&'static str> {
    match country {
        "USA" => Some("+1 123 456 7890"),
        "India" => Some("+91 98765 43210"),
        "UK" => Some("+44 7700 900077"),
        _ => None,
    }
}

// ============================================================================
// TIERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Tier {
    Country,
    State,
    City,
}

impl Tier {
    pub fn field(&self) -> FieldName {
        match self {
            Tier::Country => FieldName::Country,
            Tier::State => FieldName::State,
            Tier::City => FieldName::City,
        }
    }

    pub fn of(field: FieldName) -> Option<Tier> {
        match field {
            FieldName::Country => Some(Tier::Country),
            FieldName::State => Some(Tier::State),
            FieldName::City => Some(Tier::City),
            _ => None,
        }
    }

    /// Tiers strictly below this one, nearest first
    pub fn descendants(&self) -> &'static [Tier] {
        match self {
            Tier::Country => &[Tier::State, Tier::City],
            Tier::State => &[Tier::City],
            Tier::City => &[],
        }
    }
}

// ============================================================================
// SELECT CONTROL
// ============================================================================

/// Option list and enabled flag of one selector. The placeholder option
/// (empty value) is implicit and always present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SelectControl {
    pub options: Vec<String>,
    pub enabled: bool,
}

impl SelectControl {
    fn disabled() -> Self {
        SelectControl::default()
    }

    fn populated(options: Vec<String>) -> Self {
        SelectControl {
            options,
            enabled: true,
        }
    }

    fn offers(&self, value: &str) -> bool {
        value.is_empty() || self.options.iter().any(|option| option == value)
    }
}

/// What a single cascade change did, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CascadeEffect {
    /// Tiers cleared and disabled, nearest first
    pub cleared: Vec<Tier>,
    /// Tier repopulated and enabled afterwards
    pub populated: Option<Tier>,
}

// ============================================================================
// CASCADE CONTROLLER
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeController {
    country: SelectControl,
    state: SelectControl,
    city: SelectControl,
    phone_placeholder: String,
}

impl CascadeController {
    /// Countries populated, state and city disabled
    pub fn new(catalog: &LocationCatalog) -> Self {
        CascadeController {
            country: SelectControl::populated(
                catalog.list_countries().into_iter().map(String::from).collect(),
            ),
            state: SelectControl::disabled(),
            city: SelectControl::disabled(),
            phone_placeholder: DEFAULT_PHONE_PLACEHOLDER.to_string(),
        }
    }

    pub fn control(&self, tier: Tier) -> &SelectControl {
        match tier {
            Tier::Country => &self.country,
            Tier::State => &self.state,
            Tier::City => &self.city,
        }
    }

    fn control_mut(&mut self, tier: Tier) -> &mut SelectControl {
        match tier {
            Tier::Country => &mut self.country,
            Tier::State => &mut self.state,
            Tier::City => &mut self.city,
        }
    }

    /// Enabled state of any field; non-cascade fields are always enabled
    pub fn is_enabled(&self, field: FieldName) -> bool {
        Tier::of(field).map_or(true, |tier| self.control(tier).enabled)
    }

    pub fn options(&self, field: FieldName) -> &[String] {
        Tier::of(field)
            .map(|tier| self.control(tier).options.as_slice())
            .unwrap_or(&[])
    }

    pub fn phone_placeholder(&self) -> &str {
        &self.phone_placeholder
    }

    /// Apply a selection on `tier`, writing the new value and the cleared
    /// descendants into `values`.
    pub fn select(
        &mut self,
        catalog: &LocationCatalog,
        values: &mut FormValues,
        tier: Tier,
        value: &str,
    ) -> Result<CascadeEffect, FormError> {
        let control = self.control(tier);
        if !control.enabled {
            return Err(FormError::ControlDisabled(tier.field().to_string()));
        }
        if !control.offers(value) {
            return Err(FormError::UnknownOption {
                field: tier.field(),
                value: value.to_string(),
            });
        }

        values.set_text(tier.field(), value);

        let mut effect = CascadeEffect::default();
        for descendant in tier.descendants() {
            *self.control_mut(*descendant) = SelectControl::disabled();
            values.clear(descendant.field());
            effect.cleared.push(*descendant);
        }

        if tier == Tier::Country {
            self.phone_placeholder = phone_placeholder_for(value)
                .unwrap_or(DEFAULT_PHONE_PLACEHOLDER)
                .to_string();
        }

        if let Some(next) = tier.descendants().first().copied() {
            let options: Vec<String> = match next {
                Tier::State => catalog.list_states(value),
                Tier::City => catalog.list_cities(values.text(FieldName::Country), value),
                Tier::Country => Vec::new(),
            }
            .into_iter()
            .map(String::from)
            .collect();

            if !value.is_empty() && !options.is_empty() {
                *self.control_mut(next) = SelectControl::populated(options);
                effect.populated = Some(next);
            }
        }

        debug!(?tier, value, ?effect, "cascade selection applied");
        Ok(effect)
    }

    /// Back to page-load state: state and city disabled, default placeholder
    pub fn reset(&mut self) {
        self.state = SelectControl::disabled();
        self.city = SelectControl::disabled();
        self.phone_placeholder = DEFAULT_PHONE_PLACEHOLDER.to_string();
    }
}

// ============================================================================
// TESTS
// ============================================================================
