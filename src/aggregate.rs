// 📊 Form Validity Aggregator - Whole-form snapshot from field inputs
// Pure: the same values, touched set and cascade state always give the same snapshot

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::cascade::CascadeController;
use crate::fields::{FieldName, FieldValue, FormValues};
use crate::validators::Validator;

// ============================================================================
// FIELD STATE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub name: FieldName,
    pub raw_value: FieldValue,
    pub is_touched: bool,
    /// Whether the field currently has to carry a value
    pub is_required: bool,
    pub is_valid: bool,
    /// Present only once the field is touched and failing
    pub error_message: Option<String>,
}

impl FieldState {
    pub fn shows_error(&self) -> bool {
        self.error_message.is_some()
    }

    /// Touched, passing and non-empty
    pub fn shows_valid(&self) -> bool {
        self.is_touched && self.is_valid && !self.raw_value.is_empty()
    }
}

// ============================================================================
// FORM SNAPSHOT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSnapshot {
    pub fields: BTreeMap<FieldName, FieldState>,
    pub passwords_match: bool,
    pub is_submittable: bool,
}

impl FormSnapshot {
    /// Re-evaluate every field.
    ///
    /// A field blocks submission when it is required and empty, or when its
    /// rules reject a non-empty value (optional fields included). Password and
    /// confirmation must also be identical.
    pub fn compute(
        validator: &Validator,
        values: &FormValues,
        cascade: &CascadeController,
        touched: &BTreeSet<FieldName>,
    ) -> Self {
        let mut fields = BTreeMap::new();

        for definition in validator.registry().list_all() {
            let name = definition.name;
            let enabled = cascade.is_enabled(name);
            let verdict = validator.check(name, values, enabled);
            let missing = validator.is_missing(name, values, enabled);
            let is_touched = touched.contains(&name);

            fields.insert(
                name,
                FieldState {
                    name,
                    raw_value: values
                        .get(name)
                        .cloned()
                        .unwrap_or_else(|| definition.kind.blank_value()),
                    is_touched,
                    is_required: validator.is_required(name, enabled),
                    is_valid: verdict.is_ok() && !missing,
                    error_message: match verdict {
                        Err(violation) if is_touched => Some(violation.message),
                        _ => None,
                    },
                },
            );
        }

        let passwords_match =
            values.text(FieldName::Password) == values.text(FieldName::ConfirmPassword);
        let is_submittable = passwords_match && fields.values().all(|field| field.is_valid);

        FormSnapshot {
            fields,
            passwords_match,
            is_submittable,
        }
    }

    pub fn field(&self, name: FieldName) -> Option<&FieldState> {
        self.fields.get(&name)
    }

    pub fn invalid_fields(&self) -> Vec<FieldName> {
        self.fields
            .values()
            .filter(|field| !field.is_valid)
            .map(|field| field.name)
            .collect()
    }

    pub fn visible_errors(&self) -> Vec<(FieldName, &str)> {
        self.fields
            .values()
            .filter_map(|field| field.error_message.as_deref().map(|msg| (field.name, msg)))
            .collect()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cascade::Tier;
    use crate::catalog::LocationCatalog;
    use proptest::prelude::*;

    struct Fixture {
        validator: Validator,
        catalog: LocationCatalog,
        cascade: CascadeController,
        values: FormValues,
        touched: BTreeSet<FieldName>,
    }

    impl Fixture {
        fn new() -> Self {
            let validator = Validator::new();
            let catalog = LocationCatalog::builtin().unwrap();
            let cascade = CascadeController::new(&catalog);
            let values = FormValues::blank(validator.registry());
            Fixture {
                validator,
                catalog,
                cascade,
                values,
                touched: BTreeSet::new(),
            }
        }

        fn filled() -> Self {
            let mut fx = Fixture::new();
            fx.values.set_text(FieldName::FirstName, "Ayush");
            fx.values.set_text(FieldName::LastName, "Kumar");
            fx.values.set_text(FieldName::Email, "ayush.valid@gmail.com");
            fx.values.set_text(FieldName::Phone, "+91 9876543210");
            fx.values.set_text(FieldName::Age, "25");
            fx.values.set_text(FieldName::Gender, "male");
            fx.select(Tier::Country, "India");
            fx.select(Tier::State, "Karnataka");
            fx.select(Tier::City, "Bangalore");
            fx.values.set_text(FieldName::Password, "StrongPass123!");
            fx.values.set_text(FieldName::ConfirmPassword, "StrongPass123!");
            fx.values.set(FieldName::Terms, FieldValue::Flag(true));
            fx
        }

        fn select(&mut self, tier: Tier, value: &str) {
            self.cascade
                .select(&self.catalog, &mut self.values, tier, value)
                .unwrap();
        }

        fn snapshot(&self) -> FormSnapshot {
            FormSnapshot::compute(&self.validator, &self.values, &self.cascade, &self.touched)
        }
    }

    #[test]
    fn test_blank_form_not_submittable() {
        let snapshot = Fixture::new().snapshot();
        assert!(!snapshot.is_submittable);
        assert!(snapshot.visible_errors().is_empty(), "untouched fields stay quiet");
    }

    #[test]
    fn test_complete_form_submittable() {
        let snapshot = Fixture::filled().snapshot();
        assert!(snapshot.invalid_fields().is_empty(), "{:?}", snapshot.invalid_fields());
        assert!(snapshot.is_submittable);
    }

    #[test]
    fn test_state_enabled_but_unselected_blocks() {
        let mut fx = Fixture::filled();
        fx.select(Tier::Country, "USA");
        let snapshot = fx.snapshot();
        assert!(!snapshot.is_submittable);
        assert_eq!(snapshot.invalid_fields(), vec![FieldName::State]);
        assert!(!snapshot.field(FieldName::City).unwrap().is_required);
    }

    #[test]
    fn test_password_mismatch_blocks() {
        let mut fx = Fixture::filled();
        fx.values.set_text(FieldName::ConfirmPassword, "StrongPass123?");
        let snapshot = fx.snapshot();
        assert!(!snapshot.passwords_match);
        assert!(!snapshot.is_submittable);
    }

    #[test]
    fn test_invalid_optional_age_blocks() {
        let mut fx = Fixture::filled();
        fx.values.set_text(FieldName::Age, "15");
        assert!(!fx.snapshot().is_submittable);

        fx.values.set_text(FieldName::Age, "");
        assert!(fx.snapshot().is_submittable);
    }

    #[test]
    fn test_empty_confirm_blocks_quietly() {
        let mut fx = Fixture::filled();
        fx.values.clear(FieldName::Password);
        fx.values.clear(FieldName::ConfirmPassword);
        fx.touched.insert(FieldName::ConfirmPassword);
        let snapshot = fx.snapshot();
        let confirm = snapshot.field(FieldName::ConfirmPassword).unwrap();
        assert!(!confirm.is_valid);
        assert!(!confirm.shows_error());
        assert!(!snapshot.is_submittable);
    }

    #[test]
    fn test_errors_only_for_touched_fields() {
        let mut fx = Fixture::new();
        fx.touched.insert(FieldName::LastName);
        let snapshot = fx.snapshot();
        assert_eq!(
            snapshot.visible_errors(),
            vec![(FieldName::LastName, "Last name is required")]
        );
    }

    #[test]
    fn test_valid_marker() {
        let mut fx = Fixture::filled();
        fx.touched.insert(FieldName::FirstName);
        fx.touched.insert(FieldName::Address);
        let snapshot = fx.snapshot();
        assert!(snapshot.field(FieldName::FirstName).unwrap().shows_valid());
        assert!(!snapshot.field(FieldName::LastName).unwrap().shows_valid());
        // empty optional field passes but is not marked
        assert!(!snapshot.field(FieldName::Address).unwrap().shows_valid());
    }

    fn field_strategy() -> impl Strategy<Value = FieldName> {
        prop::sample::select(FieldName::ALL.to_vec())
    }

    proptest! {
        #[test]
        fn prop_breaking_any_required_field_blocks_submit(field in field_strategy()) {
            let mut fx = Fixture::filled();
            let required = fx.validator.is_required(field, fx.cascade.is_enabled(field));
            fx.values.clear(field);
            let snapshot = fx.snapshot();
            if required {
                prop_assert!(!snapshot.is_submittable);
            } else {
                prop_assert!(snapshot.is_submittable);
            }
        }

        #[test]
        fn prop_submittable_iff_all_valid_and_matching(
            first in "[A-Za-z]{0,3}",
            email in prop::sample::select(vec!["", "x", "a@b.co", "a@mailinator.com"]),
            confirm in prop::sample::select(vec!["", "StrongPass123!", "other"]),
            terms in any::<bool>(),
        ) {
            let mut fx = Fixture::filled();
            fx.values.set_text(FieldName::FirstName, first.clone());
            fx.values.set_text(FieldName::Email, email);
            fx.values.set_text(FieldName::ConfirmPassword, confirm);
            fx.values.set(FieldName::Terms, FieldValue::Flag(terms));

            let expected = !first.is_empty()
                && email == "a@b.co"
                && confirm == "StrongPass123!"
                && terms;
            prop_assert_eq!(fx.snapshot().is_submittable, expected);
        }
    }
}
