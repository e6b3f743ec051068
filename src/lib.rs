// Registration Form - Core Library
// Exposes the form state machine for the CLI, the terminal UI, the driver API server, and tests

pub mod catalog;
pub mod fields;
pub mod validators;
pub mod cascade;
pub mod strength;
pub mod aggregate;
pub mod form;
pub mod render;
pub mod driver;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use catalog::{CountryEntry, LocationCatalog, StateEntry};
pub use fields::{
    FieldDefinition, FieldKind, FieldName, FieldRegistry, FieldValue, FormValues, Requirement,
};
pub use validators::{
    is_disposable, is_email_shape, is_valid_age, is_valid_email, is_valid_phone, Check,
    FieldVerdict, FieldViolation, Rule, Validator,
};
pub use cascade::{CascadeController, CascadeEffect, SelectControl, Tier};
pub use strength::{PasswordStrength, StrengthLevel};
pub use aggregate::{FieldState, FormSnapshot};
pub use form::{Confirmation, DialogState, RegistrationForm, SubmitOutcome};
pub use render::{render, ControlView, DialogView, ErrorNode, RenderedView, StrengthView};
pub use driver::{Driver, DriverCommand};
pub use config::FormConfig;
pub use error::{CatalogError, FormError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
