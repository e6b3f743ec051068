// 🗺️ Location Catalog - Countries, states and cities
// Static nested lookup table, loaded once and never mutated

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::CatalogError;

/// Built-in catalog shipped with the crate.
const DEFAULT_CATALOG: &str = include_str!("../data/locations.json");

// ============================================================================
// CATALOG ENTRIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateEntry {
    pub name: String,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryEntry {
    pub name: String,
    pub states: Vec<StateEntry>,
}

// ============================================================================
// LOCATION CATALOG
// ============================================================================

/// Country → State → ordered cities.
///
/// Order is preserved exactly as loaded; every state carries at least one
/// city and names are unique within their parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCatalog {
    countries: Vec<CountryEntry>,
}

impl LocationCatalog {
    /// Catalog embedded in the binary (USA, India, UK)
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(DEFAULT_CATALOG)
    }

    /// Load catalog from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let countries: Vec<CountryEntry> = serde_json::from_str(json)?;
        Self::from_entries(countries)
    }

    /// Build a catalog, rejecting anything that breaks the nesting invariants
    pub fn from_entries(countries: Vec<CountryEntry>) -> Result<Self, CatalogError> {
        if countries.is_empty() {
            return Err(CatalogError::Empty);
        }

        ensure_unique("country", "catalog", countries.iter().map(|c| c.name.as_str()))?;

        for country in &countries {
            if country.states.is_empty() {
                return Err(CatalogError::NoStates(country.name.clone()));
            }
            ensure_unique("state", &country.name, country.states.iter().map(|s| s.name.as_str()))?;

            for state in &country.states {
                if state.cities.is_empty() {
                    return Err(CatalogError::NoCities {
                        country: country.name.clone(),
                        state: state.name.clone(),
                    });
                }
                let scope = format!("{}/{}", country.name, state.name);
                ensure_unique("city", &scope, state.cities.iter().map(String::as_str))?;
            }
        }

        Ok(LocationCatalog { countries })
    }

    pub fn list_countries(&self) -> Vec<&str> {
        self.countries.iter().map(|c| c.name.as_str()).collect()
    }

    /// States of a country; empty when the country is unknown
    pub fn list_states(&self, country: &str) -> Vec<&str> {
        self.country(country)
            .map(|c| c.states.iter().map(|s| s.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Cities of a state; empty when either key is unknown
    pub fn list_cities(&self, country: &str, state: &str) -> Vec<&str> {
        self.country(country)
            .and_then(|c| c.states.iter().find(|s| s.name == state))
            .map(|s| s.cities.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn entries(&self) -> &[CountryEntry] {
        &self.countries
    }

    fn country(&self, name: &str) -> Option<&CountryEntry> {
        self.countries.iter().find(|c| c.name == name)
    }
}

fn ensure_unique<'a>(
    kind: &'static str,
    scope: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(CatalogError::Duplicate {
                kind,
                name: name.to_string(),
                scope: scope.to_string(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
