//! Configuration template catalog
//!
//! Templates are described declaratively (identifier, category, display
//! name, ordered parameter fields) and loaded from a JSON document at
//! startup, so the deployment workflow never hard-codes field lists. A
//! compiled-in default catalog is used when the operator has not provided
//! their own.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::ConsoleError;
use crate::filesys::file::File;

/// Identifier of the free-text template: a raw command string substitutes
/// for structured parameters.
pub const CUSTOM_TEMPLATE: &str = "custom";

const DEFAULT_CATALOG: &str = include_str!("templates.json");

/// One named parameter of a template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamField {
    /// Key sent to the backend in the params mapping
    pub name: String,

    /// Label shown to the operator
    pub label: String,
}

/// A named, parameterized configuration recipe applied by the backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigTemplate {
    pub id: String,
    pub category: String,
    pub name: String,

    /// Declared fields, in display order
    #[serde(default)]
    pub fields: Vec<ParamField>,
}

impl ConfigTemplate {
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_TEMPLATE
    }
}

/// The full template catalog, static for the lifetime of the process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateCatalog {
    templates: Vec<ConfigTemplate>,
}

impl TemplateCatalog {
    /// Load the catalog from a file, falling back to the built-in defaults
    /// when the file does not exist.
    pub async fn load(file: &File) -> Result<Self, ConsoleError> {
        let catalog: Self = if file.exists().await {
            info!("Loading template catalog from {:?}", file.path());
            file.read_json().await?
        } else {
            serde_json::from_str(DEFAULT_CATALOG)?
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The compiled-in default catalog
    pub fn built_in() -> Self {
        let catalog: Self =
            serde_json::from_str(DEFAULT_CATALOG).expect("built-in template catalog is valid");
        catalog
    }

    fn validate(&self) -> Result<(), ConsoleError> {
        let mut seen = std::collections::HashSet::new();
        for template in &self.templates {
            if template.id.is_empty() {
                return Err(ConsoleError::ConfigError(
                    "Template with empty identifier".to_string(),
                ));
            }
            if !seen.insert(template.id.as_str()) {
                return Err(ConsoleError::ConfigError(format!(
                    "Duplicate template identifier: {}",
                    template.id
                )));
            }
        }
        Ok(())
    }

    /// All templates, in catalog order
    pub fn templates(&self) -> &[ConfigTemplate] {
        &self.templates
    }

    /// Look up a template by identifier
    pub fn get(&self, id: &str) -> Option<&ConfigTemplate> {
        self.templates.iter().find(|t| t.id == id)
    }
}
