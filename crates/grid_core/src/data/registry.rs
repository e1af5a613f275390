//! Named footprint templates.

use std::collections::BTreeMap;

use super::footprint_data::FootprintSet;
use crate::error::{GridError, Result};
use crate::footprint::FootprintTemplate;

/// All footprint templates known to the host, by name.
///
/// Everything in here has been validated, so placement never sees a
/// malformed template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateRegistry {
    templates: BTreeMap<String, FootprintTemplate>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidTemplate`] if the name is already taken.
    pub fn register(&mut self, template: FootprintTemplate) -> Result<()> {
        if self.templates.contains_key(template.name()) {
            return Err(GridError::InvalidTemplate {
                name: template.name().to_owned(),
                reason: "name is already registered".into(),
            });
        }
        self.templates.insert(template.name().to_owned(), template);
        Ok(())
    }

    /// Build a registry from parsed data, validating every entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`GridError::InvalidTemplate`] encountered.
    pub fn from_set(set: FootprintSet) -> Result<Self> {
        let mut registry = Self::new();
        for data in set.templates {
            registry.register(data.into_template()?)?;
        }
        Ok(registry)
    }

    /// Parse a [`FootprintSet`] from RON text and validate it.
    ///
    /// `source` names the data in error messages (usually a file path).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DataParseError`] on malformed RON and
    /// [`GridError::InvalidTemplate`] on malformed templates.
    pub fn from_ron_str(text: &str, source: &str) -> Result<Self> {
        let set: FootprintSet = ron::from_str(text).map_err(|e| GridError::DataParseError {
            path: source.to_owned(),
            message: e.to_string(),
        })?;
        let registry = Self::from_set(set)?;
        tracing::info!(source, templates = registry.len(), "Loaded footprint templates");
        Ok(registry)
    }

    /// Get a template by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FootprintTemplate> {
        self.templates.get(name)
    }

    /// Get a template by name, as a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::UnknownTemplate`] if no such template exists.
    pub fn require(&self, name: &str) -> Result<&FootprintTemplate> {
        self.get(name)
            .ok_or_else(|| GridError::UnknownTemplate(name.to_owned()))
    }

    /// All templates, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &FootprintTemplate> {
        self.templates.values()
    }

    /// Number of templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// True if no templates are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
