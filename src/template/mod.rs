//! Registered templates - reusable pipeline definitions that feeds are built from.

mod in_memory;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

pub use in_memory::InMemoryTemplateProvider;

/// A configurable property exposed by a template's processors.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateProperty {
    pub processor_name: String,
    pub key: String,
    pub value: Option<String>,
    pub sensitive: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredTemplate {
    pub id: String,
    pub template_name: String,
    /// Id of the template inside the workflow engine.
    pub engine_template_id: String,
    pub reusable: bool,
    pub properties: Vec<TemplateProperty>,
}

impl RegisteredTemplate {
    pub fn new(
        id: impl Into<String>,
        template_name: impl Into<String>,
        engine_template_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            template_name: template_name.into(),
            engine_template_id: engine_template_id.into(),
            ..Self::default()
        }
    }

    pub fn with_property(mut self, property: TemplateProperty) -> Self {
        self.properties.push(property);
        self
    }

    /// Copy of this template with every property removed.
    pub fn without_properties(&self) -> Self {
        Self {
            properties: Vec::new(),
            ..self.clone()
        }
    }
}

/// Resolves template references.
pub trait TemplateProvider: Send + Sync {
    fn template_by_id(&self, id: &str) -> Result<Option<RegisteredTemplate>, RegistryError>;

    fn template_by_name(&self, name: &str) -> Result<Option<RegisteredTemplate>, RegistryError>;

    /// Template with its complete property set, as needed when building a feed.
    fn template_with_all_properties(
        &self,
        id: &str,
    ) -> Result<Option<RegisteredTemplate>, RegistryError>;
}
