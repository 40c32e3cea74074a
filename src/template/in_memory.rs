use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::RegistryError;

use super::{RegisteredTemplate, TemplateProvider};

/// In-memory template provider. Clone-friendly via Arc.
///
/// Id lookups match either the registered id or the engine-side id, since a
/// feed's template reference is rewritten to the engine id once resolved.
#[derive(Clone, Default)]
pub struct InMemoryTemplateProvider {
    templates: Arc<RwLock<HashMap<String, RegisteredTemplate>>>,
}

impl InMemoryTemplateProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, template: RegisteredTemplate) -> Result<(), RegistryError> {
        let mut templates = self
            .templates
            .write()
            .map_err(|_| RegistryError::LockPoisoned("template provider write"))?;
        templates.insert(template.id.clone(), template);
        Ok(())
    }

    fn find(
        &self,
        predicate: impl Fn(&RegisteredTemplate) -> bool,
    ) -> Result<Option<RegisteredTemplate>, RegistryError> {
        let templates = self
            .templates
            .read()
            .map_err(|_| RegistryError::LockPoisoned("template provider read"))?;
        Ok(templates.values().find(|t| predicate(t)).cloned())
    }
}

impl TemplateProvider for InMemoryTemplateProvider {
    fn template_by_id(&self, id: &str) -> Result<Option<RegisteredTemplate>, RegistryError> {
        self.find(|t| t.id.eq_ignore_ascii_case(id) || t.engine_template_id.eq_ignore_ascii_case(id))
    }

    fn template_by_name(&self, name: &str) -> Result<Option<RegisteredTemplate>, RegistryError> {
        self.find(|t| t.template_name.eq_ignore_ascii_case(name))
    }

    fn template_with_all_properties(
        &self,
        id: &str,
    ) -> Result<Option<RegisteredTemplate>, RegistryError> {
        self.template_by_id(id)
    }
}
