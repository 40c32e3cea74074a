use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::error::RegistryError;

use super::{Category, CategoryProvider};

/// In-memory category provider backed by `Arc<RwLock<HashMap>>`.
///
/// Clone-friendly (cloning shares the same underlying categories), so tests and
/// embedding services can keep a handle after passing one to the registry.
#[derive(Clone, Default)]
pub struct InMemoryCategoryProvider {
    categories: Arc<RwLock<HashMap<String, Category>>>,
}

impl InMemoryCategoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a category, replacing any category with the same id.
    pub fn insert(&self, category: Category) -> Result<(), RegistryError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| RegistryError::LockPoisoned("category provider write"))?;
        categories.insert(category.id().to_string(), category);
        Ok(())
    }

    /// Remove a category by id. Returns the removed handle.
    pub fn remove(&self, id: &str) -> Result<Option<Category>, RegistryError> {
        let mut categories = self
            .categories
            .write()
            .map_err(|_| RegistryError::LockPoisoned("category provider write"))?;
        Ok(categories.remove(id))
    }
}

impl CategoryProvider for InMemoryCategoryProvider {
    fn category_by_id(&self, id: &str) -> Result<Option<Category>, RegistryError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| RegistryError::LockPoisoned("category provider read"))?;
        Ok(categories.get(id).cloned())
    }

    fn category_by_name(&self, name: &str) -> Result<Option<Category>, RegistryError> {
        let categories = self
            .categories
            .read()
            .map_err(|_| RegistryError::LockPoisoned("category provider read"))?;
        Ok(categories
            .values()
            .find(|category| category.name().eq_ignore_ascii_case(name))
            .cloned())
    }
}
