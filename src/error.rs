use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    LockPoisoned(&'static str),
    UnresolvableCategory {
        feed_id: String,
        category_id: String,
    },
    InvalidFeed(String),
    Serde(String),
    Persistence(String),
    Config(String),
    Publish(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::LockPoisoned(operation) => {
                write!(f, "registry lock poisoned during {}", operation)
            }
            RegistryError::UnresolvableCategory {
                feed_id,
                category_id,
            } => write!(
                f,
                "category {} referenced by feed {} could not be resolved",
                category_id, feed_id
            ),
            RegistryError::InvalidFeed(message) => write!(f, "invalid feed: {}", message),
            RegistryError::Serde(message) => write!(f, "feed serialization error: {}", message),
            RegistryError::Persistence(message) => {
                write!(f, "feed persistence error: {}", message)
            }
            RegistryError::Config(message) => write!(f, "configuration error: {}", message),
            RegistryError::Publish(message) => write!(f, "event publish error: {}", message),
        }
    }
}

impl std::error::Error for RegistryError {}
