use std::{
    collections::HashMap,
    fmt::Debug,
    io::ErrorKind,
    path::PathBuf,
    sync::{PoisonError, RwLock},
};

use crate::Error;

/// Loads raw bytes for fonts, images and definition files.
pub trait ResourceProvider: Debug + Send + Sync {
    /// Returns the contents of `filename` within `resource_group`. An empty
    /// group selects the provider's default group.
    fn load_raw_data(&self, filename: &str, resource_group: &str) -> crate::Result<Vec<u8>>;
}

/// Reads resources from the filesystem. Each resource group maps to a
/// directory; unknown groups and the empty group resolve relative to the
/// default directory.
#[derive(Debug, Default)]
pub struct DefaultResourceProvider {
    default_directory: PathBuf,
    groups: RwLock<HashMap<String, PathBuf>>,
}

impl DefaultResourceProvider {
    /// Returns a provider that resolves files relative to `default_directory`.
    pub fn new(default_directory: impl Into<PathBuf>) -> Self {
        Self {
            default_directory: default_directory.into(),
            groups: RwLock::default(),
        }
    }

    /// Maps `group` to `directory`, replacing any previous mapping.
    pub fn set_resource_group_directory(&self, group: impl Into<String>, directory: impl Into<PathBuf>) {
        let mut groups = self.groups.write().map_or_else(PoisonError::into_inner, |g| g);
        groups.insert(group.into(), directory.into());
    }

    /// Returns the full path `filename` resolves to within `group`.
    #[must_use]
    pub fn resolve(&self, filename: &str, group: &str) -> PathBuf {
        let groups = self.groups.read().map_or_else(PoisonError::into_inner, |g| g);
        groups
            .get(group)
            .unwrap_or(&self.default_directory)
            .join(filename)
    }
}

impl ResourceProvider for DefaultResourceProvider {
    fn load_raw_data(&self, filename: &str, resource_group: &str) -> crate::Result<Vec<u8>> {
        let path = self.resolve(filename, resource_group);
        std::fs::read(&path).map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                Error::ResourceNotFound {
                    filename: filename.to_string(),
                    group: resource_group.to_string(),
                }
            } else {
                Error::from(err)
            }
        })
    }
}

/// Serves resources registered in memory.
#[derive(Debug, Default)]
pub struct MemoryResourceProvider {
    files: RwLock<HashMap<(String, String), Vec<u8>>>,
}

impl MemoryResourceProvider {
    /// Registers `data` as `filename` within `group`.
    pub fn insert(&self, filename: impl Into<String>, group: impl Into<String>, data: impl Into<Vec<u8>>) {
        let mut files = self.files.write().map_or_else(PoisonError::into_inner, |g| g);
        files.insert((group.into(), filename.into()), data.into());
    }
}

impl ResourceProvider for MemoryResourceProvider {
    fn load_raw_data(&self, filename: &str, resource_group: &str) -> crate::Result<Vec<u8>> {
        let files = self.files.read().map_or_else(PoisonError::into_inner, |g| g);
        files
            .get(&(resource_group.to_string(), filename.to_string()))
            .cloned()
            .ok_or_else(|| Error::ResourceNotFound {
                filename: filename.to_string(),
                group: resource_group.to_string(),
            })
    }
}
