//! Reflection cache
//!
//! A factory for class reflections which keeps every reflection it built.
//! The cache lives as long as the factory and can be filled up front, for
//! example from reflections restored out of a persisted cache.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

use super::class_loader::ReflectionSource;
use super::class_reflection::ClassReflection;
use super::error::ReflectionError;

/// Memoising factory for class reflections
pub struct ReflectionClassFactory {
    /// Where uncached reflections come from
    source: Arc<dyn ReflectionSource>,
    /// Cached reflections by class name
    reflections: RwLock<FxHashMap<String, Arc<ClassReflection>>>,
}

impl ReflectionClassFactory {
    /// Create a factory with an empty cache
    pub fn new(source: Arc<dyn ReflectionSource>) -> Self {
        Self {
            source,
            reflections: RwLock::new(FxHashMap::default()),
        }
    }

    /// Return the cached reflection of `class_name`, building it on first request
    ///
    /// Concurrent first requests for the same class converge on a single
    /// cached instance.
    pub fn reflect(&self, class_name: &str) -> Result<Arc<ClassReflection>, ReflectionError> {
        if let Some(reflection) = self.reflections.read().get(class_name) {
            return Ok(Arc::clone(reflection));
        }

        let reflection = self
            .source
            .reflect_class(class_name)
            .ok_or_else(|| ReflectionError::UnknownClass(class_name.to_string()))?;

        trace!("Caching reflection of {}", class_name);
        let mut reflections = self.reflections.write();
        let cached = reflections
            .entry(class_name.to_string())
            .or_insert_with(|| Arc::new(reflection));
        Ok(Arc::clone(cached))
    }

    /// Check whether a class or interface exists, cached or not
    pub fn class_exists(&self, class_name: &str) -> bool {
        self.reflections.read().contains_key(class_name) || self.source.type_exists(class_name)
    }

    /// Replace the whole cache with the given reflections
    ///
    /// Either every entry is accepted and the previous cache is discarded, or
    /// the call fails and the previous cache stays as it was.
    pub fn set_reflections<I>(&self, reflections: I) -> Result<(), ReflectionError>
    where
        I: IntoIterator<Item = Arc<ClassReflection>>,
    {
        let mut replacement = FxHashMap::default();
        for reflection in reflections {
            if reflection.name().is_empty() {
                return Err(ReflectionError::InvalidArgument(
                    "The specified reflection has no class name".to_string(),
                ));
            }
            let name = reflection.name().to_string();
            if replacement.insert(name.clone(), reflection).is_some() {
                return Err(ReflectionError::InvalidArgument(format!(
                    "The reflection of class \"{}\" was specified more than once",
                    name
                )));
            }
        }

        *self.reflections.write() = replacement;
        Ok(())
    }

    /// Return all cached reflections
    pub fn get_reflections(&self) -> FxHashMap<String, Arc<ClassReflection>> {
        self.reflections.read().clone()
    }

    /// Number of cached reflections
    pub fn len(&self) -> usize {
        self.reflections.read().len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.reflections.read().is_empty()
    }
}

impl std::fmt::Debug for ReflectionClassFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReflectionClassFactory")
            .field("cached", &self.len())
            .finish()
    }
}
