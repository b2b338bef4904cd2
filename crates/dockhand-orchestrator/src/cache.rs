//! Read-through metadata cache over engine inspections.
//!
//! Two lookups are cached: container identity by name, and the value of a
//! named environment variable inside a container. Both are backed by the
//! same inspect call, which is expensive enough to coalesce: the cache is
//! single-flight per key, so concurrent callers for one key trigger at most
//! one engine round trip and observe the same result.
//!
//! Entries never expire on a timer. The lifecycle orchestrator invalidates
//! them explicitly when it creates, removes, or mutates the environment of
//! the named container.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use dockhand_common::error::{DockhandError, Result};
use dockhand_engine::EngineClient;

use crate::boundary;

/// Generic single-flight value cache.
///
/// The flight locks are independent of the value map so that a slow load
/// for one key never blocks reads of other keys, and independent of the
/// orchestrator's per-name lifecycle locks so lookups never block
/// transitions beyond the invalidation point.
struct SingleFlight<K, V> {
    values: Mutex<HashMap<K, V>>,
    flights: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> SingleFlight<K, V> {
    fn new() -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key`, or runs `load` to fill it.
    ///
    /// Load failures are returned to every waiting caller of this flight
    /// and are not cached: a later recreate of the underlying container
    /// may make the same key resolvable.
    fn get_or_load(&self, key: &K, load: impl FnOnce() -> Result<V>) -> Result<V> {
        if let Some(value) = self.peek(key) {
            return Ok(value);
        }
        let flight = {
            let mut flights = self.flights.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(flights.entry(key.clone()).or_default())
        };
        let _in_flight = flight.lock().unwrap_or_else(PoisonError::into_inner);

        // A concurrent flight may have filled the slot while we waited.
        if let Some(value) = self.peek(key) {
            return Ok(value);
        }
        let value = load()?;
        let _ = self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), value.clone());
        Ok(value)
    }

    fn peek(&self, key: &K) -> Option<V> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn invalidate_if(&self, mut pred: impl FnMut(&K) -> bool) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| !pred(key));
        self.flights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|key, _| !pred(key));
    }
}

/// Cache of container identity and environment lookups.
pub struct MetadataCache {
    engine: Arc<dyn EngineClient>,
    ids: SingleFlight<String, String>,
    envs: SingleFlight<(String, String), String>,
}

impl MetadataCache {
    /// Creates a cache reading through the given engine client.
    #[must_use]
    pub fn new(engine: Arc<dyn EngineClient>) -> Self {
        Self {
            engine,
            ids: SingleFlight::new(),
            envs: SingleFlight::new(),
        }
    }

    /// Resolves a container's engine-assigned id by name.
    ///
    /// # Errors
    ///
    /// `ContainerNotFound` when the engine knows no such container;
    /// `EngineUnavailable` on connectivity failure.
    pub fn container_id(&self, name: &str) -> Result<String> {
        self.ids.get_or_load(&name.to_owned(), || {
            tracing::debug!(name = %name, "inspecting container for id lookup");
            let record = self
                .engine
                .inspect_container(name)
                .map_err(|e| boundary::inspect_error(name, e))?;
            Ok(record.id)
        })
    }

    /// Resolves the value of a declared environment variable.
    ///
    /// An absent variable is a [`DockhandError::MissingEnvVariable`] error
    /// and is deliberately not cached as a negative result.
    ///
    /// # Errors
    ///
    /// `MissingEnvVariable` when the variable is not declared;
    /// `ContainerNotFound` / `EngineUnavailable` as for
    /// [`Self::container_id`].
    pub fn env(&self, name: &str, variable: &str) -> Result<String> {
        let key = (name.to_owned(), variable.to_owned());
        self.envs.get_or_load(&key, || {
            tracing::debug!(name = %name, variable = %variable, "inspecting container for env lookup");
            let record = self
                .engine
                .inspect_container(name)
                .map_err(|e| boundary::inspect_error(name, e))?;
            record.env_value(variable).map(ToOwned::to_owned).ok_or_else(|| {
                DockhandError::MissingEnvVariable {
                    container: name.to_owned(),
                    variable: variable.to_owned(),
                }
            })
        })
    }

    /// Drops every entry keyed by the given container name.
    pub fn invalidate(&self, name: &str) {
        self.ids.invalidate_if(|key| key == name);
        self.envs.invalidate_if(|(container, _)| container == name);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn get_or_load_fills_once_and_serves_from_cache() {
        let cache: SingleFlight<String, String> = SingleFlight::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            let _ = calls.fetch_add(1, Ordering::SeqCst);
            Ok("value".to_owned())
        };

        assert_eq!(cache.get_or_load(&"k".to_owned(), load).unwrap(), "value");
        assert_eq!(
            cache
                .get_or_load(&"k".to_owned(), || panic!("loader must not run on a hit"))
                .unwrap(),
            "value"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn load_failure_is_not_cached() {
        let cache: SingleFlight<String, String> = SingleFlight::new();
        let result = cache.get_or_load(&"k".to_owned(), || {
            Err(DockhandError::MissingEnvVariable {
                container: "db1".into(),
                variable: "CU_MODULE_PORT".into(),
            })
        });
        assert!(result.is_err());

        // A later load for the same key must be attempted again.
        let value = cache
            .get_or_load(&"k".to_owned(), || Ok("5432".to_owned()))
            .unwrap();
        assert_eq!(value, "5432");
    }

    #[test]
    fn invalidate_if_drops_matching_keys_only() {
        let cache: SingleFlight<String, String> = SingleFlight::new();
        let _ = cache.get_or_load(&"a".to_owned(), || Ok("1".to_owned()));
        let _ = cache.get_or_load(&"b".to_owned(), || Ok("2".to_owned()));

        cache.invalidate_if(|key| key == "a");

        assert!(cache.peek(&"a".to_owned()).is_none());
        assert_eq!(cache.peek(&"b".to_owned()), Some("2".to_owned()));
    }
}
