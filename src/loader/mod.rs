//! At-most-once loading of external resources such as the identity provider
//! SDK.
//!
//! Every resource id maps to one shared future. Concurrent callers get clones of
//! the same [`ResourceLoad`] and settle together. A successful load is memoized
//! for the lifetime of the [`ResourceLoader`]; a failed load clears its entry so
//! the next call injects again.
//!
//! The injection primitive itself is a capability supplied by the runtime
//! through [`ResourceInjector`]. [`HttpFetcher`] is the native implementation;
//! [`Preloaded`] stands in when the host already provides the resource.

mod fetch;

pub use self::fetch::HttpFetcher;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LoadError {
    #[error("failed to load resource {resource}: {reason}")]
    Failed { resource: String, reason: String },
}

/// Shared handle on a pending or settled load. Cloning it is cheap; all clones
/// resolve to the same outcome.
pub type ResourceLoad = Shared<BoxFuture<'static, Result<(), LoadError>>>;

/// Runtime capability that can inject a resource and report when it settles.
pub trait ResourceInjector: Send + Sync {
    /// Whether the capability the resource provides is already available.
    fn is_present(&self, resource_id: &str) -> bool;

    /// Starts loading `resource_id`. Called at most once per attempt; the
    /// returned future resolves when the load completes or fails.
    fn inject(&self, resource_id: &str) -> BoxFuture<'static, Result<(), String>>;
}

enum Entry {
    Pending { attempt: u64, load: ResourceLoad },
    Loaded,
}

type Registry = Arc<Mutex<HashMap<String, Entry>>>;

pub struct ResourceLoader {
    injector: Arc<dyn ResourceInjector>,
    registry: Registry,
    attempts: AtomicU64,
}

impl ResourceLoader {
    #[must_use]
    pub fn new(injector: Arc<dyn ResourceInjector>) -> Self {
        Self {
            injector,
            registry: Arc::new(Mutex::new(HashMap::new())),
            attempts: AtomicU64::new(0),
        }
    }

    /// Returns a future that resolves once `resource_id` is loaded.
    pub fn ensure_loaded(&self, resource_id: &str) -> ResourceLoad {
        let mut registry = lock(&self.registry);

        match registry.get(resource_id) {
            Some(Entry::Loaded) => return ready(),
            Some(Entry::Pending { load, .. }) => {
                debug!(resource = resource_id, "joining in-flight load");
                return load.clone();
            }
            None => {}
        }

        if self.injector.is_present(resource_id) {
            debug!(resource = resource_id, "resource already present");
            registry.insert(resource_id.to_string(), Entry::Loaded);
            return ready();
        }

        let attempt = self.attempts.fetch_add(1, Ordering::Relaxed);
        info!(resource = resource_id, attempt, "injecting resource");

        let injection = self.injector.inject(resource_id);
        let registry_ref = Arc::clone(&self.registry);
        let resource = resource_id.to_string();

        let load = async move {
            let outcome = injection.await;
            let mut registry = lock(&registry_ref);
            let current = matches!(
                registry.get(&resource),
                Some(Entry::Pending { attempt: a, .. }) if *a == attempt
            );

            match outcome {
                Ok(()) => {
                    if current {
                        registry.insert(resource.clone(), Entry::Loaded);
                    }
                    info!(resource = %resource, "resource loaded");
                    Ok(())
                }
                Err(reason) => {
                    if current {
                        registry.remove(&resource);
                    }
                    warn!(resource = %resource, "resource failed to load: {}", reason);
                    Err(LoadError::Failed { resource, reason })
                }
            }
        }
        .boxed()
        .shared();

        registry.insert(
            resource_id.to_string(),
            Entry::Pending {
                attempt,
                load: load.clone(),
            },
        );

        load
    }

    /// Whether `resource_id` has been loaded successfully.
    #[must_use]
    pub fn is_loaded(&self, resource_id: &str) -> bool {
        matches!(lock(&self.registry).get(resource_id), Some(Entry::Loaded))
    }
}

/// Injector for hosts that ship every resource already: everything is present
/// and nothing is ever fetched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Preloaded;

impl ResourceInjector for Preloaded {
    fn is_present(&self, _resource_id: &str) -> bool {
        true
    }

    fn inject(&self, _resource_id: &str) -> BoxFuture<'static, Result<(), String>> {
        future::ready(Ok(())).boxed()
    }
}

fn ready() -> ResourceLoad {
    future::ready(Ok(())).boxed().shared()
}

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, Entry>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
