//! Deduplication of concurrent identical operations
//!
//! Callers asking for a key that is already in flight await the same pending
//! result instead of starting a second execution. The operation is spawned
//! onto the runtime, so it runs to completion even if every caller goes away;
//! its registration is dropped as soon as it settles.

use crate::error::{Error, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Result handed to every caller of one flight. Errors are shared, not cloned.
pub type SharedResult<T> = std::result::Result<T, Arc<Error>>;

type InFlight<T> = Shared<BoxFuture<'static, SharedResult<T>>>;
type Registry<T> = Arc<Mutex<HashMap<String, InFlight<T>>>>;

pub struct SingleFlight<T> {
    in_flight: Registry<T>,
}

impl<T> Default for SingleFlight<T> {
    fn default() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<T> Clone for SingleFlight<T> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<T> SingleFlight<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight registered under `key`, or start one with `factory`.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn get_existing_or_create<F, Fut>(&self, key: &str, factory: F) -> SharedResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        if let Some(existing) = self.existing(key) {
            debug!("Joining in-flight operation '{key}'");
            return existing.await;
        }

        // Built outside the lock so the factory may use this registry itself
        let operation = factory();

        let flight = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            match in_flight.get(key) {
                Some(existing) => {
                    debug!("Joining operation '{key}' started while preparing ours");
                    existing.clone()
                }
                None => {
                    debug!("Starting operation '{key}'");
                    let guard = Deregister {
                        registry: Arc::clone(&self.in_flight),
                        key: key.to_string(),
                    };
                    let task = tokio::spawn(async move {
                        let _guard = guard;
                        operation.await.map_err(Arc::new)
                    });
                    let flight = async move {
                        match task.await {
                            Ok(result) => result,
                            Err(e) => Err(Arc::new(Error::Other(format!(
                                "operation task failed: {e}"
                            )))),
                        }
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(key.to_string(), flight.clone());
                    flight
                }
            }
        };

        flight.await
    }

    fn existing(&self, key: &str) -> Option<InFlight<T>> {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

/// Removes the registration when the spawned operation finishes or panics.
struct Deregister<T> {
    registry: Registry<T>,
    key: String,
}

impl<T> Drop for Deregister<T> {
    fn drop(&mut self) {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
