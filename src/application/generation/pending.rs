//! In-flight generation registry.
//!
//! At most one provider call runs per cache key. Later callers for the same
//! key join the in-flight future instead of starting their own.

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::generation::{CacheKey, GenerationOutcome, QuestionCache};
use crate::domain::questionnaire::QuestionSet;

/// A generation future that any number of callers can await.
pub type SharedGeneration = Shared<BoxFuture<'static, GenerationOutcome>>;

/// Result of claiming a key.
pub enum Claim {
    /// The cache was filled while we were getting here.
    Cached(QuestionSet),
    /// Another caller's request is in flight; await it.
    Joined(SharedGeneration),
    /// We registered a new request; await it.
    Started(SharedGeneration),
}

/// Registry of in-flight generations, keyed like the cache.
#[derive(Clone, Default)]
pub struct PendingRequests {
    inner: Arc<Mutex<HashMap<CacheKey, SharedGeneration>>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, SharedGeneration>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Joins the in-flight request for `key`, or registers `start()` as it.
    ///
    /// The cache is re-checked while the registry lock is held, so a request
    /// that completed between the caller's cache miss and this claim is not
    /// repeated. `start` runs only when a new request is registered.
    ///
    /// The registered future removes itself from the registry once it has
    /// written its result to the cache.
    pub fn claim<F, Fut>(&self, key: &CacheKey, cache: &QuestionCache, start: F) -> Claim
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GenerationOutcome> + Send + 'static,
    {
        let mut pending = self.lock();

        if let Some(questions) = cache.get(key) {
            return Claim::Cached(questions);
        }

        if let Some(in_flight) = pending.get(key) {
            return Claim::Joined(in_flight.clone());
        }

        let registry = self.clone();
        let own_key = key.clone();
        let work = start();
        let shared = async move {
            let outcome = work.await;
            registry.remove(&own_key);
            outcome
        }
        .boxed()
        .shared();

        pending.insert(key.clone(), shared.clone());
        Claim::Started(shared)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn remove(&self, key: &CacheKey) {
        self.lock().remove(key);
    }
}

impl std::fmt::Debug for PendingRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequests")
            .field("in_flight", &self.len())
            .finish()
    }
}

impl std::fmt::Debug for Claim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Claim::Cached(_) => f.write_str("Cached"),
            Claim::Joined(_) => f.write_str("Joined"),
            Claim::Started(_) => f.write_str("Started"),
        }
    }
}
