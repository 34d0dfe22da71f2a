//! Single-flight registry for upstream listings fetches.
//!
//! Concurrent requests for the same normalized query share one upstream
//! fetch: the first caller registers a flight keyed by cache key, and every
//! later caller subscribes to the same shared future instead of starting its
//! own. The fetch itself runs in a spawned task, so it runs to completion and
//! populates the caches even if every original caller has disconnected.

use crate::upstream::errors::UpstreamError;
use crate::web::listings::ListingsBundle;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Shared outcome of one flight. Errors are Arc-wrapped so the same failure
/// can be delivered to every waiter.
pub type FlightResult = Result<Arc<ListingsBundle>, FlightError>;

type FlightFuture = Shared<BoxFuture<'static, FlightResult>>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum FlightError {
    #[error(transparent)]
    Upstream(Arc<UpstreamError>),
    #[error("listings fetch task aborted")]
    Aborted,
}

#[derive(Clone, Default)]
pub struct FlightMap {
    inflight: Arc<DashMap<String, FlightFuture>>,
}

impl FlightMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the flight for `key`, starting one with `fetch` if none exists.
    ///
    /// The check-and-register step is atomic (DashMap entry), so at most one
    /// fetch per key is in flight at any instant. The flight deregisters
    /// itself after `fetch` completes — success or failure — which happens
    /// after `fetch` has stored its result in the caches, so a request
    /// landing right after deregistration hits the cache instead of
    /// re-fetching.
    pub fn join<F, Fut>(&self, key: &str, fetch: F) -> impl Future<Output = FlightResult> + use<F, Fut>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Arc<ListingsBundle>, UpstreamError>> + Send + 'static,
    {
        match self.inflight.entry(key.to_owned()) {
            Entry::Occupied(existing) => {
                debug!(key, "joining in-flight listings fetch");
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                let inflight = self.inflight.clone();
                let flight_key = key.to_owned();
                let work = fetch();
                let task = tokio::spawn(async move {
                    let result = work.await;
                    inflight.remove(&flight_key);
                    result
                });
                let shared: FlightFuture = async move {
                    match task.await {
                        Ok(Ok(bundle)) => Ok(bundle),
                        Ok(Err(e)) => Err(FlightError::Upstream(Arc::new(e))),
                        Err(_) => Err(FlightError::Aborted),
                    }
                }
                .boxed()
                .shared();
                slot.insert(shared.clone());
                shared
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inflight.len()
    }
}
