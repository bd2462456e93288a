//! Keyed promise memoization.
//!
//! Concurrent callers of [`SingleFlight::run`] with the same key share one
//! in-flight future: the first caller drives the work, later callers await
//! the same shared result without issuing their own. The entry is removed
//! once the flight lands, so a later call with the same key starts fresh.
//!
//! One primitive serves every in-flight dedup need in the engine — folder
//! creation locking on both stores is keyed by `name:parent`.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

type Flight<T, E> = Shared<BoxFuture<'static, Result<T, Arc<E>>>>;

/// Deduplicates concurrent identical requests by key.
pub struct SingleFlight<T, E> {
    inflight: Mutex<HashMap<String, Flight<T, E>>>,
}

impl<T, E> SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `make()` under `key`, or joins the flight already running there.
    ///
    /// Errors come back as `Arc<E>` because every joined caller observes the
    /// same failure.
    pub async fn run<F, Fut>(&self, key: &str, make: F) -> Result<T, Arc<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (flight, leader) = {
            let mut inflight = self.inflight.lock().await;
            match inflight.get(key) {
                Some(existing) => (existing.clone(), false),
                None => {
                    let fut = make().map(|r| r.map_err(Arc::new)).boxed().shared();
                    inflight.insert(key.to_string(), fut.clone());
                    (fut, true)
                }
            }
        };

        let result = flight.await;

        if leader {
            self.inflight.lock().await.remove(key);
        }

        result
    }

    /// Number of flights currently in the air.
    pub async fn len(&self) -> usize {
        self.inflight.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inflight.lock().await.is_empty()
    }
}

impl<T, E> Default for SingleFlight<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
