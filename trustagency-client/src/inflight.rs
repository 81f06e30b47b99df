//! In-flight GET de-duplication.

use crate::error::{GatewayError, GatewayResult};
use crate::response::Payload;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;
use tracing::warn;

pub type SharedResponse = Shared<BoxFuture<'static, GatewayResult<Payload>>>;

/// At most one pending request per key. Joined callers await the same
/// shared future and observe the identical settled result.
#[derive(Clone, Default)]
pub struct InFlightRequests {
    pending: Arc<DashMap<String, SharedResponse>>,
}

impl std::fmt::Debug for InFlightRequests {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightRequests")
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl InFlightRequests {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the pending request for `key`, or register `start()` as the
    /// new one. Returns the shared future and whether this call started it.
    ///
    /// The work runs on its own tokio task, so it settles and the entry
    /// removes itself even when every caller is dropped before then.
    /// Must be called from within a tokio runtime.
    pub fn join_or_start<F, Fut>(&self, key: &str, start: F) -> (SharedResponse, bool)
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GatewayResult<Payload>> + Send + 'static,
    {
        match self.pending.entry(key.to_string()) {
            Entry::Occupied(entry) => (entry.get().clone(), false),
            Entry::Vacant(entry) => {
                let pending = Arc::clone(&self.pending);
                let owned_key = key.to_string();
                let work = start();
                let handle = tokio::spawn(async move {
                    let result = work.await;
                    pending.remove(&owned_key);
                    result
                });
                let shared = async move {
                    handle.await.unwrap_or_else(|err| {
                        warn!(error = %err, "In-flight request task failed");
                        Err(GatewayError::Network(format!("request task failed: {}", err)))
                    })
                }
                .boxed()
                .shared();
                entry.insert(shared.clone());
                (shared, true)
            }
        }
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_execution() {
        let inflight = InFlightRequests::new();
        let runs = Arc::new(AtomicUsize::new(0));

        let start = |runs: Arc<AtomicUsize>| {
            move || async move {
                runs.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok::<_, GatewayError>(Payload::Text("done".into()))
            }
        };

        let (first, started_first) = inflight.join_or_start("GET:/x", start(runs.clone()));
        let (second, started_second) = inflight.join_or_start("GET:/x", start(runs.clone()));
        assert!(started_first);
        assert!(!started_second);
        assert!(inflight.is_pending("GET:/x"));

        let (a, b) = tokio::join!(first, second);
        assert_eq!(a, b);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(inflight.is_empty());
    }

    #[tokio::test]
    async fn failed_request_is_removed_too() {
        let inflight = InFlightRequests::new();
        let (fut, _) = inflight.join_or_start("GET:/y", || async {
            Err::<Payload, _>(GatewayError::Network("refused".into()))
        });
        assert!(fut.await.is_err());
        assert!(!inflight.is_pending("GET:/y"));

        let (_, started) = inflight.join_or_start("GET:/y", || async { Ok::<_, GatewayError>(Payload::Empty) });
        assert!(started);
    }

    #[tokio::test(start_paused = true)]
    async fn abandoned_request_still_settles() {
        let inflight = InFlightRequests::new();
        let (fut, started) = inflight.join_or_start("GET:/z", || async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<_, GatewayError>(Payload::Empty)
        });
        assert!(started);
        assert!(tokio::time::timeout(Duration::from_millis(10), fut).await.is_err());
        assert!(inflight.is_pending("GET:/z"));

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(inflight.is_empty());
        let (_, started) = inflight.join_or_start("GET:/z", || async { Ok::<_, GatewayError>(Payload::Empty) });
        assert!(started);
    }
}
