//! Pluggable route providers: trait abstraction for routing backends.
//!
//! Two implementations, selectable via [`RouteProviderKind`]:
//!
//! - **`StraightLineRouteProvider`**: the two endpoints, nothing else. Zero dependencies.
//! - **`OsrmRouteProvider`** (feature `osrm`): Calls a local/remote OSRM HTTP endpoint.
//!
//! Remote providers are wrapped in a [`CachedRouteProvider`]. Whatever the
//! backend, [`route_or_straight_line`] is the only entry point the engine
//! uses: a failed or degenerate lookup collapses to `[from, to]`.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::geo::GeoPoint;

mod error;
#[cfg(feature = "osrm")]
pub mod osrm;

pub use error::RouteError;

/// Which routing backend to use.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum RouteProviderKind {
    /// Straight line between the two points.
    #[default]
    StraightLine,
    /// OSRM HTTP endpoint (e.g. `"https://router.project-osrm.org"`).
    #[cfg(feature = "osrm")]
    Osrm { endpoint: String },
}

/// Trait for routing backends.
pub trait RouteProvider: Send + Sync {
    /// Ordered coordinates from `from` to `to`.
    fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError>;
}

/// Always answers with the two endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouteProvider;

impl RouteProvider for StraightLineRouteProvider {
    fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
        Ok(vec![from, to])
    }
}

/// Query `provider`, degrading to `[from, to]` when it fails or returns fewer
/// than two points.
pub fn route_or_straight_line(
    provider: &dyn RouteProvider,
    from: GeoPoint,
    to: GeoPoint,
) -> Vec<GeoPoint> {
    match provider.fetch_route(from, to) {
        Ok(path) if path.len() >= 2 && path.iter().all(GeoPoint::is_finite) => {
            debug!(points = path.len(), "route fetched");
            path
        }
        Ok(path) => {
            warn!(
                points = path.len(),
                "route provider returned a degenerate path, using straight line"
            );
            vec![from, to]
        }
        Err(err) => {
            warn!(error = %err, "route fetch failed, using straight line");
            vec![from, to]
        }
    }
}

fn cache_key(from: GeoPoint, to: GeoPoint) -> [u64; 4] {
    [
        from.lat.to_bits(),
        from.lng.to_bits(),
        to.lat.to_bits(),
        to.lng.to_bits(),
    ]
}

/// LRU-cached wrapper around any [`RouteProvider`].
///
/// Cache key is the bit pattern of both endpoints (directional). Failures are
/// not cached, so a later call retries the inner provider.
pub struct CachedRouteProvider {
    inner: Box<dyn RouteProvider>,
    cache: Mutex<LruCache<[u64; 4], Vec<GeoPoint>>>,
}

impl CachedRouteProvider {
    pub fn new(inner: Box<dyn RouteProvider>, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }
}

impl RouteProvider for CachedRouteProvider {
    fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
        let key = cache_key(from, to);

        // Fast path: cache hit
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(cached) = cache.get(&key) {
                return Ok(cached.clone());
            }
        }

        let route = self.inner.fetch_route(from, to)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, route.clone());
        }

        Ok(route)
    }
}

/// Default route cache capacity for remote providers.
#[cfg(feature = "osrm")]
const DEFAULT_ROUTE_CACHE_CAPACITY: usize = 256;

/// Construct a boxed [`RouteProvider`] from a [`RouteProviderKind`] descriptor.
pub fn build_route_provider(kind: &RouteProviderKind) -> Box<dyn RouteProvider> {
    match kind {
        RouteProviderKind::StraightLine => Box::new(StraightLineRouteProvider),

        #[cfg(feature = "osrm")]
        RouteProviderKind::Osrm { endpoint } => match osrm::OsrmRouteProvider::new(endpoint) {
            Ok(provider) => Box::new(CachedRouteProvider::new(
                Box::new(provider),
                DEFAULT_ROUTE_CACHE_CAPACITY,
            )),
            Err(err) => {
                warn!(error = %err, endpoint = %endpoint, "failed to build OSRM client, using straight line");
                Box::new(StraightLineRouteProvider)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingProvider {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl RouteProvider for CountingProvider {
        fn fetch_route(&self, from: GeoPoint, to: GeoPoint) -> Result<Vec<GeoPoint>, RouteError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RouteError::NoRoute)
            } else {
                Ok(vec![from, GeoPoint::new(0.5, 0.5), to])
            }
        }
    }

    #[test]
    fn failure_degrades_to_endpoints() {
        let provider = CountingProvider {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        };
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        assert_eq!(route_or_straight_line(&provider, a, b), vec![a, b]);
    }

    #[test]
    fn cache_serves_repeat_queries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                fail: false,
            }),
            4,
        );
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        let first = cached.fetch_route(a, b).expect("route");
        let second = cached.fetch_route(a, b).expect("route");
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cached.fetch_route(b, a).expect("reverse route");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn cache_does_not_store_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cached = CachedRouteProvider::new(
            Box::new(CountingProvider {
                calls: Arc::clone(&calls),
                fail: true,
            }),
            4,
        );
        let a = GeoPoint::new(0.0, 0.0);
        assert!(cached.fetch_route(a, a).is_err());
        assert!(cached.fetch_route(a, a).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
