//! Route registry combining the static and dynamic tiers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use http::Method;
use parking_lot::RwLock;
use tracing::debug;

use crate::compiled::{normalize_pattern, CompiledRoute, RouteInfo};
use crate::constraint::ParamConstraint;
use crate::dynamic::{DynamicRoutes, DEFAULT_INDEX_MIN_ROUTES};
use crate::error::{RouterError, RouterResult};
use crate::filter::{MembershipFilter, DEFAULT_FILTER_BITS, DEFAULT_FILTER_HASHES};
use crate::params::ParamSink;
use crate::static_table::{StaticRouteTable, DEFAULT_FILTER_MIN_ROUTES};

/// Tuning knobs for a [`RouteRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Membership filter size in bits.
    pub filter_bits: usize,
    /// Probes per key in the membership filter.
    pub filter_hashes: usize,
    /// Static tables smaller than this skip the filter.
    pub filter_min_routes: usize,
    /// Dynamic sets larger than this get a first-segment index.
    pub index_min_routes: usize,
}

impl Default for RegistryOptions {
    fn default() -> Self {
        Self {
            filter_bits: DEFAULT_FILTER_BITS,
            filter_hashes: DEFAULT_FILTER_HASHES,
            filter_min_routes: DEFAULT_FILTER_MIN_ROUTES,
            index_min_routes: DEFAULT_INDEX_MIN_ROUTES,
        }
    }
}

struct Tiers<H> {
    static_routes: StaticRouteTable<H>,
    dynamic_routes: DynamicRoutes<H>,
}

impl<H> Tiers<H> {
    fn new(options: &RegistryOptions) -> RouterResult<Self> {
        let filter = MembershipFilter::new(options.filter_bits, options.filter_hashes)?;
        Ok(Self {
            static_routes: StaticRouteTable::with_filter(filter, options.filter_min_routes),
            dynamic_routes: DynamicRoutes::with_index_threshold(options.index_min_routes),
        })
    }
}

impl<H> Clone for Tiers<H> {
    fn clone(&self) -> Self {
        Self {
            static_routes: self.static_routes.clone(),
            dynamic_routes: self.dynamic_routes.clone(),
        }
    }
}

/// Thread-safe store of static and dynamic routes.
///
/// All tiers sit behind one reader-writer lock. After [`freeze`](Self::freeze)
/// the registry is immutable: lookups read a published snapshot without
/// taking the lock and every mutation returns [`RouterError::Frozen`].
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use velox_router::{Params, RouteRegistry};
///
/// let registry = RouteRegistry::new();
/// registry.register(Method::GET, "/health", "health", &[]).unwrap();
/// registry.register(Method::GET, "/users/:id", "getUser", &[]).unwrap();
///
/// assert!(registry.lookup_static(&Method::GET, "/health").is_some());
///
/// let mut params = Params::new();
/// let route = registry.match_dynamic(&Method::GET, "/users/7", &mut params).unwrap();
/// assert_eq!(*route.handlers(), "getUser");
/// assert_eq!(params.get("id"), Some("7"));
/// ```
pub struct RouteRegistry<H> {
    tiers: RwLock<Tiers<H>>,
    frozen: AtomicBool,
    snapshot: OnceLock<Tiers<H>>,
}

impl<H> RouteRegistry<H> {
    /// Creates an empty registry with default options.
    pub fn new() -> Self {
        Self::from_tiers(Tiers {
            static_routes: StaticRouteTable::new(),
            dynamic_routes: DynamicRoutes::new(),
        })
    }

    /// Creates an empty registry with the given options.
    ///
    /// # Errors
    ///
    /// Fails when the filter size or hash count is zero.
    pub fn with_options(options: RegistryOptions) -> RouterResult<Self> {
        Ok(Self::from_tiers(Tiers::new(&options)?))
    }

    fn from_tiers(tiers: Tiers<H>) -> Self {
        Self {
            tiers: RwLock::new(tiers),
            frozen: AtomicBool::new(false),
            snapshot: OnceLock::new(),
        }
    }

    /// Compiles and registers a route, returning its handle.
    ///
    /// # Errors
    ///
    /// Propagates compile errors and every error of [`add_route`](Self::add_route).
    pub fn register(
        &self,
        method: Method,
        pattern: &str,
        handlers: H,
        constraints: &[ParamConstraint],
    ) -> RouterResult<Arc<CompiledRoute<H>>> {
        let route = Arc::new(CompiledRoute::compile(method, pattern, handlers, constraints)?);
        self.add_route(Arc::clone(&route))?;
        Ok(route)
    }

    /// Adds a compiled route to the static or dynamic tier.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Frozen`] after [`freeze`](Self::freeze),
    /// [`RouterError::WildcardNotSupported`] for wildcard routes, and
    /// duplicate or collision errors from the target tier.
    pub fn add_route(&self, route: Arc<CompiledRoute<H>>) -> RouterResult<()> {
        if route.has_wildcard() {
            return Err(RouterError::WildcardNotSupported {
                pattern: route.pattern.clone(),
            });
        }
        if self.is_frozen() {
            return Err(RouterError::Frozen);
        }

        let mut tiers = self.tiers.write();
        if self.is_frozen() {
            return Err(RouterError::Frozen);
        }

        let (method, pattern, is_static) = (route.method.clone(), route.pattern.clone(), route.is_static);
        if is_static {
            tiers.static_routes.add(route)?;
        } else {
            tiers.dynamic_routes.insert(route)?;
        }
        debug!(
            route.method = %method,
            route.pattern = %pattern,
            tier = if is_static { "static" } else { "dynamic" },
            "route registered"
        );
        Ok(())
    }

    /// Removes the route for `(method, pattern)` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::Frozen`] after freezing and
    /// [`RouterError::RouteNotFound`] when nothing is registered.
    pub fn remove_route(&self, method: &Method, pattern: &str) -> RouterResult<Arc<CompiledRoute<H>>> {
        if self.is_frozen() {
            return Err(RouterError::Frozen);
        }

        let mut tiers = self.tiers.write();
        if self.is_frozen() {
            return Err(RouterError::Frozen);
        }

        let removed = tiers
            .static_routes
            .remove(method, pattern)
            .or_else(|| tiers.dynamic_routes.remove(method, pattern));

        match removed {
            Some(route) => {
                debug!(route.method = %method, route.pattern = %route.pattern, "route removed");
                Ok(route)
            }
            None => Err(RouterError::RouteNotFound {
                method: method.to_string(),
                pattern: normalize_pattern(pattern),
            }),
        }
    }

    /// Exact lookup in the static tier.
    #[inline]
    pub fn lookup_static(&self, method: &Method, path: &str) -> Option<Arc<CompiledRoute<H>>> {
        if let Some(tiers) = self.frozen_tiers() {
            return tiers.static_routes.lookup(method, path).cloned();
        }
        self.tiers.read().static_routes.lookup(method, path).cloned()
    }

    /// Finds the most specific dynamic route and writes its parameters to `sink`.
    ///
    /// Builds the first-segment index on first use once the dynamic set is
    /// large enough.
    pub fn match_dynamic<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<Arc<CompiledRoute<H>>> {
        if let Some(tiers) = self.frozen_tiers() {
            return tiers.dynamic_routes.find(method, path, sink).cloned();
        }

        {
            let tiers = self.tiers.read();
            if !tiers.dynamic_routes.needs_index() {
                return tiers.dynamic_routes.find(method, path, sink).cloned();
            }
        }

        {
            let mut tiers = self.tiers.write();
            if tiers.dynamic_routes.needs_index() {
                tiers.dynamic_routes.build_index();
            }
        }

        self.tiers.read().dynamic_routes.find(method, path, sink).cloned()
    }

    /// Static lookup followed by dynamic matching.
    pub fn lookup<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<Arc<CompiledRoute<H>>> {
        if let Some(route) = self.lookup_static(method, path) {
            sink.set_param_count(0);
            return Some(route);
        }
        self.match_dynamic(method, path, sink)
    }

    /// Makes the registry immutable and switches lookups to a lock-free snapshot.
    ///
    /// Idempotent. There is no way back to the mutable state.
    pub fn freeze(&self) {
        let mut tiers = self.tiers.write();
        if self.is_frozen() {
            return;
        }
        if tiers.dynamic_routes.needs_index() {
            tiers.dynamic_routes.build_index();
        }
        // The write lock and the flag check above make this the only setter.
        let _ = self.snapshot.set(tiers.clone());
        self.frozen.store(true, Ordering::Release);
        debug!(
            static_routes = tiers.static_routes.len(),
            dynamic_routes = tiers.dynamic_routes.len(),
            "route registry frozen"
        );
    }

    /// True once [`freeze`](Self::freeze) has completed.
    #[inline]
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(Ordering::Acquire)
    }

    #[inline]
    fn frozen_tiers(&self) -> Option<&Tiers<H>> {
        if self.is_frozen() {
            self.snapshot.get()
        } else {
            None
        }
    }

    fn with_tiers<R>(&self, f: impl FnOnce(&Tiers<H>) -> R) -> R {
        match self.frozen_tiers() {
            Some(tiers) => f(tiers),
            None => f(&self.tiers.read()),
        }
    }

    /// Total number of registered routes.
    pub fn len(&self) -> usize {
        self.with_tiers(|t| t.static_routes.len() + t.dynamic_routes.len())
    }

    /// True when no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of static routes.
    pub fn static_len(&self) -> usize {
        self.with_tiers(|t| t.static_routes.len())
    }

    /// Number of dynamic routes.
    pub fn dynamic_len(&self) -> usize {
        self.with_tiers(|t| t.dynamic_routes.len())
    }

    /// True when the first-segment index is currently built.
    pub fn has_index(&self) -> bool {
        self.with_tiers(|t| t.dynamic_routes.has_index())
    }

    /// Metadata for every route: static routes sorted by pattern then
    /// method, followed by dynamic routes in specificity order.
    pub fn routes(&self) -> Vec<RouteInfo> {
        self.with_tiers(|t| {
            let mut statics: Vec<RouteInfo> = t.static_routes.iter().map(|r| r.info()).collect();
            statics.sort_by(|a, b| a.pattern.cmp(&b.pattern).then_with(|| a.method.cmp(&b.method)));
            statics.extend(t.dynamic_routes.iter().map(|r| r.info()));
            statics
        })
    }
}

impl<H> Default for RouteRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> std::fmt::Debug for RouteRegistry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteRegistry")
            .field("static_routes", &self.static_len())
            .field("dynamic_routes", &self.dynamic_len())
            .field("frozen", &self.is_frozen())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;
    use crate::params::Params;

    fn registry() -> RouteRegistry<&'static str> {
        RouteRegistry::new()
    }

    #[test]
    fn test_tiers_are_disjoint() {
        let registry = registry();
        registry.register(Method::GET, "/users", "list", &[]).unwrap();
        registry.register(Method::GET, "/users/:id", "get", &[]).unwrap();

        assert_eq!(registry.static_len(), 1);
        assert_eq!(registry.dynamic_len(), 1);
        assert_eq!(registry.len(), 2);

        let mut params = Params::new();
        assert!(registry.lookup_static(&Method::GET, "/users/:id").is_none());
        assert!(registry.match_dynamic(&Method::GET, "/users", &mut params).is_none());
    }

    #[test]
    fn test_wildcard_rejected() {
        let registry = registry();
        let err = registry.register(Method::GET, "/files/*path", "files", &[]).unwrap_err();
        assert!(matches!(err, RouterError::WildcardNotSupported { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_duplicate_rejected_in_both_tiers() {
        let registry = registry();
        registry.register(Method::GET, "/a", "a", &[]).unwrap();
        registry.register(Method::GET, "/a/:b", "ab", &[]).unwrap();
        assert!(matches!(
            registry.register(Method::GET, "/a/", "again", &[]),
            Err(RouterError::DuplicateRoute { .. })
        ));
        assert!(matches!(
            registry.register(Method::GET, "/a/:b", "again", &[]),
            Err(RouterError::DuplicateRoute { .. })
        ));
    }

    #[test]
    fn test_lookup_prefers_static() {
        let registry = registry();
        registry.register(Method::GET, "/users/me", "me", &[]).unwrap();
        registry.register(Method::GET, "/users/:id", "get", &[]).unwrap();

        let mut params = Params::new();
        let route = registry.lookup(&Method::GET, "/users/me", &mut params).unwrap();
        assert_eq!(*route.handlers(), "me");
        assert!(params.is_empty());

        let route = registry.lookup(&Method::GET, "/users/42", &mut params).unwrap();
        assert_eq!(*route.handlers(), "get");
        assert_eq!(params.get("id"), Some("42"));
    }

    #[test]
    fn test_constraint_failure_falls_through() {
        let registry = registry();
        registry
            .register(
                Method::GET,
                "/items/:id",
                "by_id",
                &[ParamConstraint::new("id", Constraint::int())],
            )
            .unwrap();
        registry.register(Method::GET, "/:kind/:slug", "generic", &[]).unwrap();

        let mut params = Params::new();
        let route = registry.match_dynamic(&Method::GET, "/items/abc", &mut params).unwrap();
        assert_eq!(*route.handlers(), "generic");
        assert_eq!(params.get("kind"), Some("items"));
        assert_eq!(params.get("slug"), Some("abc"));
    }

    #[test]
    fn test_remove_route() {
        let registry = registry();
        registry.register(Method::GET, "/a", "a", &[]).unwrap();
        registry.register(Method::GET, "/a/:b", "ab", &[]).unwrap();

        assert_eq!(*registry.remove_route(&Method::GET, "/a").unwrap().handlers(), "a");
        assert_eq!(*registry.remove_route(&Method::GET, "a/:b/").unwrap().handlers(), "ab");
        assert!(registry.is_empty());

        let err = registry.remove_route(&Method::GET, "/a").unwrap_err();
        assert!(matches!(err, RouterError::RouteNotFound { ref pattern, .. } if pattern == "/a"));
    }

    #[test]
    fn test_index_built_lazily_past_threshold() {
        let options = RegistryOptions {
            index_min_routes: 3,
            ..RegistryOptions::default()
        };
        let registry: RouteRegistry<usize> = RouteRegistry::with_options(options).unwrap();
        for i in 0..4 {
            registry.register(Method::GET, &format!("/r{i}/:id"), i, &[]).unwrap();
        }
        assert!(!registry.has_index());

        let mut params = Params::new();
        let route = registry.match_dynamic(&Method::GET, "/r2/x", &mut params).unwrap();
        assert_eq!(*route.handlers(), 2);
        assert!(registry.has_index());

        registry.register(Method::GET, "/r9/:id", 9, &[]).unwrap();
        assert!(!registry.has_index());
    }

    #[test]
    fn test_invalid_options() {
        let options = RegistryOptions {
            filter_bits: 0,
            ..RegistryOptions::default()
        };
        assert!(matches!(
            RouteRegistry::<()>::with_options(options),
            Err(RouterError::InvalidFilterSize)
        ));
    }

    #[test]
    fn test_freeze_is_one_way() {
        let registry = registry();
        registry.register(Method::GET, "/a", "a", &[]).unwrap();
        registry.register(Method::GET, "/b/:id", "b", &[]).unwrap();
        registry.freeze();
        registry.freeze();

        assert!(registry.is_frozen());
        assert!(matches!(
            registry.register(Method::GET, "/c", "c", &[]),
            Err(RouterError::Frozen)
        ));
        assert!(matches!(
            registry.remove_route(&Method::GET, "/a"),
            Err(RouterError::Frozen)
        ));

        let mut params = Params::new();
        assert!(registry.lookup_static(&Method::GET, "/a").is_some());
        assert!(registry.match_dynamic(&Method::GET, "/b/1", &mut params).is_some());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_freeze_builds_index() {
        let options = RegistryOptions {
            index_min_routes: 1,
            ..RegistryOptions::default()
        };
        let registry = RouteRegistry::with_options(options).unwrap();
        registry.register(Method::GET, "/a/:x", "a", &[]).unwrap();
        registry.register(Method::GET, "/b/:x", "b", &[]).unwrap();
        registry.freeze();
        assert!(registry.has_index());
    }

    #[test]
    fn test_routes_listing() {
        let registry = registry();
        registry.register(Method::POST, "/users", "create", &[]).unwrap();
        registry.register(Method::GET, "/users", "list", &[]).unwrap();
        registry.register(Method::GET, "/users/:id", "get", &[]).unwrap();

        let routes = registry.routes();
        let listed: Vec<(&str, &str)> = routes
            .iter()
            .map(|r| (r.method.as_str(), r.pattern.as_str()))
            .collect();
        assert_eq!(
            listed,
            [("GET", "/users"), ("POST", "/users"), ("GET", "/users/:id")]
        );
    }
}
