//! High-level router API.
//!
//! [`Router`] fronts the three tiers: the static table, the dynamic matcher
//! and the wildcard fallback tree, tried in that order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use http::Method;
use parking_lot::RwLock;
use tracing::debug;

use crate::compiled::{normalize_pattern, wildcard_name, CompiledRoute, RouteInfo};
use crate::constraint::ParamConstraint;
use crate::error::{RouterError, RouterResult};
use crate::node::Node;
use crate::params::{ParamSink, Params};
use crate::registry::{RegistryOptions, RouteRegistry};

/// A matched route with its extracted parameters.
#[derive(Debug)]
pub struct RouteMatch<H> {
    /// The matched route.
    pub route: Arc<CompiledRoute<H>>,
    /// Extracted path parameters.
    pub params: Params,
}

impl<H> RouteMatch<H> {
    /// The handler chain of the matched route.
    pub fn handlers(&self) -> &H {
        self.route.handlers()
    }
}

/// Thread-safe HTTP router.
///
/// All methods take `&self`; share the router behind an `Arc` and register
/// routes from any thread. Call [`freeze`](Self::freeze) once registration is
/// complete to make lookups lock-free.
///
/// # Example
///
/// ```rust
/// use http::Method;
/// use velox_router::{Constraint, ParamConstraint, Router};
///
/// let router = Router::new();
/// router.route(Method::GET, "/users", "listUsers", &[]).unwrap();
/// router
///     .route(
///         Method::GET,
///         "/users/:id",
///         "getUser",
///         &[ParamConstraint::new("id", Constraint::int())],
///     )
///     .unwrap();
/// router.route(Method::GET, "/files/*path", "serveFile", &[]).unwrap();
/// router.freeze();
///
/// let m = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(*m.handlers(), "getUser");
/// assert_eq!(m.params.get("id"), Some("123"));
///
/// let m = router.match_route(&Method::GET, "/files/a/b.txt").unwrap();
/// assert_eq!(m.params.get("path"), Some("a/b.txt"));
///
/// assert!(router.match_route(&Method::GET, "/users/abc").is_none());
/// ```
///
/// # Route Priority
///
/// 1. **Static routes**, by exact path
/// 2. **Parameterized routes**, most literal segments first
/// 3. **Wildcard routes** (e.g., `/files/*path`)
pub struct Router<H> {
    registry: RouteRegistry<H>,
    wildcards: RwLock<Node<Arc<CompiledRoute<H>>>>,
    frozen_wildcards: OnceLock<Node<Arc<CompiledRoute<H>>>>,
    wildcard_count: AtomicUsize,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::from_registry(RouteRegistry::new())
    }

    /// Creates a router with custom registry tuning.
    ///
    /// # Errors
    ///
    /// Fails when the filter options are invalid.
    pub fn with_options(options: RegistryOptions) -> RouterResult<Self> {
        Ok(Self::from_registry(RouteRegistry::with_options(options)?))
    }

    fn from_registry(registry: RouteRegistry<H>) -> Self {
        Self {
            registry,
            wildcards: RwLock::new(Node::root()),
            frozen_wildcards: OnceLock::new(),
            wildcard_count: AtomicUsize::new(0),
        }
    }

    /// Compiles and registers a route.
    ///
    /// Returns the compiled route, which can later be passed back to
    /// [`remove`](Self::remove) by method and pattern.
    ///
    /// # Errors
    ///
    /// Fails on invalid patterns, duplicate routes, and after
    /// [`freeze`](Self::freeze).
    pub fn route(
        &self,
        method: Method,
        pattern: &str,
        handlers: H,
        constraints: &[ParamConstraint],
    ) -> RouterResult<Arc<CompiledRoute<H>>> {
        let route = Arc::new(CompiledRoute::compile(method, pattern, handlers, constraints)?);

        if !route.has_wildcard() {
            self.registry.add_route(Arc::clone(&route))?;
            return Ok(route);
        }

        let mut tree = self.wildcards.write();
        if self.registry.is_frozen() {
            return Err(RouterError::Frozen);
        }
        tree.insert(&route.pattern, route.method.clone(), Arc::clone(&route))
            .map_err(|rejected| RouterError::DuplicateRoute {
                method: rejected.method.to_string(),
                pattern: rejected.pattern.clone(),
            })?;
        self.wildcard_count.fetch_add(1, Ordering::Release);
        debug!(
            route.method = %route.method,
            route.pattern = %route.pattern,
            tier = "wildcard",
            "route registered"
        );
        Ok(route)
    }

    /// Removes a route by method and pattern.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::RouteNotFound`] when nothing matches and
    /// [`RouterError::Frozen`] after freezing.
    pub fn remove(&self, method: &Method, pattern: &str) -> RouterResult<Arc<CompiledRoute<H>>> {
        let pattern = normalize_pattern(pattern);
        let is_wildcard = pattern.rsplit('/').next().and_then(wildcard_name).is_some();
        if !is_wildcard {
            return self.registry.remove_route(method, &pattern);
        }

        let mut tree = self.wildcards.write();
        if self.registry.is_frozen() {
            return Err(RouterError::Frozen);
        }
        let route = tree
            .remove(&pattern, method)
            .ok_or_else(|| RouterError::RouteNotFound {
                method: method.to_string(),
                pattern: pattern.clone(),
            })?;
        self.wildcard_count.fetch_sub(1, Ordering::Release);
        debug!(route.method = %method, route.pattern = %pattern, "route removed");
        Ok(route)
    }

    /// Finds the route for `(method, path)`, writing parameters to `sink`.
    ///
    /// The leading `/` is optional in every tier. A miss leaves the sink
    /// untouched.
    #[inline]
    pub fn lookup<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<Arc<CompiledRoute<H>>> {
        if let Some(route) = self.registry.lookup(method, path, sink) {
            return Some(route);
        }
        if let Some(tree) = self.frozen_wildcards.get() {
            return Self::match_wildcard(tree, method, path, sink);
        }
        if self.wildcard_count.load(Ordering::Acquire) == 0 {
            return None;
        }
        Self::match_wildcard(&self.wildcards.read(), method, path, sink)
    }

    fn match_wildcard<S: ParamSink + ?Sized>(
        tree: &Node<Arc<CompiledRoute<H>>>,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<Arc<CompiledRoute<H>>> {
        tree.match_path_where(method, path, sink, |route, captures| route.accepts(captures))
            .cloned()
    }

    /// Convenience wrapper around [`lookup`](Self::lookup) collecting
    /// parameters into a fresh [`Params`].
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch<H>> {
        let mut params = Params::new();
        let route = self.lookup(method, path, &mut params)?;
        Some(RouteMatch { route, params })
    }

    /// Rejects all further registration and removal.
    ///
    /// Every tier is published as an immutable snapshot, so lookups on a
    /// frozen router take no lock.
    pub fn freeze(&self) {
        let tree = self.wildcards.write();
        if self.registry.is_frozen() {
            return;
        }
        let _ = self.frozen_wildcards.set(tree.clone());
        self.registry.freeze();
    }

    /// True once [`freeze`](Self::freeze) has been called.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.registry.is_frozen()
    }

    /// Metadata for every registered route: static, then dynamic in
    /// specificity order, then wildcard routes sorted by pattern.
    #[must_use]
    pub fn routes(&self) -> Vec<RouteInfo> {
        let mut routes = self.registry.routes();
        let mut wildcards: Vec<RouteInfo> = match self.frozen_wildcards.get() {
            Some(tree) => tree.values().into_iter().map(|r| r.info()).collect(),
            None => self.wildcards.read().values().into_iter().map(|r| r.info()).collect(),
        };
        wildcards.sort_by(|a, b| a.pattern.cmp(&b.pattern).then_with(|| a.method.cmp(&b.method)));
        routes.extend(wildcards);
        routes
    }

    /// The underlying static/dynamic registry.
    #[must_use]
    pub fn registry(&self) -> &RouteRegistry<H> {
        &self.registry
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.len() + self.wildcard_count.load(Ordering::Acquire)
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<H> std::fmt::Debug for Router<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("registry", &self.registry)
            .field("wildcard_routes", &self.wildcard_count.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Constraint;

    fn router() -> Router<&'static str> {
        let router = Router::new();
        router.route(Method::GET, "/", "index", &[]).unwrap();
        router.route(Method::GET, "/users", "listUsers", &[]).unwrap();
        router.route(Method::POST, "/users", "createUser", &[]).unwrap();
        router.route(Method::GET, "/users/me", "currentUser", &[]).unwrap();
        router.route(Method::GET, "/users/:id", "getUser", &[]).unwrap();
        router
            .route(Method::GET, "/orgs/:orgId/users/:userId", "getOrgUser", &[])
            .unwrap();
        router.route(Method::GET, "/files/*path", "serveFile", &[]).unwrap();
        router
    }

    #[test]
    fn test_router_new() {
        let router: Router<()> = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_len_counts_all_tiers() {
        let router = router();
        assert_eq!(router.len(), 7);
        assert_eq!(router.registry().static_len(), 4);
        assert_eq!(router.registry().dynamic_len(), 2);
    }

    #[test]
    fn test_router_match_static() {
        let router = router();
        let m = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(*m.handlers(), "listUsers");
        assert!(m.params.is_empty());

        let m = router.match_route(&Method::POST, "/users").unwrap();
        assert_eq!(*m.handlers(), "createUser");
        assert!(router.match_route(&Method::DELETE, "/users").is_none());
    }

    #[test]
    fn test_router_root() {
        let router = router();
        assert_eq!(*router.match_route(&Method::GET, "/").unwrap().handlers(), "index");
        assert_eq!(*router.match_route(&Method::GET, "").unwrap().handlers(), "index");
    }

    #[test]
    fn test_router_static_beats_param() {
        let router = router();
        assert_eq!(*router.match_route(&Method::GET, "/users/me").unwrap().handlers(), "currentUser");

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(*m.handlers(), "getUser");
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_router_multiple_params() {
        let m = router()
            .match_route(&Method::GET, "/orgs/acme/users/123")
            .unwrap();
        assert_eq!(*m.handlers(), "getOrgUser");
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("userId"), Some("123"));
    }

    #[test]
    fn test_router_match_wildcard() {
        let m = router()
            .match_route(&Method::GET, "/files/images/logo.png")
            .unwrap();
        assert_eq!(*m.handlers(), "serveFile");
        assert_eq!(m.params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_router_no_match() {
        let router = router();
        assert!(router.match_route(&Method::GET, "/posts").is_none());
        assert!(router.match_route(&Method::GET, "/users/1/extra").is_none());
    }

    #[test]
    fn test_router_miss_leaves_sink_untouched() {
        let router = router();
        let mut params = Params::new();
        params.push("keep", "me");
        assert!(router.lookup(&Method::GET, "/nothing/here/at/all/x", &mut params).is_none());
        assert_eq!(params.get("keep"), Some("me"));
    }

    #[test]
    fn test_router_constraint_falls_back_to_wildcard() {
        let router = Router::new();
        router
            .route(
                Method::GET,
                "/docs/:version",
                "versioned",
                &[ParamConstraint::new("version", Constraint::one_of(["v1", "v2"]))],
            )
            .unwrap();
        router.route(Method::GET, "/docs/*page", "page", &[]).unwrap();

        assert_eq!(*router.match_route(&Method::GET, "/docs/v1").unwrap().handlers(), "versioned");
        let m = router.match_route(&Method::GET, "/docs/intro").unwrap();
        assert_eq!(*m.handlers(), "page");
        assert_eq!(m.params.get("page"), Some("intro"));
    }

    #[test]
    fn test_router_wildcard_honors_constraints() {
        let router = Router::new();
        router
            .route(
                Method::GET,
                "/repos/:id/*path",
                "repoById",
                &[ParamConstraint::new("id", Constraint::int())],
            )
            .unwrap();

        assert!(router.match_route(&Method::GET, "/repos/abc/src/lib.rs").is_none());
        let m = router.match_route(&Method::GET, "/repos/42/src/lib.rs").unwrap();
        assert_eq!(*m.handlers(), "repoById");
        assert_eq!(m.params.get("id"), Some("42"));
        assert_eq!(m.params.get("path"), Some("src/lib.rs"));

        router.route(Method::GET, "/repos/:name/*path", "repoByName", &[]).unwrap();
        let m = router.match_route(&Method::GET, "/repos/abc/src/lib.rs").unwrap();
        assert_eq!(*m.handlers(), "repoByName");
        assert_eq!(m.params.get("name"), Some("abc"));
        assert_eq!(m.params.get("id"), None);
        assert_eq!(*router.match_route(&Method::GET, "/repos/7/x").unwrap().handlers(), "repoById");
    }

    #[test]
    fn test_router_wildcard_rejects_bad_params() {
        let router: Router<&str> = Router::new();
        assert!(matches!(
            router.route(Method::GET, "/a/:x/:x/*rest", "dup", &[]),
            Err(RouterError::DuplicateParam { .. })
        ));
        assert!(matches!(
            router.route(Method::GET, "/a/:/*rest", "empty", &[]),
            Err(RouterError::EmptyParamName { .. })
        ));
        assert!(matches!(
            router.route(Method::GET, "/a/:rest/*rest", "clash", &[]),
            Err(RouterError::DuplicateParam { .. })
        ));
        assert!(router.is_empty());
    }

    #[test]
    fn test_router_leading_slash_optional() {
        let router = router();
        assert_eq!(*router.match_route(&Method::GET, "users").unwrap().handlers(), "listUsers");
        assert_eq!(*router.match_route(&Method::GET, "users/me").unwrap().handlers(), "currentUser");
        assert_eq!(*router.match_route(&Method::GET, "users/1").unwrap().handlers(), "getUser");
        assert_eq!(*router.match_route(&Method::GET, "files/a.txt").unwrap().handlers(), "serveFile");
    }

    #[test]
    fn test_router_duplicate_wildcard() {
        let router = router();
        let err = router.route(Method::GET, "/files/*path/", "again", &[]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));
        assert!(router.route(Method::HEAD, "/files/*path", "head", &[]).is_ok());
    }

    #[test]
    fn test_router_remove() {
        let router = router();
        assert_eq!(*router.remove(&Method::GET, "/files/*path").unwrap().handlers(), "serveFile");
        assert_eq!(*router.remove(&Method::GET, "/users/:id").unwrap().handlers(), "getUser");
        assert!(router.match_route(&Method::GET, "/files/a").is_none());
        assert!(router.match_route(&Method::GET, "/users/1").is_none());
        assert_eq!(router.len(), 5);

        assert!(matches!(
            router.remove(&Method::GET, "/files/*path"),
            Err(RouterError::RouteNotFound { .. })
        ));
    }

    #[test]
    fn test_router_freeze() {
        let router = router();
        router.freeze();
        assert!(router.is_frozen());
        assert!(matches!(
            router.route(Method::GET, "/new", "new", &[]),
            Err(RouterError::Frozen)
        ));
        assert!(matches!(
            router.route(Method::GET, "/new/*rest", "new", &[]),
            Err(RouterError::Frozen)
        ));
        assert!(matches!(
            router.remove(&Method::GET, "/files/*path"),
            Err(RouterError::Frozen)
        ));
        assert!(router.match_route(&Method::GET, "/users/9").is_some());
        let m = router.match_route(&Method::GET, "/files/x/y").unwrap();
        assert_eq!(m.params.get("path"), Some("x/y"));
        assert_eq!(router.routes().len(), 7);
    }

    #[test]
    fn test_router_routes_listing() {
        let routes = router().routes();
        assert_eq!(routes.len(), 7);
        assert_eq!(routes[0].pattern, "/");
        let last = routes.last().unwrap();
        assert_eq!(last.pattern, "/files/*path");
        assert!(last.has_wildcard);
        assert_eq!(routes[5].pattern, "/users/:id");
    }

    #[test]
    fn test_router_with_options() {
        let options = RegistryOptions {
            filter_hashes: 0,
            ..RegistryOptions::default()
        };
        assert!(matches!(
            Router::<()>::with_options(options),
            Err(RouterError::InvalidHashCount)
        ));
    }
}
