//! Exact-match table for routes without parameters.

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;

use crate::compiled::{normalize_pattern, CompiledRoute};
use crate::error::{RouterError, RouterResult};
use crate::filter::MembershipFilter;
use crate::hash::{fnv1a_extend, route_hash};

/// Tables smaller than this skip the filter and go straight to the map.
pub const DEFAULT_FILTER_MIN_ROUTES: usize = 10;

/// Static routes keyed by identity hash, fronted by a membership filter.
///
/// The hash of `method + path` is computed once per lookup and used both to
/// probe the filter and as the map key. Filter bits are never cleared on
/// removal; a stale positive just falls through to the map.
#[derive(Debug)]
pub struct StaticRouteTable<H> {
    routes: HashMap<u64, Arc<CompiledRoute<H>>>,
    filter: MembershipFilter,
    filter_min_routes: usize,
}

impl<H> StaticRouteTable<H> {
    /// Creates an empty table with default filter settings.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            filter: MembershipFilter::default(),
            filter_min_routes: DEFAULT_FILTER_MIN_ROUTES,
        }
    }

    /// Creates an empty table with the given filter.
    pub fn with_filter(filter: MembershipFilter, filter_min_routes: usize) -> Self {
        Self {
            routes: HashMap::new(),
            filter,
            filter_min_routes,
        }
    }

    /// Inserts a static route.
    pub fn add(&mut self, route: Arc<CompiledRoute<H>>) -> RouterResult<()> {
        if let Some(existing) = self.routes.get(&route.identity_hash) {
            if existing.method == route.method && existing.pattern == route.pattern {
                return Err(RouterError::DuplicateRoute {
                    method: route.method.to_string(),
                    pattern: route.pattern.clone(),
                });
            }
            return Err(RouterError::HashCollision {
                method: route.method.to_string(),
                pattern: route.pattern.clone(),
                existing: existing.pattern.clone(),
            });
        }

        self.filter.add_hash(route.identity_hash);
        self.routes.insert(route.identity_hash, route);
        Ok(())
    }

    /// Removes the route registered for `(method, pattern)`.
    pub fn remove(&mut self, method: &Method, pattern: &str) -> Option<Arc<CompiledRoute<H>>> {
        let pattern = normalize_pattern(pattern);
        let hash = route_hash(method.as_str(), &pattern);
        match self.routes.get(&hash) {
            Some(route) if route.method == *method && route.pattern == pattern => {
                self.routes.remove(&hash)
            }
            _ => None,
        }
    }

    /// Looks up the route for an exact request path.
    ///
    /// The leading `/` is optional, as in the dynamic matcher, so the empty
    /// path is the root.
    #[inline]
    pub fn lookup(&self, method: &Method, path: &str) -> Option<&Arc<CompiledRoute<H>>> {
        if self.routes.is_empty() {
            return None;
        }

        let rest = path.strip_prefix('/').unwrap_or(path);
        let hash = fnv1a_extend(route_hash(method.as_str(), "/"), rest.as_bytes());

        if self.routes.len() >= self.filter_min_routes
            && !self.filter.test_with_precomputed_hash(hash)
        {
            return None;
        }

        self.routes
            .get(&hash)
            .filter(|route| route.method == *method && route.pattern[1..] == *rest)
    }

    /// Iterates over the stored routes in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRoute<H>>> {
        self.routes.values()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when the table holds no routes.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Clone for StaticRouteTable<H> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            filter: self.filter.clone(),
            filter_min_routes: self.filter_min_routes,
        }
    }
}

impl<H> Default for StaticRouteTable<H> {
    fn default() -> Self {
        Self::new()
    }
}
