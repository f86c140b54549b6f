//! Parameterized route matching.
//!
//! Dynamic routes are kept in one list ordered by descending specificity
//! (number of literal segments, ties in insertion order). Once the list
//! grows past a threshold a first-segment index narrows each lookup to the
//! routes that can possibly match the path's first byte.

use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::compiled::{normalize_pattern, CompiledRoute, MAX_SEGMENTS};
use crate::error::{RouterError, RouterResult};
use crate::params::{write_param, ParamSink};

/// Dynamic sets larger than this get a first-segment index.
pub const DEFAULT_INDEX_MIN_ROUTES: usize = 10;

/// One bucket per ASCII byte.
const INDEX_BUCKETS: usize = 128;

/// First byte of the first segment, ignoring one leading `/`.
#[inline]
fn first_path_byte(path: &str) -> Option<u8> {
    path.strip_prefix('/')
        .unwrap_or(path)
        .as_bytes()
        .first()
        .copied()
}

impl<H> CompiledRoute<H> {
    /// Matches `path` against this route and writes the parameters to `sink`.
    ///
    /// Nothing is written unless the whole route matches. A missing leading
    /// `/` is tolerated; a trailing `/` adds an empty segment and therefore
    /// never matches. Parameter values must be non-empty and pass their
    /// constraint.
    pub fn match_and_extract<S: ParamSink + ?Sized>(&self, path: &str, sink: &mut S) -> bool {
        if self.has_wildcard() {
            return false;
        }
        if self.segment_count == 0 {
            if path.is_empty() || path == "/" {
                sink.set_param_count(0);
                return true;
            }
            return false;
        }
        if self.segment_count == 2 && self.param_positions == [1] {
            return self.match_literal_param(path, sink);
        }
        self.match_segments(path, sink)
    }

    /// `/literal/:param` without splitting the path.
    #[inline]
    fn match_literal_param<S: ParamSink + ?Sized>(&self, path: &str, sink: &mut S) -> bool {
        let rest = path.strip_prefix('/').unwrap_or(path);
        let literal = self.static_segments[0].as_str();

        if rest.len() < literal.len() + 2
            || !rest.starts_with(literal)
            || rest.as_bytes()[literal.len()] != b'/'
        {
            return false;
        }

        let value = &rest[literal.len() + 1..];
        if value.contains('/') {
            return false;
        }
        if let Some(constraint) = &self.constraints[0] {
            if !constraint.matches(value) {
                return false;
            }
        }

        write_param(sink, 0, &self.param_names[0], value);
        sink.set_param_count(1);
        true
    }

    fn match_segments<S: ParamSink + ?Sized>(&self, path: &str, sink: &mut S) -> bool {
        let count = self.segment_count;
        if path.len() < 2 * count - 1 {
            return false;
        }

        let rest = path.strip_prefix('/').unwrap_or(path);
        let mut segments: [&str; MAX_SEGMENTS] = [""; MAX_SEGMENTS];
        let mut found = 0;
        for segment in rest.split('/') {
            if found == count {
                return false;
            }
            segments[found] = segment;
            found += 1;
        }
        if found != count {
            return false;
        }

        for (literal, &position) in self.static_segments.iter().zip(&self.static_positions) {
            if segments[position] != literal.as_str() {
                return false;
            }
        }

        for (constraint, &position) in self.constraints.iter().zip(&self.param_positions) {
            let value = segments[position];
            if value.is_empty() {
                return false;
            }
            if let Some(constraint) = constraint {
                if !constraint.matches(value) {
                    return false;
                }
            }
        }

        for (index, (name, &position)) in self
            .param_names
            .iter()
            .zip(&self.param_positions)
            .enumerate()
        {
            write_param(sink, index, name, segments[position]);
        }
        sink.set_param_count(self.param_names.len());
        true
    }
}

/// First-byte buckets over the ordered dynamic list.
///
/// Each bucket holds, in specificity order, the routes whose first literal
/// starts with that byte plus every route whose first segment is a
/// parameter, so a bucket alone decides the match for its byte.
#[derive(Debug)]
struct FirstSegmentIndex<H> {
    buckets: Vec<Vec<Arc<CompiledRoute<H>>>>,
}

impl<H> FirstSegmentIndex<H> {
    fn build(routes: &[Arc<CompiledRoute<H>>]) -> Self {
        let mut buckets: Vec<Vec<Arc<CompiledRoute<H>>>> =
            (0..INDEX_BUCKETS).map(|_| Vec::new()).collect();

        for route in routes {
            if route.starts_with_param() {
                for bucket in &mut buckets {
                    bucket.push(Arc::clone(route));
                }
            } else if let Some(&byte) = route.static_segments.first().and_then(|s| s.as_bytes().first()) {
                if byte.is_ascii() {
                    buckets[usize::from(byte)].push(Arc::clone(route));
                }
            }
        }

        Self { buckets }
    }

    fn candidates(&self, byte: u8) -> &[Arc<CompiledRoute<H>>] {
        &self.buckets[usize::from(byte)]
    }
}

impl<H> Clone for FirstSegmentIndex<H> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets.clone(),
        }
    }
}

/// Ordered collection of parameterized routes.
#[derive(Debug)]
pub struct DynamicRoutes<H> {
    routes: Vec<Arc<CompiledRoute<H>>>,
    index: Option<FirstSegmentIndex<H>>,
    index_min_routes: usize,
}

impl<H> DynamicRoutes<H> {
    /// Creates an empty set that indexes itself past the default threshold.
    pub fn new() -> Self {
        Self::with_index_threshold(DEFAULT_INDEX_MIN_ROUTES)
    }

    /// Creates an empty set indexed once it holds more than `index_min_routes`.
    pub fn with_index_threshold(index_min_routes: usize) -> Self {
        Self {
            routes: Vec::new(),
            index: None,
            index_min_routes,
        }
    }

    /// Inserts a route after every route at least as specific.
    pub fn insert(&mut self, route: Arc<CompiledRoute<H>>) -> RouterResult<()> {
        if route.has_wildcard() {
            return Err(RouterError::WildcardNotSupported {
                pattern: route.pattern.clone(),
            });
        }
        if self
            .routes
            .iter()
            .any(|r| r.method == route.method && r.pattern == route.pattern)
        {
            return Err(RouterError::DuplicateRoute {
                method: route.method.to_string(),
                pattern: route.pattern.clone(),
            });
        }

        let specificity = route.static_segment_count();
        let position = self
            .routes
            .iter()
            .position(|r| r.static_segment_count() < specificity)
            .unwrap_or(self.routes.len());
        self.routes.insert(position, route);
        self.index = None;
        Ok(())
    }

    /// Removes the route for `(method, pattern)`, keeping the order of the rest.
    pub fn remove(&mut self, method: &Method, pattern: &str) -> Option<Arc<CompiledRoute<H>>> {
        let pattern = normalize_pattern(pattern);
        let position = self
            .routes
            .iter()
            .position(|r| r.method == *method && r.pattern == pattern)?;
        self.index = None;
        Some(self.routes.remove(position))
    }

    /// True when the set is large enough to index and has no index yet.
    pub fn needs_index(&self) -> bool {
        self.index.is_none() && self.routes.len() > self.index_min_routes
    }

    /// Builds the first-segment index from the current ordering.
    pub fn build_index(&mut self) {
        self.index = Some(FirstSegmentIndex::build(&self.routes));
        debug!(routes = self.routes.len(), "built first-segment index");
    }

    /// True when the first-segment index exists.
    pub fn has_index(&self) -> bool {
        self.index.is_some()
    }

    /// Finds the most specific route matching `(method, path)`.
    ///
    /// With an index, an ASCII first byte selects a single bucket and the
    /// result is final. Non-ASCII first bytes and unindexed sets scan the
    /// whole list.
    pub fn find<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<&Arc<CompiledRoute<H>>> {
        if let (Some(index), Some(byte)) = (&self.index, first_path_byte(path)) {
            if byte.is_ascii() {
                return index
                    .candidates(byte)
                    .iter()
                    .find(|r| r.method == *method && r.match_and_extract(path, sink));
            }
        }
        self.scan(method, path, sink)
    }

    /// Linear scan in specificity order, ignoring the index.
    pub fn scan<S: ParamSink + ?Sized>(
        &self,
        method: &Method,
        path: &str,
        sink: &mut S,
    ) -> Option<&Arc<CompiledRoute<H>>> {
        self.routes
            .iter()
            .find(|r| r.method == *method && r.match_and_extract(path, sink))
    }

    /// Routes in specificity order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<CompiledRoute<H>>> {
        self.routes.iter()
    }

    /// Number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True when no routes are stored.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<H> Clone for DynamicRoutes<H> {
    fn clone(&self) -> Self {
        Self {
            routes: self.routes.clone(),
            index: self.index.clone(),
            index_min_routes: self.index_min_routes,
        }
    }
}

impl<H> Default for DynamicRoutes<H> {
    fn default() -> Self {
        Self::new()
    }
}
