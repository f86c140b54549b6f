//! Request context types.
//!
//! The [`RequestContext`] carries per-request state from the server loop into
//! handlers. It is also the [`ParamSink`] the router writes path parameters
//! into, so a context can be reused across requests without reallocating
//! parameter storage.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use http::Method;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use velox_router::{CompiledRoute, ParamSink, Params, Router, INDEXED_PARAMS};

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which makes it ideal for request tracking
/// and log correlation.
///
/// # Example
///
/// ```
/// use velox_core::RequestId;
///
/// let id = RequestId::new();
/// println!("Request ID: {}", id);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID using UUID v7.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Creates a `RequestId` from an existing UUID, e.g. one taken from a
    /// request header.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<RequestId> for Uuid {
    fn from(id: RequestId) -> Self {
        id.0
    }
}

/// Per-request context.
///
/// Holds the request line, tracing identifiers, timing, the matched route
/// pattern and the extracted path parameters. The first
/// [`INDEXED_PARAMS`] parameters live in fixed slots whose string buffers
/// are reused between requests; any further ones go to an overflow map.
///
/// # Example
///
/// ```
/// use http::Method;
/// use velox_core::RequestContext;
/// use velox_router::Router;
///
/// let router = Router::new();
/// router.route(Method::GET, "/users/:id", "getUser", &[]).unwrap();
///
/// let mut ctx = RequestContext::for_request(Method::GET, "/users/42");
/// let route = ctx.resolve(&router).unwrap();
///
/// assert_eq!(*route.handlers(), "getUser");
/// assert_eq!(ctx.param("id"), Some("42"));
/// assert_eq!(ctx.route_pattern(), Some("/users/:id"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    method: Method,
    path: String,
    trace_id: Option<String>,
    span_id: Option<String>,
    route_pattern: Option<String>,
    slots: [(String, String); INDEXED_PARAMS],
    overflow: HashMap<String, String>,
    param_count: usize,
    started_at: Instant,
}

impl RequestContext {
    /// Creates a context for `GET /` with a fresh request ID.
    #[must_use]
    pub fn new() -> Self {
        Self::for_request(Method::GET, "/")
    }

    /// Creates a context for the given request line.
    #[must_use]
    pub fn for_request(method: Method, path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            path: path.into(),
            trace_id: None,
            span_id: None,
            route_pattern: None,
            slots: Default::default(),
            overflow: HashMap::new(),
            param_count: 0,
            started_at: Instant::now(),
        }
    }

    /// Prepares a used context for the next request.
    ///
    /// Assigns a new request ID, clears per-request state and keeps the
    /// parameter buffers.
    pub fn reset(&mut self, method: Method, path: &str) {
        self.request_id = RequestId::new();
        self.method = method;
        self.path.clear();
        self.path.push_str(path);
        self.trace_id = None;
        self.span_id = None;
        self.route_pattern = None;
        self.reset_params();
        self.started_at = Instant::now();
    }

    /// Looks up this request in `router`, storing parameters and the
    /// matched pattern in the context.
    ///
    /// Parameters of a previous match are cleared first, also on a miss.
    pub fn resolve<H>(&mut self, router: &Router<H>) -> Option<Arc<CompiledRoute<H>>> {
        self.route_pattern = None;
        self.reset_params();
        // Method and path are taken out so the context itself can act as the sink.
        let method = self.method.clone();
        let path = std::mem::take(&mut self.path);
        let route = router.lookup(&method, &path, self);
        self.path = path;

        let route = route?;
        self.route_pattern = Some(route.pattern().to_string());
        Some(route)
    }

    /// Returns the request ID.
    #[must_use]
    pub const fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns a new context with the specified request ID.
    #[must_use]
    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = request_id;
        self
    }

    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the trace ID if set.
    #[must_use]
    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Returns a new context with the specified trace ID.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    /// Returns the span ID if set.
    #[must_use]
    pub fn span_id(&self) -> Option<&str> {
        self.span_id.as_deref()
    }

    /// Returns a new context with the specified span ID.
    #[must_use]
    pub fn with_span_id(mut self, span_id: impl Into<String>) -> Self {
        self.span_id = Some(span_id.into());
        self
    }

    /// Pattern of the route matched by the last [`resolve`](Self::resolve).
    #[must_use]
    pub fn route_pattern(&self) -> Option<&str> {
        self.route_pattern.as_deref()
    }

    /// Returns a path parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.indexed()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
            .or_else(|| self.overflow.get(name).map(String::as_str))
    }

    /// Returns the parameter at `index` among the indexed slots.
    #[must_use]
    pub fn param_at(&self, index: usize) -> Option<(&str, &str)> {
        self.indexed()
            .get(index)
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of parameters of the last match.
    #[must_use]
    pub const fn param_count(&self) -> usize {
        self.param_count
    }

    /// Iterates over all parameters: indexed slots in path order, then
    /// overflow entries in arbitrary order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.indexed()
            .iter()
            .map(|(n, v)| (n.as_str(), v.as_str()))
            .chain(self.overflow.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }

    /// Copies the parameters into an owned [`Params`].
    #[must_use]
    pub fn to_params(&self) -> Params {
        self.params()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    /// Forgets all parameters, keeping buffers for reuse.
    pub fn reset_params(&mut self) {
        self.param_count = 0;
        self.overflow.clear();
    }

    /// Returns the elapsed time since the request started.
    #[must_use]
    pub fn elapsed(&self) -> std::time::Duration {
        self.started_at.elapsed()
    }

    fn indexed(&self) -> &[(String, String)] {
        &self.slots[..self.param_count.min(INDEXED_PARAMS)]
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ParamSink for RequestContext {
    fn set_param(&mut self, index: usize, name: &str, value: &str) {
        if index == 0 {
            self.overflow.clear();
        }
        let (slot_name, slot_value) = &mut self.slots[index];
        slot_name.clear();
        slot_name.push_str(name);
        slot_value.clear();
        slot_value.push_str(value);
    }

    fn set_param_overflow(&mut self, name: &str, value: &str) {
        self.overflow.insert(name.to_string(), value.to_string());
    }

    fn set_param_count(&mut self, count: usize) {
        if count == 0 {
            self.overflow.clear();
        }
        self.param_count = count;
    }
}
