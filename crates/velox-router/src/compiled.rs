//! Route compilation.
//!
//! [`CompiledRoute::compile`] turns a `(method, pattern, handlers,
//! constraints)` tuple into an immutable record with the segment layout
//! worked out up front, so the matcher only does positional comparisons.

use http::Method;
use serde::Serialize;
use tracing::warn;

use crate::constraint::{Constraint, ConstraintKind, ParamConstraint};
use crate::error::{RouterError, RouterResult};
use crate::hash::route_hash;

/// Maximum number of segments in a matchable pattern.
///
/// The matcher splits request paths into a fixed array of this size; longer
/// patterns are rejected at registration.
pub const MAX_SEGMENTS: usize = 16;

/// Normalizes a path pattern.
///
/// Trims surrounding whitespace, collapses repeated slashes, guarantees a
/// leading `/` and drops a trailing one. The empty pattern becomes `/`.
///
/// ```rust
/// use velox_router::normalize_pattern;
///
/// assert_eq!(normalize_pattern(" users//:id/ "), "/users/:id");
/// assert_eq!(normalize_pattern(""), "/");
/// ```
pub fn normalize_pattern(pattern: &str) -> String {
    let trimmed = pattern.trim();
    let mut out = String::with_capacity(trimmed.len() + 1);
    for segment in trimmed.split('/').filter(|s| !s.is_empty()) {
        out.push('/');
        out.push_str(segment);
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

/// Returns the wildcard name when `segment` is a trailing wildcard segment.
pub(crate) fn wildcard_name(segment: &str) -> Option<&str> {
    let name = segment
        .strip_prefix('*')
        .or_else(|| segment.strip_suffix('*'))?;
    Some(if name.is_empty() { "*" } else { name })
}

/// An immutable, pre-analysed route.
///
/// `static_positions` and `param_positions` are strictly increasing and
/// together partition `0..segment_count`. For wildcard routes the layout
/// covers the segments before the wildcard; the fallback tree matches them
/// and checks the bound constraints through [`accepts`](Self::accepts).
#[derive(Debug, Clone)]
pub struct CompiledRoute<H> {
    pub(crate) method: Method,
    pub(crate) pattern: String,
    pub(crate) identity_hash: u64,
    pub(crate) segment_count: usize,
    pub(crate) static_segments: Vec<String>,
    pub(crate) static_positions: Vec<usize>,
    pub(crate) param_names: Vec<String>,
    pub(crate) param_positions: Vec<usize>,
    pub(crate) constraints: Vec<Option<Constraint>>,
    pub(crate) wildcard: Option<String>,
    pub(crate) handlers: H,
    pub(crate) is_static: bool,
    pub(crate) has_constraints: bool,
}

impl<H> CompiledRoute<H> {
    /// Compiles a route.
    ///
    /// Constraints are bound to parameters by name. A constraint naming a
    /// parameter the pattern does not declare is ignored with a warning.
    ///
    /// # Example
    ///
    /// ```rust
    /// use http::Method;
    /// use velox_router::{CompiledRoute, Constraint, ParamConstraint};
    ///
    /// let route = CompiledRoute::compile(
    ///     Method::GET,
    ///     "/users/:id/posts/:pid",
    ///     "getUserPost",
    ///     &[ParamConstraint::new("id", Constraint::int())],
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(route.segment_count(), 4);
    /// assert_eq!(route.param_names(), ["id", "pid"]);
    /// assert!(!route.is_static());
    /// ```
    pub fn compile(
        method: Method,
        pattern: &str,
        handlers: H,
        constraints: &[ParamConstraint],
    ) -> RouterResult<Self> {
        let pattern = normalize_pattern(pattern);
        let identity_hash = route_hash(method.as_str(), &pattern);

        let mut route = Self {
            method,
            pattern,
            identity_hash,
            segment_count: 0,
            static_segments: Vec::new(),
            static_positions: Vec::new(),
            param_names: Vec::new(),
            param_positions: Vec::new(),
            constraints: Vec::new(),
            wildcard: None,
            handlers,
            is_static: true,
            has_constraints: false,
        };

        if route.pattern == "/" {
            return Ok(route);
        }

        let segments: Vec<&str> = route.pattern[1..].split('/').collect();

        if segments.len() > MAX_SEGMENTS {
            return Err(RouterError::TooManySegments {
                pattern: route.pattern.clone(),
                segments: segments.len(),
            });
        }

        let wildcard = segments.last().copied().and_then(wildcard_name);
        let layout = if wildcard.is_some() {
            &segments[..segments.len() - 1]
        } else {
            &segments[..]
        };

        for (position, segment) in layout.iter().enumerate() {
            if let Some(name) = segment.strip_prefix(':') {
                if name.is_empty() {
                    return Err(RouterError::EmptyParamName {
                        pattern: route.pattern.clone(),
                    });
                }
                if route.param_names.iter().any(|n| n == name) {
                    return Err(RouterError::DuplicateParam {
                        pattern: route.pattern.clone(),
                        name: name.to_string(),
                    });
                }
                let constraint = constraints
                    .iter()
                    .find(|c| c.name == name)
                    .map(|c| c.constraint.clone());
                route.has_constraints |= constraint.is_some();
                route.param_names.push(name.to_string());
                route.param_positions.push(position);
                route.constraints.push(constraint);
            } else {
                route.static_segments.push((*segment).to_string());
                route.static_positions.push(position);
            }
        }

        if let Some(name) = wildcard {
            if route.param_names.iter().any(|n| n == name) {
                return Err(RouterError::DuplicateParam {
                    pattern: route.pattern.clone(),
                    name: name.to_string(),
                });
            }
            route.wildcard = Some(name.to_string());
        }

        for c in constraints {
            if !route.param_names.contains(&c.name) {
                warn!(
                    route.pattern = %route.pattern,
                    param = %c.name,
                    "constraint names a parameter the pattern does not declare"
                );
            }
        }

        route.segment_count = layout.len();
        route.is_static = route.param_names.is_empty() && route.wildcard.is_none();
        Ok(route)
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Normalized pattern.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// FNV-1a hash of method and pattern; the static-table key.
    pub fn identity_hash(&self) -> u64 {
        self.identity_hash
    }

    /// Number of `/`-delimited segments, zero for the root. Wildcard routes
    /// count only the segments before the wildcard.
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    /// Number of literal segments, the route's specificity.
    pub fn static_segment_count(&self) -> usize {
        self.static_segments.len()
    }

    /// Literal segments in path order.
    pub fn static_segments(&self) -> &[String] {
        &self.static_segments
    }

    /// Positions of the literal segments.
    pub fn static_positions(&self) -> &[usize] {
        &self.static_positions
    }

    /// Parameter names in path order.
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Positions of the parameter segments.
    pub fn param_positions(&self) -> &[usize] {
        &self.param_positions
    }

    /// Constraint bound to the `index`-th parameter, if any.
    pub fn constraint(&self, index: usize) -> Option<&Constraint> {
        self.constraints.get(index).and_then(Option::as_ref)
    }

    /// Name of the trailing wildcard, for wildcard routes.
    pub fn wildcard(&self) -> Option<&str> {
        self.wildcard.as_deref()
    }

    /// The handler chain registered with this route.
    pub fn handlers(&self) -> &H {
        &self.handlers
    }

    /// True when the pattern has no parameters and no wildcard.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// True when the pattern ends in a wildcard segment.
    pub fn has_wildcard(&self) -> bool {
        self.wildcard.is_some()
    }

    /// True when at least one parameter is constrained.
    pub fn has_constraints(&self) -> bool {
        self.has_constraints
    }

    /// True when every captured value passes the constraint bound to its
    /// parameter. Names without a parameter, such as the wildcard, pass.
    pub fn accepts(&self, captures: &[(&str, &str)]) -> bool {
        if !self.has_constraints {
            return true;
        }
        captures.iter().all(|(name, value)| {
            self.param_names
                .iter()
                .position(|n| n == name)
                .and_then(|i| self.constraints[i].as_ref())
                .map_or(true, |c| c.matches(value))
        })
    }

    /// True when the first segment is a parameter.
    pub(crate) fn starts_with_param(&self) -> bool {
        self.param_positions.first() == Some(&0)
    }

    /// Metadata view of the route for documentation consumers.
    pub fn info(&self) -> RouteInfo {
        let mut params: Vec<ParamInfo> = self
            .param_names
            .iter()
            .zip(&self.param_positions)
            .zip(&self.constraints)
            .map(|((name, &position), constraint)| ParamInfo {
                name: name.clone(),
                position,
                constraint: constraint.as_ref().map(Constraint::kind),
            })
            .collect();

        if let Some(name) = &self.wildcard {
            params.push(ParamInfo {
                name: name.clone(),
                position: self.segment_count,
                constraint: None,
            });
        }

        RouteInfo {
            method: self.method.to_string(),
            pattern: self.pattern.clone(),
            is_static: self.is_static,
            has_wildcard: self.has_wildcard(),
            params,
        }
    }
}

/// Serializable description of a registered route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    /// HTTP method.
    pub method: String,
    /// Normalized pattern.
    pub pattern: String,
    /// Whether the route has no parameters.
    pub is_static: bool,
    /// Whether the route ends in a wildcard.
    pub has_wildcard: bool,
    /// Parameters in path order.
    pub params: Vec<ParamInfo>,
}

/// Serializable description of one route parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamInfo {
    /// Parameter name.
    pub name: String,
    /// Segment position.
    pub position: usize,
    /// Constraint kind, if constrained.
    pub constraint: Option<ConstraintKind>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> CompiledRoute<()> {
        CompiledRoute::compile(Method::GET, pattern, (), &[]).unwrap()
    }

    #[test]
    fn test_normalize_pattern() {
        assert_eq!(normalize_pattern("/users"), "/users");
        assert_eq!(normalize_pattern("users/"), "/users");
        assert_eq!(normalize_pattern("  /a//b/  "), "/a/b");
        assert_eq!(normalize_pattern("   "), "/");
        assert_eq!(normalize_pattern("//"), "/");
    }

    #[test]
    fn test_compile_root() {
        for pattern in ["/", "", "  "] {
            let route = compile(pattern);
            assert_eq!(route.pattern(), "/");
            assert_eq!(route.segment_count(), 0);
            assert!(route.is_static());
            assert!(!route.has_wildcard());
        }
    }

    #[test]
    fn test_compile_static() {
        let route = compile("/api/v1/users");
        assert!(route.is_static());
        assert_eq!(route.segment_count(), 3);
        assert_eq!(route.static_segments(), ["api", "v1", "users"]);
        assert_eq!(route.static_positions(), [0, 1, 2]);
        assert!(route.param_names().is_empty());
    }

    #[test]
    fn test_compile_params_layout() {
        let route = compile("/users/:id/posts/:pid");
        assert!(!route.is_static());
        assert_eq!(route.segment_count(), 4);
        assert_eq!(route.static_segments(), ["users", "posts"]);
        assert_eq!(route.static_positions(), [0, 2]);
        assert_eq!(route.param_names(), ["id", "pid"]);
        assert_eq!(route.param_positions(), [1, 3]);
        assert!(!route.has_constraints());
    }

    #[test]
    fn test_positions_partition_segments() {
        let route = compile("/:a/b/:c/d/e/:f");
        let mut all: Vec<usize> = route
            .static_positions()
            .iter()
            .chain(route.param_positions())
            .copied()
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..route.segment_count()).collect::<Vec<_>>());
        assert!(route.starts_with_param());
    }

    #[test]
    fn test_compile_binds_constraints_by_name() {
        let route = CompiledRoute::compile(
            Method::GET,
            "/users/:id/posts/:pid",
            (),
            &[ParamConstraint::new("pid", Constraint::int())],
        )
        .unwrap();
        assert!(route.has_constraints());
        assert!(route.constraint(0).is_none());
        assert_eq!(route.constraint(1).map(Constraint::kind), Some(ConstraintKind::Int));
    }

    #[test]
    fn test_compile_ignores_unknown_constraint() {
        let route = CompiledRoute::compile(
            Method::GET,
            "/users/:id",
            (),
            &[ParamConstraint::new("other", Constraint::int())],
        )
        .unwrap();
        assert!(!route.has_constraints());
    }

    #[test]
    fn test_compile_wildcard() {
        let route = compile("/files/*path");
        assert!(route.has_wildcard());
        assert!(!route.is_static());
        assert_eq!(route.wildcard(), Some("path"));
        assert_eq!(route.segment_count(), 1);
        assert_eq!(route.static_segments(), ["files"]);

        let route = compile("/assets/*");
        assert_eq!(route.wildcard(), Some("*"));

        let route = compile("/assets/img*");
        assert_eq!(route.wildcard(), Some("img"));
    }

    #[test]
    fn test_compile_rejects_duplicate_params() {
        let err = CompiledRoute::compile(Method::GET, "/a/:id/b/:id", (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateParam { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_wildcard_route_validates_params() {
        let err = CompiledRoute::compile(Method::GET, "/a/:x/:x/*rest", (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateParam { ref name, .. } if name == "x"));

        let err = CompiledRoute::compile(Method::GET, "/a/:/*rest", (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::EmptyParamName { .. }));

        let err = CompiledRoute::compile(Method::GET, "/a/:rest/*rest", (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::DuplicateParam { ref name, .. } if name == "rest"));
    }

    #[test]
    fn test_wildcard_route_binds_constraints() {
        let route = CompiledRoute::compile(
            Method::GET,
            "/repos/:id/*path",
            (),
            &[ParamConstraint::new("id", Constraint::int())],
        )
        .unwrap();

        assert!(route.has_constraints());
        assert_eq!(route.param_names(), ["id"]);
        assert_eq!(route.param_positions(), [1]);
        assert!(route.constraint(0).is_some());

        assert!(route.accepts(&[("id", "42"), ("path", "src/lib.rs")]));
        assert!(!route.accepts(&[("id", "abc"), ("path", "src/lib.rs")]));
    }

    #[test]
    fn test_compile_rejects_empty_param() {
        let err = CompiledRoute::compile(Method::GET, "/a/:", (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::EmptyParamName { .. }));
    }

    #[test]
    fn test_compile_rejects_too_many_segments() {
        let deep = "/s".repeat(MAX_SEGMENTS + 1);
        let err = CompiledRoute::compile(Method::GET, &deep, (), &[]).unwrap_err();
        assert!(matches!(err, RouterError::TooManySegments { segments: 17, .. }));

        let max = "/s".repeat(MAX_SEGMENTS);
        assert!(CompiledRoute::compile(Method::GET, &max, (), &[]).is_ok());
    }

    #[test]
    fn test_identity_hash_reproducible() {
        let a = compile("/users/:id");
        let b = compile(" users/:id/ ");
        assert_eq!(a.identity_hash(), b.identity_hash());
        assert_eq!(a.identity_hash(), route_hash("GET", "/users/:id"));

        let post = CompiledRoute::compile(Method::POST, "/users/:id", (), &[]).unwrap();
        assert_ne!(a.identity_hash(), post.identity_hash());
    }

    #[test]
    fn test_route_info() {
        let route = CompiledRoute::compile(
            Method::DELETE,
            "/orgs/:org/users/:user",
            (),
            &[ParamConstraint::new("user", Constraint::uuid())],
        )
        .unwrap();
        let info = route.info();
        assert_eq!(info.method, "DELETE");
        assert_eq!(info.pattern, "/orgs/:org/users/:user");
        assert_eq!(info.params.len(), 2);
        assert_eq!(info.params[1].position, 3);
        assert_eq!(info.params[1].constraint, Some(ConstraintKind::Uuid));

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["params"][0]["name"], "org");
    }

    #[test]
    fn test_route_info_wildcard() {
        let info = compile("/files/*path").info();
        assert!(info.has_wildcard);
        assert_eq!(info.params.len(), 1);
        assert_eq!(info.params[0].name, "path");
        assert_eq!(info.params[0].position, 1);
    }
}
