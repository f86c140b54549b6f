//! Three-tier HTTP route matching engine for Velox.
//!
//! Given an HTTP method and a request path, the engine finds the registered
//! route that should handle it and extracts named path parameters.
//!
//! # Features
//!
//! - **Static routes**: one FNV-1a hash lookup, fronted by a membership filter
//!   that rejects unknown paths before touching the map
//! - **Parameterized routes**: `/users/:id` patterns matched positionally in
//!   specificity order, narrowed by a first-segment index on large sets
//! - **Constraints**: integer, float, UUID, regex, enumerated, date, date-time
//!   and custom predicates per parameter
//! - **Wildcard fallback**: `/files/*path` routes served by a radix tree
//! - **Caller-owned parameters**: matches write into any [`ParamSink`]
//! - **Freeze**: lock-free lookups once registration is complete
//!
//! # Example
//!
//! ```rust
//! use http::Method;
//! use velox_router::{Params, Router};
//!
//! let router = Router::new();
//! router.route(Method::GET, "/users", "listUsers", &[]).unwrap();
//! router.route(Method::GET, "/users/:id/posts/:pid", "getPost", &[]).unwrap();
//! router.freeze();
//!
//! let mut params = Params::new();
//! let route = router.lookup(&Method::GET, "/users/42/posts/7", &mut params).unwrap();
//!
//! assert_eq!(*route.handlers(), "getPost");
//! assert_eq!(params.get("id"), Some("42"));
//! assert_eq!(params.get("pid"), Some("7"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!   lookup(method, path)
//!          │
//!          ▼
//!   ┌──────────────┐  hit
//!   │ static table │──────────► route
//!   │  + filter    │
//!   └──────┬───────┘
//!          │ miss
//!          ▼
//!   ┌──────────────┐  hit
//!   │ dynamic list │──────────► route + params
//!   │  + index     │
//!   └──────┬───────┘
//!          │ miss
//!          ▼
//!   ┌──────────────┐  hit
//!   │ wildcard     │──────────► route + params
//!   │ radix tree   │
//!   └──────────────┘
//! ```

mod compiled;
mod constraint;
mod dynamic;
mod error;
mod filter;
mod hash;
mod method_router;
mod node;
mod params;
mod registry;
mod router;
mod static_table;

pub use compiled::{normalize_pattern, CompiledRoute, ParamInfo, RouteInfo, MAX_SEGMENTS};
pub use constraint::{Constraint, ConstraintKind, ParamConstraint};
pub use dynamic::{DynamicRoutes, DEFAULT_INDEX_MIN_ROUTES};
pub use error::{RouterError, RouterResult};
pub use filter::{MembershipFilter, DEFAULT_FILTER_BITS, DEFAULT_FILTER_HASHES};
pub use hash::{fnv1a, route_hash};
pub use method_router::MethodRouter;
pub use node::{Node, SegmentKind};
pub use params::{ParamSink, Params, INDEXED_PARAMS};
pub use registry::{RegistryOptions, RouteRegistry};
pub use router::{RouteMatch, Router};
pub use static_table::{StaticRouteTable, DEFAULT_FILTER_MIN_ROUTES};
