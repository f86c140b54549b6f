//! # Velox
//!
//! **Three-tier HTTP route matching**
//!
//! Velox resolves `(method, path)` to a registered handler value and writes
//! the extracted path parameters into a caller-provided sink:
//!
//! ```text
//! lookup ─► static table ──hit──► handler
//!             │ miss (filter or map)
//!             ▼
//!           dynamic routes (specificity order, first-byte index) ──hit──► handler + params
//!             │ miss
//!             ▼
//!           wildcard tree ──hit──► handler + remainder
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use velox::prelude::*;
//!
//! let config = ConfigLoader::new().with_production().load()?;
//! velox::init_logging(&config).ok();
//!
//! let router = RouterBuilder::from_config(&config)?
//!     .route(Method::GET, "/users/:id", "get_user")?
//!     .route(Method::GET, "/static/*path", "assets")?
//!     .build();
//!
//! let mut ctx = RequestContext::for_request(Method::GET, "/users/42");
//! let route = ctx.resolve(&router).expect("route");
//! assert_eq!(*route.handlers(), "get_user");
//! assert_eq!(ctx.param("id"), Some("42"));
//! # Ok::<(), velox::Error>(())
//! ```

#![doc(html_root_url = "https://docs.rs/velox/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod builder;
mod error;

pub use builder::RouterBuilder;
pub use error::{Error, Result};

// Re-export HTTP types
pub use http;

// Re-export request context types
pub use velox_core as core;

// Re-export router types
pub use velox_router as router;

// Re-export configuration types
pub use velox_config as config;
pub use velox_config::{ConfigLoader, VeloxConfig};

// Re-export telemetry types
pub use velox_telemetry as telemetry;

/// Installs the global log subscriber described by `config.logging`.
///
/// # Errors
///
/// Fails on an invalid filter or when a subscriber is already installed.
pub fn init_logging(config: &VeloxConfig) -> Result<()> {
    velox_telemetry::init_logging(&config.logging.to_log_config())?;
    Ok(())
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use velox::prelude::*;
/// ```
pub mod prelude {
    pub use http::Method;

    pub use crate::{Error, RouterBuilder};

    pub use velox_core::{RequestContext, RequestId};

    pub use velox_router::{
        CompiledRoute, Constraint, ParamConstraint, ParamSink, Params, RouteInfo, RouteMatch,
        Router, RouterError,
    };

    pub use velox_config::{ConfigError, ConfigLoader, VeloxConfig};

    pub use velox_telemetry::LogConfig;
}
