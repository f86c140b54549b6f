//! Building a [`Router`] from configuration.

use http::Method;
use tracing::info;
use velox_config::VeloxConfig;
use velox_router::{ParamConstraint, Router};

use crate::error::Result;

/// Registers routes on a configured router and applies startup policy.
///
/// ```
/// use velox::http::Method;
/// use velox::{RouterBuilder, VeloxConfig};
///
/// let router = RouterBuilder::from_config(&VeloxConfig::production())?
///     .route(Method::GET, "/health", "health")?
///     .route(Method::GET, "/users/:id", "user")?
///     .build();
///
/// assert!(router.is_frozen());
/// # Ok::<(), velox::Error>(())
/// ```
#[derive(Debug)]
pub struct RouterBuilder<H> {
    router: Router<H>,
    freeze_on_start: bool,
}

impl<H> RouterBuilder<H> {
    /// A builder using the router section of `config`.
    ///
    /// # Errors
    ///
    /// Fails when the filter settings are rejected.
    pub fn from_config(config: &VeloxConfig) -> Result<Self> {
        Ok(Self {
            router: Router::with_options(config.router.registry_options())?,
            freeze_on_start: config.router.freeze_on_start,
        })
    }

    /// Registers an unconstrained route.
    ///
    /// # Errors
    ///
    /// Fails on an invalid pattern or a duplicate route.
    pub fn route(self, method: Method, pattern: &str, handlers: H) -> Result<Self> {
        self.route_with(method, pattern, handlers, &[])
    }

    /// Registers a route whose parameters carry constraints.
    ///
    /// # Errors
    ///
    /// Fails on an invalid pattern or a duplicate route.
    pub fn route_with(
        self,
        method: Method,
        pattern: &str,
        handlers: H,
        constraints: &[ParamConstraint],
    ) -> Result<Self> {
        self.router.route(method, pattern, handlers, constraints)?;
        Ok(self)
    }

    /// Finishes registration, freezing the router if configured to.
    pub fn build(self) -> Router<H> {
        if self.freeze_on_start {
            self.router.freeze();
        }
        info!(
            routes = self.router.len(),
            frozen = self.router.is_frozen(),
            "router ready"
        );
        self.router
    }
}
