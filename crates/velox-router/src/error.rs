//! Router error types.
//!
//! Only registration and construction can fail. Lookups never produce an
//! error: a miss is reported as `None`.

use thiserror::Error;

use crate::compiled::MAX_SEGMENTS;

/// Result type alias using [`RouterError`].
pub type RouterResult<T> = Result<T, RouterError>;

/// Errors that can occur while building or mutating a router.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Membership filter constructed with zero bits.
    #[error("membership filter size must be greater than zero")]
    InvalidFilterSize,

    /// Membership filter constructed without hash functions.
    #[error("membership filter needs at least one hash function")]
    InvalidHashCount,

    /// Pattern has more segments than the matcher supports.
    #[error("pattern {pattern} has {segments} segments (maximum is {max})", max = MAX_SEGMENTS)]
    TooManySegments {
        /// The offending pattern.
        pattern: String,
        /// Number of segments found.
        segments: usize,
    },

    /// A `:` segment without a name.
    #[error("pattern {pattern} contains a parameter without a name")]
    EmptyParamName {
        /// The offending pattern.
        pattern: String,
    },

    /// The same parameter name appears twice in one pattern.
    #[error("pattern {pattern} declares parameter {name} more than once")]
    DuplicateParam {
        /// The offending pattern.
        pattern: String,
        /// The repeated parameter name.
        name: String,
    },

    /// A regular-expression constraint failed to compile.
    #[error("invalid constraint pattern {pattern}")]
    InvalidConstraint {
        /// The pattern that failed to compile.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A route with the same method and pattern is already registered.
    #[error("route {method} {pattern} is already registered")]
    DuplicateRoute {
        /// HTTP method.
        method: String,
        /// Normalized pattern.
        pattern: String,
    },

    /// Two distinct static routes hash to the same identity.
    #[error("route {method} {pattern} collides with existing route {existing}")]
    HashCollision {
        /// HTTP method.
        method: String,
        /// Normalized pattern.
        pattern: String,
        /// Pattern of the route already holding the hash.
        existing: String,
    },

    /// Wildcard routes are served by the fallback tree, not the registry.
    #[error("wildcard route {pattern} cannot be stored in the route registry")]
    WildcardNotSupported {
        /// The wildcard pattern.
        pattern: String,
    },

    /// The router was frozen and no longer accepts changes.
    #[error("router is frozen; routes can no longer be added or removed")]
    Frozen,

    /// Removal of a route that is not registered.
    #[error("route {method} {pattern} is not registered")]
    RouteNotFound {
        /// HTTP method.
        method: String,
        /// Normalized pattern.
        pattern: String,
    },
}
