//! # Velox Core
//!
//! Request-context layer for the Velox router.
//!
//! - [`RequestContext`] - Per-request state; the [`ParamSink`](velox_router::ParamSink)
//!   the router writes path parameters into
//! - [`RequestId`] - UUID v7 request identifier

#![doc(html_root_url = "https://docs.rs/velox-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;

pub use context::{RequestContext, RequestId};
