//! Unified error type.

use std::time::Duration;

use crate::render::RenderError;

/// Boxed error returned by a fetch hook.
pub type FetchError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type returned by prerender's fallible operations.
///
/// An unmatched route is not an error: the SSR stage passes the request on
/// and logs a warning. Everything here is either a configuration bug caught
/// at startup or a per-request fault that aborts the chain and surfaces as
/// `500 Internal Server Error` in [`Server`](crate::Server).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A route declares a data-fetch value that cannot be invoked.
    #[error("route handler for `{path}` must be a fetch hook, found {found}")]
    InvalidRouteHandler { path: String, found: String },

    #[error("invalid route `{path}`: {reason}")]
    InvalidRoute { path: String, reason: String },

    #[error("route `{path}` refers to unknown component `{component}`")]
    UnknownComponent { path: String, component: String },

    #[error("template does not contain placeholder `{0}`")]
    MissingPlaceholder(String),

    #[error("fetching initial state for `{path}` failed: {source}")]
    Fetch {
        path: String,
        #[source]
        source: FetchError,
    },

    #[error("fetching initial state for `{path}` timed out after {after:?}")]
    FetchTimeout { path: String, after: Duration },

    #[error("rendering `{location}` failed: {source}")]
    Render {
        location: String,
        #[source]
        source: RenderError,
    },

    #[error("config: {0}")]
    Config(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
