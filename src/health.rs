//! Health-check handlers for orchestrator liveness and readiness checks.
//!
//! Mount them on a [`Router`](crate::Router) behind the SSR stage. Health
//! paths are not in the SSR route table, so the SSR stage passes them on.
//!
//! ```rust,no_run
//! use prerender::{Router, health};
//!
//! let checks = Router::new()
//!     .get("/healthz", health::liveness)
//!     .get("/readyz", health::readiness);
//! ```

use crate::{Request, Response};

/// Always `200 OK` with body `"ok"`.
pub async fn liveness(_req: Request) -> Response {
    Response::text("ok")
}

/// `200 OK` with body `"ready"`. Routes and template are loaded before the
/// server binds, so a listening process is ready.
pub async fn readiness(_req: Request) -> Response {
    Response::text("ready")
}
