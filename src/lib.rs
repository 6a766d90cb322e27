//! # prerender
//!
//! Server-side rendering as one stage of an HTTP middleware chain.
//!
//! For every `GET` the SSR stage looks the path up in an ordered route
//! table. On a match it awaits the route's initial-state hook (if any),
//! hands the url and state to your [`Renderer`], splices the markup into
//! the page [`Template`] and answers. Everything else passes through to the
//! next stage: a [`Router`] with API endpoints and health checks, or the
//! chain's `404`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use prerender::middleware::{Chain, ssr::SsrHandler};
//! use prerender::{
//!     Component, RenderContext, RenderError, RenderRequest, RouteTable, Router,
//!     Server, Template, health,
//! };
//!
//! fn render(req: &RenderRequest<'_>, _ctx: &mut RenderContext) -> Result<String, RenderError> {
//!     Ok(format!("<div>{} at {}</div>", req.route.component().name(), req.location))
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), prerender::Error> {
//!     let routes = RouteTable::build([
//!         ("/", Component::new("Home")),
//!         ("/users/:id", Component::new("User").with_fetch(|| async {
//!             Ok::<_, prerender::FetchError>(serde_json::json!({ "name": "ada" }))
//!         })),
//!     ])?;
//!     routes.validate()?;
//!
//!     let ssr = SsrHandler::new(
//!         Arc::new(routes),
//!         Arc::new(Template::new("<html><body>#MARKUP#</body></html>")?),
//!         Arc::new(render),
//!     );
//!
//!     let chain = Chain::new()
//!         .then(ssr)
//!         .then(Router::new().get("/healthz", health::liveness));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(chain).await
//! }
//! ```

mod component;
mod error;
mod handler;
mod method;
mod render;
mod request;
mod response;
mod router;
mod routes;
mod server;
mod template;

pub mod config;
pub mod health;
pub mod middleware;

pub use component::{Component, FetchCapability, FetchHook, Hooks, InitialState};
pub use config::Config;
pub use error::{Error, FetchError};
pub use handler::{BoxFuture, Handler};
pub use method::Method;
pub use render::{RenderContext, RenderError, RenderRequest, Renderer, StateBoundary};
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use routes::{RouteDescriptor, RouteMatch, RouteTable};
pub use server::{DEFAULT_MAX_BODY, Server};
pub use template::{DEFAULT_PLACEHOLDER, Template, TemplateProvider};
