//! Server-side rendering stage.
//!
//! For a GET whose path matches the route table: fetch the route's initial
//! state if it has a hook, render the tree at the request url, splice the
//! markup into the page template and answer with it. Any other request
//! passes through untouched.
//!
//! Render and fetch failures are not caught here. They abort the chain and
//! the server turns them into a `500`.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::component::{FetchCapability, FetchHook, InitialState};
use crate::error::Error;
use crate::handler::BoxFuture;
use crate::method::Method;
use crate::middleware::{Middleware, Outcome};
use crate::render::{RenderContext, RenderRequest, Renderer, StateBoundary};
use crate::request::Request;
use crate::response::Response;
use crate::routes::RouteTable;
use crate::template::TemplateProvider;

/// The SSR middleware stage.
///
/// Cheap to clone: the route table, template and renderer are shared.
#[derive(Clone)]
pub struct SsrHandler {
    routes: Arc<RouteTable>,
    template: Arc<dyn TemplateProvider>,
    renderer: Arc<dyn Renderer>,
    fetch_timeout: Option<Duration>,
}

impl SsrHandler {
    pub fn new(
        routes: Arc<RouteTable>,
        template: Arc<dyn TemplateProvider>,
        renderer: Arc<dyn Renderer>,
    ) -> Self {
        Self { routes, template, renderer, fetch_timeout: None }
    }

    /// Bounds every fetch-hook await. Unbounded by default.
    pub fn fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Handles one request.
    pub async fn render(&self, req: &Request) -> Result<Outcome, Error> {
        if *req.method() != Method::Get {
            return Ok(Outcome::PassThrough);
        }

        let url = req.url();
        let Some(matched) = self.routes.find(url) else {
            warn!(url, "{url} is not matched");
            return Ok(Outcome::PassThrough);
        };
        info!(url, route = matched.route.path(), "{url} is matched");

        let state = match matched.route.component().fetch() {
            FetchCapability::Absent => InitialState::Null,
            FetchCapability::NotCallable { found } => {
                return Err(Error::InvalidRouteHandler {
                    path: matched.route.path().to_owned(),
                    found: found.clone(),
                });
            }
            FetchCapability::Hook(hook) => {
                let state = self.fetch(matched.route.path(), hook).await?;
                info!(url, "initial state : {state}");
                state
            }
        };

        let mut ctx = RenderContext::default();
        let markup = self.renderer
            .render(
                &RenderRequest {
                    route: matched.route,
                    location: url,
                    params: &matched.params,
                    state: StateBoundary::new(&state),
                },
                &mut ctx,
            )
            .map_err(|source| Error::Render { location: url.to_owned(), source })?;

        let document = self.template.inject(&markup)?;
        Ok(Outcome::Handled(Response::html(document)))
    }

    async fn fetch(&self, path: &str, hook: &FetchHook) -> Result<InitialState, Error> {
        let fetched = match self.fetch_timeout {
            Some(after) => tokio::time::timeout(after, hook.fetch())
                .await
                .map_err(|_| Error::FetchTimeout { path: path.to_owned(), after })?,
            None => hook.fetch().await,
        };
        fetched.map_err(|source| Error::Fetch { path: path.to_owned(), source })
    }
}

impl Middleware for SsrHandler {
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Outcome, Error>> {
        Box::pin(self.render(req))
    }
}
