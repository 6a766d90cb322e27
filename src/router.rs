//! Method-keyed handler router.
//!
//! One radix tree per HTTP method. This is the stage that sits *behind* the
//! SSR stage in a [`Chain`](crate::middleware::Chain): health checks, JSON
//! endpoints, anything that is not a rendered page. Unmatched requests pass
//! through to the next stage.

use std::collections::HashMap;
use std::sync::Arc;

use matchit::Router as MatchitRouter;

use crate::error::Error;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Middleware, Outcome};
use crate::request::Request;

/// The handler router. Build it once at startup; mount it in a chain.
pub struct Router {
    routes: HashMap<Method, MatchitRouter<BoxedHandler>>,
}

impl Router {
    pub fn new() -> Self {
        Self { routes: HashMap::new() }
    }

    /// Register a handler for a method + path pair. Returns `self` for chaining.
    ///
    /// Path parameters use `{name}` syntax; `req.param("name")` retrieves them.
    ///
    /// # Panics
    ///
    /// Panics if `path` is not a valid matchit route or conflicts with one
    /// already registered for the same method.
    pub fn on(mut self, method: Method, path: &str, handler: impl Handler) -> Self {
        self.routes
            .entry(method)
            .or_default()
            .insert(path, handler.into_boxed_handler())
            .unwrap_or_else(|e| panic!("invalid route `{path}`: {e}"));
        self
    }

    pub fn get(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Get, path, handler)
    }

    pub fn post(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Post, path, handler)
    }

    pub fn delete(self, path: &str, handler: impl Handler) -> Self {
        self.on(Method::Delete, path, handler)
    }

    pub(crate) fn lookup(
        &self,
        method: &Method,
        path: &str,
    ) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let tree = self.routes.get(method)?;
        let matched = tree.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

impl Middleware for Router {
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Outcome, Error>> {
        Box::pin(async move {
            match self.lookup(req.method(), req.path()) {
                Some((handler, params)) => {
                    let res = handler.call(req.clone().with_params(params)).await;
                    Ok(Outcome::Handled(res))
                }
                None => Ok(Outcome::PassThrough),
            }
        })
    }
}
