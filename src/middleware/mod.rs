//! Middleware chain.
//!
//! A [`Chain`] is an ordered list of stages. Each stage looks at the request
//! and either answers it ([`Outcome::Handled`]) or hands it on
//! ([`Outcome::PassThrough`]). The first handled response ends the chain;
//! if nobody answers, the chain replies `404 Not Found`.
//!
//! A stage never assumes it is terminal, and it never sees a request that an
//! earlier stage already answered.
//!
//! ```rust,no_run
//! use prerender::middleware::{Chain, ssr::SsrHandler};
//! use prerender::{Router, health};
//! # fn f(ssr: SsrHandler) {
//! let chain = Chain::new()
//!     .then(ssr)
//!     .then(Router::new().get("/healthz", health::liveness));
//! # }
//! ```

pub mod ssr;

use std::sync::Arc;

use http::StatusCode;

use crate::error::Error;
use crate::handler::BoxFuture;
use crate::request::Request;
use crate::response::Response;

/// What a stage did with a request.
#[derive(Debug)]
pub enum Outcome {
    Handled(Response),
    PassThrough,
}

/// One stage of a [`Chain`].
pub trait Middleware: Send + Sync + 'static {
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Outcome, Error>>;
}

impl<M: Middleware + ?Sized> Middleware for Arc<M> {
    fn handle<'a>(&'a self, req: &'a Request) -> BoxFuture<'a, Result<Outcome, Error>> {
        (**self).handle(req)
    }
}

/// Ordered stages, run first to last.
#[derive(Clone, Default)]
pub struct Chain {
    stages: Vec<Arc<dyn Middleware>>,
}

impl Chain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage. Returns `self` for chaining.
    pub fn then(mut self, stage: impl Middleware) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    pub fn len(&self) -> usize { self.stages.len() }
    pub fn is_empty(&self) -> bool { self.stages.is_empty() }

    /// Runs the request through every stage until one answers.
    ///
    /// A stage error aborts the chain and is returned unchanged; later
    /// stages do not run.
    pub async fn run(&self, req: &Request) -> Result<Response, Error> {
        for stage in &self.stages {
            if let Outcome::Handled(res) = stage.handle(req).await? {
                return Ok(res);
            }
        }
        Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .text("not found"))
    }
}
