//! The renderer seam.
//!
//! Producing markup from a component tree belongs to whatever view layer the
//! application uses. The SSR stage only needs a [`Renderer`]: given the
//! matched route, the simulated location and the initial state, return a
//! markup string.

use std::collections::HashMap;

use serde::de::DeserializeOwned;

use crate::component::InitialState;
use crate::routes::RouteDescriptor;

/// Error raised by a [`Renderer`].
pub type RenderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The boundary through which initial state is injected into the tree.
#[derive(Clone, Copy, Debug)]
pub struct StateBoundary<'a> {
    state: &'a InitialState,
}

impl<'a> StateBoundary<'a> {
    pub fn new(state: &'a InitialState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &'a InitialState {
        self.state
    }

    pub fn is_empty(&self) -> bool {
        self.state.is_null()
    }

    /// Deserializes the state into `T`.
    pub fn get<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(self.state)
    }
}

/// Everything a renderer is given for one request.
#[derive(Debug)]
pub struct RenderRequest<'a> {
    pub route: &'a RouteDescriptor,
    /// The request url, used as the navigation location.
    pub location: &'a str,
    pub params: &'a HashMap<String, String>,
    pub state: StateBoundary<'a>,
}

/// Out-parameter bag for navigation outcomes signalled during rendering.
///
/// Created fresh for every render. The SSR stage does not read it back.
#[derive(Debug, Default)]
pub struct RenderContext {
    pub redirect: Option<String>,
    pub status: Option<u16>,
}

/// Turns a component tree into markup.
///
/// Implementations must be synchronous and side-effect free with respect to
/// the request: the same inputs produce the same markup.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, req: &RenderRequest<'_>, ctx: &mut RenderContext) -> Result<String, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&RenderRequest<'_>, &mut RenderContext) -> Result<String, RenderError> + Send + Sync + 'static,
{
    fn render(&self, req: &RenderRequest<'_>, ctx: &mut RenderContext) -> Result<String, RenderError> {
        self(req, ctx)
    }
}
