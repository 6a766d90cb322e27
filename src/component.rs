//! Renderable components and their optional initial-state fetch hooks.
//!
//! Whether a component can fetch initial state is decided when the route
//! table is built, as a [`FetchCapability`] tag. A value that was declared
//! but cannot be invoked is kept as [`FetchCapability::NotCallable`] so it
//! stays distinguishable from "no hook at all".

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use crate::error::FetchError;
use crate::handler::BoxFuture;

/// Initial state produced by a fetch hook. `Value::Null` when there is none.
pub type InitialState = Value;

type ErasedFetch = dyn Fn() -> BoxFuture<'static, Result<InitialState, FetchError>> + Send + Sync;

/// A zero-argument asynchronous initial-state provider.
#[derive(Clone)]
pub struct FetchHook(Arc<ErasedFetch>);

impl FetchHook {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<InitialState, FetchError>> + Send + 'static,
    {
        Self(Arc::new(move || {
            let fut: BoxFuture<'static, Result<InitialState, FetchError>> = Box::pin(f());
            fut
        }))
    }

    pub async fn fetch(&self) -> Result<InitialState, FetchError> {
        (self.0)().await
    }
}

impl fmt::Debug for FetchHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FetchHook(..)")
    }
}

#[derive(Clone, Debug, Default)]
pub enum FetchCapability {
    #[default]
    Absent,
    Hook(FetchHook),
    /// A fetch value was declared but is not invocable. `found` describes it.
    NotCallable { found: String },
}

/// A named renderable unit.
#[derive(Clone, Debug)]
pub struct Component {
    name: String,
    fetch: FetchCapability,
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), fetch: FetchCapability::Absent }
    }

    /// Attaches an initial-state fetch hook.
    pub fn with_fetch<F, Fut>(self, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<InitialState, FetchError>> + Send + 'static,
    {
        self.with_capability(FetchCapability::Hook(FetchHook::new(f)))
    }

    pub fn with_capability(mut self, fetch: FetchCapability) -> Self {
        self.fetch = fetch;
        self
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn fetch(&self) -> &FetchCapability { &self.fetch }
}

/// Named fetch hooks that configuration files refer to by string.
#[derive(Clone, Debug, Default)]
pub struct Hooks {
    hooks: HashMap<String, FetchHook>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(mut self, name: &str, f: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<InitialState, FetchError>> + Send + 'static,
    {
        self.hooks.insert(name.to_owned(), FetchHook::new(f));
        self
    }

    /// Resolves a declared fetch value into a capability.
    ///
    /// Only a string naming a registered hook is callable. Any other value,
    /// including an unknown name, becomes [`FetchCapability::NotCallable`].
    pub fn resolve(&self, declared: Option<&toml::Value>) -> FetchCapability {
        match declared {
            None => FetchCapability::Absent,
            Some(toml::Value::String(name)) => match self.hooks.get(name) {
                Some(hook) => FetchCapability::Hook(hook.clone()),
                None => FetchCapability::NotCallable {
                    found: format!("unregistered hook `{name}`"),
                },
            },
            Some(other) => FetchCapability::NotCallable {
                found: format!("{} `{other}`", other.type_str()),
            },
        }
    }
}
