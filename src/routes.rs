//! The SSR route table.
//!
//! An ordered list of `{path, component}` descriptors. Lookup walks the list
//! and returns the first descriptor whose pattern consumes the whole request
//! path, so table order is the priority order: `/a/:id` listed before
//! `/a/special` shadows it.
//!
//! Each pattern is compiled into its own single-entry matchit tree. A shared
//! radix tree would rank static segments above parameters and reject
//! overlapping patterns, which breaks first-match-wins.
//!
//! # Matching rules
//!
//! - `:name` and `{name}` capture one segment; a final `*name` or `{*name}`
//!   captures the rest of the path. Names are `[A-Za-z0-9_]+`; optional
//!   parameters (`:id?`) are rejected when the table is built.
//! - The query string is ignored.
//! - One trailing slash is tolerated on either side (`/about/` matches `/about`).
//! - Matching is case-sensitive and segments are compared undecoded.

use std::collections::HashMap;

use matchit::Router as MatchitRouter;

use crate::component::{Component, FetchCapability};
use crate::error::Error;

/// A path pattern mapped to a renderable component.
pub struct RouteDescriptor {
    path: String,
    component: Component,
    matcher: MatchitRouter<()>,
}

impl RouteDescriptor {
    /// Compiles `path` into a matcher.
    pub fn new(path: &str, component: Component) -> Result<Self, Error> {
        let pattern = compile(path)?;
        let mut matcher = MatchitRouter::new();
        matcher.insert(pattern, ()).map_err(|e| Error::InvalidRoute {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { path: path.to_owned(), component, matcher })
    }

    pub fn path(&self) -> &str { &self.path }
    pub fn component(&self) -> &Component { &self.component }

    fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let matched = self.matcher.at(path).ok()?;
        Some(
            matched.params.iter()
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .collect(),
        )
    }
}

impl std::fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("path", &self.path)
            .field("component", &self.component.name())
            .finish()
    }
}

/// The result of a successful lookup.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub params: HashMap<String, String>,
}

/// Ordered, read-only route table. Built once, shared behind an `Arc`.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl RouteTable {
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    /// Builds a table from `(path, component)` pairs, compiling every pattern.
    pub fn build<I, S>(entries: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (S, Component)>,
        S: AsRef<str>,
    {
        let routes = entries.into_iter()
            .map(|(path, component)| RouteDescriptor::new(path.as_ref(), component))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(routes))
    }

    /// Reports the first route whose fetch value is not invocable.
    ///
    /// Run at startup so a misconfigured hook stops the process instead of
    /// failing the first request that reaches it.
    pub fn validate(&self) -> Result<(), Error> {
        for route in &self.routes {
            if let FetchCapability::NotCallable { found } = route.component.fetch() {
                return Err(Error::InvalidRouteHandler {
                    path: route.path.clone(),
                    found: found.clone(),
                });
            }
        }
        Ok(())
    }

    /// First route, in table order, whose pattern matches the whole path of `url`.
    pub fn find(&self, url: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(url);
        self.routes.iter().find_map(|route| {
            route.matches(path).map(|params| RouteMatch { route, params })
        })
    }

    pub fn len(&self) -> usize { self.routes.len() }
    pub fn is_empty(&self) -> bool { self.routes.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &RouteDescriptor> {
        self.routes.iter()
    }
}

/// Drops the query string and one trailing slash from a request url.
fn normalize(url: &str) -> &str {
    let path = url.split_once('?').map_or(url, |(path, _)| path);
    match path {
        "" => "/",
        "/" => path,
        _ => path.strip_suffix('/').unwrap_or(path),
    }
}

/// Rewrites a `:name` / `*name` pattern into matchit syntax.
fn compile(path: &str) -> Result<String, Error> {
    let invalid = |reason: &str| Error::InvalidRoute {
        path: path.to_owned(),
        reason: reason.to_owned(),
    };

    if !path.starts_with('/') {
        return Err(invalid("pattern must start with `/`"));
    }
    if path.contains('?') {
        return Err(invalid("optional segments and query strings are not supported"));
    }

    let trimmed = match path {
        "/" => path,
        _ => path.strip_suffix('/').unwrap_or(path),
    };
    if trimmed == "/" {
        return Ok(trimmed.to_owned());
    }

    let segments: Vec<&str> = trimmed[1..].split('/').collect();
    let last = segments.len() - 1;
    let mut out = String::with_capacity(trimmed.len() + 4);

    for (i, segment) in segments.iter().enumerate() {
        out.push('/');
        if let Some(name) = segment.strip_prefix(':') {
            if !is_param_name(name) {
                return Err(invalid("parameter names must be non-empty `[A-Za-z0-9_]`"));
            }
            out.push('{');
            out.push_str(name);
            out.push('}');
        } else if let Some(name) = segment.strip_prefix('*') {
            if i != last {
                return Err(invalid("catch-all must be the last segment"));
            }
            if !name.is_empty() && !is_param_name(name) {
                return Err(invalid("parameter names must be non-empty `[A-Za-z0-9_]`"));
            }
            out.push_str("{*");
            out.push_str(if name.is_empty() { "rest" } else { name });
            out.push('}');
        } else {
            out.push_str(segment);
        }
    }
    Ok(out)
}

fn is_param_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}
