//! The HTML page shell that rendered markup is spliced into.

use std::path::Path;
use std::sync::Arc;

use tracing::warn;

use crate::error::Error;

pub const DEFAULT_PLACEHOLDER: &str = "#MARKUP#";

/// Supplies the current page template.
pub trait TemplateProvider: Send + Sync + 'static {
    fn template(&self) -> Result<Arc<str>, Error>;

    fn placeholder(&self) -> &str;

    /// Replaces the first placeholder occurrence with `markup`.
    fn inject(&self, markup: &str) -> Result<String, Error> {
        let html = self.template()?;
        let placeholder = self.placeholder();
        if !html.contains(placeholder) {
            return Err(Error::MissingPlaceholder(placeholder.to_owned()));
        }
        Ok(html.replacen(placeholder, markup, 1))
    }
}

/// An in-memory template, loaded once at startup.
#[derive(Clone, Debug)]
pub struct Template {
    html: Arc<str>,
    placeholder: String,
}

impl Template {
    /// Uses [`DEFAULT_PLACEHOLDER`].
    pub fn new(html: impl Into<String>) -> Result<Self, Error> {
        Self::with_placeholder(html, DEFAULT_PLACEHOLDER)
    }

    pub fn with_placeholder(html: impl Into<String>, placeholder: &str) -> Result<Self, Error> {
        let html = html.into();
        match html.matches(placeholder).count() {
            0 => return Err(Error::MissingPlaceholder(placeholder.to_owned())),
            1 => {}
            n => warn!(placeholder, occurrences = n, "template has several placeholders, only the first is replaced"),
        }
        Ok(Self { html: html.into(), placeholder: placeholder.to_owned() })
    }

    pub async fn from_file(path: impl AsRef<Path>, placeholder: &str) -> Result<Self, Error> {
        let html = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::with_placeholder(html, placeholder)
    }
}

impl TemplateProvider for Template {
    fn template(&self) -> Result<Arc<str>, Error> {
        Ok(Arc::clone(&self.html))
    }

    fn placeholder(&self) -> &str {
        &self.placeholder
    }
}
