//! Configuration loading from disk.
//!
//! ```toml
//! bind = "0.0.0.0:3000"
//! fetch_timeout_ms = 5000           # optional; unbounded when absent
//!
//! [template]
//! path = "dist/index.html"
//! placeholder = "#MARKUP#"          # optional
//!
//! [components.Home]
//! fetch = "home"                    # name of a hook registered in code
//!
//! [components.About]
//!
//! [[routes]]
//! path = "/"
//! component = "Home"
//!
//! [[routes]]
//! path = "/about"
//! component = "About"
//! ```
//!
//! The config is read once at startup and never reloaded. Building the
//! route table validates every fetch value, so a route whose hook cannot be
//! invoked stops startup with [`Error::InvalidRouteHandler`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

use crate::component::{Component, Hooks};
use crate::error::Error;
use crate::middleware::ssr::SsrHandler;
use crate::render::Renderer;
use crate::routes::{RouteDescriptor, RouteTable};
use crate::template::{DEFAULT_PLACEHOLDER, Template};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    pub template: TemplateConfig,
    #[serde(default)]
    pub components: BTreeMap<String, ComponentConfig>,
    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    pub path: PathBuf,
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    /// Any TOML value; only a string naming a registered hook is callable.
    pub fetch: Option<toml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteConfig {
    pub path: String,
    pub component: String,
}

fn default_bind() -> String {
    "0.0.0.0:3000".to_owned()
}

fn default_placeholder() -> String {
    DEFAULT_PLACEHOLDER.to_owned()
}

impl Config {
    /// Loads a TOML file. Relative template paths resolve against the
    /// config file's directory.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await?;
        let mut config = Self::from_toml(&content)?;
        if config.template.path.is_relative() {
            if let Some(dir) = path.parent() {
                config.template.path = dir.join(&config.template.path);
            }
        }
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic checks that serde cannot express.
    fn validate(&self) -> Result<(), Error> {
        if self.placeholder().is_empty() {
            return Err(Error::Config("template.placeholder must not be empty".into()));
        }
        if self.fetch_timeout_ms == Some(0) {
            return Err(Error::Config("fetch_timeout_ms must be greater than zero".into()));
        }
        Ok(())
    }

    pub fn placeholder(&self) -> &str {
        &self.template.placeholder
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout_ms.map(Duration::from_millis)
    }

    /// Builds the ordered route table, resolving fetch values through `hooks`.
    pub fn route_table(&self, hooks: &Hooks) -> Result<RouteTable, Error> {
        let routes = self.routes.iter()
            .map(|route| {
                let declared = self.components.get(&route.component).ok_or_else(|| {
                    Error::UnknownComponent {
                        path: route.path.clone(),
                        component: route.component.clone(),
                    }
                })?;
                let component = Component::new(&route.component)
                    .with_capability(hooks.resolve(declared.fetch.as_ref()));
                RouteDescriptor::new(&route.path, component)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let table = RouteTable::new(routes);
        table.validate()?;
        Ok(table)
    }

    /// Loads the template and routes and assembles the SSR stage.
    pub async fn ssr_handler(
        &self,
        hooks: &Hooks,
        renderer: Arc<dyn Renderer>,
    ) -> Result<SsrHandler, Error> {
        let routes = self.route_table(hooks)?;
        let template = Template::from_file(&self.template.path, self.placeholder()).await?;
        info!(
            routes = routes.len(),
            template = %self.template.path.display(),
            "ssr routes loaded"
        );
        Ok(SsrHandler::new(Arc::new(routes), Arc::new(template), renderer)
            .fetch_timeout(self.fetch_timeout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
        fetch_timeout_ms = 250

        [template]
        path = "index.html"

        [components.Home]
        fetch = "home"

        [components.About]

        [[routes]]
        path = "/"
        component = "Home"

        [[routes]]
        path = "/about"
        component = "About"
    "#;

    fn hooks() -> Hooks {
        Hooks::new().register("home", || async { Ok::<_, crate::FetchError>(serde_json::Value::Null) })
    }

    #[test]
    fn parses_with_defaults() {
        let config = Config::from_toml(CONFIG).expect("config");
        assert_eq!(config.bind, "0.0.0.0:3000");
        assert_eq!(config.placeholder(), "#MARKUP#");
        assert_eq!(config.fetch_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.routes.len(), 2);
    }

    #[test]
    fn builds_route_table_in_order() {
        let table = Config::from_toml(CONFIG).expect("config").route_table(&hooks()).expect("table");
        let paths: Vec<_> = table.iter().map(RouteDescriptor::path).collect();
        assert_eq!(paths, ["/", "/about"]);
    }

    #[test]
    fn non_callable_fetch_fails_startup() {
        let config = Config::from_toml(r#"
            [template]
            path = "index.html"

            [components.Home]
            fetch = { url = "/api/home" }

            [[routes]]
            path = "/"
            component = "Home"
        "#).expect("config");

        match config.route_table(&hooks()) {
            Err(Error::InvalidRouteHandler { path, found }) => {
                assert_eq!(path, "/");
                assert!(found.starts_with("table"));
            }
            other => panic!("expected InvalidRouteHandler, got {other:?}"),
        }
    }

    #[test]
    fn unknown_component_is_rejected() {
        let config = Config::from_toml(r#"
            [template]
            path = "index.html"

            [[routes]]
            path = "/"
            component = "Missing"
        "#).expect("config");

        assert!(matches!(
            config.route_table(&hooks()),
            Err(Error::UnknownComponent { .. })
        ));
    }

    #[test]
    fn rejects_zero_timeout_and_unknown_keys() {
        let zero = "fetch_timeout_ms = 0\n[template]\npath = \"i.html\"\n";
        assert!(matches!(Config::from_toml(zero), Err(Error::Config(_))));

        let extra = "colour = \"red\"\n[template]\npath = \"i.html\"\n";
        assert!(matches!(Config::from_toml(extra), Err(Error::Config(_))));
    }
}
