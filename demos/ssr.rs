//! Server-rendered pages in front of a health-check router.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example ssr
//!
//! Try:
//!   curl http://localhost:3000/
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/healthz
//!   curl -i http://localhost:3000/missing     → 404 from the chain

use std::sync::Arc;

use prerender::middleware::Chain;
use prerender::{
    Config, FetchError, Hooks, RenderContext, RenderError, RenderRequest, Router, Server, health,
};
use serde_json::json;

// Stand-in for a real view layer: one branch per component, plus the
// initial state serialized for client-side hydration.
fn render(req: &RenderRequest<'_>, _ctx: &mut RenderContext) -> Result<String, RenderError> {
    let body = match req.route.component().name() {
        "Home" => "<h1>Home</h1>".to_owned(),
        "User" => {
            let name = req.state.state()["name"].as_str().unwrap_or("unknown");
            format!("<h1>User {}</h1><p>{name}</p>", req.params.get("id").map_or("?", String::as_str))
        }
        other => return Err(format!("no view for component `{other}`").into()),
    };
    let state = serde_json::to_string(req.state.state())?.replace('<', "\\u003c");
    Ok(format!("{body}<script>window.__INITIAL_STATE__={state}</script>"))
}

#[tokio::main]
async fn main() -> Result<(), prerender::Error> {
    tracing_subscriber::fmt::init();

    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/ssr.toml")).await?;

    let hooks = Hooks::new().register("user", || async {
        Ok::<_, FetchError>(json!({ "name": "alice" }))
    });

    let chain = Chain::new()
        .then(config.ssr_handler(&hooks, Arc::new(render)).await?)
        .then(
            Router::new()
                .get("/healthz", health::liveness)
                .get("/readyz", health::readiness),
        );

    Server::bind(&config.bind)?.serve(chain).await
}
