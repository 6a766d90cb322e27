mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use http::StatusCode;
use prerender::middleware::ssr::SsrHandler;
use prerender::middleware::{Chain, Outcome};
use prerender::{
    Component, Error, FetchCapability, FetchError, Method, Request, RouteTable, Router, Template, health,
};
use serde_json::{Value, json};

use common::{RecordingRenderer, capture_logs};

const TEMPLATE: &str = "<html>#MARKUP#</html>";

fn handler(routes: RouteTable, renderer: &RecordingRenderer) -> SsrHandler {
    SsrHandler::new(
        Arc::new(routes),
        Arc::new(Template::new(TEMPLATE).expect("template")),
        Arc::new(renderer.clone()),
    )
}

fn home_only() -> RouteTable {
    RouteTable::build([("/", Component::new("Home"))]).expect("routes")
}

fn body(outcome: Outcome) -> String {
    match outcome {
        Outcome::Handled(res) => {
            assert_eq!(res.status_code(), StatusCode::OK);
            assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
            res.body_str().expect("utf-8 body").to_owned()
        }
        Outcome::PassThrough => panic!("expected a rendered response"),
    }
}

#[tokio::test]
async fn renders_matched_route_into_template() {
    let renderer = RecordingRenderer::new();
    let ssr = handler(home_only(), &renderer);

    let outcome = ssr.render(&Request::get("/")).await.expect("render");

    assert_eq!(body(outcome), "<html><div>hi</div></html>");
    assert_eq!(renderer.calls().len(), 1);
    assert_eq!(renderer.calls()[0].state, Value::Null);
    assert_eq!(renderer.calls()[0].location, "/");
}

#[tokio::test]
async fn unmatched_url_passes_through_with_warning() {
    let (logs, _guard) = capture_logs();
    let renderer = RecordingRenderer::new();
    let ssr = handler(home_only(), &renderer);

    let outcome = ssr.render(&Request::get("/missing")).await.expect("no error");

    assert!(matches!(outcome, Outcome::PassThrough));
    assert!(renderer.calls().is_empty());
    let logs = logs.contents();
    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(logs.contains("/missing is not matched"), "logs: {logs}");
}

#[tokio::test]
async fn non_get_requests_pass_through() {
    let renderer = RecordingRenderer::new();
    let ssr = handler(home_only(), &renderer);

    for method in [Method::Post, Method::Put, Method::Delete, Method::Head, Method::Options] {
        let outcome = ssr.render(&Request::new(method.clone(), "/")).await.expect("no error");
        assert!(matches!(outcome, Outcome::PassThrough), "{method} should pass through");
    }
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn first_route_in_table_order_wins() {
    let renderer = RecordingRenderer::new();
    let routes = RouteTable::build([
        ("/a/:id", Component::new("ById")),
        ("/a/special", Component::new("Special")),
    ])
    .expect("routes");
    let ssr = handler(routes, &renderer);

    let outcome = ssr.render(&Request::get("/a/special")).await.expect("render");

    assert_eq!(body(outcome), "<html><div>ById</div></html>");
    assert_eq!(renderer.calls()[0].route, "/a/:id");
}

#[tokio::test]
async fn not_callable_fetch_fails_before_render() {
    let renderer = RecordingRenderer::new();
    let bad = Component::new("Home").with_capability(FetchCapability::NotCallable {
        found: "string `\"load\"`".into(),
    });
    let routes = RouteTable::build([("/", bad)]).expect("routes");
    let ssr = handler(routes, &renderer);

    let err = ssr.render(&Request::get("/")).await.expect_err("must fail");

    assert!(matches!(err, Error::InvalidRouteHandler { ref path, .. } if path == "/"));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn fetched_state_flows_into_render_unchanged() {
    let (logs, _guard) = capture_logs();
    let renderer = RecordingRenderer::new();
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let user = Component::new("User").with_fetch(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        async { Ok::<_, FetchError>(json!({ "user": { "id": 7, "name": "ada" } })) }
    });
    let routes = RouteTable::build([("/users/:id", user)]).expect("routes");
    let ssr = handler(routes, &renderer);

    let outcome = ssr.render(&Request::get("/users/7?tab=posts")).await.expect("render");

    assert_eq!(body(outcome), "<html><div>User</div></html>");
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    let calls = renderer.calls();
    let call = &calls[0];
    assert_eq!(call.state, json!({ "user": { "id": 7, "name": "ada" } }));
    assert_eq!(call.location, "/users/7?tab=posts");

    let logs = logs.contents();
    assert!(logs.contains("/users/7?tab=posts is matched"), "logs: {logs}");
    assert!(logs.contains(r#"initial state : {"user":{"id":7,"name":"ada"}}"#), "logs: {logs}");
}

#[tokio::test]
async fn fetch_failure_aborts_request() {
    let renderer = RecordingRenderer::new();
    let broken = Component::new("Home").with_fetch(|| async { Err::<Value, FetchError>("upstream down".into()) });
    let ssr = handler(RouteTable::build([("/", broken)]).expect("routes"), &renderer);

    let err = ssr.render(&Request::get("/")).await.expect_err("must fail");

    assert!(matches!(err, Error::Fetch { .. }));
    assert!(renderer.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_when_bounded() {
    let renderer = RecordingRenderer::new();
    let slow = Component::new("Home").with_fetch(|| async {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok::<_, FetchError>(Value::Null)
    });
    let ssr = handler(RouteTable::build([("/", slow)]).expect("routes"), &renderer)
        .fetch_timeout(Some(Duration::from_millis(100)));

    let err = ssr.render(&Request::get("/")).await.expect_err("must time out");

    assert!(matches!(err, Error::FetchTimeout { .. }));
    assert!(renderer.calls().is_empty());
}

#[tokio::test]
async fn render_errors_propagate() {
    let renderer = RecordingRenderer::failing();
    let ssr = handler(home_only(), &renderer);

    let err = ssr.render(&Request::get("/")).await.expect_err("must fail");

    assert!(matches!(err, Error::Render { ref location, .. } if location == "/"));
}

#[tokio::test]
async fn chain_hands_unmatched_requests_downstream() {
    let renderer = RecordingRenderer::new();
    let chain = Chain::new()
        .then(handler(home_only(), &renderer))
        .then(Router::new().get("/healthz", health::liveness));

    let page = chain.run(&Request::get("/")).await.expect("page");
    assert_eq!(page.body_str(), Some("<html><div>hi</div></html>"));

    let alive = chain.run(&Request::get("/healthz")).await.expect("liveness");
    assert_eq!(alive.body_str(), Some("ok"));

    let missing = chain.run(&Request::get("/missing")).await.expect("404");
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

    assert_eq!(renderer.calls().len(), 1);
}

#[tokio::test]
async fn extension_methods_skip_rendering_and_reach_the_router() {
    let purge = Method::Other(http::Method::from_bytes(b"PURGE").expect("token"));
    let renderer = RecordingRenderer::new();
    let chain = Chain::new()
        .then(handler(home_only(), &renderer))
        .then(Router::new().on(purge.clone(), "/", |_req: Request| async { "purged" }));

    let res = chain.run(&Request::new(purge, "/")).await.expect("purged");

    assert_eq!(res.body_str(), Some("purged"));
    assert!(renderer.calls().is_empty());
}
