//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use prerender::{RenderContext, RenderError, RenderRequest, Renderer};
use serde_json::Value;

/// Captured log output of the current thread's subscriber.
#[derive(Clone, Default)]
pub struct Logs(Arc<Mutex<Vec<u8>>>);

impl Logs {
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for Logs {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Installs a plain-text subscriber for the current thread until the guard drops.
pub fn capture_logs() -> (Logs, tracing::subscriber::DefaultGuard) {
    let logs = Logs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::INFO)
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}

/// One recorded renderer invocation.
#[derive(Clone, Debug, PartialEq)]
pub struct Rendered {
    pub route: String,
    pub location: String,
    pub state: Value,
}

/// Renderer that records its inputs and returns fixed markup per component.
#[derive(Clone, Default)]
pub struct RecordingRenderer {
    calls: Arc<Mutex<Vec<Rendered>>>,
    fail: bool,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self { fail: true, ..Self::default() }
    }

    pub fn calls(&self) -> Vec<Rendered> {
        self.calls.lock().unwrap().clone()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, req: &RenderRequest<'_>, ctx: &mut RenderContext) -> Result<String, RenderError> {
        self.calls.lock().unwrap().push(Rendered {
            route: req.route.path().to_owned(),
            location: req.location.to_owned(),
            state: req.state.state().clone(),
        });
        if self.fail {
            return Err("component threw during render".into());
        }
        ctx.status = Some(200);
        Ok(match req.route.component().name() {
            "Home" => "<div>hi</div>".to_owned(),
            name => format!("<div>{name}</div>"),
        })
    }
}
