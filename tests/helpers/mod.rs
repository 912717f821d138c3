//! Shared test doubles and request builders.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use email_batch_verify::{
    app_state::AppState,
    models::{job::ValidationOptions, verification::Reachability},
    routes,
    services::{
        jobs::JobService,
        runner::BatchRunner,
        store::JobStore,
        verifier::{Verdict, Verifier, VerifyError},
    },
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Verifier double that records peak concurrency and the options it saw.
///
/// Each call sleeps for the delay configured for its address (default
/// `default_delay`), so completion order can be forced to differ from input
/// order. Addresses listed in `failing` return an error.
pub struct ScriptedVerifier {
    delays: HashMap<String, Duration>,
    default_delay: Duration,
    failing: Vec<String>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
    seen_options: Mutex<Vec<ValidationOptions>>,
}

impl ScriptedVerifier {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            delays: HashMap::new(),
            default_delay,
            failing: Vec::new(),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            seen_options: Mutex::new(Vec::new()),
        }
    }

    pub fn with_delay(mut self, email: &str, delay: Duration) -> Self {
        self.delays.insert(email.to_string(), delay);
        self
    }

    pub fn failing(mut self, email: &str) -> Self {
        self.failing.push(email.to_string());
        self
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_options(&self) -> Vec<ValidationOptions> {
        self.seen_options.lock().unwrap().clone()
    }
}

#[async_trait]
impl Verifier for ScriptedVerifier {
    async fn verify(&self, email: &str, options: &ValidationOptions) -> Result<Verdict, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen_options.lock().unwrap().push(*options);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(email).copied().unwrap_or(self.default_delay);
        tokio::time::sleep(delay).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        if self.failing.iter().any(|f| f == email) {
            return Err(VerifyError::Syntax(email.to_string()));
        }
        Ok(Verdict::reachable(Reachability::Yes))
    }
}

pub fn job_service(verifier: Arc<ScriptedVerifier>, max_in_flight: usize) -> JobService {
    JobService::new(
        Arc::new(JobStore::new()),
        BatchRunner::new(verifier, max_in_flight),
    )
}

pub fn app(verifier: Arc<ScriptedVerifier>, max_in_flight: usize) -> axum::Router {
    let state = AppState::new(job_service(verifier, max_in_flight));
    routes::router(state, None, 1024 * 1024)
}

pub fn addresses(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("user{i}@example.com")).collect()
}

const BOUNDARY: &str = "----batchverifyboundary";

/// Build a `multipart/form-data` upload with an optional CSV file part and
/// text fields.
pub fn upload_request(csv: Option<&str>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    if let Some(csv) = csv {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"emails.csv\"\r\nContent-Type: text/csv\r\n\r\n{csv}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
