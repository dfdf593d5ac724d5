#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A request as seen by the stub.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_str(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    path: String,
    status: u16,
    content_type: String,
    body: String,
}

/// Local HTTP stub: exact method + path match, every request recorded.
pub struct StubServer {
    base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

pub struct StubBuilder {
    routes: Vec<Route>,
}

#[derive(Clone)]
struct StubState {
    routes: Arc<Vec<Route>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubServer {
    pub fn builder() -> StubBuilder {
        StubBuilder { routes: Vec::new() }
    }

    /// `http://127.0.0.1:<port>` without a trailing slash.
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl StubBuilder {
    pub fn route(mut self, method: &str, path: &str, status: u16, content_type: &str, body: &str) -> Self {
        self.routes.push(Route {
            method: method.to_string(),
            path: path.to_string(),
            status,
            content_type: content_type.to_string(),
            body: body.to_string(),
        });
        self
    }

    pub fn json(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.route(method, path, status, "application/json", body)
    }

    pub async fn start(self) -> StubServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = StubState {
            routes: Arc::new(self.routes),
            requests: requests.clone(),
        };

        // Model ids contain slashes, so routing happens in the handler.
        let app = Router::new().fallback(record_and_reply).with_state(state);
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        StubServer { base, requests }
    }
}

async fn record_and_reply(
    State(state): State<StubState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.to_string(),
        path: path.clone(),
        headers: headers
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect(),
        body: body.to_vec(),
    });

    match state
        .routes
        .iter()
        .find(|r| r.method == method.as_str() && r.path == path)
    {
        Some(route) => (
            StatusCode::from_u16(route.status).unwrap(),
            [(header::CONTENT_TYPE, route.content_type.clone())],
            route.body.clone(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "no route").into_response(),
    }
}

/// The quotes page shape the scraper expects.
pub fn quotes_page(pairs: &[(&str, &str)]) -> String {
    let items: String = pairs
        .iter()
        .map(|(text, author)| {
            format!(
                r#"<div class="quote"><span class="text">{text}</span><span>by <small class="author">{author}</small></span></div>"#
            )
        })
        .collect();
    format!("<!DOCTYPE html><html><body><div class=\"col-md-8\">{items}</div></body></html>")
}

use chrono::{Duration, Utc};
use quote_digest::DigestError;
use quote_digest::GoogleCredential;
use quote_digest::service::credential_manager::AuthFlow;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Auth flow double that counts calls instead of talking to Google.
#[derive(Default)]
pub struct CountingFlow {
    authorizations: AtomicUsize,
    refreshes: AtomicUsize,
}

impl CountingFlow {
    pub fn authorizations(&self) -> usize {
        self.authorizations.load(Ordering::SeqCst)
    }

    pub fn refreshes(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl AuthFlow for CountingFlow {
    async fn authorize(&self) -> Result<GoogleCredential, DigestError> {
        self.authorizations.fetch_add(1, Ordering::SeqCst);
        Ok(credential("ya29.authorized", Some("rt-authorized"), 3600))
    }

    async fn refresh(&self, creds: &mut GoogleCredential) -> Result<(), DigestError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        creds.access_token = Some("ya29.refreshed".to_string());
        creds.expiry = Utc::now() + Duration::seconds(3600);
        Ok(())
    }
}

pub fn credential(access: &str, refresh: Option<&str>, expires_in_secs: i64) -> GoogleCredential {
    let mut cred = GoogleCredential::new("client-id", "client-secret");
    cred.access_token = Some(access.to_string());
    cred.refresh_token = refresh.map(str::to_string);
    cred.expiry = Utc::now() + Duration::seconds(expires_in_secs);
    cred
}
