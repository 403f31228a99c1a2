//! In-process mock API server and recording doubles for client tests.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::{self, Next};
use axum::response::Response;

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::nav::{Navigator, Route};
use crate::session::SessionStore;
use crate::storage::MemoryStore;

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn len(&self) -> usize {
        self.0.lock().unwrap().len()
    }

    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().unwrap().clone()
    }

    pub fn last(&self) -> RecordedRequest {
        self.0.lock().unwrap().last().cloned().expect("no requests recorded")
    }
}

async fn record(State(log): State<RequestLog>, request: Request, next: Next) -> Response {
    let entry = {
        let header_value = |name: header::HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_owned(),
            query: request.uri().query().map(str::to_owned),
            authorization: header_value(header::AUTHORIZATION),
            content_type: header_value(header::CONTENT_TYPE),
        }
    };
    log.0.lock().unwrap().push(entry);
    next.run(request).await
}

pub struct MockApi {
    pub base_url: String,
    pub log: RequestLog,
}

/// Serve `routes` under `/api/v1` on an ephemeral port.
pub async fn spawn_api(routes: Router) -> MockApi {
    let log = RequestLog::default();
    let app = Router::new()
        .nest("/api/v1", routes)
        .layer(middleware::from_fn_with_state(log.clone(), record));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    MockApi { base_url: format!("http://{addr}/api/v1"), log }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// A client over an in-memory session, plus the navigator it reports to.
pub fn client_for(base_url: &str) -> (ApiClient, Arc<RecordingNavigator>) {
    let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
    let navigator = Arc::new(RecordingNavigator::default());
    let config = ClientConfig::new(base_url, "/unused/session.json").unwrap();
    let client = ApiClient::new(&config, session, navigator.clone()).unwrap();
    (client, navigator)
}

pub fn signed_in(client: &ApiClient, access_token: &str) {
    let tokens = crate::types::TokenPair {
        access_token: access_token.to_owned(),
        refresh_token: "refresh".to_owned(),
    };
    client.session().set_session(&tokens, None).unwrap();
}

pub fn user_json(id: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "email": format!("{id}@example.com"),
        "username": id,
        "full_name": null,
    })
}

pub fn detection_json(score: f64) -> serde_json::Value {
    serde_json::json!({
        "id": "d1",
        "threat_score": score,
        "confidence_score": 0.9,
        "threat_category": "phishing",
        "analysis_results": { "details": "suspicious link", "indicators": ["urgent tone"] },
        "remediation_suggestions": { "actions": ["do not click"], "priority": "high" },
    })
}
