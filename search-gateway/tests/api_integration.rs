//! Router-level tests for the search gateway over the in-memory backend.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use search_gateway::{create_app, AppState, Credentials};
use search_gateway_repository::{
    BackendLimits, Document, InMemoryProvider, SearchIndexError, SearchIndexProvider,
    SearchIndexService, SearchIndexServiceConfig, SearchOptions,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const USERNAME: &str = "username";
const PASSWORD: &str = "password";
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

const DATA: [(&str, &str); 5] = [
    ("Doraemon", "Robotic cat from the future."),
    ("Garfield", "Loves lasagna. Hates Mondays."),
    ("Heathcliff", "What a happy cat. Full content goes here."),
    ("Hello_Kitty", "Sells herself out to any product."),
    ("Top_Cat", "Fancy. Lives in an alley."),
];

struct TestApp {
    router: Router,
    provider: Arc<InMemoryProvider>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_limits(BackendLimits::default(), MAX_BODY_BYTES)
    }

    fn with_limits(limits: BackendLimits, max_body_bytes: usize) -> Self {
        let provider = Arc::new(InMemoryProvider::with_limits(limits));
        let service = SearchIndexService::with_config(
            provider.clone(),
            SearchIndexServiceConfig::default(),
        );
        let state = AppState::new(service, Credentials::new(USERNAME, PASSWORD));
        Self {
            router: create_app(state, max_body_bytes),
            provider,
        }
    }

    async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn size(&self) -> usize {
        self.provider.document_count(USERNAME).await
    }

    async fn ids(&self) -> Vec<String> {
        self.provider.document_ids(USERNAME).await
    }

    async fn put_data(&self) {
        let response = self
            .send(json_request(Method::PUT, data_object(), Some((USERNAME, PASSWORD))))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let expected: Vec<&str> = DATA.iter().map(|(id, _)| *id).collect();
        assert_eq!(self.ids().await, expected);
    }

    async fn search(&self, query: &str) -> Vec<String> {
        let uri = format!("/?q={}", encode_query(query));
        let response = self.send(get_request(&uri, Some((USERNAME, PASSWORD)))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json; charset=utf-8"
        );
        serde_json::from_value(body_json(response).await).unwrap()
    }
}

fn basic(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        general_purpose::STANDARD.encode(format!("{}:{}", username, password))
    )
}

fn encode_query(query: &str) -> String {
    query
        .bytes()
        .map(|b| match b {
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{:02X}", b),
        })
        .collect()
}

fn get_request(uri: &str, auth: Option<(&str, &str)>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some((username, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(username, password));
    }
    builder.body(Body::empty()).unwrap()
}

fn raw_request(
    method: Method,
    content_type: Option<&str>,
    body: impl Into<Body>,
    auth: Option<(&str, &str)>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri("/");
    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    if let Some((username, password)) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(username, password));
    }
    builder.body(body.into()).unwrap()
}

fn json_request(method: Method, body: Value, auth: Option<(&str, &str)>) -> Request<Body> {
    raw_request(method, Some("application/json"), body.to_string(), auth)
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn assert_envelope(response: Response, status: StatusCode) {
    assert_eq!(response.status(), status);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/json; charset=utf-8"
    );
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], status.as_u16());
    assert_eq!(
        json["error"]["message"],
        "Oops! This is embarrassing. An error occurred."
    );
}

#[tokio::test]
async fn test_bad_authentication() {
    let app = TestApp::new();

    for auth in [None, Some(("foo", "bar")), Some((USERNAME, "bar")), Some(("foo", PASSWORD))] {
        let response = app.send(get_request("/?q=cat", auth)).await;
        assert_eq!(response.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Basic");
        assert_envelope(response, StatusCode::UNAUTHORIZED).await;

        for method in [Method::POST, Method::PUT] {
            let response = app
                .send(json_request(method, json!({"Garfield": "Loves lasagna."}), auth))
                .await;
            assert_envelope(response, StatusCode::UNAUTHORIZED).await;
        }

        let response = app
            .send(json_request(Method::DELETE, json!(["Garfield"]), auth))
            .await;
        assert_envelope(response, StatusCode::UNAUTHORIZED).await;
    }

    assert_eq!(app.size().await, 0);
}

#[tokio::test]
async fn test_unconfigured_credentials_reject_everything() {
    let provider = Arc::new(InMemoryProvider::new());
    let state = AppState::new(SearchIndexService::new(provider.clone()), Credentials::disabled());
    let router = create_app(state, MAX_BODY_BYTES);

    let response = router
        .oneshot(json_request(
            Method::PUT,
            json!({"Garfield": "Loves lasagna."}),
            Some(("", "")),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(provider.document_count("").await, 0);
}

#[tokio::test]
async fn test_empty() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));

    for method in [Method::DELETE, Method::POST, Method::PUT] {
        let response = app.send(raw_request(method.clone(), None, Body::empty(), auth)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_bytes(response).await.is_empty());

        let response = app
            .send(raw_request(method.clone(), Some("application/json"), "", auth))
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let empty = if method == Method::DELETE { json!([]) } else { json!({}) };
        let response = app.send(json_request(method, empty, auth)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.size().await, 0);
    }

    let response = app.send(get_request("/", auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!([]));

    let response = app.send(get_request("/?q=", auth)).await;
    assert_eq!(body_json(response).await, json!([]));
}

#[tokio::test]
async fn test_add_skips_invalid_keys() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));

    let invalid_keys: [fn(&str) -> String; 3] = [
        |k| format!("!{}", k),
        |k| format!("{}_c\u{e4}t", k),
        |k| format!("__{}__", k),
    ];
    for wrap in invalid_keys {
        let body: serde_json::Map<String, Value> = DATA
            .iter()
            .map(|(id, value)| (wrap(id), json!(value)))
            .collect();
        let response = app.send(json_request(Method::PUT, Value::Object(body), auth)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(app.size().await, 0);
    }

    // Non-string and empty values are skipped too
    let response = app
        .send(json_request(
            Method::POST,
            json!({"Garfield": 42, "Doraemon": "", "Top_Cat": null}),
            auth,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.size().await, 0);

    app.put_data().await;
}

#[tokio::test]
async fn test_wrong_body_shape_is_a_no_op() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));
    app.put_data().await;

    // Delete expects an array, put expects an object
    let response = app
        .send(json_request(Method::DELETE, json!({"Doraemon": "x"}), auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .send(json_request(Method::PUT, json!(["Doraemon"]), auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Not declared as JSON
    let response = app
        .send(raw_request(Method::DELETE, Some("text/plain"), r#"["Doraemon"]"#, auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.size().await, DATA.len());
}

#[tokio::test]
async fn test_search_and_delete() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));
    app.put_data().await;

    for (query, expected) in [
        ("cat", vec!["Doraemon", "Heathcliff"]),
        ("  Robotic  ", vec!["Doraemon"]),
        ("lasagna", vec!["Garfield"]),
        ("loves:lasagna", vec!["Garfield"]),
        ("cat=", vec!["Doraemon", "Heathcliff"]),
        ("alley", vec!["Top_Cat"]),
        ("   ", vec![]),
        ("dog", vec![]),
    ] {
        assert_eq!(app.search(query).await, expected, "query {:?}", query);
    }

    let response = app
        .send(json_request(Method::DELETE, json!(["Doraemon", "!Garfield", 7]), auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(app.size().await, DATA.len() - 1);

    assert_eq!(app.search("cat").await, vec!["Heathcliff"]);
    assert!(app.search("robotic").await.is_empty());

    let ids: Vec<&str> = DATA.iter().map(|(id, _)| *id).collect();
    let response = app.send(json_request(Method::DELETE, json!(ids), auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.size().await, 0);
}

#[tokio::test]
async fn test_over_long_query_returns_nothing() {
    let app = TestApp::new();
    app.put_data().await;

    let query = format!("cat {}", "x".repeat(2000));
    assert!(app.search(&query).await.is_empty());
}

#[tokio::test]
async fn test_put_truncates_values() {
    let app = TestApp::with_limits(
        BackendLimits {
            max_field_value_length: 7,
            ..BackendLimits::default()
        },
        MAX_BODY_BYTES,
    );
    let auth = Some((USERNAME, PASSWORD));

    let response = app
        .send(json_request(
            Method::PUT,
            json!({"Doraemon": "Robotic cat from the future."}),
            auth,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(app.search("robotic").await, vec!["Doraemon"]);
    assert!(app.search("cat").await.is_empty());
}

#[tokio::test]
async fn test_safety_limit() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));

    let over: serde_json::Map<String, Value> = (0..15001)
        .map(|i| (format!("doc{}", i), json!("Robotic cat")))
        .collect();
    let response = app.send(json_request(Method::PUT, Value::Object(over), auth)).await;
    assert_envelope(response, StatusCode::PAYLOAD_TOO_LARGE).await;
    assert_eq!(app.size().await, 0);

    let at_limit: serde_json::Map<String, Value> = (0..15000)
        .map(|i| (format!("doc{}", i), json!("Robotic cat")))
        .collect();
    let response = app
        .send(json_request(Method::PUT, Value::Object(at_limit), auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.size().await, 15000);

    let over: Vec<String> = (0..15001).map(|i| format!("doc{}", i)).collect();
    let response = app.send(json_request(Method::DELETE, json!(over), auth)).await;
    assert_envelope(response, StatusCode::PAYLOAD_TOO_LARGE).await;
    assert_eq!(app.size().await, 15000);

    let at_limit: Vec<String> = (0..15000).map(|i| format!("doc{}", i)).collect();
    let response = app.send(json_request(Method::DELETE, json!(at_limit), auth)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.size().await, 0);
}

#[tokio::test]
async fn test_framework_errors_use_envelope() {
    let app = TestApp::with_limits(BackendLimits::default(), 64);
    let auth = Some((USERNAME, PASSWORD));

    let response = app.send(get_request("/missing", auth)).await;
    assert_envelope(response, StatusCode::NOT_FOUND).await;

    let response = app
        .send(raw_request(Method::PATCH, Some("application/json"), "{}", auth))
        .await;
    assert_envelope(response, StatusCode::METHOD_NOT_ALLOWED).await;

    let big = json!({ "Doraemon": "x".repeat(1024) });
    let response = app.send(json_request(Method::PUT, big, auth)).await;
    assert_envelope(response, StatusCode::PAYLOAD_TOO_LARGE).await;
    assert_eq!(app.size().await, 0);
}

#[tokio::test]
async fn test_put_search_delete_scenario() {
    let app = TestApp::new();
    let auth = Some((USERNAME, PASSWORD));

    let response = app
        .send(json_request(
            Method::PUT,
            json!({"Doraemon": "Robotic cat from the future."}),
            auth,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.search("Robotic").await, vec!["Doraemon"]);

    let response = app
        .send(json_request(Method::DELETE, json!(["Doraemon"]), auth))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.search("Robotic").await.is_empty());
}

/// In-memory backend that fails every chunk containing a trigger identifier.
struct FlakyProvider {
    inner: InMemoryProvider,
    trigger: &'static str,
    error: SearchIndexError,
}

impl FlakyProvider {
    fn check<'a>(&self, mut ids: impl Iterator<Item = &'a str>) -> Result<(), SearchIndexError> {
        if ids.any(|id| id == self.trigger) {
            return Err(self.error.clone());
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndexProvider for FlakyProvider {
    fn limits(&self) -> BackendLimits {
        self.inner.limits()
    }

    async fn ensure_index_exists(&self, index: &str) -> Result<(), SearchIndexError> {
        self.inner.ensure_index_exists(index).await
    }

    async fn put_documents(
        &self,
        index: &str,
        documents: &[Document],
    ) -> Result<(), SearchIndexError> {
        self.check(documents.iter().map(|document| document.id.as_str()))?;
        self.inner.put_documents(index, documents).await
    }

    async fn delete_documents(&self, index: &str, ids: &[String]) -> Result<(), SearchIndexError> {
        self.check(ids.iter().map(String::as_str))?;
        self.inner.delete_documents(index, ids).await
    }

    async fn search(
        &self,
        index: &str,
        query: &str,
        options: &SearchOptions,
    ) -> Result<Vec<String>, SearchIndexError> {
        self.inner.search(index, query, options).await
    }
}

fn flaky_router(provider: Arc<FlakyProvider>) -> Router {
    let state = AppState::new(
        SearchIndexService::new(provider),
        Credentials::new(USERNAME, PASSWORD),
    );
    create_app(state, MAX_BODY_BYTES)
}

fn data_object() -> Value {
    Value::Object(
        DATA.iter()
            .map(|(id, value)| (id.to_string(), json!(value)))
            .collect(),
    )
}

#[tokio::test]
async fn test_backend_failures_still_answer_ok() {
    let limits = BackendLimits {
        max_documents_per_call: 2,
        ..BackendLimits::default()
    };
    let auth = Some((USERNAME, PASSWORD));

    // Chunks are [Doraemon, Garfield], [Heathcliff, Hello_Kitty], [Top_Cat]
    let transient = Arc::new(FlakyProvider {
        inner: InMemoryProvider::with_limits(limits),
        trigger: "Garfield",
        error: SearchIndexError::put("rejected"),
    });
    let router = flaky_router(transient.clone());

    let response = router
        .clone()
        .oneshot(json_request(Method::PUT, data_object(), auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
    assert_eq!(
        transient.inner.document_ids(USERNAME).await,
        vec!["Heathcliff", "Hello_Kitty", "Top_Cat"]
    );

    let quota = Arc::new(FlakyProvider {
        inner: InMemoryProvider::with_limits(limits),
        trigger: "Top_Cat",
        error: SearchIndexError::quota_exceeded("daily quota"),
    });
    let documents: Vec<Document> = DATA
        .iter()
        .map(|(id, value)| Document::new(*id, *value))
        .collect();
    quota.inner.put_documents(USERNAME, &documents[..2]).await.unwrap();
    quota.inner.put_documents(USERNAME, &documents[2..4]).await.unwrap();
    quota.inner.put_documents(USERNAME, &documents[4..]).await.unwrap();
    let router = flaky_router(quota.clone());

    let ids: Vec<&str> = DATA.iter().map(|(id, _)| *id).collect();
    let response = router
        .oneshot(json_request(Method::DELETE, json!(ids), auth))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
    assert!(quota
        .inner
        .document_ids(USERNAME)
        .await
        .contains(&"Top_Cat".to_string()));
}
