//! Shared helpers for the integration tests.
//!
//! The harvester uses a blocking HTTP client, so the mock server runs on its
//! own tokio runtime and the code under test runs on the test thread.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tokio::runtime::Runtime;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const ENTITIES: &str = "entities.json";
pub const PAGE_1: &str = "entities_page_1.json";
pub const PAGE_2: &str = "entities_page_2.json";
pub const HISTORY: &str = "history.json";
pub const LOCALES: &str = "locales.json";

/// Load fixture file content.
pub fn load_fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("pontoon")
        .join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e))
}

/// Load and parse a JSON fixture.
pub fn load_json(name: &str) -> serde_json::Value {
    serde_json::from_str(&load_fixture(name)).expect("fixture parse")
}

/// A mock Pontoon server.
pub struct MockPontoon {
    server: MockServer,
    runtime: Runtime,
}

impl MockPontoon {
    pub fn start() -> Self {
        let runtime = Runtime::new().expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Serve `body` for every entities search.
    pub fn entities(&self, fixture: &str) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/get-entities/"))
                .respond_with(json_response(&load_fixture(fixture))),
        );
    }

    /// Serve `fixture` for the entities search of one page.
    pub fn entities_page(&self, page: u32, fixture: &str) {
        self.mount(
            Mock::given(method("POST"))
                .and(path("/get-entities/"))
                .and(body_string_contains(format!("page={page}&")))
                .respond_with(json_response(&load_fixture(fixture))),
        );
    }

    /// Serve the history fixture for every history lookup.
    pub fn history(&self) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/get-history"))
                .respond_with(json_response(&load_fixture(HISTORY))),
        );
    }

    /// Serve the locales fixture for the GraphQL query.
    pub fn locales(&self) {
        self.mount(
            Mock::given(method("GET"))
                .and(path("/graphql"))
                .respond_with(json_response(&load_fixture(LOCALES))),
        );
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .expect("request recording enabled")
    }

    /// Requests sent to `endpoint`.
    pub fn requests_to(&self, endpoint: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() == endpoint)
            .collect()
    }
}

pub fn json_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_owned(), "application/json")
}

/// Decode a form-encoded request body.
pub fn form_body(request: &Request) -> BTreeMap<String, String> {
    url::form_urlencoded::parse(&request.body)
        .into_owned()
        .collect()
}

/// Expected form body of an entities search.
pub fn search_form(page: u32, limit: usize, time: &str) -> BTreeMap<String, String> {
    [
        ("limit", limit.to_string()),
        ("locale", "es".to_string()),
        ("page", page.to_string()),
        ("project", "all-projects".to_string()),
        ("time", time.to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}
