//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results. Bodies are compared as decoded JSON (not raw
//! strings) to avoid false negatives from field-ordering differences.

use pipl_core::data::{FieldKind, Person};
use pipl_core::{
    ApiError, ClientConfig, HttpMethod, HttpResponse, SearchClient, SearchCriteria,
    SearchOptions, SearchRequest, ValidationError,
};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const BASE_URL: &str = "http://localhost:3000";

fn client() -> SearchClient {
    SearchClient::new(ClientConfig::new(BASE_URL))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct VectorInput {
    api_key: Option<String>,
    criteria: Option<SearchCriteria>,
    person: Option<Person>,
    search_pointer: Option<String>,
    options: SearchOptions,
}

impl VectorInput {
    fn into_request(self) -> SearchRequest {
        let mut request = match (self.search_pointer, self.person, self.criteria) {
            (Some(pointer), _, _) => SearchRequest::from_search_pointer(&pointer),
            (None, Some(person), _) => SearchRequest::from_person(person),
            (None, None, Some(criteria)) => SearchRequest::from_criteria(criteria),
            (None, None, None) => SearchRequest::default(),
        };
        request.api_key = self.api_key;
        request.with_options(self.options)
    }
}

/// Parse the method string from test vectors into `HttpMethod`.
fn parse_method(s: &str) -> HttpMethod {
    match s {
        "POST" => HttpMethod::Post,
        other => panic!("unknown method: {other}"),
    }
}

/// Decode a form body into a JSON object, parsing the `person` value.
fn decode_form(body: &str) -> Value {
    let mut out = Map::new();
    for pair in body.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap();
        let value = urlencoding::decode(value).unwrap().into_owned();
        let value = if key == "person" {
            serde_json::from_str(&value).unwrap()
        } else {
            Value::String(value)
        };
        out.insert(key.to_string(), value);
    }
    Value::Object(out)
}

fn simulated(sim: &Value) -> HttpResponse {
    let headers = sim["headers"]
        .as_array()
        .map(|headers| {
            headers
                .iter()
                .map(|h| {
                    let pair = h.as_array().unwrap();
                    (
                        pair[0].as_str().unwrap().to_string(),
                        pair[1].as_str().unwrap().to_string(),
                    )
                })
                .collect()
        })
        .unwrap_or_default();
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers,
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn validation_name(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingApiKey => "MissingApiKey",
        ValidationError::ProbabilityOutOfRange(_) => "ProbabilityOutOfRange",
        ValidationError::MatchOutOfRange(_) => "MatchOutOfRange",
        ValidationError::InsufficientCriteria => "InsufficientCriteria",
        ValidationError::UnsearchableFields(_) => "UnsearchableFields",
    }
}

// ---------------------------------------------------------------------------
// Build
// ---------------------------------------------------------------------------

#[test]
fn build_search_test_vectors() {
    let raw = include_str!("../../test-vectors/build_search.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: VectorInput = serde_json::from_value(case["input"].clone()).unwrap();
        let expected = &case["expected_request"];

        let req = c.build_search(&input.into_request()).unwrap();
        assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
        assert_eq!(req.url, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: url");
        assert_eq!(
            req.headers[0],
            (
                "content-type".to_string(),
                expected["content_type"].as_str().unwrap().to_string()
            ),
            "{name}: content type"
        );
        assert_eq!(
            req.headers[1],
            (
                "user-agent".to_string(),
                format!("pipl-rust/{}", env!("CARGO_PKG_VERSION"))
            ),
            "{name}: user agent"
        );
        assert_eq!(decode_form(req.body.as_deref().unwrap()), expected["body"], "{name}: body");
    }
}

#[test]
fn build_search_error_vectors() {
    let raw = include_str!("../../test-vectors/build_search.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["error_cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input: VectorInput = serde_json::from_value(case["input"].clone()).unwrap();

        let err = c.build_search(&input.into_request()).unwrap_err();
        let kind = match &err {
            ApiError::Validation(v) => validation_name(v),
            other => panic!("{name}: expected a validation error, got {other:?}"),
        };
        assert_eq!(kind, case["expected_error"].as_str().unwrap(), "{name}: error");
    }
}

// ---------------------------------------------------------------------------
// Parse
// ---------------------------------------------------------------------------

#[test]
fn parse_search_test_vectors() {
    let raw = include_str!("../../test-vectors/parse_search.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let response = c.parse_search(simulated(&case["simulated_response"])).unwrap();

        let person = response.person.as_ref();
        let summary = json!({
            "http_status_code": response.http_status_code,
            "persons_count": response.persons_count,
            "search_id": response.search_id,
            "person_id": person.and_then(|p| p.person_id.clone()),
            "name": response.name().and_then(|n| n.display()),
            "email": response.email().and_then(|e| e.address.clone()),
            "possible_persons": response
                .possible_persons
                .iter()
                .map(|p| json!([p.person_id, p.match_score, p.search_pointer]))
                .collect::<Vec<_>>(),
            "sources": response.sources.len(),
            "matching_sources": response.matching_sources().len(),
            "warnings": response.warnings,
            "quota_remaining": response.quota.remaining(),
        });
        assert_eq!(summary, case["expected_result"], "{name}: parsed result");
    }
}

#[test]
fn parse_search_error_vectors() {
    let raw = include_str!("../../test-vectors/parse_search.json");
    let vectors: Value = serde_json::from_str(raw).unwrap();

    let c = client();
    for case in vectors["error_cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let err = c.parse_search(simulated(&case["simulated_response"])).unwrap_err();

        let actual = match err {
            ApiError::Search {
                status,
                message,
                warnings,
            } => json!({"kind": "Search", "status": status, "message": message, "warnings": warnings}),
            ApiError::DeserializationError(_) => json!({"kind": "DeserializationError"}),
            other => panic!("{name}: unexpected error {other:?}"),
        };
        assert_eq!(actual, case["expected_error"], "{name}: error");
    }
}
