//! Drive the C surface the way a foreign caller would: build a request through
//! `pipl_build_search`, perform the HTTP call with ureq, hand the raw response
//! back to `pipl_parse_search`.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use pipl_ffi::types::{FfiErrorCode, FfiHeaderRef, FfiHttpRequest, FfiHttpResponse, FfiSearchClient};
use pipl_ffi::*;

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn str_of<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
}

fn new_client(base_url: &str, api_key: &str) -> *mut FfiSearchClient {
    let url = CString::new(base_url).unwrap();
    let key = CString::new(api_key).unwrap();
    let client = pipl_client_new(url.as_ptr(), key.as_ptr());
    assert!(!client.is_null());
    client
}

/// Status, headers and body as returned by the server.
struct Raw {
    status: u16,
    headers: Vec<(CString, CString)>,
    body: CString,
}

fn execute(req: *const FfiHttpRequest) -> Raw {
    let req = unsafe { &*req };
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .build()
        .new_agent();

    let mut builder = agent.post(str_of(req.url));
    let headers = unsafe { std::slice::from_raw_parts(req.headers, req.headers_len as usize) };
    for h in headers {
        builder = builder.header(str_of(h.key), str_of(h.value));
    }
    let mut response = builder.send(str_of(req.body)).unwrap();

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                CString::new(name.as_str()).unwrap(),
                CString::new(value.to_str().unwrap()).unwrap(),
            )
        })
        .collect();
    let body = CString::new(response.body_mut().read_to_string().unwrap()).unwrap();
    Raw { status, headers, body }
}

fn search(client: *mut FfiSearchClient, request_json: &str) -> *mut pipl_ffi::types::FfiSearchResult {
    let json = CString::new(request_json).unwrap();
    let mut error: *mut c_char = std::ptr::null_mut();
    let req = pipl_build_search(client, json.as_ptr(), &mut error);
    assert!(error.is_null(), "build failed");
    assert!(!req.is_null());

    let raw = execute(req);
    pipl_free_request(req);

    let header_refs: Vec<FfiHeaderRef> = raw
        .headers
        .iter()
        .map(|(k, v)| FfiHeaderRef {
            key: k.as_ptr(),
            value: v.as_ptr(),
        })
        .collect();
    let response = FfiHttpResponse {
        status: raw.status,
        headers: header_refs.as_ptr(),
        headers_len: header_refs.len() as u32,
        body: raw.body.as_ptr(),
    };
    pipl_parse_search(client, &response)
}

#[test]
fn email_search_round_trip() {
    let client = new_client(&start_server(), "testing-key");

    let result = search(client, r#"{"criteria":{"email":"clark.kent@example.com"}}"#);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    assert_eq!(r.http_status, 200);

    let summary = unsafe { &*r.summary };
    assert_eq!(summary.persons_count, 1);
    assert_eq!(summary.possible_persons_len, 0);
    // fresh server, first call
    assert_eq!(summary.quota_remaining, 999);

    let person: serde_json::Value = serde_json::from_str(str_of(summary.person_json)).unwrap();
    assert_eq!(person["@id"], mock_server::fixtures::CLARK_ID);
    assert_eq!(person["names"][0]["display"], "Clark Joseph Kent");

    pipl_free_result(result);
    pipl_client_free(client);
}

#[test]
fn possible_persons_then_search_pointer() {
    let client = new_client(&start_server(), "testing-key");

    let result = search(client, r#"{"criteria":{"first_name":"Brian","last_name":"Perks"}}"#);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let summary = unsafe { &*r.summary };
    assert!(summary.person_json.is_null());
    assert_eq!(summary.possible_persons_len, 4);

    let candidates = unsafe {
        std::slice::from_raw_parts(summary.possible_persons, summary.possible_persons_len as usize)
    };
    assert!(candidates[0].match_score > candidates[3].match_score);
    let pointer = str_of(candidates[0].search_pointer).to_string();
    let person_id = str_of(candidates[0].person_id).to_string();
    pipl_free_result(result);

    let request = serde_json::json!({ "search_pointer": pointer }).to_string();
    let result = search(client, &request);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Ok);
    let summary = unsafe { &*r.summary };
    let person: serde_json::Value = serde_json::from_str(str_of(summary.person_json)).unwrap();
    assert_eq!(person["@id"], person_id.as_str());

    pipl_free_result(result);
    pipl_client_free(client);
}

#[test]
fn invalid_key_is_a_search_error() {
    let client = new_client(&start_server(), "invalid");

    let result = search(client, r#"{"criteria":{"email":"clark.kent@example.com"}}"#);
    let r = unsafe { &*result };
    assert_eq!(r.error_code, FfiErrorCode::Search);
    assert_eq!(r.http_status, 403);
    assert!(r.summary.is_null());
    assert!(str_of(r.error_message).starts_with("HTTP 403"));

    pipl_free_result(result);
    pipl_client_free(client);
}
