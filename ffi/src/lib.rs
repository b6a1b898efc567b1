//! C-ABI wrapper around `pipl-core`.
//!
//! # Overview
//! Exposes search request building and response parsing through `extern "C"`
//! functions so any language with a C FFI can drive the API while doing the
//! HTTP round-trip itself.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `pipl_build_search` takes the search as JSON (`criteria`, `person`,
//!   `search_pointer`, `api_key`, `options`), which keeps the ABI small while
//!   the request model grows.
//! - A single `FfiSearchResult` envelope conveys success payloads and errors
//!   uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `pipl_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, UnwindSafe};

use pipl_core::{ClientConfig, SearchClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a new `SearchClient` bound to `base_url`. `api_key` may be null.
///
/// Returns null if `base_url` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `pipl_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_client_new(
    base_url: *const c_char,
    api_key: *const c_char,
) -> *mut FfiSearchClient {
    catch_unwind(|| {
        let Some(url) = read_c_str(base_url) else {
            return std::ptr::null_mut();
        };
        let mut config = ClientConfig::new(url);
        config.api_key = read_c_str(api_key).map(str::to_string);
        let client = SearchClient::new(config);
        Box::into_raw(Box::new(FfiSearchClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `pipl_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_client_free(client: *mut FfiSearchClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

// ---------------------------------------------------------------------------
// Build / parse
// ---------------------------------------------------------------------------

fn set_error(out_error: *mut *mut c_char, message: String) {
    if !out_error.is_null() {
        unsafe { *out_error = c_string(message) };
    }
}

/// Run `build`, turning a panic into null plus a message in `out_error`.
fn build_guarded<F>(out_error: *mut *mut c_char, build: F) -> *mut FfiHttpRequest
where
    F: FnOnce() -> *mut FfiHttpRequest + UnwindSafe,
{
    catch_unwind(build).unwrap_or_else(|_| {
        set_error(out_error, "panic in pipl_build_search".to_string());
        std::ptr::null_mut()
    })
}

/// Build the HTTP request for a search described by `request_json`.
///
/// Returns null on failure. When `out_error` is non-null it then receives an
/// error message, to be freed with `pipl_free_string`.
/// The caller must free the returned pointer with `pipl_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_build_search(
    client: *const FfiSearchClient,
    request_json: *const c_char,
    out_error: *mut *mut c_char,
) -> *mut FfiHttpRequest {
    build_guarded(out_error, || {
        if client.is_null() {
            set_error(out_error, "null argument: client".to_string());
            return std::ptr::null_mut();
        }
        let Some(json) = read_c_str(request_json) else {
            set_error(out_error, "null argument: request_json".to_string());
            return std::ptr::null_mut();
        };
        let client = unsafe { &*client };
        let input: SearchInput = match serde_json::from_str(json) {
            Ok(input) => input,
            Err(e) => {
                set_error(out_error, format!("invalid request JSON: {e}"));
                return std::ptr::null_mut();
            }
        };
        match client.inner.build_search(&input.into_request()) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(e) => {
                set_error(out_error, e.to_string());
                std::ptr::null_mut()
            }
        }
    })
}

/// Parse the HTTP response of a search.
///
/// Always returns a result; check `error_code` before reading `summary`.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_parse_search(
    client: *const FfiSearchClient,
    response: *const FfiHttpResponse,
) -> *mut FfiSearchResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiSearchResult::null_arg("client");
        }
        if response.is_null() {
            return FfiSearchResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        match client.inner.parse_search(resp.to_core()) {
            Ok(parsed) => FfiSearchResult::ok(parsed),
            Err(e) => FfiSearchResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiSearchResult::panic("panic in pipl_parse_search"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `pipl_build_search`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        for h in unsafe { from_raw_parts(req.headers, req.headers_len) } {
            free_c_string(h.key);
            free_c_string(h.value);
        }
    });
}

/// Free an `FfiSearchResult` returned by `pipl_parse_search`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_free_result(result: *mut FfiSearchResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if !result.summary.is_null() {
            let summary = unsafe { Box::from_raw(result.summary) };
            summary.free_fields();
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn pipl_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::{CStr, CString};

    fn client_with_key() -> *mut FfiSearchClient {
        let url = CString::new("http://localhost:3000").unwrap();
        let key = CString::new("sample-key").unwrap();
        pipl_client_new(url.as_ptr(), key.as_ptr())
    }

    fn str_of<'a>(ptr: *const c_char) -> &'a str {
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap()
    }

    fn response(status: u16, body: &CString) -> FfiHttpResponse {
        FfiHttpResponse {
            status,
            headers: std::ptr::null(),
            headers_len: 0,
            body: body.as_ptr(),
        }
    }

    #[test]
    fn client_new_and_free() {
        let client = client_with_key();
        assert!(!client.is_null());
        pipl_client_free(client);
    }

    #[test]
    fn client_new_without_key() {
        let url = CString::new("http://localhost:3000").unwrap();
        let client = pipl_client_new(url.as_ptr(), std::ptr::null());
        assert!(!client.is_null());
        pipl_client_free(client);
    }

    #[test]
    fn client_new_null_url_returns_null() {
        let client = pipl_client_new(std::ptr::null(), std::ptr::null());
        assert!(client.is_null());
    }

    #[test]
    fn client_free_null_is_safe() {
        pipl_client_free(std::ptr::null_mut());
    }

    #[test]
    fn build_search_from_criteria() {
        let client = client_with_key();
        let json = CString::new(r#"{"criteria":{"email":"clark.kent@example.com"},"options":{"hide_sponsored":true}}"#).unwrap();
        let mut error: *mut c_char = std::ptr::null_mut();
        let req = pipl_build_search(client, json.as_ptr(), &mut error);
        assert!(!req.is_null());
        assert!(error.is_null());

        let req_ref = unsafe { &*req };
        assert!(matches!(req_ref.method, FfiHttpMethod::Post));
        assert_eq!(
            str_of(req_ref.url),
            "http://localhost:3000/search/?key=sample-key&hide_sponsored=true"
        );
        assert_eq!(req_ref.headers_len, 2);
        let headers = unsafe { std::slice::from_raw_parts(req_ref.headers, 2) };
        assert_eq!(str_of(headers[0].key), "content-type");
        assert_eq!(str_of(headers[0].value), "application/x-www-form-urlencoded");
        assert!(str_of(req_ref.body).starts_with("person=%7B%22emails%22"));

        pipl_free_request(req);
        pipl_client_free(client);
    }

    #[test]
    fn build_search_pointer_with_request_key() {
        let url = CString::new("http://localhost:3000").unwrap();
        let client = pipl_client_new(url.as_ptr(), std::ptr::null());
        let json = CString::new(r#"{"search_pointer":"abc","api_key":"request-key"}"#).unwrap();
        let req = pipl_build_search(client, json.as_ptr(), std::ptr::null_mut());
        assert!(!req.is_null());

        let req_ref = unsafe { &*req };
        assert_eq!(str_of(req_ref.url), "http://localhost:3000/search/?key=request-key");
        assert_eq!(str_of(req_ref.body), "search_pointer=abc");

        pipl_free_request(req);
        pipl_client_free(client);
    }

    #[test]
    fn build_search_validation_error_is_reported() {
        let client = client_with_key();
        let json = CString::new(r#"{"criteria":{"first_name":"brian"}}"#).unwrap();
        let mut error: *mut c_char = std::ptr::null_mut();
        let req = pipl_build_search(client, json.as_ptr(), &mut error);
        assert!(req.is_null());
        assert!(!error.is_null());
        assert!(str_of(error).starts_with("invalid search request"));

        pipl_free_string(error);
        pipl_client_free(client);
    }

    #[test]
    fn build_search_bad_json_is_reported() {
        let client = client_with_key();
        let json = CString::new("{not json").unwrap();
        let mut error: *mut c_char = std::ptr::null_mut();
        let req = pipl_build_search(client, json.as_ptr(), &mut error);
        assert!(req.is_null());
        assert!(str_of(error).starts_with("invalid request JSON"));

        pipl_free_string(error);
        pipl_client_free(client);
    }

    #[test]
    fn build_search_reports_caught_panic() {
        let mut error: *mut c_char = std::ptr::null_mut();
        let req = build_guarded(&mut error, || panic!("boom"));
        assert!(req.is_null());
        assert_eq!(str_of(error), "panic in pipl_build_search");
        pipl_free_string(error);
    }

    #[test]
    fn build_search_with_huge_age_succeeds() {
        let client = client_with_key();
        let json = CString::new(r#"{"criteria":{"email":"a@b.co","from_age":4294967295}}"#).unwrap();
        let mut error: *mut c_char = std::ptr::null_mut();
        let req = pipl_build_search(client, json.as_ptr(), &mut error);
        assert!(!req.is_null());
        assert!(error.is_null());
        assert!(str_of(unsafe { &*req }.body).contains("%22dob%22"));

        pipl_free_request(req);
        pipl_client_free(client);
    }

    #[test]
    fn build_search_null_client_returns_null() {
        let json = CString::new("{}").unwrap();
        let req = pipl_build_search(std::ptr::null(), json.as_ptr(), std::ptr::null_mut());
        assert!(req.is_null());
    }

    #[test]
    fn parse_search_match() {
        let client = client_with_key();
        let body = CString::new(
            r#"{"@http_status_code":200,"@persons_count":1,"@visible_sources":3,"person":{"@id":"p-1","names":[{"first":"Clark","last":"Kent"}]}}"#,
        )
        .unwrap();
        let key = CString::new("x-apikey-quota-allotted").unwrap();
        let allotted = CString::new("100").unwrap();
        let current_key = CString::new("x-apikey-quota-current").unwrap();
        let current = CString::new("40").unwrap();
        let headers = [
            FfiHeaderRef {
                key: key.as_ptr(),
                value: allotted.as_ptr(),
            },
            FfiHeaderRef {
                key: current_key.as_ptr(),
                value: current.as_ptr(),
            },
        ];
        let resp = FfiHttpResponse {
            status: 200,
            headers: headers.as_ptr(),
            headers_len: 2,
            body: body.as_ptr(),
        };
        let result = pipl_parse_search(client, &resp);
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);
        assert!(r.error_message.is_null());
        assert_eq!(r.http_status, 200);

        let summary = unsafe { &*r.summary };
        assert_eq!(summary.persons_count, 1);
        assert_eq!(summary.visible_sources, 3);
        assert_eq!(summary.possible_persons_len, 0);
        assert!(summary.possible_persons.is_null());
        assert_eq!(summary.quota_remaining, 60);
        let person: serde_json::Value = serde_json::from_str(str_of(summary.person_json)).unwrap();
        assert_eq!(person["@id"], "p-1");
        assert_eq!(person["names"][0]["first"], "Clark");

        pipl_free_result(result);
        pipl_client_free(client);
    }

    #[test]
    fn parse_search_possible_persons() {
        let client = client_with_key();
        let body = CString::new(
            r#"{"@persons_count":2,"possible_persons":[{"@id":"a","@match":0.9,"@search_pointer":"ptr-a","names":[{"first":"Brian","last":"Perks"}]},{"@id":"b","@search_pointer":"ptr-b"}]}"#,
        )
        .unwrap();
        let result = pipl_parse_search(client, &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Ok);

        let summary = unsafe { &*r.summary };
        assert!(summary.person_json.is_null());
        assert_eq!(summary.quota_remaining, -1);
        assert_eq!(summary.possible_persons_len, 2);
        let candidates =
            unsafe { std::slice::from_raw_parts(summary.possible_persons, 2) };
        assert_eq!(str_of(candidates[0].person_id), "a");
        assert_eq!(candidates[0].match_score, 0.9);
        assert_eq!(str_of(candidates[0].search_pointer), "ptr-a");
        assert_eq!(str_of(candidates[0].display_name), "Brian Perks");
        assert_eq!(candidates[1].match_score, -1.0);
        assert!(candidates[1].display_name.is_null());

        pipl_free_result(result);
        pipl_client_free(client);
    }

    #[test]
    fn parse_search_error_status() {
        let client = client_with_key();
        let body = CString::new(r#"{"error":"API key is missing or invalid","warnings":[]}"#).unwrap();
        let result = pipl_parse_search(client, &response(403, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Search);
        assert_eq!(r.http_status, 403);
        assert!(r.summary.is_null());
        assert_eq!(str_of(r.error_message), "HTTP 403: API key is missing or invalid");

        pipl_free_result(result);
        pipl_client_free(client);
    }

    #[test]
    fn parse_search_bad_json() {
        let client = client_with_key();
        let body = CString::new("not json").unwrap();
        let result = pipl_parse_search(client, &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::Deserialization);

        pipl_free_result(result);
        pipl_client_free(client);
    }

    #[test]
    fn parse_null_client_returns_null_arg() {
        let body = CString::new("{}").unwrap();
        let result = pipl_parse_search(std::ptr::null(), &response(200, &body));
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        pipl_free_result(result);
    }

    #[test]
    fn parse_null_response_returns_null_arg() {
        let client = client_with_key();
        let result = pipl_parse_search(client, std::ptr::null());
        let r = unsafe { &*result };
        assert_eq!(r.error_code, FfiErrorCode::NullArg);

        pipl_free_result(result);
        pipl_client_free(client);
    }

    #[test]
    fn c_string_drops_interior_nul() {
        let ptr = c_string("ab\0c");
        assert_eq!(str_of(ptr), "abc");
        pipl_free_string(ptr);
    }

    #[test]
    fn free_request_null_is_safe() {
        pipl_free_request(std::ptr::null_mut());
    }

    #[test]
    fn free_result_null_is_safe() {
        pipl_free_result(std::ptr::null_mut());
    }

    #[test]
    fn free_string_null_is_safe() {
        pipl_free_string(std::ptr::null_mut());
    }
}
