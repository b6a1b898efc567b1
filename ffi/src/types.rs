//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion functions live here
//! to keep `lib.rs` focused on the `extern "C"` surface.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use pipl_core::data::{FieldKind, Person};
use pipl_core::error::ApiError;
use pipl_core::http::{HttpMethod, HttpResponse};
use pipl_core::{SearchCriteria, SearchOptions, SearchRequest, SearchResponse};
use serde::Deserialize;

/// Opaque handle to a `SearchClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiSearchClient {
    pub(crate) inner: pipl_core::SearchClient,
}

/// Allocate a C string, dropping interior NUL bytes rather than failing.
pub(crate) fn c_string(s: impl Into<String>) -> *mut c_char {
    let mut bytes = s.into().into_bytes();
    bytes.retain(|b| *b != 0);
    CString::new(bytes).unwrap_or_default().into_raw()
}

fn opt_c_string(s: Option<String>) -> *mut c_char {
    s.map(c_string).unwrap_or(std::ptr::null_mut())
}

/// Read a borrowed C string. Null and invalid UTF-8 read as `None`.
pub(crate) fn read_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Free a C string allocated by `c_string`. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

/// Hand a vector to C as a pointer/length pair. Empty vectors become null.
fn into_raw_parts<T>(items: Vec<T>) -> (*mut T, u32) {
    if items.is_empty() {
        return (std::ptr::null_mut(), 0);
    }
    let boxed = items.into_boxed_slice();
    let len = boxed.len() as u32;
    (Box::into_raw(boxed) as *mut T, len)
}

/// Reclaim a vector handed out by `into_raw_parts`.
pub(crate) unsafe fn from_raw_parts<T>(ptr: *mut T, len: u32) -> Vec<T> {
    if ptr.is_null() || len == 0 {
        return Vec::new();
    }
    let slice = std::ptr::slice_from_raw_parts_mut(ptr, len as usize);
    unsafe { Box::from_raw(slice) }.into_vec()
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// JSON accepted by `pipl_build_search`. At most one of `search_pointer`,
/// `person` and `criteria` is used, in that order of precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SearchInput {
    pub criteria: Option<SearchCriteria>,
    pub person: Option<Person>,
    pub search_pointer: Option<String>,
    pub api_key: Option<String>,
    pub options: SearchOptions,
}

impl SearchInput {
    pub(crate) fn into_request(self) -> SearchRequest {
        let mut request = if let Some(pointer) = self.search_pointer {
            SearchRequest::from_search_pointer(&pointer)
        } else if let Some(person) = self.person {
            SearchRequest::from_person(person)
        } else {
            SearchRequest::from_criteria(self.criteria.unwrap_or_default())
        };
        request.api_key = self.api_key;
        request.with_options(self.options)
    }
}

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `pipl_build_search`. The C caller executes the request and
/// frees it with `pipl_free_request`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: pipl_core::HttpRequest) -> *mut Self {
        let headers: Vec<FfiHeader> = req
            .headers
            .into_iter()
            .map(|(k, v)| FfiHeader {
                key: c_string(k),
                value: c_string(v),
            })
            .collect();
        let (headers, headers_len) = into_raw_parts(headers);

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: c_string(req.url),
            headers,
            headers_len,
            body: opt_c_string(req.body),
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A borrowed header pair supplied by the caller.
#[repr(C)]
pub struct FfiHeaderRef {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this after executing the request, then passes a
/// pointer to `pipl_parse_search`. The FFI layer reads but does not free
/// these fields. `headers` may be null when `headers_len` is 0.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiHeaderRef,
    pub headers_len: u32,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    pub(crate) fn to_core(&self) -> HttpResponse {
        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            let pairs = unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            pairs
                .iter()
                .filter_map(|h| Some((read_c_str(h.key)?.to_string(), read_c_str(h.value)?.to_string())))
                .collect()
        };
        HttpResponse {
            status: self.status,
            headers,
            body: read_c_str(self.body).unwrap_or("").to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiSearchResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Validation = 1,
    Search = 2,
    Deserialization = 3,
    Serialization = 4,
    Transport = 5,
    Panic = 6,
    NullArg = 7,
}

/// One candidate from `possible_persons`.
#[repr(C)]
pub struct FfiPossiblePerson {
    pub person_id: *mut c_char,
    /// Negative when the server sent no score.
    pub match_score: f64,
    pub search_pointer: *mut c_char,
    pub display_name: *mut c_char,
}

/// The parts of a `SearchResponse` a C caller usually needs. The full
/// matched person is carried as JSON.
#[repr(C)]
pub struct FfiSearchSummary {
    pub person_json: *mut c_char,
    pub persons_count: u32,
    pub visible_sources: u32,
    pub possible_persons: *mut FfiPossiblePerson,
    pub possible_persons_len: u32,
    /// Remaining quota, or -1 when the headers did not report it.
    pub quota_remaining: i64,
}

impl FfiSearchSummary {
    fn from_core(response: SearchResponse) -> Self {
        let person_json = response
            .person
            .as_ref()
            .and_then(|p| serde_json::to_string(p).ok());
        let candidates: Vec<FfiPossiblePerson> = response
            .possible_persons
            .into_iter()
            .map(|p| FfiPossiblePerson {
                display_name: opt_c_string(p.names.first().and_then(|n| n.display())),
                match_score: p.match_score.unwrap_or(-1.0),
                person_id: opt_c_string(p.person_id),
                search_pointer: opt_c_string(p.search_pointer),
            })
            .collect();
        let (possible_persons, possible_persons_len) = into_raw_parts(candidates);

        FfiSearchSummary {
            person_json: opt_c_string(person_json),
            persons_count: response.persons_count.unwrap_or(0),
            visible_sources: response.visible_sources.unwrap_or(0),
            possible_persons,
            possible_persons_len,
            quota_remaining: response.quota.remaining().map_or(-1, i64::from),
        }
    }

    /// Free the owned fields (but not the struct itself).
    pub(crate) fn free_fields(&self) {
        free_c_string(self.person_json);
        for candidate in unsafe { from_raw_parts(self.possible_persons, self.possible_persons_len) } {
            free_c_string(candidate.person_id);
            free_c_string(candidate.search_pointer);
            free_c_string(candidate.display_name);
        }
    }
}

/// Result envelope for `pipl_parse_search`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `summary`
/// points to the parsed payload. On failure `error_code` describes the
/// category, `error_message` is a human-readable C string, and `summary` is
/// null. `http_status` is set whenever a response was parsed.
#[repr(C)]
pub struct FfiSearchResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub summary: *mut FfiSearchSummary,
}

impl FfiSearchResult {
    pub(crate) fn ok(response: SearchResponse) -> *mut Self {
        let http_status = response.http_status_code;
        let summary = Box::new(FfiSearchSummary::from_core(response));
        Box::into_raw(Box::new(FfiSearchResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status,
            summary: Box::into_raw(summary),
        }))
    }

    fn failure(error_code: FfiErrorCode, http_status: u16, message: String) -> *mut Self {
        Box::into_raw(Box::new(FfiSearchResult {
            error_code,
            error_message: c_string(message),
            http_status,
            summary: std::ptr::null_mut(),
        }))
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let (code, status) = match &err {
            ApiError::Validation(_) => (FfiErrorCode::Validation, 0),
            ApiError::Search { status, .. } => (FfiErrorCode::Search, *status),
            ApiError::DeserializationError(_) => (FfiErrorCode::Deserialization, 200),
            ApiError::SerializationError(_) => (FfiErrorCode::Serialization, 0),
            ApiError::Transport(_) => (FfiErrorCode::Transport, 0),
        };
        Self::failure(code, status, err.to_string())
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::failure(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::failure(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
