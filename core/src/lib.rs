//! Synchronous client core for the Pipl person-search API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). A `Transport` executes the
//! round-trip; `UreqTransport` is provided, and foreign callers can use the
//! FFI crate to do it themselves.
//!
//! # Design
//! - `data` is the person-record model: field kinds, containers and their
//!   display/searchability rules. It maps one-to-one onto the JSON.
//! - `request` turns criteria into a validated `SearchRequest`; `response`
//!   holds the parsed `SearchResponse` and its helpers.
//! - `SearchClient` holds only a `ClientConfig`. A search is split into
//!   `build_search` and `parse_search`, so the I/O boundary is explicit.
//! - Types use owned `String` / `Vec` fields to simplify FFI mapping.
//! - The mock server does not depend on this crate; integration tests catch
//!   schema drift.

pub mod client;
pub mod config;
pub mod data;
pub mod error;
pub mod http;
pub mod request;
pub mod response;
pub mod transport;

pub use client::SearchClient;
pub use config::ClientConfig;
pub use data::{Field, FieldContainer, FieldKind, Person, Relationship, Source};
pub use error::{ApiError, ConfigError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use request::{SearchCriteria, SearchOptions, SearchRequest, ShowSources};
pub use response::{AvailableData, Quota, SearchResponse};
pub use transport::{Transport, UreqTransport};
