//! Core data types for describing outbound requests

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

/// HTTP methods supported by request descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// The canonical uppercase token for this method
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }
}

impl Default for HttpMethod {
    fn default() -> Self {
        HttpMethod::Get
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of an outbound call, before it is resolved against
/// an endpoint [`Configuration`](crate::http::Configuration).
///
/// Query parameters are kept in a `BTreeMap` so two descriptors with the same
/// parameters always produce the same URL string.
#[derive(Debug, Clone, Default)]
pub struct RequestDescriptor {
    /// Request path, joined onto the configuration's base URL. A missing
    /// leading slash is corrected during request construction.
    pub path: String,
    /// HTTP method
    pub method: HttpMethod,
    /// Headers specific to this request; override configuration defaults on
    /// key collision
    pub headers: HashMap<String, String>,
    /// Query parameters, keys unique
    pub query: BTreeMap<String, String>,
    /// Optional request body
    pub body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Create a descriptor for the given path and method
    pub fn new(path: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            path: path.into(),
            method,
            ..Self::default()
        }
    }

    /// Shorthand for a GET descriptor
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(path, HttpMethod::Get)
    }

    /// Shorthand for a POST descriptor
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(path, HttpMethod::Post)
    }

    /// Add a single header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Merge a set of headers into the descriptor
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add a single query parameter
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Merge a set of query parameters into the descriptor
    pub fn with_query(mut self, query: BTreeMap<String, String>) -> Self {
        self.query.extend(query);
        self
    }

    /// Attach a raw body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Attach a JSON body, setting no headers (the configuration or caller
    /// decides on Content-Type)
    pub fn with_json_body(mut self, body: &serde_json::Value) -> crate::Result<Self> {
        self.body = Some(serde_json::to_vec(body)?);
        Ok(self)
    }
}
