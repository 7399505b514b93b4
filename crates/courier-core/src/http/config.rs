//! Endpoint configuration and request construction
//!
//! A [`Configuration`] is created once at application or test setup, shared
//! read-only by any number of sessions, and turns a [`RequestDescriptor`]
//! into a concrete [`BuiltRequest`]. Construction is pure and fails fast; a
//! partially-built request is never returned.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::error::{Error, Result};
use crate::types::{HttpMethod, RequestDescriptor};

/// Transport security policy applied by the default transport
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    /// Platform trust store, standard certificate validation
    #[default]
    Standard,
    /// Only the given DER-encoded certificates are trusted
    PinnedCertificates(Vec<Vec<u8>>),
}

/// Connect and request timeouts for the default transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Time to establish a connection
    pub connect_timeout: Duration,
    /// Total time for the entire request
    pub request_timeout: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl TimeoutConfig {
    pub fn new(connect_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            request_timeout,
        }
    }

    /// Short timeouts for tests and development
    pub fn fast() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(15),
        }
    }

    /// Generous timeouts for large transfers
    pub fn slow() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(300),
        }
    }

    /// Validate timeout configuration
    pub fn validate(&self) -> Result<()> {
        if self.connect_timeout.is_zero() {
            return Err(Error::configuration("connect timeout cannot be zero"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::configuration("request timeout cannot be zero"));
        }
        if self.request_timeout < self.connect_timeout {
            return Err(Error::configuration(
                "request timeout must be >= connect timeout",
            ));
        }
        Ok(())
    }
}

/// A concrete request built from a configuration and a descriptor.
///
/// The URL string is the canonical match key shared with the stub registry
/// and the contract recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltRequest {
    pub url: Url,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
}

impl BuiltRequest {
    /// Canonical URL string used for stub matching
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

/// Base endpoint configuration shared by sessions
#[derive(Debug, Clone)]
pub struct Configuration {
    base_url: Url,
    default_headers: HashMap<String, String>,
    timeouts: TimeoutConfig,
    security: TransportSecurity,
}

impl Configuration {
    /// Create a configuration from a scheme and host.
    ///
    /// Fails when the pair does not form a valid absolute URL.
    pub fn new(scheme: &str, host: &str) -> Result<Self> {
        let base_url = parse_base(scheme, host)?;
        Ok(Self {
            base_url,
            default_headers: HashMap::new(),
            timeouts: TimeoutConfig::default(),
            security: TransportSecurity::default(),
        })
    }

    /// Create a configuration from a full base URL, which may carry a base
    /// path prepended to every request path.
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::Configuration {
            message: format!("invalid base URL: {base_url}"),
            source: Some(anyhow::Error::new(e)),
        })?;
        if !base_url.has_host() {
            return Err(Error::configuration(format!(
                "base URL has no host: {base_url}"
            )));
        }
        Ok(Self {
            base_url,
            default_headers: HashMap::new(),
            timeouts: TimeoutConfig::default(),
            security: TransportSecurity::default(),
        })
    }

    /// Replace the default header set
    pub fn with_default_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.default_headers = headers;
        self
    }

    /// Add a single default header
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Set connect/request timeouts for the default transport
    pub fn with_timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Set the transport security policy
    pub fn with_security(mut self, security: TransportSecurity) -> Self {
        self.security = security;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn default_headers(&self) -> &HashMap<String, String> {
        &self.default_headers
    }

    pub fn timeouts(&self) -> &TimeoutConfig {
        &self.timeouts
    }

    pub fn security(&self) -> &TransportSecurity {
        &self.security
    }

    /// Build a concrete request from a descriptor.
    ///
    /// Normalizes the path to start with `/`, percent-encodes path segments
    /// and query pairs, and merges default headers first so descriptor
    /// headers win on key collision. Default header values may reference
    /// environment variables as `${ENV:VAR}`; an unset variable fails the
    /// build.
    pub fn build(&self, descriptor: &RequestDescriptor) -> Result<BuiltRequest> {
        let url = compose_url(&self.base_url, &descriptor.path, &descriptor.query)?;

        let mut headers = HashMap::with_capacity(self.default_headers.len() + descriptor.headers.len());
        for (name, value) in &self.default_headers {
            headers.insert(name.clone(), expand_env_vars(value)?);
        }
        for (name, value) in &descriptor.headers {
            headers.insert(name.clone(), value.clone());
        }

        Ok(BuiltRequest {
            url,
            method: descriptor.method,
            headers,
            body: descriptor.body.clone(),
        })
    }
}

fn parse_base(scheme: &str, host: &str) -> Result<Url> {
    let raw = format!("{scheme}://{host}");
    let base_url = Url::parse(&raw).map_err(|e| Error::Configuration {
        message: format!("invalid scheme or host: {raw}"),
        source: Some(anyhow::Error::new(e)),
    })?;
    if !base_url.has_host() {
        return Err(Error::configuration(format!("invalid scheme or host: {raw}")));
    }
    Ok(base_url)
}

/// Build a fully-qualified URL from parts, using the exact normalization and
/// encoding applied by [`Configuration::build`]. The stub registry and the
/// contract recorder build their match keys through this function so a
/// registered key and an incoming request can only differ when the requests
/// themselves differ.
pub fn build_url(
    scheme: &str,
    host: &str,
    path: &str,
    query: &BTreeMap<String, String>,
) -> Result<Url> {
    let base = parse_base(scheme, host)?;
    compose_url(&base, path, query)
}

pub(crate) fn compose_url(base: &Url, path: &str, query: &BTreeMap<String, String>) -> Result<Url> {
    let mut url = base.clone();
    url.set_path(&join_paths(base.path(), path));
    url.set_query(encode_query(query).as_deref());
    if url.host_str().is_none() {
        return Err(Error::request(format!("constructed URL has no host: {url}")));
    }
    Ok(url)
}

fn join_paths(base_path: &str, path: &str) -> String {
    let base = base_path.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

/// Deterministic query encoding: keys sorted, reserved characters
/// percent-encoded (space as `%20`, `&` as `%26`).
fn encode_query(query: &BTreeMap<String, String>) -> Option<String> {
    if query.is_empty() {
        return None;
    }
    let encoded = query
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&");
    Some(encoded)
}

/// Expand environment variables in the format `${ENV:VAR_NAME}`
fn expand_env_vars(value: &str) -> Result<String> {
    if !value.contains("${ENV:") {
        return Ok(value.to_string());
    }

    let re = Regex::new(r"\$\{ENV:([^}]+)\}").expect("valid regex pattern");
    let mut result = value.to_string();

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let env_value = std::env::var(var_name).map_err(|_| {
            Error::configuration(format!("environment variable {var_name} not found"))
        })?;
        result = result.replace(&format!("${{ENV:{var_name}}}"), &env_value);
    }

    Ok(result)
}
