//! # Source Module
//!
//! Where request parameters come from.
//!
//! ## Overview
//!
//! Unmarshalling works on a flat [`Params`] mapping from external name to a
//! dynamically-typed value. Anything implementing [`ParamSource`] can supply
//! it. A failing source aborts the unmarshal call before the target is
//! touched.
//!
//! [`Request`] is the stock source for HTTP requests:
//!
//! - the query string is parsed as `application/x-www-form-urlencoded`
//! - a form body adds its pairs as strings
//! - a JSON body must be an object; its members keep their JSON types
//! - body members override query parameters with the same name
//! - repeated names keep the last occurrence
//!
//! ```rust
//! use brrtbind::source::{ParamSource, Request};
//!
//! let http_request = http::Request::builder()
//!     .uri("/items?limit=10")
//!     .header("content-type", "application/x-www-form-urlencoded")
//!     .body(b"name=widget".to_vec())
//!     .unwrap();
//! let params = Request::from_http(&http_request).params().unwrap();
//! assert_eq!(params["limit"], "10");
//! assert_eq!(params["name"], "widget");
//! ```

use crate::value::value_kind;
use anyhow::{bail, Context};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Flat mapping of request parameter names to raw values.
pub type Params = HashMap<String, Value>;

/// A provider of request parameters.
pub trait ParamSource {
    fn params(&self) -> anyhow::Result<Params>;
}

impl ParamSource for Params {
    fn params(&self) -> anyhow::Result<Params> {
        Ok(self.clone())
    }
}

impl ParamSource for serde_json::Map<String, Value> {
    fn params(&self) -> anyhow::Result<Params> {
        Ok(self
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}

/// Raw pieces of an HTTP request needed to produce parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Query string without the leading `?`
    pub query: Option<String>,
    /// Value of the `Content-Type` header
    pub content_type: Option<String>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl Request {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    #[must_use]
    pub fn with_body(mut self, content_type: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.into());
        self.body = body.into();
        self
    }

    /// Capture query string, content type and body from an `http::Request`.
    pub fn from_http<B: AsRef<[u8]>>(request: &http::Request<B>) -> Self {
        let content_type = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self {
            query: request.uri().query().map(str::to_string),
            content_type,
            body: request.body().as_ref().to_vec(),
        }
    }

    /// Media type of the body, lowercased and without parameters.
    fn media_type(&self) -> String {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

/// Parse `application/x-www-form-urlencoded` input into string parameters.
#[must_use]
pub fn parse_form(input: &[u8]) -> Params {
    url::form_urlencoded::parse(input)
        .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
        .collect()
}

impl ParamSource for Request {
    fn params(&self) -> anyhow::Result<Params> {
        let mut params = self
            .query
            .as_deref()
            .map(|q| parse_form(q.as_bytes()))
            .unwrap_or_default();
        let query_count = params.len();

        if self.body.is_empty() {
            debug!(param_count = query_count, "query parameters parsed");
            return Ok(params);
        }

        let media_type = self.media_type();
        match media_type.as_str() {
            "application/x-www-form-urlencoded" => params.extend(parse_form(&self.body)),
            json if json == "application/json" || json.ends_with("+json") => {
                let body: Value =
                    serde_json::from_slice(&self.body).context("request body is not valid JSON")?;
                match body {
                    Value::Object(members) => params.extend(members),
                    other => bail!("JSON request body must be an object, got {}", value_kind(&other)),
                }
            }
            "" => bail!("request body has no content type"),
            other => bail!("unsupported content type: {other}"),
        }

        debug!(
            query_count,
            param_count = params.len(),
            content_type = %media_type,
            body_size_bytes = self.body.len(),
            "request parameters parsed"
        );
        Ok(params)
    }
}
