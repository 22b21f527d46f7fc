//! Contract definitions: endpoints, requests, responses and their parameters.
//!
//! Produced by an upstream parser; read-only from here on.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::{Type, TypeDef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<SecurityHeader>,
    #[serde(default)]
    pub config: Config,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub param_serialization_strategy: ParamSerializationStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSerializationStrategy {
    #[serde(default)]
    pub query: QuerySerialization,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySerialization {
    #[serde(default)]
    pub array: QueryArrayStrategy,
}

/// How array-typed query params are laid out on the wire.
///
/// - `ampersand`: `?id=3&id=4&id=5`
/// - `comma`: `?id=3,4,5`
/// - `space`: `?id=3%204%205`
/// - `pipe`: `?id=3|4|5`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryArrayStrategy {
    #[default]
    Ampersand,
    Comma,
    Space,
    Pipe,
}

impl QueryArrayStrategy {
    /// Separator inside a single value, if the strategy uses one.
    pub fn delimiter(self) -> Option<char> {
        match self {
            QueryArrayStrategy::Ampersand => None,
            QueryArrayStrategy::Comma => Some(','),
            QueryArrayStrategy::Space => Some(' '),
            QueryArrayStrategy::Pipe => Some('|'),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityHeader {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive: the observed method is upper-cased first.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            "HEAD" => Ok(HttpMethod::Head),
            other => Err(format!("unsupported HTTP method `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub method: HttpMethod,
    /// Template with `:name` segments, e.g. `/users/:id`.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Request>,
    #[serde(default)]
    pub responses: Vec<Response>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_response: Option<DefaultResponse>,
    #[serde(default)]
    pub draft: bool,
}

impl Endpoint {
    /// Names of the `:name` segments of the path template, in order.
    pub fn path_template_params(&self) -> impl Iterator<Item = &str> {
        self.path.split('/').filter_map(|segment| segment.strip_prefix(':'))
    }

    pub fn headers(&self) -> &[Header] {
        self.request.as_ref().map(|r| r.headers.as_slice()).unwrap_or_default()
    }

    pub fn path_params(&self) -> &[PathParam] {
        self.request.as_ref().map(|r| r.path_params.as_slice()).unwrap_or_default()
    }

    pub fn query_params(&self) -> &[QueryParam] {
        self.request.as_ref().map(|r| r.query_params.as_slice()).unwrap_or_default()
    }

    pub fn request_body(&self) -> Option<&Body> {
        self.request.as_ref().and_then(|r| r.body.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub path_params: Vec<PathParam>,
    #[serde(default)]
    pub query_params: Vec<QueryParam>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

/// A response without a status; used when no specific status matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefaultResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub optional: bool,
}

/// Path params are always required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(rename = "type")]
    pub ty: Type,
}

// ----------------------------- Shorthands -------------------------------- //

impl Header {
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Header { name: name.into(), description: None, ty, optional: false }
    }
    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Header { name: name.into(), description: None, ty, optional: true }
    }
}

impl PathParam {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        PathParam { name: name.into(), description: None, ty }
    }
}

impl QueryParam {
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        QueryParam { name: name.into(), description: None, ty, optional: false }
    }
    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        QueryParam { name: name.into(), description: None, ty, optional: true }
    }
}

impl Body {
    pub fn new(ty: Type) -> Self {
        Body { ty }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_ampersand() {
        let contract: Contract = serde_json::from_str(r#"{"name":"c"}"#).unwrap();
        assert_eq!(
            contract.config.param_serialization_strategy.query.array,
            QueryArrayStrategy::Ampersand
        );

        let contract: Contract = serde_json::from_str(
            r#"{"name":"c","config":{"paramSerializationStrategy":{"query":{"array":"pipe"}}}}"#,
        )
        .unwrap();
        assert_eq!(
            contract.config.param_serialization_strategy.query.array.delimiter(),
            Some('|')
        );
    }

    #[test]
    fn method_parsing_ignores_case() {
        assert_eq!("post".parse::<HttpMethod>(), Ok(HttpMethod::Post));
        assert!("TRACE".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn template_params_in_order() {
        let endpoint: Endpoint = serde_json::from_str(
            r#"{"name":"e","method":"GET","path":"/users/:id/items/:itemId"}"#,
        )
        .unwrap();
        let params: Vec<_> = endpoint.path_template_params().collect();
        assert_eq!(params, vec!["id", "itemId"]);
        assert!(endpoint.headers().is_empty());
    }
}
