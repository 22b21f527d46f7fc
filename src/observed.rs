//! Observed HTTP traffic, as captured by a proxy or a test harness.
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedHeader {
    pub name: String,
    pub value: String,
}

impl ObservedHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        ObservedHeader { name: name.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedRequest {
    pub method: String,
    /// Path including its query string.
    pub path: String,
    #[serde(default)]
    pub headers: Vec<ObservedHeader>,
    /// Parsed JSON body; `None` when no body was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    #[serde(default)]
    pub headers: Vec<ObservedHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// One request/response pair, the unit the CLI and scenario runner replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservedExchange {
    pub request: ObservedRequest,
    pub response: ObservedResponse,
}

impl ObservedRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        ObservedRequest { method: method.into(), path: path.into(), headers: Vec::new(), body: None }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(ObservedHeader::new(name, value));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

impl ObservedResponse {
    pub fn new(status_code: u16) -> Self {
        ObservedResponse { status_code, headers: Vec::new(), body: None }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(ObservedHeader::new(name, value));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Case-insensitive header lookup; the first occurrence wins.
pub fn find_header<'a>(headers: &'a [ObservedHeader], name: &str) -> Option<&'a ObservedHeader> {
    headers.iter().find(|h| h.name.eq_ignore_ascii_case(name))
}
