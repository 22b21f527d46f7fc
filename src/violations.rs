//! User-facing diagnostics. Each variant carries a readable `message`;
//! disparity variants also list the nested validator messages.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Violation {
    UndefinedEndpoint { message: String },
    UndefinedEndpointResponse { message: String },
    RequiredRequestHeaderMissing { message: String },
    UndefinedRequestHeader { message: String },
    RequestHeaderTypeDisparity { message: String, type_disparities: Vec<String> },
    PathParamTypeDisparity { message: String, type_disparities: Vec<String> },
    RequiredQueryParamMissing { message: String },
    UndefinedQueryParam { message: String },
    QueryParamTypeDisparity { message: String, type_disparities: Vec<String> },
    UndefinedRequestBody { message: String },
    RequestBodyTypeDisparity { message: String, type_disparities: Vec<String> },
    RequiredResponseHeaderMissing { message: String },
    UndefinedResponseHeader { message: String },
    ResponseHeaderTypeDisparity { message: String, type_disparities: Vec<String> },
    UndefinedResponseBody { message: String },
    ResponseBodyTypeDisparity { message: String, type_disparities: Vec<String> },
}

impl Violation {
    pub fn message(&self) -> &str {
        match self {
            Violation::UndefinedEndpoint { message }
            | Violation::UndefinedEndpointResponse { message }
            | Violation::RequiredRequestHeaderMissing { message }
            | Violation::UndefinedRequestHeader { message }
            | Violation::RequestHeaderTypeDisparity { message, .. }
            | Violation::PathParamTypeDisparity { message, .. }
            | Violation::RequiredQueryParamMissing { message }
            | Violation::UndefinedQueryParam { message }
            | Violation::QueryParamTypeDisparity { message, .. }
            | Violation::UndefinedRequestBody { message }
            | Violation::RequestBodyTypeDisparity { message, .. }
            | Violation::RequiredResponseHeaderMissing { message }
            | Violation::UndefinedResponseHeader { message }
            | Violation::ResponseHeaderTypeDisparity { message, .. }
            | Violation::UndefinedResponseBody { message }
            | Violation::ResponseBodyTypeDisparity { message, .. } => message,
        }
    }

    /// Empty for kinds without nested detail.
    pub fn type_disparities(&self) -> &[String] {
        match self {
            Violation::RequestHeaderTypeDisparity { type_disparities, .. }
            | Violation::PathParamTypeDisparity { type_disparities, .. }
            | Violation::QueryParamTypeDisparity { type_disparities, .. }
            | Violation::RequestBodyTypeDisparity { type_disparities, .. }
            | Violation::ResponseHeaderTypeDisparity { type_disparities, .. }
            | Violation::ResponseBodyTypeDisparity { type_disparities, .. } => type_disparities,
            _ => &[],
        }
    }

    /// The wire tag, e.g. `undefined_request_header`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Violation::UndefinedEndpoint { .. } => "undefined_endpoint",
            Violation::UndefinedEndpointResponse { .. } => "undefined_endpoint_response",
            Violation::RequiredRequestHeaderMissing { .. } => "required_request_header_missing",
            Violation::UndefinedRequestHeader { .. } => "undefined_request_header",
            Violation::RequestHeaderTypeDisparity { .. } => "request_header_type_disparity",
            Violation::PathParamTypeDisparity { .. } => "path_param_type_disparity",
            Violation::RequiredQueryParamMissing { .. } => "required_query_param_missing",
            Violation::UndefinedQueryParam { .. } => "undefined_query_param",
            Violation::QueryParamTypeDisparity { .. } => "query_param_type_disparity",
            Violation::UndefinedRequestBody { .. } => "undefined_request_body",
            Violation::RequestBodyTypeDisparity { .. } => "request_body_type_disparity",
            Violation::RequiredResponseHeaderMissing { .. } => "required_response_header_missing",
            Violation::UndefinedResponseHeader { .. } => "undefined_response_header",
            Violation::ResponseHeaderTypeDisparity { .. } => "response_header_type_disparity",
            Violation::UndefinedResponseBody { .. } => "undefined_response_body",
            Violation::ResponseBodyTypeDisparity { .. } => "response_body_type_disparity",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationContext {
    /// Name of the matched endpoint; empty when none matched.
    pub endpoint: String,
}

/// Result of checking one request/response pair. No violations means the
/// pair conforms.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verification {
    pub violations: Vec<Violation>,
    pub context: VerificationContext,
}

impl Verification {
    pub fn conforms(&self) -> bool {
        self.violations.is_empty()
    }
}
