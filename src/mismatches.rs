//! Engine-internal findings. They name the offending element but not the
//! side of the exchange it came from; `into_violation` adds that context and
//! renders the user-facing message.
use serde_json::Value;

use crate::violations::Violation;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Request,
    Response,
}

impl Side {
    fn label(self) -> &'static str {
        match self {
            Side::Request => "Request",
            Side::Response => "Response",
        }
    }

    fn lower(self) -> &'static str {
        match self {
            Side::Request => "request",
            Side::Response => "response",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mismatch {
    RequiredHeaderMissing { header: String },
    UndefinedHeader { header: String },
    HeaderTypeDisparity { header: String, type_disparities: Vec<String> },
    PathParamTypeDisparity { path_param: String, type_disparities: Vec<String> },
    RequiredQueryParamMissing { query_param: String },
    UndefinedQueryParam { query_param: String },
    QueryParamTypeDisparity { query_param: String, type_disparities: Vec<String> },
    UndefinedBody,
    BodyTypeDisparity { data: Value, type_disparities: Vec<String> },
}

impl Mismatch {
    /// Path and query mismatches only arise on requests; `side` is ignored
    /// for them.
    pub fn into_violation(self, side: Side) -> Violation {
        match self {
            Mismatch::RequiredHeaderMissing { header } => {
                let message = format!("Required {} header \"{header}\" missing", side.lower());
                match side {
                    Side::Request => Violation::RequiredRequestHeaderMissing { message },
                    Side::Response => Violation::RequiredResponseHeaderMissing { message },
                }
            }
            Mismatch::UndefinedHeader { header } => {
                let message = format!(
                    "{} header \"{header}\" not defined in contract {} headers",
                    side.label(),
                    side.lower()
                );
                match side {
                    Side::Request => Violation::UndefinedRequestHeader { message },
                    Side::Response => Violation::UndefinedResponseHeader { message },
                }
            }
            Mismatch::HeaderTypeDisparity { header, type_disparities } => {
                let message = format!(
                    "{} header \"{header}\" type disparity: {}",
                    side.label(),
                    type_disparities.join(", ")
                );
                match side {
                    Side::Request => Violation::RequestHeaderTypeDisparity { message, type_disparities },
                    Side::Response => Violation::ResponseHeaderTypeDisparity { message, type_disparities },
                }
            }
            Mismatch::PathParamTypeDisparity { path_param, type_disparities } => {
                Violation::PathParamTypeDisparity {
                    message: format!(
                        "Path param \"{path_param}\" type disparity: {}",
                        type_disparities.join(", ")
                    ),
                    type_disparities,
                }
            }
            Mismatch::RequiredQueryParamMissing { query_param } => {
                Violation::RequiredQueryParamMissing {
                    message: format!("Required query param \"{query_param}\" missing"),
                }
            }
            Mismatch::UndefinedQueryParam { query_param } => Violation::UndefinedQueryParam {
                message: format!(
                    "Query param \"{query_param}\" not defined in contract request query params"
                ),
            },
            Mismatch::QueryParamTypeDisparity { query_param, type_disparities } => {
                Violation::QueryParamTypeDisparity {
                    message: format!(
                        "Query param \"{query_param}\" type disparity: {}",
                        type_disparities.join(", ")
                    ),
                    type_disparities,
                }
            }
            Mismatch::UndefinedBody => {
                let message = format!("{} body not defined in contract", side.label());
                match side {
                    Side::Request => Violation::UndefinedRequestBody { message },
                    Side::Response => Violation::UndefinedResponseBody { message },
                }
            }
            Mismatch::BodyTypeDisparity { data, type_disparities } => {
                let rendered = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
                let details: Vec<String> = type_disparities.iter().map(|d| format!("- {d}")).collect();
                let message = format!(
                    "{} body type disparity:\n{rendered}\n{}",
                    side.label(),
                    details.join("\n")
                );
                match side {
                    Side::Request => Violation::RequestBodyTypeDisparity { message, type_disparities },
                    Side::Response => Violation::ResponseBodyTypeDisparity { message, type_disparities },
                }
            }
        }
    }
}
