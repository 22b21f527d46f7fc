//! Checks one observed request/response pair against a contract.
//!
//! Endpoint and response resolution stop the check early; every other phase
//! runs regardless and all findings are reported together.
use indexmap::IndexMap;
use jsonschema::Draft;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, instrument, trace};

use crate::definitions::{Body, Contract, Endpoint, Header, HttpMethod};
use crate::error::{ContractError, TypeTableError, VerifyError};
use crate::json_schema::JsonSchemaProjector;
use crate::mismatches::{Mismatch, Side};
use crate::observed::{find_header, ObservedHeader, ObservedRequest, ObservedResponse};
use crate::query::{parse_query, split_path_and_query};
use crate::string_validator::{StringInput, StringValidator, WireValue};
use crate::types::{Type, TypeTable};
use crate::violations::{Verification, VerificationContext, Violation};

// ------------------------------- Options ---------------------------------- //

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Report undeclared request headers and bodies, and reject undeclared
    /// properties in request bodies. Responses are always checked leniently.
    pub strict: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions { strict: true }
    }
}

// ---------------------------- Path templates ------------------------------ //

/// `/users/:id` → `^/users/[^/]+$`. Literal segments match verbatim and
/// parameters match one non-empty segment.
pub fn route_regex(template: &str) -> Result<Regex, regex::Error> {
    let pattern = template
        .split('/')
        .map(|segment| {
            if segment.starts_with(':') {
                "[^/]+".to_string()
            } else {
                regex::escape(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    Regex::new(&format!("^{pattern}$"))
}

pub fn path_matches_template(template: &str, path: &str) -> bool {
    route_regex(template).is_ok_and(|rx| rx.is_match(path))
}

// ------------------------------ Mismatcher -------------------------------- //

/// Immutable after construction; share it across threads freely.
pub struct ContractMismatcher<'c> {
    contract: &'c Contract,
    table: TypeTable,
    routes: Vec<Regex>,
    options: VerifyOptions,
}

/// Header expectation, whether declared on the message or implied by the
/// contract's security header.
struct ExpectedHeader<'a> {
    name: &'a str,
    ty: &'a Type,
    optional: bool,
}

impl<'a> From<&'a Header> for ExpectedHeader<'a> {
    fn from(h: &'a Header) -> Self {
        ExpectedHeader { name: &h.name, ty: &h.ty, optional: h.optional }
    }
}

struct ExpectedResponse<'a> {
    headers: &'a [Header],
    body: Option<&'a Body>,
}

impl<'c> ContractMismatcher<'c> {
    pub fn new(contract: &'c Contract) -> Result<Self, ContractError> {
        let table = TypeTable::from_array(&contract.types)?;
        let routes = contract
            .endpoints
            .iter()
            .map(|endpoint| {
                route_regex(&endpoint.path).map_err(|e| ContractError::PathTemplate {
                    endpoint: endpoint.name.clone(),
                    path: endpoint.path.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ContractMismatcher { contract, table, routes, options: VerifyOptions::default() })
    }

    pub fn with_options(mut self, options: VerifyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn contract(&self) -> &'c Contract {
        self.contract
    }

    pub fn type_table(&self) -> &TypeTable {
        &self.table
    }

    #[instrument(level = "debug", skip_all, fields(method = %request.method, path = %request.path))]
    pub fn find_violations(
        &self,
        request: &ObservedRequest,
        response: &ObservedResponse,
    ) -> Result<Verification, VerifyError> {
        let (path, query) = split_path_and_query(&request.path);

        let Some(endpoint) = self.find_endpoint(&request.method, path) else {
            debug!("no endpoint matched");
            return Ok(Verification {
                violations: vec![Violation::UndefinedEndpoint {
                    message: format!("Endpoint {} {} not found.", request.method, request.path),
                }],
                context: VerificationContext::default(),
            });
        };
        let context = VerificationContext { endpoint: endpoint.name.clone() };
        trace!(endpoint = %endpoint.name, "endpoint matched");

        let Some(expected) = expected_response(endpoint, response.status_code) else {
            debug!(status = response.status_code, "no response matched");
            return Ok(Verification {
                violations: vec![Violation::UndefinedEndpointResponse {
                    message: format!(
                        "There is no response or default response defined on {}:{}",
                        endpoint.path, endpoint.method
                    ),
                }],
                context,
            });
        };

        let strict = self.options.strict;
        let mut violations = Vec::new();
        let mut collect = |phase: &str, side: Side, mismatches: Vec<Mismatch>| {
            debug!(phase, count = mismatches.len(), "mismatches");
            violations.extend(mismatches.into_iter().map(|m| m.into_violation(side)));
        };

        let request_headers = self.request_headers(endpoint);
        collect(
            "request headers",
            Side::Request,
            self.header_mismatches(&request_headers, &request.headers, strict)?,
        );
        let response_headers: Vec<ExpectedHeader> =
            expected.headers.iter().map(ExpectedHeader::from).collect();
        collect(
            "response headers",
            Side::Response,
            self.header_mismatches(&response_headers, &response.headers, false)?,
        );
        collect(
            "request body",
            Side::Request,
            self.body_mismatches(endpoint.request_body(), request.body.as_ref(), strict)?,
        );
        collect(
            "response body",
            Side::Response,
            self.body_mismatches(expected.body, response.body.as_ref(), false)?,
        );
        collect("path params", Side::Request, self.path_param_mismatches(endpoint, path)?);
        collect("query params", Side::Request, self.query_param_mismatches(endpoint, query)?);

        Ok(Verification { violations, context })
    }

    fn find_endpoint(&self, method: &str, path: &str) -> Option<&'c Endpoint> {
        let method: HttpMethod = method.parse().ok()?;
        self.contract
            .endpoints
            .iter()
            .zip(&self.routes)
            .find(|(endpoint, route)| endpoint.method == method && route.is_match(path))
            .map(|(endpoint, _)| endpoint)
    }

    /// Declared request headers plus the security header, which is optional
    /// everywhere unless an endpoint declares it itself.
    fn request_headers(&self, endpoint: &'c Endpoint) -> Vec<ExpectedHeader<'c>> {
        let mut headers: Vec<ExpectedHeader> = endpoint.headers().iter().map(ExpectedHeader::from).collect();
        if let Some(security) = &self.contract.security {
            if !headers.iter().any(|h| h.name.eq_ignore_ascii_case(&security.name)) {
                headers.push(ExpectedHeader { name: &security.name, ty: &security.ty, optional: true });
            }
        }
        headers
    }

    fn header_mismatches(
        &self,
        expected: &[ExpectedHeader],
        observed: &[ObservedHeader],
        strict: bool,
    ) -> Result<Vec<Mismatch>, VerifyError> {
        let mut mismatches = Vec::new();
        for header in expected {
            let Some(input) = find_header(observed, header.name) else {
                if !header.optional {
                    mismatches.push(Mismatch::RequiredHeaderMissing { header: header.name.to_string() });
                }
                continue;
            };
            let value = WireValue::from(input.value.as_str());
            let type_disparities = self.string_disparities(&input.name, &value, header.ty, !header.optional)?;
            if !type_disparities.is_empty() {
                mismatches.push(Mismatch::HeaderTypeDisparity {
                    header: header.name.to_string(),
                    type_disparities,
                });
            }
        }

        if strict {
            for input in observed {
                if !expected.iter().any(|h| h.name.eq_ignore_ascii_case(&input.name)) {
                    mismatches.push(Mismatch::UndefinedHeader { header: input.name.clone() });
                }
            }
        }
        Ok(mismatches)
    }

    /// A declared body is checked even when none was sent; absence is
    /// validated as `null`.
    fn body_mismatches(
        &self,
        expected: Option<&Body>,
        observed: Option<&Value>,
        strict: bool,
    ) -> Result<Vec<Mismatch>, VerifyError> {
        let Some(body) = expected else {
            if observed.is_some() && strict {
                return Ok(vec![Mismatch::UndefinedBody]);
            }
            return Ok(Vec::new());
        };

        let schema = JsonSchemaProjector::new(&self.table)
            .with_additional_properties(!strict)
            .document(&body.ty);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| VerifyError::SchemaCompile(e.to_string()))?;

        let data = observed.cloned().unwrap_or(Value::Null);
        let type_disparities: Vec<String> = validator
            .iter_errors(&data)
            .map(|e| format!("#{} {}", e.instance_path, e))
            .collect();
        if type_disparities.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![Mismatch::BodyTypeDisparity { data, type_disparities }])
    }

    fn path_param_mismatches(&self, endpoint: &Endpoint, path: &str) -> Result<Vec<Mismatch>, VerifyError> {
        let template: Vec<&str> = endpoint.path.split('/').collect();
        let segments: Vec<&str> = path.split('/').collect();
        if template.len() != segments.len() {
            return Err(VerifyError::PathSegmentMismatch {
                template: endpoint.path.clone(),
                path: path.to_string(),
            });
        }

        let mut mismatches = Vec::new();
        for (part, segment) in template.iter().zip(&segments) {
            let Some(name) = part.strip_prefix(':') else {
                continue;
            };
            let param = endpoint
                .path_params()
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| VerifyError::MissingPathParam(name.to_string()))?;
            let value = WireValue::from(*segment);
            let type_disparities = self.string_disparities(&param.name, &value, &param.ty, true)?;
            if !type_disparities.is_empty() {
                mismatches.push(Mismatch::PathParamTypeDisparity {
                    path_param: param.name.clone(),
                    type_disparities,
                });
            }
        }
        Ok(mismatches)
    }

    fn query_param_mismatches(
        &self,
        endpoint: &Endpoint,
        query: Option<&str>,
    ) -> Result<Vec<Mismatch>, VerifyError> {
        let strategy = self.contract.config.param_serialization_strategy.query.array;
        let observed = parse_query(query.unwrap_or_default(), strategy);
        let mut verified: IndexMap<&str, bool> = observed.keys().map(|k| (k.as_str(), false)).collect();

        let mut mismatches = Vec::new();
        for param in endpoint.query_params() {
            let Some(value) = observed.get(&param.name) else {
                if !param.optional {
                    mismatches.push(Mismatch::RequiredQueryParamMissing { query_param: param.name.clone() });
                }
                continue;
            };
            if let Some(flag) = verified.get_mut(param.name.as_str()) {
                *flag = true;
            }
            let type_disparities = self.string_disparities(&param.name, value, &param.ty, !param.optional)?;
            if !type_disparities.is_empty() {
                mismatches.push(Mismatch::QueryParamTypeDisparity {
                    query_param: param.name.clone(),
                    type_disparities,
                });
            }
        }

        mismatches.extend(
            verified
                .into_iter()
                .filter(|(_, checked)| !checked)
                .map(|(key, _)| Mismatch::UndefinedQueryParam { query_param: key.to_string() }),
        );
        Ok(mismatches)
    }

    fn string_disparities(
        &self,
        name: &str,
        value: &WireValue,
        ty: &Type,
        mandatory: bool,
    ) -> Result<Vec<String>, TypeTableError> {
        let mut validator = StringValidator::new(&self.table);
        if validator.run(StringInput { name, value }, ty, mandatory)? {
            return Ok(Vec::new());
        }
        Ok(validator.into_messages())
    }
}

/// Exact status first, then the default response.
fn expected_response(endpoint: &Endpoint, status: u16) -> Option<ExpectedResponse<'_>> {
    if let Some(r) = endpoint.responses.iter().find(|r| r.status == status) {
        return Some(ExpectedResponse { headers: &r.headers, body: r.body.as_ref() });
    }
    endpoint
        .default_response
        .as_ref()
        .map(|r| ExpectedResponse { headers: &r.headers, body: r.body.as_ref() })
}

// ------------------------------- Tests ------------------------------------ //
