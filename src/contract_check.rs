//! Well-formedness report for a contract.
//!
//! The verifier assumes these properties hold; this is where they are
//! established. Every defect is collected, not just the first.
use crate::definitions::{Contract, Endpoint, Header};
use crate::error::{ContractError, TypeTableError};
use crate::mismatcher::route_regex;
use crate::safety::{is_header_type_safe, is_path_param_type_safe, is_query_param_type_safe};
use crate::types::{discriminator_mapping, possible_root_types, Type, TypeTable};

pub fn check_contract(contract: &Contract) -> Vec<ContractError> {
    let mut errors = Vec::new();

    let mut table = TypeTable::new();
    for def in &contract.types {
        if let Err(e) = table.add(def.name.clone(), def.ty.clone()) {
            errors.push(e.into());
        }
    }

    for (location, ty) in type_slots(contract) {
        for name in ty.referenced_names() {
            if !table.exists(name) {
                errors.push(ContractError::UnresolvedReference {
                    location: location.clone(),
                    name: name.to_string(),
                });
            }
        }
        walk(ty, &mut |t| {
            if let Type::Union { types, discriminator: Some(d) } = t {
                if discriminator_mapping(types, d, &table).is_none() {
                    errors.push(ContractError::InvalidDiscriminator {
                        location: location.clone(),
                        discriminator: d.clone(),
                    });
                }
            }
        });
    }

    for (name, _) in table.iter() {
        if let Err(TypeTableError::Cycle(at)) = possible_root_types(&Type::reference(name), &table) {
            errors.push(TypeTableError::Cycle(at).into());
        }
    }

    if let Some(security) = &contract.security {
        if resolves(&security.ty, &table) && !is_header_type_safe(&security.ty, &table) {
            errors.push(ContractError::UnsafeHeader {
                location: "security".to_string(),
                header: security.name.clone(),
            });
        }
    }

    for endpoint in &contract.endpoints {
        check_endpoint(endpoint, &table, &mut errors);
    }
    errors
}

fn check_endpoint(endpoint: &Endpoint, table: &TypeTable, errors: &mut Vec<ContractError>) {
    let template_error = |reason: String| ContractError::PathTemplate {
        endpoint: endpoint.name.clone(),
        path: endpoint.path.clone(),
        reason,
    };
    if !endpoint.path.starts_with('/') {
        errors.push(template_error("path must start with `/`".to_string()));
    }
    if let Err(e) = route_regex(&endpoint.path) {
        errors.push(template_error(e.to_string()));
    }

    let template: Vec<&str> = endpoint.path_template_params().collect();
    for (i, param) in template.iter().enumerate() {
        if param.is_empty() {
            errors.push(template_error("empty path parameter name".to_string()));
        } else if template[..i].contains(param) {
            errors.push(template_error(format!("path parameter `{param}` appears more than once")));
        } else if !endpoint.path_params().iter().any(|p| p.name == *param) {
            errors.push(ContractError::UndeclaredPathParam {
                endpoint: endpoint.name.clone(),
                param: param.to_string(),
            });
        }
    }

    for param in endpoint.path_params() {
        if !template.contains(&param.name.as_str()) {
            errors.push(ContractError::UnusedPathParam {
                endpoint: endpoint.name.clone(),
                param: param.name.clone(),
                path: endpoint.path.clone(),
            });
        } else if resolves(&param.ty, table) && !is_path_param_type_safe(&param.ty, table) {
            errors.push(ContractError::UnsafePathParam {
                endpoint: endpoint.name.clone(),
                param: param.name.clone(),
            });
        }
    }

    for param in endpoint.query_params() {
        if resolves(&param.ty, table) && !is_query_param_type_safe(&param.ty, table) {
            errors.push(ContractError::UnsafeQueryParam {
                endpoint: endpoint.name.clone(),
                param: param.name.clone(),
            });
        }
    }

    let mut check_headers = |location: String, headers: &[Header]| {
        for header in headers {
            if resolves(&header.ty, table) && !is_header_type_safe(&header.ty, table) {
                errors.push(ContractError::UnsafeHeader {
                    location: location.clone(),
                    header: header.name.clone(),
                });
            }
        }
    };
    check_headers(format!("endpoint `{}` request", endpoint.name), endpoint.headers());
    for response in &endpoint.responses {
        check_headers(
            format!("endpoint `{}` response {}", endpoint.name, response.status),
            &response.headers,
        );
    }
    if let Some(default) = &endpoint.default_response {
        check_headers(format!("endpoint `{}` default response", endpoint.name), &default.headers);
    }
}

/// Unresolved types are already reported; judging their safety would only
/// repeat that.
fn resolves(ty: &Type, table: &TypeTable) -> bool {
    possible_root_types(ty, table).is_ok()
}

/// Every type the contract mentions, labelled with where it appears.
fn type_slots(contract: &Contract) -> Vec<(String, &Type)> {
    let mut slots: Vec<(String, &Type)> = Vec::new();
    for def in &contract.types {
        slots.push((format!("type `{}`", def.name), &def.ty));
    }
    if let Some(security) = &contract.security {
        slots.push(("security".to_string(), &security.ty));
    }
    for endpoint in &contract.endpoints {
        let at = |what: String| format!("endpoint `{}` {what}", endpoint.name);
        for h in endpoint.headers() {
            slots.push((at(format!("request header `{}`", h.name)), &h.ty));
        }
        for p in endpoint.path_params() {
            slots.push((at(format!("path param `{}`", p.name)), &p.ty));
        }
        for q in endpoint.query_params() {
            slots.push((at(format!("query param `{}`", q.name)), &q.ty));
        }
        if let Some(body) = endpoint.request_body() {
            slots.push((at("request body".to_string()), &body.ty));
        }
        for r in &endpoint.responses {
            for h in &r.headers {
                slots.push((at(format!("response {} header `{}`", r.status, h.name)), &h.ty));
            }
            if let Some(body) = &r.body {
                slots.push((at(format!("response {} body", r.status)), &body.ty));
            }
        }
        if let Some(r) = &endpoint.default_response {
            for h in &r.headers {
                slots.push((at(format!("default response header `{}`", h.name)), &h.ty));
            }
            if let Some(body) = &r.body {
                slots.push((at("default response body".to_string()), &body.ty));
            }
        }
    }
    slots
}

/// Pre-order walk over the type tree, not following references.
fn walk<'a>(ty: &'a Type, visit: &mut impl FnMut(&'a Type)) {
    visit(ty);
    match ty {
        Type::Object { properties } => properties.iter().for_each(|p| walk(&p.ty, visit)),
        Type::Array { element_type } => walk(element_type, visit),
        Type::Union { types, .. } => types.iter().for_each(|t| walk(t, visit)),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract(value: serde_json::Value) -> Contract {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn well_formed_contract_has_no_defects() {
        let c = contract(json!({
            "name": "ok",
            "types": [{ "name": "Id", "type": { "kind": "int64" } }],
            "security": { "name": "x-auth", "type": { "kind": "string" } },
            "endpoints": [{
                "name": "getUser",
                "method": "GET",
                "path": "/users/:id",
                "request": {
                    "pathParams": [{ "name": "id", "type": { "kind": "reference", "name": "Id" } }],
                    "queryParams": [{ "name": "tags", "optional": true,
                                      "type": { "kind": "array", "elementType": { "kind": "string" } } }]
                },
                "responses": [{ "status": 200 }]
            }]
        }));
        assert_eq!(check_contract(&c), vec![]);
    }

    #[test]
    fn collects_every_defect() {
        let c = contract(json!({
            "name": "bad",
            "types": [
                { "name": "A", "type": { "kind": "reference", "name": "B" } },
                { "name": "B", "type": { "kind": "reference", "name": "A" } },
                { "name": "A", "type": { "kind": "string" } }
            ],
            "endpoints": [{
                "name": "e",
                "method": "GET",
                "path": "/things/:thingId",
                "request": {
                    "headers": [{ "name": "x-list", "type": { "kind": "array", "elementType": { "kind": "string" } } }],
                    "pathParams": [{ "name": "other", "type": { "kind": "string" } }],
                    "queryParams": [{ "name": "q", "type": { "kind": "reference", "name": "Missing" } }]
                },
                "responses": [{ "status": 200 }]
            }]
        }));
        let errors = check_contract(&c);
        assert!(errors.contains(&ContractError::TypeTable(TypeTableError::Duplicate("A".into()))));
        assert!(errors.iter().any(|e| matches!(e, ContractError::TypeTable(TypeTableError::Cycle(_)))));
        assert!(errors.iter().any(|e| matches!(
            e,
            ContractError::UnresolvedReference { name, .. } if name == "Missing"
        )));
        assert!(errors.contains(&ContractError::UndeclaredPathParam {
            endpoint: "e".into(),
            param: "thingId".into(),
        }));
        assert!(errors.contains(&ContractError::UnusedPathParam {
            endpoint: "e".into(),
            param: "other".into(),
            path: "/things/:thingId".into(),
        }));
        assert!(errors.contains(&ContractError::UnsafeHeader {
            location: "endpoint `e` request".into(),
            header: "x-list".into(),
        }));
        // unresolved, so not also reported as unsafe
        assert!(!errors.iter().any(|e| matches!(e, ContractError::UnsafeQueryParam { .. })));
    }

    #[test]
    fn reports_unresolvable_discriminators() {
        let c = contract(json!({
            "name": "d",
            "types": [
                { "name": "Cat", "type": { "kind": "object", "properties": [
                    { "name": "kind", "type": { "kind": "string-literal", "value": "cat" } }
                ]}},
                { "name": "Dog", "type": { "kind": "object", "properties": [
                    { "name": "kind", "type": { "kind": "string" } }
                ]}},
                { "name": "Pet", "type": { "kind": "union", "discriminator": "kind", "types": [
                    { "kind": "reference", "name": "Cat" },
                    { "kind": "reference", "name": "Dog" }
                ]}}
            ]
        }));
        assert_eq!(check_contract(&c), vec![ContractError::InvalidDiscriminator {
            location: "type `Pet`".into(),
            discriminator: "kind".into(),
        }]);
    }
}
