//! Which type shapes can travel in which HTTP position.
//!
//! Path params, query params and headers are carried as strings, so only
//! scalar shapes (and unions of them) are representable there. Query params
//! additionally accept flat arrays and flat objects.
use crate::types::{Type, TypeTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Position {
    PathParam,
    QueryParam,
    Header,
    /// Property of an object-typed query param.
    ObjectProperty,
    /// Element of an array-typed query param.
    ArrayElement,
}

pub fn is_path_param_type_safe(ty: &Type, table: &TypeTable) -> bool {
    is_safe(ty, table, Position::PathParam, &mut Vec::new())
}

pub fn is_query_param_type_safe(ty: &Type, table: &TypeTable) -> bool {
    is_safe(ty, table, Position::QueryParam, &mut Vec::new())
}

pub fn is_header_type_safe(ty: &Type, table: &TypeTable) -> bool {
    is_safe(ty, table, Position::Header, &mut Vec::new())
}

/// `visiting` holds the reference names on the current recursion path; a
/// type that reaches itself cannot be a flat string shape.
fn is_safe<'a>(
    ty: &'a Type,
    table: &'a TypeTable,
    position: Position,
    visiting: &mut Vec<&'a str>,
) -> bool {
    match ty {
        Type::Boolean
        | Type::BooleanLiteral { .. }
        | Type::String
        | Type::StringLiteral { .. }
        | Type::Float
        | Type::Double
        | Type::FloatLiteral { .. }
        | Type::Int32
        | Type::Int64
        | Type::IntLiteral { .. }
        | Type::Date
        | Type::DateTime => true,
        Type::Null => false,
        Type::Array { element_type } => {
            position == Position::QueryParam
                && is_safe(element_type, table, Position::ArrayElement, visiting)
        }
        Type::Object { properties } => {
            position == Position::QueryParam
                && properties
                    .iter()
                    .all(|p| is_safe(&p.ty, table, Position::ObjectProperty, visiting))
        }
        Type::Union { types, .. } => types.iter().all(|t| is_safe(t, table, position, visiting)),
        Type::Reference { name } => {
            if visiting.contains(&name.as_str()) {
                return false;
            }
            let Some(target) = table.get(name) else {
                return false;
            };
            visiting.push(name);
            let safe = is_safe(target, table, position, visiting);
            visiting.pop();
            safe
        }
    }
}
