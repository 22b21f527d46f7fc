//! Contract type algebra.
//!
//! `Type` is a closed sum: every consumer (classifier, string validator,
//! schema projector) matches on it exhaustively. Named types live in a
//! [`TypeTable`] and are reached through `Type::Reference`.
pub mod table;

use serde::{Deserialize, Serialize};

use crate::error::TypeTableError;

pub use table::TypeTable;

// ------------------------------- Model ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Type {
    Null,
    Boolean,
    BooleanLiteral { value: bool },
    String,
    StringLiteral { value: String },
    Float,
    Double,
    FloatLiteral { value: f64 },
    Int32,
    Int64,
    #[serde(alias = "integer-literal")]
    IntLiteral { value: i64 },
    Date,
    DateTime,
    Object { properties: Vec<Property> },
    Array {
        #[serde(rename = "elementType")]
        element_type: Box<Type>,
    },
    Union {
        types: Vec<Type>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        discriminator: Option<String>,
    },
    Reference { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(rename = "type")]
    pub ty: Type,
}

/// A named entry of a contract's type list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: Type,
}

// ------------------------------ Builders --------------------------------- //

impl Type {
    pub fn string_literal(value: impl Into<String>) -> Self {
        Type::StringLiteral { value: value.into() }
    }
    pub fn object(properties: Vec<Property>) -> Self {
        Type::Object { properties }
    }
    pub fn array(element_type: Type) -> Self {
        Type::Array { element_type: Box::new(element_type) }
    }
    pub fn union(types: Vec<Type>) -> Self {
        Type::Union { types, discriminator: None }
    }
    pub fn discriminated_union(types: Vec<Type>, discriminator: impl Into<String>) -> Self {
        Type::Union { types, discriminator: Some(discriminator.into()) }
    }
    pub fn reference(name: impl Into<String>) -> Self {
        Type::Reference { name: name.into() }
    }
}

impl Property {
    pub fn required(name: impl Into<String>, ty: Type) -> Self {
        Property { name: name.into(), description: None, optional: false, ty }
    }
    pub fn optional(name: impl Into<String>, ty: Type) -> Self {
        Property { name: name.into(), description: None, optional: true, ty }
    }
}

impl TypeDef {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        TypeDef { name: name.into(), ty }
    }
}

// ------------------------------ Queries ---------------------------------- //

impl Type {
    /// Wire name of the kind, identical to the serialized `kind` tag.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Boolean => "boolean",
            Type::BooleanLiteral { .. } => "boolean-literal",
            Type::String => "string",
            Type::StringLiteral { .. } => "string-literal",
            Type::Float => "float",
            Type::Double => "double",
            Type::FloatLiteral { .. } => "float-literal",
            Type::Int32 => "int32",
            Type::Int64 => "int64",
            Type::IntLiteral { .. } => "int-literal",
            Type::Date => "date",
            Type::DateTime => "date-time",
            Type::Object { .. } => "object",
            Type::Array { .. } => "array",
            Type::Union { .. } => "union",
            Type::Reference { .. } => "reference",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Type::BooleanLiteral { .. }
                | Type::StringLiteral { .. }
                | Type::FloatLiteral { .. }
                | Type::IntLiteral { .. }
        )
    }

    /// Names of every reference reachable without going through the table.
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_referenced_names(&mut out);
        out
    }

    fn collect_referenced_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Type::Reference { name } => out.push(name),
            Type::Object { properties } => {
                for p in properties {
                    p.ty.collect_referenced_names(out);
                }
            }
            Type::Array { element_type } => element_type.collect_referenced_names(out),
            Type::Union { types, .. } => {
                for t in types {
                    t.collect_referenced_names(out);
                }
            }
            _ => {}
        }
    }
}

/// Resolve `ty` through the table until it is no longer a reference.
pub fn dereference<'a>(ty: &'a Type, table: &'a TypeTable) -> Result<&'a Type, TypeTableError> {
    table.dereference(ty)
}

/// Flatten unions and follow references, returning the concrete (non-union,
/// non-reference) shapes a value of `ty` may take.
pub fn possible_root_types<'a>(
    ty: &'a Type,
    table: &'a TypeTable,
) -> Result<Vec<&'a Type>, TypeTableError> {
    let mut out = Vec::new();
    collect_roots(ty, table, &mut Vec::new(), &mut out)?;
    Ok(out)
}

fn collect_roots<'a>(
    ty: &'a Type,
    table: &'a TypeTable,
    visiting: &mut Vec<&'a str>,
    out: &mut Vec<&'a Type>,
) -> Result<(), TypeTableError> {
    match ty {
        Type::Reference { name } => {
            if visiting.contains(&name.as_str()) {
                return Err(TypeTableError::Cycle(name.clone()));
            }
            visiting.push(name);
            collect_roots(table.get_or_error(name)?, table, visiting, out)?;
            visiting.pop();
        }
        Type::Union { types, .. } => {
            for member in types {
                collect_roots(member, table, visiting, out)?;
            }
        }
        _ => out.push(ty),
    }
    Ok(())
}

/// Resolve a declared discriminator against the members of a union.
///
/// Returns `(literal value, member)` pairs in member order when every non-null
/// member is an object whose required `property` is a string literal and no
/// two members share a value. Null members are skipped.
pub fn discriminator_mapping<'a>(
    members: &'a [Type],
    property: &str,
    table: &'a TypeTable,
) -> Option<Vec<(&'a str, &'a Type)>> {
    let mut mapping: Vec<(&'a str, &'a Type)> = Vec::new();
    for member in members {
        let resolved = dereference(member, table).ok()?;
        if resolved.is_null() {
            continue;
        }
        let Type::Object { properties } = resolved else {
            return None;
        };
        let prop = properties.iter().find(|p| p.name == property && !p.optional)?;
        let Type::StringLiteral { value } = dereference(&prop.ty, table).ok()? else {
            return None;
        };
        if mapping.iter().any(|(v, _)| *v == value.as_str()) {
            return None;
        }
        mapping.push((value.as_str(), member));
    }
    if mapping.is_empty() { None } else { Some(mapping) }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn shapes() -> TypeTable {
        TypeTable::from_array(&[
            TypeDef::new("Circle", Type::object(vec![
                Property::required("type", Type::string_literal("circle")),
                Property::required("radius", Type::Float),
            ])),
            TypeDef::new("Square", Type::object(vec![
                Property::required("type", Type::string_literal("square")),
                Property::required("side", Type::Float),
            ])),
            TypeDef::new("Alias", Type::reference("Circle")),
            TypeDef::new("MaybeShape", Type::union(vec![
                Type::reference("Alias"),
                Type::union(vec![Type::reference("Square"), Type::Null]),
            ])),
        ])
        .unwrap()
    }

    #[test]
    fn kind_tags_follow_wire_names() {
        let ty: Type = serde_json::from_str(
            r#"{"kind":"array","elementType":{"kind":"date-time"}}"#,
        ).unwrap();
        assert_eq!(ty, Type::array(Type::DateTime));

        let legacy: Type = serde_json::from_str(r#"{"kind":"integer-literal","value":3}"#).unwrap();
        assert_eq!(legacy.kind_name(), "int-literal");
        assert_eq!(
            serde_json::to_value(&Type::Int32).unwrap(),
            serde_json::json!({"kind": "int32"})
        );
    }

    #[test]
    fn possible_roots_flatten_unions_and_references() {
        let table = shapes();
        let root = Type::reference("MaybeShape");
        let roots = possible_root_types(&root, &table).unwrap();
        let kinds: Vec<_> = roots.iter().map(|t| t.kind_name()).collect();
        assert_eq!(kinds, vec!["object", "object", "null"]);
    }

    #[test]
    fn possible_roots_report_pure_cycles() {
        let table = TypeTable::from_array(&[
            TypeDef::new("A", Type::union(vec![Type::reference("B"), Type::String])),
            TypeDef::new("B", Type::reference("A")),
        ])
        .unwrap();
        assert_eq!(
            possible_root_types(&Type::reference("A"), &table),
            Err(TypeTableError::Cycle("A".into()))
        );
    }

    #[test]
    fn discriminator_resolves_distinct_literals() {
        let table = shapes();
        let members = vec![Type::reference("Circle"), Type::reference("Square"), Type::Null];
        let mapping = discriminator_mapping(&members, "type", &table).unwrap();
        let values: Vec<_> = mapping.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec!["circle", "square"]);

        assert!(discriminator_mapping(&members, "radius", &table).is_none());
        let dup = vec![Type::reference("Circle"), Type::reference("Alias")];
        assert!(discriminator_mapping(&dup, "type", &table).is_none());
    }

    #[test]
    fn referenced_names_do_not_follow_the_table() {
        let ty = Type::object(vec![
            Property::required("a", Type::array(Type::reference("X"))),
            Property::optional("b", Type::union(vec![Type::reference("Y"), Type::Null])),
        ]);
        assert_eq!(ty.referenced_names(), vec!["X", "Y"]);
    }
}
