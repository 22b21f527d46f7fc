//! Projection of contract types onto JSON Schema (draft 7), used to check
//! structured bodies with an off-the-shelf schema validator.
use serde_json::{json, Map, Value};

use crate::types::{discriminator_mapping, Type, TypeTable};

pub fn reference_path(name: &str) -> String {
    format!("#/definitions/{name}")
}

/// Converts types to schema fragments. `additional_properties` controls
/// whether object schemas tolerate undeclared properties (lenient) or reject
/// them (strict).
#[derive(Clone, Copy)]
pub struct JsonSchemaProjector<'t> {
    table: &'t TypeTable,
    additional_properties: bool,
}

impl<'t> JsonSchemaProjector<'t> {
    /// Lenient by default.
    pub fn new(table: &'t TypeTable) -> Self {
        Self { table, additional_properties: true }
    }

    pub fn with_additional_properties(mut self, allow: bool) -> Self {
        self.additional_properties = allow;
        self
    }

    /// Self-contained schema for `ty`: its fragment plus every named type
    /// under `definitions`.
    pub fn document(&self, ty: &Type) -> Value {
        let definitions = Value::Object(self.definitions());
        match self.project(ty) {
            Value::Object(mut root) if !root.contains_key("$ref") => {
                root.insert("definitions".into(), definitions);
                Value::Object(root)
            }
            // draft 7 ignores siblings of `$ref`
            fragment => json!({ "allOf": [fragment], "definitions": definitions }),
        }
    }

    pub fn definitions(&self) -> Map<String, Value> {
        self.table
            .iter()
            .map(|(name, ty)| (name.to_string(), self.project(ty)))
            .collect()
    }

    pub fn project(&self, ty: &Type) -> Value {
        match ty {
            Type::Null => json!({ "type": "null" }),
            Type::Boolean => json!({ "type": "boolean" }),
            Type::BooleanLiteral { value } => json!({ "type": "boolean", "const": value }),
            Type::String => json!({ "type": "string" }),
            Type::StringLiteral { value } => json!({ "type": "string", "const": value }),
            Type::Float | Type::Double => json!({ "type": "number" }),
            Type::FloatLiteral { value } => json!({ "type": "number", "const": value }),
            Type::Int32 | Type::Int64 => json!({ "type": "integer" }),
            Type::IntLiteral { value } => json!({ "type": "integer", "const": value }),
            Type::Date => json!({ "type": "string", "format": "date" }),
            Type::DateTime => json!({ "type": "string", "format": "date-time" }),
            Type::Object { properties } => {
                let mut props = Map::new();
                let mut required = Vec::new();
                for p in properties {
                    props.insert(p.name.clone(), self.project(&p.ty));
                    if !p.optional {
                        required.push(Value::from(p.name.clone()));
                    }
                }
                let mut o = json!({
                    "type": "object",
                    "properties": props,
                    "additionalProperties": self.additional_properties,
                });
                if !required.is_empty() {
                    o["required"] = Value::Array(required);
                }
                o
            }
            Type::Array { element_type } => json!({
                "type": "array",
                "items": self.project(element_type),
            }),
            Type::Union { types, discriminator } => self.union(types, discriminator.as_deref()),
            Type::Reference { name } => json!({ "$ref": reference_path(name) }),
        }
    }

    fn union(&self, types: &[Type], discriminator: Option<&str>) -> Value {
        if let [only] = types {
            return self.project(only);
        }

        // all literals of one kind: a plain enum
        if let Some(grouped) = literal_enum(types.iter()) {
            return grouped;
        }

        let mut one_of: Vec<Value> = types
            .iter()
            .filter(|t| !t.is_literal())
            .map(|t| self.project(t))
            .collect();
        for kind in ["boolean", "string", "number", "integer"] {
            let literals: Vec<&Type> = types
                .iter()
                .filter(|t| literal_value(t).is_some_and(|(k, _)| k == kind))
                .collect();
            match literals.as_slice() {
                [] => {}
                [single] => one_of.push(self.project(single)),
                many => one_of.extend(literal_enum(many.iter().copied())),
            }
        }

        let mut schema = json!({ "oneOf": one_of });
        if let Some(object) = discriminator.and_then(|d| self.discriminator_object(types, d)) {
            schema["discriminator"] = object;
        }
        schema
    }

    /// Present only when every non-null member is a reference whose object
    /// carries a distinct string literal under `property`.
    fn discriminator_object(&self, types: &[Type], property: &str) -> Option<Value> {
        let mut mapping = Map::new();
        for (value, member) in discriminator_mapping(types, property, self.table)? {
            let Type::Reference { name } = member else {
                return None;
            };
            mapping.insert(value.to_string(), Value::from(reference_path(name)));
        }
        Some(json!({ "propertyName": property, "mapping": mapping }))
    }
}

fn literal_value(ty: &Type) -> Option<(&'static str, Value)> {
    match ty {
        Type::BooleanLiteral { value } => Some(("boolean", json!(value))),
        Type::StringLiteral { value } => Some(("string", json!(value))),
        Type::FloatLiteral { value } => Some(("number", json!(value))),
        Type::IntLiteral { value } => Some(("integer", json!(value))),
        _ => None,
    }
}

/// `{type, enum}` when every type is a literal of the same kind.
fn literal_enum<'a>(types: impl Iterator<Item = &'a Type>) -> Option<Value> {
    let mut kind = None;
    let mut values = Vec::new();
    for ty in types {
        let (k, v) = literal_value(ty)?;
        if kind.is_some_and(|seen| seen != k) {
            return None;
        }
        kind = Some(k);
        values.push(v);
    }
    kind.map(|k| json!({ "type": k, "enum": values }))
}

// ------------------------------- Tests ------------------------------------ //
