//! Validation of string-carried values (headers, path params, query params)
//! against contract types.
//!
//! Leaves are always strings; object- and array-typed query params arrive as
//! string-keyed maps and lists. Failures are collected into `messages` rather
//! than stopping at the first one, so a caller sees every nested problem of a
//! parameter in a single pass.
pub mod primitive;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::TypeTableError;
use crate::types::{possible_root_types, Type, TypeTable};

// ------------------------------- Input ----------------------------------- //

/// A value as it appears on the wire, before any typing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum WireValue {
    Text(String),
    List(Vec<WireValue>),
    Map(IndexMap<String, WireValue>),
}

impl WireValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            WireValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        WireValue::Text(s.to_string())
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        WireValue::Text(s)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StringInput<'a> {
    pub name: &'a str,
    pub value: &'a WireValue,
}

// ------------------------------ Validator -------------------------------- //

pub struct StringValidator<'t> {
    table: &'t TypeTable,
    pub messages: Vec<String>,
}

pub fn error_message(path: &str, kind: &str) -> String {
    format!("\"{path}\" should be {kind}")
}

impl<'t> StringValidator<'t> {
    pub fn new(table: &'t TypeTable) -> Self {
        Self { table, messages: Vec::new() }
    }

    /// Validate `input` against `ty`. When `is_mandatory` is false an empty
    /// value passes without consulting the kind's predicate.
    ///
    /// Only unresolvable references are errors; mismatches return
    /// `Ok(false)` and leave their detail in `messages`.
    pub fn run(
        &mut self,
        input: StringInput<'_>,
        ty: &Type,
        is_mandatory: bool,
    ) -> Result<bool, TypeTableError> {
        self.validate(input.name, Some(input.value), ty, is_mandatory)
    }

    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }

    fn validate(
        &mut self,
        path: &str,
        value: Option<&WireValue>,
        ty: &Type,
        mandatory: bool,
    ) -> Result<bool, TypeTableError> {
        if !mandatory && is_blank(value) {
            return Ok(true);
        }
        let valid = match ty {
            Type::Object { properties } => {
                let Some(WireValue::Map(map)) = value else {
                    return Ok(self.wrong_shape(path, ty));
                };
                let mut valid = true;
                for property in properties {
                    let field = map.get(&property.name);
                    if field.is_none() && property.optional {
                        continue;
                    }
                    let child = property_path(path, &property.name);
                    valid &= self.validate(&child, field, &property.ty, !property.optional)?;
                }
                valid
            }
            Type::Array { element_type } => {
                let Some(WireValue::List(items)) = value else {
                    return Ok(self.wrong_shape(path, ty));
                };
                let mut valid = true;
                for (index, item) in items.iter().enumerate() {
                    let child = format!("{path}[{index}]");
                    valid &= self.validate(&child, Some(item), element_type, true)?;
                }
                valid
            }
            Type::Reference { .. } => {
                let target = self.table.dereference(ty)?;
                self.validate(path, value, target, mandatory)?
            }
            Type::Union { .. } => self.validate_union(path, value, ty, mandatory)?,
            Type::Null => self.scalar(path, value, ty, primitive::is_empty),
            Type::Boolean => self.scalar(path, value, ty, primitive::is_boolean),
            Type::BooleanLiteral { value: literal } => {
                let expected = if *literal { "true" } else { "false" };
                self.scalar(path, value, ty, |s| s == expected)
            }
            Type::String => self.scalar(path, value, ty, |_| true),
            Type::StringLiteral { value: literal } => {
                self.scalar(path, value, ty, |s| s == literal.as_str())
            }
            Type::Float | Type::Double => {
                self.scalar(path, value, ty, primitive::is_float)
            }
            Type::FloatLiteral { value: literal } => self.scalar(path, value, ty, |s| {
                primitive::is_float(s) && s.parse::<f64>() == Ok(*literal)
            }),
            Type::Int32 | Type::Int64 => {
                self.scalar(path, value, ty, primitive::is_int)
            }
            Type::IntLiteral { value: literal } => self.scalar(path, value, ty, |s| {
                primitive::is_int(s) && s.parse::<i64>() == Ok(*literal)
            }),
            Type::Date | Type::DateTime => {
                self.scalar(path, value, ty, primitive::is_iso8601)
            }
        };
        Ok(valid)
    }

    fn validate_union(
        &mut self,
        path: &str,
        value: Option<&WireValue>,
        ty: &Type,
        mandatory: bool,
    ) -> Result<bool, TypeTableError> {
        let roots = possible_root_types(ty, self.table)?;
        for root in &roots {
            let mut scratch = StringValidator::new(self.table);
            if scratch.validate(path, value, root, mandatory)? {
                return Ok(true);
            }
        }
        let kinds = roots.iter().map(|ty| expected_name(ty)).collect::<Vec<_>>().join(" | ");
        self.messages.push(error_message(path, &kinds));
        Ok(false)
    }

    fn scalar(
        &mut self,
        path: &str,
        value: Option<&WireValue>,
        ty: &Type,
        predicate: impl Fn(&str) -> bool,
    ) -> bool {
        let valid = match value {
            None => ty.is_null(),
            Some(WireValue::Text(s)) => predicate(s),
            Some(_) => false,
        };
        if !valid {
            self.messages.push(error_message(path, &expected_name(ty)));
        }
        valid
    }

    /// A structured kind got a value of the wrong shape, or none at all.
    fn wrong_shape(&mut self, path: &str, ty: &Type) -> bool {
        self.messages.push(error_message(path, ty.kind_name()));
        false
    }
}

/// Absent, or present as the empty string.
fn is_blank(value: Option<&WireValue>) -> bool {
    match value {
        None => true,
        Some(WireValue::Text(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Literal kinds name the value they expect; everything else names its kind.
fn expected_name(ty: &Type) -> String {
    match ty {
        Type::StringLiteral { value } => value.clone(),
        Type::BooleanLiteral { value } => value.to_string(),
        Type::FloatLiteral { value } => value.to_string(),
        Type::IntLiteral { value } => value.to_string(),
        _ => ty.kind_name().to_string(),
    }
}

fn property_path(parent: &str, property: &str) -> String {
    if parent.starts_with('.') {
        format!("{parent}.{property}")
    } else {
        format!(".{parent}.{property}")
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Property, TypeDef};

    fn table() -> TypeTable {
        TypeTable::from_array(&[
            TypeDef::new("Id", Type::Int64),
            TypeDef::new("Filter", Type::object(vec![
                Property::required("field", Type::array(Type::Int32)),
                Property::optional("since", Type::Date),
            ])),
            TypeDef::new("Mode", Type::union(vec![
                Type::string_literal("fast"),
                Type::string_literal("slow"),
            ])),
        ])
        .unwrap()
    }

    fn check(table: &TypeTable, name: &str, value: WireValue, ty: &Type) -> (bool, Vec<String>) {
        let mut validator = StringValidator::new(table);
        let ok = validator.run(StringInput { name, value: &value }, ty, true).unwrap();
        (ok, validator.into_messages())
    }

    fn list(items: &[&str]) -> WireValue {
        WireValue::List(items.iter().map(|s| WireValue::from(*s)).collect())
    }

    #[test]
    fn scalars_use_kind_predicates() {
        let table = table();
        assert_eq!(check(&table, "id", "42".into(), &Type::reference("Id")), (true, vec![]));
        assert_eq!(
            check(&table, "id", "4x".into(), &Type::Int32),
            (false, vec![r#""id" should be int32"#.to_string()])
        );
        assert!(check(&table, "on", "true".into(), &Type::Boolean).0);
        assert!(check(&table, "f", "1.25".into(), &Type::Float).0);
        assert!(check(&table, "anything", "".into(), &Type::String).0);
        assert!(check(&table, "n", "".into(), &Type::Null).0);
        assert!(!check(&table, "n", "x".into(), &Type::Null).0);
    }

    #[test]
    fn literals_compare_values() {
        let table = table();
        assert!(check(&table, "v", "v1".into(), &Type::string_literal("v1")).0);
        assert!(!check(&table, "v", "v2".into(), &Type::string_literal("v1")).0);
        assert!(check(&table, "b", "false".into(), &Type::BooleanLiteral { value: false }).0);
        assert!(!check(&table, "b", "true".into(), &Type::BooleanLiteral { value: false }).0);
        assert!(check(&table, "n", "2".into(), &Type::IntLiteral { value: 2 }).0);
        assert!(check(&table, "n", "+2".into(), &Type::IntLiteral { value: 2 }).0);
        assert_eq!(
            check(&table, "n", "999".into(), &Type::IntLiteral { value: 2 }),
            (false, vec![r#""n" should be 2"#.to_string()])
        );
        assert!(!check(&table, "n", "2.0".into(), &Type::IntLiteral { value: 2 }).0);
        assert!(check(&table, "r", "0.5".into(), &Type::FloatLiteral { value: 0.5 }).0);
        assert!(check(&table, "r", ".50".into(), &Type::FloatLiteral { value: 0.5 }).0);
        assert_eq!(
            check(&table, "r", "7.25".into(), &Type::FloatLiteral { value: 0.5 }),
            (false, vec![r#""r" should be 0.5"#.to_string()])
        );
        let version = Type::union(vec![Type::IntLiteral { value: 1 }, Type::IntLiteral { value: 2 }]);
        assert_eq!(
            check(&table, "version", "999".into(), &version),
            (false, vec![r#""version" should be 1 | 2"#.to_string()])
        );
    }

    #[test]
    fn not_mandatory_empty_values_pass() {
        let table = table();
        let mut validator = StringValidator::new(&table);
        let empty = WireValue::from("");
        let input = StringInput { name: "limit", value: &empty };
        assert!(validator.run(input, &Type::Int32, false).unwrap());
        assert!(!validator.run(input, &Type::Int32, true).unwrap());
        assert_eq!(validator.messages, vec![r#""limit" should be int32"#.to_string()]);
    }

    #[test]
    fn not_mandatory_empty_structures_pass() {
        let table = table();
        let mut validator = StringValidator::new(&table);
        let empty = WireValue::from("");
        let tags = StringInput { name: "tags", value: &empty };
        assert!(validator.run(tags, &Type::array(Type::String), false).unwrap());
        let filter = StringInput { name: "filter", value: &empty };
        assert!(validator.run(filter, &Type::reference("Filter"), false).unwrap());
        assert!(validator.messages.is_empty());

        assert!(!validator.run(tags, &Type::array(Type::String), true).unwrap());
        assert_eq!(validator.messages, vec![r#""tags" should be array"#.to_string()]);
    }

    #[test]
    fn arrays_report_every_bad_index() {
        let table = table();
        let (ok, messages) = check(&table, "ids", list(&["1", "x", "3", "y"]), &Type::array(Type::Int64));
        assert!(!ok);
        assert_eq!(messages, vec![
            r#""ids[1]" should be int64"#.to_string(),
            r#""ids[3]" should be int64"#.to_string(),
        ]);

        let (ok, messages) = check(&table, "ids", "1,2".into(), &Type::array(Type::Int64));
        assert!(!ok);
        assert_eq!(messages, vec![r#""ids" should be array"#.to_string()]);
    }

    #[test]
    fn objects_skip_absent_optionals_and_nest_paths() {
        let table = table();
        let mut map = IndexMap::new();
        map.insert("field".to_string(), list(&["1", "b", "3"]));
        let (ok, messages) = check(&table, "header", WireValue::Map(map), &Type::reference("Filter"));
        assert!(!ok);
        assert_eq!(messages, vec![r#"".header.field[1]" should be int32"#.to_string()]);

        let mut map = IndexMap::new();
        map.insert("since".to_string(), WireValue::from("2020-01-01"));
        let (ok, messages) = check(&table, "filter", WireValue::Map(map), &Type::reference("Filter"));
        assert!(!ok);
        assert_eq!(messages, vec![r#"".filter.field" should be array"#.to_string()]);

        let (ok, _) = check(&table, "filter", "plain".into(), &Type::reference("Filter"));
        assert!(!ok);
    }

    #[test]
    fn unions_accept_any_member() {
        let table = table();
        assert!(check(&table, "mode", "slow".into(), &Type::reference("Mode")).0);
        let (ok, messages) = check(&table, "mode", "medium".into(), &Type::reference("Mode"));
        assert!(!ok);
        assert_eq!(messages, vec![
            r#""mode" should be fast | slow"#.to_string()
        ]);
        let id_or_date = Type::union(vec![Type::Int32, Type::Date]);
        assert!(check(&table, "at", "2021-03-04".into(), &id_or_date).0);
        assert!(check(&table, "at", "7".into(), &id_or_date).0);
    }

    #[test]
    fn unresolved_reference_is_an_error() {
        let table = table();
        let mut validator = StringValidator::new(&table);
        let value = WireValue::from("1");
        let result = validator.run(StringInput { name: "x", value: &value }, &Type::reference("Nope"), true);
        assert_eq!(result, Err(TypeTableError::Missing("Nope".into())));
    }
}
