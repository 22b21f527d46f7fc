use indexmap::IndexMap;

use super::{Type, TypeDef};
use crate::error::TypeTableError;

/// Lookup table for named types. Insertion order is kept so projections and
/// reports come out in declaration order.
#[derive(Clone, Debug, Default)]
pub struct TypeTable {
    types: IndexMap<String, Type>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_array(defs: &[TypeDef]) -> Result<Self, TypeTableError> {
        let mut table = Self::new();
        for def in defs {
            table.add(def.name.clone(), def.ty.clone())?;
        }
        Ok(table)
    }

    /// Entries sorted by name.
    pub fn to_array(&self) -> Vec<TypeDef> {
        let mut out: Vec<TypeDef> = self
            .types
            .iter()
            .map(|(name, ty)| TypeDef::new(name.clone(), ty.clone()))
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }

    /// Single assignment: a second `add` under the same name is an error.
    pub fn add(&mut self, name: impl Into<String>, ty: Type) -> Result<(), TypeTableError> {
        let name = name.into();
        if self.types.contains_key(&name) {
            return Err(TypeTableError::Duplicate(name));
        }
        self.types.insert(name, ty);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    pub fn get_or_error(&self, name: &str) -> Result<&Type, TypeTableError> {
        self.get(name).ok_or_else(|| TypeTableError::Missing(name.to_string()))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.types.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Follow a chain of references to the first non-reference type.
    /// A chain that revisits a name is reported as a cycle.
    pub fn dereference<'a>(&'a self, ty: &'a Type) -> Result<&'a Type, TypeTableError> {
        let mut current = ty;
        let mut seen: Vec<&str> = Vec::new();
        while let Type::Reference { name } = current {
            if seen.contains(&name.as_str()) {
                return Err(TypeTableError::Cycle(name.clone()));
            }
            seen.push(name);
            current = self.get_or_error(name)?;
        }
        Ok(current)
    }
}
