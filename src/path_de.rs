//! JSON loading for contracts and captured exchanges, with the JSON path of
//! the offending field in every error.
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, String> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(|err| {
        let path = err.path().to_string();
        format!("at JSON path {path} → {}", err.into_inner())
    })
}

/// One value per non-blank line.
pub fn from_ndjson_with_path<T: DeserializeOwned>(src: &str) -> Result<Vec<T>, String> {
    src.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            from_str_with_path(line).map_err(|e| format!("line {}: {e}", index + 1))
        })
        .collect()
}

pub fn load_json_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    from_slice_with_path(&bytes)
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("parsing {}", path.display()))
}

/// A single value, an array of values, or NDJSON when `ndjson` is set.
pub fn load_json_records<T: DeserializeOwned>(path: &Path, ndjson: bool) -> Result<Vec<T>> {
    let src = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let parsed = if ndjson {
        from_ndjson_with_path(&src)
    } else if src.trim_start().starts_with('[') {
        from_str_with_path::<Vec<T>>(&src)
    } else {
        from_str_with_path::<T>(&src).map(|one| vec![one])
    };
    parsed
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observed::ObservedExchange;

    #[test]
    fn errors_name_the_json_path() {
        let err = from_str_with_path::<ObservedExchange>(
            r#"{"request":{"method":"GET","path":"/"},"response":{"statusCode":"ok"}}"#,
        )
        .unwrap_err();
        assert!(err.starts_with("at JSON path response.statusCode"), "{err}");
    }

    #[test]
    fn ndjson_reports_line_numbers() {
        let src = concat!(
            r#"{"request":{"method":"GET","path":"/"},"response":{"statusCode":200}}"#,
            "\n\n",
            r#"{"request":{"method":"GET"},"response":{"statusCode":200}}"#,
        );
        let err = from_ndjson_with_path::<ObservedExchange>(src).unwrap_err();
        assert!(err.starts_with("line 3: "), "{err}");
    }
}
