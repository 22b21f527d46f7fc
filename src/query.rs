//! Query-string parsing into wire values.
//!
//! A qs-style subset: repeated keys collapse into lists, `key[]=v` appends,
//! `key[a][b]=v` nests maps, and under a delimiting array strategy a value
//! containing the delimiter becomes a list. A lone value stays a string.
use indexmap::IndexMap;
use url::form_urlencoded;

use crate::definitions::QueryArrayStrategy;
use crate::string_validator::WireValue;

/// `/users/1?x=2` → (`/users/1`, `Some("x=2")`).
pub fn split_path_and_query(raw: &str) -> (&str, Option<&str>) {
    match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    }
}

pub fn parse_query(query: &str, strategy: QueryArrayStrategy) -> IndexMap<String, WireValue> {
    let mut params: IndexMap<String, WireValue> = IndexMap::new();
    for (raw_key, raw_value) in form_urlencoded::parse(query.as_bytes()) {
        let (base, segments) = split_key(&raw_key);
        let value = split_value(&raw_value, strategy);
        let merged = assign(params.get(base).cloned(), &segments, value);
        params.insert(base.to_string(), merged);
    }
    params
}

// ---------------------------- Internal helpers ---------------------------- //

#[derive(Debug, PartialEq)]
enum Segment {
    /// `[]` or a numeric index.
    Push,
    Key(String),
}

/// `a[b][]` → (`a`, [Key(b), Push]). Malformed brackets keep the whole key.
fn split_key(key: &str) -> (&str, Vec<Segment>) {
    let Some(open) = key.find('[').filter(|&i| i > 0) else {
        return (key, Vec::new());
    };
    let (base, mut rest) = key.split_at(open);
    let mut segments = Vec::new();
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return (key, Vec::new());
        };
        let Some(close) = inner.find(']') else {
            return (key, Vec::new());
        };
        let name = &inner[..close];
        if name.is_empty() || name.bytes().all(|b| b.is_ascii_digit()) {
            segments.push(Segment::Push);
        } else {
            segments.push(Segment::Key(name.to_string()));
        }
        rest = &inner[close + 1..];
    }
    (base, segments)
}

fn split_value(value: &str, strategy: QueryArrayStrategy) -> WireValue {
    match strategy.delimiter() {
        Some(delimiter) if value.contains(delimiter) => {
            WireValue::List(value.split(delimiter).map(WireValue::from).collect())
        }
        _ => WireValue::from(value),
    }
}

fn assign(target: Option<WireValue>, path: &[Segment], value: WireValue) -> WireValue {
    match path.split_first() {
        None => merge(target, value),
        Some((Segment::Push, [])) => {
            let items = match target {
                Some(WireValue::List(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            merge(Some(WireValue::List(items)), value)
        }
        Some((Segment::Push, rest)) => {
            let mut items = match target {
                Some(WireValue::List(items)) => items,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            items.push(assign(None, rest, value));
            WireValue::List(items)
        }
        Some((Segment::Key(key), rest)) => {
            let mut map = match target {
                Some(WireValue::Map(map)) => map,
                _ => IndexMap::new(),
            };
            let child = assign(map.get(key).cloned(), rest, value);
            map.insert(key.clone(), child);
            WireValue::Map(map)
        }
    }
}

/// Repeated occurrences of a key accumulate into a list.
fn merge(target: Option<WireValue>, value: WireValue) -> WireValue {
    let Some(existing) = target else {
        return value;
    };
    let mut items = match existing {
        WireValue::List(items) => items,
        other => vec![other],
    };
    match value {
        WireValue::List(more) => items.extend(more),
        single => items.push(single),
    }
    WireValue::List(items)
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> WireValue {
        WireValue::from(s)
    }

    fn list(items: &[&str]) -> WireValue {
        WireValue::List(items.iter().map(|s| text(s)).collect())
    }

    #[test]
    fn splits_off_the_query() {
        assert_eq!(split_path_and_query("/a/b?x=1&y"), ("/a/b", Some("x=1&y")));
        assert_eq!(split_path_and_query("/a/b"), ("/a/b", None));
    }

    #[test]
    fn single_values_stay_strings() {
        let q = parse_query("id=7&name=a%20b+c&flag", QueryArrayStrategy::Comma);
        assert_eq!(q["id"], text("7"));
        assert_eq!(q["name"], text("a b c"));
        assert_eq!(q["flag"], text(""));
    }

    #[test]
    fn ampersand_repeats_collapse() {
        let q = parse_query("id=3&id=4&id=5&tags=a,b", QueryArrayStrategy::Ampersand);
        assert_eq!(q["id"], list(&["3", "4", "5"]));
        assert_eq!(q["tags"], text("a,b"));
    }

    #[test]
    fn delimiters_follow_the_strategy() {
        assert_eq!(parse_query("t=a,b,c", QueryArrayStrategy::Comma)["t"], list(&["a", "b", "c"]));
        assert_eq!(parse_query("t=a%20b", QueryArrayStrategy::Space)["t"], list(&["a", "b"]));
        assert_eq!(parse_query("t=a|b", QueryArrayStrategy::Pipe)["t"], list(&["a", "b"]));
        assert_eq!(parse_query("t=a|b", QueryArrayStrategy::Comma)["t"], text("a|b"));
    }

    #[test]
    fn brackets_build_lists_and_maps() {
        let q = parse_query(
            "ids[]=1&ids[]=2&filter[from]=2020&filter[to]=2021&deep[a][b]=x",
            QueryArrayStrategy::Ampersand,
        );
        assert_eq!(q["ids"], list(&["1", "2"]));

        let mut filter = IndexMap::new();
        filter.insert("from".to_string(), text("2020"));
        filter.insert("to".to_string(), text("2021"));
        assert_eq!(q["filter"], WireValue::Map(filter));

        let mut inner = IndexMap::new();
        inner.insert("b".to_string(), text("x"));
        let mut deep = IndexMap::new();
        deep.insert("a".to_string(), WireValue::Map(inner));
        assert_eq!(q["deep"], WireValue::Map(deep));

        let keys: Vec<_> = q.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["ids", "filter", "deep"]);
    }

    #[test]
    fn malformed_brackets_are_plain_keys() {
        let q = parse_query("a[b=1&[c]=2", QueryArrayStrategy::Ampersand);
        assert_eq!(q["a[b"], text("1"));
        assert_eq!(q["[c]"], text("2"));
    }
}
