//! # Request Mutation
//!
//! `update` takes one of a closed set of input shapes, routes each key to a
//! namespace and patches the [`RequestModel`]. All pairs are resolved before
//! any is applied, so a failed update leaves the model untouched.

use crate::error::{Result, SpiderError};
use crate::request::url::validate_key;
use crate::request::{KeyLocationIndex, Method, Namespace, RequestModel};
use crate::transport::Response;
use std::collections::HashMap;

/// Lookup table used to redirect raw values before assignment
pub type LookupTable = HashMap<String, String>;

/// The accepted shapes of an update
#[derive(Debug, Clone)]
pub enum UpdateArgs<'a> {
    /// One key and its value
    Pair(String, String),
    /// Every key/value pair of a mapping
    Mapping(Vec<(String, String)>),
    /// Keys and values paired by position
    PairedLists {
        keys: Vec<String>,
        values: Vec<String>,
    },
    /// `key -> lookup[raw]` for every `key -> raw` of the mapping
    MappingThroughLookup {
        mapping: Vec<(String, String)>,
        lookup: LookupTable,
    },
    /// `keys[i] -> lookup[values[i]]`
    TripleWithLookup {
        keys: Vec<String>,
        values: Vec<String>,
        lookup: LookupTable,
    },
    /// Adopt the cookies a response set
    Response(&'a Response),
}

impl<'a> UpdateArgs<'a> {
    pub fn pair(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Pair(key.into(), value.into())
    }

    pub fn mapping<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn paired_lists<K, V>(
        keys: impl IntoIterator<Item = K>,
        values: impl IntoIterator<Item = V>,
    ) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self::PairedLists {
            keys: keys.into_iter().map(Into::into).collect(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn response(response: &'a Response) -> Self {
        Self::Response(response)
    }

    /// Flatten into key/value pairs, resolving lookups
    fn into_pairs(self) -> Result<Vec<(String, String)>> {
        match self {
            Self::Pair(key, value) => Ok(vec![(key, value)]),
            Self::Mapping(pairs) => Ok(pairs),
            Self::PairedLists { keys, values } => zip_exact(keys, values),
            Self::MappingThroughLookup { mapping, lookup } => mapping
                .into_iter()
                .map(|(key, raw)| look_up(&lookup, &raw).map(|value| (key, value)))
                .collect(),
            Self::TripleWithLookup {
                keys,
                values,
                lookup,
            } => zip_exact(keys, values)?
                .into_iter()
                .map(|(key, raw)| look_up(&lookup, &raw).map(|value| (key, value)))
                .collect(),
            Self::Response(_) => Ok(Vec::new()),
        }
    }
}

fn zip_exact(keys: Vec<String>, values: Vec<String>) -> Result<Vec<(String, String)>> {
    if keys.len() != values.len() {
        return Err(SpiderError::PairedLengthMismatch {
            keys: keys.len(),
            values: values.len(),
        });
    }
    Ok(keys.into_iter().zip(values).collect())
}

fn look_up(lookup: &LookupTable, raw: &str) -> Result<String> {
    lookup
        .get(raw)
        .cloned()
        .ok_or_else(|| SpiderError::MissingLookupKey(raw.to_string()))
}

/// Decide which namespace an untagged key belongs to.
///
/// A key found in exactly one namespace goes there; a key found in none goes to
/// the query parameters of a GET or the body of a POST; anything else is ambiguous.
pub fn resolve_namespace(index: &KeyLocationIndex, key: &str, method: Method) -> Result<Namespace> {
    let found = index.locate(key);
    match found.len() {
        0 => Ok(match method {
            Method::Get => Namespace::Param,
            Method::Post => Namespace::Body,
        }),
        1 => Ok(found[0]),
        _ => Err(SpiderError::AmbiguousKey {
            key: key.to_string(),
            namespaces: found,
        }),
    }
}

/// Apply an update to the model
pub fn apply_update(
    model: &mut RequestModel,
    args: UpdateArgs<'_>,
    tag: Option<Namespace>,
) -> Result<()> {
    if let UpdateArgs::Response(response) = &args {
        tracing::debug!(
            "Adopting {} cookie(s) from response {}",
            response.cookies().len(),
            response.url()
        );
        model.merge_cookies(response.cookies());
        return Ok(());
    }

    let pairs = args.into_pairs()?;
    let index = model.key_location_index();
    let mut routed = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        let namespace = match tag {
            Some(namespace) => namespace,
            None => resolve_namespace(&index, &key, model.method())?,
        };
        if namespace == Namespace::Path {
            validate_key(&key)?;
        }
        routed.push((namespace, key, value));
    }

    let mut staged = model.clone();
    for (namespace, key, value) in routed {
        tracing::debug!("Update {namespace}.{key}");
        staged.set_value(namespace, &key, &value)?;
    }
    *model = staged;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HeaderValue;

    fn get_model() -> RequestModel {
        RequestModel::from_parts(
            Some("https://example.com/api?q=1&id=7"),
            None,
            Some("Accept: */*"),
            Some("id=cookie-id"),
            true,
        )
        .unwrap()
    }

    fn lookup(pairs: &[(&str, &str)]) -> LookupTable {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn pair_should_route_to_unique_namespace() {
        let mut model = get_model();
        apply_update(&mut model, UpdateArgs::pair("q", "2"), None).unwrap();
        apply_update(&mut model, UpdateArgs::pair("Accept", "text/html"), None).unwrap();

        assert_eq!(model.get_params().get("q").map(String::as_str), Some("2"));
        assert_eq!(
            model.get_headers().get("Accept"),
            Some(&HeaderValue::from("text/html"))
        );
    }

    #[test]
    fn untagged_routing_should_match_explicit_tag() {
        let mut untagged = get_model();
        let mut tagged = get_model();

        apply_update(&mut untagged, UpdateArgs::pair("q", "9"), None).unwrap();
        apply_update(&mut tagged, UpdateArgs::pair("q", "9"), Some(Namespace::Param)).unwrap();

        assert_eq!(untagged.prepare().unwrap(), tagged.prepare().unwrap());
    }

    #[test]
    fn key_in_two_namespaces_should_need_a_tag() {
        let mut model = get_model();

        let result = apply_update(&mut model, UpdateArgs::pair("id", "8"), None);
        assert!(matches!(
            result,
            Err(SpiderError::AmbiguousKey { ref namespaces, .. })
                if namespaces == &vec![Namespace::Param, Namespace::Cookie]
        ));

        apply_update(&mut model, UpdateArgs::pair("id", "8"), Some(Namespace::Cookie)).unwrap();
        assert_eq!(model.get_cookies().get("id"), Some("8"));
        assert_eq!(model.get_params().get("id").map(String::as_str), Some("7"));
    }

    #[test]
    fn unknown_key_should_default_by_method() {
        let index = KeyLocationIndex::default();
        assert_eq!(
            resolve_namespace(&index, "new", Method::Get).unwrap(),
            Namespace::Param
        );
        assert_eq!(
            resolve_namespace(&index, "new", Method::Post).unwrap(),
            Namespace::Body
        );
    }

    #[test]
    fn repeated_update_should_be_idempotent() {
        let mut once = get_model();
        let mut twice = get_model();

        apply_update(&mut once, UpdateArgs::mapping([("k", "v")]), None).unwrap();
        apply_update(&mut twice, UpdateArgs::mapping([("k", "v")]), None).unwrap();
        apply_update(&mut twice, UpdateArgs::mapping([("k", "v")]), None).unwrap();

        assert_eq!(once.prepare().unwrap(), twice.prepare().unwrap());
    }

    #[test]
    fn paired_lists_should_apply_by_position() {
        let mut model = get_model();
        apply_update(
            &mut model,
            UpdateArgs::paired_lists(["page", "size"], ["3", "50"]),
            None,
        )
        .unwrap();

        assert_eq!(model.get_param_string(), "?q=1&id=7&page=3&size=50");
    }

    #[test]
    fn paired_lists_of_unequal_length_should_fail() {
        let mut model = get_model();
        let before = model.prepare().unwrap();

        let result = apply_update(&mut model, UpdateArgs::paired_lists(["a", "b"], ["1"]), None);

        assert!(matches!(
            result,
            Err(SpiderError::PairedLengthMismatch { keys: 2, values: 1 })
        ));
        assert_eq!(model.prepare().unwrap(), before);
    }

    #[test]
    fn mapping_through_lookup_should_redirect_values() {
        let mut model = get_model();
        apply_update(
            &mut model,
            UpdateArgs::MappingThroughLookup {
                mapping: vec![("city".to_string(), "tokyo".to_string())],
                lookup: lookup(&[("tokyo", "130010")]),
            },
            None,
        )
        .unwrap();

        assert_eq!(model.get_params().get("city").map(String::as_str), Some("130010"));
    }

    #[test]
    fn triple_with_lookup_should_redirect_values() {
        let mut model = get_model();
        apply_update(
            &mut model,
            UpdateArgs::TripleWithLookup {
                keys: vec!["Accept".to_string()],
                values: vec!["json".to_string()],
                lookup: lookup(&[("json", "application/json")]),
            },
            Some(Namespace::Header),
        )
        .unwrap();

        assert_eq!(
            model.get_headers().get("Accept"),
            Some(&HeaderValue::from("application/json"))
        );
    }

    #[test]
    fn missing_lookup_entry_should_fail() {
        let mut model = get_model();
        let result = apply_update(
            &mut model,
            UpdateArgs::TripleWithLookup {
                keys: vec!["q".to_string()],
                values: vec!["absent".to_string()],
                lookup: LookupTable::new(),
            },
            None,
        );

        assert!(matches!(result, Err(SpiderError::MissingLookupKey(k)) if k == "absent"));
    }

    #[test]
    fn cookie_key_should_parse_cookie_text() {
        let mut model = get_model();
        apply_update(
            &mut model,
            UpdateArgs::pair("Cookie", "sid=abc123"),
            Some(Namespace::Cookie),
        )
        .unwrap();

        assert_eq!(model.get_cookies().get("sid"), Some("abc123"));
    }

    #[test]
    fn path_update_should_validate_key_before_applying() {
        let mut model = get_model();
        let result = apply_update(
            &mut model,
            UpdateArgs::mapping([("1", "v2"), ("bogus", "x")]),
            Some(Namespace::Path),
        );

        assert!(matches!(result, Err(SpiderError::InvalidPathKey(_))));
        assert_eq!(model.get_url().unwrap(), "https://example.com/api");
    }

    #[test]
    fn path_update_should_rewrite_segment() {
        let mut model = get_model();
        apply_update(&mut model, UpdateArgs::pair("1", "v2"), None).unwrap();

        assert_eq!(model.get_url().unwrap(), "https://example.com/v2");
    }

    #[test]
    fn failed_field_write_should_leave_model_untouched() {
        let mut model = RequestModel::from_parts(
            Some("https://example.com/api"),
            Some("[1, 2]"),
            Some("Accept: */*"),
            None,
            true,
        )
        .unwrap();

        let result = apply_update(
            &mut model,
            UpdateArgs::mapping([("Accept", "text/html"), ("field", "x")]),
            None,
        );

        assert!(matches!(result, Err(SpiderError::MalformedBody(_))));
        assert_eq!(
            model.get_headers().get("Accept"),
            Some(&HeaderValue::Single("*/*".to_string()))
        );
    }
}
