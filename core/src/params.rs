//! Parameter encoding for query strings and form bodies.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Request parameters. Keys are unique; the last write wins.
pub type Params = BTreeMap<String, String>;

/// Join `params` as `key=value` pairs separated by `&`.
///
/// With `escape` set, keys and values are escaped per
/// `application/x-www-form-urlencoded` (space becomes `+`). Without it they
/// are written verbatim.
pub fn encode(params: &Params, escape: bool) -> String {
    params
        .iter()
        .map(|(key, value)| {
            if escape {
                format!("{}={}", escape_component(key), escape_component(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Append an already-encoded query to `base`, using `&` if `base` already
/// carries a `?`.
pub fn append_query(base: &str, query: &str) -> String {
    if query.is_empty() {
        return base.to_string();
    }
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{query}")
}

fn escape_component(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
