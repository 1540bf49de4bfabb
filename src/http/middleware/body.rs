//! JSON and URL-encoded body parsing.
//!
//! # Responsibilities
//! - Enforce the body cap before and while reading
//! - Decode JSON (objects and arrays only) and form bodies into a
//!   `serde_json::Value` attached as [`ParsedBody`]
//! - Expand bracketed form keys (`a[b]=c`, `day[]=mon`) into nested values
//! - Hand the raw bytes on so handlers may still use axum extractors
//!
//! # Design Decisions
//! - Every request carries a `ParsedBody`; without a decodable body it is an
//!   empty object, so handlers never fail on a missing extension

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{header, HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use serde_json::{Map, Value};

use crate::http::error::ApiError;

/// Decoded request body, available to handlers as an extension.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBody(pub Value);

impl ParsedBody {
    /// `{}`, used when there is nothing to decode.
    pub fn empty() -> Self {
        ParsedBody(Value::Object(Map::new()))
    }
}

/// Byte cap for parsed bodies.
#[derive(Debug, Clone, Copy)]
pub struct BodyLimit(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Json,
    Form,
}

impl BodyKind {
    fn of(headers: &HeaderMap) -> Option<BodyKind> {
        let content_type = headers.get(header::CONTENT_TYPE)?.to_str().ok()?;
        let essence = content_type.split(';').next()?.trim().to_ascii_lowercase();
        match essence.as_str() {
            "application/json" => Some(BodyKind::Json),
            "application/x-www-form-urlencoded" => Some(BodyKind::Form),
            _ => None,
        }
    }
}

pub async fn parse_body(
    State(BodyLimit(limit)): State<BodyLimit>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(kind) = BodyKind::of(request.headers()) else {
        request.extensions_mut().insert(ParsedBody::empty());
        return Ok(next.run(request).await);
    };

    let declared = request
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(ApiError::PayloadTooLarge { limit });
    }

    let (mut parts, body) = request.into_parts();
    let bytes = read_limited(body, limit).await?;

    let parsed = if bytes.is_empty() {
        ParsedBody::empty()
    } else {
        ParsedBody(match kind {
            BodyKind::Json => decode_json(&bytes)?,
            BodyKind::Form => decode_form(&bytes)?,
        })
    };
    parts.extensions.insert(parsed);

    Ok(next.run(Request::from_parts(parts, Body::from(bytes))).await)
}

async fn read_limited(body: Body, limit: usize) -> Result<Bytes, ApiError> {
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.is::<LengthLimitError>() => Err(ApiError::PayloadTooLarge { limit }),
        Err(e) => Err(ApiError::MalformedBody(format!("failed to read body: {}", e))),
    }
}

/// Strict JSON: only objects and arrays are accepted at the top level.
pub fn decode_json(bytes: &[u8]) -> Result<Value, ApiError> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))?;
    match value {
        Value::Object(_) | Value::Array(_) => Ok(value),
        other => Err(ApiError::MalformedBody(format!(
            "expected a JSON object or array, got {}",
            other
        ))),
    }
}

/// Deepest bracket nesting expanded; further brackets stay in the key.
const MAX_FORM_DEPTH: usize = 5;

/// Highest index that turns an indexed key (`a[3]=x`) into an array slot.
const MAX_FORM_INDEX: usize = 20;

/// URL-encoded pairs as a JSON object.
///
/// Repeated keys collect into an array, `a[b]=c` nests into `{"a":{"b":"c"}}`
/// and `a[]=x` appends to an array. Objects whose keys are all small indices
/// become arrays ordered by index.
pub fn decode_form(bytes: &[u8]) -> Result<Value, ApiError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_bytes(bytes).map_err(|e| ApiError::MalformedBody(e.to_string()))?;

    let mut root = Value::Object(Map::new());
    for (key, value) in pairs {
        insert_form_value(&mut root, &key_path(&key), value);
    }
    if let Value::Object(map) = &mut root {
        for child in map.values_mut() {
            compact_indices(child);
        }
    }
    Ok(root)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeySegment {
    Name(String),
    Append,
}

/// Split `user[address][city]` into `user`, `address`, `city`.
fn key_path(key: &str) -> Vec<KeySegment> {
    let literal = || vec![KeySegment::Name(key.to_string())];
    let open = match key.find('[') {
        Some(0) | None => return literal(),
        Some(open) => open,
    };

    let mut segments = vec![KeySegment::Name(key[..open].to_string())];
    let mut rest = &key[open..];
    while rest.starts_with('[') && segments.len() <= MAX_FORM_DEPTH {
        let Some(close) = rest.find(']') else {
            break;
        };
        let inner = &rest[1..close];
        segments.push(if inner.is_empty() {
            KeySegment::Append
        } else {
            KeySegment::Name(inner.to_string())
        });
        rest = &rest[close + 1..];
    }

    if rest.is_empty() {
        segments
    } else if segments.len() == 1 {
        literal()
    } else {
        segments.push(KeySegment::Name(rest.to_string()));
        segments
    }
}

fn insert_form_value(slot: &mut Value, path: &[KeySegment], value: String) {
    match path.split_first() {
        None => match slot {
            Value::Null => *slot = Value::String(value),
            Value::Array(items) => items.push(Value::String(value)),
            existing => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value)]);
            }
        },
        Some((KeySegment::Append, rest)) => {
            if !slot.is_array() {
                let existing = slot.take();
                *slot = Value::Array(if existing.is_null() { Vec::new() } else { vec![existing] });
            }
            if let Value::Array(items) = slot {
                items.push(Value::Null);
                if let Some(last) = items.last_mut() {
                    insert_form_value(last, rest, value);
                }
            }
        }
        Some((KeySegment::Name(name), rest)) => {
            let map = match slot {
                Value::Object(map) => map,
                other => {
                    *other = Value::Object(into_indexed_map(other.take()));
                    match other {
                        Value::Object(map) => map,
                        _ => return,
                    }
                }
            };
            let child = map.entry(name.clone()).or_insert(Value::Null);
            insert_form_value(child, rest, value);
        }
    }
}

/// Existing value as a map: arrays keep their positions as keys.
fn into_indexed_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Null => Map::new(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Object(map) => map,
        scalar => Map::from_iter([("0".to_string(), scalar)]),
    }
}

fn compact_indices(value: &mut Value) {
    match value {
        Value::Array(items) => items.iter_mut().for_each(compact_indices),
        Value::Object(map) => {
            map.values_mut().for_each(compact_indices);
            let indices: Option<Vec<usize>> = map
                .keys()
                .map(|k| k.parse::<usize>().ok().filter(|i| *i <= MAX_FORM_INDEX))
                .collect();
            if let Some(mut indices) = indices.filter(|i| !i.is_empty()) {
                indices.sort_unstable();
                let items = indices
                    .iter()
                    .filter_map(|i| map.remove(&i.to_string()))
                    .collect();
                *value = Value::Array(items);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use serde_json::json;

    #[test]
    fn content_type_detection() {
        let mut headers = HeaderMap::new();
        assert_eq!(BodyKind::of(&headers), None);

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert_eq!(BodyKind::of(&headers), Some(BodyKind::Json));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("Application/X-WWW-Form-Urlencoded"));
        assert_eq!(BodyKind::of(&headers), Some(BodyKind::Form));

        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert_eq!(BodyKind::of(&headers), None);
    }

    #[test]
    fn json_must_be_object_or_array() {
        assert_eq!(decode_json(br#"{"name":"Yoga"}"#).unwrap(), json!({"name": "Yoga"}));
        assert_eq!(decode_json(b"[1,2]").unwrap(), json!([1, 2]));
        assert!(matches!(decode_json(b"42"), Err(ApiError::MalformedBody(_))));
        assert!(matches!(decode_json(b"{\"name\":"), Err(ApiError::MalformedBody(_))));
    }

    #[test]
    fn form_repeated_keys_become_arrays() {
        let value = decode_form(b"name=Spinning&day=mon&day=wed&day=fri&note=a%20b").unwrap();
        assert_eq!(
            value,
            json!({"name": "Spinning", "day": ["mon", "wed", "fri"], "note": "a b"})
        );
    }

    #[test]
    fn form_bracket_keys_nest() {
        let value = decode_form(b"user%5Bname%5D=Ana&user[address][city]=Lima&plan=gold").unwrap();
        assert_eq!(
            value,
            json!({"user": {"name": "Ana", "address": {"city": "Lima"}}, "plan": "gold"})
        );
    }

    #[test]
    fn form_empty_brackets_append() {
        let value = decode_form(b"day[]=mon&day[]=wed&slots[][hour]=9").unwrap();
        assert_eq!(value, json!({"day": ["mon", "wed"], "slots": [{"hour": "9"}]}));

        assert_eq!(decode_form(b"day[]=mon").unwrap(), json!({"day": ["mon"]}));
    }

    #[test]
    fn form_indexed_keys_become_ordered_arrays() {
        let value = decode_form(b"items[1]=b&items[0]=a&big[99]=x").unwrap();
        assert_eq!(value, json!({"items": ["a", "b"], "big": {"99": "x"}}));
    }

    #[test]
    fn form_unbalanced_brackets_stay_literal() {
        assert_eq!(decode_form(b"a[b=c").unwrap(), json!({"a[b": "c"}));
        assert_eq!(decode_form(b"[x]=1").unwrap(), json!({"[x]": "1"}));
    }

    #[test]
    fn form_nesting_stops_at_max_depth() {
        let value = decode_form(b"a[b][c][d][e][f][g]=1").unwrap();
        assert_eq!(
            value,
            json!({"a": {"b": {"c": {"d": {"e": {"f": {"[g]": "1"}}}}}}})
        );
    }

    #[test]
    fn empty_body_is_an_empty_object() {
        assert_eq!(ParsedBody::empty(), ParsedBody(json!({})));
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_while_reading() {
        let body = Body::from(vec![b'a'; 64]);
        let err = read_limited(body, 16).await.unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge { limit: 16 }));
    }
}
