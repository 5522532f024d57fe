use std::fmt;

use log::warn;
use serde::de::{Deserializer, IgnoredAny, MapAccess, Visitor};
use serde::Deserialize;

use crate::models::{Token, generate_id};

/// Token as it arrives from outside. Both `id` and `Id` style keys are
/// accepted and the last one in the object wins; `null` and missing fields
/// mean absent.
#[derive(Debug, Default)]
struct RawToken {
    id: Option<String>,
    name: Option<String>,
    value: Option<String>,
}

impl<'de> Deserialize<'de> for RawToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RawTokenVisitor)
    }
}

struct RawTokenVisitor;

impl<'de> Visitor<'de> for RawTokenVisitor {
    type Value = RawToken;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a token object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<RawToken, A::Error> {
        let mut raw = RawToken::default();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                "id" | "Id" => raw.id = map.next_value()?,
                "name" | "Name" => raw.name = map.next_value()?,
                "value" | "Value" => raw.value = map.next_value()?,
                _ => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(raw)
    }
}

/// Decodes and normalizes an external token list.
///
/// Never fails: anything that is not a well-formed JSON array of token objects
/// yields an empty list.
pub(crate) fn parse_tokens(json: &str) -> Vec<Token> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    match serde_json::from_str::<Option<Vec<RawToken>>>(json) {
        Ok(raw) => raw
            .unwrap_or_default()
            .into_iter()
            .map(normalize_token)
            .collect(),
        Err(err) => {
            warn!("event=parse_tokens status=fallback reason=malformed error={err}");
            Vec::new()
        }
    }
}

pub(crate) fn tokens_to_json(tokens: &[Token]) -> Result<String, serde_json::Error> {
    serde_json::to_string(tokens)
}

fn normalize_token(raw: RawToken) -> Token {
    let id = match raw.id {
        Some(id) if !id.trim().is_empty() => id.trim().to_string(),
        _ => generate_id(),
    };
    Token {
        id,
        name: raw.name.unwrap_or_default().trim().to_string(),
        value: raw.value.unwrap_or_default(),
    }
}
