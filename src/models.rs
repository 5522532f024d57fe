use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

const ID_ALPHABET: &[u8] = b"0123456789abcdef";
const ID_LEN: usize = 32;

/// Canonical token record: a display name and the value substituted for its
/// placeholder.
///
/// `id` is never empty once a token has been normalized or created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Token {
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) value: String,
}

impl Token {
    /// Creates an empty token with a fresh id.
    pub(crate) fn new() -> Self {
        Self {
            id: generate_id(),
            name: String::new(),
            value: String::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_fields(name: &str, value: &str) -> Self {
        Self {
            id: generate_id(),
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// Label shown for the token in the editor.
    pub(crate) fn label(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() { "Token" } else { trimmed }
    }
}

/// One piece of an editable template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Segment {
    Text(String),
    /// Stands for the placeholder of the token with this id.
    Bubble { token_id: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RenderResponse {
    pub(crate) output: String,
    pub(crate) normalized_tokens: Vec<Token>,
}

/// 32 lowercase hex characters.
pub(crate) fn generate_id() -> String {
    let mut rng = rand::rng();
    (0..ID_LEN)
        .map(|_| ID_ALPHABET.choose(&mut rng).copied().unwrap_or(b'0') as char)
        .collect()
}
