use log::debug;

use crate::models::{RenderResponse, Token};
use crate::parser::parse_tokens;
use crate::slug::placeholder;

#[derive(Clone, Debug)]
struct Replacement<'a> {
    placeholder: String,
    value: &'a str,
}

/// Substitutes every token's placeholder in `template` with the token value.
///
/// Placeholders are applied longest first, each pass scanning the output of
/// the previous one. Matching is ASCII case-insensitive and literal.
pub(crate) fn render(template: &str, tokens: &[Token]) -> String {
    let mut replacements: Vec<Replacement> = tokens
        .iter()
        .map(|token| Replacement {
            placeholder: placeholder(&token.name),
            value: token.value.as_str(),
        })
        .collect();
    // sort_by is stable: equal lengths keep token order
    replacements.sort_by(|a, b| b.placeholder.len().cmp(&a.placeholder.len()));

    replacements
        .iter()
        .fold(template.to_string(), |acc, item| {
            replace_ignore_case(&acc, &item.placeholder, item.value)
        })
}

/// Parses the external token list, renders, and returns the normalized tokens
/// alongside the output. Malformed token data renders the template unchanged.
pub(crate) fn render_request(template: Option<&str>, tokens_json: &str) -> RenderResponse {
    let template = template.unwrap_or_default();
    let tokens = parse_tokens(tokens_json);
    let output = render(template, &tokens);
    debug!(
        "event=render tokens={} template_len={} output_len={}",
        tokens.len(),
        template.len(),
        output.len()
    );
    RenderResponse {
        output,
        normalized_tokens: tokens,
    }
}

/// Replaces every non-overlapping occurrence of `needle`, comparing ASCII
/// letters without case. A UTF-8 needle can only match on char boundaries,
/// so the byte offsets are valid slice points of `haystack`.
fn replace_ignore_case(haystack: &str, needle: &str, value: &str) -> String {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.is_empty() || hay.len() < pat.len() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len());
    let mut copied = 0;
    let mut index = 0;
    while index + pat.len() <= hay.len() {
        if hay[index..index + pat.len()].eq_ignore_ascii_case(pat) {
            out.push_str(&haystack[copied..index]);
            out.push_str(value);
            index += pat.len();
            copied = index;
        } else {
            index += 1;
        }
    }
    out.push_str(&haystack[copied..]);
    out
}
