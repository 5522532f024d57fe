const FALLBACK_SLUG: &str = "token";

/// Converts a token name into the identifier used inside its placeholder.
///
/// The result is never empty, only contains `[a-z0-9_]`, never starts or ends
/// with `_` and never contains `__`.
pub(crate) fn slug(raw_name: &str) -> String {
    let lowered = raw_name.trim().to_ascii_lowercase();
    if lowered.is_empty() {
        return FALLBACK_SLUG.to_string();
    }

    let mut slug = String::with_capacity(lowered.len());
    let mut last_underscore = false;
    for ch in lowered.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch);
            last_underscore = false;
        } else if !last_underscore {
            slug.push('_');
            last_underscore = true;
        }
    }

    let trimmed = slug.trim_matches('_');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

pub(crate) fn placeholder(raw_name: &str) -> String {
    format!("{{{{{}}}}}", slug(raw_name))
}
