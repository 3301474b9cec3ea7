use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Token prefixes that start a secret value.
const PREFIX_PATTERNS: [&str; 4] = ["sk-", "AKIA", "ASIA", "/bot"];

/// Markers followed by a secret value.
const MARKER_PATTERNS: [&str; 6] = [
    "Authorization: Bearer ",
    "authorization: bearer ",
    "Bearer ",
    "api_key=",
    "\"api_key\":\"",
    "\"token\":\"",
];

fn is_secret_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

/// Redact every value following `marker`; the marker itself is kept unless
/// it is a token prefix.
fn redact_after(text: &mut String, marker: &str, keep_marker: bool) {
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find(marker) {
        let start = search_from + rel;
        let value_start = start + marker.len();
        let value_end = text[value_start..]
            .char_indices()
            .find(|(_, c)| !is_secret_char(*c))
            .map_or(text.len(), |(i, _)| value_start + i);

        if value_end == value_start {
            search_from = value_start;
            continue;
        }

        let redact_from = if keep_marker { value_start } else { start };
        text.replace_range(redact_from..value_end, REDACTED);
        search_from = redact_from + REDACTED.len();
    }
}

/// Scrub API keys, AWS access keys and bot tokens out of text that is about
/// to be logged or shown to the user.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    let hit = PREFIX_PATTERNS
        .iter()
        .chain(MARKER_PATTERNS.iter())
        .any(|pattern| input.contains(pattern));
    if !hit {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in MARKER_PATTERNS {
        redact_after(&mut scrubbed, marker, true);
    }
    for prefix in PREFIX_PATTERNS {
        redact_after(&mut scrubbed, prefix, prefix == "/bot");
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets, then cap the length.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    match scrubbed.char_indices().nth(MAX_API_ERROR_CHARS) {
        Some((end, _)) => format!("{}...", &scrubbed[..end]),
        None => scrubbed.into_owned(),
    }
}
