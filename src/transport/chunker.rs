/// Telegram's per-message character limit.
pub const TELEGRAM_MAX_CHARS: usize = 4096;

fn char_count(text: &str) -> usize {
    text.chars().count()
}

/// Split at the last whitespace that keeps the head within `max_chars`,
/// or hard-split when there is none.
fn split_head(text: &str, max_chars: usize) -> (&str, &str) {
    let limit = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let window = &text[..limit];

    match window.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => {
            let ws_len = window[idx..].chars().next().map_or(1, char::len_utf8);
            (&text[..idx + ws_len], &text[idx + ws_len..])
        }
        _ => (window, &text[limit..]),
    }
}

/// Split `text` into pieces of at most `max_chars` characters, preferring
/// line breaks, then spaces. Concatenating the pieces gives back `text`.
#[must_use]
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<String> {
    if text.is_empty() || max_chars == 0 {
        return Vec::new();
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split_inclusive('\n') {
        let line_len = char_count(line);
        if current_len + line_len <= max_chars {
            current.push_str(line);
            current_len += line_len;
            continue;
        }

        if !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        let mut rest = line;
        while char_count(rest) > max_chars {
            let (head, tail) = split_head(rest, max_chars);
            chunks.push(head.to_string());
            rest = tail;
        }
        current.push_str(rest);
        current_len = char_count(rest);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
