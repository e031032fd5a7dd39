//! Small string helpers shared across the workspace.

/// Normalize a string value: empty or whitespace-only becomes `None`.
///
/// Applied to every string-typed event field so downstream consumers never
/// see `Some("")`.
pub fn strip_to_none(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Format a display name into a slug with a maximum length.
///
/// Separators (space, comma, dot) become dashes, anything outside
/// `[a-z0-9_-]` is dropped, and the result is truncated to `max_len`.
pub fn format_slug(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.to_lowercase().chars() {
        match c {
            ' ' | ',' | '.' => slug.push('-'),
            'a'..='z' | '0'..='9' | '_' | '-' => slug.push(c),
            _ => {}
        }
    }
    slug.truncate(max_len);
    slug
}

/// Decode the HTML entities WordPress emits in the `guid` column.
///
/// Handles the five named entities plus decimal and hex numeric references.
/// Unknown entities are passed through unchanged.
pub fn unescape_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];

        match tail.find(';') {
            // Entities longer than "&#xffffff;" are not entities.
            Some(end) if end <= 10 => {
                let entity = &tail[1..end];
                match decode_entity(entity) {
                    Some(decoded) => out.push(decoded),
                    None => out.push_str(&tail[..=end]),
                }
                rest = &tail[end + 1..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or(entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok()?
            } else {
                return None;
            };
            char::from_u32(code)
        }
    }
}

/// Split a comma-separated string while keeping quoted parts intact.
///
/// `"a, b", c` splits into `["a, b"` (quotes preserved) and `c]`. Used for
/// the kennel whitelist configuration value.
pub fn split_quoted(input: &str, strip: bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;

    for c in input.chars() {
        match (c, quote) {
            ('"' | '\'', None) => {
                quote = Some(c);
                current.push(c);
            }
            (q, Some(open)) if q == open => {
                quote = None;
                current.push(q);
            }
            (',', None) => {
                parts.push(current);
                current = String::new();
            }
            _ => current.push(c),
        }
    }
    parts.push(current);

    if strip {
        parts.into_iter().map(|p| p.trim().to_string()).collect()
    } else {
        parts
    }
}
