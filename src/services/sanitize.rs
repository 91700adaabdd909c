/// Free-text gatekeeper applied before user input reaches storage or a
/// response body.
///
/// Returns `Some("")` for absent input, `None` when the trimmed text
/// contains one of the denylisted substrings (`'`, `;`, `--`), and the
/// trimmed, HTML-escaped text otherwise. The denylist is deliberately
/// conservative and will reject legitimate text containing those characters.
///
/// Callers must treat `None` as a hard validation failure and abort with an
/// "invalid characters" error — never substitute an empty string for it.
/// Storage safety does not rest on this filter alone: every query binds
/// parameters, and `escape_html` handles display safety separately.
pub fn sanitize(raw: Option<&str>) -> Option<String> {
    let Some(raw) = raw else {
        return Some(String::new());
    };

    let trimmed = raw.trim();
    if ["'", ";", "--"].iter().any(|needle| trimmed.contains(needle)) {
        return None;
    }

    Some(escape_html(trimmed))
}

/// Minimal HTML escaping for text destined for a browser context.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
