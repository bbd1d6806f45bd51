/// Caps `text` at `max_chars` characters, marking the cut with `...`.
pub fn truncate_for_error(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated = text.chars().take(max_chars).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Body text reported with a non-success status; a failed read is named
/// instead of dropped.
pub(crate) fn status_error_body<E: std::fmt::Display>(body: Result<String, E>) -> String {
    match body {
        Ok(body) => body,
        Err(error) => format!("<unreadable body: {error}>"),
    }
}

pub(crate) fn next_page_from_headers(headers: &reqwest::header::HeaderMap) -> Option<u32> {
    let raw = headers.get(reqwest::header::LINK)?.to_str().ok()?;
    next_page_from_link(raw)
}

/// Reads the `page` query value of the `rel="next"` entry of a `Link` header.
pub(crate) fn next_page_from_link(raw: &str) -> Option<u32> {
    raw.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == r#"rel="next""# || param == "rel=next"
        });
        if !is_next {
            return None;
        }
        let url = target.strip_prefix('<')?.strip_suffix('>')?;
        let parsed = reqwest::Url::parse(url).ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
    })
}
