use crate::error::StoreError;
use url::Url;

/// Maximum accepted URL length in bytes.
pub const MAX_URL_LENGTH: usize = 2048;

/// Validates a submitted URL: parseable as an absolute URL with a host,
/// bounded length.
pub fn validate_url(raw: &str) -> Result<Url, StoreError> {
    if raw.is_empty() {
        return Err(StoreError::InvalidInput("url cannot be empty".to_string()));
    }
    if raw.len() > MAX_URL_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "url exceeds {} bytes",
            MAX_URL_LENGTH
        )));
    }
    let parsed =
        Url::parse(raw).map_err(|e| StoreError::InvalidInput(format!("malformed url: {}", e)))?;
    if parsed.host_str().is_none() {
        return Err(StoreError::InvalidInput(format!(
            "url must have a host: {}",
            raw
        )));
    }
    Ok(parsed)
}

/// Sanitizes a submitted title: trims it, escapes HTML metacharacters, and
/// enforces the length cap on the escaped form.
pub fn sanitize_title(raw: &str, max_length: usize) -> Result<String, StoreError> {
    let escaped = escape_html(raw.trim());
    if escaped.is_empty() {
        return Err(StoreError::InvalidInput(
            "title cannot be empty".to_string(),
        ));
    }
    if escaped.chars().count() > max_length {
        return Err(StoreError::InvalidInput(format!(
            "title exceeds {} characters",
            max_length
        )));
    }
    Ok(escaped)
}

/// HTML-escapes `&`, `<`, `>`, `"` and `'`; control characters are dropped.
fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}
