use serde_json::Value;

/// Builds a display label for a location.
///
/// Prefers `"{name}, {sys.country}"` from a provider response and falls back to
/// the title-cased query text when the response has no usable name.
pub fn resolve_label(response: &Value, fallback_query: &str) -> String {
    let name = non_empty_str(response.get("name"));
    let country = non_empty_str(response.pointer("/sys/country"));

    match (name, country) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.to_string(),
        (None, _) => title_case(fallback_query),
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}

/// Uppercases the first word character of every whitespace-delimited run and
/// lowercases the rest of that run.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut word_started = false;

    for ch in text.chars() {
        if ch.is_whitespace() {
            word_started = false;
            out.push(ch);
        } else if word_started {
            out.extend(ch.to_lowercase());
        } else if ch.is_alphanumeric() || ch == '_' {
            word_started = true;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }

    out
}
