//! Endpoint URL construction for upstream providers.
//!
//! Base URLs come from configuration and may carry trailing slashes; these
//! helpers keep the joined endpoints free of double slashes.

/// Configured base URL without surrounding whitespace or trailing slashes.
fn trimmed_base(base_url: &str) -> &str {
    base_url.trim().trim_end_matches('/')
}

/// Joins `path` onto `base_url` with exactly one slash between them.
///
/// ```
/// use nero::utils::url::construct_api_url;
///
/// assert_eq!(construct_api_url("http://127.0.0.1:5000/", "/api/chat"), "http://127.0.0.1:5000/api/chat");
/// assert_eq!(construct_api_url("http://127.0.0.1:5000", "health"), "http://127.0.0.1:5000/health");
/// ```
pub fn construct_api_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", trimmed_base(base_url), path.trim_start_matches('/'))
}

/// `models/{model}:generateContent` under the Gemini base URL.
pub fn gemini_generate_url(base_url: &str, model: &str) -> String {
    construct_api_url(base_url, &format!("models/{model}:generateContent"))
}
